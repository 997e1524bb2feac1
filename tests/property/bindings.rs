//! Property-based tests for bind, resolve and list

use namestore::{CompoundName, NameComponent, NameService, ObjectRef, Target};
use proptest::prelude::*;
use proptest::test_runner::{Config, TestRunner};
use std::collections::HashSet;
use tempfile::TempDir;

fn runner() -> TestRunner {
    // Every case opens a fresh store on disk.
    TestRunner::new(Config {
        cases: 24,
        ..Config::default()
    })
}

fn single(id: &str) -> CompoundName {
    CompoundName::single(NameComponent::id(id)).unwrap()
}

/// For distinct single-component names, resolve returns what bind stored.
#[test]
fn test_bind_resolve_round_trip() {
    runner()
        .run(
            &proptest::collection::hash_set("[a-zA-Z0-9_]{1,12}", 1..24),
            |ids| {
                let temp_dir = TempDir::new().unwrap();
                let service = NameService::open(temp_dir.path()).unwrap();
                let root = service.root();

                for id in &ids {
                    root.bind(&single(id), ObjectRef::new(format!("IOR:{}", id)))
                        .unwrap();
                }
                for id in &ids {
                    prop_assert_eq!(
                        root.resolve(&single(id)).unwrap(),
                        Target::Object(ObjectRef::new(format!("IOR:{}", id)))
                    );
                }
                Ok(())
            },
        )
        .unwrap();
}

/// A page plus its continuation yields every binding exactly once.
#[test]
fn test_pagination_covers_all_bindings() {
    runner()
        .run(&(1usize..30, 0usize..35), |(count, max)| {
            let temp_dir = TempDir::new().unwrap();
            let service = NameService::open(temp_dir.path()).unwrap();
            let root = service.root();
            for i in 0..count {
                root.bind(&single(&format!("b{}", i)), ObjectRef::new(i.to_string()))
                    .unwrap();
            }

            let (head, more) = root.list(max).unwrap();
            prop_assert_eq!(head.len(), max.min(count));
            prop_assert_eq!(more.is_some(), max < count);

            let mut seen: Vec<String> = head.into_iter().map(|b| b.name.id).collect();
            if let Some(more) = more {
                seen.extend(more.map(|b| b.name.id));
            }
            prop_assert_eq!(seen.len(), count);
            let unique: HashSet<_> = seen.iter().collect();
            prop_assert_eq!(unique.len(), count);
            Ok(())
        })
        .unwrap();
}
