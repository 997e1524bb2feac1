//! Concurrent access to the service

use super::test_utils::{name, open_service};
use namestore::{NamingError, ObjectRef, Target};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use tempfile::TempDir;

#[test]
fn test_concurrent_new_context_keys_are_unique() {
    let temp_dir = TempDir::new().unwrap();
    let service = open_service(temp_dir.path());

    let keys: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    (0..20)
                        .map(|_| service.new_context().unwrap().key().clone())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect()
    });

    assert_eq!(keys.len(), 160);
    let unique: HashSet<_> = keys.iter().collect();
    assert_eq!(unique.len(), 160);
    assert!(!unique.contains(service.root_key()));
}

#[test]
fn test_concurrent_binds_on_one_context_are_not_lost() {
    let temp_dir = TempDir::new().unwrap();
    let service = open_service(temp_dir.path());
    let root = service.root();

    thread::scope(|scope| {
        for t in 0..8 {
            let root = root.clone();
            scope.spawn(move || {
                for i in 0..15 {
                    root.bind(
                        &name(&format!("t{}-{}", t, i)),
                        ObjectRef::new(format!("IOR:{}:{}", t, i)),
                    )
                    .unwrap();
                }
            });
        }
    });

    let (bindings, more) = root.list(1000).unwrap();
    assert!(more.is_none());
    assert_eq!(bindings.len(), 120);
}

#[test]
fn test_racing_binds_of_one_name_admit_exactly_one() {
    let temp_dir = TempDir::new().unwrap();
    let service = open_service(temp_dir.path());
    let root = service.root();
    let winners = AtomicUsize::new(0);
    let losers = AtomicUsize::new(0);

    thread::scope(|scope| {
        for t in 0..8 {
            let root = &root;
            let winners = &winners;
            let losers = &losers;
            scope.spawn(move || match root.bind(&name("contested"), ObjectRef::new(format!("IOR:{}", t))) {
                Ok(()) => {
                    winners.fetch_add(1, Ordering::SeqCst);
                }
                Err(NamingError::AlreadyBound(_)) => {
                    losers.fetch_add(1, Ordering::SeqCst);
                }
                Err(other) => panic!("unexpected error: {}", other),
            });
        }
    });

    assert_eq!(winners.load(Ordering::SeqCst), 1);
    assert_eq!(losers.load(Ordering::SeqCst), 7);
    assert!(matches!(
        root.resolve(&name("contested")).unwrap(),
        Target::Object(_)
    ));
}

#[test]
fn test_concurrent_bind_new_context_and_sweep() {
    let temp_dir = TempDir::new().unwrap();
    let service = open_service(temp_dir.path());
    let root = service.root();

    thread::scope(|scope| {
        for t in 0..4 {
            let root = root.clone();
            scope.spawn(move || {
                for i in 0..10 {
                    root.bind_new_context(&name(&format!("c{}-{}", t, i)))
                        .unwrap();
                }
            });
        }
        scope.spawn(|| {
            for _ in 0..5 {
                service.sweep_unreachable().unwrap();
            }
        });
    });

    // Nothing bound by bind_new_context may have been swept.
    let (bindings, _) = root.list(1000).unwrap();
    assert_eq!(bindings.len(), 40);
    for binding in &bindings {
        let child = root.resolve_context(&name(&binding.name.id)).unwrap();
        assert!(child.list(1).unwrap().0.is_empty());
    }
    assert_eq!(service.context_count().unwrap(), 41);
}

#[test]
fn test_new_context_survives_concurrent_sweeps() {
    let temp_dir = TempDir::new().unwrap();
    let service = open_service(temp_dir.path());
    let root = service.root();

    thread::scope(|scope| {
        for t in 0..4 {
            let root = root.clone();
            let service = &service;
            scope.spawn(move || {
                for i in 0..10 {
                    let fresh = service.new_context().unwrap();
                    fresh
                        .bind(&name("leaf"), ObjectRef::new(format!("IOR:{}:{}", t, i)))
                        .unwrap();
                    root.bind_context(&name(&format!("n{}-{}", t, i)), &fresh)
                        .unwrap();
                }
            });
        }
        scope.spawn(|| {
            for _ in 0..5 {
                service.sweep_unreachable().unwrap();
            }
        });
    });

    assert_eq!(service.context_count().unwrap(), 41);
    assert_eq!(
        root.resolve(&name("n3-9/leaf")).unwrap(),
        Target::Object(ObjectRef::new("IOR:3:9"))
    );
    assert!(service.sweep_unreachable().unwrap().is_empty());
}
