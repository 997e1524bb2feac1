//! Bootstrap and durability across restarts

use super::test_utils::{name, open_service};
use namestore::config::{NamestoreConfig, RetentionMode};
use namestore::{NameService, NamingError, ObjectRef, Target};
use tempfile::TempDir;

#[test]
fn test_root_key_identical_across_bootstraps() {
    let temp_dir = TempDir::new().unwrap();
    let first = open_service(temp_dir.path()).root_key().clone();
    let second = open_service(temp_dir.path()).root_key().clone();
    assert_eq!(first, second);
    assert_eq!(first.as_str(), "NC0");
}

#[test]
fn test_compound_binding_survives_restart() {
    let temp_dir = TempDir::new().unwrap();
    let child_key = {
        let service = open_service(temp_dir.path());
        let child = service.root().bind_new_context(&name("dept")).unwrap();
        child
            .bind(&name("printer.svc"), ObjectRef::new("IOR:printer"))
            .unwrap();
        service.flush().unwrap();
        child.key().clone()
    };

    let service = open_service(temp_dir.path());
    assert_eq!(
        service.root().resolve(&name("dept/printer.svc")).unwrap(),
        Target::Object(ObjectRef::new("IOR:printer"))
    );
    // A reference minted from the key alone reaches the same state.
    let child = service.context(child_key);
    assert_eq!(
        child.resolve(&name("printer.svc")).unwrap(),
        Target::Object(ObjectRef::new("IOR:printer"))
    );
}

#[test]
fn test_bootstrap_from_config_with_cache_retention() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = NamestoreConfig::default();
    config.storage.path = temp_dir.path().join("store");
    config.activation.retention = RetentionMode::Cache;
    config.activation.cache_capacity = 2;

    {
        let service = NameService::bootstrap(&config).unwrap();
        let a = service.root().bind_new_context(&name("a")).unwrap();
        a.bind(&name("x"), ObjectRef::new("IOR:x")).unwrap();
        assert_eq!(
            service.retention(),
            namestore::RetentionPolicy::Cache { capacity: 2 }
        );
    }

    let service = NameService::bootstrap(&config).unwrap();
    assert_eq!(
        service.root().resolve(&name("a/x")).unwrap(),
        Target::Object(ObjectRef::new("IOR:x"))
    );
}

#[test]
fn test_destroyed_context_leaves_dangling_binding() {
    let temp_dir = TempDir::new().unwrap();
    let alias_target = {
        let service = open_service(temp_dir.path());
        let root = service.root();
        let a = root.bind_new_context(&name("a")).unwrap();
        root.bind_context(&name("alias"), &a).unwrap();
        a.destroy().unwrap();
        a.key().clone()
    };

    let service = open_service(temp_dir.path());
    let root = service.root();
    assert_eq!(
        root.resolve(&name("alias")).unwrap(),
        Target::Context(alias_target)
    );
    assert!(matches!(
        root.resolve(&name("alias/anything")),
        Err(NamingError::ObjectNotFound(_))
    ));
    assert!(matches!(
        root.resolve_context(&name("alias")).unwrap().list(5),
        Err(NamingError::ObjectNotFound(_))
    ));
}

#[test]
fn test_destroy_rules() {
    let temp_dir = TempDir::new().unwrap();
    let service = open_service(temp_dir.path());
    let root = service.root();

    assert!(matches!(root.destroy(), Err(NamingError::BadOperation(_))));

    let a = root.bind_new_context(&name("a")).unwrap();
    a.bind(&name("x"), ObjectRef::new("IOR:x")).unwrap();
    assert!(matches!(a.destroy(), Err(NamingError::NotEmpty(_))));

    a.unbind(&name("x")).unwrap();
    a.destroy().unwrap();
    assert!(matches!(a.destroy(), Err(NamingError::ObjectNotFound(_))));
}
