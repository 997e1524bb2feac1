//! Compound name resolution across context boundaries

use super::test_utils::{name, open_service};
use namestore::{NamingError, ObjectRef, Target};
use tempfile::TempDir;

#[test]
fn test_compound_resolve_matches_direct_resolve() {
    let temp_dir = TempDir::new().unwrap();
    let service = open_service(temp_dir.path());
    let root = service.root();

    let a = root.bind_new_context(&name("a")).unwrap();
    a.bind(&name("obj"), ObjectRef::new("IOR:obj")).unwrap();

    assert_eq!(
        root.resolve(&name("a/obj")).unwrap(),
        a.resolve(&name("obj")).unwrap()
    );
    assert_eq!(root.resolve_context(&name("a")).unwrap(), a);
}

#[test]
fn test_compound_bind_and_unbind_delegate() {
    let temp_dir = TempDir::new().unwrap();
    let service = open_service(temp_dir.path());
    let root = service.root();

    root.bind_new_context(&name("a")).unwrap();
    root.bind_new_context(&name("a/b")).unwrap();
    root.bind(&name("a/b/leaf"), ObjectRef::new("IOR:leaf"))
        .unwrap();

    let b = root.resolve_context(&name("a/b")).unwrap();
    assert_eq!(
        b.resolve(&name("leaf")).unwrap(),
        Target::Object(ObjectRef::new("IOR:leaf"))
    );

    root.unbind(&name("a/b/leaf")).unwrap();
    assert!(matches!(
        b.resolve(&name("leaf")),
        Err(NamingError::NotFound { .. })
    ));
}

#[test]
fn test_not_found_reports_unresolved_suffix() {
    let temp_dir = TempDir::new().unwrap();
    let service = open_service(temp_dir.path());
    let root = service.root();
    root.bind_new_context(&name("a")).unwrap();

    match root.resolve(&name("a/missing/x")) {
        Err(NamingError::NotFound { rest }) => assert_eq!(rest, name("missing/x")),
        other => panic!("expected NotFound, got {:?}", other),
    }
    assert!(matches!(
        root.unbind(&name("a/missing")),
        Err(NamingError::NotFound { .. })
    ));
}

#[test]
fn test_traversal_through_object_is_not_a_context() {
    let temp_dir = TempDir::new().unwrap();
    let service = open_service(temp_dir.path());
    let root = service.root();
    root.bind(&name("obj"), ObjectRef::new("IOR:obj")).unwrap();

    match root.resolve(&name("obj/x")) {
        Err(NamingError::NotAContext { rest }) => assert_eq!(rest, name("obj/x")),
        other => panic!("expected NotAContext, got {:?}", other),
    }
    assert!(matches!(
        root.bind(&name("obj/x"), ObjectRef::new("IOR:x")),
        Err(NamingError::NotAContext { .. })
    ));
    assert!(matches!(
        root.resolve_context(&name("obj")),
        Err(NamingError::NotAContext { .. })
    ));
}

#[test]
fn test_rebind_replaces_and_bind_refuses() {
    let temp_dir = TempDir::new().unwrap();
    let service = open_service(temp_dir.path());
    let root = service.root();
    let n = name("svc.kind");

    root.bind(&n, ObjectRef::new("IOR:1")).unwrap();
    root.rebind(&n, ObjectRef::new("IOR:2")).unwrap();
    assert_eq!(
        root.resolve(&n).unwrap(),
        Target::Object(ObjectRef::new("IOR:2"))
    );
    assert!(matches!(
        root.bind(&n, ObjectRef::new("IOR:2")),
        Err(NamingError::AlreadyBound(_))
    ));

    // Rebind of an unbound name simply binds it.
    root.rebind(&name("fresh"), ObjectRef::new("IOR:3")).unwrap();
    assert_eq!(
        root.resolve(&name("fresh")).unwrap(),
        Target::Object(ObjectRef::new("IOR:3"))
    );
}

#[test]
fn test_rebind_type_mismatch() {
    let temp_dir = TempDir::new().unwrap();
    let service = open_service(temp_dir.path());
    let root = service.root();
    let ctx = root.bind_new_context(&name("ctx")).unwrap();
    root.bind(&name("obj"), ObjectRef::new("IOR:obj")).unwrap();

    assert!(matches!(
        root.rebind(&name("ctx"), ObjectRef::new("IOR:x")),
        Err(NamingError::NotAnObject(_))
    ));
    assert!(matches!(
        root.rebind_context(&name("obj"), &ctx),
        Err(NamingError::NotAContext { .. })
    ));
}

#[test]
fn test_id_and_kind_both_distinguish() {
    let temp_dir = TempDir::new().unwrap();
    let service = open_service(temp_dir.path());
    let root = service.root();

    root.bind(&name("x.one"), ObjectRef::new("IOR:1")).unwrap();
    root.bind(&name("x.two"), ObjectRef::new("IOR:2")).unwrap();
    root.bind(&name("x"), ObjectRef::new("IOR:0")).unwrap();

    assert_eq!(
        root.resolve(&name("x.two")).unwrap(),
        Target::Object(ObjectRef::new("IOR:2"))
    );
    assert_eq!(
        root.resolve_str("x").unwrap(),
        Target::Object(ObjectRef::new("IOR:0"))
    );
}

#[test]
fn test_cyclic_bindings_resolve_without_deadlock() {
    let temp_dir = TempDir::new().unwrap();
    let service = open_service(temp_dir.path());
    let root = service.root();

    let a = root.bind_new_context(&name("a")).unwrap();
    a.bind_context(&name("up"), &root).unwrap();
    a.bind(&name("leaf"), ObjectRef::new("IOR:leaf")).unwrap();

    assert_eq!(
        root.resolve(&name("a/up/a/up/a/leaf")).unwrap(),
        Target::Object(ObjectRef::new("IOR:leaf"))
    );
    root.bind(&name("a/up/a/up/top"), ObjectRef::new("IOR:top"))
        .unwrap();
    assert_eq!(
        root.resolve(&name("top")).unwrap(),
        Target::Object(ObjectRef::new("IOR:top"))
    );
}

#[test]
fn test_stringified_names_with_escapes() {
    let temp_dir = TempDir::new().unwrap();
    let service = open_service(temp_dir.path());
    let root = service.root();

    let n = root.to_name(r"a\/b.k\.ind").unwrap();
    assert_eq!(n.len(), 1);
    assert_eq!(n.first().id, "a/b");
    assert_eq!(n.first().kind, "k.ind");
    assert_eq!(root.to_string(&n), r"a\/b.k\.ind");

    root.bind(&n, ObjectRef::new("IOR:esc")).unwrap();
    assert_eq!(
        root.resolve_str(r"a\/b.k\.ind").unwrap(),
        Target::Object(ObjectRef::new("IOR:esc"))
    );
    assert!(matches!(
        root.resolve_str("a//b"),
        Err(NamingError::InvalidName(_))
    ));
}
