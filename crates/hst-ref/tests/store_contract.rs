//! The same expectations run against both ref backends.

use hst_hash::ObjectId;
use hst_ref::{FilesRefStore, MemoryRefStore, RefName, RefStore, Reference};

fn exercise(store: &dyn RefStore) {
    let main = RefName::branch("main").unwrap();
    let topic = RefName::branch("topic").unwrap();
    let tracking = RefName::remote_tracking("origin", "main").unwrap();
    let a = ObjectId::new([0xaa; 20]);
    let b = ObjectId::new([0xbb; 20]);

    assert!(store.resolve(&main).unwrap().is_none());

    store.write_symbolic_ref(&RefName::head(), &main).unwrap();
    store.write_ref(&main, &a).unwrap();
    store.write_ref(&topic, &b).unwrap();
    store.write_ref(&tracking, &a).unwrap();

    match store.resolve(&RefName::head()).unwrap() {
        Some(Reference::Symbolic { target, .. }) => assert_eq!(target, main),
        other => panic!("HEAD should be symbolic, got {other:?}"),
    }
    assert_eq!(store.resolve_to_oid(&RefName::head()).unwrap(), Some(a));

    // Overwrite is last-writer-wins.
    store.write_ref(&main, &b).unwrap();
    assert_eq!(store.resolve_to_oid(&main).unwrap(), Some(b));

    let heads: Vec<_> = store
        .iter(Some("refs/heads/"))
        .unwrap()
        .into_iter()
        .map(|r| r.name().short_name().to_string())
        .collect();
    assert_eq!(heads, ["main", "topic"]);

    // Detach.
    store.write_ref(&RefName::head(), &a).unwrap();
    assert!(!store.resolve(&RefName::head()).unwrap().unwrap().is_symbolic());

    assert!(store.delete_ref(&topic).unwrap());
    assert!(store.resolve(&topic).unwrap().is_none());
    assert_eq!(store.iter(None).unwrap().len(), 2);
}

#[test]
fn memory_backend() {
    exercise(&MemoryRefStore::new());
}

#[test]
fn files_backend() {
    let dir = tempfile::tempdir().unwrap();
    exercise(&FilesRefStore::new(dir.path()));
    assert!(dir.path().join("refs/heads").is_dir());
}
