use hst_hash::ObjectId;
use hst_odb::{ObjectStore, OdbError};
use hst_revwalk::reachable_objects;
use tracing::instrument;

use crate::TransferError;

/// The two primitives object transfer is built on.
pub trait ObjectTransfer {
    /// Whether the destination already holds `oid`.
    fn exists(&self, oid: &ObjectId) -> bool;

    /// Copy `oid` to the destination.
    fn copy(&self, oid: &ObjectId) -> Result<(), TransferError>;
}

/// Transfer between two object stores.
///
/// Objects are re-hashed on the way in, so a corrupt source object is
/// caught rather than stored under the wrong name.
pub struct StoreTransfer<'a, S: ?Sized, D: ?Sized> {
    source: &'a S,
    dest: &'a D,
}

impl<'a, S, D> StoreTransfer<'a, S, D>
where
    S: ObjectStore + ?Sized,
    D: ObjectStore + ?Sized,
{
    pub fn new(source: &'a S, dest: &'a D) -> Self {
        Self { source, dest }
    }
}

impl<S, D> ObjectTransfer for StoreTransfer<'_, S, D>
where
    S: ObjectStore + ?Sized,
    D: ObjectStore + ?Sized,
{
    fn exists(&self, oid: &ObjectId) -> bool {
        self.dest.contains(oid)
    }

    fn copy(&self, oid: &ObjectId) -> Result<(), TransferError> {
        let (kind, content) = self
            .source
            .read_raw(oid)?
            .ok_or(OdbError::NotFound(*oid))?;
        let written = self.dest.write_raw(kind, &content)?;
        if written != *oid {
            return Err(TransferError::CopyMismatch {
                expected: *oid,
                actual: written,
            });
        }
        Ok(())
    }
}

/// Copy everything reachable from `tip` that the destination lacks.
///
/// An object already at the destination is taken to bring its whole closure
/// with it, so the walk stops there. Objects are copied referenced-first;
/// an interrupted transfer never leaves an object whose references are
/// missing. Returns the number of objects copied.
#[instrument(skip(transfer, source), level = "debug")]
pub fn send_objects<T, S>(transfer: &T, source: &S, tip: &ObjectId) -> Result<usize, TransferError>
where
    T: ObjectTransfer + ?Sized,
    S: ObjectStore + ?Sized,
{
    let missing = reachable_objects(source, std::slice::from_ref(tip), |oid| transfer.exists(oid))?;
    for oid in &missing {
        transfer.copy(oid)?;
    }
    tracing::debug!(copied = missing.len(), "sent objects");
    Ok(missing.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hst_object::{Blob, Commit, FileMode, Object, Tree, TreeEntry};
    use hst_odb::{MemoryStore, ObjectStoreExt};
    use hst_utils::date::{GitDate, Signature};
    use std::cell::RefCell;

    fn commit(store: &MemoryStore, parents: &[ObjectId], content: &str) -> ObjectId {
        let blob = store.put(&Object::Blob(Blob::new(content.as_bytes().to_vec()))).unwrap();
        let tree = Tree::from_entries(vec![TreeEntry::new(FileMode::Regular, "f", blob)]).unwrap();
        let tree = store.put(&Object::Tree(tree)).unwrap();
        let sig = Signature::new("t <t@example.com>", GitDate::new(0, 0));
        store
            .put(&Object::Commit(Commit::new(tree, parents.to_vec(), sig.clone(), sig, "m\n")))
            .unwrap()
    }

    /// Records copy order on top of a store transfer.
    struct Recording<'a> {
        inner: StoreTransfer<'a, MemoryStore, MemoryStore>,
        dest: &'a MemoryStore,
        copied: RefCell<Vec<ObjectId>>,
    }

    impl ObjectTransfer for Recording<'_> {
        fn exists(&self, oid: &ObjectId) -> bool {
            self.inner.exists(oid)
        }

        fn copy(&self, oid: &ObjectId) -> Result<(), TransferError> {
            self.inner.copy(oid)?;
            self.copied.borrow_mut().push(*oid);
            Ok(())
        }
    }

    #[test]
    fn copies_closure_references_first() {
        let src = MemoryStore::new();
        let dst = MemoryStore::new();
        let c1 = commit(&src, &[], "one");
        let c2 = commit(&src, &[c1], "two");

        let recording = Recording {
            inner: StoreTransfer::new(&src, &dst),
            dest: &dst,
            copied: RefCell::new(Vec::new()),
        };
        // Two commits, two trees, two blobs.
        assert_eq!(send_objects(&recording, &src, &c2).unwrap(), 6);

        let copied = recording.copied.borrow();
        assert_eq!(copied.last(), Some(&c2));
        for (i, oid) in copied.iter().enumerate() {
            let deps = match recording.dest.read_object(oid).unwrap() {
                Object::Commit(c) => [vec![c.tree], c.parents].concat(),
                Object::Tree(t) => t.iter().map(|e| e.oid).collect(),
                _ => Vec::new(),
            };
            for dep in deps {
                let at = copied.iter().position(|o| *o == dep).unwrap();
                assert!(at < i, "{dep} copied after {oid}");
            }
        }
    }

    #[test]
    fn prunes_at_existing_objects() {
        let src = MemoryStore::new();
        let dst = MemoryStore::new();
        let c1 = commit(&src, &[], "one");
        let transfer = StoreTransfer::new(&src, &dst);
        assert_eq!(send_objects(&transfer, &src, &c1).unwrap(), 3);

        let c2 = commit(&src, &[c1], "two");
        // Only the new commit, its tree and its blob.
        assert_eq!(send_objects(&transfer, &src, &c2).unwrap(), 3);
        assert_eq!(send_objects(&transfer, &src, &c2).unwrap(), 0);
        assert!(dst.exists(&c2));
        assert_eq!(dst.len(), src.len());
    }

    #[test]
    fn missing_source_object_is_reported() {
        let src = MemoryStore::new();
        let dst = MemoryStore::new();
        let transfer = StoreTransfer::new(&src, &dst);
        assert!(matches!(
            transfer.copy(&ObjectId::new([9; 20])),
            Err(TransferError::Odb(OdbError::NotFound(_)))
        ));
    }
}
