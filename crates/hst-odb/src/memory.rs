use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use hst_hash::{Hasher, ObjectId};
use hst_object::ObjectType;

use crate::{ObjectStore, OdbError};

/// An [`ObjectStore`] held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: RwLock<BTreeMap<ObjectId, (ObjectType, Vec<u8>)>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records physically inserted. Repeated writes of the same
    /// content do not count.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.objects.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Store `content` under `oid` without hashing it. Simulates damaged
    /// storage; the record may not match its id.
    pub fn insert_unchecked(&self, oid: ObjectId, kind: ObjectType, content: Vec<u8>) {
        self.objects
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(oid, (kind, content));
    }
}

impl ObjectStore for MemoryStore {
    fn read_raw(&self, oid: &ObjectId) -> Result<Option<(ObjectType, Vec<u8>)>, OdbError> {
        let objects = self.objects.read().unwrap_or_else(PoisonError::into_inner);
        Ok(objects.get(oid).cloned())
    }

    fn write_raw(&self, kind: ObjectType, content: &[u8]) -> Result<ObjectId, OdbError> {
        let oid = Hasher::hash_object(kind.as_str(), content)?;
        let mut objects = self.objects.write().unwrap_or_else(PoisonError::into_inner);
        if !objects.contains_key(&oid) {
            objects.insert(oid, (kind, content.to_vec()));
            self.writes.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(%oid, %kind, "stored object in memory");
        }
        Ok(oid)
    }

    fn contains(&self, oid: &ObjectId) -> bool {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(oid)
    }

    fn oids(&self) -> Result<Vec<ObjectId>, OdbError> {
        let objects = self.objects.read().unwrap_or_else(PoisonError::into_inner);
        Ok(objects.keys().copied().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_write_is_not_physical() {
        let store = MemoryStore::new();
        let a = store.write_raw(ObjectType::Blob, b"data").unwrap();
        let b = store.write_raw(ObjectType::Blob, b"data").unwrap();
        assert_eq!(a, b);
        assert_eq!(store.write_count(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn same_bytes_different_kind_are_distinct() {
        let store = MemoryStore::new();
        let blob = store.write_raw(ObjectType::Blob, b"").unwrap();
        let tree = store.write_raw(ObjectType::Tree, b"").unwrap();
        assert_ne!(blob, tree);
        assert_eq!(tree.to_hex(), "4b825dc642cb6eb9a060e54bf8d69288fbee4904");
    }

    #[test]
    fn prefix_lookup() {
        let store = MemoryStore::new();
        let oid = store.write_raw(ObjectType::Blob, b"hello\n").unwrap();
        assert_eq!(store.lookup_prefix("ce0136").unwrap(), vec![oid]);
        assert!(store.lookup_prefix("ffff").unwrap().is_empty());
    }
}
