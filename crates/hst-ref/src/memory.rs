use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use hst_hash::ObjectId;

use crate::error::RefError;
use crate::name::RefName;
use crate::store::RefStore;
use crate::Reference;

/// A [`RefStore`] held in memory.
#[derive(Debug, Default)]
pub struct MemoryRefStore {
    refs: RwLock<BTreeMap<RefName, Reference>>,
}

impl MemoryRefStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&self, reference: Reference) {
        self.refs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(reference.name().clone(), reference);
    }
}

impl RefStore for MemoryRefStore {
    fn resolve(&self, name: &RefName) -> Result<Option<Reference>, RefError> {
        let refs = self.refs.read().unwrap_or_else(PoisonError::into_inner);
        Ok(refs.get(name).cloned())
    }

    fn iter(&self, prefix: Option<&str>) -> Result<Vec<Reference>, RefError> {
        let refs = self.refs.read().unwrap_or_else(PoisonError::into_inner);
        Ok(refs
            .values()
            .filter(|r| r.name().as_str().starts_with("refs/"))
            .filter(|r| prefix.map_or(true, |p| r.name().as_str().starts_with(p)))
            .cloned()
            .collect())
    }

    fn write_ref(&self, name: &RefName, oid: &ObjectId) -> Result<(), RefError> {
        self.insert(Reference::Direct {
            name: name.clone(),
            target: *oid,
        });
        Ok(())
    }

    fn write_symbolic_ref(&self, name: &RefName, target: &RefName) -> Result<(), RefError> {
        self.insert(Reference::Symbolic {
            name: name.clone(),
            target: target.clone(),
        });
        Ok(())
    }

    fn delete_ref(&self, name: &RefName) -> Result<bool, RefError> {
        let mut refs = self.refs.write().unwrap_or_else(PoisonError::into_inner);
        Ok(refs.remove(name).is_some())
    }
}
