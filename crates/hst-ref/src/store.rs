use hst_hash::ObjectId;

use crate::error::RefError;
use crate::name::RefName;
use crate::Reference;

/// Depth limit when following symbolic refs.
const MAX_SYMREF_DEPTH: usize = 10;

/// Storage for references.
///
/// Updates are single-ref and last-writer-wins; callers serialize writers.
pub trait RefStore: Send + Sync {
    /// Read a ref without following it.
    fn resolve(&self, name: &RefName) -> Result<Option<Reference>, RefError>;

    /// Every ref whose full name starts with `prefix`, sorted by name.
    /// Only names under `refs/` are listed.
    fn iter(&self, prefix: Option<&str>) -> Result<Vec<Reference>, RefError>;

    fn write_ref(&self, name: &RefName, oid: &ObjectId) -> Result<(), RefError>;

    fn write_symbolic_ref(&self, name: &RefName, target: &RefName) -> Result<(), RefError>;

    /// Remove a ref. Returns whether it existed.
    fn delete_ref(&self, name: &RefName) -> Result<bool, RefError>;

    /// Follow symbolic refs to an id. `Ok(None)` for a missing ref or a
    /// symbolic ref whose target does not exist yet (an unborn branch).
    fn resolve_to_oid(&self, name: &RefName) -> Result<Option<ObjectId>, RefError> {
        let mut current = name.clone();
        for _ in 0..=MAX_SYMREF_DEPTH {
            match self.resolve(&current)? {
                Some(Reference::Direct { target, .. }) => return Ok(Some(target)),
                Some(Reference::Symbolic { target, .. }) => current = target,
                None => return Ok(None),
            }
        }
        Err(RefError::SymrefLoop(name.to_string()))
    }
}
