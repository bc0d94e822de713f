//! Turning user-supplied revision names into object ids.

use hst_hash::{ObjectId, HEX_LEN};
use hst_object::ObjectType;
use hst_odb::{ObjectStore, ObjectStoreExt};
use hst_ref::{RefName, RefStore};

use crate::RevWalkError;

/// Shortest hex prefix accepted as an abbreviated object id.
pub const MIN_PREFIX_LEN: usize = 7;

/// Resolve a revision name to an object id.
///
/// Tried in order: `HEAD`, a full 40-hex id present in the store, a hex
/// prefix of at least [`MIN_PREFIX_LEN`] characters matching exactly one
/// object of any kind, a local branch, a `remote/branch` remote-tracking name, and
/// finally a full ref name such as `refs/heads/main`.
pub fn resolve<S, R>(store: &S, refs: &R, input: &str) -> Result<ObjectId, RevWalkError>
where
    S: ObjectStore + ?Sized,
    R: RefStore + ?Sized,
{
    let unknown = || RevWalkError::UnknownReference(input.to_string());

    if input == "HEAD" {
        return refs.resolve_to_oid(&RefName::head())?.ok_or_else(unknown);
    }

    let is_hex = hst_hash::hex::is_hex(input);

    if is_hex && input.len() == HEX_LEN {
        if let Ok(oid) = ObjectId::from_hex(input) {
            if store.exists(&oid) {
                return Ok(oid);
            }
        }
    }

    if is_hex && (MIN_PREFIX_LEN..HEX_LEN).contains(&input.len()) {
        let candidates = store.lookup_prefix(input)?;
        match candidates.len() {
            0 => {}
            1 => return Ok(candidates[0]),
            _ => {
                return Err(RevWalkError::AmbiguousReference {
                    prefix: input.to_string(),
                    candidates,
                })
            }
        }
    }

    if let Ok(name) = RefName::branch(input) {
        if let Some(oid) = refs.resolve_to_oid(&name)? {
            return Ok(oid);
        }
    }

    if let Some((remote, branch)) = input.split_once('/') {
        if let Ok(name) = RefName::remote_tracking(remote, branch) {
            if let Some(oid) = refs.resolve_to_oid(&name)? {
                return Ok(oid);
            }
        }
    }

    if input.starts_with("refs/") {
        if let Ok(name) = RefName::new(input) {
            if let Some(oid) = refs.resolve_to_oid(&name)? {
                return Ok(oid);
            }
        }
    }

    Err(unknown())
}

/// [`resolve`], then check that the object is a commit.
pub fn resolve_commit<S, R>(store: &S, refs: &R, input: &str) -> Result<ObjectId, RevWalkError>
where
    S: ObjectStore + ?Sized,
    R: RefStore + ?Sized,
{
    let oid = resolve(store, refs, input)?;
    match store.kind_of(&oid)? {
        ObjectType::Commit => Ok(oid),
        _ => Err(RevWalkError::NotACommit(oid)),
    }
}
