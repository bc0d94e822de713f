//! Commit graph traversal.
//!
//! Every traversal in this crate is built on [`Walk`]: a breadth-first
//! frontier, one visited set, and a caller-supplied expansion function.
//! On top of it sit ancestry queries ([`is_ancestor`], [`merge_base`]),
//! history listing ([`history`], [`history_multi`]), the revision name
//! resolver ([`resolve`]) and the reachable-object closure used when copying
//! objects between repositories ([`reachable_objects`]).

mod graph;
mod objects;
mod resolve;
mod walk;

pub use graph::{first_parent_path, history, history_multi, is_ancestor, merge_base};
pub use objects::reachable_objects;
pub use resolve::{resolve, resolve_commit, MIN_PREFIX_LEN};
pub use walk::Walk;

use hst_hash::ObjectId;

/// Errors produced by graph traversal and name resolution.
#[derive(Debug, thiserror::Error)]
pub enum RevWalkError {
    #[error("unknown revision: {0}")]
    UnknownReference(String),

    #[error("short object id {prefix} is ambiguous ({} candidates)", candidates.len())]
    AmbiguousReference {
        prefix: String,
        candidates: Vec<ObjectId>,
    },

    #[error("object is not a commit: {0}")]
    NotACommit(ObjectId),

    #[error(transparent)]
    Odb(#[from] hst_odb::OdbError),

    #[error(transparent)]
    Ref(#[from] hst_ref::RefError),
}
