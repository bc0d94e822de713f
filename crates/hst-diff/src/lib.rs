//! Snapshot comparison.
//!
//! Trees nest while the index and a worktree scan are flat, so every
//! comparison starts by flattening a tree into a [`PathMap`]. [`classify`]
//! then compares a recorded snapshot, the staging index and the live files
//! by object id alone. The [`line`] and [`unified`] modules produce the
//! textual patches shown by `hst diff`.

pub mod line;
mod status;
mod tree;
pub mod unified;

pub use hst_object::PathMap;
pub use status::{classify, diff_maps, Change, ChangeKind, Classification};
pub use tree::{flatten_commit, flatten_tree, write_tree};

use bstr::BString;

#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    #[error("invalid path in snapshot: '{0}'")]
    InvalidPath(BString),

    #[error(transparent)]
    Odb(#[from] hst_odb::OdbError),

    #[error(transparent)]
    Object(#[from] hst_object::ObjectError),
}
