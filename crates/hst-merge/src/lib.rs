//! Merge engine: three-way tree merge, the merge state machine, and rebase.
//!
//! The tree-level pieces ([`merge_trees`], [`plan_merge`], [`plan_rebase`],
//! [`replay`]) work against any [`hst_odb::ObjectStore`]. The repository-level
//! operations ([`merge`], [`continue_merge`], [`abort_merge`], [`rebase`])
//! drive them against a [`hst_repository::Repository`] and keep the working
//! tree, index and refs in step.

pub mod conflict;
mod merge;
mod rebase;
pub mod state;
mod tree;

pub use merge::{abort_merge, continue_merge, merge, plan_merge, MergeOutcome, MergePlan};
pub use rebase::{plan_rebase, rebase, replay, RebaseOutcome, RebasePlan};
pub use state::MergeState;
pub use tree::{merge_trees, TreeMerge};

use bstr::BString;
use hst_hash::ObjectId;

/// Options for [`merge`].
#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    /// Refuse anything but a fast-forward.
    pub fast_forward_only: bool,
}

/// Error types for merge and rebase operations.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error("no merge base found: the histories are unrelated")]
    NoMergeBase,

    #[error("a merge is already in progress (use --continue or --abort)")]
    MergeInProgress,

    #[error("there is no merge in progress")]
    NoMergeInProgress,

    #[error("you have unresolved conflicts: {}", join_paths(.0))]
    UnresolvedConflicts(Vec<BString>),

    #[error("not possible to fast-forward: {current} and {target} have diverged")]
    Diverged { current: ObjectId, target: ObjectId },

    #[error("corrupt merge state: {0}")]
    CorruptState(String),

    #[error(transparent)]
    Repo(#[from] hst_repository::RepoError),

    #[error(transparent)]
    RevWalk(#[from] hst_revwalk::RevWalkError),

    #[error(transparent)]
    Diff(#[from] hst_diff::DiffError),

    #[error(transparent)]
    Odb(#[from] hst_odb::OdbError),

    #[error(transparent)]
    Hash(#[from] hst_hash::HashError),

    #[error(transparent)]
    Util(#[from] hst_utils::UtilError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn join_paths(paths: &[BString]) -> String {
    paths
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
