use std::path::PathBuf;

use bstr::BString;

/// Errors from repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("not an hst repository (or any of the parent directories): {0}")]
    NotFound(PathBuf),

    #[error("repository already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("unable to read HEAD: {0}")]
    InvalidHead(String),

    #[error("HEAD does not point to a commit yet")]
    UnbornHead,

    #[error("nothing to commit")]
    NothingToCommit,

    #[error("a branch named '{0}' already exists")]
    BranchExists(String),

    #[error("branch '{0}' not found")]
    BranchNotFound(String),

    #[error("cannot delete branch '{0}': it is checked out")]
    CannotDeleteCurrentBranch(String),

    #[error("pathspec '{0}' did not match any files")]
    PathspecNoMatch(String),

    #[error("invalid path in working tree: {0}")]
    InvalidPath(BString),

    #[error("cannot {0} while a merge is in progress (use merge --continue or --abort)")]
    MergeInProgress(&'static str),

    #[error("local changes would be overwritten: {}", join_paths(.0))]
    LocalChanges(Vec<BString>),

    #[error(transparent)]
    Config(#[from] hst_config::ConfigError),

    #[error(transparent)]
    Odb(#[from] hst_odb::OdbError),

    #[error(transparent)]
    Ref(#[from] hst_ref::RefError),

    #[error(transparent)]
    Index(#[from] hst_index::IndexError),

    #[error(transparent)]
    Diff(#[from] hst_diff::DiffError),

    #[error(transparent)]
    RevWalk(#[from] hst_revwalk::RevWalkError),

    #[error(transparent)]
    Hash(#[from] hst_hash::HashError),

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
