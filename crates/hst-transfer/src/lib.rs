//! Moving objects and branches between local hst repositories.
//!
//! Remotes are other repositories on the filesystem. Objects travel through
//! the [`ObjectTransfer`] primitive (does the destination have it, copy it
//! over); [`send_objects`] decides what to copy by walking the closure of a
//! commit and pruning at anything the destination already holds.

mod clone;
mod fetch;
mod pull;
mod push;
pub mod refspec;
mod remote;
mod transfer;

pub use clone::clone;
pub use fetch::{fetch, RefUpdate};
pub use pull::{pull, PullOutcome};
pub use push::{push, PushOutcome};
pub use refspec::Refspec;
pub use remote::open_remote;
pub use transfer::{send_objects, ObjectTransfer, StoreTransfer};

use std::path::PathBuf;

use hst_hash::ObjectId;

/// Errors from transfer operations.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("'{0}' does not appear to be an hst remote")]
    NoSuchRemote(String),

    #[error("could not read from remote repository '{url}'")]
    UnreachableRemote {
        url: String,
        #[source]
        source: hst_repository::RepoError,
    },

    #[error("couldn't find remote ref {0}")]
    RemoteRefNotFound(String),

    #[error("src refspec {0} does not match any")]
    SourceRefNotFound(String),

    #[error("invalid refspec '{0}'")]
    InvalidRefspec(String),

    #[error("updates were rejected for {0}: not a fast-forward")]
    NotFastForward(String),

    #[error("not possible to fast-forward: {current} and {target} have diverged")]
    Diverged { current: ObjectId, target: ObjectId },

    #[error("you are not currently on a branch")]
    DetachedHead,

    #[error("destination path '{0}' already exists and is not an empty directory")]
    DestinationNotEmpty(PathBuf),

    #[error("object {expected} was stored as {actual}")]
    CopyMismatch { expected: ObjectId, actual: ObjectId },

    #[error(transparent)]
    Repo(#[from] hst_repository::RepoError),

    #[error(transparent)]
    Merge(#[from] hst_merge::MergeError),

    #[error(transparent)]
    RevWalk(#[from] hst_revwalk::RevWalkError),

    #[error(transparent)]
    Diff(#[from] hst_diff::DiffError),

    #[error(transparent)]
    Odb(#[from] hst_odb::OdbError),

    #[error(transparent)]
    Ref(#[from] hst_ref::RefError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
