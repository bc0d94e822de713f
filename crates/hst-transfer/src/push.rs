use hst_hash::ObjectId;
use hst_ref::{RefName, RefStore};
use hst_repository::{RepoError, Repository};
use hst_revwalk::{is_ancestor, RevWalkError};
use tracing::instrument;

use crate::remote::open_remote;
use crate::transfer::{send_objects, StoreTransfer};
use crate::TransferError;

/// What [`push`] did to the remote branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushOutcome {
    pub old: Option<ObjectId>,
    pub new: ObjectId,
    /// Objects copied to the remote.
    pub copied: usize,
}

impl PushOutcome {
    pub fn is_up_to_date(&self) -> bool {
        self.old == Some(self.new)
    }
}

/// Send the commit named by `source` to branch `branch` of `remote`.
///
/// Unless `force` is set, the remote branch must be absent or an ancestor of
/// the pushed commit. On success the remote branch and the local
/// remote-tracking ref both point at the pushed commit. The remote's working
/// tree is not touched.
#[instrument(skip(repo), level = "debug")]
pub fn push(
    repo: &Repository,
    remote: &str,
    source: &str,
    branch: &str,
    force: bool,
) -> Result<PushOutcome, TransferError> {
    let new = repo.resolve(source).map_err(|e| match e {
        RepoError::RevWalk(RevWalkError::UnknownReference(_)) => {
            TransferError::SourceRefNotFound(source.to_string())
        }
        other => other.into(),
    })?;
    let (_url, dest) = open_remote(repo, remote)?;

    let remote_ref = RefName::branch(branch)?;
    let old = dest.refs().resolve_to_oid(&remote_ref)?;

    if let (Some(old), false) = (old, force) {
        // A remote tip we have never seen cannot be in our history.
        let contained = repo.odb().contains(&old) && is_ancestor(repo.odb(), &old, &new)?;
        if !contained {
            return Err(TransferError::NotFastForward(remote_ref.to_string()));
        }
    }

    let copied = send_objects(&StoreTransfer::new(repo.odb(), dest.odb()), repo.odb(), &new)?;
    dest.refs().write_ref(&remote_ref, &new)?;
    repo.refs()
        .write_ref(&RefName::remote_tracking(remote, branch)?, &new)?;
    tracing::info!(remote, branch, %new, copied, "pushed");

    Ok(PushOutcome { old, new, copied })
}
