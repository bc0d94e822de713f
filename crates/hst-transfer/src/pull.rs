use hst_diff::flatten_commit;
use hst_hash::ObjectId;
use hst_merge::{plan_merge, MergeError, MergePlan, MergeState};
use hst_ref::{RefName, RefStore};
use hst_repository::Repository;
use tracing::instrument;

use crate::fetch::fetch;
use crate::refspec::Refspec;
use crate::TransferError;

/// What [`pull`] did to the current branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullOutcome {
    UpToDate,
    /// `from` is `None` when the branch had no commits yet.
    FastForward { from: Option<ObjectId>, to: ObjectId },
}

/// Fetch `branch` of `remote` (default: the current branch's name) and
/// fast-forward the current branch to it.
///
/// Diverged histories are refused with [`TransferError::Diverged`]; the
/// caller decides between merge and rebase.
#[instrument(skip(repo), level = "debug")]
pub fn pull(
    repo: &Repository,
    remote: &str,
    branch: Option<&str>,
) -> Result<PullOutcome, TransferError> {
    if MergeState::load(repo.hst_dir())?.is_in_progress() {
        return Err(MergeError::MergeInProgress.into());
    }
    let current = repo.current_branch()?.ok_or(TransferError::DetachedHead)?;
    let branch = branch.unwrap_or(&current);

    fetch(repo, remote, &[Refspec::tracking(remote, branch)])?;
    let tracking = RefName::remote_tracking(remote, branch)?;
    let target = repo
        .refs()
        .resolve_to_oid(&tracking)?
        .ok_or_else(|| TransferError::RemoteRefNotFound(tracking.to_string()))?;

    let head = repo.head_oid()?;
    if let Some(head) = head {
        match plan_merge(repo.odb(), &head, &target)? {
            MergePlan::UpToDate => return Ok(PullOutcome::UpToDate),
            MergePlan::FastForward => {}
            MergePlan::ThreeWay { .. } => {
                tracing::warn!(%head, %target, "pull refused: histories diverged");
                return Err(TransferError::Diverged {
                    current: head,
                    target,
                });
            }
        }
    }

    repo.ensure_clean_for(&flatten_commit(repo.odb(), &target)?)?;
    repo.checkout_commit(&target)?;
    repo.update_head(&target)?;
    tracing::info!(to = %target, "fast-forwarded");
    Ok(PullOutcome::FastForward {
        from: head,
        to: target,
    })
}
