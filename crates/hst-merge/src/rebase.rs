//! Linear replay of a branch onto a new base.
//!
//! Replay is content-preserving: each replayed commit keeps its original
//! tree, so nothing from the new base is merged into it. Rebasing work that
//! touches the same files as the new base therefore drops the base's changes
//! from the replayed snapshots. Use it to relocate non-overlapping work;
//! for overlapping work, merge instead.

use hst_diff::flatten_commit;
use hst_hash::ObjectId;
use hst_object::Object;
use hst_odb::{ObjectStore, ObjectStoreExt};
use hst_repository::Repository;
use hst_revwalk::{first_parent_path, is_ancestor, merge_base};
use tracing::instrument;

use crate::state::MergeState;
use crate::MergeError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebasePlan {
    /// `onto` is already in the history of `tip`.
    UpToDate,
    /// `tip` is an ancestor of `onto`; the branch just moves forward.
    FastForward,
    /// Commits to replay, oldest first.
    Replay(Vec<ObjectId>),
}

/// Decide how to move `tip` onto `onto`.
///
/// The commits to replay are the first-parent chain from `tip` back to the
/// merge base, exclusive, in chronological order.
pub fn plan_rebase<S: ObjectStore + ?Sized>(
    store: &S,
    onto: &ObjectId,
    tip: &ObjectId,
) -> Result<RebasePlan, MergeError> {
    if is_ancestor(store, onto, tip)? {
        return Ok(RebasePlan::UpToDate);
    }
    if is_ancestor(store, tip, onto)? {
        return Ok(RebasePlan::FastForward);
    }
    let base = merge_base(store, onto, tip)?.ok_or(MergeError::NoMergeBase)?;
    Ok(RebasePlan::Replay(first_parent_path(store, tip, &base)?))
}

/// Re-create `commits` one after another on top of `onto` and return the new
/// tip.
///
/// Each copy keeps the original tree, author, committer, dates and message;
/// only its parent changes, to the previous copy (or `onto` for the first).
#[instrument(skip(store, commits), fields(count = commits.len()), level = "debug")]
pub fn replay<S: ObjectStore + ?Sized>(
    store: &S,
    onto: &ObjectId,
    commits: &[ObjectId],
) -> Result<ObjectId, MergeError> {
    let mut parent = *onto;
    for oid in commits {
        let mut commit = store.read_commit(oid)?;
        commit.parents = vec![parent];
        let copy = store.put(&Object::Commit(commit))?;
        tracing::debug!(from = %oid, to = %copy, "replayed commit");
        parent = copy;
    }
    Ok(parent)
}

/// What [`rebase`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebaseOutcome {
    UpToDate,
    FastForward { to: ObjectId },
    Rebased { tip: ObjectId, replayed: usize },
}

/// Rebase the current branch (or `branch`, after switching to it) onto the
/// commit named by `upstream`, then check out the result.
#[instrument(skip(repo), level = "debug")]
pub fn rebase(
    repo: &Repository,
    upstream: &str,
    branch: Option<&str>,
) -> Result<RebaseOutcome, MergeError> {
    if MergeState::load(repo.hst_dir())?.is_in_progress() {
        return Err(MergeError::MergeInProgress);
    }
    if let Some(branch) = branch {
        repo.switch(branch, false)?;
    }
    let onto = repo.resolve(upstream)?;
    let tip = repo.head_commit()?;
    let odb = repo.odb();

    let (new_tip, outcome) = match plan_rebase(odb, &onto, &tip)? {
        RebasePlan::UpToDate => return Ok(RebaseOutcome::UpToDate),
        RebasePlan::FastForward => (onto, RebaseOutcome::FastForward { to: onto }),
        RebasePlan::Replay(commits) => {
            let new_tip = replay(odb, &onto, &commits)?;
            (
                new_tip,
                RebaseOutcome::Rebased {
                    tip: new_tip,
                    replayed: commits.len(),
                },
            )
        }
    };

    repo.ensure_clean_for(&flatten_commit(odb, &new_tip)?)?;
    repo.checkout_commit(&new_tip)?;
    repo.update_head(&new_tip)?;
    tracing::info!(%onto, %new_tip, "rebased");
    Ok(outcome)
}
