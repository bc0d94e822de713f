use bstr::{BString, ByteSlice};
use hst_diff::{flatten_commit, write_tree};
use hst_hash::ObjectId;
use hst_index::{Index, Pathspec};
use hst_odb::ObjectStore;
use hst_repository::Repository;
use hst_revwalk::{is_ancestor, merge_base};
use tracing::instrument;

use crate::conflict::has_conflict_markers;
use crate::state::{self, MergeState};
use crate::tree::merge_trees;
use crate::{MergeError, MergeOptions};

/// How two commits relate, decided before any tree is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePlan {
    /// `target` is already contained in `current`.
    UpToDate,
    /// `current` is an ancestor of `target`; only the pointer moves.
    FastForward,
    /// The histories diverged from `base`.
    ThreeWay { base: ObjectId },
}

/// Classify merging `target` into `current`.
///
/// Fails with [`MergeError::NoMergeBase`] when the histories share no commit.
pub fn plan_merge<S: ObjectStore + ?Sized>(
    store: &S,
    current: &ObjectId,
    target: &ObjectId,
) -> Result<MergePlan, MergeError> {
    if is_ancestor(store, target, current)? {
        return Ok(MergePlan::UpToDate);
    }
    if is_ancestor(store, current, target)? {
        return Ok(MergePlan::FastForward);
    }
    let base = merge_base(store, current, target)?.ok_or(MergeError::NoMergeBase)?;
    Ok(MergePlan::ThreeWay { base })
}

/// What [`merge`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    UpToDate,
    FastForward { from: ObjectId, to: ObjectId },
    Merged { commit: ObjectId },
    /// The merge stopped; the conflicted paths hold marker text.
    Conflicted { conflicts: Vec<BString> },
}

/// Merge the commit named by `target` into HEAD.
///
/// A fast-forward checks out the target and moves HEAD. A three-way merge
/// writes the merged snapshot to the working tree and index, then either
/// commits it with parents `[HEAD, target]` or, when paths conflict, records
/// the merge state and stops.
#[instrument(skip(repo, options), level = "debug")]
pub fn merge(
    repo: &Repository,
    target: &str,
    options: &MergeOptions,
) -> Result<MergeOutcome, MergeError> {
    if MergeState::load(repo.hst_dir())?.is_in_progress() {
        return Err(MergeError::MergeInProgress);
    }
    let current = repo.head_commit()?;
    let target_oid = repo.resolve(target)?;
    let odb = repo.odb();

    match plan_merge(odb, &current, &target_oid)? {
        MergePlan::UpToDate => Ok(MergeOutcome::UpToDate),
        MergePlan::FastForward => {
            let files = flatten_commit(odb, &target_oid)?;
            repo.ensure_clean_for(&files)?;
            repo.checkout_commit(&target_oid)?;
            repo.update_head(&target_oid)?;
            tracing::info!(from = %current, to = %target_oid, "fast-forward");
            Ok(MergeOutcome::FastForward {
                from: current,
                to: target_oid,
            })
        }
        MergePlan::ThreeWay { .. } if options.fast_forward_only => Err(MergeError::Diverged {
            current,
            target: target_oid,
        }),
        MergePlan::ThreeWay { base } => {
            tracing::info!(%base, %current, target = %target_oid, "three-way merge");
            let result = merge_trees(
                odb,
                &flatten_commit(odb, &base)?,
                &flatten_commit(odb, &current)?,
                &flatten_commit(odb, &target_oid)?,
            )?;
            repo.ensure_clean_for(&result.merged)?;
            repo.checkout_tree(&result.merged)?;
            repo.write_index(&Index::from_map(result.merged.clone()))?;

            if !result.is_clean() {
                state::save(repo.hst_dir(), &current, &target_oid, &result.conflicts)?;
                return Ok(MergeOutcome::Conflicted {
                    conflicts: result.conflicts,
                });
            }

            let tree = write_tree(odb, &result.merged)?;
            let into = repo.current_branch()?.unwrap_or_else(|| "HEAD".to_string());
            let message = format!("Merge branch '{target}' into {into}\n");
            let signature = repo.signature();
            let commit = repo.write_commit(
                tree,
                vec![current, target_oid],
                signature.clone(),
                signature,
                message,
            )?;
            Ok(MergeOutcome::Merged { commit })
        }
    }
}

/// Finish a conflicted merge.
///
/// Every tracked file is re-read from the working tree. If any still holds
/// both conflict delimiters the merge is refused and nothing changes;
/// otherwise the files are staged and committed with parents
/// `[HEAD, MERGE_HEAD]`.
#[instrument(skip(repo), level = "debug")]
pub fn continue_merge(repo: &Repository) -> Result<MergeState, MergeError> {
    let MergeState::ThreeWayInProgress { target, .. } = MergeState::load(repo.hst_dir())? else {
        return Err(MergeError::NoMergeInProgress);
    };

    let index = repo.index()?;
    let mut unresolved = Vec::new();
    for path in index.entries().keys() {
        if let Some(data) = repo.read_worktree_file(path.as_bstr())? {
            if has_conflict_markers(&data) {
                unresolved.push(path.clone());
            }
        }
    }
    if !unresolved.is_empty() {
        return Err(MergeError::UnresolvedConflicts(unresolved));
    }

    if !index.is_empty() {
        repo.add(&Pathspec::new(index.entries().keys().cloned()))?;
    }
    let staged = repo.index()?;
    let tree = write_tree(repo.odb(), staged.entries())?;

    let current = repo.head_commit()?;
    let message = state::pending_message(repo.hst_dir())?
        .unwrap_or_else(|| BString::from("Merge commit\n"));
    let signature = repo.signature();
    let commit = repo.write_commit(
        tree,
        vec![current, target],
        signature.clone(),
        signature,
        message,
    )?;
    state::clear(repo.hst_dir())?;
    tracing::info!(%commit, "merge concluded");
    Ok(MergeState::Resolved(commit))
}

/// Drop a conflicted merge and restore the pre-merge commit into the working
/// tree and index.
#[instrument(skip(repo), level = "debug")]
pub fn abort_merge(repo: &Repository) -> Result<MergeState, MergeError> {
    if !MergeState::load(repo.hst_dir())?.is_in_progress() {
        return Err(MergeError::NoMergeInProgress);
    }
    let orig = match state::orig_head(repo.hst_dir())? {
        Some(oid) => oid,
        None => repo.head_commit()?,
    };
    repo.checkout_commit(&orig)?;
    repo.update_head(&orig)?;
    state::clear(repo.hst_dir())?;
    tracing::info!(%orig, "merge aborted");
    Ok(MergeState::Aborted)
}
