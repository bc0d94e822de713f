use std::collections::HashSet;

use hst_hash::ObjectId;
use hst_ref::{RefName, RefStore};
use hst_repository::Repository;
use hst_revwalk::is_ancestor;
use tracing::instrument;

use crate::refspec::Refspec;
use crate::remote::open_remote;
use crate::transfer::{send_objects, StoreTransfer};
use crate::TransferError;

/// One ref moved by [`fetch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefUpdate {
    /// Ref on the remote side.
    pub source: String,
    /// Local ref that was written.
    pub destination: String,
    pub old: Option<ObjectId>,
    pub new: ObjectId,
}

/// Copy branches of `remote` into local refs.
///
/// With no `refspecs`, the remote's configured fetch refspecs are used,
/// falling back to mapping every remote branch onto
/// `refs/remotes/<remote>/<branch>`. Refs already at the remote's commit are
/// left alone; an empty result means everything was up to date.
#[instrument(skip(repo, refspecs), level = "debug")]
pub fn fetch(
    repo: &Repository,
    remote: &str,
    refspecs: &[Refspec],
) -> Result<Vec<RefUpdate>, TransferError> {
    let (_url, source) = open_remote(repo, remote)?;
    let specs = if refspecs.is_empty() {
        configured_refspecs(repo, remote)?
    } else {
        refspecs.iter().map(|s| s.qualify_for_fetch(remote)).collect()
    };

    let remote_refs: Vec<(String, ObjectId)> = source
        .refs()
        .iter(Some("refs/heads/"))?
        .into_iter()
        .filter_map(|r| Some((r.name().as_str().to_string(), r.target_oid()?)))
        .collect();

    let transfer = StoreTransfer::new(source.odb(), repo.odb());
    let mut written = HashSet::new();
    let mut updates = Vec::new();

    for spec in &specs {
        let mut matched = false;
        for (name, oid) in &remote_refs {
            let Some(destination) = spec.map(name) else {
                continue;
            };
            matched = true;
            if !written.insert(destination.clone()) {
                continue;
            }

            let refname = RefName::new(destination.as_str())?;
            let old = repo.refs().resolve_to_oid(&refname)?;
            if old == Some(*oid) {
                continue;
            }
            send_objects(&transfer, source.odb(), oid)?;
            if let Some(old) = old {
                if !spec.force && !is_ancestor(repo.odb(), &old, oid)? {
                    return Err(TransferError::NotFastForward(destination));
                }
            }
            repo.refs().write_ref(&refname, oid)?;
            tracing::info!(from = %name, to = %destination, %oid, "fetched");
            updates.push(RefUpdate {
                source: name.clone(),
                destination,
                old,
                new: *oid,
            });
        }
        if !matched && !spec.is_pattern() {
            return Err(TransferError::RemoteRefNotFound(spec.source.clone()));
        }
    }
    Ok(updates)
}

fn configured_refspecs(repo: &Repository, remote: &str) -> Result<Vec<Refspec>, TransferError> {
    let configured = repo
        .config()
        .remote(remote)
        .map(|r| r.fetch)
        .unwrap_or_default();
    if configured.is_empty() {
        return Ok(vec![Refspec::default_fetch(remote)]);
    }
    configured.iter().map(|s| Refspec::parse(s)).collect()
}
