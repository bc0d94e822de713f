use std::fs;
use std::path::Path;

use hst_ref::{RefName, RefStore};
use hst_repository::{Head, Repository};
use tracing::instrument;

use crate::transfer::{send_objects, StoreTransfer};
use crate::TransferError;

const ORIGIN: &str = "origin";

/// Create a new repository at `dest` holding every branch of `source`.
///
/// The source is registered as remote `origin`, each of its branches gets a
/// remote-tracking ref, and its checked-out branch is created locally and
/// checked out.
#[instrument(level = "debug")]
pub fn clone(source: &Path, dest: &Path) -> Result<Repository, TransferError> {
    let origin = Repository::open(source).map_err(|e| TransferError::UnreachableRemote {
        url: source.display().to_string(),
        source: e,
    })?;
    if dest.exists() && (!dest.is_dir() || fs::read_dir(dest)?.next().is_some()) {
        return Err(TransferError::DestinationNotEmpty(dest.to_path_buf()));
    }

    let mut repo = Repository::init(dest)?;
    repo.add_remote(ORIGIN, &origin.work_tree().display().to_string())?;

    let transfer = StoreTransfer::new(origin.odb(), repo.odb());
    let mut copied = 0;
    for (branch, oid) in origin.branches()? {
        copied += send_objects(&transfer, origin.odb(), &oid)?;
        repo.refs()
            .write_ref(&RefName::remote_tracking(ORIGIN, &branch)?, &oid)?;
    }

    match origin.head()? {
        Head::Branch { name, oid: Some(oid) } => {
            repo.create_branch(&name, &oid)?;
            repo.set_head_branch(&name)?;
            repo.checkout_commit(&oid)?;
        }
        Head::Branch { name, oid: None } => repo.set_head_branch(&name)?,
        Head::Detached(oid) => {
            copied += send_objects(&transfer, origin.odb(), &oid)?;
            repo.detach_head(&oid)?;
            repo.checkout_commit(&oid)?;
        }
    }

    tracing::info!(
        source = %origin.work_tree().display(),
        dest = %repo.work_tree().display(),
        copied,
        "cloned"
    );
    Ok(repo)
}
