use std::path::Path;

use hst_repository::Repository;

use crate::TransferError;

/// Open the repository behind remote `name` of `repo`.
///
/// Remote URLs are filesystem paths; relative ones are taken from the work
/// tree root of `repo`.
pub fn open_remote(repo: &Repository, name: &str) -> Result<(String, Repository), TransferError> {
    let url = repo
        .remote_url(name)
        .ok_or_else(|| TransferError::NoSuchRemote(name.to_string()))?
        .to_string();
    let path = repo.work_tree().join(Path::new(&url));
    let remote = Repository::open(&path).map_err(|source| TransferError::UnreachableRemote {
        url: url.clone(),
        source,
    })?;
    tracing::debug!(remote = name, path = %remote.work_tree().display(), "opened remote");
    Ok((url, remote))
}
