use std::path::{Path, PathBuf};

use crate::{RepoError, HST_DIR};

/// Walk up from `start` until a directory containing `.hst/` is found and
/// return that directory (the work tree root).
pub(crate) fn discover_work_tree(start: &Path) -> Result<PathBuf, RepoError> {
    let start =
        std::fs::canonicalize(start).map_err(|_| RepoError::NotFound(start.to_path_buf()))?;

    let mut current = start.as_path();
    loop {
        if is_work_tree(current) {
            return Ok(current.to_path_buf());
        }
        match current.parent() {
            Some(parent) if parent != current => current = parent,
            _ => return Err(RepoError::NotFound(start)),
        }
    }
}

/// `path` holds a `.hst/` directory with a HEAD file and an object directory.
pub(crate) fn is_work_tree(path: &Path) -> bool {
    let hst = path.join(HST_DIR);
    hst.join("HEAD").is_file() && hst.join("objects").is_dir()
}
