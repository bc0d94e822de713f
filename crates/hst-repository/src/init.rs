use std::fs;
use std::path::{Path, PathBuf};

use crate::{RepoError, DEFAULT_BRANCH, HST_DIR};

const CONFIG: &str = "[core]\n\trepositoryformatversion = 0\n\tfilemode = true\n\tbare = false\n";

const DESCRIPTION: &str =
    "Unnamed repository; edit this file 'description' to name the repository.\n";

const EXCLUDE: &str = "# Paths listed here are never tracked.\n# Lines that start with '#' are comments.\n";

/// Create the `.hst/` structure under `path` and return the work tree root.
///
/// Creates:
/// - HEAD (pointing to `main`)
/// - config
/// - description
/// - hooks/
/// - info/exclude
/// - objects/info/, objects/pack/
/// - refs/heads/, refs/tags/
pub(crate) fn init_repository(path: &Path) -> Result<PathBuf, RepoError> {
    let path = if path.is_relative() {
        std::env::current_dir()?.join(path)
    } else {
        path.to_path_buf()
    };

    let hst_dir = path.join(HST_DIR);
    if hst_dir.exists() {
        return Err(RepoError::AlreadyExists(hst_dir));
    }

    fs::create_dir_all(hst_dir.join("objects").join("info"))?;
    fs::create_dir_all(hst_dir.join("objects").join("pack"))?;
    fs::create_dir_all(hst_dir.join("refs").join("heads"))?;
    fs::create_dir_all(hst_dir.join("refs").join("tags"))?;
    fs::create_dir_all(hst_dir.join("hooks"))?;
    fs::create_dir_all(hst_dir.join("info"))?;

    fs::write(
        hst_dir.join("HEAD"),
        format!("ref: refs/heads/{DEFAULT_BRANCH}\n"),
    )?;
    fs::write(hst_dir.join("config"), CONFIG)?;
    fs::write(hst_dir.join("description"), DESCRIPTION)?;
    fs::write(hst_dir.join("info").join("exclude"), EXCLUDE)?;

    tracing::info!(path = %hst_dir.display(), "initialized empty repository");
    Ok(path)
}
