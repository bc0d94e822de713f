//! Whole-file replacement for mutable repository state.
//!
//! Refs, HEAD, the index, the config and the merge bookkeeping files are never
//! edited in place. The new bytes go to a `<name>.lock` sibling that only one
//! writer can create, and the sibling is renamed over the target once synced.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::UtilError;
use crate::Result;

/// An exclusively created `<path>.lock`; removed again unless
/// [`replace`](StateLock::replace) succeeds.
pub struct StateLock {
    target: PathBuf,
    lock: PathBuf,
    file: File,
    done: bool,
}

impl StateLock {
    /// Claim `target` for rewriting, creating missing parent directories.
    pub fn claim(target: &Path) -> Result<Self> {
        if let Some(dir) = target.parent() {
            fs::create_dir_all(dir)?;
        }
        let lock = sibling_lock(target);
        let file = match OpenOptions::new().write(true).create_new(true).open(&lock) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                tracing::warn!(lock = %lock.display(), "state file is locked");
                return Err(UtilError::Locked(target.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            target: target.to_path_buf(),
            lock,
            file,
            done: false,
        })
    }

    /// Write `contents` and move them into place.
    pub fn replace(mut self, contents: &[u8]) -> Result<()> {
        let replace_err = |source| UtilError::Replace {
            path: self.target.clone(),
            source,
        };
        self.file.write_all(contents).map_err(replace_err)?;
        self.file.sync_all().map_err(replace_err)?;
        fs::rename(&self.lock, &self.target).map_err(replace_err)?;
        self.done = true;
        tracing::trace!(path = %self.target.display(), bytes = contents.len(), "replaced");
        Ok(())
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        if !self.done {
            let _ = fs::remove_file(&self.lock);
        }
    }
}

/// Replace the file at `path` with `contents`.
pub fn write_atomic(path: impl AsRef<Path>, contents: &[u8]) -> Result<()> {
    StateLock::claim(path.as_ref())?.replace(contents)
}

fn sibling_lock(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_os_string();
    name.push(".lock");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_head_and_leaves_no_lock() {
        let dir = tempfile::tempdir().unwrap();
        let head = dir.path().join("HEAD");
        fs::write(&head, "ref: refs/heads/main\n").unwrap();

        write_atomic(&head, b"ref: refs/heads/topic\n").unwrap();
        assert_eq!(fs::read_to_string(&head).unwrap(), "ref: refs/heads/topic\n");
        assert!(!dir.path().join("HEAD.lock").exists());
    }

    #[test]
    fn abandoned_claim_keeps_the_old_contents() {
        let dir = tempfile::tempdir().unwrap();
        let index = dir.path().join("index");
        fs::write(&index, "{}").unwrap();

        drop(StateLock::claim(&index).unwrap());
        assert!(!dir.path().join("index.lock").exists());
        assert_eq!(fs::read_to_string(&index).unwrap(), "{}");
    }

    #[test]
    fn concurrent_writer_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let branch = dir.path().join("refs/heads/main");

        let held = StateLock::claim(&branch).unwrap();
        assert!(matches!(write_atomic(&branch, b"x"), Err(UtilError::Locked(p)) if p == branch));
        held.replace(b"first\n").unwrap();
        write_atomic(&branch, b"second\n").unwrap();
        assert_eq!(fs::read_to_string(&branch).unwrap(), "second\n");
    }

    #[test]
    fn parents_are_created() {
        let dir = tempfile::tempdir().unwrap();
        let tracking = dir.path().join("refs/remotes/origin/main");
        write_atomic(&tracking, b"abc\n").unwrap();
        assert_eq!(fs::read(&tracking).unwrap(), b"abc\n");
    }
}
