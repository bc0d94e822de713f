//! The live working tree: scanning, reading and writing files, checkout.

use std::fs;
use std::path::{Path, PathBuf};

use bstr::{BStr, BString, ByteSlice, ByteVec};
use hst_diff::{classify, flatten_commit, PathMap};
use hst_hash::{Hasher, ObjectId};
use hst_index::Index;
use hst_object::ObjectType;
use hst_odb::ObjectStoreExt;
use tracing::instrument;

use crate::{RepoError, Repository, HST_DIR};

impl Repository {
    /// Absolute location of a repository-relative path.
    ///
    /// Rejects empty, `.` and `..` components and anything inside `.hst`.
    pub fn work_path(&self, path: &BStr) -> Result<PathBuf, RepoError> {
        let invalid = || RepoError::InvalidPath(path.to_owned());
        let mut full = self.work_tree.clone();
        for component in path.split_str("/") {
            if component.is_empty()
                || component == b"."
                || component == b".."
                || component == HST_DIR.as_bytes()
            {
                return Err(invalid());
            }
            full.push(component.to_path().map_err(|_| invalid())?);
        }
        Ok(full)
    }

    /// Visit every live file below the work tree root, skipping `.hst`.
    /// Paths handed to `visit` are repository-relative and `/`-separated.
    pub(crate) fn walk_files(
        &self,
        visit: &mut dyn FnMut(BString, &Path) -> Result<(), RepoError>,
    ) -> Result<(), RepoError> {
        let mut pending = vec![(BString::default(), self.work_tree.clone())];
        while let Some((prefix, dir)) = pending.pop() {
            let mut entries = fs::read_dir(&dir)?.collect::<Result<Vec<_>, _>>()?;
            entries.sort_by_key(|e| e.file_name());

            for entry in entries {
                let name = entry.file_name();
                if name == HST_DIR {
                    continue;
                }
                let Some(name) = <[u8]>::from_os_str(&name) else {
                    tracing::warn!(path = %entry.path().display(), "skipping non-UTF-8 path");
                    continue;
                };
                let mut rel = prefix.clone();
                if !rel.is_empty() {
                    rel.push_byte(b'/');
                }
                rel.push_str(name);

                let file_type = entry.file_type()?;
                if file_type.is_dir() {
                    pending.push((rel, entry.path()));
                } else if file_type.is_file() {
                    visit(rel, &entry.path())?;
                } else {
                    tracing::warn!(path = %rel, "skipping special file");
                }
            }
        }
        Ok(())
    }

    /// Flat `path -> blob id` map of the live files. Content is hashed but
    /// not stored.
    #[instrument(skip(self), level = "debug")]
    pub fn scan_worktree(&self) -> Result<PathMap, RepoError> {
        let mut live = PathMap::new();
        self.walk_files(&mut |rel, abs| {
            let data = fs::read(abs)?;
            let oid = Hasher::hash_object(ObjectType::Blob.as_str(), &data)?;
            live.insert(rel, oid);
            Ok(())
        })?;
        tracing::debug!(files = live.len(), "scanned working tree");
        Ok(live)
    }

    /// Content of a live file, `None` when it does not exist.
    pub fn read_worktree_file(&self, path: &BStr) -> Result<Option<Vec<u8>>, RepoError> {
        match fs::read(self.work_path(path)?) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write blob `oid` to the live file at `path`, creating parent directories.
    pub fn write_worktree_file(&self, path: &BStr, oid: &ObjectId) -> Result<(), RepoError> {
        let blob = self.odb.read_blob(oid)?;
        let full = self.work_path(path)?;
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        if full.is_dir() {
            fs::remove_dir_all(&full)?;
        }
        fs::write(&full, &blob.data)?;
        Ok(())
    }

    /// Delete the live file at `path` and any directories left empty.
    pub fn remove_worktree_file(&self, path: &BStr) -> Result<(), RepoError> {
        let full = self.work_path(path)?;
        match fs::remove_file(&full) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        }
        let mut dir = full.parent();
        while let Some(d) = dir {
            if d == self.work_tree || fs::remove_dir(d).is_err() {
                break;
            }
            dir = d.parent();
        }
        Ok(())
    }

    /// Make the working tree match `target`.
    ///
    /// Tracked files absent from `target` are deleted; every file in `target`
    /// is written. Untracked files are left alone. The index is not touched.
    #[instrument(skip(self, target), level = "debug")]
    pub fn checkout_tree(&self, target: &PathMap) -> Result<(), RepoError> {
        let index = self.index()?;
        for path in index.entries().keys() {
            if !target.contains_key(path) {
                self.remove_worktree_file(path.as_bstr())?;
            }
        }
        for (path, oid) in target {
            self.write_worktree_file(path.as_bstr(), oid)?;
        }
        tracing::debug!(files = target.len(), "checked out tree");
        Ok(())
    }

    /// Check out the tree of commit `oid` into the working tree and index.
    /// HEAD is not moved.
    pub fn checkout_commit(&self, oid: &ObjectId) -> Result<(), RepoError> {
        let target = flatten_commit(&self.odb, oid)?;
        self.checkout_tree(&target)?;
        self.write_index(&Index::from_map(target))?;
        Ok(())
    }

    /// Refuse when moving to `target` would lose work: staged or unstaged
    /// changes to tracked files, or untracked files `target` would overwrite.
    pub fn ensure_clean_for(&self, target: &PathMap) -> Result<(), RepoError> {
        let live = self.scan_worktree()?;
        let status = classify(&self.head_tree()?, self.index()?.entries(), &live);

        let overwritten = status
            .untracked
            .into_iter()
            .filter(|path| target.get(path).is_some_and(|oid| live.get(path) != Some(oid)));
        let mut dirty: Vec<BString> = status
            .to_commit
            .into_iter()
            .chain(status.to_stage)
            .map(|change| change.path)
            .chain(overwritten)
            .collect();

        if dirty.is_empty() {
            Ok(())
        } else {
            dirty.sort();
            dirty.dedup();
            Err(RepoError::LocalChanges(dirty))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hst_object::{Blob, Object};

    fn repo() -> (tempfile::TempDir, Repository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        (dir, repo)
    }

    #[test]
    fn scan_skips_metadata_and_hashes_content() {
        let (_dir, repo) = repo();
        fs::create_dir_all(repo.work_tree().join("src")).unwrap();
        fs::write(repo.work_tree().join("src/lib.rs"), "x").unwrap();
        fs::write(repo.work_tree().join("README"), "hello").unwrap();

        let live = repo.scan_worktree().unwrap();
        let paths: Vec<_> = live.keys().map(|p| p.to_string()).collect();
        assert_eq!(paths, ["README", "src/lib.rs"]);
        assert_eq!(
            live[&BString::from("README")],
            Hasher::hash_object("blob", b"hello").unwrap()
        );
        // Hashing does not store.
        assert!(!repo.odb().exists(&live[&BString::from("README")]));
    }

    #[test]
    fn work_path_rejects_escapes() {
        let (_dir, repo) = repo();
        for bad in ["../x", "a/../b", ".hst/HEAD", "", "a//b", "./a"] {
            assert!(
                matches!(repo.work_path(bad.into()), Err(RepoError::InvalidPath(_))),
                "{bad}"
            );
        }
        assert_eq!(
            repo.work_path("a/b".into()).unwrap(),
            repo.work_tree().join("a").join("b")
        );
    }

    #[test]
    fn remove_prunes_empty_directories() {
        let (_dir, repo) = repo();
        let oid = repo.odb().put(&Object::Blob(Blob::new(b"x".to_vec()))).unwrap();
        repo.write_worktree_file("a/b/c.txt".into(), &oid).unwrap();
        assert_eq!(fs::read(repo.work_tree().join("a/b/c.txt")).unwrap(), b"x");

        repo.remove_worktree_file("a/b/c.txt".into()).unwrap();
        assert!(!repo.work_tree().join("a").exists());
        assert!(repo.work_tree().exists());
        // Missing files are not an error.
        repo.remove_worktree_file("a/b/c.txt".into()).unwrap();
    }

    #[test]
    fn checkout_tree_removes_only_tracked_files() {
        let (_dir, repo) = repo();
        let one = repo.odb().put(&Object::Blob(Blob::new(b"1".to_vec()))).unwrap();
        let two = repo.odb().put(&Object::Blob(Blob::new(b"2".to_vec()))).unwrap();

        let mut index = Index::new();
        index.insert("tracked", one);
        repo.write_index(&index).unwrap();
        fs::write(repo.work_tree().join("tracked"), "1").unwrap();
        fs::write(repo.work_tree().join("untracked"), "u").unwrap();

        let mut target = PathMap::new();
        target.insert("dir/new".into(), two);
        repo.checkout_tree(&target).unwrap();

        assert!(!repo.work_tree().join("tracked").exists());
        assert!(repo.work_tree().join("untracked").exists());
        assert_eq!(fs::read(repo.work_tree().join("dir/new")).unwrap(), b"2");
    }
}
