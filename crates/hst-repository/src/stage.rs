//! Staging: add, status and restore.

use std::collections::BTreeSet;
use std::fs;

use bstr::{BString, ByteSlice};
use hst_diff::{classify, Classification};
use hst_index::Pathspec;
use hst_object::{Blob, Object};
use hst_odb::ObjectStoreExt;
use tracing::instrument;

use crate::{RepoError, Repository};

impl Repository {
    /// Stage the live state of every path matching `spec`.
    ///
    /// Matching files are stored as blobs and recorded in the index; indexed
    /// paths that match but no longer exist are dropped. Each path in `spec`
    /// must match something live or staged.
    #[instrument(skip(self, spec), level = "debug")]
    pub fn add(&self, spec: &Pathspec) -> Result<usize, RepoError> {
        let mut index = self.index()?;
        let mut seen = BTreeSet::new();
        let mut staged = 0;

        self.walk_files(&mut |rel, abs| {
            if !spec.matches(rel.as_bstr()) {
                return Ok(());
            }
            let data = fs::read(abs)?;
            let oid = self.odb.put(&Object::Blob(Blob::new(data)))?;
            if index.insert(rel.clone(), oid) != Some(oid) {
                staged += 1;
            }
            seen.insert(rel);
            Ok(())
        })?;

        let vanished: Vec<BString> = index
            .iter()
            .filter(|(path, _)| spec.matches(path.as_bstr()) && !seen.contains(*path))
            .map(|(path, _)| path.clone())
            .collect();
        for path in &vanished {
            index.remove(path.as_bstr());
            staged += 1;
        }

        for wanted in spec.paths() {
            let one = Pathspec::new([wanted.clone()]);
            let matched = seen.iter().chain(&vanished).any(|p| one.matches(p.as_bstr()));
            if !matched {
                return Err(RepoError::PathspecNoMatch(wanted.to_string()));
            }
        }

        self.write_index(&index)?;
        tracing::debug!(staged, "updated index");
        Ok(staged)
    }

    /// Compare HEAD's tree, the index and the working tree.
    #[instrument(skip(self), level = "debug")]
    pub fn status(&self) -> Result<Classification, RepoError> {
        let recorded = self.head_tree()?;
        let index = self.index()?;
        let live = self.scan_worktree()?;
        Ok(classify(&recorded, index.entries(), &live))
    }

    /// Overwrite live files matching `spec` with their staged content.
    pub fn restore_worktree(&self, spec: &Pathspec) -> Result<usize, RepoError> {
        let index = self.index()?;
        let mut restored = 0;
        for (path, oid) in index.iter().filter(|(p, _)| spec.matches(p.as_bstr())) {
            self.write_worktree_file(path.as_bstr(), oid)?;
            restored += 1;
        }
        if restored == 0 {
            return Err(no_match(spec));
        }
        Ok(restored)
    }

    /// Reset index entries matching `spec` to HEAD's version, dropping those
    /// HEAD does not have. The working tree is not touched.
    pub fn restore_staged(&self, spec: &Pathspec) -> Result<usize, RepoError> {
        let recorded = self.head_tree()?;
        let mut index = self.index()?;

        let paths: BTreeSet<BString> = index
            .entries()
            .keys()
            .chain(recorded.keys())
            .filter(|p| spec.matches(p.as_bstr()))
            .cloned()
            .collect();
        if paths.is_empty() {
            return Err(no_match(spec));
        }

        for path in &paths {
            match recorded.get(path) {
                Some(oid) => {
                    index.insert(path.clone(), *oid);
                }
                None => {
                    index.remove(path.as_bstr());
                }
            }
        }
        self.write_index(&index)?;
        Ok(paths.len())
    }
}

fn no_match(spec: &Pathspec) -> RepoError {
    let shown = spec
        .paths()
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    RepoError::PathspecNoMatch(shown)
}
