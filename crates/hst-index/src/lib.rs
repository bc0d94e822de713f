//! The staging index.
//!
//! The index records what the next commit's tree will contain: repository
//! path to blob id. It is the one mutable, non-content-addressed piece of
//! state, read and rewritten wholesale by staging operations.
//!
//! On disk it is a JSON object of `"path": "<40-hex>"` pairs, pretty-printed
//! with sorted keys.

mod pathspec;

pub use pathspec::Pathspec;

use std::collections::BTreeMap;
use std::path::Path;

use bstr::{BStr, BString, ByteSlice};
use hst_hash::ObjectId;
use hst_object::PathMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("invalid index file: {0}")]
    Format(#[from] serde_json::Error),

    #[error("invalid object id for '{path}': {source}")]
    InvalidOid {
        path: String,
        #[source]
        source: hst_hash::HashError,
    },

    #[error("path is not valid UTF-8: {0}")]
    NonUtf8Path(BString),

    #[error(transparent)]
    Util(#[from] hst_utils::UtilError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Serialize, Deserialize)]
#[serde(transparent)]
struct OnDisk(BTreeMap<String, String>);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Index {
    entries: PathMap,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(entries: PathMap) -> Self {
        Self { entries }
    }

    /// Load from `path`. A missing file is an empty index.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, IndexError> {
        let data = match std::fs::read(path.as_ref()) {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(e) => return Err(e.into()),
        };
        Self::from_json(&data)
    }

    /// Replace the file at `path` through a lock file.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), IndexError> {
        hst_utils::lockfile::write_atomic(path.as_ref(), &self.to_json()?)?;
        tracing::debug!(entries = self.entries.len(), "wrote index");
        Ok(())
    }

    pub fn from_json(data: &[u8]) -> Result<Self, IndexError> {
        let OnDisk(raw) = serde_json::from_slice(data)?;
        let mut entries = PathMap::new();
        for (path, hex) in raw {
            let oid = ObjectId::from_hex(&hex)
                .map_err(|source| IndexError::InvalidOid { path: path.clone(), source })?;
            entries.insert(BString::from(path), oid);
        }
        Ok(Self { entries })
    }

    pub fn to_json(&self) -> Result<Vec<u8>, IndexError> {
        let mut raw = BTreeMap::new();
        for (path, oid) in &self.entries {
            let path = path
                .to_str()
                .map_err(|_| IndexError::NonUtf8Path(path.clone()))?;
            raw.insert(path.to_owned(), oid.to_hex());
        }
        Ok(serde_json::to_vec_pretty(&OnDisk(raw))?)
    }

    pub fn get(&self, path: &BStr) -> Option<&ObjectId> {
        self.entries.get(path)
    }

    pub fn contains(&self, path: &BStr) -> bool {
        self.entries.contains_key(path)
    }

    /// Stage `oid` at `path`, replacing any previous entry.
    pub fn insert(&mut self, path: impl Into<BString>, oid: ObjectId) -> Option<ObjectId> {
        self.entries.insert(path.into(), oid)
    }

    pub fn remove(&mut self, path: &BStr) -> Option<ObjectId> {
        self.entries.remove(path)
    }

    /// Drop every entry matched by `spec`; returns how many were removed.
    pub fn remove_matching(&mut self, spec: &Pathspec) -> usize {
        let before = self.entries.len();
        self.entries.retain(|path, _| !spec.matches(path.as_bstr()));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BString, &ObjectId)> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &PathMap {
        &self.entries
    }

    pub fn into_map(self) -> PathMap {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO: &str = "ce013625030ba8dba906f756967f9e9ca394464a";

    fn oid() -> ObjectId {
        ObjectId::from_hex(HELLO).unwrap()
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let index = Index::load(dir.path().join("index")).unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn json_layout() {
        let mut index = Index::new();
        index.insert("src/main.rs", oid());
        index.insert("a.txt", oid());
        let json = String::from_utf8(index.to_json().unwrap()).unwrap();
        assert_eq!(
            json,
            format!("{{\n  \"a.txt\": \"{HELLO}\",\n  \"src/main.rs\": \"{HELLO}\"\n}}")
        );
    }

    #[test]
    fn write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index");
        let mut index = Index::new();
        index.insert("dir/file", oid());
        index.write(&path).unwrap();

        let loaded = Index::load(&path).unwrap();
        assert_eq!(loaded, index);
        assert_eq!(loaded.get(b"dir/file".as_bstr()), Some(&oid()));
    }

    #[test]
    fn rejects_bad_ids() {
        assert!(matches!(
            Index::from_json(br#"{"a": "zz"}"#).unwrap_err(),
            IndexError::InvalidOid { .. }
        ));
        assert!(matches!(
            Index::from_json(b"[1, 2]").unwrap_err(),
            IndexError::Format(_)
        ));
    }

    #[test]
    fn remove_matching_directory() {
        let mut index = Index::new();
        for path in ["src/a.rs", "src/b/c.rs", "srcx", "README"] {
            index.insert(path, oid());
        }
        let removed = index.remove_matching(&Pathspec::new(["src"]));
        assert_eq!(removed, 2);
        let left: Vec<_> = index.iter().map(|(p, _)| p.to_string()).collect();
        assert_eq!(left, ["README", "srcx"]);
    }
}
