use bstr::{BStr, BString, ByteSlice};
use hst_hash::{ObjectId, DIGEST_LEN};

use crate::ObjectError;

/// Kind of a tree entry, stored as an octal string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileMode {
    /// `100644`
    Regular,
    /// `100755`
    Executable,
    /// `120000`
    Symlink,
    /// `40000` (`040000` is accepted on input)
    Tree,
}

impl FileMode {
    pub fn from_bytes(s: &[u8]) -> Result<Self, ObjectError> {
        let invalid = || ObjectError::InvalidFileMode(String::from_utf8_lossy(s).into_owned());
        match parse_octal(s).ok_or_else(invalid)? {
            0o100644 => Ok(Self::Regular),
            0o100755 => Ok(Self::Executable),
            0o120000 => Ok(Self::Symlink),
            0o040000 => Ok(Self::Tree),
            _ => Err(invalid()),
        }
    }

    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            Self::Regular => b"100644",
            Self::Executable => b"100755",
            Self::Symlink => b"120000",
            Self::Tree => b"40000",
        }
    }

    pub fn is_tree(&self) -> bool {
        matches!(self, Self::Tree)
    }

    pub fn is_blob(&self) -> bool {
        !self.is_tree()
    }
}

fn parse_octal(s: &[u8]) -> Option<u32> {
    if s.is_empty() || s.len() > 7 {
        return None;
    }
    s.iter().try_fold(0u32, |acc, &b| match b {
        b'0'..=b'7' => Some(acc * 8 + u32::from(b - b'0')),
        _ => None,
    })
}

/// One `(mode, name, oid)` row of a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub mode: FileMode,
    pub name: BString,
    pub oid: ObjectId,
}

impl TreeEntry {
    pub fn new(mode: FileMode, name: impl Into<BString>, oid: ObjectId) -> Self {
        Self {
            mode,
            name: name.into(),
            oid,
        }
    }
}

/// A directory listing.
///
/// Entries are kept sorted by name and names are unique, so the encoding (and
/// therefore the identity) depends only on the set of entries, never on the
/// order they were added in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tree {
    entries: Vec<TreeEntry>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from entries in any order. Fails on a repeated name.
    pub fn from_entries(entries: impl IntoIterator<Item = TreeEntry>) -> Result<Self, ObjectError> {
        let mut entries: Vec<TreeEntry> = entries.into_iter().collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        if let Some(dup) = entries.windows(2).find(|w| w[0].name == w[1].name) {
            return Err(ObjectError::DuplicateTreeEntry(dup[0].name.clone()));
        }
        Ok(Self { entries })
    }

    /// Add or replace the entry with this name.
    pub fn insert(&mut self, entry: TreeEntry) {
        match self.entries.binary_search_by(|e| e.name.cmp(&entry.name)) {
            Ok(pos) => self.entries[pos] = entry,
            Err(pos) => self.entries.insert(pos, entry),
        }
    }

    /// Decode `mode SP name NUL <20 raw bytes>` records.
    pub fn parse(content: &[u8]) -> Result<Self, ObjectError> {
        let mut entries = Vec::new();
        let mut pos = 0;

        while pos < content.len() {
            let space = content[pos..]
                .find_byte(b' ')
                .ok_or_else(|| ObjectError::InvalidTreeEntry {
                    offset: pos,
                    reason: "missing space after mode".into(),
                })?
                + pos;

            let mode = FileMode::from_bytes(&content[pos..space]).map_err(|_| {
                ObjectError::InvalidTreeEntry {
                    offset: pos,
                    reason: "invalid mode".into(),
                }
            })?;

            let name_start = space + 1;
            let nul = content[name_start..]
                .find_byte(0)
                .ok_or_else(|| ObjectError::InvalidTreeEntry {
                    offset: name_start,
                    reason: "missing NUL after name".into(),
                })?
                + name_start;
            if nul == name_start {
                return Err(ObjectError::InvalidTreeEntry {
                    offset: name_start,
                    reason: "empty name".into(),
                });
            }

            let oid_start = nul + 1;
            let oid_end = oid_start + DIGEST_LEN;
            if oid_end > content.len() {
                return Err(ObjectError::InvalidTreeEntry {
                    offset: oid_start,
                    reason: "truncated object id".into(),
                });
            }

            entries.push(TreeEntry {
                mode,
                name: BString::from(&content[name_start..nul]),
                oid: ObjectId::from_bytes(&content[oid_start..oid_end])?,
            });
            pos = oid_end;
        }

        Self::from_entries(entries)
    }

    pub fn serialize_content(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.entries.len() * (DIGEST_LEN + 32));
        for entry in &self.entries {
            out.extend_from_slice(entry.mode.as_bytes());
            out.push(b' ');
            out.extend_from_slice(&entry.name);
            out.push(0);
            out.extend_from_slice(entry.oid.as_bytes());
        }
        out
    }

    pub fn find(&self, name: &BStr) -> Option<&TreeEntry> {
        self.entries
            .binary_search_by(|e| e.name.as_bstr().cmp(name))
            .ok()
            .map(|pos| &self.entries[pos])
    }

    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &TreeEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(byte: u8) -> ObjectId {
        ObjectId::new([byte; 20])
    }

    #[test]
    fn modes_roundtrip() {
        for mode in [FileMode::Regular, FileMode::Executable, FileMode::Symlink, FileMode::Tree] {
            assert_eq!(FileMode::from_bytes(mode.as_bytes()).unwrap(), mode);
        }
        assert_eq!(FileMode::from_bytes(b"040000").unwrap(), FileMode::Tree);
        assert!(FileMode::from_bytes(b"100645").is_err());
        assert!(FileMode::from_bytes(b"10064x").is_err());
    }

    #[test]
    fn entries_are_sorted_by_name() {
        let tree = Tree::from_entries([
            TreeEntry::new(FileMode::Regular, "b.txt", oid(2)),
            TreeEntry::new(FileMode::Tree, "a", oid(1)),
            TreeEntry::new(FileMode::Regular, "c", oid(3)),
        ])
        .unwrap();
        let names: Vec<_> = tree.iter().map(|e| e.name.to_string()).collect();
        assert_eq!(names, ["a", "b.txt", "c"]);
    }

    #[test]
    fn duplicate_names_rejected() {
        let err = Tree::from_entries([
            TreeEntry::new(FileMode::Regular, "x", oid(1)),
            TreeEntry::new(FileMode::Regular, "x", oid(2)),
        ])
        .unwrap_err();
        assert!(matches!(err, ObjectError::DuplicateTreeEntry(name) if name == "x"));
    }

    #[test]
    fn insert_replaces_existing() {
        let mut tree = Tree::new();
        tree.insert(TreeEntry::new(FileMode::Regular, "f", oid(1)));
        tree.insert(TreeEntry::new(FileMode::Regular, "e", oid(2)));
        tree.insert(TreeEntry::new(FileMode::Regular, "f", oid(3)));
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.find(b"f".as_bstr()).unwrap().oid, oid(3));
        assert_eq!(tree.entries()[0].name, "e");
    }

    #[test]
    fn encoding_layout() {
        let tree = Tree::from_entries([TreeEntry::new(FileMode::Regular, "a.txt", oid(0xab))]).unwrap();
        let bytes = tree.serialize_content();
        let mut expected = b"100644 a.txt\0".to_vec();
        expected.extend_from_slice(&[0xab; 20]);
        assert_eq!(bytes, expected);
        assert_eq!(Tree::parse(&bytes).unwrap(), tree);
    }

    #[test]
    fn parse_accepts_padded_directory_mode() {
        let mut bytes = b"040000 src\0".to_vec();
        bytes.extend_from_slice(&[7; 20]);
        let tree = Tree::parse(&bytes).unwrap();
        assert_eq!(tree.entries()[0].mode, FileMode::Tree);
    }

    #[test]
    fn parse_truncated() {
        let mut bytes = b"100644 a\0".to_vec();
        bytes.extend_from_slice(&[1; 10]);
        assert!(matches!(
            Tree::parse(&bytes).unwrap_err(),
            ObjectError::InvalidTreeEntry { .. }
        ));
        assert!(Tree::parse(b"100644 a").is_err());
    }

    #[test]
    fn empty_tree() {
        let tree = Tree::parse(b"").unwrap();
        assert!(tree.is_empty());
        assert!(tree.serialize_content().is_empty());
    }
}
