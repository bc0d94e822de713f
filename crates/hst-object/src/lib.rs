//! The hst object model.
//!
//! Every stored object is one of four kinds, represented by the closed
//! [`Object`] variant. Each kind has a canonical byte encoding; the object's
//! identity is the SHA-1 of `"<kind> <len>\0<encoding>"`.

mod blob;
mod commit;
pub mod header;
mod tag;
mod tree;

pub use blob::Blob;
pub use commit::Commit;
pub use tag::Tag;
pub use tree::{FileMode, Tree, TreeEntry};

use std::collections::BTreeMap;

use bstr::BString;
use hst_hash::{HashError, Hasher, ObjectId};

/// A flattened snapshot: `/`-separated repository path to blob id, sorted by
/// path. Trees, the staging index and worktree scans all reduce to this.
pub type PathMap = BTreeMap<BString, ObjectId>;

/// Errors produced while decoding or encoding objects.
#[derive(Debug, thiserror::Error)]
pub enum ObjectError {
    #[error("invalid object type: {0}")]
    InvalidType(BString),

    #[error("invalid object header: {0}")]
    InvalidHeader(String),

    #[error("object size mismatch: header says {expected} bytes, found {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("invalid tree entry at offset {offset}: {reason}")]
    InvalidTreeEntry { offset: usize, reason: String },

    #[error("duplicate tree entry: {0}")]
    DuplicateTreeEntry(BString),

    #[error("invalid commit: missing '{field}' header")]
    MissingCommitField { field: &'static str },

    #[error("invalid tag: missing '{field}' header")]
    MissingTagField { field: &'static str },

    #[error("invalid file mode: {0}")]
    InvalidFileMode(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(#[from] hst_utils::UtilError),

    #[error(transparent)]
    Hash(#[from] HashError),
}

/// The four object kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Blob,
    Tree,
    Commit,
    Tag,
}

impl ObjectType {
    pub fn from_bytes(s: &[u8]) -> Result<Self, ObjectError> {
        match s {
            b"blob" => Ok(Self::Blob),
            b"tree" => Ok(Self::Tree),
            b"commit" => Ok(Self::Commit),
            b"tag" => Ok(Self::Tag),
            _ => Err(ObjectError::InvalidType(BString::from(s))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Tree => "tree",
            Self::Commit => "commit",
            Self::Tag => "tag",
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ObjectType {
    type Err = ObjectError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bytes(s.as_bytes())
    }
}

/// A decoded object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Object {
    Blob(Blob),
    Tree(Tree),
    Commit(Commit),
    Tag(Tag),
}

impl Object {
    /// Decode `"<kind> <len>\0<content>"`. The declared length must match exactly.
    pub fn parse(data: &[u8]) -> Result<Self, ObjectError> {
        let (kind, size, header_len) = header::parse_header(data)?;
        let content = &data[header_len..];
        if content.len() != size {
            return Err(ObjectError::SizeMismatch {
                expected: size,
                actual: content.len(),
            });
        }
        Self::parse_content(kind, content)
    }

    pub fn parse_content(kind: ObjectType, content: &[u8]) -> Result<Self, ObjectError> {
        match kind {
            ObjectType::Blob => Ok(Self::Blob(Blob::new(content.to_vec()))),
            ObjectType::Tree => Ok(Self::Tree(Tree::parse(content)?)),
            ObjectType::Commit => Ok(Self::Commit(Commit::parse(content)?)),
            ObjectType::Tag => Ok(Self::Tag(Tag::parse(content)?)),
        }
    }

    /// Header plus content.
    pub fn serialize(&self) -> Vec<u8> {
        let content = self.serialize_content();
        let mut out = header::write_header(self.object_type(), content.len());
        out.extend_from_slice(&content);
        out
    }

    pub fn serialize_content(&self) -> Vec<u8> {
        match self {
            Self::Blob(b) => b.data.clone(),
            Self::Tree(t) => t.serialize_content(),
            Self::Commit(c) => c.serialize_content(),
            Self::Tag(t) => t.serialize_content(),
        }
    }

    pub fn object_type(&self) -> ObjectType {
        match self {
            Self::Blob(_) => ObjectType::Blob,
            Self::Tree(_) => ObjectType::Tree,
            Self::Commit(_) => ObjectType::Commit,
            Self::Tag(_) => ObjectType::Tag,
        }
    }

    pub fn compute_oid(&self) -> Result<ObjectId, HashError> {
        Hasher::hash_object(self.object_type().as_str(), &self.serialize_content())
    }

    pub fn into_commit(self) -> Option<Commit> {
        match self {
            Self::Commit(c) => Some(c),
            _ => None,
        }
    }

    pub fn into_tree(self) -> Option<Tree> {
        match self {
            Self::Tree(t) => Some(t),
            _ => None,
        }
    }

    pub fn into_blob(self) -> Option<Blob> {
        match self {
            Self::Blob(b) => Some(b),
            _ => None,
        }
    }
}

impl From<Blob> for Object {
    fn from(b: Blob) -> Self {
        Self::Blob(b)
    }
}

impl From<Tree> for Object {
    fn from(t: Tree) -> Self {
        Self::Tree(t)
    }
}

impl From<Commit> for Object {
    fn from(c: Commit) -> Self {
        Self::Commit(c)
    }
}

impl From<Tag> for Object {
    fn from(t: Tag) -> Self {
        Self::Tag(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_type_names() {
        for kind in [ObjectType::Blob, ObjectType::Tree, ObjectType::Commit, ObjectType::Tag] {
            assert_eq!(kind.as_str().parse::<ObjectType>().unwrap(), kind);
        }
        assert!(ObjectType::from_bytes(b"note").is_err());
    }

    #[test]
    fn blob_identity_matches_known_value() {
        let obj = Object::Blob(Blob::new(b"hello\n".to_vec()));
        assert_eq!(
            obj.compute_oid().unwrap().to_hex(),
            "ce013625030ba8dba906f756967f9e9ca394464a"
        );
    }

    #[test]
    fn parse_full_encoding() {
        let obj = Object::parse(b"blob 5\0hello").unwrap();
        assert_eq!(obj, Object::Blob(Blob::new(b"hello".to_vec())));
        assert_eq!(obj.serialize(), b"blob 5\0hello");
    }

    #[test]
    fn parse_rejects_size_mismatch() {
        assert!(matches!(
            Object::parse(b"blob 9\0hello").unwrap_err(),
            ObjectError::SizeMismatch { expected: 9, actual: 5 }
        ));
        assert!(Object::parse(b"blob 2\0hello").is_err());
    }

    #[test]
    fn accessors_match_kind() {
        let obj = Object::from(Tree::default());
        assert_eq!(obj.object_type(), ObjectType::Tree);
        assert!(obj.clone().into_commit().is_none());
        assert!(obj.into_tree().is_some());
    }
}
