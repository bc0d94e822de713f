use bstr::{BStr, BString, ByteSlice};
use hst_hash::ObjectId;
use hst_utils::Signature;

use crate::ObjectError;

/// A snapshot pointer with ancestry.
///
/// Zero parents marks a root commit, two or more a merge. The message is kept
/// byte for byte: everything after the blank line that ends the headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub tree: ObjectId,
    pub parents: Vec<ObjectId>,
    pub author: Signature,
    pub committer: Signature,
    pub encoding: Option<BString>,
    /// Headers this crate does not interpret, kept for a lossless re-encode.
    pub extra_headers: Vec<(BString, BString)>,
    pub message: BString,
}

impl Commit {
    pub fn new(
        tree: ObjectId,
        parents: Vec<ObjectId>,
        author: Signature,
        committer: Signature,
        message: impl Into<BString>,
    ) -> Self {
        Self {
            tree,
            parents,
            author,
            committer,
            encoding: None,
            extra_headers: Vec::new(),
            message: message.into(),
        }
    }

    pub fn parse(data: &[u8]) -> Result<Self, ObjectError> {
        let mut tree = None;
        let mut parents = Vec::new();
        let mut author = None;
        let mut committer = None;
        let mut encoding = None;
        let mut extra_headers = Vec::new();

        let mut pos = 0;
        while pos < data.len() {
            if data[pos] == b'\n' {
                pos += 1;
                break;
            }

            let (line, next) = header_value(data, pos);
            let Some(space) = line.find_byte(b' ') else {
                return Err(ObjectError::InvalidHeader(format!(
                    "malformed commit header: {}",
                    line.as_bstr()
                )));
            };
            let (key, value) = (&line[..space], &line[space + 1..]);

            match key {
                b"tree" => tree = Some(parse_oid(value, "tree")?),
                b"parent" => parents.push(parse_oid(value, "parent")?),
                b"author" => author = Some(Signature::parse(value.as_bstr())?),
                b"committer" => committer = Some(Signature::parse(value.as_bstr())?),
                b"encoding" => encoding = Some(BString::from(value)),
                _ => extra_headers.push((BString::from(key), BString::from(value))),
            }
            pos = next;
        }

        Ok(Self {
            tree: tree.ok_or(ObjectError::MissingCommitField { field: "tree" })?,
            parents,
            author: author.ok_or(ObjectError::MissingCommitField { field: "author" })?,
            committer: committer.ok_or(ObjectError::MissingCommitField { field: "committer" })?,
            encoding,
            extra_headers,
            message: BString::from(&data[pos.min(data.len())..]),
        })
    }

    pub fn serialize_content(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(256 + self.message.len());
        push_header(&mut out, b"tree", self.tree.to_hex().as_bytes());
        for parent in &self.parents {
            push_header(&mut out, b"parent", parent.to_hex().as_bytes());
        }
        push_header(&mut out, b"author", &self.author.to_bytes());
        push_header(&mut out, b"committer", &self.committer.to_bytes());
        if let Some(enc) = &self.encoding {
            push_header(&mut out, b"encoding", enc);
        }
        for (key, value) in &self.extra_headers {
            push_header(&mut out, key, value);
        }
        out.push(b'\n');
        out.extend_from_slice(&self.message);
        out
    }

    pub fn first_parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    /// First line of the message.
    pub fn summary(&self) -> &BStr {
        let msg = self.message.trim_start();
        msg.lines().next().unwrap_or_default().as_bstr()
    }
}

/// A header value with its continuation lines (lines starting with a space)
/// joined by `\n`, and the offset just past it.
fn header_value(data: &[u8], start: usize) -> (Vec<u8>, usize) {
    let line_end = |from: usize| data[from..].find_byte(b'\n').map_or(data.len(), |p| p + from);

    let end = line_end(start);
    let mut value = data[start..end].to_vec();
    let mut next = end + 1;
    while next < data.len() && data[next] == b' ' {
        let cont_end = line_end(next);
        value.push(b'\n');
        value.extend_from_slice(&data[next + 1..cont_end]);
        next = cont_end + 1;
    }
    (value, next)
}

fn push_header(out: &mut Vec<u8>, key: &[u8], value: &[u8]) {
    out.extend_from_slice(key);
    out.push(b' ');
    for (i, line) in value.split(|&b| b == b'\n').enumerate() {
        if i > 0 {
            out.extend_from_slice(b"\n ");
        }
        out.extend_from_slice(line);
    }
    out.push(b'\n');
}

fn parse_oid(value: &[u8], field: &str) -> Result<ObjectId, ObjectError> {
    let hex = std::str::from_utf8(value)
        .map_err(|_| ObjectError::InvalidHeader(format!("non-UTF-8 {field} id")))?;
    Ok(ObjectId::from_hex(hex)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hst_utils::GitDate;

    const TREE: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";
    const PARENT: &str = "ce013625030ba8dba906f756967f9e9ca394464a";

    fn sig(name: &str, ts: i64) -> Signature {
        Signature::new(name, GitDate::new(ts, 0))
    }

    #[test]
    fn root_commit() {
        let raw = format!(
            "tree {TREE}\nauthor alice 1700000000 +0000\ncommitter alice 1700000000 +0000\n\ninitial"
        );
        let commit = Commit::parse(raw.as_bytes()).unwrap();
        assert!(commit.is_root());
        assert_eq!(commit.tree.to_hex(), TREE);
        assert_eq!(commit.author.identity, "alice");
        assert_eq!(commit.message, "initial");
        assert_eq!(commit.serialize_content(), raw.as_bytes());
    }

    #[test]
    fn merge_commit_keeps_parent_order() {
        let other = "da39a3ee5e6b4b0d3255bfef95601890afd80709";
        let raw = format!(
            "tree {TREE}\nparent {PARENT}\nparent {other}\nauthor a 1 +0000\ncommitter a 1 +0000\n\nmerge\n"
        );
        let commit = Commit::parse(raw.as_bytes()).unwrap();
        assert!(commit.is_merge());
        assert_eq!(commit.first_parent().unwrap().to_hex(), PARENT);
        assert_eq!(commit.parents[1].to_hex(), other);
        assert_eq!(commit.serialize_content(), raw.as_bytes());
    }

    #[test]
    fn message_bytes_preserved() {
        let tree = ObjectId::from_hex(TREE).unwrap();
        for message in ["", "\n", "  padded  \n\n", "line one\n\nbody\n\n\n", "no newline"] {
            let commit = Commit::new(tree, vec![], sig("a", 1), sig("a", 1), message);
            let parsed = Commit::parse(&commit.serialize_content()).unwrap();
            assert_eq!(parsed.message, message);
        }
    }

    #[test]
    fn unknown_headers_roundtrip() {
        let raw = format!(
            "tree {TREE}\nauthor a 1 +0000\ncommitter a 1 +0000\nencoding ISO-8859-1\nx-note first\n second\n\nmsg"
        );
        let commit = Commit::parse(raw.as_bytes()).unwrap();
        assert_eq!(commit.encoding, Some(BString::from("ISO-8859-1")));
        assert_eq!(commit.extra_headers[0].1, "first\nsecond");
        assert_eq!(commit.serialize_content(), raw.as_bytes());
    }

    #[test]
    fn missing_fields() {
        let no_tree = b"author a 1 +0000\ncommitter a 1 +0000\n\nm";
        assert!(matches!(
            Commit::parse(no_tree).unwrap_err(),
            ObjectError::MissingCommitField { field: "tree" }
        ));
        let no_committer = format!("tree {TREE}\nauthor a 1 +0000\n\nm");
        assert!(matches!(
            Commit::parse(no_committer.as_bytes()).unwrap_err(),
            ObjectError::MissingCommitField { field: "committer" }
        ));
    }

    #[test]
    fn summary_is_first_line() {
        let tree = ObjectId::from_hex(TREE).unwrap();
        let commit = Commit::new(tree, vec![], sig("a", 1), sig("a", 1), "\nAdd feature\n\nDetails");
        assert_eq!(commit.summary(), "Add feature");
    }
}
