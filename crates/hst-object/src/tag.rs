use bstr::{BString, ByteSlice};
use hst_hash::ObjectId;
use hst_utils::Signature;

use crate::{ObjectError, ObjectType};

/// An annotated label pointing at another object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub target: ObjectId,
    pub target_type: ObjectType,
    pub name: BString,
    pub tagger: Option<Signature>,
    pub message: BString,
}

impl Tag {
    pub fn parse(data: &[u8]) -> Result<Self, ObjectError> {
        let mut target = None;
        let mut target_type = None;
        let mut name = None;
        let mut tagger = None;

        let mut pos = 0;
        while pos < data.len() {
            if data[pos] == b'\n' {
                pos += 1;
                break;
            }
            let end = data[pos..].find_byte(b'\n').map_or(data.len(), |p| p + pos);
            let line = &data[pos..end];

            if let Some(space) = line.find_byte(b' ') {
                let value = &line[space + 1..];
                match &line[..space] {
                    b"object" => {
                        let hex = std::str::from_utf8(value).map_err(|_| {
                            ObjectError::InvalidHeader("non-UTF-8 tag target".into())
                        })?;
                        target = Some(ObjectId::from_hex(hex)?);
                    }
                    b"type" => target_type = Some(ObjectType::from_bytes(value)?),
                    b"tag" => name = Some(BString::from(value)),
                    b"tagger" => tagger = Some(Signature::parse(value.as_bstr())?),
                    _ => {}
                }
            }
            pos = end + 1;
        }

        Ok(Self {
            target: target.ok_or(ObjectError::MissingTagField { field: "object" })?,
            target_type: target_type.ok_or(ObjectError::MissingTagField { field: "type" })?,
            name: name.ok_or(ObjectError::MissingTagField { field: "tag" })?,
            tagger,
            message: BString::from(&data[pos.min(data.len())..]),
        })
    }

    pub fn serialize_content(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(128 + self.message.len());
        out.extend_from_slice(b"object ");
        out.extend_from_slice(self.target.to_hex().as_bytes());
        out.extend_from_slice(b"\ntype ");
        out.extend_from_slice(self.target_type.as_str().as_bytes());
        out.extend_from_slice(b"\ntag ");
        out.extend_from_slice(&self.name);
        out.push(b'\n');
        if let Some(tagger) = &self.tagger {
            out.extend_from_slice(b"tagger ");
            out.extend_from_slice(&tagger.to_bytes());
            out.push(b'\n');
        }
        out.push(b'\n');
        out.extend_from_slice(&self.message);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_with_tagger() {
        let raw = b"object ce013625030ba8dba906f756967f9e9ca394464a\ntype commit\ntag v1.0\ntagger bob 1700000000 +0000\n\nRelease 1.0\n";
        let tag = Tag::parse(raw).unwrap();
        assert_eq!(tag.target_type, ObjectType::Commit);
        assert_eq!(tag.name, "v1.0");
        assert_eq!(tag.tagger.as_ref().unwrap().identity, "bob");
        assert_eq!(tag.message, "Release 1.0\n");
        assert_eq!(tag.serialize_content(), raw);
    }

    #[test]
    fn tagger_is_optional() {
        let raw = b"object ce013625030ba8dba906f756967f9e9ca394464a\ntype blob\ntag raw\n\n";
        let tag = Tag::parse(raw).unwrap();
        assert!(tag.tagger.is_none());
        assert_eq!(tag.serialize_content(), raw);
    }

    #[test]
    fn missing_target() {
        assert!(matches!(
            Tag::parse(b"type commit\ntag x\n\n").unwrap_err(),
            ObjectError::MissingTagField { field: "object" }
        ));
    }
}
