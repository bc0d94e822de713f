//! The storage interface and its loose-file implementation.

use hst_hash::ObjectId;
use hst_loose::{LooseError, LooseObjectStore};
use hst_object::ObjectType;

use crate::OdbError;

/// A content-addressed byte store.
///
/// Implementations hold `(kind, content)` records keyed by the id of
/// `"<kind> <len>\0<content>"`. Writes are idempotent: storing content that is
/// already present returns the existing id and changes nothing.
pub trait ObjectStore: Send + Sync {
    /// `Ok(None)` when the object is absent.
    fn read_raw(&self, oid: &ObjectId) -> Result<Option<(ObjectType, Vec<u8>)>, OdbError>;

    fn write_raw(&self, kind: ObjectType, content: &[u8]) -> Result<ObjectId, OdbError>;

    fn contains(&self, oid: &ObjectId) -> bool;

    /// Every stored id, sorted.
    fn oids(&self) -> Result<Vec<ObjectId>, OdbError>;

    /// Ids whose hex form starts with `prefix`. Empty unless `prefix` is
    /// non-empty hex.
    fn lookup_prefix(&self, prefix: &str) -> Result<Vec<ObjectId>, OdbError> {
        if !hst_hash::hex::is_hex(prefix) {
            return Ok(Vec::new());
        }
        let prefix = prefix.to_ascii_lowercase();
        Ok(self
            .oids()?
            .into_iter()
            .filter(|oid| oid.starts_with_hex(&prefix))
            .collect())
    }
}

impl ObjectStore for LooseObjectStore {
    fn read_raw(&self, oid: &ObjectId) -> Result<Option<(ObjectType, Vec<u8>)>, OdbError> {
        LooseObjectStore::read_raw(self, oid).map_err(|e| corrupt_or_io(oid, e))
    }

    fn write_raw(&self, kind: ObjectType, content: &[u8]) -> Result<ObjectId, OdbError> {
        Ok(LooseObjectStore::write_raw(self, kind, content)?)
    }

    fn contains(&self, oid: &ObjectId) -> bool {
        LooseObjectStore::contains(self, oid)
    }

    fn oids(&self) -> Result<Vec<ObjectId>, OdbError> {
        Ok(self.iter()?.collect::<Result<Vec<_>, _>>()?)
    }

    fn lookup_prefix(&self, prefix: &str) -> Result<Vec<ObjectId>, OdbError> {
        if !hst_hash::hex::is_hex(prefix) {
            return Ok(Vec::new());
        }
        let prefix = prefix.to_ascii_lowercase();
        if prefix.len() < 2 {
            return Ok(self
                .oids()?
                .into_iter()
                .filter(|oid| oid.starts_with_hex(&prefix))
                .collect());
        }

        // Only the matching fan-out directory can hold candidates.
        let dir = self.objects_dir().join(&prefix[..2]);
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut matches = Vec::new();
        for entry in entries {
            let name = entry?.file_name();
            let hex = format!("{}{}", &prefix[..2], name.to_string_lossy());
            if let Ok(oid) = ObjectId::from_hex(&hex) {
                if oid.starts_with_hex(&prefix) {
                    matches.push(oid);
                }
            }
        }
        matches.sort();
        Ok(matches)
    }
}

fn corrupt_or_io(oid: &ObjectId, err: LooseError) -> OdbError {
    match err {
        LooseError::Io(e) => OdbError::Io(e),
        other => OdbError::Corrupt {
            oid: *oid,
            reason: other.to_string(),
        },
    }
}
