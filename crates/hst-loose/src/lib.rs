//! One zlib file per object under `objects/`.
//!
//! The id's first two hex digits name a fan-out directory and the other 38
//! name the file, so `objects/ce/013625...` holds the deflated
//! `"<kind> <len>\0<content>"` record. Files are immutable once renamed into
//! place.

mod enumerate;
mod read;
mod write;

pub use enumerate::LooseObjectIter;

use std::path::{Path, PathBuf};

use flate2::Compression;
use hst_hash::ObjectId;

/// An `objects/` directory.
#[derive(Debug, Clone)]
pub struct LooseObjectStore {
    objects_dir: PathBuf,
    compression_level: Compression,
}

impl LooseObjectStore {
    /// The directory need not exist yet; it is created by the first write.
    pub fn open(objects_dir: impl AsRef<Path>) -> Self {
        Self {
            objects_dir: objects_dir.as_ref().to_path_buf(),
            compression_level: Compression::default(),
        }
    }

    pub fn objects_dir(&self) -> &Path {
        &self.objects_dir
    }

    pub fn object_path(&self, oid: &ObjectId) -> PathBuf {
        let hex = oid.to_hex();
        self.objects_dir.join(&hex[..2]).join(&hex[2..])
    }

    /// Every stored id, sorted.
    pub fn iter(&self) -> Result<LooseObjectIter, LooseError> {
        LooseObjectIter::new(&self.objects_dir)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LooseError {
    #[error("object {oid} is damaged: {reason}")]
    Corrupt { oid: ObjectId, reason: String },

    #[error("object {oid} does not inflate")]
    Decompress {
        oid: ObjectId,
        #[source]
        source: std::io::Error,
    },

    #[error("{} holds {actual}, not {expected}", path.display())]
    HashMismatch {
        path: PathBuf,
        expected: ObjectId,
        actual: ObjectId,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Object(#[from] hst_object::ObjectError),

    #[error(transparent)]
    Hash(#[from] hst_hash::HashError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fan_out_layout() {
        let store = LooseObjectStore::open("/repo/.hst/objects");
        let oid = ObjectId::from_hex("ce013625030ba8dba906f756967f9e9ca394464a").unwrap();
        assert_eq!(
            store.object_path(&oid),
            PathBuf::from("/repo/.hst/objects/ce/013625030ba8dba906f756967f9e9ca394464a")
        );
    }
}
