use std::fs;
use std::io::Read;

use flate2::read::ZlibDecoder;
use hst_hash::{Hasher, ObjectId};
use hst_object::{header, Object, ObjectType};

use crate::{LooseError, LooseObjectStore};

impl LooseObjectStore {
    pub fn contains(&self, oid: &ObjectId) -> bool {
        self.object_path(oid).is_file()
    }

    /// Read the kind and content of an object.
    ///
    /// `Ok(None)` if the object is absent; an error if it exists but cannot be
    /// decompressed or its header disagrees with its content.
    pub fn read_raw(&self, oid: &ObjectId) -> Result<Option<(ObjectType, Vec<u8>)>, LooseError> {
        let Some(data) = self.read_decompressed(oid)? else {
            return Ok(None);
        };
        let (kind, size, header_len) =
            header::parse_header(&data).map_err(|e| LooseError::Corrupt {
                oid: *oid,
                reason: e.to_string(),
            })?;
        let content = &data[header_len..];
        if content.len() != size {
            return Err(LooseError::Corrupt {
                oid: *oid,
                reason: format!("header declares {size} bytes, found {}", content.len()),
            });
        }
        Ok(Some((kind, content.to_vec())))
    }

    /// Read and decode an object.
    pub fn read(&self, oid: &ObjectId) -> Result<Option<Object>, LooseError> {
        match self.read_raw(oid)? {
            Some((kind, content)) => Ok(Some(Object::parse_content(kind, &content)?)),
            None => Ok(None),
        }
    }

    /// Read an object and check that its bytes hash back to `oid`.
    pub fn read_verified(&self, oid: &ObjectId) -> Result<Option<Object>, LooseError> {
        let Some(data) = self.read_decompressed(oid)? else {
            return Ok(None);
        };
        let actual = Hasher::digest(&data)?;
        if actual != *oid {
            return Err(LooseError::HashMismatch {
                path: self.object_path(oid),
                expected: *oid,
                actual,
            });
        }
        Ok(Some(Object::parse(&data)?))
    }

    fn read_decompressed(&self, oid: &ObjectId) -> Result<Option<Vec<u8>>, LooseError> {
        let compressed = match fs::read(self.object_path(oid)) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(LooseError::Io(e)),
        };

        let mut decoder = ZlibDecoder::new(&compressed[..]);
        let mut out = Vec::new();
        decoder
            .read_to_end(&mut out)
            .map_err(|source| LooseError::Decompress { oid: *oid, source })?;
        Ok(Some(out))
    }
}
