use hst_hash::ObjectId;
use hst_object::{Blob, Commit, Object, ObjectType, Tree};

use crate::{ObjectStore, OdbError};

/// Typed access over any [`ObjectStore`].
pub trait ObjectStoreExt: ObjectStore {
    /// Encode and store `obj`, returning its id.
    fn put(&self, obj: &Object) -> Result<ObjectId, OdbError> {
        self.write_raw(obj.object_type(), &obj.serialize_content())
    }

    fn exists(&self, oid: &ObjectId) -> bool {
        self.contains(oid)
    }

    /// Read an object of any kind.
    fn read_object(&self, oid: &ObjectId) -> Result<Object, OdbError> {
        let (kind, content) = self.read_raw(oid)?.ok_or(OdbError::NotFound(*oid))?;
        Object::parse_content(kind, &content).map_err(|e| OdbError::Corrupt {
            oid: *oid,
            reason: e.to_string(),
        })
    }

    /// Read an object that must be of kind `expected`.
    ///
    /// Fails with [`OdbError::NotFound`] when absent and with
    /// [`OdbError::Corrupt`] when it cannot be decoded or is of another kind.
    fn get(&self, oid: &ObjectId, expected: ObjectType) -> Result<Object, OdbError> {
        let (kind, content) = self.read_raw(oid)?.ok_or(OdbError::NotFound(*oid))?;
        if kind != expected {
            return Err(OdbError::Corrupt {
                oid: *oid,
                reason: format!("expected {expected}, found {kind}"),
            });
        }
        Object::parse_content(kind, &content).map_err(|e| OdbError::Corrupt {
            oid: *oid,
            reason: e.to_string(),
        })
    }

    fn read_commit(&self, oid: &ObjectId) -> Result<Commit, OdbError> {
        self.get(oid, ObjectType::Commit)?
            .into_commit()
            .ok_or(OdbError::NotFound(*oid))
    }

    fn read_tree(&self, oid: &ObjectId) -> Result<Tree, OdbError> {
        self.get(oid, ObjectType::Tree)?
            .into_tree()
            .ok_or(OdbError::NotFound(*oid))
    }

    fn read_blob(&self, oid: &ObjectId) -> Result<Blob, OdbError> {
        self.get(oid, ObjectType::Blob)?
            .into_blob()
            .ok_or(OdbError::NotFound(*oid))
    }

    /// Kind of a stored object.
    fn kind_of(&self, oid: &ObjectId) -> Result<ObjectType, OdbError> {
        Ok(self.read_raw(oid)?.ok_or(OdbError::NotFound(*oid))?.0)
    }
}

impl<S: ObjectStore + ?Sized> ObjectStoreExt for S {}
