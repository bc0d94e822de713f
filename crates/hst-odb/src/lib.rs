//! Object database for hst.
//!
//! [`ObjectStore`] is the storage interface every engine component talks to:
//! raw `(kind, bytes)` records addressed by id. [`ObjectStoreExt`] layers typed
//! access on top. Two backends ship with the crate: [`MemoryStore`] for tests
//! and embedding, and the loose-file store from `hst-loose`.

mod backend;
mod ext;
mod memory;

pub use backend::ObjectStore;
pub use ext::ObjectStoreExt;
pub use memory::MemoryStore;

use hst_hash::ObjectId;

#[derive(Debug, thiserror::Error)]
pub enum OdbError {
    #[error("object not found: {0}")]
    NotFound(ObjectId),

    #[error("corrupt object {oid}: {reason}")]
    Corrupt { oid: ObjectId, reason: String },

    #[error(transparent)]
    Loose(#[from] hst_loose::LooseError),

    #[error(transparent)]
    Hash(#[from] hst_hash::HashError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
