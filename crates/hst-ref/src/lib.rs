//! References for hst.
//!
//! A reference is a named, mutable pointer: branches under `refs/heads/`,
//! remote-tracking branches under `refs/remotes/<remote>/`, and the special
//! `HEAD`, which is either symbolic (names a branch) or detached (holds an id).
//!
//! [`RefStore`] abstracts over where refs live. [`FilesRefStore`] keeps one
//! file per ref under the repository directory; [`MemoryRefStore`] keeps them
//! in a map for tests.

mod error;
mod files;
mod memory;
mod name;
mod store;

pub use error::RefError;
pub use files::FilesRefStore;
pub use memory::MemoryRefStore;
pub use name::RefName;
pub use store::RefStore;

use hst_hash::ObjectId;

/// Either a direct pointer to an object or a pointer to another ref.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    Direct { name: RefName, target: ObjectId },
    Symbolic { name: RefName, target: RefName },
}

impl Reference {
    pub fn name(&self) -> &RefName {
        match self {
            Reference::Direct { name, .. } => name,
            Reference::Symbolic { name, .. } => name,
        }
    }

    pub fn is_symbolic(&self) -> bool {
        matches!(self, Reference::Symbolic { .. })
    }

    pub fn target_oid(&self) -> Option<ObjectId> {
        match self {
            Reference::Direct { target, .. } => Some(*target),
            Reference::Symbolic { .. } => None,
        }
    }

    pub fn symbolic_target(&self) -> Option<&RefName> {
        match self {
            Reference::Symbolic { target, .. } => Some(target),
            Reference::Direct { .. } => None,
        }
    }
}
