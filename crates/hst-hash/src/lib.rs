//! Object identity for hst.
//!
//! An [`ObjectId`] is the SHA-1 digest of an object's typed, length-prefixed
//! encoding. This crate owns the identifier type, its hex form, and the
//! [`Hasher`](hasher::Hasher) that produces it.

mod error;
pub mod hasher;
pub mod hex;
mod oid;

pub use error::HashError;
pub use hasher::Hasher;
pub use oid::ObjectId;

/// Raw digest width in bytes.
pub const DIGEST_LEN: usize = 20;
/// Hex digest width in characters.
pub const HEX_LEN: usize = 40;
