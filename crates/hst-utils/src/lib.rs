pub mod date;
pub mod error;
pub mod lockfile;

pub use bstr::{BStr, BString, ByteSlice, ByteVec};
pub use date::{GitDate, Signature};
pub use error::UtilError;
pub use lockfile::{write_atomic, StateLock};

pub type Result<T> = std::result::Result<T, UtilError>;
