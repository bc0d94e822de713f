use std::fmt;
use std::str::FromStr;

use crate::{hex, HashError, DIGEST_LEN, HEX_LEN};

/// A content address: the SHA-1 digest of an object's encoding.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; DIGEST_LEN]);

impl ObjectId {
    /// The all-zero identifier. Never the name of a stored object.
    pub const NULL: Self = Self([0u8; DIGEST_LEN]);

    pub const fn new(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HashError> {
        let arr: [u8; DIGEST_LEN] = bytes.try_into().map_err(|_| HashError::InvalidHashLength {
            expected: DIGEST_LEN,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    /// Parse a full 40-character hex name.
    pub fn from_hex(s: &str) -> Result<Self, HashError> {
        if s.len() != HEX_LEN {
            return Err(HashError::InvalidHexLength {
                expected: HEX_LEN,
                actual: s.len(),
            });
        }
        let mut bytes = [0u8; DIGEST_LEN];
        hex::decode_into(s, &mut bytes)?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// First seven hex digits, as shown in one-line listings.
    pub fn short_hex(&self) -> String {
        let mut hex = self.to_hex();
        hex.truncate(7);
        hex
    }

    /// Case-insensitive prefix test on the hex name.
    pub fn starts_with_hex(&self, prefix: &str) -> bool {
        self.to_hex().starts_with(&prefix.to_ascii_lowercase())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", &self.to_hex()[..8])
    }
}

impl FromStr for ObjectId {
    type Err = HashError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl AsRef<[u8]> for ObjectId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const EMPTY_BLOB: &str = "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391";

    #[test]
    fn display_roundtrip() {
        let oid: ObjectId = EMPTY_BLOB.parse().unwrap();
        assert_eq!(oid.to_string(), EMPTY_BLOB);
    }

    #[test]
    fn debug_is_abbreviated() {
        let oid = ObjectId::from_hex(EMPTY_BLOB).unwrap();
        assert_eq!(format!("{oid:?}"), "ObjectId(e69de29b)");
    }

    #[test]
    fn uppercase_hex_accepted() {
        let lower = ObjectId::from_hex(EMPTY_BLOB).unwrap();
        let upper = ObjectId::from_hex(&EMPTY_BLOB.to_uppercase()).unwrap();
        assert_eq!(lower, upper);
    }

    #[test]
    fn wrong_lengths_rejected() {
        assert!(matches!(
            ObjectId::from_hex("e69de29").unwrap_err(),
            HashError::InvalidHexLength { expected: 40, actual: 7 }
        ));
        assert!(matches!(
            ObjectId::from_bytes(&[0; 10]).unwrap_err(),
            HashError::InvalidHashLength { expected: 20, actual: 10 }
        ));
    }

    #[test]
    fn short_form_is_seven_digits() {
        let oid = ObjectId::from_hex(EMPTY_BLOB).unwrap();
        assert_eq!(oid.short_hex(), "e69de29");
        assert!(oid.starts_with_hex(&oid.short_hex()));
    }

    #[test]
    fn prefix_matching() {
        let oid = ObjectId::from_hex(EMPTY_BLOB).unwrap();
        assert!(oid.starts_with_hex("e69de29b"));
        assert!(oid.starts_with_hex("E69DE"));
        assert!(!oid.starts_with_hex("e69df"));
    }

    #[test]
    fn ordering_follows_bytes() {
        let a = ObjectId::from_hex("0000000000000000000000000000000000000001").unwrap();
        let b = ObjectId::from_hex("0000000000000000000000000000000000000002").unwrap();
        assert!(ObjectId::NULL < a && a < b);
        let set: HashSet<_> = [a, b, a].into_iter().collect();
        assert_eq!(set.len(), 2);
    }
}
