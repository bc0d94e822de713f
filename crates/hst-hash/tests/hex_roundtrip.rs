use hst_hash::{hex, ObjectId};
use proptest::prelude::*;

proptest! {
    #[test]
    fn bytes_roundtrip(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
        let encoded = hex::encode(&bytes);
        prop_assert_eq!(encoded.len(), bytes.len() * 2);
        prop_assert_eq!(hex::decode(&encoded).unwrap(), bytes);
    }

    #[test]
    fn oid_roundtrip(raw in any::<[u8; 20]>()) {
        let oid = ObjectId::new(raw);
        let parsed: ObjectId = oid.to_hex().parse().unwrap();
        prop_assert_eq!(parsed, oid);
        prop_assert!(oid.starts_with_hex(&oid.to_hex()[..7]));
    }
}
