//! Lowercase hex codec for digests.

use crate::HashError;

const DIGITS: &[u8; 16] = b"0123456789abcdef";

fn nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

pub fn encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push(DIGITS[(b >> 4) as usize] as char);
        out.push(DIGITS[(b & 0x0f) as usize] as char);
    }
    out
}

/// Decode `hex` into `buf`; the input must be exactly `buf.len() * 2` characters.
pub fn decode_into(hex: &str, buf: &mut [u8]) -> Result<(), HashError> {
    let hex = hex.as_bytes();
    if hex.len() != buf.len() * 2 {
        return Err(HashError::InvalidHexLength {
            expected: buf.len() * 2,
            actual: hex.len(),
        });
    }
    for (i, pair) in hex.chunks_exact(2).enumerate() {
        let digit = |pos: usize| {
            nibble(pair[pos]).ok_or(HashError::InvalidHex {
                position: i * 2 + pos,
                character: pair[pos] as char,
            })
        };
        buf[i] = (digit(0)? << 4) | digit(1)?;
    }
    Ok(())
}

pub fn decode(hex: &str) -> Result<Vec<u8>, HashError> {
    if hex.len() % 2 != 0 {
        return Err(HashError::InvalidHexLength {
            expected: hex.len() + 1,
            actual: hex.len(),
        });
    }
    let mut buf = vec![0u8; hex.len() / 2];
    decode_into(hex, &mut buf)?;
    Ok(buf)
}

/// True if every character is a hex digit. Length is not checked, so this
/// also accepts abbreviated object names.
pub fn is_hex(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| nibble(b).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_lowercase() {
        assert_eq!(encode(&[0xde, 0xad, 0xbe, 0xef, 0x00, 0xff]), "deadbeef00ff");
    }

    #[test]
    fn decode_any_case() {
        assert_eq!(decode("DeAdBeEf").unwrap(), [0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn decode_reports_position() {
        match decode("deadgoof").unwrap_err() {
            HashError::InvalidHex {
                position: 4,
                character: 'g',
            } => {}
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn decode_odd_length() {
        assert!(matches!(
            decode("abc").unwrap_err(),
            HashError::InvalidHexLength { .. }
        ));
    }

    #[test]
    fn is_hex_prefixes() {
        assert!(is_hex("abc1234"));
        assert!(is_hex("ABC"));
        assert!(!is_hex(""));
        assert!(!is_hex("main"));
    }
}
