use crate::{ObjectError, ObjectType};

/// Parse `"<kind> <size>\0"`, returning `(kind, size, header_len)` where
/// `header_len` includes the NUL.
pub fn parse_header(data: &[u8]) -> Result<(ObjectType, usize, usize), ObjectError> {
    let nul = data
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| ObjectError::InvalidHeader("missing NUL terminator".into()))?;

    let header = &data[..nul];
    let space = header
        .iter()
        .position(|&b| b == b' ')
        .ok_or_else(|| ObjectError::InvalidHeader("missing space in header".into()))?;

    let kind = ObjectType::from_bytes(&header[..space])?;

    let size = std::str::from_utf8(&header[space + 1..])
        .ok()
        .filter(|s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|s| s.parse::<usize>().ok())
        .ok_or_else(|| {
            ObjectError::InvalidHeader(format!(
                "invalid size: {}",
                String::from_utf8_lossy(&header[space + 1..])
            ))
        })?;

    Ok((kind, size, nul + 1))
}

pub fn write_header(kind: ObjectType, size: usize) -> Vec<u8> {
    format!("{} {}\0", kind, size).into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_blob_header() {
        let data = b"blob 12\0hello world!";
        let (kind, size, len) = parse_header(data).unwrap();
        assert_eq!(kind, ObjectType::Blob);
        assert_eq!(size, 12);
        assert_eq!(&data[len..], b"hello world!");
    }

    #[test]
    fn write_then_parse() {
        let hdr = write_header(ObjectType::Commit, 256);
        assert_eq!(hdr, b"commit 256\0");
        assert_eq!(parse_header(&hdr).unwrap(), (ObjectType::Commit, 256, hdr.len()));
    }

    #[test]
    fn malformed_headers() {
        assert!(parse_header(b"blob 12").is_err());
        assert!(parse_header(b"blob12\0").is_err());
        assert!(parse_header(b"blob -1\0").is_err());
        assert!(parse_header(b"blob \0").is_err());
        assert!(parse_header(b"bolb 1\0x").is_err());
    }
}
