//! Conflict marker text.
//!
//! A conflicted path gets a blob holding both sides:
//!
//! ```text
//! <<<<<<< HEAD
//! <current side>
//! =======
//! <target side>
//! >>>>>>> MERGE_HEAD
//! ```

use bstr::ByteSlice;

pub const MARKER_START: &str = "<<<<<<< HEAD";
pub const MARKER_SEPARATOR: &str = "=======";
pub const MARKER_END: &str = ">>>>>>> MERGE_HEAD";

/// Shown instead of content that contains NUL bytes.
const BINARY_PLACEHOLDER: &[u8] = b"[Binary file]\n";

/// Build the conflict blob for one path. `None` is a side where the path
/// does not exist and renders as nothing.
pub fn conflict_content(current: Option<&[u8]>, target: Option<&[u8]>) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(MARKER_START.as_bytes());
    out.push(b'\n');
    push_side(&mut out, current);
    out.extend_from_slice(MARKER_SEPARATOR.as_bytes());
    out.push(b'\n');
    push_side(&mut out, target);
    out.extend_from_slice(MARKER_END.as_bytes());
    out.push(b'\n');
    out
}

fn push_side(out: &mut Vec<u8>, side: Option<&[u8]>) {
    let Some(data) = side else {
        return;
    };
    if hst_diff::unified::is_binary(data) {
        out.extend_from_slice(BINARY_PLACEHOLDER);
        return;
    }
    out.extend_from_slice(data);
    if !data.is_empty() && !data.ends_with(b"\n") {
        out.push(b'\n');
    }
}

/// Whether `data` still holds an unresolved conflict.
pub fn has_conflict_markers(data: &[u8]) -> bool {
    data.contains_str(MARKER_START) && data.contains_str(MARKER_END)
}
