//! Unified patch text for one path.

use std::fmt::Write;

use bstr::{BStr, ByteSlice};
use hst_hash::ObjectId;

use crate::line::{diff_lines, DiffLine, Hunk, DEFAULT_CONTEXT};

/// One side of a file comparison: the blob id and its content.
#[derive(Debug, Clone, Copy)]
pub struct Side<'a> {
    pub oid: ObjectId,
    pub data: &'a [u8],
}

impl<'a> Side<'a> {
    pub fn new(oid: ObjectId, data: &'a [u8]) -> Self {
        Self { oid, data }
    }
}

/// NUL in the first 8000 bytes marks content as binary.
pub fn is_binary(data: &[u8]) -> bool {
    data.iter().take(8000).any(|&b| b == 0)
}

/// Render the patch for `path` going from `old` to `new`. `None` on a side
/// means the file does not exist there. Identical sides render nothing.
pub fn render_patch(path: &BStr, old: Option<Side<'_>>, new: Option<Side<'_>>) -> String {
    let mut out = String::new();
    if old.map(|s| s.oid) == new.map(|s| s.oid) {
        return out;
    }

    let short = |side: Option<Side<'_>>| side.map_or_else(|| "0000000".to_string(), |s| s.oid.short_hex());
    let _ = writeln!(out, "diff --hst a/{path} b/{path}");
    match (old, new) {
        (None, _) => {
            let _ = writeln!(out, "new file mode 100644");
            let _ = writeln!(out, "index {}..{}", short(old), short(new));
        }
        (_, None) => {
            let _ = writeln!(out, "deleted file mode 100644");
            let _ = writeln!(out, "index {}..{}", short(old), short(new));
        }
        _ => {
            let _ = writeln!(out, "index {}..{} 100644", short(old), short(new));
        }
    }

    let old_name = if old.is_some() { format!("a/{path}") } else { "/dev/null".into() };
    let new_name = if new.is_some() { format!("b/{path}") } else { "/dev/null".into() };

    let old_data = old.map_or(&[][..], |s| s.data);
    let new_data = new.map_or(&[][..], |s| s.data);
    if is_binary(old_data) || is_binary(new_data) {
        let _ = writeln!(out, "Binary files {old_name} and {new_name} differ");
        return out;
    }

    let hunks = diff_lines(old_data, new_data, DEFAULT_CONTEXT);
    if hunks.is_empty() {
        return out;
    }
    let _ = writeln!(out, "--- {old_name}");
    let _ = writeln!(out, "+++ {new_name}");
    for hunk in &hunks {
        write_hunk(&mut out, hunk);
    }
    out
}

fn range(start: usize, count: usize) -> String {
    if count == 1 {
        start.to_string()
    } else {
        format!("{start},{count}")
    }
}

fn write_hunk(out: &mut String, hunk: &Hunk) {
    let _ = writeln!(
        out,
        "@@ -{} +{} @@",
        range(hunk.old_start, hunk.old_count),
        range(hunk.new_start, hunk.new_count)
    );
    for line in &hunk.lines {
        let (marker, text) = match line {
            DiffLine::Context(t) => (' ', t),
            DiffLine::Addition(t) => ('+', t),
            DiffLine::Deletion(t) => ('-', t),
        };
        out.push(marker);
        out.push_str(&text.to_str_lossy());
        if !text.ends_with(b"\n") {
            out.push_str("\n\\ No newline at end of file\n");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(b: u8) -> ObjectId {
        ObjectId::new([b; 20])
    }

    #[test]
    fn modified_file() {
        let patch = render_patch(
            "a.txt".into(),
            Some(Side::new(oid(0x11), b"hello\n")),
            Some(Side::new(oid(0x22), b"hello world\n")),
        );
        assert_eq!(
            patch,
            "diff --hst a/a.txt b/a.txt\n\
             index 1111111..2222222 100644\n\
             --- a/a.txt\n\
             +++ b/a.txt\n\
             @@ -1 +1 @@\n\
             -hello\n\
             +hello world\n"
        );
    }

    #[test]
    fn added_file_without_trailing_newline() {
        let patch = render_patch("new".into(), None, Some(Side::new(oid(0xab), b"x")));
        assert!(patch.contains("new file mode 100644\nindex 0000000..abababa\n"));
        assert!(patch.contains("--- /dev/null\n+++ b/new\n@@ -0,0 +1 @@\n+x\n\\ No newline at end of file\n"));
    }

    #[test]
    fn deleted_file() {
        let patch = render_patch("old".into(), Some(Side::new(oid(1), b"a\nb\n")), None);
        assert!(patch.contains("deleted file mode 100644"));
        assert!(patch.ends_with("+++ /dev/null\n@@ -1,2 +0,0 @@\n-a\n-b\n"));
    }

    #[test]
    fn binary_content_is_not_diffed() {
        let patch = render_patch(
            "img".into(),
            Some(Side::new(oid(1), b"\x89PNG\0\0")),
            Some(Side::new(oid(2), b"\x89PNG\0\x01")),
        );
        assert!(patch.ends_with("Binary files a/img and b/img differ\n"));
        assert!(!patch.contains("@@"));
    }

    #[test]
    fn same_blob_renders_nothing() {
        let side = Side::new(oid(3), b"same\n");
        assert!(render_patch("f".into(), Some(side), Some(side)).is_empty());
    }
}
