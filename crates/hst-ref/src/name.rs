use std::fmt;

use bstr::{BStr, BString, ByteSlice};

use crate::error::RefError;

/// A validated reference name such as `refs/heads/main` or `HEAD`.
///
/// Rejected: empty names, `..`, `//`, `@{`, a lone `@`, control characters,
/// a space or any of `~^:?*[\`, a leading or trailing `/`, a trailing `.`,
/// and any component that starts with `.` or ends with `.lock`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RefName(BString);

const FORBIDDEN_CHARS: &[u8] = b" ~^:?*[\\";

/// Names that live directly in the repository directory.
const SPECIAL_REFS: &[&str] = &["HEAD", "MERGE_HEAD", "ORIG_HEAD"];

pub(crate) const HEADS_PREFIX: &str = "refs/heads/";
pub(crate) const REMOTES_PREFIX: &str = "refs/remotes/";

impl RefName {
    pub fn new(name: impl Into<BString>) -> Result<Self, RefError> {
        let name = name.into();
        validate_ref_name(&name)?;
        Ok(Self(name))
    }

    /// `HEAD`.
    pub fn head() -> Self {
        Self(BString::from("HEAD"))
    }

    /// `refs/heads/<branch>`.
    pub fn branch(branch: &str) -> Result<Self, RefError> {
        Self::new(format!("{HEADS_PREFIX}{branch}"))
    }

    /// `refs/remotes/<remote>/<branch>`.
    pub fn remote_tracking(remote: &str, branch: &str) -> Result<Self, RefError> {
        Self::new(format!("{REMOTES_PREFIX}{remote}/{branch}"))
    }

    /// `main` for `refs/heads/main`, `origin/main` for
    /// `refs/remotes/origin/main`, the full name otherwise.
    pub fn short_name(&self) -> &BStr {
        let s = self.0.as_bstr();
        for prefix in [HEADS_PREFIX, REMOTES_PREFIX, "refs/tags/"] {
            if let Some(rest) = s.strip_prefix(prefix.as_bytes()) {
                return rest.as_bstr();
            }
        }
        s
    }

    pub fn is_branch(&self) -> bool {
        self.0.starts_with(HEADS_PREFIX.as_bytes())
    }

    pub fn is_remote(&self) -> bool {
        self.0.starts_with(REMOTES_PREFIX.as_bytes())
    }

    pub fn is_special(&self) -> bool {
        SPECIAL_REFS.iter().any(|s| self.0 == s.as_bytes())
    }

    pub fn as_bstr(&self) -> &BStr {
        self.0.as_bstr()
    }

    pub fn as_str(&self) -> &str {
        // Validation admits only bytes that came from a &str or ASCII input.
        std::str::from_utf8(&self.0).unwrap_or("<invalid-utf8>")
    }
}

impl AsRef<BStr> for RefName {
    fn as_ref(&self) -> &BStr {
        self.0.as_bstr()
    }
}

impl fmt::Display for RefName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn validate_ref_name(name: &[u8]) -> Result<(), RefError> {
    let invalid = |reason: &str| {
        RefError::InvalidName(format!("'{}': {reason}", String::from_utf8_lossy(name)))
    };

    if name.is_empty() {
        return Err(RefError::InvalidName("ref name is empty".into()));
    }
    if name == b"@" {
        return Err(invalid("'@' is not a valid ref name"));
    }
    if std::str::from_utf8(name).is_err() {
        return Err(invalid("not valid UTF-8"));
    }
    if let Some(&b) = name.iter().find(|&&b| b < 0x20 || b == 0x7f) {
        return Err(invalid(&format!("contains control character 0x{b:02x}")));
    }
    if let Some(&b) = name.iter().find(|b| FORBIDDEN_CHARS.contains(b)) {
        return Err(invalid(&format!("contains forbidden character '{}'", b as char)));
    }
    if name.starts_with(b"/") || name.ends_with(b"/") {
        return Err(invalid("starts or ends with '/'"));
    }
    if name.ends_with(b".") {
        return Err(invalid("ends with '.'"));
    }
    for bad in [&b".."[..], b"//", b"@{"] {
        if name.find(bad).is_some() {
            return Err(invalid(&format!("contains '{}'", bad.as_bstr())));
        }
    }
    for component in name.split_str(b"/") {
        if component.starts_with(b".") {
            return Err(invalid("component starts with '.'"));
        }
        if component.ends_with(b".lock") {
            return Err(invalid("component ends with '.lock'"));
        }
    }
    Ok(())
}
