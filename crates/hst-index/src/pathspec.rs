use bstr::{BStr, BString, ByteSlice};

/// A set of literal repository paths used to narrow an operation.
///
/// A path matches an entry when it is equal to it or names one of its parent
/// directories. An empty set matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pathspec {
    paths: Vec<BString>,
}

impl Pathspec {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<BString>,
    {
        let paths = paths
            .into_iter()
            .map(|p| normalize(p.into()))
            .collect();
        Self { paths }
    }

    /// Matches every path.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// The normalized paths, in the order given.
    pub fn paths(&self) -> &[BString] {
        &self.paths
    }

    pub fn matches(&self, path: &BStr) -> bool {
        if self.paths.is_empty() {
            return true;
        }
        self.paths.iter().any(|spec| {
            spec.is_empty()
                || path == spec.as_bstr()
                || (path.starts_with(spec) && path.get(spec.len()) == Some(&b'/'))
        })
    }
}

/// Strip `./` prefixes and trailing slashes; `.` becomes the empty (match-all) path.
fn normalize(mut path: BString) -> BString {
    while path.starts_with(b"./") {
        path.drain(..2);
    }
    while path.ends_with(b"/") {
        path.pop();
    }
    if path == "." {
        path.clear();
    }
    path
}
