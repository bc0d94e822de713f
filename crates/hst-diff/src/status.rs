use std::collections::BTreeSet;
use std::fmt;

use bstr::{BStr, BString, ByteSlice};
use hst_object::PathMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    New,
    Deleted,
    Modified,
}

impl ChangeKind {
    /// Label used in status listings.
    pub fn label(&self) -> &'static str {
        match self {
            ChangeKind::New => "new file",
            ChangeKind::Deleted => "deleted",
            ChangeKind::Modified => "modified",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub path: BString,
    pub kind: ChangeKind,
}

impl Change {
    fn new(path: &BStr, kind: ChangeKind) -> Self {
        Self {
            path: path.to_owned(),
            kind,
        }
    }
}

/// Outcome of comparing recorded, staged and live snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    /// Staged differences from the recorded snapshot.
    pub to_commit: Vec<Change>,
    /// Live differences from the index for tracked paths.
    pub to_stage: Vec<Change>,
    /// Live paths the index does not know.
    pub untracked: Vec<BString>,
}

impl Classification {
    pub fn is_clean(&self) -> bool {
        self.to_commit.is_empty() && self.to_stage.is_empty() && self.untracked.is_empty()
    }
}

/// Paths whose id differs between `old` and `new`, in path order.
pub fn diff_maps(old: &PathMap, new: &PathMap) -> Vec<Change> {
    let paths: BTreeSet<&BString> = old.keys().chain(new.keys()).collect();
    paths
        .into_iter()
        .filter_map(|path| {
            let kind = match (old.get(path), new.get(path)) {
                (None, Some(_)) => ChangeKind::New,
                (Some(_), None) => ChangeKind::Deleted,
                (Some(a), Some(b)) if a != b => ChangeKind::Modified,
                _ => return None,
            };
            Some(Change::new(path.as_bstr(), kind))
        })
        .collect()
}

/// Three-way comparison by object id; file content is never looked at.
///
/// `recorded` vs `staged` gives the changes to be committed. `staged` vs
/// `live` gives unstaged deletions and modifications, and live paths that
/// are not staged at all are reported as untracked.
pub fn classify(recorded: &PathMap, staged: &PathMap, live: &PathMap) -> Classification {
    let to_commit = diff_maps(recorded, staged);

    let mut to_stage = Vec::new();
    let mut untracked = Vec::new();
    for change in diff_maps(staged, live) {
        match change.kind {
            ChangeKind::New => untracked.push(change.path),
            _ => to_stage.push(change),
        }
    }

    Classification {
        to_commit,
        to_stage,
        untracked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hst_hash::ObjectId;

    fn map(entries: &[(&str, u8)]) -> PathMap {
        entries
            .iter()
            .map(|(p, b)| (BString::from(*p), ObjectId::new([*b; 20])))
            .collect()
    }

    #[test]
    fn identical_snapshots_are_clean() {
        let m = map(&[("a", 1), ("dir/b", 2)]);
        let c = classify(&m, &m, &m);
        assert!(c.is_clean());
        assert_eq!(c, Classification::default());
    }

    #[test]
    fn staged_changes() {
        let recorded = map(&[("kept", 1), ("gone", 2), ("edited", 3)]);
        let staged = map(&[("kept", 1), ("edited", 4), ("added", 5)]);
        let c = classify(&recorded, &staged, &staged);

        assert_eq!(
            c.to_commit,
            [
                Change::new("added".into(), ChangeKind::New),
                Change::new("edited".into(), ChangeKind::Modified),
                Change::new("gone".into(), ChangeKind::Deleted),
            ]
        );
        assert!(c.to_stage.is_empty());
        assert!(c.untracked.is_empty());
    }

    #[test]
    fn unstaged_changes_and_untracked() {
        let staged = map(&[("a", 1), ("b", 2)]);
        let live = map(&[("a", 9), ("c", 3)]);
        let c = classify(&staged, &staged, &live);

        assert!(c.to_commit.is_empty());
        assert_eq!(
            c.to_stage,
            [
                Change::new("a".into(), ChangeKind::Modified),
                Change::new("b".into(), ChangeKind::Deleted),
            ]
        );
        assert_eq!(c.untracked, [BString::from("c")]);
    }

    #[test]
    fn path_can_be_staged_and_modified_again() {
        let recorded = map(&[("f", 1)]);
        let staged = map(&[("f", 2)]);
        let live = map(&[("f", 3)]);
        let c = classify(&recorded, &staged, &live);
        assert_eq!(c.to_commit[0].kind, ChangeKind::Modified);
        assert_eq!(c.to_stage[0].kind, ChangeKind::Modified);
    }

    #[test]
    fn labels() {
        assert_eq!(ChangeKind::New.to_string(), "new file");
        assert_eq!(ChangeKind::Deleted.label(), "deleted");
    }
}
