//! The persisted merge state.
//!
//! A conflicted merge leaves three files in the `.hst` directory:
//! `MERGE_HEAD` (the commit being merged), `MERGE_MSG` (the pending message
//! listing the conflicted paths) and `ORIG_HEAD` (the commit before the
//! merge). `MERGE_HEAD` alone decides whether a merge is in progress.

use std::fs;
use std::path::Path;

use bstr::{BString, ByteSlice};
use hst_hash::ObjectId;
use hst_repository::MERGE_HEAD;
use hst_utils::lockfile::write_atomic;

use crate::MergeError;

const MERGE_MSG: &str = "MERGE_MSG";
const ORIG_HEAD: &str = "ORIG_HEAD";

/// Where a merge stands.
///
/// `Idle` and `ThreeWayInProgress` are read back from disk; `Resolved` and
/// `Aborted` are what continuing or aborting a merge ends in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeState {
    Idle,
    ThreeWayInProgress {
        target: ObjectId,
        conflicts: Vec<BString>,
    },
    Resolved(ObjectId),
    Aborted,
}

impl MergeState {
    /// Read the state recorded under `hst_dir`.
    pub fn load(hst_dir: &Path) -> Result<Self, MergeError> {
        let head = match fs::read_to_string(hst_dir.join(MERGE_HEAD)) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(MergeState::Idle),
            Err(e) => return Err(e.into()),
        };
        let target = ObjectId::from_hex(head.trim())
            .map_err(|e| MergeError::CorruptState(format!("{MERGE_HEAD}: {e}")))?;
        let conflicts = match fs::read(hst_dir.join(MERGE_MSG)) {
            Ok(msg) => parse_conflicts(&msg),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(MergeState::ThreeWayInProgress { target, conflicts })
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self, MergeState::ThreeWayInProgress { .. })
    }
}

/// The pending commit message for a conflicted merge.
pub fn merge_message(conflicts: &[BString]) -> BString {
    let mut msg = BString::from("Merge commit\n\nConflicts:\n");
    for path in conflicts {
        msg.push(b'\t');
        msg.extend_from_slice(path);
        msg.push(b'\n');
    }
    msg
}

fn parse_conflicts(msg: &[u8]) -> Vec<BString> {
    msg.lines()
        .skip_while(|line| *line != b"Conflicts:".as_slice())
        .skip(1)
        .filter_map(|line| line.strip_prefix(b"\t"))
        .map(BString::from)
        .collect()
}

/// Record an in-progress merge of `target` into `orig_head`.
pub(crate) fn save(
    hst_dir: &Path,
    orig_head: &ObjectId,
    target: &ObjectId,
    conflicts: &[BString],
) -> Result<(), MergeError> {
    write_atomic(hst_dir.join(ORIG_HEAD), format!("{orig_head}\n").as_bytes())?;
    write_atomic(hst_dir.join(MERGE_MSG), &merge_message(conflicts))?;
    // Written last: its presence marks the merge as started.
    write_atomic(hst_dir.join(MERGE_HEAD), format!("{target}\n").as_bytes())?;
    tracing::info!(%target, conflicts = conflicts.len(), "merge stopped on conflicts");
    Ok(())
}

/// The pending message, if any.
pub(crate) fn pending_message(hst_dir: &Path) -> Result<Option<BString>, MergeError> {
    match fs::read(hst_dir.join(MERGE_MSG)) {
        Ok(msg) => Ok(Some(msg.into())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// The commit recorded before the merge started.
pub(crate) fn orig_head(hst_dir: &Path) -> Result<Option<ObjectId>, MergeError> {
    match fs::read_to_string(hst_dir.join(ORIG_HEAD)) {
        Ok(s) => ObjectId::from_hex(s.trim())
            .map(Some)
            .map_err(|e| MergeError::CorruptState(format!("{ORIG_HEAD}: {e}"))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Remove `MERGE_HEAD` and `MERGE_MSG`. `ORIG_HEAD` is kept.
pub(crate) fn clear(hst_dir: &Path) -> Result<(), MergeError> {
    for name in [MERGE_HEAD, MERGE_MSG] {
        match fs::remove_file(hst_dir.join(name)) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_files_mean_idle() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(MergeState::load(dir.path()).unwrap(), MergeState::Idle);
        assert!(orig_head(dir.path()).unwrap().is_none());
    }

    #[test]
    fn save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let orig = ObjectId::new([1; 20]);
        let target = ObjectId::new([2; 20]);
        let conflicts = vec![BString::from("a.txt"), BString::from("dir/b")];
        save(dir.path(), &orig, &target, &conflicts).unwrap();

        assert_eq!(
            fs::read_to_string(dir.path().join("MERGE_MSG")).unwrap(),
            "Merge commit\n\nConflicts:\n\ta.txt\n\tdir/b\n"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("MERGE_HEAD")).unwrap(),
            format!("{target}\n")
        );
        let state = MergeState::load(dir.path()).unwrap();
        assert!(state.is_in_progress());
        assert_eq!(state, MergeState::ThreeWayInProgress { target, conflicts });
        assert_eq!(orig_head(dir.path()).unwrap(), Some(orig));

        clear(dir.path()).unwrap();
        assert_eq!(MergeState::load(dir.path()).unwrap(), MergeState::Idle);
        assert!(pending_message(dir.path()).unwrap().is_none());
    }

    #[test]
    fn garbage_merge_head_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("MERGE_HEAD"), "not-an-id\n").unwrap();
        assert!(matches!(
            MergeState::load(dir.path()),
            Err(MergeError::CorruptState(_))
        ));
    }
}
