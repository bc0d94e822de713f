use std::collections::BTreeSet;

use bstr::{BString, ByteVec};
use hst_diff::PathMap;
use hst_hash::ObjectId;
use hst_object::{Blob, Object};
use hst_odb::{ObjectStore, ObjectStoreExt};
use tracing::instrument;

use crate::conflict::conflict_content;
use crate::MergeError;

/// Result of merging three flat snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeMerge {
    /// The merged snapshot. Conflicted paths point at marker blobs.
    pub merged: PathMap,
    /// Conflicted paths, in path order.
    pub conflicts: Vec<BString>,
}

impl TreeMerge {
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }
}

/// Three-way merge of `current` and `target` against their common `base`.
///
/// Per path, comparing blob ids:
/// - if current and target agree, keep that (including both absent);
/// - if only one side moved away from base, take that side;
/// - otherwise store a conflict blob holding both sides and record the path.
///
/// A path left as a file while another merged path lives beneath it is also
/// a conflict: the directory stays and the file moves to `<path>~HEAD` or
/// `<path>~MERGE_HEAD`, named for the side that had it.
#[instrument(skip_all, level = "debug")]
pub fn merge_trees<S: ObjectStore + ?Sized>(
    store: &S,
    base: &PathMap,
    current: &PathMap,
    target: &PathMap,
) -> Result<TreeMerge, MergeError> {
    let paths: BTreeSet<&BString> = base
        .keys()
        .chain(current.keys())
        .chain(target.keys())
        .collect();

    let mut result = TreeMerge::default();
    for path in paths {
        let b = base.get(path);
        let c = current.get(path);
        let t = target.get(path);

        let pick = if c == t {
            c
        } else if b == c {
            t
        } else if b == t {
            c
        } else {
            let oid = store_conflict(store, c, t)?;
            tracing::debug!(%path, "conflict");
            result.merged.insert(path.clone(), oid);
            result.conflicts.push(path.clone());
            continue;
        };

        if let Some(oid) = pick {
            result.merged.insert(path.clone(), *oid);
        }
    }
    move_files_out_of_directories(current, &mut result);
    Ok(result)
}

fn move_files_out_of_directories(current: &PathMap, result: &mut TreeMerge) {
    let clashing: Vec<BString> = result
        .merged
        .keys()
        .filter(|path| {
            let mut dir = (*path).clone();
            dir.push(b'/');
            result
                .merged
                .range::<BString, _>(&dir..)
                .next()
                .is_some_and(|(nested, _)| nested.starts_with(dir.as_slice()))
        })
        .cloned()
        .collect();

    for path in clashing {
        let Some(oid) = result.merged.remove(&path) else {
            continue;
        };
        let side = if current.contains_key(&path) {
            "HEAD"
        } else {
            "MERGE_HEAD"
        };
        let mut aside = path.clone();
        aside.push_str(format!("~{side}"));
        tracing::debug!(%path, %aside, "file/directory conflict");
        result.merged.insert(aside, oid);
        if !result.conflicts.contains(&path) {
            result.conflicts.push(path);
        }
    }
    result.conflicts.sort();
}

fn store_conflict<S: ObjectStore + ?Sized>(
    store: &S,
    current: Option<&ObjectId>,
    target: Option<&ObjectId>,
) -> Result<ObjectId, MergeError> {
    let read = |oid: Option<&ObjectId>| -> Result<Option<Vec<u8>>, MergeError> {
        match oid {
            Some(oid) => Ok(Some(store.read_blob(oid)?.data)),
            None => Ok(None),
        }
    };
    let current = read(current)?;
    let target = read(target)?;
    let content = conflict_content(current.as_deref(), target.as_deref());
    Ok(store.put(&Object::Blob(Blob::new(content)))?)
}
