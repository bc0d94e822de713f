use std::collections::BTreeMap;

use bstr::{BStr, BString, ByteSlice, ByteVec};
use hst_hash::ObjectId;
use hst_object::{FileMode, Object, PathMap, Tree, TreeEntry};
use hst_odb::{ObjectStore, ObjectStoreExt};

use crate::DiffError;

/// Flatten a tree into `path -> blob id`, joining directory names with `/`.
pub fn flatten_tree<S: ObjectStore + ?Sized>(
    store: &S,
    tree: &ObjectId,
) -> Result<PathMap, DiffError> {
    let mut files = PathMap::new();
    let mut pending: Vec<(BString, ObjectId)> = vec![(BString::default(), *tree)];

    while let Some((prefix, oid)) = pending.pop() {
        for entry in store.read_tree(&oid)?.iter() {
            let mut path = prefix.clone();
            if !path.is_empty() {
                path.push_byte(b'/');
            }
            path.push_str(&entry.name);

            if entry.mode.is_tree() {
                pending.push((path, entry.oid));
            } else {
                files.insert(path, entry.oid);
            }
        }
    }
    Ok(files)
}

/// Flatten the root tree of a commit.
pub fn flatten_commit<S: ObjectStore + ?Sized>(
    store: &S,
    commit: &ObjectId,
) -> Result<PathMap, DiffError> {
    let tree = store.read_commit(commit)?.tree;
    flatten_tree(store, &tree)
}

/// Store the nested trees for a flat snapshot and return the root tree id.
///
/// Subtrees are written before the tree that lists them. Every file is
/// recorded as a regular file.
pub fn write_tree<S: ObjectStore + ?Sized>(
    store: &S,
    files: &PathMap,
) -> Result<ObjectId, DiffError> {
    let entries = files.iter().map(|(path, oid)| (path.as_bstr(), *oid)).collect();
    let root = write_level(store, entries)?;
    tracing::debug!(files = files.len(), %root, "wrote tree");
    Ok(root)
}

fn write_level<S: ObjectStore + ?Sized>(
    store: &S,
    entries: Vec<(&BStr, ObjectId)>,
) -> Result<ObjectId, DiffError> {
    let mut rows = Vec::new();
    let mut dirs: BTreeMap<&BStr, Vec<(&BStr, ObjectId)>> = BTreeMap::new();

    for (path, oid) in entries {
        let (name, rest) = match path.find_byte(b'/') {
            Some(slash) => (path[..slash].as_bstr(), Some(path[slash + 1..].as_bstr())),
            None => (path, None),
        };
        if name.is_empty() || rest.is_some_and(|r| r.is_empty()) {
            return Err(DiffError::InvalidPath(path.to_owned()));
        }
        match rest {
            Some(rest) => dirs.entry(name).or_default().push((rest, oid)),
            None => rows.push(TreeEntry::new(FileMode::Regular, name, oid)),
        }
    }

    for (name, children) in dirs {
        let oid = write_level(store, children)?;
        rows.push(TreeEntry::new(FileMode::Tree, name, oid));
    }

    let tree = Tree::from_entries(rows)?;
    Ok(store.put(&Object::Tree(tree))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hst_object::Blob;
    use hst_odb::MemoryStore;

    fn blob(store: &MemoryStore, data: &str) -> ObjectId {
        store.put(&Object::Blob(Blob::new(data.as_bytes().to_vec()))).unwrap()
    }

    #[test]
    fn write_then_flatten_restores_paths() {
        let store = MemoryStore::new();
        let mut files = PathMap::new();
        files.insert("README".into(), blob(&store, "readme"));
        files.insert("src/main.rs".into(), blob(&store, "fn main() {}"));
        files.insert("src/util/mod.rs".into(), blob(&store, "// util"));

        let root = write_tree(&store, &files).unwrap();
        assert_eq!(flatten_tree(&store, &root).unwrap(), files);

        let top = store.read_tree(&root).unwrap();
        let src = top.find(b"src".as_bstr()).unwrap();
        assert_eq!(src.mode, FileMode::Tree);
        assert_eq!(store.read_tree(&src.oid).unwrap().len(), 2);
    }

    #[test]
    fn empty_snapshot_is_the_empty_tree() {
        let store = MemoryStore::new();
        let root = write_tree(&store, &PathMap::new()).unwrap();
        assert_eq!(root.to_hex(), "4b825dc642cb6eb9a060e54bf8d69288fbee4904");
        assert!(flatten_tree(&store, &root).unwrap().is_empty());
    }

    #[test]
    fn same_files_same_tree() {
        let store = MemoryStore::new();
        let a = blob(&store, "a");
        let b = blob(&store, "b");
        let mut one = PathMap::new();
        one.insert("x/b".into(), b);
        one.insert("x/a".into(), a);
        let mut two = PathMap::new();
        two.insert("x/a".into(), a);
        two.insert("x/b".into(), b);
        assert_eq!(write_tree(&store, &one).unwrap(), write_tree(&store, &two).unwrap());
    }

    #[test]
    fn malformed_paths_are_rejected() {
        let store = MemoryStore::new();
        let oid = blob(&store, "x");
        for bad in ["/abs", "dir/", "a//b"] {
            let mut files = PathMap::new();
            files.insert(bad.into(), oid);
            assert!(matches!(
                write_tree(&store, &files).unwrap_err(),
                DiffError::InvalidPath(_)
            ));
        }
    }

    #[test]
    fn file_and_directory_with_same_name_conflict() {
        let store = MemoryStore::new();
        let oid = blob(&store, "x");
        let mut files = PathMap::new();
        files.insert("a".into(), oid);
        files.insert("a/b".into(), oid);
        assert!(matches!(
            write_tree(&store, &files).unwrap_err(),
            DiffError::Object(_)
        ));
    }

    #[test]
    fn flatten_missing_tree_fails() {
        let store = MemoryStore::new();
        assert!(flatten_tree(&store, &ObjectId::new([1; 20])).is_err());
    }
}
