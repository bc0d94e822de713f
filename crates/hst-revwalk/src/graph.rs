//! Ancestry and history queries over commit parent links.

use std::collections::HashMap;

use hst_hash::ObjectId;
use hst_object::Commit;
use hst_odb::{ObjectStore, ObjectStoreExt};
use tracing::instrument;

use crate::walk::Walk;
use crate::RevWalkError;

fn parents_of<S: ObjectStore + ?Sized>(
    store: &S,
) -> impl FnMut(&ObjectId) -> Result<Vec<ObjectId>, RevWalkError> + '_ {
    move |oid| Ok(store.read_commit(oid)?.parents)
}

/// Whether `ancestor` is reachable from `descendant` through parent links.
/// A commit is its own ancestor.
pub fn is_ancestor<S: ObjectStore + ?Sized>(
    store: &S,
    ancestor: &ObjectId,
    descendant: &ObjectId,
) -> Result<bool, RevWalkError> {
    for oid in Walk::new([*descendant], parents_of(store)) {
        if oid? == *ancestor {
            return Ok(true);
        }
    }
    Ok(false)
}

/// First commit found to be reachable from both `a` and `b`.
///
/// Two walks advance one step at a time in turn; the first node popped by
/// either walk that the other has already reached is the answer. `None`
/// means the histories share no commit.
#[instrument(skip(store), level = "debug")]
pub fn merge_base<S: ObjectStore + ?Sized>(
    store: &S,
    a: &ObjectId,
    b: &ObjectId,
) -> Result<Option<ObjectId>, RevWalkError> {
    let mut left = Walk::new([*a], parents_of(store));
    let mut right = Walk::new([*b], parents_of(store));

    while !left.is_exhausted() || !right.is_exhausted() {
        if let Some(oid) = left.step() {
            let oid = oid?;
            if right.has_seen(&oid) {
                return Ok(Some(oid));
            }
        }
        if let Some(oid) = right.step() {
            let oid = oid?;
            if left.has_seen(&oid) {
                return Ok(Some(oid));
            }
        }
    }
    tracing::debug!(%a, %b, "no common ancestor");
    Ok(None)
}

/// Follow first parents from `start`, newest first.
pub fn history<S: ObjectStore + ?Sized>(
    store: &S,
    start: &ObjectId,
    limit: Option<usize>,
) -> Result<Vec<(ObjectId, Commit)>, RevWalkError> {
    first_parent_commits(store, [*start], limit.unwrap_or(usize::MAX))
}

/// Union of the first-parent histories of several tips, ordered by
/// committer time, newest first. Commits with the same time are ordered by
/// id so the listing is stable.
pub fn history_multi<S: ObjectStore + ?Sized>(
    store: &S,
    starts: &[ObjectId],
    limit: Option<usize>,
) -> Result<Vec<(ObjectId, Commit)>, RevWalkError> {
    let mut commits = first_parent_commits(store, starts.iter().copied(), usize::MAX)?;
    commits.sort_by(|(a_oid, a), (b_oid, b)| {
        b.committer
            .date
            .timestamp
            .cmp(&a.committer.date.timestamp)
            .then_with(|| a_oid.cmp(b_oid))
    });
    if let Some(limit) = limit {
        commits.truncate(limit);
    }
    Ok(commits)
}

fn first_parent_commits<S: ObjectStore + ?Sized>(
    store: &S,
    starts: impl IntoIterator<Item = ObjectId>,
    limit: usize,
) -> Result<Vec<(ObjectId, Commit)>, RevWalkError> {
    let mut loaded = HashMap::new();
    let mut order = Vec::new();
    let walk = Walk::new(starts, |oid: &ObjectId| -> Result<Vec<ObjectId>, RevWalkError> {
        let commit = store.read_commit(oid)?;
        let next = commit.first_parent().copied().into_iter().collect();
        loaded.insert(*oid, commit);
        Ok(next)
    });
    for oid in walk.take(limit) {
        order.push(oid?);
    }
    Ok(order
        .into_iter()
        .filter_map(|oid| loaded.remove(&oid).map(|c| (oid, c)))
        .collect())
}

/// Commits on the first-parent chain from `tip` back to `stop` (exclusive),
/// oldest first. If `stop` is not on the chain, the whole chain down to the
/// root commit is returned.
pub fn first_parent_path<S: ObjectStore + ?Sized>(
    store: &S,
    tip: &ObjectId,
    stop: &ObjectId,
) -> Result<Vec<ObjectId>, RevWalkError> {
    let mut path = Vec::new();
    let walk = Walk::new([*tip], |oid: &ObjectId| -> Result<Vec<ObjectId>, RevWalkError> {
        if oid == stop {
            return Ok(Vec::new());
        }
        Ok(store.read_commit(oid)?.first_parent().copied().into_iter().collect())
    });
    for oid in walk {
        let oid = oid?;
        if oid == *stop {
            break;
        }
        path.push(oid);
    }
    path.reverse();
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hst_object::{Object, Tree};
    use hst_odb::MemoryStore;
    use hst_utils::{GitDate, Signature};

    struct Graph {
        store: MemoryStore,
        empty_tree: ObjectId,
    }

    impl Graph {
        fn new() -> Self {
            let store = MemoryStore::new();
            let empty_tree = store.put(&Object::Tree(Tree::new())).unwrap();
            Self { store, empty_tree }
        }

        fn commit(&self, parents: &[ObjectId], ts: i64, msg: &str) -> ObjectId {
            let sig = Signature::new("tester", GitDate::new(ts, 0));
            let commit = Commit::new(self.empty_tree, parents.to_vec(), sig.clone(), sig, msg);
            self.store.put(&Object::Commit(commit)).unwrap()
        }
    }

    #[test]
    fn ancestor_is_reflexive() {
        let g = Graph::new();
        let a = g.commit(&[], 1, "a");
        assert!(is_ancestor(&g.store, &a, &a).unwrap());
    }

    #[test]
    fn ancestry_follows_all_parents() {
        let g = Graph::new();
        let a = g.commit(&[], 1, "a");
        let b = g.commit(&[a], 2, "b");
        let side = g.commit(&[], 3, "side");
        let m = g.commit(&[b, side], 4, "merge");

        assert!(is_ancestor(&g.store, &a, &m).unwrap());
        assert!(is_ancestor(&g.store, &side, &m).unwrap());
        assert!(!is_ancestor(&g.store, &m, &a).unwrap());
        assert!(!is_ancestor(&g.store, &side, &b).unwrap());
    }

    #[test]
    fn diamond_merge_base() {
        let g = Graph::new();
        let a = g.commit(&[], 1, "a");
        let b = g.commit(&[a], 2, "b");
        let c = g.commit(&[a], 3, "c");
        let d = g.commit(&[b, c], 4, "d");

        assert_eq!(merge_base(&g.store, &b, &c).unwrap(), Some(a));
        assert_eq!(merge_base(&g.store, &c, &b).unwrap(), Some(a));
        assert_eq!(merge_base(&g.store, &d, &b).unwrap(), Some(b));
        assert_eq!(merge_base(&g.store, &d, &d).unwrap(), Some(d));
    }

    #[test]
    fn merge_base_with_uneven_branch_lengths() {
        let g = Graph::new();
        let base = g.commit(&[], 1, "base");
        let mut long = base;
        for ts in 2..12 {
            long = g.commit(&[long], ts, "long");
        }
        let short = g.commit(&[base], 20, "short");
        assert_eq!(merge_base(&g.store, &long, &short).unwrap(), Some(base));
    }

    #[test]
    fn disconnected_histories_have_no_base() {
        let g = Graph::new();
        let a = g.commit(&[], 1, "a");
        let b = g.commit(&[], 2, "b");
        assert_eq!(merge_base(&g.store, &a, &b).unwrap(), None);
    }

    #[test]
    fn missing_commit_is_reported() {
        let g = Graph::new();
        let ghost = ObjectId::new([9; 20]);
        let a = g.commit(&[ghost], 1, "a");
        assert!(matches!(
            is_ancestor(&g.store, &ObjectId::NULL, &a).unwrap_err(),
            RevWalkError::Odb(hst_odb::OdbError::NotFound(o)) if o == ghost
        ));
    }

    #[test]
    fn history_follows_first_parent() {
        let g = Graph::new();
        let a = g.commit(&[], 1, "a");
        let b = g.commit(&[a], 2, "b");
        let side = g.commit(&[a], 3, "side");
        let m = g.commit(&[b, side], 4, "m");

        let ids: Vec<_> = history(&g.store, &m, None).unwrap().into_iter().map(|(o, _)| o).collect();
        assert_eq!(ids, [m, b, a]);

        let limited = history(&g.store, &m, Some(2)).unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[1].1.message, "b");
    }

    #[test]
    fn history_multi_interleaves_by_time() {
        let g = Graph::new();
        let root = g.commit(&[], 1, "root");
        let x1 = g.commit(&[root], 2, "x1");
        let y1 = g.commit(&[root], 3, "y1");
        let x2 = g.commit(&[x1], 4, "x2");

        let ids: Vec<_> = history_multi(&g.store, &[x2, y1], None)
            .unwrap()
            .into_iter()
            .map(|(o, _)| o)
            .collect();
        assert_eq!(ids, [x2, y1, x1, root]);

        assert_eq!(history_multi(&g.store, &[x2, y1], Some(1)).unwrap().len(), 1);
    }

    #[test]
    fn first_parent_path_is_chronological() {
        let g = Graph::new();
        let m = g.commit(&[], 1, "m");
        let t1 = g.commit(&[m], 2, "t1");
        let t2 = g.commit(&[t1], 3, "t2");

        assert_eq!(first_parent_path(&g.store, &t2, &m).unwrap(), [t1, t2]);
        assert!(first_parent_path(&g.store, &m, &m).unwrap().is_empty());
        assert_eq!(
            first_parent_path(&g.store, &t2, &ObjectId::NULL).unwrap(),
            [m, t1, t2]
        );
    }
}
