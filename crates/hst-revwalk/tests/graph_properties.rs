//! Properties of the ancestry queries over randomly shaped histories.

use hst_hash::ObjectId;
use hst_object::{Commit, Object, Tree};
use hst_odb::{MemoryStore, ObjectStoreExt};
use hst_revwalk::{history, is_ancestor, merge_base};
use hst_utils::{GitDate, Signature};
use proptest::prelude::*;

/// Build a DAG where commit `i` picks its parents among commits `< i`.
/// `choices[i]` holds raw picks that are reduced modulo `i`.
fn build(choices: &[Vec<usize>]) -> (MemoryStore, Vec<ObjectId>) {
    let store = MemoryStore::new();
    let tree = store.put(&Object::Tree(Tree::new())).unwrap();
    let mut ids: Vec<ObjectId> = Vec::new();

    for (i, picks) in choices.iter().enumerate() {
        let mut parents = Vec::new();
        if i > 0 {
            for p in picks {
                let parent = ids[p % i];
                if !parents.contains(&parent) {
                    parents.push(parent);
                }
            }
        }
        let sig = Signature::new("prop", GitDate::new(i as i64, 0));
        let commit = Commit::new(tree, parents, sig.clone(), sig, format!("c{i}"));
        ids.push(store.put(&Object::Commit(commit)).unwrap());
    }
    (store, ids)
}

fn dag() -> impl Strategy<Value = Vec<Vec<usize>>> {
    prop::collection::vec(prop::collection::vec(0usize..64, 0..3), 1..24)
}

proptest! {
    #[test]
    fn every_commit_is_its_own_ancestor(choices in dag()) {
        let (store, ids) = build(&choices);
        for id in &ids {
            prop_assert!(is_ancestor(&store, id, id).unwrap());
        }
    }

    #[test]
    fn parents_are_ancestors(choices in dag()) {
        let (store, ids) = build(&choices);
        for id in &ids {
            for parent in store.read_commit(id).unwrap().parents {
                prop_assert!(is_ancestor(&store, &parent, id).unwrap());
                prop_assert!(!is_ancestor(&store, id, &parent).unwrap());
            }
        }
    }

    #[test]
    fn merge_base_is_common_ancestor(choices in dag(), x in 0usize..64, y in 0usize..64) {
        let (store, ids) = build(&choices);
        let a = ids[x % ids.len()];
        let b = ids[y % ids.len()];

        match merge_base(&store, &a, &b).unwrap() {
            Some(base) => {
                prop_assert!(is_ancestor(&store, &base, &a).unwrap());
                prop_assert!(is_ancestor(&store, &base, &b).unwrap());
            }
            None => {
                let from_a = history(&store, &a, None).unwrap();
                let from_b = history(&store, &b, None).unwrap();
                for (oid, _) in &from_a {
                    prop_assert!(!from_b.iter().any(|(o, _)| o == oid));
                }
            }
        }
    }
}
