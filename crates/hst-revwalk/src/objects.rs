//! Object listing: every object reachable from a set of tips.
//!
//! Used to decide what has to be copied when objects move between stores.

use std::collections::{HashMap, HashSet};

use hst_hash::ObjectId;
use hst_object::Object;
use hst_odb::{ObjectStore, ObjectStoreExt};
use tracing::instrument;

use crate::walk::Walk;
use crate::RevWalkError;

/// Objects referenced directly by `obj`.
fn references(obj: &Object) -> Vec<ObjectId> {
    match obj {
        Object::Commit(commit) => {
            let mut out = Vec::with_capacity(1 + commit.parents.len());
            out.push(commit.tree);
            out.extend(commit.parents.iter().copied());
            out
        }
        Object::Tree(tree) => tree.iter().map(|e| e.oid).collect(),
        Object::Tag(tag) => vec![tag.target],
        Object::Blob(_) => Vec::new(),
    }
}

/// All objects reachable from `tips` (commits to their tree and parents,
/// trees to their entries, tags to their target), in dependency order:
/// every object comes after all objects it references.
///
/// Objects for which `skip` returns true are left out together with
/// everything only reachable through them. Copying in the returned order
/// therefore never links an object before its references exist.
#[instrument(skip(store, skip), level = "debug")]
pub fn reachable_objects<S, F>(
    store: &S,
    tips: &[ObjectId],
    skip: F,
) -> Result<Vec<ObjectId>, RevWalkError>
where
    S: ObjectStore + ?Sized,
    F: Fn(&ObjectId) -> bool,
{
    let mut edges: HashMap<ObjectId, Vec<ObjectId>> = HashMap::new();
    let starts: Vec<ObjectId> = tips.iter().copied().filter(|oid| !skip(oid)).collect();

    let walk = Walk::new(starts.iter().copied(), |oid: &ObjectId| -> Result<Vec<ObjectId>, RevWalkError> {
        let next: Vec<ObjectId> = references(&store.read_object(oid)?)
            .into_iter()
            .filter(|r| !skip(r))
            .collect();
        edges.insert(*oid, next.clone());
        Ok(next)
    });
    for oid in walk {
        oid?;
    }

    // Post-order over the recorded edges.
    let mut order = Vec::with_capacity(edges.len());
    let mut done = HashSet::with_capacity(edges.len());
    for tip in &starts {
        let mut stack = vec![(*tip, 0usize)];
        while let Some((oid, child)) = stack.pop() {
            if done.contains(&oid) {
                continue;
            }
            let children = edges.get(&oid).map(Vec::as_slice).unwrap_or_default();
            match children.get(child) {
                Some(next) => {
                    stack.push((oid, child + 1));
                    if !done.contains(next) {
                        stack.push((*next, 0));
                    }
                }
                None => {
                    done.insert(oid);
                    order.push(oid);
                }
            }
        }
    }

    tracing::debug!(count = order.len(), "listed reachable objects");
    Ok(order)
}
