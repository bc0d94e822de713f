use std::collections::{HashSet, VecDeque};

use hst_hash::ObjectId;

/// Breadth-first traversal from a set of starting nodes.
///
/// The graph is given by `expand`, which returns the neighbors of a node
/// (parents of a commit, entries of a tree, ...). A node is queued at most
/// once no matter how many paths lead to it, so `expand` runs at most once
/// per node and the walk terminates on any finite graph.
///
/// Nodes come out in FIFO order. An error from `expand` is yielded in place
/// of the node that caused it and ends the walk.
pub struct Walk<F> {
    frontier: VecDeque<ObjectId>,
    seen: HashSet<ObjectId>,
    expand: F,
}

impl<F, E> Walk<F>
where
    F: FnMut(&ObjectId) -> Result<Vec<ObjectId>, E>,
{
    pub fn new(starts: impl IntoIterator<Item = ObjectId>, expand: F) -> Self {
        let mut walk = Self {
            frontier: VecDeque::new(),
            seen: HashSet::new(),
            expand,
        };
        for oid in starts {
            walk.enqueue(oid);
        }
        walk
    }

    fn enqueue(&mut self, oid: ObjectId) {
        if self.seen.insert(oid) {
            self.frontier.push_back(oid);
        }
    }

    /// Pop the next node, expand it and queue its unseen neighbors.
    pub fn step(&mut self) -> Option<Result<ObjectId, E>> {
        let oid = self.frontier.pop_front()?;
        match (self.expand)(&oid) {
            Ok(next) => {
                for n in next {
                    self.enqueue(n);
                }
                Some(Ok(oid))
            }
            Err(e) => {
                self.frontier.clear();
                Some(Err(e))
            }
        }
    }

    /// Whether `oid` has been reached, either expanded or still queued.
    pub fn has_seen(&self, oid: &ObjectId) -> bool {
        self.seen.contains(oid)
    }

    pub fn is_exhausted(&self) -> bool {
        self.frontier.is_empty()
    }

    pub fn seen(&self) -> &HashSet<ObjectId> {
        &self.seen
    }
}

impl<F, E> Iterator for Walk<F>
where
    F: FnMut(&ObjectId) -> Result<Vec<ObjectId>, E>,
{
    type Item = Result<ObjectId, E>;

    fn next(&mut self) -> Option<Self::Item> {
        self.step()
    }
}
