use bstr::BString;
use hst_diff::write_tree;
use hst_hash::ObjectId;
use hst_object::{Commit, Object};
use hst_odb::ObjectStoreExt;
use hst_utils::date::Signature;
use tracing::instrument;

use crate::{RepoError, Repository};

impl Repository {
    /// Record the index as a new commit on top of HEAD and advance HEAD.
    ///
    /// Refuses with [`RepoError::NothingToCommit`] when the index is empty or
    /// its tree is the one HEAD already records, and with
    /// [`RepoError::MergeInProgress`] while a conflicted merge is pending.
    #[instrument(skip(self, message), level = "debug")]
    pub fn commit(&self, message: &str) -> Result<ObjectId, RepoError> {
        self.refuse_during_merge("commit")?;
        let index = self.index()?;
        if index.is_empty() {
            return Err(RepoError::NothingToCommit);
        }
        let tree = write_tree(&self.odb, index.entries())?;

        let head = self.head_oid()?;
        if let Some(head) = head {
            if self.odb.read_commit(&head)?.tree == tree {
                return Err(RepoError::NothingToCommit);
            }
        }

        let signature = self.signature();
        let parents = head.into_iter().collect();
        self.write_commit(tree, parents, signature.clone(), signature, message)
    }

    /// Replace HEAD's commit with one recording the current index.
    ///
    /// Parents, author and author date are kept; the committer is refreshed.
    /// Without a new message the old one is reused.
    #[instrument(skip(self, message), level = "debug")]
    pub fn amend(&self, message: Option<&str>) -> Result<ObjectId, RepoError> {
        self.refuse_during_merge("amend")?;
        let head = self.head_commit()?;
        let old = self.odb.read_commit(&head)?;
        let index = self.index()?;
        if index.is_empty() {
            return Err(RepoError::NothingToCommit);
        }
        let tree = write_tree(&self.odb, index.entries())?;

        let message = match message {
            Some(m) => BString::from(m),
            None => old.message.clone(),
        };
        self.write_commit(tree, old.parents, old.author, self.signature(), message)
    }

    /// Store a commit and move HEAD to it.
    pub fn write_commit(
        &self,
        tree: ObjectId,
        parents: Vec<ObjectId>,
        author: Signature,
        committer: Signature,
        message: impl Into<BString>,
    ) -> Result<ObjectId, RepoError> {
        let commit = Commit::new(tree, parents, author, committer, message);
        let oid = self.odb.put(&Object::Commit(commit))?;
        self.update_head(&oid)?;
        tracing::info!(%oid, "created commit");
        Ok(oid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hst_index::Pathspec;
    use std::fs;

    fn repo() -> (tempfile::TempDir, Repository) {
        let dir = tempfile::tempdir().unwrap();
        let mut repo = Repository::init(dir.path()).unwrap();
        repo.config_mut()
            .set(&hst_config::ConfigKey::new("user", None, "name"), "Tester");
        (dir, repo)
    }

    fn stage(repo: &Repository, path: &str, data: &str) {
        fs::write(repo.work_tree().join(path), data).unwrap();
        repo.add(&Pathspec::new([path])).unwrap();
    }

    #[test]
    fn empty_index_has_nothing_to_commit() {
        let (_dir, repo) = repo();
        assert!(matches!(repo.commit("m\n"), Err(RepoError::NothingToCommit)));
    }

    #[test]
    fn commits_chain_through_head() {
        let (_dir, repo) = repo();
        stage(&repo, "a", "1");
        let first = repo.commit("first\n").unwrap();
        stage(&repo, "a", "2");
        let second = repo.commit("second\n").unwrap();

        assert_eq!(repo.head_oid().unwrap(), Some(second));
        let c = repo.odb().read_commit(&second).unwrap();
        assert_eq!(c.parents, [first]);
        assert_eq!(c.message, "second\n");
        assert_eq!(c.author.name(), "Tester");
        assert!(repo.odb().read_commit(&first).unwrap().is_root());
    }

    #[test]
    fn unchanged_tree_is_refused() {
        let (_dir, repo) = repo();
        stage(&repo, "a", "1");
        repo.commit("one\n").unwrap();
        assert!(matches!(repo.commit("again\n"), Err(RepoError::NothingToCommit)));
    }

    #[test]
    fn amend_keeps_parents_and_author() {
        let (_dir, repo) = repo();
        stage(&repo, "a", "1");
        let root = repo.commit("root\n").unwrap();
        stage(&repo, "a", "2");
        let tip = repo.commit("tpyo\n").unwrap();
        let before = repo.odb().read_commit(&tip).unwrap();

        stage(&repo, "b", "3");
        let amended = repo.amend(Some("typo\n")).unwrap();
        let after = repo.odb().read_commit(&amended).unwrap();

        assert_ne!(amended, tip);
        assert_eq!(after.parents, [root]);
        assert_eq!(after.author, before.author);
        assert_eq!(after.message, "typo\n");
        assert_ne!(after.tree, before.tree);
        assert_eq!(repo.head_oid().unwrap(), Some(amended));

        let reworded = repo.amend(None).unwrap();
        assert_eq!(repo.odb().read_commit(&reworded).unwrap().message, "typo\n");
    }

    #[test]
    fn amend_needs_a_commit() {
        let (_dir, repo) = repo();
        stage(&repo, "a", "1");
        assert!(matches!(repo.amend(None), Err(RepoError::UnbornHead)));
    }
}
