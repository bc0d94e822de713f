//! Branches and switching between them.

use hst_diff::flatten_commit;
use hst_hash::ObjectId;
use hst_ref::{RefName, RefStore};
use tracing::instrument;

use crate::{RepoError, Repository};

impl Repository {
    /// Create `refs/heads/<name>` at `at`. Fails if the branch exists.
    pub fn create_branch(&self, name: &str, at: &ObjectId) -> Result<(), RepoError> {
        let refname = RefName::branch(name)?;
        if self.refs.resolve(&refname)?.is_some() {
            return Err(RepoError::BranchExists(name.to_string()));
        }
        self.refs.write_ref(&refname, at)?;
        tracing::debug!(branch = name, %at, "created branch");
        Ok(())
    }

    /// Delete a branch other than the checked-out one.
    pub fn delete_branch(&self, name: &str) -> Result<ObjectId, RepoError> {
        if self.current_branch()?.as_deref() == Some(name) {
            return Err(RepoError::CannotDeleteCurrentBranch(name.to_string()));
        }
        let refname = RefName::branch(name)?;
        let oid = self
            .refs
            .resolve_to_oid(&refname)?
            .ok_or_else(|| RepoError::BranchNotFound(name.to_string()))?;
        self.refs.delete_ref(&refname)?;
        tracing::debug!(branch = name, "deleted branch");
        Ok(oid)
    }

    /// Local branches and their commits, sorted by name.
    pub fn branches(&self) -> Result<Vec<(String, ObjectId)>, RepoError> {
        self.list_refs("refs/heads/")
    }

    /// Remote-tracking branches as `<remote>/<branch>`, sorted.
    pub fn remote_branches(&self) -> Result<Vec<(String, ObjectId)>, RepoError> {
        self.list_refs("refs/remotes/")
    }

    fn list_refs(&self, prefix: &str) -> Result<Vec<(String, ObjectId)>, RepoError> {
        let mut out = Vec::new();
        for reference in self.refs.iter(Some(prefix))? {
            if let Some(oid) = reference.target_oid() {
                let name = reference.name().as_str();
                out.push((name[prefix.len()..].to_string(), oid));
            }
        }
        out.sort();
        Ok(out)
    }

    /// Check out branch `name` and point HEAD at it.
    ///
    /// With `create`, the branch is first created at HEAD; the working tree
    /// is untouched because the commit does not change. Otherwise the branch
    /// must exist and the switch is refused if it would overwrite local
    /// changes.
    #[instrument(skip(self), level = "debug")]
    pub fn switch(&self, name: &str, create: bool) -> Result<(), RepoError> {
        self.refuse_during_merge("switch branches")?;
        let head = self.head_oid()?;

        if create {
            if let Some(head) = head {
                self.create_branch(name, &head)?;
            } else if self.refs.resolve(&RefName::branch(name)?)?.is_some() {
                return Err(RepoError::BranchExists(name.to_string()));
            }
            self.set_head_branch(name)?;
            tracing::info!(branch = name, "switched to a new branch");
            return Ok(());
        }

        let target = self
            .refs
            .resolve_to_oid(&RefName::branch(name)?)?
            .ok_or_else(|| RepoError::BranchNotFound(name.to_string()))?;

        if head != Some(target) {
            let files = flatten_commit(&self.odb, &target)?;
            self.ensure_clean_for(&files)?;
            self.checkout_commit(&target)?;
        }
        self.set_head_branch(name)?;
        tracing::info!(branch = name, "switched branch");
        Ok(())
    }
}
