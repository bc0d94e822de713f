use std::fs;

use hst_ref::{RefName, RefStore};

use crate::{RepoError, Repository};

impl Repository {
    /// Register remote `name` at `url` and create `refs/remotes/<name>/`.
    pub fn add_remote(&mut self, name: &str, url: &str) -> Result<(), RepoError> {
        self.config.add_remote(name, url)?;
        self.save_config()?;
        fs::create_dir_all(self.hst_dir.join("refs").join("remotes").join(name))?;
        tracing::info!(remote = name, url, "added remote");
        Ok(())
    }

    /// Forget remote `name` together with its remote-tracking branches.
    pub fn remove_remote(&mut self, name: &str) -> Result<(), RepoError> {
        self.config.remove_remote(name)?;
        self.save_config()?;

        let prefix = format!("refs/remotes/{name}/");
        let tracking: Vec<RefName> = self
            .refs
            .iter(Some(&prefix))?
            .into_iter()
            .map(|r| r.name().clone())
            .collect();
        for refname in &tracking {
            self.refs.delete_ref(refname)?;
        }

        let dir = self.hst_dir.join("refs").join("remotes").join(name);
        match fs::remove_dir_all(&dir) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        tracing::info!(remote = name, removed = tracking.len(), "removed remote");
        Ok(())
    }

    /// URL of remote `name`, if configured.
    pub fn remote_url(&self, name: &str) -> Option<&str> {
        self.config.remote_url(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hst_hash::ObjectId;

    #[test]
    fn add_and_remove_remote() {
        let dir = tempfile::tempdir().unwrap();
        let mut repo = Repository::init(dir.path()).unwrap();
        repo.add_remote("origin", "/srv/upstream").unwrap();
        assert!(repo.hst_dir().join("refs/remotes/origin").is_dir());
        assert_eq!(repo.remote_url("origin"), Some("/srv/upstream"));
        assert!(matches!(
            repo.add_remote("origin", "/elsewhere"),
            Err(RepoError::Config(_))
        ));

        // Survives a reopen.
        let reopened = Repository::open(dir.path()).unwrap();
        assert_eq!(reopened.remote_url("origin"), Some("/srv/upstream"));

        let oid = ObjectId::new([7; 20]);
        repo.refs()
            .write_ref(&RefName::remote_tracking("origin", "main").unwrap(), &oid)
            .unwrap();
        assert_eq!(repo.remote_branches().unwrap(), [("origin/main".to_string(), oid)]);

        repo.remove_remote("origin").unwrap();
        assert!(repo.remote_branches().unwrap().is_empty());
        assert!(!repo.hst_dir().join("refs/remotes/origin").exists());
        assert!(repo.remote_url("origin").is_none());
        assert!(matches!(
            repo.remove_remote("origin"),
            Err(RepoError::Config(_))
        ));
    }
}
