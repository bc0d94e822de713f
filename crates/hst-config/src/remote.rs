//! `[remote "<name>"]` sections.

use std::collections::BTreeMap;

use crate::error::ConfigError;
use crate::file::ConfigFile;
use crate::ConfigKey;

/// A configured remote repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remote {
    pub name: String,
    pub url: String,
    /// Fetch refspecs, e.g. `+refs/heads/*:refs/remotes/origin/*`.
    pub fetch: Vec<String>,
}

impl Remote {
    /// The refspec written for a newly added remote.
    pub fn default_fetch_refspec(name: &str) -> String {
        format!("+refs/heads/*:refs/remotes/{name}/*")
    }
}

impl ConfigFile {
    /// Register a remote with the default fetch refspec.
    pub fn add_remote(&mut self, name: &str, url: &str) -> Result<(), ConfigError> {
        if self.has_section("remote", Some(name)) {
            return Err(ConfigError::RemoteExists(name.to_string()));
        }
        self.set(&ConfigKey::new("remote", Some(name), "url"), url);
        self.set(
            &ConfigKey::new("remote", Some(name), "fetch"),
            &Remote::default_fetch_refspec(name),
        );
        tracing::debug!(remote = name, url, "added remote");
        Ok(())
    }

    pub fn remove_remote(&mut self, name: &str) -> Result<(), ConfigError> {
        if !self.remove_section("remote", Some(name)) {
            return Err(ConfigError::NoSuchRemote(name.to_string()));
        }
        tracing::debug!(remote = name, "removed remote");
        Ok(())
    }

    pub fn remote(&self, name: &str) -> Option<Remote> {
        let url = self.get_str(&ConfigKey::new("remote", Some(name), "url"))?;
        let fetch = self
            .get_all(&ConfigKey::new("remote", Some(name), "fetch"))
            .into_iter()
            .flatten()
            .map(str::to_string)
            .collect();
        Some(Remote {
            name: name.to_string(),
            url: url.to_string(),
            fetch,
        })
    }

    pub fn remote_url(&self, name: &str) -> Option<&str> {
        self.get_str(&ConfigKey::new("remote", Some(name), "url"))
    }

    /// Remote name to URL, sorted by name. Sections without a URL are skipped.
    pub fn remotes(&self) -> BTreeMap<String, String> {
        self.subsections("remote")
            .into_iter()
            .filter_map(|name| Some((name.to_string(), self.remote_url(name)?.to_string())))
            .collect()
    }
}
