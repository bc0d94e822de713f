//! Refspecs: which remote refs land where.

use crate::TransferError;

/// A refspec for fetch, e.g. `+refs/heads/*:refs/remotes/origin/*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Refspec {
    /// Left side of the colon.
    pub source: String,
    /// Right side of the colon; empty when the spec names only a source.
    pub destination: String,
    /// Leading `+`: update even when not a fast-forward.
    pub force: bool,
}

impl Refspec {
    pub fn parse(spec: &str) -> Result<Self, TransferError> {
        let invalid = || TransferError::InvalidRefspec(spec.to_string());
        let trimmed = spec.trim();
        let (force, rest) = match trimmed.strip_prefix('+') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let (source, destination) = rest.split_once(':').unwrap_or((rest, ""));
        if source.is_empty() {
            return Err(invalid());
        }

        let stars = (source.matches('*').count(), destination.matches('*').count());
        match stars {
            (0, 0) | (1, 1) => {}
            (1, 0) if destination.is_empty() => {}
            _ => return Err(invalid()),
        }

        Ok(Refspec {
            source: source.to_string(),
            destination: destination.to_string(),
            force,
        })
    }

    /// Every branch of `remote` onto its remote-tracking ref.
    pub fn default_fetch(remote: &str) -> Self {
        Refspec {
            source: "refs/heads/*".into(),
            destination: format!("refs/remotes/{remote}/*"),
            force: true,
        }
    }

    /// One branch of `remote` onto its remote-tracking ref.
    pub fn tracking(remote: &str, branch: &str) -> Self {
        Refspec {
            source: format!("refs/heads/{branch}"),
            destination: format!("refs/remotes/{remote}/{branch}"),
            force: true,
        }
    }

    /// Fill in short names: a bare source is a branch, a missing
    /// destination is the branch's remote-tracking ref, and a destination
    /// outside `refs/` is taken relative to it.
    pub fn qualify_for_fetch(&self, remote: &str) -> Self {
        let source = if self.source.starts_with("refs/") {
            self.source.clone()
        } else {
            format!("refs/heads/{}", self.source)
        };
        let destination = if self.destination.is_empty() {
            let short = source.strip_prefix("refs/heads/").unwrap_or(&source);
            format!("refs/remotes/{remote}/{short}")
        } else if self.destination.starts_with("refs/") {
            self.destination.clone()
        } else {
            format!("refs/{}", self.destination)
        };
        Refspec {
            source,
            destination,
            force: self.force,
        }
    }

    pub fn is_pattern(&self) -> bool {
        self.source.contains('*')
    }

    /// The destination for `refname`, if this spec's source covers it.
    pub fn map(&self, refname: &str) -> Option<String> {
        if self.destination.is_empty() {
            return None;
        }
        match self.source.split_once('*') {
            Some((prefix, suffix)) => {
                if refname.len() < prefix.len() + suffix.len()
                    || !refname.starts_with(prefix)
                    || !refname.ends_with(suffix)
                {
                    return None;
                }
                let matched = &refname[prefix.len()..refname.len() - suffix.len()];
                Some(self.destination.replacen('*', matched, 1))
            }
            None if self.source == refname => Some(self.destination.clone()),
            None => None,
        }
    }
}

impl std::fmt::Display for Refspec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.force {
            f.write_str("+")?;
        }
        f.write_str(&self.source)?;
        if !self.destination.is_empty() {
            write!(f, ":{}", self.destination)?;
        }
        Ok(())
    }
}
