pub mod error;
pub mod file;
pub mod identity;
pub mod remote;

pub use error::ConfigError;
pub use file::ConfigFile;
pub use identity::identity;
pub use remote::Remote;

/// A normalized configuration key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigKey {
    /// Lowercased section name.
    pub section: String,
    /// Case-preserved subsection name.
    pub subsection: Option<String>,
    /// Lowercased variable name.
    pub name: String,
}

impl ConfigKey {
    /// Parse `section.name` or `section.subsection.name`.
    ///
    /// The section is everything before the first dot and the name everything
    /// after the last one, so subsections may themselves contain dots.
    pub fn parse(key: &str) -> Result<Self, ConfigError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(ConfigError::InvalidKey("empty key".into()));
        }

        let first_dot = key.find('.').ok_or_else(|| {
            ConfigError::InvalidKey(format!("key must contain at least one dot: {key}"))
        })?;
        let section = &key[..first_dot];
        let rest = &key[first_dot + 1..];

        let (subsection, name) = match rest.rfind('.') {
            Some(last_dot) => (Some(rest[..last_dot].to_string()), &rest[last_dot + 1..]),
            None => (None, rest),
        };

        if section.is_empty() || name.is_empty() {
            return Err(ConfigError::InvalidKey(format!(
                "key needs a section and a variable name: {key}"
            )));
        }

        Ok(Self {
            section: section.to_ascii_lowercase(),
            subsection,
            name: name.to_ascii_lowercase(),
        })
    }

    pub fn new(section: &str, subsection: Option<&str>, name: &str) -> Self {
        Self {
            section: section.to_ascii_lowercase(),
            subsection: subsection.map(str::to_string),
            name: name.to_ascii_lowercase(),
        }
    }
}

impl std::fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.subsection {
            Some(sub) => write!(f, "{}.{}.{}", self.section, sub, self.name),
            None => write!(f, "{}.{}", self.section, self.name),
        }
    }
}

/// Interpret a config value as a boolean. A key without a value is true.
pub fn parse_bool(value: Option<&str>) -> Result<bool, ConfigError> {
    let Some(v) = value else {
        return Ok(true);
    };
    let v = v.trim();
    if v.is_empty() {
        return Ok(false);
    }
    match v.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" => Ok(true),
        "false" | "no" | "off" => Ok(false),
        _ => v
            .parse::<i64>()
            .map(|n| n != 0)
            .map_err(|_| ConfigError::InvalidBool(v.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_key() {
        let key = ConfigKey::parse("User.Name").unwrap();
        assert_eq!(key.section, "user");
        assert_eq!(key.subsection, None);
        assert_eq!(key.name, "name");
        assert_eq!(key.to_string(), "user.name");
    }

    #[test]
    fn subsection_keeps_case_and_dots() {
        let key = ConfigKey::parse("remote.My.Origin.URL").unwrap();
        assert_eq!(key.subsection.as_deref(), Some("My.Origin"));
        assert_eq!(key.name, "url");
    }

    #[test]
    fn bad_keys() {
        for key in ["", "nodot", "section.", ".name"] {
            assert!(ConfigKey::parse(key).is_err(), "{key}");
        }
    }

    #[test]
    fn booleans() {
        assert!(parse_bool(None).unwrap());
        assert!(parse_bool(Some("Yes")).unwrap());
        assert!(!parse_bool(Some("off")).unwrap());
        assert!(!parse_bool(Some("0")).unwrap());
        assert!(parse_bool(Some("2")).unwrap());
        assert!(!parse_bool(Some("")).unwrap());
        assert!(parse_bool(Some("maybe")).is_err());
    }
}
