//! A single INI-style config file.

use std::fmt::Write as _;
use std::path::Path;

use crate::error::ConfigError;
use crate::{parse_bool, ConfigKey};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Section {
    name: String,
    subsection: Option<String>,
    entries: Vec<(String, Option<String>)>,
}

impl Section {
    fn is(&self, name: &str, subsection: Option<&str>) -> bool {
        self.name == name && self.subsection.as_deref() == subsection
    }
}

/// Parsed config: sections in file order, entries in section order.
///
/// Comments and blank lines are not kept; writing a file back produces the
/// canonical layout (`[section "sub"]` headers, tab-indented `key = value`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    sections: Vec<Section>,
}

impl ConfigFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut sections: Vec<Section> = Vec::new();

        for (idx, raw) in content.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(header) = line.strip_prefix('[') {
                let header = header.strip_suffix(']').ok_or_else(|| ConfigError::Parse {
                    line: line_no,
                    message: "unterminated section header".into(),
                })?;
                sections.push(parse_header(header, line_no)?);
                continue;
            }

            let section = sections.last_mut().ok_or_else(|| ConfigError::Parse {
                line: line_no,
                message: "entry outside of any section".into(),
            })?;
            let (name, value) = match line.split_once('=') {
                Some((k, v)) => (k.trim(), Some(unquote(v.trim()))),
                None => (line, None),
            };
            if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
                return Err(ConfigError::Parse {
                    line: line_no,
                    message: format!("invalid variable name '{name}'"),
                });
            }
            section.entries.push((name.to_ascii_lowercase(), value));
        }

        Ok(Self { sections })
    }

    /// Load from disk; a missing file is an empty config.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::new()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        hst_utils::lockfile::write_atomic(path, self.serialize().as_bytes())?;
        Ok(())
    }

    /// The last value set for `key`. `Some(None)` for a bare key.
    pub fn get(&self, key: &ConfigKey) -> Option<Option<&str>> {
        self.values(key).last()
    }

    /// The last value for `key` as a string, if it has one.
    pub fn get_str(&self, key: &ConfigKey) -> Option<&str> {
        self.get(key).flatten()
    }

    pub fn get_bool(&self, key: &ConfigKey) -> Result<Option<bool>, ConfigError> {
        self.get(key).map(parse_bool).transpose()
    }

    /// Every value for `key`, in file order.
    pub fn get_all(&self, key: &ConfigKey) -> Vec<Option<&str>> {
        self.values(key).collect()
    }

    fn values(&self, key: &ConfigKey) -> impl Iterator<Item = Option<&str>> + '_ {
        let section_key = key.clone();
        let name = key.name.clone();
        self.sections
            .iter()
            .filter(move |s| s.is(&section_key.section, section_key.subsection.as_deref()))
            .flat_map(|s| s.entries.iter())
            .filter(move |(entry, _)| *entry == name)
            .map(|(_, value)| value.as_deref())
    }

    /// Set `key`, replacing its last occurrence or appending to the section
    /// (created at the end of the file if needed).
    pub fn set(&mut self, key: &ConfigKey, value: &str) {
        let value = Some(value.to_string());
        for section in self.sections.iter_mut().rev() {
            if !section.is(&key.section, key.subsection.as_deref()) {
                continue;
            }
            if let Some(entry) = section.entries.iter_mut().rev().find(|(n, _)| *n == key.name) {
                entry.1 = value;
                return;
            }
        }
        self.section_mut(&key.section, key.subsection.as_deref())
            .entries
            .push((key.name.clone(), value));
    }

    /// Append another value for `key`.
    pub fn add(&mut self, key: &ConfigKey, value: &str) {
        self.section_mut(&key.section, key.subsection.as_deref())
            .entries
            .push((key.name.clone(), Some(value.to_string())));
    }

    pub fn has_section(&self, name: &str, subsection: Option<&str>) -> bool {
        let name = name.to_ascii_lowercase();
        self.sections.iter().any(|s| s.is(&name, subsection))
    }

    /// Remove every occurrence of the section. Returns whether any existed.
    pub fn remove_section(&mut self, name: &str, subsection: Option<&str>) -> bool {
        let name = name.to_ascii_lowercase();
        let before = self.sections.len();
        self.sections.retain(|s| !s.is(&name, subsection));
        self.sections.len() != before
    }

    /// Subsection names of `name`, in file order, without duplicates.
    pub fn subsections(&self, name: &str) -> Vec<&str> {
        let name = name.to_ascii_lowercase();
        let mut out: Vec<&str> = Vec::new();
        for section in &self.sections {
            if section.name != name {
                continue;
            }
            if let Some(sub) = section.subsection.as_deref() {
                if !out.contains(&sub) {
                    out.push(sub);
                }
            }
        }
        out
    }

    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for section in &self.sections {
            match &section.subsection {
                Some(sub) => {
                    let escaped = sub.replace('\\', "\\\\").replace('"', "\\\"");
                    let _ = writeln!(out, "[{} \"{}\"]", section.name, escaped);
                }
                None => {
                    let _ = writeln!(out, "[{}]", section.name);
                }
            }
            for (name, value) in &section.entries {
                match value {
                    Some(v) => {
                        let _ = writeln!(out, "\t{name} = {}", quote_if_needed(v));
                    }
                    None => {
                        let _ = writeln!(out, "\t{name}");
                    }
                }
            }
        }
        out
    }

    fn section_mut(&mut self, name: &str, subsection: Option<&str>) -> &mut Section {
        let pos = match self.sections.iter().rposition(|s| s.is(name, subsection)) {
            Some(pos) => pos,
            None => {
                self.sections.push(Section {
                    name: name.to_string(),
                    subsection: subsection.map(str::to_string),
                    entries: Vec::new(),
                });
                self.sections.len() - 1
            }
        };
        &mut self.sections[pos]
    }
}

fn parse_header(header: &str, line: usize) -> Result<Section, ConfigError> {
    let header = header.trim();
    let (name, subsection) = match header.find(char::is_whitespace) {
        Some(space) => {
            let sub = header[space..].trim();
            let inner = sub
                .strip_prefix('"')
                .and_then(|s| s.strip_suffix('"'))
                .ok_or_else(|| ConfigError::Parse {
                    line,
                    message: format!("subsection must be quoted: {sub}"),
                })?;
            let inner = inner.replace("\\\"", "\"").replace("\\\\", "\\");
            (&header[..space], Some(inner))
        }
        None => (header, None),
    };

    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.') {
        return Err(ConfigError::Parse {
            line,
            message: format!("invalid section name '{name}'"),
        });
    }

    Ok(Section {
        name: name.to_ascii_lowercase(),
        subsection,
        entries: Vec::new(),
    })
}

fn unquote(value: &str) -> String {
    match value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
        Some(inner) => inner.replace("\\\"", "\"").replace("\\\\", "\\"),
        None => value.to_string(),
    }
}

fn quote_if_needed(value: &str) -> String {
    let needs_quotes = value.starts_with(char::is_whitespace)
        || value.ends_with(char::is_whitespace)
        || value.contains(['#', ';', '"']);
    if needs_quotes {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# comment
[core]
\trepositoryformatversion = 0
\tbare = false
[remote \"origin\"]
\turl = ../upstream
\tfetch = +refs/heads/*:refs/remotes/origin/*
[user]
\tname = Alice Liddell
";

    #[test]
    fn parse_and_get() {
        let config = ConfigFile::parse(SAMPLE).unwrap();
        assert_eq!(
            config.get_str(&ConfigKey::parse("core.repositoryformatversion").unwrap()),
            Some("0")
        );
        assert_eq!(
            config.get_str(&ConfigKey::parse("remote.origin.url").unwrap()),
            Some("../upstream")
        );
        assert_eq!(
            config.get_bool(&ConfigKey::parse("core.bare").unwrap()).unwrap(),
            Some(false)
        );
        assert_eq!(config.get(&ConfigKey::parse("core.missing").unwrap()), None);
        assert_eq!(config.subsections("remote"), ["origin"]);
    }

    #[test]
    fn values_outlive_the_lookup_key() {
        let config = ConfigFile::parse(SAMPLE).unwrap();
        let url = {
            let key = ConfigKey::parse("remote.origin.url").unwrap();
            config.get_str(&key)
        };
        let fetch: Vec<Option<&str>> = {
            let key = ConfigKey::parse("remote.origin.fetch").unwrap();
            config.get_all(&key)
        };
        assert_eq!(url, Some("../upstream"));
        assert_eq!(fetch, [Some("+refs/heads/*:refs/remotes/origin/*")]);
    }

    #[test]
    fn serialize_roundtrip() {
        let config = ConfigFile::parse(SAMPLE).unwrap();
        let text = config.serialize();
        assert!(text.starts_with("[core]\n\trepositoryformatversion = 0\n"));
        assert_eq!(ConfigFile::parse(&text).unwrap(), config);
    }

    #[test]
    fn set_replaces_or_appends() {
        let mut config = ConfigFile::parse(SAMPLE).unwrap();
        let bare = ConfigKey::parse("core.bare").unwrap();
        config.set(&bare, "true");
        assert_eq!(config.get_str(&bare), Some("true"));
        assert_eq!(config.get_all(&bare).len(), 1);

        let email = ConfigKey::parse("user.email").unwrap();
        config.set(&email, "alice@example.com");
        assert_eq!(config.get_str(&email), Some("alice@example.com"));

        let new = ConfigKey::parse("branch.main.remote").unwrap();
        config.set(&new, "origin");
        assert!(config.serialize().ends_with("[branch \"main\"]\n\tremote = origin\n"));
    }

    #[test]
    fn multi_valued_keys() {
        let mut config = ConfigFile::new();
        let fetch = ConfigKey::parse("remote.o.fetch").unwrap();
        config.add(&fetch, "a");
        config.add(&fetch, "b");
        assert_eq!(config.get_all(&fetch), [Some("a"), Some("b")]);
        assert_eq!(config.get_str(&fetch), Some("b"));
    }

    #[test]
    fn remove_section() {
        let mut config = ConfigFile::parse(SAMPLE).unwrap();
        assert!(config.remove_section("remote", Some("origin")));
        assert!(!config.remove_section("remote", Some("origin")));
        assert!(config.subsections("remote").is_empty());
    }

    #[test]
    fn quoting() {
        let mut config = ConfigFile::new();
        let key = ConfigKey::parse("user.name").unwrap();
        config.set(&key, " padded # odd\"");
        let reparsed = ConfigFile::parse(&config.serialize()).unwrap();
        assert_eq!(reparsed.get_str(&key), Some(" padded # odd\""));
    }

    #[test]
    fn parse_errors() {
        assert!(matches!(
            ConfigFile::parse("key = value\n").unwrap_err(),
            ConfigError::Parse { line: 1, .. }
        ));
        assert!(ConfigFile::parse("[core\n").is_err());
        assert!(ConfigFile::parse("[remote origin]\n").is_err());
    }

    #[test]
    fn load_missing_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");
        let mut config = ConfigFile::load(&path).unwrap();
        assert_eq!(config, ConfigFile::new());
        config.set(&ConfigKey::parse("core.bare").unwrap(), "false");
        config.save(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[core]\n\tbare = false\n");
    }
}
