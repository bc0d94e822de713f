//! Who is recorded as author and committer.

use crate::file::ConfigFile;
use crate::ConfigKey;

const FALLBACK_NAME: &str = "unknown";

/// The identity string for new commits.
///
/// `user.name`, with ` <user.email>` appended when an email is configured.
/// Without a configured name, the `USER` environment variable, then
/// `unknown`.
pub fn identity(config: &ConfigFile) -> String {
    identity_with_env(config, std::env::var("USER").ok())
}

fn identity_with_env(config: &ConfigFile, user_env: Option<String>) -> String {
    let name = config
        .get_str(&ConfigKey::new("user", None, "name"))
        .map(str::to_string)
        .filter(|n| !n.trim().is_empty())
        .or(user_env.filter(|n| !n.trim().is_empty()))
        .unwrap_or_else(|| FALLBACK_NAME.to_string());

    match config.get_str(&ConfigKey::new("user", None, "email")) {
        Some(email) if !email.trim().is_empty() => format!("{name} <{email}>"),
        _ => name,
    }
}
