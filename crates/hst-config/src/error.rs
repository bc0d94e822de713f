#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config key: {0}")]
    InvalidKey(String),

    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("invalid boolean value: {0}")]
    InvalidBool(String),

    #[error("remote {0} already exists")]
    RemoteExists(String),

    #[error("no such remote: {0}")]
    NoSuchRemote(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("lock error: {0}")]
    Lock(#[from] hst_utils::UtilError),
}
