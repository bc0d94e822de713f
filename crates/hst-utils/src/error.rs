use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum UtilError {
    /// Another process is rewriting the same file.
    #[error("'{0}' is locked by another hst process")]
    Locked(PathBuf),

    #[error("failed to replace '{path}'")]
    Replace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("bad date: {0}")]
    DateParse(String),

    #[error("bad identity line: {0}")]
    Signature(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
