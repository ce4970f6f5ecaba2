//! Error kinds raised while configuring and running a scan

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    /// A configured root directory does not exist. Fatal.
    #[error("root path does not exist: {}", .0.display())]
    PathNotFound(PathBuf),

    /// A configured root is not a directory. Fatal.
    #[error("root path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// An ignore entry is not a valid glob pattern. Fatal.
    #[error("invalid ignore pattern {pattern}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A configuration file could not be read or parsed. Fatal.
    #[error("invalid configuration in {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },

    /// A repository could not be opened or queried. Recovered per repository.
    #[error("cannot open repository {}: {reason}", path.display())]
    RepositoryOpen { path: PathBuf, reason: String },

    /// A directory could not be read during discovery. Recovered.
    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ScanError {
    /// Whether this error aborts the whole scan
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ScanError::PathNotFound(_)
                | ScanError::NotADirectory(_)
                | ScanError::InvalidPattern { .. }
                | ScanError::Config { .. }
                | ScanError::Io(_)
        )
    }
}

pub type ScanResult<T> = Result<T, ScanError>;
