use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while backing up or restoring symbolic links.
#[derive(Error, Debug)]
pub enum SymlinkError {
    #[error("path not found: {}", path.display())]
    PathNotFound { path: PathBuf },

    #[error("cannot read symbolic link {}: {source}", path.display())]
    LinkRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("symlink file location already occupied: {}", path.display())]
    PathOccupied { path: PathBuf },

    #[error("not a symbolic link: {}", path.display())]
    NotASymlink { path: PathBuf },

    #[error("not a '.symlink' file: {}", path.display())]
    InvalidEntry { path: PathBuf },

    /// Sidecar content is empty, or cannot be represented as a path on this platform.
    #[error("sidecar {} does not hold a valid link target", path.display())]
    InvalidTarget { path: PathBuf },

    #[error("failed to {action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("external command failed: {command}, status: {status}")]
    LinkCommand { command: String, status: String },
}

impl SymlinkError {
    /// Wraps an OS error with the operation and path it came from.
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        SymlinkError::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SymlinkError>;
