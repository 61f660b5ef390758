// Error types for sync engine operations
use std::path::{Path, PathBuf};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Tree cache error: {0}")]
    Tree(#[from] tinytree::Error),

    #[error("Remote store unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Operation not permitted in read-only mode")]
    NoPermission,

    #[error("Directory rename requires confirmation: {path}")]
    ConfirmationRequired { path: PathBuf },

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed remote payload: {message}")]
    Decode { message: String },
}

impl Error {
    pub fn unavailable<S: Into<String>>(reason: S) -> Self {
        Error::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn decode<S: Into<String>>(message: S) -> Self {
        Error::Decode {
            message: message.into(),
        }
    }

    pub fn confirmation_required<P: AsRef<Path>>(path: P) -> Self {
        Error::ConfirmationRequired {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// True for path-absence failures, whichever layer produced them
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Tree(tinytree::Error::NotFound(_)))
    }

    /// True when the remote store could not be reached or answered non-success
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Error::Unavailable { .. } | Error::Http(_))
    }
}
