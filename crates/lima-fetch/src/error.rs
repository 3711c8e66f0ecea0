//! Error types for lima-fetch.

use lima_verify::Digest;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("unsupported scheme {scheme:?} in location {location}")]
    UnsupportedScheme { location: String, scheme: String },

    #[error("failed to read from {location}: {reason}")]
    SourceUnavailable { location: String, reason: String },

    #[error("expected digest {expected}, got {actual}")]
    DigestMismatch { expected: Digest, actual: Digest },

    #[error(transparent)]
    Io(#[from] lima_fs::Error),
}

impl Error {
    pub(crate) fn unavailable(location: impl ToString, reason: impl ToString) -> Self {
        Error::SourceUnavailable {
            location: location.to_string(),
            reason:   reason.to_string(),
        }
    }
}
