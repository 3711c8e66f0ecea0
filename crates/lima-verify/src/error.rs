use std::io;

use crate::Digest;

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("expected digest {expected}, got {actual}")]
    Mismatch { expected: Digest, actual: Digest },

    #[error("unsupported digest algorithm: {0:?}")]
    UnsupportedAlgorithm(String),

    #[error("invalid digest {digest:?}: {reason}")]
    InvalidDigest { digest: String, reason: &'static str },

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, VerifyError>;
