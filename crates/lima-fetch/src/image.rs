//! Trying a list of equivalent image locations until one succeeds.

use std::fmt::Write as _;
use std::path::Path;

use lima_platform::arch::Arch;
use lima_verify::Digest;
use thiserror::Error;
use tracing::{info, warn};

use crate::{DownloadOptions, DownloadResult, Downloader};

/// One location an image can be fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCandidate {
    pub location: String,
    pub arch:     Arch,
    pub digest:   Option<Digest>,
}

#[derive(Debug, Error)]
pub enum CandidateError {
    #[error("unsupported arch: {0}")]
    UnsupportedArch(Arch),

    #[error(transparent)]
    Download(#[from] crate::Error),
}

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("failed to download the image, attempted {attempted} candidates: {}", summarize(.errors))]
    AllCandidatesFailed {
        attempted: usize,
        errors:    Vec<(String, CandidateError)>,
    },

    #[error(transparent)]
    Setup(#[from] crate::Error),
}

fn summarize(errors: &[(String, CandidateError)]) -> String {
    let mut out = String::new();
    for (i, (location, err)) in errors.iter().enumerate() {
        if i > 0 {
            out.push_str("; ");
        }
        let _ = write!(out, "{location}: {err}");
    }
    out
}

/// Fetch the first candidate built for `arch` that downloads successfully.
///
/// Returns the index of the winning candidate. A candidate's own digest takes
/// precedence over `options.expected_digest`.
pub fn fetch_image(
    destination: impl AsRef<Path>,
    candidates: &[ImageCandidate],
    arch: Arch,
    options: &DownloadOptions,
) -> Result<(usize, DownloadResult), ImageError> {
    let destination = destination.as_ref();
    let downloader = Downloader::from_options(options)?;
    let mut errors = Vec::new();

    for (index, candidate) in candidates.iter().enumerate() {
        if candidate.arch != arch {
            errors.push((candidate.location.clone(), CandidateError::UnsupportedArch(candidate.arch)));
            continue;
        }

        info!("attempting to download {}", candidate.location);
        let mut attempt = options.clone();
        if let Some(digest) = &candidate.digest {
            attempt.expected_digest = Some(digest.clone());
        }

        match downloader.download(destination, &candidate.location, &attempt) {
            Ok(result) => return Ok((index, result)),
            Err(e) => {
                warn!("failed to download {}: {e}", candidate.location);
                errors.push((candidate.location.clone(), e.into()));
            }
        }
    }

    Err(ImageError::AllCandidatesFailed {
        attempted: candidates.len(),
        errors,
    })
}
