use std::path::{Path, PathBuf};

use serde::Serialize;

/// How a download request was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    /// Bytes were fetched from the source.
    Downloaded,
    /// The destination already held acceptable content.
    Skipped,
    /// The content came from the cache without a fetch.
    UsedCache,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Downloaded => "downloaded",
            Status::Skipped => "skipped",
            Status::UsedCache => "used-cache",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadResult {
    pub status: Status,

    /// The cache entry involved, when the cache was read or populated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_path: Option<PathBuf>,
}

impl DownloadResult {
    pub(crate) fn skipped() -> Self {
        Self {
            status:     Status::Skipped,
            cache_path: None,
        }
    }

    pub(crate) fn used_cache(entry: PathBuf) -> Self {
        Self {
            status:     Status::UsedCache,
            cache_path: Some(entry),
        }
    }

    pub(crate) fn downloaded(entry: Option<PathBuf>) -> Self {
        Self {
            status:     Status::Downloaded,
            cache_path: entry,
        }
    }

    pub fn cache_path(&self) -> Option<&Path> { self.cache_path.as_deref() }
}
