use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use lima_verify::Digest;

use super::progress::Progress;
use crate::{Error, Result};

/// Where, if anywhere, verified content is shared between downloads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CacheSetting {
    #[default]
    Disabled,
    Dir(PathBuf),
    /// The per-user lima cache directory.
    Default,
}

impl CacheSetting {
    /// The cache root this setting names, if any.
    pub fn resolve(&self) -> Result<Option<PathBuf>> {
        match self {
            CacheSetting::Disabled => Ok(None),
            CacheSetting::Dir(dir) => Ok(Some(dir.clone())),
            CacheSetting::Default => lima_platform::dir::lima_cache()
                .map(Some)
                .map_err(|e| Error::InvalidArgument(format!("no default cache directory: {e}"))),
        }
    }
}

/// Transport settings for HTTP(S) sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    pub user_agent: String,

    /// Bound on establishing the connection. Transfers themselves have no deadline.
    pub connect_timeout: Duration,

    pub max_redirects: usize,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            user_agent:      format!("lima-fetch/{}", env!("CARGO_PKG_VERSION")),
            connect_timeout: Duration::from_secs(30),
            max_redirects:   10,
        }
    }
}

/// Options for a single download request.
///
/// # Examples
///
/// ```
/// use lima_fetch::DownloadOptions;
///
/// let digest = "sha256:b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
///     .parse()
///     .unwrap();
/// let options = DownloadOptions::default()
///     .expected_digest(digest)
///     .cache_dir("/var/cache/lima");
/// ```
#[derive(Clone, Default)]
pub struct DownloadOptions {
    /// Content must hash to this digest. Also the key for cache lookups.
    pub expected_digest: Option<Digest>,

    pub cache: CacheSetting,

    pub http: HttpSettings,

    /// Invoked after each chunk is written on the fetch path.
    pub on_progress: Option<Arc<dyn Fn(&Progress) + Send + Sync>>,
}

impl fmt::Debug for DownloadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadOptions")
            .field("expected_digest", &self.expected_digest)
            .field("cache", &self.cache)
            .field("http", &self.http)
            .field("on_progress", &self.on_progress.as_ref().map(|_| "{ ... }"))
            .finish()
    }
}

impl DownloadOptions {
    #[must_use]
    pub fn expected_digest(mut self, digest: Digest) -> Self {
        self.expected_digest = Some(digest);
        self
    }

    #[must_use]
    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache = CacheSetting::Dir(dir.into());
        self
    }

    /// Use the per-user cache directory (`<user cache dir>/lima`).
    #[must_use]
    pub fn default_cache(mut self) -> Self {
        self.cache = CacheSetting::Default;
        self
    }

    /// Set the progress callback.
    ///
    /// # Examples
    ///
    /// ```
    /// use lima_fetch::DownloadOptions;
    /// use std::sync::Arc;
    ///
    /// let options = DownloadOptions::default().on_progress(Arc::new(|progress| {
    ///     if let Some(pct) = progress.percentage() {
    ///         println!("{pct:.1}%");
    ///     }
    /// }));
    /// ```
    #[must_use]
    pub fn on_progress(mut self, on_progress: Arc<dyn Fn(&Progress) + Send + Sync>) -> Self {
        self.on_progress = Some(on_progress);
        self
    }

    pub(crate) fn report(&self, progress: Progress) {
        if let Some(callback) = &self.on_progress {
            callback(&progress);
        }
    }
}
