//! Location classification and uniform byte streams over local and HTTP(S) sources.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use tracing::debug;

use crate::data::HttpSettings;
use crate::{Error, Result};

/// A parsed location string. `://` separates URLs from local paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Local(PathBuf),
    Http(String),
}

impl Location {
    pub fn parse(location: &str) -> Result<Self> {
        match location.split_once("://") {
            Some((scheme, _))
                if scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https") =>
            {
                Ok(Location::Http(location.to_string()))
            }
            Some((scheme, _)) => Err(Error::UnsupportedScheme {
                location: location.to_string(),
                scheme:   scheme.to_string(),
            }),
            None => lima_platform::dir::expand_home(location)
                .map(Location::Local)
                .map_err(|e| Error::unavailable(location, e)),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Local(path) => write!(f, "{}", path.display()),
            Location::Http(url) => f.write_str(url),
        }
    }
}

/// An opened source, read front to back exactly once.
pub struct Source {
    pub reader: Box<dyn Read + Send>,

    /// Length reported by the source, if any.
    pub content_length: Option<u64>,
}

/// Opens [`Location`]s. The HTTP client is built on first use and reused.
pub struct SourceResolver {
    settings: HttpSettings,
    client:   OnceCell<Client>,
}

impl SourceResolver {
    pub fn new(settings: HttpSettings) -> Self {
        Self {
            settings,
            client: OnceCell::new(),
        }
    }

    pub fn open(&self, location: &Location) -> Result<Source> {
        match location {
            Location::Local(path) => {
                let file = File::open(path).map_err(|e| Error::unavailable(location, e))?;
                let content_length = file.metadata().ok().map(|m| m.len());
                debug!("opened local source {}", path.display());
                Ok(Source {
                    reader: Box::new(file),
                    content_length,
                })
            }
            Location::Http(url) => {
                let response = self
                    .client()?
                    .get(url)
                    .send()
                    .and_then(|r| r.error_for_status())
                    .map_err(|e| Error::unavailable(location, e))?;
                let content_length = response.content_length();
                debug!(
                    "GET {url} -> {} ({} bytes)",
                    response.status(),
                    content_length.map_or_else(|| "unknown".to_string(), |n| n.to_string())
                );
                Ok(Source {
                    reader: Box::new(response),
                    content_length,
                })
            }
        }
    }

    fn client(&self) -> Result<&Client> {
        self.client.get_or_try_init(|| {
            Client::builder()
                .user_agent(self.settings.user_agent.as_str())
                .connect_timeout(self.settings.connect_timeout)
                .timeout(None)
                .redirect(reqwest::redirect::Policy::limited(self.settings.max_redirects))
                .build()
                .map_err(|e| Error::InvalidArgument(format!("failed to build HTTP client: {e}")))
        })
    }
}

impl Default for SourceResolver {
    fn default() -> Self { Self::new(HttpSettings::default()) }
}
