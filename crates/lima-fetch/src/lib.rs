//! Verified artifact downloads backed by a content-addressable cache.
//!
//! [`download`] turns a location (a local path or an `http(s)://` URL) and an
//! optional expected digest into a verified local file. Three strategies are
//! tried in a fixed order:
//!
//! 1. the destination already holds acceptable content ([`Status::Skipped`]);
//! 2. the cache holds the expected digest ([`Status::UsedCache`]);
//! 3. the source is fetched, hashed while streaming, and installed into the
//!    cache and destination ([`Status::Downloaded`]).
//!
//! Nothing is ever visible under a final name until it is complete and
//! verified. Cache entries are write-once and shared by every process that
//! agrees on the cache directory.
//!
//! ```no_run
//! use lima_fetch::{DownloadOptions, download};
//!
//! let digest = "sha256:b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
//!     .parse()
//!     .unwrap();
//! let options = DownloadOptions::default().expected_digest(digest).default_cache();
//! let result = download("/tmp/basedisk", "https://example.com/disk.img", options).unwrap();
//! println!("{}", result.status);
//! ```

pub mod cache;
mod data;
mod downloader;
mod error;
pub mod image;
pub mod source;

pub use cache::CacheStore;
pub use data::{CacheSetting, DownloadOptions, DownloadResult, HttpSettings, Progress, Status};
pub use downloader::{Downloader, download};
pub use error::{Error, Result};
pub use lima_verify::{Algorithm, Digest};
