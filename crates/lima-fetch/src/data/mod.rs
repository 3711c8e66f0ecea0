//! Configuration and outcome types passed in and out of the downloader.

pub mod options;
pub mod progress;
pub mod result;

pub use options::{CacheSetting, DownloadOptions, HttpSettings};
pub use progress::Progress;
pub use result::{DownloadResult, Status};
