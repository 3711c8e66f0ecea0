use std::io::{ErrorKind, Read, Write};
use std::path::Path;

use lima_fs::{StageOptions, StagedFile};
use lima_verify::{Algorithm, Digest, VerifiedReader, VerifyError};
use tracing::{debug, info, warn};

use crate::cache::{CacheStore, STALE_STAGING_AGE};
use crate::data::{DownloadOptions, DownloadResult, Progress};
use crate::source::{Location, Source, SourceResolver};
use crate::{Error, Result};

const CHUNK_SIZE: usize = 64 * 1024;

const CACHE_ONLY_WITHOUT_CACHE: &str =
    "caching-only mode requires the cache directory to be specified";

/// Where fetched bytes go once verified.
enum Target<'a> {
    /// Into the cache, then copied to the destination if there is one.
    Cache {
        store:       &'a CacheStore,
        destination: Option<&'a Path>,
    },
    Destination(&'a Path),
}

/// Turns a location and an optional expected digest into a verified local file.
///
/// A `Downloader` holds the HTTP client and the cache handle, so reusing one
/// across calls reuses connections. It is `Send + Sync`.
#[derive(Default)]
pub struct Downloader {
    resolver: SourceResolver,
    cache:    Option<CacheStore>,
}

impl Downloader {
    pub fn new(resolver: SourceResolver) -> Self {
        Self {
            resolver,
            cache: None,
        }
    }

    #[must_use]
    pub fn with_cache(mut self, cache: CacheStore) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Build a downloader for the transport and cache settings in `options`.
    pub fn from_options(options: &DownloadOptions) -> Result<Self> {
        let downloader = Self::new(SourceResolver::new(options.http.clone()));
        match options.cache.resolve()? {
            Some(root) => Ok(downloader.with_cache(CacheStore::new(root))),
            None => Ok(downloader),
        }
    }

    /// Make `destination` hold the content at `location`.
    ///
    /// An empty `destination` only populates the cache. The cache setting of
    /// `options` is ignored here; it is consumed by [`Downloader::from_options`].
    pub fn download(
        &self,
        destination: &Path,
        location: &str,
        options: &DownloadOptions,
    ) -> Result<DownloadResult> {
        let destination = (!destination.as_os_str().is_empty()).then_some(destination);
        let expected = options.expected_digest.as_ref();

        if let Some(destination) = destination {
            if is_satisfied(destination, expected)? {
                info!("{} is already present", destination.display());
                return Ok(DownloadResult::skipped());
            }
        }

        if let (Some(store), Some(digest)) = (&self.cache, expected) {
            if let Some(entry) = store.lookup(digest) {
                if let Some(destination) = destination {
                    lima_fs::install_copy(&entry, destination, StageOptions::new())?;
                    info!("copied {} from cache to {}", digest, destination.display());
                } else {
                    debug!("{digest} is already cached");
                }
                return Ok(DownloadResult::used_cache(entry));
            }
        }

        let target = match (&self.cache, destination) {
            (Some(store), destination) => Target::Cache { store, destination },
            (None, Some(destination)) => Target::Destination(destination),
            (None, None) => return Err(Error::InvalidArgument(CACHE_ONLY_WITHOUT_CACHE.to_string())),
        };

        let location = Location::parse(location)?;
        let source = self.resolver.open(&location)?;
        let mut staged = match &target {
            Target::Cache { store, .. } => store.stage()?,
            Target::Destination(destination) => stage_beside(destination)?,
        };

        let actual = transfer(&location, source, &mut staged, expected, options)?;

        match target {
            Target::Cache { store, destination } => {
                let entry = store.install(&actual, staged)?;
                if let Some(destination) = destination {
                    lima_fs::install_copy(&entry, destination, StageOptions::new())?;
                }
                info!("downloaded {location} ({actual})");
                Ok(DownloadResult::downloaded(Some(entry)))
            }
            Target::Destination(destination) => {
                staged.persist(destination)?;
                info!("downloaded {location} to {}", destination.display());
                Ok(DownloadResult::downloaded(None))
            }
        }
    }
}

/// Convenience wrapper building a [`Downloader`] from `options` for one call.
pub fn download(
    destination: impl AsRef<Path>,
    location: &str,
    options: DownloadOptions,
) -> Result<DownloadResult> {
    Downloader::from_options(&options)?.download(destination.as_ref(), location, &options)
}

/// Whether `destination` already holds acceptable content.
fn is_satisfied(destination: &Path, expected: Option<&Digest>) -> Result<bool> {
    let read_err = |source| lima_fs::Error::Read {
        path: destination.to_path_buf(),
        source,
    };

    match std::fs::metadata(destination) {
        Ok(metadata) if metadata.is_file() => {}
        Ok(_) => return Ok(false),
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(read_err(e).into()),
    }

    let Some(expected) = expected else {
        return Ok(true);
    };
    let actual = Digest::of_file(expected.algorithm(), destination).map_err(read_err)?;
    if actual == *expected {
        Ok(true)
    } else {
        warn!(
            "{} has digest {actual}, expected {expected}; fetching again",
            destination.display()
        );
        Ok(false)
    }
}

/// Stage next to `destination`, first clearing siblings abandoned by earlier runs.
fn stage_beside(destination: &Path) -> Result<StagedFile> {
    let options = StageOptions::new();
    if let (Some(parent), Some(name)) = (destination.parent(), destination.file_name()) {
        let name = name.to_string_lossy();
        let parent = if parent.as_os_str().is_empty() { Path::new(".") } else { parent };
        lima_fs::sweep_stale(parent, STALE_STAGING_AGE, |file| {
            options.is_staged_name_for(file, &name)
        });
    }
    Ok(StagedFile::beside(destination, options)?)
}

/// Copy `source` into `staged`, hashing on the way, and return the content
/// digest. With an `expected` digest, a mismatch fails the transfer.
fn transfer(
    location: &Location,
    source: Source,
    staged: &mut StagedFile,
    expected: Option<&Digest>,
    options: &DownloadOptions,
) -> Result<Digest> {
    let total_bytes = source.content_length;
    let algorithm = expected.map_or(Algorithm::default(), Digest::algorithm);
    let mut reader = VerifiedReader::new(source.reader, algorithm.hasher());
    let mut buf = vec![0u8; CHUNK_SIZE];

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::unavailable(location, e)),
        };
        staged.write_all(&buf[..n]).map_err(|source| lima_fs::Error::Write {
            path: staged.path().to_path_buf(),
            source,
        })?;
        options.report(Progress {
            bytes_downloaded: reader.bytes_read(),
            total_bytes,
        });
    }

    debug!("read {} bytes from {location}", reader.bytes_read());
    let Some(expected) = expected else {
        return Ok(reader.digest());
    };
    reader.verify(expected).map_err(|e| match e {
        VerifyError::Mismatch { expected, actual } => {
            warn!("{location} does not match {expected}");
            Error::DigestMismatch { expected, actual }
        }
        other => Error::unavailable(location, other),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use tempfile::tempdir;

    fn digest_of(data: &[u8]) -> Digest { Digest::of_reader(Algorithm::Sha256, data).unwrap() }

    #[test]
    fn test_downloader_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Downloader>();
    }

    #[test]
    fn test_local_download_then_skip() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src.img");
        let dest = dir.path().join("out").join("basedisk");
        std::fs::write(&src, "disk").unwrap();

        let downloader = Downloader::default();
        let options = DownloadOptions::default().expected_digest(digest_of(b"disk"));
        let location = src.to_string_lossy();

        let first = downloader.download(&dest, &location, &options).unwrap();
        assert_eq!(first, DownloadResult::downloaded(None));
        assert_eq!(std::fs::read(&dest).unwrap(), b"disk");

        std::fs::remove_file(&src).unwrap();
        let second = downloader.download(&dest, &location, &options).unwrap();
        assert_eq!(second, DownloadResult::skipped());
    }

    #[test]
    fn test_existing_destination_with_wrong_digest_is_replaced() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src.img");
        let dest = dir.path().join("basedisk");
        std::fs::write(&src, "fresh").unwrap();
        std::fs::write(&dest, "corrupt").unwrap();

        let options = DownloadOptions::default().expected_digest(digest_of(b"fresh"));
        let result = Downloader::default()
            .download(&dest, &src.to_string_lossy(), &options)
            .unwrap();

        assert_eq!(result.status, crate::Status::Downloaded);
        assert_eq!(std::fs::read(&dest).unwrap(), b"fresh");
    }

    #[test]
    fn test_existing_destination_without_digest_is_kept() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("basedisk");
        std::fs::write(&dest, "anything").unwrap();

        let result = Downloader::default()
            .download(&dest, "ftp://unused", &DownloadOptions::default())
            .unwrap();

        assert_eq!(result, DownloadResult::skipped());
    }

    #[test]
    fn test_mismatch_leaves_no_trace() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src.img");
        let dest = dir.path().join("basedisk");
        std::fs::write(&src, "tampered").unwrap();

        let options = DownloadOptions::default().expected_digest(digest_of(b"genuine"));
        let err = Downloader::default()
            .download(&dest, &src.to_string_lossy(), &options)
            .unwrap_err();

        assert!(matches!(err, Error::DigestMismatch { .. }));
        assert!(err.to_string().contains("expected digest"));
        assert!(!dest.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_cache_only_requires_cache() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src.img");
        std::fs::write(&src, "x").unwrap();
        let options = DownloadOptions::default().expected_digest(digest_of(b"x"));

        // The source is readable, so only the guard can stop this call.
        let err = Downloader::default()
            .download(Path::new(""), &src.to_string_lossy(), &options)
            .unwrap_err();

        match err {
            Error::InvalidArgument(msg) => assert!(msg.contains("caching-only mode")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_skipped_leaves_cache_untouched() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("basedisk");
        let cache = dir.path().join("cache");
        std::fs::write(&dest, "disk").unwrap();

        let options = DownloadOptions::default()
            .expected_digest(digest_of(b"disk"))
            .cache_dir(&cache);
        let result = download(&dest, "/nonexistent/disk.img", options).unwrap();

        assert_eq!(result, DownloadResult::skipped());
        assert!(!cache.exists());
    }

    #[test]
    fn test_unsupported_scheme_leaves_cache_untouched() {
        let dir = tempdir().unwrap();
        let cache = dir.path().join("cache");

        let err = download(
            dir.path().join("basedisk"),
            "ftp://mirror.example/disk.img",
            DownloadOptions::default().cache_dir(&cache),
        )
        .unwrap_err();

        assert!(matches!(err, Error::UnsupportedScheme { .. }));
        assert!(!cache.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_without_digest_content_is_cached_under_sha256() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src.img");
        std::fs::write(&src, "payload").unwrap();

        let options = DownloadOptions::default().cache_dir(dir.path().join("cache"));
        let downloader = Downloader::from_options(&options).unwrap();
        let result = downloader
            .download(&dir.path().join("basedisk"), &src.to_string_lossy(), &options)
            .unwrap();

        let entry = CacheStore::new(dir.path().join("cache")).entry_path(&digest_of(b"payload"));
        assert_eq!(result, DownloadResult::downloaded(Some(entry.clone())));
        assert_eq!(std::fs::read(entry).unwrap(), b"payload");
    }

    #[test]
    fn test_sha512_digest_is_honored() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src.img");
        std::fs::write(&src, "payload").unwrap();
        let digest = Digest::of_reader(Algorithm::Sha512, &b"payload"[..]).unwrap();

        let options = DownloadOptions::default()
            .expected_digest(digest.clone())
            .cache_dir(dir.path().join("cache"));
        let result = download("", &src.to_string_lossy(), options).unwrap();

        let entry = result.cache_path.unwrap();
        assert!(entry.starts_with(dir.path().join("cache").join("by-digest").join("sha512")));
        assert!(entry.ends_with(digest.encoded()));
    }

    #[test]
    fn test_progress_reports_bytes() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src.img");
        std::fs::write(&src, vec![7u8; CHUNK_SIZE * 2 + 10]).unwrap();

        let seen = Arc::new(AtomicU64::new(0));
        let options = DownloadOptions::default().on_progress({
            let seen = Arc::clone(&seen);
            Arc::new(move |progress: &Progress| {
                assert_eq!(progress.total_bytes, Some((CHUNK_SIZE * 2 + 10) as u64));
                seen.store(progress.bytes_downloaded, Ordering::SeqCst);
            })
        });

        Downloader::default()
            .download(&dir.path().join("basedisk"), &src.to_string_lossy(), &options)
            .unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), (CHUNK_SIZE * 2 + 10) as u64);
    }

    #[test]
    fn test_stale_siblings_are_swept() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src.img");
        let dest = dir.path().join("basedisk");
        std::fs::write(&src, "disk").unwrap();

        let stale = dir.path().join(".basedisk.abc123.tmp");
        let file = std::fs::File::create(&stale).unwrap();
        let old = std::time::SystemTime::now() - STALE_STAGING_AGE - std::time::Duration::from_secs(60);
        file.set_modified(old).unwrap();
        drop(file);

        Downloader::default()
            .download(&dest, &src.to_string_lossy(), &DownloadOptions::default())
            .unwrap();

        assert!(!stale.exists());
        assert!(src.exists());
    }
}
