//! Content-addressable store of verified artifacts.
//!
//! Entries live at `<root>/by-digest/<algorithm>/<hex>` and are written once:
//! an entry that exists is complete and valid forever. Writers stage into
//! `<root>/staging/` on the same filesystem and publish with a no-clobber
//! rename, so concurrent writers of the same digest race harmlessly.

use std::path::PathBuf;
use std::time::Duration;

use lima_fs::{Placement, StageOptions, StagedFile};
use lima_verify::Digest;
use tracing::debug;

use crate::Result;

const ENTRIES_DIR: &str = "by-digest";
const STAGING_DIR: &str = "staging";

/// Staged files older than this are assumed abandoned by a crashed writer.
///
/// A leftover is therefore reclaimed by the first fetch after it has aged
/// past this threshold, not by the very next one: a younger staging file may
/// belong to a writer in another process that is still filling it.
pub const STALE_STAGING_AGE: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    /// A handle on the cache rooted at `root`. Touches nothing on disk; the
    /// directories appear when the first entry is staged.
    pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

    pub fn entry_path(&self, digest: &Digest) -> PathBuf {
        self.root
            .join(ENTRIES_DIR)
            .join(digest.algorithm().as_str())
            .join(digest.encoded())
    }

    pub fn lookup(&self, digest: &Digest) -> Option<PathBuf> {
        let entry = self.entry_path(digest);
        entry.is_file().then_some(entry)
    }

    /// A fresh staging file for content that will be installed under its
    /// digest. Stale staging files left by crashed writers are reclaimed first.
    pub fn stage(&self) -> Result<StagedFile> {
        let staging = self.staging_dir();
        std::fs::create_dir_all(&staging).map_err(|source| lima_fs::Error::Write {
            path: staging.clone(),
            source,
        })?;

        let removed = lima_fs::sweep_stale(&staging, STALE_STAGING_AGE, |_| true);
        if removed > 0 {
            debug!("removed {removed} stale staging files from {}", staging.display());
        }
        Ok(StagedFile::new_in(staging, Self::entry_options())?)
    }

    /// Publish `staged` as the entry for `digest`. The caller has verified the
    /// content. If the entry already exists the staged copy is discarded.
    pub fn install(&self, digest: &Digest, staged: StagedFile) -> Result<PathBuf> {
        let entry = self.entry_path(digest);
        if let Some(parent) = entry.parent() {
            std::fs::create_dir_all(parent).map_err(|source| lima_fs::Error::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        match staged.persist_noclobber(&entry)? {
            Placement::Installed => debug!("cached {digest} at {}", entry.display()),
            Placement::AlreadyPresent => debug!("{digest} was cached concurrently, keeping existing entry"),
        }
        Ok(entry)
    }

    fn staging_dir(&self) -> PathBuf { self.root.join(STAGING_DIR) }

    // Entries are never modified after publication.
    fn entry_options() -> StageOptions { StageOptions::new().permissions(0o444) }
}
