use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::{copy, is_cross_device};
use crate::{Error, Result, StageOptions};

/// Outcome of a no-clobber placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    Installed,
    /// The target already existed; the staged copy was discarded.
    AlreadyPresent,
}

/// A temporary file that becomes visible under its final name only through
/// [`StagedFile::persist`] or [`StagedFile::persist_noclobber`].
///
/// Dropping it without persisting removes the temporary file.
pub struct StagedFile {
    file:    NamedTempFile,
    options: StageOptions,
}

impl StagedFile {
    /// Stage inside `dir`, creating the directory if needed.
    pub fn new_in(dir: impl AsRef<Path>, options: StageOptions) -> Result<Self> {
        Self::create(dir.as_ref(), options.prefix_str(), options)
    }

    /// Stage next to `target` so the final rename stays within one directory.
    pub fn beside(target: impl AsRef<Path>, options: StageOptions) -> Result<Self> {
        let target = target.as_ref();
        let parent = parent_of(target)?;
        let name = target
            .file_name()
            .ok_or_else(|| Error::NoParent(target.to_path_buf()))?
            .to_string_lossy();
        let prefix = format!("{}{}.", options.prefix_str(), name);
        Self::create(&parent, &prefix, options)
    }

    fn create(dir: &Path, prefix: &str, options: StageOptions) -> Result<Self> {
        std::fs::create_dir_all(dir).map_err(|source| Error::Write {
            path: dir.to_path_buf(),
            source,
        })?;

        let file = tempfile::Builder::new()
            .prefix(prefix)
            .suffix(options.suffix_str())
            .tempfile_in(dir)
            .map_err(|source| Error::Write {
                path: dir.to_path_buf(),
                source,
            })?;
        debug!("staging {}", file.path().display());

        Ok(Self { file, options })
    }

    pub fn path(&self) -> &Path { self.file.path() }

    /// Rename into `target`, replacing whatever is there.
    ///
    /// Falls back to copying when the rename crosses filesystems; in that case
    /// `target` is still written through its own sibling temporary file.
    pub fn persist(mut self, target: impl AsRef<Path>) -> Result<()> {
        let target = target.as_ref();
        self.seal()?;
        let from = self.file.path().to_path_buf();
        let options = self.options;

        match self.file.persist(target) {
            Ok(_) => {
                debug!("persisted {} -> {}", from.display(), target.display());
                Ok(())
            }
            Err(e) if is_cross_device(&e.error) => {
                warn!(
                    "{} and {} are on different filesystems, falling back to copy",
                    from.display(),
                    target.display()
                );
                copy::copy_then_rename(e.file.path(), target, options)
            }
            Err(e) => Err(Error::Rename {
                from,
                to: target.to_path_buf(),
                source: e.error,
            }),
        }
    }

    /// Rename into `target` only if nothing exists there yet.
    pub fn persist_noclobber(mut self, target: impl AsRef<Path>) -> Result<Placement> {
        let target = target.as_ref();
        self.seal()?;
        let from = self.file.path().to_path_buf();

        match self.file.persist_noclobber(target) {
            Ok(_) => {
                debug!("persisted {} -> {}", from.display(), target.display());
                Ok(Placement::Installed)
            }
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                debug!("{} already present, discarding {}", target.display(), from.display());
                Ok(Placement::AlreadyPresent)
            }
            Err(e) => Err(Error::Rename {
                from,
                to: target.to_path_buf(),
                source: e.error,
            }),
        }
    }

    pub(super) fn seal(&mut self) -> Result<()> {
        let path = self.file.path().to_path_buf();
        let write_err = |source| Error::Write {
            path: path.clone(),
            source,
        };

        self.file.flush().map_err(write_err)?;
        if let Some(perms) = self.options.into_permissions() {
            self.file.as_file().set_permissions(perms).map_err(write_err)?;
        }
        self.file.as_file().sync_all().map_err(write_err)?;
        Ok(())
    }

    pub(super) fn into_inner(self) -> NamedTempFile { self.file }
}

impl Write for StagedFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> { self.file.write(buf) }

    fn flush(&mut self) -> io::Result<()> { self.file.flush() }
}

pub(super) fn parent_of(target: &Path) -> Result<PathBuf> {
    match target.parent() {
        Some(parent) if parent.as_os_str().is_empty() => Ok(PathBuf::from(".")),
        Some(parent) => Ok(parent.to_path_buf()),
        None => Err(Error::NoParent(target.to_path_buf())),
    }
}
