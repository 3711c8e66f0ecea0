use std::fs::File;
use std::io;
use std::path::Path;

use tempfile::NamedTempFile;

use super::StagedFile;
use crate::{Error, Result, StageOptions};

/// Copy `src` to `target` atomically: the bytes land in a sibling temporary
/// file first and are renamed over `target` once complete.
pub fn install_copy(
    src: impl AsRef<Path>,
    target: impl AsRef<Path>,
    options: StageOptions,
) -> Result<()> {
    let src = src.as_ref();
    let target = target.as_ref();

    let mut staged = StagedFile::beside(target, options)?;
    copy_from(src, &mut staged)?;
    staged.persist(target)
}

/// Cross-device fallback for [`StagedFile::persist`]. Renames with no further
/// fallback, so a sibling that still fails to rename surfaces as an error.
pub(super) fn copy_then_rename(src: &Path, target: &Path, options: StageOptions) -> Result<()> {
    let mut staged = StagedFile::beside(target, options)?;
    copy_from(src, &mut staged)?;
    staged.seal()?;

    let sibling: NamedTempFile = staged.into_inner();
    let from = sibling.path().to_path_buf();
    sibling.persist(target).map(drop).map_err(|e| Error::Rename {
        from,
        to: target.to_path_buf(),
        source: e.error,
    })
}

fn copy_from(src: &Path, staged: &mut StagedFile) -> Result<()> {
    let mut reader = File::open(src).map_err(|source| Error::Read {
        path: src.to_path_buf(),
        source,
    })?;
    io::copy(&mut reader, staged).map_err(|source| Error::Write {
        path: staged.path().to_path_buf(),
        source,
    })?;
    Ok(())
}
