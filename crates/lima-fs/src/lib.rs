//! Atomic placement of files that must never be observed half-written.
//!
//! Everything here follows one protocol: write into a temporary sibling of the
//! final path, then rename it into place. The rename is atomic within one
//! filesystem, so readers see either no file or the complete file. A staged
//! file that is dropped before being persisted is removed.

mod error;
mod primitives;

pub use error::{Error, Result};
pub use primitives::{Placement, StagedFile, install_copy, sweep_stale};

#[cfg(unix)]
const DEFAULT_PERMISSIONS: u32 = 0o644;

#[cfg(not(unix))]
const DEFAULT_PERMISSIONS: u32 = 0;

#[derive(Clone, Copy, Debug)]
pub struct StageOptions {
    permissions: u32,
    prefix:      &'static str,
    suffix:      &'static str,
}

impl Default for StageOptions {
    fn default() -> Self { Self::new() }
}

impl StageOptions {
    pub fn new() -> Self {
        Self {
            permissions: DEFAULT_PERMISSIONS,
            prefix:      ".",
            suffix:      ".tmp",
        }
    }

    #[cfg(unix)]
    pub fn permissions(mut self, permissions: u32) -> Self {
        self.permissions = permissions;
        self
    }

    #[cfg(not(unix))]
    pub fn permissions(self, _permissions: u32) -> Self { self }

    #[cfg(unix)]
    pub fn into_permissions(self) -> Option<std::fs::Permissions> {
        use std::os::unix::fs::PermissionsExt;
        Some(std::fs::Permissions::from_mode(self.permissions))
    }

    #[cfg(not(unix))]
    pub fn into_permissions(self) -> Option<std::fs::Permissions> { None }

    pub fn prefix_str(&self) -> &'static str { self.prefix }

    pub fn suffix_str(&self) -> &'static str { self.suffix }

    /// Whether `file_name` looks like a file staged beside `target_name`.
    pub fn is_staged_name_for(&self, file_name: &str, target_name: &str) -> bool {
        file_name
            .strip_prefix(self.prefix)
            .and_then(|rest| rest.strip_prefix(target_name))
            .is_some_and(|rest| rest.starts_with('.') && rest.ends_with(self.suffix))
    }
}
