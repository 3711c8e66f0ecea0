use std::path::PathBuf;

use crate::{Error, Result};

/// Subdirectory of the user cache directory owned by lima.
const LIMA_CACHE_SUBDIR: &str = "lima";

pub fn user_home() -> Option<PathBuf> {
    home::home_dir()
}

pub fn user_cache() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("LOCALAPPDATA").map(|p| PathBuf::from(p).join("Cache"))
    }
    #[cfg(target_os = "macos")]
    {
        user_home().map(|p| p.join("Library/Caches"))
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        std::env::var_os("XDG_CACHE_HOME")
            .filter(|p| std::path::Path::new(p).is_absolute())
            .map(PathBuf::from)
            .or_else(|| user_home().map(|p| p.join(".cache")))
    }
}

/// The process-standard download cache shared by every lima instance.
pub fn lima_cache() -> Result<PathBuf> {
    user_cache()
        .map(|p| p.join(LIMA_CACHE_SUBDIR))
        .ok_or(Error::NoUserDir("cache"))
}

/// Expand a leading `~` or `~/` against the user's home directory.
///
/// Paths naming another user (`~alice/...`) are returned unchanged.
pub fn expand_home(path: &str) -> Result<PathBuf> {
    let rest = match path.strip_prefix('~') {
        Some("") => "",
        Some(rest) if rest.starts_with('/') || rest.starts_with(std::path::MAIN_SEPARATOR) => {
            &rest[1..]
        }
        _ => return Ok(PathBuf::from(path)),
    };
    let home = user_home().ok_or(Error::NoUserDir("home"))?;
    Ok(if rest.is_empty() { home } else { home.join(rest) })
}
