use std::path::Path;
use std::time::{Duration, SystemTime};

use tracing::{debug, warn};

/// Remove regular files in `dir` older than `max_age` whose names pass `filter`.
///
/// Used to reclaim staged files left behind by interrupted processes. The age
/// threshold keeps files that a concurrent writer may still be filling.
/// Returns the number of files removed; failures are logged, never returned.
pub fn sweep_stale(dir: impl AsRef<Path>, max_age: Duration, filter: impl Fn(&str) -> bool) -> usize {
    let dir = dir.as_ref();
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return 0,
        Err(e) => {
            warn!("cannot scan {} for stale files: {e}", dir.display());
            return 0;
        }
    };

    let now = SystemTime::now();
    let mut removed = 0;
    for entry in entries.flatten() {
        let name = entry.file_name();
        if !filter(&name.to_string_lossy()) {
            continue;
        }
        let Ok(metadata) = entry.metadata() else { continue };
        if !metadata.is_file() {
            continue;
        }
        let age = metadata
            .modified()
            .ok()
            .and_then(|modified| now.duration_since(modified).ok())
            .unwrap_or_default();
        if age < max_age {
            continue;
        }

        let path = entry.path();
        match std::fs::remove_file(&path) {
            Ok(()) => {
                debug!("removed stale {}", path.display());
                removed += 1;
            }
            Err(e) => warn!("failed to remove stale {}: {e}", path.display()),
        }
    }
    removed
}
