/// Transfer state reported after each chunk lands in the staging file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Number of bytes written to the staging file.
    pub bytes_downloaded: u64,

    /// Total expected bytes, if the source reported a length.
    pub total_bytes: Option<u64>,
}

impl Progress {
    /// Completion in percent, when the total is known and non-zero.
    pub fn percentage(&self) -> Option<f64> {
        match self.total_bytes {
            Some(total) if total > 0 => Some(self.bytes_downloaded as f64 / total as f64 * 100.0),
            _ => None,
        }
    }
}
