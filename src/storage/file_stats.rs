//! Block I/O counters kept by the [`FileManager`](super::FileManager).

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counts of block-level I/O performed against the database files.
///
/// All fields are atomic; `Ordering::Relaxed` is enough since the counters
/// are independent of each other and only read for reporting.
#[derive(Debug, Default)]
pub struct FileStats {
    /// Blocks read from disk.
    pub blocks_read: AtomicU64,

    /// Existing blocks overwritten on disk.
    pub blocks_written: AtomicU64,

    /// New blocks appended to a file.
    pub blocks_appended: AtomicU64,
}

impl FileStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a point-in-time copy of the counters.
    pub fn snapshot(&self) -> FileStatsSnapshot {
        FileStatsSnapshot {
            blocks_read: self.blocks_read.load(Ordering::Relaxed),
            blocks_written: self.blocks_written.load(Ordering::Relaxed),
            blocks_appended: self.blocks_appended.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.blocks_read.store(0, Ordering::Relaxed);
        self.blocks_written.store(0, Ordering::Relaxed);
        self.blocks_appended.store(0, Ordering::Relaxed);
    }
}

/// Non-atomic copy of [`FileStats`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FileStatsSnapshot {
    pub blocks_read: u64,
    pub blocks_written: u64,
    pub blocks_appended: u64,
}

impl fmt::Display for FileStatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Blocks read: {}", self.blocks_read)?;
        write!(
            f,
            "Blocks written: {}",
            self.blocks_written + self.blocks_appended
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stats_snapshot_and_reset() {
        let stats = FileStats::new();
        stats.blocks_read.fetch_add(4, Ordering::Relaxed);
        stats.blocks_written.fetch_add(2, Ordering::Relaxed);
        stats.blocks_appended.fetch_add(1, Ordering::Relaxed);

        let snap = stats.snapshot();
        assert_eq!(snap.blocks_read, 4);
        assert_eq!(snap.blocks_written, 2);
        assert_eq!(snap.blocks_appended, 1);

        stats.reset();
        assert_eq!(stats.snapshot(), FileStatsSnapshot::default());
    }

    #[test]
    fn test_file_stats_display() {
        let snap = FileStatsSnapshot {
            blocks_read: 10,
            blocks_written: 3,
            blocks_appended: 2,
        };
        assert_eq!(snap.to_string(), "Blocks read: 10\nBlocks written: 5");
    }
}
