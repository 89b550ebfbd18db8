//! Buffer pool statistics tracking.
//!
//! The pool only counts; formatting and delivering reports is left to
//! whoever reads the counters. [`StatisticsReport`] bundles the pieces a
//! session layer typically prints at commit or rollback.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::common::{BlockId, BufferId};
use crate::storage::FileStatsSnapshot;

/// Pool-wide statistics.
///
/// All fields are atomic for lock-free, thread-safe updates.
///
/// # Memory Ordering
/// We use `Ordering::Relaxed` for all operations because:
/// - We only need atomicity (no partial updates)
/// - We don't need synchronization between different counters
///
/// # Example
/// ```
/// use blockbuf::BufferPoolStats;
/// use std::sync::atomic::Ordering;
///
/// let stats = BufferPoolStats::new();
/// stats.hits.fetch_add(1, Ordering::Relaxed);
/// assert_eq!(stats.hits.load(Ordering::Relaxed), 1);
/// ```
#[derive(Debug, Default)]
pub struct BufferPoolStats {
    /// Calls to `pin` and `pin_new`.
    pub pins: AtomicU64,

    /// Successful calls to `unpin`.
    pub unpins: AtomicU64,

    /// Pins satisfied by a block that was already resident.
    pub hits: AtomicU64,

    /// Pins that had to load the block.
    pub misses: AtomicU64,

    /// Buffers successfully reassigned away from a resident block.
    pub evictions: AtomicU64,
}

impl BufferPoolStats {
    /// Create a new stats tracker with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculate hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        self.snapshot().hit_rate()
    }

    /// Get a snapshot of current statistics.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            pins: self.pins.load(Ordering::Relaxed),
            unpins: self.unpins.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.pins.store(0, Ordering::Relaxed);
        self.unpins.store(0, Ordering::Relaxed);
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.evictions.store(0, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// A point-in-time snapshot of [`BufferPoolStats`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub pins: u64,
    pub unpins: u64,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl StatsSnapshot {
    /// Calculate hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ pins: {}, unpins: {}, hits: {}, misses: {}, evictions: {}, hit_rate: {:.2}% }}",
            self.pins,
            self.unpins,
            self.hits,
            self.misses,
            self.evictions,
            self.hit_rate() * 100.0
        )
    }
}

/// Counters of a single buffer, captured by
/// [`BufferPoolManager::buffer_stats`](super::BufferPoolManager::buffer_stats).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferStatsEntry {
    pub buffer_id: BufferId,
    pub block: Option<BlockId>,
    pub pin_count: u32,
    pub modified: bool,
    pub read_count: u64,
    pub write_count: u64,
}

impl fmt::Display for BufferStatsEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.block {
            Some(block) => write!(f, "{} {}", self.buffer_id, block)?,
            None => write!(f, "{} [unassigned]", self.buffer_id)?,
        }
        write!(
            f,
            "  Pins: {}  Read: {}  Write: {}",
            self.pin_count, self.read_count, self.write_count
        )
    }
}

/// Everything a reporting layer prints after a transaction finishes.
///
/// Built from snapshots the caller collects; rendering goes through
/// `Display`, so the caller picks the destination (log, socket, stdout).
///
/// # Example
/// ```ignore
/// let report = bpm.report().with_file_stats(file_manager.stats().snapshot());
/// log::info!("{}", report);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticsReport {
    pub file: Option<FileStatsSnapshot>,
    pub pool: StatsSnapshot,
    pub buffers: Vec<BufferStatsEntry>,
}

impl StatisticsReport {
    pub fn new(pool: StatsSnapshot, buffers: Vec<BufferStatsEntry>) -> Self {
        Self {
            file: None,
            pool,
            buffers,
        }
    }

    pub fn with_file_stats(mut self, file: FileStatsSnapshot) -> Self {
        self.file = Some(file);
        self
    }

    /// Sum of per-buffer block loads.
    pub fn total_reads(&self) -> u64 {
        self.buffers.iter().map(|b| b.read_count).sum()
    }

    /// Sum of per-buffer write-backs and appends.
    pub fn total_writes(&self) -> u64 {
        self.buffers.iter().map(|b| b.write_count).sum()
    }
}

impl fmt::Display for StatisticsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(file) = &self.file {
            writeln!(f, "### FILE STATISTICS ###")?;
            writeln!(f, "{}", file)?;
            writeln!(f)?;
        }
        writeln!(f, "### BUFFER STATISTICS ###")?;
        writeln!(f, "{}", self.pool)?;
        for (index, entry) in self.buffers.iter().enumerate() {
            writeln!(f, "Index: {}  {}", index + 1, entry)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(n: usize, reads: u64, writes: u64) -> BufferStatsEntry {
        BufferStatsEntry {
            buffer_id: BufferId::new(n),
            block: Some(BlockId::new("t.tbl", n as u32)),
            pin_count: 0,
            modified: false,
            read_count: reads,
            write_count: writes,
        }
    }

    #[test]
    fn test_stats_new() {
        let stats = BufferPoolStats::new();
        assert_eq!(stats.snapshot(), StatsSnapshot::default());
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_stats_snapshot() {
        let stats = BufferPoolStats::new();
        stats.hits.fetch_add(7, Ordering::Relaxed);
        stats.misses.fetch_add(3, Ordering::Relaxed);
        BufferPoolStats::record(&stats.evictions);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.hits, 7);
        assert_eq!(snapshot.misses, 3);
        assert_eq!(snapshot.evictions, 1);
        assert_eq!(snapshot.hit_rate(), 0.7);
    }

    #[test]
    fn test_stats_reset() {
        let stats = BufferPoolStats::new();
        stats.pins.fetch_add(100, Ordering::Relaxed);

        stats.reset();

        assert_eq!(stats.pins.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_stats_display() {
        let snapshot = StatsSnapshot {
            pins: 100,
            unpins: 90,
            hits: 80,
            misses: 20,
            evictions: 5,
        };
        let display = format!("{}", snapshot);

        assert!(display.contains("hits: 80"));
        assert!(display.contains("misses: 20"));
        assert!(display.contains("80.00%"));
    }

    #[test]
    fn test_report_totals() {
        let report = StatisticsReport::new(
            StatsSnapshot::default(),
            vec![entry(0, 3, 1), entry(1, 2, 0)],
        );
        assert_eq!(report.total_reads(), 5);
        assert_eq!(report.total_writes(), 1);
    }

    #[test]
    fn test_report_display_sections() {
        let report = StatisticsReport::new(StatsSnapshot::default(), vec![entry(0, 3, 1)]);
        let text = report.to_string();
        assert!(!text.contains("FILE STATISTICS"));
        assert!(text.contains("### BUFFER STATISTICS ###"));
        assert!(text.contains("Index: 1  Buffer(0) [file t.tbl, block 0]  Pins: 0  Read: 3  Write: 1"));

        let text = report
            .with_file_stats(FileStatsSnapshot {
                blocks_read: 4,
                blocks_written: 1,
                blocks_appended: 0,
            })
            .to_string();
        assert!(text.starts_with("### FILE STATISTICS ###\nBlocks read: 4\nBlocks written: 1\n"));
    }
}
