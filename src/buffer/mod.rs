//! Buffer pool management.
//!
//! The buffer pool is the in-memory cache layer between the storage engine
//! and the block store. It manages a fixed pool of buffers, each holding at
//! most one block.
//!
//! # Components
//! - [`BufferPoolManager`] - The main block cache
//! - [`Buffer`] - A slot in the buffer pool holding a page + metadata
//! - [`BufferHandle`] - Pin token returned by `pin` / `pin_new`
//! - [`PageReadGuard`] / [`PageWriteGuard`] - RAII latches for page access
//! - [`BufferPoolStats`] / [`StatisticsReport`] - Statistics
//! - [`replacer`] - Replacement policy implementations

#[allow(clippy::module_inception)]
mod buffer;
mod buffer_pool_manager;
mod handle;
mod page_guard;
pub mod replacer;
mod stats;

pub use buffer::{Buffer, ModificationMark};
pub use buffer_pool_manager::BufferPoolManager;
pub use handle::BufferHandle;
pub use page_guard::{PageReadGuard, PageWriteGuard};
pub use stats::{BufferPoolStats, BufferStatsEntry, StatisticsReport, StatsSnapshot};
