//! Storage layer - block I/O and page images.
//!
//! This module handles persistent storage:
//! - [`BlockStore`] / [`PageFormatter`] - What the buffer pool needs from storage
//! - [`FileManager`] - File-per-table implementation of [`BlockStore`]
//! - [`page`] - The in-memory page image

mod block_store;
mod file_manager;
mod file_stats;
pub mod page;

pub use block_store::{BlockStore, PageFormatter, ZeroFormatter};
pub use file_manager::FileManager;
pub use file_stats::{FileStats, FileStatsSnapshot};
