//! blockbuf - the buffer-pool layer of a block-oriented database storage engine.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │        Callers: record/page managers, transactions, recovery   │
//! │            pin / pin_new / unpin / flush_all / lookup           │
//! └─────────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  Buffer Pool (buffer/)                          │
//! │   BufferPoolManager + Buffer + BufferHandle + Statistics        │
//! │   ┌─────────────────────────────────────────────────────────┐   │
//! │   │  Replacement: ModifiedFirst (default) | FIFO            │   │
//! │   └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  Storage (storage/)                             │
//! │   BlockStore + PageFormatter traits, FileManager, Page          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (BlockId, BufferId, TxnId, Lsn, Error, config)
//! - [`buffer`] - Buffer pool management and replacement policies
//! - [`storage`] - Block I/O and page images
//!
//! # Quick Start
//! ```no_run
//! use blockbuf::{BufferPoolManager, FileManager, Lsn, TxnId};
//!
//! let fm = FileManager::open("my_database").unwrap();
//! let bpm = BufferPoolManager::new(8, fm);
//! let txn = TxnId::new(1);
//!
//! // Append a zeroed block and write to it
//! let handle = bpm.pin_new("accounts.tbl", &blockbuf::ZeroFormatter).unwrap();
//! {
//!     let mut page = bpm.write_page(&handle).unwrap();
//!     page.set_i32(0, 100);
//!     page.set_modified(txn, Lsn::new(1));
//! }
//! bpm.unpin(handle).unwrap();
//!
//! // Commit: write back everything the transaction touched
//! bpm.flush_all(txn).unwrap();
//! ```

pub mod buffer;
pub mod common;
pub mod storage;

// Re-export commonly used items at crate root for convenience
pub use common::config::PAGE_SIZE;
pub use common::{
    BlockId, BufferId, BufferPoolConfig, Error, Lsn, ReplacementPolicy, Result, TxnId,
};

pub use buffer::{
    Buffer, BufferHandle, BufferPoolManager, BufferPoolStats, BufferStatsEntry, PageReadGuard,
    PageWriteGuard, StatisticsReport, StatsSnapshot,
};
pub use storage::page::Page;
pub use storage::{BlockStore, FileManager, FileStats, FileStatsSnapshot, PageFormatter, ZeroFormatter};
