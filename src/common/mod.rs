//! Common types and utilities shared across blockbuf.
//!
//! This module contains fundamental primitives used throughout the codebase:
//! - Configuration constants and [`BufferPoolConfig`]
//! - Error types
//! - Identifiers (BlockId, BufferId, TxnId, Lsn)

mod block_id;
mod buffer_id;
pub mod config;
pub mod error;
mod txn;

pub use block_id::BlockId;
pub use buffer_id::BufferId;
pub use config::{BufferPoolConfig, ReplacementPolicy};
pub use error::{Error, Result};
pub use txn::{Lsn, TxnId};
