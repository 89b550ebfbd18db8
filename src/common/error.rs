//! Error types for blockbuf.

use thiserror::Error as ThisError;

use super::{BlockId, BufferId};

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in blockbuf.
///
/// Three kinds of failure reach callers:
/// - capacity exhaustion ([`Error::NoAvailableBuffer`]), which the caller may
///   retry after backing off or treat as a reason to abort
/// - storage failures ([`Error::Io`], [`Error::BlockNotFound`],
///   [`Error::InvalidFileName`]), passed through from the block store untouched
/// - protocol misuse ([`Error::BufferNotPinned`], [`Error::StaleHandle`]),
///   which always indicates a bug in the caller
///
/// Nothing is retried inside the pool.
#[derive(Debug, ThisError)]
pub enum Error {
    /// I/O error from the backing store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Requested block lies beyond the end of its file.
    #[error("{0} not found")]
    BlockNotFound(BlockId),

    /// File name would escape the database directory or is empty.
    #[error("Invalid file name: {0:?}")]
    InvalidFileName(String),

    /// Every buffer is pinned, so nothing can be replaced.
    #[error("No available buffer: all buffers are pinned")]
    NoAvailableBuffer,

    /// Attempted to unpin a buffer that wasn't pinned.
    ///
    /// This indicates a bug - unpinning should match pinning.
    #[error("{0} is not pinned")]
    BufferNotPinned(BufferId),

    /// The handle refers to an earlier assignment of the buffer, or to a
    /// buffer this pool doesn't own.
    #[error("Stale handle for {0}")]
    StaleHandle(BufferId),
}

impl Error {
    /// True for errors caused by calling the pin protocol incorrectly.
    pub fn is_protocol_misuse(&self) -> bool {
        matches!(self, Error::BufferNotPinned(_) | Error::StaleHandle(_))
    }
}
