//! Replacement policy implementations (replacers).
//!
//! A replacer tracks the buffers that are resident but unpinned and picks
//! which one gives up its block when the pool is full. Currently implements:
//! - [`ModifiedFirstReplacer`] - most recently modified buffer first (default)
//! - [`FifoReplacer`] - longest-unpinned buffer first

mod fifo;
mod modified_first;

pub use fifo::FifoReplacer;
pub use modified_first::ModifiedFirstReplacer;

use crate::common::{BufferId, Lsn, ReplacementPolicy};

/// Victim selection policy used by the buffer pool.
///
/// The pool calls every method while holding its own lock, so
/// implementations need no internal synchronization. A buffer returned from
/// [`Replacer::victim`] or [`Replacer::any_victim`] is no longer tracked.
pub trait Replacer: Send {
    /// The buffer's pin count dropped to zero. `mark` is the LSN of its
    /// unflushed changes, if it has any.
    fn set_evictable(&mut self, buffer_id: BufferId, mark: Option<Lsn>);

    /// The buffer was pinned again and must not be chosen.
    fn set_pinned(&mut self, buffer_id: BufferId);

    /// Choose a buffer to receive an existing block.
    ///
    /// `current_mark` reports a buffer's mark as of now, which may differ from
    /// what was passed to `set_evictable` if the buffer was flushed while
    /// unpinned.
    fn victim(&mut self, current_mark: &dyn Fn(BufferId) -> Option<Lsn>) -> Option<BufferId>;

    /// Choose a buffer to receive a freshly appended block: any evictable
    /// buffer, lowest slot first.
    fn any_victim(&mut self) -> Option<BufferId>;

    /// Number of evictable buffers.
    fn size(&self) -> usize;
}

/// Build the replacer for `policy`.
pub fn for_policy(policy: ReplacementPolicy) -> Box<dyn Replacer> {
    match policy {
        ReplacementPolicy::ModifiedFirst => Box::new(ModifiedFirstReplacer::new()),
        ReplacementPolicy::Fifo => Box::new(FifoReplacer::new()),
    }
}
