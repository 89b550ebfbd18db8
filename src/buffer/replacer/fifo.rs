//! FIFO (First-In-First-Out) replacement policy.
//!
//! Buffers are evicted in the order they became unpinned. Modification
//! marks are ignored.

use std::collections::{HashMap, VecDeque};

use crate::common::{BufferId, Lsn};

use super::Replacer;

/// Evicts the buffer that has been unpinned the longest.
///
/// Re-pinning a buffer does not remove it from the queue (that would be
/// O(n)); instead every entry carries the sequence number it was queued with,
/// and entries that no longer match are skipped. Once dead entries outnumber
/// live ones the queue is compacted, so it never holds more than two entries
/// per buffer.
pub struct FifoReplacer {
    /// Queue of (buffer, sequence) in unpin order (front = oldest).
    queue: VecDeque<(BufferId, u64)>,

    /// Evictable buffers and the sequence of their live queue entry.
    evictable: HashMap<BufferId, u64>,

    next_seq: u64,
}

impl FifoReplacer {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            evictable: HashMap::new(),
            next_seq: 0,
        }
    }

    fn is_live(&self, buffer_id: BufferId, seq: u64) -> bool {
        self.evictable.get(&buffer_id) == Some(&seq)
    }

    /// Drop queue entries that no longer match a live evictable buffer.
    fn compact(&mut self) {
        let evictable = &self.evictable;
        self.queue
            .retain(|(buffer_id, seq)| evictable.get(buffer_id) == Some(seq));
    }

    fn take(&mut self, buffer_id: BufferId) -> BufferId {
        self.evictable.remove(&buffer_id);
        buffer_id
    }
}

impl Default for FifoReplacer {
    fn default() -> Self {
        Self::new()
    }
}

impl Replacer for FifoReplacer {
    fn set_evictable(&mut self, buffer_id: BufferId, _mark: Option<Lsn>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.evictable.insert(buffer_id, seq);
        self.queue.push_back((buffer_id, seq));

        if self.queue.len() > 2 * self.evictable.len().max(1) {
            self.compact();
        }
    }

    fn set_pinned(&mut self, buffer_id: BufferId) {
        self.evictable.remove(&buffer_id);
    }

    fn victim(&mut self, _current_mark: &dyn Fn(BufferId) -> Option<Lsn>) -> Option<BufferId> {
        while let Some((buffer_id, seq)) = self.queue.pop_front() {
            if self.is_live(buffer_id, seq) {
                return Some(self.take(buffer_id));
            }
            // Pinned since, or re-queued with a newer sequence
        }
        None
    }

    fn any_victim(&mut self) -> Option<BufferId> {
        let buffer_id = self.evictable.keys().min().copied()?;
        Some(self.take(buffer_id))
    }

    fn size(&self) -> usize {
        self.evictable.len()
    }
}
