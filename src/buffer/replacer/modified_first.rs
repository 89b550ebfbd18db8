//! Most-recently-modified-first replacement policy.
//!
//! Selection happens in two tiers:
//! 1. Among unpinned buffers with unflushed changes, take the one with the
//!    highest modification LSN. Ties go to the lowest slot.
//! 2. Otherwise take the lowest-numbered unpinned buffer.
//!
//! Instead of scanning the pool on every miss, the replacer keeps an ordered
//! index of dirty evictable buffers next to an ordered map of all evictable
//! buffers, so each selection is logarithmic.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use crate::common::{BufferId, Lsn};

use super::Replacer;

pub struct ModifiedFirstReplacer {
    /// Every evictable buffer with the mark it had when it became evictable.
    evictable: BTreeMap<BufferId, Option<Lsn>>,

    /// Dirty evictable buffers; `first()` is the highest LSN, lowest slot.
    dirty: BTreeSet<(Reverse<Lsn>, BufferId)>,
}

impl ModifiedFirstReplacer {
    pub fn new() -> Self {
        Self {
            evictable: BTreeMap::new(),
            dirty: BTreeSet::new(),
        }
    }

    fn untrack(&mut self, buffer_id: BufferId) {
        if let Some(Some(lsn)) = self.evictable.remove(&buffer_id) {
            self.dirty.remove(&(Reverse(lsn), buffer_id));
        }
    }
}

impl Default for ModifiedFirstReplacer {
    fn default() -> Self {
        Self::new()
    }
}

impl Replacer for ModifiedFirstReplacer {
    fn set_evictable(&mut self, buffer_id: BufferId, mark: Option<Lsn>) {
        self.untrack(buffer_id);
        self.evictable.insert(buffer_id, mark);
        if let Some(lsn) = mark {
            self.dirty.insert((Reverse(lsn), buffer_id));
        }
    }

    fn set_pinned(&mut self, buffer_id: BufferId) {
        self.untrack(buffer_id);
    }

    fn victim(&mut self, current_mark: &dyn Fn(BufferId) -> Option<Lsn>) -> Option<BufferId> {
        // Tier 1
        while let Some((Reverse(lsn), buffer_id)) = self.dirty.pop_first() {
            let now = current_mark(buffer_id);
            if now == Some(lsn) {
                self.evictable.remove(&buffer_id);
                return Some(buffer_id);
            }

            // Flushed since it was indexed
            self.evictable.insert(buffer_id, now);
            if let Some(lsn) = now {
                self.dirty.insert((Reverse(lsn), buffer_id));
            }
        }

        // Tier 2: everything left is clean
        self.evictable.pop_first().map(|(buffer_id, _)| buffer_id)
    }

    fn any_victim(&mut self) -> Option<BufferId> {
        let (buffer_id, mark) = self.evictable.pop_first()?;
        if let Some(lsn) = mark {
            self.dirty.remove(&(Reverse(lsn), buffer_id));
        }
        Some(buffer_id)
    }

    fn size(&self) -> usize {
        self.evictable.len()
    }
}
