//! Buffer identifier type.

use std::fmt;

/// Identifies a buffer slot in the pool.
///
/// Using `usize` because:
/// 1. Buffers are stored in `Vec<Buffer>`
/// 2. Direct indexing without casting: `buffers[buffer_id.0]`
/// 3. Slot order doubles as the deterministic tie-break for eviction
///
/// # Example
/// ```
/// use blockbuf::BufferId;
///
/// let id = BufferId::new(5);
/// assert_eq!(id.0, 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub usize);

impl BufferId {
    /// Create a new BufferId.
    #[inline]
    pub fn new(id: usize) -> Self {
        BufferId(id)
    }
}

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Buffer({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_id_ordering() {
        assert!(BufferId::new(1) < BufferId::new(2));
        assert_eq!(BufferId::new(5), BufferId::new(5));
    }

    #[test]
    fn test_buffer_id_display() {
        assert_eq!(format!("{}", BufferId::new(42)), "Buffer(42)");
    }
}
