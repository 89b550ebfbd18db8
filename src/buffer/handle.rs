//! Pin tokens handed out by the buffer pool.

use crate::common::{BlockId, BufferId};

/// Proof that a buffer is pinned on behalf of the holder.
///
/// A handle is obtained from [`BufferPoolManager::pin`] or
/// [`BufferPoolManager::pin_new`] and given back to
/// [`BufferPoolManager::unpin`], which consumes it. It is deliberately not
/// `Clone`: each handle stands for exactly one pin.
///
/// The handle records the buffer's generation at pin time. Every time a buffer
/// is reassigned to another block its generation changes, so a handle can
/// never be mistaken for a pin on the buffer's later contents. It also records
/// which pool issued it, so another pool rejects it.
///
/// Dropping a handle without unpinning it leaks the pin.
///
/// [`BufferPoolManager::pin`]: super::BufferPoolManager::pin
/// [`BufferPoolManager::pin_new`]: super::BufferPoolManager::pin_new
/// [`BufferPoolManager::unpin`]: super::BufferPoolManager::unpin
#[derive(Debug, PartialEq, Eq)]
#[must_use = "dropping a BufferHandle without unpinning it leaks the pin"]
pub struct BufferHandle {
    pool_id: u64,
    buffer_id: BufferId,
    generation: u64,
    block: BlockId,
}

impl BufferHandle {
    pub(crate) fn new(pool_id: u64, buffer_id: BufferId, generation: u64, block: BlockId) -> Self {
        Self {
            pool_id,
            buffer_id,
            generation,
            block,
        }
    }

    /// Id of the pool that issued this handle.
    #[inline]
    pub fn pool_id(&self) -> u64 {
        self.pool_id
    }

    /// The pinned buffer.
    #[inline]
    pub fn buffer_id(&self) -> BufferId {
        self.buffer_id
    }

    /// The block the buffer held when it was pinned.
    #[inline]
    pub fn block(&self) -> &BlockId {
        &self.block
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
