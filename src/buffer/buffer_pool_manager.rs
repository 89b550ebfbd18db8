//! Buffer Pool Manager - the core block caching layer.
//!
//! The [`BufferPoolManager`] provides:
//! - Block caching between the block store and memory
//! - Pin-based reference counting with generation-checked handles
//! - Write-back of dirty pages before their buffer is reused
//! - Pluggable replacement policies

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, trace, warn};
use parking_lot::Mutex;

use crate::buffer::replacer::{self, Replacer};
use crate::buffer::{
    Buffer, BufferHandle, BufferPoolStats, BufferStatsEntry, PageReadGuard, PageWriteGuard,
    StatisticsReport,
};
use crate::common::{BlockId, BufferId, BufferPoolConfig, Error, Result, TxnId};
use crate::storage::{BlockStore, PageFormatter};

/// Source of pool ids, so handles can be traced back to their pool.
static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(0);

/// Mutable pool bookkeeping, guarded by one lock.
struct PoolState {
    /// Maps resident blocks to the buffer holding them.
    block_table: HashMap<BlockId, BufferId>,

    /// Buffers that have never held a block, popped lowest slot first.
    free_list: Vec<BufferId>,

    /// Victim selection among resident, unpinned buffers.
    replacer: Box<dyn Replacer>,

    /// Buffers with a pin count of zero.
    available: usize,
}

/// Manages a fixed pool of buffers caching disk blocks.
///
/// # Architecture
/// ```text
/// ┌─────────────────────────────────────────────────────────────┐
/// │                    BufferPoolManager                        │
/// │  ┌──────────────────────── Mutex<PoolState> ────────────┐   │
/// │  │ block_table        free_list      replacer  available│   │
/// │  │ BlockId → BufferId Vec<BufferId>  dyn Replacer usize │   │
/// │  └──────────────────────────────────────────────────────┘   │
/// │  ┌───────────────────────────────────┐  ┌──────────────┐    │
/// │  │      buffers: Vec<Buffer>         │  │    store     │    │
/// │  │  [Buffer0] [Buffer1] [Buffer2] ...│  │ impl BlockStore │ │
/// │  └───────────────────────────────────┘  └──────────────┘    │
/// └─────────────────────────────────────────────────────────────┘
/// ```
///
/// # Thread Safety
/// - `state`: one `Mutex`. `pin`, `pin_new` and `unpin` each run entirely
///   inside it, so no caller sees a half-updated mapping or pin count, and two
///   callers can never be handed the same victim.
/// - `buffers`: no lock, fixed size; each Buffer has its own page latch.
/// - `stats`: no lock, all atomic counters.
///
/// Lock order is pool state, then a buffer's page latch. Eviction only
/// latches unpinned buffers, which no guard can be holding, and the flush
/// operations run without the pool lock. A caller may therefore hold a page
/// guard while pinning another block.
///
/// The flush operations are the exception: they latch every buffer in turn,
/// and page latches are not reentrant. Drop all guards before calling
/// `flush_all`, `flush_all_dirty` or `flush_block`.
///
/// # Usage
/// ```ignore
/// let fm = FileManager::open("db")?;
/// let bpm = BufferPoolManager::new(8, fm);
///
/// let handle = bpm.pin(&BlockId::new("student.tbl", 0))?;
/// {
///     let mut page = bpm.write_page(&handle)?;
///     page.set_i32(80, 42);
///     page.set_modified(txn, lsn);
/// }
/// bpm.unpin(handle)?;
/// bpm.flush_all(txn)?;
/// ```
pub struct BufferPoolManager<S: BlockStore> {
    /// Stamped into every handle this pool issues.
    pool_id: u64,

    /// Fixed pool of buffers allocated at startup.
    buffers: Vec<Buffer>,

    state: Mutex<PoolState>,

    /// Backing store for loads, write-backs and appends.
    store: S,

    /// Performance statistics.
    stats: BufferPoolStats,

    /// Number of buffers in the pool (immutable after construction).
    pool_size: usize,
}

impl<S: BlockStore> BufferPoolManager<S> {
    /// Create a pool of `pool_size` buffers using the default policy.
    ///
    /// # Panics
    /// Panics if `pool_size` is 0.
    pub fn new(pool_size: usize, store: S) -> Self {
        Self::with_config(BufferPoolConfig::default().with_pool_size(pool_size), store)
    }

    /// Create a pool from an explicit configuration.
    ///
    /// # Panics
    /// Panics if `config.pool_size` is 0.
    pub fn with_config(config: BufferPoolConfig, store: S) -> Self {
        let pool_size = config.pool_size;
        assert!(pool_size > 0, "pool_size must be > 0");

        // Allocate all buffers upfront
        let buffers: Vec<Buffer> = (0..pool_size)
            .map(|i| Buffer::new(BufferId::new(i)))
            .collect();

        // Reversed so that pop() hands out slot 0 first
        let free_list: Vec<BufferId> = (0..pool_size).rev().map(BufferId::new).collect();

        let pool_id = NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed);
        debug!(
            "Buffer pool {} created: pool_size: {}, policy: {:?}",
            pool_id, pool_size, config.policy
        );

        Self {
            pool_id,
            buffers,
            state: Mutex::new(PoolState {
                block_table: HashMap::with_capacity(pool_size),
                free_list,
                replacer: replacer::for_policy(config.policy),
                available: pool_size,
            }),
            store,
            stats: BufferPoolStats::new(),
            pool_size,
        }
    }

    // ========================================================================
    // Public API: Pin and unpin
    // ========================================================================

    /// Pin a buffer holding `block`, loading the block if it isn't resident.
    ///
    /// If every buffer is in use, a victim is chosen by the replacement
    /// policy; its dirty page is written back before the new block is loaded.
    ///
    /// # Errors
    /// - `Error::NoAvailableBuffer` if every buffer is pinned
    /// - Storage errors from writing back the victim or loading the block
    pub fn pin(&self, block: &BlockId) -> Result<BufferHandle> {
        let mut state = self.state.lock();
        BufferPoolStats::record(&self.stats.pins);

        if let Some(&buffer_id) = state.block_table.get(block) {
            BufferPoolStats::record(&self.stats.hits);
            trace!("Pin hit: {} in {}", block, buffer_id);
            return Ok(self.pin_buffer(&mut state, buffer_id, block.clone()));
        }

        BufferPoolStats::record(&self.stats.misses);

        let (buffer_id, evicted) = self.claim_buffer(&mut state, false)?;

        let buffer = &self.buffers[buffer_id.0];
        if let Err(e) = buffer.assign_to_block(block.clone(), &self.store) {
            self.restore_after_failure(&mut state, buffer_id, &e);
            return Err(e);
        }
        if evicted {
            BufferPoolStats::record(&self.stats.evictions);
        }

        state.block_table.insert(block.clone(), buffer_id);
        Ok(self.pin_buffer(&mut state, buffer_id, block.clone()))
    }

    /// Append a new block to `file_name`, formatted by `formatter`, and pin a
    /// buffer holding it.
    ///
    /// The resident-block lookup is skipped, since the block can't be
    /// resident yet. Any unpinned buffer may be reused, lowest slot first.
    ///
    /// # Errors
    /// - `Error::NoAvailableBuffer` if every buffer is pinned; nothing is
    ///   appended in that case
    /// - Storage errors from writing back the victim or appending
    pub fn pin_new<F>(&self, file_name: &str, formatter: &F) -> Result<BufferHandle>
    where
        F: PageFormatter + ?Sized,
    {
        let mut state = self.state.lock();
        BufferPoolStats::record(&self.stats.pins);

        let (buffer_id, evicted) = self.claim_buffer(&mut state, true)?;

        let buffer = &self.buffers[buffer_id.0];
        let block = match buffer.assign_to_new(file_name, formatter, &self.store) {
            Ok(block) => block,
            Err(e) => {
                self.restore_after_failure(&mut state, buffer_id, &e);
                return Err(e);
            }
        };

        if evicted {
            BufferPoolStats::record(&self.stats.evictions);
        }

        debug!("New block {} pinned in {}", block, buffer_id);
        state.block_table.insert(block.clone(), buffer_id);
        Ok(self.pin_buffer(&mut state, buffer_id, block))
    }

    /// Release the pin represented by `handle`.
    ///
    /// # Errors
    /// - `Error::StaleHandle` if the buffer has been reassigned since the
    ///   handle was issued, or the handle belongs to another pool
    /// - `Error::BufferNotPinned` if the buffer has no pins left
    pub fn unpin(&self, handle: BufferHandle) -> Result<()> {
        let mut state = self.state.lock();
        let buffer = self.buffer_for(&handle)?;
        let buffer_id = buffer.id();

        if !buffer.is_pinned() {
            return Err(Error::BufferNotPinned(buffer_id));
        }

        BufferPoolStats::record(&self.stats.unpins);

        // If pin count dropped to 0, buffer is now a replacement candidate
        if buffer.unpin() == 0 {
            state.available += 1;
            state
                .replacer
                .set_evictable(buffer_id, buffer.modification_lsn());
        }

        Ok(())
    }

    // ========================================================================
    // Public API: Page access
    // ========================================================================

    /// Latch the pinned page for reading.
    ///
    /// # Errors
    /// Same handle checks as [`BufferPoolManager::unpin`].
    pub fn read_page<'a>(&'a self, handle: &'a BufferHandle) -> Result<PageReadGuard<'a>> {
        let buffer = self.pinned_buffer_for(handle)?;
        Ok(PageReadGuard::new(handle, buffer.contents()))
    }

    /// Latch the pinned page for writing.
    ///
    /// # Errors
    /// Same handle checks as [`BufferPoolManager::unpin`].
    pub fn write_page<'a>(&'a self, handle: &'a BufferHandle) -> Result<PageWriteGuard<'a>> {
        let buffer = self.pinned_buffer_for(handle)?;
        Ok(PageWriteGuard::new(buffer, handle, buffer.contents_mut()))
    }

    // ========================================================================
    // Public API: Flush
    // ========================================================================

    /// Write back every buffer whose latest unflushed change was made by `txn`.
    ///
    /// Buffers dirtied by other transactions are left alone. Running it twice
    /// in a row writes nothing the second time.
    ///
    /// Each buffer is flushed under its page latch. The calling thread must
    /// not hold a [`PageReadGuard`] or [`PageWriteGuard`] from this pool:
    /// latching that buffer again blocks forever on a write guard, and on a
    /// read guard as soon as another thread queues for the write latch.
    ///
    /// # Errors
    /// Stops at, and returns, the first storage error.
    pub fn flush_all(&self, txn: TxnId) -> Result<()> {
        for buffer in &self.buffers {
            buffer.flush_if_modified_by(txn, &self.store)?;
        }
        Ok(())
    }

    /// Write back every dirty buffer, regardless of transaction.
    ///
    /// Same latching rule as [`BufferPoolManager::flush_all`].
    pub fn flush_all_dirty(&self) -> Result<()> {
        for buffer in &self.buffers {
            buffer.flush(&self.store)?;
        }
        Ok(())
    }

    /// Write back `block` if it is resident and dirty. Returns whether a write
    /// happened.
    ///
    /// Same latching rule as [`BufferPoolManager::flush_all`].
    pub fn flush_block(&self, block: &BlockId) -> Result<bool> {
        let buffer_id = match self.lookup(block) {
            Some(buffer_id) => buffer_id,
            None => return Ok(false),
        };
        // Rechecked under the page latch; the buffer may have been reassigned
        self.buffers[buffer_id.0].flush_if_holding(block, &self.store)
    }

    // ========================================================================
    // Public API: Lookup and introspection
    // ========================================================================

    /// True if `block` is resident. Does not pin.
    pub fn contains_mapping(&self, block: &BlockId) -> bool {
        self.state.lock().block_table.contains_key(block)
    }

    /// The buffer holding `block`, if resident. Does not pin.
    pub fn lookup(&self, block: &BlockId) -> Option<BufferId> {
        self.state.lock().block_table.get(block).copied()
    }

    /// Pin count of the buffer holding `block`, if resident.
    pub fn pin_count(&self, block: &BlockId) -> Option<u32> {
        self.lookup(block)
            .map(|buffer_id| self.buffers[buffer_id.0].pin_count())
    }

    /// Number of unpinned buffers.
    pub fn available(&self) -> usize {
        self.state.lock().available
    }

    /// Number of buffers holding a block.
    pub fn resident_count(&self) -> usize {
        self.state.lock().block_table.len()
    }

    /// Number of buffers that have never held a block.
    pub fn free_count(&self) -> usize {
        self.state.lock().free_list.len()
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Read-only view of a buffer slot.
    pub fn buffer(&self, buffer_id: BufferId) -> Option<&Buffer> {
        self.buffers.get(buffer_id.0)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ========================================================================
    // Public API: Statistics
    // ========================================================================

    pub fn stats(&self) -> &BufferPoolStats {
        &self.stats
    }

    /// Per-buffer counters for every resident buffer, in slot order.
    pub fn buffer_stats(&self) -> Vec<BufferStatsEntry> {
        self.buffers
            .iter()
            .filter_map(|buffer| {
                let block = buffer.block()?;
                Some(BufferStatsEntry {
                    buffer_id: buffer.id(),
                    block: Some(block),
                    pin_count: buffer.pin_count(),
                    modified: buffer.is_modified(),
                    read_count: buffer.read_count(),
                    write_count: buffer.write_count(),
                })
            })
            .collect()
    }

    /// Pool and buffer statistics, ready to be rendered by a reporting layer.
    pub fn report(&self) -> StatisticsReport {
        StatisticsReport::new(self.stats.snapshot(), self.buffer_stats())
    }

    // ========================================================================
    // Internal
    // ========================================================================

    /// Pin a resident buffer and hand out a handle for it.
    fn pin_buffer(&self, state: &mut PoolState, buffer_id: BufferId, block: BlockId) -> BufferHandle {
        let buffer = &self.buffers[buffer_id.0];
        if buffer.pin() == 1 {
            state.available -= 1;
            state.replacer.set_pinned(buffer_id);
        }
        BufferHandle::new(self.pool_id, buffer_id, buffer.generation(), block)
    }

    /// A never-used buffer if there is one, else a victim. The flag tells
    /// whether a resident block is being replaced.
    fn claim_buffer(&self, state: &mut PoolState, for_new_block: bool) -> Result<(BufferId, bool)> {
        match state.free_list.pop() {
            Some(buffer_id) => Ok((buffer_id, false)),
            None => self
                .evict(state, for_new_block)
                .map(|buffer_id| (buffer_id, true)),
        }
    }

    /// Take a buffer away from its current block.
    ///
    /// The victim's mapping is removed here; its page is written back when the
    /// new block is assigned. The eviction is counted by the caller once the
    /// assignment succeeds.
    fn evict(&self, state: &mut PoolState, for_new_block: bool) -> Result<BufferId> {
        let buffers = &self.buffers;
        let victim = if for_new_block {
            state.replacer.any_victim()
        } else {
            state
                .replacer
                .victim(&|buffer_id| buffers[buffer_id.0].modification_lsn())
        };
        let buffer_id = victim.ok_or(Error::NoAvailableBuffer)?;

        if let Some(old) = buffers[buffer_id.0].block() {
            debug!("Evicting {} from {}", old, buffer_id);
            state.block_table.remove(&old);
        }

        Ok(buffer_id)
    }

    /// Put a buffer back where it belongs after a failed assignment.
    ///
    /// A failed write-back leaves the old block in place, so its mapping and
    /// replacer entry come back. A failed load or append leaves the buffer
    /// empty, so it goes to the free list.
    fn restore_after_failure(&self, state: &mut PoolState, buffer_id: BufferId, err: &Error) {
        let buffer = &self.buffers[buffer_id.0];
        match buffer.block() {
            Some(old) => {
                warn!("{} keeps {} after failed reassignment: {}", buffer_id, old, err);
                state.block_table.insert(old, buffer_id);
                state
                    .replacer
                    .set_evictable(buffer_id, buffer.modification_lsn());
            }
            None => {
                warn!("{} left empty after failed load: {}", buffer_id, err);
                state.free_list.push(buffer_id);
            }
        }
    }

    /// Resolve a handle to its buffer, rejecting handles from an earlier
    /// assignment or another pool.
    fn buffer_for(&self, handle: &BufferHandle) -> Result<&Buffer> {
        let buffer_id = handle.buffer_id();
        if handle.pool_id() != self.pool_id {
            return Err(Error::StaleHandle(buffer_id));
        }
        let buffer = self
            .buffers
            .get(buffer_id.0)
            .ok_or(Error::StaleHandle(buffer_id))?;

        let current = buffer.generation() == handle.generation()
            && buffer.block().as_ref() == Some(handle.block());
        if !current {
            return Err(Error::StaleHandle(buffer_id));
        }
        Ok(buffer)
    }

    fn pinned_buffer_for(&self, handle: &BufferHandle) -> Result<&Buffer> {
        let buffer = self.buffer_for(handle)?;
        if !buffer.is_pinned() {
            return Err(Error::BufferNotPinned(buffer.id()));
        }
        Ok(buffer)
    }
}
