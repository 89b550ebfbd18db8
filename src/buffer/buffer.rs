//! Buffer - a slot in the buffer pool.
//!
//! A [`Buffer`] holds a [`Page`] plus metadata needed for buffer management:
//! - Which block is resident (if any)
//! - Pin count for reference counting
//! - Modification mark for write-back tracking
//! - Read/write counters for statistics

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::common::{BlockId, BufferId, Lsn, Result, TxnId};
use crate::storage::page::Page;
use crate::storage::{BlockStore, PageFormatter};

/// Who last modified a buffer's page, and at which log position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModificationMark {
    pub txn: TxnId,
    pub lsn: Lsn,
}

#[derive(Debug, Default)]
struct BufferMeta {
    block: Option<BlockId>,
    mark: Option<ModificationMark>,
    /// Bumped every time the buffer is reassigned.
    generation: u64,
}

/// A buffer in the pool.
///
/// Buffers are allocated once when the pool is built and reused for its whole
/// lifetime; eviction only replaces the resident block and page content.
///
/// # Thread Safety
/// - `contents`: `RwLock` - the page latch. Loading and flushing hold it, so
///   a flush never observes a half-written page.
/// - `meta`: `Mutex` - block identity, mark and generation. Always taken
///   after `contents` when both are needed, and never held across I/O.
/// - `pin_count`: `AtomicU32`, changed only by the pool under its own lock.
/// - `read_count` / `write_count`: `AtomicU64` statistics.
pub struct Buffer {
    id: BufferId,
    contents: RwLock<Page>,
    meta: Mutex<BufferMeta>,
    pin_count: AtomicU32,
    read_count: AtomicU64,
    write_count: AtomicU64,
}

impl Buffer {
    /// Create a new unassigned buffer.
    pub fn new(id: BufferId) -> Self {
        Self {
            id,
            contents: RwLock::new(Page::new()),
            meta: Mutex::new(BufferMeta::default()),
            pin_count: AtomicU32::new(0),
            read_count: AtomicU64::new(0),
            write_count: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn id(&self) -> BufferId {
        self.id
    }

    // ========================================================================
    // Page access (RwLock)
    // ========================================================================

    #[inline]
    pub(crate) fn contents(&self) -> RwLockReadGuard<'_, Page> {
        self.contents.read()
    }

    #[inline]
    pub(crate) fn contents_mut(&self) -> RwLockWriteGuard<'_, Page> {
        self.contents.write()
    }

    // ========================================================================
    // Identity and modification state
    // ========================================================================

    /// The resident block, or `None` if the buffer was never assigned.
    pub fn block(&self) -> Option<BlockId> {
        self.meta.lock().block.clone()
    }

    /// Assignment counter used to detect stale handles.
    pub fn generation(&self) -> u64 {
        self.meta.lock().generation
    }

    pub fn mark(&self) -> Option<ModificationMark> {
        self.meta.lock().mark
    }

    /// LSN of the latest unflushed modification, if any.
    pub fn modification_lsn(&self) -> Option<Lsn> {
        self.mark().map(|m| m.lsn)
    }

    /// True if the page has changes that haven't been written back.
    pub fn is_modified(&self) -> bool {
        self.mark().is_some()
    }

    /// True if the page has unflushed changes and `txn` made the latest one.
    pub fn is_modified_by(&self, txn: TxnId) -> bool {
        self.mark().is_some_and(|m| m.txn == txn)
    }

    /// Record a modification. The LSN only ever moves forward.
    ///
    /// Callers must hold the page write latch; see
    /// [`PageWriteGuard::set_modified`](super::PageWriteGuard::set_modified).
    pub(crate) fn set_modified(&self, txn: TxnId, lsn: Lsn) {
        let mut meta = self.meta.lock();
        let lsn = match meta.mark {
            Some(prev) => prev.lsn.max(lsn),
            None => lsn,
        };
        meta.mark = Some(ModificationMark { txn, lsn });
    }

    // ========================================================================
    // Pin count operations (Atomic)
    // ========================================================================

    /// Increment the pin count. Returns the new pin count.
    #[inline]
    pub(crate) fn pin(&self) -> u32 {
        self.pin_count.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Decrement the pin count. Returns the new pin count.
    ///
    /// # Panics
    /// Panics if pin count is already 0.
    #[inline]
    pub(crate) fn unpin(&self) -> u32 {
        let old = self.pin_count.fetch_sub(1, Ordering::Relaxed);
        assert!(old > 0, "pin count underflow");
        old - 1
    }

    #[inline]
    pub fn pin_count(&self) -> u32 {
        self.pin_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn is_pinned(&self) -> bool {
        self.pin_count() > 0
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    /// Number of blocks loaded into this buffer.
    #[inline]
    pub fn read_count(&self) -> u64 {
        self.read_count.load(Ordering::Relaxed)
    }

    /// Number of times this buffer wrote its page to the store.
    #[inline]
    pub fn write_count(&self) -> u64 {
        self.write_count.load(Ordering::Relaxed)
    }

    // ========================================================================
    // Load and write-back
    // ========================================================================

    /// Write the page back if it has unflushed changes.
    ///
    /// Returns whether anything was written. Calling it again right away is a
    /// no-op.
    pub(crate) fn flush<S: BlockStore + ?Sized>(&self, store: &S) -> Result<bool> {
        let page = self.contents();
        self.write_back_if(&page, store, |_, _| true)
    }

    /// Write the page back if `txn` made the latest unflushed change.
    pub(crate) fn flush_if_modified_by<S: BlockStore + ?Sized>(
        &self,
        txn: TxnId,
        store: &S,
    ) -> Result<bool> {
        let page = self.contents();
        self.write_back_if(&page, store, |_, mark| mark.txn == txn)
    }

    /// Write the page back if it is dirty and still holds `block`.
    pub(crate) fn flush_if_holding<S: BlockStore + ?Sized>(
        &self,
        block: &BlockId,
        store: &S,
    ) -> Result<bool> {
        let page = self.contents();
        self.write_back_if(&page, store, |resident, _| resident == block)
    }

    /// Core write-back. The caller holds the page latch, which excludes any
    /// concurrent modification, so the mark can be cleared after the I/O
    /// without rechecking.
    fn write_back_if<S, F>(&self, page: &Page, store: &S, pred: F) -> Result<bool>
    where
        S: BlockStore + ?Sized,
        F: FnOnce(&BlockId, &ModificationMark) -> bool,
    {
        let block = {
            let meta = self.meta.lock();
            match (&meta.block, &meta.mark) {
                (Some(block), Some(mark)) if pred(block, mark) => block.clone(),
                _ => return Ok(false),
            }
        };

        store.write_block(&block, page)?;

        self.meta.lock().mark = None;
        self.write_count.fetch_add(1, Ordering::Relaxed);
        Ok(true)
    }

    /// Detach the current block, after writing it back if it is dirty.
    ///
    /// On a write-back failure the buffer is left exactly as it was.
    fn detach<S: BlockStore + ?Sized>(&self, page: &Page, store: &S) -> Result<()> {
        self.write_back_if(page, store, |_, _| true)?;

        let mut meta = self.meta.lock();
        meta.block = None;
        meta.mark = None;
        meta.generation += 1;
        Ok(())
    }

    /// Make this buffer hold `block`, loading its content from `store`.
    ///
    /// Any unflushed changes to the previous block are written back first.
    /// If that write fails the buffer still holds the previous block; if the
    /// load fails the buffer ends up unassigned.
    pub(crate) fn assign_to_block<S: BlockStore + ?Sized>(
        &self,
        block: BlockId,
        store: &S,
    ) -> Result<()> {
        let mut page = self.contents_mut();
        self.detach(&page, store)?;

        if let Err(e) = store.read_block(&block, &mut page) {
            page.reset();
            return Err(e);
        }

        self.meta.lock().block = Some(block);
        self.read_count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Append a new block to `file_name`, formatted by `formatter`, and make
    /// this buffer hold it.
    ///
    /// The append is counted as a write of this buffer. Failure handling
    /// matches [`Buffer::assign_to_block`].
    pub(crate) fn assign_to_new<S, F>(
        &self,
        file_name: &str,
        formatter: &F,
        store: &S,
    ) -> Result<BlockId>
    where
        S: BlockStore + ?Sized,
        F: PageFormatter + ?Sized,
    {
        let mut page = self.contents_mut();
        self.detach(&page, store)?;

        page.reset();
        formatter.format(&mut page);
        let block = store.append_block(file_name, &page)?;

        self.meta.lock().block = Some(block.clone());
        self.write_count.fetch_add(1, Ordering::Relaxed);
        Ok(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FileManager;
    use tempfile::{tempdir, TempDir};

    fn store_with_blocks(n: i32) -> (FileManager, TempDir) {
        let dir = tempdir().unwrap();
        let fm = FileManager::open(dir.path()).unwrap();
        for i in 0..n {
            let mut page = Page::new();
            page.set_i32(0, i);
            fm.append_block("t.tbl", &page).unwrap();
        }
        (fm, dir)
    }

    #[test]
    fn test_buffer_new() {
        let buffer = Buffer::new(BufferId::new(3));
        assert_eq!(buffer.id(), BufferId::new(3));
        assert_eq!(buffer.block(), None);
        assert!(!buffer.is_pinned());
        assert!(!buffer.is_modified());
        assert_eq!(buffer.read_count(), 0);
        assert_eq!(buffer.write_count(), 0);
    }

    #[test]
    fn test_buffer_pin_unpin() {
        let buffer = Buffer::new(BufferId::new(0));

        assert_eq!(buffer.pin(), 1);
        assert_eq!(buffer.pin(), 2);
        assert_eq!(buffer.unpin(), 1);
        assert!(buffer.is_pinned());
        assert_eq!(buffer.unpin(), 0);
        assert!(!buffer.is_pinned());
    }

    #[test]
    #[should_panic(expected = "pin count underflow")]
    fn test_buffer_unpin_underflow() {
        let buffer = Buffer::new(BufferId::new(0));
        buffer.unpin();
    }

    #[test]
    fn test_set_modified_keeps_highest_lsn() {
        let buffer = Buffer::new(BufferId::new(0));

        buffer.set_modified(TxnId::new(1), Lsn::new(9));
        buffer.set_modified(TxnId::new(2), Lsn::new(5));

        let mark = buffer.mark().unwrap();
        assert_eq!(mark.lsn, Lsn::new(9));
        assert_eq!(mark.txn, TxnId::new(2));
        assert!(buffer.is_modified_by(TxnId::new(2)));
        assert!(!buffer.is_modified_by(TxnId::new(1)));
    }

    #[test]
    fn test_assign_to_block_loads_content() {
        let (fm, _dir) = store_with_blocks(2);
        let buffer = Buffer::new(BufferId::new(0));

        buffer.assign_to_block(BlockId::new("t.tbl", 1), &fm).unwrap();

        assert_eq!(buffer.block(), Some(BlockId::new("t.tbl", 1)));
        assert_eq!(buffer.contents().get_i32(0), 1);
        assert_eq!(buffer.read_count(), 1);
        assert_eq!(buffer.generation(), 1);
    }

    #[test]
    fn test_reassign_writes_back_dirty_page() {
        let (fm, _dir) = store_with_blocks(2);
        let buffer = Buffer::new(BufferId::new(0));
        let blk0 = BlockId::new("t.tbl", 0);

        buffer.assign_to_block(blk0.clone(), &fm).unwrap();
        buffer.contents_mut().set_i32(0, 77);
        buffer.set_modified(TxnId::new(1), Lsn::new(1));

        buffer.assign_to_block(BlockId::new("t.tbl", 1), &fm).unwrap();
        assert!(!buffer.is_modified());
        assert_eq!(buffer.write_count(), 1);

        let mut page = Page::new();
        fm.read_block(&blk0, &mut page).unwrap();
        assert_eq!(page.get_i32(0), 77);
    }

    #[test]
    fn test_flush_is_idempotent() {
        let (fm, _dir) = store_with_blocks(1);
        let buffer = Buffer::new(BufferId::new(0));
        buffer.assign_to_block(BlockId::new("t.tbl", 0), &fm).unwrap();

        assert!(!buffer.flush(&fm).unwrap());

        buffer.set_modified(TxnId::new(1), Lsn::new(3));
        assert!(buffer.flush(&fm).unwrap());
        assert!(!buffer.flush(&fm).unwrap());
        assert_eq!(buffer.write_count(), 1);
    }

    #[test]
    fn test_flush_if_modified_by_other_txn() {
        let (fm, _dir) = store_with_blocks(1);
        let buffer = Buffer::new(BufferId::new(0));
        buffer.assign_to_block(BlockId::new("t.tbl", 0), &fm).unwrap();
        buffer.set_modified(TxnId::new(1), Lsn::new(3));

        assert!(!buffer.flush_if_modified_by(TxnId::new(2), &fm).unwrap());
        assert!(buffer.is_modified());
        assert!(buffer.flush_if_modified_by(TxnId::new(1), &fm).unwrap());
        assert!(!buffer.is_modified());
    }

    #[test]
    fn test_failed_load_leaves_buffer_unassigned() {
        let (fm, _dir) = store_with_blocks(1);
        let buffer = Buffer::new(BufferId::new(0));
        buffer.assign_to_block(BlockId::new("t.tbl", 0), &fm).unwrap();

        let result = buffer.assign_to_block(BlockId::new("t.tbl", 5), &fm);
        assert!(result.is_err());
        assert_eq!(buffer.block(), None);
        assert_eq!(buffer.read_count(), 1);
    }

    #[test]
    fn test_assign_to_new_formats_and_appends() {
        let (fm, _dir) = store_with_blocks(2);
        let buffer = Buffer::new(BufferId::new(0));

        let blk = buffer
            .assign_to_new("t.tbl", &|page: &mut Page| page.set_i32(0, -1), &fm)
            .unwrap();

        assert_eq!(blk, BlockId::new("t.tbl", 2));
        assert_eq!(buffer.block(), Some(blk.clone()));
        assert!(!buffer.is_modified());
        assert_eq!(buffer.write_count(), 1);

        let mut page = Page::new();
        fm.read_block(&blk, &mut page).unwrap();
        assert_eq!(page.get_i32(0), -1);
    }
}
