//! RAII latches for page access.
//!
//! These guards provide safe access to the page inside a pinned buffer:
//! - [`PageReadGuard`] - Shared read access (multiple allowed)
//! - [`PageWriteGuard`] - Exclusive write access
//!
//! A guard borrows the [`BufferHandle`] it was created from, so the pin
//! cannot be released while the latch is held. Dropping a guard releases
//! the latch only; the pin stays until the handle is unpinned.

use std::ops::{Deref, DerefMut};

use parking_lot::{RwLockReadGuard, RwLockWriteGuard};

use crate::common::{BlockId, Lsn, TxnId};
use crate::storage::page::Page;

use super::{Buffer, BufferHandle};

/// Guard for read-only page access.
///
/// # Example
/// ```ignore
/// let handle = bpm.pin(&block)?;
/// {
///     let page = bpm.read_page(&handle)?;
///     let value = page.get_i32(0);  // Deref to &Page
/// }
/// bpm.unpin(handle)?;
/// ```
pub struct PageReadGuard<'a> {
    handle: &'a BufferHandle,
    lock: RwLockReadGuard<'a, Page>,
}

impl<'a> PageReadGuard<'a> {
    pub(crate) fn new(handle: &'a BufferHandle, lock: RwLockReadGuard<'a, Page>) -> Self {
        Self { handle, lock }
    }

    #[inline]
    pub fn block(&self) -> &BlockId {
        self.handle.block()
    }
}

impl Deref for PageReadGuard<'_> {
    type Target = Page;

    #[inline]
    fn deref(&self) -> &Page {
        &self.lock
    }
}

/// Guard for exclusive write access to a page.
///
/// Changes only become eligible for write-back once they are recorded with
/// [`PageWriteGuard::set_modified`].
///
/// # Example
/// ```ignore
/// let handle = bpm.pin(&block)?;
/// {
///     let mut page = bpm.write_page(&handle)?;
///     page.set_i32(0, 42);  // DerefMut to &mut Page
///     page.set_modified(txn, lsn);
/// }
/// bpm.unpin(handle)?;
/// ```
pub struct PageWriteGuard<'a> {
    buffer: &'a Buffer,
    handle: &'a BufferHandle,
    lock: RwLockWriteGuard<'a, Page>,
}

impl<'a> PageWriteGuard<'a> {
    pub(crate) fn new(
        buffer: &'a Buffer,
        handle: &'a BufferHandle,
        lock: RwLockWriteGuard<'a, Page>,
    ) -> Self {
        Self {
            buffer,
            handle,
            lock,
        }
    }

    #[inline]
    pub fn block(&self) -> &BlockId {
        self.handle.block()
    }

    /// Record that `txn` changed the page, as described by the log record
    /// at `lsn`.
    pub fn set_modified(&mut self, txn: TxnId, lsn: Lsn) {
        self.buffer.set_modified(txn, lsn);
    }
}

impl Deref for PageWriteGuard<'_> {
    type Target = Page;

    #[inline]
    fn deref(&self) -> &Page {
        &self.lock
    }
}

impl DerefMut for PageWriteGuard<'_> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Page {
        &mut self.lock
    }
}
