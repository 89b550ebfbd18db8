//! Capabilities the buffer pool consumes from its collaborators.
//!
//! - [`BlockStore`] - reads, writes and appends whole blocks
//! - [`PageFormatter`] - fills in the initial image of a freshly appended block

use std::sync::Arc;

use crate::common::{BlockId, Result};
use crate::storage::page::Page;

/// Block-granular backing store.
///
/// Implementations must be usable from several threads at once; the buffer
/// pool calls them while holding its own locks but never serializes access
/// on their behalf. Errors are passed through to the pool's caller unchanged.
pub trait BlockStore: Send + Sync {
    /// Fill `page` with the current contents of `block`.
    fn read_block(&self, block: &BlockId, page: &mut Page) -> Result<()>;

    /// Overwrite `block` with `page`. The block must already exist.
    fn write_block(&self, block: &BlockId, page: &Page) -> Result<()>;

    /// Append `page` as a new block at the end of `file_name`.
    fn append_block(&self, file_name: &str, page: &Page) -> Result<BlockId>;

    /// Number of blocks currently in `file_name` (0 if it doesn't exist yet).
    fn block_count(&self, file_name: &str) -> Result<u32>;
}

/// Lets several components share one store, e.g. a pool and a reporter that
/// reads the store's own counters.
impl<T: BlockStore + ?Sized> BlockStore for Arc<T> {
    fn read_block(&self, block: &BlockId, page: &mut Page) -> Result<()> {
        (**self).read_block(block, page)
    }

    fn write_block(&self, block: &BlockId, page: &Page) -> Result<()> {
        (**self).write_block(block, page)
    }

    fn append_block(&self, file_name: &str, page: &Page) -> Result<BlockId> {
        (**self).append_block(file_name, page)
    }

    fn block_count(&self, file_name: &str) -> Result<u32> {
        (**self).block_count(file_name)
    }
}

/// Produces the initial image of a new block.
///
/// Any `Fn(&mut Page)` closure is a formatter:
/// ```
/// use blockbuf::{Page, PageFormatter};
///
/// let fmt = |page: &mut Page| page.set_i32(0, -1);
/// let mut page = Page::new();
/// fmt.format(&mut page);
/// assert_eq!(page.get_i32(0), -1);
/// ```
pub trait PageFormatter {
    /// Write initial content into `page`, which arrives zeroed.
    fn format(&self, page: &mut Page);
}

impl<F> PageFormatter for F
where
    F: Fn(&mut Page),
{
    fn format(&self, page: &mut Page) {
        self(page)
    }
}

/// Leaves new blocks zero-filled.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZeroFormatter;

impl PageFormatter for ZeroFormatter {
    fn format(&self, _page: &mut Page) {}
}
