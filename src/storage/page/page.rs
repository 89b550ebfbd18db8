//! Page - the in-memory image of one block.
//!
//! A [`Page`] is a raw 4KB byte array that serves as the unit of I/O
//! between the block store and memory. Pages live inside [`Buffer`]s in
//! the buffer pool.
//!
//! [`Buffer`]: crate::buffer::Buffer

use crate::common::config::PAGE_SIZE;

/// A page of data (4KB, 4KB-aligned).
///
/// Besides raw slice access, the page offers typed accessors at arbitrary
/// byte offsets. Integers are stored little-endian; byte strings and strings
/// are stored as a `u32` length prefix followed by the bytes.
///
/// # Clone Implementation
/// `Page` does NOT implement `Clone` in production code: copying 4KB should
/// be explicit. A `#[cfg(test)]` Clone is provided for tests.
///
/// # Example
/// ```
/// use blockbuf::Page;
///
/// let mut page = Page::new();
/// page.set_i32(0, -7);
/// page.set_string(4, "hello");
/// assert_eq!(page.get_i32(0), -7);
/// assert_eq!(page.get_string(4), "hello");
/// ```
#[repr(align(4096))]
pub struct Page {
    data: [u8; PAGE_SIZE],
}

impl Page {
    /// Create a new zeroed page.
    #[inline]
    pub fn new() -> Self {
        Self {
            data: [0u8; PAGE_SIZE],
        }
    }

    /// Get immutable slice of page data.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Get mutable slice of page data.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Zero out the entire page.
    pub fn reset(&mut self) {
        self.data.fill(0);
    }

    /// Get the size of a page.
    #[inline]
    pub const fn size() -> usize {
        PAGE_SIZE
    }

    /// Bytes needed to store `s` with [`Page::set_string`].
    #[inline]
    pub fn max_encoded_len(s: &str) -> usize {
        4 + s.len()
    }

    // ========================================================================
    // Typed accessors
    // ========================================================================

    /// # Panics
    /// Panics if `offset + 4 > PAGE_SIZE`.
    pub fn get_u32(&self, offset: usize) -> u32 {
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&self.data[offset..offset + 4]);
        u32::from_le_bytes(bytes)
    }

    /// # Panics
    /// Panics if `offset + 4 > PAGE_SIZE`.
    pub fn set_u32(&mut self, offset: usize, value: u32) {
        self.data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }

    pub fn get_i32(&self, offset: usize) -> i32 {
        self.get_u32(offset) as i32
    }

    pub fn set_i32(&mut self, offset: usize, value: i32) {
        self.set_u32(offset, value as u32);
    }

    /// Read a length-prefixed byte string.
    ///
    /// # Panics
    /// Panics if the prefix or the bytes it describes run past the page end.
    pub fn get_bytes(&self, offset: usize) -> &[u8] {
        let len = self.get_u32(offset) as usize;
        let start = offset + 4;
        &self.data[start..start + len]
    }

    /// Write a length-prefixed byte string.
    ///
    /// # Panics
    /// Panics if `offset + 4 + bytes.len() > PAGE_SIZE`.
    pub fn set_bytes(&mut self, offset: usize, bytes: &[u8]) {
        let start = offset + 4;
        assert!(
            start + bytes.len() <= PAGE_SIZE,
            "value does not fit in page at offset {}",
            offset
        );
        self.set_u32(offset, bytes.len() as u32);
        self.data[start..start + bytes.len()].copy_from_slice(bytes);
    }

    /// Read a length-prefixed string. Invalid UTF-8 is replaced, not rejected.
    pub fn get_string(&self, offset: usize) -> String {
        String::from_utf8_lossy(self.get_bytes(offset)).into_owned()
    }

    pub fn set_string(&mut self, offset: usize, s: &str) {
        self.set_bytes(offset, s.as_bytes());
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

// Clone only available in tests - forces explicit copying in production
#[cfg(test)]
impl Clone for Page {
    fn clone(&self) -> Self {
        let mut new_page = Page::new();
        new_page.data.copy_from_slice(&self.data);
        new_page
    }
}

// ============================================================================
// TESTS
// ============================================================================
