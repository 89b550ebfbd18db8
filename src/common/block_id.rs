//! Block identifier type.

use std::fmt;

/// Identifies a block on disk: a file name plus the block's position in it.
///
/// Used purely as a key. Two `BlockId`s are equal when both the file name and
/// the block number match, so it can be used directly in a `HashMap` without
/// formatting it into a string first.
///
/// # Example
/// ```
/// use blockbuf::BlockId;
///
/// let a = BlockId::new("student.tbl", 3);
/// let b = BlockId::new("student.tbl", 3);
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), "[file student.tbl, block 3]");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId {
    file_name: String,
    number: u32,
}

impl BlockId {
    /// Create a new BlockId.
    pub fn new(file_name: impl Into<String>, number: u32) -> Self {
        Self {
            file_name: file_name.into(),
            number,
        }
    }

    /// Name of the file holding this block.
    #[inline]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Position of the block within its file.
    #[inline]
    pub fn number(&self) -> u32 {
        self.number
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[file {}, block {}]", self.file_name, self.number)
    }
}
