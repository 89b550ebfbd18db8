//! Transaction and log-sequence identifiers.
//!
//! Both are opaque to the buffer layer: they are handed in by the transaction
//! and logging collaborators and only compared.

use std::fmt;

/// Identifies the transaction that modified a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TxnId(pub u64);

impl TxnId {
    #[inline]
    pub fn new(id: u64) -> Self {
        TxnId(id)
    }
}

impl fmt::Display for TxnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Txn({})", self.0)
    }
}

/// Log sequence number of the record describing a page modification.
///
/// Higher means more recent. A buffer that was never modified since it was
/// loaded carries no `Lsn` at all (`Option::None`), not a sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Lsn(pub u64);

impl Lsn {
    #[inline]
    pub fn new(lsn: u64) -> Self {
        Lsn(lsn)
    }
}

impl fmt::Display for Lsn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lsn({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lsn_ordering() {
        assert!(Lsn::new(5) < Lsn::new(9));
        assert_eq!(Lsn::new(5).max(Lsn::new(9)), Lsn::new(9));
    }

    #[test]
    fn test_display() {
        assert_eq!(TxnId::new(7).to_string(), "Txn(7)");
        assert_eq!(Lsn::new(3).to_string(), "Lsn(3)");
    }
}
