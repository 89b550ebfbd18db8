//! Configuration for blockbuf.

/// Size of a block (and of a page image) in bytes (4KB).
///
/// This value is chosen to match:
/// - OS page size on most systems (4096 bytes)
/// - Common database block sizes
///
/// # Memory Layout
/// With 4KB blocks and 32-bit block numbers, a single file tops out at
/// 2^32 × 4KB = 16TB.
pub const PAGE_SIZE: usize = 4096;

/// Number of buffers used when no explicit size is configured.
pub const DEFAULT_POOL_SIZE: usize = 8;

/// Which replacement policy the pool uses when every buffer is resident.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ReplacementPolicy {
    /// Prefer the unpinned buffer with the highest modification LSN; fall back
    /// to the lowest-numbered clean unpinned buffer.
    #[default]
    ModifiedFirst,
    /// Evict the buffer that has been unpinned the longest.
    Fifo,
}

/// Construction-time settings for a [`BufferPoolManager`](crate::BufferPoolManager).
///
/// # Example
/// ```
/// use blockbuf::{BufferPoolConfig, ReplacementPolicy};
///
/// let config = BufferPoolConfig::default()
///     .with_pool_size(64)
///     .with_policy(ReplacementPolicy::Fifo);
/// assert_eq!(config.pool_size, 64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferPoolConfig {
    /// Number of buffers. Fixed for the lifetime of the pool.
    pub pool_size: usize,
    /// Victim selection policy.
    pub policy: ReplacementPolicy,
}

impl BufferPoolConfig {
    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    pub fn with_policy(mut self, policy: ReplacementPolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl Default for BufferPoolConfig {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
            policy: ReplacementPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_is_power_of_two() {
        assert!(PAGE_SIZE.is_power_of_two());
        assert_eq!(PAGE_SIZE, 4096);
    }

    #[test]
    fn test_default_config() {
        let config = BufferPoolConfig::default();
        assert_eq!(config.pool_size, DEFAULT_POOL_SIZE);
        assert_eq!(config.policy, ReplacementPolicy::ModifiedFirst);
    }

    #[test]
    fn test_config_builders() {
        let config = BufferPoolConfig::default()
            .with_pool_size(3)
            .with_policy(ReplacementPolicy::Fifo);
        assert_eq!(config.pool_size, 3);
        assert_eq!(config.policy, ReplacementPolicy::Fifo);
    }
}
