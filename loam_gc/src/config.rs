//! Heap configuration parameters.

use loam_core::WORD_SIZE;

/// Default size of a freshly grown pool block, in bytes.
pub const DEFAULT_BLOCK_SIZE: usize = 59392;

/// Default number of allocations between automatic collections.
pub const DEFAULT_COLLECT_THRESHOLD: u32 = 32768;

/// Configuration for a [`GcHeap`](crate::GcHeap).
///
/// # Example
///
/// ```ignore
/// use loam_gc::GcConfig;
///
/// // Frequent collections over tiny blocks, for tests.
/// let config = GcConfig {
///     collect_threshold: 64,
///     ..GcConfig::small()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct GcConfig {
    /// Minimum size in bytes of each block added to the pool.
    ///
    /// Individual allocations larger than this get a block sized to
    /// fit. Default: 59392.
    pub block_size: usize,

    /// Number of allocations that triggers an automatic collection.
    ///
    /// The counter resets after every collection, including explicit
    /// ones. Default: 32768.
    pub collect_threshold: u32,

    /// Verify chunk-chain invariants after each collection.
    ///
    /// Costly on large heaps. Default: enabled in debug builds.
    pub verify_heap: bool,
}

impl Default for GcConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            collect_threshold: DEFAULT_COLLECT_THRESHOLD,
            verify_heap: cfg!(debug_assertions),
        }
    }
}

impl GcConfig {
    /// A configuration with small blocks and frequent collections.
    ///
    /// Useful in tests and benchmarks that want to exercise pool
    /// growth and sweeping without megabytes of churn.
    pub fn small() -> Self {
        Self {
            block_size: 4096,
            collect_threshold: 256,
            ..Default::default()
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.block_size < 1024 {
            return Err(ConfigError::BlockTooSmall);
        }
        if self.block_size % WORD_SIZE != 0 {
            return Err(ConfigError::BlockMisaligned);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Block size is too small (minimum 1KB).
    BlockTooSmall,
    /// Block size must be a multiple of the word size.
    BlockMisaligned,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::BlockTooSmall => write!(f, "block size must be at least 1KB"),
            ConfigError::BlockMisaligned => {
                write!(f, "block size must be a multiple of the word size")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(GcConfig::default().validate().is_ok());
    }

    #[test]
    fn small_preset_is_valid() {
        assert!(GcConfig::small().validate().is_ok());
    }

    #[test]
    fn undersized_blocks_are_rejected() {
        let config = GcConfig {
            block_size: 512,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::BlockTooSmall));
    }

    #[test]
    fn misaligned_blocks_are_rejected() {
        let config = GcConfig {
            block_size: 4097,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::BlockMisaligned));
    }
}
