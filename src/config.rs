//! Tuning knobs for leaf sizing, rebalancing and the buffer pool

use crate::error::{Result, RopeError};
use serde::{Deserialize, Serialize};

/// Rope tuning parameters
///
/// Every field has a default, so a partial TOML document only overrides what
/// it names:
///
/// ```
/// use tiny_rope::RopeConfig;
///
/// let config = RopeConfig::from_toml_str("max_leaf_bytes = 1024").unwrap();
/// assert_eq!(config.max_leaf_bytes, 1024);
/// assert_eq!(config.imbalance_threshold, 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RopeConfig {
    /// Upper bound on the size of one leaf buffer, in bytes
    #[serde(default = "default_max_leaf_bytes")]
    pub max_leaf_bytes: usize,
    /// Child depth difference above which rebalancing grafts instead of bisecting
    #[serde(default = "default_imbalance_threshold")]
    pub imbalance_threshold: u32,
    /// Number of idle leaf-list buffers the pool keeps around
    #[serde(default = "default_pool_max_retained")]
    pub pool_max_retained: usize,
    /// Largest leaf-list capacity the pool is willing to keep
    #[serde(default = "default_pool_max_capacity")]
    pub pool_max_capacity: usize,
}

fn default_max_leaf_bytes() -> usize {
    32 * 1024
}

fn default_imbalance_threshold() -> u32 {
    4
}

fn default_pool_max_retained() -> usize {
    64
}

fn default_pool_max_capacity() -> usize {
    4096
}

impl Default for RopeConfig {
    fn default() -> Self {
        Self {
            max_leaf_bytes: default_max_leaf_bytes(),
            imbalance_threshold: default_imbalance_threshold(),
            pool_max_retained: default_pool_max_retained(),
            pool_max_capacity: default_pool_max_capacity(),
        }
    }
}

impl RopeConfig {
    /// Parse a TOML document, falling back to defaults for missing fields
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| RopeError::Config(e.to_string()))
    }

    /// Maximum number of `T` elements stored in one leaf
    #[inline]
    pub fn max_leaf_len<T>(&self) -> usize {
        let size = std::mem::size_of::<T>();
        if size == 0 {
            self.max_leaf_bytes.max(1)
        } else {
            (self.max_leaf_bytes / size).max(1)
        }
    }
}
