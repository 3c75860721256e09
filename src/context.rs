//! Injectable bundle of configuration, buffer pool and metrics
//!
//! Every operation that rents leaf lists, counts rebalances or sizes leaves
//! runs against a [`RopeContext`]. The convenience methods on [`Rope`] use
//! [`RopeContext::shared`]; tests and embedders that need isolated counters
//! or different tuning construct their own context and call the same
//! operations on it.
//!
//! [`Rope`]: crate::Rope

use lazy_static::lazy_static;
use std::sync::Arc;

use crate::config::RopeConfig;
use crate::metrics::RopeMetrics;
use crate::pool::BufferPool;

lazy_static! {
    static ref SHARED: RopeContext = RopeContext::default();
}

#[derive(Debug, Clone)]
pub struct RopeContext {
    config: RopeConfig,
    pool: Arc<BufferPool>,
    metrics: Arc<RopeMetrics>,
}

impl RopeContext {
    pub fn new(config: RopeConfig) -> Self {
        let pool = Arc::new(BufferPool::from_config(&config));
        Self {
            config,
            pool,
            metrics: Arc::new(RopeMetrics::new()),
        }
    }

    /// Build a context around an existing pool and metrics handle
    pub fn with_parts(config: RopeConfig, pool: Arc<BufferPool>, metrics: Arc<RopeMetrics>) -> Self {
        Self {
            config,
            pool,
            metrics,
        }
    }

    /// Process-wide default context, created on first use
    pub fn shared() -> &'static RopeContext {
        &SHARED
    }

    #[inline]
    pub fn config(&self) -> &RopeConfig {
        &self.config
    }

    #[inline]
    pub fn pool(&self) -> &BufferPool {
        &self.pool
    }

    #[inline]
    pub fn metrics(&self) -> &RopeMetrics {
        &self.metrics
    }

    /// Leaf length used by builders and the flattening step for `T`
    #[inline]
    pub fn max_leaf_len<T>(&self) -> usize {
        self.config.max_leaf_len::<T>()
    }
}

impl Default for RopeContext {
    fn default() -> Self {
        Self::new(RopeConfig::default())
    }
}
