//! Persistent immutable ropes with Fibonacci balancing
//!
//! A [`Rope<T>`] is a sequence of `T` stored as a binary tree whose leaves are
//! windows into shared buffers. Every edit returns a new rope that shares the
//! untouched parts of the old one, so versions are cheap to keep and safe to
//! read from any thread.
//!
//! ```
//! use tiny_rope::Rope;
//!
//! let rope = Rope::from("hello world");
//! let edited = rope.insert_range(5, &Rope::from(",")).unwrap();
//! assert_eq!(edited.to_string(), "hello, world");
//! assert_eq!(rope.to_string(), "hello world");
//! assert_eq!(edited.index_of(&Rope::from("world")), Some(7));
//! ```
//!
//! Operations that size leaves, rent scratch buffers or count rebalances run
//! against a [`RopeContext`]. The methods on `Rope` use the process-wide
//! [`RopeContext::shared`]; build your own context for different tuning or
//! isolated metrics.

mod aligned;
mod balance;
mod build;
mod config;
mod context;
mod edit;
mod error;
mod iter;
mod metrics;
mod node;
mod pool;
mod search;
mod text;

pub use aligned::{AlignedChunks, ReverseAlignedChunks};
pub use balance::fib;
pub use config::RopeConfig;
pub use context::RopeContext;
pub use error::{Result, RopeError};
pub use iter::{Chunks, Iter, Split};
pub use metrics::{MetricsSnapshot, RopeMetrics};
pub use node::{Rope, MAX_DEPTH};
pub use pool::{BufferPool, PoolStats, Rental};
