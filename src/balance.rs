//! Fibonacci balance invariant and corrective restructuring
//!
//! A branch of depth `d` is balanced when it holds at least `fib(d + 2)`
//! elements. Length therefore grows at least exponentially with depth, which
//! bounds the height of any balanced rope by roughly `1.44 * log2(len)`.

use std::sync::Arc;

use crate::context::RopeContext;
use crate::node::{Branch, Node, Rope, MAX_DEPTH};

const FIB_LEN: usize = MAX_DEPTH as usize + 2;

static FIBONACCI: [u64; FIB_LEN] = fibonacci_table();

const fn fibonacci_table() -> [u64; FIB_LEN] {
    let mut table = [0u64; FIB_LEN];
    table[1] = 1;
    let mut i = 2;
    while i < FIB_LEN {
        table[i] = table[i - 1] + table[i - 2];
        i += 1;
    }
    table
}

/// `n`th Fibonacci number, clamped to the last tabulated entry
#[inline]
pub fn fib(n: usize) -> u64 {
    FIBONACCI[n.min(FIB_LEN - 1)]
}

/// Balance test for a node with the given cached shape
#[inline]
pub(crate) fn is_balanced_shape(depth: u32, len: usize) -> bool {
    depth == 0 || (depth < MAX_DEPTH && len as u64 >= fib(depth as usize + 2))
}

impl RopeContext {
    /// Same content as `rope`, restructured to satisfy the balance invariant
    ///
    /// A rope that is already balanced is returned as the same handle.
    pub fn balanced<T: Clone>(&self, rope: &Rope<T>) -> Rope<T> {
        let Node::Branch(branch) = &rope.node else {
            return rope.clone();
        };
        if branch.balanced {
            return rope.clone();
        }

        self.metrics().record_rebalance();
        tracing::trace!(len = branch.len, depth = branch.depth, "rebalancing rope");
        self.rebalance(rope, branch)
    }

    fn rebalance<T: Clone>(&self, rope: &Rope<T>, branch: &Branch<T>) -> Rope<T> {
        if branch.len <= self.max_leaf_len::<T>() {
            self.metrics().record_flatten();
            return flatten(rope);
        }

        let left_depth = branch.left.depth();
        let right_depth = branch.right.depth();
        if left_depth.abs_diff(right_depth) <= self.config().imbalance_threshold {
            return self.bisect(rope);
        }

        // Move the inner half of the deeper child across to the shallower one
        let joined = if left_depth > right_depth {
            let (outer, inner) = branch.left.split_raw(branch.left.len() / 2);
            let right = Rope::node(inner, branch.right.clone());
            Rope::node(self.balanced(&outer), self.balanced(&right))
        } else {
            let (inner, outer) = branch.right.split_raw(branch.right.len() / 2);
            let left = Rope::node(branch.left.clone(), inner);
            Rope::node(self.balanced(&left), self.balanced(&outer))
        };

        if joined.is_balanced() {
            joined
        } else {
            self.bisect(&joined)
        }
    }

    /// Split at the length midpoint and balance both halves
    ///
    /// Two balanced halves whose lengths differ by at most one always join
    /// into a balanced node, short of `MAX_DEPTH`.
    fn bisect<T: Clone>(&self, rope: &Rope<T>) -> Rope<T> {
        let (left, right) = rope.split_raw(rope.len() / 2);
        let joined = Rope::node(self.balanced(&left), self.balanced(&right));
        debug_assert_eq!(joined.len(), rope.len());
        joined
    }
}

/// Copy a whole subtree into one new leaf
fn flatten<T: Clone>(rope: &Rope<T>) -> Rope<T> {
    let items = rope.to_vec();
    Rope::leaf(Arc::from(items))
}

impl<T: Clone> Rope<T> {
    /// Balanced equivalent of this rope, using the shared context
    pub fn balanced(&self) -> Rope<T> {
        RopeContext::shared().balanced(self)
    }
}
