//! The rope handle and its leaf / branch representation

use std::borrow::Cow;
use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use crate::balance::is_balanced_shape;
use crate::error::{Result, RopeError};

/// Hard ceiling on tree height. Nodes at or above it always count as unbalanced.
pub const MAX_DEPTH: u32 = 46;

// === Core Types ===

/// Persistent, immutable sequence of `T`
///
/// Cloning is O(1). Every edit returns a new rope that shares the untouched
/// subtrees of the original, so old versions stay valid and can be read from
/// any number of threads.
pub struct Rope<T> {
    pub(crate) node: Node<T>,
}

/// A rope is either one shared buffer window or a pair of child ropes
pub(crate) enum Node<T> {
    Leaf(Leaf<T>),
    Branch(Arc<Branch<T>>),
}

/// Window `start..start + len` into a shared buffer
pub(crate) struct Leaf<T> {
    buf: Arc<[T]>,
    start: usize,
    len: usize,
}

/// Interior node. The cached fields are fixed at construction.
pub(crate) struct Branch<T> {
    pub(crate) left: Rope<T>,
    pub(crate) right: Rope<T>,
    pub(crate) len: usize,
    pub(crate) depth: u32,
    pub(crate) leaf_count: usize,
    pub(crate) balanced: bool,
}

impl<T> Leaf<T> {
    #[inline]
    fn as_slice(&self) -> &[T] {
        &self.buf[self.start..self.start + self.len]
    }

    /// Narrow the window without touching the buffer
    #[inline]
    pub(crate) fn window(&self, offset: usize, len: usize) -> Self {
        debug_assert!(offset + len <= self.len);
        Self {
            buf: Arc::clone(&self.buf),
            start: self.start + offset,
            len,
        }
    }
}

impl<T> Clone for Leaf<T> {
    fn clone(&self) -> Self {
        Self {
            buf: Arc::clone(&self.buf),
            start: self.start,
            len: self.len,
        }
    }
}

impl<T> Clone for Node<T> {
    fn clone(&self) -> Self {
        match self {
            Node::Leaf(leaf) => Node::Leaf(leaf.clone()),
            Node::Branch(branch) => Node::Branch(Arc::clone(branch)),
        }
    }
}

impl<T> Clone for Rope<T> {
    fn clone(&self) -> Self {
        Self {
            node: self.node.clone(),
        }
    }
}

// === Construction ===

impl<T> Rope<T> {
    /// The empty rope, identity element of concatenation
    pub fn empty() -> Self {
        Self::from_leaf(Leaf {
            buf: Arc::default(),
            start: 0,
            len: 0,
        })
    }

    /// Wrap a whole buffer as a single leaf, whatever its size
    pub fn leaf(buf: Arc<[T]>) -> Self {
        let len = buf.len();
        Self::from_leaf(Leaf { buf, start: 0, len })
    }

    /// One-element rope
    pub fn single(value: T) -> Self {
        Self::leaf(Arc::from(vec![value]))
    }

    /// Concatenation constructor without rebalancing
    ///
    /// An empty side collapses to the other side, so a branch never holds an
    /// empty child. A join that would reach [`MAX_DEPTH`] re-pairs the leaves
    /// of both sides instead, so every rope stays below it.
    pub fn node(left: Rope<T>, right: Rope<T>) -> Self {
        if left.is_empty() {
            return right;
        }
        if right.is_empty() {
            return left;
        }

        let depth = 1 + left.depth().max(right.depth());
        if depth >= MAX_DEPTH {
            return Self::repair_depth(left, right);
        }

        let len = left.len() + right.len();
        let leaf_count = left.leaf_count() + right.leaf_count();

        Self {
            node: Node::Branch(Arc::new(Branch {
                balanced: is_balanced_shape(depth, len),
                left,
                right,
                len,
                depth,
                leaf_count,
            })),
        }
    }

    /// Rejoin the leaves of `left ++ right` pairwise, `ceil(log2 n)` levels deep
    #[cold]
    fn repair_depth(left: Rope<T>, right: Rope<T>) -> Self {
        let mut leaves = Vec::with_capacity(left.leaf_count() + right.leaf_count());
        left.push_leaf_ropes(&mut leaves);
        right.push_leaf_ropes(&mut leaves);
        tracing::trace!(leaves = leaves.len(), "flattening rope at depth limit");

        while leaves.len() > 1 {
            let mut next = Vec::with_capacity((leaves.len() + 1) / 2);
            let mut pairs = leaves.into_iter();
            while let Some(l) = pairs.next() {
                match pairs.next() {
                    Some(r) => next.push(Self::node(l, r)),
                    None => next.push(l),
                }
            }
            leaves = next;
        }
        leaves.pop().unwrap_or_default()
    }

    /// Push every non-empty leaf, in order, as its own rope
    fn push_leaf_ropes(&self, out: &mut Vec<Rope<T>>) {
        let mut stack = vec![self];
        while let Some(rope) = stack.pop() {
            match &rope.node {
                Node::Leaf(leaf) => {
                    if leaf.len > 0 {
                        out.push(Self::from_leaf(leaf.clone()));
                    }
                }
                Node::Branch(branch) => {
                    stack.push(&branch.right);
                    stack.push(&branch.left);
                }
            }
        }
    }

    #[inline]
    pub(crate) fn from_leaf(leaf: Leaf<T>) -> Self {
        Self {
            node: Node::Leaf(leaf),
        }
    }

    /// Rope over `buf[start..start + len]` without copying
    pub(crate) fn from_window(buf: &Arc<[T]>, start: usize, len: usize) -> Self {
        debug_assert!(start + len <= buf.len());
        Self::from_leaf(Leaf {
            buf: Arc::clone(buf),
            start,
            len,
        })
    }
}

impl<T> Default for Rope<T> {
    fn default() -> Self {
        Self::empty()
    }
}

// === Read Access ===

impl<T> Rope<T> {
    #[inline]
    pub fn len(&self) -> usize {
        match &self.node {
            Node::Leaf(leaf) => leaf.len,
            Node::Branch(branch) => branch.len,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tree height; 0 for a leaf
    #[inline]
    pub fn depth(&self) -> u32 {
        match &self.node {
            Node::Leaf(_) => 0,
            Node::Branch(branch) => branch.depth,
        }
    }

    /// Number of non-empty leaves reachable from this rope
    #[inline]
    pub fn leaf_count(&self) -> usize {
        match &self.node {
            Node::Leaf(leaf) => usize::from(leaf.len > 0),
            Node::Branch(branch) => branch.leaf_count,
        }
    }

    /// Whether this rope satisfies the Fibonacci balance invariant
    #[inline]
    pub fn is_balanced(&self) -> bool {
        match &self.node {
            Node::Leaf(_) => true,
            Node::Branch(branch) => branch.balanced,
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self.node, Node::Leaf(_))
    }

    /// The contiguous contents when this rope is a single leaf
    #[inline]
    pub fn as_slice(&self) -> Option<&[T]> {
        match &self.node {
            Node::Leaf(leaf) => Some(leaf.as_slice()),
            Node::Branch(_) => None,
        }
    }

    /// Left and right children of a branch
    pub fn children(&self) -> Option<(&Rope<T>, &Rope<T>)> {
        match &self.node {
            Node::Leaf(_) => None,
            Node::Branch(branch) => Some((&branch.left, &branch.right)),
        }
    }

    /// True when both handles denote the same physical value
    ///
    /// Two empty ropes are always the same value.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        match (&a.node, &b.node) {
            (Node::Branch(x), Node::Branch(y)) => Arc::ptr_eq(x, y),
            (Node::Leaf(x), Node::Leaf(y)) => {
                (x.len == 0 && y.len == 0)
                    || (Arc::ptr_eq(&x.buf, &y.buf) && x.start == y.start && x.len == y.len)
            }
            _ => false,
        }
    }

    pub fn element_at(&self, index: usize) -> Result<&T> {
        RopeError::check_index(index, self.len())?;
        let (leaf, leaf_start) = self.leaf_at(index);
        Ok(&leaf[index - leaf_start])
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.element_at(index).ok()
    }

    pub fn first(&self) -> Option<&T> {
        self.get(0)
    }

    pub fn last(&self) -> Option<&T> {
        self.len().checked_sub(1).and_then(|i| self.get(i))
    }

    /// Leaf slice containing `pos` and the rope offset where it starts
    pub(crate) fn leaf_at(&self, pos: usize) -> (&[T], usize) {
        debug_assert!(pos < self.len());
        let mut node = self;
        let mut offset = 0;
        loop {
            match &node.node {
                Node::Leaf(leaf) => return (leaf.as_slice(), offset),
                Node::Branch(branch) => {
                    let left_len = branch.left.len();
                    if pos - offset < left_len {
                        node = &branch.left;
                    } else {
                        offset += left_len;
                        node = &branch.right;
                    }
                }
            }
        }
    }

    /// Append every non-empty leaf slice, in order
    pub fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a [T]>) {
        match &self.node {
            Node::Leaf(leaf) => {
                if leaf.len > 0 {
                    out.push(leaf.as_slice());
                }
            }
            Node::Branch(branch) => {
                branch.left.collect_leaves(out);
                branch.right.collect_leaves(out);
            }
        }
    }
}

// === Materialization ===

impl<T: Clone> Rope<T> {
    /// Contiguous view of the whole rope
    ///
    /// Borrows when the rope is a single leaf, copies otherwise.
    pub fn to_contiguous(&self) -> Cow<'_, [T]> {
        match self.as_slice() {
            Some(slice) => Cow::Borrowed(slice),
            None => Cow::Owned(self.to_vec()),
        }
    }

    pub fn to_vec(&self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.len());
        for chunk in self.chunks() {
            out.extend_from_slice(chunk);
        }
        debug_assert_eq!(out.len(), self.len());
        out
    }
}

impl<T> Index<usize> for Rope<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.element_at(index) {
            Ok(value) => value,
            Err(err) => panic!("{}", err),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Rope<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(items: &[u32]) -> Rope<u32> {
        Rope::leaf(Arc::from(items))
    }

    #[test]
    fn test_node_caches_metadata() {
        let rope = Rope::node(leaf(&[1, 2]), Rope::node(leaf(&[3]), leaf(&[4, 5])));
        assert_eq!(rope.len(), 5);
        assert_eq!(rope.depth(), 2);
        assert_eq!(rope.leaf_count(), 3);
        assert!(rope.is_balanced());
    }

    #[test]
    fn test_long_chain_stays_below_depth_limit() {
        let rope = (0..1000u32)
            .map(|i| leaf(&[i]))
            .fold(Rope::empty(), Rope::node);
        assert!(rope.depth() < MAX_DEPTH);
        assert_eq!(rope.len(), 1000);
        assert_eq!(rope.leaf_count(), 1000);
        assert_eq!(rope.to_vec(), (0..1000).collect::<Vec<_>>());

        let rope = (0..1000u32)
            .rev()
            .map(|i| leaf(&[i]))
            .fold(Rope::empty(), |acc, piece| Rope::node(piece, acc));
        assert!(rope.depth() < MAX_DEPTH);
        assert_eq!(rope.element_at(999), Ok(&999));
    }

    #[test]
    fn test_deep_chain_drops_cleanly() {
        let rope = (0..20_000u32)
            .map(|i| leaf(&[i]))
            .fold(Rope::empty(), Rope::node);
        assert!(rope.depth() < MAX_DEPTH);
        drop(rope);
    }

    #[test]
    fn test_node_collapses_empty_side() {
        let right = leaf(&[7, 8]);
        let rope = Rope::node(Rope::empty(), right.clone());
        assert!(Rope::ptr_eq(&rope, &right));
        assert!(rope.is_leaf());

        let rope = Rope::node(right.clone(), Rope::empty());
        assert!(Rope::ptr_eq(&rope, &right));
    }

    #[test]
    fn test_element_access_across_leaves() {
        let rope = Rope::node(leaf(&[1, 2, 3]), leaf(&[4, 5]));
        assert_eq!(rope.element_at(0), Ok(&1));
        assert_eq!(rope.element_at(3), Ok(&4));
        assert_eq!(rope[4], 5);
        assert_eq!(
            rope.element_at(5),
            Err(RopeError::IndexOutOfRange { index: 5, len: 5 })
        );
        assert_eq!(rope.last(), Some(&5));
        assert_eq!(Rope::<u32>::empty().first(), None);
    }

    #[test]
    fn test_to_contiguous_borrows_single_leaf() {
        let rope = leaf(&[1, 2, 3]);
        assert!(matches!(rope.to_contiguous(), Cow::Borrowed(_)));

        let rope = Rope::node(rope, leaf(&[4]));
        assert!(matches!(rope.to_contiguous(), Cow::Owned(_)));
        assert_eq!(&*rope.to_contiguous(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_empty_leaves_are_skipped() {
        let rope = Rope::node(leaf(&[1]), leaf(&[2]));
        let mut leaves = Vec::new();
        rope.collect_leaves(&mut leaves);
        assert_eq!(leaves, vec![&[1u32][..], &[2u32][..]]);
        assert_eq!(Rope::<u32>::empty().leaf_count(), 0);
    }
}
