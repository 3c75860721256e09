//! Split, slice, insert, remove and the other value-returning edits

use std::cmp::Ordering;
use std::ops::{Add, Bound, RangeBounds};

use crate::context::RopeContext;
use crate::error::{Result, RopeError};
use crate::node::{Node, Rope};

// === Structural Edits (no rebalancing) ===

impl<T> Rope<T> {
    /// Split into `[0, index)` and `[index, len)`
    pub fn split_at(&self, index: usize) -> Result<(Rope<T>, Rope<T>)> {
        RopeError::check_split(index, self.len())?;
        Ok(self.split_raw(index))
    }

    /// `split_at` for callers that already validated `index`
    pub(crate) fn split_raw(&self, index: usize) -> (Rope<T>, Rope<T>) {
        assert!(
            index <= self.len(),
            "split point {} exceeds rope length {}",
            index,
            self.len()
        );

        if index == 0 {
            return (Rope::empty(), self.clone());
        }
        if index == self.len() {
            return (self.clone(), Rope::empty());
        }

        match &self.node {
            Node::Leaf(leaf) => (
                Rope::from_leaf(leaf.window(0, index)),
                Rope::from_leaf(leaf.window(index, self.len() - index)),
            ),
            Node::Branch(branch) => {
                let left_len = branch.left.len();
                match index.cmp(&left_len) {
                    Ordering::Less => {
                        let (head, tail) = branch.left.split_raw(index);
                        (head, Rope::node(tail, branch.right.clone()))
                    }
                    Ordering::Equal => (branch.left.clone(), branch.right.clone()),
                    Ordering::Greater => {
                        let (head, tail) = branch.right.split_raw(index - left_len);
                        (Rope::node(branch.left.clone(), head), tail)
                    }
                }
            }
        }
    }

    /// `len` elements starting at `start`
    ///
    /// Asking for the whole rope returns the same handle.
    pub fn slice(&self, start: usize, len: usize) -> Result<Rope<T>> {
        RopeError::check_range(start, len, self.len())?;
        Ok(self.slice_raw(start, len))
    }

    pub(crate) fn slice_raw(&self, start: usize, len: usize) -> Rope<T> {
        if start == 0 && len == self.len() {
            return self.clone();
        }
        let (_, tail) = self.split_raw(start);
        let (middle, _) = tail.split_raw(len);
        debug_assert_eq!(middle.len(), len);
        middle
    }

    /// Sub-rope for any range expression, e.g. `rope.range(2..)?`
    pub fn range<R: RangeBounds<usize>>(&self, range: R) -> Result<Rope<T>> {
        let start = match range.start_bound() {
            Bound::Included(&s) => s,
            Bound::Excluded(&s) => s.saturating_add(1),
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(&e) => e.saturating_add(1),
            Bound::Excluded(&e) => e,
            Bound::Unbounded => self.len(),
        };
        if end < start {
            return Err(RopeError::RangeOutOfBounds {
                start,
                len: 0,
                rope_len: self.len(),
            });
        }
        self.slice(start, end - start)
    }

    /// Binary search over a rope sorted by `f`, as [`slice::binary_search_by`]
    pub fn binary_search_by<F>(&self, mut f: F) -> std::result::Result<usize, usize>
    where
        F: FnMut(&T) -> Ordering,
    {
        let mut low = 0;
        let mut high = self.len();
        while low < high {
            let mid = low + (high - low) / 2;
            match f(&self[mid]) {
                Ordering::Less => low = mid + 1,
                Ordering::Greater => high = mid,
                Ordering::Equal => return Ok(mid),
            }
        }
        Err(low)
    }

    pub fn binary_search(&self, item: &T) -> std::result::Result<usize, usize>
    where
        T: Ord,
    {
        self.binary_search_by(|probe| probe.cmp(item))
    }
}

// === Balanced Edits ===

impl RopeContext {
    /// `left ++ right`, balanced; an empty side returns the other unchanged
    pub fn concat<T: Clone>(&self, left: &Rope<T>, right: &Rope<T>) -> Rope<T> {
        if left.is_empty() {
            return right.clone();
        }
        if right.is_empty() {
            return left.clone();
        }
        self.balanced(&Rope::node(left.clone(), right.clone()))
    }

    pub fn insert_range<T: Clone>(
        &self,
        rope: &Rope<T>,
        index: usize,
        items: &Rope<T>,
    ) -> Result<Rope<T>> {
        RopeError::check_split(index, rope.len())?;
        if items.is_empty() {
            return Ok(rope.clone());
        }
        let (left, right) = rope.split_raw(index);
        let joined = self.concat(&self.concat(&left, items), &right);
        Ok(self.balanced(&joined))
    }

    /// Remove `len` elements at `start`; removing nothing returns the same handle
    pub fn remove_range<T: Clone>(
        &self,
        rope: &Rope<T>,
        start: usize,
        len: usize,
    ) -> Result<Rope<T>> {
        RopeError::check_range(start, len, rope.len())?;
        if len == 0 {
            return Ok(rope.clone());
        }
        if len == rope.len() {
            return Ok(Rope::empty());
        }
        let (left, rest) = rope.split_raw(start);
        let (_, right) = rest.split_raw(len);
        // A split edge can be lopsided even when the other side is empty
        Ok(self.balanced(&self.concat(&left, &right)))
    }

    /// Replace one element
    ///
    /// Splices a one-element leaf between the two halves. Repeated single
    /// element edits fragment the tree, so the result is always run through
    /// the balancer.
    pub fn set_item<T: Clone>(&self, rope: &Rope<T>, index: usize, value: T) -> Result<Rope<T>> {
        RopeError::check_index(index, rope.len())?;
        let (left, rest) = rope.split_raw(index);
        let (_, right) = rest.split_raw(1);
        let spliced = Rope::node(Rope::node(left, Rope::single(value)), right);
        Ok(self.balanced(&spliced))
    }

    /// Replace every non-overlapping occurrence of `pattern`, left to right
    pub fn replace<T: Clone + PartialEq>(
        &self,
        rope: &Rope<T>,
        pattern: &Rope<T>,
        replacement: &Rope<T>,
    ) -> Rope<T> {
        if pattern.is_empty() {
            return rope.clone();
        }

        let mut pieces = Vec::new();
        let mut pos = 0;
        while let Ok(Some(found)) = self.index_of_by(rope, pattern, pos, |a, b| a == b) {
            pieces.push(rope.slice_raw(pos, found - pos));
            pieces.push(replacement.clone());
            pos = found + pattern.len();
        }
        if pieces.is_empty() {
            return rope.clone();
        }
        pieces.push(rope.slice_raw(pos, rope.len() - pos));
        self.balanced(&self.combine(pieces))
    }

    /// Insert `item` at the position `cmp` locates in an already sorted rope
    pub fn insert_sorted_by<T, F>(&self, rope: &Rope<T>, item: T, mut cmp: F) -> Rope<T>
    where
        T: Clone,
        F: FnMut(&T, &T) -> Ordering,
    {
        let index = match rope.binary_search_by(|probe| cmp(probe, &item)) {
            Ok(index) | Err(index) => index,
        };
        let (left, right) = rope.split_raw(index);
        let joined = self.concat(&self.concat(&left, &Rope::single(item)), &right);
        self.balanced(&joined)
    }
}

// === Shared-Context Conveniences ===

impl<T: Clone> Rope<T> {
    pub fn concat(&self, other: &Rope<T>) -> Rope<T> {
        RopeContext::shared().concat(self, other)
    }

    /// Alias of [`Rope::concat`]
    pub fn add_range(&self, other: &Rope<T>) -> Rope<T> {
        self.concat(other)
    }

    /// Append a single element
    pub fn append(&self, item: T) -> Rope<T> {
        self.concat(&Rope::single(item))
    }

    pub fn insert_range(&self, index: usize, items: &Rope<T>) -> Result<Rope<T>> {
        RopeContext::shared().insert_range(self, index, items)
    }

    pub fn insert(&self, index: usize, item: T) -> Result<Rope<T>> {
        self.insert_range(index, &Rope::single(item))
    }

    pub fn remove_range(&self, start: usize, len: usize) -> Result<Rope<T>> {
        RopeContext::shared().remove_range(self, start, len)
    }

    pub fn remove(&self, index: usize) -> Result<Rope<T>> {
        RopeError::check_index(index, self.len())?;
        self.remove_range(index, 1)
    }

    pub fn set_item(&self, index: usize, value: T) -> Result<Rope<T>> {
        RopeContext::shared().set_item(self, index, value)
    }

    pub fn insert_sorted_by<F>(&self, item: T, cmp: F) -> Rope<T>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        RopeContext::shared().insert_sorted_by(self, item, cmp)
    }

    pub fn insert_sorted(&self, item: T) -> Rope<T>
    where
        T: Ord,
    {
        self.insert_sorted_by(item, Ord::cmp)
    }
}

impl<T: Clone + PartialEq> Rope<T> {
    pub fn replace(&self, pattern: &Rope<T>, replacement: &Rope<T>) -> Rope<T> {
        RopeContext::shared().replace(self, pattern, replacement)
    }
}

impl<T: Clone> Add<&Rope<T>> for &Rope<T> {
    type Output = Rope<T>;

    fn add(self, rhs: &Rope<T>) -> Rope<T> {
        self.concat(rhs)
    }
}

impl<T: Clone> Add for Rope<T> {
    type Output = Rope<T>;

    fn add(self, rhs: Rope<T>) -> Rope<T> {
        self.concat(&rhs)
    }
}
