//! Lock-step walks over two differently fragmented leaf lists
//!
//! Two ropes with the same content rarely share leaf boundaries. These
//! iterators consume both leaf lists at once and always yield slice pairs of
//! equal length, so callers can compare or scan as if both sides were
//! contiguous. They only re-slice borrowed memory; nothing is copied.

use std::iter::FusedIterator;

/// Forward lock-step walk
///
/// Each step takes the shorter of the two current slices' lengths from the
/// front of both. Iteration ends as soon as either side runs out.
pub struct AlignedChunks<'l, 'a, T> {
    a_cur: &'a [T],
    a_rest: &'l [&'a [T]],
    b_cur: &'a [T],
    b_rest: &'l [&'a [T]],
}

/// Backward lock-step walk, consuming from the end of both sides
pub struct ReverseAlignedChunks<'l, 'a, T> {
    a_cur: &'a [T],
    a_rest: &'l [&'a [T]],
    b_cur: &'a [T],
    b_rest: &'l [&'a [T]],
}

impl<'l, 'a, T> AlignedChunks<'l, 'a, T> {
    pub fn new(a: &'l [&'a [T]], b: &'l [&'a [T]]) -> Self {
        Self::with_start(&[], a, &[], b)
    }

    /// Start each side from a partial slice, followed by its remaining leaves
    pub fn with_start(
        a_start: &'a [T],
        a_rest: &'l [&'a [T]],
        b_start: &'a [T],
        b_rest: &'l [&'a [T]],
    ) -> Self {
        Self {
            a_cur: a_start,
            a_rest,
            b_cur: b_start,
            b_rest,
        }
    }

    /// Unconsumed part of side A: the current slice, then the untouched leaves
    pub fn remainder_a(&self) -> (&'a [T], &'l [&'a [T]]) {
        (self.a_cur, self.a_rest)
    }

    /// Unconsumed part of side B
    pub fn remainder_b(&self) -> (&'a [T], &'l [&'a [T]]) {
        (self.b_cur, self.b_rest)
    }

    fn refill(cur: &mut &'a [T], rest: &mut &'l [&'a [T]]) -> bool {
        while cur.is_empty() {
            match rest.split_first() {
                Some((next, tail)) => {
                    *cur = next;
                    *rest = tail;
                }
                None => return false,
            }
        }
        true
    }
}

impl<'l, 'a, T> Iterator for AlignedChunks<'l, 'a, T> {
    type Item = (&'a [T], &'a [T]);

    fn next(&mut self) -> Option<Self::Item> {
        if !Self::refill(&mut self.a_cur, &mut self.a_rest)
            || !Self::refill(&mut self.b_cur, &mut self.b_rest)
        {
            return None;
        }

        let n = self.a_cur.len().min(self.b_cur.len());
        let (a_head, a_tail) = self.a_cur.split_at(n);
        let (b_head, b_tail) = self.b_cur.split_at(n);
        self.a_cur = a_tail;
        self.b_cur = b_tail;
        Some((a_head, b_head))
    }
}

impl<'l, 'a, T> FusedIterator for AlignedChunks<'l, 'a, T> {}

impl<'l, 'a, T> ReverseAlignedChunks<'l, 'a, T> {
    pub fn new(a: &'l [&'a [T]], b: &'l [&'a [T]]) -> Self {
        Self::with_start(&[], a, &[], b)
    }

    /// Start each side from a partial slice, preceded by its remaining leaves
    pub fn with_start(
        a_start: &'a [T],
        a_rest: &'l [&'a [T]],
        b_start: &'a [T],
        b_rest: &'l [&'a [T]],
    ) -> Self {
        Self {
            a_cur: a_start,
            a_rest,
            b_cur: b_start,
            b_rest,
        }
    }

    /// Unconsumed part of side A: the leaves before the current slice, then the slice
    pub fn remainder_a(&self) -> (&'l [&'a [T]], &'a [T]) {
        (self.a_rest, self.a_cur)
    }

    /// Unconsumed part of side B
    pub fn remainder_b(&self) -> (&'l [&'a [T]], &'a [T]) {
        (self.b_rest, self.b_cur)
    }

    fn refill(cur: &mut &'a [T], rest: &mut &'l [&'a [T]]) -> bool {
        while cur.is_empty() {
            match rest.split_last() {
                Some((prev, head)) => {
                    *cur = prev;
                    *rest = head;
                }
                None => return false,
            }
        }
        true
    }
}

impl<'l, 'a, T> Iterator for ReverseAlignedChunks<'l, 'a, T> {
    type Item = (&'a [T], &'a [T]);

    fn next(&mut self) -> Option<Self::Item> {
        if !Self::refill(&mut self.a_cur, &mut self.a_rest)
            || !Self::refill(&mut self.b_cur, &mut self.b_rest)
        {
            return None;
        }

        let n = self.a_cur.len().min(self.b_cur.len());
        let (a_head, a_tail) = self.a_cur.split_at(self.a_cur.len() - n);
        let (b_head, b_tail) = self.b_cur.split_at(self.b_cur.len() - n);
        self.a_cur = a_head;
        self.b_cur = b_head;
        Some((a_tail, b_tail))
    }
}

impl<'l, 'a, T> FusedIterator for ReverseAlignedChunks<'l, 'a, T> {}
