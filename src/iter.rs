//! Element, leaf and separator iteration

use std::iter::FusedIterator;
use std::slice;

use crate::context::RopeContext;
use crate::node::Rope;

// === Chunks ===

/// Leaf slices of a rope (or of a range of it), in order
///
/// Each step descends from the root, so a full walk costs `O(leaves * depth)`
/// and holds no stack.
pub struct Chunks<'a, T> {
    rope: &'a Rope<T>,
    front: usize,
    back: usize,
}

impl<'a, T> Chunks<'a, T> {
    /// Elements not yet yielded from either end
    pub fn remaining(&self) -> usize {
        self.back - self.front
    }
}

impl<'a, T> Iterator for Chunks<'a, T> {
    type Item = &'a [T];

    fn next(&mut self) -> Option<&'a [T]> {
        if self.front >= self.back {
            return None;
        }
        let (leaf, leaf_start) = self.rope.leaf_at(self.front);
        let end = leaf.len().min(self.back - leaf_start);
        let chunk = &leaf[self.front - leaf_start..end];
        self.front += chunk.len();
        Some(chunk)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (usize::from(remaining > 0), Some(remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Chunks<'a, T> {
    fn next_back(&mut self) -> Option<&'a [T]> {
        if self.front >= self.back {
            return None;
        }
        let (leaf, leaf_start) = self.rope.leaf_at(self.back - 1);
        let start = self.front.max(leaf_start) - leaf_start;
        let chunk = &leaf[start..self.back - leaf_start];
        self.back -= chunk.len();
        Some(chunk)
    }
}

impl<'a, T> FusedIterator for Chunks<'a, T> {}

// === Iter ===

/// Element iterator, double-ended and exact-size
pub struct Iter<'a, T> {
    chunks: Chunks<'a, T>,
    front: slice::Iter<'a, T>,
    back: slice::Iter<'a, T>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        loop {
            if let Some(item) = self.front.next() {
                self.remaining -= 1;
                return Some(item);
            }
            match self.chunks.next() {
                Some(chunk) => self.front = chunk.iter(),
                None => {
                    let item = self.back.next()?;
                    self.remaining -= 1;
                    return Some(item);
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        loop {
            if let Some(item) = self.back.next_back() {
                self.remaining -= 1;
                return Some(item);
            }
            match self.chunks.next_back() {
                Some(chunk) => self.back = chunk.iter(),
                None => {
                    let item = self.front.next_back()?;
                    self.remaining -= 1;
                    return Some(item);
                }
            }
        }
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}

impl<'a, T> FusedIterator for Iter<'a, T> {}

impl<T> Rope<T> {
    /// Leaf slices in order; empty ropes yield nothing
    pub fn chunks(&self) -> Chunks<'_, T> {
        self.chunks_range(0, self.len())
    }

    /// Leaf slices covering `[start, end)`, trimmed at both ends
    pub(crate) fn chunks_range(&self, start: usize, end: usize) -> Chunks<'_, T> {
        debug_assert!(start <= end && end <= self.len());
        Chunks {
            rope: self,
            front: start,
            back: end,
        }
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            chunks: self.chunks(),
            front: <&[T]>::default().iter(),
            back: <&[T]>::default().iter(),
            remaining: self.len(),
        }
    }
}

impl<'a, T> IntoIterator for &'a Rope<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

// === Split ===

/// Sub-ropes between occurrences of a separator
///
/// `n` separators yield `n + 1` pieces, some possibly empty. An empty
/// separator yields the whole rope once. Pieces share structure with the
/// source rope.
pub struct Split<'r, T> {
    ctx: &'r RopeContext,
    rope: &'r Rope<T>,
    separator: &'r Rope<T>,
    pos: usize,
    finished: bool,
}

impl<'r, T: PartialEq> Iterator for Split<'r, T> {
    type Item = Rope<T>;

    fn next(&mut self) -> Option<Rope<T>> {
        if self.finished {
            return None;
        }
        if self.separator.is_empty() {
            self.finished = true;
            return Some(self.rope.clone());
        }

        let found = self
            .ctx
            .index_of_by(self.rope, self.separator, self.pos, |a, b| a == b);
        match found {
            Ok(Some(at)) => {
                let piece = self.rope.slice_raw(self.pos, at - self.pos);
                self.pos = at + self.separator.len();
                Some(piece)
            }
            _ => {
                self.finished = true;
                Some(self.rope.slice_raw(self.pos, self.rope.len() - self.pos))
            }
        }
    }
}

impl<'r, T: PartialEq> FusedIterator for Split<'r, T> {}

impl RopeContext {
    pub fn split<'r, T: PartialEq>(
        &'r self,
        rope: &'r Rope<T>,
        separator: &'r Rope<T>,
    ) -> Split<'r, T> {
        Split {
            ctx: self,
            rope,
            separator,
            pos: 0,
            finished: false,
        }
    }
}

impl<T: PartialEq> Rope<T> {
    pub fn split<'r>(&'r self, separator: &'r Rope<T>) -> Split<'r, T> {
        RopeContext::shared().split(self, separator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn fragmented(text: &str, size: usize) -> Rope<char> {
        let chars: Vec<char> = text.chars().collect();
        let pieces = chars.chunks(size).map(|c| Rope::leaf(Arc::from(c))).collect();
        Rope::combine(pieces)
    }

    fn text(rope: &Rope<char>) -> String {
        rope.iter().collect()
    }

    #[test]
    fn test_chunks_follow_leaves() {
        let rope = fragmented("abcdefgh", 3);
        let chunks: Vec<String> = rope.chunks().map(|c| c.iter().collect()).collect();
        assert_eq!(chunks, vec!["abc", "def", "gh"]);

        let reversed: Vec<usize> = rope.chunks().rev().map(|c| c.len()).collect();
        assert_eq!(reversed, vec![2, 3, 3]);
        assert_eq!(Rope::<char>::empty().chunks().count(), 0);
    }

    #[test]
    fn test_chunks_range_trims_ends() {
        let rope = fragmented("abcdefgh", 3);
        let mut chunks = rope.chunks_range(1, 7);
        assert_eq!(chunks.next(), Some(&['b', 'c'][..]));
        assert_eq!(chunks.next_back(), Some(&['g'][..]));
        assert_eq!(chunks.remaining(), 3);
        assert_eq!(chunks.next(), Some(&['d', 'e', 'f'][..]));
        assert_eq!(chunks.next(), None);
    }

    #[test]
    fn test_iter_from_both_ends() {
        let rope = fragmented("abcdefg", 2);
        let mut iter = rope.iter();
        assert_eq!(iter.len(), 7);
        assert_eq!(iter.next(), Some(&'a'));
        assert_eq!(iter.next_back(), Some(&'g'));
        assert_eq!(iter.len(), 5);

        let middle: String = iter.collect();
        assert_eq!(middle, "bcdef");
        assert_eq!(rope.iter().rev().collect::<String>(), "gfedcba");
    }

    #[test]
    fn test_iter_meets_in_one_leaf() {
        let rope = fragmented("abc", 3);
        let mut iter = rope.iter();
        assert_eq!(iter.next_back(), Some(&'c'));
        assert_eq!(iter.next(), Some(&'a'));
        assert_eq!(iter.next(), Some(&'b'));
        assert_eq!(iter.next_back(), None);
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn test_split_on_separator() {
        let rope = fragmented("a,,bc,d", 2);
        let comma = Rope::from(",");
        let pieces: Vec<String> = rope.split(&comma).map(|p| text(&p)).collect();
        assert_eq!(pieces, vec!["a", "", "bc", "d"]);

        let pieces: Vec<String> = rope.split(&Rope::from(",d")).map(|p| text(&p)).collect();
        assert_eq!(pieces, vec!["a,,bc", ""]);
    }

    #[test]
    fn test_split_edge_cases() {
        let rope = fragmented("abc", 1);
        let whole: Vec<Rope<char>> = rope.split(&Rope::empty()).collect();
        assert_eq!(whole.len(), 1);
        assert!(Rope::ptr_eq(&whole[0], &rope));

        let empty = Rope::<char>::empty();
        assert_eq!(empty.split(&Rope::from("x")).count(), 1);
    }
}
