//! Search, prefix/suffix measurement, equality and hashing
//!
//! Single-leaf operands are handled with plain slice algorithms. Anything
//! spanning several leaves flattens both trees into pooled leaf lists and
//! walks them with the aligned enumerators.

use std::cmp::Ordering;
use std::hash::{BuildHasher, Hash, Hasher};

use crate::aligned::{AlignedChunks, ReverseAlignedChunks};
use crate::context::RopeContext;
use crate::error::{Result, RopeError};
use crate::node::Rope;

/// Fixed seeds for [`Rope::structural_hash`]
const HASH_SEEDS: [u64; 4] = [
    0x243f_6a88_85a3_08d3,
    0x1319_8a2e_0370_7344,
    0xa409_3822_299f_31d0,
    0x082e_fa98_ec4e_6c89,
];

// === Search ===

impl RopeContext {
    /// First offset at or after `start` where `needle` occurs, comparing with `eq`
    pub fn index_of_by<T, F>(
        &self,
        hay: &Rope<T>,
        needle: &Rope<T>,
        start: usize,
        mut eq: F,
    ) -> Result<Option<usize>>
    where
        F: FnMut(&T, &T) -> bool,
    {
        RopeError::check_split(start, hay.len())?;
        let needle_len = needle.len();
        if needle_len == 0 {
            return Ok(Some(start));
        }
        if needle_len > hay.len() - start {
            return Ok(None);
        }

        if let (Some(h), Some(n)) = (hay.as_slice(), needle.as_slice()) {
            let found = h[start..]
                .windows(needle_len)
                .position(|window| slices_eq(window, n, &mut eq));
            return Ok(found.map(|p| p + start));
        }

        let mut hay_leaves = self.pool().rent::<T>(hay.leaf_count());
        hay.collect_leaves(&mut hay_leaves);
        let mut needle_leaves = self.pool().rent::<T>(needle.leaf_count());
        needle.collect_leaves(&mut needle_leaves);

        Ok(find_forward(
            &hay_leaves,
            &needle_leaves,
            start,
            hay.len(),
            needle_len,
            &mut eq,
        ))
    }

    /// Last offset where `needle` occurs entirely within `[0, end)`
    pub fn last_index_of_by<T, F>(
        &self,
        hay: &Rope<T>,
        needle: &Rope<T>,
        end: usize,
        mut eq: F,
    ) -> Result<Option<usize>>
    where
        F: FnMut(&T, &T) -> bool,
    {
        RopeError::check_split(end, hay.len())?;
        let needle_len = needle.len();
        if needle_len == 0 {
            return Ok(Some(end));
        }
        if needle_len > end {
            return Ok(None);
        }

        if let (Some(h), Some(n)) = (hay.as_slice(), needle.as_slice()) {
            return Ok(h[..end]
                .windows(needle_len)
                .rposition(|window| slices_eq(window, n, &mut eq)));
        }

        let mut hay_leaves = self.pool().rent::<T>(hay.leaf_count());
        hay.collect_leaves(&mut hay_leaves);
        let mut needle_leaves = self.pool().rent::<T>(needle.leaf_count());
        needle.collect_leaves(&mut needle_leaves);

        Ok(find_backward(
            &hay_leaves,
            &needle_leaves,
            end,
            needle_len,
            &mut eq,
        ))
    }

    pub fn common_prefix_length<T: PartialEq>(&self, a: &Rope<T>, b: &Rope<T>) -> usize {
        if let (Some(x), Some(y)) = (a.as_slice(), b.as_slice()) {
            return prefix_len(x, y);
        }

        let mut a_leaves = self.pool().rent::<T>(a.leaf_count());
        a.collect_leaves(&mut a_leaves);
        let mut b_leaves = self.pool().rent::<T>(b.leaf_count());
        b.collect_leaves(&mut b_leaves);

        let mut total = 0;
        for (x, y) in AlignedChunks::new(&a_leaves, &b_leaves) {
            let matched = prefix_len(x, y);
            total += matched;
            if matched < x.len() {
                break;
            }
        }
        total
    }

    pub fn common_suffix_length<T: PartialEq>(&self, a: &Rope<T>, b: &Rope<T>) -> usize {
        if let (Some(x), Some(y)) = (a.as_slice(), b.as_slice()) {
            return suffix_len(x, y);
        }

        let mut a_leaves = self.pool().rent::<T>(a.leaf_count());
        a.collect_leaves(&mut a_leaves);
        let mut b_leaves = self.pool().rent::<T>(b.leaf_count());
        b.collect_leaves(&mut b_leaves);

        let mut total = 0;
        for (x, y) in ReverseAlignedChunks::new(&a_leaves, &b_leaves) {
            let matched = suffix_len(x, y);
            total += matched;
            if matched < x.len() {
                break;
            }
        }
        total
    }

    /// Content equality, independent of tree shape
    pub fn equals<T: PartialEq>(&self, a: &Rope<T>, b: &Rope<T>) -> bool {
        if a.len() != b.len() {
            return false;
        }
        if Rope::ptr_eq(a, b) {
            return true;
        }
        if let (Some(x), Some(y)) = (a.as_slice(), b.as_slice()) {
            return x == y;
        }

        let mut a_leaves = self.pool().rent::<T>(a.leaf_count());
        a.collect_leaves(&mut a_leaves);
        let mut b_leaves = self.pool().rent::<T>(b.leaf_count());
        b.collect_leaves(&mut b_leaves);

        AlignedChunks::new(&a_leaves, &b_leaves).all(|(x, y)| x == y)
    }
}

/// Forward scan over leaf lists. `needle` is non-empty and fits after `start`.
fn find_forward<T, F>(
    hay: &[&[T]],
    needle: &[&[T]],
    start: usize,
    hay_len: usize,
    needle_len: usize,
    eq: &mut F,
) -> Option<usize>
where
    F: FnMut(&T, &T) -> bool,
{
    let first = &needle[0][0];
    let (mut leaf, mut offset) = locate(hay, start);
    let mut pos = start;

    loop {
        // Seek the next leaf-local occurrence of the needle's first element
        loop {
            let chunk = hay.get(leaf)?;
            match chunk[offset..].iter().position(|x| eq(x, first)) {
                Some(p) => {
                    offset += p;
                    pos += p;
                    break;
                }
                None => {
                    pos += chunk.len() - offset;
                    leaf += 1;
                    offset = 0;
                }
            }
        }
        if pos + needle_len > hay_len {
            return None;
        }

        let mut matched = 0;
        let mut aligned =
            AlignedChunks::with_start(&hay[leaf][offset..], &hay[leaf + 1..], &[], needle);
        let is_match = aligned.all(|(x, y)| {
            matched += x.len();
            slices_eq(x, y, eq)
        });
        if is_match {
            debug_assert_eq!(matched, needle_len);
            return Some(pos);
        }

        offset += 1;
        pos += 1;
        if offset == hay[leaf].len() {
            leaf += 1;
            offset = 0;
        }
    }
}

/// Backward scan over leaf lists. `needle` is non-empty and `needle_len <= end`.
fn find_backward<T, F>(
    hay: &[&[T]],
    needle: &[&[T]],
    end: usize,
    needle_len: usize,
    eq: &mut F,
) -> Option<usize>
where
    F: FnMut(&T, &T) -> bool,
{
    let last_leaf = needle[needle.len() - 1];
    let last = &last_leaf[last_leaf.len() - 1];

    // `limit` elements of hay[leaf] precede the cursor; `pos` is the cursor's rope offset
    let (mut leaf, mut limit) = locate_back(hay, end);
    let mut pos = end;

    loop {
        // Seek the previous leaf-local occurrence of the needle's last element
        loop {
            let chunk = hay[leaf];
            match chunk[..limit].iter().rposition(|x| eq(x, last)) {
                Some(p) => {
                    pos -= limit - (p + 1);
                    limit = p + 1;
                    break;
                }
                None => {
                    pos -= limit;
                    if leaf == 0 {
                        return None;
                    }
                    leaf -= 1;
                    limit = hay[leaf].len();
                }
            }
        }
        if pos < needle_len {
            return None;
        }

        let mut aligned =
            ReverseAlignedChunks::with_start(&hay[leaf][..limit], &hay[..leaf], &[], needle);
        if aligned.all(|(x, y)| slices_eq(x, y, eq)) {
            return Some(pos - needle_len);
        }

        limit -= 1;
        pos -= 1;
        if limit == 0 {
            if leaf == 0 {
                return None;
            }
            leaf -= 1;
            limit = hay[leaf].len();
        }
    }
}

/// Leaf index and in-leaf offset of rope offset `pos`
fn locate<T>(leaves: &[&[T]], pos: usize) -> (usize, usize) {
    let mut remaining = pos;
    for (i, leaf) in leaves.iter().enumerate() {
        if remaining < leaf.len() {
            return (i, remaining);
        }
        remaining -= leaf.len();
    }
    (leaves.len(), 0)
}

/// Leaf index and count of its elements before rope offset `end` (`end > 0`)
fn locate_back<T>(leaves: &[&[T]], end: usize) -> (usize, usize) {
    debug_assert!(end > 0);
    let mut remaining = end;
    for (i, leaf) in leaves.iter().enumerate() {
        if remaining <= leaf.len() {
            return (i, remaining);
        }
        remaining -= leaf.len();
    }
    unreachable!("offset {} lies beyond the leaf list", end)
}

#[inline]
fn slices_eq<T, F>(a: &[T], b: &[T], eq: &mut F) -> bool
where
    F: FnMut(&T, &T) -> bool,
{
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| eq(x, y))
}

#[inline]
fn prefix_len<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

#[inline]
fn suffix_len<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

// === Rope API ===

impl<T: PartialEq> Rope<T> {
    pub fn index_of(&self, needle: &Rope<T>) -> Option<usize> {
        self.index_of_by(needle, 0, |a, b| a == b).ok().flatten()
    }

    pub fn index_of_from(&self, needle: &Rope<T>, start: usize) -> Result<Option<usize>> {
        self.index_of_by(needle, start, |a, b| a == b)
    }

    pub fn last_index_of(&self, needle: &Rope<T>) -> Option<usize> {
        self.last_index_of_by(needle, self.len(), |a, b| a == b)
            .ok()
            .flatten()
    }

    pub fn last_index_of_before(&self, needle: &Rope<T>, end: usize) -> Result<Option<usize>> {
        self.last_index_of_by(needle, end, |a, b| a == b)
    }

    pub fn contains(&self, needle: &Rope<T>) -> bool {
        self.index_of(needle).is_some()
    }

    pub fn index_of_item(&self, item: &T) -> Option<usize> {
        let mut offset = 0;
        for chunk in self.chunks() {
            if let Some(p) = chunk.iter().position(|x| x == item) {
                return Some(offset + p);
            }
            offset += chunk.len();
        }
        None
    }

    pub fn last_index_of_item(&self, item: &T) -> Option<usize> {
        let mut end = self.len();
        for chunk in self.chunks().rev() {
            let start = end - chunk.len();
            if let Some(p) = chunk.iter().rposition(|x| x == item) {
                return Some(start + p);
            }
            end = start;
        }
        None
    }

    pub fn contains_item(&self, item: &T) -> bool {
        self.index_of_item(item).is_some()
    }

    pub fn starts_with(&self, prefix: &Rope<T>) -> bool {
        prefix.len() <= self.len() && self.common_prefix_length(prefix) == prefix.len()
    }

    pub fn ends_with(&self, suffix: &Rope<T>) -> bool {
        suffix.len() <= self.len() && self.common_suffix_length(suffix) == suffix.len()
    }

    pub fn common_prefix_length(&self, other: &Rope<T>) -> usize {
        RopeContext::shared().common_prefix_length(self, other)
    }

    pub fn common_suffix_length(&self, other: &Rope<T>) -> usize {
        RopeContext::shared().common_suffix_length(self, other)
    }

    pub fn equals(&self, other: &Rope<T>) -> bool {
        RopeContext::shared().equals(self, other)
    }
}

impl<T> Rope<T> {
    pub fn index_of_by<F>(&self, needle: &Rope<T>, start: usize, eq: F) -> Result<Option<usize>>
    where
        F: FnMut(&T, &T) -> bool,
    {
        RopeContext::shared().index_of_by(self, needle, start, eq)
    }

    pub fn last_index_of_by<F>(&self, needle: &Rope<T>, end: usize, eq: F) -> Result<Option<usize>>
    where
        F: FnMut(&T, &T) -> bool,
    {
        RopeContext::shared().last_index_of_by(self, needle, end, eq)
    }
}

// === Equality, Ordering, Hashing ===

impl<T: PartialEq> PartialEq for Rope<T> {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl<T: Eq> Eq for Rope<T> {}

impl<T: PartialOrd> PartialOrd for Rope<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord> Ord for Rope<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

/// Positions sampled by the structural hash for a rope of `len` elements
fn sample_positions(len: usize) -> ([usize; 4], usize) {
    match len {
        0 => ([0; 4], 0),
        1..=7 => ([0, 0, 0, 0], 1),
        8..=31 => ([0, len - 1, 0, 0], 2),
        32..=255 => ([0, len / 2, len - 1, 0], 3),
        _ => ([0, len / 4, 3 * len / 4, len - 1], 4),
    }
}

/// Samples the length and a handful of fixed positions instead of the whole
/// content, so hashing costs the same for any rope size. Equal ropes agree on
/// length and on every sampled element, so they always hash equal.
impl<T: Hash> Hash for Rope<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let len = self.len();
        state.write_usize(len);
        let (positions, count) = sample_positions(len);
        for &index in &positions[..count] {
            self[index].hash(state);
        }
    }
}

impl<T: Hash> Rope<T> {
    /// Sampled structural hash with fixed keys, stable for the life of the process
    pub fn structural_hash(&self) -> u64 {
        let [k0, k1, k2, k3] = HASH_SEEDS;
        ahash::RandomState::with_seeds(k0, k1, k2, k3).hash_one(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn leaf(text: &str) -> Rope<char> {
        Rope::leaf(text.chars().collect::<Vec<_>>().into())
    }

    fn fragmented(text: &str, size: usize) -> Rope<char> {
        let chars: Vec<char> = text.chars().collect();
        chars
            .chunks(size)
            .map(|c| Rope::leaf(Arc::from(c)))
            .fold(Rope::empty(), Rope::node)
    }

    #[test]
    fn test_index_of_straddles_leaves() {
        let rope = Rope::node(leaf("abcdef"), leaf("ghijklm"));
        assert_eq!(rope.index_of(&leaf("efgh")), Some(4));
        assert_eq!(rope.index_of(&leaf("mn")), None);
        assert_eq!(rope.index_of(&Rope::empty()), Some(0));
    }

    #[test]
    fn test_index_of_retries_after_partial_match() {
        let rope = fragmented("aaabaaab", 3);
        assert_eq!(rope.index_of(&fragmented("aab", 2)), Some(1));
        assert_eq!(rope.index_of_from(&leaf("aab"), 2), Ok(Some(5)));
        assert_eq!(rope.index_of_from(&leaf("aab"), 6), Ok(None));
        assert!(rope.index_of_from(&leaf("a"), 9).is_err());
    }

    #[test]
    fn test_last_index_of() {
        let rope = fragmented("abcabcab", 3);
        assert_eq!(rope.last_index_of(&leaf("abc")), Some(3));
        assert_eq!(rope.last_index_of(&fragmented("cab", 1)), Some(5));
        assert_eq!(rope.last_index_of_before(&leaf("abc"), 5), Ok(Some(0)));
        assert_eq!(rope.last_index_of_before(&leaf("abc"), 2), Ok(None));
        assert_eq!(rope.last_index_of(&Rope::empty()), Some(8));
    }

    #[test]
    fn test_custom_equality() {
        let rope = fragmented("Hello World", 4);
        let found = rope.index_of_by(&leaf("WORLD"), 0, |a, b| a.eq_ignore_ascii_case(b));
        assert_eq!(found, Ok(Some(6)));
    }

    #[test]
    fn test_prefix_and_suffix() {
        let a = fragmented("interstellar", 5);
        let b = fragmented("internal", 3);
        assert_eq!(a.common_prefix_length(&b), 5);
        assert_eq!(a.common_suffix_length(&fragmented("cellar", 4)), 5);
        assert!(a.starts_with(&leaf("inter")));
        assert!(a.ends_with(&leaf("lar")));
        assert!(!a.ends_with(&leaf("interstellars")));
    }

    #[test]
    fn test_equality_ignores_shape() {
        let a = fragmented("structural sharing", 3);
        let b = fragmented("structural sharing", 7);
        assert_eq!(a, b);
        assert_ne!(a, fragmented("structural sharinG", 7));
        assert_ne!(a, fragmented("structural", 7));
    }

    #[test]
    fn test_hash_matches_across_shapes() {
        assert_eq!(
            leaf("test").structural_hash(),
            Rope::node(leaf("te"), leaf("st")).structural_hash()
        );
        let text: String = ('a'..='z').cycle().take(1000).collect();
        assert_eq!(
            fragmented(&text, 13).structural_hash(),
            fragmented(&text, 100).structural_hash()
        );
    }

    #[test]
    fn test_item_search() {
        let rope = fragmented("banana", 2);
        assert_eq!(rope.index_of_item(&'n'), Some(2));
        assert_eq!(rope.last_index_of_item(&'n'), Some(4));
        assert_eq!(rope.index_of_item(&'z'), None);
        assert!(rope.contains_item(&'b'));
    }

    #[test]
    fn test_ordering() {
        assert!(leaf("abc") < fragmented("abd", 1));
        assert!(leaf("ab") < leaf("abc"));
    }
}
