//! Bulk construction from slices, vectors, iterators and shared buffers

use std::sync::Arc;

use crate::context::RopeContext;
use crate::node::Rope;

impl RopeContext {
    /// Join `pieces` in order by pairing neighbours level by level
    ///
    /// Empty pieces are dropped first. Over `n` non-empty pieces the result
    /// is `ceil(log2 n)` levels taller than the tallest piece.
    pub fn combine<T>(&self, pieces: Vec<Rope<T>>) -> Rope<T> {
        self.metrics().record_combine();

        let mut level: Vec<Rope<T>> = pieces.into_iter().filter(|p| !p.is_empty()).collect();
        while level.len() > 1 {
            let mut next = Vec::with_capacity((level.len() + 1) / 2);
            let mut pairs = level.into_iter();
            while let Some(left) = pairs.next() {
                match pairs.next() {
                    Some(right) => next.push(Rope::node(left, right)),
                    None => next.push(left),
                }
            }
            level = next;
        }
        level.pop().unwrap_or_default()
    }

    /// Copy `items` into fresh leaves of at most `max_leaf_len` elements
    pub fn from_slice<T: Clone>(&self, items: &[T]) -> Rope<T> {
        let leaves = items
            .chunks(self.max_leaf_len::<T>())
            .map(|chunk| Rope::leaf(Arc::from(chunk)))
            .collect();
        self.combine(leaves)
    }

    /// Window an existing buffer into leaves without copying it
    pub fn from_shared<T>(&self, buf: Arc<[T]>) -> Rope<T> {
        let max = self.max_leaf_len::<T>();
        if buf.len() <= max {
            return Rope::leaf(buf);
        }
        let leaves = (0..buf.len())
            .step_by(max)
            .map(|start| Rope::from_window(&buf, start, max.min(buf.len() - start)))
            .collect();
        self.combine(leaves)
    }

    /// Take ownership of `items`; the vector becomes the shared leaf buffer
    pub fn from_vec<T>(&self, items: Vec<T>) -> Rope<T> {
        self.from_shared(Arc::from(items))
    }

    /// Drain an iterator into leaves of at most `max_leaf_len` elements
    pub fn from_iter<T, I>(&self, iter: I) -> Rope<T>
    where
        I: IntoIterator<Item = T>,
    {
        let max = self.max_leaf_len::<T>();
        let mut leaves = Vec::new();
        let mut chunk = Vec::new();
        for item in iter {
            if chunk.len() == max {
                leaves.push(Rope::leaf(Arc::from(std::mem::take(&mut chunk))));
            }
            if chunk.capacity() == 0 {
                chunk.reserve_exact(max.min(4096));
            }
            chunk.push(item);
        }
        if !chunk.is_empty() {
            leaves.push(Rope::leaf(Arc::from(chunk)));
        }
        self.combine(leaves)
    }
}

impl<T> Rope<T> {
    /// Concatenate `pieces` in order using the shared context
    pub fn combine(pieces: Vec<Rope<T>>) -> Rope<T> {
        RopeContext::shared().combine(pieces)
    }

    pub fn from_shared(buf: Arc<[T]>) -> Rope<T> {
        RopeContext::shared().from_shared(buf)
    }
}

impl<T: Clone> Rope<T> {
    pub fn from_slice(items: &[T]) -> Rope<T> {
        RopeContext::shared().from_slice(items)
    }
}

impl<T> FromIterator<T> for Rope<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        RopeContext::shared().from_iter(iter)
    }
}

impl<T> From<Vec<T>> for Rope<T> {
    fn from(items: Vec<T>) -> Self {
        RopeContext::shared().from_vec(items)
    }
}

impl<T: Clone> From<&[T]> for Rope<T> {
    fn from(items: &[T]) -> Self {
        Rope::from_slice(items)
    }
}
