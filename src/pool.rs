//! Reusable leaf-list buffers
//!
//! Scans over multi-leaf ropes flatten the tree into a `Vec<&[T]>` of leaf
//! slices. Rather than allocating that list on every call, buffers are rented
//! from a lock-free free list and handed back when the rental drops.

use crossbeam::queue::SegQueue;
use std::mem::{self, ManuallyDrop};
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crate::config::RopeConfig;

/// Idle storage. Always empty; only the allocation is kept.
type Slot = Vec<&'static [u8]>;

/// Thread-safe free list of leaf-list buffers shared by every element type
pub struct BufferPool {
    free: SegQueue<Slot>,
    idle: AtomicUsize,
    max_retained: usize,
    max_capacity: usize,
    rentals: AtomicU64,
    reuses: AtomicU64,
}

/// Pool counters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Total rentals handed out
    pub rentals: u64,
    /// Rentals served from a previously returned buffer
    pub reuses: u64,
    /// Buffers currently waiting in the free list
    pub idle: usize,
}

/// A rented leaf list, returned to its pool when dropped
pub struct Rental<'p, 'a, T> {
    pool: &'p BufferPool,
    buf: Vec<&'a [T]>,
}

impl BufferPool {
    pub fn new(max_retained: usize, max_capacity: usize) -> Self {
        Self {
            free: SegQueue::new(),
            idle: AtomicUsize::new(0),
            max_retained,
            max_capacity,
            rentals: AtomicU64::new(0),
            reuses: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &RopeConfig) -> Self {
        Self::new(config.pool_max_retained, config.pool_max_capacity)
    }

    /// Rent an empty leaf list able to hold at least `capacity` slices
    pub fn rent<'a, T>(&self, capacity: usize) -> Rental<'_, 'a, T> {
        self.rentals.fetch_add(1, Ordering::Relaxed);

        let mut buf = Vec::new();
        if let Some(slot) = self.free.pop() {
            self.idle.fetch_sub(1, Ordering::Relaxed);
            self.reuses.fetch_add(1, Ordering::Relaxed);
            buf = from_slot(slot);
        }
        buf.reserve(capacity);

        Rental { pool: self, buf }
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            rentals: self.rentals.load(Ordering::Relaxed),
            reuses: self.reuses.load(Ordering::Relaxed),
            idle: self.idle.load(Ordering::Relaxed),
        }
    }

    fn give_back<T>(&self, mut buf: Vec<&[T]>) {
        buf.clear();
        if buf.capacity() == 0 {
            return;
        }
        if buf.capacity() > self.max_capacity {
            tracing::debug!(
                capacity = buf.capacity(),
                max = self.max_capacity,
                "discarding oversized leaf list"
            );
            return;
        }

        // Reserve the idle slot before publishing so `idle` never undercounts
        if self.idle.fetch_add(1, Ordering::Relaxed) >= self.max_retained {
            self.idle.fetch_sub(1, Ordering::Relaxed);
            return;
        }
        self.free.push(into_slot(buf));
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::from_config(&RopeConfig::default())
    }
}

impl std::fmt::Debug for BufferPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferPool")
            .field("max_retained", &self.max_retained)
            .field("max_capacity", &self.max_capacity)
            .field("stats", &self.stats())
            .finish()
    }
}

impl<'p, 'a, T> Deref for Rental<'p, 'a, T> {
    type Target = Vec<&'a [T]>;

    fn deref(&self) -> &Self::Target {
        &self.buf
    }
}

impl<'p, 'a, T> DerefMut for Rental<'p, 'a, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.buf
    }
}

impl<'p, 'a, T> Drop for Rental<'p, 'a, T> {
    fn drop(&mut self) {
        let buf = mem::take(&mut self.buf);
        self.pool.give_back(buf);
    }
}

/// Slice references are a (pointer, length) pair whatever the element type
trait SlotLayout {
    const MATCHES: ();
}

impl<T> SlotLayout for T {
    const MATCHES: () = assert!(
        mem::size_of::<*const [T]>() == mem::size_of::<*const [u8]>()
            && mem::align_of::<*const [T]>() == mem::align_of::<*const [u8]>()
    );
}

fn into_slot<T>(buf: Vec<&[T]>) -> Slot {
    let () = <T as SlotLayout>::MATCHES;
    debug_assert!(buf.is_empty());
    let mut buf = ManuallyDrop::new(buf);
    let capacity = buf.capacity();
    let ptr = buf.as_mut_ptr() as *mut &'static [u8];
    // SAFETY: the vector holds no elements and `SlotLayout` asserts at compile
    // time that both element types have the same size and alignment, so the
    // allocation is valid for `capacity` elements of either type.
    unsafe { Vec::from_raw_parts(ptr, 0, capacity) }
}

fn from_slot<'a, T>(slot: Slot) -> Vec<&'a [T]> {
    let () = <T as SlotLayout>::MATCHES;
    debug_assert!(slot.is_empty());
    let mut slot = ManuallyDrop::new(slot);
    let capacity = slot.capacity();
    let ptr = slot.as_mut_ptr() as *mut &'a [T];
    // SAFETY: as in `into_slot`
    unsafe { Vec::from_raw_parts(ptr, 0, capacity) }
}
