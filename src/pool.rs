// pool.rs — Reusable scratch rows with scoped leases.
//
// A RowPool belongs to one strategy instance; there is no process-wide
// pool. Each invocation takes a single PoolLease:
//
//   acquire()  → lease owns every idle buffer of the pool
//   take_row() → hands out a zeroed row from an idle buffer (growing the
//                largest one if none is big enough), allocating only when
//                the lease has no idle buffer left
//   drop       → every buffer the lease holds (idle or still handed out)
//                goes back to the pool
//
// Rows are addressed by RowSlot indices into the lease rather than by
// `&mut Vec<u8>`, so several rows can be alive at once and an early `?`
// return inside a strategy cannot leak a buffer: the lease owns them all.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::trace;

/// Handle to a row checked out from a RowSource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowSlot(usize);

/// Where the linear-memory strategies get their row-sized buffers from.
pub trait RowSource {
    /// A zeroed row of `len` bytes.
    fn take_row(&mut self, len: usize) -> RowSlot;

    fn row(&self, slot: RowSlot) -> &[u8];

    fn row_mut(&mut self, slot: RowSlot) -> &mut [u8];

    /// Done with `slot`; the handle must not be used again.
    fn release_row(&mut self, slot: RowSlot);
}

/// Allocates a fresh Vec for every row and frees it on release.
#[derive(Default)]
pub struct FreshRows {
    slots: Vec<Option<Vec<u8>>>,
}

impl RowSource for FreshRows {
    fn take_row(&mut self, len: usize) -> RowSlot {
        insert_slot(&mut self.slots, vec![0; len])
    }

    fn row(&self, slot: RowSlot) -> &[u8] {
        slot_ref(&self.slots, slot)
    }

    fn row_mut(&mut self, slot: RowSlot) -> &mut [u8] {
        slot_mut(&mut self.slots, slot)
    }

    fn release_row(&mut self, slot: RowSlot) {
        self.slots[slot.0] = None;
    }
}

#[derive(Default)]
pub struct RowPool {
    idle: Mutex<Vec<Vec<u8>>>,
    allocations: AtomicUsize,
}

impl RowPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a lease. All idle buffers move into it until it drops.
    pub fn acquire(&self) -> PoolLease<'_> {
        let idle = std::mem::take(&mut *self.idle_list());
        trace!("row pool lease acquired with {} idle buffers", idle.len());
        PoolLease {
            pool: self,
            idle,
            slots: Vec::new(),
        }
    }

    /// Buffers this pool has allocated over its lifetime. Growing an idle
    /// buffer does not count.
    pub fn allocations(&self) -> usize {
        self.allocations.load(Ordering::Relaxed)
    }

    /// Buffers currently parked in the pool (not held by a lease).
    pub fn idle(&self) -> usize {
        self.idle_list().len()
    }

    fn idle_list(&self) -> MutexGuard<'_, Vec<Vec<u8>>> {
        // A panic while a lease was returning buffers leaves a usable list.
        self.idle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Scoped access to a RowPool's buffers for one invocation.
pub struct PoolLease<'p> {
    pool: &'p RowPool,
    idle: Vec<Vec<u8>>,
    slots: Vec<Option<Vec<u8>>>,
}

impl RowSource for PoolLease<'_> {
    fn take_row(&mut self, len: usize) -> RowSlot {
        // Too-small idle buffers are grown rather than left parked.
        let pick = self
            .idle
            .iter()
            .position(|b| b.capacity() >= len)
            .or_else(|| {
                self.idle
                    .iter()
                    .enumerate()
                    .max_by_key(|(_, b)| b.capacity())
                    .map(|(i, _)| i)
            });
        let buf = match pick {
            Some(pos) => {
                let mut buf = self.idle.swap_remove(pos);
                buf.clear();
                buf.resize(len, 0);
                buf
            }
            None => {
                self.pool.allocations.fetch_add(1, Ordering::Relaxed);
                vec![0; len]
            }
        };
        insert_slot(&mut self.slots, buf)
    }

    fn row(&self, slot: RowSlot) -> &[u8] {
        slot_ref(&self.slots, slot)
    }

    fn row_mut(&mut self, slot: RowSlot) -> &mut [u8] {
        slot_mut(&mut self.slots, slot)
    }

    fn release_row(&mut self, slot: RowSlot) {
        if let Some(buf) = self.slots[slot.0].take() {
            self.idle.push(buf);
        }
    }
}

impl Drop for PoolLease<'_> {
    fn drop(&mut self) {
        let mut returned: Vec<Vec<u8>> = self.slots.drain(..).flatten().collect();
        returned.append(&mut self.idle);
        trace!("row pool lease returned {} buffers", returned.len());
        self.pool.idle_list().append(&mut returned);
    }
}

fn insert_slot(slots: &mut Vec<Option<Vec<u8>>>, buf: Vec<u8>) -> RowSlot {
    match slots.iter().position(Option::is_none) {
        Some(i) => {
            slots[i] = Some(buf);
            RowSlot(i)
        }
        None => {
            slots.push(Some(buf));
            RowSlot(slots.len() - 1)
        }
    }
}

fn slot_ref(slots: &[Option<Vec<u8>>], slot: RowSlot) -> &[u8] {
    match &slots[slot.0] {
        Some(buf) => buf.as_slice(),
        None => panic!("row slot {} used after release", slot.0),
    }
}

fn slot_mut(slots: &mut [Option<Vec<u8>>], slot: RowSlot) -> &mut [u8] {
    match &mut slots[slot.0] {
        Some(buf) => buf.as_mut_slice(),
        None => panic!("row slot {} used after release", slot.0),
    }
}
