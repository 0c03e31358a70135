//! Single-producer, multi-consumer broadcast ring over versioned slots.
//!
//! One writer publishes small byte messages; any number of independent
//! readers poll slot indices of their own choosing. The ring keeps no reader
//! cursors — which index to poll next is entirely the embedder's business.
//! A slow or absent reader simply misses overwritten slots; nothing ever
//! blocks, waits, or applies backpressure in either direction.
//!
//! # Thread Safety
//! - [`Writer`] is `Send` but not `Clone`: it is the single producer handle.
//! - [`Reader`] is `Clone + Send`: hand one to every polling thread.
//! - [`SpmcRing`] itself is exposed for embedders with their own sharing
//!   discipline; its `write` is `unsafe` because the single-writer rule is
//!   a caller contract, not something the ring arbitrates.

use crate::block::{BLOCK_CAPACITY, Block};
use crate::ring::{RingConfig, seq_to_index};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// The shared ring: a fixed array of versioned slots plus the publication
/// counter. Built once, never resized, dropped as a unit.
pub struct SpmcRing {
    /// Monotonic count of `write` calls. Producer-private: readers never
    /// look at it, so it needs no ordering beyond atomicity.
    counter: AtomicU64,
    /// The slots. Length is the capacity fixed at construction.
    blocks: Box<[Block]>,
}

impl SpmcRing {
    /// Allocates a ring of `config.capacity` zero-initialized slots.
    pub fn new(config: RingConfig) -> Self {
        let blocks: Box<[Block]> = (0..config.capacity).map(|_| Block::new()).collect();
        Self {
            counter: AtomicU64::new(0),
            blocks,
        }
    }

    /// Builds a ring and splits it into its producer and consumer handles.
    ///
    /// This is the intended entry point: the returned [`Writer`] cannot be
    /// cloned, so the single-producer rule holds by construction. Clone the
    /// [`Reader`] freely for each polling thread.
    pub fn split(config: RingConfig) -> (Writer, Reader) {
        let ring = Arc::new(Self::new(config));
        (
            Writer { ring: Arc::clone(&ring) },
            Reader { ring },
        )
    }

    /// Publishes one message into the next slot.
    ///
    /// Claims `counter % capacity`, then runs the slot protocol: `len` is
    /// stored, `fill` writes the payload bytes directly into the slot's
    /// buffer (no intermediate copy), and the final odd version publishes
    /// the message. Always completes; always overwrites whatever the slot
    /// held. `len` must not exceed [`BLOCK_CAPACITY`].
    ///
    /// # Safety
    /// At most one thread may be inside `write` at any instant, for the
    /// whole lifetime of the ring. Nothing here enforces that; use
    /// [`SpmcRing::split`] and the [`Writer`] handle to get it enforced by
    /// the type system.
    pub unsafe fn write(&self, len: u32, fill: impl FnOnce(&mut [u8])) {
        // Relaxed is enough: only the producer reads this counter, and the
        // slot's version field carries all cross-thread synchronization.
        let seq = self.counter.fetch_add(1, Ordering::Relaxed);
        let index = seq_to_index(seq, self.blocks.len());
        // SAFETY: forwarded single-writer contract.
        unsafe { self.blocks[index].write(len, fill) };
    }

    /// Polls one slot, copying its message into `out` if a stable one is
    /// present.
    ///
    /// Returns `Some(len)` with the first `len` bytes of `out` filled, or
    /// `None` when the slot was never written or a write is in flight. Both
    /// outcomes are immediate; there is no internal retry.
    ///
    /// `slot_index` must lie in `[0, size())` and `out` must hold at least
    /// [`BLOCK_CAPACITY`] bytes — both are caller contracts, debug-asserted
    /// only (an out-of-range index otherwise hits the slice bounds panic).
    pub fn read(&self, slot_index: usize, out: &mut [u8]) -> Option<usize> {
        debug_assert!(slot_index < self.blocks.len(), "slot index out of range");
        debug_assert!(out.len() >= BLOCK_CAPACITY, "output buffer undersized");
        self.blocks[slot_index].read(out)
    }

    /// The fixed slot count chosen at construction.
    pub fn size(&self) -> usize {
        self.blocks.len()
    }

    #[cfg(test)]
    pub(crate) fn slot_version(&self, slot_index: usize) -> u32 {
        self.blocks[slot_index].version()
    }
}

/// The sole producer handle for a ring.
///
/// Not `Clone`, and `write` takes `&mut self`: exactly one thread can be
/// publishing at any instant, which upholds the single-writer precondition
/// of the slot protocol without runtime arbitration.
pub struct Writer {
    ring: Arc<SpmcRing>,
}

impl Writer {
    /// Publishes one message. See [`SpmcRing::write`] for the protocol.
    #[inline]
    pub fn write(&mut self, len: u32, fill: impl FnOnce(&mut [u8])) {
        // SAFETY: `Writer` is not `Clone` and `write` borrows it mutably,
        // so no second thread can be inside the protocol.
        unsafe { self.ring.write(len, fill) }
    }

    /// The ring's fixed capacity.
    pub fn size(&self) -> usize {
        self.ring.size()
    }
}

/// A consumer handle. Clone one per polling thread.
///
/// Readers are stateless with respect to the ring: each call names the slot
/// index to poll, and tracking "where to look next" is left to the embedder.
#[derive(Clone)]
pub struct Reader {
    ring: Arc<SpmcRing>,
}

impl Reader {
    /// Polls `slot_index`. See [`SpmcRing::read`].
    #[inline]
    pub fn read(&self, slot_index: usize, out: &mut [u8]) -> Option<usize> {
        self.ring.read(slot_index, out)
    }

    /// The ring's fixed capacity.
    pub fn size(&self) -> usize {
        self.ring.size()
    }
}
