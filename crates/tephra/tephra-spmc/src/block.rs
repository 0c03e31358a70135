//! Versioned slot storage for the broadcast ring.
//!
//! Each slot carries a version counter, a payload length, and a fixed 64-byte
//! buffer. The version's parity is the whole signaling scheme: an **even**
//! value means the slot is not safely readable (never written, or a write is
//! in flight), an **odd** value means it holds a complete message.
//!
//! # Protocol
//!
//! **Writer** (single producer, per slot):
//! 1. Load version; if odd, store `version + 1` (even) to publish
//!    "write in progress" before touching the payload
//! 2. Store the payload length
//! 3. Fill the payload in place through the caller's closure
//! 4. Store the final odd version (old stable version + 2)
//!
//! **Reader** (any number, uncoordinated):
//! 1. Load version; if even, report "no data" immediately — no spin, no retry
//! 2. Load length, copy that many payload bytes out
//! 3. Store `version + 2` as a "seen" bump and return the length
//!
//! Unlike a textbook seqlock, the reader does **not** re-check the version
//! after copying, so a write racing in mid-copy can hand the reader torn
//! bytes. That is the protocol as specified; see [`Block::read`].

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicU32, Ordering};

/// Fixed payload capacity of every slot, in bytes.
///
/// Sized to one cache line on x86-64. Messages longer than this cannot be
/// carried; the limit is a caller contract on `write`, not a checked error.
pub const BLOCK_CAPACITY: usize = 64;

/// One reusable slot of the ring.
///
/// # Version Semantics
///
/// - **Even**: not readable (zero = never written, otherwise a write is in
///   progress or the slot was left mid-protocol)
/// - **Odd**: stable, `len` and the first `len` payload bytes are valid
///
/// The version is monotonically non-decreasing (modulo u32 wrap). Both the
/// producer (by +1/+2 around a write) and readers (by +2 after a copy)
/// advance it; only the producer ever touches `len` or the payload.
///
/// # Memory Ordering
///
/// Every load of `version`/`len` is `Acquire` and every store is `Release`,
/// so a reader that observes an odd version also observes the payload bytes
/// stored before that version was published. The payload itself is plain
/// memory behind an `UnsafeCell`; it has no atomicity of its own.
#[repr(C, align(64))]
pub struct Block {
    /// Parity-signaling version counter: odd = stable, even = not readable.
    version: AtomicU32,
    /// Byte length of the current message. Valid only while `version` is odd.
    len: AtomicU32,
    /// Fixed-size payload buffer. Visibility is mediated entirely by `version`.
    data: UnsafeCell<[u8; BLOCK_CAPACITY]>,
}

// SAFETY: concurrent access to `data` is governed by the version protocol
// above; `version` and `len` are atomics. The single-producer precondition
// for mutation is upheld by the callers in `spmc.rs`.
unsafe impl Sync for Block {}

impl Block {
    /// A zeroed slot: version 0 (even, "never written"), empty payload.
    pub(crate) const fn new() -> Self {
        Self {
            version: AtomicU32::new(0),
            len: AtomicU32::new(0),
            data: UnsafeCell::new([0u8; BLOCK_CAPACITY]),
        }
    }

    /// Publishes one message into this slot.
    ///
    /// `fill` receives the whole payload buffer and writes its bytes directly
    /// in place — there is no intermediate copy. `len` must not exceed
    /// [`BLOCK_CAPACITY`] (caller contract, debug-asserted only).
    ///
    /// Never fails and never waits: whatever the slot held before is
    /// overwritten unconditionally.
    ///
    /// # Safety
    /// At most one thread may execute `write` on this slot at a time. The
    /// protocol has no internal arbitration; a second concurrent writer is a
    /// data race on the payload.
    pub(crate) unsafe fn write(&self, len: u32, fill: impl FnOnce(&mut [u8])) {
        debug_assert!(len as usize <= BLOCK_CAPACITY, "message exceeds slot capacity");

        let loaded = self.version.load(Ordering::Acquire);
        let mut next = loaded.wrapping_add(1);
        if loaded % 2 == 1 {
            // Slot currently holds a stable message: flip it even first so
            // readers see "write in progress" while the payload is dirty.
            self.version.store(next, Ordering::Release);
            next = next.wrapping_add(1);
        }
        self.len.store(len, Ordering::Release);
        // SAFETY: sole producer per the contract above; readers never write
        // the payload. A reader copying concurrently is the protocol's known
        // torn-read window, not something this side guards against.
        let buf = unsafe { &mut *self.data.get() };
        fill(&mut buf[..]);
        // Odd again: message complete and readable.
        self.version.store(next, Ordering::Release);
    }

    /// Copies the current message out, if the slot holds a stable one.
    ///
    /// Returns `None` when the version is even — the slot was never written
    /// or a write is in flight. This is a normal poll miss, not an error,
    /// and it returns immediately.
    ///
    /// On a hit the version is bumped by 2 (still odd) as a "seen" marker.
    /// The bump is a plain store, not an RMW: several readers hitting the
    /// same slot may collapse their bumps into one, which is accepted — the
    /// version counts change, not consumption.
    ///
    /// The version is **not** re-checked after the copy, so a producer that
    /// races in mid-copy can leave `out` holding bytes from two different
    /// messages. Callers that need stronger guarantees must arrange pacing
    /// externally.
    ///
    /// `out` must hold at least [`BLOCK_CAPACITY`] bytes (caller contract).
    pub(crate) fn read(&self, out: &mut [u8]) -> Option<usize> {
        let version = self.version.load(Ordering::Acquire);
        if version % 2 == 0 {
            return None;
        }
        let len = self.len.load(Ordering::Acquire) as usize;
        debug_assert!(out.len() >= len, "output buffer smaller than message");
        // SAFETY: version was observed odd, so `len` bytes were published
        // before it (acquire pairs with the producer's release). The copy may
        // still race a brand-new write; that torn-read window is part of the
        // protocol (no post-copy validation by design).
        unsafe {
            std::ptr::copy_nonoverlapping(self.data.get() as *const u8, out.as_mut_ptr(), len);
        }
        self.version.store(version.wrapping_add(2), Ordering::Release);
        Some(len)
    }

    #[cfg(test)]
    pub(crate) fn version(&self) -> u32 {
        self.version.load(Ordering::Acquire)
    }
}
