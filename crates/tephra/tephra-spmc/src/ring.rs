//! Ring configuration and publication-index arithmetic.
//!
//! The publication counter only ever grows; slot indices come from reducing
//! it modulo the capacity. Capacity is any positive integer — this ring does
//! not require powers of two, so the reduction is a real modulo rather than
//! a bitmask.

/// Configuration for a broadcast ring.
#[derive(Debug, Copy, Clone)]
pub struct RingConfig {
    /// Number of slots in the ring. Fixed for the ring's lifetime.
    pub capacity: usize,
}

impl RingConfig {
    /// Creates a configuration with the given slot count.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    ///
    /// # Example
    /// ```
    /// use tephra_spmc::RingConfig;
    /// let cfg = RingConfig::new(100); // any positive capacity is fine
    /// ```
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be positive");
        Self { capacity }
    }
}

/// Maps a publication sequence number to a slot index in `[0, capacity)`.
///
/// Once the counter exceeds the capacity the mapping wraps, so new writes
/// silently land on the oldest surviving slot. Nothing records how many
/// generations a slot has been overwritten.
#[inline(always)]
pub(crate) fn seq_to_index(seq: u64, capacity: usize) -> usize {
    (seq % capacity as u64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_power_of_two_capacity_is_accepted() {
        let cfg = RingConfig::new(100);
        assert_eq!(cfg.capacity, 100);
    }

    #[test]
    #[should_panic(expected = "capacity must be positive")]
    fn zero_capacity_panics() {
        RingConfig::new(0);
    }

    #[test]
    fn indices_wrap_modulo_capacity() {
        assert_eq!(seq_to_index(0, 4), 0);
        assert_eq!(seq_to_index(3, 4), 3);
        assert_eq!(seq_to_index(4, 4), 0);
        assert_eq!(seq_to_index(9, 4), 1);
        assert_eq!(seq_to_index(10, 3), 1);
    }
}
