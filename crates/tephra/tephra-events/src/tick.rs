#![forbid(unsafe_code)]

// SymbolId is consistent and stable across every feed consumer.
// repr(transparent) -> same memory layout as the wrapped u16.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SymbolId(pub u16);

// A minimal top-of-book style tick. POD, fixed-size, and small enough to
// travel inside one 64-byte ring slot once packed.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tick {
    pub ts_event_ns: u64,
    pub symbol_id: SymbolId,
    pub bid_px_ticks: i64, // tick -> smallest unit a price can move
    pub bid_qty_lots: i64, // lot -> smallest allowed quantity step
    pub ask_px_ticks: i64,
    pub ask_qty_lots: i64,
}

impl Tick {
    /// Packed wire size: 8 (ts) + 2 (symbol) + 4 × 8 (prices/quantities).
    pub const ENCODED_LEN: usize = 42;

    #[inline]
    pub fn mid_ticks(&self) -> i64 {
        (self.bid_px_ticks + self.ask_px_ticks) / 2
    }

    /// Packs the tick into `buf` as native-endian bytes, field by field,
    /// and returns the number of bytes written ([`Tick::ENCODED_LEN`]).
    ///
    /// # Panics
    /// Panics if `buf` is shorter than [`Tick::ENCODED_LEN`].
    pub fn encode_into(&self, buf: &mut [u8]) -> usize {
        buf[0..8].copy_from_slice(&self.ts_event_ns.to_ne_bytes());
        buf[8..10].copy_from_slice(&self.symbol_id.0.to_ne_bytes());
        buf[10..18].copy_from_slice(&self.bid_px_ticks.to_ne_bytes());
        buf[18..26].copy_from_slice(&self.bid_qty_lots.to_ne_bytes());
        buf[26..34].copy_from_slice(&self.ask_px_ticks.to_ne_bytes());
        buf[34..42].copy_from_slice(&self.ask_qty_lots.to_ne_bytes());
        Self::ENCODED_LEN
    }

    /// Unpacks a tick previously written by [`Tick::encode_into`].
    ///
    /// # Panics
    /// Panics if `buf` is shorter than [`Tick::ENCODED_LEN`].
    pub fn decode(buf: &[u8]) -> Self {
        Self {
            ts_event_ns: u64::from_ne_bytes(buf[0..8].try_into().unwrap()),
            symbol_id: SymbolId(u16::from_ne_bytes(buf[8..10].try_into().unwrap())),
            bid_px_ticks: i64::from_ne_bytes(buf[10..18].try_into().unwrap()),
            bid_qty_lots: i64::from_ne_bytes(buf[18..26].try_into().unwrap()),
            ask_px_ticks: i64::from_ne_bytes(buf[26..34].try_into().unwrap()),
            ask_qty_lots: i64::from_ne_bytes(buf[34..42].try_into().unwrap()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    /// The packed form must fit a 64-byte ring slot with room to spare.
    #[test]
    fn encoded_tick_fits_one_slot() {
        assert!(Tick::ENCODED_LEN <= 64);
    }

    #[test]
    fn symbol_id_is_pod() {
        assert_eq!(size_of::<SymbolId>(), 2);
    }

    #[test]
    fn encode_decode_round_trip() {
        let tick = Tick {
            ts_event_ns: 42,
            symbol_id: SymbolId(9),
            bid_px_ticks: -5,
            bid_qty_lots: 10,
            ask_px_ticks: 7,
            ask_qty_lots: 12,
        };
        let mut buf = [0u8; 64];
        let n = tick.encode_into(&mut buf);
        assert_eq!(n, Tick::ENCODED_LEN);
        assert_eq!(Tick::decode(&buf[..n]), tick);
    }

    #[test]
    fn mid_is_between_bid_and_ask() {
        let tick = Tick {
            bid_px_ticks: 100,
            ask_px_ticks: 110,
            ..Tick::default()
        };
        assert_eq!(tick.mid_ticks(), 105);
    }
}
