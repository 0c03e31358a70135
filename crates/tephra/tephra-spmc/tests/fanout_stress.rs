//! Threaded liveness/stress test: one paced producer, several uncoordinated
//! polling readers, bounded duration.
//!
//! The point is not payload accounting (readers poll stateless slots and may
//! legitimately see a message zero or many times) but liveness and safety:
//! the producer must never stall on readers, every `read` must return
//! immediately whether or not data is present, and a full run must finish
//! without deadlock, crash, or out-of-bounds access.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tephra_events::{SymbolId, Tick};
use tephra_spmc::{BLOCK_CAPACITY, RingConfig, SpmcRing};

const RING_CAPACITY: usize = 1024;
const READER_THREADS: usize = 4;
const RUN_FOR: Duration = Duration::from_millis(500);

/// Pacing for the producer: a short pause after each batch so readers get
/// scheduled and the test exercises genuine interleaving, not a write burst
/// followed by quiet polling.
const WRITER_BATCH_SIZE: u64 = 256;
const WRITER_BATCH_DELAY_US: u64 = 50;

#[test]
fn producer_and_readers_run_concurrently_without_stalls() {
    let (mut writer, reader) = SpmcRing::split(RingConfig::new(RING_CAPACITY));
    let stop = Arc::new(AtomicBool::new(false));
    let published = Arc::new(AtomicU64::new(0));

    let producer = {
        let stop = Arc::clone(&stop);
        let published = Arc::clone(&published);
        thread::spawn(move || {
            let mut seq: u64 = 0;
            while !stop.load(Ordering::Relaxed) {
                let tick = Tick {
                    ts_event_ns: seq,
                    symbol_id: SymbolId(1),
                    bid_px_ticks: 1_000 + seq as i64,
                    bid_qty_lots: 1,
                    ask_px_ticks: 1_010 + seq as i64,
                    ask_qty_lots: 1,
                };
                writer.write(Tick::ENCODED_LEN as u32, |buf| {
                    tick.encode_into(buf);
                });
                seq += 1;
                published.store(seq, Ordering::Relaxed);

                if seq % WRITER_BATCH_SIZE == 0 {
                    thread::sleep(Duration::from_micros(WRITER_BATCH_DELAY_US));
                }
            }
            seq
        })
    };

    let mut reader_handles = Vec::with_capacity(READER_THREADS);
    for reader_id in 0..READER_THREADS {
        let reader = reader.clone();
        let stop = Arc::clone(&stop);
        reader_handles.push(thread::spawn(move || {
            let mut out = [0u8; BLOCK_CAPACITY];
            // Stagger starting positions so readers do not march in lockstep.
            let mut index = (reader_id * RING_CAPACITY / READER_THREADS) % reader.size();
            let mut hits: u64 = 0;
            let mut misses: u64 = 0;

            while !stop.load(Ordering::Relaxed) {
                match reader.read(index, &mut out) {
                    Some(len) => {
                        // Every message in this run is a packed Tick; the
                        // length field is only ever written as that size.
                        assert_eq!(len, Tick::ENCODED_LEN);
                        hits += 1;
                    }
                    None => misses += 1,
                }
                index = (index + 1) % reader.size();
            }
            (hits, misses)
        }));
    }

    let deadline = Instant::now() + RUN_FOR;
    while Instant::now() < deadline {
        thread::sleep(Duration::from_millis(10));
    }
    stop.store(true, Ordering::Relaxed);

    let total_published = producer.join().expect("producer panicked");
    assert!(total_published > 0, "producer made no progress");
    assert_eq!(total_published, published.load(Ordering::Relaxed));

    for handle in reader_handles {
        let (hits, misses) = handle.join().expect("reader panicked");
        assert!(hits > 0, "reader never observed a stable message");
        // A stateless poller sweeping a partially stale ring sees misses
        // only before the first lap fills it; either count just has to be
        // a real number, the run completing at all is the liveness check.
        let _ = misses;
    }
}

#[test]
fn reads_return_promptly_while_producer_is_hot() {
    let (mut writer, reader) = SpmcRing::split(RingConfig::new(64));
    let stop = Arc::new(AtomicBool::new(false));

    let producer = {
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            let mut n: u64 = 0;
            while !stop.load(Ordering::Relaxed) {
                writer.write(8, |buf| buf[..8].copy_from_slice(&n.to_ne_bytes()));
                n = n.wrapping_add(1);
            }
        })
    };

    // Sample read latency under a producer writing flat out. The bound is
    // deliberately loose (scheduler noise), it only has to catch a read
    // that blocks or spins indefinitely.
    let mut out = [0u8; BLOCK_CAPACITY];
    for i in 0..10_000usize {
        let start = Instant::now();
        let _ = reader.read(i % reader.size(), &mut out);
        assert!(
            start.elapsed() < Duration::from_millis(100),
            "read did not return promptly"
        );
    }

    stop.store(true, Ordering::Relaxed);
    producer.join().expect("producer panicked");
}
