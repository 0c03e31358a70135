//! Demo wiring for the broadcast ring: one producer thread publishing ticks,
//! N reader threads sweeping slot indices at their own pace.
//!
//! Reader count and run time come from `FANOUT_READERS` / `FANOUT_SECS`;
//! log verbosity from `RUST_LOG` as usual.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tephra_events::{SymbolId, Tick};
use tephra_spmc::{BLOCK_CAPACITY, RingConfig, SpmcRing};
use tracing::info;

const RING_CAPACITY: usize = 1 << 12;

fn now_ns() -> u64 {
    let t = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap();
    t.as_nanos() as u64
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(v) => v.parse().with_context(|| format!("bad {key}: {v}")),
        Err(_) => Ok(default),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let reader_count: usize = env_or("FANOUT_READERS", 3)?;
    let run_secs: u64 = env_or("FANOUT_SECS", 5)?;

    info!(capacity = RING_CAPACITY, readers = reader_count, run_secs, "starting fan-out demo");

    let (mut writer, reader) = SpmcRing::split(RingConfig::new(RING_CAPACITY));
    let stop = Arc::new(AtomicBool::new(false));

    let producer = {
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            let mut bid = 100_000i64;
            let mut count: u64 = 0;
            let mut last = Instant::now();

            while !stop.load(Ordering::Relaxed) {
                bid += 1;
                let tick = Tick {
                    ts_event_ns: now_ns(),
                    symbol_id: SymbolId(1),
                    bid_px_ticks: bid,
                    bid_qty_lots: 10,
                    ask_px_ticks: bid + 10,
                    ask_qty_lots: 12,
                };
                writer.write(Tick::ENCODED_LEN as u32, |buf| {
                    tick.encode_into(buf);
                });
                count += 1;

                if last.elapsed() >= Duration::from_secs(1) {
                    info!(rate = count, "publish rate (ev/s)");
                    count = 0;
                    last = Instant::now();
                }
                std::hint::spin_loop();
            }
        })
    };

    let mut readers = Vec::with_capacity(reader_count);
    for id in 0..reader_count {
        let reader = reader.clone();
        let stop = Arc::clone(&stop);
        readers.push(thread::spawn(move || {
            let mut out = [0u8; BLOCK_CAPACITY];
            let mut index = 0usize;
            let mut hits: u64 = 0;
            let mut last_mid: i64 = 0;

            while !stop.load(Ordering::Relaxed) {
                if let Some(len) = reader.read(index, &mut out) {
                    let tick = Tick::decode(&out[..len]);
                    last_mid = tick.mid_ticks();
                    hits += 1;
                }
                index = (index + 1) % reader.size();
                std::hint::spin_loop();
            }
            info!(reader = id, hits, last_mid, "reader done");
            hits
        }));
    }

    thread::sleep(Duration::from_secs(run_secs));
    stop.store(true, Ordering::Relaxed);

    producer.join().expect("producer thread panicked");
    let total: u64 = readers
        .into_iter()
        .map(|h| h.join().expect("reader thread panicked"))
        .sum();
    info!(total_reads = total, "fan-out demo complete");

    Ok(())
}
