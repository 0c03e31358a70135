//! Prints a latency percentile table for the ring's hot paths and dumps the
//! raw results as JSON for diffing between runs.

use tephra_events::Tick;
use tephra_perf::{
    BenchResult, capture_rusage, make_test_tick, measure_batched, print_result_row,
    print_table_header, section_header,
};
use tephra_spmc::{BLOCK_CAPACITY, RingConfig, SpmcRing};

const BATCHES: usize = 2_000;
const BATCH_SIZE: usize = 1_000;
const WARMUP: usize = 50;

fn main() {
    let mut results: Vec<BenchResult> = Vec::new();
    let tick = make_test_tick();

    section_header("tephra-spmc hot paths");
    print_table_header();

    {
        let (mut writer, _reader) = SpmcRing::split(RingConfig::new(1 << 16));
        let r = measure_batched("write", BATCHES, BATCH_SIZE, WARMUP, || {
            writer.write(Tick::ENCODED_LEN as u32, |buf| {
                tick.encode_into(buf);
            });
        });
        print_result_row(&r);
        results.push(r);
    }

    {
        let (mut writer, reader) = SpmcRing::split(RingConfig::new(1 << 16));
        writer.write(Tick::ENCODED_LEN as u32, |buf| {
            tick.encode_into(buf);
        });
        let mut out = [0u8; BLOCK_CAPACITY];
        let r = measure_batched("read (data)", BATCHES, BATCH_SIZE, WARMUP, || {
            std::hint::black_box(reader.read(0, &mut out));
        });
        print_result_row(&r);
        results.push(r);
    }

    {
        let (_writer, reader) = SpmcRing::split(RingConfig::new(1 << 16));
        let mut out = [0u8; BLOCK_CAPACITY];
        let r = measure_batched("read (empty)", BATCHES, BATCH_SIZE, WARMUP, || {
            std::hint::black_box(reader.read(1, &mut out));
        });
        print_result_row(&r);
        results.push(r);
    }

    {
        let (mut writer, reader) = SpmcRing::split(RingConfig::new(1 << 16));
        let mut out = [0u8; BLOCK_CAPACITY];
        let mut index: usize = 0;
        let capacity = reader.size();
        let r = measure_batched("round_trip", BATCHES, BATCH_SIZE, WARMUP, || {
            writer.write(Tick::ENCODED_LEN as u32, |buf| {
                tick.encode_into(buf);
            });
            std::hint::black_box(reader.read(index, &mut out));
            index = (index + 1) % capacity;
        });
        print_result_row(&r);
        results.push(r);
    }

    let usage = capture_rusage();
    section_header("resource usage");
    println!("  max rss: {} bytes", usage.max_rss_bytes);
    println!("  faults: {} minor / {} major", usage.minor_faults, usage.major_faults);
    println!(
        "  ctx switches: {} voluntary / {} involuntary",
        usage.vol_ctx_switches, usage.invol_ctx_switches
    );

    let out_path = format!("/tmp/tephra_perf_report_{}.json", std::process::id());
    match serde_json::to_string_pretty(&results) {
        Ok(json) => {
            if let Err(e) = std::fs::write(&out_path, json) {
                eprintln!("failed to write {out_path}: {e}");
            } else {
                println!("\n  results written to {out_path}");
            }
        }
        Err(e) => eprintln!("failed to serialize results: {e}"),
    }
}
