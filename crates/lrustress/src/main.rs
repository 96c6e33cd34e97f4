//! lrustress - drive a shared boundlru cache from many threads

mod workload;

use anyhow::{bail, Context, Result};
use boundlru::{CacheConfig, SyncStore};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::workload::{run, Report, Workload};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Worker threads
    #[arg(short, long, default_value_t = 8)]
    threads: usize,

    /// Operations per thread
    #[arg(short, long, default_value_t = 100_000)]
    ops: usize,

    /// Distinct keys per thread
    #[arg(short, long, default_value_t = 64)]
    keys: u64,

    /// Cache capacity (number of items), overrides --config
    #[arg(short, long)]
    capacity: Option<usize>,

    /// JSON cache config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base RNG seed; thread N uses seed + N
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Wrap the cache twice to measure the cost of redundant locking
    #[arg(long)]
    double_lock: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => CacheConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => CacheConfig::default(),
    };
    if let Some(capacity) = args.capacity {
        config.capacity = capacity;
    }
    if !config.synchronized {
        warn!("Config asks for an unsynchronized cache; wrapping it anyway for threads");
        config.synchronized = true;
    }
    config.validate().context("Invalid cache configuration")?;

    if args.threads == 0 {
        bail!("--threads must be at least 1");
    }
    if args.keys == 0 {
        bail!("--keys must be at least 1");
    }
    let key_space = args.keys.saturating_mul(args.threads as u64);
    if key_space > config.capacity as u64 {
        warn!(
            "Key space {} exceeds capacity {}; evictions will make the final size check inexact",
            key_space, config.capacity
        );
    }

    let workload = Workload {
        threads: args.threads,
        ops_per_thread: args.ops,
        keys_per_thread: args.keys,
        seed: args.seed,
    };

    info!("Starting lrustress v{}", env!("CARGO_PKG_VERSION"));
    info!("Cache capacity: {}", config.capacity);
    info!(
        "Threads: {}, ops/thread: {}, keys/thread: {}",
        workload.threads, workload.ops_per_thread, workload.keys_per_thread
    );

    let cache: SyncStore<u64, u64> =
        SyncStore::lru(config.capacity).context("Failed to build cache")?;

    let report = if args.double_lock {
        info!("Double locking enabled");
        run(Arc::new(SyncStore::new(cache)), &workload, config.capacity)
    } else {
        run(Arc::new(cache), &workload, config.capacity)
    }?;

    print_report(&report, args.json)?;

    if !report.size_matches() {
        if key_space <= config.capacity as u64 {
            bail!(
                "Final size {} does not match {} live keys",
                report.final_size,
                report.expected_live
            );
        }
        warn!(
            "Final size {} differs from {} live keys (evictions occurred)",
            report.final_size, report.expected_live
        );
    }
    Ok(())
}

fn print_report(report: &Report, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("\n📊 RESULTS:");
    println!("   Total ops:      {}", report.total_ops);
    println!("   Elapsed:        {:.3}s", report.elapsed_secs);
    println!("   Throughput:     {:.0} ops/sec", report.ops_per_sec);
    println!("   Final size:     {}", report.final_size);
    println!("   Live keys:      {}", report.expected_live);
    println!("   Hits / misses:  {} / {}", report.stats.hits, report.stats.misses);
    println!("   Hit ratio:      {:.2}%", report.stats.hit_ratio * 100.0);
    println!("   Inserts:        {}", report.stats.inserts);
    println!("   Removals:       {}", report.stats.removals);
    Ok(())
}
