//! Randomized multi-threaded workload

use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Instant;

use anyhow::{anyhow, Result};
use boundlru::{StatsSnapshot, Store, SyncStore};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::debug;

/// Shape of one stress run
#[derive(Debug, Clone)]
pub struct Workload {
    pub threads: usize,
    pub ops_per_thread: usize,
    pub keys_per_thread: u64,
    pub seed: u64,
}

/// Outcome of a stress run
#[derive(Debug, Serialize)]
pub struct Report {
    pub total_ops: u64,
    pub elapsed_secs: f64,
    pub ops_per_sec: f64,
    pub capacity: usize,
    pub final_size: usize,
    pub expected_live: usize,
    pub stats: StatsSnapshot,
}

impl Report {
    /// Whether the cache ended with exactly the keys the workers left live
    pub fn size_matches(&self) -> bool {
        self.final_size == self.expected_live
    }
}

/// Run `workload` against `cache`
///
/// Every thread draws keys from its own range, so the keys it last put and
/// never removed are known locally and their union is the expected live set.
pub fn run<S>(
    cache: Arc<SyncStore<u64, u64, S>>,
    workload: &Workload,
    capacity: usize,
) -> Result<Report>
where
    S: Store<u64, u64> + Send + Sync + 'static,
{
    let barrier = Arc::new(Barrier::new(workload.threads));
    let start = Instant::now();

    let handles: Vec<_> = (0..workload.threads as u64)
        .map(|t| {
            let cache = Arc::clone(&cache);
            let barrier = Arc::clone(&barrier);
            let ops = workload.ops_per_thread;
            let keys = workload.keys_per_thread;
            let seed = workload.seed.wrapping_add(t);
            thread::spawn(move || {
                let mut rng = StdRng::seed_from_u64(seed);
                let mut live = HashSet::new();
                let base = t * keys;
                barrier.wait();

                for _ in 0..ops {
                    let key = base + rng.random_range(0..keys);
                    match rng.random_range(0..10) {
                        0..=5 => {
                            cache.get(&key);
                        }
                        6..=8 => {
                            cache.put(key, key);
                            live.insert(key);
                        }
                        _ => {
                            cache.remove(&key);
                            live.remove(&key);
                        }
                    }
                }
                debug!(thread = t, live = live.len(), "worker finished");
                live.len()
            })
        })
        .collect();

    let mut expected_live = 0;
    for handle in handles {
        expected_live += handle
            .join()
            .map_err(|_| anyhow!("Worker thread panicked"))?;
    }

    let elapsed_secs = start.elapsed().as_secs_f64();
    let total_ops = (workload.threads * workload.ops_per_thread) as u64;
    let ops_per_sec = if elapsed_secs > 0.0 {
        total_ops as f64 / elapsed_secs
    } else {
        0.0
    };

    Ok(Report {
        total_ops,
        elapsed_secs,
        ops_per_sec,
        capacity,
        final_size: cache.size(),
        expected_live,
        stats: cache.stats().snapshot(),
    })
}
