use anyhow::{Result, bail};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;
use wae_core::{EngineError, PatchCache, RoundEngine};

/// Totals of a Monte-Carlo run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BenchReport {
    pub distance: usize,
    pub p: f64,
    pub shots: usize,

    /// Rounds whose injection left every stabilizer quiet.
    pub trivial: u64,

    /// Quiet rounds that nevertheless carry a logical error.
    pub undetected_logical: u64,
    pub elapsed: Duration,
}

impl BenchReport {
    pub fn throughput(&self) -> f64 {
        let seconds = self.elapsed.as_secs_f64();
        if seconds > 0.0 {
            self.shots as f64 / seconds
        } else {
            0.0
        }
    }

    pub fn trivial_fraction(&self) -> f64 {
        if self.shots == 0 {
            0.0
        } else {
            self.trivial as f64 / self.shots as f64
        }
    }

    pub fn print_report(&self) {
        println!("Results (d = {}, p = {})", self.distance, self.p);
        println!("Time: {:.4} s", self.elapsed.as_secs_f64());
        println!("Throughput: {:.2} rounds/s", self.throughput());
        println!(
            "Trivial: {}/{} ({:.4})",
            self.trivial,
            self.shots,
            self.trivial_fraction()
        );
        println!("Undetected logical: {}", self.undetected_logical);
    }
}

/// Runs `shots` independent injections at distance `distance` in parallel.
///
/// Shot `i` draws from its own generator seeded by `seed` and `i`, so a
/// seeded run gives the same totals on any number of threads.
pub fn run_bench(distance: usize, p: f64, shots: usize, seed: Option<u64>) -> Result<BenchReport> {
    if !(0.0..=1.0).contains(&p) {
        bail!("p must lie in [0, 1], got {p}");
    }
    let patch = PatchCache::global().get_or_build(distance)?;
    let seed = seed.unwrap_or_else(rand::random);
    info!(distance, p, shots, seed, "starting benchmark");

    let start = Instant::now();
    let (trivial, undetected_logical) = (0..shots)
        .into_par_iter()
        .map_init(
            || RoundEngine::new(Arc::clone(&patch)),
            |engine, shot| -> Result<(u64, u64), EngineError> {
                let shot_seed = seed ^ (shot as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
                let mut rng = StdRng::seed_from_u64(shot_seed);
                engine.reset();
                engine.inject_error(p, &mut rng)?;
                if !engine.is_syndrome_zero() {
                    return Ok((0, 0));
                }
                Ok((1, u64::from(engine.has_logical_error()?)))
            },
        )
        .try_reduce(|| (0, 0), |a, b| Ok((a.0 + b.0, a.1 + b.1)))?;

    Ok(BenchReport {
        distance,
        p,
        shots,
        trivial,
        undetected_logical,
        elapsed: start.elapsed(),
    })
}
