//! Simulates repeated batches of z-statistics and turns them into two-sided
//! p-values with the preallocated entry point, reusing the same buffers across
//! batches. Run with `RUST_LOG=debug` to see the table being built.

use anyhow::Result;
use argh::FromArgs;
use fastncdf::stats::standard_cdf;
use fastncdf::{FastNormalCdf, KernelConfig};
use rand::prelude::*;
use rand_distr::StandardNormal;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::time::Instant;

#[derive(FromArgs)]
/// Two-sided p-values of simulated z-scores.
struct Config {
    #[argh(option, short = 'n', default = "default_batch()")]
    /// number of z-scores per batch
    pub batch: usize,

    #[argh(option, short = 'b', default = "default_batches()")]
    /// number of batches
    pub batches: usize,

    #[argh(option, default = "default_alpha()")]
    /// significance level
    pub alpha: f64,

    #[argh(option, default = "fastncdf::config::default_resolution()")]
    /// table points per unit of z
    pub resolution: usize,

    #[argh(switch)]
    /// evaluate batches on the rayon thread pool
    pub parallel: bool,

    #[argh(option, default = "default_seed()")]
    /// seed for the pseudorandom number generator
    pub seed: u64,
}

fn default_batch() -> usize {
    100_000
}

fn default_batches() -> usize {
    50
}

fn default_alpha() -> f64 {
    0.05
}

fn default_seed() -> u64 {
    12453
}

fn main() -> Result<()> {
    env_logger::init();
    let config: Config = argh::from_env();

    let kernel = FastNormalCdf::new(KernelConfig::default().with_resolution(config.resolution))?;
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(config.seed);

    let mut z = vec![0.0; config.batch];
    let mut p = vec![0.0; config.batch];
    let mut rejections = 0usize;
    let mut max_err: f64 = 0.0;
    let mut elapsed = 0.0;

    for _ in 0..config.batches {
        //// Negated absolute values, so that `2 Φ(-|z|)` is the two-sided p-value
        for zi in z.iter_mut() {
            let x: f64 = rng.sample(StandardNormal);
            *zi = -x.abs();
        }
        let start = Instant::now();
        if config.parallel {
            kernel.evaluate_into_par(&mut p, &z)?;
        } else {
            kernel.evaluate_into(&mut p, &z)?;
        }
        elapsed += start.elapsed().as_secs_f64();

        rejections += p.iter().filter(|&&pi| 2.0 * pi < config.alpha).count();
        if let Some(&x) = z.first() {
            max_err = max_err.max((kernel.phi(x) - standard_cdf(x)).abs());
        }
    }

    let total = config.batch * config.batches;
    log::info!("max observed error {:e} (bound {:e})", max_err, kernel.error_bound());
    println!(
        "{} z-scores in {:.3}s ({:.1} M/s), rejected at alpha={}: {:.4}",
        total,
        elapsed,
        total as f64 / elapsed / 1e6,
        config.alpha,
        rejections as f64 / total as f64
    );
    Ok(())
}
