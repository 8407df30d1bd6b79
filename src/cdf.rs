use crate::config::KernelConfig;
use crate::error::{check_lengths, Result};
use crate::table::TailTable;
use once_cell::sync::Lazy;
use rayon::prelude::*;

/// Absolute error bound of the default kernel, see [`KernelConfig::error_bound`].
pub const MAX_ABS_ERROR: f64 = 3e-8;

/// Kernel built from [`KernelConfig::default`] the first time it is needed.
pub static DEFAULT_KERNEL: Lazy<FastNormalCdf> =
    Lazy::new(|| FastNormalCdf::build(KernelConfig::default()));

/// Fast approximation of the standard normal CDF.
///
/// The kernel holds an immutable interpolation table and can be shared freely
/// between threads. Every output element depends on the matching input element
/// only, so all entry points, sequential or parallel, agree bit for bit.
pub struct FastNormalCdf {
    table: TailTable,
    config: KernelConfig,
}

impl FastNormalCdf {
    pub fn new(config: KernelConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: KernelConfig) -> Self {
        let table = TailTable::new(&config);
        log::debug!(
            "Built normal tail table with {} entries (step {}, cutoff {}, max abs error {:e})",
            table.len(),
            config.step(),
            table.cutoff(),
            config.error_bound()
        );
        Self { table, config }
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn error_bound(&self) -> f64 {
        self.config.error_bound()
    }

    /// Approximate `Φ(x)`.
    ///
    /// `NaN` maps to `NaN`, `-∞` to `0` and `+∞` to `1`. The result is
    /// non-decreasing in `x` and `phi(-x) == 1 - phi(x)` up to one rounding.
    #[inline]
    pub fn phi(&self, x: f64) -> f64 {
        if x.is_nan() {
            return x;
        }
        let tail = self.table.tail(x.abs());
        if x < 0.0 {
            tail
        } else {
            1.0 - tail
        }
    }

    /// Allocating entry point: returns a new vector with `Φ` of each input.
    pub fn evaluate(&self, input: &[f64]) -> Vec<f64> {
        input.iter().map(|&x| self.phi(x)).collect()
    }

    /// Preallocated entry point: overwrites `output[i]` with `Φ(input[i])`.
    ///
    /// Fails without touching `output` if the lengths differ.
    pub fn evaluate_into(&self, output: &mut [f64], input: &[f64]) -> Result<()> {
        check_lengths(output, input)?;
        self.fill(output, input);
        Ok(())
    }

    /// Like [`Self::evaluate`], splitting the work across the rayon thread pool.
    pub fn evaluate_par(&self, input: &[f64]) -> Vec<f64> {
        let mut output = vec![0.0; input.len()];
        self.fill_par(&mut output, input);
        output
    }

    /// Like [`Self::evaluate_into`], splitting the work across the rayon thread pool.
    pub fn evaluate_into_par(&self, output: &mut [f64], input: &[f64]) -> Result<()> {
        check_lengths(output, input)?;
        self.fill_par(output, input);
        Ok(())
    }

    #[inline]
    fn fill(&self, output: &mut [f64], input: &[f64]) {
        for (o, &x) in output.iter_mut().zip(input.iter()) {
            *o = self.phi(x);
        }
    }

    fn fill_par(&self, output: &mut [f64], input: &[f64]) {
        let chunk_len = self.config.par_chunk_len;
        log::trace!(
            "Evaluating {} values in {} chunks",
            input.len(),
            input.len().div_ceil(chunk_len)
        );
        output
            .par_chunks_mut(chunk_len)
            .zip(input.par_chunks(chunk_len))
            .for_each(|(o, i)| self.fill(o, i));
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::Error;
    use pretty_assertions::assert_eq;
    use statrs::distribution::{ContinuousCDF, Normal as NormalDistr};

    fn random_inputs(n: usize, seed: u64) -> Vec<f64> {
        use rand::prelude::*;
        use rand_distr::Normal;
        use rand_xoshiro::Xoroshiro128Plus;
        let rng = Xoroshiro128Plus::seed_from_u64(seed);
        rng.sample_iter(Normal::new(0.0, 3.0).unwrap()).take(n).collect()
    }

    #[test]
    fn test_default_bound() {
        assert!(DEFAULT_KERNEL.error_bound() <= MAX_ABS_ERROR);
        assert_eq!(DEFAULT_KERNEL.config(), &KernelConfig::default());
    }

    #[test]
    fn test_special_values() {
        let k = &*DEFAULT_KERNEL;
        assert_eq!(k.phi(0.0), 0.5);
        assert_eq!(k.phi(-0.0), 0.5);
        assert_eq!(k.phi(f64::INFINITY), 1.0);
        assert_eq!(k.phi(f64::NEG_INFINITY), 0.0);
        assert!(k.phi(f64::NAN).is_nan());
        assert_eq!(k.phi(f64::MAX), 1.0);
        assert_eq!(k.phi(f64::MIN), 0.0);
        assert_eq!(k.phi(f64::MIN_POSITIVE), 0.5);
    }

    #[test]
    fn test_confidence_interval_scores() {
        let actual = DEFAULT_KERNEL.evaluate(&[-1.959964, 0.0, 1.959964]);
        let expected = [0.025, 0.5, 0.975];
        assert_eq!(actual.len(), 3);
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert!((a - e).abs() < 1e-6, "expected {} got {}", e, a);
        }
    }

    #[test]
    fn test_empty() {
        assert_eq!(DEFAULT_KERNEL.evaluate(&[]), Vec::<f64>::new());
        assert_eq!(DEFAULT_KERNEL.evaluate_par(&[]), Vec::<f64>::new());
        let mut output: Vec<f64> = Vec::new();
        assert!(DEFAULT_KERNEL.evaluate_into(&mut output, &[]).is_ok());
        assert!(DEFAULT_KERNEL.evaluate_into_par(&mut output, &[]).is_ok());
    }

    #[test]
    fn test_entry_points_agree() {
        let k = &*DEFAULT_KERNEL;
        let mut input = random_inputs(10_000, 1234);
        input.extend_from_slice(&[f64::INFINITY, f64::NEG_INFINITY, 0.0, -0.0, 9.0, -9.0]);

        let allocated = k.evaluate(&input);
        let mut preallocated = vec![f64::NAN; input.len()];
        k.evaluate_into(&mut preallocated, &input).unwrap();
        let parallel = k.evaluate_par(&input);
        let mut parallel_into = vec![-1.0; input.len()];
        k.evaluate_into_par(&mut parallel_into, &input).unwrap();

        let bits = |v: &[f64]| v.iter().map(|x| x.to_bits()).collect::<Vec<u64>>();
        assert_eq!(allocated.len(), input.len());
        assert_eq!(bits(&allocated), bits(&preallocated));
        assert_eq!(bits(&allocated), bits(&parallel));
        assert_eq!(bits(&allocated), bits(&parallel_into));
    }

    #[test]
    fn test_parallel_independent_of_chunking() {
        let input = random_inputs(5_003, 42);
        let expected = DEFAULT_KERNEL.evaluate(&input);
        // Make the dispatch trace message format its arguments
        log::set_max_level(log::LevelFilter::Trace);
        for chunk in [1, 7, 64, 5_003, 100_000, usize::MAX] {
            let k = FastNormalCdf::new(KernelConfig::default().with_par_chunk_len(chunk)).unwrap();
            assert_eq!(k.evaluate_par(&input), expected);
        }
    }

    #[test]
    fn test_length_mismatch() {
        let input = [0.0, 1.0, 2.0];
        for len in [0, 2, 4] {
            let mut output = vec![-1.0; len];
            assert_eq!(
                DEFAULT_KERNEL.evaluate_into(&mut output, &input),
                Err(Error::InvalidArgument { input: 3, output: len })
            );
            assert_eq!(
                DEFAULT_KERNEL.evaluate_into_par(&mut output, &input),
                Err(Error::InvalidArgument { input: 3, output: len })
            );
            assert!(output.iter().all(|&x| x == -1.0));
        }
    }

    #[test]
    fn test_accuracy() {
        let k = &*DEFAULT_KERNEL;
        let mut max_err: f64 = 0.0;
        for i in -800_000..=800_000 {
            let x = i as f64 * 1e-5;
            let err = (k.phi(x) - crate::stats::standard_cdf(x)).abs();
            max_err = max_err.max(err);
        }
        assert!(max_err <= k.error_bound(), "max error {:e}", max_err);
        // The bound is not wildly pessimistic either
        assert!(max_err > k.error_bound() / 4.0, "max error {:e}", max_err);
    }

    #[test]
    fn test_accuracy_exact_values() {
        // High precision Φ(x) at the cell midpoints around z = 1, where the
        // interpolation error peaks, and at a few other points
        let exact = [
            (-0.99658203125, 0.15948371571627436798),
            (-0.99755859375, 0.15924672389885243999),
            (-0.99853515625, 0.15900996284128247877),
            (-0.99951171875, 0.15877343254444568008),
            (-1.00048828125, 0.15853713300878245437),
            (-1.00146484375, 0.15830106423429285539),
            (-1.00244140625, 0.15806522622053700994),
            (-1.00341796875, 0.15782961896663554903),
            (-1.00439453125, 0.15759424247127004019),
            (-0.99756, 0.15924638279702143327),
            (-1.0, 0.15865525393145705141),
            (-0.5, 0.30853753872598689636),
            (-3.0, 0.0013498980316300945267),
            (-8.0, 6.2209605742717841235e-16),
        ];
        let k = &*DEFAULT_KERNEL;
        let bound = k.error_bound();
        let mut max_err: f64 = 0.0;
        for (x, p) in exact {
            let lower = (k.phi(x) - p).abs();
            let upper = (k.phi(-x) - (1.0 - p)).abs();
            assert!(lower <= bound, "x={} err={:e} bound={:e}", x, lower, bound);
            assert!(upper <= bound, "x={} err={:e} bound={:e}", -x, upper, bound);
            max_err = max_err.max(lower).max(upper);
        }
        // The midpoints next to z = 1 come within a hair of the bound
        assert!(max_err > 0.99 * bound, "max error {:e}", max_err);
    }

    #[test]
    fn test_accuracy_coarse_config() {
        let reference = NormalDistr::new(0.0, 1.0).unwrap();
        let k = FastNormalCdf::new(KernelConfig::default().with_resolution(16).with_z_max(5.0)).unwrap();
        for x in random_inputs(20_000, 99) {
            let err = (k.phi(x) - reference.cdf(x)).abs();
            assert!(err <= k.error_bound(), "x={} err={:e} bound={:e}", x, err, k.error_bound());
        }
    }

    #[test]
    fn test_monotone_dense_grid() {
        let k = &*DEFAULT_KERNEL;
        let mut last = k.phi(-10.0);
        for i in -1_000_000..=1_000_000 {
            let x = i as f64 * 1e-5;
            let current = k.phi(x);
            assert!(current >= last, "x={} current={} last={}", x, current, last);
            assert!((0.0..=1.0).contains(&current));
            last = current;
        }
    }

    #[test]
    fn test_monotone_adjacent_floats() {
        let k = &*DEFAULT_KERNEL;
        // Walk a few hundred ulps across grid points, the cutoff and zero
        let mut centers: Vec<f64> = vec![0.0, 8.5, -8.5];
        centers.extend((1..40).map(|j| j as f64 * 0.21484375));
        centers.extend((1..40).map(|j| -(j as f64) * 0.21484375));
        for c in centers {
            let mut x = c;
            for _ in 0..256 {
                x = -next_up(-x);
            }
            let mut last = k.phi(x);
            for _ in 0..512 {
                x = next_up(x);
                let current = k.phi(x);
                assert!(current >= last, "x={:e} current={} last={}", x, current, last);
                last = current;
            }
        }
    }

    #[test]
    fn test_monotone_random_pairs() {
        let k = &*DEFAULT_KERNEL;
        let mut xs = random_inputs(50_000, 7);
        xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let ps = k.evaluate(&xs);
        assert!(ps.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_symmetry() {
        let k = &*DEFAULT_KERNEL;
        for x in random_inputs(50_000, 31) {
            let d = (k.phi(-x) - (1.0 - k.phi(x))).abs();
            assert!(d <= 1e-16, "x={} d={:e}", x, d);
        }
    }

    #[test]
    fn test_rejects_invalid_config() {
        match FastNormalCdf::new(KernelConfig::default().with_resolution(0)) {
            Err(Error::InvalidConfig(_)) => {}
            _ => panic!("zero resolution accepted"),
        }
    }

    fn next_up(x: f64) -> f64 {
        if x == 0.0 {
            return f64::from_bits(1);
        }
        if x > 0.0 {
            f64::from_bits(x.to_bits() + 1)
        } else {
            f64::from_bits(x.to_bits() - 1)
        }
    }
}
