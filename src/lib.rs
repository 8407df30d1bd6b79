//! Fast approximation of the standard normal cumulative distribution function.
//!
//! The free functions below use a process-wide kernel built on first use from
//! [`KernelConfig::default`], whose absolute error is at most [`MAX_ABS_ERROR`].
//! Build a [`FastNormalCdf`] directly to trade table size for accuracy.
//!
//! ```
//! let p = fastncdf::pnorm(&[-1.959964, 0.0, 1.959964]);
//! assert!((p[0] - 0.025).abs() < 1e-6);
//!
//! let mut out = vec![0.0; 3];
//! fastncdf::pnorm_into(&mut out, &[-1.959964, 0.0, 1.959964]).unwrap();
//! assert_eq!(p, out);
//! ```

pub mod allocator;
pub mod cdf;
pub mod config;
pub mod error;
pub mod stats;
pub mod table;

pub use cdf::{FastNormalCdf, DEFAULT_KERNEL, MAX_ABS_ERROR};
pub use config::KernelConfig;
pub use error::{Error, Result};

/// Approximate `Φ(x)` for a single value.
#[inline]
pub fn phi(x: f64) -> f64 {
    DEFAULT_KERNEL.phi(x)
}

/// Approximate `Φ` of every element of `q`, in a newly allocated vector.
pub fn pnorm(q: &[f64]) -> Vec<f64> {
    DEFAULT_KERNEL.evaluate(q)
}

/// Write the approximate `Φ` of every element of `q` into `p`.
///
/// `p` must have the same length as `q`, otherwise [`Error::InvalidArgument`]
/// is returned and `p` is left untouched.
pub fn pnorm_into(p: &mut [f64], q: &[f64]) -> Result<()> {
    DEFAULT_KERNEL.evaluate_into(p, q)
}

/// Same as [`pnorm`], evaluated on the rayon thread pool.
pub fn pnorm_par(q: &[f64]) -> Vec<f64> {
    DEFAULT_KERNEL.evaluate_par(q)
}

/// Same as [`pnorm_into`], evaluated on the rayon thread pool. Fails with
/// [`Error::InvalidArgument`], leaving `p` untouched, if the lengths differ.
pub fn pnorm_into_par(p: &mut [f64], q: &[f64]) -> Result<()> {
    DEFAULT_KERNEL.evaluate_into_par(p, q)
}
