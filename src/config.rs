use crate::error::{Error, Result};
use crate::stats::{standard_pdf, standard_tail};

/// Largest accepted table resolution.
pub const MAX_RESOLUTION: usize = 1 << 20;

/// Largest accepted number of table cells, which keeps the table under 128 MiB
/// whatever the combination of `resolution` and `z_max`.
pub const MAX_CELLS: usize = 1 << 24;

/// Slack added to the analytic bound to account for the error of the reference
/// `erfc` and for floating point rounding in the interpolation itself.
const ROUNDING_ALLOWANCE: f64 = 1e-13;

/// Parameters of a [`FastNormalCdf`](crate::cdf::FastNormalCdf) kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelConfig {
    /// Number of table points per unit of `z`. The grid step is `1 / resolution`.
    pub resolution: usize,
    /// Beyond this absolute value the lower tail is taken to be exactly zero.
    pub z_max: f64,
    /// Number of elements handled by a single task in the parallel entry points.
    pub par_chunk_len: usize,
}

pub fn default_resolution() -> usize {
    1024
}

pub fn default_z_max() -> f64 {
    8.5
}

pub fn default_par_chunk_len() -> usize {
    4096
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            resolution: default_resolution(),
            z_max: default_z_max(),
            par_chunk_len: default_par_chunk_len(),
        }
    }
}

impl KernelConfig {
    pub fn with_resolution(mut self, resolution: usize) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_z_max(mut self, z_max: f64) -> Self {
        self.z_max = z_max;
        self
    }

    pub fn with_par_chunk_len(mut self, par_chunk_len: usize) -> Self {
        self.par_chunk_len = par_chunk_len;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.resolution == 0 || self.resolution > MAX_RESOLUTION {
            return Err(Error::InvalidConfig(format!(
                "resolution must be in 1..={}, got {}",
                MAX_RESOLUTION, self.resolution
            )));
        }
        if !self.z_max.is_finite() || self.z_max <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "z_max must be finite and positive, got {}",
                self.z_max
            )));
        }
        let cells = self.z_max * self.resolution as f64;
        if cells > MAX_CELLS as f64 {
            return Err(Error::InvalidConfig(format!(
                "z_max * resolution must be at most {}, got {}",
                MAX_CELLS, cells
            )));
        }
        if self.par_chunk_len == 0 {
            return Err(Error::InvalidConfig(
                "par_chunk_len must be positive".to_owned(),
            ));
        }
        Ok(())
    }

    /// Distance between two consecutive table points.
    pub fn step(&self) -> f64 {
        1.0 / self.resolution as f64
    }

    /// Number of interpolation cells, i.e. one less than the number of table entries.
    pub fn num_cells(&self) -> usize {
        (self.z_max * self.resolution as f64).ceil() as usize
    }

    /// Upper bound on the absolute error of the kernel built from this configuration.
    ///
    /// Linear interpolation of `Φ(-z)` with step `h` is off by at most
    /// `h² / 8 · max |Φ''|`, and `|Φ''(z)| = |z| φ(z)` peaks at `z = 1`.
    /// Past the last table point the tail is truncated to zero, which costs
    /// at most the tail mass at that point.
    pub fn error_bound(&self) -> f64 {
        let h = self.step();
        let cutoff = self.num_cells() as f64 * h;
        h * h / 8.0 * standard_pdf(1.0) + standard_tail(cutoff) + ROUNDING_ALLOWANCE
    }
}
