//// # Lower tail table
////
//// The fast kernel never evaluates an error function. Instead, we precompute the lower
//// tail `Φ(-z)` on a uniform grid `z = 0, h, 2h, ..., Nh` with a reference-quality
//// routine, and answer queries by linear interpolation between the two grid points
//// surrounding `z`. A query then costs a multiplication, a truncation, two loads and
//// a multiply-add.
////
//// Storing the lower tail, rather than `Φ(z)` itself, keeps full relative precision
//// for very negative inputs: `Φ(-8)` is about `6e-16`, which `1 - Φ(8)` cannot represent.
////
//// Interpolating a monotone sequence of values linearly gives a monotone function,
//// and this survives floating point as long as two facts hold:
////
////  - inside a cell the value is `a + (b - a) * f` with `f` in `[0, 1]`, and rounding
////    is monotone, so the result moves in one direction as `f` grows;
////  - the value never drops below `b`, which is where the next cell starts. For the
////    default grid `b - a` is exact (Sterbenz lemma: neighbours are within a factor two
////    of each other) and this holds on its own, for coarse grids we clamp.

use crate::config::KernelConfig;
use crate::stats::standard_tail;

pub struct TailTable {
    /// `values[k] = Φ(-k h)`, non-increasing in `k`, with `values[0] = 0.5`
    values: Vec<f64>,
    inv_step: f64,
    /// Queries at or beyond this point return zero
    cutoff: f64,
}

impl TailTable {
    pub fn new(config: &KernelConfig) -> Self {
        let n_cells = config.num_cells();
        let h = config.step();
        let mut values: Vec<f64> = (0..=n_cells).map(|k| standard_tail(k as f64 * h)).collect();

        //// The reference is monotone up to rounding; make sure the table is monotone exactly.
        for k in 1..values.len() {
            if values[k] > values[k - 1] {
                values[k] = values[k - 1];
            }
        }

        Self {
            values,
            inv_step: config.resolution as f64,
            cutoff: n_cells as f64 * h,
        }
    }

    /// Number of stored grid points.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Interpolated `Φ(-z)` for `z >= 0`.
    ///
    /// Infinite `z` yields zero. `z` must not be NaN: callers handle it before
    /// getting here.
    #[inline(always)]
    pub fn tail(&self, z: f64) -> f64 {
        debug_assert!(z >= 0.0);
        if z >= self.cutoff {
            return 0.0;
        }
        let pos = z * self.inv_step;
        //// With a step that is not a power of two, `pos` can round up to the last grid
        //// point even though `z < cutoff`: clamp to the last cell in that case.
        let i = (pos as usize).min(self.values.len() - 2);
        let frac = pos - i as f64;
        let a = self.values[i];
        let b = self.values[i + 1];
        (a + (b - a) * frac).max(b)
    }
}
