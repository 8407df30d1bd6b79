//// Reference-quality standard normal distribution.
////
//// Everything here goes through the complementary error function of the
//// [libm](https://github.com/rust-lang/libm) crate, a port of the musl/FreeBSD
//// routine whose error stays within one ulp. The fast kernel interpolates values
//// computed here, so any error of this routine would add to the interpolation
//// error: `statrs`' `erfc` is off by about `1.4e-11` at `z = 1`, which is enough
//// to break the bound of the kernel, so it is not used to fill the table.
////
//// These functions are far too slow to be called per element in a hot loop.

/// Lower tail of the standard normal, `Φ(-z)`.
///
/// Computed directly from `erfc`, so it keeps full relative precision
/// deep into the tail instead of rounding to zero like `1 - Φ(z)` would.
pub fn standard_tail(z: f64) -> f64 {
    0.5 * libm::erfc(z * std::f64::consts::FRAC_1_SQRT_2)
}

/// Standard normal CDF, `Φ(x)`.
pub fn standard_cdf(x: f64) -> f64 {
    standard_tail(-x)
}

/// Standard normal density.
pub fn standard_pdf(z: f64) -> f64 {
    const INV_SQRT_2PI: f64 = 0.398_942_280_401_432_7;
    INV_SQRT_2PI * (-0.5 * z * z).exp()
}
