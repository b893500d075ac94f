//! Helpers over uniformly sampled time series.

/// Cumulative trapezoid integration of `f` sampled at `dt`, multiplied by
/// `scale`. The first value of the integral is zero.
#[must_use]
pub fn cumtrapz(f: &[f64], dt: f64, scale: f64) -> Vec<f64> {
    let mut g = vec![0.0; f.len()];

    for i in 1..f.len() {
        g[i] = g[i - 1] + scale * dt * (f[i] + f[i - 1]) / 2.0;
    }

    g
}

/// Largest absolute value of `v`, or zero when `v` is empty.
#[must_use]
pub fn max_abs(v: &[f64]) -> f64 {
    v.iter().fold(0.0_f64, |max, x| max.max(x.abs()))
}
