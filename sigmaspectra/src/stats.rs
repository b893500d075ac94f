//! Standard-normal helpers and combinatorial estimates.

use crate::convert;
use statrs::distribution::{ContinuousCDF, Normal};
use std::f64::consts::PI;

fn unit_normal() -> Normal {
    Normal::new(0.0, 1.0).unwrap()
}

/// Standard-normal cumulative distribution function.
#[must_use]
pub fn norm_cdf(x: f64) -> f64 {
    unit_normal().cdf(x)
}

/// Inverse of the standard-normal cumulative distribution function.
#[must_use]
pub fn norm_inv_cdf(p: f64) -> f64 {
    unit_normal().inverse_cdf(p)
}

/// Probability-weighted means of a standard normal variate over `m` ordered
/// probability slices.
///
/// The interior slice bounds are the uniform fractiles `i / m`; the outermost
/// bounds are trimmed to `1e-6` and `1 - 1e-6`. Each centroid is evaluated by
/// a 20-point trapezoid sum and normalized by the uniform slice probability.
#[must_use]
pub fn normal_slice_centroids(m: usize) -> Vec<f64> {
    const SLICES: usize = 20;
    const PROB_MIN: f64 = 1e-6;

    let d_prob = convert::f64_from_usize(m).recip();

    (0..m)
        .map(|i| {
            let prob_l = if i == 0 {
                PROB_MIN
            } else {
                convert::f64_from_usize(i) * d_prob
            };
            let prob_r = if i == m - 1 {
                1.0 - PROB_MIN
            } else {
                convert::f64_from_usize(i + 1) * d_prob
            };

            let x_l = norm_inv_cdf(prob_l);
            let x_r = norm_inv_cdf(prob_r);

            let du = (x_r - x_l) / convert::f64_from_usize(SLICES - 1);
            let mut moment = 0.0;
            for j in 0..SLICES - 1 {
                let u_l = x_l + convert::f64_from_usize(j) * du;
                let u_r = x_l + convert::f64_from_usize(j + 1) * du;
                moment += (norm_cdf(u_r) - norm_cdf(u_l)) * (u_l + u_r) / 2.0;
            }

            moment / d_prob
        })
        .collect()
}

/// Ramanujan's approximation of `ln(n!)`.
///
/// Accurate to a few parts in `1e6` already for single-digit `n`; used only
/// for the informational trial-count estimates.
#[must_use]
pub fn ln_factorial(n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }

    let n = convert::f64_from_usize(n);
    n.mul_add(n.ln(), -n) + (n * 2.0f64.mul_add(n, 1.0).mul_add(4.0 * n, 1.0)).ln() / 6.0
        + PI.ln() / 2.0
}

/// Approximate binomial coefficient `C(n, k)` built on [`ln_factorial`].
#[must_use]
pub fn binomial(n: usize, k: usize) -> f64 {
    if k > n {
        return 0.0;
    }

    (ln_factorial(n) - ln_factorial(k) - ln_factorial(n - k)).exp()
}
