//! Radix-2 real Fourier transforms in the half-complex convention.
//!
//! The forward transform zero-pads its input to the next power of two and
//! returns the lower half of the spectrum packed into `n/2` complex bins: the
//! first bin carries the real DC component, the last bin carries the real
//! Nyquist component, and every bin in between holds the complex amplitude at
//! its frequency. The inverse accepts the same packing and reconstructs `2 *
//! len` real samples.

use num_complex::Complex64;
use std::f64::consts::PI;

/// Smallest power of two greater than or equal to `min`.
#[must_use]
pub const fn next_pow2(min: usize) -> usize {
    let mut n = 1;
    while n < min {
        n <<= 1;
    }
    n
}

/// In-place iterative Cooley-Tukey transform. `data` must have a power-of-two
/// length. The forward direction uses the `exp(-2 pi i j k / n)` kernel; the
/// inverse is unnormalized.
fn transform(data: &mut [Complex64], inverse: bool) {
    let n = data.len();

    // bit-reversal permutation
    let mut j = 0;
    for i in 1..n {
        let mut bit = n >> 1;
        while j & bit != 0 {
            j ^= bit;
            bit >>= 1;
        }
        j |= bit;
        if i < j {
            data.swap(i, j);
        }
    }

    let sign = if inverse { 1.0 } else { -1.0 };
    let mut len = 2;
    while len <= n {
        let angle = sign * 2.0 * PI / crate::convert::f64_from_usize(len);
        let w_len = Complex64::new(angle.cos(), angle.sin());
        for start in (0..n).step_by(len) {
            let mut w = Complex64::new(1.0, 0.0);
            for k in start..start + len / 2 {
                let u = data[k];
                let v = data[k + len / 2] * w;
                data[k] = u + v;
                data[k + len / 2] = u - v;
                w *= w_len;
            }
        }
        len <<= 1;
    }
}

/// Forward transform of a real signal.
///
/// The signal is zero-padded to the smallest power of two `n` strictly greater
/// than its length, and the returned array has `n / 2` entries in the packing
/// described in the module documentation.
#[must_use]
pub fn fft(ts: &[f64]) -> Vec<Complex64> {
    let n = next_pow2(ts.len() + 1);
    let mut buf = vec![Complex64::new(0.0, 0.0); n];
    for (slot, &x) in buf.iter_mut().zip(ts) {
        *slot = Complex64::new(x, 0.0);
    }

    transform(&mut buf, false);

    let half = n / 2;
    let mut fas = vec![Complex64::new(0.0, 0.0); half];
    fas[0] = Complex64::new(buf[0].re, 0.0);
    if half > 1 {
        fas[1..half - 1].copy_from_slice(&buf[1..half - 1]);
        fas[half - 1] = Complex64::new(buf[half].re, 0.0);
    }

    fas
}

/// Inverse transform of a packed half spectrum, reconstructing `2 * fas.len()`
/// real samples with `1/n` normalization.
#[must_use]
pub fn ifft(fas: &[Complex64]) -> Vec<f64> {
    let n = 2 * fas.len();
    let mut buf = vec![Complex64::new(0.0, 0.0); n];

    buf[0] = Complex64::new(fas[0].re, 0.0);
    for (i, &x) in fas.iter().enumerate().take(fas.len() - 1).skip(1) {
        buf[i] = x;
        buf[n - i] = x.conj();
    }
    buf[n / 2] = Complex64::new(fas[fas.len() - 1].re, 0.0);

    transform(&mut buf, true);

    let scale = crate::convert::f64_from_usize(n).recip();
    buf.iter().map(|x| x.re * scale).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    // O(n^2) reference transform
    fn direct_dft(ts: &[f64], n: usize) -> Vec<Complex64> {
        (0..n)
            .map(|k| {
                ts.iter()
                    .enumerate()
                    .map(|(j, &x)| {
                        let angle = -2.0 * PI * (j * k) as f64 / n as f64;
                        x * Complex64::new(angle.cos(), angle.sin())
                    })
                    .sum()
            })
            .collect()
    }

    #[test]
    fn next_pow2_bounds() {
        assert_eq!(next_pow2(0), 1);
        assert_eq!(next_pow2(1), 1);
        assert_eq!(next_pow2(2), 2);
        assert_eq!(next_pow2(3), 4);
        assert_eq!(next_pow2(1023), 1024);
        assert_eq!(next_pow2(1024), 1024);
    }

    #[test]
    fn fft_matches_direct_dft() {
        let ts: Vec<f64> = (0..20)
            .map(|i| {
                let t = f64::from(i) * 0.3;
                t.sin() + 0.5 * (2.7 * t).cos()
            })
            .collect();

        // 20 samples pad to 32
        let fas = fft(&ts);
        assert_eq!(fas.len(), 16);

        let reference = direct_dft(&ts, 32);

        assert_approx_eq!(f64, fas[0].re, reference[0].re, epsilon = 1e-10);
        assert_approx_eq!(f64, fas[0].im, 0.0, epsilon = 1e-10);
        for i in 1..15 {
            assert_approx_eq!(f64, fas[i].re, reference[i].re, epsilon = 1e-10);
            assert_approx_eq!(f64, fas[i].im, reference[i].im, epsilon = 1e-10);
        }
        // the last packed bin carries the Nyquist amplitude
        assert_approx_eq!(f64, fas[15].re, reference[16].re, epsilon = 1e-10);
        assert_approx_eq!(f64, fas[15].im, 0.0, epsilon = 1e-10);
    }

    #[test]
    fn round_trip_recovers_band_limited_signal() {
        // a centered Gaussian pulse has no energy near the Nyquist frequency,
        // so the packing loses nothing measurable
        let ts: Vec<f64> = (0..100)
            .map(|i| (-((f64::from(i) - 50.0) / 6.0).powi(2) / 2.0).exp())
            .collect();

        let fas = fft(&ts);
        let recovered = ifft(&fas);

        assert_eq!(recovered.len(), 128);
        for (i, &x) in ts.iter().enumerate() {
            assert!((recovered[i] - x).abs() < 1e-10, "sample {i}");
        }
        for &x in &recovered[100..] {
            assert!(x.abs() < 1e-10);
        }
    }

    #[test]
    fn ifft_of_single_bin_is_a_cosine() {
        // a unit amplitude in bin 3 of a 16-bin packing inverts to
        // cos(2 pi 3 j / 32) scaled by 2/n from the conjugate pair
        let mut fas = vec![Complex64::new(0.0, 0.0); 16];
        fas[3] = Complex64::new(16.0, 0.0);

        let ts = ifft(&fas);

        assert_eq!(ts.len(), 32);
        for (j, &x) in ts.iter().enumerate() {
            let expected = (2.0 * PI * 3.0 * j as f64 / 32.0).cos();
            assert_approx_eq!(f64, x, expected, epsilon = 1e-12);
        }
    }
}
