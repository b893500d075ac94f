//! Module containing [`Pair`], two components recorded at one station.

use crate::convert;
use crate::error::{Error, Result};
use crate::motion::{self, Flag, Motion};
use crate::record::Record;

/// Two components of one event and station, selected as a single unit.
///
/// The pair's spectrum is the geometric mean of the component spectra, which
/// is the arithmetic mean in log space. The pair exclusively owns its two
/// records.
#[derive(Clone, Debug)]
pub struct Pair {
    a: Record,
    b: Record,
    sa: Vec<f64>,
    ln_sa: Vec<f64>,
    avg_ln_sa: f64,
    prev_scale: f64,
    flag: Flag,
}

impl Pair {
    /// Combine two components into a pair.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::InvalidInput`] when the records do not share an
    /// event and station.
    pub fn new(a: Record, b: Record) -> Result<Self> {
        if !Self::is_pair(&a, &b) {
            return Err(Error::InvalidInput(format!(
                "'{}' and '{}' were not recorded at the same event and station",
                a.name(),
                b.name()
            )));
        }

        let ln_sa: Vec<f64> = a
            .ln_sa()
            .iter()
            .zip(b.ln_sa())
            .map(|(&x, &y)| (x + y) / 2.0)
            .collect();
        let sa: Vec<f64> = ln_sa.iter().map(|&value| value.exp()).collect();
        let avg_ln_sa = ln_sa.iter().sum::<f64>() / convert::f64_from_usize(ln_sa.len());

        Ok(Self {
            a,
            b,
            sa,
            ln_sa,
            avg_ln_sa,
            prev_scale: 1.0,
            flag: Flag::Unmarked,
        })
    }

    /// Whether two records come from the same event and station.
    #[must_use]
    pub fn is_pair(a: &Record, b: &Record) -> bool {
        a.event() == b.event() && a.station() == b.station()
    }

    /// First component.
    #[must_use]
    pub const fn first(&self) -> &Record {
        &self.a
    }

    /// Second component.
    #[must_use]
    pub const fn second(&self) -> &Record {
        &self.b
    }
}

impl Motion for Pair {
    fn name(&self) -> String {
        format!("{}/{}", self.a.event(), self.a.station())
    }

    fn event(&self) -> &str {
        self.a.event()
    }

    fn station(&self) -> &str {
        self.a.station()
    }

    fn component_count(&self) -> usize {
        2
    }

    fn sa(&self) -> &[f64] {
        &self.sa
    }

    fn ln_sa(&self) -> &[f64] {
        &self.ln_sa
    }

    fn avg_ln_sa(&self) -> f64 {
        self.avg_ln_sa
    }

    fn flag(&self) -> Flag {
        self.flag
    }

    fn set_flag(&mut self, flag: Flag) {
        self.flag = flag;
    }

    fn scale_by(&mut self, factor: f64) {
        self.a.scale_by(factor);
        self.b.scale_by(factor);

        motion::scale_spectrum(
            &mut self.sa,
            &mut self.ln_sa,
            &mut self.avg_ln_sa,
            &mut self.prev_scale,
            factor,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn pair_spectrum_is_the_geometric_mean() {
        let a = Record::synthetic("EVT", "STA", "000", vec![0.0, 1.0]);
        let b = Record::synthetic("EVT", "STA", "090", vec![2.0, 3.0]);
        let pair = Pair::new(a, b).unwrap();

        assert_eq!(pair.ln_sa(), &[1.0, 2.0]);
        assert_approx_eq!(f64, pair.sa()[0], 1.0_f64.exp(), epsilon = 1e-12);
        assert_approx_eq!(f64, pair.avg_ln_sa(), 1.5, ulps = 2);
        assert_eq!(pair.name(), "EVT/STA");
        assert_eq!(pair.component_count(), 2);
    }

    #[test]
    fn mismatched_stations_are_rejected() {
        let a = Record::synthetic("EVT", "STA", "000", vec![0.0]);
        let b = Record::synthetic("EVT", "STB", "090", vec![0.0]);

        assert!(Pair::new(a, b).is_err());
    }

    #[test]
    fn scaling_forwards_to_both_components() {
        let a = Record::synthetic("EVT", "STA", "000", vec![0.0, 1.0]);
        let b = Record::synthetic("EVT", "STA", "090", vec![2.0, 3.0]);
        let mut pair = Pair::new(a, b).unwrap();

        pair.scale_by(2.0);

        let ln2 = 2.0_f64.ln();
        assert_approx_eq!(f64, pair.ln_sa()[0], 1.0 + ln2, epsilon = 1e-12);
        assert_approx_eq!(f64, pair.first().ln_sa()[0], ln2, epsilon = 1e-12);
        assert_approx_eq!(f64, pair.second().ln_sa()[0], 2.0 + ln2, epsilon = 1e-12);

        pair.scale_by(1.0);
        assert_approx_eq!(f64, pair.ln_sa()[0], 1.0, epsilon = 1e-12);
        assert_approx_eq!(f64, pair.first().ln_sa()[0], 0.0, epsilon = 1e-12);
    }
}
