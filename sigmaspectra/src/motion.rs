//! Module containing the [`Motion`] trait and supporting types.

use crate::pair::Pair;
use crate::record::Record;
use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};

/// Selection state of a motion within the library.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum Flag {
    /// Motion that must be part of every suite.
    Required,
    /// Motion that suites are asked to favor.
    Requested,
    /// Default state.
    #[default]
    Unmarked,
    /// Motion excluded from the search.
    Disabled,
}

/// Spectral discretization shared by every motion in a library.
///
/// This value replaces process-wide state: it is owned by the library and
/// threaded through record construction so that all response spectra share one
/// period grid and damping.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SpectrumConfig {
    /// Oscillator periods in seconds, strictly increasing and positive.
    pub period: Vec<f64>,
    /// Fractional critical damping of the oscillator (0.05 for 5%).
    pub damping: f64,
}

/// Capabilities shared by the selectable motion units.
#[enum_dispatch]
pub trait Motion {
    /// Display name, `<event>/<station><component>` when the identity is
    /// known.
    fn name(&self) -> String;

    /// Earthquake event identifier.
    fn event(&self) -> &str;

    /// Recording station identifier.
    fn station(&self) -> &str;

    /// Number of acceleration components backing this unit.
    fn component_count(&self) -> usize;

    /// Spectral acceleration on the shared period grid, in g.
    fn sa(&self) -> &[f64];

    /// Natural logarithm of [`Motion::sa`].
    fn ln_sa(&self) -> &[f64];

    /// Arithmetic mean of [`Motion::ln_sa`] over all periods.
    fn avg_ln_sa(&self) -> f64;

    /// Selection flag.
    fn flag(&self) -> Flag;

    /// Change the selection flag.
    fn set_flag(&mut self, flag: Flag);

    /// Scale the motion by `factor` relative to its *unscaled* state.
    ///
    /// Repeated calls are idempotent in net effect: `scale_by(a)` followed by
    /// `scale_by(b)` leaves the motion scaled by `b`, and `scale_by(1.0)`
    /// restores the as-loaded amplitudes.
    fn scale_by(&mut self, factor: f64);
}

/// Enum which lists all selectable motion units.
#[enum_dispatch(Motion)]
#[derive(Clone, Debug)]
pub enum MotionEnum {
    /// A single recorded component.
    Record,
    /// Two components of one event and station combined by their geometric
    /// mean.
    Pair,
}

/// Shared `scale_by` bookkeeping for the spectral quantities of a motion.
pub(crate) fn scale_spectrum(
    sa: &mut [f64],
    ln_sa: &mut [f64],
    avg_ln_sa: &mut f64,
    prev_scale: &mut f64,
    factor: f64,
) {
    let rel_scale = factor / *prev_scale;
    *prev_scale = factor;

    let ln_rel_scale = rel_scale.ln();

    for (sa, ln_sa) in sa.iter_mut().zip(ln_sa) {
        *sa *= rel_scale;
        *ln_sa += ln_rel_scale;
    }

    *avg_ln_sa += ln_rel_scale;
}
