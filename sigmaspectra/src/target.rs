//! Module containing [`TargetSpectrum`], the median and dispersion targets.

use crate::error::{Error, Result};
use crate::interpolation::CubicSpline;
use serde::{Deserialize, Serialize};

/// Spacing of the working period grid.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum PeriodSpacing {
    /// Equal steps in period.
    Linear,
    /// Equal steps in `log10` of the period.
    Log,
}

/// Descriptor of the working grid the target is interpolated onto.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct InterpConfig {
    /// Spacing of the grid points.
    pub spacing: PeriodSpacing,
    /// Shortest period of the grid in seconds.
    pub period_min: f64,
    /// Longest period of the grid in seconds.
    pub period_max: f64,
    /// Number of grid points.
    pub count: usize,
}

/// Working period grid with `count` points between `min` and `max`.
#[must_use]
pub fn period_grid(spacing: PeriodSpacing, min: f64, max: f64, count: usize) -> Vec<f64> {
    let steps = crate::convert::f64_from_usize(count - 1);

    match spacing {
        PeriodSpacing::Linear => {
            let delta = (max - min) / steps;
            (0..count)
                .map(|i| crate::convert::f64_from_usize(i).mul_add(delta, min))
                .collect()
        }
        PeriodSpacing::Log => {
            let log_min = min.log10();
            let delta = (max.log10() - log_min) / steps;
            (0..count)
                .map(|i| 10.0_f64.powf(crate::convert::f64_from_usize(i).mul_add(delta, log_min)))
                .collect()
        }
    }
}

/// The target spectrum: median spectral acceleration and logarithmic standard
/// deviation by period, optionally interpolated onto a working grid.
#[derive(Clone, Debug)]
pub struct TargetSpectrum {
    input_period: Vec<f64>,
    input_sa: Vec<f64>,
    input_ln_std: Vec<f64>,
    period: Vec<f64>,
    sa: Vec<f64>,
    ln_sa: Vec<f64>,
    ln_std: Vec<f64>,
}

impl TargetSpectrum {
    /// Build a target spectrum from `(period, sa, ln_std)` columns. With an
    /// [`InterpConfig`] the columns are interpolated onto the working grid by
    /// natural cubic splines; without one the working values equal the
    /// inputs.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::InvalidInput`] when the table is empty, the
    /// periods are not strictly increasing, a standard deviation is negative,
    /// a spectral acceleration is not positive, fewer than 50 interpolation
    /// points are requested, the grid bounds are inverted, log spacing is
    /// asked to reach zero period, or the grid extrapolates beyond the input.
    pub fn new(
        period: Vec<f64>,
        sa: Vec<f64>,
        ln_std: Vec<f64>,
        interp: Option<InterpConfig>,
    ) -> Result<Self> {
        validate(&period, &sa, &ln_std, interp.as_ref())?;

        let (grid, target_sa, target_ln_std) = if let Some(config) = interp {
            let grid = period_grid(
                config.spacing,
                config.period_min,
                config.period_max,
                config.count,
            );

            let sa_spline = CubicSpline::new(&period, &sa)?;
            let ln_std_spline = CubicSpline::new(&period, &ln_std)?;

            let target_sa = grid
                .iter()
                .map(|&t| sa_spline.eval(t))
                .collect::<Result<Vec<f64>>>()?;
            let target_ln_std = grid
                .iter()
                .map(|&t| ln_std_spline.eval(t))
                .collect::<Result<Vec<f64>>>()?;

            (grid, target_sa, target_ln_std)
        } else {
            (period.clone(), sa.clone(), ln_std.clone())
        };

        let ln_sa = target_sa.iter().map(|&value| value.ln()).collect();

        Ok(Self {
            input_period: period,
            input_sa: sa,
            input_ln_std: ln_std,
            period: grid,
            sa: target_sa,
            ln_sa,
            ln_std: target_ln_std,
        })
    }

    /// Periods of the input table in seconds.
    #[must_use]
    pub fn input_period(&self) -> &[f64] {
        &self.input_period
    }

    /// Median spectral accelerations of the input table in g.
    #[must_use]
    pub fn input_sa(&self) -> &[f64] {
        &self.input_sa
    }

    /// Logarithmic standard deviations of the input table.
    #[must_use]
    pub fn input_ln_std(&self) -> &[f64] {
        &self.input_ln_std
    }

    /// Working period grid in seconds.
    #[must_use]
    pub fn period(&self) -> &[f64] {
        &self.period
    }

    /// Median target spectral acceleration on the working grid, in g.
    #[must_use]
    pub fn sa(&self) -> &[f64] {
        &self.sa
    }

    /// Natural logarithm of [`TargetSpectrum::sa`].
    #[must_use]
    pub fn ln_sa(&self) -> &[f64] {
        &self.ln_sa
    }

    /// Target logarithmic standard deviation on the working grid.
    #[must_use]
    pub fn ln_std(&self) -> &[f64] {
        &self.ln_std
    }
}

fn validate(
    period: &[f64],
    sa: &[f64],
    ln_std: &[f64],
    interp: Option<&InterpConfig>,
) -> Result<()> {
    let invalid = |reason: String| Err(Error::InvalidInput(reason));

    if period.is_empty() {
        return invalid("no target spectrum specified".to_owned());
    }
    if period.len() != sa.len() || period.len() != ln_std.len() {
        return invalid(format!(
            "target columns must have equal lengths, got {}, {} and {}",
            period.len(),
            sa.len(),
            ln_std.len()
        ));
    }
    if period.windows(2).any(|w| w[1] <= w[0]) {
        return invalid("target periods must be strictly increasing".to_owned());
    }
    if ln_std.iter().any(|&value| value < 0.0) {
        return invalid("target standard deviations must not be negative".to_owned());
    }
    if sa.iter().any(|&value| value <= 0.0) {
        return invalid("target spectral accelerations must be positive".to_owned());
    }

    if let Some(config) = interp {
        if config.count < 50 {
            return invalid(format!(
                "at least 50 interpolated periods are needed, got {}",
                config.count
            ));
        }
        if config.period_min > config.period_max {
            return invalid("the shortest period must not exceed the longest".to_owned());
        }
        if config.spacing == PeriodSpacing::Log && config.period_min <= 0.0 {
            return invalid(
                "log spacing needs a positive shortest period".to_owned(),
            );
        }
        if config.spacing == PeriodSpacing::Log && period[0] <= 0.0 {
            return invalid(
                "log spacing needs positive target periods".to_owned(),
            );
        }
        if period[0] > config.period_min {
            return invalid(format!(
                "the grid starts at {} but the target only reaches down to {}",
                config.period_min, period[0]
            ));
        }
        if period[period.len() - 1] < config.period_max {
            return invalid(format!(
                "the grid ends at {} but the target only reaches up to {}",
                config.period_max,
                period[period.len() - 1]
            ));
        }
    }

    Ok(())
}
