//! Module containing [`Suite`], a growing or finished set of motions.

use crate::convert;
use crate::motion::{Flag, Motion, MotionEnum};
use crate::stats;
use crate::target::TargetSpectrum;
use itertools::izip;
use serde::Serialize;

/// An ordered set of motions selected from the library, together with its
/// running log-mean spectrum, per-motion scalars and error measures.
///
/// Suites do not own motions; they hold indices into the library's motion
/// table.
#[derive(Clone, Debug, Serialize)]
pub struct Suite {
    members: Vec<usize>,
    ln_avg: Vec<f64>,
    scalars: Vec<f64>,
    ln_std: Vec<f64>,
    median_rmse: f64,
    median_max_pct: f64,
    stdev_rmse: f64,
    sigma_inf: f64,
    rank: usize,
    enabled: bool,
}

impl Default for Suite {
    fn default() -> Self {
        Self::new()
    }
}

impl Suite {
    /// An empty suite with unset error measures.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            members: Vec::new(),
            ln_avg: Vec::new(),
            scalars: Vec::new(),
            ln_std: Vec::new(),
            median_rmse: -1.0,
            median_max_pct: -1.0,
            stdev_rmse: -1.0,
            sigma_inf: -1.0,
            rank: 0,
            enabled: false,
        }
    }

    /// Indices of the member motions in the library table.
    #[must_use]
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    /// Number of member motions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the suite has no members yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Per-motion scale factors, parallel to [`Suite::members`].
    #[must_use]
    pub fn scalars(&self) -> &[f64] {
        &self.scalars
    }

    /// Running mean of the members' log-spectra.
    #[must_use]
    pub fn ln_avg(&self) -> &[f64] {
        &self.ln_avg
    }

    /// Realized logarithmic standard deviation of the scaled suite.
    #[must_use]
    pub fn ln_std(&self) -> &[f64] {
        &self.ln_std
    }

    /// Root-mean-square error of the suite median against the target median,
    /// in log space under the optimal vertical shift.
    #[must_use]
    pub const fn median_rmse(&self) -> f64 {
        self.median_rmse
    }

    /// Largest percent error of the shifted suite median against the target.
    #[must_use]
    pub const fn median_max_pct(&self) -> f64 {
        self.median_max_pct
    }

    /// Root-mean-square error of the realized standard deviation against the
    /// target standard deviation.
    #[must_use]
    pub const fn stdev_rmse(&self) -> f64 {
        self.stdev_rmse
    }

    /// σ-inflation factor chosen by [`Suite::compute_scalars`].
    #[must_use]
    pub const fn sigma_inf(&self) -> f64 {
        self.sigma_inf
    }

    /// Position of this suite in the ranked results, starting at 1.
    #[must_use]
    pub const fn rank(&self) -> usize {
        self.rank
    }

    /// Set the rank hint.
    pub fn set_rank(&mut self, rank: usize) {
        self.rank = rank;
    }

    /// Whether a caller marked this suite for export.
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    /// Set the export mark.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// One-line summary of the error measures.
    #[must_use]
    pub fn error_text(&self) -> String {
        format!(
            "Median RMSE: {:6.4}   Max Error: {:6.4}%   Std RMSE: {:6.4}   Sigma Inf: {:5.3}",
            self.median_rmse, self.median_max_pct, self.stdev_rmse, self.sigma_inf
        )
    }

    /// Whether `other` selects exactly the same motions, in any order.
    #[must_use]
    pub fn same_members(&self, other: &Self) -> bool {
        if self.members.len() != other.members.len() {
            return false;
        }

        let mut mine = self.members.clone();
        let mut theirs = other.members.clone();
        mine.sort_unstable();
        theirs.sort_unstable();

        mine == theirs
    }

    /// The median error the suite would have after appending `motion`,
    /// without appending it.
    #[must_use]
    pub fn check_motion(&self, motion: &MotionEnum, target: &TargetSpectrum) -> f64 {
        let n = convert::f64_from_usize(self.members.len() + 1);
        let blended: Vec<f64> = self
            .ln_avg
            .iter()
            .zip(motion.ln_sa())
            .map(|(&avg, &value)| avg * (n - 1.0) / n + value / n)
            .collect();

        shifted_rmse(&blended, target.ln_sa())
    }

    /// Append the motion at `index` and update the running mean and the
    /// median error.
    pub fn add_motion(&mut self, index: usize, motions: &[MotionEnum], target: &TargetSpectrum) {
        self.members.push(index);

        let ln_sa = motions[index].ln_sa();
        if self.members.len() > 1 {
            let n = convert::f64_from_usize(self.members.len());
            for (avg, &value) in self.ln_avg.iter_mut().zip(ln_sa) {
                *avg = *avg * (n - 1.0) / n + value / n;
            }
        } else {
            self.ln_avg = ln_sa.to_vec();
        }

        let (rmse, max_pct) = shifted_rmse_with_max(&self.ln_avg, target.ln_sa());
        self.median_rmse = rmse;
        self.median_max_pct = max_pct;
    }

    /// Whether the motion at `candidate` may join this suite: it must not be
    /// disabled, not already be a member, and under `one_per_station` not
    /// share a station with any member.
    #[must_use]
    pub fn is_motion_addable(
        &self,
        one_per_station: bool,
        motions: &[MotionEnum],
        candidate: usize,
    ) -> bool {
        if motions[candidate].flag() == Flag::Disabled {
            return false;
        }

        for &member in &self.members {
            if member == candidate {
                return false;
            }
            if one_per_station && motions[member].station() == motions[candidate].station() {
                return false;
            }
        }

        true
    }

    /// Whether a finished suite satisfies all constraints: full size, enough
    /// requested motions, every required motion present, and the pairwise
    /// membership rules.
    #[must_use]
    pub fn is_valid(
        &self,
        suite_size: usize,
        min_requested: usize,
        required: &[usize],
        one_per_station: bool,
        motions: &[MotionEnum],
    ) -> bool {
        if self.members.len() != suite_size {
            return false;
        }

        let requested = self
            .members
            .iter()
            .filter(|&&member| motions[member].flag() == Flag::Requested)
            .count();
        if requested < min_requested {
            return false;
        }

        if required
            .iter()
            .any(|required| !self.members.contains(required))
        {
            return false;
        }

        for (position, &member) in self.members.iter().enumerate() {
            if motions[member].flag() == Flag::Disabled {
                return false;
            }
            for (other_position, &other) in self.members.iter().enumerate() {
                if position == other_position {
                    continue;
                }
                if member == other {
                    return false;
                }
                if one_per_station && motions[member].station() == motions[other].station() {
                    return false;
                }
            }
        }

        true
    }

    /// Assign a scale factor to every member so the realized logarithmic
    /// standard deviation best matches the target.
    ///
    /// The members are ordered by their average log-spectrum and mapped to
    /// the centroids of the standard-normal probability slices; a global
    /// σ-inflation factor is line searched over 0.10 to 2.99 unless the
    /// target dispersion is zero anywhere, in which case it is pinned to 1.
    /// Afterwards members and scalars are re-ordered alphabetically by name
    /// for stable output.
    pub fn compute_scalars(&mut self, motions: &[MotionEnum], target: &TargetSpectrum) {
        self.members
            .sort_by(|&a, &b| motions[a].avg_ln_sa().total_cmp(&motions[b].avg_ln_sa()));

        let centroids = stats::normal_slice_centroids(self.members.len());

        let zero_sigma = target.ln_std().iter().any(|&value| value == 0.0);
        let sigma_inf = if zero_sigma {
            1.0
        } else {
            let mut min_error = 100.0;
            let mut best = -1.0;
            for step in 0..290 {
                let scale = convert::f64_from_usize(step).mul_add(0.01, 0.10);
                let error = self.apply_sigma(scale, &centroids, motions, target);
                if error < min_error {
                    min_error = error;
                    best = scale;
                }
            }
            best
        };

        self.sigma_inf = sigma_inf;
        self.stdev_rmse = self.apply_sigma(sigma_inf, &centroids, motions, target);

        let mut by_name: Vec<(String, usize, f64)> = self
            .members
            .iter()
            .zip(&self.scalars)
            .map(|(&member, &scalar)| (motions[member].name(), member, scalar))
            .collect();
        by_name.sort_by(|a, b| a.0.cmp(&b.0));

        self.members = by_name.iter().map(|entry| entry.1).collect();
        self.scalars = by_name.iter().map(|entry| entry.2).collect();
    }

    /// Scale every member motion by its scalar.
    pub fn scale_motions(&self, motions: &mut [MotionEnum]) {
        for (&member, &scalar) in self.members.iter().zip(&self.scalars) {
            motions[member].scale_by(scalar);
        }
    }

    /// Scale each member to its fractile under `sigma_inf`, recompute the
    /// suite mean and standard deviation, and return the RMSE of the
    /// standard deviation against the target.
    fn apply_sigma(
        &mut self,
        sigma_inf: f64,
        centroids: &[f64],
        motions: &[MotionEnum],
        target: &TargetSpectrum,
    ) -> f64 {
        let periods = convert::f64_from_usize(target.ln_std().len());

        self.scalars = self
            .members
            .iter()
            .zip(centroids)
            .map(|(&member, &centroid)| {
                let sum: f64 = izip!(target.ln_sa(), target.ln_std(), motions[member].ln_sa())
                    .map(|(&ln_sa, &ln_std, &value)| {
                        sigma_inf.mul_add(ln_std * centroid, ln_sa) - value
                    })
                    .sum();
                (sum / periods).exp()
            })
            .collect();

        let count = convert::f64_from_usize(self.members.len());
        let members = &self.members;
        let scalars = &self.scalars;

        self.ln_avg = (0..target.ln_std().len())
            .map(|j| {
                members
                    .iter()
                    .zip(scalars)
                    .map(|(&member, &scalar)| motions[member].ln_sa()[j] + scalar.ln())
                    .sum::<f64>()
                    / count
            })
            .collect();

        let denominator = convert::f64_from_usize(self.members.len() - 1);
        let mut sse = 0.0;
        self.ln_std = (0..target.ln_std().len())
            .map(|j| {
                let variance = members
                    .iter()
                    .zip(scalars)
                    .map(|(&member, &scalar)| {
                        (motions[member].ln_sa()[j] + scalar.ln() - self.ln_avg[j]).powi(2)
                    })
                    .sum::<f64>()
                    / denominator;
                let ln_std = variance.sqrt();
                sse += (ln_std - target.ln_std()[j]).powi(2);
                ln_std
            })
            .collect();

        (sse / periods).sqrt()
    }
}

/// Root-mean-square difference between `vec` and `reference` under the
/// optimal additive shift (the log of the optimal scale factor in linear
/// space).
fn shifted_rmse(vec: &[f64], reference: &[f64]) -> f64 {
    let count = convert::f64_from_usize(vec.len());
    let shift = vec
        .iter()
        .zip(reference)
        .map(|(&value, &reference)| reference - value)
        .sum::<f64>()
        / count;

    let sse: f64 = vec
        .iter()
        .zip(reference)
        .map(|(&value, &reference)| (shift + value - reference).powi(2))
        .sum();

    (sse / count).sqrt()
}

/// Like [`shifted_rmse`], also returning the largest percent error of the
/// shifted curve in linear space.
fn shifted_rmse_with_max(vec: &[f64], reference: &[f64]) -> (f64, f64) {
    let count = convert::f64_from_usize(vec.len());
    let shift = vec
        .iter()
        .zip(reference)
        .map(|(&value, &reference)| reference - value)
        .sum::<f64>()
        / count;

    let mut sse = 0.0;
    let mut max_pct = -1.0_f64;
    for (&value, &reference) in vec.iter().zip(reference) {
        sse += (shift + value - reference).powi(2);
        let pct = 100.0 * ((shift + value).exp() - reference.exp()).abs() / reference.exp();
        max_pct = max_pct.max(pct);
    }

    ((sse / count).sqrt(), max_pct)
}
