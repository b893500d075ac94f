//! The combinatorial seed-plus-greedy-growth suite search.

use crate::convert;
use crate::error::{Error, Result};
use crate::motion::{Flag, Motion, MotionEnum};
use crate::stats;
use crate::suite::Suite;
use crate::target::TargetSpectrum;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Parameters of the suite search.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct SearchParams {
    /// Number of motions in each enumerated seed combination.
    pub seed_size: usize,
    /// Number of motions in a finished suite.
    pub suite_size: usize,
    /// Number of best suites to keep.
    pub suite_count: usize,
    /// Minimum number of motions flagged `Requested` each suite must hold.
    pub min_requested: usize,
    /// Whether a suite may use at most one motion per station.
    pub one_per_station: bool,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            seed_size: 2,
            suite_size: 7,
            suite_count: 10,
            min_requested: 0,
            one_per_station: true,
        }
    }
}

/// Cooperative cancellation token checked between seed trials and between
/// growth steps.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A token in the not-cancelled state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// A progress notification handed to the search callback.
#[derive(Clone, Copy, Debug)]
pub struct ProgressUpdate<'a> {
    /// Completed share of the seed space, 0 to 100.
    pub percent: u8,
    /// Estimated remaining wall time.
    pub eta: Duration,
    /// Human-readable log line; empty on plain percent ticks.
    pub log_line: &'a str,
}

/// Enumerate all seed combinations over `motions`, grow each seed greedily to
/// the full suite size and return the best suites ranked by median error,
/// with their scalars computed.
///
/// Seeds are processed in lexicographic order and growth ties break towards
/// the lowest motion index, so identical inputs yield identical results.
///
/// # Errors
///
/// Fails with [`Error::InvalidInput`] for out-of-range parameters,
/// [`Error::Cancelled`] when `cancel` is triggered, and
/// [`Error::NoSuitesFound`] when the enumeration completes without a single
/// valid suite.
pub fn search(
    motions: &[MotionEnum],
    target: &TargetSpectrum,
    params: &SearchParams,
    cancel: &CancelToken,
    progress: &mut dyn FnMut(ProgressUpdate),
) -> Result<Vec<Suite>> {
    validate_params(params, motions.len())?;

    let required: Vec<usize> = motions
        .iter()
        .enumerate()
        .filter(|(_, motion)| motion.flag() == Flag::Required)
        .map(|(index, _)| index)
        .collect();
    let disabled = motions
        .iter()
        .filter(|motion| motion.flag() == Flag::Disabled)
        .count();

    let seed_total = seed_count(motions.len(), disabled, params.seed_size);

    let mut best: Vec<Suite> = Vec::new();
    let mut enumerator = SeedEnumerator::new(params.seed_size, motions.len());
    let timer = Instant::now();
    let mut count: u64 = 0;
    let mut next_percent = 1;

    progress(ProgressUpdate {
        percent: 0,
        eta: Duration::ZERO,
        log_line: "Selecting suites",
    });

    loop {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let seed = enumerator.current();
        if seed
            .iter()
            .all(|&index| motions[index].flag() != Flag::Disabled)
        {
            let mut suite = Suite::new();
            for &index in seed {
                suite.add_motion(index, motions, target);
            }

            if let Some(suite) = grow(suite, motions, target, params, cancel)? {
                if suite.is_valid(
                    params.suite_size,
                    params.min_requested,
                    &required,
                    params.one_per_station,
                    motions,
                ) {
                    insert_best(&mut best, suite, params.suite_count);
                }
            }

            count += 1;
            let percent = percent_complete(count, seed_total);
            if percent >= next_percent {
                progress(ProgressUpdate {
                    percent,
                    eta: estimate_remaining(timer.elapsed(), percent),
                    log_line: "",
                });
                next_percent = percent + 1;
            }
        }

        if !enumerator.advance() {
            break;
        }
    }

    progress(ProgressUpdate {
        percent: 100,
        eta: Duration::ZERO,
        log_line: "",
    });

    if best.is_empty() {
        return Err(Error::NoSuitesFound);
    }

    best.sort_by(|a, b| a.median_rmse().total_cmp(&b.median_rmse()));

    let total = best.len();
    for (position, suite) in best.iter_mut().enumerate() {
        suite.compute_scalars(motions, target);
        suite.set_rank(position + 1);
        progress(ProgressUpdate {
            percent: 100,
            eta: Duration::ZERO,
            log_line: &format!("[{}/{}] {}", position + 1, total, suite.error_text()),
        });
    }

    Ok(best)
}

/// Greedily append the candidate that most lowers the median error until the
/// suite is full. Returns `None` when no candidate can be added.
fn grow(
    mut suite: Suite,
    motions: &[MotionEnum],
    target: &TargetSpectrum,
    params: &SearchParams,
    cancel: &CancelToken,
) -> Result<Option<Suite>> {
    while suite.len() < params.suite_size {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let mut min_error = 100.0;
        let mut min_index = None;
        for (index, motion) in motions.iter().enumerate() {
            if !suite.is_motion_addable(params.one_per_station, motions, index) {
                continue;
            }

            // the strict comparison breaks ties towards the lowest index
            let error = suite.check_motion(motion, target);
            if error < min_error {
                min_error = error;
                min_index = Some(index);
            }
        }

        match min_index {
            Some(index) => suite.add_motion(index, motions, target),
            None => return Ok(None),
        }
    }

    Ok(Some(suite))
}

/// Keep at most `capacity` suites: duplicates are discarded, and once the set
/// is full a candidate replaces the stored suite with the largest median
/// error if it improves on it.
fn insert_best(best: &mut Vec<Suite>, suite: Suite, capacity: usize) {
    if best.iter().any(|stored| stored.same_members(&suite)) {
        return;
    }

    if best.len() < capacity {
        best.push(suite);
    } else {
        let worst = position_of_worst(best);
        if suite.median_rmse() < best[worst].median_rmse() {
            best[worst] = suite;
        }
    }
}

fn position_of_worst(best: &[Suite]) -> usize {
    let mut worst = 0;
    for (position, suite) in best.iter().enumerate().skip(1) {
        if suite.median_rmse() > best[worst].median_rmse() {
            worst = position;
        }
    }
    worst
}

/// Lexicographic enumeration of `k`-combinations of `0..n`.
struct SeedEnumerator {
    seed: Vec<usize>,
    n: usize,
}

impl SeedEnumerator {
    fn new(k: usize, n: usize) -> Self {
        Self {
            seed: (0..k).collect(),
            n,
        }
    }

    fn current(&self) -> &[usize] {
        &self.seed
    }

    /// Step to the next combination; false once the last one was reached.
    fn advance(&mut self) -> bool {
        let k = self.seed.len();
        if self.seed[0] == self.n - k {
            return false;
        }

        for i in (0..k).rev() {
            if self.seed[i] < self.n - k + i {
                self.seed[i] += 1;
                for j in i + 1..k {
                    self.seed[j] = self.seed[j - 1] + 1;
                }
                return true;
            }
        }

        false
    }
}

fn validate_params(params: &SearchParams, candidate_count: usize) -> Result<()> {
    let invalid = |reason: &str| Err(Error::InvalidInput(reason.to_owned()));

    if params.seed_size < 1 {
        return invalid("the seed size must be at least 1");
    }
    if params.suite_count < 1 {
        return invalid("the number of suites to save must be at least 1");
    }
    if params.suite_size < 1 {
        return invalid("the number of motions in a suite must be at least 1");
    }
    if params.seed_size > params.suite_size {
        return invalid("the seed size cannot exceed the suite size");
    }
    if params.suite_size > candidate_count {
        return invalid("the suite size cannot exceed the number of candidate motions");
    }

    Ok(())
}

fn percent_complete(count: u64, total: f64) -> u8 {
    if total <= 0.0 {
        return 100;
    }

    #[allow(clippy::cast_precision_loss)]
    let percent = (100.0 * count as f64 / total).floor();
    if percent >= 100.0 {
        100
    } else {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            percent.max(0.0) as u8
        }
    }
}

fn estimate_remaining(elapsed: Duration, percent: u8) -> Duration {
    if percent == 0 {
        return Duration::ZERO;
    }

    elapsed.mul_f64(f64::from(100 - percent) / f64::from(percent))
}

/// Approximate number of seed combinations, `C(n - disabled, k)` by the
/// Ramanujan factorial. Used for percent and ETA math only.
#[must_use]
pub fn seed_count(motion_count: usize, disabled_count: usize, seed_size: usize) -> f64 {
    stats::binomial(motion_count.saturating_sub(disabled_count), seed_size)
}

/// Estimated number of candidate evaluations for a full search.
///
/// This is an informational upper bound: it accounts for neither the station
/// constraint nor the requested-motion minimum.
#[must_use]
pub fn trial_count(
    motion_count: usize,
    disabled_count: usize,
    seed_size: usize,
    suite_size: usize,
) -> f64 {
    if seed_size > suite_size || suite_size > motion_count {
        return 0.0;
    }

    let enabled = motion_count.saturating_sub(disabled_count);
    let growth: usize = (0..suite_size).map(|i| enabled.saturating_sub(i)).sum();
    let growth = if growth == 0 { 1 } else { growth };

    seed_count(motion_count, disabled_count, seed_size) * convert::f64_from_usize(growth)
}
