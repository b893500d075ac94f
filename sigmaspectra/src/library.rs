//! Module containing [`MotionLibrary`], the owner of motions and the driver
//! of the search.

use crate::error::{Error, Result};
use crate::motion::{Flag, Motion, MotionEnum, SpectrumConfig};
use crate::pair::Pair;
use crate::record::Record;
use crate::search::{self, CancelToken, ProgressUpdate, SearchParams};
use crate::suite::Suite;
use crate::target::TargetSpectrum;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Owns the target spectrum, the shared spectral configuration and the motion
/// table, and drives the search over them.
///
/// The working period grid of the interpolated target becomes the period grid
/// of every loaded record, so suite errors compare like with like.
#[derive(Debug)]
pub struct MotionLibrary {
    config: SpectrumConfig,
    target: TargetSpectrum,
    motions: Vec<MotionEnum>,
    paired: bool,
}

impl MotionLibrary {
    /// Create a library around `target` with the fractional `damping`.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::InvalidInput`] when the damping or any target
    /// period is not positive.
    pub fn new(target: TargetSpectrum, damping: f64) -> Result<Self> {
        if damping <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "damping must be positive: {damping}"
            )));
        }
        if target.period().iter().any(|&period| period <= 0.0) {
            return Err(Error::InvalidInput(
                "response spectra need positive oscillator periods".to_owned(),
            ));
        }

        let config = SpectrumConfig {
            period: target.period().to_vec(),
            damping,
        };

        Ok(Self {
            config,
            target,
            motions: Vec::new(),
            paired: false,
        })
    }

    /// The spectral configuration shared by all motions.
    #[must_use]
    pub const fn config(&self) -> &SpectrumConfig {
        &self.config
    }

    /// The target spectrum.
    #[must_use]
    pub const fn target(&self) -> &TargetSpectrum {
        &self.target
    }

    /// The loaded motion table. Suites refer to motions by index into this
    /// slice.
    #[must_use]
    pub fn motions(&self) -> &[MotionEnum] {
        &self.motions
    }

    /// Mutable access to the motion table, for flagging and scaling.
    pub fn motions_mut(&mut self) -> &mut [MotionEnum] {
        &mut self.motions
    }

    /// Whether the library combines components into pairs.
    #[must_use]
    pub const fn paired(&self) -> bool {
        self.paired
    }

    /// Number of motions currently flagged `Disabled`.
    #[must_use]
    pub fn disabled_count(&self) -> usize {
        self.motions
            .iter()
            .filter(|motion| motion.flag() == Flag::Disabled)
            .count()
    }

    /// Append a motion built elsewhere. Its spectrum must live on this
    /// library's period grid.
    pub fn add_motion(&mut self, motion: MotionEnum) {
        self.motions.push(motion);
    }

    /// Walk `path` recursively and load every `.AT2`/`.at2` file, replacing
    /// the current table. Files that fail to parse are logged through
    /// `progress` and skipped. In `paired` mode components of one event and
    /// station are greedily matched; records without a partner are dropped
    /// with a warning.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Io`] when `path` cannot be walked at all.
    pub fn load_dir(
        &mut self,
        path: &Path,
        paired: bool,
        progress: &mut dyn FnMut(ProgressUpdate),
    ) -> Result<()> {
        self.paired = paired;
        self.motions.clear();

        let mut files: Vec<PathBuf> = Vec::new();
        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = entry.map_err(|err| Error::Io {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })?;
            if entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("at2"))
            {
                files.push(entry.into_path());
            }
        }

        let total = files.len().max(1);
        let mut records = Vec::new();
        for (processed, file) in files.iter().enumerate() {
            progress(ProgressUpdate {
                percent: percent_of(processed, total),
                eta: std::time::Duration::ZERO,
                log_line: &format!("Reading: {}", file.display()),
            });

            match Record::from_path(file, &self.config) {
                Ok(record) => records.push(record),
                Err(err) => progress(ProgressUpdate {
                    percent: percent_of(processed, total),
                    eta: std::time::Duration::ZERO,
                    log_line: &format!("[!] Skipping: {err}"),
                }),
            }
        }

        if paired {
            while !records.is_empty() {
                let first = records.remove(0);
                if let Some(position) = records
                    .iter()
                    .position(|candidate| Pair::is_pair(&first, candidate))
                {
                    let second = records.remove(position);
                    self.motions.push(Pair::new(first, second)?.into());
                } else {
                    progress(ProgressUpdate {
                        percent: 100,
                        eta: std::time::Duration::ZERO,
                        log_line: &format!("[!] Removing: {}, no pair found", first.name()),
                    });
                }
            }
        } else {
            self.motions.extend(records.into_iter().map(Into::into));
        }

        Ok(())
    }

    /// Reset every motion to its as-loaded amplitudes. Earlier exports may
    /// have scaled the motions in place.
    pub fn reset_scales(&mut self) {
        for motion in &mut self.motions {
            motion.scale_by(1.0);
        }
    }

    /// Run the full search and return the suites ranked by median error,
    /// scalars computed.
    ///
    /// # Errors
    ///
    /// Propagates validation failures, [`Error::Cancelled`] and
    /// [`Error::NoSuitesFound`] from the search engine.
    pub fn compute(
        &mut self,
        params: &SearchParams,
        cancel: &CancelToken,
        progress: &mut dyn FnMut(ProgressUpdate),
    ) -> Result<Vec<Suite>> {
        self.reset_scales();

        search::search(&self.motions, &self.target, params, cancel, progress)
    }
}

fn percent_of(processed: usize, total: usize) -> u8 {
    u8::try_from(100 * processed / total).unwrap_or(100)
}
