use super::helpers;
use super::{GlobalConfiguration, Subcommand};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum, ValueHint};
use itertools::Itertools;
use prettytable::{cell, row};
use sigmaspectra::library::MotionLibrary;
use sigmaspectra::motion::Motion;
use sigmaspectra::report::{self, OutputFormat};
use sigmaspectra::search::{CancelToken, ProgressUpdate, SearchParams, trial_count};
use sigmaspectra::target::{InterpConfig, PeriodSpacing, TargetSpectrum};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Clone, Copy, ValueEnum)]
enum Spacing {
    Linear,
    Log,
}

impl From<Spacing> for PeriodSpacing {
    fn from(spacing: Spacing) -> Self {
        match spacing {
            Spacing::Linear => Self::Linear,
            Spacing::Log => Self::Log,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Summary,
    Csv,
    Strata,
    Shake2000,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Summary => Self::Summary,
            Format::Csv => Self::Csv,
            Format::Strata => Self::Strata,
            Format::Shake2000 => Self::Shake2000,
        }
    }
}

/// Search a motion library for the suites that best match a target spectrum.
#[derive(Parser)]
pub struct Opts {
    /// Directory tree containing the AT2 motion files.
    #[arg(value_hint = ValueHint::DirPath)]
    motion_path: PathBuf,
    /// CSV table of `period,sa,ln_std` rows defining the target spectrum.
    #[arg(value_hint = ValueHint::FilePath)]
    target: PathBuf,
    /// Combine the two components of each station into a single unit.
    #[arg(long)]
    paired: bool,
    /// Number of motions in each seed combination.
    #[arg(default_value_t = 2, long)]
    seed_size: usize,
    /// Number of motions in each suite.
    #[arg(default_value_t = 7, long)]
    suite_size: usize,
    /// Number of best suites to keep.
    #[arg(default_value_t = 10, long)]
    suites: usize,
    /// Minimum number of requested motions each suite must contain.
    #[arg(default_value_t = 0, long)]
    min_requested: usize,
    /// Allow several motions recorded at the same station in one suite.
    #[arg(long)]
    multiple_per_station: bool,
    /// Oscillator damping in percent.
    #[arg(default_value_t = 5.0, long)]
    damping: f64,
    /// Use the target table as-is instead of interpolating onto a grid.
    #[arg(long)]
    no_interp: bool,
    /// Number of interpolated periods.
    #[arg(default_value_t = 100, long)]
    periods: usize,
    /// Shortest period of the interpolated grid in seconds.
    #[arg(default_value_t = 0.01, long)]
    period_min: f64,
    /// Longest period of the interpolated grid in seconds.
    #[arg(default_value_t = 5.0, long)]
    period_max: f64,
    /// Spacing of the interpolated period grid.
    #[arg(default_value = "log", long, value_enum)]
    spacing: Spacing,
    /// Directory receiving one output file per suite.
    #[arg(long, value_hint = ValueHint::DirPath)]
    output: Option<PathBuf>,
    /// Format of the per-suite output files.
    #[arg(default_value = "csv", long, value_enum)]
    format: Format,
}

impl Subcommand for Opts {
    fn run(&self, cfg: &GlobalConfiguration) -> Result<ExitCode> {
        let (period, sa, ln_std) = helpers::read_target_table(&self.target)?;
        let interp = (!self.no_interp).then(|| InterpConfig {
            spacing: self.spacing.into(),
            period_min: self.period_min,
            period_max: self.period_max,
            count: self.periods,
        });
        let target = TargetSpectrum::new(period, sa, ln_std, interp)?;

        let mut library = MotionLibrary::new(target, self.damping / 100.0)?;

        let quiet = cfg.quiet;
        let mut progress = |update: ProgressUpdate| {
            if quiet {
                return;
            }
            if update.log_line.is_empty() {
                eprintln!(
                    "[{:3}%] about {} s remaining",
                    update.percent,
                    update.eta.as_secs()
                );
            } else {
                eprintln!("{}", update.log_line);
            }
        };

        library.load_dir(&self.motion_path, self.paired, &mut progress)?;

        if !quiet {
            eprintln!(
                "{} motions loaded, about {:.0} trials",
                library.motions().len(),
                trial_count(
                    library.motions().len(),
                    library.disabled_count(),
                    self.seed_size,
                    self.suite_size,
                )
            );
        }

        let params = SearchParams {
            seed_size: self.seed_size,
            suite_size: self.suite_size,
            suite_count: self.suites,
            min_requested: self.min_requested,
            one_per_station: !self.multiple_per_station,
        };
        let cancel = CancelToken::new();
        let suites = library.compute(&params, &cancel, &mut progress)?;

        let mut table = helpers::create_table();
        table.set_titles(
            row![c => "Rank", "Median RMSE", "Max Error (%)", "Std RMSE", "Sigma Inf", "Motions"],
        );
        for suite in &suites {
            let names = suite
                .members()
                .iter()
                .map(|&member| library.motions()[member].name())
                .join(", ");
            table.add_row(row![
                r->suite.rank(),
                r->format!("{:.4}", suite.median_rmse()),
                r->format!("{:.4}", suite.median_max_pct()),
                r->format!("{:.4}", suite.stdev_rmse()),
                r->format!("{:.3}", suite.sigma_inf()),
                names
            ]);
        }
        table.printstd();

        if let Some(directory) = &self.output {
            fs::create_dir_all(directory)
                .context(format!("unable to create '{}'", directory.display()))?;

            let format = OutputFormat::from(self.format);
            let period = library.config().period.clone();
            for suite in &suites {
                let path = directory.join(format!(
                    "suite-{:02}.{}",
                    suite.rank(),
                    format.extension()
                ));
                let file = File::create(&path)
                    .context(format!("unable to write '{}'", path.display()))?;
                report::write_suite(
                    &mut BufWriter::new(file),
                    format,
                    suite,
                    library.motions_mut(),
                    &period,
                )?;
            }
        }

        Ok(ExitCode::SUCCESS)
    }
}
