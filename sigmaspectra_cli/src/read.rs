use super::helpers;
use super::{GlobalConfiguration, Subcommand};
use anyhow::Result;
use clap::{Parser, ValueHint};
use prettytable::{cell, row};
use sigmaspectra::motion::{Motion, SpectrumConfig};
use sigmaspectra::record::Record;
use sigmaspectra::target::{PeriodSpacing, period_grid};
use std::path::PathBuf;
use std::process::ExitCode;

/// Read a single AT2 record and print its summary values.
#[derive(Parser)]
pub struct Opts {
    /// Path to the AT2 file.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,
    /// Oscillator damping in percent.
    #[arg(default_value_t = 5.0, long)]
    damping: f64,
    /// Number of periods in the spectral grid.
    #[arg(default_value_t = 100, long)]
    periods: usize,
    /// Shortest period of the spectral grid in seconds.
    #[arg(default_value_t = 0.01, long)]
    period_min: f64,
    /// Longest period of the spectral grid in seconds.
    #[arg(default_value_t = 5.0, long)]
    period_max: f64,
    /// Print the response spectrum after the summary.
    #[arg(long)]
    spectrum: bool,
}

impl Subcommand for Opts {
    fn run(&self, _: &GlobalConfiguration) -> Result<ExitCode> {
        let config = SpectrumConfig {
            period: period_grid(
                PeriodSpacing::Log,
                self.period_min,
                self.period_max,
                self.periods,
            ),
            damping: self.damping / 100.0,
        };
        let record = Record::from_path(&self.input, &config)?;

        let mut table = helpers::create_table();
        table.set_titles(row![c => "Quantity", "Value"]);
        table.add_row(row!["Name", record.name()]);
        table.add_row(row!["Details", record.details()]);
        table.add_row(row![
            "Samples",
            format!("{} at {} s", record.acc().len(), record.dt())
        ]);
        table.add_row(row!["PGA (g)", r->format!("{:.4}", record.pga())]);
        table.add_row(row!["PGV (cm/s)", r->format!("{:.4}", record.pgv())]);
        table.add_row(row!["PGD (cm)", r->format!("{:.4}", record.pgd())]);
        table.add_row(row![
            "Arias intensity",
            r->format!("{:.4}", record.arias_int())
        ]);
        table.add_row(row![
            "Dur. 5-75 (s)",
            r->format!("{:.2}", record.dur_5_75())
        ]);
        table.add_row(row![
            "Dur. 5-95 (s)",
            r->format!("{:.2}", record.dur_5_95())
        ]);
        table.printstd();

        if self.spectrum {
            let mut spectrum = helpers::create_table();
            spectrum.set_titles(row![c => "Period (s)", "Sa (g)"]);
            for (period, sa) in config.period.iter().zip(record.sa()) {
                spectrum.add_row(row![r->format!("{period:.4}"), r->format!("{sa:.5}")]);
            }
            spectrum.printstd();
        }

        Ok(ExitCode::SUCCESS)
    }
}
