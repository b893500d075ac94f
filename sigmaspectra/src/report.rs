//! Rendering of finished suites in the supported textual output formats.

use crate::motion::{Motion, MotionEnum};
use crate::record::Record;
use crate::suite::Suite;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

/// Supported per-suite output formats.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum OutputFormat {
    /// Error summary and the scaled-component table.
    Summary,
    /// [`OutputFormat::Summary`] plus the response-spectrum block.
    Csv,
    /// One `file,scale` line per scaled component, as read by Strata.
    Strata,
    /// Fixed-width motion and scale columns, as read by SHAKE2000.
    Shake2000,
}

impl OutputFormat {
    /// File extension conventionally used for this format.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Summary | Self::Csv | Self::Strata => "csv",
            Self::Shake2000 => "txt",
        }
    }
}

/// Write `suite` to `writer` in `format`. `period` is the shared period grid
/// the spectra live on.
///
/// The summary and CSV formats report scaled records, so the member motions
/// are scaled in place first; the Strata and SHAKE2000 formats only list the
/// scale factors. Pair suites expand to one row per component.
///
/// # Errors
///
/// Propagates errors of the underlying writer.
pub fn write_suite<W: Write>(
    writer: &mut W,
    format: OutputFormat,
    suite: &Suite,
    motions: &mut [MotionEnum],
    period: &[f64],
) -> io::Result<()> {
    match format {
        OutputFormat::Summary => {
            suite.scale_motions(motions);
            write_error_header(writer, suite)?;
            write_component_table(writer, suite, motions)
        }
        OutputFormat::Csv => {
            suite.scale_motions(motions);
            write_error_header(writer, suite)?;
            write_component_table(writer, suite, motions)?;
            write_spectrum_block(writer, suite, motions, period)
        }
        OutputFormat::Strata => {
            for (record, scalar) in component_rows(suite, motions) {
                writeln!(writer, "{},{:.6}", record.file().display(), scalar)?;
            }
            Ok(())
        }
        OutputFormat::Shake2000 => {
            writeln!(
                writer,
                "Median RMSE: {:6.4} Max Error: {:6.3}% Std RMSE: {:6.4} Sigma Inf: {:4.2}",
                suite.median_rmse(),
                suite.median_max_pct(),
                suite.stdev_rmse(),
                suite.sigma_inf()
            )?;
            writeln!(writer, "{:<80}{:<6}", "Motion", "Scale")?;
            for (record, scalar) in component_rows(suite, motions) {
                writeln!(writer, "{:<80}{:<6.3}", record.name(), scalar)?;
            }
            Ok(())
        }
    }
}

fn write_error_header<W: Write>(writer: &mut W, suite: &Suite) -> io::Result<()> {
    writeln!(writer, "Median RMSE,{:.4}", suite.median_rmse())?;
    writeln!(writer, "Median Max Error (%),{:.4}", suite.median_max_pct())?;
    writeln!(writer, "Std RMSE,{:.4}", suite.stdev_rmse())?;
    writeln!(writer, "Sigma Inf,{:.4}", suite.sigma_inf())
}

fn write_component_table<W: Write>(
    writer: &mut W,
    suite: &Suite,
    motions: &[MotionEnum],
) -> io::Result<()> {
    writeln!(
        writer,
        "Name,Scale,PGA (g),PGV (cm/s),PGD (cm),Dur. 5-75 (s),Dur. 5-95 (s),Details"
    )?;

    for (record, scalar) in component_rows(suite, motions) {
        writeln!(
            writer,
            "{},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},\"{}\"",
            record.name(),
            scalar,
            record.pga(),
            record.pgv(),
            record.pgd(),
            record.dur_5_75(),
            record.dur_5_95(),
            record.details()
        )?;
    }

    Ok(())
}

fn write_spectrum_block<W: Write>(
    writer: &mut W,
    suite: &Suite,
    motions: &[MotionEnum],
    period: &[f64],
) -> io::Result<()> {
    let rows = component_rows(suite, motions);

    writeln!(writer)?;
    write!(writer, "Period (s),Median Sa (g),Sigma_ln")?;
    for (record, _) in &rows {
        write!(writer, ",{}", record.name())?;
    }
    writeln!(writer)?;

    for (j, &period) in period.iter().enumerate() {
        write!(
            writer,
            "{:.6},{:.6},{:.6}",
            period,
            suite.ln_avg()[j].exp(),
            suite.ln_std()[j]
        )?;
        for (record, _) in &rows {
            write!(writer, ",{:.6}", record.sa()[j])?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

/// Expand the suite members into `(component record, scale factor)` rows,
/// one per component in member order.
fn component_rows<'a>(suite: &Suite, motions: &'a [MotionEnum]) -> Vec<(&'a Record, f64)> {
    let mut rows = Vec::new();

    for (&member, &scalar) in suite.members().iter().zip(suite.scalars()) {
        match &motions[member] {
            MotionEnum::Record(record) => rows.push((record, scalar)),
            MotionEnum::Pair(pair) => {
                rows.push((pair.first(), scalar));
                rows.push((pair.second(), scalar));
            }
        }
    }

    rows
}
