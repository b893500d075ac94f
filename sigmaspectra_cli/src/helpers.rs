use anyhow::{Context, Result, anyhow};
use prettytable::Table;
use prettytable::format::{FormatBuilder, LinePosition, LineSeparator};
use std::fs;
use std::path::Path;

pub fn create_table() -> Table {
    let mut table = Table::new();
    table.set_format(
        FormatBuilder::new()
            .column_separator(' ')
            .separator(LinePosition::Title, LineSeparator::new('-', '+', ' ', ' '))
            .build(),
    );
    table
}

/// Read a `period,sa,ln_std` CSV table. Blank lines and lines starting with
/// `#` are skipped; a single non-numeric header row is tolerated.
pub fn read_target_table(path: &Path) -> Result<(Vec<f64>, Vec<f64>, Vec<f64>)> {
    let text = fs::read_to_string(path)
        .context(format!("unable to open '{}'", path.display()))?;

    let mut period = Vec::new();
    let mut sa = Vec::new();
    let mut ln_std = Vec::new();

    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != 3 {
            return Err(anyhow!(
                "line {} of '{}' has {} fields instead of period,sa,ln_std",
                number + 1,
                path.display(),
                fields.len()
            ));
        }

        let values: Option<Vec<f64>> = fields
            .iter()
            .map(|field| field.parse::<f64>().ok())
            .collect();

        match values {
            Some(values) => {
                period.push(values[0]);
                sa.push(values[1]);
                ln_std.push(values[2]);
            }
            // tolerate one header row before any data
            None if period.is_empty() => {}
            None => {
                return Err(anyhow!(
                    "line {} of '{}' is not numeric: '{line}'",
                    number + 1,
                    path.display()
                ));
            }
        }
    }

    Ok((period, sa, ln_std))
}
