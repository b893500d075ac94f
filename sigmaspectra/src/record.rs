//! Module containing [`Record`], a single recorded acceleration component.

use crate::error::{Error, Result};
use crate::motion::{self, Flag, Motion, SpectrumConfig};
use crate::{convert, fourier, series};
use num_complex::Complex64;
use rayon::prelude::*;
use regex::Regex;
use std::f64::consts::PI;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Standard gravity in cm/s², used to convert accelerations in g into
/// velocities and displacements in cm units.
pub const GRAVITY: f64 = 980.665;

// <event>/<station><component>.AT2 at the end of the path
static IDENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/([^/]+)/([^/]+)((?:\d{3})|(?:-{0,2}[NSEWTLR]+)|NOR|SOU|EAS|WES)\.AT2$").unwrap()
});

/// A single recorded acceleration component and its derived series.
#[derive(Clone, Debug)]
pub struct Record {
    file: PathBuf,
    event: String,
    station: String,
    component: String,
    details: String,
    dt: f64,
    acc: Vec<f64>,
    vel: Vec<f64>,
    disp: Vec<f64>,
    pga: f64,
    pgv: f64,
    pgd: f64,
    arias_int: f64,
    dur_5_75: f64,
    dur_5_95: f64,
    sa: Vec<f64>,
    ln_sa: Vec<f64>,
    avg_ln_sa: f64,
    prev_scale: f64,
    flag: Flag,
}

impl Record {
    /// Load a record from an AT2 file on disk.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Io`] when the file is missing or malformed.
    pub fn from_path(path: &Path, config: &SpectrumConfig) -> Result<Self> {
        let file = File::open(path).map_err(|err| Error::Io {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;

        Self::from_reader(BufReader::new(file), path, config)
    }

    /// Load a record in the AT2 format from `reader`. The path is used for
    /// the event/station/component identity and for error reporting only.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Io`] when the content is malformed.
    pub fn from_reader<R: BufRead>(reader: R, path: &Path, config: &SpectrumConfig) -> Result<Self> {
        let mut lines = reader.lines();
        let (details, count, dt) = parse_header(&mut lines, path)?;

        let mut acc = Vec::with_capacity(count);
        'outer: for line in lines {
            let line = line.map_err(|err| io_error(path, &err.to_string()))?;
            for token in line.split_whitespace() {
                acc.push(
                    token
                        .parse::<f64>()
                        .map_err(|_| io_error(path, &format!("invalid sample '{token}'")))?,
                );
                if acc.len() == count {
                    break 'outer;
                }
            }
        }

        if acc.len() < count {
            return Err(io_error(
                path,
                &format!("expected {count} samples, found {}", acc.len()),
            ));
        }

        let (event, station, component) = identity_from_path(path);

        Ok(Self::process(
            path.to_path_buf(),
            event,
            station,
            component,
            details,
            dt,
            acc,
            config,
        ))
    }

    #[allow(clippy::too_many_arguments)]
    fn process(
        file: PathBuf,
        event: String,
        station: String,
        component: String,
        details: String,
        dt: f64,
        acc: Vec<f64>,
        config: &SpectrumConfig,
    ) -> Self {
        let pga = series::max_abs(&acc);

        // acceleration in g scaled by gravity gives cm/s and cm units
        let vel = series::cumtrapz(&acc, dt, GRAVITY);
        let pgv = series::max_abs(&vel);
        let disp = series::cumtrapz(&vel, dt, 1.0);
        let pgd = series::max_abs(&disp);

        let mut arias = vec![0.0; acc.len()];
        for i in 1..acc.len() {
            arias[i] = arias[i - 1] + PI * 0.25 * dt * (acc[i].powi(2) + acc[i - 1].powi(2));
        }
        let arias_int = arias.last().copied().unwrap_or(0.0);

        let mut i5 = 0;
        let mut i75 = 0;
        let mut i95 = 0;
        for &value in &arias {
            let norm = value / arias_int;
            if norm < 0.05 {
                i5 += 1;
            }
            if norm < 0.75 {
                i75 += 1;
            }
            if norm < 0.95 {
                i95 += 1;
            }
        }
        let dur_5_75 = dt * convert::f64_from_usize(i75 - i5);
        let dur_5_95 = dt * convert::f64_from_usize(i95 - i5);

        let sa = response_spectrum(&acc, dt, config);
        let ln_sa: Vec<f64> = sa.iter().map(|&value| value.ln()).collect();
        let avg_ln_sa = ln_sa.iter().sum::<f64>() / convert::f64_from_usize(ln_sa.len());

        Self {
            file,
            event,
            station,
            component,
            details,
            dt,
            acc,
            vel,
            disp,
            pga,
            pgv,
            pgd,
            arias_int,
            dur_5_75,
            dur_5_95,
            sa,
            ln_sa,
            avg_ln_sa,
            prev_scale: 1.0,
            flag: Flag::Unmarked,
        }
    }

    /// Path of the file this record was loaded from.
    #[must_use]
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Component identifier (azimuth digits or letters).
    #[must_use]
    pub fn component(&self) -> &str {
        &self.component
    }

    /// Free-form description from the second AT2 header line.
    #[must_use]
    pub fn details(&self) -> &str {
        &self.details
    }

    /// Time step of the record in seconds.
    #[must_use]
    pub const fn dt(&self) -> f64 {
        self.dt
    }

    /// Sample times in seconds.
    #[must_use]
    pub fn time(&self) -> Vec<f64> {
        (0..self.acc.len())
            .map(|i| convert::f64_from_usize(i) * self.dt)
            .collect()
    }

    /// Acceleration samples in g.
    #[must_use]
    pub fn acc(&self) -> &[f64] {
        &self.acc
    }

    /// Velocity series in cm/s.
    #[must_use]
    pub fn vel(&self) -> &[f64] {
        &self.vel
    }

    /// Displacement series in cm.
    #[must_use]
    pub fn disp(&self) -> &[f64] {
        &self.disp
    }

    /// Peak ground acceleration in g.
    #[must_use]
    pub const fn pga(&self) -> f64 {
        self.pga
    }

    /// Peak ground velocity in cm/s.
    #[must_use]
    pub const fn pgv(&self) -> f64 {
        self.pgv
    }

    /// Peak ground displacement in cm.
    #[must_use]
    pub const fn pgd(&self) -> f64 {
        self.pgd
    }

    /// Arias intensity of the record.
    #[must_use]
    pub const fn arias_int(&self) -> f64 {
        self.arias_int
    }

    /// Significant duration between 5% and 75% of the Arias intensity.
    #[must_use]
    pub const fn dur_5_75(&self) -> f64 {
        self.dur_5_75
    }

    /// Significant duration between 5% and 95% of the Arias intensity.
    #[must_use]
    pub const fn dur_5_95(&self) -> f64 {
        self.dur_5_95
    }

    #[cfg(test)]
    pub(crate) fn synthetic(event: &str, station: &str, component: &str, ln_sa: Vec<f64>) -> Self {
        let sa: Vec<f64> = ln_sa.iter().map(|&value| value.exp()).collect();
        let avg_ln_sa = ln_sa.iter().sum::<f64>() / convert::f64_from_usize(ln_sa.len());

        Self {
            file: PathBuf::from(format!("{event}/{station}{component}.AT2")),
            event: event.to_owned(),
            station: station.to_owned(),
            component: component.to_owned(),
            details: String::new(),
            dt: 0.01,
            acc: vec![0.0],
            vel: vec![0.0],
            disp: vec![0.0],
            pga: 0.0,
            pgv: 0.0,
            pgd: 0.0,
            arias_int: 0.0,
            dur_5_75: 0.0,
            dur_5_95: 0.0,
            sa,
            ln_sa,
            avg_ln_sa,
            prev_scale: 1.0,
            flag: Flag::Unmarked,
        }
    }
}

impl Motion for Record {
    fn name(&self) -> String {
        if self.event.is_empty() || self.station.is_empty() || self.component.is_empty() {
            let parent = self
                .file
                .parent()
                .and_then(Path::file_name)
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let file = self
                .file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();

            format!("{parent}/{file}")
        } else {
            format!("{}/{}{}", self.event, self.station, self.component)
        }
    }

    fn event(&self) -> &str {
        &self.event
    }

    fn station(&self) -> &str {
        &self.station
    }

    fn component_count(&self) -> usize {
        1
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
        let rel_scale = factor / self.prev_scale;

        for value in self
            .acc
            .iter_mut()
            .chain(&mut self.vel)
            .chain(&mut self.disp)
        {
            *value *= rel_scale;
        }

        self.pga *= rel_scale;
        self.pgv *= rel_scale;
        self.pgd *= rel_scale;
        self.arias_int *= rel_scale * rel_scale;

        motion::scale_spectrum(
            &mut self.sa,
            &mut self.ln_sa,
            &mut self.avg_ln_sa,
            &mut self.prev_scale,
            factor,
        );
    }
}

fn io_error(path: &Path, reason: &str) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        reason: reason.to_owned(),
    }
}

/// Read the four AT2 header lines, returning the description and the sample
/// count and time step from the fourth line.
fn parse_header<R: BufRead>(
    lines: &mut io::Lines<R>,
    path: &Path,
) -> Result<(String, usize, f64)> {
    let mut next_line = |what: &str| -> Result<String> {
        lines
            .next()
            .transpose()
            .map_err(|err| io_error(path, &err.to_string()))?
            .ok_or_else(|| io_error(path, &format!("missing {what}")))
    };

    next_line("first header line")?;
    let details = next_line("event description")?.trim().to_owned();
    next_line("third header line")?;
    let header = next_line("sample count and time step")?;

    let mut tokens = header.split_whitespace();
    let count = tokens
        .next()
        .ok_or_else(|| io_error(path, "missing sample count"))?
        .parse::<usize>()
        .map_err(|_| io_error(path, &format!("invalid sample count in '{header}'")))?;
    let dt = tokens
        .next()
        .ok_or_else(|| io_error(path, "missing time step"))?
        .parse::<f64>()
        .map_err(|_| io_error(path, &format!("invalid time step in '{header}'")))?;

    if count == 0 {
        return Err(io_error(path, "sample count must be positive"));
    }
    if dt <= 0.0 {
        return Err(io_error(path, &format!("time step must be positive: {dt}")));
    }

    Ok((details, count, dt))
}

/// Extract `(event, station, component)` from the file path. Empty strings
/// are returned when the path does not follow the
/// `<event>/<station><component>.AT2` convention.
fn identity_from_path(path: &Path) -> (String, String, String) {
    let normalized = path.to_string_lossy().replace('\\', "/");

    IDENTITY.captures(&normalized).map_or_else(
        || (String::new(), String::new(), String::new()),
        |caps| (caps[1].to_owned(), caps[2].to_owned(), caps[3].to_owned()),
    )
}

/// Pseudo-acceleration response spectrum of `acc` on the periods of `config`.
///
/// For every period the Fourier amplitude spectrum is zero-padded so that the
/// sampling rate covers at least five times the oscillator frequency, the
/// single-degree-of-freedom transfer function is applied over the original
/// frequency grid, and the peak of the inverse transform is taken.
fn response_spectrum(acc: &[f64], dt: f64, config: &SpectrumConfig) -> Vec<f64> {
    let fas = fourier::fft(acc);

    let d_freq = (2.0 * dt * convert::f64_from_usize(fas.len() - 1)).recip();
    let freq: Vec<f64> = (0..fas.len())
        .map(|i| convert::f64_from_usize(i) * d_freq)
        .collect();

    let delta_freq = (dt * convert::f64_from_usize(acc.len())).recip();

    config
        .period
        .par_iter()
        .map(|&period| {
            let f_n = period.recip();

            // the padded sampling rate must reach five times the oscillator
            // frequency or the time-domain peak is underresolved
            let min_len = fas
                .len()
                .max(convert::usize_from_f64((5.0 * f_n / delta_freq).ceil()));
            let n = fourier::next_pow2(min_len);

            // amplitudes grow with the number of points so the inverse stays
            // equivalently normalized
            let scale = convert::f64_from_usize(n) / convert::f64_from_usize(fas.len());

            let mut padded = vec![Complex64::new(0.0, 0.0); n];
            for ((slot, &f), &amplitude) in padded.iter_mut().zip(&freq).zip(&fas) {
                *slot = scale * sdof_transfer(config.damping, f_n, f) * amplitude;
            }

            series::max_abs(&fourier::ifft(&padded))
        })
        .collect()
}

/// The single-degree-of-freedom transfer function
/// `H(f) = -fn^2 / ((f^2 - fn^2) - 2 i damping fn f)`.
fn sdof_transfer(damping: f64, f_n: f64, f: f64) -> Complex64 {
    Complex64::new(-f_n * f_n, 0.0)
        / Complex64::new(f.mul_add(f, -f_n * f_n), -2.0 * damping * f_n * f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use std::io::Cursor;

    fn test_config() -> SpectrumConfig {
        SpectrumConfig {
            period: vec![0.1, 0.5, 1.0],
            damping: 0.05,
        }
    }

    fn parse(text: &str, path: &str) -> Result<Record> {
        Record::from_reader(Cursor::new(text), Path::new(path), &test_config())
    }

    #[test]
    fn parses_the_at2_layout() {
        let text = "PEER STRONG MOTION DATABASE RECORD\n\
                    Imperial Valley 1979, El Centro, 090\n\
                    ACCELERATION TIME SERIES IN UNITS OF G\n\
                    6 0.5\n\
                    0.0 0.01 -0.02\n\
                    0.03 -0.01 0.0\n";
        let record = parse(text, "/data/IMPVALL/ELC090.AT2").unwrap();

        assert_eq!(record.acc().len(), 6);
        assert_approx_eq!(f64, record.dt(), 0.5, ulps = 2);
        assert_eq!(record.details(), "Imperial Valley 1979, El Centro, 090");
        assert_eq!(record.event(), "IMPVALL");
        assert_eq!(record.station(), "ELC");
        assert_eq!(record.component(), "090");
        assert_eq!(record.name(), "IMPVALL/ELC090");
        assert_approx_eq!(f64, record.pga(), 0.03, ulps = 2);
        assert_eq!(record.time(), vec![0.0, 0.5, 1.0, 1.5, 2.0, 2.5]);
    }

    #[test]
    fn identity_falls_back_to_the_file_name() {
        let text = "x\nsome event\nx\n2 0.01\n0.1 0.2\n";
        let record = parse(text, "/somewhere/motions/oddname.AT2").unwrap();

        assert_eq!(record.event(), "");
        assert_eq!(record.name(), "motions/oddname.AT2");
    }

    #[test]
    fn identity_accepts_letter_components() {
        let text = "x\nd\nx\n2 0.01\n0.1 0.2\n";
        let record = parse(text, "/data/KOBE/TAK-NS.AT2").unwrap();

        assert_eq!(record.event(), "KOBE");
        assert_eq!(record.component(), "S");
        assert_eq!(record.station(), "TAK-N");
    }

    #[test]
    fn rejects_truncated_files() {
        let text = "x\nd\nx\n10 0.01\n0.1 0.2\n";

        assert!(matches!(
            parse(text, "/data/EVT/STA090.AT2"),
            Err(Error::Io { .. })
        ));
    }

    #[test]
    fn rejects_malformed_headers() {
        assert!(parse("x\nd\nx\nNPTS DT\n", "/d/E/S090.AT2").is_err());
        assert!(parse("x\nd\n", "/d/E/S090.AT2").is_err());
        assert!(parse("x\nd\nx\n4 -0.01\n0 0 0 0\n", "/d/E/S090.AT2").is_err());
    }

    #[test]
    fn arias_durations_use_the_counting_convention() {
        let text = "x\nd\nx\n5 1.0\n0.0 1.0 1.0 1.0 0.0\n";
        let record = parse(text, "/d/E/S090.AT2").unwrap();

        // arias fractions are 0, 1/6, 1/2, 5/6, 1
        assert_approx_eq!(f64, record.dur_5_75(), 2.0, ulps = 2);
        assert_approx_eq!(f64, record.dur_5_95(), 3.0, ulps = 2);
        assert_approx_eq!(f64, record.arias_int(), 1.5 * PI, epsilon = 1e-12);
    }

    #[test]
    fn velocity_of_constant_acceleration_is_linear() {
        let text = "x\nd\nx\n3 2.0\n1.0 1.0 1.0\n";
        let record = parse(text, "/d/E/S090.AT2").unwrap();

        assert_approx_eq!(f64, record.vel()[0], 0.0, ulps = 2);
        assert_approx_eq!(f64, record.vel()[1], 2.0 * GRAVITY, epsilon = 1e-9);
        assert_approx_eq!(f64, record.vel()[2], 4.0 * GRAVITY, epsilon = 1e-9);
    }

    #[test]
    fn spectrum_stays_consistent_under_scaling() {
        let text = "x\nd\nx\n8 0.1\n0.0 0.05 -0.1 0.2 -0.15 0.1 -0.05 0.0\n";
        let mut record = parse(text, "/d/E/S090.AT2").unwrap();

        let pga = record.pga();
        let sa = record.sa().to_vec();

        record.scale_by(2.0);
        record.scale_by(3.0);

        // successive scalings do not compound
        assert_approx_eq!(f64, record.pga(), 3.0 * pga, epsilon = 1e-12);
        for (j, &value) in record.sa().iter().enumerate() {
            assert_approx_eq!(f64, value, 3.0 * sa[j], epsilon = 1e-12);
            assert_approx_eq!(
                f64,
                value,
                record.ln_sa()[j].exp(),
                epsilon = value * 1e-12
            );
        }

        record.scale_by(1.0);
        assert_approx_eq!(f64, record.pga(), pga, epsilon = 1e-12);
    }
}
