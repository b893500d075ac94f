#![allow(missing_docs)]

use sigmaspectra::motion::{Motion, SpectrumConfig};
use sigmaspectra::record::Record;
use std::f64::consts::PI;
use std::io::Cursor;
use std::path::Path;

fn sine_at2(amplitude: f64, frequency: f64, dt: f64, count: usize) -> String {
    let mut text = format!(
        "PEER STRONG MOTION DATABASE RECORD\n\
         Synthetic tone at {frequency} Hz\n\
         ACCELERATION TIME SERIES IN UNITS OF G\n\
         {count} {dt}\n"
    );

    for i in 0..count {
        let t = f64::from(u32::try_from(i).unwrap()) * dt;
        text.push_str(&format!(
            "{:.8e} ",
            amplitude * (2.0 * PI * frequency * t).sin()
        ));
        if i % 8 == 7 {
            text.push('\n');
        }
    }
    text.push('\n');

    text
}

fn tone_record(period: Vec<f64>) -> Record {
    let config = SpectrumConfig {
        period,
        damping: 0.05,
    };
    let text = sine_at2(0.1, 4.0, 0.01, 2000);

    Record::from_reader(
        Cursor::new(text),
        Path::new("/motions/SYNTH/TONE090.AT2"),
        &config,
    )
    .unwrap()
}

#[test]
fn resonant_oscillator_amplifies_by_the_damping_reciprocal() {
    // a 5%-damped oscillator tuned to the tone sees close to 1/(2 damping)
    // times the input amplitude
    let record = tone_record(vec![0.25]);

    let expected = 0.1 / (2.0 * 0.05);
    let sa = record.sa()[0];
    assert!(
        (sa - expected).abs() / expected < 0.05,
        "sa = {sa}, expected about {expected}"
    );
}

#[test]
fn short_period_response_approaches_the_pga() {
    let record = tone_record(vec![0.02, 2.0]);

    let stiff = record.sa()[0];
    assert!(
        (stiff - record.pga()).abs() / record.pga() < 0.05,
        "sa = {stiff}, pga = {}",
        record.pga()
    );

    // far above the tone period the oscillator barely responds
    assert!(record.sa()[1] < 0.3 * record.pga());
}

#[test]
fn constant_amplitude_tone_has_uniform_significant_duration() {
    // the Arias intensity of a steady tone grows linearly, so the 5-95% and
    // 5-75% windows cover 90% and 70% of the 20 s record
    let record = tone_record(vec![0.25]);

    assert!((record.dur_5_95() - 18.0).abs() < 0.2);
    assert!((record.dur_5_75() - 14.0).abs() < 0.2);
    // the sampling grid does not land exactly on the crest
    assert!((record.pga() - 0.1).abs() < 5e-4);
}

#[test]
fn spectral_values_track_their_logs_under_scaling() {
    let mut record = tone_record(vec![0.02, 0.25, 2.0]);

    let pga = record.pga();
    let sa = record.sa().to_vec();

    record.scale_by(2.5);
    record.scale_by(0.4);

    // net effect is the last factor alone
    assert!((record.pga() - 0.4 * pga).abs() < 1e-12);
    for (j, &value) in record.sa().iter().enumerate() {
        assert!((value - 0.4 * sa[j]).abs() < 1e-12);
        let relative = (value - record.ln_sa()[j].exp()).abs() / value;
        assert!(relative < 1e-12);
    }

    record.scale_by(1.0);
    assert!((record.pga() - pga).abs() < 1e-12);
}
