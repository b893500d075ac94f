#![allow(missing_docs)]

use std::f64::consts::PI;

/// A synthetic AT2 file holding a steady sine tone.
#[must_use]
pub fn sine_at2(amplitude: f64, frequency: f64, dt: f64, count: usize) -> String {
    let mut text = format!(
        "PEER STRONG MOTION DATABASE RECORD\n\
         Synthetic tone at {frequency} Hz\n\
         ACCELERATION TIME SERIES IN UNITS OF G\n\
         {count} {dt}\n"
    );

    for i in 0..count {
        let t = i as f64 * dt;
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
