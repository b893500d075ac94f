#![allow(missing_docs)]

mod fixtures;

use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;
use predicates::str;

const TARGET_CSV: &str = "period,sa,ln_std\n\
                          0.01,0.05,0.3\n\
                          0.05,0.12,0.3\n\
                          0.1,0.2,0.3\n\
                          0.3,0.25,0.3\n\
                          0.5,0.2,0.3\n\
                          1.0,0.12,0.3\n\
                          2.0,0.06,0.3\n\
                          5.0,0.02,0.3\n";

fn motion_tree() -> TempDir {
    let dir = TempDir::new().unwrap();

    let tones = [
        ("EVTA/STA1090.AT2", 0.05, 1.5),
        ("EVTA/STA2090.AT2", 0.08, 2.0),
        ("EVTB/STA3090.AT2", 0.11, 2.5),
        ("EVTB/STA4090.AT2", 0.07, 3.0),
    ];
    for (path, amplitude, frequency) in tones {
        dir.child(path)
            .write_str(&fixtures::sine_at2(amplitude, frequency, 0.01, 600))
            .unwrap();
    }
    dir.child("target.csv").write_str(TARGET_CSV).unwrap();

    dir
}

#[test]
fn search_ranks_suites_and_writes_output_files() {
    let dir = motion_tree();

    Command::cargo_bin("sigmaspectra")
        .unwrap()
        .args([
            "search",
            dir.path().to_str().unwrap(),
            dir.child("target.csv").path().to_str().unwrap(),
            "--seed-size",
            "2",
            "--suite-size",
            "3",
            "--suites",
            "2",
            "--periods",
            "50",
            "--output",
            dir.child("out").path().to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(str::contains("Median RMSE"))
        .stdout(str::contains("Sigma Inf"))
        .stderr(str::contains("motions loaded"));

    let first = dir.child("out/suite-01.csv");
    first.assert(predicate::path::is_file());
    first.assert(str::starts_with("Median RMSE,"));
    first.assert(str::contains("Period (s),Median Sa (g),Sigma_ln"));
    dir.child("out/suite-02.csv").assert(predicate::path::is_file());
}

#[test]
fn search_export_formats_match_their_contracts() {
    let dir = motion_tree();

    Command::cargo_bin("sigmaspectra")
        .unwrap()
        .args([
            "search",
            dir.path().to_str().unwrap(),
            dir.child("target.csv").path().to_str().unwrap(),
            "--seed-size",
            "2",
            "--suite-size",
            "3",
            "--suites",
            "1",
            "--periods",
            "50",
            "--output",
            dir.child("shake").path().to_str().unwrap(),
            "--format",
            "shake2000",
            "--quiet",
        ])
        .assert()
        .success();

    dir.child("shake/suite-01.txt")
        .assert(str::starts_with("Median RMSE:"))
        .assert(str::contains("Motion"));
}

#[test]
fn search_rejects_a_sparse_interpolation_grid() {
    let dir = motion_tree();

    Command::cargo_bin("sigmaspectra")
        .unwrap()
        .args([
            "search",
            dir.path().to_str().unwrap(),
            dir.child("target.csv").path().to_str().unwrap(),
            "--periods",
            "10",
        ])
        .assert()
        .failure()
        .stderr(str::contains("invalid input"));
}

#[test]
fn search_reports_when_no_suite_fits() {
    let dir = motion_tree();

    // more motions per suite than the library holds
    Command::cargo_bin("sigmaspectra")
        .unwrap()
        .args([
            "search",
            dir.path().to_str().unwrap(),
            dir.child("target.csv").path().to_str().unwrap(),
            "--suite-size",
            "9",
            "--quiet",
        ])
        .assert()
        .failure()
        .stderr(str::contains("suite size cannot exceed"));
}
