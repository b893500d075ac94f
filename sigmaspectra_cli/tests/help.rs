#![allow(missing_docs)]

use assert_cmd::Command;
use predicates::str;

#[test]
fn help() {
    Command::cargo_bin("sigmaspectra")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(str::contains(
            "Selects and scales suites of recorded ground motions",
        ))
        .stdout(str::contains("read"))
        .stdout(str::contains("search"));
}

#[test]
fn read_help() {
    Command::cargo_bin("sigmaspectra")
        .unwrap()
        .args(["read", "--help"])
        .assert()
        .success()
        .stdout(str::contains("--damping"))
        .stdout(str::contains("--spectrum"));
}

#[test]
fn search_help() {
    Command::cargo_bin("sigmaspectra")
        .unwrap()
        .args(["search", "--help"])
        .assert()
        .success()
        .stdout(str::contains("--seed-size"))
        .stdout(str::contains("--suite-size"))
        .stdout(str::contains("--paired"))
        .stdout(str::contains("--format"));
}

#[test]
fn no_arguments_prints_usage() {
    Command::cargo_bin("sigmaspectra")
        .unwrap()
        .assert()
        .failure()
        .stderr(str::contains("Usage"));
}
