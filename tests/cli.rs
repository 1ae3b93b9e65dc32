extern crate assert_cmd;
extern crate predicates;
extern crate tempfile;

use assert_cmd::Command;
use predicates::prelude::*;

fn mandelbands() -> Command {
    Command::cargo_bin("mandelbands").unwrap()
}

#[test]
fn renders_and_writes_an_image() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("mandel.png");
    mandelbands()
        .args(&["-m", "threads", "-s", "64x48", "-t", "3", "-o"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("threads computation time:"));
    assert!(output.exists());
}

#[test]
fn all_runs_every_strategy() {
    mandelbands()
        .args(&["-m", "all", "-s", "40x40", "-t", "2", "-r", "5", "-d"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("threads computation time:")
                .and(predicate::str::contains("threadpool computation time:"))
                .and(predicate::str::contains("dataparallel computation time:")),
        );
}

#[test]
fn accepts_negative_corners() {
    mandelbands()
        .args(&["-m", "openmp", "-s", "20x20", "-d", "-u", "-2.0,1.0", "-l", "1.0,-1.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dataparallel computation time:"));
}

#[test]
fn rejects_an_inverted_viewport() {
    mandelbands()
        .args(&["-m", "threads", "-s", "20x20", "-d", "-u", "1.0,-1.0", "-l", "-2.0,1.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Render failure"));
}

#[test]
fn rejects_unknown_mechanisms() {
    mandelbands().args(&["-m", "fibers"]).assert().failure();
}

fn report_params(dir: &std::path::Path, strategy: &str) -> Vec<String> {
    let path = dir.join(format!("rust_{}_performance.txt", strategy));
    let report = std::fs::read_to_string(path).unwrap();
    report
        .lines()
        .map(|l| l.split(',').next().unwrap().to_string())
        .collect()
}

#[test]
fn workload_writes_a_report() {
    let dir = tempfile::tempdir().unwrap();
    mandelbands()
        .args(&["-m", "threadpool", "-w", "-s", "16x16", "-t", "2"])
        .args(&["--trials", "2", "--sweep-max", "3"])
        .arg("--report-dir")
        .arg(dir.path())
        .assert()
        .success();
    assert_eq!(report_params(dir.path(), "threadpool"), vec!["1", "2", "3"]);
}

#[test]
fn sweep_min_moves_the_start_of_the_sweep() {
    let dir = tempfile::tempdir().unwrap();
    mandelbands()
        .args(&["-m", "threads", "-w", "-s", "16x16", "--trials", "1"])
        .args(&["--sweep-min", "2", "--sweep-max", "3"])
        .arg("--report-dir")
        .arg(dir.path())
        .assert()
        .success();
    assert_eq!(report_params(dir.path(), "threads"), vec!["2", "3"]);
}

#[test]
fn rejects_a_backwards_sweep() {
    let dir = tempfile::tempdir().unwrap();
    mandelbands()
        .args(&["-m", "threads", "-w", "-s", "16x16", "--trials", "1"])
        .args(&["--sweep-min", "5", "--sweep-max", "3"])
        .arg("--report-dir")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Render failure"));
}

#[test]
fn threads_pin_dataparallel_to_a_private_pool() {
    mandelbands()
        .env("RUST_LOG", "mandelbands=debug")
        .args(&["-m", "dataparallel", "-s", "20x20", "-t", "2", "-d"])
        .assert()
        .success()
        .stderr(predicate::str::contains("private pool of 2 threads"));
    mandelbands()
        .env("RUST_LOG", "mandelbands=debug")
        .args(&["-m", "dataparallel", "-s", "20x20", "-d"])
        .assert()
        .success()
        .stderr(predicate::str::contains("private pool").not());
}
