//! CLI integration tests
//!
//! These run the real binary against heightmaps and plugins written to a
//! temporary directory.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn tesannwyn() -> Command {
    Command::cargo_bin("tesannwyn").expect("binary is built")
}

/// 16-bit little-endian ramp, gentle enough to survive the delta codec
fn write_ramp(path: &Path, width: usize, height: usize) {
    let mut bytes = Vec::with_capacity(width * height * 2);
    for y in 0..height {
        for x in 0..width {
            let value = (200 + x + 2 * y) as u16;
            bytes.extend_from_slice(&value.to_le_bytes());
        }
    }
    fs::write(path, bytes).unwrap();
}

fn import_ramp(dir: &TempDir) -> std::path::PathBuf {
    let raw = dir.path().join("ramp.raw");
    let esp = dir.path().join("ramp.esp");
    write_ramp(&raw, 128, 128);

    tesannwyn()
        .current_dir(dir.path())
        .args(["import", "-p", "raw", "-b", "16", "-d", "128x128", "-x", "-1", "-y", "3"])
        .arg(&raw)
        .arg("--output")
        .arg(&esp)
        .assert()
        .success()
        .stdout(predicate::str::contains("Cells written"));
    esp
}

#[test]
fn help_lists_subcommands() {
    tesannwyn()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("import"))
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("info"));
}

#[test]
fn import_then_export_reproduces_raw_image() {
    let dir = TempDir::new().unwrap();
    let esp = import_ramp(&dir);
    let out = dir.path().join("out.raw");

    tesannwyn()
        .current_dir(dir.path())
        .args(["export", "-p", "raw", "-b", "16"])
        .arg(&esp)
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("-x -1 -y 3"));

    let original = fs::read(dir.path().join("ramp.raw")).unwrap();
    let exported = fs::read(&out).unwrap();
    assert_eq!(original, exported);
}

#[test]
fn convert_detects_plugin_input() {
    let dir = TempDir::new().unwrap();
    let esp = import_ramp(&dir);

    tesannwyn()
        .current_dir(dir.path())
        .args(["convert", "-b", "16"])
        .arg(&esp)
        .assert()
        .success();

    assert!(dir.path().join("tesannwyn.raw").exists());
}

#[test]
fn info_reports_land_cells() {
    let dir = TempDir::new().unwrap();
    let esp = import_ramp(&dir);

    tesannwyn()
        .arg("info")
        .arg(&esp)
        .assert()
        .success()
        .stdout(predicate::str::contains("LAND cells"))
        .stdout(predicate::str::contains("(-1, 3)"));
}

#[test]
fn rejects_file_that_is_not_a_plugin() {
    let dir = TempDir::new().unwrap();
    let bogus = dir.path().join("bogus.esp");
    fs::write(&bogus, b"TES4 is not this game").unwrap();

    tesannwyn()
        .arg("info")
        .arg(&bogus)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read plugin"));
}

#[test]
fn rejects_inverted_limits() {
    let dir = TempDir::new().unwrap();
    let raw = dir.path().join("ramp.raw");
    write_ramp(&raw, 64, 64);

    tesannwyn()
        .current_dir(dir.path())
        .args(["import", "-d", "64x64", "-l", "800,-800"])
        .arg(&raw)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid conversion options"));
}

#[test]
fn rejects_origin_past_the_cell_grid() {
    let dir = TempDir::new().unwrap();
    let raw = dir.path().join("ramp.raw");
    write_ramp(&raw, 128, 64);

    tesannwyn()
        .current_dir(dir.path())
        .args(["import", "-d", "128x64", "-x", "2147483647"])
        .arg(&raw)
        .assert()
        .failure()
        .stderr(predicate::str::contains("edge of the cell grid"));
}

#[test]
fn generates_completions() {
    tesannwyn()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tesannwyn"));
}
