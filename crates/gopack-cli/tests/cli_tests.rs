//! Integration tests for gopack-cli.
//!
//! Note: Tests use `unwrap`/`expect` which is acceptable in test code.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn gopack_cmd() -> Command {
    let mut cmd = cargo_bin_cmd!("gopack");
    cmd.env_remove("GOPACK_LOG");
    cmd
}

fn module_dir() -> TempDir {
    let temp = TempDir::new().expect("failed to create temp dir");
    fs::write(temp.path().join("go.mod"), "module example.com/foo\n").unwrap();
    fs::write(temp.path().join("main.go"), "package main\n").unwrap();
    fs::create_dir(temp.path().join(".idea")).unwrap();
    fs::write(temp.path().join(".idea/workspace.xml"), "<xml/>").unwrap();
    temp
}

fn zip_names(path: &Path) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(fs::File::open(path).unwrap()).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

#[test]
fn test_version_flag() {
    gopack_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("gopack"));
}

#[test]
fn test_help_flag() {
    gopack_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--snapshot"))
        .stdout(predicate::str::contains("--pkg-version"));
}

#[test]
fn test_driver_help() {
    gopack_cmd()
        .args(["git", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--rev"))
        .stdout(predicate::str::contains("--tree"));
}

#[test]
fn test_fs_package_to_output() {
    let module = module_dir();
    let out = TempDir::new().unwrap();
    let dest = out.path().join("foo.zip");

    gopack_cmd()
        .arg("-v")
        .arg("v1.2.3")
        .arg("-o")
        .arg(&dest)
        .arg("fs")
        .arg("-d")
        .arg(module.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Packaged example.com/foo@v1.2.3"));

    assert_eq!(
        zip_names(&dest),
        vec![
            "example.com/foo@v1.2.3/go.mod",
            "example.com/foo@v1.2.3/main.go",
        ]
    );
}

#[test]
fn test_fs_package_all_files() {
    let module = module_dir();
    let out = TempDir::new().unwrap();
    let dest = out.path().join("foo.zip");

    gopack_cmd()
        .arg("-a")
        .arg("-o")
        .arg(&dest)
        .arg("fs")
        .arg("-d")
        .arg(module.path())
        .assert()
        .success();

    assert!(
        zip_names(&dest).contains(&"example.com/foo@v0.0.0/.idea/workspace.xml".to_string())
    );
}

#[test]
fn test_snapshot_version() {
    let module = module_dir();
    let out = TempDir::new().unwrap();
    let dest = out.path().join("foo.zip");

    gopack_cmd()
        .arg("-s")
        .arg("-o")
        .arg(&dest)
        .arg("fs")
        .arg("-d")
        .arg(module.path())
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"example\.com/foo@v0\.0\.0-\d{14}-000000000000").unwrap());
}

#[test]
fn test_unknown_driver_lists_drivers() {
    gopack_cmd()
        .arg("zzz")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown driver: zzz"))
        .stderr(predicate::str::contains("Available drivers:"))
        .stderr(predicate::str::contains("fs"))
        .stderr(predicate::str::contains("git"));
}

#[test]
fn test_missing_driver_lists_drivers() {
    gopack_cmd()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Available drivers:"))
        .stderr(predicate::str::contains("Unknown driver").not());
}

#[test]
fn test_bad_driver_flag_is_usage_error() {
    gopack_cmd()
        .args(["fs", "--bogus"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--bogus"));
}

#[test]
fn test_invalid_version_rejected() {
    let module = module_dir();

    gopack_cmd()
        .args(["-v", "1.2.3", "fs", "-d"])
        .arg(module.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid package version"));
}

#[test]
fn test_malformed_declaration_fails() {
    let module = module_dir();
    fs::write(module.path().join("go.mod"), "go 1.22\n").unwrap();
    let out = TempDir::new().unwrap();
    let dest = out.path().join("foo.zip");

    gopack_cmd()
        .arg("-o")
        .arg(&dest)
        .arg("fs")
        .arg("-d")
        .arg(module.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Malformed module declaration"));

    assert!(!dest.exists());
}

#[test]
fn test_missing_source_dir_fails() {
    gopack_cmd()
        .args(["fs", "-d", "/nonexistent/gopack/module"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Source directory not found"));
}

#[test]
fn test_store_failure_is_not_fatal() {
    let module = module_dir();

    gopack_cmd()
        .args(["-o", "/nonexistent/gopack/out.zip", "fs", "-d"])
        .arg(module.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("failed to store package"));
}

#[test]
fn test_json_output() {
    let module = module_dir();
    let out = TempDir::new().unwrap();
    let dest = out.path().join("foo.zip");

    let output = gopack_cmd()
        .arg("--json")
        .arg("-v")
        .arg("v2.0.0")
        .arg("-o")
        .arg(&dest)
        .arg("fs")
        .arg("-d")
        .arg(module.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["operation"], "package");
    assert_eq!(value["status"], "success");
    assert_eq!(value["data"]["module"], "example.com/foo");
    assert_eq!(value["data"]["version"], "v2.0.0");
    assert_eq!(value["data"]["files_added"], 2);
    assert_eq!(value["data"]["stored_at"], dest.display().to_string());
}

#[test]
fn test_json_error_output() {
    let output = gopack_cmd()
        .args(["--json", "fs", "-d", "/nonexistent/gopack/module"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["status"], "error");
    assert!(value["error"].as_str().unwrap().contains("Source directory not found"));
}

#[test]
fn test_quiet_mode() {
    let module = module_dir();
    let out = TempDir::new().unwrap();
    let dest = out.path().join("foo.zip");

    gopack_cmd()
        .arg("-q")
        .arg("-o")
        .arg(&dest)
        .arg("fs")
        .arg("-d")
        .arg(module.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert!(dest.exists());
}

#[test]
fn test_completions() {
    gopack_cmd()
        .args(["--completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gopack"));
}
