//! CLI end-to-end tests.
//!
//! These tests spawn the `axal` and `axal-index` binaries against temporary
//! directories and check stdout, rewritten files and exit codes.
//!
//! Exit code expectations:
//! - 0: run completed, even when individual files failed
//! - 1: bad arguments, missing directory, or no .cs files

use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Run a binary with given arguments and return (stdout, stderr, exit_code).
fn run(bin: &str, args: &[&str], config_dir: &Path) -> (String, String, i32) {
    let output = Command::new(bin)
        .args(args)
        // Point config loading at a file that does not exist so defaults apply
        .env("AXAL_CONFIG", config_dir.join("absent.toml"))
        .env_remove("AXAL_LOG")
        .output()
        .expect("failed to execute binary");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

fn run_axal(args: &[&str], config_dir: &Path) -> (String, String, i32) {
    run(env!("CARGO_BIN_EXE_axal"), args, config_dir)
}

fn run_index(args: &[&str], config_dir: &Path) -> (String, String, i32) {
    run(env!("CARGO_BIN_EXE_axal-index"), args, config_dir)
}

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("Core")).unwrap();
    std::fs::write(
        dir.path().join("Core").join("Foo.cs"),
        "namespace App.Core\n{\n    public class Foo\n    {\n        public Foo() { }\n\n        public int Bar(int x)\n        {\n            if (x > 0)\n                return x;\n            return -x;\n        }\n\n        public void Baz() => Bar(1);\n    }\n}\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("Program.cs"),
        "using System.Linq;\n\nclass Program\n{\n    static void Main()\n    {\n    }\n}\n",
    )
    .unwrap();
    dir
}

// ============================================================================
// axal
// ============================================================================

#[test]
fn instruments_every_file_and_exits_0() {
    let dir = project();
    let path = dir.path().to_str().unwrap();

    let (stdout, _stderr, exit_code) = run_axal(&[path], dir.path());

    assert_eq!(exit_code, 0, "stdout: {}", stdout);
    assert!(stdout.contains("Found 2 .cs files"));
    assert!(stdout.contains("Done: 2 files instrumented"));

    let foo = std::fs::read_to_string(dir.path().join("Core").join("Foo.cs")).unwrap();
    assert!(foo.starts_with("using System;"));
    assert_eq!(foo.matches("AXAL_ENTER App.Core.Foo Bar").count(), 1);
    assert_eq!(foo.matches("AXAL_EXIT App.Core.Foo Bar").count(), 3);
    assert_eq!(foo.matches("AXAL_ENTER App.Core.Foo Baz").count(), 1);
    assert!(!foo.contains("AXAL_ENTER App.Core.Foo Foo"));

    let program = std::fs::read_to_string(dir.path().join("Program.cs")).unwrap();
    assert!(program.contains("using System.Linq;"));
    assert!(program.contains("using System;"));
    assert!(program.contains("AXAL_ENTER Program Main"));
}

#[test]
fn broken_file_is_skipped_and_run_still_exits_0() {
    let dir = project();
    let broken = "class Broken { void M( { }";
    std::fs::write(dir.path().join("Broken.cs"), broken).unwrap();
    let path = dir.path().to_str().unwrap();

    let (stdout, _stderr, exit_code) = run_axal(&[path], dir.path());

    assert_eq!(exit_code, 0);
    assert!(stdout.contains("Failed "));
    assert!(stdout.contains("1 failed"));
    assert_eq!(
        std::fs::read_to_string(dir.path().join("Broken.cs")).unwrap(),
        broken
    );
}

#[test]
fn missing_directory_exits_1() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope");

    let (_stdout, stderr, exit_code) = run_axal(&[missing.to_str().unwrap()], dir.path());

    assert_eq!(exit_code, 1);
    assert!(stderr.contains("Directory not found"));
}

#[test]
fn directory_without_sources_exits_1() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("README.txt"), "nothing here").unwrap();

    let (_stdout, stderr, exit_code) = run_axal(&[dir.path().to_str().unwrap()], dir.path());

    assert_eq!(exit_code, 1);
    assert!(stderr.contains("No .cs files found"));
}

#[test]
fn wrong_argument_count_exits_1() {
    let dir = TempDir::new().unwrap();
    let (_stdout, _stderr, exit_code) = run_axal(&[], dir.path());
    assert_eq!(exit_code, 1);

    let (_stdout, _stderr, exit_code) = run_axal(&["a", "b"], dir.path());
    assert_eq!(exit_code, 1);
}

#[test]
fn help_exits_0() {
    let dir = TempDir::new().unwrap();
    let (stdout, _stderr, exit_code) = run_axal(&["--help"], dir.path());
    assert_eq!(exit_code, 0);
    assert!(stdout.contains("DIRECTORY"));
}

// ============================================================================
// axal-index
// ============================================================================

#[test]
fn index_writes_class_mapping() {
    let dir = project();
    let path = dir.path().to_str().unwrap();

    let (stdout, _stderr, exit_code) = run_index(&[path], dir.path());

    assert_eq!(exit_code, 0, "stdout: {}", stdout);
    let mapping = std::fs::read_to_string(dir.path().join("class_mapping.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&mapping).unwrap();

    let foo = json["App.Core.Foo"].as_str().expect("App.Core.Foo mapped");
    assert!(Path::new(foo).is_absolute());
    assert!(foo.ends_with("Foo.cs"));
    assert!(json["Program"].as_str().is_some());
}

#[test]
fn index_missing_directory_exits_1() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope");
    let (_stdout, _stderr, exit_code) = run_index(&[missing.to_str().unwrap()], dir.path());
    assert_eq!(exit_code, 1);
}
