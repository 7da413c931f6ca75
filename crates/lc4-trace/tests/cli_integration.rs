//! Integration tests for the lc4-trace CLI.

use lc4_core as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing as _;
use tracing_subscriber as _;

fn binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_lc4-trace"))
}

fn code_object(addr: u16, words: &[u16]) -> Vec<u8> {
    let count = u16::try_from(words.len()).expect("segment fits");
    [0xCADE, addr, count]
        .iter()
        .chain(words)
        .flat_map(|word| word.to_be_bytes())
        .collect()
}

fn create_object(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, bytes).expect("write object");
    path
}

fn run_cli(args: &[&Path]) -> Output {
    Command::new(binary_path())
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run lc4-trace")
}

#[test]
fn writes_trace_until_halt() {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    // CONST R0, #5 ; ADD R1, R0, R0 ; TRAP #0xFF
    let object = create_object(
        temp_dir.path(),
        "prog.obj",
        &code_object(0x8200, &[0x9005, 0x1200, 0xF0FF]),
    );
    let trace = temp_dir.path().join("trace.txt");

    let output = run_cli(&[&trace, &object]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        fs::read_to_string(&trace).expect("trace written"),
        "8200 1001000000000101 1 0 0005 1 1 0 0000 0000\n\
         8201 0001001000000000 1 1 000A 1 1 0 0000 0000\n\
         8202 1111000011111111 1 7 8203 1 4 0 0000 0000\n"
    );
}

#[test]
fn later_objects_overwrite_earlier_ones() {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    let os = create_object(
        temp_dir.path(),
        "os.obj",
        &code_object(0x8200, &[0x9001, 0xF0FF]),
    );
    let patch = create_object(temp_dir.path(), "patch.obj", &code_object(0x8200, &[0x9002]));
    let trace = temp_dir.path().join("trace.txt");

    let output = run_cli(&[&trace, &os, &patch]);

    assert!(output.status.success());
    let text = fs::read_to_string(&trace).expect("trace written");
    assert!(text.starts_with("8200 1001000000000010 1 0 0002"));
    assert_eq!(text.lines().count(), 2);
}

#[test]
fn protection_fault_stops_the_run_and_keeps_partial_trace() {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    // CONST R0, #0 ; HICONST R0, #0x30 ; JMPR R0
    let object = create_object(
        temp_dir.path(),
        "fault.obj",
        &code_object(0x8200, &[0x9000, 0xD030, 0xC000]),
    );
    let trace = temp_dir.path().join("trace.txt");

    let output = run_cli(&[&trace, &object]);

    assert_eq!(output.status.code(), Some(0));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("attempted to execute data as code (code 1) at PC 3000"));
    assert_eq!(
        fs::read_to_string(&trace).expect("trace written").lines().count(),
        3
    );
}

#[test]
fn max_cycles_bounds_an_infinite_loop() {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    // BRnzp #-1
    let object = create_object(temp_dir.path(), "loop.obj", &code_object(0x8200, &[0x0FFF]));
    let trace = temp_dir.path().join("trace.txt");

    let output = Command::new(binary_path())
        .arg("--max-cycles")
        .arg("4")
        .arg(&trace)
        .arg(&object)
        .output()
        .expect("failed to run lc4-trace");

    assert!(output.status.success());
    assert_eq!(
        fs::read_to_string(&trace).expect("trace written").lines().count(),
        4
    );
}

#[test]
fn missing_object_reports_path_and_fails() {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    let missing = temp_dir.path().join("absent.obj");
    let trace = temp_dir.path().join("trace.txt");

    let output = run_cli(&[&trace, &missing]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("absent.obj"));
    assert!(!trace.exists());
}

#[test]
fn malformed_object_fails_before_execution() {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    let object = create_object(temp_dir.path(), "bad.obj", &[0xBE, 0xEF]);
    let trace = temp_dir.path().join("trace.txt");

    let output = run_cli(&[&trace, &object]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown segment tag 0xBEEF"));
}

#[test]
fn usage_errors_print_help() {
    let output = Command::new(binary_path())
        .arg("trace.txt")
        .output()
        .expect("failed to run lc4-trace");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: missing object file"));
    assert!(stderr.contains("Usage: lc4-trace"));
}

#[test]
fn help_flag_succeeds() {
    let output = Command::new(binary_path())
        .arg("--help")
        .output()
        .expect("failed to run lc4-trace");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("--max-cycles"));
}
