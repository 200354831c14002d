//! End-to-end CLI tests exercising the seed scenarios against the real binary.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

fn write_source(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".a68").tempfile().expect("create temp source file");
    file.write_all(contents.as_bytes()).expect("write temp source file");
    file
}

#[test]
fn compiles_a_skip_program_with_no_diagnostics() {
    let source = write_source("SKIP");
    Command::cargo_bin("a68fc")
        .unwrap()
        .arg(source.path())
        .assert()
        .success();
}

#[test]
fn reports_a_bracket_mismatch_on_stderr() {
    let source = write_source("BEGIN SKIP");
    Command::cargo_bin("a68fc")
        .unwrap()
        .arg(source.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn emit_tree_prints_the_particular_program_node() {
    let source = write_source("BEGIN INT x = 1; x END");
    Command::cargo_bin("a68fc")
        .unwrap()
        .arg(source.path())
        .arg("--emit-tree")
        .assert()
        .success()
        .stdout(predicate::str::contains("ParticularProgram"));
}

#[test]
fn quote_stropping_flag_is_accepted() {
    let source = write_source("'skip'");
    Command::cargo_bin("a68fc")
        .unwrap()
        .arg(source.path())
        .arg("--quote-stropping")
        .assert()
        .success();
}

#[test]
fn missing_source_argument_fails_with_usage_error() {
    Command::cargo_bin("a68fc")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("source file"));
}
