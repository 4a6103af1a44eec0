// Exercises the `,` command and the end-of-input policies through the CLI.
use assert_cmd::Command;
use predicates::prelude::*;

fn cargo_bin() -> Command {
    let mut cmd = Command::cargo_bin("gbf").unwrap();
    cmd.env_remove("RUST_LOG")
        .env_remove("GBF_EOF")
        .env_remove("GBF_COLOR")
        .arg("--config")
        .arg("/nonexistent/gbf.toml");
    cmd
}

#[test]
fn reads_from_stdin_and_echoes_byte() {
    cargo_bin()
        .args(["run", ",."])
        .write_stdin("Z")
        .assert()
        .success()
        .stdout("Z\n");
}

#[test]
fn cat_program_echoes_until_eof() {
    // With the default zero policy the loop stops at end of input.
    cargo_bin()
        .args(["run", ",[.,]"])
        .write_stdin("abc")
        .assert()
        .success()
        .stdout("abc\n");
}

#[test]
fn eof_unchanged_keeps_cell() {
    // 65 = 'A' survives the `,` at end of input.
    cargo_bin()
        .args(["run", "--eof", "unchanged", format!("{},.", "+".repeat(65)).as_str()])
        .write_stdin("")
        .assert()
        .success()
        .stdout("A\n");
}

#[test]
fn eof_error_exits_with_runtime_status() {
    cargo_bin()
        .args(["run", "--eof", "error", ","])
        .write_stdin("")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("input exhausted"));
}

#[test]
fn eof_policy_from_environment() {
    cargo_bin()
        .env("GBF_EOF", "error")
        .args(["run", ","])
        .write_stdin("")
        .assert()
        .code(3);
}

#[test]
fn eof_flag_overrides_environment() {
    cargo_bin()
        .env("GBF_EOF", "error")
        .args(["run", "--eof", "zero", ",."])
        .write_stdin("")
        .assert()
        .success()
        .stdout("\u{0}\n");
}

#[test]
fn invalid_eof_policy_is_usage_error() {
    cargo_bin()
        .args(["run", "--eof", "block", ","])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Usage:"));
}
