//! Runs `typecheck-cli` as a subprocess against scripts written to a temp
//! directory.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const PRELUDE: &str = "\
type int
type float
type double
type void
convertible int float
convertible int double
convertible float double
";

fn typecheck_cli() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_typecheck-cli"))
}

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("failed to write fixture");
    path
}

fn run(args: &[&std::ffi::OsStr]) -> (Output, String, String) {
    let output = Command::new(typecheck_cli())
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run typecheck-cli");
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    (output, stdout, stderr)
}

#[test]
fn prints_resolved_types() {
    let tmp = tempfile::tempdir().expect("failed to create temp dir");
    let script = write(
        tmp.path(),
        "main.tcs",
        &format!("{PRELUDE}literal a integer\nequal a b\nbind c void\n"),
    );

    let (output, stdout, stderr) = run(&[script.as_os_str()]);
    assert!(
        output.status.success(),
        "typecheck-cli failed.\nstdout: {stdout}\nstderr: {stderr}"
    );
    assert_eq!(stdout, "a: int\nb: int\nc: void\n");
}

#[test]
fn all_lists_unresolved_names() {
    let tmp = tempfile::tempdir().expect("failed to create temp dir");
    let script = write(tmp.path(), "main.tcs", &format!("{PRELUDE}var x\nbind y int\n"));

    let (_, stdout, _) = run(&[script.as_os_str()]);
    assert_eq!(stdout, "y: int\n");

    let (output, stdout, _) = run(&[script.as_os_str(), "--all".as_ref()]);
    assert!(output.status.success());
    assert_eq!(stdout, "x: <unresolved>\ny: int\n");
}

#[test]
fn unsatisfiable_script_fails() {
    let tmp = tempfile::tempdir().expect("failed to create temp dir");
    let script = write(
        tmp.path(),
        "conflict.tcs",
        &format!("{PRELUDE}bind a double\nbind b int\nconvert a b\n"),
    );

    let (output, stdout, stderr) = run(&[script.as_os_str()]);
    assert!(!output.status.success(), "expected failure.\nstdout: {stdout}");
    assert!(stdout.is_empty());
    assert!(
        stderr.contains("cannot solve"),
        "expected a solve diagnostic.\nstderr: {stderr}"
    );
}

#[test]
fn syntax_errors_fail() {
    let tmp = tempfile::tempdir().expect("failed to create temp dir");
    let script = write(tmp.path(), "broken.tcs", "type int\nbind a\n");

    let (output, _, stderr) = run(&[script.as_os_str()]);
    assert!(!output.status.success());
    assert!(
        stderr.contains("syntax error"),
        "expected a syntax diagnostic.\nstderr: {stderr}"
    );
}

#[test]
fn config_prelude_is_applied_first() {
    let tmp = tempfile::tempdir().expect("failed to create temp dir");
    write(tmp.path(), "numeric.tcs", PRELUDE);
    write(
        tmp.path(),
        "typecheck.toml",
        "prelude = [\"numeric.tcs\"]\n\n[solver]\nnode_limit = 10000\n",
    );
    let script = write(
        tmp.path(),
        "main.tcs",
        "overload half(float) -> float\nliteral n integer\ncall f = half(n) -> r\n",
    );

    let (output, stdout, stderr) = run(&[script.as_os_str()]);
    assert!(
        output.status.success(),
        "typecheck-cli failed.\nstdout: {stdout}\nstderr: {stderr}"
    );
    assert!(stdout.contains("n: float\n"), "stdout: {stdout}");
    assert!(stdout.contains("r: float\n"), "stdout: {stdout}");
    assert!(stdout.contains("f: half(float) -> float\n"), "stdout: {stdout}");
}

#[test]
fn explicit_config_path() {
    let tmp = tempfile::tempdir().expect("failed to create temp dir");
    let config_dir = tmp.path().join("conf");
    std::fs::create_dir_all(&config_dir).expect("create dir");
    write(&config_dir, "numeric.tcs", PRELUDE);
    let config = write(&config_dir, "custom.toml", "prelude = [\"numeric.tcs\"]\n");
    let script = write(tmp.path(), "main.tcs", "literal d double\n");

    let (output, stdout, stderr) = run(&[
        script.as_os_str(),
        "--config".as_ref(),
        config.as_os_str(),
        "--node-limit".as_ref(),
        "500".as_ref(),
    ]);
    assert!(
        output.status.success(),
        "typecheck-cli failed.\nstdout: {stdout}\nstderr: {stderr}"
    );
    assert_eq!(stdout, "d: double\n");
}
