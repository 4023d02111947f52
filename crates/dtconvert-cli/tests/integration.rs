//! Integration tests for the dtconvert CLI.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

/// A command isolated from the user's config and environment.
fn dtconvert(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_dtconvert"));
    cmd.current_dir(dir)
        .arg("--config")
        .arg(dir.join("config.toml"))
        .env_remove("RUST_LOG")
        .env_remove("DTCONVERT_HOME");
    cmd
}

fn run(dir: &Path, args: &[&str]) -> Output {
    dtconvert(dir).args(args).output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_help() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path(), &["--help"]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("Convert documents and tabular data between formats"));
}

#[test]
fn test_missing_subcommand_is_invalid_args() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path(), &[]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_list() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path(), &["list"]);
    let text = stdout(&output);

    assert!(output.status.success());
    assert!(text.contains("data.csv-to-json"));
    assert!(text.contains("external.csv-to-postgresql"));
    assert!(text.contains("csv -> postgresql [sink]"));
    assert!(text.contains("Total: 20 converters"));
}

#[test]
fn test_formats() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path(), &["formats"]);
    let text = stdout(&output);

    assert!(output.status.success());
    assert!(text.contains("Comma Separated Values"));
    assert!(text.contains("PostgreSQL (import/store) [sink]"));
}

#[test]
fn test_convert_csv_to_json() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("people.csv"), "name,age\nAlice,30\nBob,25\n").unwrap();

    let output = run(dir.path(), &["convert", "people.csv", "--to", "json"]);
    assert!(output.status.success(), "{}", stderr(&output));

    let written = fs::read_to_string(dir.path().join("people.json")).unwrap();
    let rows: Vec<serde_json::Value> = serde_json::from_str(&written).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["name"], "Alice");
    assert_eq!(rows[1]["age"], "25");
}

#[test]
fn test_convert_multi_hop_with_alias() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("dump.sql"),
        "INSERT INTO data (name, age) VALUES ('Alice', '30');\n",
    )
    .unwrap();

    let output = run(
        dir.path(),
        &["convert", "dump.sql", "--to", "yml", "-o", "out.yaml"],
    );
    assert!(output.status.success(), "{}", stderr(&output));

    assert_eq!(
        fs::read_to_string(dir.path().join("out.yaml")).unwrap(),
        "- name: \"Alice\"\n  age: \"30\"\n"
    );
}

#[test]
fn test_convert_quiet() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.csv"), "x\n1\n").unwrap();

    let output = run(dir.path(), &["-q", "convert", "a.csv", "--to", "yaml"]);
    assert!(output.status.success());
    assert!(stdout(&output).is_empty());
    assert!(dir.path().join("a.yaml").exists());
}

#[test]
fn test_existing_output_needs_force() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.csv"), "x\n1\n").unwrap();
    fs::write(dir.path().join("a.json"), "old").unwrap();

    let output = run(dir.path(), &["convert", "a.csv", "--to", "json"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("already exists"));
    assert_eq!(fs::read_to_string(dir.path().join("a.json")).unwrap(), "old");

    let output = run(dir.path(), &["convert", "a.csv", "--to", "json", "-f"]);
    assert!(output.status.success());
    assert!(
        fs::read_to_string(dir.path().join("a.json"))
            .unwrap()
            .contains("\"x\": \"1\"")
    );
}

#[test]
fn test_missing_input_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("people.csv"), "a\n").unwrap();

    let output = run(dir.path(), &["convert", "peple.csv", "--to", "json"]);
    assert_eq!(output.status.code(), Some(2));
    let err = stderr(&output);
    assert!(err.contains("does not exist"));
    assert!(err.contains("people.csv"));
}

#[test]
fn test_unsupported_format() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.csv"), "x\n1\n").unwrap();

    let output = run(dir.path(), &["convert", "a.csv", "--to", "jsno"]);
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("Did you mean 'json'?"));
}

#[test]
fn test_no_route() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.json"), "[]").unwrap();

    let output = run(dir.path(), &["convert", "a.json", "--to", "docx"]);
    assert_eq!(output.status.code(), Some(5));
    assert!(stderr(&output).contains("'docx' can be created from: odt"));
}

#[test]
fn test_conversion_failure() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("bad.json"), "{\"not\": \"an array\"}").unwrap();

    let output = run(dir.path(), &["convert", "bad.json", "--to", "csv"]);
    assert_eq!(output.status.code(), Some(4));
    assert!(!dir.path().join("bad.csv").exists());
}

#[test]
fn test_sink_target_requires_output() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.csv"), "x\n1\n").unwrap();

    let output = run(dir.path(), &["convert", "a.csv", "--to", "pg"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("requires -o"));

    let output = run(
        dir.path(),
        &["convert", "a.csv", "--to", "postgres", "-o", "db.json"],
    );
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_plan() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path(), &["plan", "sql", "yaml"]);
    let text = stdout(&output);

    assert!(output.status.success());
    assert!(text.contains("1. sql.sql-to-csv (sql -> csv)"));
    assert!(text.contains("2. data.csv-to-yaml (csv -> yaml)"));
}

#[test]
fn test_plan_json() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path(), &["plan", "postgresql", "json", "--json"]);
    assert!(output.status.success());

    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let steps = plan["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0]["converter_id"], "external.postgresql-to-csv");
    assert_eq!(steps[1]["to"], "json");
}

#[test]
fn test_plan_same_format_has_no_route() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path(), &["plan", "postgresql", "postgresql"]);
    assert_eq!(output.status.code(), Some(5));
}

#[cfg(unix)]
#[test]
fn test_configured_converter() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("shout.sh");
    fs::write(&script, "#!/bin/sh\ntr a-z A-Z < \"$1\" > \"$2\"\n").unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

    fs::write(
        dir.path().join("config.toml"),
        format!(
            "builtin_externals = false\n\n\
             [[converters]]\n\
             from = \"txt\"\n\
             to = \"shout\"\n\
             path = '{}'\n\
             description = \"Upper-case text\"\n",
            script.display()
        ),
    )
    .unwrap();
    fs::write(dir.path().join("note.txt"), "hello\n").unwrap();

    let output = run(dir.path(), &["list"]);
    assert!(stdout(&output).contains("Total: 10 converters"));
    assert!(stdout(&output).contains("Upper-case text"));

    let output = run(dir.path(), &["convert", "note.txt", "--to", "shout"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        fs::read_to_string(dir.path().join("note.shout")).unwrap(),
        "HELLO\n"
    );
}
