//! CLI integration tests for schema2orm.
//!
//! These tests verify command-line argument parsing, help output,
//! and exit codes for error conditions that need no database.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

/// Get a command for the schema2orm binary.
fn cmd() -> Command {
    Command::cargo_bin("schema2orm").unwrap()
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_shows_all_commands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("owners"))
        .stdout(predicate::str::contains("tables"))
        .stdout(predicate::str::contains("sequences"))
        .stdout(predicate::str::contains("describe"))
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("health-check"));
}

#[test]
fn test_generate_subcommand_help() {
    cmd()
        .args(["generate", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--table"))
        .stdout(predicate::str::contains("--style"))
        .stdout(predicate::str::contains("--language"))
        .stdout(predicate::str::contains("--detect-sequence"))
        .stdout(predicate::str::contains("--entity"))
        .stdout(predicate::str::contains("--output"));
}

#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("schema2orm"));
}

// =============================================================================
// Global Flags Tests
// =============================================================================

#[test]
fn test_global_flags_listed() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--connection"))
        .stdout(predicate::str::contains("--output-json"))
        .stdout(predicate::str::contains("--log-format"))
        .stdout(predicate::str::contains("[default: text]"))
        .stdout(predicate::str::contains("--verbosity"))
        .stdout(predicate::str::contains("[default: info]"));
}

#[test]
fn test_config_default_path() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("[default: schema2orm.yaml]"));
}

#[test]
fn test_short_config_flag() {
    cmd()
        .args(["-c", "some_config.yaml", "--help"])
        .assert()
        .success();
}

// =============================================================================
// Exit Code Tests
// =============================================================================

#[test]
fn test_missing_config_exits_with_code_7() {
    // Missing file is an IO error (code 7), not config error (code 1)
    cmd()
        .args(["--config", "nonexistent_schema2orm.yaml", "health-check"])
        .assert()
        .code(7);
}

#[test]
fn test_invalid_yaml_exits_with_code_1() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "connection: [unclosed").unwrap();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "owners"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("YAML error"));
}

#[test]
fn test_empty_config_exits_with_code_1() {
    let file = tempfile::NamedTempFile::new().unwrap();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "health-check"])
        .assert()
        .code(1);
}

#[test]
fn test_missing_required_fields_exits_with_code_1() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "connection:").unwrap();
    writeln!(file, "  host: localhost").unwrap();
    writeln!(file, "  database: \"\"").unwrap();
    writeln!(file, "  user: postgres").unwrap();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "health-check"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_bad_connection_string_exits_with_code_1() {
    cmd()
        .args([
            "--config",
            "nonexistent_schema2orm.yaml",
            "--connection",
            "host=localhost port=notaport",
            "owners",
        ])
        .assert()
        .code(1);
}

#[test]
fn test_unknown_style_exits_with_code_1() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "connection:").unwrap();
    writeln!(file, "  host: localhost").unwrap();
    writeln!(file, "  database: shop").unwrap();
    writeln!(file, "  user: postgres").unwrap();
    writeln!(file, "preferences:").unwrap();
    writeln!(file, "  style: hibernate").unwrap();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "generate", "--table", "users"])
        .assert()
        .code(1);
}

// =============================================================================
// Argument Validation Tests
// =============================================================================

#[test]
fn test_generate_requires_table() {
    cmd()
        .arg("generate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--table"));
}

#[test]
fn test_sequence_conflicts_with_detect_sequence() {
    cmd()
        .args([
            "generate",
            "--table",
            "users",
            "--sequence",
            "users_id_seq",
            "--detect-sequence",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_sequences_table_requires_column() {
    cmd()
        .args(["sequences", "--table", "users"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--column"));
}

// =============================================================================
// Subcommand Existence Tests
// =============================================================================

#[test]
fn test_health_check_command_exists() {
    cmd()
        .args(["health-check", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Test the database connection"));
}

#[test]
fn test_describe_command_exists() {
    cmd()
        .args(["describe", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("columns, keys and relationships"));
}

// =============================================================================
// No Subcommand Tests
// =============================================================================

#[test]
fn test_no_subcommand_shows_help() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}
