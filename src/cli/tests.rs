//! Unit tests for CLI commands

use crate::cli::{run_cli, Cli, Commands, LogFormatArg};
use crate::logging::LogFormat;
use clap::Parser;
use serde_json::Value;
use std::io::Write;

const DOCUMENT: &str = r#"
models:
  - name: Person
    attributes:
      - { name: name, type: string }
      - { name: first_name, type: string, required: false }
      - { name: last_name, type: string, required: false }
"#;

fn schema_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    file.write_all(DOCUMENT.as_bytes()).unwrap();
    file
}

fn run(args: &[&str]) -> anyhow::Result<Value> {
    let cli = Cli::try_parse_from(args)?;
    let mut out = Vec::new();
    run_cli(&cli, &mut out)?;
    Ok(serde_json::from_slice(&out)?)
}

#[test]
fn test_validate_command_with_flags() {
    let cli = Cli::try_parse_from([
        "brrtbind",
        "validate",
        "--schema",
        "models.yaml",
        "--model",
        "Person",
        "--minified-input",
        "--complete",
    ])
    .unwrap();

    match cli.command {
        Commands::Validate {
            target,
            input,
            minified_input,
            minified_output,
            complete,
            ..
        } => {
            assert_eq!(target.schema.to_string_lossy(), "models.yaml");
            assert_eq!(target.model, "Person");
            assert!(input.is_none());
            assert!(minified_input);
            assert!(!minified_output);
            assert!(complete);
        }
        _ => panic!("Expected Validate command"),
    }
}

#[test]
fn test_model_is_required() {
    assert!(Cli::try_parse_from(["brrtbind", "keys", "--schema", "models.yaml"]).is_err());
}

#[test]
fn test_log_flags_override_environment() {
    let cli = Cli::try_parse_from([
        "brrtbind",
        "--log-level",
        "debug",
        "--log-format",
        "json",
        "blueprint",
        "-s",
        "models.yaml",
        "-m",
        "Person",
    ])
    .unwrap();
    assert_eq!(cli.log_format, Some(LogFormatArg::Json));
    let config = cli.log_config();
    assert_eq!(config.log_level, "debug");
    assert_eq!(config.format, LogFormat::Json);
}

#[test]
fn test_keys_command_output() {
    let file = schema_file();
    let path = file.path().to_str().unwrap();
    let keys = run(&["brrtbind", "keys", "-s", path, "-m", "Person"]).unwrap();
    assert_eq!(keys["model"], "Person");
    assert_eq!(keys["tokens"]["first_name"], "a");
    assert_eq!(keys["tokens"]["last_name"], "b");
    assert_eq!(keys["tokens"]["name"], "c");
    let token = keys["schema_token"].as_str().unwrap();
    assert_eq!(keys["rewrite_map"]["name"], format!("c_{token}"));
}

#[test]
fn test_filter_command_output() {
    let file = schema_file();
    let path = file.path().to_str().unwrap();
    let filter = run(&[
        "brrtbind",
        "filter",
        "-s",
        path,
        "-m",
        "Person",
        "--default-hidden",
        "--complete",
    ])
    .unwrap();
    assert_eq!(
        filter,
        serde_json::json!({"name": false, "first_name": false, "last_name": false})
    );
}

#[test]
fn test_unknown_model_fails() {
    let file = schema_file();
    let path = file.path().to_str().unwrap();
    let err = run(&["brrtbind", "blueprint", "-s", path, "-m", "Nobody"]).unwrap_err();
    assert!(err.to_string().contains("Nobody"));
}
