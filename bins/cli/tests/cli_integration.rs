//! CLI integration tests.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const RECOGNIZED_KEYS: [&str; 7] = [
    "API_KEY",
    "AWS_ACCOUNT_ID",
    "AGENT_MODEL_ID",
    "ALLOWED_ORIGIN",
    "ALLOWED_IPV4_CIDRS",
    "ENABLE_WAF",
    "LOG_RETENTION_DAYS",
];

fn run_cli_clean_env(args: &[&str], vars: &[(&str, &str)]) -> std::io::Result<Output> {
    let mut command = Command::new(env!("CARGO_BIN_EXE_infra-params"));
    command.args(args).env_remove("RUST_LOG");
    for key in RECOGNIZED_KEYS {
        command.env_remove(key);
    }
    for (key, value) in vars {
        command.env(key, value);
    }
    command.output()
}

fn workspace_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .unwrap_or_else(|| manifest_dir.to_path_buf())
}

fn fixture_path(name: &str) -> String {
    workspace_root()
        .join("crates")
        .join("config")
        .join("tests")
        .join("fixtures")
        .join(name)
        .to_string_lossy()
        .to_string()
}

#[test]
fn cli_version_runs() -> std::io::Result<()> {
    let output = run_cli_clean_env(&["--version"], &[])?;
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.starts_with("infra-params "));
    Ok(())
}

#[test]
fn resolve_with_env_file_prints_text() -> std::io::Result<()> {
    let env_file = fixture_path("valid.env");
    let output = run_cli_clean_env(&["resolve", "--env", "dev", "--env-file", &env_file], &[])?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(output.status.success(), "resolve failed: {stderr}");
    assert!(stdout.contains("env: dev"));
    assert!(stdout.contains("prefix: dev"));
    assert!(stdout.contains("  API_KEY: [REDACTED]"));
    assert!(stdout.contains("diffEnv: none"));
    assert!(!stdout.contains("sk-fixture"));
    Ok(())
}

#[test]
fn resolve_json_uses_process_env() -> Result<(), Box<dyn std::error::Error>> {
    let output = run_cli_clean_env(
        &["resolve", "--env", "prd", "--output", "json", "--quiet"],
        &[("API_KEY", "sk-process"), ("AWS_ACCOUNT_ID", "000000000042")],
    )?;
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value.get("envName"), Some(&serde_json::json!("prd")));
    assert_eq!(
        value.pointer("/dotenv/awsAccountId"),
        Some(&serde_json::json!("000000000042"))
    );
    assert_eq!(
        value.pointer("/dotenv/apiKey"),
        Some(&serde_json::json!("[REDACTED]"))
    );
    assert_eq!(value.get("diffEnv"), Some(&serde_json::json!({})));
    Ok(())
}

#[test]
fn process_env_overrides_env_file() -> Result<(), Box<dyn std::error::Error>> {
    let env_file = fixture_path("missing-api-key.env");
    let output = run_cli_clean_env(
        &[
            "check",
            "--env",
            "stg",
            "--env-file",
            &env_file,
            "--output",
            "json",
        ],
        &[("API_KEY", "sk-process"), ("ENABLE_WAF", "true")],
    )?;
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value.get("status"), Some(&serde_json::json!("ok")));
    assert_eq!(
        value.get("validatedKeys"),
        Some(&serde_json::json!(["API_KEY", "AWS_ACCOUNT_ID", "ENABLE_WAF"]))
    );
    Ok(())
}

#[test]
fn unknown_environment_exits_with_invalid_input() -> std::io::Result<()> {
    let output = run_cli_clean_env(&["resolve", "--env", "staging"], &[])?;
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr.contains("code: domain:invalid_environment_name"));
    assert!(stderr.contains("input: staging"));
    Ok(())
}

#[test]
fn missing_required_keys_are_reported_together() -> Result<(), Box<dyn std::error::Error>> {
    let output = run_cli_clean_env(&["check", "--env", "dev", "--output", "json"], &[])?;
    assert_eq!(output.status.code(), Some(2));

    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(
        value.pointer("/error/code/code"),
        Some(&serde_json::json!("validation_failed"))
    );
    assert_eq!(
        value.pointer("/error/metadata/keys"),
        Some(&serde_json::json!("API_KEY,AWS_ACCOUNT_ID"))
    );
    Ok(())
}

#[test]
fn missing_required_keys_render_as_toml() -> std::io::Result<()> {
    let output = run_cli_clean_env(&["check", "--env", "dev", "--output", "toml"], &[])?;
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(2));
    assert!(stdout.contains("status = \"error\""), "{stdout}");
    assert!(stdout.contains("[error.code]"), "{stdout}");
    assert!(stdout.contains("namespace = \"config\""), "{stdout}");
    assert!(stdout.contains("code = \"validation_failed\""), "{stdout}");
    assert!(stdout.contains("[error.metadata]"), "{stdout}");
    assert!(stdout.contains("keys = \"API_KEY,AWS_ACCOUNT_ID\""), "{stdout}");
    Ok(())
}

#[test]
fn unreadable_env_file_exits_with_io() -> std::io::Result<()> {
    let fixtures_dir = workspace_root()
        .join("crates")
        .join("config")
        .join("tests")
        .join("fixtures");
    let fixtures_dir = fixtures_dir.to_string_lossy();
    let output = run_cli_clean_env(
        &["check", "--env", "dev", "--env-file", &fixtures_dir],
        &[],
    )?;
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(3), "{stderr}");
    assert!(stderr.contains("code: config:dotenv_io"), "{stderr}");
    Ok(())
}

#[test]
fn missing_env_file_is_invalid_input() -> std::io::Result<()> {
    let output = run_cli_clean_env(
        &["check", "--env", "dev", "--env-file", "/no/such/dir/.env"],
        &[],
    )?;
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr.contains("config:dotenv_not_found"));
    Ok(())
}

#[test]
fn envs_lists_closed_set() -> Result<(), Box<dyn std::error::Error>> {
    let output = run_cli_clean_env(&["envs", "--output", "json"], &[])?;
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    let names: Vec<&str> = value
        .get("environments")
        .and_then(serde_json::Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get("name").and_then(serde_json::Value::as_str))
                .collect()
        })
        .unwrap_or_default();
    assert_eq!(names, vec!["dev", "stg", "prd"]);
    Ok(())
}

#[test]
fn schema_is_valid_json() -> Result<(), Box<dyn std::error::Error>> {
    let output = run_cli_clean_env(&["schema"], &[])?;
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert!(value.pointer("/properties/envName").is_some());
    Ok(())
}
