//! Resolve flow E2E tests: output must be deterministic across runs.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("crates")
        .join("config")
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn run_resolve(env: &str, output: &str) -> io::Result<String> {
    let mut command = Command::new(env!("CARGO_BIN_EXE_infra-params"));
    command
        .args(["resolve", "--env", env, "--output", output, "--quiet", "--env-file"])
        .arg(fixture("valid.env"));
    for key in [
        "API_KEY",
        "AWS_ACCOUNT_ID",
        "AGENT_MODEL_ID",
        "ALLOWED_ORIGIN",
        "ALLOWED_IPV4_CIDRS",
        "ENABLE_WAF",
        "LOG_RETENTION_DAYS",
    ] {
        command.env_remove(key);
    }
    let result = command.output()?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        return Err(io::Error::other(format!("resolve failed: {stderr}")));
    }

    Ok(String::from_utf8_lossy(&result.stdout).to_string())
}

#[test]
fn resolve_output_is_deterministic() -> io::Result<()> {
    for env in ["dev", "stg", "prd"] {
        for output in ["json", "toml", "text"] {
            let first = run_resolve(env, output)?;
            let second = run_resolve(env, output)?;
            assert_eq!(first, second, "{env}/{output} output should be deterministic");
        }
    }
    Ok(())
}

#[test]
fn toml_output_carries_prefix_and_tags() -> io::Result<()> {
    let toml = run_resolve("stg", "toml")?;
    assert!(toml.contains("prefix = \"stg\""));
    assert!(toml.contains("Environment = \"stg\""));
    assert!(toml.contains("apiKey = \"[REDACTED]\""));
    assert!(!toml.contains("sk-fixture"));
    Ok(())
}
