//! Check command handler.

use crate::error::{CliError, ExitCode};
use crate::format::OutputMode;
use crate::{CliOutput, format_error_output};
use agent_infra_config::{RECOGNIZED_KEYS, resolve_std_env, to_pretty_json, to_pretty_toml};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckSummary {
    status: &'static str,
    env: String,
    account_id: String,
    validated_keys: Vec<&'static str>,
}

/// Run the check command: validate inputs without printing parameters.
pub fn run_check(
    mode: OutputMode,
    env: &str,
    env_file: Option<&Path>,
) -> Result<CliOutput, CliError> {
    let params = match resolve_std_env(env, env_file) {
        Ok(params) => params,
        Err(error) => return Ok(format_error_output(mode, &error.into())),
    };

    let present = params.dotenv().to_env_vars();
    let summary = CheckSummary {
        status: "ok",
        env: params.env_name().to_string(),
        account_id: params.dotenv().aws_account_id().to_string(),
        validated_keys: RECOGNIZED_KEYS
            .into_iter()
            .filter(|key| present.contains_key(*key))
            .collect(),
    };

    let stdout = if mode.is_json() {
        to_pretty_json(&summary)?
    } else if mode.is_toml() {
        to_pretty_toml(&summary)?
    } else {
        format!(
            "status: {}\nenv: {}\naccount: {}\nkeys: {}\n",
            summary.status,
            summary.env,
            summary.account_id,
            summary.validated_keys.join(", ")
        )
    };

    Ok(CliOutput {
        stdout,
        stderr: String::new(),
        exit_code: ExitCode::Ok,
    })
}
