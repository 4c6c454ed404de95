//! Resolve command handler.

use crate::error::{CliError, ExitCode};
use crate::format::OutputMode;
use crate::{CliOutput, format_error_output};
use agent_infra_config::{ResolvedParameters, resolve_std_env, to_pretty_json, to_pretty_toml};
use agent_infra_shared::redact_if_secret;
use std::fmt::Write as _;
use std::path::Path;

/// Run the resolve command.
pub fn run_resolve(
    mode: OutputMode,
    env: &str,
    env_file: Option<&Path>,
) -> Result<CliOutput, CliError> {
    let params = match resolve_std_env(env, env_file) {
        Ok(params) => params,
        Err(error) => return Ok(format_error_output(mode, &error.into())),
    };

    let stdout = if mode.is_json() {
        to_pretty_json(&params)?
    } else if mode.is_toml() {
        to_pretty_toml(&params)?
    } else {
        format_params_text(&params)
    };

    Ok(CliOutput {
        stdout,
        stderr: String::new(),
        exit_code: ExitCode::Ok,
    })
}

fn format_params_text(params: &ResolvedParameters) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "env: {}", params.env_name());
    let _ = writeln!(out, "prefix: {}", params.prefix());
    let _ = writeln!(out, "project: {}", params.project());
    let _ = writeln!(out, "region: {}", params.region());
    let _ = writeln!(out, "edgeRegion: {}", params.edge_region());

    out.push_str("tags:\n");
    for (key, value) in params.tags() {
        let _ = writeln!(out, "  {key}: {value}");
    }

    out.push_str("dotenv:\n");
    for (key, value) in params.dotenv().to_env_vars() {
        let _ = writeln!(out, "  {key}: {}", redact_if_secret(&key, &value));
    }

    let entries = params.diff_env().entries();
    if entries.is_empty() {
        out.push_str("diffEnv: none\n");
    } else {
        out.push_str("diffEnv:\n");
        for (key, value) in entries {
            let _ = writeln!(out, "  {key}: {value}");
        }
    }

    out
}
