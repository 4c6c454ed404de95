//! Envs command handler.

use crate::CliOutput;
use crate::error::{CliError, ExitCode};
use crate::format::OutputMode;
use agent_infra_config::{EnvOverrides, overrides_for, to_pretty_json, to_pretty_toml};
use agent_infra_domain::EnvironmentName;
use serde::Serialize;
use std::fmt::Write as _;

#[derive(Debug, Serialize)]
struct EnvironmentList {
    environments: Vec<EnvironmentSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EnvironmentSummary {
    name: EnvironmentName,
    production: bool,
    overrides: EnvOverrides,
}

/// Run the envs command: list the closed environment set.
pub fn run_envs(mode: OutputMode) -> Result<CliOutput, CliError> {
    let list = EnvironmentList {
        environments: EnvironmentName::ALL
            .into_iter()
            .map(|name| EnvironmentSummary {
                name,
                production: name.is_production(),
                overrides: overrides_for(name),
            })
            .collect(),
    };

    let stdout = if mode.is_json() {
        to_pretty_json(&list)?
    } else if mode.is_toml() {
        to_pretty_toml(&list)?
    } else {
        format_envs_text(&list)
    };

    Ok(CliOutput {
        stdout,
        stderr: String::new(),
        exit_code: ExitCode::Ok,
    })
}

fn format_envs_text(list: &EnvironmentList) -> String {
    let mut out = String::new();
    for summary in &list.environments {
        let overrides = summary
            .overrides
            .entries()
            .into_iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>();
        let _ = writeln!(
            out,
            "{}\tproduction: {}\toverrides: {}",
            summary.name,
            summary.production,
            if overrides.is_empty() {
                "none".to_owned()
            } else {
                overrides.join(",")
            }
        );
    }
    out
}
