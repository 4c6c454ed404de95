//! Schema command handler.

use crate::CliOutput;
use crate::error::{CliError, ExitCode};
use agent_infra_config::resolved_parameters_schema;

/// Print the JSON Schema of resolved parameters (always JSON).
pub fn run_schema() -> Result<CliOutput, CliError> {
    let mut stdout = serde_json::to_string_pretty(&resolved_parameters_schema())?;
    stdout.push('\n');

    Ok(CliOutput {
        stdout,
        stderr: String::new(),
        exit_code: ExitCode::Ok,
    })
}
