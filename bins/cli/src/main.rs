//! CLI binary entrypoint.

mod commands;
mod error;
mod format;
mod logging;

use agent_infra_config::to_pretty_toml;
use agent_infra_shared::ErrorEnvelope;
use clap::{Parser, Subcommand};
use commands::{run_check, run_envs, run_resolve, run_schema};
use error::{CliError, ExitCode};
use format::{OutputArgs, OutputMode};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "infra-params",
    version,
    about = "Resolve deployment parameters for the agent stacks",
    long_about = None
)]
struct Cli {
    #[command(flatten)]
    output: OutputArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the resolved parameters for an environment.
    Resolve {
        /// Target environment (dev, stg, prd).
        #[arg(long, short)]
        env: String,
        /// Optional `.env` file; process variables take precedence.
        #[arg(long)]
        env_file: Option<PathBuf>,
    },
    /// Validate inputs for an environment without printing parameters.
    Check {
        /// Target environment (dev, stg, prd).
        #[arg(long, short)]
        env: String,
        /// Optional `.env` file; process variables take precedence.
        #[arg(long)]
        env_file: Option<PathBuf>,
    },
    /// List the known environments and their overrides.
    Envs,
    /// Print the JSON Schema of the resolved parameters.
    Schema,
}

pub(crate) struct CliOutput {
    stdout: String,
    stderr: String,
    exit_code: ExitCode,
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let mode = OutputMode::from_args(&cli.output);
    logging::init_tracing(mode.verbosity);

    match run(&cli.command, mode) {
        Ok(output) => match write_output(&output) {
            Ok(()) => std::process::ExitCode::from(output.exit_code.as_u8()),
            Err(error) => exit_with_error(&error),
        },
        Err(error) => exit_with_error(&error),
    }
}

fn exit_with_error(error: &CliError) -> std::process::ExitCode {
    let _ = writeln!(io::stderr(), "error: {error}");
    std::process::ExitCode::from(error.exit_code().as_u8())
}

fn run(command: &Commands, mode: OutputMode) -> Result<CliOutput, CliError> {
    match command {
        Commands::Resolve { env, env_file } => run_resolve(mode, env, env_file.as_deref()),
        Commands::Check { env, env_file } => run_check(mode, env, env_file.as_deref()),
        Commands::Envs => run_envs(mode),
        Commands::Schema => run_schema(),
    }
}

fn write_output(output: &CliOutput) -> Result<(), CliError> {
    if !output.stdout.is_empty() {
        let mut stdout = io::stdout().lock();
        stdout.write_all(output.stdout.as_bytes())?;
        stdout.flush()?;
    }
    if !output.stderr.is_empty() {
        let mut stderr = io::stderr().lock();
        stderr.write_all(output.stderr.as_bytes())?;
        stderr.flush()?;
    }
    Ok(())
}

const JSON_ERROR_FALLBACK: &str =
    "{\"status\":\"error\",\"error\":{\"code\":\"core:internal\",\"message\":\"internal error\"}}";
const TOML_ERROR_FALLBACK: &str =
    "status = \"error\"\n\n[error]\ncode = \"core:internal\"\nmessage = \"internal error\"\n";

#[derive(Serialize)]
struct ErrorPayload<'a> {
    status: &'static str,
    error: &'a ErrorEnvelope,
}

/// Render a failure: structured payload on stdout for json/toml, text on stderr.
pub(crate) fn format_error_output(mode: OutputMode, error: &ErrorEnvelope) -> CliOutput {
    let exit_code = ExitCode::for_envelope(error);
    tracing::info!(code = %error.code, exit_code = exit_code.as_u8(), "command failed");

    let payload = ErrorPayload {
        status: "error",
        error,
    };

    if mode.is_json() {
        // This is a CLI boundary, so JSON serialization errors are internal.
        let mut stdout = serde_json::to_string_pretty(&payload)
            .unwrap_or_else(|_| JSON_ERROR_FALLBACK.to_owned());
        stdout.push('\n');
        return CliOutput {
            stdout,
            stderr: String::new(),
            exit_code,
        };
    }

    if mode.is_toml() {
        let stdout =
            to_pretty_toml(&payload).unwrap_or_else(|_| TOML_ERROR_FALLBACK.to_owned());
        return CliOutput {
            stdout,
            stderr: String::new(),
            exit_code,
        };
    }

    CliOutput {
        stdout: String::new(),
        stderr: format_error_text(error),
        exit_code,
    }
}

fn format_error_text(error: &ErrorEnvelope) -> String {
    let mut out = String::new();
    out.push_str("status: error\n");
    out.push_str("code: ");
    out.push_str(&error.code.to_string());
    out.push('\n');
    out.push_str("message: ");
    out.push_str(&error.message);
    out.push('\n');
    out.push_str("kind: ");
    out.push_str(&error.kind.to_string());
    out.push('\n');

    if !error.metadata.is_empty() {
        out.push_str("meta:\n");
        for (key, value) in &error.metadata {
            out.push_str("  ");
            out.push_str(key);
            out.push_str(": ");
            out.push_str(value);
            out.push('\n');
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_infra_shared::ErrorCode;
    use crate::format::{OutputFormat, Verbosity};

    fn mode(format: OutputFormat) -> OutputMode {
        OutputMode {
            format,
            verbosity: Verbosity::Quiet,
        }
    }

    #[test]
    fn text_errors_go_to_stderr() {
        let error = ErrorEnvelope::expected(ErrorCode::new("config", "validation_failed"), "bad")
            .with_metadata("keys", "API_KEY");
        let output = format_error_output(mode(OutputFormat::Text), &error);

        assert!(output.stdout.is_empty());
        assert!(output.stderr.contains("code: config:validation_failed"));
        assert!(output.stderr.contains("  keys: API_KEY"));
        assert_eq!(output.exit_code, ExitCode::InvalidInput);
    }

    #[test]
    fn json_errors_are_structured() -> Result<(), serde_json::Error> {
        let code = ErrorCode::new("domain", "invalid_environment_name");
        let error = ErrorEnvelope::expected(code, "bad");
        let output = format_error_output(mode(OutputFormat::Json), &error);
        let value: serde_json::Value = serde_json::from_str(&output.stdout)?;

        assert_eq!(value.get("status"), Some(&serde_json::json!("error")));
        assert_eq!(
            value.pointer("/error/code/namespace"),
            Some(&serde_json::json!("domain"))
        );
        Ok(())
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
