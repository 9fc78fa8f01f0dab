use std::ffi::OsString;

use clap::Parser;
use dm_api::{load_script_json, validate_script_json};
use dm_core::DmScriptError;

mod agent;
mod cli_args;
mod error_map;
mod models;
mod outcome_emitter;
mod script_loader;
mod state_store;

pub(crate) use cli_args::{AgentArgs, AgentCommand, Cli, Mode, SayArgs, StartArgs, ValidateArgs};
pub(crate) use error_map::{
    emit_error, json_string, map_cli_json, map_cli_script_path, map_cli_script_read,
    map_cli_state_invalid, map_cli_state_read, map_cli_state_write,
};
pub(crate) use models::{AgentState, LoadedScript, AGENT_STATE_SCHEMA};
pub(crate) use outcome_emitter::{emit_lines, started_lines, step_lines};
pub(crate) use script_loader::{load_script_from_path, read_script_source};
#[cfg(test)]
pub(crate) use script_loader::resolve_script_path;
pub(crate) use state_store::{load_agent_state, save_agent_state};

const LOG_ENV: &str = "DM_LOG";

/// Logs go to stderr; stdout carries only the line protocol.
fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run_cli_from_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            return error.exit_code();
        }
    };
    init_logging();
    match run(cli) {
        Ok(code) => code,
        Err(error) => emit_error(error),
    }
}

fn run(cli: Cli) -> Result<i32, DmScriptError> {
    match cli.command {
        Mode::Validate(args) => run_validate(args),
        Mode::Agent(args) => agent::run_agent(args),
    }
}

fn run_validate(args: ValidateArgs) -> Result<i32, DmScriptError> {
    let (_, raw) = read_script_source(&args.script)?;
    let errors = validate_script_json(&raw)?;
    if !errors.is_empty() {
        println!("RESULT:ERROR");
        println!("ERROR_CODE:CLI_SCRIPT_INVALID");
        for error in &errors {
            println!("ERROR_JSON:{}", serde_json::to_string(error).map_err(map_cli_json)?);
        }
        return Ok(1);
    }

    let script = load_script_json(&raw)?;
    println!("RESULT:OK");
    println!("EVENT:VALID");
    println!("SCRIPT:{}@{}", script.id(), script.version());
    for warning in script.warnings() {
        println!(
            "WARNING_JSON:{}",
            serde_json::to_string(warning).map_err(map_cli_json)?
        );
    }
    Ok(0)
}
