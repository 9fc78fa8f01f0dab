use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use dm_core::DmScriptError;

use crate::{
    map_cli_json, map_cli_state_invalid, map_cli_state_read, map_cli_state_write, AgentState,
    AGENT_STATE_SCHEMA,
};

/// Rejects state that `agent say` could not resume from.
pub(crate) fn check_agent_state(state: &AgentState) -> Result<(), DmScriptError> {
    if state.schema_version != AGENT_STATE_SCHEMA {
        return Err(DmScriptError::new(
            "CLI_STATE_SCHEMA",
            format!("Unsupported agent state schema: {}", state.schema_version),
        ));
    }
    if state.max_steps == 0 {
        return Err(DmScriptError::new(
            "CLI_STATE_MAX_STEPS",
            "maxSteps must allow at least one step.",
        ));
    }
    if !Path::new(&state.script_path).is_absolute() {
        return Err(DmScriptError::new(
            "CLI_STATE_SCRIPT_PATH",
            format!("Script path is not absolute: {}", state.script_path),
        ));
    }
    if state.session.session_id.trim().is_empty() {
        return Err(DmScriptError::new(
            "CLI_STATE_INVALID",
            "Session id is empty.",
        ));
    }
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    path.with_file_name(name)
}

/// Written to a sibling file first and renamed over `path`, so an interrupted
/// write never leaves a truncated state behind.
pub(crate) fn save_agent_state(path: &Path, state: &AgentState) -> Result<(), DmScriptError> {
    check_agent_state(state)?;

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(map_cli_state_write)?;
    }

    let payload = serde_json::to_string_pretty(state).map_err(map_cli_json)?;
    let staging = staging_path(path);
    fs::write(&staging, payload).map_err(map_cli_state_write)?;
    fs::rename(&staging, path).map_err(map_cli_state_write)
}

pub(crate) fn load_agent_state(path: &Path) -> Result<AgentState, DmScriptError> {
    let raw = fs::read_to_string(path).map_err(|error| match error.kind() {
        ErrorKind::NotFound => DmScriptError::new(
            "CLI_STATE_NOT_FOUND",
            format!("State file does not exist: {}", path.display()),
        ),
        _ => map_cli_state_read(error),
    })?;

    let state: AgentState = serde_json::from_str(&raw).map_err(map_cli_state_invalid)?;
    check_agent_state(&state)?;
    Ok(state)
}
