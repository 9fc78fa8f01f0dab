use std::fs;
use std::path::PathBuf;

use dm_api::load_script_json;
use dm_core::DmScriptError;

use crate::{map_cli_script_path, map_cli_script_read, LoadedScript};

pub(crate) fn resolve_script_path(script: &str) -> Result<PathBuf, DmScriptError> {
    let path = PathBuf::from(script);
    let absolute = if path.is_absolute() {
        path
    } else {
        std::env::current_dir()
            .map_err(map_cli_script_path)?
            .join(path)
    };

    if !absolute.exists() {
        return Err(DmScriptError::new(
            "CLI_SCRIPT_NOT_FOUND",
            format!("script does not exist: {}", absolute.display()),
        ));
    }

    if !absolute.is_file() {
        return Err(DmScriptError::new(
            "CLI_SCRIPT_NOT_FILE",
            format!("script is not a file: {}", absolute.display()),
        ));
    }

    Ok(absolute)
}

pub(crate) fn read_script_source(script: &str) -> Result<(PathBuf, String), DmScriptError> {
    let path = resolve_script_path(script)?;
    let raw = fs::read_to_string(&path).map_err(map_cli_script_read)?;
    Ok((path, raw))
}

pub(crate) fn load_script_from_path(script: &str) -> Result<LoadedScript, DmScriptError> {
    let (path, raw) = read_script_source(script)?;
    let loaded = load_script_json(&raw)?;
    for warning in loaded.warnings() {
        tracing::warn!(script = %path.display(), "{}", warning.message);
    }

    Ok(LoadedScript {
        path: path.to_string_lossy().to_string(),
        script: loaded,
    })
}
