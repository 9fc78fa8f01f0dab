use std::collections::BTreeMap;
use std::sync::RwLock;

use dm_core::{ConversationSession, DmScriptError, ScriptDefinition, ValidationError};

pub use dm_compiler::{get_node, Script};
pub use dm_runtime::{
    create_session, create_session_with_bindings, current_prompt, step, ConversationExecutor,
    ExecutorOptions, Rendered, StepResult, DEFAULT_MAX_STEPS,
};

pub trait SessionStore: Send + Sync {
    fn load(&self, session_id: &str) -> Result<Option<ConversationSession>, DmScriptError>;
    fn save(&self, session: &ConversationSession) -> Result<(), DmScriptError>;
    fn remove(&self, session_id: &str) -> Result<(), DmScriptError>;
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<BTreeMap<String, ConversationSession>>,
}

fn poisoned() -> DmScriptError {
    DmScriptError::new("API_STORE_POISONED", "Session store lock is poisoned.")
}

impl MemorySessionStore {
    pub fn len(&self) -> Result<usize, DmScriptError> {
        let sessions = self.sessions.read().map_err(|_| poisoned())?;
        Ok(sessions.len())
    }

    pub fn is_empty(&self) -> Result<bool, DmScriptError> {
        Ok(self.len()? == 0)
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self, session_id: &str) -> Result<Option<ConversationSession>, DmScriptError> {
        let sessions = self.sessions.read().map_err(|_| poisoned())?;
        Ok(sessions.get(session_id).cloned())
    }

    fn save(&self, session: &ConversationSession) -> Result<(), DmScriptError> {
        let mut sessions = self.sessions.write().map_err(|_| poisoned())?;
        sessions.insert(session.session_id.clone(), session.clone());
        Ok(())
    }

    fn remove(&self, session_id: &str) -> Result<(), DmScriptError> {
        let mut sessions = self.sessions.write().map_err(|_| poisoned())?;
        sessions.remove(session_id);
        Ok(())
    }
}

pub fn parse_script_definition(raw_json: &str) -> Result<ScriptDefinition, DmScriptError> {
    serde_json::from_str(raw_json)
        .map_err(|error| DmScriptError::new("API_SCRIPT_JSON", error.to_string()))
}

pub fn validate_script(raw: &ScriptDefinition) -> Result<Script, Vec<ValidationError>> {
    dm_compiler::validate_script(raw)
}

/// Every validation error of a JSON script, empty when it loads cleanly.
/// Malformed JSON is the only `Err`.
pub fn validate_script_json(raw_json: &str) -> Result<Vec<ValidationError>, DmScriptError> {
    let raw = parse_script_definition(raw_json)?;
    Ok(dm_compiler::validate_script(&raw).err().unwrap_or_default())
}

pub fn load_script_json(raw_json: &str) -> Result<Script, DmScriptError> {
    let raw = parse_script_definition(raw_json)?;
    dm_compiler::load(raw).map_err(collapse_validation_errors)
}

fn collapse_validation_errors(mut errors: Vec<ValidationError>) -> DmScriptError {
    if errors.len() == 1 {
        return errors.remove(0).into();
    }
    let message = errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    DmScriptError::new("API_SCRIPT_INVALID", message)
}

pub fn session_from_json(raw_json: &str) -> Result<ConversationSession, DmScriptError> {
    serde_json::from_str(raw_json)
        .map_err(|error| DmScriptError::new("API_SESSION_JSON", error.to_string()))
}

pub fn session_to_json(session: &ConversationSession) -> Result<String, DmScriptError> {
    serde_json::to_string(session)
        .map_err(|error| DmScriptError::new("API_SESSION_JSON", error.to_string()))
}

pub fn start_stored_session(
    store: &dyn SessionStore,
    script: &Script,
    session_id: &str,
) -> Result<ConversationSession, DmScriptError> {
    if store.load(session_id)?.is_some() {
        return Err(DmScriptError::new(
            "API_SESSION_EXISTS",
            format!("Session \"{}\" already exists.", session_id),
        ));
    }
    let session = create_session(script, session_id);
    store.save(&session)?;
    Ok(session)
}

pub fn step_stored_session(
    store: &dyn SessionStore,
    executor: &ConversationExecutor,
    script: &Script,
    session_id: &str,
    input: &str,
) -> Result<StepResult, DmScriptError> {
    let session = store.load(session_id)?.ok_or_else(|| {
        DmScriptError::new(
            "API_SESSION_NOT_FOUND",
            format!("Session \"{}\" is not stored.", session_id),
        )
    })?;
    let result = executor.step(script, &session, input);
    store.save(&result.session)?;
    Ok(result)
}
