use serde::{Deserialize, Serialize};

use dm_api::Script;
use dm_core::ConversationSession;

pub(crate) const AGENT_STATE_SCHEMA: &str = "dm-agent-state.v1";

#[derive(Debug, Clone)]
pub(crate) struct LoadedScript {
    pub(crate) path: String,
    pub(crate) script: Script,
}

/// What `agent say` needs to resume: the script to reload, the loop budget,
/// and the session snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AgentState {
    pub(crate) schema_version: String,
    pub(crate) script_path: String,
    pub(crate) max_steps: u32,
    pub(crate) session: ConversationSession,
}

impl AgentState {
    pub(crate) fn new(script_path: &str, max_steps: u32, session: ConversationSession) -> Self {
        Self {
            schema_version: AGENT_STATE_SCHEMA.to_string(),
            script_path: script_path.to_string(),
            max_steps,
            session,
        }
    }
}
