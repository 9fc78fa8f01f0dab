use std::collections::BTreeMap;

use dm_core::{DmValue, SessionStatus};
use dm_runtime::StepResult;
use serde::{Deserialize, Serialize};

pub const TESTCASE_SCHEMA_V1: &str = "dm-tool-case.v1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub schema_version: String,
    #[serde(default = "default_session_id")]
    pub session_id: String,
    #[serde(default)]
    pub max_steps: Option<u32>,
    #[serde(default)]
    pub seed_bindings: BTreeMap<String, String>,
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub expected_steps: Vec<ExpectedStep>,
    #[serde(default)]
    pub expected_final: Option<ExpectedFinal>,
}

fn default_session_id() -> String {
    "simulation".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedStep {
    pub kind: String,
    pub node: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
}

impl ExpectedStep {
    pub fn observe(result: &StepResult) -> Self {
        Self {
            kind: result.outcome.kind_name().to_string(),
            node: result.session.current_node_id.clone(),
            message: result.outcome.message().map(str::to_string),
            intent: result.intent.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedFinal {
    pub status: SessionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bindings: Option<BTreeMap<String, DmValue>>,
}
