use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value::DmValue;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptDefinition {
    pub id: String,
    pub version: u32,
    pub entry_node_id: String,
    #[serde(default)]
    pub nodes: Vec<NodeDefinition>,
    #[serde(default)]
    pub variables: Vec<VariableDecl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDefinition {
    pub id: String,
    pub kind: NodeKind,
    #[serde(default)]
    pub template: String,
    #[serde(default)]
    pub transitions: Vec<TransitionDefinition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    Message,
    Decision,
    Terminal,
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::Decision => "decision",
            Self::Terminal => "terminal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionDefinition {
    pub target_node_id: String,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub matcher: MatcherSpec,
    #[serde(default)]
    pub captures: Vec<String>,
    #[serde(default)]
    pub intent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MatcherSpec {
    Keyword {
        keywords: Vec<String>,
    },
    Pattern {
        pattern: String,
    },
    #[default]
    CatchAll,
}

impl MatcherSpec {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Keyword { .. } => "keyword",
            Self::Pattern { .. } => "pattern",
            Self::CatchAll => "catchAll",
        }
    }

    pub fn is_catch_all(&self) -> bool {
        matches!(self, Self::CatchAll)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableDecl {
    pub name: String,
    pub r#type: VariableType,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum VariableType {
    String,
    Number,
    Enum { values: Vec<String> },
}

impl VariableType {
    pub fn name(&self) -> String {
        match self {
            Self::String => "string".to_string(),
            Self::Number => "number".to_string(),
            Self::Enum { values } => format!("enum({})", values.join("|")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationErrorKind {
    DanglingTarget,
    DuplicateNodeId,
    MissingEntryNode,
    MisplacedCatchAll,
    UndeclaredVariable,
    MessageTransitionCount,
    MessageCycle,
    TerminalTransitions,
    InvalidPattern,
    EmptyKeywords,
    CaptureWithoutPattern,
    DuplicateVariable,
    EmptyEnum,
}

impl ValidationErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            Self::DanglingTarget => "SCRIPT_DANGLING_TARGET",
            Self::DuplicateNodeId => "SCRIPT_DUPLICATE_NODE",
            Self::MissingEntryNode => "SCRIPT_MISSING_ENTRY",
            Self::MisplacedCatchAll => "SCRIPT_CATCH_ALL_NOT_FINAL",
            Self::UndeclaredVariable => "SCRIPT_UNDECLARED_VARIABLE",
            Self::MessageTransitionCount => "SCRIPT_MESSAGE_TRANSITION_COUNT",
            Self::MessageCycle => "SCRIPT_MESSAGE_CYCLE",
            Self::TerminalTransitions => "SCRIPT_TERMINAL_TRANSITIONS",
            Self::InvalidPattern => "SCRIPT_INVALID_PATTERN",
            Self::EmptyKeywords => "SCRIPT_EMPTY_KEYWORDS",
            Self::CaptureWithoutPattern => "SCRIPT_CAPTURE_WITHOUT_PATTERN",
            Self::DuplicateVariable => "SCRIPT_DUPLICATE_VARIABLE",
            Self::EmptyEnum => "SCRIPT_EMPTY_ENUM",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationWarningKind {
    UnreachableNode,
    DeadEndDecision,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionStatus {
    Active,
    Completed,
    Failed,
}

impl SessionStatus {
    pub fn name(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSession {
    pub session_id: String,
    pub script_id: String,
    pub script_version: u32,
    pub current_node_id: String,
    #[serde(default)]
    pub bindings: BTreeMap<String, DmValue>,
    #[serde(default)]
    pub visited_node_ids: Vec<String>,
    pub status: SessionStatus,
    #[serde(default)]
    pub step_count: u32,
}

impl ConversationSession {
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InvalidStateReason {
    SessionNotActive,
    ScriptMismatch,
    UnknownNode,
    TerminalWhileActive,
}

impl InvalidStateReason {
    pub fn name(self) -> &'static str {
        match self {
            Self::SessionNotActive => "sessionNotActive",
            Self::ScriptMismatch => "scriptMismatch",
            Self::UnknownNode => "unknownNode",
            Self::TerminalWhileActive => "terminalWhileActive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum StepOutcome {
    #[serde(rename_all = "camelCase")]
    Advanced {
        message: String,
        unresolved_placeholders: Vec<String>,
    },
    AwaitingInput,
    #[serde(rename_all = "camelCase")]
    Completed {
        message: String,
        unresolved_placeholders: Vec<String>,
    },
    LoopLimitExceeded,
    InvalidState {
        reason: InvalidStateReason,
    },
}

impl StepOutcome {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Advanced { .. } => "advanced",
            Self::AwaitingInput => "awaitingInput",
            Self::Completed { .. } => "completed",
            Self::LoopLimitExceeded => "loopLimitExceeded",
            Self::InvalidState { .. } => "invalidState",
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Advanced { message, .. } | Self::Completed { message, .. } => {
                Some(message.as_str())
            }
            _ => None,
        }
    }

    pub fn unresolved_placeholders(&self) -> &[String] {
        match self {
            Self::Advanced {
                unresolved_placeholders,
                ..
            }
            | Self::Completed {
                unresolved_placeholders,
                ..
            } => unresolved_placeholders,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum StepWarning {
    #[serde(rename_all = "camelCase")]
    TypeMismatch {
        variable: String,
        raw_value: String,
        expected: String,
    },
    #[serde(rename_all = "camelCase")]
    UnresolvedPlaceholder { node_id: String, name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepSignal {
    pub session_id: String,
    pub script_id: String,
    pub script_version: u32,
    pub from_node_id: String,
    pub to_node_id: String,
    pub outcome: String,
    pub intent: Option<String>,
    pub step_count: u32,
}

#[cfg(test)]
mod types_tests {
    use super::*;

    #[test]
    fn status_and_reason_names_match_serialized_form() {
        for status in [
            SessionStatus::Active,
            SessionStatus::Completed,
            SessionStatus::Failed,
        ] {
            assert_eq!(
                serde_json::to_value(status).expect("status should serialize"),
                serde_json::Value::String(status.name().to_string())
            );
        }
        for reason in [
            InvalidStateReason::SessionNotActive,
            InvalidStateReason::ScriptMismatch,
            InvalidStateReason::UnknownNode,
            InvalidStateReason::TerminalWhileActive,
        ] {
            assert_eq!(
                serde_json::to_value(reason).expect("reason should serialize"),
                serde_json::Value::String(reason.name().to_string())
            );
        }
    }

    #[test]
    fn script_definition_deserializes_camel_case_document() {
        let parsed: ScriptDefinition = serde_json::from_str(
            r#"{
  "id": "shop",
  "version": 2,
  "entryNodeId": "start",
  "nodes": [
    {
      "id": "start",
      "kind": "decision",
      "template": "Hi ${name}",
      "transitions": [
        {"targetNodeId": "end", "priority": 1, "matcher": {"kind": "keyword", "keywords": ["bye"]}, "intent": "leave"},
        {"targetNodeId": "start", "priority": 2, "matcher": {"kind": "pattern", "pattern": "size (?P<size>\\w+)"}, "captures": ["size"]},
        {"targetNodeId": "start", "priority": 3}
      ]
    },
    {"id": "end", "kind": "terminal"}
  ],
  "variables": [
    {"name": "name", "type": {"kind": "string"}, "required": true},
    {"name": "size", "type": {"kind": "enum", "values": ["S", "M"]}}
  ]
}"#,
        )
        .expect("definition should deserialize");

        assert_eq!(parsed.version, 2);
        assert_eq!(parsed.nodes.len(), 2);
        let transitions = &parsed.nodes[0].transitions;
        assert_eq!(transitions[0].intent.as_deref(), Some("leave"));
        assert_eq!(transitions[1].matcher.kind_name(), "pattern");
        assert!(transitions[2].matcher.is_catch_all());
        assert_eq!(parsed.nodes[1].template, "");
        assert!(parsed.variables[0].required);
        assert_eq!(parsed.variables[1].r#type.name(), "enum(S|M)");
    }

    #[test]
    fn step_outcome_serializes_with_kind_tag() {
        let outcome = StepOutcome::Advanced {
            message: "ok".to_string(),
            unresolved_placeholders: vec!["size".to_string()],
        };
        let json = serde_json::to_value(&outcome).expect("outcome should serialize");
        assert_eq!(json["kind"], "advanced");
        assert_eq!(json["unresolvedPlaceholders"][0], "size");
        assert_eq!(outcome.message(), Some("ok"));
        assert_eq!(StepOutcome::AwaitingInput.unresolved_placeholders().len(), 0);
    }

    #[test]
    fn session_round_trips_through_json() {
        let mut bindings = BTreeMap::new();
        bindings.insert("qty".to_string(), DmValue::Number(2.0));
        let session = ConversationSession {
            session_id: "s1".to_string(),
            script_id: "shop".to_string(),
            script_version: 1,
            current_node_id: "start".to_string(),
            bindings,
            visited_node_ids: vec!["start".to_string()],
            status: SessionStatus::Active,
            step_count: 0,
        };
        let raw = serde_json::to_string(&session).expect("session should serialize");
        assert!(raw.contains("\"currentNodeId\":\"start\""));
        assert!(raw.contains("\"status\":\"active\""));
        let parsed: ConversationSession =
            serde_json::from_str(&raw).expect("session should deserialize");
        assert_eq!(parsed, session);
        assert!(parsed.is_active());
    }
}
