use std::collections::BTreeMap;

use dm_compiler::{collapse_whitespace, get_node, placeholder_regex, Matcher, Node, Script};
use dm_core::{
    ConversationSession, DmScriptError, DmValue, InvalidStateReason, NodeKind, SessionStatus,
    StepOutcome, StepSignal, StepWarning, VariableDecl, VariableType,
};

mod executor;
mod matcher;
mod resolver;

pub use executor::{
    create_session, create_session_with_bindings, current_prompt, step, ConversationExecutor,
    ExecutorOptions, StepResult, DEFAULT_MAX_STEPS,
};
pub use matcher::{match_transition, normalize_input, MatchResult};
pub use resolver::{bind, render, unresolved_marker, Rendered, TypeMismatch, UNRESOLVED_MARKER_PREFIX};

#[cfg(test)]
pub(crate) mod runtime_test_support {
    use super::*;
    use dm_core::ScriptDefinition;

    pub(crate) fn script_from_json(value: serde_json::Value) -> Script {
        let raw: ScriptDefinition =
            serde_json::from_value(value).expect("definition should deserialize");
        dm_compiler::load(raw).expect("script should load")
    }

    pub(crate) fn storefront_script() -> Script {
        script_from_json(serde_json::json!({
            "id": "storefront",
            "version": 1,
            "entryNodeId": "start",
            "nodes": [
                {
                    "id": "start",
                    "kind": "decision",
                    "template": "Hi! Want the price, or ready to buy?",
                    "transitions": [
                        {"targetNodeId": "price", "priority": 1, "intent": "ask_price",
                         "matcher": {"kind": "keyword", "keywords": ["price", "cost"]}},
                        {"targetNodeId": "checkout", "priority": 2, "intent": "buy",
                         "matcher": {"kind": "keyword", "keywords": ["buy"]}},
                        {"targetNodeId": "fallback", "priority": 3, "matcher": {"kind": "catchAll"}}
                    ]
                },
                {
                    "id": "price",
                    "kind": "decision",
                    "template": "The hoodie is $40. Which size? (S/M/L)",
                    "transitions": [
                        {"targetNodeId": "confirm", "priority": 1, "intent": "pick_size",
                         "matcher": {"kind": "pattern", "pattern": "\\b(?P<size>[SML])\\b"},
                         "captures": ["size"]},
                        {"targetNodeId": "checkout", "priority": 2, "intent": "buy",
                         "matcher": {"kind": "keyword", "keywords": ["buy"]}}
                    ]
                },
                {
                    "id": "confirm",
                    "kind": "message",
                    "template": "Size ${size}, noted.",
                    "transitions": [{"targetNodeId": "price"}]
                },
                {"id": "checkout", "kind": "terminal", "template": "Great, sending the ${size} hoodie checkout link!"},
                {
                    "id": "fallback",
                    "kind": "decision",
                    "template": "Sorry, I can help with price or buying.",
                    "transitions": [
                        {"targetNodeId": "price", "priority": 1,
                         "matcher": {"kind": "keyword", "keywords": ["price"]}},
                        {"targetNodeId": "checkout", "priority": 2,
                         "matcher": {"kind": "keyword", "keywords": ["buy"]}}
                    ]
                }
            ],
            "variables": [
                {"name": "size", "type": {"kind": "enum", "values": ["S", "M", "L"]}, "required": true}
            ]
        }))
    }

    pub(crate) fn decl(name: &str, r#type: VariableType, required: bool) -> VariableDecl {
        VariableDecl {
            name: name.to_string(),
            r#type,
            required,
        }
    }
}
