use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::OnceLock;

use dm_core::{
    DmScriptError, MatcherSpec, NodeDefinition, NodeKind, ScriptDefinition, TransitionDefinition,
    ValidationError, ValidationErrorKind, ValidationWarning, ValidationWarningKind, VariableDecl,
    VariableType,
};
use regex::{Regex, RegexBuilder};

mod graph;
mod model;
mod template;
mod validate;

pub use model::{Matcher, Node, Script, Transition};
pub use template::{collapse_whitespace, placeholder_regex, template_placeholders};

pub fn load(raw: ScriptDefinition) -> Result<Script, Vec<ValidationError>> {
    validate::build_script(raw)
}

pub fn validate_script(raw: &ScriptDefinition) -> Result<Script, Vec<ValidationError>> {
    validate::build_script(raw.clone())
}

pub fn get_node<'a>(script: &'a Script, node_id: &str) -> Result<&'a Node, DmScriptError> {
    script.node(node_id).ok_or_else(|| {
        DmScriptError::at_node(
            "SCRIPT_NODE_NOT_FOUND",
            format!(
                "Node \"{}\" does not exist in script \"{}\" v{}.",
                node_id,
                script.id(),
                script.version()
            ),
            node_id,
        )
    })
}


#[cfg(test)]
mod lib_tests {
    use super::compiler_test_support::*;
    use super::*;
    use serde_json::json;

    #[test]
    fn get_node_reports_missing_node_with_code() {
        let script = load(definition(json!({
            "id": "shop",
            "version": 1,
            "entryNodeId": "end",
            "nodes": [{"id": "end", "kind": "terminal", "template": "Bye"}]
        })))
        .expect("script should load");

        assert_eq!(
            get_node(&script, "end").expect("end exists").kind(),
            NodeKind::Terminal
        );
        let error = get_node(&script, "ghost").expect_err("ghost should be missing");
        assert_eq!(error.code, "SCRIPT_NODE_NOT_FOUND");
        assert_eq!(error.node_id.as_deref(), Some("ghost"));
    }

    #[test]
    fn validate_script_leaves_definition_untouched() {
        let raw = definition(json!({
            "id": "shop",
            "version": 3,
            "entryNodeId": "end",
            "nodes": [{"id": "end", "kind": "terminal"}]
        }));
        let script = validate_script(&raw).expect("script should validate");
        assert_eq!(script.id(), "shop");
        assert_eq!(script.version(), 3);
        assert_eq!(raw.nodes.len(), 1);
    }
}
