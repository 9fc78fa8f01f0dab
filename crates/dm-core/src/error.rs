use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{ValidationErrorKind, ValidationWarningKind};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct DmScriptError {
    pub code: String,
    pub message: String,
    pub node_id: Option<String>,
}

impl DmScriptError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            node_id: None,
        }
    }

    pub fn at_node(
        code: impl Into<String>,
        message: impl Into<String>,
        node_id: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            node_id: Some(node_id.into()),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[error("{}: {}", .kind.code(), .message)]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    pub message: String,
    pub node_id: Option<String>,
}

impl ValidationError {
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            node_id: None,
        }
    }

    pub fn at_node(
        kind: ValidationErrorKind,
        message: impl Into<String>,
        node_id: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            node_id: Some(node_id.into()),
        }
    }
}

impl From<ValidationError> for DmScriptError {
    fn from(error: ValidationError) -> Self {
        Self {
            code: error.kind.code().to_string(),
            message: error.message,
            node_id: error.node_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationWarning {
    pub kind: ValidationWarningKind,
    pub message: String,
    pub node_id: String,
}

#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn validation_error_display_uses_kind_code() {
        let error = ValidationError::at_node(
            ValidationErrorKind::DanglingTarget,
            "Transition targets unknown node \"ghost\".",
            "start",
        );
        assert_eq!(
            error.to_string(),
            "SCRIPT_DANGLING_TARGET: Transition targets unknown node \"ghost\"."
        );
    }

    #[test]
    fn validation_error_converts_into_script_error() {
        let error: DmScriptError =
            ValidationError::new(ValidationErrorKind::MissingEntryNode, "missing").into();
        assert_eq!(error.code, "SCRIPT_MISSING_ENTRY");
        assert_eq!(error.node_id, None);
    }
}
