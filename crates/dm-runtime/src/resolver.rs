use thiserror::Error;

use crate::*;

pub const UNRESOLVED_MARKER_PREFIX: &str = "[[unresolved:";

pub fn unresolved_marker(name: &str) -> String {
    format!("{}{}]]", UNRESOLVED_MARKER_PREFIX, name)
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Rendered {
    pub text: String,
    pub unresolved: Vec<String>,
}

/// Substitutes `${name}` placeholders. Unbound optional variables render empty;
/// unbound required or undeclared ones render as an unresolved marker and are
/// listed in `unresolved`.
pub fn render(
    template: &str,
    bindings: &BTreeMap<String, DmValue>,
    variables: &BTreeMap<String, VariableDecl>,
) -> Rendered {
    let mut output = String::new();
    let mut unresolved = Vec::new();
    let mut last_index = 0usize;

    for captures in placeholder_regex().captures_iter(template) {
        let (Some(full), Some(name)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        let name = name.as_str();
        output.push_str(&template[last_index..full.start()]);

        match (bindings.get(name), variables.get(name)) {
            (Some(value), _) => output.push_str(&value.to_text()),
            (None, Some(decl)) if !decl.required => {}
            _ => {
                output.push_str(&unresolved_marker(name));
                if !unresolved.iter().any(|entry| entry == name) {
                    unresolved.push(name.to_string());
                }
            }
        }
        last_index = full.end();
    }

    output.push_str(&template[last_index..]);
    Rendered {
        text: output,
        unresolved,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Value \"{raw_value}\" for variable \"{variable}\" does not match type {expected}.")]
pub struct TypeMismatch {
    pub variable: String,
    pub raw_value: String,
    pub expected: String,
}

impl From<TypeMismatch> for StepWarning {
    fn from(mismatch: TypeMismatch) -> Self {
        Self::TypeMismatch {
            variable: mismatch.variable,
            raw_value: mismatch.raw_value,
            expected: mismatch.expected,
        }
    }
}

pub fn bind(name: &str, raw_value: &str, decl: &VariableDecl) -> Result<DmValue, TypeMismatch> {
    let mismatch = || TypeMismatch {
        variable: name.to_string(),
        raw_value: raw_value.to_string(),
        expected: decl.r#type.name(),
    };

    match &decl.r#type {
        VariableType::String => Ok(DmValue::String(raw_value.to_string())),
        VariableType::Number => match raw_value.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(DmValue::Number(value)),
            _ => Err(mismatch()),
        },
        VariableType::Enum { values } => {
            if values.iter().any(|value| value == raw_value) {
                Ok(DmValue::String(raw_value.to_string()))
            } else {
                Err(mismatch())
            }
        }
    }
}
