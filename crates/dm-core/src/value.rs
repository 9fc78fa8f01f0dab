use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DmValue {
    Number(f64),
    String(String),
}

impl DmValue {
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::String(_) => "string",
        }
    }

    pub fn to_text(&self) -> String {
        match self {
            Self::Number(value) => {
                if value.fract().abs() < f64::EPSILON && value.abs() < i64::MAX as f64 {
                    (*value as i64).to_string()
                } else {
                    value.to_string()
                }
            }
            Self::String(value) => value.clone(),
        }
    }
}

impl From<&str> for DmValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<f64> for DmValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

#[cfg(test)]
mod value_tests {
    use super::*;

    #[test]
    fn to_text_drops_fraction_for_integral_numbers() {
        assert_eq!(DmValue::Number(3.0).to_text(), "3");
        assert_eq!(DmValue::Number(2.5).to_text(), "2.5");
        assert_eq!(DmValue::from("M").to_text(), "M");
    }

    #[test]
    fn untagged_serde_keeps_numbers_and_strings_apart() {
        let parsed: Vec<DmValue> =
            serde_json::from_str(r#"[1.5, "L"]"#).expect("values should deserialize");
        assert_eq!(parsed, vec![DmValue::Number(1.5), DmValue::from("L")]);
        assert_eq!(parsed[0].type_name(), "number");
        assert_eq!(parsed[1].as_string(), Some("L"));
        assert_eq!(parsed[0].as_number(), Some(1.5));
    }
}
