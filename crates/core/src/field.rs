//! Typed profile field values
//!
//! A profile maps field names to values collected from the conversation.
//! Values are typed at the point of extraction — numeric fields hold
//! numbers, categorical and text fields hold canonical strings — instead of
//! deferring type questions to decision time.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::amount::parse_amount;

/// The profile accumulated for the current application attempt.
pub type Profile = HashMap<String, FieldValue>;

/// A single collected field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Numeric view, if this value is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }

    /// Text view of the value.
    pub fn as_text(&self) -> String {
        match self {
            FieldValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            FieldValue::Text(s) => s.clone(),
        }
    }

    /// Defensive numeric coercion for the decision path.
    ///
    /// Accepts comma-separated values, lakh/crore suffixes and bare numeric
    /// strings. Unparsable values coerce to 0 rather than failing — the
    /// validator has already type-checked everything that reaches scoring.
    pub fn coerce_f64(&self) -> f64 {
        match self {
            FieldValue::Number(n) => *n,
            FieldValue::Text(s) => parse_amount(s).unwrap_or(0.0),
        }
    }

    /// True when the value is blank text.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Number(_) => false,
            FieldValue::Text(s) => s.trim().is_empty(),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_text())
    }
}
