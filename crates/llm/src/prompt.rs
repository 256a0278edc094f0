//! Chat message types and response scraping helpers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// Chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Find the first brace-delimited JSON object in a completion.
///
/// Models wrap JSON in prose or code fences; this scans for the first `{`
/// and returns the balanced object, tracking string literals so braces
/// inside values don't break the depth count.
pub fn first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_object() {
        assert_eq!(first_json_object(r#"{"Age": 30}"#), Some(r#"{"Age": 30}"#));
    }

    #[test]
    fn test_object_in_prose() {
        let text = "Here is what I found:\n```json\n{\"Customer_Name\": \"Riya\"}\n```\nDone.";
        assert_eq!(first_json_object(text), Some(r#"{"Customer_Name": "Riya"}"#));
    }

    #[test]
    fn test_nested_and_braces_in_strings() {
        let text = r#"{"a": {"b": "}"}, "c": 1} trailing"#;
        assert_eq!(first_json_object(text), Some(r#"{"a": {"b": "}"}, "c": 1}"#));
    }

    #[test]
    fn test_no_object() {
        assert_eq!(first_json_object("no json here"), None);
    }

    #[test]
    fn test_unbalanced() {
        assert_eq!(first_json_object(r#"{"a": 1"#), None);
    }
}
