//! Field validation
//!
//! One rule interpreter covers every product: field definitions carry their
//! thresholds and messages, and this module evaluates them. Accepted values
//! are canonicalized (title-cased names, digit-only phones, canonical
//! categorical values) before they reach the profile. Type coercion
//! failures are ordinary rejections, not errors.

use once_cell::sync::Lazy;
use regex::Regex;

use loan_agent_config::{CrossFieldRule, FieldDef, FieldKind, RejectionKind, ValueRule};
use loan_agent_core::{parse_amount, FieldValue, Profile};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

/// A rejected field value with its user-facing reason
#[derive(Debug, Clone)]
pub struct Rejection {
    pub field: String,
    pub kind: RejectionKind,
    pub message: String,
}

/// Outcome of validating one field value
#[derive(Debug, Clone)]
pub enum FieldCheck {
    /// Value accepted, canonicalized form to store
    Accepted(FieldValue),
    Rejected(Rejection),
}

/// Validate a raw extracted value against a field definition.
pub fn validate_field(def: &FieldDef, value: &FieldValue) -> FieldCheck {
    match def.kind {
        FieldKind::Name => validate_name(def, value),
        FieldKind::Email => validate_email(def, value),
        FieldKind::Phone => validate_phone(def, value),
        FieldKind::Number | FieldKind::Amount => validate_numeric(def, value),
        FieldKind::Choice => validate_choice(def, value),
        FieldKind::YesNo => validate_yes_no(def, value),
    }
}

/// Evaluate cross-field rules against the current profile. Each rule runs
/// only once all the fields it depends on are present.
pub fn validate_cross(rules: &[CrossFieldRule], profile: &Profile) -> Option<Rejection> {
    for rule in rules {
        match rule {
            CrossFieldRule::StrictlyLessThan { field, than, message } => {
                if let (Some(a), Some(b)) = (numeric_of(profile, field), numeric_of(profile, than)) {
                    if a >= b {
                        return Some(Rejection {
                            field: field.clone(),
                            kind: RejectionKind::Reconfirm,
                            message: message.clone(),
                        });
                    }
                }
            }
            CrossFieldRule::AtMostField { field, limit_field, message } => {
                if let (Some(a), Some(b)) =
                    (numeric_of(profile, field), numeric_of(profile, limit_field))
                {
                    if a > b {
                        return Some(Rejection {
                            field: field.clone(),
                            kind: RejectionKind::Reconfirm,
                            message: message.clone(),
                        });
                    }
                }
            }
        }
    }
    None
}

fn numeric_of(profile: &Profile, field: &str) -> Option<f64> {
    profile.get(field).and_then(|v| v.as_f64())
}

fn reject(def: &FieldDef, kind: RejectionKind, message: impl Into<String>) -> FieldCheck {
    FieldCheck::Rejected(Rejection {
        field: def.name.clone(),
        kind,
        message: message.into(),
    })
}

fn format_rejection(def: &FieldDef) -> FieldCheck {
    reject(
        def,
        RejectionKind::InvalidFormat,
        format!("Please provide a valid {} in the correct format.", def.label()),
    )
}

fn validate_name(def: &FieldDef, value: &FieldValue) -> FieldCheck {
    let name = value.as_text().trim().to_string();
    if name.is_empty() {
        return reject(def, RejectionKind::InvalidFormat, "Please provide your full name.");
    }
    for rule in &def.rules {
        if let ValueRule::MinLen { min, message } = rule {
            if name.chars().count() < *min {
                return reject(def, RejectionKind::InvalidFormat, message.clone());
            }
        }
    }
    FieldCheck::Accepted(FieldValue::Text(name))
}

fn validate_email(def: &FieldDef, value: &FieldValue) -> FieldCheck {
    let email = value.as_text().trim().to_string();
    if EMAIL_RE.is_match(&email) {
        FieldCheck::Accepted(FieldValue::Text(email))
    } else {
        reject(
            def,
            RejectionKind::InvalidFormat,
            "Please provide a valid email address.",
        )
    }
}

fn validate_phone(def: &FieldDef, value: &FieldValue) -> FieldCheck {
    let raw = value.as_text();
    let stripped: String = raw
        .trim()
        .trim_start_matches("+91")
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();

    let valid = stripped.len() == 10
        && stripped.chars().all(|c| c.is_ascii_digit())
        && matches!(stripped.chars().next(), Some('6'..='9'));

    if valid {
        FieldCheck::Accepted(FieldValue::Text(stripped))
    } else {
        reject(
            def,
            RejectionKind::InvalidFormat,
            "Please provide a valid 10-digit mobile number starting with 6, 7, 8, or 9.",
        )
    }
}

fn validate_numeric(def: &FieldDef, value: &FieldValue) -> FieldCheck {
    let number = match value {
        FieldValue::Number(n) => Some(*n),
        FieldValue::Text(s) => parse_amount(s),
    };
    let number = match number {
        Some(n) if n.is_finite() => n,
        _ => return format_rejection(def),
    };

    for rule in &def.rules {
        match rule {
            ValueRule::Positive { message } => {
                if number <= 0.0 {
                    return reject(def, RejectionKind::InvalidFormat, message.clone());
                }
            }
            ValueRule::NonNegative { message } => {
                if number < 0.0 {
                    return reject(def, RejectionKind::InvalidFormat, message.clone());
                }
            }
            ValueRule::AtLeast { limit, kind, message } => {
                if number < *limit {
                    return reject(def, *kind, message.clone());
                }
            }
            ValueRule::AtMost { limit, kind, message } => {
                if number > *limit {
                    return reject(def, *kind, message.clone());
                }
            }
            ValueRule::MinLen { .. } => {}
        }
    }

    FieldCheck::Accepted(FieldValue::Number(number))
}

fn validate_choice(def: &FieldDef, value: &FieldValue) -> FieldCheck {
    let text = value.as_text();
    let trimmed = text.trim();

    // Exact canonical value, case-insensitive.
    for allowed in &def.allowed {
        if trimmed.eq_ignore_ascii_case(allowed) {
            return FieldCheck::Accepted(FieldValue::Text(allowed.clone()));
        }
    }

    // Keyword variants ("self employed" -> "Self-Employed").
    let lower = trimmed.to_lowercase();
    for (keyword, canonical) in &def.keywords {
        if lower.contains(keyword.as_str()) {
            return FieldCheck::Accepted(FieldValue::Text(canonical.clone()));
        }
    }

    reject(
        def,
        RejectionKind::InvalidChoice,
        format!(
            "Please select your {} from: {}.",
            def.label(),
            def.allowed.join(", ")
        ),
    )
}

fn validate_yes_no(def: &FieldDef, value: &FieldValue) -> FieldCheck {
    match value.as_text().trim().to_lowercase().as_str() {
        "yes" | "y" => FieldCheck::Accepted(FieldValue::Text("Yes".to_string())),
        "no" | "n" => FieldCheck::Accepted(FieldValue::Text("No".to_string())),
        _ => reject(
            def,
            RejectionKind::InvalidChoice,
            format!("Please answer Yes or No for {}.", def.label()),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loan_agent_config::ProductRegistry;
    use loan_agent_core::LoanType;

    fn field(loan_type: LoanType, name: &str) -> FieldDef {
        let registry = ProductRegistry::builtin();
        registry
            .get(loan_type)
            .unwrap()
            .field(name)
            .unwrap()
            .clone()
    }

    #[test]
    fn test_low_cibil_is_ineligible() {
        let def = field(LoanType::Personal, "CIBIL_Score");
        match validate_field(&def, &FieldValue::Number(600.0)) {
            FieldCheck::Rejected(r) => {
                assert_eq!(r.kind, RejectionKind::Ineligible);
                assert!(r.message.contains("650"));
            }
            FieldCheck::Accepted(_) => panic!("600 must be rejected"),
        }
    }

    #[test]
    fn test_gold_accepts_cibil_620() {
        let def = field(LoanType::Gold, "CIBIL_Score");
        assert!(matches!(
            validate_field(&def, &FieldValue::Number(620.0)),
            FieldCheck::Accepted(_)
        ));
    }

    #[test]
    fn test_cibil_above_900_is_reconfirm() {
        let def = field(LoanType::Personal, "CIBIL_Score");
        match validate_field(&def, &FieldValue::Number(950.0)) {
            FieldCheck::Rejected(r) => assert_eq!(r.kind, RejectionKind::Reconfirm),
            FieldCheck::Accepted(_) => panic!("950 must be rejected"),
        }
    }

    #[test]
    fn test_phone_canonicalization() {
        let def = field(LoanType::Personal, "Customer_Phone");
        match validate_field(&def, &FieldValue::Text("+91 98765-43210".to_string())) {
            FieldCheck::Accepted(v) => assert_eq!(v.as_text(), "9876543210"),
            FieldCheck::Rejected(r) => panic!("unexpected rejection: {}", r.message),
        }

        assert!(matches!(
            validate_field(&def, &FieldValue::Text("12345".to_string())),
            FieldCheck::Rejected(_)
        ));
    }

    #[test]
    fn test_email_shape() {
        let def = field(LoanType::Personal, "Customer_Email");
        assert!(matches!(
            validate_field(&def, &FieldValue::Text("riya@example.com".to_string())),
            FieldCheck::Accepted(_)
        ));
        assert!(matches!(
            validate_field(&def, &FieldValue::Text("not-an-email".to_string())),
            FieldCheck::Rejected(_)
        ));
    }

    #[test]
    fn test_choice_canonicalizes_variants() {
        let def = field(LoanType::Personal, "Employment_Type");
        match validate_field(&def, &FieldValue::Text("self employed".to_string())) {
            FieldCheck::Accepted(v) => assert_eq!(v.as_text(), "Self-Employed"),
            FieldCheck::Rejected(r) => panic!("unexpected rejection: {}", r.message),
        }
        match validate_field(&def, &FieldValue::Text("astronaut".to_string())) {
            FieldCheck::Rejected(r) => {
                assert_eq!(r.kind, RejectionKind::InvalidChoice);
                assert!(r.message.contains("Salaried"));
            }
            FieldCheck::Accepted(_) => panic!("astronaut is not an employment type"),
        }
    }

    #[test]
    fn test_numeric_coercion_failure_is_rejection() {
        let def = field(LoanType::Personal, "Annual_Income");
        match validate_field(&def, &FieldValue::Text("plenty".to_string())) {
            FieldCheck::Rejected(r) => assert_eq!(r.kind, RejectionKind::InvalidFormat),
            FieldCheck::Accepted(_) => panic!("'plenty' is not a number"),
        }
    }

    #[test]
    fn test_amount_with_lakh_suffix_validates() {
        let def = field(LoanType::Personal, "Annual_Income");
        match validate_field(&def, &FieldValue::Text("6 lakh".to_string())) {
            FieldCheck::Accepted(v) => assert_eq!(v.as_f64(), Some(600_000.0)),
            FieldCheck::Rejected(r) => panic!("unexpected rejection: {}", r.message),
        }
    }

    #[test]
    fn test_cross_field_profit_vs_revenue() {
        let registry = ProductRegistry::builtin();
        let business = registry.get(LoanType::Business).unwrap();

        let mut profile = Profile::new();
        profile.insert("Net_Profit".to_string(), FieldValue::Number(6_000_000.0));
        assert!(validate_cross(&business.cross_rules, &profile).is_none());

        profile.insert("Annual_Revenue".to_string(), FieldValue::Number(5_000_000.0));
        let rejection = validate_cross(&business.cross_rules, &profile).expect("profit >= revenue");
        assert!(rejection.message.contains("Net profit"));

        profile.insert("Net_Profit".to_string(), FieldValue::Number(800_000.0));
        assert!(validate_cross(&business.cross_rules, &profile).is_none());
    }

    #[test]
    fn test_cross_field_loan_vs_property() {
        let registry = ProductRegistry::builtin();
        let home = registry.get(LoanType::Home).unwrap();

        let mut profile = Profile::new();
        profile.insert(
            "Loan_amount_requested".to_string(),
            FieldValue::Number(6_000_000.0),
        );
        profile.insert("Property_value".to_string(), FieldValue::Number(5_000_000.0));
        assert!(validate_cross(&home.cross_rules, &profile).is_some());

        profile.insert("Property_value".to_string(), FieldValue::Number(8_000_000.0));
        assert!(validate_cross(&home.cross_rules, &profile).is_none());
    }
}
