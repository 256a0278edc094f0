//! Built-in product tables
//!
//! One module per loan product. Thresholds, allowed values and rejection
//! messages are product policy; the engine itself never hard-codes any of
//! them.

mod business;
mod car;
mod education;
mod gold;
mod home;
mod personal;

use crate::product::{FieldDef, FieldKind, ProductDefinition, RejectionKind, ValueRule};

/// All six built-in product definitions, in catalog order.
pub fn builtin_products() -> Vec<ProductDefinition> {
    vec![
        education::definition(),
        home::definition(),
        personal::definition(),
        business::definition(),
        gold::definition(),
        car::definition(),
    ]
}

/// Customer identity fields shared by every product.
pub(crate) fn customer_fields() -> Vec<FieldDef> {
    vec![
        FieldDef::new("Customer_Name", FieldKind::Name)
            .context(&["name", "call you"])
            .rule(ValueRule::MinLen {
                min: 2,
                message: "Please provide your complete name.".to_string(),
            })
            .ask("Please share your full name (e.g., Riya Sharma).")
            .describe("full name as text"),
        FieldDef::new("Customer_Email", FieldKind::Email)
            .context(&["email"])
            .ask("What is your email address? (e.g., riya.sharma@example.com)")
            .describe("email address as text"),
        FieldDef::new("Customer_Phone", FieldKind::Phone)
            .context(&["phone", "mobile"])
            .ask("What is your 10-digit phone number? (digits only, e.g., 9876543210)")
            .describe("10-digit phone number as text (remove +91, spaces, dashes)"),
    ]
}

/// Age field with product-specific eligibility bounds.
pub(crate) fn age_field(min: f64, max: f64, kind: RejectionKind, min_msg: &str, max_msg: &str) -> FieldDef {
    FieldDef::new("Age", FieldKind::Number)
        .numeric()
        .context(&["age"])
        .capture(min, max)
        .pattern(r"(?i)(?:age|years?\s*old|yrs?\s*old)\s*(?:is\s*)?:?\s*(\d{1,2})")
        .pattern(r"(?i)i\s*am\s*(\d{1,2})\b")
        .pattern(r"(?i)\b(\d{1,2})\s*(?:years?\s*old|yrs?\s*old)")
        .rule(ValueRule::AtLeast {
            limit: min,
            kind,
            message: min_msg.to_string(),
        })
        .rule(ValueRule::AtMost {
            limit: max,
            kind,
            message: max_msg.to_string(),
        })
        .ask(&format!("What is your age in years? ({:.0}–{:.0}, e.g., {:.0})", min, max, min + 9.0))
        .describe(&format!("number ({:.0}-{:.0})", min, max))
}

/// CIBIL score field with a product-specific eligibility floor.
pub(crate) fn cibil_field(name: &str, floor: f64, floor_msg: &str) -> FieldDef {
    FieldDef::new(name, FieldKind::Number)
        .numeric()
        .context(&["cibil", "credit score"])
        .capture(300.0, 900.0)
        .pattern(r"(?i)(?:cibil|credit\s*score)\D*(\d{3})")
        .pattern(r"(?i)(\d{3})\s*(?:cibil|credit)")
        .rule(ValueRule::AtLeast {
            limit: floor,
            kind: RejectionKind::Ineligible,
            message: floor_msg.to_string(),
        })
        .rule(ValueRule::AtMost {
            limit: 900.0,
            kind: RejectionKind::Reconfirm,
            message: "Please provide a valid CIBIL score between 300 and 900. Could you check and confirm your credit score?".to_string(),
        })
        .ask(&format!("What is your CIBIL score? ({:.0}–900, e.g., 720)", floor))
        .describe(&format!("number (300-900, minimum {:.0} required)", floor))
}
