//! Home loan product table

use loan_agent_core::LoanType;

use crate::product::{
    CrossFieldRule, DecisionBounds, FieldDef, FieldKind, ProductDefinition, RejectionKind,
    ValueRule,
};

use super::{age_field, cibil_field, customer_fields};

pub fn definition() -> ProductDefinition {
    let mut fields = customer_fields();

    fields.push(age_field(
        21.0,
        50.0,
        RejectionKind::Reconfirm,
        "I need your age to be between 21 and 50 years for home loan eligibility. Could you please confirm your age?",
        "I need your age to be between 21 and 50 years for home loan eligibility. Could you please confirm your age?",
    ));

    fields.push(
        FieldDef::new("Income", FieldKind::Amount)
            .numeric()
            .context(&["monthly income"])
            .pattern(r"(?i)(?:monthly\s*income|my\s*income|salary|earn)\D*([\d,.]+\s*(?:lakhs?|lacs?|crores?|cr|thousand|k)?)")
            .rule(ValueRule::Positive {
                message: "Could you please tell me your monthly income? This helps me calculate your loan eligibility.".to_string(),
            })
            .ask("What is your monthly income in INR? (e.g., 80000)")
            .describe("number in INR (monthly income, must be positive)"),
    );

    fields.push(
        FieldDef::new("Guarantor_income", FieldKind::Amount)
            .numeric()
            .context(&["guarantor"])
            .pattern(r"(?i)guarantor\D*([\d,.]+\s*(?:lakhs?|lacs?|crores?|cr|thousand|k)?)")
            .rule(ValueRule::NonNegative {
                message: "Guarantor income cannot be negative. Please provide the guarantor's monthly income (enter 0 if no guarantor).".to_string(),
            })
            .ask("What is the guarantor's income per month in INR? (enter 0 if no guarantor)")
            .describe("number in INR (guarantor's monthly income, 0 if none)"),
    );

    fields.push(
        FieldDef::new("Tenure", FieldKind::Number)
            .numeric()
            .context(&["tenure"])
            .capture(5.0, 30.0)
            .pattern(r"(?i)(?:tenure|term|duration)\D*(\d{1,2})")
            .pattern(r"(?i)(\d{1,2})\s*(?:years?|yrs?)\D*(?:tenure|term|repay)")
            .rule(ValueRule::AtLeast {
                limit: 5.0,
                kind: RejectionKind::Reconfirm,
                message: "Loan tenure should be between 5 and 30 years. How many years would you like to repay the loan?".to_string(),
            })
            .rule(ValueRule::AtMost {
                limit: 30.0,
                kind: RejectionKind::Reconfirm,
                message: "Loan tenure should be between 5 and 30 years. How many years would you like to repay the loan?".to_string(),
            })
            .ask("What loan tenure do you prefer in years? (5–30, e.g., 20)")
            .describe("number (loan term in years, 5-30)"),
    );

    fields.push(cibil_field(
        "CIBIL_score",
        650.0,
        "Sorry, for home loans we require a minimum CIBIL score of 650. Unfortunately, your current score doesn't meet our eligibility criteria.",
    ));

    fields.push(
        FieldDef::new("Employment_type", FieldKind::Choice)
            .allowed(&["Business Owner", "Salaried", "Government Employee", "Self-Employed"])
            .keyword("government", "Government Employee")
            .keyword("govt", "Government Employee")
            .keyword("public sector", "Government Employee")
            .keyword("self employed", "Self-Employed")
            .keyword("self-employed", "Self-Employed")
            .keyword("freelance", "Self-Employed")
            .keyword("consultant", "Self-Employed")
            .keyword("business", "Business Owner")
            .keyword("entrepreneur", "Business Owner")
            .keyword("salaried", "Salaried")
            .keyword("employee", "Salaried")
            .keyword("job", "Salaried")
            .context(&["employment type"])
            .ask("What is your employment type? Choose one: Business Owner, Salaried, Government Employee, Self-Employed.")
            .describe("exactly one of [\"Business Owner\",\"Salaried\",\"Government Employee\",\"Self-Employed\"]"),
    );

    fields.push(
        FieldDef::new("Down_payment", FieldKind::Amount)
            .numeric()
            .context(&["down payment", "upfront"])
            .pattern(r"(?i)(?:down\s*payment|advance|upfront)\D*([\d,.]+\s*(?:lakhs?|lacs?|crores?|cr|thousand|k)?)")
            .rule(ValueRule::NonNegative {
                message: "How much can you pay as down payment? Even if it's zero, please let me know.".to_string(),
            })
            .ask("How much can you pay upfront as down payment in INR? (enter 0 if none)")
            .describe("number in INR (upfront payment amount, 0 if none)"),
    );

    fields.push(
        FieldDef::new("Existing_total_EMI", FieldKind::Amount)
            .numeric()
            .context(&["emi"])
            .pattern(r"(?i)(?:existing|current|monthly)\s*emi\D*([\d,.]+\s*(?:lakhs?|lacs?|crores?|cr|thousand|k)?)")
            .rule(ValueRule::NonNegative {
                message: "Existing EMI cannot be negative. Please provide your current monthly EMI obligations (enter 0 if none).".to_string(),
            })
            .ask("What are your current monthly EMI obligations in INR? (enter 0 if none)")
            .describe("number in INR (current monthly EMIs, 0 if none)"),
    );

    fields.push(
        FieldDef::new("Loan_amount_requested", FieldKind::Amount)
            .numeric()
            .context(&["loan amount", "amount"])
            .pattern(r"(?i)(?:loan|need|want|require|looking\s*for)\D*?([\d,.]+\s*(?:lakhs?|lacs?|crores?|cr|thousand|k)?)")
            .rule(ValueRule::Positive {
                message: "How much loan amount are you looking for? Please share your expected loan requirement.".to_string(),
            })
            .ask("What loan amount are you looking for in INR? (e.g., 3000000)")
            .describe("number in INR (desired loan amount, must be positive)"),
    );

    fields.push(
        FieldDef::new("Property_value", FieldKind::Amount)
            .numeric()
            .context(&["property"])
            .pattern(r"(?i)property\D*([\d,.]+\s*(?:lakhs?|lacs?|crores?|cr|thousand|k)?)")
            .rule(ValueRule::Positive {
                message: "What's the total value of the property you're planning to purchase? This is important for calculating your loan amount.".to_string(),
            })
            .ask("What is the total value of the property you plan to purchase in INR? (e.g., 5000000)")
            .describe("number in INR (total property value, must be positive)"),
    );

    ProductDefinition {
        loan_type: LoanType::Home,
        display_name: "Home Loan".to_string(),
        description: "Loans for purchasing, constructing, or renovating residential properties".to_string(),
        greeting: "Hello! I'm a home loan specialist. I'm here to help you with your home loan application. Let's start with your full name - what should I call you?".to_string(),
        fields,
        derived: Vec::new(),
        cross_rules: vec![CrossFieldRule::AtMostField {
            field: "Loan_amount_requested".to_string(),
            limit_field: "Property_value".to_string(),
            message: "The loan amount requested cannot be more than the property value. Please adjust your loan amount or property value.".to_string(),
        }],
        encodings: std::collections::HashMap::new(),
        bounds: DecisionBounds {
            min_amount: 100_000.0,
            max_amount: 100_000_000.0,
            min_rate: 7.0,
            max_rate: 15.0,
            amount_field: "Loan_amount_requested".to_string(),
            collateral_cap: None,
        },
    }
}
