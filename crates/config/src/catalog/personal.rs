//! Personal loan product table

use loan_agent_core::LoanType;

use crate::product::{
    DecisionBounds, FieldDef, FieldKind, ProductDefinition, RejectionKind, ValueRule,
};

use super::{age_field, cibil_field, customer_fields};

pub fn definition() -> ProductDefinition {
    let mut fields = customer_fields();

    fields.push(age_field(
        21.0,
        65.0,
        RejectionKind::Ineligible,
        "You must be at least 21 years old to apply for a personal loan. Unfortunately, we cannot process your application at this time.",
        "Personal loans are available only for applicants up to 65 years of age. Unfortunately, we cannot process your application at this time.",
    ));

    fields.push(
        FieldDef::new("Employment_Type", FieldKind::Choice)
            .allowed(&["Self-Employed", "Salaried"])
            .keyword("self employed", "Self-Employed")
            .keyword("self-employed", "Self-Employed")
            .keyword("business", "Self-Employed")
            .keyword("entrepreneur", "Self-Employed")
            .keyword("salaried", "Salaried")
            .keyword("employee", "Salaried")
            .keyword("job", "Salaried")
            .keyword("working", "Salaried")
            .context(&["employment type", "salaried or"])
            .ask("Are you Salaried or Self-Employed? (employment type)")
            .describe("exactly one of [\"Self-Employed\",\"Salaried\"]"),
    );

    fields.push(
        FieldDef::new("Employment_Duration_Years", FieldKind::Number)
            .numeric()
            .context(&["employment", "working"])
            .capture(1.0, 45.0)
            .pattern(r"(?i)(?:working|employed|experience)\D*(\d{1,2})\s*(?:years?|yrs?)")
            .pattern(r"(?i)(\d{1,2})\s*(?:years?|yrs?)\D*(?:working|employed|experience)")
            .rule(ValueRule::AtLeast {
                limit: 1.0,
                kind: RejectionKind::Ineligible,
                message: "You must have at least 1 year of employment experience to qualify for a personal loan.".to_string(),
            })
            .rule(ValueRule::AtMost {
                limit: 45.0,
                kind: RejectionKind::Reconfirm,
                message: "Employment duration seems unusually high. Could you please confirm how many years you've been in your current employment type?".to_string(),
            })
            .ask("How many years have you been in your current employment? (e.g., 5)")
            .describe("number (years in current employment type)"),
    );

    fields.push(
        FieldDef::new("Annual_Income", FieldKind::Amount)
            .numeric()
            .context(&["annual income", "income"])
            .pattern(r"(?i)(?:annual|yearly)\D*(?:income|salary)\D*([\d,.]+\s*(?:lakhs?|lacs?|crores?|cr|thousand|k)?)")
            .pattern(r"(?i)(?:income|salary|earn)\D*([\d,.]+\s*(?:lakhs?|lacs?|crores?|cr|thousand|k)?)")
            .rule(ValueRule::Positive {
                message: "Annual income must be a positive amount. Please provide your yearly income.".to_string(),
            })
            .rule(ValueRule::AtLeast {
                limit: 200_000.0,
                kind: RejectionKind::Ineligible,
                message: "Minimum annual income of ₹2,00,000 is required for personal loan eligibility.".to_string(),
            })
            .rule(ValueRule::AtMost {
                limit: 50_000_000.0,
                kind: RejectionKind::Reconfirm,
                message: "Please verify your annual income. The amount seems unusually high. Could you confirm?".to_string(),
            })
            .ask("What is your annual income in INR? (e.g., 600000)")
            .describe("number in INR (yearly income, must be positive)"),
    );

    fields.push(cibil_field(
        "CIBIL_Score",
        650.0,
        "A minimum CIBIL score of 650 is required for personal loan approval. Your current score does not meet our eligibility criteria.",
    ));

    fields.push(
        FieldDef::new("Existing_EMIs", FieldKind::Amount)
            .numeric()
            .context(&["emi"])
            .pattern(r"(?i)(?:existing|current|monthly)\s*emi\D*([\d,.]+\s*(?:lakhs?|lacs?|crores?|cr|thousand|k)?)")
            .rule(ValueRule::NonNegative {
                message: "EMI amount cannot be negative. Please provide your current monthly EMI obligations (enter 0 if none).".to_string(),
            })
            .ask("What are your current monthly EMI obligations in INR? (enter 0 if none)")
            .describe("number in INR (current monthly EMI obligations, 0 if none)"),
    );

    fields.push(
        FieldDef::new("Loan_Term_Years", FieldKind::Number)
            .numeric()
            .context(&["loan term", "term"])
            .capture(1.0, 7.0)
            .pattern(r"(?i)(?:term|duration)\D*(\d{1,2})")
            .pattern(r"(?i)(\d{1,2})\s*(?:years?|yrs?)\D*(?:term|duration)")
            .rule(ValueRule::AtLeast {
                limit: 1.0,
                kind: RejectionKind::Reconfirm,
                message: "Loan term must be between 1 and 7 years. Please specify your preferred repayment period.".to_string(),
            })
            .rule(ValueRule::AtMost {
                limit: 7.0,
                kind: RejectionKind::Reconfirm,
                message: "Loan term must be between 1 and 7 years. Please specify your preferred repayment period.".to_string(),
            })
            .ask("What loan term do you prefer in years? (1–7, e.g., 3)")
            .describe("number (years, 1-7)"),
    );

    fields.push(
        FieldDef::new("Expected_Loan_Amount", FieldKind::Amount)
            .numeric()
            .context(&["loan amount", "amount"])
            .pattern(r"(?i)(?:loan|need|want|require|looking\s*for)\D*?([\d,.]+\s*(?:lakhs?|lacs?|crores?|cr|thousand|k)?)")
            .rule(ValueRule::Positive {
                message: "Loan amount must be a positive value. Please specify your loan requirement.".to_string(),
            })
            .rule(ValueRule::AtLeast {
                limit: 50_000.0,
                kind: RejectionKind::Reconfirm,
                message: "Minimum loan amount is ₹50,000. Please specify an amount of at least ₹50,000.".to_string(),
            })
            .rule(ValueRule::AtMost {
                limit: 2_000_000.0,
                kind: RejectionKind::Reconfirm,
                message: "Maximum loan amount is ₹20,00,000. Please specify an amount within this limit.".to_string(),
            })
            .ask("What loan amount are you looking for in INR? (e.g., 200000)")
            .describe("number in INR (desired loan amount)"),
    );

    ProductDefinition {
        loan_type: LoanType::Personal,
        display_name: "Personal Loan".to_string(),
        description: "Unsecured loans for personal expenses like medical, travel, wedding, etc.".to_string(),
        greeting: "Hello! I'm a personal loan specialist here to help you with your loan application. Let's start with your full name - what should I call you?".to_string(),
        fields,
        derived: Vec::new(),
        cross_rules: Vec::new(),
        encodings: [(
            "Employment_Type".to_string(),
            vec![
                ("Salaried".to_string(), 0.0),
                ("Self-Employed".to_string(), 1.0),
            ],
        )]
        .into_iter()
        .collect(),
        bounds: DecisionBounds {
            min_amount: 50_000.0,
            max_amount: 2_000_000.0,
            min_rate: 8.0,
            max_rate: 18.0,
            amount_field: "Expected_Loan_Amount".to_string(),
            collateral_cap: None,
        },
    }
}
