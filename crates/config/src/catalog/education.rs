//! Education loan product table

use loan_agent_core::LoanType;

use crate::product::{
    DecisionBounds, DerivedFieldDef, FieldDef, FieldKind, ProductDefinition, RejectionKind,
    ValueRule,
};

use super::{age_field, cibil_field, customer_fields};

pub fn definition() -> ProductDefinition {
    let mut fields = customer_fields();

    fields.push(age_field(
        18.0,
        35.0,
        RejectionKind::Ineligible,
        "For education loan applicants, age must be between 18 and 35.",
        "For education loan applicants, age must be between 18 and 35.",
    ));

    fields.push(
        FieldDef::new("Academic_Score", FieldKind::Number)
            .numeric()
            .context(&["academic score", "score out of"])
            .capture(0.0, 100.0)
            .pattern(r"(?i)(?:academic\s*score|score|percentage|marks?)\s*(?:is\s*)?:?\s*(\d{1,3}(?:\.\d+)?)")
            .pattern(r"(?i)(?:got|scored)\s*(\d{1,3}(?:\.\d+)?)")
            .rule(ValueRule::AtLeast {
                limit: 0.0,
                kind: RejectionKind::InvalidFormat,
                message: "Please enter a valid score — it cannot be negative.".to_string(),
            })
            .rule(ValueRule::AtMost {
                limit: 100.0,
                kind: RejectionKind::InvalidFormat,
                message: "Please enter a valid score — it cannot exceed 100.".to_string(),
            })
            .ask("What's your academic score out of 100? (e.g., 82)")
            .describe("number (0-100, converted to a performance grade internally)"),
    );

    fields.push(
        FieldDef::new("Intended_Course", FieldKind::Choice)
            .allowed(&["STEM", "MBA", "Medicine", "Finance", "Law", "Arts", "Other"])
            .keyword("engineering", "STEM")
            .keyword("computer science", "STEM")
            .keyword("stem", "STEM")
            .keyword("tech", "STEM")
            .keyword("mba", "MBA")
            .keyword("management", "MBA")
            .keyword("medicine", "Medicine")
            .keyword("medical", "Medicine")
            .keyword("mbbs", "Medicine")
            .keyword("doctor", "Medicine")
            .keyword("finance", "Finance")
            .keyword("banking", "Finance")
            .keyword("accounting", "Finance")
            .keyword("law", "Law")
            .keyword("legal", "Law")
            .keyword("llb", "Law")
            .keyword("arts", "Arts")
            .keyword("humanities", "Arts")
            .keyword("design", "Arts")
            .keyword("other", "Other")
            .context(&["course"])
            .ask("Which course are you planning to pursue? Choose one: STEM, MBA, Medicine, Finance, Law, Arts, Other.")
            .describe("exactly one of [\"STEM\",\"MBA\",\"Medicine\",\"Finance\",\"Law\",\"Arts\",\"Other\"]"),
    );

    fields.push(
        FieldDef::new("University_Tier", FieldKind::Choice)
            .allowed(&["Tier1", "Tier2", "Tier3"])
            .keyword("tier 1", "Tier1")
            .keyword("tier1", "Tier1")
            .keyword("tier-1", "Tier1")
            .keyword("iit", "Tier1")
            .keyword("iim", "Tier1")
            .keyword("bits", "Tier1")
            .keyword("nit", "Tier1")
            .keyword("premier", "Tier1")
            .keyword("tier 2", "Tier2")
            .keyword("tier2", "Tier2")
            .keyword("tier-2", "Tier2")
            .keyword("tier 3", "Tier3")
            .keyword("tier3", "Tier3")
            .keyword("tier-3", "Tier3")
            .keyword("local", "Tier3")
            .context(&["university tier"])
            .ask("What is your university tier? Choose one: Tier1, Tier2, Tier3.")
            .describe("exactly one of [\"Tier1\",\"Tier2\",\"Tier3\"]"),
    );

    fields.push(
        FieldDef::new("Coapplicant_Income", FieldKind::Amount)
            .numeric()
            .context(&["co-applicant", "coapplicant"])
            .pattern(r"(?i)(?:coapplicant|co-applicant|parent|family)\D*income\D*([\d,.]+\s*(?:lakhs?|lacs?|crores?|cr|thousand|k)?)")
            .rule(ValueRule::Positive {
                message: "Co-applicant income must be positive. Please provide the annual co-applicant income.".to_string(),
            })
            .ask("What is the annual co-applicant income in INR? (e.g., 600000)")
            .describe("number in INR (annual co-applicant income, must be positive)"),
    );

    fields.push(
        FieldDef::new("Guarantor_Networth", FieldKind::Amount)
            .numeric()
            .context(&["net worth", "networth", "guarantor"])
            .pattern(r"(?i)(?:guarantor|net\s*worth|networth|assets)\D*([\d,.]+\s*(?:lakhs?|lacs?|crores?|cr|thousand|k)?)")
            .rule(ValueRule::Positive {
                message: "Guarantor net worth must be positive. Please provide the guarantor's total net worth.".to_string(),
            })
            .ask("What is the guarantor's total net worth in INR? (e.g., 1500000)")
            .describe("number in INR (guarantor's total assets, must be positive)"),
    );

    fields.push(cibil_field(
        "CIBIL_Score",
        650.0,
        "A minimum CIBIL score of 650 is required for an education loan. Your current score does not meet our eligibility criteria.",
    ));

    fields.push(
        FieldDef::new("Loan_Type", FieldKind::Choice)
            .allowed(&["Secured", "Unsecured"])
            .keyword("unsecured", "Unsecured")
            .keyword("no collateral", "Unsecured")
            .keyword("without collateral", "Unsecured")
            .keyword("secured", "Secured")
            .keyword("collateral", "Secured")
            .context(&["secured"])
            .ask("Do you want a Secured loan (with collateral) or an Unsecured loan (no collateral)?")
            .describe("exactly one of [\"Secured\",\"Unsecured\"]"),
    );

    fields.push(
        FieldDef::new("Loan_Term", FieldKind::Number)
            .numeric()
            .context(&["loan term", "term"])
            .capture(1.0, 15.0)
            .pattern(r"(?i)(?:term|duration)\D*(\d{1,2})")
            .pattern(r"(?i)(\d{1,2})\s*(?:years?|yrs?)\D*(?:term|duration)")
            .rule(ValueRule::AtLeast {
                limit: 1.0,
                kind: RejectionKind::Reconfirm,
                message: "Education loan term must be between 1 and 15 years.".to_string(),
            })
            .rule(ValueRule::AtMost {
                limit: 15.0,
                kind: RejectionKind::Reconfirm,
                message: "Education loan term must be between 1 and 15 years.".to_string(),
            })
            .ask("What loan term do you prefer in years? (1–15, e.g., 5)")
            .describe("number (years, 1-15)"),
    );

    fields.push(
        FieldDef::new("Expected_Loan_Amount", FieldKind::Amount)
            .numeric()
            .context(&["loan amount", "amount"])
            .pattern(r"(?i)(?:loan|need|want|require|looking\s*for)\D*?([\d,.]+\s*(?:lakhs?|lacs?|crores?|cr|thousand|k)?)")
            .rule(ValueRule::Positive {
                message: "Loan amount must be positive. Please specify your loan requirement.".to_string(),
            })
            .rule(ValueRule::AtMost {
                limit: 30_000_000.0,
                kind: RejectionKind::Ineligible,
                message: "Loan amount cannot exceed ₹3,00,00,000 for education loans.".to_string(),
            })
            .ask("What loan amount are you looking for in INR? (e.g., 800000)")
            .describe("number in INR (must be positive, max 30000000)"),
    );

    ProductDefinition {
        loan_type: LoanType::Education,
        display_name: "Education Loan".to_string(),
        description: "Loans for higher education, courses, and academic expenses".to_string(),
        greeting: "Hello! I'm here to help you with your education loan application. To get started, may I have your full name please?".to_string(),
        fields,
        derived: vec![DerivedFieldDef {
            name: "Academic_Performance".to_string(),
            source: "Academic_Score".to_string(),
            bands: vec![
                (90.0, "Excellent".to_string()),
                (75.0, "Good".to_string()),
                (60.0, "Average".to_string()),
            ],
            fallback: "Poor".to_string(),
        }],
        cross_rules: Vec::new(),
        encodings: [
            (
                "Academic_Performance".to_string(),
                vec![
                    ("Average".to_string(), 0.0),
                    ("Excellent".to_string(), 1.0),
                    ("Good".to_string(), 2.0),
                    ("Poor".to_string(), 3.0),
                ],
            ),
            (
                "Intended_Course".to_string(),
                vec![
                    ("Arts".to_string(), 0.0),
                    ("Finance".to_string(), 1.0),
                    ("Law".to_string(), 2.0),
                    ("MBA".to_string(), 3.0),
                    ("Medicine".to_string(), 4.0),
                    ("Other".to_string(), 5.0),
                    ("STEM".to_string(), 6.0),
                ],
            ),
            (
                "University_Tier".to_string(),
                vec![
                    ("Tier1".to_string(), 0.0),
                    ("Tier2".to_string(), 1.0),
                    ("Tier3".to_string(), 2.0),
                ],
            ),
            (
                "Loan_Type".to_string(),
                vec![("Secured".to_string(), 0.0), ("Unsecured".to_string(), 1.0)],
            ),
        ]
        .into_iter()
        .collect(),
        bounds: DecisionBounds {
            min_amount: 50_000.0,
            max_amount: 30_000_000.0,
            min_rate: 8.0,
            max_rate: 16.0,
            amount_field: "Expected_Loan_Amount".to_string(),
            collateral_cap: None,
        },
    }
}
