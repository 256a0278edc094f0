//! Gold loan product table

use loan_agent_core::LoanType;

use crate::product::{
    CollateralCap, DecisionBounds, FieldDef, FieldKind, ProductDefinition, RejectionKind,
    ValueRule,
};

use super::{age_field, cibil_field, customer_fields};

pub fn definition() -> ProductDefinition {
    let mut fields = customer_fields();

    fields.push(age_field(
        21.0,
        75.0,
        RejectionKind::Ineligible,
        "You must be at least 21 years old to apply for a gold loan. Unfortunately, we cannot process your application at this time.",
        "Gold loans are available only for applicants up to 75 years of age. Unfortunately, we cannot process your application at this time.",
    ));

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
                limit: 180_000.0,
                kind: RejectionKind::Ineligible,
                message: "Minimum annual income of ₹1,80,000 is required for gold loan eligibility.".to_string(),
            })
            .rule(ValueRule::AtMost {
                limit: 60_000_000.0,
                kind: RejectionKind::Reconfirm,
                message: "Please verify your annual income. The amount seems unusually high. Could you confirm?".to_string(),
            })
            .ask("What is your annual income in INR? (e.g., 400000)")
            .describe("number in INR (yearly income, minimum 180000)"),
    );

    fields.push(cibil_field(
        "CIBIL_Score",
        600.0,
        "A minimum CIBIL score of 600 is required for gold loan approval. Your current score does not meet our eligibility criteria.",
    ));

    fields.push(
        FieldDef::new("Occupation", FieldKind::Choice)
            .allowed(&["Salaried", "Retired", "Business", "Self-employed"])
            .keyword("self employed", "Self-employed")
            .keyword("self-employed", "Self-employed")
            .keyword("freelance", "Self-employed")
            .keyword("consultant", "Self-employed")
            .keyword("retired", "Retired")
            .keyword("pension", "Retired")
            .keyword("senior", "Retired")
            .keyword("businessman", "Business")
            .keyword("business", "Business")
            .keyword("trader", "Business")
            .keyword("merchant", "Business")
            .keyword("salaried", "Salaried")
            .keyword("employee", "Salaried")
            .keyword("job", "Salaried")
            .keyword("working", "Salaried")
            .context(&["occupation"])
            .ask("What is your occupation? Choose one: Salaried, Retired, Business, Self-employed.")
            .describe("exactly one of [\"Salaried\",\"Retired\",\"Business\",\"Self-employed\"]"),
    );

    fields.push(
        FieldDef::new("Gold_Value", FieldKind::Amount)
            .numeric()
            .context(&["value of your gold", "gold"])
            .pattern(r"(?i)(?:gold|jewell?ery)\D*(?:value|worth)?\D*([\d,.]+\s*(?:lakhs?|lacs?|crores?|cr|thousand|k)?)")
            .rule(ValueRule::Positive {
                message: "Gold value must be a positive amount. Please provide the current market value of your gold in INR.".to_string(),
            })
            .rule(ValueRule::AtLeast {
                limit: 10_000.0,
                kind: RejectionKind::Ineligible,
                message: "Minimum gold value of ₹10,000 is required for gold loan eligibility.".to_string(),
            })
            .rule(ValueRule::AtMost {
                limit: 50_000_000.0,
                kind: RejectionKind::Reconfirm,
                message: "Please verify your gold value. The amount seems unusually high. Could you confirm the current market value?".to_string(),
            })
            .ask("What is the current market value of your gold in INR? (e.g., 300000)")
            .describe("number in INR (current market value of the gold, minimum 10000)"),
    );

    fields.push(
        FieldDef::new("Loan_Amount", FieldKind::Amount)
            .numeric()
            .context(&["loan amount", "amount"])
            .pattern(r"(?i)(?:loan|need|want|require|looking\s*for)\D*?([\d,.]+\s*(?:lakhs?|lacs?|crores?|cr|thousand|k)?)")
            .rule(ValueRule::Positive {
                message: "Loan amount must be a positive amount. Please provide your desired loan amount in INR.".to_string(),
            })
            .rule(ValueRule::AtLeast {
                limit: 5_000.0,
                kind: RejectionKind::Ineligible,
                message: "Minimum loan amount of ₹5,000 is required.".to_string(),
            })
            .rule(ValueRule::AtMost {
                limit: 10_000_000.0,
                kind: RejectionKind::Reconfirm,
                message: "Please verify your loan amount. The amount seems unusually high for a gold loan.".to_string(),
            })
            .ask("What loan amount are you looking for in INR? (e.g., 200000)")
            .describe("number in INR (desired loan amount, minimum 5000)"),
    );

    fields.push(
        FieldDef::new("Loan_Tenure", FieldKind::Number)
            .numeric()
            .context(&["tenure"])
            .capture(1.0, 3.0)
            .pattern(r"(?i)(?:tenure|term|duration)\D*(\d{1,2})")
            .pattern(r"(?i)(\d{1,2})\s*(?:years?|yrs?)\D*(?:tenure|term)")
            .rule(ValueRule::AtLeast {
                limit: 1.0,
                kind: RejectionKind::Ineligible,
                message: "Gold loan tenure must be at least 1 year. Please specify a tenure between 1 and 3 years.".to_string(),
            })
            .rule(ValueRule::AtMost {
                limit: 3.0,
                kind: RejectionKind::Ineligible,
                message: "Gold loan tenure cannot exceed 3 years. Please specify a tenure between 1 and 3 years.".to_string(),
            })
            .ask("What loan tenure do you prefer in years? (1–3)")
            .describe("number (years, 1-3)"),
    );

    ProductDefinition {
        loan_type: LoanType::Gold,
        display_name: "Gold Loan".to_string(),
        description: "Secured loans against gold jewelry and ornaments".to_string(),
        greeting: "Hello! I'm a gold loan specialist here to help you unlock the value of your gold. Let's start with your full name - what should I call you?".to_string(),
        fields,
        derived: Vec::new(),
        cross_rules: Vec::new(),
        encodings: [(
            "Occupation".to_string(),
            vec![
                ("Business".to_string(), 0.0),
                ("Retired".to_string(), 1.0),
                ("Salaried".to_string(), 2.0),
                ("Self-employed".to_string(), 3.0),
            ],
        )]
        .into_iter()
        .collect(),
        bounds: DecisionBounds {
            min_amount: 5_000.0,
            max_amount: 10_000_000.0,
            min_rate: 8.0,
            max_rate: 24.0,
            amount_field: "Loan_Amount".to_string(),
            collateral_cap: Some(CollateralCap {
                field: "Gold_Value".to_string(),
                factor: 0.8,
            }),
        },
    }
}
