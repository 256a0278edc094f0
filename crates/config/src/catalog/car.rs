//! Car loan product table

use loan_agent_core::LoanType;

use crate::product::{
    DecisionBounds, FieldDef, FieldKind, ProductDefinition, RejectionKind, ValueRule,
};

use super::{age_field, cibil_field, customer_fields};

pub fn definition() -> ProductDefinition {
    let mut fields = customer_fields();

    fields.push(age_field(
        18.0,
        80.0,
        RejectionKind::Ineligible,
        "You must be at least 18 years old to apply for a car loan.",
        "Maximum age limit for a car loan is 80 years.",
    ));

    fields.push(
        FieldDef::new("applicant_annual_salary", FieldKind::Amount)
            .numeric()
            .context(&["annual salary", "salary"])
            .pattern(r"(?i)(?:annual|yearly)\D*(?:salary|income)\D*([\d,.]+\s*(?:lakhs?|lacs?|crores?|cr|thousand|k)?)")
            .pattern(r"(?i)(?:salary|earn)\D*([\d,.]+\s*(?:lakhs?|lacs?|crores?|cr|thousand|k)?)")
            .rule(ValueRule::Positive {
                message: "Annual salary must be a positive amount. Please provide your yearly salary.".to_string(),
            })
            .rule(ValueRule::AtLeast {
                limit: 300_000.0,
                kind: RejectionKind::Ineligible,
                message: "Minimum annual salary of ₹3,00,000 is required for car loan eligibility.".to_string(),
            })
            .rule(ValueRule::AtMost {
                limit: 100_000_000.0,
                kind: RejectionKind::Reconfirm,
                message: "Please verify your annual salary. The amount seems unusually high. Could you confirm your yearly income?".to_string(),
            })
            .ask("What is your annual salary in INR? (e.g., 800000)")
            .describe("number in INR (applicant's yearly salary, minimum 300000)"),
    );

    fields.push(
        FieldDef::new("Coapplicant_Annual_Income", FieldKind::Amount)
            .numeric()
            .context(&["co-applicant", "coapplicant"])
            .pattern(r"(?i)(?:coapplicant|co-applicant)\D*([\d,.]+\s*(?:lakhs?|lacs?|crores?|cr|thousand|k)?)")
            .rule(ValueRule::NonNegative {
                message: "Co-applicant income cannot be negative. Please provide the co-applicant's yearly income (enter 0 if no co-applicant).".to_string(),
            })
            .rule(ValueRule::AtMost {
                limit: 100_000_000.0,
                kind: RejectionKind::Reconfirm,
                message: "Please verify the co-applicant's income. The amount seems unusually high.".to_string(),
            })
            .ask("What is the co-applicant's annual income in INR? (enter 0 if none)")
            .describe("number in INR (co-applicant's yearly income, 0 if none)"),
    );

    fields.push(cibil_field(
        "CIBIL",
        650.0,
        "A minimum CIBIL score of 650 is required for car loan approval. Your current score does not meet our eligibility criteria.",
    ));

    fields.push(
        FieldDef::new("Car_Type", FieldKind::Choice)
            .allowed(&["Sedan", "SUV", "Hatchback", "Coupe"])
            .keyword("sedan", "Sedan")
            .keyword("hyundai", "Sedan")
            .keyword("honda", "Sedan")
            .keyword("city", "Sedan")
            .keyword("suv", "SUV")
            .keyword("tata", "SUV")
            .keyword("creta", "SUV")
            .keyword("nexon", "SUV")
            .keyword("hatchback", "Hatchback")
            .keyword("maruti", "Hatchback")
            .keyword("swift", "Hatchback")
            .keyword("coupe", "Coupe")
            .context(&["type of car", "car type"])
            .ask("What type of car are you planning to purchase? Choose one: Sedan, SUV, Hatchback, Coupe.")
            .describe("exactly one of [\"Sedan\",\"SUV\",\"Hatchback\",\"Coupe\"]"),
    );

    fields.push(
        FieldDef::new("down_payment_percent", FieldKind::Number)
            .numeric()
            .context(&["down payment"])
            .capture(10.0, 50.0)
            .pattern(r"(?i)(?:down\s*payment|advance)\D*(\d{1,2})\s*(?:%|percent)?")
            .pattern(r"(?i)(\d{1,2})\s*(?:%|percent)")
            .rule(ValueRule::AtLeast {
                limit: 10.0,
                kind: RejectionKind::Reconfirm,
                message: "Down payment percentage must be between 10% and 50%. Please specify your down payment percentage.".to_string(),
            })
            .rule(ValueRule::AtMost {
                limit: 50.0,
                kind: RejectionKind::Reconfirm,
                message: "Down payment percentage must be between 10% and 50%. Please specify your down payment percentage.".to_string(),
            })
            .ask("What percentage of the car price can you pay as down payment? (10–50, e.g., 20)")
            .describe("number (down payment percent, 10-50)"),
    );

    fields.push(
        FieldDef::new("Tenure", FieldKind::Number)
            .numeric()
            .context(&["tenure"])
            .capture(1.0, 7.0)
            .pattern(r"(?i)(?:tenure|term|duration)\D*(\d{1,2})")
            .pattern(r"(?i)(\d{1,2})\s*(?:years?|yrs?)\D*(?:tenure|term)")
            .rule(ValueRule::AtLeast {
                limit: 1.0,
                kind: RejectionKind::Reconfirm,
                message: "Car loan tenure must be between 1 and 7 years. Please specify your preferred repayment period.".to_string(),
            })
            .rule(ValueRule::AtMost {
                limit: 7.0,
                kind: RejectionKind::Reconfirm,
                message: "Car loan tenure must be between 1 and 7 years. Please specify your preferred repayment period.".to_string(),
            })
            .ask("What loan tenure do you prefer in years? (1–7, e.g., 5)")
            .describe("number (years, 1-7)"),
    );

    fields.push(
        FieldDef::new("loan_amount", FieldKind::Amount)
            .numeric()
            .context(&["loan amount", "amount"])
            .pattern(r"(?i)(?:loan|need|want|require|looking\s*for)\D*?([\d,.]+\s*(?:lakhs?|lacs?|crores?|cr|thousand|k)?)")
            .rule(ValueRule::Positive {
                message: "Loan amount must be a positive amount. Please specify how much loan you need.".to_string(),
            })
            .rule(ValueRule::AtLeast {
                limit: 100_000.0,
                kind: RejectionKind::Ineligible,
                message: "Minimum loan amount is ₹1,00,000 for car loans.".to_string(),
            })
            .rule(ValueRule::AtMost {
                limit: 50_000_000.0,
                kind: RejectionKind::Reconfirm,
                message: "Please verify your loan requirement. The amount seems unusually high for a car loan. Could you confirm the loan amount needed?".to_string(),
            })
            .ask("How much loan amount do you need in INR? (e.g., 600000)")
            .describe("number in INR (minimum 100000)"),
    );

    ProductDefinition {
        loan_type: LoanType::Car,
        display_name: "Car Loan".to_string(),
        description: "Loans for purchasing new and used cars with flexible repayment options".to_string(),
        greeting: "Hello! I'm a car loan specialist here to help you drive home your new car. Let's start with your full name - what should I call you?".to_string(),
        fields,
        derived: Vec::new(),
        cross_rules: Vec::new(),
        encodings: [(
            "Car_Type".to_string(),
            vec![
                ("Sedan".to_string(), 0.0),
                ("SUV".to_string(), 1.0),
                ("Hatchback".to_string(), 2.0),
                ("Coupe".to_string(), 3.0),
            ],
        )]
        .into_iter()
        .collect(),
        bounds: DecisionBounds {
            min_amount: 100_000.0,
            max_amount: 50_000_000.0,
            min_rate: 7.0,
            max_rate: 20.0,
            amount_field: "loan_amount".to_string(),
            collateral_cap: None,
        },
    }
}
