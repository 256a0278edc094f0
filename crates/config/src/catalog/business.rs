//! Business loan product table

use loan_agent_core::LoanType;

use crate::product::{
    CrossFieldRule, DecisionBounds, FieldDef, FieldKind, ProductDefinition, RejectionKind,
    ValueRule,
};

use super::{cibil_field, customer_fields};

pub fn definition() -> ProductDefinition {
    let mut fields = customer_fields();

    fields.push(
        FieldDef::new("Business_Age_Years", FieldKind::Number)
            .numeric()
            .context(&["business been operating", "operating"])
            .capture(1.0, 50.0)
            .pattern(r"(?i)(?:business|company|operating|established)\D*(\d{1,2})\s*(?:years?|yrs?)")
            .pattern(r"(?i)(?:since|for|past)\s*(\d{1,2})\s*(?:years?|yrs?)")
            .rule(ValueRule::AtLeast {
                limit: 1.0,
                kind: RejectionKind::Ineligible,
                message: "Business must be operating for at least 1 year to qualify for a business loan.".to_string(),
            })
            .rule(ValueRule::AtMost {
                limit: 50.0,
                kind: RejectionKind::Reconfirm,
                message: "Please verify your business age. The duration seems unusually high. Could you confirm how many years your business has been operating?".to_string(),
            })
            .ask("How many years has your business been operating? (e.g., 6)")
            .describe("number (years the business has been operating)"),
    );

    fields.push(
        FieldDef::new("Annual_Revenue", FieldKind::Amount)
            .numeric()
            .context(&["revenue", "turnover"])
            .pattern(r"(?i)(?:revenue|turnover)\D*([\d,.]+\s*(?:lakhs?|lacs?|crores?|cr|thousand|k)?)")
            .pattern(r"(?i)(?:make|earn|generate)\D*([\d,.]+\s*(?:lakhs?|lacs?|crores?|cr|thousand|k)?)")
            .rule(ValueRule::Positive {
                message: "Annual revenue must be a positive amount. Please provide your yearly business revenue.".to_string(),
            })
            .rule(ValueRule::AtLeast {
                limit: 500_000.0,
                kind: RejectionKind::Ineligible,
                message: "Minimum annual revenue of ₹5,00,000 is required for business loan eligibility.".to_string(),
            })
            .rule(ValueRule::AtMost {
                limit: 1_000_000_000.0,
                kind: RejectionKind::Reconfirm,
                message: "Please verify your annual revenue. The amount seems unusually high. Could you confirm your yearly business income?".to_string(),
            })
            .ask("What is your annual business revenue in INR? (e.g., 5000000)")
            .describe("number in INR (yearly business revenue, minimum 500000)"),
    );

    fields.push(
        FieldDef::new("Net_Profit", FieldKind::Amount)
            .numeric()
            .context(&["profit"])
            .pattern(r"(?i)(?:net\s*)?profit\D*([\d,.]+\s*(?:lakhs?|lacs?|crores?|cr|thousand|k)?)")
            .rule(ValueRule::Positive {
                message: "Net profit must be a positive amount. Please provide your yearly net profit after all expenses.".to_string(),
            })
            .rule(ValueRule::AtMost {
                limit: 500_000_000.0,
                kind: RejectionKind::Reconfirm,
                message: "Please verify your net profit. The amount seems unusually high. Could you confirm your yearly net profit?".to_string(),
            })
            .ask("What is your yearly net profit after expenses in INR? (e.g., 800000)")
            .describe("number in INR (yearly net profit, must be less than annual revenue)"),
    );

    fields.push(cibil_field(
        "CIBIL_Score",
        650.0,
        "A minimum CIBIL score of 650 is required for business loan approval. Your current score does not meet our eligibility criteria.",
    ));

    fields.push(
        FieldDef::new("Business_Type", FieldKind::Choice)
            .allowed(&["Retail", "Trading", "Services", "Manufacturing"])
            .keyword("retail", "Retail")
            .keyword("shop", "Retail")
            .keyword("store", "Retail")
            .keyword("selling", "Retail")
            .keyword("trading", "Trading")
            .keyword("trade", "Trading")
            .keyword("import", "Trading")
            .keyword("export", "Trading")
            .keyword("service", "Services")
            .keyword("consulting", "Services")
            .keyword("agency", "Services")
            .keyword("manufacturing", "Manufacturing")
            .keyword("manufacture", "Manufacturing")
            .keyword("factory", "Manufacturing")
            .keyword("production", "Manufacturing")
            .context(&["business type"])
            .ask("What is your business type? Choose one: Retail, Trading, Services, Manufacturing.")
            .describe("exactly one of [\"Retail\",\"Trading\",\"Services\",\"Manufacturing\"]"),
    );

    fields.push(
        FieldDef::new("Existing_Loan_Amount", FieldKind::Amount)
            .numeric()
            .context(&["existing", "outstanding"])
            .pattern(r"(?i)(?:existing|current|outstanding)\D*([\d,.]+\s*(?:lakhs?|lacs?|crores?|cr|thousand|k)?)")
            .rule(ValueRule::NonNegative {
                message: "Existing loan amount cannot be negative. Please provide your current business loan amount (enter 0 if none).".to_string(),
            })
            .ask("What is your existing business loan outstanding in INR? (enter 0 if none)")
            .describe("number in INR (current business loan outstanding, 0 if none)"),
    );

    fields.push(
        FieldDef::new("Loan_Tenure_Years", FieldKind::Number)
            .numeric()
            .context(&["tenure", "repayment"])
            .capture(1.0, 10.0)
            .pattern(r"(?i)(?:tenure|repayment|period|term)\D*(\d{1,2})")
            .pattern(r"(?i)(\d{1,2})\s*(?:years?|yrs?)\D*(?:tenure|repayment|term)")
            .rule(ValueRule::AtLeast {
                limit: 1.0,
                kind: RejectionKind::Reconfirm,
                message: "Business loan tenure must be between 1 and 10 years. Please specify your preferred repayment period.".to_string(),
            })
            .rule(ValueRule::AtMost {
                limit: 10.0,
                kind: RejectionKind::Reconfirm,
                message: "Business loan tenure must be between 1 and 10 years. Please specify your preferred repayment period.".to_string(),
            })
            .ask("What repayment tenure do you prefer in years? (1–10, e.g., 5)")
            .describe("number (years, 1-10)"),
    );

    fields.push(
        FieldDef::new("Has_Collateral", FieldKind::YesNo)
            .context(&["collateral"])
            .ask("Do you have collateral available to secure the loan? (Yes or No)")
            .describe("exactly one of [\"Yes\",\"No\"]"),
    );

    fields.push(
        FieldDef::new("Has_Guarantor", FieldKind::YesNo)
            .context(&["guarantor"])
            .ask("Do you have a guarantor available? (Yes or No)")
            .describe("exactly one of [\"Yes\",\"No\"]"),
    );

    fields.push(
        FieldDef::new("Industry_Risk_Rating", FieldKind::Choice)
            .allowed(&[
                "Healthcare",
                "FMCG",
                "IT Services",
                "Education",
                "Automobile",
                "Telecom",
                "Real Estate",
                "Hospitality",
                "Crypto",
                "Airlines",
            ])
            .keyword("healthcare", "Healthcare")
            .keyword("health", "Healthcare")
            .keyword("medical", "Healthcare")
            .keyword("hospital", "Healthcare")
            .keyword("fmcg", "FMCG")
            .keyword("consumer goods", "FMCG")
            .keyword("it services", "IT Services")
            .keyword("software", "IT Services")
            .keyword("tech", "IT Services")
            .keyword("technology", "IT Services")
            .keyword("education", "Education")
            .keyword("school", "Education")
            .keyword("college", "Education")
            .keyword("training", "Education")
            .keyword("automobile", "Automobile")
            .keyword("auto", "Automobile")
            .keyword("vehicle", "Automobile")
            .keyword("telecom", "Telecom")
            .keyword("network", "Telecom")
            .keyword("real estate", "Real Estate")
            .keyword("property", "Real Estate")
            .keyword("construction", "Real Estate")
            .keyword("builder", "Real Estate")
            .keyword("hospitality", "Hospitality")
            .keyword("hotel", "Hospitality")
            .keyword("restaurant", "Hospitality")
            .keyword("food", "Hospitality")
            .keyword("tourism", "Hospitality")
            .keyword("crypto", "Crypto")
            .keyword("blockchain", "Crypto")
            .keyword("airline", "Airlines")
            .keyword("aviation", "Airlines")
            .keyword("flight", "Airlines")
            .context(&["industry"])
            .ask("Which industry does your business operate in? Choose one: Healthcare, FMCG, IT Services, Education, Automobile, Telecom, Real Estate, Hospitality, Crypto, Airlines.")
            .describe("exactly one of [\"Healthcare\",\"FMCG\",\"IT Services\",\"Education\",\"Automobile\",\"Telecom\",\"Real Estate\",\"Hospitality\",\"Crypto\",\"Airlines\"]"),
    );

    fields.push(
        FieldDef::new("Location_Tier", FieldKind::Choice)
            .allowed(&["Tier-1 City", "Tier-2 City", "Tier-3 City", "Rural"])
            .keyword("tier-1", "Tier-1 City")
            .keyword("tier 1", "Tier-1 City")
            .keyword("metro", "Tier-1 City")
            .keyword("mumbai", "Tier-1 City")
            .keyword("delhi", "Tier-1 City")
            .keyword("bangalore", "Tier-1 City")
            .keyword("chennai", "Tier-1 City")
            .keyword("kolkata", "Tier-1 City")
            .keyword("hyderabad", "Tier-1 City")
            .keyword("pune", "Tier-1 City")
            .keyword("tier-2", "Tier-2 City")
            .keyword("tier 2", "Tier-2 City")
            .keyword("tier-3", "Tier-3 City")
            .keyword("tier 3", "Tier-3 City")
            .keyword("small city", "Tier-3 City")
            .keyword("rural", "Rural")
            .keyword("village", "Rural")
            .keyword("town", "Rural")
            .context(&["location"])
            .ask("Which location type best describes your business location? Choose one: Tier-1 City, Tier-2 City, Tier-3 City, Rural.")
            .describe("exactly one of [\"Tier-1 City\",\"Tier-2 City\",\"Tier-3 City\",\"Rural\"]"),
    );

    fields.push(
        FieldDef::new("Expected_Loan_Amount", FieldKind::Amount)
            .numeric()
            .context(&["loan amount", "amount"])
            .pattern(r"(?i)(?:loan|need|want|require|looking\s*for)\D*?([\d,.]+\s*(?:lakhs?|lacs?|crores?|cr|thousand|k)?)")
            .rule(ValueRule::Positive {
                message: "Expected loan amount must be a positive amount. Please specify how much loan you need.".to_string(),
            })
            .rule(ValueRule::AtLeast {
                limit: 100_000.0,
                kind: RejectionKind::Ineligible,
                message: "Minimum loan amount is ₹1,00,000 for business loans.".to_string(),
            })
            .rule(ValueRule::AtMost {
                limit: 100_000_000.0,
                kind: RejectionKind::Reconfirm,
                message: "Please verify your loan requirement. The amount seems unusually high. Could you confirm how much loan you need?".to_string(),
            })
            .ask("How much loan amount do you need in INR? (e.g., 1500000)")
            .describe("number in INR (minimum 100000, maximum 100000000)"),
    );

    ProductDefinition {
        loan_type: LoanType::Business,
        display_name: "Business Loan".to_string(),
        description: "Loans for business expansion, working capital, and commercial purposes".to_string(),
        greeting: "Hello! I'm a business loan specialist here to help you grow your business. Let's start with your full name - what should I call you?".to_string(),
        fields,
        derived: Vec::new(),
        cross_rules: vec![CrossFieldRule::StrictlyLessThan {
            field: "Net_Profit".to_string(),
            than: "Annual_Revenue".to_string(),
            message: "Net profit cannot be equal to or greater than annual revenue. Please verify your financial figures — net profit should be the amount left after all business expenses are deducted from revenue.".to_string(),
        }],
        encodings: [
            (
                "Business_Type".to_string(),
                vec![
                    ("Manufacturing".to_string(), 0.0),
                    ("Retail".to_string(), 1.0),
                    ("Services".to_string(), 2.0),
                    ("Trading".to_string(), 3.0),
                ],
            ),
            (
                "Industry_Risk_Rating".to_string(),
                vec![
                    ("Healthcare".to_string(), 1.0),
                    ("FMCG".to_string(), 1.0),
                    ("IT Services".to_string(), 2.0),
                    ("Education".to_string(), 2.0),
                    ("Automobile".to_string(), 3.0),
                    ("Telecom".to_string(), 3.0),
                    ("Real Estate".to_string(), 4.0),
                    ("Hospitality".to_string(), 4.0),
                    ("Crypto".to_string(), 5.0),
                    ("Airlines".to_string(), 5.0),
                ],
            ),
            (
                "Location_Tier".to_string(),
                vec![
                    ("Tier-1 City".to_string(), 1.0),
                    ("Tier-2 City".to_string(), 2.0),
                    ("Tier-3 City".to_string(), 3.0),
                    ("Rural".to_string(), 4.0),
                ],
            ),
            (
                "Has_Collateral".to_string(),
                vec![("Yes".to_string(), 1.0), ("No".to_string(), 0.0)],
            ),
            (
                "Has_Guarantor".to_string(),
                vec![("Yes".to_string(), 1.0), ("No".to_string(), 0.0)],
            ),
        ]
        .into_iter()
        .collect(),
        bounds: DecisionBounds {
            min_amount: 100_000.0,
            max_amount: 100_000_000.0,
            min_rate: 8.0,
            max_rate: 24.0,
            amount_field: "Expected_Loan_Amount".to_string(),
            collateral_cap: None,
        },
    }
}
