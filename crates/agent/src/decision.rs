//! Decision engine
//!
//! Converts a completed profile into the product's model-ready feature
//! vector, invokes the scoring collaborator, clamps the output to the
//! product's sane bounds and applies the approval policy: the applicant is
//! offered at most what they asked for, never the model's larger ceiling.
//!
//! A failed decisioning attempt leaves the profile untouched so the user
//! can retry; only persistence is best-effort.

use std::sync::Arc;

use chrono::Utc;

use loan_agent_config::ProductDefinition;
use loan_agent_core::{format_inr, FieldValue, LoanType, Profile, Verdict};
use loan_agent_persistence::{ApplicationRecord, ApplicationStore, CustomerInfo};
use loan_agent_scoring::{FeatureVector, ScorerRegistry, ScoringError};

use crate::AgentError;

/// The decision engine shared by all products
pub struct DecisionEngine {
    scorers: Arc<ScorerRegistry>,
    store: Arc<dyn ApplicationStore>,
}

/// A completed decision: the verdict plus the typed profile snapshot
#[derive(Debug, Clone)]
pub struct Decision {
    pub verdict: Verdict,
    pub message: String,
    pub profile: Profile,
    pub customer: CustomerInfo,
}

impl DecisionEngine {
    pub fn new(scorers: Arc<ScorerRegistry>, store: Arc<dyn ApplicationStore>) -> Self {
        Self { scorers, store }
    }

    /// Decide a completed profile.
    ///
    /// Fails only when the scoring collaborator is unavailable or errors;
    /// the caller keeps the profile intact in that case.
    pub async fn decide(
        &self,
        product: &ProductDefinition,
        session_id: &str,
        profile: &Profile,
    ) -> Result<Decision, AgentError> {
        // Numeric fields are validated long before this point; coercion here
        // is a defensive fallback, not the primary type-safety mechanism.
        let mut typed = profile.clone();
        for name in product.numeric_fields() {
            if let Some(value) = typed.get_mut(name) {
                *value = FieldValue::Number(value.coerce_f64());
            }
        }

        let features = build_features(product, &typed)?;
        let scorer = self.scorers.get(product.loan_type)?;
        let prediction = scorer.predict(&features)?;

        let bounds = &product.bounds;
        let mut eligible = prediction.eligible_amount;
        if let Some(cap) = &bounds.collateral_cap {
            if let Some(collateral) = typed.get(&cap.field).and_then(|v| v.as_f64()) {
                eligible = eligible.min(collateral * cap.factor);
            }
        }
        let eligible = eligible.clamp(bounds.min_amount, bounds.max_amount);
        let rate = round2(prediction.interest_rate.clamp(bounds.min_rate, bounds.max_rate));

        let requested = typed
            .get(&bounds.amount_field)
            .map(|v| v.coerce_f64())
            .filter(|v| *v > 0.0)
            .unwrap_or(500_000.0);

        let verdict = Verdict::from_prediction(eligible.round(), requested.round(), rate);
        let customer = customer_info(&typed);
        let message = offer_message(product, &customer, &verdict);

        tracing::info!(
            loan_type = %product.loan_type,
            session_id,
            status = %verdict.status,
            approved_amount = verdict.approved_amount,
            interest_rate = verdict.interest_rate,
            "Decision reached"
        );

        // Persistence is best-effort; the applicant still gets the offer.
        let record = ApplicationRecord {
            loan_type: product.loan_type,
            session_id: session_id.to_string(),
            customer: customer.clone(),
            loan_data: loan_data(product, &typed),
            verdict: verdict.clone(),
            created_at: Utc::now(),
        };
        if let Err(e) = self.store.save_application(&record).await {
            tracing::warn!(session_id, error = %e, "Failed to save application");
        }

        Ok(Decision {
            verdict,
            message,
            profile: typed,
            customer,
        })
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn customer_info(profile: &Profile) -> CustomerInfo {
    let text = |name: &str| {
        profile
            .get(name)
            .map(|v| v.as_text())
            .unwrap_or_default()
    };
    CustomerInfo {
        name: text("Customer_Name"),
        email: text("Customer_Email"),
        phone: text("Customer_Phone"),
    }
}

/// Profile minus the customer identity fields.
fn loan_data(product: &ProductDefinition, profile: &Profile) -> Profile {
    profile
        .iter()
        .filter(|(name, _)| {
            product
                .field(name)
                .map(|f| !f.is_identity())
                .unwrap_or(true)
        })
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// The user-facing offer, distinct in tone for full vs partial approval.
fn offer_message(product: &ProductDefinition, customer: &CustomerInfo, verdict: &Verdict) -> String {
    let amount = format_inr(verdict.approved_amount as f64);
    match verdict.status {
        loan_agent_core::ApprovalStatus::Approved => format!(
            "Fantastic news {}! You're pre-approved for your {}.\n\n\
             You are eligible for {} at {}% per annum.\n\n\
             What happens next:\n\
             - Your loan is pre-approved and ready for processing\n\
             - Fast-track processing with minimal documentation\n\
             - Our relationship manager will contact you within 24 hours\n\n\
             We'll reach out to you at {} or {} soon!",
            customer.name, product.display_name, amount, verdict.interest_rate,
            customer.email, customer.phone
        ),
        loan_agent_core::ApprovalStatus::PartialApproval => format!(
            "Good news {}! You're eligible for a {}.\n\n\
             Based on your profile we can offer {} at {}% per annum \
             (you requested {}).\n\n\
             Your loan offer:\n\
             - Approved amount: {}\n\
             - Interest rate: {}% per annum\n\
             - Pre-approved offer valid for 30 days\n\n\
             Our specialist will call you at {} or {} within 24 hours to discuss your requirements.",
            customer.name,
            product.display_name,
            amount,
            verdict.interest_rate,
            format_inr(verdict.requested_amount as f64),
            amount,
            verdict.interest_rate,
            customer.email,
            customer.phone
        ),
    }
}

// ============================================================================
// Feature engineering
// ============================================================================

/// Build the product's model-ready feature vector from a typed profile.
///
/// Customer identity fields never enter the feature set. Categorical fields
/// are encoded via the product's fixed category-to-code maps.
pub fn build_features(
    product: &ProductDefinition,
    profile: &Profile,
) -> Result<FeatureVector, ScoringError> {
    match product.loan_type {
        LoanType::Education => education_features(product, profile),
        LoanType::Home => home_features(product, profile),
        LoanType::Personal => personal_features(product, profile),
        LoanType::Business => business_features(product, profile),
        LoanType::Gold => gold_features(product, profile),
        LoanType::Car => car_features(product, profile),
    }
}

fn num(profile: &Profile, name: &str) -> Result<f64, ScoringError> {
    profile
        .get(name)
        .map(|v| v.coerce_f64())
        .ok_or_else(|| ScoringError::Feature(format!("missing field {}", name)))
}

fn code(product: &ProductDefinition, profile: &Profile, name: &str) -> Result<f64, ScoringError> {
    let value = profile
        .get(name)
        .map(|v| v.as_text())
        .ok_or_else(|| ScoringError::Feature(format!("missing field {}", name)))?;
    product
        .encode(name, &value)
        .ok_or_else(|| ScoringError::Feature(format!("no encoding for {}={}", name, value)))
}

fn education_features(
    product: &ProductDefinition,
    profile: &Profile,
) -> Result<FeatureVector, ScoringError> {
    let income = num(profile, "Coapplicant_Income")?;
    let networth = num(profile, "Guarantor_Networth")?;
    let cibil = num(profile, "CIBIL_Score")?;

    let mut fv = FeatureVector::new();
    fv.push("Age", num(profile, "Age")?);
    fv.push("Academic_Performance", code(product, profile, "Academic_Performance")?);
    fv.push("Intended_Course", code(product, profile, "Intended_Course")?);
    fv.push("University_Tier", code(product, profile, "University_Tier")?);
    fv.push("Coapplicant_Income", income);
    fv.push("Guarantor_Networth", networth);
    fv.push("CIBIL_Score", cibil);
    fv.push("Loan_Type", code(product, profile, "Loan_Type")?);
    fv.push("Repayment_Capacity", income * 4.0 + networth * 0.05 + cibil / 2.0);
    fv.push("Loan_Term", num(profile, "Loan_Term")?);
    Ok(fv)
}

fn home_features(
    product: &ProductDefinition,
    profile: &Profile,
) -> Result<FeatureVector, ScoringError> {
    let income = num(profile, "Income")?;
    let emi = num(profile, "Existing_total_EMI")?;
    let down_payment = num(profile, "Down_payment")?;
    let loan = num(profile, "Loan_amount_requested")?;
    let property = num(profile, "Property_value")?;

    let mut fv = FeatureVector::new();
    fv.push("Age", num(profile, "Age")?);
    fv.push("Income", income);
    fv.push("Guarantor_income", num(profile, "Guarantor_income")?);
    fv.push("Tenure", num(profile, "Tenure")?);
    fv.push("CIBIL_score", num(profile, "CIBIL_score")?);
    fv.push("Down_payment", down_payment);
    fv.push("Existing_total_EMI", emi);
    fv.push("Loan_amount_requested", loan);
    fv.push("Property_value", property);
    fv.push("LTV", loan / property);
    fv.push("EMI_to_income", emi / income);
    fv.push("DP_ratio", down_payment / property);

    // Employment type is one-hot encoded with the alphabetically first
    // category dropped, matching the training pipeline.
    let employment = profile
        .get("Employment_type")
        .map(|v| v.as_text())
        .ok_or_else(|| ScoringError::Feature("missing field Employment_type".to_string()))?;
    let field = product
        .field("Employment_type")
        .ok_or_else(|| ScoringError::Feature("product lacks Employment_type".to_string()))?;
    let mut categories = field.allowed.clone();
    categories.sort();
    if !categories.iter().any(|c| *c == employment) {
        return Err(ScoringError::Feature(format!(
            "no encoding for Employment_type={}",
            employment
        )));
    }
    for category in categories.iter().skip(1) {
        fv.push(
            format!("Employment_type_{}", category),
            if *category == employment { 1.0 } else { 0.0 },
        );
    }

    Ok(fv)
}

fn personal_features(
    product: &ProductDefinition,
    profile: &Profile,
) -> Result<FeatureVector, ScoringError> {
    let mut fv = FeatureVector::new();
    fv.push("Age", num(profile, "Age")?);
    fv.push("Employment_Type", code(product, profile, "Employment_Type")?);
    fv.push("Employment_Duration_Years", num(profile, "Employment_Duration_Years")?);
    fv.push("Annual_Income", num(profile, "Annual_Income")?);
    fv.push("CIBIL_Score", num(profile, "CIBIL_Score")?);
    fv.push("Existing_EMIs", num(profile, "Existing_EMIs")?);
    fv.push("Loan_Term_Years", num(profile, "Loan_Term_Years")?);
    Ok(fv)
}

fn business_features(
    product: &ProductDefinition,
    profile: &Profile,
) -> Result<FeatureVector, ScoringError> {
    let age = num(profile, "Business_Age_Years")?;
    let revenue = num(profile, "Annual_Revenue")?;
    let profit = num(profile, "Net_Profit")?;
    let cibil = num(profile, "CIBIL_Score")?;
    let existing = num(profile, "Existing_Loan_Amount")?;
    let collateral = code(product, profile, "Has_Collateral")?;
    let guarantor = code(product, profile, "Has_Guarantor")?;
    let industry = code(product, profile, "Industry_Risk_Rating")?;
    let location = code(product, profile, "Location_Tier")?;

    let mut fv = FeatureVector::new();
    fv.push("Business_Age_Years", age);
    fv.push("Annual_Revenue", revenue);
    fv.push("Net_Profit", profit);
    fv.push("CIBIL_Score", cibil);
    fv.push("Business_Type", code(product, profile, "Business_Type")?);
    fv.push("Existing_Loan_Amount", existing);
    fv.push("Loan_Tenure_Years", num(profile, "Loan_Tenure_Years")?);
    fv.push("Has_Collateral", collateral);
    fv.push("Has_Guarantor", guarantor);
    fv.push("Industry_Risk_Rating", industry);
    fv.push("Location_Tier", location);
    fv.push("Profit_Margin", profit / revenue * 100.0);
    fv.push("Debt_to_Revenue_Ratio", existing / revenue * 100.0);
    fv.push("Revenue_to_Profit_Ratio", revenue / (profit + 1.0));
    fv.push("Age_Revenue_Interaction", age * revenue.ln_1p());
    fv.push("CIBIL_Revenue_Score", cibil * revenue.ln_1p() / 1_000_000.0);
    fv.push("Risk_Adjusted_Revenue", revenue / (industry + location));
    fv.push("Collateral_Guarantor_Score", collateral * 2.0 + guarantor);
    fv.push("Business_Stability_Score", age / 25.0 + (cibil - 600.0) / 300.0);
    fv.push("Debt_Service_Coverage", profit / (existing * 0.12 + 1.0));
    fv.push("Location_Risk_Combined", location + industry);
    Ok(fv)
}

fn gold_features(
    product: &ProductDefinition,
    profile: &Profile,
) -> Result<FeatureVector, ScoringError> {
    let mut fv = FeatureVector::new();
    fv.push("Age", num(profile, "Age")?);
    fv.push("Occupation", code(product, profile, "Occupation")?);
    fv.push("Monthly_Income", num(profile, "Annual_Income")? / 12.0);
    fv.push("CIBIL_Score", num(profile, "CIBIL_Score")?);
    fv.push("Gold_Value", num(profile, "Gold_Value")?);
    // Existing EMI is not collected for gold loans; the model was trained
    // with a zero default.
    fv.push("Existing_EMI", 0.0);
    fv.push("Loan_Tenure_Years", num(profile, "Loan_Tenure")?);
    Ok(fv)
}

fn car_features(
    product: &ProductDefinition,
    profile: &Profile,
) -> Result<FeatureVector, ScoringError> {
    let salary = num(profile, "applicant_annual_salary")?;
    let coapplicant = num(profile, "Coapplicant_Annual_Income")?;

    let mut fv = FeatureVector::new();
    fv.push("applicant_annual_salary", salary);
    fv.push("Coapplicant_Annual_Income", coapplicant);
    fv.push("Total_Annual_Income", salary + coapplicant);
    fv.push("CIBIL", num(profile, "CIBIL")?);
    // Employment type is not collected for car loans; salaried is the
    // training default.
    fv.push("Employment_Type", 0.0);
    fv.push("Car_Type", code(product, profile, "Car_Type")?);
    fv.push("down_payment_percent", num(profile, "down_payment_percent")?);
    fv.push("Tenure", num(profile, "Tenure")?);
    fv.push("Age", num(profile, "Age")?);
    Ok(fv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use loan_agent_config::ProductRegistry;
    use loan_agent_core::ApprovalStatus;
    use loan_agent_persistence::MemoryApplicationStore;
    use loan_agent_scoring::{Prediction, Scorer};

    struct FixedScorer {
        amount: f64,
        rate: f64,
    }

    impl Scorer for FixedScorer {
        fn predict(&self, _features: &FeatureVector) -> Result<Prediction, ScoringError> {
            Ok(Prediction {
                eligible_amount: self.amount,
                interest_rate: self.rate,
            })
        }
    }

    fn personal_profile(requested: f64) -> Profile {
        let mut profile = Profile::new();
        profile.insert("Customer_Name".into(), FieldValue::Text("Riya Sharma".into()));
        profile.insert("Customer_Email".into(), FieldValue::Text("riya@example.com".into()));
        profile.insert("Customer_Phone".into(), FieldValue::Text("9876543210".into()));
        profile.insert("Age".into(), FieldValue::Number(30.0));
        profile.insert("Employment_Type".into(), FieldValue::Text("Salaried".into()));
        profile.insert("Employment_Duration_Years".into(), FieldValue::Number(5.0));
        profile.insert("Annual_Income".into(), FieldValue::Number(600_000.0));
        profile.insert("CIBIL_Score".into(), FieldValue::Number(720.0));
        profile.insert("Existing_EMIs".into(), FieldValue::Number(0.0));
        profile.insert("Loan_Term_Years".into(), FieldValue::Number(3.0));
        profile.insert("Expected_Loan_Amount".into(), FieldValue::Number(requested));
        profile
    }

    fn engine(amount: f64, rate: f64) -> (DecisionEngine, Arc<MemoryApplicationStore>) {
        let mut scorers = ScorerRegistry::new();
        for lt in LoanType::all() {
            scorers.insert(*lt, Arc::new(FixedScorer { amount, rate }));
        }
        let store = Arc::new(MemoryApplicationStore::new());
        (
            DecisionEngine::new(Arc::new(scorers), store.clone()),
            store,
        )
    }

    #[tokio::test]
    async fn test_full_approval_never_reveals_ceiling() {
        let registry = ProductRegistry::builtin();
        let product = registry.get(LoanType::Personal).unwrap();
        let (engine, store) = engine(800_000.0, 11.5);

        let decision = engine
            .decide(&product, "s1", &personal_profile(500_000.0))
            .await
            .unwrap();
        assert_eq!(decision.verdict.status, ApprovalStatus::Approved);
        assert_eq!(decision.verdict.approved_amount, 500_000);
        assert!(!decision.message.contains("8,00,000"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_partial_approval() {
        let registry = ProductRegistry::builtin();
        let product = registry.get(LoanType::Personal).unwrap();
        let (engine, _store) = engine(300_000.0, 12.0);

        let decision = engine
            .decide(&product, "s1", &personal_profile(500_000.0))
            .await
            .unwrap();
        assert_eq!(decision.verdict.status, ApprovalStatus::PartialApproval);
        assert_eq!(decision.verdict.approved_amount, 300_000);
        assert_eq!(decision.verdict.requested_amount, 500_000);
    }

    #[tokio::test]
    async fn test_rate_clamped_to_product_band() {
        let registry = ProductRegistry::builtin();
        let product = registry.get(LoanType::Personal).unwrap();
        let (engine, _store) = engine(800_000.0, 42.0);

        let decision = engine
            .decide(&product, "s1", &personal_profile(500_000.0))
            .await
            .unwrap();
        assert_eq!(decision.verdict.interest_rate, 18.0);
    }

    #[tokio::test]
    async fn test_missing_scorer_fails_cleanly() {
        let registry = ProductRegistry::builtin();
        let product = registry.get(LoanType::Personal).unwrap();
        let store = Arc::new(MemoryApplicationStore::new());
        let engine = DecisionEngine::new(Arc::new(ScorerRegistry::new()), store.clone());

        let result = engine.decide(&product, "s1", &personal_profile(500_000.0)).await;
        assert!(matches!(result, Err(AgentError::Scoring(_))));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_gold_collateral_cap() {
        let registry = ProductRegistry::builtin();
        let product = registry.get(LoanType::Gold).unwrap();
        let (engine, _store) = engine(900_000.0, 10.0);

        let mut profile = Profile::new();
        profile.insert("Customer_Name".into(), FieldValue::Text("Arjun".into()));
        profile.insert("Customer_Email".into(), FieldValue::Text("arjun@example.com".into()));
        profile.insert("Customer_Phone".into(), FieldValue::Text("9876543210".into()));
        profile.insert("Age".into(), FieldValue::Number(40.0));
        profile.insert("Annual_Income".into(), FieldValue::Number(500_000.0));
        profile.insert("CIBIL_Score".into(), FieldValue::Number(700.0));
        profile.insert("Occupation".into(), FieldValue::Text("Salaried".into()));
        profile.insert("Gold_Value".into(), FieldValue::Number(500_000.0));
        profile.insert("Loan_Amount".into(), FieldValue::Number(450_000.0));
        profile.insert("Loan_Tenure".into(), FieldValue::Number(2.0));

        let decision = engine.decide(&product, "s1", &profile).await.unwrap();
        // Eligible is capped at 80% of the gold value (400k) < requested 450k.
        assert_eq!(decision.verdict.status, ApprovalStatus::PartialApproval);
        assert_eq!(decision.verdict.approved_amount, 400_000);
    }

    #[test]
    fn test_business_derived_features() {
        let registry = ProductRegistry::builtin();
        let product = registry.get(LoanType::Business).unwrap();

        let mut profile = Profile::new();
        profile.insert("Business_Age_Years".into(), FieldValue::Number(5.0));
        profile.insert("Annual_Revenue".into(), FieldValue::Number(5_000_000.0));
        profile.insert("Net_Profit".into(), FieldValue::Number(1_000_000.0));
        profile.insert("CIBIL_Score".into(), FieldValue::Number(750.0));
        profile.insert("Business_Type".into(), FieldValue::Text("Retail".into()));
        profile.insert("Existing_Loan_Amount".into(), FieldValue::Number(500_000.0));
        profile.insert("Loan_Tenure_Years".into(), FieldValue::Number(5.0));
        profile.insert("Has_Collateral".into(), FieldValue::Text("Yes".into()));
        profile.insert("Has_Guarantor".into(), FieldValue::Text("No".into()));
        profile.insert("Industry_Risk_Rating".into(), FieldValue::Text("Healthcare".into()));
        profile.insert("Location_Tier".into(), FieldValue::Text("Tier-2 City".into()));
        profile.insert("Expected_Loan_Amount".into(), FieldValue::Number(1_500_000.0));

        let fv = build_features(&product, &profile).unwrap();
        assert_eq!(fv.get("Profit_Margin"), Some(20.0));
        assert_eq!(fv.get("Debt_to_Revenue_Ratio"), Some(10.0));
        assert_eq!(fv.get("Collateral_Guarantor_Score"), Some(2.0));
        assert_eq!(fv.get("Location_Risk_Combined"), Some(3.0));
    }

    #[test]
    fn test_home_one_hot_encoding() {
        let registry = ProductRegistry::builtin();
        let product = registry.get(LoanType::Home).unwrap();

        let mut profile = Profile::new();
        profile.insert("Age".into(), FieldValue::Number(35.0));
        profile.insert("Income".into(), FieldValue::Number(80_000.0));
        profile.insert("Guarantor_income".into(), FieldValue::Number(0.0));
        profile.insert("Tenure".into(), FieldValue::Number(20.0));
        profile.insert("CIBIL_score".into(), FieldValue::Number(760.0));
        profile.insert("Employment_type".into(), FieldValue::Text("Salaried".into()));
        profile.insert("Down_payment".into(), FieldValue::Number(1_000_000.0));
        profile.insert("Existing_total_EMI".into(), FieldValue::Number(8_000.0));
        profile.insert("Loan_amount_requested".into(), FieldValue::Number(4_000_000.0));
        profile.insert("Property_value".into(), FieldValue::Number(5_000_000.0));

        let fv = build_features(&product, &profile).unwrap();
        assert_eq!(fv.get("LTV"), Some(0.8));
        assert_eq!(fv.get("DP_ratio"), Some(0.2));
        assert_eq!(fv.get("Employment_type_Salaried"), Some(1.0));
        assert_eq!(fv.get("Employment_type_Government Employee"), Some(0.0));
        assert_eq!(fv.get("Employment_type_Self-Employed"), Some(0.0));
        // "Business Owner" is the dropped baseline category.
        assert_eq!(fv.get("Employment_type_Business Owner"), None);
    }

    #[test]
    fn test_identity_fields_never_in_features() {
        let registry = ProductRegistry::builtin();
        let product = registry.get(LoanType::Personal).unwrap();
        let fv = build_features(&product, &personal_profile(500_000.0)).unwrap();
        assert_eq!(fv.get("Customer_Name"), None);
        assert_eq!(fv.get("Customer_Email"), None);
        assert_eq!(fv.get("Customer_Phone"), None);
    }
}
