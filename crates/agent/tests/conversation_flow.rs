//! End-to-end conversation flows in fallback-only mode
//!
//! No language-model backend is configured anywhere in these tests: the
//! whole flow must reach a verdict on the deterministic extractor and
//! follow-up generator alone.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use loan_agent_agent::{AgentError, Conversation, TurnController};
use loan_agent_config::ProductRegistry;
use loan_agent_core::{ApprovalStatus, FieldValue, LoanType};
use loan_agent_persistence::MemoryApplicationStore;
use loan_agent_scoring::{FeatureVector, Prediction, Scorer, ScorerRegistry, ScoringError};

/// Scorer returning a fixed prediction and counting invocations.
struct CountingScorer {
    amount: f64,
    rate: f64,
    calls: Arc<AtomicUsize>,
}

impl Scorer for CountingScorer {
    fn predict(&self, _features: &FeatureVector) -> Result<Prediction, ScoringError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Prediction {
            eligible_amount: self.amount,
            interest_rate: self.rate,
        })
    }
}

struct Harness {
    controller: TurnController,
    store: Arc<MemoryApplicationStore>,
    scorer_calls: Arc<AtomicUsize>,
}

fn harness(loan_type: LoanType, predicted_amount: f64, rate: f64) -> Harness {
    let registry = ProductRegistry::builtin();
    let product = registry.get(loan_type).unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let mut scorers = ScorerRegistry::new();
    scorers.insert(
        loan_type,
        Arc::new(CountingScorer {
            amount: predicted_amount,
            rate,
            calls: calls.clone(),
        }),
    );

    let store = Arc::new(MemoryApplicationStore::new());
    let controller = TurnController::new(product, None, Arc::new(scorers), store.clone());
    Harness {
        controller,
        store,
        scorer_calls: calls,
    }
}

#[tokio::test]
async fn personal_loan_end_to_end_fallback_only() {
    let h = harness(LoanType::Personal, 800_000.0, 11.5);
    let (mut convo, greeting) = h.controller.start("session-1").await;
    assert!(greeting.to_lowercase().contains("name"));

    let answers = [
        "Riya Sharma",
        "riya.sharma@example.com",
        "9876543210",
        "30",
        "Salaried",
        "5",
        "6 lakh",
        "720",
        "0",
        "3",
    ];

    for answer in answers {
        let outcome = h.controller.handle_turn(&mut convo, answer).await.unwrap();
        assert!(
            outcome.decision.is_none(),
            "decided early on answer {:?} (missing: {:?})",
            answer,
            outcome.missing_fields
        );
        assert!(!outcome.missing_fields.is_empty());
        // The scorer is never invoked while a required field is missing.
        assert_eq!(h.scorer_calls.load(Ordering::SeqCst), 0);
    }

    // Intermediate sanity: the profile accumulated typed values.
    assert_eq!(
        convo.profile.get("Annual_Income"),
        Some(&FieldValue::Number(600_000.0))
    );
    assert_eq!(convo.profile.get("CIBIL_Score"), Some(&FieldValue::Number(720.0)));

    let outcome = h.controller.handle_turn(&mut convo, "2 lakh").await.unwrap();
    let decision = outcome.decision.expect("final turn must decide");

    assert_eq!(decision.verdict.status, ApprovalStatus::Approved);
    assert_eq!(decision.verdict.approved_amount, 200_000);
    assert!(decision.verdict.interest_rate > 0.0);
    assert_eq!(h.scorer_calls.load(Ordering::SeqCst), 1);

    // Profile resets immediately after a decision; the transcript stays.
    assert!(convo.profile.is_empty());
    assert_eq!(convo.decisions, 1);
    assert!(convo.turn_count() > answers.len());

    // The application was handed to storage.
    assert_eq!(h.store.len(), 1);
}

#[tokio::test]
async fn second_application_restores_identity_only() {
    let h = harness(LoanType::Personal, 800_000.0, 11.5);
    let (mut convo, _) = h.controller.start("session-2").await;

    for answer in [
        "Riya Sharma",
        "riya.sharma@example.com",
        "9876543210",
        "30",
        "Salaried",
        "5",
        "6 lakh",
        "720",
        "0",
        "3",
    ] {
        h.controller.handle_turn(&mut convo, answer).await.unwrap();
    }
    let outcome = h.controller.handle_turn(&mut convo, "2 lakh").await.unwrap();
    assert!(outcome.decision.is_some());

    // Next message starts a second application: identity is restored from
    // the saved record, loan fields are collected afresh.
    let outcome = h.controller.handle_turn(&mut convo, "hello again").await.unwrap();
    assert_eq!(
        convo.profile.get("Customer_Name"),
        Some(&FieldValue::Text("Riya Sharma".to_string()))
    );
    assert_eq!(outcome.missing_fields.first().map(String::as_str), Some("Age"));
    assert!(outcome.decision.is_none());
}

#[tokio::test]
async fn ineligible_cibil_is_rejected_and_never_stored() {
    let h = harness(LoanType::Personal, 800_000.0, 11.5);
    let (mut convo, _) = h.controller.start("session-3").await;

    let outcome = h
        .controller
        .handle_turn(&mut convo, "my cibil score is 600")
        .await
        .unwrap();

    assert!(outcome.message.contains("650"));
    assert!(outcome.decision.is_none());
    assert!(!convo.profile.contains_key("CIBIL_Score"));
    assert!(outcome.missing_fields.contains(&"CIBIL_Score".to_string()));
    assert_eq!(h.scorer_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn first_rejection_stops_the_turn_but_keeps_earlier_fields() {
    let h = harness(LoanType::Personal, 800_000.0, 11.5);
    let (mut convo, _) = h.controller.start("session-4").await;

    // Age (21) is accepted and committed before CIBIL (600) is rejected.
    let outcome = h
        .controller
        .handle_turn(&mut convo, "I am 21 years old and my cibil score is 600")
        .await
        .unwrap();

    assert!(outcome.message.contains("650"));
    assert_eq!(convo.profile.get("Age"), Some(&FieldValue::Number(21.0)));
    assert!(!convo.profile.contains_key("CIBIL_Score"));
}

#[tokio::test]
async fn education_derived_performance_grades() {
    for (score, grade) in [
        ("95", "Excellent"),
        ("80", "Good"),
        ("65", "Average"),
        ("40", "Poor"),
    ] {
        let h = harness(LoanType::Education, 900_000.0, 9.5);
        let (mut convo, _) = h.controller.start("session-5").await;

        let text = format!("I scored {}", score);
        let outcome = h.controller.handle_turn(&mut convo, &text).await.unwrap();

        assert_eq!(
            convo.profile.get("Academic_Performance"),
            Some(&FieldValue::Text(grade.to_string())),
            "score {} should grade as {}",
            score,
            grade
        );
        // Derived fields never show up as missing.
        assert!(!outcome
            .missing_fields
            .contains(&"Academic_Performance".to_string()));
    }
}

#[tokio::test]
async fn idempotent_repeated_answer() {
    let h = harness(LoanType::Personal, 800_000.0, 11.5);
    let (mut convo, _) = h.controller.start("session-6").await;

    let first = h
        .controller
        .handle_turn(&mut convo, "my cibil score is 720")
        .await
        .unwrap();
    let second = h
        .controller
        .handle_turn(&mut convo, "my cibil score is 720")
        .await
        .unwrap();

    assert_eq!(convo.profile.get("CIBIL_Score"), Some(&FieldValue::Number(720.0)));
    assert_eq!(first.message, second.message);
    assert_eq!(first.missing_fields, second.missing_fields);
}

#[tokio::test]
async fn decision_failure_leaves_profile_intact() {
    // No scorer registered: decisioning must fail cleanly and the profile
    // must stay complete so the user can retry.
    let registry = ProductRegistry::builtin();
    let product = registry.get(LoanType::Personal).unwrap();
    let store = Arc::new(MemoryApplicationStore::new());
    let controller = TurnController::new(
        product,
        None,
        Arc::new(ScorerRegistry::new()),
        store.clone(),
    );

    let mut convo = Conversation::new("session-7", LoanType::Personal);
    for (name, value) in [
        ("Customer_Name", FieldValue::Text("Riya Sharma".into())),
        ("Customer_Email", FieldValue::Text("riya@example.com".into())),
        ("Customer_Phone", FieldValue::Text("9876543210".into())),
        ("Age", FieldValue::Number(30.0)),
        ("Employment_Type", FieldValue::Text("Salaried".into())),
        ("Employment_Duration_Years", FieldValue::Number(5.0)),
        ("Annual_Income", FieldValue::Number(600_000.0)),
        ("CIBIL_Score", FieldValue::Number(720.0)),
        ("Existing_EMIs", FieldValue::Number(0.0)),
        ("Loan_Term_Years", FieldValue::Number(3.0)),
    ] {
        convo.profile.insert(name.to_string(), value);
    }

    let result = controller
        .handle_turn(&mut convo, "I need a loan of 2 lakh")
        .await;

    assert!(matches!(result, Err(AgentError::Scoring(_))));
    // The amount was committed before decisioning; nothing was cleared.
    assert_eq!(
        convo.profile.get("Expected_Loan_Amount"),
        Some(&FieldValue::Number(200_000.0))
    );
    assert_eq!(convo.profile.len(), 11);
    assert_eq!(convo.decisions, 0);
    assert!(store.is_empty());
}

#[tokio::test]
async fn home_loan_cross_field_rejection() {
    let h = harness(LoanType::Home, 5_000_000.0, 8.5);
    let (mut convo, _) = h.controller.start("session-8").await;

    convo
        .profile
        .insert("Property_value".to_string(), FieldValue::Number(5_000_000.0));

    let outcome = h
        .controller
        .handle_turn(&mut convo, "I need a loan of 60 lakh")
        .await
        .unwrap();

    assert!(outcome.message.contains("property value"));
    assert!(outcome.decision.is_none());
    assert_eq!(h.scorer_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn gold_loan_end_to_end() {
    let h = harness(LoanType::Gold, 900_000.0, 10.0);
    let (mut convo, _) = h.controller.start("session-9").await;

    let answers = [
        "Arjun Mehta",
        "arjun@example.com",
        "9812345670",
        "45",
        "4 lakh",
        "680",
        "Retired",
        "3 lakh",
        "2 lakh",
    ];
    for answer in answers {
        let outcome = h.controller.handle_turn(&mut convo, answer).await.unwrap();
        assert!(outcome.decision.is_none(), "decided early on {:?}", answer);
    }

    // Final field: tenure.
    let outcome = h.controller.handle_turn(&mut convo, "2").await.unwrap();
    let decision = outcome.decision.expect("gold flow must decide");

    // Predicted 9L is capped at 80% of the 3L gold value, then compared to
    // the 2L request: 2.4L >= 2L means full approval at the requested sum.
    assert_eq!(decision.verdict.status, ApprovalStatus::Approved);
    assert_eq!(decision.verdict.approved_amount, 200_000);
    assert!(convo.profile.is_empty());
}
