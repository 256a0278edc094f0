//! Per-turn conversation controller
//!
//! States are recomputed every turn rather than stored: a conversation is
//! COLLECTING while any required field is missing and ready for decisioning
//! otherwise. The per-turn algorithm:
//!
//! 1. Best-effort rehydration from a previously saved application.
//! 2. Append the user's message.
//! 3. Extract candidate fields (LLM primary, rule fallback).
//! 4. Validate and store in required-field order; the first rejection stops
//!    the turn, fields accepted before it stay committed.
//! 5. Cross-field rules once per-field checks pass.
//! 6. Decide when nothing is missing, otherwise ask for exactly the next
//!    missing field.

use std::sync::Arc;

use serde::Serialize;

use loan_agent_config::ProductDefinition;
use loan_agent_core::{format_inr, FieldValue, LoanType, Profile, Turn, TurnRole, Verdict};
use loan_agent_llm::{LlmBackend, Message, Role};
use loan_agent_persistence::ApplicationStore;
use loan_agent_scoring::ScorerRegistry;

use crate::conversation::Conversation;
use crate::decision::DecisionEngine;
use crate::extract::TurnExtractor;
use crate::prompts;
use crate::validator::{self, FieldCheck, Rejection};
use crate::AgentError;

/// Result of one conversation turn
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    /// Assistant message to show the user
    pub message: String,
    /// Fields recorded this turn (validated, canonicalized)
    pub recorded: Profile,
    /// Required fields still missing after this turn
    pub missing_fields: Vec<String>,
    /// Present when this turn reached a decision
    pub decision: Option<DecisionSummary>,
    /// Field whose validation rejection ended the turn, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_field: Option<String>,
}

/// A decision reached during a turn
#[derive(Debug, Clone, Serialize)]
pub struct DecisionSummary {
    pub loan_type: LoanType,
    /// Typed profile the decision was made on
    pub profile: Profile,
    pub verdict: Verdict,
}

/// Controller for one loan product
pub struct TurnController {
    product: Arc<ProductDefinition>,
    extractor: TurnExtractor,
    llm: Option<Arc<dyn LlmBackend>>,
    decision: DecisionEngine,
    store: Arc<dyn ApplicationStore>,
}

impl TurnController {
    pub fn new(
        product: Arc<ProductDefinition>,
        llm: Option<Arc<dyn LlmBackend>>,
        scorers: Arc<ScorerRegistry>,
        store: Arc<dyn ApplicationStore>,
    ) -> Self {
        let extractor = TurnExtractor::new(product.clone(), llm.clone());
        let decision = DecisionEngine::new(scorers, store.clone());
        Self {
            product,
            extractor,
            llm,
            decision,
            store,
        }
    }

    pub fn product(&self) -> &ProductDefinition {
        &self.product
    }

    /// Start a new conversation: seed the system prompt and greet the user.
    pub async fn start(&self, session_id: &str) -> (Conversation, String) {
        let mut conversation = Conversation::new(session_id, self.product.loan_type);
        conversation.push_system(prompts::system_prompt(&self.product));
        let greeting = self.greeting(&conversation).await;
        conversation.push_assistant(&greeting);
        (conversation, greeting)
    }

    /// Required fields currently missing, treating a derived field as
    /// satisfied whenever its source field is present.
    pub fn missing_fields(&self, profile: &Profile) -> Vec<String> {
        self.product
            .fields
            .iter()
            .filter(|field| {
                if profile.contains_key(&field.name) {
                    return false;
                }
                if let Some(derived) = self.product.derived_field(&field.name) {
                    if profile.contains_key(&derived.source) {
                        return false;
                    }
                }
                true
            })
            .map(|field| field.name.clone())
            .collect()
    }

    /// Process one user message.
    ///
    /// Only a failing scoring collaborator escapes as an error; extraction
    /// and follow-up generation degrade to deterministic paths internally.
    pub async fn handle_turn(
        &self,
        conversation: &mut Conversation,
        user_text: &str,
    ) -> Result<TurnOutcome, AgentError> {
        self.rehydrate(conversation).await;
        conversation.push_user(user_text);

        let extracted = self.extractor.extract(user_text, conversation).await;
        tracing::debug!(
            session_id = %conversation.session_id,
            extracted = extracted.len(),
            "Extraction complete"
        );

        // Validate and store in required-field order; stop at the first
        // rejection so the user corrects one thing at a time.
        let mut recorded = Profile::new();
        let mut rejection: Option<Rejection> = None;

        for field in &self.product.fields {
            let Some((_, value)) = extracted.iter().find(|(name, _)| name == &field.name) else {
                continue;
            };
            if value.is_blank() {
                continue;
            }

            match validator::validate_field(field, value) {
                FieldCheck::Accepted(canonical) => {
                    conversation
                        .profile
                        .insert(field.name.clone(), canonical.clone());
                    recorded.insert(field.name.clone(), canonical.clone());

                    if let Some(derived) = self.product.derived_for_source(&field.name) {
                        if let Some(source_value) = canonical.as_f64() {
                            let grade = derived.grade(source_value).to_string();
                            conversation
                                .profile
                                .insert(derived.name.clone(), FieldValue::Text(grade.clone()));
                            recorded.insert(derived.name.clone(), FieldValue::Text(grade));
                        }
                    }
                }
                FieldCheck::Rejected(r) => {
                    tracing::info!(
                        session_id = %conversation.session_id,
                        field = %r.field,
                        kind = ?r.kind,
                        "Field rejected"
                    );
                    rejection = Some(r);
                    break;
                }
            }
        }

        if rejection.is_none() {
            rejection = validator::validate_cross(&self.product.cross_rules, &conversation.profile);
        }

        if let Some(r) = rejection {
            let missing = self.missing_fields(&conversation.profile);
            conversation.push_assistant(&r.message);
            return Ok(TurnOutcome {
                message: r.message,
                recorded: Profile::new(),
                missing_fields: missing,
                decision: None,
                rejected_field: Some(r.field),
            });
        }

        let missing = self.missing_fields(&conversation.profile);

        if missing.is_empty() {
            // A decision failure propagates and must leave the profile
            // unchanged so the user can retry.
            let decision = self
                .decision
                .decide(&self.product, &conversation.session_id, &conversation.profile)
                .await?;

            conversation.profile.clear();
            conversation.decisions += 1;
            conversation.push_assistant(&decision.message);

            return Ok(TurnOutcome {
                message: decision.message.clone(),
                recorded,
                missing_fields: Vec::new(),
                decision: Some(DecisionSummary {
                    loan_type: self.product.loan_type,
                    profile: decision.profile,
                    verdict: decision.verdict,
                }),
                rejected_field: None,
            });
        }

        let followup = self.followup(conversation, &recorded, &missing).await;
        conversation.push_assistant(&followup);

        Ok(TurnOutcome {
            message: followup,
            recorded,
            missing_fields: missing,
            decision: None,
            rejected_field: None,
        })
    }

    /// Fill the profile from a previously saved application, non-fatally.
    ///
    /// Identity fields are always restored; loan fields only before the
    /// first decision of the session, so a second application in the same
    /// session starts fresh apart from who the customer is.
    async fn rehydrate(&self, conversation: &mut Conversation) {
        let record = match self
            .store
            .get_by_session(self.product.loan_type, &conversation.session_id)
            .await
        {
            Ok(Some(record)) => record,
            Ok(None) => return,
            Err(e) => {
                tracing::debug!(error = %e, "Profile rehydration skipped (storage unavailable)");
                return;
            }
        };

        let identity = [
            ("Customer_Name", record.customer.name.clone()),
            ("Customer_Email", record.customer.email.clone()),
            ("Customer_Phone", record.customer.phone.clone()),
        ];
        for (field, value) in identity {
            if !value.is_empty()
                && self.product.field(field).is_some()
                && !conversation.profile.contains_key(field)
            {
                conversation
                    .profile
                    .insert(field.to_string(), FieldValue::Text(value));
            }
        }

        if conversation.decisions == 0 {
            for (name, value) in &record.loan_data {
                if self.product.field(name).is_some() && !conversation.profile.contains_key(name) {
                    conversation.profile.insert(name.clone(), value.clone());
                }
            }
        }
    }

    async fn greeting(&self, conversation: &Conversation) -> String {
        if let Some(llm) = &self.llm {
            let mut messages = to_messages(conversation.turns());
            messages.push(Message::user(
                "Hello, I'm interested in this loan. Please greet me and ask for the first piece of information you need.",
            ));
            match llm.generate(&messages, 0.2, 200).await {
                Ok(result) if !result.text.trim().is_empty() => {
                    return result.text.trim().to_string();
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(error = %e, "LLM greeting failed, using fallback");
                }
            }
        }
        self.product.greeting.clone()
    }

    /// Follow-up for the next missing field, acknowledging what was just
    /// recorded. Degrades to the deterministic per-field template.
    async fn followup(
        &self,
        conversation: &Conversation,
        recorded: &Profile,
        missing: &[String],
    ) -> String {
        let prefix = self.progress_ack(recorded);
        let question = match self.llm_followup(conversation, missing).await {
            Some(question) => question,
            None => self.fallback_question(missing),
        };
        format!("{}{}", prefix, question)
    }

    fn progress_ack(&self, recorded: &Profile) -> String {
        let mut items = Vec::new();
        for field in &self.product.fields {
            if field.is_identity() {
                continue;
            }
            if let Some(value) = recorded.get(&field.name) {
                let rendered = match value {
                    FieldValue::Number(n) if *n > 1_000.0 => format_inr(*n),
                    other => other.as_text(),
                };
                items.push(format!("{}: {}", field.name.replace('_', " "), rendered));
            }
        }
        if items.is_empty() {
            String::new()
        } else {
            format!("Great! I've recorded: {}. ", items.join(", "))
        }
    }

    async fn llm_followup(&self, conversation: &Conversation, missing: &[String]) -> Option<String> {
        let llm = self.llm.as_ref()?;
        let mut messages = to_messages(conversation.turns());
        messages.push(Message::system(prompts::followup_instruction(
            &self.product,
            &conversation.profile,
            missing,
        )));

        match llm.generate(&messages, 0.1, 180).await {
            Ok(result) if !result.text.trim().is_empty() => Some(result.text.trim().to_string()),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(error = %e, "LLM follow-up failed, using template");
                None
            }
        }
    }

    fn fallback_question(&self, missing: &[String]) -> String {
        match missing.first().and_then(|name| self.product.field(name)) {
            Some(field) if !field.ask.is_empty() => field.ask.clone(),
            Some(field) => format!(
                "I'd like to know your {}. Please provide it in a short, clear format.",
                field.label()
            ),
            None => "Thank you for providing all the information!".to_string(),
        }
    }
}

fn to_messages(turns: &[Turn]) -> Vec<Message> {
    turns
        .iter()
        .map(|turn| Message {
            role: match turn.role {
                TurnRole::System => Role::System,
                TurnRole::User => Role::User,
                TurnRole::Assistant => Role::Assistant,
            },
            content: turn.content.clone(),
        })
        .collect()
}
