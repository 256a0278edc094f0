//! Hybrid field extraction
//!
//! Primary path: ask the language model for a JSON object of clearly-stated
//! fields. Any failure — no backend configured, timeout, malformed output —
//! falls through silently to the deterministic rule extractor. A turn never
//! fails because extraction failed.

use std::sync::Arc;

use loan_agent_config::{FieldKind, ProductDefinition};
use loan_agent_core::{parse_amount, FieldValue};
use loan_agent_extraction::RuleExtractor;
use loan_agent_llm::{first_json_object, LlmBackend, LlmError, Message};

use crate::conversation::Conversation;
use crate::prompts;

/// Extractor combining the LLM primary path with the rule fallback
pub struct TurnExtractor {
    product: Arc<ProductDefinition>,
    rules: RuleExtractor,
    llm: Option<Arc<dyn LlmBackend>>,
}

impl TurnExtractor {
    pub fn new(product: Arc<ProductDefinition>, llm: Option<Arc<dyn LlmBackend>>) -> Self {
        let rules = RuleExtractor::new(&product);
        Self { product, rules, llm }
    }

    /// Extract candidate fields from the user's message.
    pub async fn extract(
        &self,
        user_text: &str,
        conversation: &Conversation,
    ) -> Vec<(String, FieldValue)> {
        if let Some(llm) = &self.llm {
            match self.llm_extract(llm.as_ref(), user_text, conversation).await {
                Ok(found) if !found.is_empty() => {
                    tracing::debug!(fields = found.len(), "LLM extraction succeeded");
                    return found;
                }
                Ok(_) => {
                    tracing::debug!("LLM extraction found nothing, using rule fallback");
                }
                Err(e) => {
                    tracing::debug!(error = %e, "LLM extraction failed, using rule fallback");
                }
            }
        }

        self.rules.extract(user_text, conversation.last_assistant())
    }

    async fn llm_extract(
        &self,
        llm: &dyn LlmBackend,
        user_text: &str,
        conversation: &Conversation,
    ) -> Result<Vec<(String, FieldValue)>, LlmError> {
        let prompt = prompts::extraction_prompt(&self.product, user_text, conversation.recent(3));
        let result = llm.generate(&[Message::user(prompt)], 0.0, 500).await?;

        let json = first_json_object(&result.text)
            .ok_or_else(|| LlmError::InvalidResponse("no JSON object in completion".to_string()))?;
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        // Keep only known fields, in required-field order, converted to the
        // field's value shape.
        let mut found = Vec::new();
        for field in &self.product.fields {
            if let Some(value) = map.get(&field.name) {
                if let Some(converted) = convert_json_value(field.kind, value) {
                    found.push((field.name.clone(), converted));
                }
            }
        }
        Ok(found)
    }
}

/// Convert a JSON value from the model into a typed field value.
fn convert_json_value(kind: FieldKind, value: &serde_json::Value) -> Option<FieldValue> {
    match kind {
        FieldKind::Number | FieldKind::Amount => match value {
            serde_json::Value::Number(n) => n.as_f64().map(FieldValue::Number),
            serde_json::Value::String(s) => parse_amount(s).map(FieldValue::Number),
            _ => None,
        },
        _ => match value {
            serde_json::Value::String(s) if !s.trim().is_empty() => {
                Some(FieldValue::Text(s.trim().to_string()))
            }
            serde_json::Value::Number(n) => Some(FieldValue::Text(n.to_string())),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use loan_agent_config::ProductRegistry;
    use loan_agent_core::LoanType;
    use loan_agent_llm::{FinishReason, GenerationResult};

    /// Backend returning a canned completion, or an error.
    struct CannedBackend {
        response: Result<String, ()>,
    }

    #[async_trait]
    impl LlmBackend for CannedBackend {
        async fn generate(
            &self,
            _messages: &[Message],
            _temperature: f32,
            _max_tokens: usize,
        ) -> Result<GenerationResult, LlmError> {
            match &self.response {
                Ok(text) => Ok(GenerationResult {
                    text: text.clone(),
                    tokens: 10,
                    total_time_ms: 5,
                    finish_reason: FinishReason::Stop,
                }),
                Err(()) => Err(LlmError::Timeout),
            }
        }

        fn model_name(&self) -> &str {
            "canned"
        }
    }

    fn product() -> Arc<ProductDefinition> {
        ProductRegistry::builtin().get(LoanType::Personal).unwrap()
    }

    #[tokio::test]
    async fn test_llm_json_is_used() {
        let backend = Arc::new(CannedBackend {
            response: Ok(r#"Extracted: {"Customer_Name": "Riya Sharma", "Age": 30, "Annual_Income": "6 lakh"}"#.to_string()),
        });
        let extractor = TurnExtractor::new(product(), Some(backend));
        let convo = Conversation::new("s1", LoanType::Personal);

        let found = extractor.extract("irrelevant", &convo).await;
        assert!(found.contains(&("Customer_Name".to_string(), FieldValue::Text("Riya Sharma".to_string()))));
        assert!(found.contains(&("Age".to_string(), FieldValue::Number(30.0))));
        assert!(found.contains(&("Annual_Income".to_string(), FieldValue::Number(600_000.0))));
    }

    #[tokio::test]
    async fn test_unknown_fields_dropped() {
        let backend = Arc::new(CannedBackend {
            response: Ok(r#"{"Favorite_Color": "blue", "Age": 30}"#.to_string()),
        });
        let extractor = TurnExtractor::new(product(), Some(backend));
        let convo = Conversation::new("s1", LoanType::Personal);

        let found = extractor.extract("irrelevant", &convo).await;
        assert_eq!(found, vec![("Age".to_string(), FieldValue::Number(30.0))]);
    }

    #[tokio::test]
    async fn test_llm_failure_degrades_to_rules() {
        let backend = Arc::new(CannedBackend { response: Err(()) });
        let extractor = TurnExtractor::new(product(), Some(backend));
        let convo = Conversation::new("s1", LoanType::Personal);

        let found = extractor.extract("my cibil score is 720", &convo).await;
        assert!(found.contains(&("CIBIL_Score".to_string(), FieldValue::Number(720.0))));
    }

    #[tokio::test]
    async fn test_malformed_json_degrades_to_rules() {
        let backend = Arc::new(CannedBackend {
            response: Ok("I could not find any fields, sorry!".to_string()),
        });
        let extractor = TurnExtractor::new(product(), Some(backend));
        let convo = Conversation::new("s1", LoanType::Personal);

        let found = extractor.extract("I am 30 years old", &convo).await;
        assert!(found.contains(&("Age".to_string(), FieldValue::Number(30.0))));
    }

    #[tokio::test]
    async fn test_no_backend_uses_rules() {
        let extractor = TurnExtractor::new(product(), None);
        let convo = Conversation::new("s1", LoanType::Personal);

        let found = extractor.extract("my name is Riya Sharma", &convo).await;
        assert!(found.contains(&("Customer_Name".to_string(), FieldValue::Text("Riya Sharma".to_string()))));
    }
}
