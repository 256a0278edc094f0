//! Backend construction from settings

use std::sync::Arc;
use std::time::Duration;

use loan_agent_config::LlmSettings;

use crate::backend::{LlmBackend, LlmConfig, OpenAIBackend};

/// Build the language-model backend from settings.
///
/// Returns `None` when no API key is configured — the collaborator is then
/// absent for the whole process lifetime and every caller uses its
/// deterministic path.
pub fn backend_from_settings(settings: &LlmSettings) -> Option<Arc<dyn LlmBackend>> {
    let api_key = match &settings.api_key {
        Some(key) if !key.is_empty() => key.clone(),
        _ => {
            tracing::info!("No LLM API key configured, running in deterministic-only mode");
            return None;
        }
    };

    let config = LlmConfig {
        model: settings.model.clone(),
        endpoint: settings.endpoint.clone(),
        api_key,
        max_tokens: settings.max_tokens,
        timeout: Duration::from_secs(settings.timeout_secs),
        ..Default::default()
    };

    match OpenAIBackend::new(config) {
        Ok(backend) => {
            tracing::info!(model = %settings.model, "LLM backend configured");
            Some(Arc::new(backend))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to configure LLM backend, running in deterministic-only mode");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_without_key() {
        let settings = LlmSettings {
            api_key: None,
            ..Default::default()
        };
        assert!(backend_from_settings(&settings).is_none());
    }

    #[test]
    fn test_present_with_key() {
        let settings = LlmSettings {
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        };
        assert!(backend_from_settings(&settings).is_some());
    }
}
