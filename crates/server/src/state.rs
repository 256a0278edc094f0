//! Application state
//!
//! Shared state across all handlers: settings, the product registry, one
//! turn controller per product and the session manager.

use std::collections::HashMap;
use std::sync::Arc;

use loan_agent_agent::TurnController;
use loan_agent_config::{ProductRegistry, Settings};
use loan_agent_core::LoanType;
use loan_agent_llm::LlmBackend;
use loan_agent_persistence::ApplicationStore;
use loan_agent_scoring::ScorerRegistry;
use metrics_exporter_prometheus::PrometheusHandle;

use crate::session::SessionManager;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub registry: Arc<ProductRegistry>,
    controllers: Arc<HashMap<LoanType, Arc<TurnController>>>,
    pub sessions: Arc<SessionManager>,
    pub store: Arc<dyn ApplicationStore>,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(
        settings: Settings,
        registry: ProductRegistry,
        llm: Option<Arc<dyn LlmBackend>>,
        scorers: Arc<ScorerRegistry>,
        store: Arc<dyn ApplicationStore>,
        metrics: Option<PrometheusHandle>,
    ) -> Self {
        let registry = Arc::new(registry);

        let mut controllers = HashMap::new();
        for loan_type in registry.available() {
            if let Some(product) = registry.get(loan_type) {
                controllers.insert(
                    loan_type,
                    Arc::new(TurnController::new(
                        product,
                        llm.clone(),
                        scorers.clone(),
                        store.clone(),
                    )),
                );
            }
        }

        let sessions = Arc::new(SessionManager::with_config(
            settings.server.max_sessions,
            settings.server.session_timeout(),
            settings.server.cleanup_interval(),
        ));

        Self {
            settings: Arc::new(settings),
            registry,
            controllers: Arc::new(controllers),
            sessions,
            store,
            metrics,
        }
    }

    /// Controller for a loan product.
    pub fn controller(&self, loan_type: LoanType) -> Option<Arc<TurnController>> {
        self.controllers.get(&loan_type).cloned()
    }
}
