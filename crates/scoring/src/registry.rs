//! Per-product scorer registry

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use loan_agent_core::LoanType;

use crate::linear::LinearScorer;
use crate::{Scorer, ScoringError};

/// Maps loan types to their loaded scoring models.
///
/// Artifacts are loaded once at construction. A product whose artifact is
/// missing or unreadable simply has no scorer; its decisions fail with
/// `ScoringError::ModelNotFound` instead of producing a default output.
#[derive(Default)]
pub struct ScorerRegistry {
    scorers: HashMap<LoanType, Arc<dyn Scorer>>,
}

impl ScorerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `<loan_type>_scorer.json` for every product from a directory.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Self {
        let mut registry = Self::new();
        for loan_type in LoanType::all() {
            let path = dir.as_ref().join(format!("{}_scorer.json", loan_type));
            if !path.exists() {
                tracing::warn!(product = %loan_type, path = %path.display(), "Scoring artifact not found, product will not decide");
                continue;
            }
            match LinearScorer::load(&path) {
                Ok(scorer) => {
                    tracing::info!(product = %loan_type, path = %path.display(), "Loaded scoring model");
                    registry.insert(*loan_type, Arc::new(scorer));
                }
                Err(e) => {
                    tracing::error!(product = %loan_type, error = %e, "Failed to load scoring model");
                }
            }
        }
        registry
    }

    /// Register a scorer for a product.
    pub fn insert(&mut self, loan_type: LoanType, scorer: Arc<dyn Scorer>) {
        self.scorers.insert(loan_type, scorer);
    }

    /// Get the scorer for a product, failing cleanly when none is loaded.
    pub fn get(&self, loan_type: LoanType) -> Result<Arc<dyn Scorer>, ScoringError> {
        self.scorers
            .get(&loan_type)
            .cloned()
            .ok_or_else(|| ScoringError::ModelNotFound(loan_type.to_string()))
    }

    /// True when a scorer is loaded for the product.
    pub fn has(&self, loan_type: LoanType) -> bool {
        self.scorers.contains_key(&loan_type)
    }
}
