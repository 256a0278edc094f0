//! Scoring collaborator
//!
//! Each product has a pretrained regressor mapping a numeric feature vector
//! to a maximum eligible loan amount and an interest rate. Models are
//! loaded at construction time from JSON artifacts (feature order,
//! standardization parameters, per-target weights). A product without a
//! loaded model fails decisioning cleanly — there is no silent default
//! output.

pub mod feature;
pub mod linear;
pub mod registry;

pub use feature::FeatureVector;
pub use linear::LinearScorer;
pub use registry::ScorerRegistry;

use thiserror::Error;

/// Scoring errors
#[derive(Error, Debug)]
pub enum ScoringError {
    #[error("No scoring model loaded for product {0}")]
    ModelNotFound(String),

    #[error("Failed to load model artifact {path}: {message}")]
    Artifact { path: String, message: String },

    #[error("Feature error: {0}")]
    Feature(String),
}

/// Output of a scoring model
#[derive(Debug, Clone, Copy)]
pub struct Prediction {
    /// Maximum eligible loan amount, rupees
    pub eligible_amount: f64,
    /// Annual interest rate, percent
    pub interest_rate: f64,
}

/// A pretrained scoring function
pub trait Scorer: Send + Sync {
    /// Score a feature vector.
    fn predict(&self, features: &FeatureVector) -> Result<Prediction, ScoringError>;
}
