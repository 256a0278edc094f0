//! Conversation controller for loan applications
//!
//! The per-turn state machine: restore any prior partial profile, run field
//! extraction over the user's message, validate and store extracted fields
//! in required order, and either ask for the next missing field or hand the
//! completed profile to the decision engine.
//!
//! Validation rejections and ineligibility are handled entirely inside the
//! controller and never escape as errors; only a failing scoring
//! collaborator propagates out of a turn.

pub mod controller;
pub mod conversation;
pub mod decision;
pub mod extract;
pub mod prompts;
pub mod validator;

pub use controller::{DecisionSummary, TurnController, TurnOutcome};
pub use conversation::Conversation;
pub use decision::DecisionEngine;
pub use extract::TurnExtractor;
pub use validator::{FieldCheck, Rejection};

use thiserror::Error;

/// Agent errors
///
/// Only decisioning failures surface to the turn boundary; extraction and
/// follow-up generation degrade internally.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Scoring error: {0}")]
    Scoring(#[from] loan_agent_scoring::ScoringError),

    #[error("Internal error: {0}")]
    Internal(String),
}
