//! Per-session conversation state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use loan_agent_core::{LoanType, Profile, Turn, TurnRole};

/// One ongoing conversation: the append-only transcript plus the profile
/// being assembled for the current application attempt.
///
/// The profile is reset to empty once a decision is reached; the transcript
/// is retained so a second application can continue in the same session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub session_id: String,
    pub loan_type: LoanType,
    turns: Vec<Turn>,
    pub profile: Profile,
    pub created_at: DateTime<Utc>,
    /// Number of decisions reached in this session
    pub decisions: u32,
}

impl Conversation {
    pub fn new(session_id: impl Into<String>, loan_type: LoanType) -> Self {
        Self {
            session_id: session_id.into(),
            loan_type,
            turns: Vec::new(),
            profile: Profile::new(),
            created_at: Utc::now(),
            decisions: 0,
        }
    }

    pub fn push_system(&mut self, content: impl Into<String>) {
        self.turns.push(Turn::system(content));
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.turns.push(Turn::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.turns.push(Turn::assistant(content));
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn turn_count(&self) -> usize {
        self.turns.len()
    }

    /// Content of the most recent assistant turn.
    pub fn last_assistant(&self) -> Option<&str> {
        self.turns
            .iter()
            .rev()
            .find(|t| t.role == TurnRole::Assistant)
            .map(|t| t.content.as_str())
    }

    /// The trailing `n` turns, used as language-model context.
    pub fn recent(&self, n: usize) -> &[Turn] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }
}
