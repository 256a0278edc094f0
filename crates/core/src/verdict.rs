//! Decision verdicts

use serde::{Deserialize, Serialize};

/// Approval status relative to the requested amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    /// Predicted eligible amount covers the request
    Approved,
    /// Predicted eligible amount falls short of the request
    PartialApproval,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Approved => "APPROVED",
            ApprovalStatus::PartialApproval => "PARTIAL_APPROVAL",
        }
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The outcome of decisioning a completed profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    /// Amount offered to the applicant, in rupees.
    ///
    /// On full approval this equals the requested amount — the larger
    /// eligible ceiling is never revealed.
    pub approved_amount: u64,
    /// Annual interest rate, percent
    pub interest_rate: f64,
    /// Amount the applicant asked for, in rupees
    pub requested_amount: u64,
    /// Approval status
    pub status: ApprovalStatus,
}

impl Verdict {
    /// Apply the approval policy: compare the predicted eligible amount to
    /// the requested amount.
    pub fn from_prediction(predicted: f64, requested: f64, interest_rate: f64) -> Self {
        if predicted >= requested {
            Verdict {
                approved_amount: requested.round() as u64,
                interest_rate,
                requested_amount: requested.round() as u64,
                status: ApprovalStatus::Approved,
            }
        } else {
            Verdict {
                approved_amount: predicted.round() as u64,
                interest_rate,
                requested_amount: requested.round() as u64,
                status: ApprovalStatus::PartialApproval,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_approval_hides_ceiling() {
        let v = Verdict::from_prediction(800_000.0, 500_000.0, 10.5);
        assert_eq!(v.status, ApprovalStatus::Approved);
        assert_eq!(v.approved_amount, 500_000);
        assert_eq!(v.requested_amount, 500_000);
    }

    #[test]
    fn test_partial_approval() {
        let v = Verdict::from_prediction(300_000.0, 500_000.0, 12.0);
        assert_eq!(v.status, ApprovalStatus::PartialApproval);
        assert_eq!(v.approved_amount, 300_000);
        assert_eq!(v.requested_amount, 500_000);
    }

    #[test]
    fn test_exact_match_is_full_approval() {
        let v = Verdict::from_prediction(500_000.0, 500_000.0, 9.0);
        assert_eq!(v.status, ApprovalStatus::Approved);
    }
}
