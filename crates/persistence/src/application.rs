//! Application record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use loan_agent_core::{ApprovalStatus, LoanType, Profile, Verdict};

/// Customer identity captured during the conversation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// A completed application with its verdict
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub loan_type: LoanType,
    pub session_id: String,
    pub customer: CustomerInfo,
    /// Collected loan fields, identity fields stripped
    pub loan_data: Profile,
    pub verdict: Verdict,
    pub created_at: DateTime<Utc>,
}

impl ApplicationRecord {
    /// CSV header shared by every product report.
    pub fn csv_header() -> &'static str {
        "session_id,created_at,name,email,phone,status,approved_amount,interest_rate,requested_amount"
    }

    /// One CSV row for this record.
    pub fn csv_row(&self) -> String {
        [
            csv_escape(&self.session_id),
            csv_escape(&self.created_at.to_rfc3339()),
            csv_escape(&self.customer.name),
            csv_escape(&self.customer.email),
            csv_escape(&self.customer.phone),
            csv_escape(self.verdict.status.as_str()),
            self.verdict.approved_amount.to_string(),
            format!("{:.2}", self.verdict.interest_rate),
            self.verdict.requested_amount.to_string(),
        ]
        .join(",")
    }
}

/// Aggregate statistics for one product
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplicationStats {
    pub total: usize,
    pub approved: usize,
    pub partial: usize,
    pub average_approved_amount: f64,
}

impl ApplicationStats {
    /// Compute statistics over a set of records.
    pub fn from_records(records: &[ApplicationRecord]) -> Self {
        let total = records.len();
        let approved = records
            .iter()
            .filter(|r| r.verdict.status == ApprovalStatus::Approved)
            .count();
        let partial = total - approved;
        let average_approved_amount = if total > 0 {
            records
                .iter()
                .map(|r| r.verdict.approved_amount as f64)
                .sum::<f64>()
                / total as f64
        } else {
            0.0
        };
        Self {
            total,
            approved,
            partial,
            average_approved_amount,
        }
    }
}

fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(status: ApprovalStatus, amount: u64) -> ApplicationRecord {
        ApplicationRecord {
            loan_type: LoanType::Personal,
            session_id: "s1".to_string(),
            customer: CustomerInfo {
                name: "Riya, Sharma".to_string(),
                email: "riya@example.com".to_string(),
                phone: "9876543210".to_string(),
            },
            loan_data: Profile::new(),
            verdict: Verdict {
                approved_amount: amount,
                interest_rate: 11.5,
                requested_amount: 200_000,
                status,
            },
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_csv_row_escapes_commas() {
        let row = record(ApprovalStatus::Approved, 200_000).csv_row();
        assert!(row.contains("\"Riya, Sharma\""));
        assert!(row.contains("APPROVED"));
    }

    #[test]
    fn test_stats() {
        let records = vec![
            record(ApprovalStatus::Approved, 200_000),
            record(ApprovalStatus::PartialApproval, 100_000),
        ];
        let stats = ApplicationStats::from_records(&records);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.approved, 1);
        assert_eq!(stats.partial, 1);
        assert!((stats.average_approved_amount - 150_000.0).abs() < 1e-6);
    }
}
