//! In-memory application store
//!
//! Used by tests and single-process deployments that don't need durable
//! application records.

use async_trait::async_trait;
use parking_lot::RwLock;

use loan_agent_core::LoanType;

use crate::application::{ApplicationRecord, ApplicationStats};
use crate::{ApplicationStore, StorageError};

/// Application store backed by a process-local vector
#[derive(Default)]
pub struct MemoryApplicationStore {
    records: RwLock<Vec<ApplicationRecord>>,
}

impl MemoryApplicationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records across all products.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl ApplicationStore for MemoryApplicationStore {
    async fn save_application(&self, record: &ApplicationRecord) -> Result<String, StorageError> {
        let mut records = self.records.write();
        records.push(record.clone());
        Ok(format!("memory:{}", records.len()))
    }

    async fn get_by_session(
        &self,
        loan_type: LoanType,
        session_id: &str,
    ) -> Result<Option<ApplicationRecord>, StorageError> {
        Ok(self
            .records
            .read()
            .iter()
            .rev()
            .find(|r| r.loan_type == loan_type && r.session_id == session_id)
            .cloned())
    }

    async fn recent(
        &self,
        loan_type: LoanType,
        limit: usize,
    ) -> Result<Vec<ApplicationRecord>, StorageError> {
        Ok(self
            .records
            .read()
            .iter()
            .rev()
            .filter(|r| r.loan_type == loan_type)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn stats(&self, loan_type: LoanType) -> Result<ApplicationStats, StorageError> {
        let records: Vec<ApplicationRecord> = self
            .records
            .read()
            .iter()
            .filter(|r| r.loan_type == loan_type)
            .cloned()
            .collect();
        Ok(ApplicationStats::from_records(&records))
    }

    async fn export_csv(&self, loan_type: LoanType) -> Result<String, StorageError> {
        let mut csv = String::from(ApplicationRecord::csv_header());
        csv.push('\n');
        for record in self
            .records
            .read()
            .iter()
            .filter(|r| r.loan_type == loan_type)
        {
            csv.push_str(&record.csv_row());
            csv.push('\n');
        }
        Ok(csv)
    }
}
