//! JSON-file application store
//!
//! Layout under the data root:
//!
//! ```text
//! <root>/<loan_type>/applications/<session_id>_<millis>.json
//! <root>/<loan_type>/reports/<loan_type>_applications.csv
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use loan_agent_core::LoanType;

use crate::application::{ApplicationRecord, ApplicationStats};
use crate::{ApplicationStore, StorageError};

/// Application store writing one JSON file per saved application
pub struct FileApplicationStore {
    root: PathBuf,
}

impl FileApplicationStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn applications_dir(&self, loan_type: LoanType) -> PathBuf {
        self.root.join(loan_type.as_str()).join("applications")
    }

    fn reports_dir(&self, loan_type: LoanType) -> PathBuf {
        self.root.join(loan_type.as_str()).join("reports")
    }

    /// Load every application for a product, newest first.
    async fn load_all(&self, loan_type: LoanType) -> Result<Vec<ApplicationRecord>, StorageError> {
        let dir = self.applications_dir(loan_type);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.path().extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match read_record(&entry.path()).await {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(path = %entry.path().display(), error = %e, "Skipping unreadable application file");
                }
            }
        }

        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }
}

async fn read_record(path: &Path) -> Result<ApplicationRecord, StorageError> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}

#[async_trait]
impl ApplicationStore for FileApplicationStore {
    async fn save_application(&self, record: &ApplicationRecord) -> Result<String, StorageError> {
        let dir = self.applications_dir(record.loan_type);
        tokio::fs::create_dir_all(&dir).await?;

        let path = dir.join(format!(
            "{}_{}.json",
            record.session_id,
            record.created_at.timestamp_millis()
        ));
        let content = serde_json::to_string_pretty(record)?;
        tokio::fs::write(&path, content).await?;

        tracing::info!(
            loan_type = %record.loan_type,
            session_id = %record.session_id,
            path = %path.display(),
            "Application saved"
        );
        Ok(path.display().to_string())
    }

    async fn get_by_session(
        &self,
        loan_type: LoanType,
        session_id: &str,
    ) -> Result<Option<ApplicationRecord>, StorageError> {
        let records = self.load_all(loan_type).await?;
        Ok(records.into_iter().find(|r| r.session_id == session_id))
    }

    async fn recent(
        &self,
        loan_type: LoanType,
        limit: usize,
    ) -> Result<Vec<ApplicationRecord>, StorageError> {
        let mut records = self.load_all(loan_type).await?;
        records.truncate(limit);
        Ok(records)
    }

    async fn stats(&self, loan_type: LoanType) -> Result<ApplicationStats, StorageError> {
        let records = self.load_all(loan_type).await?;
        Ok(ApplicationStats::from_records(&records))
    }

    async fn export_csv(&self, loan_type: LoanType) -> Result<String, StorageError> {
        let records = self.load_all(loan_type).await?;

        let mut csv = String::from(ApplicationRecord::csv_header());
        csv.push('\n');
        for record in &records {
            csv.push_str(&record.csv_row());
            csv.push('\n');
        }

        // Keep a copy under reports/ so operators can grab it off disk too.
        let dir = self.reports_dir(loan_type);
        tokio::fs::create_dir_all(&dir).await?;
        let path = dir.join(format!("{}_applications.csv", loan_type));
        tokio::fs::write(&path, &csv).await?;
        tracing::debug!(path = %path.display(), records = records.len(), "CSV report written");

        Ok(csv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::CustomerInfo;
    use chrono::Utc;
    use loan_agent_core::{ApprovalStatus, FieldValue, Profile, Verdict};

    fn record(session_id: &str) -> ApplicationRecord {
        let mut loan_data = Profile::new();
        loan_data.insert("Age".to_string(), FieldValue::Number(30.0));
        ApplicationRecord {
            loan_type: LoanType::Personal,
            session_id: session_id.to_string(),
            customer: CustomerInfo {
                name: "Riya Sharma".to_string(),
                email: "riya@example.com".to_string(),
                phone: "9876543210".to_string(),
            },
            loan_data,
            verdict: Verdict {
                approved_amount: 200_000,
                interest_rate: 11.5,
                requested_amount: 200_000,
                status: ApprovalStatus::Approved,
            },
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_save_and_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileApplicationStore::new(dir.path());

        let receipt = store.save_application(&record("s1")).await.unwrap();
        assert!(receipt.contains("personal"));

        let found = store
            .get_by_session(LoanType::Personal, "s1")
            .await
            .unwrap()
            .expect("record should exist");
        assert_eq!(found.customer.name, "Riya Sharma");
        assert_eq!(found.loan_data.get("Age"), Some(&FieldValue::Number(30.0)));

        let missing = store.get_by_session(LoanType::Personal, "s2").await.unwrap();
        assert!(missing.is_none());

        let other_product = store.get_by_session(LoanType::Gold, "s1").await.unwrap();
        assert!(other_product.is_none());
    }

    #[tokio::test]
    async fn test_recent_and_stats() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileApplicationStore::new(dir.path());

        store.save_application(&record("s1")).await.unwrap();
        store.save_application(&record("s2")).await.unwrap();

        let recent = store.recent(LoanType::Personal, 1).await.unwrap();
        assert_eq!(recent.len(), 1);

        let stats = store.stats(LoanType::Personal).await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.approved, 2);
    }

    #[tokio::test]
    async fn test_csv_export() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileApplicationStore::new(dir.path());
        store.save_application(&record("s1")).await.unwrap();

        let csv = store.export_csv(LoanType::Personal).await.unwrap();
        assert!(csv.starts_with(ApplicationRecord::csv_header()));
        assert!(csv.contains("Riya Sharma"));

        let report = dir
            .path()
            .join("personal")
            .join("reports")
            .join("personal_applications.csv");
        assert!(report.exists());
    }
}
