//! Application storage
//!
//! The storage collaborator for completed applications. Both operations
//! are best-effort from the engine's perspective: a failed save is logged
//! and never blocks the user-facing response, and a failed lookup just
//! means no rehydration.

pub mod application;
pub mod file;
pub mod memory;

pub use application::{ApplicationRecord, ApplicationStats, CustomerInfo};
pub use file::FileApplicationStore;
pub use memory::MemoryApplicationStore;

use async_trait::async_trait;
use thiserror::Error;

use loan_agent_core::LoanType;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Store for completed loan applications
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// Persist a completed application. Returns a receipt identifying the
    /// stored record (a path for file stores).
    async fn save_application(&self, record: &ApplicationRecord) -> Result<String, StorageError>;

    /// Most recent application saved for a session, if any.
    async fn get_by_session(
        &self,
        loan_type: LoanType,
        session_id: &str,
    ) -> Result<Option<ApplicationRecord>, StorageError>;

    /// Most recent applications for a product, newest first.
    async fn recent(
        &self,
        loan_type: LoanType,
        limit: usize,
    ) -> Result<Vec<ApplicationRecord>, StorageError>;

    /// Aggregate statistics for a product.
    async fn stats(&self, loan_type: LoanType) -> Result<ApplicationStats, StorageError>;

    /// Render the CSV report for a product.
    async fn export_csv(&self, loan_type: LoanType) -> Result<String, StorageError>;
}
