//! Core types for the loan agent
//!
//! This crate provides foundational types used across all other crates:
//! - Conversation turns (the append-only per-session transcript)
//! - Typed profile field values
//! - Indian-format amount parsing (lakh/crore)
//! - Loan product identifiers
//! - Decision verdicts

pub mod amount;
pub mod conversation;
pub mod field;
pub mod loan_type;
pub mod verdict;

pub use amount::{format_inr, parse_amount};
pub use conversation::{Turn, TurnRole};
pub use field::{FieldValue, Profile};
pub use loan_type::LoanType;
pub use verdict::{ApprovalStatus, Verdict};
