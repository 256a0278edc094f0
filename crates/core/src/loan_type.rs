//! Loan product identifiers

use serde::{Deserialize, Serialize};

/// The fixed set of loan products
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanType {
    Education,
    Home,
    Personal,
    Business,
    Gold,
    Car,
}

impl LoanType {
    /// All products, in catalog order.
    pub fn all() -> &'static [LoanType] {
        &[
            LoanType::Education,
            LoanType::Home,
            LoanType::Personal,
            LoanType::Business,
            LoanType::Gold,
            LoanType::Car,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LoanType::Education => "education",
            LoanType::Home => "home",
            LoanType::Personal => "personal",
            LoanType::Business => "business",
            LoanType::Gold => "gold",
            LoanType::Car => "car",
        }
    }

    /// Parse a loan type from its lowercase identifier.
    pub fn from_str(s: &str) -> Option<LoanType> {
        match s.trim().to_lowercase().as_str() {
            "education" => Some(LoanType::Education),
            "home" => Some(LoanType::Home),
            "personal" => Some(LoanType::Personal),
            "business" => Some(LoanType::Business),
            "gold" => Some(LoanType::Gold),
            "car" => Some(LoanType::Car),
            _ => None,
        }
    }

    /// Title-cased name for user-facing messages.
    pub fn title(&self) -> &'static str {
        match self {
            LoanType::Education => "Education",
            LoanType::Home => "Home",
            LoanType::Personal => "Personal",
            LoanType::Business => "Business",
            LoanType::Gold => "Gold",
            LoanType::Car => "Car",
        }
    }
}

impl std::fmt::Display for LoanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        for lt in LoanType::all() {
            assert_eq!(LoanType::from_str(lt.as_str()), Some(*lt));
        }
    }

    #[test]
    fn test_unknown_type() {
        assert_eq!(LoanType::from_str("crypto"), None);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(LoanType::from_str("  Gold "), Some(LoanType::Gold));
    }
}
