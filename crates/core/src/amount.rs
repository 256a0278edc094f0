//! Indian-format amount parsing
//!
//! Users express monetary amounts as "5 lakh", "1.5 crore", "50 thousand",
//! "₹5,00,000" or plain digits. Everything normalizes to rupees.

use once_cell::sync::Lazy;
use regex::Regex;

/// Multiplier attached to an amount unit
#[derive(Debug, Clone, Copy)]
enum AmountMultiplier {
    Unit,
    Thousand,
    Lakh,
    Crore,
}

impl AmountMultiplier {
    fn value(&self) -> f64 {
        match self {
            AmountMultiplier::Unit => 1.0,
            AmountMultiplier::Thousand => 1_000.0,
            AmountMultiplier::Lakh => 100_000.0,
            AmountMultiplier::Crore => 10_000_000.0,
        }
    }
}

// Unit patterns checked most-specific first. Crore before lakh before
// thousand, currency-prefixed before bare digits.
static AMOUNT_PATTERNS: Lazy<Vec<(Regex, AmountMultiplier)>> = Lazy::new(|| {
    vec![
        (
            Regex::new(r"(?i)(\d+(?:[.,]\d+)*)\s*(?:crores?|cr)\b").unwrap(),
            AmountMultiplier::Crore,
        ),
        (
            Regex::new(r"(?i)(\d+(?:[.,]\d+)*)\s*(?:lakhs?|lacs?|l)\b").unwrap(),
            AmountMultiplier::Lakh,
        ),
        (
            Regex::new(r"(?i)(\d+(?:[.,]\d+)*)\s*(?:thousand|k)\b").unwrap(),
            AmountMultiplier::Thousand,
        ),
        (
            Regex::new(r"(?i)(?:₹|rs\.?|rupees?|inr)\s*(\d+(?:[.,]\d+)*)").unwrap(),
            AmountMultiplier::Unit,
        ),
        (
            Regex::new(r"(\d+(?:,\d+)*(?:\.\d+)?)").unwrap(),
            AmountMultiplier::Unit,
        ),
    ]
});

/// Parse an amount expressed in Indian conventions into rupees.
///
/// Returns `None` when no number is present. Commas are grouping separators
/// and stripped before parsing, so "5,00,000" is 500000 and "1.5 crore" is
/// 15000000.
pub fn parse_amount(text: &str) -> Option<f64> {
    for (pattern, multiplier) in AMOUNT_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(text) {
            if let Some(num) = caps.get(1) {
                let cleaned = num.as_str().replace(',', "");
                if let Ok(value) = cleaned.parse::<f64>() {
                    return Some(value * multiplier.value());
                }
            }
        }
    }
    None
}

/// Format rupees with Indian digit grouping: 1234567 -> "₹12,34,567".
pub fn format_inr(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let negative = rounded < 0;
    let digits = rounded.abs().to_string();

    let mut grouped = String::new();
    let n = digits.len();
    for (i, c) in digits.chars().enumerate() {
        grouped.push(c);
        let remaining = n - i - 1;
        // Last group of three, then groups of two.
        if remaining > 0 && (remaining == 3 || (remaining > 3 && (remaining - 3) % 2 == 0)) {
            grouped.push(',');
        }
    }

    if negative {
        format!("-₹{}", grouped)
    } else {
        format!("₹{}", grouped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inr_formatting() {
        assert_eq!(format_inr(500.0), "₹500");
        assert_eq!(format_inr(5_000.0), "₹5,000");
        assert_eq!(format_inr(50_000.0), "₹50,000");
        assert_eq!(format_inr(500_000.0), "₹5,00,000");
        assert_eq!(format_inr(1_234_567.0), "₹12,34,567");
        assert_eq!(format_inr(30_000_000.0), "₹3,00,00,000");
    }

    #[test]
    fn test_lakh_amounts() {
        assert_eq!(parse_amount("5 lakh"), Some(500_000.0));
        assert_eq!(parse_amount("I need 3.5 lakhs"), Some(350_000.0));
        assert_eq!(parse_amount("2 lac"), Some(200_000.0));
        assert_eq!(parse_amount("6L"), Some(600_000.0));
    }

    #[test]
    fn test_crore_amounts() {
        assert_eq!(parse_amount("1.5 crore"), Some(15_000_000.0));
        assert_eq!(parse_amount("loan of 1 crore"), Some(10_000_000.0));
        assert_eq!(parse_amount("2 cr"), Some(20_000_000.0));
    }

    #[test]
    fn test_comma_separated() {
        assert_eq!(parse_amount("5,00,000"), Some(500_000.0));
        assert_eq!(parse_amount("₹12,00,000"), Some(1_200_000.0));
        assert_eq!(parse_amount("Rs. 80,000"), Some(80_000.0));
    }

    #[test]
    fn test_thousand_and_plain() {
        assert_eq!(parse_amount("50 thousand"), Some(50_000.0));
        assert_eq!(parse_amount("750000"), Some(750_000.0));
    }

    #[test]
    fn test_no_number() {
        assert_eq!(parse_amount("as much as possible"), None);
    }
}
