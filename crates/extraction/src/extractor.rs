//! Product-aware rule extractor

use regex::Regex;

use loan_agent_config::{FieldDef, FieldKind, ProductDefinition};
use loan_agent_core::{parse_amount, FieldValue};

use crate::patterns::{
    BARE_NUMBER_RE, EMAIL_RE, NAME_EXCLUDE_WORDS, NAME_PATTERNS, NO_INDICATORS, PHONE_RE,
    SMALL_TALK_WORDS, YES_INDICATORS, ZERO_WORDS,
};

/// One product field with its value patterns compiled
struct CompiledField {
    def: FieldDef,
    patterns: Vec<Regex>,
}

/// Rule-based extractor for one product, built once at startup.
pub struct RuleExtractor {
    fields: Vec<CompiledField>,
}

impl RuleExtractor {
    /// Compile the extraction patterns of a product definition.
    ///
    /// An invalid pattern is a configuration bug; it is logged and skipped
    /// rather than taking the product down.
    pub fn new(product: &ProductDefinition) -> Self {
        let fields = product
            .fields
            .iter()
            .map(|def| {
                let patterns = def
                    .patterns
                    .iter()
                    .filter_map(|p| match Regex::new(p) {
                        Ok(re) => Some(re),
                        Err(e) => {
                            tracing::error!(field = %def.name, pattern = %p, error = %e, "Invalid extraction pattern, skipping");
                            None
                        }
                    })
                    .collect();
                CompiledField {
                    def: def.clone(),
                    patterns,
                }
            })
            .collect();
        Self { fields }
    }

    /// Extract candidate field values from a user message.
    ///
    /// `last_question` is the previous assistant turn, used to attribute
    /// bare answers to the field that was just asked for. Multiple fields
    /// may be extracted from one message; per field the first matching
    /// heuristic wins.
    pub fn extract(&self, user_text: &str, last_question: Option<&str>) -> Vec<(String, FieldValue)> {
        let text = user_text.trim();
        let lower = text.to_lowercase();
        let asked = self.asked_field(last_question);

        let mut out = Vec::new();
        for field in &self.fields {
            let is_asked = asked == Some(field.def.name.as_str());
            if let Some(value) = self.extract_field(field, text, &lower, is_asked) {
                tracing::debug!(field = %field.def.name, value = %value, "Extracted field");
                out.push((field.def.name.clone(), value));
            }
        }
        out
    }

    /// Determine which field the previous assistant question asked for.
    ///
    /// The longest matching context keyword across all fields wins, so
    /// "guarantor's income" attributes to the guarantor field even though a
    /// plain "income" field exists too.
    fn asked_field(&self, last_question: Option<&str>) -> Option<&str> {
        let question = last_question?.to_lowercase();
        let mut best: Option<(&str, usize)> = None;
        for field in &self.fields {
            for keyword in &field.def.context_keywords {
                if question.contains(keyword.as_str()) {
                    let len = keyword.len();
                    if best.map(|(_, l)| len > l).unwrap_or(true) {
                        best = Some((field.def.name.as_str(), len));
                    }
                }
            }
        }
        best.map(|(name, _)| name)
    }

    fn extract_field(
        &self,
        field: &CompiledField,
        text: &str,
        lower: &str,
        is_asked: bool,
    ) -> Option<FieldValue> {
        match field.def.kind {
            FieldKind::Name => extract_name(text, is_asked),
            FieldKind::Email => EMAIL_RE
                .find(text)
                .map(|m| FieldValue::Text(m.as_str().to_string())),
            FieldKind::Phone => extract_phone(text, is_asked),
            FieldKind::Number => extract_number(field, lower, is_asked),
            FieldKind::Amount => extract_amount_field(field, lower, is_asked),
            FieldKind::Choice => extract_choice(&field.def, lower),
            FieldKind::YesNo => extract_yes_no(lower, is_asked),
        }
    }
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn extract_name(text: &str, is_asked: bool) -> Option<FieldValue> {
    for pattern in NAME_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(text) {
            if let Some(m) = caps.get(1) {
                let name = m.as_str().trim();
                let name_lower = name.to_lowercase();
                if name.len() >= 2
                    && !NAME_EXCLUDE_WORDS
                        .iter()
                        .any(|w| name_lower.split_whitespace().any(|part| part == *w))
                {
                    return Some(FieldValue::Text(title_case(name)));
                }
            }
        }
    }

    // A bare 1-3 word alphabetic answer counts as a name only when the
    // previous question asked for one.
    if is_asked {
        let words: Vec<&str> = text.split_whitespace().collect();
        if (1..=3).contains(&words.len())
            && words.iter().all(|w| w.chars().all(|c| c.is_ascii_alphabetic()))
            && !words
                .iter()
                .any(|w| SMALL_TALK_WORDS.contains(&w.to_lowercase().as_str()))
        {
            return Some(FieldValue::Text(title_case(text)));
        }
    }

    None
}

fn extract_phone(text: &str, is_asked: bool) -> Option<FieldValue> {
    if let Some(caps) = PHONE_RE.captures(text) {
        if let Some(m) = caps.get(1) {
            return Some(FieldValue::Text(m.as_str().to_string()));
        }
    }

    // Digits scattered with separators ("98765 43210") when asked
    if is_asked {
        let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
        let digits = digits.strip_prefix("91").filter(|d| d.len() == 10).unwrap_or(&digits);
        if digits.len() == 10 && matches!(digits.chars().next(), Some('6'..='9')) {
            return Some(FieldValue::Text(digits.to_string()));
        }
    }

    None
}

fn in_capture_range(def: &FieldDef, value: f64) -> bool {
    match def.capture_range {
        Some((min, max)) => value >= min && value <= max,
        None => true,
    }
}

fn extract_number(field: &CompiledField, lower: &str, is_asked: bool) -> Option<FieldValue> {
    for pattern in &field.patterns {
        if let Some(caps) = pattern.captures(lower) {
            if let Some(m) = caps.get(1) {
                if let Ok(value) = m.as_str().parse::<f64>() {
                    if in_capture_range(&field.def, value) {
                        return Some(FieldValue::Number(value));
                    }
                }
            }
        }
    }

    if is_asked {
        if let Some(caps) = BARE_NUMBER_RE.captures(lower) {
            if let Some(m) = caps.get(1) {
                if let Ok(value) = m.as_str().parse::<f64>() {
                    if in_capture_range(&field.def, value) {
                        return Some(FieldValue::Number(value));
                    }
                }
            }
        }
    }

    None
}

/// Amounts that are really phone numbers (10 digits, 6-9 leading) or
/// absurdly large (> 100 crore) are skipped.
fn plausible_amount(value: f64, matched: &str) -> bool {
    let digits: String = matched.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 10 && matches!(digits.chars().next(), Some('6'..='9')) {
        return false;
    }
    value <= 1_000_000_000.0
}

fn extract_amount_field(field: &CompiledField, lower: &str, is_asked: bool) -> Option<FieldValue> {
    for pattern in &field.patterns {
        if let Some(caps) = pattern.captures(lower) {
            if let Some(m) = caps.get(1) {
                if let Some(value) = parse_amount(m.as_str()) {
                    if plausible_amount(value, m.as_str()) && in_capture_range(&field.def, value) {
                        return Some(FieldValue::Number(value));
                    }
                }
            }
        }
    }

    if is_asked {
        if ZERO_WORDS.iter().any(|w| lower.contains(w)) {
            return Some(FieldValue::Number(0.0));
        }
        if let Some(value) = parse_amount(lower) {
            if plausible_amount(value, lower) && in_capture_range(&field.def, value) {
                return Some(FieldValue::Number(value));
            }
        }
    }

    None
}

fn extract_choice(def: &FieldDef, lower: &str) -> Option<FieldValue> {
    // Keyword table first, in declaration order; first match wins.
    for (keyword, canonical) in &def.keywords {
        if lower.contains(keyword.as_str()) {
            return Some(FieldValue::Text(canonical.clone()));
        }
    }

    // Exact answer matching a canonical value ("Tier1", "SUV").
    let trimmed = lower.trim().trim_end_matches('.');
    for allowed in &def.allowed {
        if trimmed == allowed.to_lowercase() {
            return Some(FieldValue::Text(allowed.clone()));
        }
    }

    None
}

fn extract_yes_no(lower: &str, is_asked: bool) -> Option<FieldValue> {
    if !is_asked {
        return None;
    }
    let has_yes = YES_INDICATORS.iter().any(|w| lower.contains(w));
    let has_no = NO_INDICATORS.iter().any(|w| lower.contains(w));
    match (has_yes, has_no) {
        (true, false) => Some(FieldValue::Text("Yes".to_string())),
        (false, true) => Some(FieldValue::Text("No".to_string())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loan_agent_config::ProductRegistry;
    use loan_agent_core::LoanType;

    fn extractor(loan_type: LoanType) -> RuleExtractor {
        let registry = ProductRegistry::builtin();
        RuleExtractor::new(&registry.get(loan_type).unwrap())
    }

    fn value_of(found: &[(String, FieldValue)], name: &str) -> Option<FieldValue> {
        found
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    #[test]
    fn test_explicit_name() {
        let ex = extractor(LoanType::Personal);
        let found = ex.extract("Hi, my name is riya sharma", None);
        assert_eq!(
            value_of(&found, "Customer_Name"),
            Some(FieldValue::Text("Riya Sharma".to_string()))
        );
    }

    #[test]
    fn test_bare_name_only_when_asked() {
        let ex = extractor(LoanType::Personal);
        let found = ex.extract("Riya Sharma", Some("Please share your full name (e.g., Riya Sharma)."));
        assert_eq!(
            value_of(&found, "Customer_Name"),
            Some(FieldValue::Text("Riya Sharma".to_string()))
        );

        let found = ex.extract("Riya Sharma", None);
        assert_eq!(value_of(&found, "Customer_Name"), None);
    }

    #[test]
    fn test_employment_answer_is_not_a_name() {
        let ex = extractor(LoanType::Personal);
        let found = ex.extract("I am salaried", Some("Are you Salaried or Self-Employed? (employment type)"));
        assert_eq!(value_of(&found, "Customer_Name"), None);
        assert_eq!(
            value_of(&found, "Employment_Type"),
            Some(FieldValue::Text("Salaried".to_string()))
        );
    }

    #[test]
    fn test_phone_with_country_code() {
        let ex = extractor(LoanType::Personal);
        let found = ex.extract("you can reach me at +91 9876543210", None);
        assert_eq!(
            value_of(&found, "Customer_Phone"),
            Some(FieldValue::Text("9876543210".to_string()))
        );
    }

    #[test]
    fn test_phone_is_not_an_amount() {
        let ex = extractor(LoanType::Personal);
        let found = ex.extract(
            "9876543210",
            Some("What loan amount are you looking for in INR? (e.g., 200000)"),
        );
        assert_eq!(value_of(&found, "Expected_Loan_Amount"), None);
        assert_eq!(
            value_of(&found, "Customer_Phone"),
            Some(FieldValue::Text("9876543210".to_string()))
        );
    }

    #[test]
    fn test_email() {
        let ex = extractor(LoanType::Personal);
        let found = ex.extract("riya.sharma@example.com", None);
        assert_eq!(
            value_of(&found, "Customer_Email"),
            Some(FieldValue::Text("riya.sharma@example.com".to_string()))
        );
    }

    #[test]
    fn test_age_patterns() {
        let ex = extractor(LoanType::Personal);
        let found = ex.extract("I am 30 years old", None);
        assert_eq!(value_of(&found, "Age"), Some(FieldValue::Number(30.0)));
    }

    #[test]
    fn test_bare_age_when_asked() {
        let ex = extractor(LoanType::Personal);
        let found = ex.extract("30", Some("What is your age in years? (21\u{2013}65, e.g., 30)"));
        assert_eq!(value_of(&found, "Age"), Some(FieldValue::Number(30.0)));
    }

    #[test]
    fn test_lakh_income_when_asked() {
        let ex = extractor(LoanType::Personal);
        let found = ex.extract("6 lakh", Some("What is your annual income in INR? (e.g., 600000)"));
        assert_eq!(
            value_of(&found, "Annual_Income"),
            Some(FieldValue::Number(600_000.0))
        );
    }

    #[test]
    fn test_cibil_with_context_words() {
        let ex = extractor(LoanType::Personal);
        let found = ex.extract("my cibil score is 720", None);
        assert_eq!(value_of(&found, "CIBIL_Score"), Some(FieldValue::Number(720.0)));
    }

    #[test]
    fn test_zero_emi_answer() {
        let ex = extractor(LoanType::Personal);
        let found = ex.extract(
            "none",
            Some("What are your current monthly EMI obligations in INR? (enter 0 if none)"),
        );
        assert_eq!(value_of(&found, "Existing_EMIs"), Some(FieldValue::Number(0.0)));
    }

    #[test]
    fn test_guarantor_income_not_confused_with_income() {
        let ex = extractor(LoanType::Home);
        let found = ex.extract(
            "25000",
            Some("What is the guarantor's income per month in INR? (enter 0 if no guarantor)"),
        );
        assert_eq!(
            value_of(&found, "Guarantor_income"),
            Some(FieldValue::Number(25_000.0))
        );
        assert_eq!(value_of(&found, "Income"), None);
    }

    #[test]
    fn test_course_keywords() {
        let ex = extractor(LoanType::Education);
        let found = ex.extract("I want to study computer science", None);
        assert_eq!(
            value_of(&found, "Intended_Course"),
            Some(FieldValue::Text("STEM".to_string()))
        );
    }

    #[test]
    fn test_tier_keywords() {
        let ex = extractor(LoanType::Education);
        let found = ex.extract("it's an IIT", None);
        assert_eq!(
            value_of(&found, "University_Tier"),
            Some(FieldValue::Text("Tier1".to_string()))
        );
    }

    #[test]
    fn test_unsecured_beats_secured() {
        let ex = extractor(LoanType::Education);
        let found = ex.extract("unsecured please", None);
        assert_eq!(
            value_of(&found, "Loan_Type"),
            Some(FieldValue::Text("Unsecured".to_string()))
        );
    }

    #[test]
    fn test_yes_no_attribution() {
        let ex = extractor(LoanType::Business);
        let found = ex.extract(
            "yes we have",
            Some("Do you have collateral available to secure the loan? (Yes or No)"),
        );
        assert_eq!(
            value_of(&found, "Has_Collateral"),
            Some(FieldValue::Text("Yes".to_string()))
        );
        assert_eq!(value_of(&found, "Has_Guarantor"), None);

        let found = ex.extract("no", Some("Do you have a guarantor available? (Yes or No)"));
        assert_eq!(
            value_of(&found, "Has_Guarantor"),
            Some(FieldValue::Text("No".to_string()))
        );
    }

    #[test]
    fn test_multiple_fields_in_one_message() {
        let ex = extractor(LoanType::Personal);
        let found = ex.extract(
            "My name is Arjun Mehta, I am 32 years old and my cibil score is 780",
            None,
        );
        assert_eq!(
            value_of(&found, "Customer_Name"),
            Some(FieldValue::Text("Arjun Mehta".to_string()))
        );
        assert_eq!(value_of(&found, "Age"), Some(FieldValue::Number(32.0)));
        assert_eq!(value_of(&found, "CIBIL_Score"), Some(FieldValue::Number(780.0)));
    }

    #[test]
    fn test_exact_choice_answer() {
        let ex = extractor(LoanType::Car);
        let found = ex.extract("SUV", Some("What type of car are you planning to purchase? Choose one: Sedan, SUV, Hatchback, Coupe."));
        assert_eq!(
            value_of(&found, "Car_Type"),
            Some(FieldValue::Text("SUV".to_string()))
        );
    }

    #[test]
    fn test_gold_value_with_context() {
        let ex = extractor(LoanType::Gold);
        let found = ex.extract("my gold is worth 3 lakh", None);
        assert_eq!(
            value_of(&found, "Gold_Value"),
            Some(FieldValue::Number(300_000.0))
        );
    }

    #[test]
    fn test_out_of_range_capture_skipped() {
        let ex = extractor(LoanType::Education);
        // 150 is outside the academic score capture window, nothing stored.
        let found = ex.extract("150", Some("What's your academic score out of 100? (e.g., 82)"));
        assert_eq!(value_of(&found, "Academic_Score"), None);
    }
}
