//! Product definitions and the product registry
//!
//! Each loan product is one `ProductDefinition`: an ordered list of field
//! specifications with capture hints and validation rules, derived-field
//! recipes, cross-field rules, category encodings for the scoring model and
//! the decision-time clamp bounds. The six built-in products live under
//! `catalog/`; a YAML file with the same shape can replace them at startup.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use loan_agent_core::LoanType;

use crate::ConfigError;

/// How severe a validation rejection is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    /// Hard rule failure — the applicant does not qualify for the product
    Ineligible,
    /// Out of range but plausibly a typo — ask the user to reconfirm
    Reconfirm,
    /// Value does not parse for the field's type
    InvalidFormat,
    /// Value is not in the allowed set for a categorical field
    InvalidChoice,
}

/// The shape of a field's value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Person name (title-cased on acceptance)
    Name,
    /// Email address
    Email,
    /// Indian mobile number (10 digits, 6-9 leading, +91 stripped)
    Phone,
    /// Plain numeric value (age, score, years, percent)
    Number,
    /// Monetary value, accepts lakh/crore/comma formats
    Amount,
    /// Categorical value from a fixed allowed set
    Choice,
    /// Yes/No answer
    YesNo,
}

/// A validation rule applied to a field value, checked in declaration order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueRule {
    /// Minimum trimmed length for text values
    MinLen { min: usize, message: String },
    /// Value must be strictly positive
    Positive { message: String },
    /// Value must be zero or greater
    NonNegative { message: String },
    /// Value must be at least `limit`
    AtLeast {
        limit: f64,
        kind: RejectionKind,
        message: String,
    },
    /// Value must be at most `limit`
    AtMost {
        limit: f64,
        kind: RejectionKind,
        message: String,
    },
}

/// One field of a product's application form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field name as used in profiles and scoring input
    pub name: String,
    pub kind: FieldKind,
    /// Included in the numeric feature set handed to the scorer
    #[serde(default)]
    pub numeric: bool,
    /// Allowed canonical values (Choice fields)
    #[serde(default)]
    pub allowed: Vec<String>,
    /// keyword -> canonical value mapping, first match wins (Choice fields)
    #[serde(default)]
    pub keywords: Vec<(String, String)>,
    /// Words in the previous assistant question that mark this field as the
    /// one being answered
    #[serde(default)]
    pub context_keywords: Vec<String>,
    /// Plausible window for capturing bare numeric answers
    #[serde(default)]
    pub capture_range: Option<(f64, f64)>,
    /// Field-specific value regexes (one capture group each), tried before
    /// the generic capture paths
    #[serde(default)]
    pub patterns: Vec<String>,
    /// Validation rules
    #[serde(default)]
    pub rules: Vec<ValueRule>,
    /// Deterministic follow-up question asking for this field
    pub ask: String,
    /// One-line description used in the extraction prompt
    pub description: String,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            numeric: false,
            allowed: Vec::new(),
            keywords: Vec::new(),
            context_keywords: Vec::new(),
            capture_range: None,
            patterns: Vec::new(),
            rules: Vec::new(),
            ask: String::new(),
            description: String::new(),
        }
    }

    pub fn numeric(mut self) -> Self {
        self.numeric = true;
        self
    }

    pub fn allowed(mut self, values: &[&str]) -> Self {
        self.allowed = values.iter().map(|v| v.to_string()).collect();
        self
    }

    pub fn keyword(mut self, keyword: &str, canonical: &str) -> Self {
        self.keywords.push((keyword.to_string(), canonical.to_string()));
        self
    }

    pub fn context(mut self, words: &[&str]) -> Self {
        self.context_keywords = words.iter().map(|w| w.to_string()).collect();
        self
    }

    pub fn capture(mut self, min: f64, max: f64) -> Self {
        self.capture_range = Some((min, max));
        self
    }

    pub fn pattern(mut self, pattern: &str) -> Self {
        self.patterns.push(pattern.to_string());
        self
    }

    pub fn rule(mut self, rule: ValueRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn ask(mut self, question: &str) -> Self {
        self.ask = question.to_string();
        self
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Human-readable field label ("Annual_Income" -> "annual income")
    pub fn label(&self) -> String {
        self.name.replace('_', " ").to_lowercase()
    }

    /// Customer identity fields are excluded from scoring input
    pub fn is_identity(&self) -> bool {
        self.name.starts_with("Customer_")
    }
}

/// A field computed from another field rather than asked for
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivedFieldDef {
    /// Name of the derived field
    pub name: String,
    /// Source field the value is computed from
    pub source: String,
    /// Grade bands, highest minimum first; the first band whose minimum is
    /// at or below the source value wins
    pub bands: Vec<(f64, String)>,
    /// Label used when no band matches
    pub fallback: String,
}

impl DerivedFieldDef {
    /// Compute the derived label for a source value.
    pub fn grade(&self, value: f64) -> &str {
        for (min, label) in &self.bands {
            if value >= *min {
                return label;
            }
        }
        &self.fallback
    }
}

/// A validation rule spanning multiple fields, checked once all of its
/// inputs are present
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossFieldRule {
    /// `field` must be strictly less than `than`
    StrictlyLessThan {
        field: String,
        than: String,
        message: String,
    },
    /// `field` must not exceed `limit_field`
    AtMostField {
        field: String,
        limit_field: String,
        message: String,
    },
}

impl CrossFieldRule {
    /// Fields this rule depends on.
    pub fn inputs(&self) -> [&str; 2] {
        match self {
            CrossFieldRule::StrictlyLessThan { field, than, .. } => [field, than],
            CrossFieldRule::AtMostField {
                field, limit_field, ..
            } => [field, limit_field],
        }
    }
}

/// Cap the offered amount at a fraction of a collateral field's value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollateralCap {
    pub field: String,
    pub factor: f64,
}

/// Decision-time clamp bounds, guarding against out-of-distribution scorer
/// output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionBounds {
    pub min_amount: f64,
    pub max_amount: f64,
    pub min_rate: f64,
    pub max_rate: f64,
    /// The field carrying the requested amount
    pub amount_field: String,
    #[serde(default)]
    pub collateral_cap: Option<CollateralCap>,
}

/// Everything the engine needs to run one loan product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDefinition {
    pub loan_type: LoanType,
    pub display_name: String,
    pub description: String,
    /// Deterministic greeting used when the language model is unavailable
    pub greeting: String,
    /// Required fields, in collection order
    pub fields: Vec<FieldDef>,
    #[serde(default)]
    pub derived: Vec<DerivedFieldDef>,
    #[serde(default)]
    pub cross_rules: Vec<CrossFieldRule>,
    /// Fixed category-to-code maps for the scoring model
    #[serde(default)]
    pub encodings: HashMap<String, Vec<(String, f64)>>,
    pub bounds: DecisionBounds,
}

impl ProductDefinition {
    /// Required field names in collection order.
    pub fn required_fields(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Look up a field definition by name.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Fields coerced to numbers before scoring.
    pub fn numeric_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.numeric)
            .map(|f| f.name.as_str())
            .collect()
    }

    /// Derived field triggered by storing `source`, if any.
    pub fn derived_for_source(&self, source: &str) -> Option<&DerivedFieldDef> {
        self.derived.iter().find(|d| d.source == source)
    }

    /// Derived field definition by name.
    pub fn derived_field(&self, name: &str) -> Option<&DerivedFieldDef> {
        self.derived.iter().find(|d| d.name == name)
    }

    /// Numeric code for a categorical value.
    pub fn encode(&self, field: &str, value: &str) -> Option<f64> {
        self.encodings
            .get(field)
            .and_then(|codes| codes.iter().find(|(v, _)| v == value))
            .map(|(_, code)| *code)
    }

    /// Check the registry invariants for this product.
    fn validate(&self) -> Result<(), ConfigError> {
        let order: Vec<&str> = self.required_fields();

        // Derived fields must come after their source, since completion
        // checking treats the derived field as satisfied by its source.
        for derived in &self.derived {
            let source_pos = order.iter().position(|f| *f == derived.source);
            let derived_pos = order.iter().position(|f| *f == derived.name);
            match (source_pos, derived_pos) {
                (Some(s), Some(d)) if s < d => {}
                // A derived field that is not itself required is fine.
                (Some(_), None) => {}
                _ => {
                    return Err(ConfigError::InvalidProduct {
                        product: self.loan_type.to_string(),
                        message: format!(
                            "derived field {} must follow its source {}",
                            derived.name, derived.source
                        ),
                    });
                }
            }
        }

        let amount_field = self
            .field(&self.bounds.amount_field)
            .ok_or_else(|| ConfigError::InvalidProduct {
                product: self.loan_type.to_string(),
                message: format!("amount field {} is not a required field", self.bounds.amount_field),
            })?;
        if !amount_field.numeric {
            return Err(ConfigError::InvalidProduct {
                product: self.loan_type.to_string(),
                message: format!("amount field {} must be numeric", self.bounds.amount_field),
            });
        }

        for rule in &self.cross_rules {
            for input in rule.inputs() {
                if self.field(input).is_none() {
                    return Err(ConfigError::InvalidProduct {
                        product: self.loan_type.to_string(),
                        message: format!("cross-field rule references unknown field {}", input),
                    });
                }
            }
        }

        Ok(())
    }
}

/// Registry mapping loan types to product definitions
#[derive(Debug, Clone)]
pub struct ProductRegistry {
    products: HashMap<LoanType, Arc<ProductDefinition>>,
}

impl ProductRegistry {
    /// Build the registry from the six built-in product tables.
    pub fn builtin() -> Self {
        let definitions = crate::catalog::builtin_products();
        Self::from_definitions(definitions)
            .expect("built-in product tables violate registry invariants")
    }

    /// Build a registry from explicit definitions, checking invariants.
    pub fn from_definitions(
        definitions: Vec<ProductDefinition>,
    ) -> Result<Self, ConfigError> {
        let mut products = HashMap::new();
        for def in definitions {
            def.validate()?;
            products.insert(def.loan_type, Arc::new(def));
        }
        Ok(Self { products })
    }

    /// Load a registry from a YAML file with the same shape as the built-in
    /// tables.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|_| ConfigError::FileNotFound(path.as_ref().display().to_string()))?;
        let definitions: Vec<ProductDefinition> =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        Self::from_definitions(definitions)
    }

    /// Get a product definition.
    pub fn get(&self, loan_type: LoanType) -> Option<Arc<ProductDefinition>> {
        self.products.get(&loan_type).cloned()
    }

    /// Loan types available in this registry, in catalog order.
    pub fn available(&self) -> Vec<LoanType> {
        LoanType::all()
            .iter()
            .copied()
            .filter(|lt| self.products.contains_key(lt))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_has_all_products() {
        let registry = ProductRegistry::builtin();
        for lt in LoanType::all() {
            assert!(registry.get(*lt).is_some(), "missing product {}", lt);
        }
    }

    #[test]
    fn test_derived_ordering_enforced() {
        let registry = ProductRegistry::builtin();
        let education = registry.get(LoanType::Education).unwrap();
        let order = education.required_fields();
        let score_pos = order.iter().position(|f| *f == "Academic_Score").unwrap();
        // Academic_Performance is derived-only, never directly required.
        assert!(order.iter().all(|f| *f != "Academic_Performance"));
        assert!(score_pos < order.len());
    }

    #[test]
    fn test_amount_field_is_numeric_everywhere() {
        let registry = ProductRegistry::builtin();
        for lt in LoanType::all() {
            let product = registry.get(*lt).unwrap();
            let amount = product.field(&product.bounds.amount_field).unwrap();
            assert!(amount.numeric, "{} amount field not numeric", lt);
        }
    }

    #[test]
    fn test_grade_bands() {
        let def = DerivedFieldDef {
            name: "Academic_Performance".to_string(),
            source: "Academic_Score".to_string(),
            bands: vec![
                (90.0, "Excellent".to_string()),
                (75.0, "Good".to_string()),
                (60.0, "Average".to_string()),
            ],
            fallback: "Poor".to_string(),
        };
        assert_eq!(def.grade(95.0), "Excellent");
        assert_eq!(def.grade(80.0), "Good");
        assert_eq!(def.grade(65.0), "Average");
        assert_eq!(def.grade(40.0), "Poor");
    }

    #[test]
    fn test_invalid_product_rejected() {
        let mut def = crate::catalog::builtin_products().remove(0);
        def.bounds.amount_field = "No_Such_Field".to_string();
        assert!(ProductRegistry::from_definitions(vec![def]).is_err());
    }

    #[test]
    fn test_encoding_lookup() {
        let registry = ProductRegistry::builtin();
        let car = registry.get(LoanType::Car).unwrap();
        assert_eq!(car.encode("Car_Type", "Sedan"), Some(0.0));
        assert_eq!(car.encode("Car_Type", "SUV"), Some(1.0));
        assert_eq!(car.encode("Car_Type", "Truck"), None);
    }
}
