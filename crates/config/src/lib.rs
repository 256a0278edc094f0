//! Configuration for the loan agent
//!
//! Two concerns live here:
//! - `Settings`: process configuration loaded from YAML files and
//!   `LOAN_AGENT_*` environment variables.
//! - The product registry: one `ProductDefinition` per loan type, built in
//!   code (`ProductRegistry::builtin`) and overridable from a YAML file.

pub mod catalog;
pub mod product;
pub mod settings;

pub use product::{
    CollateralCap, CrossFieldRule, DecisionBounds, DerivedFieldDef, FieldDef, FieldKind,
    ProductDefinition, ProductRegistry, RejectionKind, ValueRule,
};
pub use settings::{
    load_settings, LlmSettings, ObservabilityConfig, RuntimeEnvironment, ServerConfig, Settings,
    StorageConfig,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid product definition for {product}: {message}")]
    InvalidProduct { product: String, message: String },

    #[error("Environment error: {0}")]
    Environment(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
