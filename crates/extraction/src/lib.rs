//! Rule-based field extraction
//!
//! The deterministic fallback path of the field extractor. It must work with
//! the language-model collaborator entirely absent, so every heuristic here
//! is a plain regex or keyword rule over the lower-cased user message,
//! optionally informed by the previous assistant question to disambiguate
//! bare answers ("720" means CIBIL only if CIBIL was just asked for).

mod extractor;
mod patterns;

pub use extractor::RuleExtractor;
