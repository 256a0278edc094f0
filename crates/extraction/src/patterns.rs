//! Static extraction patterns, compiled once at program start

use once_cell::sync::Lazy;
use regex::Regex;

// Name patterns (explicit introductions)
pub(crate) static NAME_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)(?:my\s+name\s+is|call\s+me|this\s+is|myself|name\s*:)\s+([a-zA-Z][a-zA-Z .']{1,40})").unwrap(),
        Regex::new(r"(?i)(?:i\s+am|i'm)\s+([a-zA-Z][a-zA-Z .']{1,40})").unwrap(),
    ]
});

// Email (standard pattern)
pub(crate) static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap());

// Indian mobile numbers (10 digits, 6-9 leading, optional country code)
pub(crate) static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\+?91[\s-]?)?([6-9]\d{9})\b").unwrap());

// Bare number anywhere in the message
pub(crate) static BARE_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)").unwrap());

// Words that disqualify a name capture; "I am salaried" is not a name.
pub(crate) const NAME_EXCLUDE_WORDS: &[&str] = &[
    "years", "old", "work", "working", "job", "salary", "salaried", "employed", "retired",
    "score", "loan", "lakh", "crore", "interested", "looking", "eligible",
];

// Small-talk answers that must not be captured as a bare name
pub(crate) const SMALL_TALK_WORDS: &[&str] = &[
    "yes", "no", "ok", "okay", "sure", "hello", "hi", "hey", "thanks", "thank",
];

// Yes/No indicators for answer attribution when a yes/no field was asked
pub(crate) const YES_INDICATORS: &[&str] = &[
    "yes", "yeah", "yep", "have", "available", "got", "do have", "we have", "there is",
];
pub(crate) const NO_INDICATORS: &[&str] = &[
    "no", "don't", "dont", "not", "none", "nothing",
];

// Words meaning an explicit zero answer for amount fields
pub(crate) const ZERO_WORDS: &[&str] = &["none", "zero", "nil", "no emi", "nothing"];
