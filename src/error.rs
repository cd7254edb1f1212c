// src/error.rs

use thiserror::Error;

/// Invalid rule or transform configuration.
///
/// Raised only while a processor is being built. Per-name operations never fail.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Rule line without exactly one `->` / `=>` separator
    #[error("syntax error in variant rule '{rule}': {reason}")]
    Syntax { rule: String, reason: &'static str },

    /// A left-hand alternative that is blank or normalizes to nothing
    #[error("empty pattern in variant rule '{rule}'")]
    EmptyPattern { rule: String },

    /// Right-hand side without any alternative
    #[error("empty replacement list in variant rule '{rule}'")]
    EmptyReplacement { rule: String },

    /// Bad anchor / compound markers, or text normalized names can never contain
    #[error("invalid pattern '{pattern}' in variant rule '{rule}': {reason}")]
    InvalidPattern {
        rule: String,
        pattern: String,
        reason: &'static str,
    },

    /// Unparseable normalization or transliteration step
    #[error("invalid transform step '{step}': {reason}")]
    InvalidTransform { step: String, reason: String },

    /// Structured rule group that cannot be turned into a rule
    #[error("invalid rule group: {reason}")]
    InvalidGroup { reason: String },

    #[error("max_variants must be at least 1, got {value}")]
    InvalidCap { value: usize },

    #[error("failed to build variant matcher: {0}")]
    Automaton(#[from] aho_corasick::BuildError),
}
