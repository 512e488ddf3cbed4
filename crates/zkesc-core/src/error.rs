//! # Error Hierarchy
//!
//! Structured error types for the foundational layer, built with `thiserror`.
//!
//! [`ValidationError`] covers domain-primitive construction (hex parsing,
//! fixed lengths, timestamps). [`ContextError`] covers the claim `context`
//! document: malformed JSON, absent receipt fields, unparseable amounts.

use thiserror::Error;

/// Validation errors for domain primitive newtypes.
///
/// Each error carries the rejected input and the expected format so that
/// operators can diagnose malformed proofs without guesswork.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Input is not valid hexadecimal.
    #[error("invalid hex for {what}: \"{value}\" ({reason})")]
    InvalidHex {
        /// The kind of value being parsed (e.g. "address").
        what: &'static str,
        /// The rejected input.
        value: String,
        /// Decoder diagnostic.
        reason: String,
    },

    /// Decoded bytes have the wrong length.
    #[error("invalid length for {what}: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// The kind of value being parsed.
        what: &'static str,
        /// Required byte length.
        expected: usize,
        /// Actual byte length.
        actual: usize,
    },

    /// Account identifiers must be non-empty.
    #[error("invalid account id: must be non-empty and contain no whitespace, got \"{0}\"")]
    InvalidAccountId(String),

    /// Timestamp could not be parsed or is out of range.
    #[error("invalid timestamp: \"{value}\" ({reason})")]
    InvalidTimestamp {
        /// The rejected input.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Errors raised while interpreting a claim `context` document.
#[derive(Error, Debug)]
pub enum ContextError {
    /// The context string is not a JSON document of the expected shape.
    #[error("invalid claim context: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A required `extractedParameters` field is absent or empty.
    #[error("claim context is missing required field \"{0}\"")]
    MissingField(&'static str),

    /// An amount string could not be interpreted.
    #[error("invalid amount \"{value}\": {reason}")]
    InvalidAmount {
        /// The rejected amount string.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}
