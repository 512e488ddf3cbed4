//! # Cryptographic Error Types
//!
//! Structured errors for signature recovery and witness key handling.

use thiserror::Error;

/// Errors from signature and key operations.
///
/// Only malformed input is an error. A well-formed signature by an unknown
/// key recovers successfully to some address; whether that address is
/// trusted is decided by the claim validator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Signature is not exactly `r(32) || s(32) || v(1)`.
    #[error("invalid signature length: expected 65 bytes, got {0}")]
    InvalidSignatureLength(usize),

    /// `v` is outside the Ethereum convention (27 or 28).
    #[error("invalid recovery id: expected v of 27 or 28, got {0}")]
    InvalidRecoveryId(u8),

    /// The curve rejected `r`/`s` or no public key could be recovered.
    #[error("public key recovery failed: {0}")]
    RecoveryFailed(String),

    /// Secret key material is not a valid secp256k1 scalar.
    #[error("invalid signing key: {0}")]
    InvalidSigningKey(String),

    /// The signing backend could not produce a signature.
    #[error("signing failed: {0}")]
    SigningFailed(String),
}
