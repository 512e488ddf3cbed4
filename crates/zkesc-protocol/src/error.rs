//! # Protocol Errors
//!
//! [`ProtocolError`] wraps every lower-level error unchanged.
//! [`ProtocolError::kind`] flattens it to an [`ErrorKind`] with a stable
//! snake_case code, so client tooling can tell "wrong witness" from
//! "proof already used" without matching nested enums.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use zkesc_core::ContextError;
use zkesc_escrow::EscrowError;
use zkesc_state::{LedgerError, RegistryError};
use zkesc_verifier::ClaimError;

use crate::config::ConfigError;
use crate::mint::MintError;

/// Distinguishable failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A signature is not 65 bytes.
    InvalidSignatureLength,
    /// No recovered signer is an expected witness.
    AddressMismatch,
    /// Threshold out of range, or too few matching signatures.
    InvalidThreshold,
    /// Asserted identifier differs from the recomputed one.
    IdentifierMismatch,
    /// Bank account, amount, or currency disagree with the payment config.
    PaymentMismatch,
    /// Nullifier or verification already used.
    AlreadyUsed,
    /// Spend with no recorded verification.
    NotVerified,
    /// Caller lacks the required role.
    Unauthorized,
    /// A required context field is absent.
    MissingField,
    /// Context is not valid JSON or has a malformed value.
    InvalidContext,
    /// An argument is out of range.
    InvalidInput,
    /// Verification older than the configured TTL.
    VerificationExpired,
    /// Second initialization.
    AlreadyInitialized,
    /// Use before initialization.
    NotInitialized,
    /// Vault or account cannot cover the amount.
    InsufficientFunds,
    /// Withdrawal amount not allowed by the payment.
    WithdrawalAmountMismatch,
    /// Configuration rejected.
    InvalidConfig,
    /// The mint collaborator failed.
    MintFailed,
}

impl ErrorKind {
    /// Stable snake_case code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidSignatureLength => "invalid_signature_length",
            Self::AddressMismatch => "address_mismatch",
            Self::InvalidThreshold => "invalid_threshold",
            Self::IdentifierMismatch => "identifier_mismatch",
            Self::PaymentMismatch => "payment_mismatch",
            Self::AlreadyUsed => "already_used",
            Self::NotVerified => "not_verified",
            Self::Unauthorized => "unauthorized",
            Self::MissingField => "missing_field",
            Self::InvalidContext => "invalid_context",
            Self::InvalidInput => "invalid_input",
            Self::VerificationExpired => "verification_expired",
            Self::AlreadyInitialized => "already_initialized",
            Self::NotInitialized => "not_initialized",
            Self::InsufficientFunds => "insufficient_funds",
            Self::WithdrawalAmountMismatch => "withdrawal_amount_mismatch",
            Self::InvalidConfig => "invalid_config",
            Self::MintFailed => "mint_failed",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Any failure of a protocol entry point.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Proof validation failed.
    #[error(transparent)]
    Claim(#[from] ClaimError),

    /// Nullifier or payment-config registry failure.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Verification ledger failure.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Escrow failure.
    #[error(transparent)]
    Escrow(#[from] EscrowError),

    /// Bootstrap configuration failure.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Mint collaborator failure.
    #[error(transparent)]
    Mint(#[from] MintError),
}

impl ProtocolError {
    /// Flattened kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Claim(e) => claim_kind(e),
            Self::Registry(e) => registry_kind(e),
            Self::Ledger(e) => ledger_kind(e),
            Self::Escrow(e) => escrow_kind(e),
            Self::Config(_) => ErrorKind::InvalidConfig,
            Self::Mint(_) => ErrorKind::MintFailed,
        }
    }
}

fn context_kind(err: &ContextError) -> ErrorKind {
    match err {
        ContextError::MissingField(_) => ErrorKind::MissingField,
        ContextError::InvalidJson(_) | ContextError::InvalidAmount { .. } => ErrorKind::InvalidContext,
    }
}

fn claim_kind(err: &ClaimError) -> ErrorKind {
    match err {
        ClaimError::IdentifierMismatch { .. } => ErrorKind::IdentifierMismatch,
        ClaimError::InvalidSignatureLength { .. } => ErrorKind::InvalidSignatureLength,
        ClaimError::ThresholdOutOfRange { .. }
        | ClaimError::InsufficientSignatures { .. }
        | ClaimError::InsufficientWitnesses { .. } => ErrorKind::InvalidThreshold,
        ClaimError::AddressMismatch { .. } => ErrorKind::AddressMismatch,
        ClaimError::PaymentMismatch { .. } => ErrorKind::PaymentMismatch,
        ClaimError::InvalidPaymentConfig { .. } => ErrorKind::InvalidConfig,
        ClaimError::Context(e) => context_kind(e),
    }
}

fn registry_kind(err: &RegistryError) -> ErrorKind {
    match err {
        RegistryError::AlreadyInitialized { .. } => ErrorKind::AlreadyInitialized,
        RegistryError::NotInitialized { .. } => ErrorKind::NotInitialized,
        RegistryError::AlreadyUsed { .. } => ErrorKind::AlreadyUsed,
        RegistryError::Unauthorized { .. } => ErrorKind::Unauthorized,
        RegistryError::InvalidPaymentConfig(e) => claim_kind(e),
    }
}

fn ledger_kind(err: &LedgerError) -> ErrorKind {
    match err {
        LedgerError::NotVerified { .. } => ErrorKind::NotVerified,
        LedgerError::AlreadyConsumed { .. } => ErrorKind::AlreadyUsed,
        LedgerError::VerificationExpired { .. } => ErrorKind::VerificationExpired,
        LedgerError::Claim(e) => claim_kind(e),
        LedgerError::Registry(e) => registry_kind(e),
    }
}

fn escrow_kind(err: &EscrowError) -> ErrorKind {
    match err {
        EscrowError::AlreadyInitialized => ErrorKind::AlreadyInitialized,
        EscrowError::NotInitialized => ErrorKind::NotInitialized,
        EscrowError::InvalidConfig(_) => ErrorKind::InvalidConfig,
        EscrowError::InvalidInput { .. } => ErrorKind::InvalidInput,
        EscrowError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
        EscrowError::Unauthorized { .. } => ErrorKind::Unauthorized,
        EscrowError::WithdrawalAmountMismatch { .. } | EscrowError::PaymentAmountUnavailable => {
            ErrorKind::WithdrawalAmountMismatch
        }
        EscrowError::Ledger(e) => ledger_kind(e),
    }
}
