//! # State Errors

use thiserror::Error;
use zkesc_core::{AccountId, Hash256, Nullifier};
use zkesc_verifier::ClaimError;

/// Errors from the nullifier and payment-config registries.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The registry or config already exists.
    #[error("{what} already initialized")]
    AlreadyInitialized {
        /// What was initialized twice.
        what: String,
    },

    /// The registry or config has not been created.
    #[error("{what} not initialized")]
    NotInitialized {
        /// What was missing.
        what: String,
    },

    /// The nullifier has a record already.
    #[error("nullifier {nullifier} already used by {used_by}")]
    AlreadyUsed {
        /// Nullifier that was claimed.
        nullifier: Nullifier,
        /// Account holding the existing record.
        used_by: AccountId,
    },

    /// Signer is not the authority for the entry.
    #[error("unauthorized: {signer} is not the authority {authority}")]
    Unauthorized {
        /// Account that attempted the change.
        signer: AccountId,
        /// Account entitled to make it.
        authority: AccountId,
    },

    /// Payment config values failed validation.
    #[error(transparent)]
    InvalidPaymentConfig(#[from] ClaimError),
}

/// Errors from the verification ledger.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// No verification is recorded for the user.
    #[error("no verification recorded for {user}")]
    NotVerified {
        /// User that attempted to spend.
        user: AccountId,
    },

    /// The user's verification was already spent.
    #[error("verification of {identifier} for {user} already consumed")]
    AlreadyConsumed {
        /// User that attempted to spend.
        user: AccountId,
        /// Claim the entry refers to.
        identifier: Hash256,
    },

    /// The verification is older than the configured TTL.
    #[error("verification for {user} expired: {age_secs}s old, limit {ttl_secs}s")]
    VerificationExpired {
        /// User that attempted to spend.
        user: AccountId,
        /// Entry age at spend time.
        age_secs: u64,
        /// Configured limit.
        ttl_secs: u64,
    },

    /// The proof was rejected.
    #[error(transparent)]
    Claim(#[from] ClaimError),

    /// Nullifier registration failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
