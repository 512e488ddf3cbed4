//! # Escrow Error Types
//!
//! Errors carry the account and the amounts involved so that a rejected
//! movement can be diagnosed from the error alone.

use thiserror::Error;
use zkesc_core::AccountId;
use zkesc_state::LedgerError;

/// Errors from escrow operations.
#[derive(Error, Debug)]
pub enum EscrowError {
    /// `initialize` was called on an initialized escrow.
    #[error("escrow already initialized")]
    AlreadyInitialized,

    /// An operation ran before `initialize`.
    #[error("escrow not initialized")]
    NotInitialized,

    /// Escrow configuration values are invalid.
    #[error("invalid escrow config: {0}")]
    InvalidConfig(String),

    /// An argument is out of range.
    #[error("invalid {operation} input: {reason}")]
    InvalidInput {
        /// Operation name.
        operation: &'static str,
        /// What was wrong.
        reason: String,
    },

    /// The vault or a token account cannot cover the amount.
    #[error("insufficient funds in {account}: requested {requested}, available {available}")]
    InsufficientFunds {
        /// `vault` or the debited account.
        account: String,
        /// Amount requested.
        requested: u64,
        /// Balance at the time.
        available: u64,
    },

    /// Caller is not the escrow admin.
    #[error("unauthorized: {caller} is not the escrow admin")]
    Unauthorized {
        /// Account that attempted the operation.
        caller: AccountId,
    },

    /// The requested withdrawal differs from the amount the payment binds.
    #[error("withdrawal amount mismatch: requested {requested}, payment allows {expected}")]
    WithdrawalAmountMismatch {
        /// Amount requested.
        requested: u64,
        /// Amount derived from the validated payment.
        expected: u64,
    },

    /// The binding needs a validated payment amount and the grant has none.
    #[error("withdrawal requires a payment-verified proof")]
    PaymentAmountUnavailable,

    /// Verification or nullifier claim failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
