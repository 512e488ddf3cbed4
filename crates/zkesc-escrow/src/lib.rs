//! # zkesc-escrow — Proof-Gated Token Escrow
//!
//! A vault of tokens that pays out only against verified fiat payment
//! proofs, plus an admin override.
//!
//! ## Design Principles
//!
//! - The vault balance is owned by [`Escrow`] and changes only through
//!   its operations. Party balances live behind [`TokenAccounts`].
//! - A proof-gated payout consumes its payment nullifier. A payment pays
//!   out at most once, across `withdraw` and `release` alike.
//! - How much a proof may withdraw is decided by the configured
//!   [`WithdrawalBinding`].
//! - Every movement is appended to an audit trail of
//!   [`EscrowTransaction`] records.

pub mod accounts;
pub mod binding;
pub mod config;
pub mod error;
pub mod vault;

pub use accounts::{InMemoryTokenAccounts, TokenAccounts};
pub use binding::WithdrawalBinding;
pub use config::{EscrowConfig, MAX_WITNESSES};
pub use error::EscrowError;
pub use vault::{Escrow, EscrowTransaction, TransactionKind};
