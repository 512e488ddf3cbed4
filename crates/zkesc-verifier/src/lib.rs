//! # zkesc-verifier — Claim Validation
//!
//! Pure proof checks with no storage access:
//!
//! - [`ClaimValidator`]: identifier recomputation, witness signature
//!   recovery, and distinct-witness threshold consensus.
//! - [`PaymentConfig`]: the receipt fields a payment proof must carry.
//!
//! A successful validation yields a [`VerifiedClaim`]. Replay prevention
//! and persistence happen in `zkesc-state`.

pub mod error;
pub mod payment;
pub mod validator;

pub use error::{ClaimError, PaymentField};
pub use payment::{PaymentConfig, VerifiedPayment, SUPPORTED_FIAT_CURRENCIES};
pub use validator::{ClaimValidator, IdentifierCheck, VerifiedClaim};
