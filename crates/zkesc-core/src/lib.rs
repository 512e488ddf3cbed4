#![deny(missing_docs)]

//! # zkesc-core — Foundational Types
//!
//! This crate defines the types every other crate in the workspace depends
//! on. It has no internal crate dependencies; it uses only `serde`, `serde_json`,
//! `thiserror`, `chrono`, `sha3`, and `hex` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** A witness [`EthAddress`] is
//!    not a chain [`AccountId`], and a [`Nullifier`] is not a [`Hash256`].
//!
//! 2. **[`codec`] is the sole path to claim hashes.** Identifier, signing
//!    message, and nullifier derivation live in one module so every crate
//!    hashes the same bytes.
//!
//! 3. **Typed context schema.** The claim `context` JSON is parsed into
//!    [`ClaimContext`]; missing receipt fields surface as
//!    [`ContextError::MissingField`] naming the field.
//!
//! 4. **Structured errors with `thiserror`.** No `Box<dyn Error>`, no
//!    `.unwrap()` outside tests.

pub mod amount;
pub mod claim;
pub mod codec;
pub mod context;
pub mod error;
pub mod primitives;
pub mod temporal;

// Re-export primary types at crate root for ergonomic imports.
pub use amount::FiatAmount;
pub use claim::{ClaimInfo, CompleteClaimData, Proof, SignedClaim};
pub use codec::{
    identifier, keccak256, nullifier, nullifier_from_parts, signing_message, SchemaVersion,
};
pub use context::{ClaimContext, ExtractedParameters};
pub use error::{ContextError, ValidationError};
pub use primitives::{
    AccountId, EthAddress, Hash256, Nullifier, SignatureBytes, SIGNATURE_LENGTH,
};
pub use temporal::Timestamp;
