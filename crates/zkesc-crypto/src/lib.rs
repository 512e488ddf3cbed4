//! # zkesc-crypto — Witness Signatures
//!
//! Recovers and produces the secp256k1 signatures witnesses attach to
//! claims:
//!
//! - **Recovery** ([`recover_signer`]): Ethereum `personal_sign` hashing,
//!   `v` normalisation, public-key recovery, address derivation.
//! - **Signing** ([`WitnessSigner`], [`WitnessKey`]): produces 65-byte
//!   `r || s || v` attestations for attestor tooling and tests.
//!
//! ## Crate Policy
//!
//! - Depends only on `zkesc-core` internally; Keccak-256 comes from
//!   [`zkesc_core::keccak256`] so hashing has a single implementation.
//! - No mocking of cryptographic operations in tests: all tests use real
//!   secp256k1 keys.

pub mod error;
pub mod eth;
pub mod witness;

pub use error::CryptoError;
pub use eth::{
    address_from_verifying_key, personal_message_hash, recover_prehashed, recover_signer,
};
pub use witness::{WitnessKey, WitnessSigner};
