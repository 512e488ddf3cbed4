//! # Claim Hashing Codec
//!
//! Canonical byte serialization and Keccak-256 hashing of claim fields.
//! Every hash the system compares (identifiers, the signed message and
//! nullifiers) is produced here and nowhere else.
//!
//! ## Preimages
//!
//! ```text
//! identifier (Full)     keccak256(provider "\n" parameters "\n" context)
//! identifier (Compact)  keccak256(provider "\n" context)
//! signing message       identifier "\n" owner "\n" timestampS "\n" epoch
//! nullifier             keccak256(senderNickname || transactionDate)[0..16]
//! ```
//!
//! The two identifier modes are indistinguishable on the wire, so the
//! mode is a deployment setting ([`SchemaVersion`]) rather than something
//! inferred from the proof.

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

use crate::claim::{ClaimInfo, CompleteClaimData};
use crate::context::ClaimContext;
use crate::error::ContextError;
use crate::primitives::{Hash256, Nullifier};

/// Which fields of [`ClaimInfo`] enter the identifier preimage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaVersion {
    /// `provider`, `parameters`, and `context`.
    #[default]
    Full,
    /// `provider` and `context` only; `parameters` is dropped to shrink
    /// the on-chain payload.
    Compact,
}

impl SchemaVersion {
    /// The canonical string name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Compact => "compact",
        }
    }
}

impl std::fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keccak-256 of arbitrary bytes.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let digest = Keccak256::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// Compute the claim identifier from its [`ClaimInfo`].
pub fn identifier(info: &ClaimInfo, version: SchemaVersion) -> Hash256 {
    let mut preimage = String::with_capacity(
        info.provider.len() + info.parameters.len() + info.context.len() + 2,
    );
    preimage.push_str(&info.provider);
    preimage.push('\n');
    if version == SchemaVersion::Full {
        preimage.push_str(&info.parameters);
        preimage.push('\n');
    }
    preimage.push_str(&info.context);
    Hash256::from_bytes(keccak256(preimage.as_bytes()))
}

/// The newline-joined text witnesses sign.
///
/// Identifier and owner render as `0x`-prefixed lowercase hex; integers as
/// base-10 ASCII.
pub fn signing_message(claim: &CompleteClaimData) -> String {
    format!(
        "{}\n{}\n{}\n{}",
        claim.identifier, claim.owner, claim.timestamp_s, claim.epoch
    )
}

/// Derive the nullifier from a claim `context` document.
///
/// # Errors
///
/// [`ContextError::InvalidJson`] if the context does not parse,
/// [`ContextError::MissingField`] if `senderNickname` or `transactionDate`
/// is absent.
pub fn nullifier(context: &str) -> Result<Nullifier, ContextError> {
    let ctx = ClaimContext::parse(context)?;
    let params = &ctx.extracted_parameters;
    Ok(nullifier_from_parts(
        params.sender_nickname()?,
        params.transaction_date()?,
    ))
}

/// Nullifier from the two receipt fields that identify a real-world payment.
pub fn nullifier_from_parts(sender_nickname: &str, transaction_date: &str) -> Nullifier {
    let mut hasher = Keccak256::new();
    hasher.update(sender_nickname.as_bytes());
    hasher.update(transaction_date.as_bytes());
    let digest = hasher.finalize();
    let mut out = [0u8; 16];
    out.copy_from_slice(&digest[..16]);
    Nullifier::from_bytes(out)
}
