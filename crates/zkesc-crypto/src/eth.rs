//! # Ethereum Personal-Message Recovery
//!
//! Witnesses sign claims with the Ethereum `personal_sign` scheme:
//!
//! ```text
//! hash = keccak256("\x19Ethereum Signed Message:\n" || len(message) || message)
//! sig  = r(32) || s(32) || v(1),  v ∈ {27, 28}
//! ```
//!
//! `len(message)` is the decimal byte length. Recovery normalises `v` to
//! the curve recovery id (`v - 27`), recovers the secp256k1 public key, and
//! derives the address as the last 20 bytes of the Keccak-256 of the
//! uncompressed point without its `0x04` tag.
//!
//! ## Security Invariant
//!
//! High-`s` signatures are rejected by the curve backend, so each message
//! has exactly one accepted encoding per signer.

use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use zkesc_core::{keccak256, EthAddress, SIGNATURE_LENGTH};

use crate::error::CryptoError;

/// Prefix prepended by `personal_sign` before the decimal message length.
pub const PERSONAL_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n";

/// Offset between Ethereum `v` and the curve recovery id.
pub const ETH_RECOVERY_OFFSET: u8 = 27;

/// Keccak-256 of the `personal_sign` envelope around `message`.
pub fn personal_message_hash(message: &[u8]) -> [u8; 32] {
    let len = message.len().to_string();
    let mut envelope = Vec::with_capacity(PERSONAL_MESSAGE_PREFIX.len() + len.len() + message.len());
    envelope.extend_from_slice(PERSONAL_MESSAGE_PREFIX);
    envelope.extend_from_slice(len.as_bytes());
    envelope.extend_from_slice(message);
    keccak256(&envelope)
}

/// Ethereum address of a secp256k1 public key.
pub fn address_from_verifying_key(key: &VerifyingKey) -> EthAddress {
    let point = key.to_encoded_point(false);
    let digest = keccak256(&point.as_bytes()[1..]);
    let mut out = [0u8; 20];
    out.copy_from_slice(&digest[12..]);
    EthAddress::from_bytes(out)
}

/// Recover the address that signed `message` under `personal_sign`.
///
/// # Errors
///
/// - [`CryptoError::InvalidSignatureLength`] unless `signature` is 65 bytes.
/// - [`CryptoError::InvalidRecoveryId`] unless `v` is 27 or 28.
/// - [`CryptoError::RecoveryFailed`] if `r`/`s` are not valid scalars or no
///   key recovers.
pub fn recover_signer(message: &str, signature: &[u8]) -> Result<EthAddress, CryptoError> {
    recover_prehashed(&personal_message_hash(message.as_bytes()), signature)
}

/// Recover the signer of an already-hashed message.
pub fn recover_prehashed(hash: &[u8; 32], signature: &[u8]) -> Result<EthAddress, CryptoError> {
    if signature.len() != SIGNATURE_LENGTH {
        return Err(CryptoError::InvalidSignatureLength(signature.len()));
    }
    let v = signature[64];
    let recovery_id = v
        .checked_sub(ETH_RECOVERY_OFFSET)
        .filter(|id| *id <= 1)
        .and_then(RecoveryId::from_byte)
        .ok_or(CryptoError::InvalidRecoveryId(v))?;

    let sig = Signature::from_slice(&signature[..64])
        .map_err(|e| CryptoError::RecoveryFailed(e.to_string()))?;
    let key = VerifyingKey::recover_from_prehash(hash, &sig, recovery_id)
        .map_err(|e| CryptoError::RecoveryFailed(e.to_string()))?;

    let address = address_from_verifying_key(&key);
    tracing::trace!(signer = %address, v, "recovered signer");
    Ok(address)
}
