//! # Witness Signing
//!
//! A witness attests to a claim by signing its signing message with
//! `personal_sign`. [`WitnessSigner`] abstracts the key backend so attestor
//! tooling can plug in an HSM while tests use an in-memory [`WitnessKey`].
//!
//! ## Security Invariants
//!
//! - Secret keys are never serialized or printed. `WitnessKey`'s `Debug`
//!   shows only the address.
//! - Hex key material is decoded into a zeroizing buffer.
//! - Produced signatures are low-`s` with `v ∈ {27, 28}`.

use k256::ecdsa::SigningKey;
use zeroize::Zeroizing;
use zkesc_core::{CompleteClaimData, EthAddress, SignatureBytes, SIGNATURE_LENGTH};

use crate::error::CryptoError;
use crate::eth::{address_from_verifying_key, personal_message_hash, ETH_RECOVERY_OFFSET};

/// A backend able to produce witness attestations.
pub trait WitnessSigner: Send + Sync {
    /// Address the signatures recover to.
    fn address(&self) -> EthAddress;

    /// Sign `message` under `personal_sign`.
    fn sign_message(&self, message: &str) -> Result<SignatureBytes, CryptoError>;

    /// Sign the canonical signing message of `claim`.
    fn sign_claim(&self, claim: &CompleteClaimData) -> Result<SignatureBytes, CryptoError> {
        self.sign_message(&claim.signing_message())
    }

    /// Backend name for diagnostics.
    fn signer_name(&self) -> &str;
}

/// In-memory secp256k1 witness key.
pub struct WitnessKey {
    key: SigningKey,
    address: EthAddress,
}

impl WitnessKey {
    /// Generate a key from the OS CSPRNG.
    pub fn generate() -> Self {
        Self::from_signing_key(SigningKey::random(&mut rand_core::OsRng))
    }

    /// From a raw 32-byte secret scalar.
    pub fn from_bytes(secret: &[u8; 32]) -> Result<Self, CryptoError> {
        let key = SigningKey::from_slice(secret)
            .map_err(|e| CryptoError::InvalidSigningKey(e.to_string()))?;
        Ok(Self::from_signing_key(key))
    }

    /// From a 64-character hex secret, `0x` prefix optional.
    pub fn from_hex(secret: &str) -> Result<Self, CryptoError> {
        let trimmed = secret.trim();
        let stripped = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = Zeroizing::new(
            hex::decode(stripped).map_err(|e| CryptoError::InvalidSigningKey(e.to_string()))?,
        );
        if bytes.len() != 32 {
            return Err(CryptoError::InvalidSigningKey(format!(
                "expected 32 bytes, got {}",
                bytes.len()
            )));
        }
        let key = SigningKey::from_slice(&bytes)
            .map_err(|e| CryptoError::InvalidSigningKey(e.to_string()))?;
        Ok(Self::from_signing_key(key))
    }

    fn from_signing_key(key: SigningKey) -> Self {
        let address = address_from_verifying_key(key.verifying_key());
        Self { key, address }
    }
}

impl WitnessSigner for WitnessKey {
    fn address(&self) -> EthAddress {
        self.address
    }

    fn sign_message(&self, message: &str) -> Result<SignatureBytes, CryptoError> {
        let hash = personal_message_hash(message.as_bytes());
        let (sig, recovery_id) = self
            .key
            .sign_prehash_recoverable(&hash)
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;
        let mut out = [0u8; SIGNATURE_LENGTH];
        out[..64].copy_from_slice(&sig.to_bytes());
        out[64] = recovery_id.to_byte() + ETH_RECOVERY_OFFSET;
        Ok(SignatureBytes::from(out))
    }

    fn signer_name(&self) -> &str {
        "WitnessKey"
    }
}

impl std::fmt::Debug for WitnessKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WitnessKey({}, <private>)", self.address)
    }
}
