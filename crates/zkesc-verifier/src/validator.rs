//! # Claim Validator
//!
//! Decides whether a [`Proof`] is accepted by an expected witness set:
//!
//! ```text
//! Pending ──identifier──▶ ──signature count──▶ ──recover & tally──▶ Verified
//!    │          │                  │                    │
//!    └──────────┴──────────────────┴────────────────────┴──────▶ Rejected
//! ```
//!
//! 1. Recompute the identifier from `claimInfo` and compare it with the
//!    asserted one (unless [`IdentifierCheck::Skip`]).
//! 2. Fewer signatures than the threshold is rejected before any recovery.
//! 3. Recover each signer over the signing message. A wrong-length
//!    signature rejects the proof; one that fails recovery is skipped.
//! 4. Count distinct recovered signers that are expected witnesses. None
//!    is [`ClaimError::AddressMismatch`]; some but below threshold is
//!    [`ClaimError::InsufficientWitnesses`].
//! 5. Optionally check receipt fields against a [`PaymentConfig`].
//!
//! The validator is pure: it reads the proof and its own configuration and
//! writes nothing. Persisting the outcome is the ledger's job.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use zkesc_core::{AccountId, EthAddress, Hash256, Proof, SchemaVersion};
use zkesc_crypto::{personal_message_hash, recover_prehashed, CryptoError};

use crate::error::ClaimError;
use crate::payment::{PaymentConfig, VerifiedPayment};

/// Whether the asserted identifier must equal the recomputed one.
///
/// Witness signatures cover only the identifier, so skipping the check
/// lets a caller pair valid signatures with arbitrary claim info.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierCheck {
    /// Reject proofs whose identifier does not hash from `claimInfo`.
    #[default]
    Enforce,
    /// Accept the asserted identifier as-is.
    Skip,
}

/// A proof that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedClaim {
    /// Claim identifier (recomputed when the check is enforced).
    pub identifier: Hash256,
    /// Claim owner.
    pub owner: EthAddress,
    /// Chain account that submitted the proof.
    pub caller: AccountId,
    /// Expected witnesses that signed, in address order.
    pub witnesses: Vec<EthAddress>,
    /// Present when payment details were checked.
    pub payment: Option<VerifiedPayment>,
}

/// Validates proofs against an expected witness set and threshold.
#[derive(Debug, Clone)]
pub struct ClaimValidator {
    expected_witnesses: BTreeSet<EthAddress>,
    required_threshold: u8,
    schema_version: SchemaVersion,
    identifier_check: IdentifierCheck,
}

impl ClaimValidator {
    /// Build a validator.
    ///
    /// Duplicate witnesses collapse; the threshold is checked against the
    /// distinct set.
    ///
    /// # Errors
    ///
    /// [`ClaimError::ThresholdOutOfRange`] if the threshold is zero or
    /// exceeds the number of distinct witnesses.
    pub fn new(expected_witnesses: &[EthAddress], required_threshold: u8) -> Result<Self, ClaimError> {
        let expected_witnesses: BTreeSet<EthAddress> = expected_witnesses.iter().copied().collect();
        if required_threshold == 0 || usize::from(required_threshold) > expected_witnesses.len() {
            return Err(ClaimError::ThresholdOutOfRange {
                threshold: required_threshold,
                witnesses: expected_witnesses.len(),
            });
        }
        Ok(Self {
            expected_witnesses,
            required_threshold,
            schema_version: SchemaVersion::default(),
            identifier_check: IdentifierCheck::default(),
        })
    }

    /// Set the identifier preimage mode.
    pub fn with_schema_version(mut self, version: SchemaVersion) -> Self {
        self.schema_version = version;
        self
    }

    /// Set the identifier check policy.
    pub fn with_identifier_check(mut self, check: IdentifierCheck) -> Self {
        self.identifier_check = check;
        self
    }

    /// Distinct expected witnesses.
    pub fn expected_witnesses(&self) -> impl Iterator<Item = &EthAddress> {
        self.expected_witnesses.iter()
    }

    /// Required number of distinct witness signatures.
    pub fn required_threshold(&self) -> u8 {
        self.required_threshold
    }

    /// Identifier preimage mode in use.
    pub fn schema_version(&self) -> SchemaVersion {
        self.schema_version
    }

    /// Signature-only verification.
    pub fn verify_signatures(&self, proof: &Proof, caller: &AccountId) -> Result<VerifiedClaim, ClaimError> {
        let identifier = self.check_identifier(proof)?;
        let witnesses = self.tally(proof)?;
        tracing::debug!(
            identifier = %identifier,
            matched = witnesses.len(),
            threshold = self.required_threshold,
            "claim signatures verified"
        );
        Ok(VerifiedClaim {
            identifier,
            owner: *proof.owner(),
            caller: caller.clone(),
            witnesses,
            payment: None,
        })
    }

    /// Signature verification followed by the payment-detail check.
    pub fn verify_with_payment(
        &self,
        proof: &Proof,
        caller: &AccountId,
        config: &PaymentConfig,
    ) -> Result<VerifiedClaim, ClaimError> {
        let mut verified = self.verify_signatures(proof, caller)?;
        let payment = config.check(&proof.claim_info).map_err(|e| {
            tracing::warn!(identifier = %verified.identifier, error = %e, "payment check failed");
            e
        })?;
        verified.payment = Some(payment);
        Ok(verified)
    }

    /// Apply this validator's witness rule to signers recovered earlier,
    /// e.g. the witnesses recorded with a ledger entry.
    ///
    /// # Errors
    ///
    /// [`ClaimError::AddressMismatch`] if none of `attested_by` is an
    /// expected witness, [`ClaimError::InsufficientWitnesses`] if fewer
    /// than the threshold are.
    pub fn check_attestation(&self, attested_by: &[EthAddress]) -> Result<Vec<EthAddress>, ClaimError> {
        let recovered: BTreeSet<EthAddress> = attested_by.iter().copied().collect();
        self.accept(&recovered)
    }

    fn check_identifier(&self, proof: &Proof) -> Result<Hash256, ClaimError> {
        let asserted = *proof.asserted_identifier();
        if self.identifier_check == IdentifierCheck::Skip {
            return Ok(asserted);
        }
        let computed = proof.claim_info.identifier(self.schema_version);
        if computed != asserted {
            tracing::warn!(%asserted, %computed, schema = %self.schema_version, "identifier mismatch");
            return Err(ClaimError::IdentifierMismatch { asserted, computed });
        }
        Ok(computed)
    }

    fn tally(&self, proof: &Proof) -> Result<Vec<EthAddress>, ClaimError> {
        let signatures = &proof.signed_claim.signatures;
        if signatures.len() < usize::from(self.required_threshold) {
            tracing::warn!(
                provided = signatures.len(),
                threshold = self.required_threshold,
                "too few signatures"
            );
            return Err(ClaimError::InsufficientSignatures {
                required: self.required_threshold,
                provided: signatures.len(),
            });
        }

        let hash = personal_message_hash(proof.signed_claim.claim.signing_message().as_bytes());
        let mut recovered = BTreeSet::new();
        for (index, signature) in signatures.iter().enumerate() {
            match recover_prehashed(&hash, signature.as_slice()) {
                Ok(signer) => {
                    tracing::debug!(index, %signer, "recovered witness signature");
                    recovered.insert(signer);
                }
                Err(CryptoError::InvalidSignatureLength(actual)) => {
                    tracing::warn!(index, actual, "signature has invalid length");
                    return Err(ClaimError::InvalidSignatureLength { index, actual });
                }
                Err(e) => {
                    tracing::debug!(index, error = %e, "skipping unrecoverable signature");
                }
            }
        }

        self.accept(&recovered)
    }

    fn accept(&self, recovered: &BTreeSet<EthAddress>) -> Result<Vec<EthAddress>, ClaimError> {
        let matched: Vec<EthAddress> = recovered
            .intersection(&self.expected_witnesses)
            .copied()
            .collect();
        if matched.is_empty() {
            tracing::warn!(recovered = recovered.len(), "no expected witness signed");
            return Err(ClaimError::AddressMismatch {
                recovered: recovered.len(),
            });
        }
        if matched.len() < usize::from(self.required_threshold) {
            tracing::warn!(
                matched = matched.len(),
                threshold = self.required_threshold,
                "witness threshold not met"
            );
            return Err(ClaimError::InsufficientWitnesses {
                required: self.required_threshold,
                matched: matched.len(),
            });
        }
        Ok(matched)
    }
}
