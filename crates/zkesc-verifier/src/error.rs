//! # Claim Validation Errors

use thiserror::Error;
use zkesc_core::{ContextError, Hash256};

/// The receipt field a payment check compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentField {
    /// `receivingBankAccount` vs. the configured recipient.
    RecipientBankAccount,
    /// Magnitude of `transactionAmount` vs. the allowed amount.
    Amount,
    /// Currency marker on `transactionAmount` vs. the configured currency.
    Currency,
}

impl PaymentField {
    /// Stable field name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RecipientBankAccount => "recipient_bank_account",
            Self::Amount => "amount",
            Self::Currency => "currency",
        }
    }
}

impl std::fmt::Display for PaymentField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasons a proof is rejected.
#[derive(Error, Debug)]
pub enum ClaimError {
    /// The asserted identifier is not the hash of the submitted claim info.
    #[error("identifier mismatch: proof asserts {asserted}, claim info hashes to {computed}")]
    IdentifierMismatch {
        /// Identifier inside the signed claim.
        asserted: Hash256,
        /// Identifier recomputed from `claimInfo`.
        computed: Hash256,
    },

    /// A signature is not 65 bytes.
    #[error("signature {index} has invalid length: expected 65 bytes, got {actual}")]
    InvalidSignatureLength {
        /// Position in `signedClaim.signatures`.
        index: usize,
        /// Length received.
        actual: usize,
    },

    /// Threshold is zero or exceeds the distinct witness count.
    #[error("invalid threshold {threshold} for {witnesses} expected witnesses")]
    ThresholdOutOfRange {
        /// Requested threshold.
        threshold: u8,
        /// Distinct expected witnesses.
        witnesses: usize,
    },

    /// Fewer signatures than the threshold were submitted.
    #[error("insufficient signatures: threshold {required}, proof carries {provided}")]
    InsufficientSignatures {
        /// Required threshold.
        required: u8,
        /// Signatures in the proof.
        provided: usize,
    },

    /// Some, but not enough, expected witnesses signed.
    #[error("insufficient witness signatures: threshold {required}, matched {matched}")]
    InsufficientWitnesses {
        /// Required threshold.
        required: u8,
        /// Distinct expected witnesses recovered.
        matched: usize,
    },

    /// No recovered signer is an expected witness.
    #[error("address mismatch: none of {recovered} recovered signers is an expected witness")]
    AddressMismatch {
        /// Distinct signers recovered from the proof.
        recovered: usize,
    },

    /// A receipt field disagrees with the payment configuration.
    #[error("payment mismatch on {field}: expected \"{expected}\", got \"{actual}\"")]
    PaymentMismatch {
        /// Which field disagreed.
        field: PaymentField,
        /// Configured value.
        expected: String,
        /// Value found in the receipt.
        actual: String,
    },

    /// Payment configuration values are invalid.
    #[error("invalid payment config: {field} {reason}")]
    InvalidPaymentConfig {
        /// Offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// The claim context could not be interpreted.
    #[error(transparent)]
    Context(#[from] ContextError),
}
