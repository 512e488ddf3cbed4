//! # Claim Context Schema
//!
//! The claim `context` is a JSON document produced by the attestor:
//!
//! ```json
//! {
//!   "extractedParameters": {
//!     "documentTitle": "송금확인증",
//!     "receivingBankAccount": "100202642943(토스뱅크)",
//!     "recipientName": "...",
//!     "senderNickname": "anvil-1",
//!     "transactionAmount": "-1000",
//!     "transactionDate": "2025-07-25 12:20:09"
//!   },
//!   "providerHash": "0x..."
//! }
//! ```
//!
//! Every receipt field is optional at parse time; consumers ask for the
//! fields they need through accessors that fail with
//! [`ContextError::MissingField`] naming the absent field. Unknown fields
//! are ignored so attestor upgrades that add fields stay compatible.

use serde::{Deserialize, Serialize};

use crate::amount::FiatAmount;
use crate::error::ContextError;

/// Payment-receipt fields extracted by the attestor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedParameters {
    /// Title of the receipt document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_title: Option<String>,
    /// Account that received the transfer, e.g. `"100202642943(토스뱅크)"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiving_bank_account: Option<String>,
    /// Display name of the recipient.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_name: Option<String>,
    /// Payer nickname as shown on the receipt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_nickname: Option<String>,
    /// Signed amount string; outgoing transfers are negative (`"-1,000"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_amount: Option<String>,
    /// Transfer date-time as printed on the receipt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_date: Option<String>,
}

fn required<'a>(value: &'a Option<String>, field: &'static str) -> Result<&'a str, ContextError> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ContextError::MissingField(field)),
    }
}

impl ExtractedParameters {
    /// `receivingBankAccount`, required.
    pub fn receiving_bank_account(&self) -> Result<&str, ContextError> {
        required(&self.receiving_bank_account, "receivingBankAccount")
    }

    /// `senderNickname`, required.
    pub fn sender_nickname(&self) -> Result<&str, ContextError> {
        required(&self.sender_nickname, "senderNickname")
    }

    /// `transactionDate`, required.
    pub fn transaction_date(&self) -> Result<&str, ContextError> {
        required(&self.transaction_date, "transactionDate")
    }

    /// `transactionAmount`, required and parsed.
    pub fn transaction_amount(&self) -> Result<FiatAmount, ContextError> {
        FiatAmount::parse(required(&self.transaction_amount, "transactionAmount")?)
    }
}

/// The parsed claim context document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimContext {
    /// Receipt fields.
    pub extracted_parameters: ExtractedParameters,
    /// Hash of the provider definition used by the attestor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_hash: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawContext {
    #[serde(default)]
    extracted_parameters: Option<ExtractedParameters>,
    #[serde(default)]
    provider_hash: Option<String>,
}

impl ClaimContext {
    /// Parse a context JSON document.
    ///
    /// # Errors
    ///
    /// [`ContextError::InvalidJson`] for malformed JSON or mistyped fields,
    /// [`ContextError::MissingField`] when `extractedParameters` is absent.
    pub fn parse(context: &str) -> Result<Self, ContextError> {
        let raw: RawContext = serde_json::from_str(context)?;
        let extracted_parameters = raw
            .extracted_parameters
            .ok_or(ContextError::MissingField("extractedParameters"))?;
        Ok(Self {
            extracted_parameters,
            provider_hash: raw.provider_hash,
        })
    }
}
