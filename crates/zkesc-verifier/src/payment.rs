//! # Payment Configuration
//!
//! What a verified receipt must say for a proof to count as payment: the
//! recipient account, the exact amount, and the currency. One config
//! exists per authority; persistence lives in `zkesc-state`.
//!
//! Receipts record outgoing transfers as negative amounts (`"-1000"`), so
//! the amount comparison is on magnitude.

use serde::{Deserialize, Serialize};
use zkesc_core::{AccountId, ClaimInfo};

use crate::error::{ClaimError, PaymentField};

/// Fiat currencies accepted in a payment configuration.
pub const SUPPORTED_FIAT_CURRENCIES: &[&str] = &["KRW"];

/// Expected payment details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentConfig {
    authority: AccountId,
    recipient_bank_account: String,
    allowed_amount: u64,
    fiat_currency: String,
}

impl PaymentConfig {
    /// Build a validated config.
    ///
    /// # Errors
    ///
    /// [`ClaimError::InvalidPaymentConfig`] for an empty recipient account,
    /// zero amount, or unsupported currency.
    pub fn new(
        authority: AccountId,
        recipient_bank_account: impl Into<String>,
        allowed_amount: u64,
        fiat_currency: impl Into<String>,
    ) -> Result<Self, ClaimError> {
        let config = Self {
            authority,
            recipient_bank_account: recipient_bank_account.into(),
            allowed_amount,
            fiat_currency: fiat_currency.into(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Re-check the invariants, e.g. after deserialization.
    pub fn validate(&self) -> Result<(), ClaimError> {
        if self.recipient_bank_account.trim().is_empty() {
            return Err(ClaimError::InvalidPaymentConfig {
                field: "recipient_bank_account",
                reason: "must not be empty".to_string(),
            });
        }
        if self.allowed_amount == 0 {
            return Err(ClaimError::InvalidPaymentConfig {
                field: "allowed_amount",
                reason: "must be positive".to_string(),
            });
        }
        if !SUPPORTED_FIAT_CURRENCIES.contains(&self.fiat_currency.as_str()) {
            return Err(ClaimError::InvalidPaymentConfig {
                field: "fiat_currency",
                reason: format!(
                    "\"{}\" is not one of {:?}",
                    self.fiat_currency, SUPPORTED_FIAT_CURRENCIES
                ),
            });
        }
        Ok(())
    }

    /// The account allowed to update this config.
    pub fn authority(&self) -> &AccountId {
        &self.authority
    }

    /// Account the payment must be sent to.
    pub fn recipient_bank_account(&self) -> &str {
        &self.recipient_bank_account
    }

    /// Exact payment magnitude.
    pub fn allowed_amount(&self) -> u64 {
        self.allowed_amount
    }

    /// ISO currency code.
    pub fn fiat_currency(&self) -> &str {
        &self.fiat_currency
    }

    /// Compare a claim's receipt fields against this config.
    ///
    /// # Errors
    ///
    /// - [`ClaimError::Context`] if the context does not parse or lacks
    ///   `receivingBankAccount` / `transactionAmount`.
    /// - [`ClaimError::PaymentMismatch`] naming the first disagreeing field.
    pub fn check(&self, info: &ClaimInfo) -> Result<VerifiedPayment, ClaimError> {
        let ctx = info.parsed_context()?;
        let params = &ctx.extracted_parameters;

        let account = params.receiving_bank_account()?;
        if account != self.recipient_bank_account {
            return Err(ClaimError::PaymentMismatch {
                field: PaymentField::RecipientBankAccount,
                expected: self.recipient_bank_account.clone(),
                actual: account.to_string(),
            });
        }

        let amount = params.transaction_amount()?;
        if amount.magnitude() != self.allowed_amount {
            return Err(ClaimError::PaymentMismatch {
                field: PaymentField::Amount,
                expected: self.allowed_amount.to_string(),
                actual: amount.magnitude().to_string(),
            });
        }

        if let Some(currency) = amount.currency() {
            if currency != self.fiat_currency {
                return Err(ClaimError::PaymentMismatch {
                    field: PaymentField::Currency,
                    expected: self.fiat_currency.clone(),
                    actual: currency.to_string(),
                });
            }
        }

        Ok(VerifiedPayment {
            recipient_bank_account: self.recipient_bank_account.clone(),
            amount: amount.magnitude(),
            currency: self.fiat_currency.clone(),
        })
    }
}

/// Payment details a receipt was checked against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedPayment {
    /// Recipient account.
    pub recipient_bank_account: String,
    /// Payment magnitude.
    pub amount: u64,
    /// ISO currency code.
    pub currency: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCOUNT: &str = "100202642943(토스뱅크)";

    fn config() -> PaymentConfig {
        PaymentConfig::new(AccountId::new("authority").unwrap(), ACCOUNT, 1000, "KRW").unwrap()
    }

    fn claim(account: &str, amount: &str) -> ClaimInfo {
        ClaimInfo {
            provider: "http".to_string(),
            parameters: String::new(),
            context: serde_json::json!({
                "extractedParameters": {
                    "receivingBankAccount": account,
                    "senderNickname": "anvil-1",
                    "transactionAmount": amount,
                    "transactionDate": "2025-07-25 12:20:09"
                }
            })
            .to_string(),
        }
    }

    #[test]
    fn matching_receipt_passes() {
        let paid = config().check(&claim(ACCOUNT, "-1000")).unwrap();
        assert_eq!(paid.amount, 1000);
        assert_eq!(paid.currency, "KRW");
    }

    #[test]
    fn formatted_amounts_pass() {
        assert!(config().check(&claim(ACCOUNT, "-1,000")).is_ok());
        assert!(config().check(&claim(ACCOUNT, "1,000원")).is_ok());
    }

    #[test]
    fn wrong_amount_fails() {
        let err = config().check(&claim(ACCOUNT, "-999")).unwrap_err();
        assert!(matches!(
            err,
            ClaimError::PaymentMismatch {
                field: PaymentField::Amount,
                ..
            }
        ));
    }

    #[test]
    fn wrong_account_fails() {
        let err = config().check(&claim("123(other)", "-1000")).unwrap_err();
        assert!(matches!(
            err,
            ClaimError::PaymentMismatch {
                field: PaymentField::RecipientBankAccount,
                ..
            }
        ));
    }

    #[test]
    fn wrong_currency_marker_fails() {
        let err = config().check(&claim(ACCOUNT, "-1000 USD")).unwrap_err();
        assert!(matches!(
            err,
            ClaimError::PaymentMismatch {
                field: PaymentField::Currency,
                ..
            }
        ));
    }

    #[test]
    fn missing_amount_is_context_error() {
        let info = ClaimInfo {
            provider: "http".to_string(),
            parameters: String::new(),
            context: format!(r#"{{"extractedParameters":{{"receivingBankAccount":"{ACCOUNT}"}}}}"#),
        };
        assert!(matches!(
            config().check(&info),
            Err(ClaimError::Context(zkesc_core::ContextError::MissingField(
                "transactionAmount"
            )))
        ));
    }

    proptest::proptest! {
        #[test]
        fn any_other_amount_is_amount_mismatch(amount in 1u64..10_000_000) {
            proptest::prop_assume!(amount != 1000);
            let err = config().check(&claim(ACCOUNT, &format!("-{amount}"))).unwrap_err();
            let is_amount_mismatch = matches!(
                err,
                ClaimError::PaymentMismatch { field: PaymentField::Amount, .. }
            );
            proptest::prop_assert!(is_amount_mismatch);
        }
    }

    #[test]
    fn rejects_invalid_config() {
        let authority = AccountId::new("authority").unwrap();
        for (account, amount, currency, field) in [
            ("", 1000, "KRW", "recipient_bank_account"),
            (ACCOUNT, 0, "KRW", "allowed_amount"),
            (ACCOUNT, 1000, "USD", "fiat_currency"),
        ] {
            match PaymentConfig::new(authority.clone(), account, amount, currency) {
                Err(ClaimError::InvalidPaymentConfig { field: f, .. }) => assert_eq!(f, field),
                other => panic!("expected InvalidPaymentConfig for {field}, got {other:?}"),
            }
        }
    }
}
