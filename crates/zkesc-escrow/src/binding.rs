//! # Withdrawal Amount Binding
//!
//! Ties the amount a proof may withdraw to the payment it proves.
//!
//! - `Rate { numerator, denominator }`: the withdrawal must equal
//!   `floor(payment_amount * numerator / denominator)`.
//! - `Unbound`: a proof unlocks eligibility only and the caller picks the
//!   amount. Every unbound withdrawal logs a warning.
//!
//! Serialized as `{ numerator, denominator }` or the string `"unbound"`.

use serde::{Deserialize, Serialize};

use crate::error::EscrowError;

/// How a withdrawal amount relates to the validated payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "BindingRepr", into = "BindingRepr")]
pub enum WithdrawalBinding {
    /// Fixed exchange rate from payment magnitude to tokens.
    Rate {
        /// Multiplier.
        numerator: u64,
        /// Divisor, non-zero.
        denominator: u64,
    },
    /// No relation between payment and withdrawal.
    Unbound,
}

impl WithdrawalBinding {
    /// A rate binding.
    ///
    /// # Errors
    ///
    /// [`EscrowError::InvalidConfig`] for a zero denominator.
    pub fn rate(numerator: u64, denominator: u64) -> Result<Self, EscrowError> {
        if denominator == 0 {
            return Err(EscrowError::InvalidConfig(
                "withdrawal binding denominator must be non-zero".to_string(),
            ));
        }
        Ok(Self::Rate {
            numerator,
            denominator,
        })
    }

    /// Withdrawal amount implied by `payment_amount`, or `None` when unbound.
    pub fn expected_amount(&self, payment_amount: u64) -> Option<u64> {
        match *self {
            Self::Rate {
                numerator,
                denominator,
            } if denominator != 0 => {
                let scaled = u128::from(payment_amount) * u128::from(numerator)
                    / u128::from(denominator);
                Some(u64::try_from(scaled).unwrap_or(u64::MAX))
            }
            Self::Rate { .. } => Some(0),
            Self::Unbound => None,
        }
    }

    /// Check `requested` against the binding.
    pub fn check(&self, requested: u64, payment_amount: Option<u64>) -> Result<(), EscrowError> {
        if *self == Self::Unbound {
            tracing::warn!(requested, "withdrawal amount is not bound to the payment");
            return Ok(());
        }
        let payment_amount = payment_amount.ok_or(EscrowError::PaymentAmountUnavailable)?;
        match self.expected_amount(payment_amount) {
            Some(expected) if expected != requested => {
                tracing::warn!(requested, expected, payment_amount, "withdrawal amount mismatch");
                Err(EscrowError::WithdrawalAmountMismatch {
                    requested,
                    expected,
                })
            }
            _ => Ok(()),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum BindingRepr {
    Mode(String),
    Rate { numerator: u64, denominator: u64 },
}

impl TryFrom<BindingRepr> for WithdrawalBinding {
    type Error = EscrowError;

    fn try_from(repr: BindingRepr) -> Result<Self, Self::Error> {
        match repr {
            BindingRepr::Mode(mode) if mode == "unbound" => Ok(Self::Unbound),
            BindingRepr::Mode(mode) => Err(EscrowError::InvalidConfig(format!(
                "unknown withdrawal binding \"{mode}\""
            ))),
            BindingRepr::Rate {
                numerator,
                denominator,
            } => Self::rate(numerator, denominator),
        }
    }
}

impl From<WithdrawalBinding> for BindingRepr {
    fn from(binding: WithdrawalBinding) -> Self {
        match binding {
            WithdrawalBinding::Rate {
                numerator,
                denominator,
            } => BindingRepr::Rate {
                numerator,
                denominator,
            },
            WithdrawalBinding::Unbound => BindingRepr::Mode("unbound".to_string()),
        }
    }
}
