//! # Payment Config Registry
//!
//! One [`PaymentConfig`] per authority. Creation is create-if-absent;
//! replacement requires the signer to be the authority.

use std::sync::Arc;

use zkesc_core::AccountId;
use zkesc_verifier::PaymentConfig;

use crate::error::RegistryError;
use crate::store::PaymentConfigStore;

fn config_name(authority: &AccountId) -> String {
    format!("payment config for {authority}")
}

/// Payment configs keyed by authority.
pub struct PaymentConfigRegistry {
    store: Arc<dyn PaymentConfigStore>,
}

impl PaymentConfigRegistry {
    /// Registry over `store`.
    pub fn new(store: Arc<dyn PaymentConfigStore>) -> Self {
        Self { store }
    }

    /// Create the authority's config.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::InvalidPaymentConfig`] for invalid values.
    /// - [`RegistryError::AlreadyInitialized`] if the authority has one;
    ///   the existing config is left untouched.
    pub fn initialize(
        &self,
        authority: &AccountId,
        recipient_bank_account: &str,
        allowed_amount: u64,
        fiat_currency: &str,
    ) -> Result<PaymentConfig, RegistryError> {
        let config = PaymentConfig::new(
            authority.clone(),
            recipient_bank_account,
            allowed_amount,
            fiat_currency,
        )?;
        self.store
            .insert_if_absent(config.clone())
            .map_err(|_| RegistryError::AlreadyInitialized {
                what: config_name(authority),
            })?;
        tracing::info!(
            %authority,
            recipient = recipient_bank_account,
            allowed_amount,
            currency = fiat_currency,
            "payment config created"
        );
        Ok(config)
    }

    /// Replace `authority`'s config; only `signer == authority` may.
    pub fn update(
        &self,
        signer: &AccountId,
        authority: &AccountId,
        recipient_bank_account: &str,
        allowed_amount: u64,
        fiat_currency: &str,
    ) -> Result<PaymentConfig, RegistryError> {
        if signer != authority {
            tracing::warn!(%signer, %authority, "unauthorized payment config update");
            return Err(RegistryError::Unauthorized {
                signer: signer.clone(),
                authority: authority.clone(),
            });
        }
        let config = PaymentConfig::new(
            authority.clone(),
            recipient_bank_account,
            allowed_amount,
            fiat_currency,
        )?;
        self.store
            .replace(config.clone())
            .ok_or_else(|| RegistryError::NotInitialized {
                what: config_name(authority),
            })?;
        tracing::info!(%authority, allowed_amount, "payment config updated");
        Ok(config)
    }

    /// The authority's config.
    pub fn get(&self, authority: &AccountId) -> Result<PaymentConfig, RegistryError> {
        self.store
            .get(authority)
            .ok_or_else(|| RegistryError::NotInitialized {
                what: config_name(authority),
            })
    }
}

impl std::fmt::Debug for PaymentConfigRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentConfigRegistry").finish_non_exhaustive()
    }
}
