//! # Bootstrap Configuration
//!
//! [`ProtocolConfig`] describes one deployment: identifier mode, the
//! payment config to create, the registry and escrow authorities, and the
//! mint collection. Loaded from YAML or JSON and validated before
//! [`Protocol::bootstrap`](crate::Protocol::bootstrap) touches any store.
//!
//! ```yaml
//! schema_version: full
//! identifier_check: enforce
//! verification_ttl_secs: 300
//! log_filter: info
//! payment:
//!   authority: payment-authority
//!   recipient_bank_account: "100202642943(토스뱅크)"
//!   allowed_amount: 1000
//!   fiat_currency: KRW
//! nullifier_registry:
//!   authority: registry-authority
//! escrow:
//!   admin: escrow-admin
//!   required_threshold: 1
//!   expected_witnesses: ["0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"]
//!   withdrawal_binding: { numerator: 13, denominator: 1000 }
//! mint:
//!   collection_id: proof-of-payment
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use zkesc_core::{AccountId, SchemaVersion};
use zkesc_escrow::EscrowConfig;
use zkesc_verifier::{IdentifierCheck, PaymentConfig};

/// Errors loading or validating a [`ProtocolConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// YAML parse error.
    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parse error.
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    /// A section holds invalid values.
    #[error("invalid {section} config: {reason}")]
    Invalid {
        /// Top-level section name.
        section: &'static str,
        /// What was wrong.
        reason: String,
    },
}

/// Payment config created at bootstrap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSection {
    /// Owner of the config.
    pub authority: AccountId,
    /// Account that must receive the payment.
    pub recipient_bank_account: String,
    /// Payment magnitude required.
    pub allowed_amount: u64,
    /// ISO currency code.
    pub fiat_currency: String,
}

impl PaymentSection {
    /// As a validated [`PaymentConfig`].
    pub fn to_payment_config(&self) -> Result<PaymentConfig, ConfigError> {
        PaymentConfig::new(
            self.authority.clone(),
            self.recipient_bank_account.clone(),
            self.allowed_amount,
            self.fiat_currency.clone(),
        )
        .map_err(|e| ConfigError::Invalid {
            section: "payment",
            reason: e.to_string(),
        })
    }
}

/// Nullifier registry header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySection {
    /// Registry authority.
    pub authority: AccountId,
}

/// Mint collaborator settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintSection {
    /// Collection minted into.
    pub collection_id: String,
}

fn default_log_filter() -> String {
    "info".to_string()
}

/// Deployment configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProtocolConfig {
    /// Identifier preimage mode.
    #[serde(default)]
    pub schema_version: SchemaVersion,
    /// Whether the asserted identifier is recomputed and compared.
    #[serde(default)]
    pub identifier_check: IdentifierCheck,
    /// Verifications older than this cannot be spent. `None` = no expiry.
    #[serde(default)]
    pub verification_ttl_secs: Option<u64>,
    /// Default `tracing` filter.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// Payment config.
    pub payment: PaymentSection,
    /// Nullifier registry.
    pub nullifier_registry: RegistrySection,
    /// Escrow.
    pub escrow: EscrowConfig,
    /// Mint.
    pub mint: MintSection,
}

impl ProtocolConfig {
    /// Parse and validate YAML.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate JSON.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`: `.json` files as JSON, anything else as YAML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let config = if is_json {
            Self::from_json_str(&text)?
        } else {
            Self::from_yaml_str(&text)?
        };
        tracing::debug!(path = %path.display(), "loaded protocol config");
        Ok(config)
    }

    /// Check every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.payment.to_payment_config()?;
        self.escrow.validate().map_err(|e| ConfigError::Invalid {
            section: "escrow",
            reason: e.to_string(),
        })?;
        if self.mint.collection_id.trim().is_empty() {
            return Err(ConfigError::Invalid {
                section: "mint",
                reason: "collection_id must not be empty".to_string(),
            });
        }
        if self.verification_ttl_secs == Some(0) {
            return Err(ConfigError::Invalid {
                section: "verification_ttl_secs",
                reason: "must be positive when set".to_string(),
            });
        }
        Ok(())
    }
}
