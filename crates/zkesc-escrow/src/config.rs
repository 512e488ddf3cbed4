//! # Escrow Configuration
//!
//! Fixed at `initialize` and immutable afterwards.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use zkesc_core::{AccountId, EthAddress, SchemaVersion};
use zkesc_verifier::{ClaimValidator, IdentifierCheck};

use crate::binding::WithdrawalBinding;
use crate::error::EscrowError;

/// Most expected witnesses an escrow accepts.
pub const MAX_WITNESSES: usize = 10;

/// Admin, witness set, threshold, and withdrawal binding of an escrow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowConfig {
    admin: AccountId,
    required_threshold: u8,
    expected_witnesses: Vec<EthAddress>,
    withdrawal_binding: WithdrawalBinding,
}

impl EscrowConfig {
    /// Build and validate a config.
    pub fn new(
        admin: AccountId,
        required_threshold: u8,
        expected_witnesses: Vec<EthAddress>,
        withdrawal_binding: WithdrawalBinding,
    ) -> Result<Self, EscrowError> {
        let config = Self {
            admin,
            required_threshold,
            expected_witnesses,
            withdrawal_binding,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check threshold and witness bounds.
    ///
    /// Needed after deserializing, which bypasses [`new`](Self::new).
    pub fn validate(&self) -> Result<(), EscrowError> {
        if self.required_threshold == 0 {
            return Err(EscrowError::InvalidConfig(
                "required_threshold must be positive".to_string(),
            ));
        }
        if self.expected_witnesses.is_empty() {
            return Err(EscrowError::InvalidConfig(
                "expected_witnesses must not be empty".to_string(),
            ));
        }
        if self.expected_witnesses.len() > MAX_WITNESSES {
            return Err(EscrowError::InvalidConfig(format!(
                "at most {MAX_WITNESSES} expected witnesses, got {}",
                self.expected_witnesses.len()
            )));
        }
        let distinct: BTreeSet<_> = self.expected_witnesses.iter().collect();
        if usize::from(self.required_threshold) > distinct.len() {
            return Err(EscrowError::InvalidConfig(format!(
                "required_threshold {} exceeds {} distinct witnesses",
                self.required_threshold,
                distinct.len()
            )));
        }
        if let WithdrawalBinding::Rate { denominator: 0, .. } = self.withdrawal_binding {
            return Err(EscrowError::InvalidConfig(
                "withdrawal binding denominator must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Escrow admin.
    pub fn admin(&self) -> &AccountId {
        &self.admin
    }

    /// Signatures required per withdrawal proof.
    pub fn required_threshold(&self) -> u8 {
        self.required_threshold
    }

    /// Witnesses whose signatures count.
    pub fn expected_witnesses(&self) -> &[EthAddress] {
        &self.expected_witnesses
    }

    /// Withdrawal amount binding.
    pub fn withdrawal_binding(&self) -> WithdrawalBinding {
        self.withdrawal_binding
    }

    /// Validator for withdrawal proofs under this config.
    pub fn validator(
        &self,
        schema_version: SchemaVersion,
        identifier_check: IdentifierCheck,
    ) -> Result<ClaimValidator, EscrowError> {
        let validator = ClaimValidator::new(&self.expected_witnesses, self.required_threshold)
            .map_err(|e| EscrowError::InvalidConfig(e.to_string()))?;
        Ok(validator
            .with_schema_version(schema_version)
            .with_identifier_check(identifier_check))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> AccountId {
        AccountId::new("admin").unwrap()
    }

    fn witnesses(n: u8) -> Vec<EthAddress> {
        (1..=n).map(|i| EthAddress::from_bytes([i; 20])).collect()
    }

    fn rate() -> WithdrawalBinding {
        WithdrawalBinding::rate(13, 1000).unwrap()
    }

    #[test]
    fn valid_config() {
        let config = EscrowConfig::new(admin(), 2, witnesses(3), rate()).unwrap();
        assert_eq!(config.admin(), &admin());
        assert_eq!(config.required_threshold(), 2);
        assert_eq!(config.expected_witnesses().len(), 3);
        let validator = config
            .validator(SchemaVersion::Compact, IdentifierCheck::Enforce)
            .unwrap();
        assert_eq!(validator.required_threshold(), 2);
        assert_eq!(validator.schema_version(), SchemaVersion::Compact);
    }

    #[test]
    fn zero_threshold_rejected() {
        assert!(matches!(
            EscrowConfig::new(admin(), 0, witnesses(1), rate()),
            Err(EscrowError::InvalidConfig(_))
        ));
    }

    #[test]
    fn empty_witnesses_rejected() {
        assert!(EscrowConfig::new(admin(), 1, Vec::new(), rate()).is_err());
    }

    #[test]
    fn too_many_witnesses_rejected() {
        assert!(EscrowConfig::new(admin(), 1, witnesses(10), rate()).is_ok());
        assert!(EscrowConfig::new(admin(), 1, witnesses(11), rate()).is_err());
    }

    #[test]
    fn threshold_counts_distinct_witnesses() {
        let mut dup = witnesses(1);
        dup.push(dup[0]);
        assert!(EscrowConfig::new(admin(), 2, dup, rate()).is_err());
        assert!(EscrowConfig::new(admin(), 4, witnesses(3), rate()).is_err());
    }

    #[test]
    fn deserialized_config_validates() {
        let yaml = r#"
admin: admin
required_threshold: 3
expected_witnesses:
  - "0x0101010101010101010101010101010101010101"
withdrawal_binding: unbound
"#;
        let config: EscrowConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_err());
    }
}
