//! # Protocol Service
//!
//! One object exposing the logical entry points over injected stores:
//!
//! | Entry point                                   | Delegates to                  |
//! |-----------------------------------------------|-------------------------------|
//! | `initialize_payment_config` / `update_…`      | `PaymentConfigRegistry`       |
//! | `verify_proof_only`                           | `ClaimValidator`              |
//! | `verify_proof`                                | `VerificationLedger::verify`  |
//! | `mint_with_verified_proof`                    | ledger spend + `MintService`  |
//! | `escrow().{initialize,deposit,withdraw,…}`    | `Escrow`                      |
//! | `nullifier_registry().{initialize,mark,check}`| `NullifierRegistry`           |
//!
//! Proofs are always checked against the payment config owned by the
//! configured payment authority, never one chosen by the caller.
//!
//! `verify_proof` accepts any witness set the caller names, but a
//! recorded verification is only spendable (escrow release, mint) when
//! its attesting witnesses satisfy the configured escrow witnesses and
//! threshold.

use std::sync::Arc;

use zkesc_core::{AccountId, EthAddress, Nullifier, Proof};
use zkesc_escrow::{Escrow, EscrowConfig, EscrowTransaction, InMemoryTokenAccounts, TokenAccounts};
use zkesc_state::{
    Clock, InMemoryNullifierStore, InMemoryPaymentConfigStore, InMemoryVerificationStore,
    NullifierRecord, NullifierRegistry, NullifierStatus, NullifierStore, PaymentConfigRegistry,
    PaymentConfigStore, RegistryError, RegistryState, SystemClock, VerificationLedger,
    VerificationResult, VerificationStore,
};
use zkesc_verifier::{ClaimValidator, PaymentConfig, VerifiedClaim};

use crate::config::ProtocolConfig;
use crate::error::ProtocolError;
use crate::mint::{MintReceipt, MintService};

/// Backing stores, injected at bootstrap.
#[derive(Clone)]
pub struct Stores {
    /// Nullifier records.
    pub nullifiers: Arc<dyn NullifierStore>,
    /// Payment configs by authority.
    pub payment_configs: Arc<dyn PaymentConfigStore>,
    /// Latest verification per user.
    pub verifications: Arc<dyn VerificationStore>,
    /// Party token balances.
    pub accounts: Arc<dyn TokenAccounts>,
}

impl Stores {
    /// Fresh in-memory stores.
    pub fn in_memory() -> Self {
        Self {
            nullifiers: Arc::new(InMemoryNullifierStore::new()),
            payment_configs: Arc::new(InMemoryPaymentConfigStore::new()),
            verifications: Arc::new(InMemoryVerificationStore::new()),
            accounts: Arc::new(InMemoryTokenAccounts::new()),
        }
    }
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores").finish_non_exhaustive()
    }
}

/// The protocol's entry points.
pub struct Protocol {
    config: ProtocolConfig,
    registry: Arc<NullifierRegistry>,
    payment_configs: PaymentConfigRegistry,
    ledger: Arc<VerificationLedger>,
    escrow: Escrow,
    accounts: Arc<dyn TokenAccounts>,
    mint: Arc<dyn MintService>,
}

impl Protocol {
    /// Validate `config` and create the nullifier registry, payment config,
    /// and escrow it describes.
    pub fn bootstrap(
        config: ProtocolConfig,
        stores: Stores,
        mint: Arc<dyn MintService>,
    ) -> Result<Self, ProtocolError> {
        Self::bootstrap_with_clock(config, stores, mint, Arc::new(SystemClock))
    }

    /// [`bootstrap`](Self::bootstrap) with an explicit clock.
    pub fn bootstrap_with_clock(
        config: ProtocolConfig,
        stores: Stores,
        mint: Arc<dyn MintService>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ProtocolError> {
        config.validate()?;

        let registry = Arc::new(NullifierRegistry::with_clock(stores.nullifiers, clock.clone()));
        registry.initialize(&config.nullifier_registry.authority)?;

        let payment_configs = PaymentConfigRegistry::new(stores.payment_configs);
        let payment = &config.payment;
        match payment_configs.initialize(
            &payment.authority,
            &payment.recipient_bank_account,
            payment.allowed_amount,
            &payment.fiat_currency,
        ) {
            Ok(_) => {}
            // A persisted store may already hold the same config.
            Err(RegistryError::AlreadyInitialized { .. })
                if payment_configs.get(&payment.authority)? == payment.to_payment_config()? =>
            {
                tracing::info!(authority = %payment.authority, "payment config already present");
            }
            Err(e) => return Err(e.into()),
        }

        let ledger = Arc::new(
            VerificationLedger::new(registry.clone(), stores.verifications)
                .with_clock(clock.clone())
                .with_ttl(config.verification_ttl_secs),
        );
        let escrow = Escrow::new(ledger.clone(), stores.accounts.clone())
            .with_clock(clock)
            .with_validation_policy(config.schema_version, config.identifier_check);
        escrow.initialize(config.escrow.clone())?;

        tracing::info!(
            schema_version = %config.schema_version,
            ttl_secs = ?config.verification_ttl_secs,
            "protocol bootstrapped"
        );
        Ok(Self {
            config,
            registry,
            payment_configs,
            ledger,
            escrow,
            accounts: stores.accounts,
            mint,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    /// Verification ledger.
    pub fn ledger(&self) -> &VerificationLedger {
        &self.ledger
    }

    /// Token balance of `account`.
    pub fn balance(&self, account: &AccountId) -> u64 {
        self.accounts.balance(account)
    }

    // ── Payment config ──────────────────────────────────────────────

    /// Create `authority`'s payment config. Never overwrites.
    pub fn initialize_payment_config(
        &self,
        authority: &AccountId,
        recipient_bank_account: &str,
        allowed_amount: u64,
        fiat_currency: &str,
    ) -> Result<PaymentConfig, ProtocolError> {
        Ok(self.payment_configs.initialize(
            authority,
            recipient_bank_account,
            allowed_amount,
            fiat_currency,
        )?)
    }

    /// Replace `authority`'s payment config; `signer` must be `authority`.
    pub fn update_payment_config(
        &self,
        signer: &AccountId,
        authority: &AccountId,
        recipient_bank_account: &str,
        allowed_amount: u64,
        fiat_currency: &str,
    ) -> Result<PaymentConfig, ProtocolError> {
        Ok(self.payment_configs.update(
            signer,
            authority,
            recipient_bank_account,
            allowed_amount,
            fiat_currency,
        )?)
    }

    /// `authority`'s payment config.
    pub fn payment_config(&self, authority: &AccountId) -> Result<PaymentConfig, ProtocolError> {
        Ok(self.payment_configs.get(authority)?)
    }

    // ── Verification ────────────────────────────────────────────────

    /// Check witness signatures only. No state is read or written.
    pub fn verify_proof_only(
        &self,
        caller: &AccountId,
        proof: &Proof,
        expected_witnesses: &[EthAddress],
        threshold: u8,
    ) -> Result<VerifiedClaim, ProtocolError> {
        let validator = self.validator(expected_witnesses, threshold)?;
        Ok(validator.verify_signatures(proof, caller)?)
    }

    /// Full verification: signatures, payment details, nullifier claim,
    /// and an unconsumed ledger entry for `caller`.
    pub fn verify_proof(
        &self,
        caller: &AccountId,
        proof: &Proof,
        expected_witnesses: &[EthAddress],
        threshold: u8,
    ) -> Result<VerificationResult, ProtocolError> {
        let validator = self.validator(expected_witnesses, threshold)?;
        let payment = self.payment_configs.get(&self.config.payment.authority)?;
        Ok(self.ledger.verify(&validator, proof, caller, Some(&payment))?)
    }

    /// Spend `user`'s verification on one token from the mint. A failed
    /// mint leaves the verification unconsumed.
    ///
    /// Like escrow release, the verification must have been attested by
    /// the configured escrow witnesses at the configured threshold.
    pub fn mint_with_verified_proof(&self, user: &AccountId) -> Result<MintReceipt, ProtocolError> {
        let collection_id = &self.config.mint.collection_id;
        let policy = self
            .config
            .escrow
            .validator(self.config.schema_version, self.config.identifier_check)?;
        self.ledger.spend(user, |grant| {
            policy.check_attestation(grant.attested_by())?;
            self.mint
                .mint(collection_id, grant)
                .map_err(ProtocolError::from)
        })
    }

    // ── Escrow / registry handles ───────────────────────────────────

    /// Escrow operations.
    pub fn escrow(&self) -> EscrowHandle<'_> {
        EscrowHandle { protocol: self }
    }

    /// Nullifier registry operations.
    pub fn nullifier_registry(&self) -> RegistryHandle<'_> {
        RegistryHandle {
            registry: &self.registry,
        }
    }

    fn validator(
        &self,
        expected_witnesses: &[EthAddress],
        threshold: u8,
    ) -> Result<ClaimValidator, ProtocolError> {
        Ok(ClaimValidator::new(expected_witnesses, threshold)?
            .with_schema_version(self.config.schema_version)
            .with_identifier_check(self.config.identifier_check))
    }
}

impl std::fmt::Debug for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Protocol")
            .field("config", &self.config)
            .field("escrow", &self.escrow)
            .finish_non_exhaustive()
    }
}

/// Escrow entry points.
#[derive(Debug, Clone, Copy)]
pub struct EscrowHandle<'a> {
    protocol: &'a Protocol,
}

impl EscrowHandle<'_> {
    /// Create the escrow. Bootstrap already does; a second call is
    /// `AlreadyInitialized`.
    pub fn initialize(&self, config: EscrowConfig) -> Result<(), ProtocolError> {
        Ok(self.protocol.escrow.initialize(config)?)
    }

    /// Move `amount` from `depositor` into the vault.
    pub fn deposit(&self, depositor: &AccountId, amount: u64) -> Result<EscrowTransaction, ProtocolError> {
        Ok(self.protocol.escrow.deposit(depositor, amount)?)
    }

    /// Verify `proof` and pay `amount` to `user` in one operation.
    pub fn withdraw(&self, user: &AccountId, amount: u64, proof: &Proof) -> Result<EscrowTransaction, ProtocolError> {
        let payment = self
            .protocol
            .payment_configs
            .get(&self.protocol.config.payment.authority)?;
        Ok(self.protocol.escrow.withdraw(user, amount, proof, &payment)?)
    }

    /// Pay `amount` to `user` against an earlier `verify_proof`.
    pub fn release(&self, user: &AccountId, amount: u64) -> Result<EscrowTransaction, ProtocolError> {
        Ok(self.protocol.escrow.release(user, amount)?)
    }

    /// Admin override.
    pub fn admin_withdraw(&self, admin: &AccountId, amount: u64) -> Result<EscrowTransaction, ProtocolError> {
        Ok(self.protocol.escrow.admin_withdraw(admin, amount)?)
    }

    /// Vault balance.
    pub fn vault_balance(&self) -> Result<u64, ProtocolError> {
        Ok(self.protocol.escrow.vault_balance()?)
    }

    /// Audit trail.
    pub fn transactions(&self) -> Result<Vec<EscrowTransaction>, ProtocolError> {
        Ok(self.protocol.escrow.transactions()?)
    }
}

/// Nullifier registry entry points.
#[derive(Debug, Clone, Copy)]
pub struct RegistryHandle<'a> {
    registry: &'a NullifierRegistry,
}

impl RegistryHandle<'_> {
    /// Record the registry authority. Bootstrap already does.
    pub fn initialize(&self, authority: &AccountId) -> Result<RegistryState, ProtocolError> {
        Ok(self.registry.initialize(authority)?)
    }

    /// Claim `nullifier` for `claimant`.
    pub fn mark(&self, nullifier: Nullifier, claimant: &AccountId) -> Result<NullifierRecord, ProtocolError> {
        Ok(self.registry.mark(nullifier, claimant)?)
    }

    /// Used or unused.
    pub fn check(&self, nullifier: &Nullifier) -> Result<NullifierStatus, ProtocolError> {
        Ok(self.registry.check(nullifier)?)
    }

    /// Registry header.
    pub fn state(&self) -> Result<RegistryState, ProtocolError> {
        Ok(self.registry.state()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MintSection, PaymentSection, RegistrySection};
    use crate::error::ErrorKind;
    use crate::mint::{InMemoryMint, MintError};
    use zkesc_core::{ClaimInfo, CompleteClaimData, SchemaVersion, SignedClaim};
    use zkesc_crypto::{WitnessKey, WitnessSigner};
    use zkesc_escrow::WithdrawalBinding;
    use zkesc_state::VerificationGrant;
    use zkesc_verifier::IdentifierCheck;

    fn account(s: &str) -> AccountId {
        AccountId::new(s).unwrap()
    }

    fn config(witness: EthAddress) -> ProtocolConfig {
        ProtocolConfig {
            schema_version: SchemaVersion::Full,
            identifier_check: IdentifierCheck::Enforce,
            verification_ttl_secs: None,
            log_filter: "info".to_string(),
            payment: PaymentSection {
                authority: account("payment-authority"),
                recipient_bank_account: "100202642943(토스뱅크)".to_string(),
                allowed_amount: 1000,
                fiat_currency: "KRW".to_string(),
            },
            nullifier_registry: RegistrySection {
                authority: account("registry-authority"),
            },
            escrow: EscrowConfig::new(
                account("escrow-admin"),
                1,
                vec![witness],
                WithdrawalBinding::rate(13, 1000).unwrap(),
            )
            .unwrap(),
            mint: MintSection {
                collection_id: "proof-of-payment".to_string(),
            },
        }
    }

    fn proof(witness: &WitnessKey, amount: &str) -> Proof {
        let info = ClaimInfo {
            provider: "http".to_string(),
            parameters: String::new(),
            context: format!(
                r#"{{"extractedParameters":{{"receivingBankAccount":"100202642943(토스뱅크)","transactionAmount":"{amount}","senderNickname":"anvil-1","transactionDate":"2025-07-25 12:20:09"}}}}"#
            ),
        };
        let claim = CompleteClaimData {
            identifier: info.identifier(SchemaVersion::Full),
            owner: witness.address(),
            timestamp_s: 1_753_410_009,
            epoch: 1,
        };
        let signatures = vec![witness.sign_claim(&claim).unwrap()];
        Proof {
            claim_info: info,
            signed_claim: SignedClaim { claim, signatures },
            is_appclip_proof: false,
            expected_witness: None,
        }
    }

    struct BrokenMint;

    impl MintService for BrokenMint {
        fn mint(&self, collection_id: &str, _grant: &VerificationGrant) -> Result<MintReceipt, MintError> {
            Err(MintError {
                collection_id: collection_id.to_string(),
                reason: "offline".to_string(),
            })
        }
    }

    #[test]
    fn bootstrap_initializes_everything_once() {
        let witness = WitnessKey::generate();
        let protocol = Protocol::bootstrap(
            config(witness.address()),
            Stores::in_memory(),
            Arc::new(InMemoryMint::new()),
        )
        .unwrap();
        assert_eq!(
            protocol.nullifier_registry().state().unwrap().authority,
            account("registry-authority")
        );
        assert_eq!(protocol.escrow().vault_balance().unwrap(), 0);
        assert_eq!(
            protocol
                .nullifier_registry()
                .initialize(&account("other"))
                .unwrap_err()
                .kind(),
            ErrorKind::AlreadyInitialized
        );
        assert_eq!(
            protocol
                .escrow()
                .initialize(config(witness.address()).escrow)
                .unwrap_err()
                .kind(),
            ErrorKind::AlreadyInitialized
        );
    }

    #[test]
    fn bootstrap_over_existing_identical_payment_config() {
        let witness = WitnessKey::generate();
        let stores = Stores::in_memory();
        Protocol::bootstrap(config(witness.address()), stores.clone(), Arc::new(InMemoryMint::new()))
            .unwrap();
        let restart = Stores {
            nullifiers: Arc::new(InMemoryNullifierStore::new()),
            ..stores
        };
        assert!(Protocol::bootstrap(config(witness.address()), restart, Arc::new(InMemoryMint::new())).is_ok());
    }

    #[test]
    fn verify_then_mint_once() {
        let witness = WitnessKey::generate();
        let mint = Arc::new(InMemoryMint::new());
        let protocol =
            Protocol::bootstrap(config(witness.address()), Stores::in_memory(), mint.clone()).unwrap();
        let user = account("alice");

        protocol
            .verify_proof(&user, &proof(&witness, "-1000"), &[witness.address()], 1)
            .unwrap();
        let receipt = protocol.mint_with_verified_proof(&user).unwrap();
        assert_eq!(receipt.recipient, user);
        assert_eq!(mint.tokens_of(&user).len(), 1);

        let err = protocol.mint_with_verified_proof(&user).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyUsed);
        assert_eq!(mint.minted(), 1);
    }

    #[test]
    fn failed_mint_keeps_verification() {
        let witness = WitnessKey::generate();
        let protocol =
            Protocol::bootstrap(config(witness.address()), Stores::in_memory(), Arc::new(BrokenMint)).unwrap();
        let user = account("alice");
        protocol
            .verify_proof(&user, &proof(&witness, "-1000"), &[witness.address()], 1)
            .unwrap();
        let err = protocol.mint_with_verified_proof(&user).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MintFailed);
        assert!(!protocol.ledger().get(&user).unwrap().is_used());
    }

    #[test]
    fn mint_requires_configured_witnesses() {
        let witness = WitnessKey::generate();
        let forger = WitnessKey::generate();
        let mint = Arc::new(InMemoryMint::new());
        let protocol =
            Protocol::bootstrap(config(witness.address()), Stores::in_memory(), mint.clone()).unwrap();
        let user = account("mallory");
        protocol
            .verify_proof(&user, &proof(&forger, "-1000"), &[forger.address()], 1)
            .unwrap();

        let err = protocol.mint_with_verified_proof(&user).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AddressMismatch);
        assert_eq!(mint.minted(), 0);
        assert!(!protocol.ledger().get(&user).unwrap().is_used());
    }

    #[test]
    fn mint_without_verification() {
        let witness = WitnessKey::generate();
        let protocol = Protocol::bootstrap(
            config(witness.address()),
            Stores::in_memory(),
            Arc::new(InMemoryMint::new()),
        )
        .unwrap();
        assert_eq!(
            protocol
                .mint_with_verified_proof(&account("nobody"))
                .unwrap_err()
                .kind(),
            ErrorKind::NotVerified
        );
    }

    #[test]
    fn verify_proof_only_leaves_no_state() {
        let witness = WitnessKey::generate();
        let protocol = Protocol::bootstrap(
            config(witness.address()),
            Stores::in_memory(),
            Arc::new(InMemoryMint::new()),
        )
        .unwrap();
        let p = proof(&witness, "-1000");
        protocol
            .verify_proof_only(&account("alice"), &p, &[witness.address()], 1)
            .unwrap();
        protocol
            .verify_proof_only(&account("alice"), &p, &[witness.address()], 1)
            .unwrap();
        assert_eq!(protocol.nullifier_registry().state().unwrap().nullifier_count, 0);
        assert!(protocol.ledger().get(&account("alice")).is_none());
    }

    #[test]
    fn release_after_verify() {
        let witness = WitnessKey::generate();
        let stores = Stores::in_memory();
        stores.accounts.credit(&account("depositor"), 1000);
        let protocol =
            Protocol::bootstrap(config(witness.address()), stores, Arc::new(InMemoryMint::new())).unwrap();
        let user = account("alice");
        protocol.escrow().deposit(&account("depositor"), 1000).unwrap();
        protocol
            .verify_proof(&account("alice"), &proof(&witness, "-1000"), &[witness.address()], 1)
            .unwrap();
        protocol.escrow().release(&user, 13).unwrap();
        assert_eq!(protocol.balance(&user), 13);
        assert_eq!(protocol.escrow().vault_balance().unwrap(), 987);
    }

    #[test]
    fn payment_config_update_by_non_authority() {
        let witness = WitnessKey::generate();
        let protocol = Protocol::bootstrap(
            config(witness.address()),
            Stores::in_memory(),
            Arc::new(InMemoryMint::new()),
        )
        .unwrap();
        let authority = account("payment-authority");
        let err = protocol
            .update_payment_config(&account("mallory"), &authority, "999", 1, "KRW")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        let updated = protocol
            .update_payment_config(&authority, &authority, "100002", 2000, "KRW")
            .unwrap();
        assert_eq!(protocol.payment_config(&authority).unwrap(), updated);
    }
}
