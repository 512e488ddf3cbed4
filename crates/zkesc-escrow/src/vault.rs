//! # Escrow Vault
//!
//! Holds deposited tokens and releases them against verified payment
//! proofs.
//!
//! ## Operations
//!
//! | Operation        | Caller     | Gate                                      |
//! |------------------|------------|-------------------------------------------|
//! | `deposit`        | anyone     | depositor balance                         |
//! | `withdraw`       | user       | proof + payment config + unused nullifier |
//! | `release`        | user       | prior verification by escrow witnesses    |
//! | `admin_withdraw` | admin only | none beyond vault balance                 |
//!
//! ## Atomicity
//!
//! Each operation holds the vault lock from its first check to its audit
//! record. `withdraw` runs every fallible check before the nullifier
//! claim; the claim is the last fallible step, and the transfer after it
//! cannot fail. `release` spends the user's verification through
//! [`VerificationLedger::spend`], so the entry is consumed only when the
//! transfer goes through.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zkesc_core::{AccountId, Hash256, Proof, SchemaVersion, Timestamp};
use zkesc_state::{Clock, LedgerError, SystemClock, VerificationLedger};
use zkesc_verifier::{IdentifierCheck, PaymentConfig};

use crate::accounts::TokenAccounts;
use crate::config::EscrowConfig;
use crate::error::EscrowError;

// ── Audit Trail ─────────────────────────────────────────────────────

/// Kind of vault movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Tokens moved into the vault.
    Deposit,
    /// Proof-gated withdrawal.
    Withdraw,
    /// Withdrawal against an earlier verification.
    Release,
    /// Admin override.
    AdminWithdraw,
}

impl TransactionKind {
    /// Stable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Withdraw => "withdraw",
            Self::Release => "release",
            Self::AdminWithdraw => "admin_withdraw",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One vault movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowTransaction {
    /// Unique id.
    pub id: Uuid,
    /// Movement kind.
    pub kind: TransactionKind,
    /// Depositor or recipient.
    pub account: AccountId,
    /// Tokens moved.
    pub amount: u64,
    /// When it happened.
    pub at: Timestamp,
    /// Claim that authorized a withdrawal or release.
    pub claim_identifier: Option<Hash256>,
    /// Vault balance after the movement.
    pub vault_balance: u64,
}

// ── Vault ───────────────────────────────────────────────────────────

#[derive(Debug)]
struct Vault {
    config: EscrowConfig,
    balance: u64,
    transactions: Vec<EscrowTransaction>,
}

impl Vault {
    fn ensure_covers(&self, amount: u64) -> Result<(), EscrowError> {
        if self.balance < amount {
            return Err(EscrowError::InsufficientFunds {
                account: "vault".to_string(),
                requested: amount,
                available: self.balance,
            });
        }
        Ok(())
    }

    fn record(
        &mut self,
        kind: TransactionKind,
        account: &AccountId,
        amount: u64,
        claim_identifier: Option<Hash256>,
        at: Timestamp,
    ) -> EscrowTransaction {
        let tx = EscrowTransaction {
            id: Uuid::new_v4(),
            kind,
            account: account.clone(),
            amount,
            at,
            claim_identifier,
            vault_balance: self.balance,
        };
        self.transactions.push(tx.clone());
        tracing::info!(
            kind = %kind,
            account = %account,
            amount,
            vault_balance = self.balance,
            "escrow transaction"
        );
        tx
    }
}

fn require_positive(operation: &'static str, amount: u64) -> Result<(), EscrowError> {
    // Reject zero amounts.
    if amount == 0 {
        return Err(EscrowError::InvalidInput {
            operation,
            reason: "amount must be positive".to_string(),
        });
    }
    Ok(())
}

/// Proof-gated token escrow.
pub struct Escrow {
    vault: Mutex<Option<Vault>>,
    accounts: Arc<dyn TokenAccounts>,
    ledger: Arc<VerificationLedger>,
    clock: Arc<dyn Clock>,
    schema_version: SchemaVersion,
    identifier_check: IdentifierCheck,
}

impl Escrow {
    /// Uninitialized escrow moving funds in `accounts` and spending
    /// verifications from `ledger`.
    pub fn new(ledger: Arc<VerificationLedger>, accounts: Arc<dyn TokenAccounts>) -> Self {
        Self {
            vault: Mutex::new(None),
            accounts,
            ledger,
            clock: Arc::new(SystemClock),
            schema_version: SchemaVersion::default(),
            identifier_check: IdentifierCheck::default(),
        }
    }

    /// Use `clock` for transaction timestamps.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Identifier schema and check policy for withdrawal proofs.
    pub fn with_validation_policy(
        mut self,
        schema_version: SchemaVersion,
        identifier_check: IdentifierCheck,
    ) -> Self {
        self.schema_version = schema_version;
        self.identifier_check = identifier_check;
        self
    }

    /// Create the vault. Allowed once.
    pub fn initialize(&self, config: EscrowConfig) -> Result<(), EscrowError> {
        config.validate()?;
        let mut vault = self.vault.lock();
        if vault.is_some() {
            return Err(EscrowError::AlreadyInitialized);
        }
        tracing::info!(
            admin = %config.admin(),
            threshold = config.required_threshold(),
            witnesses = config.expected_witnesses().len(),
            "escrow initialized"
        );
        *vault = Some(Vault {
            config,
            balance: 0,
            transactions: Vec::new(),
        });
        Ok(())
    }

    /// The escrow's config.
    pub fn config(&self) -> Result<EscrowConfig, EscrowError> {
        self.with_vault(|vault| vault.config.clone())
    }

    /// Tokens held by the vault.
    pub fn vault_balance(&self) -> Result<u64, EscrowError> {
        self.with_vault(|vault| vault.balance)
    }

    /// Audit trail, oldest first.
    pub fn transactions(&self) -> Result<Vec<EscrowTransaction>, EscrowError> {
        self.with_vault(|vault| vault.transactions.clone())
    }

    /// Move `amount` from `depositor` into the vault.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for zero, `InsufficientFunds` if the depositor cannot
    /// cover it.
    pub fn deposit(&self, depositor: &AccountId, amount: u64) -> Result<EscrowTransaction, EscrowError> {
        require_positive("deposit", amount)?;
        let mut guard = self.vault.lock();
        let vault = guard.as_mut().ok_or(EscrowError::NotInitialized)?;

        let new_balance = vault
            .balance
            .checked_add(amount)
            .ok_or_else(|| EscrowError::InvalidInput {
                operation: "deposit",
                reason: "vault balance would overflow".to_string(),
            })?;
        self.accounts.debit(depositor, amount)?;
        vault.balance = new_balance;
        Ok(vault.record(TransactionKind::Deposit, depositor, amount, None, self.clock.now()))
    }

    /// Verify `proof` against `payment`, claim its nullifier, and pay
    /// `amount` from the vault to `user`.
    ///
    /// # Errors
    ///
    /// Any verification error (`Ledger`), `WithdrawalAmountMismatch` when
    /// the binding rejects `amount`, `InsufficientFunds` when the vault is
    /// short. On error nothing changes; in particular the nullifier stays
    /// unclaimed.
    pub fn withdraw(
        &self,
        user: &AccountId,
        amount: u64,
        proof: &Proof,
        payment: &PaymentConfig,
    ) -> Result<EscrowTransaction, EscrowError> {
        require_positive("withdraw", amount)?;
        let mut guard = self.vault.lock();
        let vault = guard.as_mut().ok_or(EscrowError::NotInitialized)?;

        let validator = vault
            .config
            .validator(self.schema_version, self.identifier_check)?;
        let prepared = self.ledger.prepare(&validator, proof, user, Some(payment))?;
        vault
            .config
            .withdrawal_binding()
            .check(amount, prepared.payment_amount())?;
        vault.ensure_covers(amount)?;
        self.ensure_credit_fits("withdraw", user, amount)?;

        let grant = self.ledger.commit_consumed(prepared)?;
        vault.balance -= amount;
        self.accounts.credit(user, amount);
        Ok(vault.record(
            TransactionKind::Withdraw,
            user,
            amount,
            Some(*grant.claim_identifier()),
            self.clock.now(),
        ))
    }

    /// Pay `amount` to `user` against their unconsumed verification.
    ///
    /// The verification must have been attested by the escrow's own
    /// witnesses, at its threshold, whatever witness set it was verified
    /// under. It is consumed only if the payout succeeds.
    ///
    /// # Errors
    ///
    /// `Ledger` wrapping `AddressMismatch` or `InsufficientWitnesses` when
    /// the attesting witnesses do not satisfy the escrow config, plus the
    /// errors of [`withdraw`](Self::withdraw) after the proof check.
    pub fn release(&self, user: &AccountId, amount: u64) -> Result<EscrowTransaction, EscrowError> {
        require_positive("release", amount)?;
        let mut guard = self.vault.lock();
        let vault = guard.as_mut().ok_or(EscrowError::NotInitialized)?;
        let validator = vault
            .config
            .validator(self.schema_version, self.identifier_check)?;
        let binding = vault.config.withdrawal_binding();
        let now = self.clock.now();

        self.ledger.spend(user, |grant| {
            validator
                .check_attestation(grant.attested_by())
                .map_err(LedgerError::from)?;
            binding.check(amount, grant.payment_amount())?;
            vault.ensure_covers(amount)?;
            self.ensure_credit_fits("release", user, amount)?;
            vault.balance -= amount;
            self.accounts.credit(user, amount);
            Ok(vault.record(
                TransactionKind::Release,
                user,
                amount,
                Some(*grant.claim_identifier()),
                now,
            ))
        })
    }

    /// Pay `amount` from the vault to the admin. No proof required.
    ///
    /// # Errors
    ///
    /// `Unauthorized` unless `admin` is the configured admin.
    pub fn admin_withdraw(&self, admin: &AccountId, amount: u64) -> Result<EscrowTransaction, EscrowError> {
        require_positive("admin_withdraw", amount)?;
        let mut guard = self.vault.lock();
        let vault = guard.as_mut().ok_or(EscrowError::NotInitialized)?;

        if admin != vault.config.admin() {
            tracing::warn!(caller = %admin, "admin withdrawal by non-admin rejected");
            return Err(EscrowError::Unauthorized {
                caller: admin.clone(),
            });
        }
        vault.ensure_covers(amount)?;
        self.ensure_credit_fits("admin_withdraw", admin, amount)?;
        vault.balance -= amount;
        self.accounts.credit(admin, amount);
        Ok(vault.record(TransactionKind::AdminWithdraw, admin, amount, None, self.clock.now()))
    }

    fn ensure_credit_fits(
        &self,
        operation: &'static str,
        recipient: &AccountId,
        amount: u64,
    ) -> Result<(), EscrowError> {
        // Credits saturate; a payout that would saturate destroys tokens.
        if self.accounts.balance(recipient).checked_add(amount).is_none() {
            return Err(EscrowError::InvalidInput {
                operation,
                reason: "recipient balance would overflow".to_string(),
            });
        }
        Ok(())
    }

    fn with_vault<T>(&self, f: impl FnOnce(&Vault) -> T) -> Result<T, EscrowError> {
        self.vault
            .lock()
            .as_ref()
            .map(f)
            .ok_or(EscrowError::NotInitialized)
    }
}

impl std::fmt::Debug for Escrow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Escrow")
            .field("vault", &*self.vault.lock())
            .field("schema_version", &self.schema_version)
            .field("identifier_check", &self.identifier_check)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::InMemoryTokenAccounts;
    use crate::binding::WithdrawalBinding;
    use zkesc_core::{ClaimInfo, CompleteClaimData, SignedClaim};
    use zkesc_crypto::{WitnessKey, WitnessSigner};
    use zkesc_state::{
        InMemoryNullifierStore, InMemoryVerificationStore, LedgerError, NullifierRegistry,
        RegistryError,
    };
    use zkesc_verifier::{ClaimError, ClaimValidator};

    struct Fixture {
        witness: WitnessKey,
        accounts: Arc<InMemoryTokenAccounts>,
        ledger: Arc<VerificationLedger>,
        escrow: Escrow,
        payment: PaymentConfig,
    }

    fn account(s: &str) -> AccountId {
        AccountId::new(s).unwrap()
    }

    fn fixture(binding: WithdrawalBinding) -> Fixture {
        let witness = WitnessKey::generate();
        let registry = Arc::new(NullifierRegistry::new(Arc::new(InMemoryNullifierStore::new())));
        registry.initialize(&account("authority")).unwrap();
        let ledger = Arc::new(VerificationLedger::new(
            registry,
            Arc::new(InMemoryVerificationStore::new()),
        ));
        let accounts = Arc::new(InMemoryTokenAccounts::new());
        accounts.credit(&account("depositor"), 5_000);
        let escrow = Escrow::new(ledger.clone(), accounts.clone());
        escrow
            .initialize(EscrowConfig::new(account("admin"), 1, vec![witness.address()], binding).unwrap())
            .unwrap();
        let payment = PaymentConfig::new(account("authority"), "100002", 1000, "KRW").unwrap();
        Fixture {
            witness,
            accounts,
            ledger,
            escrow,
            payment,
        }
    }

    fn rate() -> WithdrawalBinding {
        WithdrawalBinding::rate(13, 1000).unwrap()
    }

    fn proof(witness: &WitnessKey, nickname: &str, amount: &str) -> Proof {
        let info = ClaimInfo {
            provider: "http".to_string(),
            parameters: String::new(),
            context: format!(
                r#"{{"extractedParameters":{{"receivingBankAccount":"100002","transactionAmount":"{amount}","senderNickname":"{nickname}","transactionDate":"2025-07-25 12:20:09"}}}}"#
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

    // ----- lifecycle -----

    #[test]
    fn uninitialized_escrow_rejects_operations() {
        let f = fixture(rate());
        let escrow = Escrow::new(f.ledger.clone(), f.accounts.clone());
        assert!(matches!(escrow.vault_balance(), Err(EscrowError::NotInitialized)));
        assert!(matches!(
            escrow.deposit(&account("depositor"), 1),
            Err(EscrowError::NotInitialized)
        ));
        assert!(matches!(
            escrow.admin_withdraw(&account("admin"), 1),
            Err(EscrowError::NotInitialized)
        ));
    }

    #[test]
    fn initialize_only_once() {
        let f = fixture(rate());
        let again = EscrowConfig::new(account("other"), 1, vec![f.witness.address()], rate()).unwrap();
        assert!(matches!(
            f.escrow.initialize(again),
            Err(EscrowError::AlreadyInitialized)
        ));
        assert_eq!(f.escrow.config().unwrap().admin(), &account("admin"));
    }

    // ----- deposit -----

    #[test]
    fn deposit_moves_tokens_into_vault() {
        let f = fixture(rate());
        let tx = f.escrow.deposit(&account("depositor"), 1000).unwrap();
        assert_eq!(tx.kind, TransactionKind::Deposit);
        assert_eq!(tx.vault_balance, 1000);
        assert_eq!(f.escrow.vault_balance().unwrap(), 1000);
        assert_eq!(f.accounts.balance(&account("depositor")), 4000);
    }

    #[test]
    fn deposit_rejects_zero_and_overdraft() {
        let f = fixture(rate());
        assert!(matches!(
            f.escrow.deposit(&account("depositor"), 0),
            Err(EscrowError::InvalidInput { operation: "deposit", .. })
        ));
        assert!(matches!(
            f.escrow.deposit(&account("depositor"), 5_001),
            Err(EscrowError::InsufficientFunds { available: 5_000, .. })
        ));
        assert_eq!(f.escrow.vault_balance().unwrap(), 0);
        assert!(f.escrow.transactions().unwrap().is_empty());
    }

    // ----- withdraw -----

    #[test]
    fn withdraw_pays_bound_amount_once() {
        let f = fixture(rate());
        f.escrow.deposit(&account("depositor"), 1000).unwrap();
        let user = account("alice");
        let p = proof(&f.witness, "anvil-1", "-1,000");

        let tx = f.escrow.withdraw(&user, 13, &p, &f.payment).unwrap();
        assert_eq!(tx.kind, TransactionKind::Withdraw);
        assert_eq!(tx.claim_identifier, Some(p.signed_claim.claim.identifier));
        assert_eq!(f.escrow.vault_balance().unwrap(), 987);
        assert_eq!(f.accounts.balance(&user), 13);
        assert!(f.ledger.get(&user).unwrap().is_used());

        let err = f.escrow.withdraw(&user, 13, &p, &f.payment).unwrap_err();
        assert!(matches!(
            err,
            EscrowError::Ledger(LedgerError::Registry(RegistryError::AlreadyUsed { .. }))
        ));
        assert_eq!(f.escrow.vault_balance().unwrap(), 987);
    }

    #[test]
    fn withdraw_amount_must_match_binding() {
        let f = fixture(rate());
        f.escrow.deposit(&account("depositor"), 1000).unwrap();
        let p = proof(&f.witness, "anvil-1", "-1,000");
        assert!(matches!(
            f.escrow.withdraw(&account("alice"), 500, &p, &f.payment),
            Err(EscrowError::WithdrawalAmountMismatch {
                requested: 500,
                expected: 13
            })
        ));
        // The nullifier stays unclaimed, so a correct retry succeeds.
        assert_eq!(f.ledger.registry().nullifier_count(), 0);
        assert!(f.escrow.withdraw(&account("alice"), 13, &p, &f.payment).is_ok());
    }

    #[test]
    fn unbound_withdraw_takes_caller_amount() {
        let f = fixture(WithdrawalBinding::Unbound);
        f.escrow.deposit(&account("depositor"), 1000).unwrap();
        let p = proof(&f.witness, "anvil-1", "-1,000");
        f.escrow.withdraw(&account("alice"), 600, &p, &f.payment).unwrap();
        assert_eq!(f.escrow.vault_balance().unwrap(), 400);
    }

    #[test]
    fn withdraw_beyond_vault_leaves_nullifier_unclaimed() {
        let f = fixture(WithdrawalBinding::Unbound);
        f.escrow.deposit(&account("depositor"), 10).unwrap();
        let p = proof(&f.witness, "anvil-1", "-1,000");
        assert!(matches!(
            f.escrow.withdraw(&account("alice"), 11, &p, &f.payment),
            Err(EscrowError::InsufficientFunds { requested: 11, available: 10, .. })
        ));
        assert_eq!(f.ledger.registry().nullifier_count(), 0);
    }

    #[test]
    fn withdraw_with_wrong_payment_amount_rejected() {
        let f = fixture(rate());
        f.escrow.deposit(&account("depositor"), 1000).unwrap();
        let p = proof(&f.witness, "anvil-1", "-999");
        assert!(matches!(
            f.escrow.withdraw(&account("alice"), 13, &p, &f.payment),
            Err(EscrowError::Ledger(LedgerError::Claim(ClaimError::PaymentMismatch { .. })))
        ));
        assert_eq!(f.escrow.vault_balance().unwrap(), 1000);
    }

    // ----- release -----

    #[test]
    fn release_spends_prior_verification() {
        let f = fixture(rate());
        f.escrow.deposit(&account("depositor"), 1000).unwrap();
        let user = account("alice");
        let validator = f
            .escrow
            .config()
            .unwrap()
            .validator(SchemaVersion::Full, IdentifierCheck::Enforce)
            .unwrap();
        f.ledger
            .verify(&validator, &proof(&f.witness, "anvil-1", "-1,000"), &user, Some(&f.payment))
            .unwrap();

        let tx = f.escrow.release(&user, 13).unwrap();
        assert_eq!(tx.kind, TransactionKind::Release);
        assert_eq!(f.accounts.balance(&user), 13);
        assert!(matches!(
            f.escrow.release(&user, 13),
            Err(EscrowError::Ledger(LedgerError::AlreadyConsumed { .. }))
        ));
    }

    #[test]
    fn failed_release_keeps_verification() {
        let f = fixture(rate());
        let user = account("alice");
        let validator = f
            .escrow
            .config()
            .unwrap()
            .validator(SchemaVersion::Full, IdentifierCheck::Enforce)
            .unwrap();
        f.ledger
            .verify(&validator, &proof(&f.witness, "anvil-1", "-1,000"), &user, Some(&f.payment))
            .unwrap();

        // Empty vault.
        assert!(matches!(
            f.escrow.release(&user, 13),
            Err(EscrowError::InsufficientFunds { .. })
        ));
        assert!(!f.ledger.get(&user).unwrap().is_used());

        f.escrow.deposit(&account("depositor"), 100).unwrap();
        assert!(f.escrow.release(&user, 13).is_ok());
    }

    #[test]
    fn release_without_verification() {
        let f = fixture(rate());
        f.escrow.deposit(&account("depositor"), 100).unwrap();
        assert!(matches!(
            f.escrow.release(&account("nobody"), 13),
            Err(EscrowError::Ledger(LedgerError::NotVerified { .. }))
        ));
    }

    #[test]
    fn release_rejects_verification_by_foreign_witnesses() {
        let f = fixture(WithdrawalBinding::Unbound);
        f.escrow.deposit(&account("depositor"), 1000).unwrap();
        let forger = WitnessKey::generate();
        let thief = account("thief");
        let forger_only = ClaimValidator::new(&[forger.address()], 1).unwrap();
        f.ledger
            .verify(&forger_only, &proof(&forger, "anvil-1", "-1,000"), &thief, Some(&f.payment))
            .unwrap();

        assert!(matches!(
            f.escrow.release(&thief, 1000),
            Err(EscrowError::Ledger(LedgerError::Claim(ClaimError::AddressMismatch { .. })))
        ));
        assert_eq!(f.escrow.vault_balance().unwrap(), 1000);
        assert_eq!(f.accounts.balance(&thief), 0);
        assert!(!f.ledger.get(&thief).unwrap().is_used());
    }

    #[test]
    fn release_accepts_superset_witness_set_containing_escrow_witness() {
        let f = fixture(rate());
        f.escrow.deposit(&account("depositor"), 1000).unwrap();
        let other = WitnessKey::generate();
        let user = account("alice");
        let wider = ClaimValidator::new(&[f.witness.address(), other.address()], 1).unwrap();
        f.ledger
            .verify(&wider, &proof(&f.witness, "anvil-1", "-1,000"), &user, Some(&f.payment))
            .unwrap();
        assert!(f.escrow.release(&user, 13).is_ok());
    }

    #[test]
    fn release_refuses_payout_that_would_overflow_recipient() {
        let f = fixture(rate());
        f.escrow.deposit(&account("depositor"), 1000).unwrap();
        let user = account("alice");
        f.accounts.credit(&user, u64::MAX - 1);
        let validator = f
            .escrow
            .config()
            .unwrap()
            .validator(SchemaVersion::Full, IdentifierCheck::Enforce)
            .unwrap();
        f.ledger
            .verify(&validator, &proof(&f.witness, "anvil-1", "-1,000"), &user, Some(&f.payment))
            .unwrap();

        assert!(matches!(
            f.escrow.release(&user, 13),
            Err(EscrowError::InvalidInput { operation: "release", .. })
        ));
        assert_eq!(f.escrow.vault_balance().unwrap(), 1000);
        assert_eq!(f.accounts.balance(&user), u64::MAX - 1);
        assert!(!f.ledger.get(&user).unwrap().is_used());
    }

    // ----- admin -----

    #[test]
    fn admin_withdraw_requires_admin() {
        let f = fixture(rate());
        f.escrow.deposit(&account("depositor"), 1000).unwrap();
        assert!(matches!(
            f.escrow.admin_withdraw(&account("mallory"), 1),
            Err(EscrowError::Unauthorized { .. })
        ));
        let tx = f.escrow.admin_withdraw(&account("admin"), 400).unwrap();
        assert_eq!(tx.kind, TransactionKind::AdminWithdraw);
        assert_eq!(f.escrow.vault_balance().unwrap(), 600);
        assert_eq!(f.accounts.balance(&account("admin")), 400);
        assert!(matches!(
            f.escrow.admin_withdraw(&account("admin"), 601),
            Err(EscrowError::InsufficientFunds { .. })
        ));
    }

    #[test]
    fn admin_withdraw_refuses_payout_that_would_overflow_admin() {
        let f = fixture(rate());
        f.escrow.deposit(&account("depositor"), 1000).unwrap();
        f.accounts.credit(&account("admin"), u64::MAX - 1);

        assert!(matches!(
            f.escrow.admin_withdraw(&account("admin"), 1000),
            Err(EscrowError::InvalidInput { operation: "admin_withdraw", .. })
        ));
        assert_eq!(f.escrow.vault_balance().unwrap(), 1000);
        assert_eq!(f.accounts.balance(&account("admin")), u64::MAX - 1);
        assert!(f.escrow.admin_withdraw(&account("admin"), 1).is_ok());
        assert_eq!(f.accounts.balance(&account("admin")), u64::MAX);
    }

    #[test]
    fn audit_trail_in_order() {
        let f = fixture(rate());
        f.escrow.deposit(&account("depositor"), 1000).unwrap();
        f.escrow
            .withdraw(&account("alice"), 13, &proof(&f.witness, "anvil-1", "-1,000"), &f.payment)
            .unwrap();
        f.escrow.admin_withdraw(&account("admin"), 87).unwrap();
        let kinds: Vec<_> = f
            .escrow
            .transactions()
            .unwrap()
            .iter()
            .map(|tx| (tx.kind, tx.vault_balance))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (TransactionKind::Deposit, 1000),
                (TransactionKind::Withdraw, 987),
                (TransactionKind::AdminWithdraw, 900),
            ]
        );
    }

    #[test]
    fn transaction_kind_names() {
        assert_eq!(TransactionKind::AdminWithdraw.as_str(), "admin_withdraw");
        assert_eq!(
            serde_json::to_string(&TransactionKind::Release).unwrap(),
            "\"release\""
        );
    }
}
