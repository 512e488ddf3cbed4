//! # Verification Ledger
//!
//! Records, per user, the latest successful verification and hands out a
//! single-use [`VerificationGrant`] when that verification is spent.
//!
//! ## Lifecycle
//!
//! ```text
//! verify ──▶ Unconsumed ──consume/spend──▶ Consumed
//!   ▲                                         │
//!   └──────── verify (new proof) ◀────────────┘
//! ```
//!
//! A new verification overwrites the user's entry (last write wins).
//! A consumed entry cannot be consumed again.
//!
//! ## Atomicity
//!
//! `verify` = pure validation, then nullifier claim, then entry write.
//! The nullifier claim is the only fallible step with side effects, and
//! the entry write that follows cannot fail, so a rejected proof leaves no
//! trace and an accepted one is always recorded.
//!
//! [`VerificationLedger::spend`] runs the caller's action while holding the
//! user's entry and marks it consumed only if the action succeeds.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use zkesc_core::{AccountId, EthAddress, Hash256, Nullifier, Proof, Timestamp};
use zkesc_verifier::{ClaimError, ClaimValidator, PaymentConfig, VerifiedClaim};

use crate::clock::{Clock, SystemClock};
use crate::error::LedgerError;
use crate::nullifier::NullifierRegistry;
use crate::store::VerificationStore;

/// Whether a ledger entry has been spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    /// Available for one spend.
    Unconsumed,
    /// Spent.
    Consumed,
}

impl VerificationStatus {
    /// Stable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unconsumed => "unconsumed",
            Self::Consumed => "consumed",
        }
    }
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user's latest verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    user: AccountId,
    verified_at: Timestamp,
    claim_identifier: Hash256,
    owner: EthAddress,
    nullifier: Nullifier,
    payment_amount: Option<u64>,
    attested_by: Vec<EthAddress>,
    status: VerificationStatus,
}

impl VerificationResult {
    /// Account the verification was recorded for.
    pub fn user(&self) -> &AccountId {
        &self.user
    }

    /// When it was recorded.
    pub fn verified_at(&self) -> Timestamp {
        self.verified_at
    }

    /// Claim identifier.
    pub fn claim_identifier(&self) -> &Hash256 {
        &self.claim_identifier
    }

    /// Claim owner.
    pub fn owner(&self) -> &EthAddress {
        &self.owner
    }

    /// Nullifier claimed by the verification.
    pub fn nullifier(&self) -> &Nullifier {
        &self.nullifier
    }

    /// Validated payment magnitude, when payment details were checked.
    pub fn payment_amount(&self) -> Option<u64> {
        self.payment_amount
    }

    /// Expected witnesses whose signatures carried the verification.
    pub fn attested_by(&self) -> &[EthAddress] {
        &self.attested_by
    }

    /// Spend status.
    pub fn status(&self) -> VerificationStatus {
        self.status
    }

    /// Whether the entry has been spent.
    pub fn is_used(&self) -> bool {
        self.status == VerificationStatus::Consumed
    }
}

/// Single-use authorization produced by spending a verification.
///
/// Only this crate constructs grants, and they cannot be cloned, so
/// holding one proves a ledger entry was consumed for it.
#[derive(Debug)]
pub struct VerificationGrant {
    user: AccountId,
    claim_identifier: Hash256,
    owner: EthAddress,
    nullifier: Nullifier,
    payment_amount: Option<u64>,
    attested_by: Vec<EthAddress>,
    verified_at: Timestamp,
}

impl VerificationGrant {
    fn from_result(result: &VerificationResult) -> Self {
        Self {
            user: result.user.clone(),
            claim_identifier: result.claim_identifier,
            owner: result.owner,
            nullifier: result.nullifier,
            payment_amount: result.payment_amount,
            attested_by: result.attested_by.clone(),
            verified_at: result.verified_at,
        }
    }

    fn reissue(&self) -> Self {
        Self {
            user: self.user.clone(),
            claim_identifier: self.claim_identifier,
            owner: self.owner,
            nullifier: self.nullifier,
            payment_amount: self.payment_amount,
            attested_by: self.attested_by.clone(),
            verified_at: self.verified_at,
        }
    }

    /// User the grant authorizes.
    pub fn user(&self) -> &AccountId {
        &self.user
    }

    /// Claim identifier.
    pub fn claim_identifier(&self) -> &Hash256 {
        &self.claim_identifier
    }

    /// Claim owner.
    pub fn owner(&self) -> &EthAddress {
        &self.owner
    }

    /// Nullifier of the underlying payment.
    pub fn nullifier(&self) -> &Nullifier {
        &self.nullifier
    }

    /// Validated payment magnitude, if any.
    pub fn payment_amount(&self) -> Option<u64> {
        self.payment_amount
    }

    /// Witnesses that attested the claim. Spenders with their own witness
    /// policy check it against these.
    pub fn attested_by(&self) -> &[EthAddress] {
        &self.attested_by
    }

    /// When the verification was recorded.
    pub fn verified_at(&self) -> Timestamp {
        self.verified_at
    }
}

/// A validated proof whose nullifier has not been claimed yet.
#[derive(Debug)]
pub struct PreparedVerification {
    verified: VerifiedClaim,
    nullifier: Nullifier,
}

impl PreparedVerification {
    /// Validation outcome.
    pub fn verified(&self) -> &VerifiedClaim {
        &self.verified
    }

    /// Nullifier that will be claimed.
    pub fn nullifier(&self) -> &Nullifier {
        &self.nullifier
    }

    /// Validated payment magnitude, if payment details were checked.
    pub fn payment_amount(&self) -> Option<u64> {
        self.verified.payment.as_ref().map(|p| p.amount)
    }
}

/// Per-user verification records gated by the nullifier registry.
pub struct VerificationLedger {
    registry: Arc<NullifierRegistry>,
    store: Arc<dyn VerificationStore>,
    clock: Arc<dyn Clock>,
    ttl_secs: Option<u64>,
}

impl VerificationLedger {
    /// Ledger over `store`, claiming nullifiers in `registry`.
    pub fn new(registry: Arc<NullifierRegistry>, store: Arc<dyn VerificationStore>) -> Self {
        Self {
            registry,
            store,
            clock: Arc::new(SystemClock),
            ttl_secs: None,
        }
    }

    /// Use `clock` for entry timestamps and expiry.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Entries older than `ttl_secs` at spend time are rejected.
    pub fn with_ttl(mut self, ttl_secs: Option<u64>) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }

    /// The nullifier registry backing this ledger.
    pub fn registry(&self) -> &NullifierRegistry {
        &self.registry
    }

    /// Validate `proof` and derive its nullifier without changing state.
    ///
    /// Fails early with `AlreadyUsed` when the nullifier is already
    /// recorded; the authoritative check is the claim in
    /// [`commit`](Self::commit).
    pub fn prepare(
        &self,
        validator: &ClaimValidator,
        proof: &Proof,
        caller: &AccountId,
        payment: Option<&PaymentConfig>,
    ) -> Result<PreparedVerification, LedgerError> {
        let verified = match payment {
            Some(config) => validator.verify_with_payment(proof, caller, config)?,
            None => validator.verify_signatures(proof, caller)?,
        };
        let nullifier = proof.claim_info.nullifier().map_err(ClaimError::from)?;
        self.registry.ensure_unused(&nullifier)?;
        Ok(PreparedVerification {
            verified,
            nullifier,
        })
    }

    /// Claim the nullifier and record an unconsumed entry for the caller.
    pub fn commit(&self, prepared: PreparedVerification) -> Result<VerificationResult, LedgerError> {
        let result = self.record(prepared, VerificationStatus::Unconsumed)?;
        tracing::info!(
            user = %result.user,
            identifier = %result.claim_identifier,
            nullifier = %result.nullifier,
            "verification recorded"
        );
        Ok(result)
    }

    /// Claim the nullifier and record an already-consumed entry, returning
    /// the grant directly. Used by one-shot flows that verify and spend in
    /// the same operation.
    pub fn commit_consumed(&self, prepared: PreparedVerification) -> Result<VerificationGrant, LedgerError> {
        let result = self.record(prepared, VerificationStatus::Consumed)?;
        tracing::info!(
            user = %result.user,
            identifier = %result.claim_identifier,
            "verification recorded and consumed"
        );
        Ok(VerificationGrant::from_result(&result))
    }

    /// Validate, claim the nullifier, and record an unconsumed entry.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Claim`] if validation fails.
    /// - [`LedgerError::Registry`] with `AlreadyUsed` if the payment was
    ///   already claimed. No entry is written.
    pub fn verify(
        &self,
        validator: &ClaimValidator,
        proof: &Proof,
        caller: &AccountId,
        payment: Option<&PaymentConfig>,
    ) -> Result<VerificationResult, LedgerError> {
        let prepared = self.prepare(validator, proof, caller, payment)?;
        self.commit(prepared)
    }

    /// The user's current entry.
    pub fn get(&self, user: &AccountId) -> Option<VerificationResult> {
        self.store.get(user)
    }

    /// Spend the user's entry and return the grant.
    pub fn consume(&self, user: &AccountId) -> Result<VerificationGrant, LedgerError> {
        self.spend(user, |grant| Ok::<_, LedgerError>(grant.reissue()))
    }

    /// Spend the user's entry by running `action` with the grant.
    ///
    /// The entry is held for the duration of `action` and marked consumed
    /// only if `action` returns `Ok`.
    ///
    /// # Errors
    ///
    /// `NotVerified`, `AlreadyConsumed`, or `VerificationExpired` (entry
    /// unchanged), or whatever `action` returns.
    pub fn spend<T, E>(
        &self,
        user: &AccountId,
        action: impl FnOnce(&VerificationGrant) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<LedgerError>,
    {
        let now = self.clock.now();
        let mut action = Some(action);
        let mut outcome: Option<Result<T, E>> = None;

        self.store.with_entry(user, &mut |entry| {
            let result = match entry {
                None => Err(LedgerError::NotVerified { user: user.clone() }.into()),
                Some(entry) => match self.check_spendable(entry, now) {
                    Err(e) => Err(e.into()),
                    Ok(()) => match action.take() {
                        None => Err(LedgerError::AlreadyConsumed {
                            user: user.clone(),
                            identifier: entry.claim_identifier,
                        }
                        .into()),
                        Some(action) => {
                            let grant = VerificationGrant::from_result(entry);
                            let result = action(&grant);
                            if result.is_ok() {
                                entry.status = VerificationStatus::Consumed;
                            }
                            result
                        }
                    },
                },
            };
            outcome = Some(result);
        });

        match outcome {
            Some(Ok(value)) => {
                tracing::info!(%user, "verification consumed");
                Ok(value)
            }
            Some(Err(e)) => Err(e),
            None => Err(LedgerError::NotVerified { user: user.clone() }.into()),
        }
    }

    fn record(
        &self,
        prepared: PreparedVerification,
        status: VerificationStatus,
    ) -> Result<VerificationResult, LedgerError> {
        let payment_amount = prepared.payment_amount();
        let PreparedVerification {
            verified,
            nullifier,
        } = prepared;
        self.registry.mark(nullifier, &verified.caller)?;
        let result = VerificationResult {
            user: verified.caller,
            verified_at: self.clock.now(),
            claim_identifier: verified.identifier,
            owner: verified.owner,
            nullifier,
            payment_amount,
            attested_by: verified.witnesses,
            status,
        };
        self.store.put(result.clone());
        Ok(result)
    }

    fn check_spendable(&self, entry: &VerificationResult, now: Timestamp) -> Result<(), LedgerError> {
        if entry.status == VerificationStatus::Consumed {
            tracing::warn!(user = %entry.user, identifier = %entry.claim_identifier, "verification already consumed");
            return Err(LedgerError::AlreadyConsumed {
                user: entry.user.clone(),
                identifier: entry.claim_identifier,
            });
        }
        if let Some(ttl_secs) = self.ttl_secs {
            let age_secs = entry.verified_at.seconds_until(&now);
            if age_secs > ttl_secs {
                tracing::warn!(user = %entry.user, age_secs, ttl_secs, "verification expired");
                return Err(LedgerError::VerificationExpired {
                    user: entry.user.clone(),
                    age_secs,
                    ttl_secs,
                });
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for VerificationLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationLedger")
            .field("registry", &self.registry)
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}
