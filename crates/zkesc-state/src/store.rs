//! # Storage Backends
//!
//! Keyed record stores behind traits so that the registries and ledger
//! take their persistence as an explicit dependency. Each store is keyed
//! by a deterministic function of the record owner:
//!
//! | Store | Key | Record |
//! |---|---|---|
//! | [`NullifierStore`] | nullifier | [`NullifierRecord`] |
//! | [`PaymentConfigStore`] | authority | [`PaymentConfig`] |
//! | [`VerificationStore`] | user | [`VerificationResult`] |
//!
//! The in-memory implementations use `DashMap`. Create-if-absent goes
//! through the entry API, which holds the shard lock across the check and
//! the insert, so two racing inserts of the same key have one winner.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use zkesc_core::{AccountId, Nullifier};
use zkesc_verifier::PaymentConfig;

use crate::ledger::VerificationResult;
use crate::nullifier::NullifierRecord;

/// Append-only nullifier records.
pub trait NullifierStore: Send + Sync {
    /// Insert `record` unless its nullifier already has one. On conflict
    /// returns the existing record and leaves the store unchanged.
    fn insert_if_absent(&self, record: NullifierRecord) -> Result<(), NullifierRecord>;

    /// Look up a record.
    fn get(&self, nullifier: &Nullifier) -> Option<NullifierRecord>;

    /// Number of records.
    fn count(&self) -> u64;
}

/// One payment config per authority.
pub trait PaymentConfigStore: Send + Sync {
    /// Insert unless the authority already has a config; on conflict
    /// returns the existing one.
    fn insert_if_absent(&self, config: PaymentConfig) -> Result<(), PaymentConfig>;

    /// Replace an existing config; returns the previous one, or `None`
    /// (and stores nothing) if the authority had none.
    fn replace(&self, config: PaymentConfig) -> Option<PaymentConfig>;

    /// Look up an authority's config.
    fn get(&self, authority: &AccountId) -> Option<PaymentConfig>;
}

/// Latest verification per user.
pub trait VerificationStore: Send + Sync {
    /// Write the user's entry, replacing any previous one.
    fn put(&self, result: VerificationResult);

    /// Read the user's entry.
    fn get(&self, user: &AccountId) -> Option<VerificationResult>;

    /// Run `f` on the user's entry while holding it exclusively. `f` must
    /// not call back into this store.
    fn with_entry(&self, user: &AccountId, f: &mut dyn FnMut(Option<&mut VerificationResult>));
}

/// `DashMap`-backed [`NullifierStore`].
#[derive(Debug, Default)]
pub struct InMemoryNullifierStore {
    records: DashMap<Nullifier, NullifierRecord>,
}

impl InMemoryNullifierStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl NullifierStore for InMemoryNullifierStore {
    fn insert_if_absent(&self, record: NullifierRecord) -> Result<(), NullifierRecord> {
        match self.records.entry(record.nullifier) {
            Entry::Occupied(existing) => Err(existing.get().clone()),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
        }
    }

    fn get(&self, nullifier: &Nullifier) -> Option<NullifierRecord> {
        self.records.get(nullifier).map(|r| r.value().clone())
    }

    fn count(&self) -> u64 {
        self.records.len() as u64
    }
}

/// `DashMap`-backed [`PaymentConfigStore`].
#[derive(Debug, Default)]
pub struct InMemoryPaymentConfigStore {
    configs: DashMap<AccountId, PaymentConfig>,
}

impl InMemoryPaymentConfigStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PaymentConfigStore for InMemoryPaymentConfigStore {
    fn insert_if_absent(&self, config: PaymentConfig) -> Result<(), PaymentConfig> {
        match self.configs.entry(config.authority().clone()) {
            Entry::Occupied(existing) => Err(existing.get().clone()),
            Entry::Vacant(slot) => {
                slot.insert(config);
                Ok(())
            }
        }
    }

    fn replace(&self, config: PaymentConfig) -> Option<PaymentConfig> {
        let mut existing = self.configs.get_mut(config.authority())?;
        Some(std::mem::replace(existing.value_mut(), config))
    }

    fn get(&self, authority: &AccountId) -> Option<PaymentConfig> {
        self.configs.get(authority).map(|c| c.value().clone())
    }
}

/// `DashMap`-backed [`VerificationStore`].
#[derive(Debug, Default)]
pub struct InMemoryVerificationStore {
    entries: DashMap<AccountId, VerificationResult>,
}

impl InMemoryVerificationStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl VerificationStore for InMemoryVerificationStore {
    fn put(&self, result: VerificationResult) {
        self.entries.insert(result.user().clone(), result);
    }

    fn get(&self, user: &AccountId) -> Option<VerificationResult> {
        self.entries.get(user).map(|e| e.value().clone())
    }

    fn with_entry(&self, user: &AccountId, f: &mut dyn FnMut(Option<&mut VerificationResult>)) {
        match self.entries.get_mut(user) {
            Some(mut entry) => f(Some(entry.value_mut())),
            None => f(None),
        }
    }
}
