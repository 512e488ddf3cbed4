//! # Nullifier Registry
//!
//! Blocks replay of a real-world payment. A [`NullifierRecord`] for a
//! nullifier can be created at most once. Its existence *is* the used
//! flag; there is no separate boolean and records are never deleted.
//!
//! ## Security Invariant
//!
//! [`NullifierRegistry::mark`] goes through
//! [`NullifierStore::insert_if_absent`], never a read followed by a write.
//! Concurrent marks of one nullifier have exactly one winner and every
//! loser observes [`RegistryError::AlreadyUsed`].

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use zkesc_core::{AccountId, Nullifier, Timestamp};

use crate::clock::{Clock, SystemClock};
use crate::error::RegistryError;
use crate::store::NullifierStore;

const REGISTRY: &str = "nullifier registry";

/// Proof that a nullifier was claimed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NullifierRecord {
    /// The claimed nullifier.
    pub nullifier: Nullifier,
    /// Account that claimed it.
    pub used_by: AccountId,
    /// When it was claimed.
    pub used_at: Timestamp,
}

/// Result of [`NullifierRegistry::check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NullifierStatus {
    /// No record exists.
    Unused,
    /// A record exists.
    Used(NullifierRecord),
}

impl NullifierStatus {
    /// Whether a record exists.
    pub fn is_used(&self) -> bool {
        matches!(self, Self::Used(_))
    }
}

/// Registry header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryState {
    /// Account that initialized the registry.
    pub authority: AccountId,
    /// Records created so far.
    pub nullifier_count: u64,
}

/// The global nullifier registry.
pub struct NullifierRegistry {
    authority: RwLock<Option<AccountId>>,
    store: Arc<dyn NullifierStore>,
    clock: Arc<dyn Clock>,
}

impl NullifierRegistry {
    /// Registry over `store`, uninitialized.
    pub fn new(store: Arc<dyn NullifierStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    /// Registry with an explicit time source.
    pub fn with_clock(store: Arc<dyn NullifierStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            authority: RwLock::new(None),
            store,
            clock,
        }
    }

    /// Record the registry authority. Allowed once.
    pub fn initialize(&self, authority: &AccountId) -> Result<RegistryState, RegistryError> {
        let mut slot = self.authority.write();
        if slot.is_some() {
            return Err(RegistryError::AlreadyInitialized {
                what: REGISTRY.to_string(),
            });
        }
        *slot = Some(authority.clone());
        tracing::info!(%authority, "nullifier registry initialized");
        Ok(RegistryState {
            authority: authority.clone(),
            nullifier_count: self.store.count(),
        })
    }

    /// Header, if initialized.
    pub fn state(&self) -> Result<RegistryState, RegistryError> {
        Ok(RegistryState {
            authority: self.require_initialized()?,
            nullifier_count: self.store.count(),
        })
    }

    /// Records created so far.
    pub fn nullifier_count(&self) -> u64 {
        self.store.count()
    }

    /// Claim `nullifier` for `claimant`.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotInitialized`] before [`initialize`](Self::initialize).
    /// - [`RegistryError::AlreadyUsed`] if a record exists; nothing changes.
    pub fn mark(&self, nullifier: Nullifier, claimant: &AccountId) -> Result<NullifierRecord, RegistryError> {
        self.require_initialized()?;
        let record = NullifierRecord {
            nullifier,
            used_by: claimant.clone(),
            used_at: self.clock.now(),
        };
        match self.store.insert_if_absent(record.clone()) {
            Ok(()) => {
                tracing::info!(
                    %nullifier,
                    used_by = %claimant,
                    count = self.store.count(),
                    "nullifier marked"
                );
                Ok(record)
            }
            Err(existing) => {
                tracing::warn!(%nullifier, used_by = %existing.used_by, "nullifier already used");
                Err(RegistryError::AlreadyUsed {
                    nullifier,
                    used_by: existing.used_by,
                })
            }
        }
    }

    /// Read-only lookup.
    pub fn check(&self, nullifier: &Nullifier) -> Result<NullifierStatus, RegistryError> {
        self.require_initialized()?;
        Ok(match self.store.get(nullifier) {
            Some(record) => NullifierStatus::Used(record),
            None => NullifierStatus::Unused,
        })
    }

    /// Fail with [`RegistryError::AlreadyUsed`] if `nullifier` has a record.
    pub fn ensure_unused(&self, nullifier: &Nullifier) -> Result<(), RegistryError> {
        match self.check(nullifier)? {
            NullifierStatus::Unused => Ok(()),
            NullifierStatus::Used(record) => Err(RegistryError::AlreadyUsed {
                nullifier: record.nullifier,
                used_by: record.used_by,
            }),
        }
    }

    fn require_initialized(&self) -> Result<AccountId, RegistryError> {
        self.authority
            .read()
            .clone()
            .ok_or_else(|| RegistryError::NotInitialized {
                what: REGISTRY.to_string(),
            })
    }
}

impl std::fmt::Debug for NullifierRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NullifierRegistry")
            .field("authority", &*self.authority.read())
            .field("nullifier_count", &self.store.count())
            .finish()
    }
}
