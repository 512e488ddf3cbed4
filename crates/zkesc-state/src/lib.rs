//! # zkesc-state — Replay Prevention and Verification State
//!
//! The stateful half of proof verification:
//!
//! - **Nullifier registry** (`nullifier.rs`): append-only, create-once
//!   records keyed by the payment nullifier.
//! - **Payment config registry** (`payment_config.rs`): one
//!   `PaymentConfig` per authority, replaceable only by that authority.
//! - **Verification ledger** (`ledger.rs`): per-user latest verification
//!   with `Unconsumed → Consumed` status and the single-use
//!   [`VerificationGrant`] handed to spenders.
//!
//! ## Design
//!
//! Every registry takes its store as a constructor argument
//! ([`NullifierStore`], [`PaymentConfigStore`], [`VerificationStore`]).
//! The in-memory implementations are `DashMap`-backed and suitable for
//! tests and single-process deployments.

pub mod clock;
pub mod error;
pub mod ledger;
pub mod nullifier;
pub mod payment_config;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{LedgerError, RegistryError};
pub use ledger::{
    PreparedVerification, VerificationGrant, VerificationLedger, VerificationResult,
    VerificationStatus,
};
pub use nullifier::{NullifierRecord, NullifierRegistry, NullifierStatus, RegistryState};
pub use payment_config::PaymentConfigRegistry;
pub use store::{
    InMemoryNullifierStore, InMemoryPaymentConfigStore, InMemoryVerificationStore,
    NullifierStore, PaymentConfigStore, VerificationStore,
};
