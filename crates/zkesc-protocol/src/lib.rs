//! # zkesc-protocol — Protocol Entry Points
//!
//! Wires the verifier, registries, ledger, escrow, and mint collaborator
//! into one [`Protocol`] built from a [`ProtocolConfig`].
//!
//! ```text
//! ProtocolConfig ──bootstrap──▶ Protocol
//!                                 ├── payment configs   (PaymentConfigRegistry)
//!                                 ├── verification      (ClaimValidator → VerificationLedger)
//!                                 ├── mint              (VerificationGrant → MintService)
//!                                 ├── escrow()          (Escrow)
//!                                 └── nullifier_registry() (NullifierRegistry)
//! ```
//!
//! ## Crate Policy
//!
//! - Stores are injected through [`Stores`]; nothing is a process global.
//! - Every failure is a [`ProtocolError`] with a flat [`ErrorKind`].
//! - Logging goes through `tracing`; [`telemetry::init`] installs the
//!   subscriber.

pub mod config;
pub mod error;
pub mod mint;
pub mod service;
pub mod telemetry;

pub use config::{ConfigError, MintSection, PaymentSection, ProtocolConfig, RegistrySection};
pub use error::{ErrorKind, ProtocolError};
pub use mint::{InMemoryMint, MintError, MintReceipt, MintService};
pub use service::{EscrowHandle, Protocol, RegistryHandle, Stores};
pub use telemetry::{LogFormat, TelemetryError};
