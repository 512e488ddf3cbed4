//! # Claim Data Model
//!
//! The bundle a caller submits to prove that a payment occurred:
//!
//! ```text
//! Proof
//! ├── claimInfo     { provider, parameters, context }   what was observed
//! ├── signedClaim
//! │   ├── claim     { identifier, owner, timestampS, epoch }
//! │   └── signatures [ r||s||v, ... ]                  one per witness
//! ├── isAppclipProof
//! └── expectedWitness (optional hint)
//! ```
//!
//! Field names on the wire are camelCase; every type is immutable once
//! produced and carries no verification state of its own.

use serde::{Deserialize, Serialize};

use crate::codec::{self, SchemaVersion};
use crate::context::ClaimContext;
use crate::error::ContextError;
use crate::primitives::{EthAddress, Hash256, Nullifier, SignatureBytes};

/// What the attestor observed: the provider, the request parameters, and
/// the context document holding the extracted receipt fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimInfo {
    /// Provider name (e.g. `"http"`).
    pub provider: String,
    /// Provider request parameters, opaque to this system.
    pub parameters: String,
    /// JSON document with `extractedParameters` and `providerHash`.
    pub context: String,
}

impl ClaimInfo {
    /// Recompute the claim identifier under the given schema version.
    pub fn identifier(&self, version: SchemaVersion) -> Hash256 {
        codec::identifier(self, version)
    }

    /// Parse the context document into its typed schema.
    pub fn parsed_context(&self) -> Result<ClaimContext, ContextError> {
        ClaimContext::parse(&self.context)
    }

    /// Derive the replay-prevention nullifier from the context.
    pub fn nullifier(&self) -> Result<Nullifier, ContextError> {
        codec::nullifier(&self.context)
    }
}

/// The claim data witnesses sign over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteClaimData {
    /// Identifier asserted by the attestor, derived from [`ClaimInfo`].
    pub identifier: Hash256,
    /// Address that originally requested the claim. Not necessarily the
    /// chain account submitting it.
    pub owner: EthAddress,
    /// Attestation time, Unix seconds.
    pub timestamp_s: u64,
    /// Witness-set epoch.
    pub epoch: u32,
}

impl CompleteClaimData {
    /// The exact text witnesses sign (before the Ethereum message prefix).
    pub fn signing_message(&self) -> String {
        codec::signing_message(self)
    }
}

/// Claim data plus one signature per attesting witness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedClaim {
    /// The signed claim data.
    pub claim: CompleteClaimData,
    /// Witness signatures, `r(32) || s(32) || v(1)` each.
    pub signatures: Vec<SignatureBytes>,
}

/// The full bundle submitted by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    /// What was observed.
    pub claim_info: ClaimInfo,
    /// What the witnesses signed.
    pub signed_claim: SignedClaim,
    /// Whether the attestation was produced by the mobile app-clip flow.
    #[serde(default)]
    pub is_appclip_proof: bool,
    /// Witness the attestor claims to have used. Informational only: trust
    /// comes from the verifier's configured witness set, never from here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_witness: Option<EthAddress>,
}

impl Proof {
    /// The identifier the attestor asserted.
    pub fn asserted_identifier(&self) -> &Hash256 {
        &self.signed_claim.claim.identifier
    }

    /// The claim owner address.
    pub fn owner(&self) -> &EthAddress {
        &self.signed_claim.claim.owner
    }
}
