//! # Mint Collaborator
//!
//! Mints a proof-of-payment token for a user who holds a
//! [`VerificationGrant`]. The collaborator accepts the grant as its
//! authorization and never re-examines raw proofs.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use zkesc_core::{AccountId, Hash256, Timestamp};
use zkesc_state::VerificationGrant;

/// The mint rejected or failed a request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("mint into {collection_id} failed: {reason}")]
pub struct MintError {
    /// Target collection.
    pub collection_id: String,
    /// What went wrong.
    pub reason: String,
}

/// A minted token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintReceipt {
    /// Token id.
    pub token_id: Uuid,
    /// Collection minted into.
    pub collection_id: String,
    /// Token owner.
    pub recipient: AccountId,
    /// Claim whose verification paid for the token.
    pub claim_identifier: Hash256,
    /// When it was minted.
    pub minted_at: Timestamp,
}

/// External NFT mint.
pub trait MintService: Send + Sync {
    /// Mint one token in `collection_id` for the grant's user.
    fn mint(&self, collection_id: &str, grant: &VerificationGrant) -> Result<MintReceipt, MintError>;
}

/// Records mints in memory.
#[derive(Debug, Default)]
pub struct InMemoryMint {
    tokens: DashMap<Uuid, MintReceipt>,
}

impl InMemoryMint {
    /// Empty mint.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokens minted so far.
    pub fn minted(&self) -> usize {
        self.tokens.len()
    }

    /// Tokens owned by `recipient`.
    pub fn tokens_of(&self, recipient: &AccountId) -> Vec<MintReceipt> {
        self.tokens
            .iter()
            .filter(|entry| &entry.recipient == recipient)
            .map(|entry| entry.value().clone())
            .collect()
    }
}

impl MintService for InMemoryMint {
    fn mint(&self, collection_id: &str, grant: &VerificationGrant) -> Result<MintReceipt, MintError> {
        if collection_id.trim().is_empty() {
            return Err(MintError {
                collection_id: collection_id.to_string(),
                reason: "empty collection id".to_string(),
            });
        }
        let receipt = MintReceipt {
            token_id: Uuid::new_v4(),
            collection_id: collection_id.to_string(),
            recipient: grant.user().clone(),
            claim_identifier: *grant.claim_identifier(),
            minted_at: Timestamp::now(),
        };
        self.tokens.insert(receipt.token_id, receipt.clone());
        tracing::info!(
            token_id = %receipt.token_id,
            collection = collection_id,
            recipient = %receipt.recipient,
            "token minted"
        );
        Ok(receipt)
    }
}
