//! Shared fixtures: a bootstrapped protocol with one witness, and a
//! builder for signed payment proofs.

#![allow(dead_code)]

use std::sync::Arc;

use zkesc_core::{
    AccountId, ClaimInfo, CompleteClaimData, EthAddress, Proof, SchemaVersion, SignedClaim,
};
use zkesc_crypto::{WitnessKey, WitnessSigner};
use zkesc_escrow::{EscrowConfig, InMemoryTokenAccounts, TokenAccounts, WithdrawalBinding};
use zkesc_protocol::{
    InMemoryMint, MintSection, PaymentSection, Protocol, ProtocolConfig, RegistrySection, Stores,
};
use zkesc_verifier::IdentifierCheck;

pub const BANK_ACCOUNT: &str = "100202642943(토스뱅크)";
pub const PAYMENT_AUTHORITY: &str = "payment-authority";
pub const ESCROW_ADMIN: &str = "escrow-admin";
pub const DEPOSITOR: &str = "depositor";

pub fn account(s: &str) -> AccountId {
    AccountId::new(s).unwrap()
}

/// A bank receipt as the attestor extracts it.
#[derive(Debug, Clone)]
pub struct Receipt {
    pub bank_account: String,
    pub amount: String,
    pub nickname: String,
    pub date: String,
}

impl Default for Receipt {
    fn default() -> Self {
        Self {
            bank_account: BANK_ACCOUNT.to_string(),
            amount: "-1000".to_string(),
            nickname: "anvil-1".to_string(),
            date: "2025-07-25 12:20:09".to_string(),
        }
    }
}

impl Receipt {
    pub fn amount(mut self, amount: &str) -> Self {
        self.amount = amount.to_string();
        self
    }

    pub fn nickname(mut self, nickname: &str) -> Self {
        self.nickname = nickname.to_string();
        self
    }

    pub fn claim_info(&self) -> ClaimInfo {
        let context = serde_json::json!({
            "extractedParameters": {
                "documentTitle": "송금확인증",
                "receivingBankAccount": self.bank_account,
                "recipientName": "이현민",
                "senderNickname": self.nickname,
                "transactionAmount": self.amount,
                "transactionDate": self.date,
            },
            "providerHash": "0xffb501528259e6d684e1c2153fbbacab453fe9c97c336dc4f8f48d70a0e2a13d",
        });
        ClaimInfo {
            provider: "http".to_string(),
            parameters: r#"{"method":"GET","url":"https://example.com/receipt"}"#.to_string(),
            context: context.to_string(),
        }
    }

    pub fn proof(&self, signers: &[&WitnessKey]) -> Proof {
        sign(self.claim_info(), signers)
    }
}

/// Sign `info` under the full identifier schema.
pub fn sign(info: ClaimInfo, signers: &[&WitnessKey]) -> Proof {
    let claim = CompleteClaimData {
        identifier: info.identifier(SchemaVersion::Full),
        owner: signers[0].address(),
        timestamp_s: 1_753_410_009,
        epoch: 1,
    };
    resign(
        Proof {
            claim_info: info,
            signed_claim: SignedClaim {
                claim,
                signatures: Vec::new(),
            },
            is_appclip_proof: false,
            expected_witness: None,
        },
        signers,
    )
}

/// Replace the proof's signatures with fresh ones over its current claim.
pub fn resign(mut proof: Proof, signers: &[&WitnessKey]) -> Proof {
    proof.signed_claim.signatures = signers
        .iter()
        .map(|key| key.sign_claim(&proof.signed_claim.claim).unwrap())
        .collect();
    proof
}

pub fn protocol_config(witnesses: &[EthAddress], binding: WithdrawalBinding) -> ProtocolConfig {
    ProtocolConfig {
        schema_version: SchemaVersion::Full,
        identifier_check: IdentifierCheck::Enforce,
        verification_ttl_secs: None,
        log_filter: "info".to_string(),
        payment: PaymentSection {
            authority: account(PAYMENT_AUTHORITY),
            recipient_bank_account: BANK_ACCOUNT.to_string(),
            allowed_amount: 1000,
            fiat_currency: "KRW".to_string(),
        },
        nullifier_registry: RegistrySection {
            authority: account("registry-authority"),
        },
        escrow: EscrowConfig::new(account(ESCROW_ADMIN), 1, witnesses.to_vec(), binding).unwrap(),
        mint: MintSection {
            collection_id: "proof-of-payment".to_string(),
        },
    }
}

pub struct Harness {
    pub witness: WitnessKey,
    pub protocol: Protocol,
    pub mint: Arc<InMemoryMint>,
    pub accounts: Arc<InMemoryTokenAccounts>,
}

impl Harness {
    pub fn witnesses(&self) -> [EthAddress; 1] {
        [self.witness.address()]
    }
}

pub fn harness() -> Harness {
    harness_with(|_| {})
}

pub fn harness_with(adjust: impl FnOnce(&mut ProtocolConfig)) -> Harness {
    let witness = WitnessKey::generate();
    let mut config = protocol_config(&[witness.address()], WithdrawalBinding::rate(13, 1000).unwrap());
    adjust(&mut config);

    let accounts = Arc::new(InMemoryTokenAccounts::new());
    accounts.credit(&account(DEPOSITOR), 10_000);
    let stores = Stores {
        accounts: accounts.clone(),
        ..Stores::in_memory()
    };
    let mint = Arc::new(InMemoryMint::new());
    let protocol = Protocol::bootstrap(config, stores, mint.clone()).unwrap();
    Harness {
        witness,
        protocol,
        mint,
        accounts,
    }
}
