//! # Domain Primitives
//!
//! Newtypes for every identifier that crosses a crate boundary. Each type
//! is distinct: you cannot pass a [`Hash256`] where a [`Nullifier`] is
//! expected, or a witness [`EthAddress`] where a chain [`AccountId`] is.
//!
//! ## Encoding
//!
//! Fixed-size byte values ([`EthAddress`], [`Hash256`], [`Nullifier`])
//! serialize as `0x`-prefixed lowercase hex strings and parse
//! case-insensitively, with or without the prefix. Address equality is
//! byte equality, which makes witness comparison case-insensitive by
//! construction.
//!
//! [`SignatureBytes`] serializes as a raw byte array, matching the wire
//! format in which witnesses transmit 65-byte `r || s || v` signatures.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Length of a recoverable secp256k1 signature: `r(32) || s(32) || v(1)`.
pub const SIGNATURE_LENGTH: usize = 65;

/// Decode a `0x`-optional hex string into exactly `N` bytes.
fn decode_fixed<const N: usize>(what: &'static str, s: &str) -> Result<[u8; N], ValidationError> {
    let trimmed = s.trim();
    let stripped = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let bytes = hex::decode(stripped).map_err(|e| ValidationError::InvalidHex {
        what,
        value: s.to_string(),
        reason: e.to_string(),
    })?;
    let actual = bytes.len();
    bytes
        .try_into()
        .map_err(|_| ValidationError::InvalidLength {
            what,
            expected: N,
            actual,
        })
}

/// Implements hex parsing, `0x` display, and string serde for a fixed-size
/// byte newtype. Deserialization routes through `parse()` so malformed
/// values are rejected at the wire boundary.
macro_rules! impl_fixed_hex {
    ($ty:ident, $len:expr, $what:expr) => {
        impl $ty {
            /// Byte length of this value.
            pub const LEN: usize = $len;

            /// Wrap raw bytes.
            pub const fn from_bytes(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            /// Parse from hex, with or without a `0x` prefix, any case.
            pub fn parse(s: &str) -> Result<Self, ValidationError> {
                decode_fixed::<$len>($what, s).map(Self)
            }

            /// Access the raw bytes.
            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// Lowercase hex without prefix.
            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "0x{}", hex::encode(self.0))
            }
        }

        impl std::fmt::Debug for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($ty), self)
            }
        }

        impl std::str::FromStr for $ty {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl From<[u8; $len]> for $ty {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Self::parse(&raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

/// A 20-byte Ethereum-style address identifying a witness or claim owner.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EthAddress([u8; 20]);

impl_fixed_hex!(EthAddress, 20, "address");

/// A 32-byte Keccak-256 digest, used for claim identifiers.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash256([u8; 32]);

impl_fixed_hex!(Hash256, 32, "hash");

/// The 16-byte replay-prevention key derived from a payment receipt.
///
/// The first half of `keccak256(senderNickname || transactionDate)`.
/// Truncation bounds collisions at roughly `n^2 / 2^129` for `n`
/// registered nullifiers.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Nullifier([u8; 16]);

impl_fixed_hex!(Nullifier, 16, "nullifier");

/// An opaque chain account: the party that submits operations, pays fees,
/// receives funds, or holds administrative rights.
///
/// Any non-empty string without whitespace is accepted (base58 public keys,
/// hex keys, or symbolic names in tests).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Create a validated account identifier.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.is_empty() || id.chars().any(char::is_whitespace) {
            return Err(ValidationError::InvalidAccountId(id));
        }
        Ok(Self(id))
    }

    /// Access the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for AccountId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

/// Raw signature bytes as transmitted by a witness.
///
/// Length is deliberately unchecked here: a wrong-length signature is a
/// verification failure reported by the signature verifier, not a
/// deserialization failure that would hide which proof was malformed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignatureBytes(Vec<u8>);

impl SignatureBytes {
    /// Wrap raw bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Access the raw bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Number of bytes carried.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no bytes are carried.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<[u8; SIGNATURE_LENGTH]> for SignatureBytes {
    fn from(bytes: [u8; SIGNATURE_LENGTH]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<Vec<u8>> for SignatureBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}
