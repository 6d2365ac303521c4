//! Identity types for AgentPay
//!
//! Uuid-backed ids are strongly typed wrappers to prevent accidental mixing
//! of different ID types. `AgentDid` and `PayerAddress` wrap the two
//! string-shaped identities that cross the wire: a decentralized identifier
//! carrying a public key, and an EVM-style payer address.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Macro to generate ID types with common implementations
macro_rules! define_id_type {
    ($name:ident, $prefix:literal, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create from an existing UUID
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Parse from a string (with or without prefix)
            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                let s = s.strip_prefix(concat!($prefix, "_")).unwrap_or(s);
                Ok(Self(Uuid::parse_str(s)?))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}_{}", $prefix, self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

define_id_type!(WalletId, "wallet", "Unique identifier for a spending-policy wallet");
define_id_type!(EventId, "evt", "Unique identifier for a status-change audit event");

/// The DID method used for agent identities
pub const DID_METHOD: &str = "agent";

/// A decentralized identifier naming an agent identity.
///
/// Shape: `did:agent:0x<hex compressed secp256k1 public key>`. The wrapper
/// is opaque — decoding the embedded key (and rejecting malformed strings)
/// is the crypto layer's job, so that a bad DID fails loudly exactly once,
/// at resolution time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentDid(pub String);

impl AgentDid {
    /// Wrap an existing DID string
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentDid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AgentDid {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Errors from parsing a payer address
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressParseError {
    #[error("payer address must start with 0x")]
    MissingPrefix,

    #[error("payer address must be 0x followed by {expected} hex chars, got {actual}")]
    BadLength { expected: usize, actual: usize },

    #[error("payer address contains non-hex characters")]
    NotHex,
}

/// Hex chars in a payer address body (20 bytes)
const ADDRESS_HEX_LEN: usize = 40;

/// A 20-byte EVM-style payer address, hex-encoded with 0x prefix.
///
/// Stored lowercased so equality and map lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PayerAddress(String);

impl PayerAddress {
    /// Parse and shape-validate an address string.
    pub fn parse(s: &str) -> Result<Self, AddressParseError> {
        let body = s.strip_prefix("0x").ok_or(AddressParseError::MissingPrefix)?;
        if body.len() != ADDRESS_HEX_LEN {
            return Err(AddressParseError::BadLength {
                expected: ADDRESS_HEX_LEN,
                actual: body.len(),
            });
        }
        if !body.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(AddressParseError::NotHex);
        }
        Ok(Self(format!("0x{}", body.to_ascii_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PayerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PayerAddress {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
