//! AgentPay Crypto - Cryptographic primitives for payment authorization
//!
//! This crate provides:
//! - Canonical payload serialization (key-order independent bytes)
//! - secp256k1 key generation with DID-formatted identities
//! - Deterministic signing (RFC 6979 nonces, Keccak-256 digests)
//! - Signature verification and identity resolution
//!
//! # Determinism Invariant
//!
//! **The same (payload, key) pair always yields the same signature bytes.**
//!
//! Canonicalization sorts map keys recursively, and signing never draws on
//! ambient randomness, so a signature can be recomputed and compared
//! byte-for-byte. A failed cryptographic check is an expected negative
//! outcome (`Ok(false)`); only a malformed identity is an error.

pub mod canonical;
pub mod keys;
pub mod resolver;
pub mod signature;

pub use canonical::*;
pub use keys::*;
pub use resolver::*;
pub use signature::*;

use thiserror::Error;

/// Cryptographic errors
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Key generation failed: {0}")]
    KeyGenerationFailed(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Invalid key format: {0}")]
    InvalidKeyFormat(String),

    #[error("Invalid identity: {0}")]
    InvalidIdentity(String),
}

pub type CryptoResult<T> = Result<T, CryptoError>;
