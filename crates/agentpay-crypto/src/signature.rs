//! Deterministic payment signatures
//!
//! Signing hashes the canonical payload bytes with Keccak-256 and signs the
//! digest with RFC 6979 deterministic ECDSA. Signatures are fixed-width
//! 64-byte (r || s) values, hex-encoded.

use crate::{canonical_bytes, resolve_identity, CryptoError, CryptoResult, KeyPair};
use agentpay_types::AgentDid;
use k256::ecdsa::signature::{DigestSigner, DigestVerifier};
use k256::ecdsa::{Signature as EcdsaSignature, VerifyingKey};
use serde_json::Value;
use sha3::{Digest, Keccak256};

/// Sign a payload; the same (payload, key) pair always yields the same
/// signature bytes.
pub fn sign(payload: &Value, keypair: &KeyPair) -> CryptoResult<String> {
    let digest = Keccak256::new_with_prefix(canonical_bytes(payload));
    let signature: EcdsaSignature = keypair
        .signing_key()
        .try_sign_digest(digest)
        .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;

    Ok(hex::encode(signature.to_bytes()))
}

/// Verify a payload signature against an identity.
///
/// Malformed signature encoding, a tampered payload, or a mismatched key
/// all yield `Ok(false)` — expected negative outcomes. A malformed
/// identity is a loud `Err`, because it indicates a caller error rather
/// than an authentication failure.
pub fn verify(payload: &Value, signature_hex: &str, identity: &AgentDid) -> CryptoResult<bool> {
    let key = resolve_identity(identity)?;
    Ok(verify_with_key(payload, signature_hex, &key))
}

/// Verify a payload signature against an already-resolved public key.
pub fn verify_with_key(payload: &Value, signature_hex: &str, key: &VerifyingKey) -> bool {
    let signature_hex = signature_hex.strip_prefix("0x").unwrap_or(signature_hex);
    let signature_bytes = match hex::decode(signature_hex) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    let signature = match EcdsaSignature::from_slice(&signature_bytes) {
        Ok(sig) => sig,
        Err(_) => return false,
    };

    let digest = Keccak256::new_with_prefix(canonical_bytes(payload));
    key.verify_digest(digest, &signature).is_ok()
}
