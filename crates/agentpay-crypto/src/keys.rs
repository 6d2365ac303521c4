//! Key management and DID-formatted identities

use crate::{CryptoError, CryptoResult};
use agentpay_types::{AgentDid, DID_METHOD};
use k256::ecdsa::{SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand::rngs::OsRng;

/// A secp256k1 key pair for payment signing
#[derive(Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl KeyPair {
    /// Generate a new random key pair
    pub fn generate() -> CryptoResult<Self> {
        let signing_key = SigningKey::random(&mut OsRng);
        let verifying_key = *signing_key.verifying_key();

        Ok(Self {
            signing_key,
            verifying_key,
        })
    }

    /// Create from existing signing key bytes
    pub fn from_bytes(bytes: &[u8; 32]) -> CryptoResult<Self> {
        let signing_key = SigningKey::from_bytes(bytes.into())
            .map_err(|e| CryptoError::InvalidKeyFormat(e.to_string()))?;
        let verifying_key = *signing_key.verifying_key();

        Ok(Self {
            signing_key,
            verifying_key,
        })
    }

    /// Get the signing key (private - never expose!)
    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    /// Get the verifying key (public)
    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    /// Get the public key as hex (compressed SEC1, 33 bytes)
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.verifying_key.to_encoded_point(true).as_bytes())
    }

    /// The identity this key pair answers for
    pub fn did(&self) -> AgentDid {
        did_for_key(&self.verifying_key)
    }

    /// Get the signing key bytes (for secure storage only!)
    pub fn signing_key_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes().into()
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key_hex())
            .finish_non_exhaustive()
    }
}

/// Format a verifying key as a DID: `did:agent:0x<compressed-pubkey-hex>`.
pub fn did_for_key(key: &VerifyingKey) -> AgentDid {
    AgentDid::new(format!(
        "did:{}:0x{}",
        DID_METHOD,
        hex::encode(key.to_encoded_point(true).as_bytes())
    ))
}

/// Resolve an identity to its public key.
///
/// Deterministic and idempotent: the key is embedded in the DID itself.
/// A malformed identity is a loud failure — it indicates a caller error,
/// not an authentication failure.
pub fn resolve_identity(identity: &AgentDid) -> CryptoResult<VerifyingKey> {
    let rest = identity
        .as_str()
        .strip_prefix("did:")
        .ok_or_else(|| CryptoError::InvalidIdentity(format!("not a DID: {identity}")))?;
    let (method, key_part) = rest
        .split_once(':')
        .ok_or_else(|| CryptoError::InvalidIdentity(format!("missing method: {identity}")))?;
    if method != DID_METHOD {
        return Err(CryptoError::InvalidIdentity(format!(
            "unsupported DID method: {method}"
        )));
    }
    let key_hex = key_part.strip_prefix("0x").ok_or_else(|| {
        CryptoError::InvalidIdentity(format!("key must be 0x-prefixed hex: {identity}"))
    })?;
    let key_bytes = hex::decode(key_hex)
        .map_err(|e| CryptoError::InvalidIdentity(format!("key is not hex: {e}")))?;

    VerifyingKey::from_sec1_bytes(&key_bytes)
        .map_err(|e| CryptoError::InvalidIdentity(format!("not a secp256k1 point: {e}")))
}
