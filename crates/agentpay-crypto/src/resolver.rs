//! Identity resolver seam
//!
//! Resolution may involve an external service in deployments where DIDs are
//! registered rather than self-describing. The trait keeps that I/O behind
//! an async seam; `LocalResolver` decodes the key embedded in the DID and
//! is the default. A resolver timeout is a distinct failure kind so callers
//! never mistake an unresponsive dependency for a bad signature.

use crate::resolve_identity;
use agentpay_types::AgentDid;
use async_trait::async_trait;
use k256::ecdsa::VerifyingKey;
use thiserror::Error;

/// Errors from identity resolution
#[derive(Debug, Error)]
pub enum ResolverError {
    /// The identity string itself is malformed; a caller error
    #[error("invalid identity: {0}")]
    InvalidIdentity(String),

    /// The resolver dependency did not answer in time; transient
    #[error("identity resolution timed out: {0}")]
    Timeout(String),
}

/// Resolves identities to public keys
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, identity: &AgentDid) -> Result<VerifyingKey, ResolverError>;
}

/// Resolver for self-describing DIDs: the public key is decoded straight
/// out of the identity string. Cannot time out.
#[derive(Debug, Clone, Default)]
pub struct LocalResolver;

#[async_trait]
impl IdentityResolver for LocalResolver {
    async fn resolve(&self, identity: &AgentDid) -> Result<VerifyingKey, ResolverError> {
        resolve_identity(identity).map_err(|e| ResolverError::InvalidIdentity(e.to_string()))
    }
}
