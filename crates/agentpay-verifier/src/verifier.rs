//! The ordered verification pipeline

use crate::{header::parse_header, VerifyError};
use agentpay_crypto::{verify_with_key, IdentityResolver, LocalResolver, ResolverError};
use agentpay_ledger::WalletLedger;
use agentpay_spend::{SpendError, SpendTracker};
use agentpay_types::{AgentDid, PaymentClaim, Wallet, WalletStatus};
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::debug;

/// Configuration for the verifier
#[derive(Debug, Clone)]
pub struct VerifierConfig {
    /// Network label assumed when the header omits `network`
    pub default_network: String,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            default_network: "base".to_string(),
        }
    }
}

/// Caller-supplied policy context for a verification attempt.
///
/// When present, `identity` names the signer the claim's signature must
/// verify against, overriding the payer wallet's owner.
#[derive(Debug, Clone)]
pub struct PolicyContext {
    /// The signer identity
    pub identity: AgentDid,
}

impl PolicyContext {
    pub fn new(identity: AgentDid) -> Self {
        Self { identity }
    }
}

/// The AgentPay payment verifier
///
/// Composes the wallet ledger, spend tracker, and signature verification
/// into one fail-fast pipeline. All collaborators are injected — the
/// verifier holds no process-wide state.
pub struct PaymentVerifier {
    wallets: Arc<WalletLedger>,
    spend: SpendTracker,
    resolver: Arc<dyn IdentityResolver>,
    config: VerifierConfig,
}

impl PaymentVerifier {
    /// Create a verifier with the local DID resolver and default config
    pub fn new(wallets: Arc<WalletLedger>, spend: SpendTracker) -> Self {
        Self {
            wallets,
            spend,
            resolver: Arc::new(LocalResolver),
            config: VerifierConfig::default(),
        }
    }

    /// Replace the identity resolver
    pub fn with_resolver(mut self, resolver: Arc<dyn IdentityResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: VerifierConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the full pipeline over one authorization header.
    ///
    /// Returns the authorized claim, or the error for the first check that
    /// failed. Nothing is recorded on any path; recording the authorized
    /// spend happens after this returns, outside the core.
    pub async fn verify_payment(
        &self,
        header: Option<&str>,
        required_amount: Decimal,
        context: Option<&PolicyContext>,
    ) -> Result<PaymentClaim, VerifyError> {
        // 1. Presence
        let raw = header
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or(VerifyError::HeaderMissing)?;

        // 2. Parsing
        let claim = parse_header(raw, &self.config.default_network)?;

        // 3. Wallet status. No associated wallet means no policy to
        // enforce; the claim proceeds to the cheaper structural checks.
        let wallet = self.resolve_wallet(&claim).await;
        if let Some(wallet) = &wallet {
            if wallet.status != WalletStatus::Active {
                debug!(
                    payer = %claim.payer,
                    status = %wallet.status,
                    "claim rejected before crypto: wallet not active"
                );
                return Err(VerifyError::WalletNotActive {
                    status: wallet.status,
                    reason: wallet.status_reason.clone(),
                });
            }
        }

        // 4. Amount sufficiency
        if claim.amount < required_amount {
            return Err(VerifyError::InsufficientPayment {
                required: required_amount,
                provided: claim.amount,
            });
        }

        // 5. Spend limits. The per-transaction cap is a local comparison
        // and runs before the daily aggregate, which costs a ledger read.
        if let Some(wallet) = &wallet {
            if let Some(limit) = wallet.max_transaction_amount {
                if claim.amount > limit {
                    return Err(VerifyError::TransactionLimitExceeded {
                        amount: claim.amount,
                        limit,
                    });
                }
            }

            if let Some(daily_limit) = wallet.max_daily_spend {
                let identity = context.map(|c| &c.identity).unwrap_or(&wallet.owner);
                let check = self
                    .spend
                    .check_daily_budget(identity, claim.amount, daily_limit, Utc::now())
                    .await
                    .map_err(|e| match e {
                        SpendError::Timeout(_) | SpendError::Unavailable(_) => {
                            VerifyError::ExternalTimeout {
                                operation: "daily spend aggregation".to_string(),
                            }
                        }
                    })?;
                if !check.allowed {
                    return Err(VerifyError::BudgetExceeded {
                        current_spend: check.current_spend,
                        limit: check.limit,
                        remaining: check.remaining,
                    });
                }
            }
        }

        // 6. Signature, last: the most expensive check, possibly touching
        // an external resolver. The signer is the explicit context
        // identity, else the payer wallet's owner; with neither, no key is
        // attributable and authentication is the caller's concern.
        let signer = context
            .map(|c| c.identity.clone())
            .or_else(|| wallet.as_ref().map(|w| w.owner.clone()));
        if let Some(identity) = signer {
            let key = self.resolver.resolve(&identity).await.map_err(|e| match e {
                ResolverError::Timeout(_) => VerifyError::ExternalTimeout {
                    operation: "identity resolution".to_string(),
                },
                ResolverError::InvalidIdentity(reason) => {
                    debug!(identity = %identity, %reason, "unresolvable signer identity");
                    VerifyError::IdentityUnresolvable {
                        identity: identity.to_string(),
                    }
                }
            })?;

            if !verify_with_key(&claim.signing_payload(), &claim.signature, &key) {
                return Err(VerifyError::SignatureInvalid);
            }
        }

        debug!(payer = %claim.payer, amount = %claim.amount, "payment claim authorized");
        Ok(claim)
    }

    async fn resolve_wallet(&self, claim: &PaymentClaim) -> Option<Wallet> {
        let wallet_id = self.wallets.find_by_address(&claim.payer).await?;
        // A lookup race (wallet dropped between index hit and fetch)
        // degrades to the no-wallet path
        self.wallets.get_wallet(&wallet_id).await.ok()
    }
}
