//! AgentPay Ledger - Wallet lifecycle state machine with audit trail
//!
//! The ledger is:
//! - Keyed by WalletId, with a payer-address index for header resolution
//! - Append-only in its audit trail (events are never mutated or deleted)
//! - Lazily self-healing: expired freezes flip back to active on read,
//!   no background sweeper required
//!
//! # Invariants
//!
//! 1. `Revoked` is absorbing — no transition leaves it, ever
//! 2. Every transition carries a non-empty reason and actor
//! 3. Every transition (including auto-unfreeze) appends exactly one event
//! 4. Transitions are atomic: read-validate-write-append happens under one
//!    writer lock, so concurrent transitions on a wallet serialize

pub mod audit;

pub use audit::{AuditError, AuditOutcome, AuditSink, InMemoryAuditSink};

use agentpay_types::{
    PayerAddress, StatusChangeEvent, Wallet, WalletId, WalletStatus, AUTO_UNFREEZE_REASON,
    SYSTEM_ACTOR,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Errors that can occur in wallet ledger operations
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Wallet {wallet_id} not found")]
    WalletNotFound { wallet_id: String },

    #[error("Wallet {wallet_id} is revoked; its status can no longer change")]
    WalletRevoked { wallet_id: String },

    #[error("Status transitions require a non-empty reason")]
    MissingReason,

    #[error("Status transitions require a non-empty actor")]
    MissingActor,

    #[error("Wallet {wallet_id} is already registered")]
    WalletAlreadyRegistered { wallet_id: String },

    #[error("Address {address} is already registered to another wallet")]
    AddressAlreadyRegistered { address: String },
}

pub type Result<T> = std::result::Result<T, LedgerError>;

/// An applied status transition.
///
/// `audit` reports whether the event reached the configured sink; the
/// transition itself is already applied either way.
#[derive(Debug, Clone)]
pub struct StatusTransition {
    /// The wallet as it stands after the transition
    pub wallet: Wallet,
    /// The event appended to the trail
    pub event: StatusChangeEvent,
    /// Sink outcome for the event
    pub audit: AuditOutcome,
}

/// The AgentPay wallet ledger
///
/// Thread-safe and designed for concurrent access. All status mutation
/// goes through [`WalletLedger::update_status`]; reads apply lazy freeze
/// expiry so callers always see the effective status.
#[derive(Clone)]
pub struct WalletLedger {
    /// Wallet records
    wallets: Arc<RwLock<HashMap<WalletId, Wallet>>>,
    /// Payer address index
    by_address: Arc<RwLock<HashMap<PayerAddress, WalletId>>>,
    /// Status-change trail (append-only)
    events: Arc<RwLock<Vec<StatusChangeEvent>>>,
    /// Durable event sink
    audit: Arc<dyn AuditSink>,
}

impl WalletLedger {
    /// Create a ledger backed by an in-memory audit sink
    pub fn new() -> Self {
        Self::with_audit_sink(Arc::new(InMemoryAuditSink::new()))
    }

    /// Create a ledger forwarding events to the given sink
    pub fn with_audit_sink(audit: Arc<dyn AuditSink>) -> Self {
        Self {
            wallets: Arc::new(RwLock::new(HashMap::new())),
            by_address: Arc::new(RwLock::new(HashMap::new())),
            events: Arc::new(RwLock::new(Vec::new())),
            audit,
        }
    }

    /// Register a wallet. Rejects duplicate ids and duplicate addresses.
    pub async fn register(&self, wallet: Wallet) -> Result<()> {
        let mut wallets = self.wallets.write().await;
        let mut by_address = self.by_address.write().await;

        if wallets.contains_key(&wallet.id) {
            return Err(LedgerError::WalletAlreadyRegistered {
                wallet_id: wallet.id.to_string(),
            });
        }
        if by_address.contains_key(&wallet.address) {
            return Err(LedgerError::AddressAlreadyRegistered {
                address: wallet.address.to_string(),
            });
        }

        by_address.insert(wallet.address.clone(), wallet.id.clone());
        wallets.insert(wallet.id.clone(), wallet);
        Ok(())
    }

    /// Apply a status transition.
    ///
    /// Rejects transitions out of `Revoked` and transitions with an empty
    /// reason or actor. `frozen_until` is honored only when the new status
    /// is `Frozen`; any other target clears it. On success the event is
    /// appended to the trail and forwarded to the sink; a sink failure is
    /// reported in the returned [`StatusTransition`] and never rolls the
    /// applied transition back.
    pub async fn update_status(
        &self,
        wallet_id: &WalletId,
        new_status: WalletStatus,
        reason: &str,
        updated_by: &str,
        frozen_until: Option<DateTime<Utc>>,
    ) -> Result<StatusTransition> {
        if reason.trim().is_empty() {
            return Err(LedgerError::MissingReason);
        }
        if updated_by.trim().is_empty() {
            return Err(LedgerError::MissingActor);
        }

        let (wallet, event) = {
            let mut wallets = self.wallets.write().await;
            let wallet = wallets
                .get_mut(wallet_id)
                .ok_or_else(|| LedgerError::WalletNotFound {
                    wallet_id: wallet_id.to_string(),
                })?;

            if wallet.status.is_terminal() {
                return Err(LedgerError::WalletRevoked {
                    wallet_id: wallet_id.to_string(),
                });
            }

            let event = StatusChangeEvent::record(
                wallet_id.clone(),
                wallet.status,
                new_status,
                reason,
                updated_by,
            );

            wallet.status = new_status;
            wallet.status_reason = Some(reason.to_string());
            wallet.status_updated_by = Some(updated_by.to_string());
            wallet.frozen_until = match new_status {
                WalletStatus::Frozen => frozen_until,
                _ => None,
            };

            self.events.write().await.push(event.clone());
            (wallet.clone(), event)
        };

        debug!(
            wallet_id = %event.wallet_id,
            from = %event.previous_status,
            to = %event.new_status,
            updated_by = %event.updated_by,
            "wallet status transition"
        );

        let audit = self.forward(event.clone()).await;
        Ok(StatusTransition {
            wallet,
            event,
            audit,
        })
    }

    /// Fetch a wallet, applying lazy freeze expiry first.
    ///
    /// A wallet frozen past its `frozen_until` is transitioned back to
    /// active (with its own audit event) before being returned.
    pub async fn get_wallet(&self, wallet_id: &WalletId) -> Result<Wallet> {
        let (healed, expired_event) = {
            let mut wallets = self.wallets.write().await;
            let wallet = wallets
                .get_mut(wallet_id)
                .ok_or_else(|| LedgerError::WalletNotFound {
                    wallet_id: wallet_id.to_string(),
                })?;

            if !wallet.freeze_expired(Utc::now()) {
                return Ok(wallet.clone());
            }

            let event = StatusChangeEvent::record(
                wallet_id.clone(),
                wallet.status,
                WalletStatus::Active,
                AUTO_UNFREEZE_REASON,
                SYSTEM_ACTOR,
            );

            wallet.status = WalletStatus::Active;
            wallet.status_reason = Some(AUTO_UNFREEZE_REASON.to_string());
            wallet.status_updated_by = Some(SYSTEM_ACTOR.to_string());
            wallet.frozen_until = None;

            self.events.write().await.push(event.clone());
            (wallet.clone(), event)
        };

        debug!(wallet_id = %wallet_id, "freeze expired, wallet auto-unfrozen");
        self.forward(expired_event).await;
        Ok(healed)
    }

    /// Look up the wallet registered for a payer address
    pub async fn find_by_address(&self, address: &PayerAddress) -> Option<WalletId> {
        self.by_address.read().await.get(address).cloned()
    }

    /// Whether a wallet is currently active, applying the same lazy
    /// freeze-expiry logic as [`WalletLedger::get_wallet`].
    pub async fn is_active(&self, wallet_id: &WalletId) -> Result<bool> {
        Ok(self.get_wallet(wallet_id).await?.status == WalletStatus::Active)
    }

    /// Status history for a wallet, newest first.
    ///
    /// Side-effect free and repeatable.
    pub async fn get_status_history(&self, wallet_id: &WalletId) -> Vec<StatusChangeEvent> {
        let events = self.events.read().await;
        events
            .iter()
            .rev()
            .filter(|e| &e.wallet_id == wallet_id)
            .cloned()
            .collect()
    }

    async fn forward(&self, event: StatusChangeEvent) -> AuditOutcome {
        match self.audit.append(event).await {
            Ok(()) => AuditOutcome::Recorded,
            Err(e) => {
                warn!(error = %e, "audit sink rejected status event; transition stands");
                AuditOutcome::Failed {
                    message: e.to_string(),
                }
            }
        }
    }
}

impl Default for WalletLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentpay_types::AgentDid;
    use async_trait::async_trait;
    use chrono::Duration;

    struct FailingSink;

    #[async_trait]
    impl AuditSink for FailingSink {
        async fn append(&self, _event: StatusChangeEvent) -> std::result::Result<(), AuditError> {
            Err(AuditError::Unavailable("sink down".to_string()))
        }
    }

    fn test_wallet(address: &str) -> Wallet {
        Wallet::new(
            AgentDid::new("did:agent:0x02abc"),
            PayerAddress::parse(address).unwrap(),
        )
    }

    const ADDR_A: &str = "0x3cb9b3bbfde8501f411bb69ad3dc07908ed0de20";
    const ADDR_B: &str = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48";

    #[tokio::test]
    async fn test_register_and_get() {
        let ledger = WalletLedger::new();
        let wallet = test_wallet(ADDR_A);
        let id = wallet.id.clone();

        ledger.register(wallet).await.unwrap();
        let fetched = ledger.get_wallet(&id).await.unwrap();
        assert_eq!(fetched.status, WalletStatus::Active);
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_address() {
        let ledger = WalletLedger::new();
        ledger.register(test_wallet(ADDR_A)).await.unwrap();

        let result = ledger.register(test_wallet(ADDR_A)).await;
        assert!(matches!(
            result,
            Err(LedgerError::AddressAlreadyRegistered { .. })
        ));
    }

    #[tokio::test]
    async fn test_transition_updates_wallet_and_trail() {
        let ledger = WalletLedger::new();
        let wallet = test_wallet(ADDR_A);
        let id = wallet.id.clone();
        ledger.register(wallet).await.unwrap();

        let transition = ledger
            .update_status(&id, WalletStatus::Paused, "owner request", "alice", None)
            .await
            .unwrap();

        assert_eq!(transition.wallet.status, WalletStatus::Paused);
        assert_eq!(transition.event.previous_status, WalletStatus::Active);
        assert!(transition.audit.is_recorded());

        let history = ledger.get_status_history(&id).await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].reason, "owner request");
    }

    #[tokio::test]
    async fn test_revoked_is_absorbing() {
        let ledger = WalletLedger::new();
        let wallet = test_wallet(ADDR_A);
        let id = wallet.id.clone();
        ledger.register(wallet).await.unwrap();

        ledger
            .update_status(&id, WalletStatus::Revoked, "fraud", "ops", None)
            .await
            .unwrap();

        let result = ledger
            .update_status(&id, WalletStatus::Active, "appeal granted", "ops", None)
            .await;
        assert!(matches!(result, Err(LedgerError::WalletRevoked { .. })));

        // Record unchanged by the rejected transition
        let wallet = ledger.get_wallet(&id).await.unwrap();
        assert_eq!(wallet.status, WalletStatus::Revoked);
        assert_eq!(wallet.status_reason.as_deref(), Some("fraud"));
        assert_eq!(ledger.get_status_history(&id).await.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_reason_rejected() {
        let ledger = WalletLedger::new();
        let wallet = test_wallet(ADDR_A);
        let id = wallet.id.clone();
        ledger.register(wallet).await.unwrap();

        let result = ledger
            .update_status(&id, WalletStatus::Paused, "   ", "alice", None)
            .await;
        assert!(matches!(result, Err(LedgerError::MissingReason)));

        let result = ledger
            .update_status(&id, WalletStatus::Paused, "reason", "", None)
            .await;
        assert!(matches!(result, Err(LedgerError::MissingActor)));
    }

    #[tokio::test]
    async fn test_expired_freeze_reported_active() {
        let ledger = WalletLedger::new();
        let wallet = test_wallet(ADDR_A);
        let id = wallet.id.clone();
        ledger.register(wallet).await.unwrap();

        ledger
            .update_status(
                &id,
                WalletStatus::Frozen,
                "compliance review",
                "ops",
                Some(Utc::now() - Duration::minutes(5)),
            )
            .await
            .unwrap();

        let wallet = ledger.get_wallet(&id).await.unwrap();
        assert_eq!(wallet.status, WalletStatus::Active);
        assert!(wallet.frozen_until.is_none());

        // The auto-unfreeze produced its own event, newest first
        let history = ledger.get_status_history(&id).await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].reason, AUTO_UNFREEZE_REASON);
        assert_eq!(history[0].updated_by, SYSTEM_ACTOR);
        assert_eq!(history[1].reason, "compliance review");
    }

    #[tokio::test]
    async fn test_unexpired_freeze_stays_frozen() {
        let ledger = WalletLedger::new();
        let wallet = test_wallet(ADDR_A);
        let id = wallet.id.clone();
        ledger.register(wallet).await.unwrap();

        ledger
            .update_status(
                &id,
                WalletStatus::Frozen,
                "compliance review",
                "ops",
                Some(Utc::now() + Duration::hours(1)),
            )
            .await
            .unwrap();

        assert!(!ledger.is_active(&id).await.unwrap());
        let wallet = ledger.get_wallet(&id).await.unwrap();
        assert_eq!(wallet.status, WalletStatus::Frozen);
        assert!(wallet.frozen_until.is_some());
    }

    #[tokio::test]
    async fn test_open_ended_freeze_never_self_heals() {
        let ledger = WalletLedger::new();
        let wallet = test_wallet(ADDR_A);
        let id = wallet.id.clone();
        ledger.register(wallet).await.unwrap();

        ledger
            .update_status(&id, WalletStatus::Frozen, "review", "ops", None)
            .await
            .unwrap();

        assert!(!ledger.is_active(&id).await.unwrap());
    }

    #[tokio::test]
    async fn test_unfreeze_clears_frozen_until() {
        let ledger = WalletLedger::new();
        let wallet = test_wallet(ADDR_A);
        let id = wallet.id.clone();
        ledger.register(wallet).await.unwrap();

        ledger
            .update_status(
                &id,
                WalletStatus::Frozen,
                "review",
                "ops",
                Some(Utc::now() + Duration::hours(1)),
            )
            .await
            .unwrap();

        let transition = ledger
            .update_status(&id, WalletStatus::Active, "review cleared", "ops", None)
            .await
            .unwrap();

        assert!(transition.wallet.frozen_until.is_none());
    }

    #[tokio::test]
    async fn test_history_is_newest_first_and_repeatable() {
        let ledger = WalletLedger::new();
        let wallet = test_wallet(ADDR_A);
        let id = wallet.id.clone();
        ledger.register(wallet).await.unwrap();

        for (status, reason) in [
            (WalletStatus::Paused, "first"),
            (WalletStatus::Active, "second"),
            (WalletStatus::Frozen, "third"),
        ] {
            ledger
                .update_status(&id, status, reason, "ops", None)
                .await
                .unwrap();
        }

        let history = ledger.get_status_history(&id).await;
        let reasons: Vec<&str> = history.iter().map(|e| e.reason.as_str()).collect();
        assert_eq!(reasons, vec!["third", "second", "first"]);

        // Repeatable, no side effects
        assert_eq!(ledger.get_status_history(&id).await.len(), 3);
    }

    #[tokio::test]
    async fn test_events_forwarded_to_sink() {
        let sink = Arc::new(InMemoryAuditSink::new());
        let ledger = WalletLedger::with_audit_sink(sink.clone());
        let wallet = test_wallet(ADDR_A);
        let id = wallet.id.clone();
        ledger.register(wallet).await.unwrap();

        ledger
            .update_status(&id, WalletStatus::Paused, "maintenance", "ops", None)
            .await
            .unwrap();

        let entries = sink.entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].new_status, WalletStatus::Paused);
    }

    #[tokio::test]
    async fn test_sink_failure_does_not_roll_back() {
        let ledger = WalletLedger::with_audit_sink(Arc::new(FailingSink));
        let wallet = test_wallet(ADDR_A);
        let id = wallet.id.clone();
        ledger.register(wallet).await.unwrap();

        let transition = ledger
            .update_status(&id, WalletStatus::Paused, "maintenance", "ops", None)
            .await
            .unwrap();

        assert!(!transition.audit.is_recorded());
        // The transition stands and the internal trail has the event
        assert_eq!(
            ledger.get_wallet(&id).await.unwrap().status,
            WalletStatus::Paused
        );
        assert_eq!(ledger.get_status_history(&id).await.len(), 1);
    }

    #[tokio::test]
    async fn test_find_by_address() {
        let ledger = WalletLedger::new();
        let wallet = test_wallet(ADDR_A);
        let id = wallet.id.clone();
        ledger.register(wallet).await.unwrap();

        let found = ledger
            .find_by_address(&PayerAddress::parse(ADDR_A).unwrap())
            .await;
        assert_eq!(found, Some(id));

        let missing = ledger
            .find_by_address(&PayerAddress::parse(ADDR_B).unwrap())
            .await;
        assert!(missing.is_none());
    }
}
