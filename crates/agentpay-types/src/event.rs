//! Append-only status-change audit events

use crate::{EventId, WalletId, WalletStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Actor recorded on lazy auto-unfreeze transitions
pub const SYSTEM_ACTOR: &str = "system";

/// Reason recorded on lazy auto-unfreeze transitions
pub const AUTO_UNFREEZE_REASON: &str = "auto-unfreeze: expired";

/// One status transition of one wallet.
///
/// Events are created on every transition (including lazy auto-unfreeze),
/// never mutated or deleted, and retrieved newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChangeEvent {
    /// Event ID
    pub id: EventId,
    /// The wallet that transitioned
    pub wallet_id: WalletId,
    /// Status before the transition
    pub previous_status: WalletStatus,
    /// Status after the transition
    pub new_status: WalletStatus,
    /// Why the transition happened
    pub reason: String,
    /// Who applied it
    pub updated_by: String,
    /// When it happened
    pub occurred_at: DateTime<Utc>,
}

impl StatusChangeEvent {
    /// Record a transition happening now.
    pub fn record(
        wallet_id: WalletId,
        previous_status: WalletStatus,
        new_status: WalletStatus,
        reason: impl Into<String>,
        updated_by: impl Into<String>,
    ) -> Self {
        Self {
            id: EventId::new(),
            wallet_id,
            previous_status,
            new_status,
            reason: reason.into(),
            updated_by: updated_by.into(),
            occurred_at: Utc::now(),
        }
    }
}
