//! Audit sink seam
//!
//! The ledger produces `StatusChangeEvent` records and forwards them to a
//! sink for durable, queryable storage; it never queries the sink back.
//! A sink failure after an applied transition does not roll the transition
//! back — the outcome is surfaced to the caller instead.

use agentpay_types::StatusChangeEvent;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors from the audit sink
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit sink unavailable: {0}")]
    Unavailable(String),
}

/// Durable store for status-change events (append-only)
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Append an event
    async fn append(&self, event: StatusChangeEvent) -> Result<(), AuditError>;
}

/// Whether an applied transition made it into the audit sink.
///
/// `Failed` means the transition itself stands; only the durable record
/// is missing. Callers decide whether that is fatal for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditOutcome {
    /// The sink accepted the event
    Recorded,
    /// The sink rejected or could not store the event
    Failed { message: String },
}

impl AuditOutcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self, Self::Recorded)
    }
}

/// In-memory audit sink, the default and the test stand-in
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuditSink {
    entries: Arc<RwLock<Vec<StatusChangeEvent>>>,
}

impl InMemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All appended events, oldest first
    pub async fn entries(&self) -> Vec<StatusChangeEvent> {
        self.entries.read().await.clone()
    }
}

#[async_trait]
impl AuditSink for InMemoryAuditSink {
    async fn append(&self, event: StatusChangeEvent) -> Result<(), AuditError> {
        self.entries.write().await.push(event);
        Ok(())
    }
}
