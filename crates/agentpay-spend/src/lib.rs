//! AgentPay Spend - Daily budget checks
//!
//! Computes cumulative authorized spend for an identity over a calendar
//! day and checks it against a limit. The check is a pure read: recording
//! a spend happens outside the core, only after the full verification
//! pipeline succeeds, so a cancelled or failed verification commits
//! nothing.
//!
//! Day boundaries are fixed UTC calendar days. Two concurrent checks for
//! the same identity can both read the aggregate before either spend is
//! recorded; the daily limit is therefore a documented soft limit, with
//! the authoritative ledger living outside this crate.

use agentpay_types::AgentDid;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

/// Errors from spend aggregation
#[derive(Debug, Error)]
pub enum SpendError {
    /// The spend ledger could not be read; transient
    #[error("spend ledger unavailable: {0}")]
    Unavailable(String),

    /// The spend ledger did not answer in time; transient
    #[error("spend ledger timed out: {0}")]
    Timeout(String),
}

pub type Result<T> = std::result::Result<T, SpendError>;

/// The external spend aggregate, treated as a pure read function
#[async_trait]
pub trait SpendLedger: Send + Sync {
    /// Sum of authorized amounts for (identity, UTC calendar day)
    async fn sum_amount(&self, identity: &AgentDid, day: NaiveDate) -> Result<Decimal>;
}

/// Result of a daily budget check.
///
/// Carries the inputs a caller needs to explain the verdict, whether or
/// not the spend was allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetCheck {
    /// Whether current_spend + proposed stays within the limit
    pub allowed: bool,
    /// Aggregate already authorized today
    pub current_spend: Decimal,
    /// The daily limit checked against
    pub limit: Decimal,
    /// Headroom before the proposal, clamped at zero
    pub remaining: Decimal,
}

/// Checks proposed spends against per-identity daily budgets
#[derive(Clone)]
pub struct SpendTracker {
    ledger: Arc<dyn SpendLedger>,
}

impl SpendTracker {
    pub fn new(ledger: Arc<dyn SpendLedger>) -> Self {
        Self { ledger }
    }

    /// Check whether a proposed amount fits the identity's daily budget.
    ///
    /// The boundary is inclusive: landing exactly on the limit is allowed.
    /// The window is the UTC calendar day containing `as_of`. Read-only —
    /// the proposed spend is not recorded here.
    pub async fn check_daily_budget(
        &self,
        identity: &AgentDid,
        proposed_amount: Decimal,
        daily_limit: Decimal,
        as_of: DateTime<Utc>,
    ) -> Result<BudgetCheck> {
        let day = as_of.date_naive();
        let current_spend = self.ledger.sum_amount(identity, day).await?;

        let allowed = current_spend + proposed_amount <= daily_limit;
        let remaining = (daily_limit - current_spend).max(Decimal::ZERO);

        debug!(
            identity = %identity,
            %current_spend,
            %proposed_amount,
            %daily_limit,
            allowed,
            "daily budget check"
        );

        Ok(BudgetCheck {
            allowed,
            current_spend,
            limit: daily_limit,
            remaining,
        })
    }
}

/// In-memory spend ledger, the test stand-in for the external aggregate
#[derive(Debug, Clone, Default)]
pub struct InMemorySpendLedger {
    records: Arc<RwLock<Vec<(AgentDid, Decimal, DateTime<Utc>)>>>,
}

impl InMemorySpendLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an authorized spend at the current instant
    pub async fn record(&self, identity: AgentDid, amount: Decimal) {
        self.record_at(identity, amount, Utc::now()).await;
    }

    /// Record an authorized spend at an explicit instant
    pub async fn record_at(&self, identity: AgentDid, amount: Decimal, at: DateTime<Utc>) {
        self.records.write().await.push((identity, amount, at));
    }
}

#[async_trait]
impl SpendLedger for InMemorySpendLedger {
    async fn sum_amount(&self, identity: &AgentDid, day: NaiveDate) -> Result<Decimal> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|(who, _, at)| who == identity && at.date_naive() == day)
            .map(|(_, amount, _)| *amount)
            .sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn identity() -> AgentDid {
        AgentDid::new("did:agent:0x02aabbcc")
    }

    async fn tracker_with_spend(spend: Decimal) -> SpendTracker {
        let ledger = InMemorySpendLedger::new();
        if !spend.is_zero() {
            ledger.record(identity(), spend).await;
        }
        SpendTracker::new(Arc::new(ledger))
    }

    #[tokio::test]
    async fn test_within_budget_allowed() {
        let tracker = tracker_with_spend(dec!(70)).await;
        let check = tracker
            .check_daily_budget(&identity(), dec!(30), dec!(100), Utc::now())
            .await
            .unwrap();

        // Boundary is inclusive: 70 + 30 == 100 is allowed
        assert!(check.allowed);
        assert_eq!(check.current_spend, dec!(70));
        assert_eq!(check.limit, dec!(100));
        assert_eq!(check.remaining, dec!(30));
    }

    #[tokio::test]
    async fn test_over_budget_denied_with_explanation() {
        let tracker = tracker_with_spend(dec!(71)).await;
        let check = tracker
            .check_daily_budget(&identity(), dec!(30), dec!(100), Utc::now())
            .await
            .unwrap();

        assert!(!check.allowed);
        assert_eq!(check.current_spend, dec!(71));
        assert_eq!(check.remaining, dec!(29));
    }

    #[tokio::test]
    async fn test_spend_past_limit_reports_zero_remaining() {
        let tracker = tracker_with_spend(dec!(150)).await;
        let check = tracker
            .check_daily_budget(&identity(), dec!(1), dec!(100), Utc::now())
            .await
            .unwrap();

        assert!(!check.allowed);
        assert_eq!(check.remaining, dec!(0));
    }

    #[tokio::test]
    async fn test_only_same_utc_day_counts() {
        let now = Utc::now();
        let ledger = InMemorySpendLedger::new();
        ledger
            .record_at(identity(), dec!(90), now - Duration::days(1))
            .await;
        let tracker = SpendTracker::new(Arc::new(ledger));

        let check = tracker
            .check_daily_budget(&identity(), dec!(50), dec!(100), now)
            .await
            .unwrap();

        assert!(check.allowed);
        assert_eq!(check.current_spend, dec!(0));
    }

    #[tokio::test]
    async fn test_other_identities_do_not_count() {
        let ledger = InMemorySpendLedger::new();
        ledger
            .record(AgentDid::new("did:agent:0x02other"), dec!(90))
            .await;
        let tracker = SpendTracker::new(Arc::new(ledger));

        let check = tracker
            .check_daily_budget(&identity(), dec!(50), dec!(100), Utc::now())
            .await
            .unwrap();

        assert!(check.allowed);
        assert_eq!(check.current_spend, dec!(0));
    }

    #[tokio::test]
    async fn test_check_does_not_record() {
        let ledger = InMemorySpendLedger::new();
        let tracker = SpendTracker::new(Arc::new(ledger.clone()));

        for _ in 0..3 {
            tracker
                .check_daily_budget(&identity(), dec!(10), dec!(100), Utc::now())
                .await
                .unwrap();
        }

        let sum = ledger
            .sum_amount(&identity(), Utc::now().date_naive())
            .await
            .unwrap();
        assert_eq!(sum, dec!(0));
    }
}
