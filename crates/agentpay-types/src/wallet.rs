//! Wallet records and the status state machine

use crate::{AgentDid, PayerAddress, WalletId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a wallet.
///
/// Transitions: `Active` → `Paused` | `Frozen` | `Revoked`;
/// `Paused`/`Frozen` → any state including back to `Active`;
/// `Revoked` is absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletStatus {
    /// Wallet may authorize payments
    Active,
    /// Temporarily disabled by its owner or an operator
    Paused,
    /// Disabled until `frozen_until` (or indefinitely if unset)
    Frozen,
    /// Permanently disabled; terminal
    Revoked,
}

impl WalletStatus {
    /// Terminal states admit no outgoing transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Revoked)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Frozen => "frozen",
            Self::Revoked => "revoked",
        }
    }
}

impl fmt::Display for WalletStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for WalletStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "paused" => Ok(Self::Paused),
            "frozen" => Ok(Self::Frozen),
            "revoked" => Ok(Self::Revoked),
            other => Err(format!("unrecognized wallet status: {other}")),
        }
    }
}

/// Whether the platform or the agent itself holds the wallet's keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletType {
    /// Keys held by the custodial platform
    Custodial,
    /// Keys held outside the platform
    External,
}

impl Default for WalletType {
    fn default() -> Self {
        Self::Custodial
    }
}

/// A spending-policy wallet owned by one agent identity.
///
/// Status fields are mutated only through the ledger's transition
/// operation; balance movement happens elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    /// Wallet ID
    pub id: WalletId,
    /// Owning identity
    pub owner: AgentDid,
    /// On-chain payer address, the header-level identity
    pub address: PayerAddress,
    /// Custody model
    pub wallet_type: WalletType,
    /// Lifecycle status
    pub status: WalletStatus,
    /// Reason for the current status, set on every transition
    pub status_reason: Option<String>,
    /// Actor that applied the current status
    pub status_updated_by: Option<String>,
    /// For `Frozen` wallets, when the freeze lapses on its own
    pub frozen_until: Option<DateTime<Utc>>,
    /// Cumulative per-UTC-day spending cap
    pub max_daily_spend: Option<Decimal>,
    /// Single-payment cap
    pub max_transaction_amount: Option<Decimal>,
    /// Current balance
    pub balance: Decimal,
    /// When created
    pub created_at: DateTime<Utc>,
}

impl Wallet {
    /// Create a new active wallet with no spending limits.
    pub fn new(owner: AgentDid, address: PayerAddress) -> Self {
        Self {
            id: WalletId::new(),
            owner,
            address,
            wallet_type: WalletType::default(),
            status: WalletStatus::Active,
            status_reason: None,
            status_updated_by: None,
            frozen_until: None,
            max_daily_spend: None,
            max_transaction_amount: None,
            balance: Decimal::ZERO,
            created_at: Utc::now(),
        }
    }

    /// Set spending limits
    pub fn with_limits(
        mut self,
        max_transaction_amount: Option<Decimal>,
        max_daily_spend: Option<Decimal>,
    ) -> Self {
        self.max_transaction_amount = max_transaction_amount;
        self.max_daily_spend = max_daily_spend;
        self
    }

    /// True when a freeze has a deadline that already passed.
    pub fn freeze_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == WalletStatus::Frozen
            && self.frozen_until.map(|until| until <= now).unwrap_or(false)
    }
}
