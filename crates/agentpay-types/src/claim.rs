//! Payment claims parsed from authorization headers

use crate::PayerAddress;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A payment claim parsed from a raw authorization header.
///
/// Ephemeral: consumed once per verification attempt, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentClaim {
    /// Paying address from the header
    pub payer: PayerAddress,
    /// Claimed payment amount
    pub amount: Decimal,
    /// Hex-encoded signature over `signing_payload()`
    pub signature: String,
    /// Settlement network label
    pub network: String,
}

impl PaymentClaim {
    /// The payload the claim's signature covers: every claim field except
    /// the signature itself. `Decimal` preserves scale, so the amount
    /// serializes back to the exact string the payer signed.
    pub fn signing_payload(&self) -> Value {
        json!({
            "type": "payment",
            "payer": self.payer.as_str(),
            "amount": self.amount.to_string(),
            "network": self.network,
        })
    }
}
