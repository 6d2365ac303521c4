//! Authorization header parsing
//!
//! The header is a comma-separated `key=value` list (ASCII):
//! `payer=0x...,amount=5.00,signature=0x...,network=base`. Required keys
//! are `payer`, `amount`, `signature`; `network` is optional and defaults
//! from configuration. Unknown keys are ignored; duplicate keys last-win.
//!
//! Every parse or shape failure maps to the single opaque
//! [`VerifyError::HeaderMalformed`] so the error cannot be used as a
//! field-by-field oracle. Specifics go to the debug log only.

use crate::VerifyError;
use agentpay_types::{PayerAddress, PaymentClaim};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::debug;

/// Parse a raw authorization header into a payment claim.
pub fn parse_header(raw: &str, default_network: &str) -> Result<PaymentClaim, VerifyError> {
    let mut fields: HashMap<&str, &str> = HashMap::new();
    for pair in raw.split(',') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        let Some((key, value)) = pair.split_once('=') else {
            debug!("header pair without '='");
            return Err(VerifyError::HeaderMalformed);
        };
        fields.insert(key.trim(), value.trim());
    }

    let Some(payer_raw) = fields.get("payer") else {
        debug!("header missing payer");
        return Err(VerifyError::HeaderMalformed);
    };
    let Some(amount_raw) = fields.get("amount") else {
        debug!("header missing amount");
        return Err(VerifyError::HeaderMalformed);
    };
    let Some(signature) = fields.get("signature").filter(|s| !s.is_empty()) else {
        debug!("header missing signature");
        return Err(VerifyError::HeaderMalformed);
    };

    let payer = PayerAddress::parse(payer_raw).map_err(|e| {
        debug!(error = %e, "bad payer shape");
        VerifyError::HeaderMalformed
    })?;

    let amount = Decimal::from_str(amount_raw).map_err(|e| {
        debug!(error = %e, "bad amount");
        VerifyError::HeaderMalformed
    })?;
    if amount.is_sign_negative() {
        debug!("negative amount");
        return Err(VerifyError::HeaderMalformed);
    }

    let network = fields
        .get("network")
        .filter(|n| !n.is_empty())
        .copied()
        .unwrap_or(default_network);

    Ok(PaymentClaim {
        payer,
        amount,
        signature: signature.to_string(),
        network: network.to_string(),
    })
}
