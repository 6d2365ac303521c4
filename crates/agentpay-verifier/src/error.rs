//! Error types for payment verification
//!
//! Each failing check raises exactly one kind; no aggregation. The parse
//! failure is deliberately opaque — callers cannot learn which field was
//! wrong from the error alone.

use agentpay_types::WalletStatus;
use rust_decimal::Decimal;
use thiserror::Error;

/// Verification failures, one per pipeline check
#[derive(Debug, Clone, Error)]
pub enum VerifyError {
    /// No authorization header was supplied
    #[error("Authorization header missing")]
    HeaderMissing,

    /// The header could not be parsed or a field had the wrong shape.
    /// Classified as an authentication failure; carries no field detail.
    #[error("Authorization header invalid")]
    HeaderMalformed,

    /// The payer's wallet exists but is not active
    #[error("Wallet is not active (status: {status})")]
    WalletNotActive {
        status: WalletStatus,
        reason: Option<String>,
    },

    /// The claimed amount is below what the operation requires
    #[error("Payment of {provided} is below the required {required}")]
    InsufficientPayment { required: Decimal, provided: Decimal },

    /// The claimed amount exceeds the wallet's single-payment cap
    #[error("Amount {amount} exceeds the per-transaction limit {limit}")]
    TransactionLimitExceeded { amount: Decimal, limit: Decimal },

    /// The claimed amount would push today's aggregate past the daily cap
    #[error("Daily budget exceeded: {current_spend} of {limit} spent, {remaining} remaining")]
    BudgetExceeded {
        current_spend: Decimal,
        limit: Decimal,
        remaining: Decimal,
    },

    /// The cryptographic check failed
    #[error("Signature verification failed")]
    SignatureInvalid,

    /// The supplied signer identity is malformed; a caller error, distinct
    /// from an authentication failure
    #[error("Identity {identity} could not be resolved")]
    IdentityUnresolvable { identity: String },

    /// A dependency (identity resolver, spend ledger) was unresponsive;
    /// transient, never reported as a signature failure
    #[error("External dependency unresponsive during {operation}")]
    ExternalTimeout { operation: String },
}

impl VerifyError {
    /// Stable code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::HeaderMissing => "HEADER_MISSING",
            Self::HeaderMalformed => "HEADER_MALFORMED",
            Self::WalletNotActive { .. } => "WALLET_NOT_ACTIVE",
            Self::InsufficientPayment { .. } => "INSUFFICIENT_PAYMENT",
            Self::TransactionLimitExceeded { .. } => "TRANSACTION_LIMIT_EXCEEDED",
            Self::BudgetExceeded { .. } => "BUDGET_EXCEEDED",
            Self::SignatureInvalid => "SIGNATURE_INVALID",
            Self::IdentityUnresolvable { .. } => "IDENTITY_UNRESOLVABLE",
            Self::ExternalTimeout { .. } => "EXTERNAL_TIMEOUT",
        }
    }

    /// Whether retrying the same request later can succeed
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::ExternalTimeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        let err = VerifyError::BudgetExceeded {
            current_spend: dec!(95),
            limit: dec!(100),
            remaining: dec!(5),
        };
        assert_eq!(err.error_code(), "BUDGET_EXCEEDED");
    }

    #[test]
    fn test_only_timeouts_are_retriable() {
        let timeout = VerifyError::ExternalTimeout {
            operation: "identity resolution".to_string(),
        };
        assert!(timeout.is_retriable());
        assert!(!VerifyError::SignatureInvalid.is_retriable());
    }

    #[test]
    fn test_malformed_header_leaks_no_detail() {
        assert_eq!(VerifyError::HeaderMalformed.to_string(), "Authorization header invalid");
    }
}
