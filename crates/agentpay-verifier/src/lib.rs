//! AgentPay Verifier - The payment authorization pipeline
//!
//! Given a raw authorization header, a required amount, and an optional
//! policy context, decides whether a payment claim may proceed. Checks run
//! in a fixed order, each short-circuiting on failure, from cheapest and
//! least sensitive to most expensive and most sensitive:
//!
//! 1. Header presence
//! 2. Header parsing (one opaque failure kind, no field-level oracle)
//! 3. Wallet status (disabled wallets rejected before any crypto runs)
//! 4. Amount sufficiency
//! 5. Spend limits (per-transaction cap, then the daily aggregate)
//! 6. Signature verification (last; may touch an external resolver)
//!
//! No step writes state, so an aborted verification commits nothing.
//! Recording the authorized spend is the caller's post-success step.

pub mod error;
pub mod header;
pub mod verifier;

pub use error::VerifyError;
pub use header::parse_header;
pub use verifier::{PaymentVerifier, PolicyContext, VerifierConfig};
