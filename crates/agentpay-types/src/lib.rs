//! AgentPay Types - Canonical domain types for agent payment authorization
//!
//! This crate contains all foundational types for AgentPay with zero
//! dependencies on other agentpay crates. It defines:
//!
//! - Identity types (WalletId, EventId, AgentDid, PayerAddress)
//! - Wallet records with the exhaustive status state machine
//! - Payment claims parsed from authorization headers
//! - Append-only status-change audit events
//!
//! # Architectural Invariants
//!
//! 1. Monetary values are `rust_decimal::Decimal` — floating point never
//!    touches an amount
//! 2. `WalletStatus::Revoked` is absorbing: no transition leaves it
//! 3. Status-change events are append-only and never mutated
//! 4. An illegal status string is unrepresentable: the boundary parses
//!    into the enum or fails, the core only sees the enum

pub mod claim;
pub mod event;
pub mod identity;
pub mod wallet;

pub use claim::*;
pub use event::*;
pub use identity::*;
pub use wallet::*;
