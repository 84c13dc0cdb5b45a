//! Bank Wrapped
//!
//! Computes financial key-performance indicators (net profit, cash on hand,
//! runway, top counterparties, expenses by category) over a ledger of bank
//! transactions and assembles them into an ordered monthly report.

pub mod core;
pub mod import;
pub mod report;
