//! Property-based tests for the ledger kernel
//!
//! Each test target checks one family of ledger invariants:
//!
//! - `derivation`: address derivation is pure and lands off the curve
//! - `counter`: counter arithmetic bounds and inverse operations
//! - `linked_history`: post chains keep their back-pointers and counts
//! - `delegation`: only the canonical offset can act for a derived authority
//! - `token_sale`: purchases are all-or-nothing and balances accumulate

#![cfg(test)]
