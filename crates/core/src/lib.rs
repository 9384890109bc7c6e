//! Core business logic for Kitabu.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and balance calculations live here.
//!
//! # Modules
//!
//! - `ledger` - Double-entry posting engine: chart of accounts, journal
//!   validation, entry numbering, balance chains, snapshots and audit records

pub mod ledger;
