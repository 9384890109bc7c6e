//! `SeaORM` entity definitions for the ledger schema.

pub mod account_balances;
pub mod account_types;
pub mod accounts;
pub mod audit_logs;
pub mod businesses;
pub mod entry_sequences;
pub mod journal_entries;
pub mod journal_entry_lines;
pub mod ledger;
pub mod reconciliations;
pub mod sea_orm_active_enums;
pub mod transaction_types;
pub mod users;
