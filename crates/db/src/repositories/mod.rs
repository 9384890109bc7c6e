//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. All fallible operations surface [`LedgerError`] so callers
//! see domain failures, not driver errors.

use kitabu_core::ledger::LedgerError;
use sea_orm::DbErr;

pub mod account;
pub mod audit;
pub mod posting;
pub mod sequence;
pub mod snapshot;

pub use account::{AccountFilter, AccountRepository, CreateAccountInput};
pub use audit::{AuditFilter, AuditRepository};
pub use posting::{PostedEntry, PostingRepository};
pub use sequence::next_entry_number;
pub use snapshot::SnapshotRepository;

/// Maps a driver error into the domain's retryable persistence failure.
pub(crate) fn db_err(err: DbErr) -> LedgerError {
    LedgerError::Persistence(err.to_string())
}
