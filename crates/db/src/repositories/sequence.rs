//! Durable, race-free allocation of document numbers.
//!
//! One counter row per scope (prefix + date). Allocation is a single
//! `INSERT .. ON CONFLICT DO UPDATE .. RETURNING` statement, so two
//! concurrent posts in the same scope serialize on the row lock and can
//! never observe the same value. Gaps appear when a post rolls back after
//! allocation; that is accepted, duplicates are not.

use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, DatabaseTransaction, DbBackend, Statement};

use kitabu_core::ledger::{DocPrefix, EntryNumber, LedgerError, SequenceScope};

use crate::repositories::db_err;

const ALLOCATE_SQL: &str = r"
INSERT INTO entry_sequences (scope_key, last_value, updated_at)
VALUES ($1, 1, NOW())
ON CONFLICT (scope_key)
DO UPDATE SET last_value = entry_sequences.last_value + 1, updated_at = NOW()
RETURNING last_value
";

/// Allocates the next entry number in the scope of `prefix` and `date`.
///
/// Runs inside the caller's transaction: if the surrounding post rolls
/// back, the allocated value is skipped and the scope continues with a gap.
///
/// # Errors
///
/// Returns `SequenceConflict` if the allocated value cannot be represented,
/// or `Persistence` on database failure.
pub async fn next_entry_number(
    txn: &DatabaseTransaction,
    prefix: DocPrefix,
    date: NaiveDate,
) -> Result<EntryNumber, LedgerError> {
    let scope = SequenceScope::new(prefix, date);
    let row = txn
        .query_one(Statement::from_sql_and_values(
            DbBackend::Postgres,
            ALLOCATE_SQL,
            [scope.key().into()],
        ))
        .await
        .map_err(db_err)?
        .ok_or_else(|| LedgerError::SequenceConflict { scope: scope.key() })?;

    let last_value: i64 = row.try_get("", "last_value").map_err(db_err)?;
    let seq = u32::try_from(last_value)
        .map_err(|_| LedgerError::SequenceConflict { scope: scope.key() })?;

    Ok(EntryNumber::new(prefix, date, seq))
}
