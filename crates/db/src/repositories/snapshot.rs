//! Daily balance snapshots and reconciliation against external statements.
//!
//! Snapshots cache per-day activity for reporting; the ledger stays the
//! source of truth and snapshots can always be rebuilt from it.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use kitabu_core::ledger::{
    classify_difference, period_totals, verify_chain, LedgerError, LedgerMovement, PeriodTotals,
    ReconciliationStatus,
};
use kitabu_shared::types::{AccountId, BusinessId, UserId};

use crate::entities::{account_balances, ledger, reconciliations, sea_orm_active_enums};
use crate::repositories::db_err;

const fn status_for(status: ReconciliationStatus) -> sea_orm_active_enums::ReconciliationStatus {
    match status {
        ReconciliationStatus::Pending => sea_orm_active_enums::ReconciliationStatus::Pending,
        ReconciliationStatus::Reconciled => sea_orm_active_enums::ReconciliationStatus::Reconciled,
        ReconciliationStatus::Discrepancy => {
            sea_orm_active_enums::ReconciliationStatus::Discrepancy
        }
    }
}

fn movement_from(row: &ledger::Model) -> LedgerMovement {
    LedgerMovement {
        account_sequence: row.account_sequence,
        date: row.transaction_date,
        is_debit: row.is_debit,
        amount: row.amount,
        signed_change: row.signed_change,
        balance_after: row.balance_after,
    }
}

/// Snapshot and reconciliation repository.
#[derive(Debug, Clone)]
pub struct SnapshotRepository {
    db: DatabaseConnection,
}

impl SnapshotRepository {
    /// Creates a new snapshot repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn movements_for(
        &self,
        account_id: AccountId,
        business_id: BusinessId,
    ) -> Result<Vec<ledger::Model>, LedgerError> {
        ledger::Entity::find()
            .filter(ledger::Column::AccountId.eq(account_id.into_inner()))
            .filter(ledger::Column::BusinessId.eq(business_id.into_inner()))
            .order_by_asc(ledger::Column::AccountSequence)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Computes one account's activity for `date` from the ledger.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger query fails.
    pub async fn compute_day(
        &self,
        account_id: AccountId,
        business_id: BusinessId,
        date: NaiveDate,
    ) -> Result<PeriodTotals, LedgerError> {
        let rows = self.movements_for(account_id, business_id).await?;
        let opening = rows
            .iter()
            .filter(|row| row.transaction_date < date)
            .map(|row| row.signed_change)
            .sum::<Decimal>();
        let movements: Vec<LedgerMovement> = rows.iter().map(movement_from).collect();
        Ok(period_totals(opening, &movements, date))
    }

    /// Writes (or rewrites) the snapshot row for one account and day.
    ///
    /// Snapshots are keyed by account, business and date; recomputing an
    /// existing day overwrites the previous snapshot with fresh figures.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger query or the write fails.
    pub async fn snapshot_day(
        &self,
        account_id: AccountId,
        business_id: BusinessId,
        date: NaiveDate,
    ) -> Result<account_balances::Model, LedgerError> {
        let totals = self.compute_day(account_id, business_id, date).await?;
        let now = chrono::Utc::now().into();

        let existing = account_balances::Entity::find()
            .filter(account_balances::Column::AccountId.eq(account_id.into_inner()))
            .filter(account_balances::Column::BusinessId.eq(business_id.into_inner()))
            .filter(account_balances::Column::BalanceDate.eq(date))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        if let Some(existing) = existing {
            let mut active: account_balances::ActiveModel = existing.into();
            active.opening_balance = Set(totals.opening_balance);
            active.closing_balance = Set(totals.closing_balance);
            active.total_debits = Set(totals.total_debits);
            active.total_credits = Set(totals.total_credits);
            active.updated_at = Set(now);
            return active.update(&self.db).await.map_err(db_err);
        }

        let snapshot = account_balances::ActiveModel {
            id: Set(Uuid::new_v4()),
            account_id: Set(account_id.into_inner()),
            business_id: Set(business_id.into_inner()),
            balance_date: Set(date),
            opening_balance: Set(totals.opening_balance),
            closing_balance: Set(totals.closing_balance),
            total_debits: Set(totals.total_debits),
            total_credits: Set(totals.total_credits),
            created_at: Set(now),
            updated_at: Set(now),
        };
        snapshot.insert(&self.db).await.map_err(db_err)
    }

    /// Reconciles an account against an external statement balance as of
    /// `statement_date`. The system balance is replayed from the ledger up
    /// to and including that date.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger query or the write fails.
    pub async fn reconcile(
        &self,
        account_id: AccountId,
        business_id: BusinessId,
        statement_date: NaiveDate,
        external_balance: Decimal,
        notes: Option<String>,
        reconciled_by: Option<UserId>,
    ) -> Result<reconciliations::Model, LedgerError> {
        let rows = self.movements_for(account_id, business_id).await?;
        let system_balance = rows
            .iter()
            .filter(|row| row.transaction_date <= statement_date)
            .map(|row| row.signed_change)
            .sum::<Decimal>();

        let (difference, status) = classify_difference(system_balance, external_balance);
        let now = chrono::Utc::now().into();

        let record = reconciliations::ActiveModel {
            id: Set(Uuid::new_v4()),
            account_id: Set(account_id.into_inner()),
            business_id: Set(business_id.into_inner()),
            statement_date: Set(statement_date),
            system_balance: Set(system_balance),
            external_balance: Set(external_balance),
            difference: Set(difference),
            status: Set(status_for(status)),
            notes: Set(notes),
            reconciled_by: Set(reconciled_by.map(UserId::into_inner)),
            created_at: Set(now),
            updated_at: Set(now),
        };
        record.insert(&self.db).await.map_err(db_err)
    }

    /// Verifies one account's ledger chain end to end: dense sequences and
    /// consistent `balance_after` values from a zero opening balance.
    ///
    /// The chain runs per account across every business, so a shared
    /// account posted to by several businesses is verified over all of its
    /// rows. A business-filtered view would show gaps where other
    /// businesses posted.
    ///
    /// # Errors
    ///
    /// Returns `ConcurrentModification` at the first discontinuity.
    pub async fn verify_account(&self, account_id: AccountId) -> Result<(), LedgerError> {
        let rows = ledger::Entity::find()
            .filter(ledger::Column::AccountId.eq(account_id.into_inner()))
            .order_by_asc(ledger::Column::AccountSequence)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        let movements: Vec<LedgerMovement> = rows.iter().map(movement_from).collect();
        verify_chain(Decimal::ZERO, &movements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ledger_row(
        business_id: Uuid,
        account_sequence: i64,
        signed_change: Decimal,
        balance_after: Decimal,
    ) -> ledger::Model {
        ledger::Model {
            id: Uuid::new_v4(),
            entry_id: Uuid::new_v4(),
            line_id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            business_id,
            transaction_date: NaiveDate::from_ymd_opt(2026, 1, 28).unwrap(),
            is_debit: true,
            amount: signed_change.abs(),
            signed_change,
            balance_after,
            account_sequence,
            posted_at: chrono::Utc::now().into(),
        }
    }

    #[test]
    fn test_shared_account_chain_spans_businesses() {
        // A shared account posted to by two businesses: its chain is one
        // sequence across both. Filtering rows by business leaves gaps, so
        // verification always runs over the full account history.
        let wtr = Uuid::new_v4();
        let lnd = Uuid::new_v4();
        let rows = vec![
            ledger_row(wtr, 1, dec!(100.00), dec!(100.00)),
            ledger_row(lnd, 2, dec!(50.00), dec!(150.00)),
            ledger_row(wtr, 3, dec!(25.00), dec!(175.00)),
        ];

        let all: Vec<LedgerMovement> = rows.iter().map(movement_from).collect();
        assert!(verify_chain(Decimal::ZERO, &all).is_ok());

        let wtr_only: Vec<LedgerMovement> = rows
            .iter()
            .filter(|row| row.business_id == wtr)
            .map(movement_from)
            .collect();
        assert!(matches!(
            verify_chain(Decimal::ZERO, &wtr_only),
            Err(LedgerError::ConcurrentModification)
        ));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(ReconciliationStatus::Reconciled),
            sea_orm_active_enums::ReconciliationStatus::Reconciled
        );
        assert_eq!(
            status_for(ReconciliationStatus::Discrepancy),
            sea_orm_active_enums::ReconciliationStatus::Discrepancy
        );
        assert_eq!(
            status_for(ReconciliationStatus::Pending),
            sea_orm_active_enums::ReconciliationStatus::Pending
        );
    }
}
