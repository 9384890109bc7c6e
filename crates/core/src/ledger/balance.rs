//! Balance replay, period snapshots and reconciliation arithmetic.
//!
//! The ledger is the source of truth: any cached account balance must equal
//! the replay of that account's signed changes in order. These helpers give
//! the verification and snapshot math over ledger-row-shaped inputs.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::LedgerError;

/// One committed ledger movement for a single account, in row order.
#[derive(Debug, Clone, Copy)]
pub struct LedgerMovement {
    /// Per-account sequence (1-based, dense).
    pub account_sequence: i64,
    /// Transaction date of the owning entry.
    pub date: NaiveDate,
    /// True = debit, false = credit.
    pub is_debit: bool,
    /// Positive amount.
    pub amount: Decimal,
    /// Signed balance delta.
    pub signed_change: Decimal,
    /// Balance recorded after this movement.
    pub balance_after: Decimal,
}

/// Replays signed changes over an opening balance.
#[must_use]
pub fn replay_balance(opening: Decimal, movements: &[LedgerMovement]) -> Decimal {
    movements
        .iter()
        .fold(opening, |balance, m| balance + m.signed_change)
}

/// Verifies that a ledger slice forms an unbroken chain: sequences are
/// dense and ascending, and each `balance_after` equals the previous
/// balance plus the signed change.
///
/// # Errors
///
/// Returns `ConcurrentModification` at the first discontinuity. A broken
/// chain means rows were lost, reordered or tampered with.
pub fn verify_chain(opening: Decimal, movements: &[LedgerMovement]) -> Result<(), LedgerError> {
    let mut balance = opening;
    let mut expected_sequence: Option<i64> = None;

    for movement in movements {
        if let Some(expected) = expected_sequence
            && movement.account_sequence != expected
        {
            return Err(LedgerError::ConcurrentModification);
        }
        balance += movement.signed_change;
        if movement.balance_after != balance {
            return Err(LedgerError::ConcurrentModification);
        }
        expected_sequence = Some(movement.account_sequence + 1);
    }
    Ok(())
}

/// Per-account activity summary for one period (typically one day).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodTotals {
    /// Balance before the period's first movement.
    pub opening_balance: Decimal,
    /// Balance after the period's last movement.
    pub closing_balance: Decimal,
    /// Sum of debit amounts in the period.
    pub total_debits: Decimal,
    /// Sum of credit amounts in the period.
    pub total_credits: Decimal,
}

/// Summarizes the movements falling on `date`, given the balance carried
/// in from before that date.
///
/// An account with no movements on `date` yields equal opening and closing
/// balances and zero activity.
#[must_use]
pub fn period_totals(opening: Decimal, movements: &[LedgerMovement], date: NaiveDate) -> PeriodTotals {
    let mut totals = PeriodTotals {
        opening_balance: opening,
        closing_balance: opening,
        total_debits: Decimal::ZERO,
        total_credits: Decimal::ZERO,
    };
    for movement in movements.iter().filter(|m| m.date == date) {
        if movement.is_debit {
            totals.total_debits += movement.amount;
        } else {
            totals.total_credits += movement.amount;
        }
        totals.closing_balance += movement.signed_change;
    }
    totals
}

/// Outcome of comparing a system balance against an external statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconciliationStatus {
    /// Not yet reconciled.
    Pending,
    /// System and external balances agree exactly.
    Reconciled,
    /// Balances disagree; the difference needs investigation.
    Discrepancy,
}

/// Computes `external - system` and classifies the outcome.
///
/// Zero difference reconciles; any nonzero difference, either sign, is a
/// discrepancy.
#[must_use]
pub fn classify_difference(system: Decimal, external: Decimal) -> (Decimal, ReconciliationStatus) {
    let difference = external - system;
    let status = if difference == Decimal::ZERO {
        ReconciliationStatus::Reconciled
    } else {
        ReconciliationStatus::Discrepancy
    };
    (difference, status)
}
