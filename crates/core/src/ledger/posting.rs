//! Pure posting arithmetic: entry totals, per-account balance chains and
//! reversal construction.
//!
//! Everything here is deterministic and storage-free. The database layer
//! loads current account state under row locks, runs these functions, and
//! persists the results in one transaction.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kitabu_shared::types::AccountId;

use super::account::{balance_change, NormalBalance};
use super::entry::{JournalLine, LineInput};
use super::error::LedgerError;

/// Debit and credit totals of a proposed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryTotals {
    /// Sum of debit lines.
    pub debit: Decimal,
    /// Sum of credit lines.
    pub credit: Decimal,
}

impl EntryTotals {
    /// Creates totals.
    #[must_use]
    pub const fn new(debit: Decimal, credit: Decimal) -> Self {
        Self { debit, credit }
    }

    /// True if debits equal credits exactly.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.debit == self.credit
    }

    /// `debit - credit`; zero for a balanced entry.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.debit - self.credit
    }
}

/// Sums the debit and credit sides of a line set.
#[must_use]
pub fn entry_totals(lines: &[LineInput]) -> EntryTotals {
    let mut totals = EntryTotals::new(Decimal::ZERO, Decimal::ZERO);
    for line in lines {
        if line.is_debit {
            totals.debit += line.amount;
        } else {
            totals.credit += line.amount;
        }
    }
    totals
}

/// Mutable per-account state carried through a posting run.
///
/// Loaded from storage under an exclusive row lock before the chain is
/// computed, so no other writer can interleave.
#[derive(Debug, Clone, Copy)]
pub struct AccountPostingState {
    /// The account's effective normal balance.
    pub normal: NormalBalance,
    /// Running balance after the last committed ledger row.
    pub balance: Decimal,
    /// Next per-account ledger row sequence (1-based).
    pub next_sequence: i64,
}

impl AccountPostingState {
    /// Creates posting state for an account.
    #[must_use]
    pub const fn new(normal: NormalBalance, balance: Decimal, next_sequence: i64) -> Self {
        Self {
            normal,
            balance,
            next_sequence,
        }
    }
}

/// The ledger-row-shaped result of applying one line to its account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineEffect {
    /// The affected account.
    pub account_id: AccountId,
    /// True = debit, false = credit.
    pub is_debit: bool,
    /// Positive line amount.
    pub amount: Decimal,
    /// Signed balance delta after the normal-balance rule.
    pub signed_change: Decimal,
    /// Account balance after this line is applied.
    pub balance_after: Decimal,
    /// Per-account ledger row sequence this line occupies.
    pub account_sequence: i64,
}

/// Applies lines to account balances in order, producing one effect per line.
///
/// Lines hitting the same account chain through it sequentially: the second
/// line's `balance_after` builds on the first's. Lines are never netted, so
/// a debit and credit to the same account both leave a ledger row.
///
/// # Errors
///
/// Returns `AccountNotFound` if a line references an account missing from
/// `states`. Callers load every referenced account before calling.
pub fn chain_line_effects(
    lines: &[LineInput],
    states: &mut HashMap<AccountId, AccountPostingState>,
) -> Result<Vec<LineEffect>, LedgerError> {
    let mut effects = Vec::with_capacity(lines.len());
    for line in lines {
        let state = states
            .get_mut(&line.account_id)
            .ok_or(LedgerError::AccountNotFound(line.account_id))?;

        let signed_change = balance_change(state.normal, line.is_debit, line.amount);
        state.balance += signed_change;
        let account_sequence = state.next_sequence;
        state.next_sequence += 1;

        effects.push(LineEffect {
            account_id: line.account_id,
            is_debit: line.is_debit,
            amount: line.amount,
            signed_change,
            balance_after: state.balance,
            account_sequence,
        });
    }
    Ok(effects)
}

/// Builds the line set of a reversing entry: same accounts and amounts with
/// every debit/credit side flipped.
#[must_use]
pub fn reversal_lines(lines: &[JournalLine]) -> Vec<LineInput> {
    lines
        .iter()
        .map(|line| LineInput {
            account_id: line.account_id,
            is_debit: !line.is_debit,
            amount: line.amount,
            description: format!("Reversal: {}", line.description),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kitabu_shared::types::{JournalEntryId, JournalLineId};
    use rust_decimal_macros::dec;

    fn line(account_id: AccountId, is_debit: bool, amount: Decimal) -> LineInput {
        LineInput {
            account_id,
            is_debit,
            amount,
            description: "line".to_string(),
        }
    }

    #[test]
    fn test_entry_totals() {
        let a = AccountId::new();
        let b = AccountId::new();
        let totals = entry_totals(&[
            line(a, true, dec!(600.00)),
            line(a, true, dec!(400.00)),
            line(b, false, dec!(1000.00)),
        ]);
        assert_eq!(totals.debit, dec!(1000.00));
        assert_eq!(totals.credit, dec!(1000.00));
        assert!(totals.is_balanced());
        assert_eq!(totals.difference(), Decimal::ZERO);
    }

    #[test]
    fn test_chain_applies_normal_balance_rule() {
        let cash = AccountId::new();
        let sales = AccountId::new();
        let mut states = HashMap::from([
            (
                cash,
                AccountPostingState::new(NormalBalance::Debit, dec!(500.00), 3),
            ),
            (
                sales,
                AccountPostingState::new(NormalBalance::Credit, dec!(2000.00), 8),
            ),
        ]);

        let effects = chain_line_effects(
            &[line(cash, true, dec!(150.00)), line(sales, false, dec!(150.00))],
            &mut states,
        )
        .unwrap();

        assert_eq!(effects[0].signed_change, dec!(150.00));
        assert_eq!(effects[0].balance_after, dec!(650.00));
        assert_eq!(effects[0].account_sequence, 3);

        assert_eq!(effects[1].signed_change, dec!(150.00));
        assert_eq!(effects[1].balance_after, dec!(2150.00));
        assert_eq!(effects[1].account_sequence, 8);

        assert_eq!(states[&cash].next_sequence, 4);
        assert_eq!(states[&sales].next_sequence, 9);
    }

    #[test]
    fn test_same_account_lines_chain_not_net() {
        let cash = AccountId::new();
        let sales = AccountId::new();
        let mut states = HashMap::from([
            (
                cash,
                AccountPostingState::new(NormalBalance::Debit, dec!(100.00), 1),
            ),
            (
                sales,
                AccountPostingState::new(NormalBalance::Credit, dec!(0.00), 1),
            ),
        ]);

        // Debit and credit the same account in one entry: two rows, chained.
        let effects = chain_line_effects(
            &[
                line(cash, true, dec!(50.00)),
                line(cash, false, dec!(20.00)),
                line(sales, false, dec!(30.00)),
            ],
            &mut states,
        )
        .unwrap();

        assert_eq!(effects.len(), 3);
        assert_eq!(effects[0].balance_after, dec!(150.00));
        assert_eq!(effects[0].account_sequence, 1);
        assert_eq!(effects[1].balance_after, dec!(130.00));
        assert_eq!(effects[1].account_sequence, 2);
        assert_eq!(effects[2].balance_after, dec!(30.00));
    }

    #[test]
    fn test_missing_account_state_errors() {
        let mut states = HashMap::new();
        let err = chain_line_effects(&[line(AccountId::new(), true, dec!(10.00))], &mut states)
            .unwrap_err();
        assert!(matches!(err, LedgerError::AccountNotFound(_)));
    }

    #[test]
    fn test_reversal_flips_sides() {
        let entry_id = JournalEntryId::new();
        let original = vec![
            JournalLine {
                id: JournalLineId::new(),
                entry_id,
                account_id: AccountId::new(),
                is_debit: true,
                amount: dec!(75.00),
                description: "Cash received".to_string(),
            },
            JournalLine {
                id: JournalLineId::new(),
                entry_id,
                account_id: AccountId::new(),
                is_debit: false,
                amount: dec!(75.00),
                description: "Water sales".to_string(),
            },
        ];

        let reversed = reversal_lines(&original);
        assert_eq!(reversed.len(), 2);
        assert!(!reversed[0].is_debit);
        assert!(reversed[1].is_debit);
        assert_eq!(reversed[0].amount, dec!(75.00));
        assert_eq!(reversed[0].account_id, original[0].account_id);
        assert!(reversed[0].description.starts_with("Reversal:"));
    }

    #[test]
    fn test_reversal_nets_to_zero() {
        let cash = AccountId::new();
        let sales = AccountId::new();
        let entry_id = JournalEntryId::new();
        let original = vec![
            JournalLine {
                id: JournalLineId::new(),
                entry_id,
                account_id: cash,
                is_debit: true,
                amount: dec!(200.00),
                description: "Cash".to_string(),
            },
            JournalLine {
                id: JournalLineId::new(),
                entry_id,
                account_id: sales,
                is_debit: false,
                amount: dec!(200.00),
                description: "Sales".to_string(),
            },
        ];

        let mut states = HashMap::from([
            (cash, AccountPostingState::new(NormalBalance::Debit, dec!(0.00), 1)),
            (
                sales,
                AccountPostingState::new(NormalBalance::Credit, dec!(0.00), 1),
            ),
        ]);

        let forward: Vec<LineInput> = original
            .iter()
            .map(|l| line(l.account_id, l.is_debit, l.amount))
            .collect();
        chain_line_effects(&forward, &mut states).unwrap();
        chain_line_effects(&reversal_lines(&original), &mut states).unwrap();

        assert_eq!(states[&cash].balance, Decimal::ZERO);
        assert_eq!(states[&sales].balance, Decimal::ZERO);
    }
}
