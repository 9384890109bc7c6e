//! Property tests for posting arithmetic.

use std::collections::HashMap;

use proptest::prelude::*;
use rust_decimal::Decimal;

use kitabu_shared::types::{AccountId, JournalEntryId, JournalLineId};

use super::account::NormalBalance;
use super::entry::{JournalLine, LineInput};
use super::posting::{chain_line_effects, entry_totals, reversal_lines, AccountPostingState};

/// Positive amount in cents, quantized to 2dp by construction.
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn line_strategy(accounts: Vec<AccountId>) -> impl Strategy<Value = LineInput> {
    let count = accounts.len();
    (0..count, any::<bool>(), amount_strategy()).prop_map(move |(index, is_debit, amount)| {
        LineInput {
            account_id: accounts[index],
            is_debit,
            amount,
            description: "prop line".to_string(),
        }
    })
}

fn lines_strategy() -> impl Strategy<Value = Vec<LineInput>> {
    let accounts: Vec<AccountId> = (0..4).map(|_| AccountId::new()).collect();
    proptest::collection::vec(line_strategy(accounts), 1..12)
}

fn fresh_states(lines: &[LineInput]) -> HashMap<AccountId, AccountPostingState> {
    lines
        .iter()
        .map(|line| {
            (
                line.account_id,
                AccountPostingState::new(NormalBalance::Debit, Decimal::ZERO, 1),
            )
        })
        .collect()
}

proptest! {
    /// Totals always equal the sum of the signed sides.
    #[test]
    fn prop_totals_partition_lines(lines in lines_strategy()) {
        let totals = entry_totals(&lines);
        let debit: Decimal = lines.iter().filter(|l| l.is_debit).map(|l| l.amount).sum();
        let credit: Decimal = lines.iter().filter(|l| !l.is_debit).map(|l| l.amount).sum();
        prop_assert_eq!(totals.debit, debit);
        prop_assert_eq!(totals.credit, credit);
        prop_assert_eq!(totals.difference(), debit - credit);
    }

    /// Each effect's balance_after equals the previous balance for that
    /// account plus the signed change, and the final balances equal the sum
    /// of signed changes.
    #[test]
    fn prop_chain_is_continuous(lines in lines_strategy()) {
        let mut states = fresh_states(&lines);
        let effects = chain_line_effects(&lines, &mut states).unwrap();
        prop_assert_eq!(effects.len(), lines.len());

        let mut running: HashMap<AccountId, Decimal> = HashMap::new();
        for effect in &effects {
            let balance = running.entry(effect.account_id).or_insert(Decimal::ZERO);
            *balance += effect.signed_change;
            prop_assert_eq!(effect.balance_after, *balance);
        }
        for (account_id, state) in &states {
            prop_assert_eq!(state.balance, running[account_id]);
        }
    }

    /// Per-account sequences come out dense: 1..=n with no gaps or repeats.
    #[test]
    fn prop_account_sequences_are_dense(lines in lines_strategy()) {
        let mut states = fresh_states(&lines);
        let effects = chain_line_effects(&lines, &mut states).unwrap();

        let mut seen: HashMap<AccountId, Vec<i64>> = HashMap::new();
        for effect in &effects {
            seen.entry(effect.account_id).or_default().push(effect.account_sequence);
        }
        for sequences in seen.values() {
            let expected: Vec<i64> = (1..=sequences.len() as i64).collect();
            prop_assert_eq!(sequences, &expected);
        }
    }

    /// Posting an entry then its reversal returns every account to its
    /// starting balance.
    #[test]
    fn prop_reversal_restores_balances(lines in lines_strategy()) {
        let entry_id = JournalEntryId::new();
        let committed: Vec<JournalLine> = lines
            .iter()
            .map(|line| JournalLine {
                id: JournalLineId::new(),
                entry_id,
                account_id: line.account_id,
                is_debit: line.is_debit,
                amount: line.amount,
                description: line.description.clone(),
            })
            .collect();

        let mut states = fresh_states(&lines);
        chain_line_effects(&lines, &mut states).unwrap();
        chain_line_effects(&reversal_lines(&committed), &mut states).unwrap();

        for state in states.values() {
            prop_assert_eq!(state.balance, Decimal::ZERO);
        }
    }

    /// Reversal preserves accounts and amounts while flipping every side.
    #[test]
    fn prop_reversal_flips_every_side(lines in lines_strategy()) {
        let entry_id = JournalEntryId::new();
        let committed: Vec<JournalLine> = lines
            .iter()
            .map(|line| JournalLine {
                id: JournalLineId::new(),
                entry_id,
                account_id: line.account_id,
                is_debit: line.is_debit,
                amount: line.amount,
                description: line.description.clone(),
            })
            .collect();

        let reversed = reversal_lines(&committed);
        prop_assert_eq!(reversed.len(), committed.len());
        for (original, reversal) in committed.iter().zip(&reversed) {
            prop_assert_eq!(reversal.account_id, original.account_id);
            prop_assert_eq!(reversal.amount, original.amount);
            prop_assert_ne!(reversal.is_debit, original.is_debit);
        }
    }
}
