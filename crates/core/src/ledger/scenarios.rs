//! End-to-end walkthroughs of the domain pipeline: validate, number, chain.
//!
//! These mirror how the posting repository drives the pure functions, with
//! storage replaced by in-memory state.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use kitabu_shared::types::{AccountId, BusinessId, UserId};

use super::account::{AccountInfo, AccountKind};
use super::entry::LineInput;
use super::journal::TransactionKind;
use super::posting::{chain_line_effects, AccountPostingState};
use super::sequence::{DocPrefix, EntryNumber};
use super::validation::{validate_posting, BusinessInfo, PostingInput};
use super::LedgerError;

fn shared_account(id: AccountId, kind: AccountKind) -> AccountInfo {
    AccountInfo {
        id,
        kind,
        is_contra: false,
        is_active: true,
        business_id: None,
    }
}

/// A water-packaging cash sale: debit Cash 1000.00, credit Sales Revenue
/// 1000.00 on 2026-01-28, the first entry of that day.
#[test]
fn test_cash_sale_walkthrough() {
    let cash = AccountId::new();
    let sales = AccountId::new();
    let wtr = BusinessId::new();

    let infos = HashMap::from([
        (cash, shared_account(cash, AccountKind::Asset)),
        (sales, shared_account(sales, AccountKind::Revenue)),
    ]);

    let input = PostingInput {
        business_id: wtr,
        kind: TransactionKind::Sale,
        date: NaiveDate::from_ymd_opt(2026, 1, 28).unwrap(),
        description: "Bottled water sale".to_string(),
        reference: None,
        lines: vec![
            LineInput {
                account_id: cash,
                is_debit: true,
                amount: dec!(1000.00),
                description: "Cash received".to_string(),
            },
            LineInput {
                account_id: sales,
                is_debit: false,
                amount: dec!(1000.00),
                description: "Water sales".to_string(),
            },
        ],
        created_by: UserId::new(),
    };

    let totals = validate_posting(
        &input,
        |id| {
            infos
                .get(&id)
                .cloned()
                .ok_or(LedgerError::AccountNotFound(id))
        },
        |id| {
            Ok(BusinessInfo {
                id,
                code: "WTR".to_string(),
                is_active: true,
            })
        },
    )
    .unwrap();
    assert_eq!(totals.debit, dec!(1000.00));
    assert_eq!(totals.credit, dec!(1000.00));

    // First allocation of the day in the JE scope.
    let number = EntryNumber::new(DocPrefix::Je, input.date, 1);
    assert_eq!(number.to_string(), "JE-20260128-0001");

    let mut states = HashMap::from([
        (
            cash,
            AccountPostingState::new(
                infos[&cash].effective_normal_balance(),
                dec!(0.00),
                1,
            ),
        ),
        (
            sales,
            AccountPostingState::new(
                infos[&sales].effective_normal_balance(),
                dec!(0.00),
                1,
            ),
        ),
    ]);
    let effects = chain_line_effects(&input.lines, &mut states).unwrap();

    // One ledger row per line; both accounts increase by 1000.00 (Cash is
    // debit-normal, Sales Revenue credit-normal) and each row's
    // balance_after matches the account's resulting balance.
    assert_eq!(effects.len(), 2);
    assert_eq!(effects[0].signed_change, dec!(1000.00));
    assert_eq!(effects[1].signed_change, dec!(1000.00));
    assert_eq!(effects[0].balance_after, states[&cash].balance);
    assert_eq!(effects[1].balance_after, states[&sales].balance);
    assert_eq!(states[&cash].balance, dec!(1000.00));
    assert_eq!(states[&sales].balance, dec!(1000.00));
}

/// An unbalanced proposal (debit 1000.00, credit 900.00) is rejected before
/// any balance state is touched.
#[test]
fn test_unbalanced_sale_rejected_before_effects() {
    let cash = AccountId::new();
    let sales = AccountId::new();
    let infos = HashMap::from([
        (cash, shared_account(cash, AccountKind::Asset)),
        (sales, shared_account(sales, AccountKind::Revenue)),
    ]);

    let input = PostingInput {
        business_id: BusinessId::new(),
        kind: TransactionKind::Sale,
        date: NaiveDate::from_ymd_opt(2026, 1, 28).unwrap(),
        description: "Miskeyed sale".to_string(),
        reference: None,
        lines: vec![
            LineInput {
                account_id: cash,
                is_debit: true,
                amount: dec!(1000.00),
                description: "Cash".to_string(),
            },
            LineInput {
                account_id: sales,
                is_debit: false,
                amount: dec!(900.00),
                description: "Sales".to_string(),
            },
        ],
        created_by: UserId::new(),
    };

    let err = validate_posting(
        &input,
        |id| {
            infos
                .get(&id)
                .cloned()
                .ok_or(LedgerError::AccountNotFound(id))
        },
        |id| {
            Ok(BusinessInfo {
                id,
                code: "WTR".to_string(),
                is_active: true,
            })
        },
    )
    .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::UnbalancedEntry {
            debit,
            credit,
        } if debit == dec!(1000.00) && credit == dec!(900.00)
    ));
}
