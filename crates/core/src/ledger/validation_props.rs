//! Property tests for posting validation.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use kitabu_shared::types::{AccountId, BusinessId, UserId};

use super::account::{AccountInfo, AccountKind};
use super::entry::LineInput;
use super::error::LedgerError;
use super::journal::TransactionKind;
use super::validation::{validate_posting, BusinessInfo, PostingInput};

fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn active_account(id: AccountId) -> Result<AccountInfo, LedgerError> {
    Ok(AccountInfo {
        id,
        kind: AccountKind::Asset,
        is_contra: false,
        is_active: true,
        business_id: None,
    })
}

fn active_business(id: BusinessId) -> Result<BusinessInfo, LedgerError> {
    Ok(BusinessInfo {
        id,
        code: "WTR".to_string(),
        is_active: true,
    })
}

fn input_with(lines: Vec<LineInput>) -> PostingInput {
    PostingInput {
        business_id: BusinessId::new(),
        kind: TransactionKind::Sale,
        date: NaiveDate::from_ymd_opt(2026, 1, 28).unwrap(),
        description: "prop".to_string(),
        reference: None,
        lines,
        created_by: UserId::new(),
    }
}

fn debit(amount: Decimal) -> LineInput {
    LineInput {
        account_id: AccountId::new(),
        is_debit: true,
        amount,
        description: "debit".to_string(),
    }
}

fn credit(amount: Decimal) -> LineInput {
    LineInput {
        is_debit: false,
        ..debit(amount)
    }
}

proptest! {
    /// Mirrored amounts always validate; the returned totals are equal.
    #[test]
    fn prop_mirrored_amounts_validate(amounts in proptest::collection::vec(amount_strategy(), 1..8)) {
        let mut lines = Vec::new();
        for amount in &amounts {
            lines.push(debit(*amount));
            lines.push(credit(*amount));
        }
        let totals = validate_posting(&input_with(lines), active_account, active_business).unwrap();
        prop_assert!(totals.is_balanced());
        let expected: Decimal = amounts.iter().sum();
        prop_assert_eq!(totals.debit, expected);
    }

    /// Perturbing one side by any nonzero cent amount breaks validation
    /// with UnbalancedEntry.
    #[test]
    fn prop_perturbed_entry_rejected(
        amount in amount_strategy(),
        perturbation in 1i64..100_000,
    ) {
        let lines = vec![
            debit(amount),
            credit(amount + Decimal::new(perturbation, 2)),
        ];
        let err = validate_posting(&input_with(lines), active_account, active_business).unwrap_err();
        prop_assert!(
            matches!(err, LedgerError::UnbalancedEntry { .. }),
            "expected UnbalancedEntry, got {err:?}"
        );
    }

    /// Any line with more than 2 decimal places is rejected regardless of
    /// whether the entry balances.
    #[test]
    fn prop_sub_cent_precision_rejected(micros in 1i64..1_000_000) {
        // 6dp amount that is not representable in cents
        let amount = Decimal::new(micros * 10 + 1, 6);
        let lines = vec![debit(amount), credit(amount)];
        let err = validate_posting(&input_with(lines), active_account, active_business).unwrap_err();
        prop_assert!(
            matches!(err, LedgerError::UnquantizedAmount { .. }),
            "expected UnquantizedAmount, got {err:?}"
        );
    }

    /// All-debit or all-credit entries never validate.
    #[test]
    fn prop_single_sided_rejected(
        amounts in proptest::collection::vec(amount_strategy(), 2..8),
        debit_side in any::<bool>(),
    ) {
        let lines: Vec<LineInput> = amounts
            .iter()
            .map(|a| if debit_side { debit(*a) } else { credit(*a) })
            .collect();
        let err = validate_posting(&input_with(lines), active_account, active_business).unwrap_err();
        prop_assert!(matches!(err, LedgerError::SingleSided));
    }
}
