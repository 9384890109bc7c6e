//! Business rule validation for proposed transactions.
//!
//! This is the single point enforcing the accounting identity. It is always
//! re-run server-side before any persistence, even if a caller claims
//! pre-validated input.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kitabu_shared::types::{is_quantized_2dp, AccountId, BusinessId, UserId};

use super::account::AccountInfo;
use super::entry::LineInput;
use super::error::LedgerError;
use super::journal::TransactionKind;
use super::posting::EntryTotals;

/// A proposed transaction: everything a business collaborator supplies to
/// `PostTransaction`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostingInput {
    /// The business this transaction belongs to.
    pub business_id: BusinessId,
    /// Transaction kind.
    pub kind: TransactionKind,
    /// Transaction date (also the numbering scope date).
    pub date: NaiveDate,
    /// Description.
    pub description: String,
    /// External reference (invoice number, receipt number, etc.).
    pub reference: Option<String>,
    /// The debit/credit legs (at least 2).
    pub lines: Vec<LineInput>,
    /// The user posting the transaction.
    pub created_by: UserId,
}

/// Information about a business needed for validation.
#[derive(Debug, Clone)]
pub struct BusinessInfo {
    /// The business ID.
    pub id: BusinessId,
    /// Short code (e.g. WTR, LND, RTL).
    pub code: String,
    /// Whether the business is active.
    pub is_active: bool,
}

/// Validates a proposed transaction before any persistence.
///
/// Checks, in order:
/// 1. The business exists and is active
/// 2. Line count >= 2
/// 3. Every amount is strictly positive and quantized to 2 decimal places
/// 4. Every referenced account exists, is active, and belongs to the stated
///    business or is shared
/// 5. Both debit and credit sides are present
/// 6. sum(debits) == sum(credits), exact decimal equality
///
/// Account and business information come from caller-supplied lookups so the
/// rules stay free of storage concerns.
///
/// # Errors
///
/// Returns the specific violated rule; nothing is committed.
pub fn validate_posting<A, B>(
    input: &PostingInput,
    account_lookup: A,
    business_lookup: B,
) -> Result<EntryTotals, LedgerError>
where
    A: Fn(AccountId) -> Result<AccountInfo, LedgerError>,
    B: Fn(BusinessId) -> Result<BusinessInfo, LedgerError>,
{
    let business = business_lookup(input.business_id)?;
    if !business.is_active {
        return Err(LedgerError::BusinessInactive(input.business_id));
    }

    if input.lines.len() < 2 {
        return Err(LedgerError::InsufficientLines {
            count: input.lines.len(),
        });
    }

    let mut total_debit = Decimal::ZERO;
    let mut total_credit = Decimal::ZERO;
    let mut has_debit = false;
    let mut has_credit = false;

    for (index, line) in input.lines.iter().enumerate() {
        if line.amount == Decimal::ZERO {
            return Err(LedgerError::ZeroAmount { line: index });
        }
        if line.amount < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount { line: index });
        }
        if !is_quantized_2dp(line.amount) {
            return Err(LedgerError::UnquantizedAmount {
                line: index,
                amount: line.amount,
            });
        }

        let account = account_lookup(line.account_id)?;
        if !account.is_active {
            return Err(LedgerError::AccountInactive(line.account_id));
        }
        if !account.may_post_for(input.business_id) {
            return Err(LedgerError::AccountBusinessMismatch {
                account_id: line.account_id,
                business_id: input.business_id,
            });
        }

        if line.is_debit {
            total_debit += line.amount;
            has_debit = true;
        } else {
            total_credit += line.amount;
            has_credit = true;
        }
    }

    if !has_debit || !has_credit {
        return Err(LedgerError::SingleSided);
    }

    if total_debit != total_credit {
        return Err(LedgerError::UnbalancedEntry {
            debit: total_debit,
            credit: total_credit,
        });
    }

    Ok(EntryTotals::new(total_debit, total_credit))
}
