//! Account classification and the normal-balance rule.
//!
//! In double-entry bookkeeping:
//! - Debits increase asset/expense accounts, decrease liability/equity/revenue accounts
//! - Credits decrease asset/expense accounts, increase liability/equity/revenue accounts
//!
//! Contra accounts invert their kind's normal balance (e.g. accumulated
//! depreciation is an asset account that increases on credit).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kitabu_shared::types::{AccountId, BusinessId};

/// High-level account kind (determines normal balance side).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    /// Resources owned (cash, inventory, receivables).
    Asset,
    /// Obligations owed (payables, loans).
    Liability,
    /// Owner's residual interest.
    Equity,
    /// Income earned.
    Revenue,
    /// Costs incurred.
    Expense,
}

impl AccountKind {
    /// The side on which this kind naturally increases.
    #[must_use]
    pub const fn normal_balance(self) -> NormalBalance {
        match self {
            Self::Asset | Self::Expense => NormalBalance::Debit,
            Self::Liability | Self::Equity | Self::Revenue => NormalBalance::Credit,
        }
    }

    /// Single-letter code used in account numbering (A, L, E, R, X).
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::Asset => 'A',
            Self::Liability => 'L',
            Self::Equity => 'E',
            Self::Revenue => 'R',
            Self::Expense => 'X',
        }
    }
}

/// The debit/credit side on which an account's balance increases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalBalance {
    /// Balance increases on debit.
    Debit,
    /// Balance increases on credit.
    Credit,
}

impl NormalBalance {
    /// Returns the opposite side.
    #[must_use]
    pub const fn inverted(self) -> Self {
        match self {
            Self::Debit => Self::Credit,
            Self::Credit => Self::Debit,
        }
    }
}

/// The normal balance an account actually obeys, after contra inversion.
#[must_use]
pub const fn effective_normal_balance(kind: AccountKind, is_contra: bool) -> NormalBalance {
    let normal = kind.normal_balance();
    if is_contra { normal.inverted() } else { normal }
}

/// Signed change a single movement applies to an account balance.
///
/// Debit increases balance when the effective normal balance is debit,
/// decreases it otherwise; credit is the mirror image. `amount` is always
/// positive; the sign comes from this rule.
#[must_use]
pub fn balance_change(normal: NormalBalance, is_debit: bool, amount: Decimal) -> Decimal {
    match (normal, is_debit) {
        (NormalBalance::Debit, true) | (NormalBalance::Credit, false) => amount,
        (NormalBalance::Debit, false) | (NormalBalance::Credit, true) => -amount,
    }
}

/// Information about an account needed for validation and posting.
#[derive(Debug, Clone)]
pub struct AccountInfo {
    /// The account ID.
    pub id: AccountId,
    /// The account kind.
    pub kind: AccountKind,
    /// Whether the account inverts its kind's normal balance.
    pub is_contra: bool,
    /// Whether the account is active.
    pub is_active: bool,
    /// Owning business; `None` means shared across all businesses.
    pub business_id: Option<BusinessId>,
}

impl AccountInfo {
    /// The normal balance this account obeys.
    #[must_use]
    pub const fn effective_normal_balance(&self) -> NormalBalance {
        effective_normal_balance(self.kind, self.is_contra)
    }

    /// True if entries for `business_id` may post to this account.
    #[must_use]
    pub fn may_post_for(&self, business_id: BusinessId) -> bool {
        match self.business_id {
            None => true, // shared account
            Some(owner) => owner == business_id,
        }
    }
}
