//! Journal entry line domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kitabu_shared::types::{AccountId, JournalEntryId, JournalLineId};

/// Input for a single debit or credit leg of a proposed transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineInput {
    /// The account to post to.
    pub account_id: AccountId,
    /// True = debit, false = credit.
    pub is_debit: bool,
    /// Positive amount, two decimal places.
    pub amount: Decimal,
    /// Line description.
    pub description: String,
}

impl LineInput {
    /// Signed amount: positive for debit, negative for credit.
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        if self.is_debit { self.amount } else { -self.amount }
    }
}

/// One committed leg of a journal entry. Immutable once the parent entry
/// is posted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalLine {
    /// Unique identifier.
    pub id: JournalLineId,
    /// The parent journal entry.
    pub entry_id: JournalEntryId,
    /// The account affected by this line.
    pub account_id: AccountId,
    /// True = debit, false = credit.
    pub is_debit: bool,
    /// Positive amount, two decimal places.
    pub amount: Decimal,
    /// Line description.
    pub description: String,
}

impl JournalLine {
    /// Signed amount: positive for debit, negative for credit.
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        if self.is_debit { self.amount } else { -self.amount }
    }
}
