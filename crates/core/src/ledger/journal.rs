//! Journal entry header aggregate.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kitabu_shared::types::{BusinessId, JournalEntryId, UserId};

use super::entry::JournalLine;
use super::sequence::EntryNumber;

/// Journal entry lifecycle status.
///
/// Entries are born posted by the posting pipeline; a posted entry may only
/// transition to reversed via a compensating entry, never edited in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Entry is being drafted (not yet committed to the ledger).
    Draft,
    /// Entry is committed to the ledger (immutable).
    Posted,
    /// Entry has been negated by a reversing entry (immutable).
    Reversed,
}

impl EntryStatus {
    /// Returns true if the entry can no longer be modified.
    #[must_use]
    pub const fn is_immutable(self) -> bool {
        matches!(self, Self::Posted | Self::Reversed)
    }

    /// Returns true if a reversal may target this entry.
    #[must_use]
    pub const fn can_reverse(self) -> bool {
        matches!(self, Self::Posted)
    }
}

/// Transaction kind classification (static reference data).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Sale or service income.
    Sale,
    /// Expense payment.
    Expense,
    /// Cash/bank deposit.
    Deposit,
    /// Cash/bank withdrawal.
    Withdrawal,
    /// Transfer between accounts.
    Transfer,
    /// Adjustment entry.
    Adjustment,
    /// Reversal of a previous entry.
    Reversal,
}

impl TransactionKind {
    /// Short code stored in the transaction type reference table.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Sale => "SALE",
            Self::Expense => "EXP",
            Self::Deposit => "DEP",
            Self::Withdrawal => "WDR",
            Self::Transfer => "TRF",
            Self::Adjustment => "ADJ",
            Self::Reversal => "REV",
        }
    }

    /// Looks a kind up by its stored code.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "SALE" => Some(Self::Sale),
            "EXP" => Some(Self::Expense),
            "DEP" => Some(Self::Deposit),
            "WDR" => Some(Self::Withdrawal),
            "TRF" => Some(Self::Transfer),
            "ADJ" => Some(Self::Adjustment),
            "REV" => Some(Self::Reversal),
            _ => None,
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sale => "Sale",
            Self::Expense => "Expense",
            Self::Deposit => "Deposit",
            Self::Withdrawal => "Withdrawal",
            Self::Transfer => "Transfer",
            Self::Adjustment => "Adjustment",
            Self::Reversal => "Reversal",
        }
    }
}

/// A balanced journal entry header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Unique identifier.
    pub id: JournalEntryId,
    /// Sequential human-readable number, e.g. `JE-20260128-0001`.
    pub entry_number: EntryNumber,
    /// Business this entry belongs to.
    pub business_id: BusinessId,
    /// Transaction kind.
    pub kind: TransactionKind,
    /// Transaction date.
    pub transaction_date: NaiveDate,
    /// Description.
    pub description: String,
    /// External reference (invoice number, receipt number, etc.).
    pub reference: Option<String>,
    /// Current status.
    pub status: EntryStatus,
    /// Sum of debit lines. Always equals `total_credit` for posted entries.
    pub total_debit: Decimal,
    /// Sum of credit lines.
    pub total_credit: Decimal,
    /// User who created the entry.
    pub created_by: UserId,
    /// When the entry was created.
    pub created_at: DateTime<Utc>,
    /// When the entry was posted.
    pub posted_at: Option<DateTime<Utc>>,
    /// Lines (populated when needed).
    #[serde(default)]
    pub lines: Vec<JournalLine>,
}

impl JournalEntry {
    /// Returns true if the entry satisfies the double-entry identity.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.total_debit == self.total_credit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_immutability() {
        assert!(!EntryStatus::Draft.is_immutable());
        assert!(EntryStatus::Posted.is_immutable());
        assert!(EntryStatus::Reversed.is_immutable());
    }

    #[test]
    fn test_only_posted_can_reverse() {
        assert!(!EntryStatus::Draft.can_reverse());
        assert!(EntryStatus::Posted.can_reverse());
        assert!(!EntryStatus::Reversed.can_reverse());
    }

    #[test]
    fn test_kind_codes_are_unique() {
        let kinds = [
            TransactionKind::Sale,
            TransactionKind::Expense,
            TransactionKind::Deposit,
            TransactionKind::Withdrawal,
            TransactionKind::Transfer,
            TransactionKind::Adjustment,
            TransactionKind::Reversal,
        ];
        let codes: std::collections::HashSet<&str> = kinds.iter().map(|k| k.code()).collect();
        assert_eq!(codes.len(), kinds.len());

        for kind in kinds {
            assert_eq!(TransactionKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(TransactionKind::from_code("NOPE"), None);
    }
}
