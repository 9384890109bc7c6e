//! Double-entry ledger domain: accounts, journal entries, posting
//! arithmetic, document numbering, balances and the audit trail.

pub mod account;
pub mod audit;
pub mod balance;
pub mod chart;
pub mod entry;
pub mod error;
pub mod journal;
pub mod posting;
pub mod sequence;
pub mod validation;

pub use account::{
    balance_change, effective_normal_balance, AccountInfo, AccountKind, NormalBalance,
};
pub use audit::{changed_fields, AuditAction, AuditRecord};
pub use balance::{
    classify_difference, period_totals, replay_balance, verify_chain, LedgerMovement,
    PeriodTotals, ReconciliationStatus,
};
pub use chart::{ChartAccount, ChartOfAccounts};
pub use entry::{JournalLine, LineInput};
pub use error::LedgerError;
pub use journal::{EntryStatus, JournalEntry, TransactionKind};
pub use posting::{
    chain_line_effects, entry_totals, reversal_lines, AccountPostingState, EntryTotals, LineEffect,
};
pub use sequence::{DocPrefix, EntryNumber, SequenceScope};
pub use validation::{validate_posting, BusinessInfo, PostingInput};

#[cfg(test)]
mod posting_props;
#[cfg(test)]
mod scenarios;
#[cfg(test)]
mod validation_props;
