//! Ledger error types for validation, sequencing, immutability and
//! persistence failures.
//!
//! Every failure carries the specific violated rule (imbalance amounts, the
//! offending account, the line index) so callers never see a generic
//! "save failed".

use rust_decimal::Decimal;
use thiserror::Error;

use kitabu_shared::types::{AccountId, BusinessId, TransactionTypeId};

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// A journal entry must have at least 2 lines.
    #[error("Journal entry must have at least 2 lines, got {count}")]
    InsufficientLines {
        /// Number of lines in the proposed entry.
        count: usize,
    },

    /// The entry is not balanced (debits != credits).
    #[error("Journal entry is not balanced. Debit: {debit}, Credit: {credit}")]
    UnbalancedEntry {
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
    },

    /// Line amount cannot be zero.
    #[error("Line {line} amount cannot be zero")]
    ZeroAmount {
        /// Zero-based index of the offending line.
        line: usize,
    },

    /// Line amount cannot be negative.
    #[error("Line {line} amount cannot be negative")]
    NegativeAmount {
        /// Zero-based index of the offending line.
        line: usize,
    },

    /// Line amount carries more than two decimal places.
    #[error("Line {line} amount {amount} is not quantized to 2 decimal places")]
    UnquantizedAmount {
        /// Zero-based index of the offending line.
        line: usize,
        /// The unquantized amount.
        amount: Decimal,
    },

    /// The entry has only one side (all debits or all credits).
    #[error("Journal entry must have both debit and credit lines")]
    SingleSided,

    // ========== Reference Errors ==========
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Account is inactive and cannot be posted to.
    #[error("Account {0} is inactive")]
    AccountInactive(AccountId),

    /// Account belongs to a different business and is not shared.
    #[error("Account {account_id} does not belong to business {business_id}")]
    AccountBusinessMismatch {
        /// The referenced account.
        account_id: AccountId,
        /// The business stated on the entry.
        business_id: BusinessId,
    },

    /// Business not found.
    #[error("Business not found: {0}")]
    BusinessNotFound(BusinessId),

    /// Business is inactive.
    #[error("Business {0} is inactive")]
    BusinessInactive(BusinessId),

    /// Transaction type not found.
    #[error("Transaction type not found: {0}")]
    TransactionTypeNotFound(TransactionTypeId),

    // ========== Chart of Accounts Errors ==========
    /// Account number already exists.
    #[error("Account number '{0}' already exists")]
    DuplicateAccountNumber(String),

    /// Parent account not found.
    #[error("Parent account not found: {0}")]
    ParentAccountNotFound(AccountId),

    /// Setting this parent would create a cycle in the account tree.
    #[error("Setting parent {parent} on account {account} would create a cycle")]
    AccountCycle {
        /// The account being reparented.
        account: AccountId,
        /// The proposed parent.
        parent: AccountId,
    },

    // ========== Entry / Sequence Errors ==========
    /// Journal entry not found by entry number.
    #[error("Journal entry not found: {0}")]
    EntryNotFound(String),

    /// Only posted entries can be reversed.
    #[error("Journal entry {0} is not posted and cannot be reversed")]
    EntryNotPosted(String),

    /// The entry has already been reversed.
    #[error("Journal entry {0} has already been reversed")]
    AlreadyReversed(String),

    /// An entry number string does not match `<PREFIX>-<YYYYMMDD>-<NNNN>`.
    #[error("Invalid entry number: '{0}'")]
    InvalidEntryNumber(String),

    /// Sequence allocation lost a race it could not resolve within the
    /// retry bound. Safe to retry the whole post.
    #[error("Sequence allocation conflict in scope {scope}, please retry")]
    SequenceConflict {
        /// The contested scope key, e.g. `JE-20260128`.
        scope: String,
    },

    // ========== Immutability ==========
    /// Attempted modification or deletion of committed ledger history.
    #[error("Immutability violation: {target} is append-only; post a reversing entry instead")]
    ImmutabilityViolation {
        /// What was illegally touched (e.g. "ledger row", "posted journal entry").
        target: &'static str,
    },

    // ========== Concurrency / Persistence ==========
    /// Concurrent modification detected.
    #[error("Concurrent modification detected, please retry")]
    ConcurrentModification,

    /// Underlying storage failed mid-operation; the whole post rolled back.
    #[error("Persistence failure: {0}")]
    Persistence(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientLines { .. } => "INSUFFICIENT_LINES",
            Self::UnbalancedEntry { .. } => "UNBALANCED_ENTRY",
            Self::ZeroAmount { .. } => "ZERO_AMOUNT",
            Self::NegativeAmount { .. } => "NEGATIVE_AMOUNT",
            Self::UnquantizedAmount { .. } => "UNQUANTIZED_AMOUNT",
            Self::SingleSided => "SINGLE_SIDED",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::AccountBusinessMismatch { .. } => "ACCOUNT_BUSINESS_MISMATCH",
            Self::BusinessNotFound(_) => "BUSINESS_NOT_FOUND",
            Self::BusinessInactive(_) => "BUSINESS_INACTIVE",
            Self::TransactionTypeNotFound(_) => "TRANSACTION_TYPE_NOT_FOUND",
            Self::DuplicateAccountNumber(_) => "DUPLICATE_ACCOUNT_NUMBER",
            Self::ParentAccountNotFound(_) => "PARENT_ACCOUNT_NOT_FOUND",
            Self::AccountCycle { .. } => "ACCOUNT_CYCLE",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::EntryNotPosted(_) => "ENTRY_NOT_POSTED",
            Self::AlreadyReversed(_) => "ALREADY_REVERSED",
            Self::InvalidEntryNumber(_) => "INVALID_ENTRY_NUMBER",
            Self::SequenceConflict { .. } => "SEQUENCE_CONFLICT",
            Self::ImmutabilityViolation { .. } => "IMMUTABILITY_VIOLATION",
            Self::ConcurrentModification => "CONCURRENT_MODIFICATION",
            Self::Persistence(_) => "PERSISTENCE_FAILURE",
        }
    }

    /// Returns true if retrying the whole post may succeed.
    ///
    /// Validation and immutability failures are never retryable; contention
    /// and storage outages are.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::SequenceConflict { .. } | Self::ConcurrentModification | Self::Persistence(_)
        )
    }
}

impl From<LedgerError> for kitabu_shared::AppError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err {
            LedgerError::InsufficientLines { .. }
            | LedgerError::UnbalancedEntry { .. }
            | LedgerError::ZeroAmount { .. }
            | LedgerError::NegativeAmount { .. }
            | LedgerError::UnquantizedAmount { .. }
            | LedgerError::SingleSided
            | LedgerError::InvalidEntryNumber(_) => Self::Validation(message),

            LedgerError::AccountNotFound(_)
            | LedgerError::BusinessNotFound(_)
            | LedgerError::TransactionTypeNotFound(_)
            | LedgerError::ParentAccountNotFound(_)
            | LedgerError::EntryNotFound(_) => Self::NotFound(message),

            LedgerError::AccountInactive(_)
            | LedgerError::AccountBusinessMismatch { .. }
            | LedgerError::BusinessInactive(_)
            | LedgerError::AccountCycle { .. }
            | LedgerError::EntryNotPosted(_)
            | LedgerError::AlreadyReversed(_)
            | LedgerError::ImmutabilityViolation { .. } => Self::BusinessRule(message),

            LedgerError::DuplicateAccountNumber(_)
            | LedgerError::SequenceConflict { .. }
            | LedgerError::ConcurrentModification => Self::Conflict(message),

            LedgerError::Persistence(_) => Self::Database(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kitabu_shared::AppError;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            LedgerError::InsufficientLines { count: 1 }.error_code(),
            "INSUFFICIENT_LINES"
        );
        assert_eq!(
            LedgerError::UnbalancedEntry {
                debit: dec!(100.00),
                credit: dec!(90.00),
            }
            .error_code(),
            "UNBALANCED_ENTRY"
        );
        assert_eq!(
            LedgerError::ImmutabilityViolation {
                target: "ledger row"
            }
            .error_code(),
            "IMMUTABILITY_VIOLATION"
        );
    }

    #[test]
    fn test_retryable_errors() {
        assert!(
            LedgerError::SequenceConflict {
                scope: "JE-20260128".to_string()
            }
            .is_retryable()
        );
        assert!(LedgerError::ConcurrentModification.is_retryable());
        assert!(LedgerError::Persistence("connection reset".into()).is_retryable());
        assert!(!LedgerError::SingleSided.is_retryable());
        assert!(
            !LedgerError::ImmutabilityViolation {
                target: "ledger row"
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_app_error_envelope_preserves_retryability() {
        let retryable: AppError = LedgerError::ConcurrentModification.into();
        assert!(retryable.is_retryable());
        assert_eq!(retryable.error_code(), "CONFLICT");

        let fatal: AppError = LedgerError::SingleSided.into();
        assert!(!fatal.is_retryable());
        assert_eq!(fatal.error_code(), "VALIDATION_ERROR");

        let not_found: AppError = LedgerError::EntryNotFound("JE-20260128-0001".into()).into();
        assert_eq!(not_found.error_code(), "NOT_FOUND");
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::UnbalancedEntry {
            debit: dec!(1000.00),
            credit: dec!(900.00),
        };
        assert_eq!(
            err.to_string(),
            "Journal entry is not balanced. Debit: 1000.00, Credit: 900.00"
        );
    }
}
