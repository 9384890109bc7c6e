//! The posting pipeline: validate, number, journal, ledger, balances --
//! all inside one database transaction.
//!
//! Pipeline order for a post:
//! 1. Lock the referenced accounts (ascending id order) and validate
//! 2. Allocate the next entry number in the scope
//! 3. Insert the journal entry header and lines
//! 4. Insert one ledger row per line with the chained `balance_after`
//! 5. Update cached account balances and append the audit record
//!
//! Any failure rolls the whole transaction back; an allocated number is then
//! skipped, which leaves a gap but never a duplicate. Retryable conflicts
//! are retried with a linear backoff before being surfaced.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde_json::json;
use uuid::Uuid;

use kitabu_core::ledger::{
    chain_line_effects, reversal_lines, validate_posting, AccountPostingState, AuditRecord,
    BusinessInfo, DocPrefix, EntryNumber, EntryStatus as DomainEntryStatus, JournalEntry,
    JournalLine, LedgerError, PostingInput, TransactionKind,
};
use kitabu_shared::config::PostingConfig;
use kitabu_shared::types::{AccountId, BusinessId, JournalEntryId, JournalLineId, UserId};

use crate::entities::{
    businesses, journal_entries, journal_entry_lines, ledger,
    sea_orm_active_enums::EntryStatus, transaction_types,
};
use crate::repositories::account::{account_info, load_accounts_for_update};
use crate::repositories::{audit, db_err, sequence};

/// Linear backoff: attempt 1 waits one base interval, attempt 2 two, etc.
#[must_use]
pub fn backoff_delay(base_ms: u64, attempt: u32) -> Duration {
    Duration::from_millis(base_ms.saturating_mul(u64::from(attempt)))
}

/// A committed journal entry with its lines.
#[derive(Debug, Clone)]
pub struct PostedEntry {
    /// The journal entry header.
    pub entry: journal_entries::Model,
    /// The entry's lines in line order.
    pub lines: Vec<journal_entry_lines::Model>,
}

/// Posting repository: the only write path into the journal and ledger.
#[derive(Debug, Clone)]
pub struct PostingRepository {
    db: DatabaseConnection,
    config: PostingConfig,
}

impl PostingRepository {
    /// Creates a new posting repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, config: PostingConfig) -> Self {
        Self { db, config }
    }

    /// Posts a transaction as a journal entry in the `JE` scope.
    ///
    /// # Errors
    ///
    /// Returns the violated rule on validation failure, or a retryable
    /// error once the retry budget is exhausted.
    pub async fn post(&self, input: PostingInput) -> Result<PostedEntry, LedgerError> {
        self.post_with_prefix(DocPrefix::Je, input).await
    }

    /// Posts a transaction numbered in the given document scope.
    ///
    /// # Errors
    ///
    /// Same as [`Self::post`].
    pub async fn post_with_prefix(
        &self,
        prefix: DocPrefix,
        input: PostingInput,
    ) -> Result<PostedEntry, LedgerError> {
        let mut attempt: u32 = 0;
        loop {
            let result: Result<PostedEntry, LedgerError> = async {
                let txn = self.db.begin().await.map_err(db_err)?;
                let posted = post_within(&txn, prefix, &input, None).await?;
                txn.commit().await.map_err(db_err)?;
                Ok(posted)
            }
            .await;

            match result {
                Ok(posted) => {
                    tracing::debug!(entry_number = %posted.entry.entry_number, "posted journal entry");
                    return Ok(posted);
                }
                Err(err) if err.is_retryable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    tracing::warn!(error = %err, attempt, "post conflicted, retrying");
                    tokio::time::sleep(backoff_delay(self.config.retry_backoff_ms, attempt)).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Reverses a posted entry by posting a compensating entry and marking
    /// the original as reversed. The original's rows remain untouched.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound`, `EntryNotPosted` or `AlreadyReversed` when
    /// the target cannot be reversed.
    pub async fn reverse(
        &self,
        entry_number: &str,
        actor: UserId,
    ) -> Result<PostedEntry, LedgerError> {
        let mut attempt: u32 = 0;
        loop {
            let result = self.reverse_once(entry_number, actor).await;
            match result {
                Ok(posted) => {
                    tracing::debug!(
                        reversed = entry_number,
                        entry_number = %posted.entry.entry_number,
                        "reversed journal entry"
                    );
                    return Ok(posted);
                }
                Err(err) if err.is_retryable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    tracing::warn!(error = %err, attempt, "reversal conflicted, retrying");
                    tokio::time::sleep(backoff_delay(self.config.retry_backoff_ms, attempt)).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn reverse_once(
        &self,
        entry_number: &str,
        actor: UserId,
    ) -> Result<PostedEntry, LedgerError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        // Lock the header so two reversals of the same entry serialize.
        let original = journal_entries::Entity::find()
            .filter(journal_entries::Column::EntryNumber.eq(entry_number))
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| LedgerError::EntryNotFound(entry_number.to_string()))?;

        match original.status {
            EntryStatus::Posted => {}
            EntryStatus::Draft => {
                return Err(LedgerError::EntryNotPosted(entry_number.to_string()));
            }
            EntryStatus::Reversed => {
                return Err(LedgerError::AlreadyReversed(entry_number.to_string()));
            }
        }

        let lines = journal_entry_lines::Entity::find()
            .filter(journal_entry_lines::Column::EntryId.eq(original.id))
            .order_by_asc(journal_entry_lines::Column::LineNumber)
            .all(&txn)
            .await
            .map_err(db_err)?;

        let domain_lines: Vec<JournalLine> = lines
            .iter()
            .map(|line| JournalLine {
                id: JournalLineId::from_uuid(line.id),
                entry_id: JournalEntryId::from_uuid(line.entry_id),
                account_id: AccountId::from_uuid(line.account_id),
                is_debit: line.is_debit,
                amount: line.amount,
                description: line.description.clone(),
            })
            .collect();

        let input = PostingInput {
            business_id: BusinessId::from_uuid(original.business_id),
            kind: TransactionKind::Reversal,
            date: Utc::now().date_naive(),
            description: format!("Reversal of {entry_number}"),
            reference: Some(entry_number.to_string()),
            lines: reversal_lines(&domain_lines),
            created_by: actor,
        };

        let posted = post_within(&txn, DocPrefix::Je, &input, Some(original.id)).await?;

        let original_id = original.id.to_string();
        let business_id = BusinessId::from_uuid(original.business_id);
        let mut active: journal_entries::ActiveModel = original.into();
        active.status = Set(EntryStatus::Reversed);
        active.reversed_by = Set(Some(posted.entry.id));
        active.update(&txn).await.map_err(db_err)?;

        audit::append(
            &txn,
            AuditRecord::update(
                "journal_entries",
                original_id,
                json!({"status": "posted"}),
                json!({"status": "reversed", "reversed_by": posted.entry.entry_number}),
                Some(actor),
                Some(business_id),
            ),
        )
        .await?;

        txn.commit().await.map_err(db_err)?;
        Ok(posted)
    }

    /// Fetches a committed entry with its lines by entry number.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` if no entry carries the number.
    pub async fn get_entry(&self, entry_number: &str) -> Result<PostedEntry, LedgerError> {
        let entry = journal_entries::Entity::find()
            .filter(journal_entries::Column::EntryNumber.eq(entry_number))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| LedgerError::EntryNotFound(entry_number.to_string()))?;

        let lines = journal_entry_lines::Entity::find()
            .filter(journal_entry_lines::Column::EntryId.eq(entry.id))
            .order_by_asc(journal_entry_lines::Column::LineNumber)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(PostedEntry { entry, lines })
    }

    /// Fetches an entry by number as the domain aggregate, with its lines
    /// and resolved transaction kind.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` if no entry carries the number.
    pub async fn get_entry_domain(&self, entry_number: &str) -> Result<JournalEntry, LedgerError> {
        let posted = self.get_entry(entry_number).await?;
        let transaction_type =
            transaction_types::Entity::find_by_id(posted.entry.transaction_type_id)
                .one(&self.db)
                .await
                .map_err(db_err)?
                .ok_or_else(|| {
                    LedgerError::Persistence("orphan transaction type".to_string())
                })?;
        let kind = TransactionKind::from_code(&transaction_type.code).ok_or_else(|| {
            LedgerError::Persistence(format!(
                "unknown transaction type code {}",
                transaction_type.code
            ))
        })?;
        entry_to_domain(&posted, kind)
    }

    /// Lists a business's entries in a date range, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_entries(
        &self,
        business_id: BusinessId,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<journal_entries::Model>, LedgerError> {
        let mut query = journal_entries::Entity::find()
            .filter(journal_entries::Column::BusinessId.eq(business_id.into_inner()));

        if let Some(from) = from {
            query = query.filter(journal_entries::Column::TransactionDate.gte(from));
        }
        if let Some(to) = to {
            query = query.filter(journal_entries::Column::TransactionDate.lte(to));
        }

        query
            .order_by_desc(journal_entries::Column::TransactionDate)
            .order_by_desc(journal_entries::Column::EntryNumber)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Refuses to delete committed history. Posted and reversed entries are
    /// immutable; the only correction path is [`Self::reverse`].
    ///
    /// # Errors
    ///
    /// Returns `ImmutabilityViolation` for posted or reversed entries and
    /// `EntryNotFound` for unknown numbers.
    pub async fn delete_entry(&self, entry_number: &str) -> Result<(), LedgerError> {
        let entry = journal_entries::Entity::find()
            .filter(journal_entries::Column::EntryNumber.eq(entry_number))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| LedgerError::EntryNotFound(entry_number.to_string()))?;

        match entry.status {
            EntryStatus::Posted | EntryStatus::Reversed => Err(LedgerError::ImmutabilityViolation {
                target: "posted journal entry",
            }),
            EntryStatus::Draft => {
                let txn = self.db.begin().await.map_err(db_err)?;
                journal_entry_lines::Entity::delete_many()
                    .filter(journal_entry_lines::Column::EntryId.eq(entry.id))
                    .exec(&txn)
                    .await
                    .map_err(db_err)?;
                journal_entries::Entity::delete_by_id(entry.id)
                    .exec(&txn)
                    .await
                    .map_err(db_err)?;
                txn.commit().await.map_err(db_err)
            }
        }
    }
}

/// Runs the full posting pipeline inside an already-open transaction.
async fn post_within(
    txn: &DatabaseTransaction,
    prefix: DocPrefix,
    input: &PostingInput,
    reverses: Option<Uuid>,
) -> Result<PostedEntry, LedgerError> {
    // Step 1: lock and validate.
    let business = businesses::Entity::find_by_id(input.business_id.into_inner())
        .one(txn)
        .await
        .map_err(db_err)?
        .ok_or(LedgerError::BusinessNotFound(input.business_id))?;
    let business_info = BusinessInfo {
        id: input.business_id,
        code: business.code.clone(),
        is_active: business.is_active,
    };

    let account_ids: Vec<AccountId> = input.lines.iter().map(|l| l.account_id).collect();
    let locked = load_accounts_for_update(txn, &account_ids).await?;

    let infos: HashMap<AccountId, _> = locked
        .iter()
        .map(|(account, account_type)| {
            (
                AccountId::from_uuid(account.id),
                account_info(account, &account_type.category),
            )
        })
        .collect();

    let totals = validate_posting(
        input,
        |id| infos.get(&id).cloned().ok_or(LedgerError::AccountNotFound(id)),
        |_| Ok(business_info.clone()),
    )?;

    let transaction_type = transaction_types::Entity::find()
        .filter(transaction_types::Column::Code.eq(input.kind.code()))
        .one(txn)
        .await
        .map_err(db_err)?
        .ok_or_else(|| LedgerError::Persistence("transaction_types not seeded".to_string()))?;

    // Step 2: allocate the entry number.
    let entry_number = sequence::next_entry_number(txn, prefix, input.date).await?;

    // Step 3: journal entry header and lines.
    let now = Utc::now();
    let entry_id = Uuid::new_v4();
    let entry = journal_entries::ActiveModel {
        id: Set(entry_id),
        entry_number: Set(entry_number.to_string()),
        business_id: Set(input.business_id.into_inner()),
        transaction_type_id: Set(transaction_type.id),
        transaction_date: Set(input.date),
        description: Set(input.description.clone()),
        reference: Set(input.reference.clone()),
        status: Set(EntryStatus::Posted),
        total_debit: Set(totals.debit),
        total_credit: Set(totals.credit),
        reversed_by: Set(None),
        reverses: Set(reverses),
        created_by: Set(input.created_by.into_inner()),
        created_at: Set(now.into()),
        posted_at: Set(Some(now.into())),
    };
    let entry = entry.insert(txn).await.map_err(db_err)?;

    let mut lines = Vec::with_capacity(input.lines.len());
    for (index, line) in input.lines.iter().enumerate() {
        let line_number =
            i32::try_from(index + 1).map_err(|_| LedgerError::Persistence("line overflow".to_string()))?;
        let row = journal_entry_lines::ActiveModel {
            id: Set(Uuid::new_v4()),
            entry_id: Set(entry_id),
            line_number: Set(line_number),
            account_id: Set(line.account_id.into_inner()),
            is_debit: Set(line.is_debit),
            amount: Set(line.amount),
            description: Set(line.description.clone()),
            created_at: Set(now.into()),
        };
        lines.push(row.insert(txn).await.map_err(db_err)?);
    }

    // Step 4: ledger rows with chained balances.
    let mut states = HashMap::with_capacity(locked.len());
    for (account, _) in &locked {
        let account_id = AccountId::from_uuid(account.id);
        let next_sequence = next_account_sequence(txn, account.id).await?;
        states.insert(
            account_id,
            AccountPostingState::new(
                infos[&account_id].effective_normal_balance(),
                account.current_balance,
                next_sequence,
            ),
        );
    }
    let effects = chain_line_effects(&input.lines, &mut states)?;

    for (effect, line) in effects.iter().zip(&lines) {
        let row = ledger::ActiveModel {
            id: Set(Uuid::new_v4()),
            entry_id: Set(entry_id),
            line_id: Set(line.id),
            account_id: Set(effect.account_id.into_inner()),
            business_id: Set(input.business_id.into_inner()),
            transaction_date: Set(input.date),
            is_debit: Set(effect.is_debit),
            amount: Set(effect.amount),
            signed_change: Set(effect.signed_change),
            balance_after: Set(effect.balance_after),
            account_sequence: Set(effect.account_sequence),
            posted_at: Set(now.into()),
        };
        row.insert(txn).await.map_err(db_err)?;
    }

    // Step 5: cached balances and the audit record.
    for (account, _) in &locked {
        let account_id = AccountId::from_uuid(account.id);
        let mut active: crate::entities::accounts::ActiveModel = account.clone().into();
        active.current_balance = Set(states[&account_id].balance);
        active.updated_at = Set(now.into());
        active.update(txn).await.map_err(db_err)?;
    }

    audit::append(
        txn,
        AuditRecord::create(
            "journal_entries",
            entry_id.to_string(),
            entry_snapshot(&entry, input.kind.code(), &lines),
            Some(input.created_by),
            Some(input.business_id),
        ),
    )
    .await?;

    Ok(PostedEntry { entry, lines })
}

/// Maps stored rows onto the domain aggregate.
fn entry_to_domain(posted: &PostedEntry, kind: TransactionKind) -> Result<JournalEntry, LedgerError> {
    let entry = &posted.entry;
    let entry_number: EntryNumber = entry.entry_number.parse()?;
    let status = match entry.status {
        EntryStatus::Draft => DomainEntryStatus::Draft,
        EntryStatus::Posted => DomainEntryStatus::Posted,
        EntryStatus::Reversed => DomainEntryStatus::Reversed,
    };
    let lines = posted
        .lines
        .iter()
        .map(|line| JournalLine {
            id: JournalLineId::from_uuid(line.id),
            entry_id: JournalEntryId::from_uuid(line.entry_id),
            account_id: AccountId::from_uuid(line.account_id),
            is_debit: line.is_debit,
            amount: line.amount,
            description: line.description.clone(),
        })
        .collect();
    Ok(JournalEntry {
        id: JournalEntryId::from_uuid(entry.id),
        entry_number,
        business_id: BusinessId::from_uuid(entry.business_id),
        kind,
        transaction_date: entry.transaction_date,
        description: entry.description.clone(),
        reference: entry.reference.clone(),
        status,
        total_debit: entry.total_debit,
        total_credit: entry.total_credit,
        created_by: UserId::from_uuid(entry.created_by),
        created_at: entry.created_at.with_timezone(&Utc),
        posted_at: entry.posted_at.map(|at| at.with_timezone(&Utc)),
        lines,
    })
}

/// Full header and line snapshot persisted with the posting audit record,
/// so the trail reproduces the entry even if the tables are unreachable.
fn entry_snapshot(
    entry: &journal_entries::Model,
    kind_code: &str,
    lines: &[journal_entry_lines::Model],
) -> serde_json::Value {
    let line_snapshot: Vec<serde_json::Value> = lines
        .iter()
        .map(|line| {
            json!({
                "line_number": line.line_number,
                "account_id": line.account_id,
                "is_debit": line.is_debit,
                "amount": line.amount,
                "description": line.description,
            })
        })
        .collect();
    json!({
        "entry_number": entry.entry_number,
        "transaction_type": kind_code,
        "transaction_date": entry.transaction_date,
        "description": entry.description,
        "reference": entry.reference,
        "total_debit": entry.total_debit,
        "total_credit": entry.total_credit,
        "lines": line_snapshot,
    })
}

/// Next dense per-account ledger sequence, valid while the account row is
/// locked by the caller.
async fn next_account_sequence(
    txn: &DatabaseTransaction,
    account_id: Uuid,
) -> Result<i64, LedgerError> {
    let latest = ledger::Entity::find()
        .filter(ledger::Column::AccountId.eq(account_id))
        .order_by_desc(ledger::Column::AccountSequence)
        .limit(1)
        .one(txn)
        .await
        .map_err(db_err)?;
    Ok(latest.map_or(1, |row| row.account_sequence + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_is_linear() {
        assert_eq!(backoff_delay(25, 1), Duration::from_millis(25));
        assert_eq!(backoff_delay(25, 2), Duration::from_millis(50));
        assert_eq!(backoff_delay(25, 3), Duration::from_millis(75));
    }

    #[test]
    fn test_backoff_saturates() {
        assert_eq!(backoff_delay(u64::MAX, 2), Duration::from_millis(u64::MAX));
    }

    fn sample_entry() -> journal_entries::Model {
        use rust_decimal_macros::dec;

        let now = Utc::now();
        journal_entries::Model {
            id: Uuid::new_v4(),
            entry_number: "JE-20260128-0001".to_string(),
            business_id: Uuid::new_v4(),
            transaction_type_id: Uuid::new_v4(),
            transaction_date: NaiveDate::from_ymd_opt(2026, 1, 28).unwrap(),
            description: "Bottled water sale".to_string(),
            reference: Some("INV-001".to_string()),
            status: EntryStatus::Posted,
            total_debit: dec!(1000.00),
            total_credit: dec!(1000.00),
            reversed_by: None,
            reverses: None,
            created_by: Uuid::new_v4(),
            created_at: now.into(),
            posted_at: Some(now.into()),
        }
    }

    fn sample_line(entry_id: Uuid) -> journal_entry_lines::Model {
        use rust_decimal_macros::dec;

        journal_entry_lines::Model {
            id: Uuid::new_v4(),
            entry_id,
            line_number: 1,
            account_id: Uuid::new_v4(),
            is_debit: true,
            amount: dec!(1000.00),
            description: "Cash received".to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_entry_snapshot_captures_header_and_lines() {
        let entry = sample_entry();
        let line = sample_line(entry.id);

        let snapshot = entry_snapshot(&entry, "SALE", std::slice::from_ref(&line));
        assert_eq!(snapshot["entry_number"], "JE-20260128-0001");
        assert_eq!(snapshot["transaction_type"], "SALE");
        assert_eq!(snapshot["reference"], "INV-001");

        let lines = snapshot["lines"].as_array().unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["line_number"], 1);
        assert_eq!(lines[0]["is_debit"], true);
        assert_eq!(lines[0]["description"], "Cash received");
        assert_eq!(
            lines[0]["account_id"],
            serde_json::json!(line.account_id)
        );
    }

    #[test]
    fn test_entry_to_domain_maps_rows() {
        let entry = sample_entry();
        let line = sample_line(entry.id);
        let posted = PostedEntry {
            entry,
            lines: vec![line],
        };

        let domain = entry_to_domain(&posted, TransactionKind::Sale).unwrap();
        assert_eq!(domain.entry_number.to_string(), "JE-20260128-0001");
        assert_eq!(domain.kind, TransactionKind::Sale);
        assert_eq!(domain.status, DomainEntryStatus::Posted);
        assert!(domain.is_balanced());
        assert_eq!(domain.lines.len(), 1);
        assert!(domain.lines[0].is_debit);
        assert_eq!(domain.lines[0].amount, domain.total_debit);
    }
}
