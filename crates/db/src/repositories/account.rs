//! Account repository for chart of accounts database operations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde_json::json;
use uuid::Uuid;

use kitabu_core::ledger::{
    AccountInfo, AccountKind, ChartAccount, ChartOfAccounts, LedgerError, NormalBalance,
};
use kitabu_shared::types::{AccountId, BusinessId, UserId};

use crate::entities::{
    account_types, accounts,
    sea_orm_active_enums::{AccountCategory, NormalBalanceSide},
};
use crate::repositories::audit::AuditRepository;
use crate::repositories::db_err;

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Account number (globally unique).
    pub account_number: String,
    /// Account name.
    pub name: String,
    /// High-level kind; resolved to an account_types row.
    pub kind: AccountKind,
    /// Parent account for hierarchical structure.
    pub parent_id: Option<AccountId>,
    /// Owning business; `None` means shared.
    pub business_id: Option<BusinessId>,
    /// Whether the account inverts its kind's normal balance.
    pub is_contra: bool,
    /// Description.
    pub description: Option<String>,
    /// User creating the account, for the audit trail.
    pub created_by: Option<UserId>,
}

/// Filter options for listing accounts.
#[derive(Debug, Clone, Default)]
pub struct AccountFilter {
    /// Filter by kind.
    pub kind: Option<AccountKind>,
    /// Filter by active status.
    pub is_active: Option<bool>,
    /// Filter by owning business (`Some(None)` = shared accounts only).
    pub business_id: Option<Option<BusinessId>>,
}

const fn category_for(kind: AccountKind) -> AccountCategory {
    match kind {
        AccountKind::Asset => AccountCategory::Asset,
        AccountKind::Liability => AccountCategory::Liability,
        AccountKind::Equity => AccountCategory::Equity,
        AccountKind::Revenue => AccountCategory::Revenue,
        AccountKind::Expense => AccountCategory::Expense,
    }
}

/// Maps a stored category back to the domain kind.
#[must_use]
pub const fn kind_for(category: &AccountCategory) -> AccountKind {
    match category {
        AccountCategory::Asset => AccountKind::Asset,
        AccountCategory::Liability => AccountKind::Liability,
        AccountCategory::Equity => AccountKind::Equity,
        AccountCategory::Revenue => AccountKind::Revenue,
        AccountCategory::Expense => AccountKind::Expense,
    }
}

/// Maps a stored normal balance side to the domain type.
#[must_use]
pub const fn normal_balance_for(side: &NormalBalanceSide) -> NormalBalance {
    match side {
        NormalBalanceSide::Debit => NormalBalance::Debit,
        NormalBalanceSide::Credit => NormalBalance::Credit,
    }
}

/// Builds domain account info from an account row joined with its type.
#[must_use]
pub fn account_info(account: &accounts::Model, category: &AccountCategory) -> AccountInfo {
    AccountInfo {
        id: AccountId::from_uuid(account.id),
        kind: kind_for(category),
        is_contra: account.is_contra,
        is_active: account.is_active,
        business_id: account.business_id.map(BusinessId::from_uuid),
    }
}

fn chart_account(account: &accounts::Model, category: &AccountCategory) -> ChartAccount {
    ChartAccount {
        id: AccountId::from_uuid(account.id),
        number: account.account_number.clone(),
        name: account.name.clone(),
        kind: kind_for(category),
        parent: account.parent_id.map(AccountId::from_uuid),
        business_id: account.business_id.map(BusinessId::from_uuid),
        is_contra: account.is_contra,
        is_active: account.is_active,
    }
}

/// Account repository for chart of accounts operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new account with validation and an audit record.
    ///
    /// # Errors
    ///
    /// Returns an error if the account number is taken, the parent does not
    /// exist or belongs to a different business, or the database operation
    /// fails.
    pub async fn create_account(
        &self,
        input: CreateAccountInput,
    ) -> Result<accounts::Model, LedgerError> {
        let existing = accounts::Entity::find()
            .filter(accounts::Column::AccountNumber.eq(&input.account_number))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        if existing.is_some() {
            return Err(LedgerError::DuplicateAccountNumber(input.account_number));
        }

        if let Some(parent_id) = input.parent_id {
            let parent = accounts::Entity::find_by_id(parent_id.into_inner())
                .one(&self.db)
                .await
                .map_err(db_err)?
                .ok_or(LedgerError::ParentAccountNotFound(parent_id))?;
            // A shared parent (business_id NULL) accepts children from any
            // business; a business-owned parent only its own.
            if let (Some(parent_business), Some(child_business)) =
                (parent.business_id, input.business_id)
            {
                if parent_business != child_business.into_inner() {
                    return Err(LedgerError::AccountBusinessMismatch {
                        account_id: parent_id,
                        business_id: child_business,
                    });
                }
            }
        }

        let account_type = account_types::Entity::find()
            .filter(account_types::Column::Category.eq(category_for(input.kind)))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| LedgerError::Persistence("account_types not seeded".to_string()))?;

        let now = chrono::Utc::now().into();
        let account = accounts::ActiveModel {
            id: Set(Uuid::new_v4()),
            account_number: Set(input.account_number),
            name: Set(input.name),
            account_type_id: Set(account_type.id),
            parent_id: Set(input.parent_id.map(AccountId::into_inner)),
            business_id: Set(input.business_id.map(BusinessId::into_inner)),
            is_contra: Set(input.is_contra),
            is_active: Set(true),
            current_balance: Set(rust_decimal::Decimal::ZERO),
            description: Set(input.description),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let created = account.insert(&self.db).await.map_err(db_err)?;

        AuditRepository::new(self.db.clone())
            .append_create(
                "accounts",
                created.id.to_string(),
                json!({
                    "account_number": created.account_number,
                    "name": created.name,
                    "is_contra": created.is_contra,
                }),
                input.created_by,
                input.business_id,
            )
            .await?;

        Ok(created)
    }

    /// Lists accounts with optional filters, ordered by account number.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_accounts(
        &self,
        filter: AccountFilter,
    ) -> Result<Vec<accounts::Model>, LedgerError> {
        let mut query = accounts::Entity::find();

        if let Some(kind) = filter.kind {
            let account_type = account_types::Entity::find()
                .filter(account_types::Column::Category.eq(category_for(kind)))
                .one(&self.db)
                .await
                .map_err(db_err)?;
            match account_type {
                Some(t) => query = query.filter(accounts::Column::AccountTypeId.eq(t.id)),
                None => return Ok(Vec::new()),
            }
        }
        if let Some(is_active) = filter.is_active {
            query = query.filter(accounts::Column::IsActive.eq(is_active));
        }
        if let Some(business_id) = filter.business_id {
            query = match business_id {
                Some(id) => query.filter(accounts::Column::BusinessId.eq(id.into_inner())),
                None => query.filter(accounts::Column::BusinessId.is_null()),
            };
        }

        query
            .order_by_asc(accounts::Column::AccountNumber)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Finds an account by its number.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_number(
        &self,
        account_number: &str,
    ) -> Result<Option<accounts::Model>, LedgerError> {
        accounts::Entity::find()
            .filter(accounts::Column::AccountNumber.eq(account_number))
            .one(&self.db)
            .await
            .map_err(db_err)
    }

    /// Loads domain account info for a single account.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the account does not exist.
    pub async fn load_info(&self, id: AccountId) -> Result<AccountInfo, LedgerError> {
        let (account, account_type) = accounts::Entity::find_by_id(id.into_inner())
            .find_also_related(account_types::Entity)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(LedgerError::AccountNotFound(id))?;
        let account_type =
            account_type.ok_or_else(|| LedgerError::Persistence("orphan account type".to_string()))?;
        Ok(account_info(&account, &account_type.category))
    }

    /// Loads the whole chart of accounts into the domain arena.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the stored hierarchy is
    /// inconsistent.
    pub async fn load_chart(&self) -> Result<ChartOfAccounts, LedgerError> {
        let rows = accounts::Entity::find()
            .find_also_related(account_types::Entity)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let mut pending = Vec::with_capacity(rows.len());
        for (account, account_type) in rows {
            let account_type = account_type
                .ok_or_else(|| LedgerError::Persistence("orphan account type".to_string()))?;
            pending.push(chart_account(&account, &account_type.category));
        }

        // The arena rejects forward parent references, so insert each node
        // once its parent is present.
        let mut chart = ChartOfAccounts::new();
        while !pending.is_empty() {
            let before = pending.len();
            let mut deferred = Vec::new();
            for node in pending {
                let parent_known = node
                    .parent
                    .is_none_or(|parent| chart.get(parent).is_some());
                if parent_known {
                    chart.insert(node)?;
                } else {
                    deferred.push(node);
                }
            }
            if deferred.len() == before {
                return Err(LedgerError::Persistence(
                    "account hierarchy has unreachable parents".to_string(),
                ));
            }
            pending = deferred;
        }
        Ok(chart)
    }

    /// Moves an account under a new parent (or to the root with `None`),
    /// rejecting moves that would create a cycle.
    ///
    /// # Errors
    ///
    /// Returns `AccountCycle` if the move would make the account its own
    /// ancestor, `ParentAccountNotFound`/`AccountNotFound` for missing rows,
    /// or `AccountBusinessMismatch` when the parent belongs to a different
    /// business.
    pub async fn reparent(
        &self,
        id: AccountId,
        new_parent: Option<AccountId>,
        actor: Option<UserId>,
    ) -> Result<accounts::Model, LedgerError> {
        let mut chart = self.load_chart().await?;

        if let Some(parent_id) = new_parent {
            let parent = chart
                .get(parent_id)
                .ok_or(LedgerError::ParentAccountNotFound(parent_id))?;
            let child = chart.get(id).ok_or(LedgerError::AccountNotFound(id))?;
            if let (Some(parent_business), Some(child_business)) =
                (parent.business_id, child.business_id)
            {
                if parent_business != child_business {
                    return Err(LedgerError::AccountBusinessMismatch {
                        account_id: parent_id,
                        business_id: child_business,
                    });
                }
            }
        }
        chart.reparent(id, new_parent)?;

        let account = accounts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(LedgerError::AccountNotFound(id))?;
        let business_id = account.business_id.map(BusinessId::from_uuid);
        let old = json!({"parent_id": account.parent_id});
        let mut active: accounts::ActiveModel = account.into();
        active.parent_id = Set(new_parent.map(AccountId::into_inner));
        active.updated_at = Set(chrono::Utc::now().into());
        let updated = active.update(&self.db).await.map_err(db_err)?;

        AuditRepository::new(self.db.clone())
            .append_update(
                "accounts",
                updated.id.to_string(),
                old,
                json!({"parent_id": updated.parent_id}),
                actor,
                business_id,
            )
            .await?;

        Ok(updated)
    }

    /// Returns an account's cached current balance.
    ///
    /// The cache is maintained inside every posting transaction, so it
    /// always equals the replayed sum of the account's ledger rows.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the account does not exist.
    pub async fn get_balance(&self, id: AccountId) -> Result<rust_decimal::Decimal, LedgerError> {
        let account = accounts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(LedgerError::AccountNotFound(id))?;
        Ok(account.current_balance)
    }

    /// Soft-deactivates an account with an audit record. Accounts are never
    /// deleted.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the account does not exist.
    pub async fn deactivate(
        &self,
        id: AccountId,
        actor: Option<UserId>,
    ) -> Result<accounts::Model, LedgerError> {
        let account = accounts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(LedgerError::AccountNotFound(id))?;

        let business_id = account.business_id.map(BusinessId::from_uuid);
        let old = json!({"is_active": account.is_active});
        let mut active: accounts::ActiveModel = account.into();
        active.is_active = Set(false);
        active.updated_at = Set(chrono::Utc::now().into());
        let updated = active.update(&self.db).await.map_err(db_err)?;

        AuditRepository::new(self.db.clone())
            .append_update(
                "accounts",
                updated.id.to_string(),
                old,
                json!({"is_active": false}),
                actor,
                business_id,
            )
            .await?;

        Ok(updated)
    }
}

/// Loads posting info for a set of accounts inside a transaction, locking
/// each row `FOR UPDATE` in ascending id order to avoid deadlocks between
/// concurrent posts.
///
/// # Errors
///
/// Returns `AccountNotFound` for the first id with no row.
pub async fn load_accounts_for_update(
    txn: &DatabaseTransaction,
    ids: &[AccountId],
) -> Result<Vec<(accounts::Model, account_types::Model)>, LedgerError> {
    let mut sorted: Vec<AccountId> = ids.to_vec();
    sorted.sort_by_key(|id| id.into_inner());
    sorted.dedup();

    let mut result = Vec::with_capacity(sorted.len());
    for id in sorted {
        let account = accounts::Entity::find_by_id(id.into_inner())
            .lock_exclusive()
            .one(txn)
            .await
            .map_err(db_err)?
            .ok_or(LedgerError::AccountNotFound(id))?;
        let account_type = account_types::Entity::find_by_id(account.account_type_id)
            .one(txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| LedgerError::Persistence("orphan account type".to_string()))?;
        result.push((account, account_type));
    }
    Ok(result)
}
