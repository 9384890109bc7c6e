//! Audit trail repository. Append and query only; the trail is never
//! updated or deleted.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use serde_json::{json, Value};
use uuid::Uuid;

use kitabu_core::ledger::{AuditAction, AuditRecord, LedgerError};
use kitabu_shared::types::{BusinessId, UserId};

use crate::entities::{audit_logs, sea_orm_active_enums};
use crate::repositories::db_err;

const fn action_for(action: AuditAction) -> sea_orm_active_enums::AuditAction {
    match action {
        AuditAction::Create => sea_orm_active_enums::AuditAction::Create,
        AuditAction::Update => sea_orm_active_enums::AuditAction::Update,
        AuditAction::Delete => sea_orm_active_enums::AuditAction::Delete,
        AuditAction::Login => sea_orm_active_enums::AuditAction::Login,
        AuditAction::Logout => sea_orm_active_enums::AuditAction::Logout,
        AuditAction::Export => sea_orm_active_enums::AuditAction::Export,
    }
}

/// Appends an audit record on any connection, including an open transaction.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub async fn append<C: ConnectionTrait>(
    conn: &C,
    record: AuditRecord,
) -> Result<audit_logs::Model, LedgerError> {
    let row = audit_logs::ActiveModel {
        id: Set(Uuid::new_v4()),
        table_name: Set(record.table_name),
        record_id: Set(record.record_id),
        action: Set(action_for(record.action)),
        old_data: Set(record.old_data),
        new_data: Set(record.new_data),
        changed_fields: Set(json!(record.changed_fields)),
        user_id: Set(record.actor.map(UserId::into_inner)),
        business_id: Set(record.business.map(BusinessId::into_inner)),
        created_at: Set(Utc::now().into()),
    };
    row.insert(conn).await.map_err(db_err)
}

/// Filter options for querying the audit trail.
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    /// Filter by table name.
    pub table_name: Option<String>,
    /// Filter by record id.
    pub record_id: Option<String>,
    /// Filter by actor.
    pub user_id: Option<UserId>,
    /// Filter by business context.
    pub business_id: Option<BusinessId>,
    /// Records created at or after this instant.
    pub from: Option<DateTime<Utc>>,
    /// Records created at or before this instant.
    pub to: Option<DateTime<Utc>>,
}

/// Audit trail repository.
#[derive(Debug, Clone)]
pub struct AuditRepository {
    db: DatabaseConnection,
}

impl AuditRepository {
    /// Creates a new audit repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Appends a create record.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn append_create(
        &self,
        table_name: impl Into<String> + Send,
        record_id: impl Into<String> + Send,
        new_data: Value,
        actor: Option<UserId>,
        business: Option<BusinessId>,
    ) -> Result<audit_logs::Model, LedgerError> {
        append(
            &self.db,
            AuditRecord::create(table_name, record_id, new_data, actor, business),
        )
        .await
    }

    /// Appends an update record, deriving the changed field list from the
    /// before/after snapshots.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn append_update(
        &self,
        table_name: impl Into<String> + Send,
        record_id: impl Into<String> + Send,
        old_data: Value,
        new_data: Value,
        actor: Option<UserId>,
        business: Option<BusinessId>,
    ) -> Result<audit_logs::Model, LedgerError> {
        append(
            &self.db,
            AuditRecord::update(table_name, record_id, old_data, new_data, actor, business),
        )
        .await
    }

    /// Queries the trail with optional filters, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn query(&self, filter: AuditFilter) -> Result<Vec<audit_logs::Model>, LedgerError> {
        let mut query = audit_logs::Entity::find();

        if let Some(table_name) = filter.table_name {
            query = query.filter(audit_logs::Column::TableName.eq(table_name));
        }
        if let Some(record_id) = filter.record_id {
            query = query.filter(audit_logs::Column::RecordId.eq(record_id));
        }
        if let Some(user_id) = filter.user_id {
            query = query.filter(audit_logs::Column::UserId.eq(user_id.into_inner()));
        }
        if let Some(business_id) = filter.business_id {
            query = query.filter(audit_logs::Column::BusinessId.eq(business_id.into_inner()));
        }
        if let Some(from) = filter.from {
            query = query.filter(audit_logs::Column::CreatedAt.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(audit_logs::Column::CreatedAt.lte(to));
        }

        query
            .order_by_desc(audit_logs::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)
    }
}
