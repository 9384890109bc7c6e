//! `SeaORM` Entity for the ledger table.
//!
//! The ledger is append-only: rows are inserted by the posting pipeline and
//! never updated or deleted. Corrections happen via reversing entries.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "ledger")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub entry_id: Uuid,
    pub line_id: Uuid,
    pub account_id: Uuid,
    pub business_id: Uuid,
    pub transaction_date: Date,
    pub is_debit: bool,
    pub amount: Decimal,
    /// Signed balance delta after the normal-balance rule.
    pub signed_change: Decimal,
    /// Account balance immediately after this row.
    pub balance_after: Decimal,
    /// Dense 1-based per-account row sequence.
    pub account_sequence: i64,
    pub posted_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::journal_entries::Entity",
        from = "Column::EntryId",
        to = "super::journal_entries::Column::Id"
    )]
    JournalEntries,
    #[sea_orm(
        belongs_to = "super::journal_entry_lines::Entity",
        from = "Column::LineId",
        to = "super::journal_entry_lines::Column::Id"
    )]
    JournalEntryLines,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id"
    )]
    Accounts,
    #[sea_orm(
        belongs_to = "super::businesses::Entity",
        from = "Column::BusinessId",
        to = "super::businesses::Column::Id"
    )]
    Businesses,
}

impl Related<super::journal_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalEntries.def()
    }
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
