//! `SeaORM` Entity for the entry_sequences counter table.
//!
//! One row per numbering scope (prefix + date). Allocation increments
//! `last_value` under a row lock so concurrent posts never share a number.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "entry_sequences")]
pub struct Model {
    /// Scope key, e.g. `JE-20260128`.
    #[sea_orm(primary_key, auto_increment = false)]
    pub scope_key: String,
    /// Last allocated sequence value; 0 means none allocated yet.
    pub last_value: i64,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
