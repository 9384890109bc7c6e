//! `SeaORM` active enums mapping Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account category (`account_category` enum).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_category")]
#[serde(rename_all = "lowercase")]
pub enum AccountCategory {
    /// Resources owned.
    #[sea_orm(string_value = "asset")]
    Asset,
    /// Obligations owed.
    #[sea_orm(string_value = "liability")]
    Liability,
    /// Owner's residual interest.
    #[sea_orm(string_value = "equity")]
    Equity,
    /// Income earned.
    #[sea_orm(string_value = "revenue")]
    Revenue,
    /// Costs incurred.
    #[sea_orm(string_value = "expense")]
    Expense,
}

/// Normal balance side (`normal_balance_side` enum).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "normal_balance_side")]
#[serde(rename_all = "lowercase")]
pub enum NormalBalanceSide {
    /// Balance increases on debit.
    #[sea_orm(string_value = "debit")]
    Debit,
    /// Balance increases on credit.
    #[sea_orm(string_value = "credit")]
    Credit,
}

/// Journal entry status (`entry_status` enum).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "entry_status")]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Not yet committed.
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Committed to the ledger.
    #[sea_orm(string_value = "posted")]
    Posted,
    /// Negated by a reversing entry.
    #[sea_orm(string_value = "reversed")]
    Reversed,
}

/// Reconciliation status (`reconciliation_status` enum).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "reconciliation_status")]
#[serde(rename_all = "lowercase")]
pub enum ReconciliationStatus {
    /// Not yet reconciled.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Balances agree exactly.
    #[sea_orm(string_value = "reconciled")]
    Reconciled,
    /// Balances disagree.
    #[sea_orm(string_value = "discrepancy")]
    Discrepancy,
}

/// Audit action (`audit_action` enum).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "audit_action")]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    /// Row created.
    #[sea_orm(string_value = "create")]
    Create,
    /// Row updated.
    #[sea_orm(string_value = "update")]
    Update,
    /// Row deleted.
    #[sea_orm(string_value = "delete")]
    Delete,
    /// User logged in.
    #[sea_orm(string_value = "login")]
    Login,
    /// User logged out.
    #[sea_orm(string_value = "logout")]
    Logout,
    /// Data exported.
    #[sea_orm(string_value = "export")]
    Export,
}
