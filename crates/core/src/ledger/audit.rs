//! Audit trail records.
//!
//! Every mutation of audited tables appends a record capturing who did what,
//! with JSON before/after snapshots. The trail itself is append-only.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use kitabu_shared::types::{BusinessId, UserId};

/// What happened to the audited record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    /// Row created.
    Create,
    /// Row updated.
    Update,
    /// Row deleted.
    Delete,
    /// User logged in.
    Login,
    /// User logged out.
    Logout,
    /// Data exported.
    Export,
}

impl AuditAction {
    /// The action string as persisted.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Login => "login",
            Self::Logout => "logout",
            Self::Export => "export",
        }
    }
}

/// An audit trail record ready to append.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Table the change applies to.
    pub table_name: String,
    /// Primary key of the changed row, as a string.
    pub record_id: String,
    /// What happened.
    pub action: AuditAction,
    /// JSON snapshot before the change (absent for creates).
    pub old_data: Option<Value>,
    /// JSON snapshot after the change (absent for deletes).
    pub new_data: Option<Value>,
    /// Names of fields whose values changed.
    pub changed_fields: Vec<String>,
    /// User who performed the action, if known.
    pub actor: Option<UserId>,
    /// Business context, if any.
    pub business: Option<BusinessId>,
}

impl AuditRecord {
    /// Builds an update record, deriving `changed_fields` from the snapshots.
    #[must_use]
    pub fn update(
        table_name: impl Into<String>,
        record_id: impl Into<String>,
        old_data: Value,
        new_data: Value,
        actor: Option<UserId>,
        business: Option<BusinessId>,
    ) -> Self {
        let fields = changed_fields(&old_data, &new_data);
        Self {
            table_name: table_name.into(),
            record_id: record_id.into(),
            action: AuditAction::Update,
            old_data: Some(old_data),
            new_data: Some(new_data),
            changed_fields: fields,
            actor,
            business,
        }
    }

    /// Builds a create record.
    #[must_use]
    pub fn create(
        table_name: impl Into<String>,
        record_id: impl Into<String>,
        new_data: Value,
        actor: Option<UserId>,
        business: Option<BusinessId>,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            record_id: record_id.into(),
            action: AuditAction::Create,
            old_data: None,
            new_data: Some(new_data),
            changed_fields: Vec::new(),
            actor,
            business,
        }
    }
}

/// Field names whose values differ between two JSON object snapshots.
///
/// Keys present in only one snapshot count as changed. Sorted for stable
/// output. Non-object inputs yield an empty list.
#[must_use]
pub fn changed_fields(old: &Value, new: &Value) -> Vec<String> {
    let (Some(old_map), Some(new_map)) = (old.as_object(), new.as_object()) else {
        return Vec::new();
    };

    let mut fields: Vec<String> = old_map
        .iter()
        .filter(|(key, value)| new_map.get(*key) != Some(value))
        .map(|(key, _)| key.clone())
        .collect();
    for key in new_map.keys() {
        if !old_map.contains_key(key) {
            fields.push(key.clone());
        }
    }
    fields.sort();
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_changed_fields_detects_diffs() {
        let old = json!({"name": "Cash", "is_active": true, "number": "1000"});
        let new = json!({"name": "Cash on Hand", "is_active": true, "number": "1000"});
        assert_eq!(changed_fields(&old, &new), vec!["name"]);
    }

    #[test]
    fn test_changed_fields_handles_added_and_removed_keys() {
        let old = json!({"a": 1, "b": 2});
        let new = json!({"b": 2, "c": 3});
        assert_eq!(changed_fields(&old, &new), vec!["a", "c"]);
    }

    #[test]
    fn test_changed_fields_identical_snapshots() {
        let snapshot = json!({"a": 1});
        assert!(changed_fields(&snapshot, &snapshot.clone()).is_empty());
    }

    #[test]
    fn test_update_record_carries_diff() {
        let old = json!({"is_active": true});
        let new = json!({"is_active": false});
        let record = AuditRecord::update("accounts", "1000", old, new, None, None);
        assert_eq!(record.action, AuditAction::Update);
        assert_eq!(record.changed_fields, vec!["is_active"]);
        assert!(record.old_data.is_some());
    }

    #[test]
    fn test_create_record_has_no_old_data() {
        let record = AuditRecord::create("accounts", "1000", json!({"name": "Cash"}), None, None);
        assert_eq!(record.action, AuditAction::Create);
        assert!(record.old_data.is_none());
        assert!(record.changed_fields.is_empty());
    }
}
