//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `UserId` where an
//! `AccountId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(UserId, "Unique identifier for a user.");
typed_id!(BusinessId, "Unique identifier for a business unit.");
typed_id!(AccountTypeId, "Unique identifier for an account type.");
typed_id!(AccountId, "Unique identifier for a ledger account.");
typed_id!(
    TransactionTypeId,
    "Unique identifier for a transaction type."
);
typed_id!(JournalEntryId, "Unique identifier for a journal entry.");
typed_id!(
    JournalLineId,
    "Unique identifier for a journal entry line."
);
typed_id!(LedgerRowId, "Unique identifier for an immutable ledger row.");
typed_id!(
    SnapshotId,
    "Unique identifier for an account balance snapshot."
);
typed_id!(
    ReconciliationId,
    "Unique identifier for a reconciliation record."
);
typed_id!(AuditLogId, "Unique identifier for an audit log record.");

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_ids_are_unique() {
        let a = AccountId::new();
        let b = AccountId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_id_roundtrip() {
        let id = JournalEntryId::new();
        let parsed = JournalEntryId::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_uuid_v7_is_time_ordered() {
        // v7 IDs sort by creation time, useful for stable audit ordering.
        let a = LedgerRowId::new();
        let b = LedgerRowId::new();
        assert!(a.into_inner() <= b.into_inner());
    }
}
