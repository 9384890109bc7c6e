//! Chart of accounts as an explicit forest.
//!
//! Accounts form a forest: each account optionally references a parent.
//! The arena is keyed by `AccountId`; parent references are resolved by
//! lookup, never by embedded object graphs. Reparenting rejects cycles at
//! write time.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use kitabu_shared::types::{AccountId, BusinessId};

use super::account::AccountKind;
use super::error::LedgerError;

/// A node in the chart of accounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartAccount {
    /// Unique identifier.
    pub id: AccountId,
    /// Unique human-readable account number (e.g. "1000").
    pub number: String,
    /// Account name (e.g. "Cash").
    pub name: String,
    /// Account kind.
    pub kind: AccountKind,
    /// Parent account for hierarchical structure.
    pub parent: Option<AccountId>,
    /// Owning business; `None` means shared.
    pub business_id: Option<BusinessId>,
    /// Contra account has opposite normal balance.
    pub is_contra: bool,
    /// Accounts are never deleted, only deactivated.
    pub is_active: bool,
}

/// In-memory chart of accounts arena.
#[derive(Debug, Default, Clone)]
pub struct ChartOfAccounts {
    accounts: HashMap<AccountId, ChartAccount>,
}

impl ChartOfAccounts {
    /// Creates an empty chart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an account to the chart.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateAccountNumber` if the number is taken, or
    /// `ParentAccountNotFound` if the parent does not exist.
    pub fn insert(&mut self, account: ChartAccount) -> Result<(), LedgerError> {
        if self.accounts.values().any(|a| a.number == account.number) {
            return Err(LedgerError::DuplicateAccountNumber(account.number));
        }
        if let Some(parent) = account.parent
            && !self.accounts.contains_key(&parent)
        {
            return Err(LedgerError::ParentAccountNotFound(parent));
        }
        self.accounts.insert(account.id, account);
        Ok(())
    }

    /// Looks up an account.
    #[must_use]
    pub fn get(&self, id: AccountId) -> Option<&ChartAccount> {
        self.accounts.get(&id)
    }

    /// Number of accounts in the chart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// True if the chart has no accounts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Direct children of an account.
    #[must_use]
    pub fn children(&self, id: AccountId) -> Vec<&ChartAccount> {
        let mut children: Vec<&ChartAccount> = self
            .accounts
            .values()
            .filter(|a| a.parent == Some(id))
            .collect();
        children.sort_by(|a, b| a.number.cmp(&b.number));
        children
    }

    /// Ancestor chain from an account's parent up to its root.
    #[must_use]
    pub fn ancestors(&self, id: AccountId) -> Vec<AccountId> {
        let mut chain = Vec::new();
        let mut current = self.accounts.get(&id).and_then(|a| a.parent);
        while let Some(parent) = current {
            // A malformed arena could loop; stop rather than spin.
            if chain.contains(&parent) {
                break;
            }
            chain.push(parent);
            current = self.accounts.get(&parent).and_then(|a| a.parent);
        }
        chain
    }

    /// True if making `parent` the parent of `account` would create a cycle.
    #[must_use]
    pub fn would_create_cycle(&self, account: AccountId, parent: AccountId) -> bool {
        if account == parent {
            return true;
        }
        self.ancestors(parent).contains(&account)
    }

    /// Moves an account under a new parent (or to the root with `None`).
    ///
    /// # Errors
    ///
    /// Returns `ParentAccountNotFound` if the parent does not exist,
    /// `AccountNotFound` if the account does not exist, or `AccountCycle`
    /// if the move would create a cycle.
    pub fn reparent(
        &mut self,
        account: AccountId,
        new_parent: Option<AccountId>,
    ) -> Result<(), LedgerError> {
        if !self.accounts.contains_key(&account) {
            return Err(LedgerError::AccountNotFound(account));
        }
        if let Some(parent) = new_parent {
            if !self.accounts.contains_key(&parent) {
                return Err(LedgerError::ParentAccountNotFound(parent));
            }
            if self.would_create_cycle(account, parent) {
                return Err(LedgerError::AccountCycle { account, parent });
            }
        }
        if let Some(entry) = self.accounts.get_mut(&account) {
            entry.parent = new_parent;
        }
        Ok(())
    }

    /// Soft-deactivates an account. Accounts are never deleted.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the account does not exist.
    pub fn deactivate(&mut self, id: AccountId) -> Result<(), LedgerError> {
        match self.accounts.get_mut(&id) {
            Some(account) => {
                account.is_active = false;
                Ok(())
            }
            None => Err(LedgerError::AccountNotFound(id)),
        }
    }
}
