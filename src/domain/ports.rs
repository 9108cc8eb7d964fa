use super::expense::{Expense, GroupId, Split};
use super::ledger::Ledger;
use super::member::MemberId;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Source of group ledgers.
///
/// `load_ledger` returns every expense and split of a group in one call;
/// callers never fetch splits one by one.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Adds an expense and its splits. Returns `false` if the expense id is already known.
    async fn record(&self, expense: Expense, splits: Vec<Split>) -> Result<bool>;
    async fn load_ledger(&self, group: &GroupId) -> Result<Ledger>;
    async fn groups(&self) -> Result<Vec<GroupId>>;
}

/// Resolves member ids to display names for presentation.
#[async_trait]
pub trait ProfileDirectory: Send + Sync {
    /// Looks up every requested member at once. Unknown ids are left out.
    async fn display_names(&self, members: &[MemberId]) -> Result<HashMap<MemberId, String>>;
}

pub type LedgerStoreBox = Box<dyn LedgerStore>;
pub type ProfileDirectoryBox = Box<dyn ProfileDirectory>;
pub type LedgerStoreFactory = Box<dyn Fn() -> LedgerStoreBox + Send + Sync>;
