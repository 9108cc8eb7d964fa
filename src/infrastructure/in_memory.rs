use crate::domain::expense::{Expense, GroupId, Split};
use crate::domain::ledger::Ledger;
use crate::domain::member::{Member, MemberId};
use crate::domain::ports::{LedgerStore, ProfileDirectory};
use crate::domain::validation::check_splits_belong;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory ledger store, one `Ledger` per group.
///
/// Uses `Arc<RwLock<..>>` so clones share the same ledgers.
#[derive(Default, Clone)]
pub struct InMemoryLedgerStore {
    ledgers: Arc<RwLock<BTreeMap<GroupId, Ledger>>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn record(&self, expense: Expense, splits: Vec<Split>) -> Result<bool> {
        check_splits_belong(&expense, &splits)?;
        let mut ledgers = self.ledgers.write().await;
        let ledger = ledgers.entry(expense.group.clone()).or_default();

        // Ignore duplicate expense ids
        if ledger.expenses.iter().any(|known| known.id == expense.id) {
            return Ok(false);
        }
        ledger.push(expense, splits);
        Ok(true)
    }

    async fn load_ledger(&self, group: &GroupId) -> Result<Ledger> {
        let ledgers = self.ledgers.read().await;
        Ok(ledgers.get(group).cloned().unwrap_or_default())
    }

    async fn groups(&self) -> Result<Vec<GroupId>> {
        let ledgers = self.ledgers.read().await;
        Ok(ledgers.keys().cloned().collect())
    }
}

/// A thread-safe in-memory profile directory.
#[derive(Default, Clone)]
pub struct InMemoryProfileDirectory {
    names: Arc<RwLock<HashMap<MemberId, String>>>,
}

impl InMemoryProfileDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, member: Member) {
        let mut names = self.names.write().await;
        names.insert(member.id, member.display_name);
    }
}

#[async_trait]
impl ProfileDirectory for InMemoryProfileDirectory {
    async fn display_names(&self, members: &[MemberId]) -> Result<HashMap<MemberId, String>> {
        let names = self.names.read().await;
        Ok(members
            .iter()
            .filter_map(|id| names.get(id).map(|name| (id.clone(), name.clone())))
            .collect())
    }
}
