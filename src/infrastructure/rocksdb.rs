use crate::domain::expense::{Expense, ExpenseId, GroupId, Split};
use crate::domain::ledger::Ledger;
use crate::domain::ports::LedgerStore;
use crate::domain::validation::check_splits_belong;
use crate::error::{EngineError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, Direction, IteratorMode, Options, WriteBatch};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

/// Column Family for storing expenses.
pub const CF_EXPENSES: &str = "expenses";
/// Column Family for storing the splits of each expense.
pub const CF_SPLITS: &str = "splits";

const KEY_SEPARATOR: u8 = 0;

/// A persistent ledger store backed by RocksDB.
///
/// Expenses and their splits live in separate Column Families under the same
/// `group \0 expense` key, so a group's whole ledger is one prefix scan per
/// family. An expense and its splits are written in one atomic batch.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDbLedgerStore {
    db: Arc<DB>,
}

impl RocksDbLedgerStore {
    /// Opens or creates a RocksDB instance at `path`, creating the column families if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_expenses = ColumnFamilyDescriptor::new(CF_EXPENSES, Options::default());
        let cf_splits = ColumnFamilyDescriptor::new(CF_SPLITS, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_expenses, cf_splits])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn family(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            EngineError::InternalError(Box::new(std::io::Error::other(format!(
                "{name} column family not found"
            ))))
        })
    }

    /// Every `(key, value)` of `family` whose key starts with `prefix`.
    fn scan(&self, family: &str, prefix: &[u8]) -> Result<Vec<(Box<[u8]>, Box<[u8]>)>> {
        let cf = self.family(family)?;
        let mut entries = Vec::new();
        for item in self
            .db
            .iterator_cf(cf, IteratorMode::From(prefix, Direction::Forward))
        {
            let (key, value) = item?;
            if !key.starts_with(prefix) {
                break;
            }
            entries.push((key, value));
        }
        Ok(entries)
    }
}

fn group_prefix(group: &GroupId) -> Vec<u8> {
    let mut prefix = group.as_str().as_bytes().to_vec();
    prefix.push(KEY_SEPARATOR);
    prefix
}

fn entry_key(expense: &Expense) -> Vec<u8> {
    let mut key = group_prefix(&expense.group);
    key.extend_from_slice(expense.id.as_str().as_bytes());
    key
}

#[async_trait]
impl LedgerStore for RocksDbLedgerStore {
    async fn record(&self, expense: Expense, splits: Vec<Split>) -> Result<bool> {
        check_splits_belong(&expense, &splits)?;
        let key = entry_key(&expense);
        let expenses = self.family(CF_EXPENSES)?;

        // Ignore duplicate expense ids
        if self.db.get_cf(expenses, &key)?.is_some() {
            return Ok(false);
        }

        let splits_cf = self.family(CF_SPLITS)?;
        let mut batch = WriteBatch::default();
        batch.put_cf(splits_cf, &key, serde_json::to_vec(&splits)?);
        batch.put_cf(expenses, &key, serde_json::to_vec(&expense)?);
        self.db.write(batch)?;
        Ok(true)
    }

    async fn load_ledger(&self, group: &GroupId) -> Result<Ledger> {
        let prefix = group_prefix(group);
        let mut ledger = Ledger::new();

        for (_key, value) in self.scan(CF_EXPENSES, &prefix)? {
            let expense: Expense = serde_json::from_slice(&value)?;
            ledger.splits.entry(expense.id.clone()).or_default();
            ledger.expenses.push(expense);
        }
        for (key, value) in self.scan(CF_SPLITS, &prefix)? {
            let expense = ExpenseId::new(String::from_utf8_lossy(&key[prefix.len()..]));
            let splits: Vec<Split> = serde_json::from_slice(&value)?;
            ledger.splits.entry(expense).or_default().extend(splits);
        }

        Ok(ledger)
    }

    async fn groups(&self) -> Result<Vec<GroupId>> {
        let cf = self.family(CF_EXPENSES)?;
        let mut groups = BTreeSet::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (key, _value) = item?;
            if let Some(end) = key.iter().position(|byte| *byte == KEY_SEPARATOR) {
                groups.insert(GroupId::new(String::from_utf8_lossy(&key[..end])));
            }
        }
        Ok(groups.into_iter().collect())
    }
}
