use crate::domain::expense::{DEFAULT_CATEGORY, Expense, ExpenseId, GroupId, Split};
use crate::domain::ledger::payment_entry;
use crate::domain::member::MemberId;
use crate::domain::money::{Amount, Money};
use crate::domain::settlement::Settlement;
use crate::domain::validation::check_non_negative;
use crate::error::{EngineError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    Expense,
    Split,
    Payment,
}

/// One row of a ledger CSV stream.
///
/// `expense` rows declare an expense paid by `member`; `split` rows attribute
/// part of an earlier expense to `member`; `payment` rows record that `member`
/// paid `counterparty` to settle up.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct LedgerRecord {
    pub r#type: RecordType,
    pub expense: ExpenseId,
    pub group: Option<GroupId>,
    pub member: MemberId,
    pub amount: Decimal,
    pub category: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub counterparty: Option<MemberId>,
}

/// Reads ledger records from a CSV source.
///
/// This reader wraps `csv::Reader` and provides an iterator over `Result<LedgerRecord>`.
/// It handles whitespace trimming and flexible record lengths automatically.
pub struct LedgerReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> LedgerReader<R> {
    /// Creates a new `LedgerReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes records.
    pub fn records(self) -> impl Iterator<Item = Result<LedgerRecord>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(EngineError::from))
    }
}

/// Groups a stream of ledger records into expenses with their splits.
///
/// Splits may only follow the expense they belong to. Rejected records leave
/// the assembler untouched, so a caller can log them and carry on.
#[derive(Debug, Default)]
pub struct LedgerAssembler {
    entries: Vec<(Expense, Vec<Split>)>,
    index: HashMap<ExpenseId, usize>,
}

impl LedgerAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, record: LedgerRecord) -> Result<()> {
        match record.r#type {
            RecordType::Expense => {
                let group = required(record.group, "group")?;
                let mut expense =
                    Expense::new(record.expense, group, Amount::new(record.amount)?, record.member)
                        .with_category(
                            record
                                .category
                                .unwrap_or_else(|| DEFAULT_CATEGORY.to_owned()),
                        );
                if let Some(timestamp) = record.timestamp {
                    expense = expense.at(timestamp);
                }
                self.insert(expense, Vec::new())
            }
            RecordType::Split => {
                let owed = Money::new(record.amount);
                check_non_negative(owed)?;
                let position = *self.index.get(&record.expense).ok_or_else(|| {
                    EngineError::UnknownExpense {
                        expense: record.expense.clone(),
                    }
                })?;
                self.entries[position]
                    .1
                    .push(Split::new(record.expense, record.member, owed));
                Ok(())
            }
            RecordType::Payment => {
                let group = required(record.group, "group")?;
                let to = required(record.counterparty, "counterparty")?;
                let settlement = Settlement::new(record.member, to, Amount::new(record.amount)?);
                let at = record.timestamp.unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
                let (expense, split) = payment_entry(record.expense, group, &settlement, at);
                self.insert(expense, vec![split])
            }
        }
    }

    fn insert(&mut self, expense: Expense, splits: Vec<Split>) -> Result<()> {
        if self.index.contains_key(&expense.id) {
            return Err(EngineError::InvalidRecord(format!(
                "duplicate expense id {}",
                expense.id
            )));
        }
        self.index.insert(expense.id.clone(), self.entries.len());
        self.entries.push((expense, splits));
        Ok(())
    }

    /// Expenses with their splits, in the order they were declared.
    pub fn into_entries(self) -> Vec<(Expense, Vec<Split>)> {
        self.entries
    }
}

fn required<T>(value: Option<T>, field: &str) -> Result<T> {
    value.ok_or_else(|| EngineError::InvalidRecord(format!("missing {field}")))
}
