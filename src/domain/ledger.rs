use super::accumulator::compute_balances_within;
use super::expense::{Expense, ExpenseId, GroupId, PAYMENT_CATEGORY, Split, SplitsByExpense};
use super::money::Money;
use super::settlement::{Balances, Settlement};
use crate::error::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// The pre-materialized ledger of one group: every expense plus its splits.
///
/// Stores hand the engine a whole `Ledger` in one read, so nothing in the
/// arithmetic ever goes back to storage for a single split.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Ledger {
    pub expenses: Vec<Expense>,
    pub splits: SplitsByExpense,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    /// Adds an expense with its splits, appending to any splits already known for it.
    pub fn push(&mut self, expense: Expense, splits: Vec<Split>) {
        self.splits
            .entry(expense.id.clone())
            .or_default()
            .extend(splits);
        self.expenses.push(expense);
    }

    /// Records a settlement that has actually been paid.
    ///
    /// The payment becomes an ordinary ledger entry: an expense paid by
    /// `settlement.from` with a single split owed by `settlement.to`. Folding it
    /// moves both members towards zero by the settled amount.
    pub fn record_payment(
        &mut self,
        id: impl Into<ExpenseId>,
        group: impl Into<GroupId>,
        settlement: &Settlement,
        at: DateTime<Utc>,
    ) -> ExpenseId {
        let (expense, split) = payment_entry(id, group, settlement, at);
        let id = expense.id.clone();
        self.push(expense, vec![split]);
        id
    }

    pub fn balances(&self, epsilon: Money) -> Result<Balances> {
        compute_balances_within(&self.expenses, &self.splits, epsilon)
    }

    /// SHA-256 over a canonical encoding of the ledger, hex encoded.
    ///
    /// Expenses are hashed in id order and splits in member order, so two
    /// ledgers holding the same entries in any order share a fingerprint.
    pub fn fingerprint(&self) -> String {
        let mut expenses: Vec<&Expense> = self.expenses.iter().collect();
        expenses.sort_by(|a, b| a.id.cmp(&b.id));

        let mut hasher = Sha256::new();
        for expense in expenses {
            hash_field(&mut hasher, expense.id.as_str());
            hash_field(&mut hasher, expense.group.as_str());
            hash_field(&mut hasher, &expense.amount.to_string());
            hash_field(&mut hasher, expense.payer.as_str());
            hash_field(
                &mut hasher,
                &expense
                    .occurred_at
                    .to_rfc3339_opts(SecondsFormat::AutoSi, true),
            );
            hash_field(&mut hasher, &expense.category);

            let mut splits: Vec<&Split> = self
                .splits
                .get(&expense.id)
                .map(|splits| splits.iter().collect())
                .unwrap_or_default();
            splits.sort_by(|a, b| (&a.member, a.owed).cmp(&(&b.member, b.owed)));

            hash_field(&mut hasher, &splits.len().to_string());
            for split in splits {
                hash_field(&mut hasher, split.member.as_str());
                hash_field(&mut hasher, &split.owed.to_string());
            }
        }
        format!("{:x}", hasher.finalize())
    }
}

/// Builds the ledger entry recording that `settlement` has been paid.
pub fn payment_entry(
    id: impl Into<ExpenseId>,
    group: impl Into<GroupId>,
    settlement: &Settlement,
    at: DateTime<Utc>,
) -> (Expense, Split) {
    let id = id.into();
    let expense = Expense::new(id.clone(), group, settlement.amount, settlement.from.clone())
        .with_category(PAYMENT_CATEGORY)
        .at(at);
    let split = Split::new(id, settlement.to.clone(), settlement.amount.into());
    (expense, split)
}

fn hash_field(hasher: &mut Sha256, field: &str) {
    hasher.update((field.len() as u64).to_be_bytes());
    hasher.update(field.as_bytes());
}
