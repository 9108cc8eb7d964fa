pub use super::id::{ExpenseId, GroupId};
use super::member::MemberId;
use super::money::{Amount, Money};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Category applied when the ledger row does not carry one.
pub const DEFAULT_CATEGORY: &str = "Other";

/// Category tag of ledger entries that record a settled transfer.
pub const PAYMENT_CATEGORY: &str = "settlement";

/// Splits of a group's ledger, batch-fetched and keyed by the expense they belong to.
pub type SplitsByExpense = HashMap<ExpenseId, Vec<Split>>;

/// A shared expense paid by one member on behalf of the group.
///
/// `category` and `occurred_at` are carried through untouched; the balance
/// arithmetic only reads `amount` and `payer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub group: GroupId,
    pub amount: Amount,
    pub payer: MemberId,
    pub occurred_at: DateTime<Utc>,
    pub category: String,
}

impl Expense {
    pub fn new(
        id: impl Into<ExpenseId>,
        group: impl Into<GroupId>,
        amount: Amount,
        payer: impl Into<MemberId>,
    ) -> Self {
        Self {
            id: id.into(),
            group: group.into(),
            amount,
            payer: payer.into(),
            occurred_at: DateTime::<Utc>::UNIX_EPOCH,
            category: DEFAULT_CATEGORY.to_owned(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = occurred_at;
        self
    }
}

/// The portion of one expense attributed to one member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    pub expense: ExpenseId,
    pub member: MemberId,
    pub owed: Money,
}

impl Split {
    pub fn new(expense: impl Into<ExpenseId>, member: impl Into<MemberId>, owed: Money) -> Self {
        Self {
            expense: expense.into(),
            member: member.into(),
            owed,
        }
    }
}
