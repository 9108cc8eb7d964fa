//! Spending figures for a group, as shown next to the settlement plan.

use super::expense::{Expense, PAYMENT_CATEGORY, SplitsByExpense};
use super::member::MemberId;
use super::money::Money;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Per-member spending figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MemberSummary {
    /// What the member paid for split expenses.
    pub paid: Money,
    /// What the member owes across all split expenses.
    pub share: Money,
    /// Recorded settlement payments made minus those received.
    pub settled: Money,
    /// Net balance: `paid - share + settled`.
    pub net: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct GroupSummary {
    /// Every expense, split or not. Recorded settlement payments are not spending.
    pub total_spent: Money,
    pub by_category: BTreeMap<String, Money>,
    pub members: BTreeMap<MemberId, MemberSummary>,
}

fn is_payment(expense: &Expense) -> bool {
    expense.category == PAYMENT_CATEGORY
}

/// Summarizes a group's ledger.
///
/// Only expenses that have splits count towards `paid` and `share`, matching
/// what [`compute_balances`](super::accumulator::compute_balances) folds, so a
/// member's `net` equals their balance.
pub fn summarize(expenses: &[Expense], splits: &SplitsByExpense) -> Result<GroupSummary> {
    let mut summary = GroupSummary::default();

    for expense in expenses {
        let amount = Money::from(expense.amount);
        if !is_payment(expense) {
            summary.total_spent = summary.total_spent.checked_add(amount)?;
            let category = summary
                .by_category
                .entry(expense.category.clone())
                .or_default();
            *category = category.checked_add(amount)?;
        }

        let expense_splits = match splits.get(&expense.id) {
            Some(expense_splits) if !expense_splits.is_empty() => expense_splits,
            _ => continue,
        };

        let payer = summary.members.entry(expense.payer.clone()).or_default();
        if is_payment(expense) {
            payer.settled = payer.settled.checked_add(amount)?;
        } else {
            payer.paid = payer.paid.checked_add(amount)?;
        }

        for split in expense_splits {
            let member = summary.members.entry(split.member.clone()).or_default();
            if is_payment(expense) {
                member.settled = member.settled.checked_sub(split.owed)?;
            } else {
                member.share = member.share.checked_add(split.owed)?;
            }
        }
    }

    for member in summary.members.values_mut() {
        member.net = member
            .paid
            .checked_sub(member.share)?
            .checked_add(member.settled)?;
    }
    Ok(summary)
}

/// A member's share of the expenses dated on or after `since`.
pub fn spending_since(
    expenses: &[Expense],
    splits: &SplitsByExpense,
    member: &MemberId,
    since: DateTime<Utc>,
) -> Result<Money> {
    Money::checked_sum(
        expenses
            .iter()
            .filter(|expense| !is_payment(expense) && expense.occurred_at >= since)
            .filter_map(|expense| splits.get(&expense.id))
            .flatten()
            .filter(|split| &split.member == member)
            .map(|split| split.owed),
    )
}
