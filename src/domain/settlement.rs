use super::member::MemberId;
use super::money::{Amount, Money};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map;

/// A single directed payment instruction: `from` pays `to` the given amount.
///
/// Settlements are computed facts of the current ledger; they carry no status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Amount,
}

impl Settlement {
    pub fn new(from: impl Into<MemberId>, to: impl Into<MemberId>, amount: Amount) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            amount,
        }
    }
}

/// Net position of every member of a group, keyed and iterated by member id.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Balances(BTreeMap<MemberId, Money>);

impl Balances {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, member: &MemberId) -> Option<Money> {
        self.0.get(member).copied()
    }

    /// Registers a member at zero without touching an existing balance.
    pub fn touch(&mut self, member: &MemberId) {
        if !self.0.contains_key(member) {
            self.0.insert(member.clone(), Money::ZERO);
        }
    }

    pub fn credit(&mut self, member: &MemberId, amount: Money) -> Result<()> {
        let balance = self.0.entry(member.clone()).or_default();
        *balance = balance.checked_add(amount)?;
        Ok(())
    }

    pub fn debit(&mut self, member: &MemberId, amount: Money) -> Result<()> {
        let balance = self.0.entry(member.clone()).or_default();
        *balance = balance.checked_sub(amount)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, MemberId, Money> {
        self.0.iter()
    }

    /// Signed sum of all balances; zero for a consistent ledger.
    pub fn total(&self) -> Result<Money> {
        Money::checked_sum(self.0.values().copied())
    }

    /// Returns the balances left after every transfer has been paid.
    ///
    /// Paying raises the payer's balance towards zero and lowers the payee's.
    pub fn after_settlements(&self, settlements: &[Settlement]) -> Result<Self> {
        let mut remaining = self.clone();
        for settlement in settlements {
            remaining.credit(&settlement.from, settlement.amount.into())?;
            remaining.debit(&settlement.to, settlement.amount.into())?;
        }
        Ok(remaining)
    }
}

impl FromIterator<(MemberId, Money)> for Balances {
    fn from_iter<I: IntoIterator<Item = (MemberId, Money)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Balances {
    type Item = (&'a MemberId, &'a Money);
    type IntoIter = btree_map::Iter<'a, MemberId, Money>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
