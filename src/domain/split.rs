use super::expense::{ExpenseId, Split};
use super::member::MemberId;
use super::money::{Amount, Money};
use crate::error::{EngineError, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::BTreeSet;

/// Decimal places of the smallest currency unit.
pub const MINOR_UNIT_SCALE: u32 = 2;

const MINOR_UNIT: Decimal = Decimal::from_parts(1, 0, 0, false, MINOR_UNIT_SCALE);

/// Splits `amount` equally between `members`, exact to the minor unit.
///
/// Every participant gets the amount divided down to whole cents; the cents
/// left over go one each to the first participants in id order, and any
/// sub-cent remainder lands on the first participant. The splits always sum
/// to `amount` exactly. Duplicate members are counted once.
pub fn equal_split(expense: &ExpenseId, amount: Amount, members: &[MemberId]) -> Result<Vec<Split>> {
    let participants: BTreeSet<&MemberId> = members.iter().collect();
    if participants.is_empty() {
        return Err(EngineError::NoParticipants {
            expense: expense.clone(),
        });
    }

    let count = Decimal::from(participants.len());
    let base = (amount.value() / count)
        .round_dp_with_strategy(MINOR_UNIT_SCALE, RoundingStrategy::ToZero);
    let mut remainder = amount.value() - base * count;

    let mut splits: Vec<Split> = participants
        .into_iter()
        .map(|member| {
            let mut owed = base;
            if remainder >= MINOR_UNIT {
                owed += MINOR_UNIT;
                remainder -= MINOR_UNIT;
            }
            Split::new(expense.clone(), member.clone(), Money::new(owed))
        })
        .collect();

    if !remainder.is_zero() {
        splits[0].owed = splits[0].owed.checked_add(Money::new(remainder))?;
    }

    Ok(splits)
}
