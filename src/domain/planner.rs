//! Turns a balance sheet into the transfers that clear it.
//!
//! The planner drains debtors against creditors in member-id order, two
//! pointers walking forward. Each emitted transfer exhausts at least one side,
//! so a plan never holds more than `debtors + creditors - 1` transfers.
//!
//! Draining in id order rather than by magnitude keeps the plan reproducible
//! and bounded, but it is not guaranteed to reach the smallest possible number
//! of transfers for every distribution of balances.

use super::member::MemberId;
use super::money::{Amount, Money};
use super::settlement::{Balances, Settlement};
use super::validation::{check_tolerance, within_tolerance};
use crate::error::{EngineError, Result};

/// A member with an outstanding position, tracked as a non-negative magnitude.
#[derive(Clone, Copy)]
struct Position<'a> {
    member: &'a MemberId,
    remaining: Money,
}

/// Plans the transfers that bring every balance to zero.
///
/// Members whose balance is within `epsilon` of zero are already settled and
/// take no part. Transfers come out debtor-major, creditor-minor, both sides
/// in ascending member-id order, so identical balances always give an
/// identical plan.
///
/// Settled members only pay or get paid when their small balances add up to
/// more than `epsilon`, as in a three-cent expense split one cent each. The
/// credit or debt left over by the main pass is then drained exactly against
/// them, and those transfers follow the main ones.
///
/// # Errors
///
/// * `InvalidAmount` if `epsilon` is negative.
/// * `BalanceImbalance` if more than `epsilon` of credit or debt is left over
///   once every position has been drained. This points to balances that do
///   not net to zero.
pub fn plan_settlements(balances: &Balances, epsilon: Money) -> Result<Vec<Settlement>> {
    check_tolerance(epsilon)?;

    let mut creditors = Vec::new();
    let mut debtors = Vec::new();
    for (member, balance) in balances {
        if balance.is_positive() {
            creditors.push(Position {
                member,
                remaining: *balance,
            });
        } else if balance.is_negative() {
            debtors.push(Position {
                member,
                remaining: balance.abs(),
            });
        }
    }

    let mut settlements = Vec::with_capacity((debtors.len() + creditors.len()).saturating_sub(1));
    drain(&mut debtors, &mut creditors, epsilon, &mut settlements)?;

    let mut unclaimed_credit = outstanding(&creditors, epsilon)?;
    let mut unpaid_debt = outstanding(&debtors, epsilon)?;

    if unclaimed_credit.is_positive() {
        let mut owed = open_positions(&creditors, epsilon);
        drain(&mut debtors, &mut owed, Money::ZERO, &mut settlements)?;
        unclaimed_credit = outstanding(&owed, epsilon)?;
    } else if unpaid_debt.is_positive() {
        let mut owing = open_positions(&debtors, epsilon);
        drain(&mut owing, &mut creditors, Money::ZERO, &mut settlements)?;
        unpaid_debt = outstanding(&owing, epsilon)?;
    }

    if unclaimed_credit != Money::ZERO || unpaid_debt != Money::ZERO {
        return Err(EngineError::BalanceImbalance {
            drift: unclaimed_credit.checked_sub(unpaid_debt)?.value(),
        });
    }

    Ok(settlements)
}

/// Pays creditors from debtors, both walked in order, until one side runs out.
///
/// Positions within `epsilon` are skipped, so with a zero tolerance every
/// non-zero position takes part.
fn drain(
    debtors: &mut [Position<'_>],
    creditors: &mut [Position<'_>],
    epsilon: Money,
    settlements: &mut Vec<Settlement>,
) -> Result<()> {
    let mut cursor = 0;

    for debtor in debtors.iter_mut() {
        while !within_tolerance(debtor.remaining, epsilon) {
            let Some(creditor) = creditors.get_mut(cursor) else {
                break;
            };
            if within_tolerance(creditor.remaining, epsilon) {
                cursor += 1;
                continue;
            }

            let transfer = debtor.remaining.min(creditor.remaining);
            settlements.push(Settlement {
                from: debtor.member.clone(),
                to: creditor.member.clone(),
                amount: Amount::try_from(transfer)?,
            });
            debtor.remaining = debtor.remaining.checked_sub(transfer)?;
            creditor.remaining = creditor.remaining.checked_sub(transfer)?;

            if within_tolerance(creditor.remaining, epsilon) {
                cursor += 1;
            }
        }
    }
    Ok(())
}

fn open_positions<'a>(positions: &[Position<'a>], epsilon: Money) -> Vec<Position<'a>> {
    positions
        .iter()
        .filter(|position| !within_tolerance(position.remaining, epsilon))
        .copied()
        .collect()
}

/// What is still owed beyond `epsilon`, summed over `positions`.
fn outstanding(positions: &[Position<'_>], epsilon: Money) -> Result<Money> {
    Money::checked_sum(
        open_positions(positions, epsilon)
            .into_iter()
            .map(|position| position.remaining),
    )
}
