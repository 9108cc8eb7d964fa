//! Invariant checks shared by the accumulator and the planner.
//!
//! Every check compares against a tolerance `epsilon`; a difference whose
//! magnitude is at most `epsilon` counts as zero.

use super::expense::{Expense, Split};
use super::money::Money;
use super::settlement::{Balances, Settlement};
use crate::error::{EngineError, Result};

pub fn within_tolerance(value: Money, epsilon: Money) -> bool {
    value.is_negligible(epsilon)
}

/// Rejects a negative tolerance.
pub fn check_tolerance(epsilon: Money) -> Result<()> {
    if epsilon.is_negative() {
        return Err(EngineError::invalid_amount(epsilon.value()));
    }
    Ok(())
}

pub fn check_non_negative(value: Money) -> Result<()> {
    if value.is_negative() {
        return Err(EngineError::invalid_amount(value.value()));
    }
    Ok(())
}

/// Checks that every split in `splits` names `expense` as its owner.
pub fn check_splits_belong(expense: &Expense, splits: &[Split]) -> Result<()> {
    match splits.iter().find(|split| split.expense != expense.id) {
        Some(stray) => Err(EngineError::UnknownExpense {
            expense: stray.expense.clone(),
        }),
        None => Ok(()),
    }
}

/// Checks that the splits of `expense` add up to its amount.
pub fn check_split_sum(expense: &Expense, splits: &[Split], epsilon: Money) -> Result<()> {
    let expected = Money::from(expense.amount);
    let actual = Money::checked_sum(splits.iter().map(|split| split.owed))?;

    if within_tolerance(expected.checked_sub(actual)?, epsilon) {
        Ok(())
    } else {
        Err(EngineError::SplitMismatch {
            expense: expense.id.clone(),
            expected: expected.value(),
            actual: actual.value(),
        })
    }
}

/// Checks that a group's balances net to zero.
pub fn check_conservation(balances: &Balances, epsilon: Money) -> Result<()> {
    let drift = balances.total()?;
    if within_tolerance(drift, epsilon) {
        Ok(())
    } else {
        Err(EngineError::BalanceImbalance {
            drift: drift.value(),
        })
    }
}

/// Checks that paying every settlement leaves each member at zero.
pub fn check_settlements_clear(
    balances: &Balances,
    settlements: &[Settlement],
    epsilon: Money,
) -> Result<()> {
    let remaining = balances.after_settlements(settlements)?;
    match remaining
        .iter()
        .find(|(_, balance)| !within_tolerance(**balance, epsilon))
    {
        Some((_, balance)) => Err(EngineError::BalanceImbalance {
            drift: balance.value(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::member::MemberId;
    use crate::domain::money::Amount;
    use rust_decimal_macros::dec;

    fn expense(amount: rust_decimal::Decimal) -> Expense {
        Expense::new("e1", "g1", Amount::new(amount).unwrap(), "alice")
    }

    #[test]
    fn test_split_sum_within_tolerance() {
        let splits = vec![
            Split::new("e1", "alice", Money::new(dec!(33.33))),
            Split::new("e1", "bob", Money::new(dec!(33.33))),
            Split::new("e1", "carol", Money::new(dec!(33.33))),
        ];
        assert!(check_split_sum(&expense(dec!(100)), &splits, Money::DEFAULT_EPSILON).is_ok());
    }

    #[test]
    fn test_splits_must_belong_to_their_expense() {
        let own = vec![Split::new("e1", "bob", Money::new(dec!(100)))];
        assert!(check_splits_belong(&expense(dec!(100)), &own).is_ok());
        assert!(check_splits_belong(&expense(dec!(100)), &[]).is_ok());

        let mixed = vec![
            Split::new("e1", "bob", Money::new(dec!(50))),
            Split::new("e2", "carol", Money::new(dec!(50))),
        ];
        let err = check_splits_belong(&expense(dec!(100)), &mixed).unwrap_err();
        assert!(matches!(err, EngineError::UnknownExpense { expense } if expense.as_str() == "e2"));
    }

    #[test]
    fn test_split_sum_mismatch() {
        let splits = vec![
            Split::new("e1", "alice", Money::new(dec!(40))),
            Split::new("e1", "bob", Money::new(dec!(50))),
        ];
        let err = check_split_sum(&expense(dec!(100)), &splits, Money::DEFAULT_EPSILON).unwrap_err();
        match err {
            EngineError::SplitMismatch {
                expense,
                expected,
                actual,
            } => {
                assert_eq!(expense.as_str(), "e1");
                assert_eq!(expected, dec!(100));
                assert_eq!(actual, dec!(90));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_overflowing_split_sum_is_an_error() {
        let max = Money::new(rust_decimal::Decimal::MAX);
        let splits = vec![Split::new("e1", "alice", max), Split::new("e1", "bob", max)];
        assert!(matches!(
            check_split_sum(&expense(dec!(100)), &splits, Money::DEFAULT_EPSILON),
            Err(EngineError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn test_conservation_reports_drift() {
        let balances: Balances = [
            (MemberId::from("a"), Money::new(dec!(10))),
            (MemberId::from("b"), Money::new(dec!(-9))),
        ]
        .into_iter()
        .collect();
        assert!(matches!(
            check_conservation(&balances, Money::DEFAULT_EPSILON),
            Err(EngineError::BalanceImbalance { drift }) if drift == dec!(1)
        ));
    }

    #[test]
    fn test_settlements_that_leave_residue_are_rejected() {
        let balances: Balances = [
            (MemberId::from("a"), Money::new(dec!(50))),
            (MemberId::from("b"), Money::new(dec!(-50))),
        ]
        .into_iter()
        .collect();
        let partial = vec![Settlement::new("b", "a", Amount::new(dec!(40)).unwrap())];
        assert!(check_settlements_clear(&balances, &partial, Money::DEFAULT_EPSILON).is_err());

        let full = vec![Settlement::new("b", "a", Amount::new(dec!(50)).unwrap())];
        assert!(check_settlements_clear(&balances, &full, Money::DEFAULT_EPSILON).is_ok());
    }

    #[test]
    fn test_negative_values_rejected() {
        assert!(check_tolerance(Money::new(dec!(-0.01))).is_err());
        assert!(check_tolerance(Money::ZERO).is_ok());
        assert!(check_non_negative(Money::new(dec!(-1))).is_err());
        assert!(check_non_negative(Money::ZERO).is_ok());
    }
}
