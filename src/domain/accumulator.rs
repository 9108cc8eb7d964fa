//! Folds a group's expenses and splits into one net balance per member.

use super::expense::{Expense, SplitsByExpense};
use super::money::Money;
use super::settlement::Balances;
use super::validation::{check_conservation, check_non_negative, check_split_sum, check_tolerance};
use crate::error::Result;

/// Computes every member's net balance using the default one-cent tolerance.
///
/// See [`compute_balances_within`].
pub fn compute_balances(expenses: &[Expense], splits: &SplitsByExpense) -> Result<Balances> {
    compute_balances_within(expenses, splits, Money::DEFAULT_EPSILON)
}

/// Computes every member's net balance.
///
/// The payer of each expense is credited the full amount and each split member
/// is debited what they owe. Expenses without splits are skipped. The whole
/// input is validated before anything is folded, so an error never leaves a
/// partially computed result behind.
///
/// Accumulation is plain addition into a map ordered by member id, so the
/// result does not depend on the order of `expenses` or of the splits within
/// an expense. Splits keyed by an expense that is not in `expenses` are ignored.
///
/// # Errors
///
/// * `InvalidAmount` if a split owes a negative amount, `epsilon` is negative,
///   or a running balance would overflow.
/// * `SplitMismatch` if an expense's splits do not sum to its amount within `epsilon`.
/// * `BalanceImbalance` if the resulting balances do not net to zero within `epsilon`.
pub fn compute_balances_within(
    expenses: &[Expense],
    splits: &SplitsByExpense,
    epsilon: Money,
) -> Result<Balances> {
    check_tolerance(epsilon)?;

    for expense in expenses {
        let Some(expense_splits) = splits.get(&expense.id) else {
            continue;
        };
        for split in expense_splits {
            check_non_negative(split.owed)?;
        }
        if !expense_splits.is_empty() {
            check_split_sum(expense, expense_splits, epsilon)?;
        }
    }

    let mut balances = Balances::new();
    for expense in expenses {
        balances.touch(&expense.payer);

        let expense_splits = match splits.get(&expense.id) {
            Some(expense_splits) if !expense_splits.is_empty() => expense_splits,
            _ => continue,
        };

        balances.credit(&expense.payer, expense.amount.into())?;
        for split in expense_splits {
            balances.debit(&split.member, split.owed)?;
        }
    }

    check_conservation(&balances, epsilon)?;
    Ok(balances)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::expense::{ExpenseId, Split};
    use crate::domain::member::MemberId;
    use crate::domain::money::Amount;
    use crate::error::EngineError;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn expense(id: &str, amount: Decimal, payer: &str) -> Expense {
        Expense::new(id, "trip", Amount::new(amount).unwrap(), payer)
    }

    fn split(expense: &str, member: &str, owed: Decimal) -> Split {
        Split::new(expense, member, Money::new(owed))
    }

    fn balance(balances: &Balances, member: &str) -> Decimal {
        balances.get(&MemberId::from(member)).unwrap().value()
    }

    #[test]
    fn test_single_equal_split() {
        let expenses = vec![expense("e1", dec!(300), "a")];
        let mut splits = SplitsByExpense::new();
        splits.insert(
            "e1".into(),
            vec![
                split("e1", "a", dec!(100)),
                split("e1", "b", dec!(100)),
                split("e1", "c", dec!(100)),
            ],
        );

        let balances = compute_balances(&expenses, &splits).unwrap();
        assert_eq!(balance(&balances, "a"), dec!(200));
        assert_eq!(balance(&balances, "b"), dec!(-100));
        assert_eq!(balance(&balances, "c"), dec!(-100));
    }

    #[test]
    fn test_two_expenses_accumulate() {
        let expenses = vec![expense("e1", dec!(300), "a"), expense("e2", dec!(150), "b")];
        let mut splits = SplitsByExpense::new();
        splits.insert(
            "e1".into(),
            vec![
                split("e1", "a", dec!(100)),
                split("e1", "b", dec!(100)),
                split("e1", "c", dec!(100)),
            ],
        );
        splits.insert(
            "e2".into(),
            vec![split("e2", "b", dec!(75)), split("e2", "c", dec!(75))],
        );

        let balances = compute_balances(&expenses, &splits).unwrap();
        assert_eq!(balance(&balances, "a"), dec!(200));
        assert_eq!(balance(&balances, "b"), dec!(-25));
        assert_eq!(balance(&balances, "c"), dec!(-175));
    }

    #[test]
    fn test_no_expenses_gives_empty_balances() {
        let balances = compute_balances(&[], &SplitsByExpense::new()).unwrap();
        assert!(balances.is_empty());
    }

    #[test]
    fn test_uneven_split() {
        let expenses = vec![expense("e1", dec!(100), "a")];
        let mut splits = SplitsByExpense::new();
        splits.insert(
            "e1".into(),
            vec![split("e1", "b", dec!(70)), split("e1", "c", dec!(30))],
        );

        let balances = compute_balances(&expenses, &splits).unwrap();
        assert_eq!(balance(&balances, "a"), dec!(100));
        assert_eq!(balance(&balances, "b"), dec!(-70));
        assert_eq!(balance(&balances, "c"), dec!(-30));
    }

    #[test]
    fn test_split_mismatch_identifies_expense() {
        let expenses = vec![expense("ok", dec!(10), "a"), expense("bad", dec!(100), "a")];
        let mut splits = SplitsByExpense::new();
        splits.insert("ok".into(), vec![split("ok", "b", dec!(10))]);
        splits.insert(
            "bad".into(),
            vec![split("bad", "a", dec!(45)), split("bad", "b", dec!(45))],
        );

        let err = compute_balances(&expenses, &splits).unwrap_err();
        assert!(matches!(&err, EngineError::SplitMismatch { expense, .. } if expense.as_str() == "bad"));
        assert_eq!(err.discrepancy(), Some(dec!(10)));
    }

    #[test]
    fn test_unsplit_expense_is_skipped() {
        let expenses = vec![expense("e1", dec!(50), "a"), expense("e2", dec!(20), "b")];
        let mut splits = SplitsByExpense::new();
        splits.insert("e1".into(), vec![split("e1", "c", dec!(50))]);
        splits.insert("e2".into(), Vec::new());

        let balances = compute_balances(&expenses, &splits).unwrap();
        assert_eq!(balance(&balances, "a"), dec!(50));
        assert_eq!(balance(&balances, "b"), dec!(0));
        assert_eq!(balance(&balances, "c"), dec!(-50));
    }

    #[test]
    fn test_negative_split_rejected_before_folding() {
        let expenses = vec![expense("e1", dec!(10), "a")];
        let mut splits = SplitsByExpense::new();
        splits.insert(
            "e1".into(),
            vec![split("e1", "b", dec!(20)), split("e1", "c", dec!(-10))],
        );

        assert!(matches!(
            compute_balances(&expenses, &splits),
            Err(EngineError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn test_accumulated_drift_is_an_imbalance() {
        // Each expense is off by less than a cent, but together they drift too far.
        let expenses: Vec<Expense> = (0..5)
            .map(|i| expense(&format!("e{i}"), dec!(10), "a"))
            .collect();
        let splits: SplitsByExpense = (0..5)
            .map(|i| {
                let id = format!("e{i}");
                (ExpenseId::from(id.as_str()), vec![split(&id, "b", dec!(9.995))])
            })
            .collect();

        assert!(matches!(
            compute_balances(&expenses, &splits),
            Err(EngineError::BalanceImbalance { drift }) if drift == dec!(0.025)
        ));
    }

    #[test]
    fn test_overflowing_balances_are_an_error() {
        let expenses = vec![expense("e1", Decimal::MAX, "a"), expense("e2", Decimal::MAX, "a")];
        let mut splits = SplitsByExpense::new();
        splits.insert("e1".into(), vec![split("e1", "b", Decimal::MAX)]);
        splits.insert("e2".into(), vec![split("e2", "b", Decimal::MAX)]);

        assert!(matches!(
            compute_balances(&expenses, &splits),
            Err(EngineError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn test_input_is_not_mutated() {
        let expenses = vec![expense("e1", dec!(30), "a")];
        let mut splits = SplitsByExpense::new();
        splits.insert("e1".into(), vec![split("e1", "b", dec!(30))]);
        let (expenses_before, splits_before) = (expenses.clone(), splits.clone());

        compute_balances(&expenses, &splits).unwrap();
        assert_eq!(expenses, expenses_before);
        assert_eq!(splits, splits_before);
    }
}
