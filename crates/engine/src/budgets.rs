//! Budget amounts shared by category and sector budgets.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::{EngineError, Money, ResultEngine};

pub(crate) const BUDGET_TYPE_ABSOLUTE: &str = "absolute";
pub(crate) const BUDGET_TYPE_SPLIT: &str = "split";

/// A budget is either one amount or one amount per user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "budget_type", rename_all = "snake_case")]
pub enum BudgetAmount {
    Absolute { amount: Money },
    Split { user1: Money, user2: Money },
}

impl BudgetAmount {
    /// Amount compared against spend.
    ///
    /// Saturates instead of wrapping; amounts written through the engine
    /// are validated so the sum always fits.
    pub fn effective(&self) -> Money {
        match *self {
            Self::Absolute { amount } => amount,
            Self::Split { user1, user2 } => user1.saturating_add(user2),
        }
    }

    pub(crate) fn budget_type(&self) -> &'static str {
        match self {
            Self::Absolute { .. } => BUDGET_TYPE_ABSOLUTE,
            Self::Split { .. } => BUDGET_TYPE_SPLIT,
        }
    }

    pub(crate) fn validate(&self) -> ResultEngine<()> {
        let negative = match *self {
            Self::Absolute { amount } => amount < Money::ZERO,
            Self::Split { user1, user2 } => user1 < Money::ZERO || user2 < Money::ZERO,
        };
        if negative {
            return Err(EngineError::Validation(
                "budget amounts must not be negative".to_string(),
            ));
        }
        if let Self::Split { user1, user2 } = *self
            && user1.checked_add(user2).is_none()
        {
            return Err(EngineError::Validation(
                "budget amount too large".to_string(),
            ));
        }
        Ok(())
    }

    /// Columns `(absolute_amount, user1_amount, user2_amount)`.
    pub(crate) fn columns(&self) -> (Option<i64>, Option<i64>, Option<i64>) {
        match *self {
            Self::Absolute { amount } => (Some(amount.cents()), None, None),
            Self::Split { user1, user2 } => (None, Some(user1.cents()), Some(user2.cents())),
        }
    }

    pub(crate) fn from_columns(
        budget_type: &str,
        absolute_amount: Option<i64>,
        user1_amount: Option<i64>,
        user2_amount: Option<i64>,
    ) -> ResultEngine<Self> {
        match budget_type {
            BUDGET_TYPE_ABSOLUTE => Ok(Self::Absolute {
                amount: Money::new(absolute_amount.unwrap_or_default()),
            }),
            BUDGET_TYPE_SPLIT => Ok(Self::Split {
                user1: Money::new(user1_amount.unwrap_or_default()),
                user2: Money::new(user2_amount.unwrap_or_default()),
            }),
            other => Err(EngineError::Validation(format!(
                "invalid budget type: {other}"
            ))),
        }
    }
}

/// Budget compared with spend.
///
/// `remaining` and `remaining_pct` are `None` when the budget is zero.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetComparison {
    pub budget: Decimal,
    pub spent: Decimal,
    pub remaining: Option<Decimal>,
    pub remaining_pct: Option<Decimal>,
}

impl BudgetComparison {
    pub fn new(budget: Money, spent: Decimal) -> Self {
        let budget = budget.to_decimal();
        if budget <= Decimal::ZERO {
            return Self {
                budget,
                spent,
                remaining: None,
                remaining_pct: None,
            };
        }
        let remaining = budget - spent;
        let pct = (remaining / budget * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        Self {
            budget,
            spent,
            remaining: Some(remaining),
            remaining_pct: Some(pct),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_budget_effective_amount_is_the_sum() {
        let amount = BudgetAmount::Split {
            user1: Money::new(12_000),
            user2: Money::new(8_000),
        };
        assert_eq!(amount.effective(), Money::new(20_000));
    }

    #[test]
    fn remaining_percentage_rounds_to_two_decimals() {
        let cmp = BudgetComparison::new(Money::new(30_000), Decimal::new(10_000, 2));
        assert_eq!(cmp.remaining, Some(Decimal::new(20_000, 2)));
        assert_eq!(cmp.remaining_pct, Some(Decimal::new(6667, 2)));
    }

    #[test]
    fn overspending_gives_negative_remaining() {
        let cmp = BudgetComparison::new(Money::new(10_000), Decimal::new(15_000, 2));
        assert_eq!(cmp.remaining_pct, Some(Decimal::new(-5000, 2)));
    }

    #[test]
    fn zero_budget_leaves_remaining_undefined() {
        let cmp = BudgetComparison::new(Money::ZERO, Decimal::new(4_200, 2));
        assert_eq!(cmp.remaining, None);
        assert_eq!(cmp.remaining_pct, None);
    }

    #[test]
    fn negative_amounts_are_rejected() {
        let amount = BudgetAmount::Split {
            user1: Money::new(-1),
            user2: Money::new(5),
        };
        assert!(amount.validate().is_err());
    }

    #[test]
    fn split_that_overflows_is_rejected() {
        let amount = BudgetAmount::Split {
            user1: Money::new(i64::MAX),
            user2: Money::new(1),
        };
        assert_eq!(
            amount.validate(),
            Err(EngineError::Validation("budget amount too large".to_string()))
        );
        assert_eq!(amount.effective(), Money::new(i64::MAX));
    }
}
