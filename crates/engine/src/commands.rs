//! Input structs for engine write operations.
//!
//! [`TransactionInput`] is the flat shape of the entry form. The same struct
//! is used to create a transaction, to patch one, to edit a pending import and
//! to override fields when approving it: unset fields fall back to the
//! existing value.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{BudgetAmount, Money, SplitType, TransactionType};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInput {
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub amount: Option<Money>,
    pub transaction_type: Option<TransactionType>,
    pub category_id: Option<Uuid>,
    pub split_type: Option<SplitType>,
    pub paid_by: Option<String>,
    pub paid_to: Option<String>,
    pub reimburses_transaction_id: Option<Uuid>,
    pub exclude_from_monthly: Option<bool>,
    pub exclude_from_yearly: Option<bool>,
}

impl TransactionInput {
    #[must_use]
    pub fn new(
        date: NaiveDate,
        description: impl Into<String>,
        amount: Money,
        transaction_type: TransactionType,
    ) -> Self {
        Self {
            date: Some(date),
            description: Some(description.into()),
            amount: Some(amount),
            transaction_type: Some(transaction_type),
            ..Default::default()
        }
    }

    /// Expense entry with every required field set.
    #[must_use]
    pub fn expense(
        date: NaiveDate,
        description: impl Into<String>,
        amount: Money,
        category_id: Uuid,
        split_type: SplitType,
        paid_by: impl Into<String>,
    ) -> Self {
        Self::new(date, description, amount, TransactionType::Expense)
            .category_id(category_id)
            .split_type(split_type)
            .paid_by(paid_by)
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn split_type(mut self, split_type: SplitType) -> Self {
        self.split_type = Some(split_type);
        self
    }

    #[must_use]
    pub fn paid_by(mut self, name: impl Into<String>) -> Self {
        self.paid_by = Some(name.into());
        self
    }

    #[must_use]
    pub fn paid_to(mut self, name: impl Into<String>) -> Self {
        self.paid_to = Some(name.into());
        self
    }

    #[must_use]
    pub fn reimburses(mut self, transaction_id: Uuid) -> Self {
        self.reimburses_transaction_id = Some(transaction_id);
        self
    }

    #[must_use]
    pub fn amount(mut self, amount: Money) -> Self {
        self.amount = Some(amount);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn transaction_type(mut self, transaction_type: TransactionType) -> Self {
        self.transaction_type = Some(transaction_type);
        self
    }

    #[must_use]
    pub fn excluded(mut self, monthly: bool, yearly: bool) -> Self {
        self.exclude_from_monthly = Some(monthly);
        self.exclude_from_yearly = Some(yearly);
        self
    }

    /// Field-wise merge: values set on `self` win over `fallback`.
    #[must_use]
    pub fn or(self, fallback: TransactionInput) -> Self {
        Self {
            date: self.date.or(fallback.date),
            description: self.description.or(fallback.description),
            amount: self.amount.or(fallback.amount),
            transaction_type: self.transaction_type.or(fallback.transaction_type),
            category_id: self.category_id.or(fallback.category_id),
            split_type: self.split_type.or(fallback.split_type),
            paid_by: self.paid_by.or(fallback.paid_by),
            paid_to: self.paid_to.or(fallback.paid_to),
            reimburses_transaction_id: self
                .reimburses_transaction_id
                .or(fallback.reimburses_transaction_id),
            exclude_from_monthly: self.exclude_from_monthly.or(fallback.exclude_from_monthly),
            exclude_from_yearly: self.exclude_from_yearly.or(fallback.exclude_from_yearly),
        }
    }
}

/// Requested sector budget.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorBudgetSpec {
    pub amount: BudgetAmount,
    /// When set, the stored amount is ignored and the effective budget is the
    /// sum of the sector's category budgets.
    pub auto_rollup: bool,
}

impl SectorBudgetSpec {
    #[must_use]
    pub fn manual(amount: BudgetAmount) -> Self {
        Self {
            amount,
            auto_rollup: false,
        }
    }

    #[must_use]
    pub fn auto_rollup() -> Self {
        Self {
            amount: BudgetAmount::Absolute {
                amount: Money::ZERO,
            },
            auto_rollup: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn or_prefers_set_fields() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let base = TransactionInput::new(date, "Groceries", Money::new(100), TransactionType::Expense)
            .paid_by("Ana");
        let merged = TransactionInput::default()
            .amount(Money::new(250))
            .or(base);
        assert_eq!(merged.amount, Some(Money::new(250)));
        assert_eq!(merged.description.as_deref(), Some("Groceries"));
        assert_eq!(merged.paid_by.as_deref(), Some("Ana"));
        assert_eq!(merged.date, Some(date));
    }
}
