//! Spend aggregation over a snapshot of confirmed transactions.
//!
//! Everything here is a pure function of its inputs: no storage access, no
//! clock, no cached totals. The engine loads a snapshot and calls in; tests
//! call in directly.
//!
//! An expense contributes `max(0, amount - reimbursed)` to the total, where
//! `reimbursed` is the sum of every reimbursement in the snapshot that points
//! at it. Per user, the expense is first weighted by its split and then the
//! *whole* reimbursed amount is subtracted from each user's share:
//!
//! ```text
//! 100.00 split equally, 40.00 reimbursed
//!   total = max(0, 100 - 40) = 60
//!   user1 = max(0,  50 - 40) = 10
//!   user2 = max(0,  50 - 40) = 10
//! ```

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    BudgetKind, DateWindow, Money, Period, ResultEngine, SplitType, Transaction,
    TransactionDetail, WindowMode,
};

/// Spend for one scope and window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendTotals {
    pub total: Decimal,
    pub user1: Decimal,
    pub user2: Decimal,
}

/// `(user1, user2)` share of an expense amount.
pub fn split_weights(split: &SplitType, amount: Decimal) -> (Decimal, Decimal) {
    match split {
        SplitType::User1Only => (amount, Decimal::ZERO),
        SplitType::User2Only => (Decimal::ZERO, amount),
        SplitType::SplitEqually => {
            let half = amount / Decimal::TWO;
            (half, half)
        }
        SplitType::Other(_) => (Decimal::ZERO, Decimal::ZERO),
    }
}

/// Sum of reimbursements per reimbursed transaction id.
pub fn reimbursements_by_target(snapshot: &[Transaction]) -> HashMap<Uuid, Money> {
    let mut reimbursed: HashMap<Uuid, Money> = HashMap::new();
    for tx in snapshot {
        if let Some(target) = tx.reimburses() {
            *reimbursed.entry(target).or_default() += tx.amount;
        }
    }
    reimbursed
}

fn excluded(tx: &Transaction, kind: BudgetKind) -> bool {
    match kind {
        BudgetKind::Monthly => tx.exclude_from_monthly,
        BudgetKind::Yearly => tx.exclude_from_yearly,
    }
}

fn clamp_non_negative(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

/// Windowed aggregation primitive.
///
/// Selects expenses dated inside `window`, whose category satisfies
/// `in_scope` and which are not excluded for the window's budget kind, then
/// nets each against its reimbursements.
pub fn aggregate<F>(snapshot: &[Transaction], window: &DateWindow, in_scope: F) -> SpendTotals
where
    F: Fn(Uuid) -> bool,
{
    let reimbursed = reimbursements_by_target(snapshot);
    let mut totals = SpendTotals::default();

    for tx in snapshot {
        let TransactionDetail::Expense {
            category_id,
            split_type,
            ..
        } = &tx.detail
        else {
            continue;
        };
        if !window.contains(tx.date) || !in_scope(*category_id) || excluded(tx, window.kind) {
            continue;
        }

        let amount = tx.amount.to_decimal();
        let refunded = reimbursed
            .get(&tx.id)
            .copied()
            .unwrap_or_default()
            .to_decimal();
        let (user1_share, user2_share) = split_weights(split_type, amount);

        totals.total += clamp_non_negative(amount - refunded);
        totals.user1 += clamp_non_negative(user1_share - refunded);
        totals.user2 += clamp_non_negative(user2_share - refunded);
    }

    totals
}

/// Spend of `category_ids` for `period` in `mode`.
///
/// A `YearlyPreviousMonths` window in January is empty and yields zero.
pub fn spend_for_categories(
    snapshot: &[Transaction],
    category_ids: &[Uuid],
    period: Period,
    mode: WindowMode,
) -> ResultEngine<SpendTotals> {
    let Some(window) = DateWindow::for_period(period, mode)? else {
        return Ok(SpendTotals::default());
    };
    Ok(aggregate(snapshot, &window, |id| category_ids.contains(&id)))
}

pub fn category_monthly_spend(
    snapshot: &[Transaction],
    category_id: Uuid,
    period: Period,
) -> ResultEngine<SpendTotals> {
    spend_for_categories(snapshot, &[category_id], period, WindowMode::Monthly)
}

pub fn category_yearly_spend(
    snapshot: &[Transaction],
    category_id: Uuid,
    period: Period,
) -> ResultEngine<SpendTotals> {
    spend_for_categories(snapshot, &[category_id], period, WindowMode::Yearly)
}

pub fn sector_monthly_spend(
    snapshot: &[Transaction],
    sector_category_ids: &[Uuid],
    period: Period,
) -> ResultEngine<SpendTotals> {
    spend_for_categories(snapshot, sector_category_ids, period, WindowMode::Monthly)
}

pub fn sector_yearly_spend(
    snapshot: &[Transaction],
    sector_category_ids: &[Uuid],
    period: Period,
) -> ResultEngine<SpendTotals> {
    spend_for_categories(snapshot, sector_category_ids, period, WindowMode::Yearly)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn expense(category_id: Uuid, cents: i64, on: NaiveDate, split: SplitType) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            date: on,
            description: "expense".to_string(),
            amount: Money::new(cents),
            detail: TransactionDetail::Expense {
                category_id,
                split_type: split,
                paid_by: "Shared".to_string(),
            },
            exclude_from_monthly: false,
            exclude_from_yearly: false,
            created_at: Utc::now(),
        }
    }

    fn reimbursement(target: Uuid, cents: i64, on: NaiveDate) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            date: on,
            description: "refund".to_string(),
            amount: Money::new(cents),
            detail: TransactionDetail::Reimbursement {
                paid_to: "Ana".to_string(),
                reimburses_transaction_id: Some(target),
            },
            exclude_from_monthly: false,
            exclude_from_yearly: false,
            created_at: Utc::now(),
        }
    }

    fn dec(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    fn march() -> Period {
        Period::new(2024, 3).unwrap()
    }

    #[test]
    fn full_reimbursement_is_subtracted_from_each_half() {
        let food = Uuid::new_v4();
        let dinner = expense(food, 10_000, date(2024, 3, 10), SplitType::SplitEqually);
        let snapshot = vec![
            reimbursement(dinner.id, 2_500, date(2024, 3, 12)),
            reimbursement(dinner.id, 1_500, date(2024, 4, 2)),
            dinner,
        ];

        let spend = category_monthly_spend(&snapshot, food, march()).unwrap();
        assert_eq!(spend.total, dec(6_000));
        assert_eq!(spend.user1, dec(1_000));
        assert_eq!(spend.user2, dec(1_000));
    }

    #[test]
    fn over_reimbursement_never_goes_negative() {
        let food = Uuid::new_v4();
        let lunch = expense(food, 3_000, date(2024, 3, 5), SplitType::User1Only);
        let other = expense(food, 1_000, date(2024, 3, 6), SplitType::User2Only);
        let snapshot = vec![reimbursement(lunch.id, 5_000, date(2024, 3, 7)), lunch, other];

        let spend = category_monthly_spend(&snapshot, food, march()).unwrap();
        assert_eq!(spend.total, dec(1_000));
        assert_eq!(spend.user1, Decimal::ZERO);
        assert_eq!(spend.user2, dec(1_000));
    }

    #[test]
    fn month_boundaries_are_inclusive_by_calendar_date() {
        let food = Uuid::new_v4();
        let snapshot = vec![
            expense(food, 100, date(2024, 3, 31), SplitType::User1Only),
            expense(food, 200, date(2024, 4, 1), SplitType::User1Only),
            expense(food, 400, date(2024, 2, 29), SplitType::User1Only),
            expense(food, 800, date(2024, 3, 1), SplitType::User1Only),
        ];

        let spend = category_monthly_spend(&snapshot, food, march()).unwrap();
        assert_eq!(spend.total, dec(900));
    }

    #[test]
    fn unknown_split_counts_in_total_but_not_per_user() {
        let food = Uuid::new_v4();
        let snapshot = vec![expense(
            food,
            1_000,
            date(2024, 3, 3),
            SplitType::Other("thirds".to_string()),
        )];

        let spend = category_monthly_spend(&snapshot, food, march()).unwrap();
        assert_eq!(spend.total, dec(1_000));
        assert_eq!(spend.user1, Decimal::ZERO);
        assert_eq!(spend.user2, Decimal::ZERO);
    }

    #[test]
    fn odd_cents_split_into_exact_halves() {
        let food = Uuid::new_v4();
        let snapshot = vec![expense(food, 101, date(2024, 3, 3), SplitType::SplitEqually)];

        let spend = category_monthly_spend(&snapshot, food, march()).unwrap();
        assert_eq!(spend.user1, Decimal::new(505, 3));
        assert_eq!(spend.user1 + spend.user2, spend.total);
    }

    #[test]
    fn exclusion_flags_apply_per_budget_kind() {
        let travel = Uuid::new_v4();
        let mut flight = expense(travel, 50_000, date(2024, 3, 3), SplitType::SplitEqually);
        flight.exclude_from_monthly = true;
        let mut hotel = expense(travel, 20_000, date(2024, 3, 4), SplitType::SplitEqually);
        hotel.exclude_from_yearly = true;
        let snapshot = vec![flight, hotel];

        let monthly = category_monthly_spend(&snapshot, travel, march()).unwrap();
        assert_eq!(monthly.total, dec(20_000));
        let yearly = category_yearly_spend(&snapshot, travel, march()).unwrap();
        assert_eq!(yearly.total, dec(50_000));
    }

    #[test]
    fn yearly_and_previous_month_windows() {
        let food = Uuid::new_v4();
        let snapshot = vec![
            expense(food, 100, date(2023, 12, 31), SplitType::User1Only),
            expense(food, 200, date(2024, 1, 15), SplitType::User1Only),
            expense(food, 400, date(2024, 2, 15), SplitType::User1Only),
            expense(food, 800, date(2024, 3, 15), SplitType::User1Only),
        ];

        let yearly = category_yearly_spend(&snapshot, food, march()).unwrap();
        assert_eq!(yearly.total, dec(1_400));

        let previous =
            spend_for_categories(&snapshot, &[food], march(), WindowMode::YearlyPreviousMonths)
                .unwrap();
        assert_eq!(previous.total, dec(600));

        let january = Period::new(2024, 1).unwrap();
        let empty =
            spend_for_categories(&snapshot, &[food], january, WindowMode::YearlyPreviousMonths)
                .unwrap();
        assert_eq!(empty, SpendTotals::default());
    }

    #[test]
    fn sector_scope_sums_member_categories_only() {
        let food = Uuid::new_v4();
        let drinks = Uuid::new_v4();
        let rent = Uuid::new_v4();
        let snapshot = vec![
            expense(food, 1_000, date(2024, 3, 3), SplitType::SplitEqually),
            expense(drinks, 500, date(2024, 3, 3), SplitType::User2Only),
            expense(rent, 90_000, date(2024, 3, 1), SplitType::SplitEqually),
        ];

        let spend = sector_monthly_spend(&snapshot, &[food, drinks], march()).unwrap();
        assert_eq!(spend.total, dec(1_500));
        assert_eq!(spend.user1, dec(500));
        assert_eq!(spend.user2, dec(1_000));

        let yearly = sector_yearly_spend(&snapshot, &[food, drinks], march()).unwrap();
        assert_eq!(yearly, spend);
    }

    #[test]
    fn non_expense_transactions_are_ignored() {
        let food = Uuid::new_v4();
        let income = Transaction {
            id: Uuid::new_v4(),
            date: date(2024, 3, 3),
            description: "salary".to_string(),
            amount: Money::new(300_000),
            detail: TransactionDetail::Income {
                paid_to: "Ana".to_string(),
            },
            exclude_from_monthly: false,
            exclude_from_yearly: false,
            created_at: Utc::now(),
        };
        let spend = category_monthly_spend(&[income], food, march()).unwrap();
        assert_eq!(spend, SpendTotals::default());
    }
}
