//! Mapping between wire types and engine types.

use api_types::{
    PeriodView,
    budget::{BudgetAmountFields, BudgetType, CategoryBudgetView, SectorBudgetView},
    import::{ImportStatus, PendingView},
    transaction::{TransactionFields, TransactionType, TransactionView},
};
use engine::{
    BudgetAmount, CategoryBudget, Money, PendingTransaction, Period, SectorBudget, SplitType,
    Transaction, TransactionDetail, TransactionInput,
};

use crate::ServerError;

pub(crate) fn period(year: i32, month: u32) -> Result<Period, ServerError> {
    Ok(Period::new(year, month)?)
}

pub(crate) fn period_view(period: Period) -> PeriodView {
    PeriodView {
        year: period.year,
        month: period.month,
    }
}

pub(crate) fn transaction_type(kind: TransactionType) -> engine::TransactionType {
    match kind {
        TransactionType::Expense => engine::TransactionType::Expense,
        TransactionType::Income => engine::TransactionType::Income,
        TransactionType::Settlement => engine::TransactionType::Settlement,
        TransactionType::Reimbursement => engine::TransactionType::Reimbursement,
    }
}

fn transaction_type_view(kind: engine::TransactionType) -> TransactionType {
    match kind {
        engine::TransactionType::Expense => TransactionType::Expense,
        engine::TransactionType::Income => TransactionType::Income,
        engine::TransactionType::Settlement => TransactionType::Settlement,
        engine::TransactionType::Reimbursement => TransactionType::Reimbursement,
    }
}

pub(crate) fn transaction_input(fields: TransactionFields) -> TransactionInput {
    TransactionInput {
        date: fields.date,
        description: fields.description,
        amount: fields.amount_minor.map(Money::new),
        transaction_type: fields.transaction_type.map(transaction_type),
        category_id: fields.category_id,
        split_type: fields.split_type.as_deref().map(SplitType::from),
        paid_by: fields.paid_by,
        paid_to: fields.paid_to,
        reimburses_transaction_id: fields.reimburses_transaction_id,
        exclude_from_monthly: fields.exclude_from_monthly,
        exclude_from_yearly: fields.exclude_from_yearly,
    }
}

pub(crate) fn transaction_view(tx: Transaction) -> TransactionView {
    let transaction_type = transaction_type_view(tx.transaction_type());
    let (category_id, split_type, paid_by, paid_to, reimburses) = match tx.detail {
        TransactionDetail::Expense {
            category_id,
            split_type,
            paid_by,
        } => (
            Some(category_id),
            Some(split_type.as_str().to_string()),
            Some(paid_by),
            None,
            None,
        ),
        TransactionDetail::Income { paid_to } => (None, None, None, Some(paid_to), None),
        TransactionDetail::Settlement { paid_by, paid_to } => {
            (None, None, Some(paid_by), Some(paid_to), None)
        }
        TransactionDetail::Reimbursement {
            paid_to,
            reimburses_transaction_id,
        } => (None, None, None, Some(paid_to), reimburses_transaction_id),
    };
    TransactionView {
        id: tx.id,
        date: tx.date,
        description: tx.description,
        amount_minor: tx.amount.cents(),
        transaction_type,
        category_id,
        split_type,
        paid_by,
        paid_to,
        reimburses_transaction_id: reimburses,
        exclude_from_monthly: tx.exclude_from_monthly,
        exclude_from_yearly: tx.exclude_from_yearly,
        created_at: tx.created_at,
    }
}

pub(crate) fn budget_amount(fields: &BudgetAmountFields) -> Result<BudgetAmount, ServerError> {
    match fields.budget_type {
        BudgetType::Absolute => Ok(BudgetAmount::Absolute {
            amount: Money::new(fields.absolute_amount_minor.unwrap_or_default()),
        }),
        BudgetType::Split => match (fields.user1_amount_minor, fields.user2_amount_minor) {
            (Some(user1), Some(user2)) => Ok(BudgetAmount::Split {
                user1: Money::new(user1),
                user2: Money::new(user2),
            }),
            _ => Err(ServerError::Generic(
                "split budgets need user1_amount_minor and user2_amount_minor".to_string(),
            )),
        },
    }
}

fn budget_fields(amount: BudgetAmount) -> BudgetAmountFields {
    match amount {
        BudgetAmount::Absolute { amount } => BudgetAmountFields {
            budget_type: BudgetType::Absolute,
            absolute_amount_minor: Some(amount.cents()),
            user1_amount_minor: None,
            user2_amount_minor: None,
        },
        BudgetAmount::Split { user1, user2 } => BudgetAmountFields {
            budget_type: BudgetType::Split,
            absolute_amount_minor: None,
            user1_amount_minor: Some(user1.cents()),
            user2_amount_minor: Some(user2.cents()),
        },
    }
}

pub(crate) fn category_budget_view(budget: CategoryBudget) -> CategoryBudgetView {
    CategoryBudgetView {
        id: budget.id,
        category_id: budget.category_id,
        year: budget.period.year,
        month: budget.period.month,
        effective_amount_minor: budget.amount.effective().cents(),
        amount: budget_fields(budget.amount),
    }
}

pub(crate) fn sector_budget_view(budget: SectorBudget) -> SectorBudgetView {
    SectorBudgetView {
        id: budget.id,
        sector_id: budget.sector_id,
        year: budget.period.year,
        month: budget.period.month,
        amount: budget_fields(budget.amount),
        auto_rollup: budget.auto_rollup,
        effective_amount_minor: budget.effective_amount.cents(),
    }
}

fn import_status_view(status: engine::ImportStatus) -> ImportStatus {
    match status {
        engine::ImportStatus::Pending => ImportStatus::Pending,
        engine::ImportStatus::Edited => ImportStatus::Edited,
        engine::ImportStatus::Approved => ImportStatus::Approved,
        engine::ImportStatus::Rejected => ImportStatus::Rejected,
    }
}

pub(crate) fn pending_view(pending: PendingTransaction) -> PendingView {
    PendingView {
        id: pending.id,
        external_transaction_id: pending.external_transaction_id,
        connected_account_id: pending.connected_account_id,
        date: pending.date,
        description: pending.description,
        amount_minor: pending.amount.cents(),
        transaction_type: transaction_type_view(pending.transaction_type),
        status: import_status_view(pending.status),
        approved_at: pending.approved_at,
        rejected_at: pending.rejected_at,
        transaction_id: pending.transaction_id,
        category_id: pending.category_id,
        split_type: pending.split_type.map(|s| s.as_str().to_string()),
        paid_by: pending.paid_by,
        paid_to: pending.paid_to,
        reimburses_transaction_id: pending.reimburses_transaction_id,
        created_at: pending.created_at,
    }
}
