use sea_orm::{QueryFilter, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    BudgetComparison, DateWindow, EngineError, Money, Period, ResultEngine, SpendTotals,
    Transaction, TransactionType, WindowMode, aggregator, transactions,
};

use super::{
    Engine,
    categories::{require_category, require_sector, sector_member_ids},
};

/// What a spend figure is computed for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", content = "id", rename_all = "snake_case")]
pub enum SpendScope {
    Category(Uuid),
    Sector(Uuid),
}

/// Budget and spend side by side for one scope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetStatus {
    pub scope: SpendScope,
    pub period: Period,
    pub mode: WindowMode,
    pub spend: SpendTotals,
    pub comparison: BudgetComparison,
}

impl Engine {
    /// Spend of `scope` over the window of `period` in `mode`.
    pub async fn spend(
        &self,
        scope: SpendScope,
        period: Period,
        mode: WindowMode,
    ) -> ResultEngine<SpendTotals> {
        let category_ids = self.scope_categories(scope).await?;
        let Some(window) = DateWindow::for_period(period, mode)? else {
            return Ok(SpendTotals::default());
        };
        let snapshot = self.spend_snapshot(&category_ids, &window).await?;
        aggregator::spend_for_categories(&snapshot, &category_ids, period, mode)
    }

    /// Spend compared with the budget of the same window.
    ///
    /// Monthly mode uses the month's budget; the yearly modes add up the
    /// monthly budgets of the months inside the window.
    pub async fn budget_status(
        &self,
        scope: SpendScope,
        period: Period,
        mode: WindowMode,
    ) -> ResultEngine<BudgetStatus> {
        let spend = self.spend(scope, period, mode).await?;

        let months: Vec<Period> = match mode {
            WindowMode::Monthly => vec![period],
            WindowMode::Yearly => (1..=period.month)
                .map(|month| Period::new(period.year, month))
                .collect::<ResultEngine<_>>()?,
            WindowMode::YearlyPreviousMonths => (1..period.month)
                .map(|month| Period::new(period.year, month))
                .collect::<ResultEngine<_>>()?,
        };
        let mut budget = Money::ZERO;
        for month in months {
            let amount = match scope {
                SpendScope::Category(id) => self
                    .category_budget(id, month)
                    .await?
                    .map(|b| b.amount.effective()),
                SpendScope::Sector(id) => self
                    .sector_budget(id, month)
                    .await?
                    .map(|b| b.effective_amount),
            };
            budget = budget
                .checked_add(amount.unwrap_or_default())
                .ok_or_else(|| EngineError::Validation("budget total too large".to_string()))?;
        }

        Ok(BudgetStatus {
            scope,
            period,
            mode,
            spend,
            comparison: BudgetComparison::new(budget, spend.total),
        })
    }

    async fn scope_categories(&self, scope: SpendScope) -> ResultEngine<Vec<Uuid>> {
        match scope {
            SpendScope::Category(id) => {
                require_category(&self.database, id).await?;
                Ok(vec![id])
            }
            SpendScope::Sector(id) => {
                require_sector(&self.database, id).await?;
                sector_member_ids(&self.database, id).await
            }
        }
    }

    /// Expenses of `category_ids` inside `window` plus every reimbursement
    /// pointing at them, whatever its date.
    async fn spend_snapshot(
        &self,
        category_ids: &[Uuid],
        window: &DateWindow,
    ) -> ResultEngine<Vec<Transaction>> {
        if category_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut snapshot = transactions::Entity::find()
            .filter(transactions::Column::Kind.eq(TransactionType::Expense.as_str()))
            .filter(transactions::Column::CategoryId.is_in(category_ids.to_vec()))
            .filter(transactions::Column::Date.gte(window.start))
            .filter(transactions::Column::Date.lte(window.end))
            .all(&self.database)
            .await?
            .into_iter()
            .map(Transaction::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;

        let expense_ids: Vec<Uuid> = snapshot.iter().map(|tx| tx.id).collect();
        if expense_ids.is_empty() {
            return Ok(snapshot);
        }
        for chunk in expense_ids.chunks(500) {
            let reimbursements = transactions::Entity::find()
                .filter(transactions::Column::Kind.eq(TransactionType::Reimbursement.as_str()))
                .filter(transactions::Column::ReimbursesTransactionId.is_in(chunk.to_vec()))
                .all(&self.database)
                .await?;
            for model in reimbursements {
                snapshot.push(Transaction::try_from(model)?);
            }
        }
        Ok(snapshot)
    }
}
