use sea_orm::{ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    BudgetAmount, CategoryBudget, EngineError, Money, Period, ResultEngine, SectorBudget,
    SectorBudgetSpec, category_budgets,
    containment::{SectorCeiling, check_category_budget, check_sector_budget},
    sector_budgets, sectors,
};

use super::{
    Engine,
    categories::{require_category, require_sector, sector_member_ids, sectors_containing},
    with_tx,
};

/// Every budget row of one month.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodBudgets {
    pub period: Period,
    pub categories: Vec<CategoryBudget>,
    pub sectors: Vec<SectorBudget>,
}

impl Engine {
    pub async fn create_category_budget(
        &self,
        category_id: Uuid,
        period: Period,
        amount: BudgetAmount,
    ) -> ResultEngine<CategoryBudget> {
        amount.validate()?;
        with_tx!(self, |db_tx| {
            let category = require_category(&db_tx, category_id).await?;
            if find_category_budget(&db_tx, category_id, period)
                .await?
                .is_some()
            {
                return Err(EngineError::ExistingKey(format!(
                    "budget for {} in {period}",
                    category.name
                )));
            }

            let ceilings = sector_ceilings(&db_tx, category_id, period).await?;
            check_category_budget(amount.effective(), &ceilings)?;

            let budget = CategoryBudget {
                id: Uuid::new_v4(),
                category_id,
                period,
                amount,
            };
            category_budgets::ActiveModel::from(&budget)
                .insert(&db_tx)
                .await?;
            Ok(budget)
        })
    }

    pub async fn update_category_budget(
        &self,
        budget_id: Uuid,
        amount: BudgetAmount,
    ) -> ResultEngine<CategoryBudget> {
        amount.validate()?;
        with_tx!(self, |db_tx| {
            let current: CategoryBudget = category_budgets::Entity::find_by_id(budget_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("category budget not exists".to_string()))?
                .try_into()?;

            let ceilings = sector_ceilings(&db_tx, current.category_id, current.period).await?;
            check_category_budget(amount.effective(), &ceilings)?;

            let budget = CategoryBudget { amount, ..current };
            category_budgets::ActiveModel::from(&budget)
                .update(&db_tx)
                .await?;
            Ok(budget)
        })
    }

    pub async fn delete_category_budget(&self, budget_id: Uuid) -> ResultEngine<()> {
        let res = category_budgets::Entity::delete_by_id(budget_id)
            .exec(&self.database)
            .await?;
        if res.rows_affected == 0 {
            return Err(EngineError::KeyNotFound(
                "category budget not exists".to_string(),
            ));
        }
        Ok(())
    }

    pub async fn create_sector_budget(
        &self,
        sector_id: Uuid,
        period: Period,
        spec: SectorBudgetSpec,
    ) -> ResultEngine<SectorBudget> {
        spec.amount.validate()?;
        with_tx!(self, |db_tx| {
            let sector = require_sector(&db_tx, sector_id).await?;
            if find_sector_budget(&db_tx, sector_id, period).await?.is_some() {
                return Err(EngineError::ExistingKey(format!(
                    "budget for {} in {period}",
                    sector.name
                )));
            }

            let rollup = rollup_total(&db_tx, sector_id, period).await?;
            if !spec.auto_rollup {
                check_sector_budget(&sector.name, spec.amount.effective(), rollup)?;
            }

            let model = sector_budgets::active_model(
                Uuid::new_v4(),
                sector_id,
                period,
                &spec.amount,
                spec.auto_rollup,
            )
            .insert(&db_tx)
            .await?;
            model.into_budget(rollup)
        })
    }

    /// Replaces the amount and rollup mode of a sector budget.
    pub async fn update_sector_budget(
        &self,
        budget_id: Uuid,
        spec: SectorBudgetSpec,
    ) -> ResultEngine<SectorBudget> {
        spec.amount.validate()?;
        with_tx!(self, |db_tx| {
            let current = sector_budgets::Entity::find_by_id(budget_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("sector budget not exists".to_string()))?;
            let sector = require_sector(&db_tx, current.sector_id).await?;
            let period = current.period()?;

            let rollup = rollup_total(&db_tx, current.sector_id, period).await?;
            if !spec.auto_rollup {
                check_sector_budget(&sector.name, spec.amount.effective(), rollup)?;
            }

            let model = sector_budgets::active_model(
                current.id,
                current.sector_id,
                period,
                &spec.amount,
                spec.auto_rollup,
            )
            .update(&db_tx)
            .await?;
            model.into_budget(rollup)
        })
    }

    pub async fn delete_sector_budget(&self, budget_id: Uuid) -> ResultEngine<()> {
        let res = sector_budgets::Entity::delete_by_id(budget_id)
            .exec(&self.database)
            .await?;
        if res.rows_affected == 0 {
            return Err(EngineError::KeyNotFound(
                "sector budget not exists".to_string(),
            ));
        }
        Ok(())
    }

    pub async fn category_budget(
        &self,
        category_id: Uuid,
        period: Period,
    ) -> ResultEngine<Option<CategoryBudget>> {
        find_category_budget(&self.database, category_id, period)
            .await?
            .map(CategoryBudget::try_from)
            .transpose()
    }

    pub async fn sector_budget(
        &self,
        sector_id: Uuid,
        period: Period,
    ) -> ResultEngine<Option<SectorBudget>> {
        let Some(model) = find_sector_budget(&self.database, sector_id, period).await? else {
            return Ok(None);
        };
        let rollup = rollup_total(&self.database, sector_id, period).await?;
        model.into_budget(rollup).map(Some)
    }

    pub async fn budgets_for_period(&self, period: Period) -> ResultEngine<PeriodBudgets> {
        let categories = category_budgets::Entity::find()
            .filter(category_budgets::Column::Year.eq(period.year))
            .filter(category_budgets::Column::Month.eq(period.month as i32))
            .order_by_asc(category_budgets::Column::CategoryId)
            .all(&self.database)
            .await?
            .into_iter()
            .map(CategoryBudget::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;

        let models = sector_budgets::Entity::find()
            .filter(sector_budgets::Column::Year.eq(period.year))
            .filter(sector_budgets::Column::Month.eq(period.month as i32))
            .order_by_asc(sector_budgets::Column::SectorId)
            .all(&self.database)
            .await?;
        let mut sectors = Vec::with_capacity(models.len());
        for model in models {
            let rollup = rollup_total(&self.database, model.sector_id, period).await?;
            sectors.push(model.into_budget(rollup)?);
        }

        Ok(PeriodBudgets {
            period,
            categories,
            sectors,
        })
    }

    /// Checks every manual budget of `sector` against its current categories.
    pub(super) async fn ensure_sector_budgets_hold<C: ConnectionTrait>(
        &self,
        db: &C,
        sector: &sectors::Model,
    ) -> ResultEngine<()> {
        let budgets = sector_budgets::Entity::find()
            .filter(sector_budgets::Column::SectorId.eq(sector.id))
            .filter(sector_budgets::Column::AutoRollup.eq(false))
            .all(db)
            .await?;
        for budget in budgets {
            let period = budget.period()?;
            let rollup = rollup_total(db, sector.id, period).await?;
            check_sector_budget(&sector.name, budget.amount()?.effective(), rollup)?;
        }
        Ok(())
    }
}

async fn find_category_budget<C: ConnectionTrait>(
    db: &C,
    category_id: Uuid,
    period: Period,
) -> ResultEngine<Option<category_budgets::Model>> {
    Ok(category_budgets::Entity::find()
        .filter(category_budgets::Column::CategoryId.eq(category_id))
        .filter(category_budgets::Column::Year.eq(period.year))
        .filter(category_budgets::Column::Month.eq(period.month as i32))
        .one(db)
        .await?)
}

async fn find_sector_budget<C: ConnectionTrait>(
    db: &C,
    sector_id: Uuid,
    period: Period,
) -> ResultEngine<Option<sector_budgets::Model>> {
    Ok(sector_budgets::Entity::find()
        .filter(sector_budgets::Column::SectorId.eq(sector_id))
        .filter(sector_budgets::Column::Year.eq(period.year))
        .filter(sector_budgets::Column::Month.eq(period.month as i32))
        .one(db)
        .await?)
}

/// Effective budgets of `category_ids` in `period`, skipping `except`.
async fn category_budget_amounts<C: ConnectionTrait>(
    db: &C,
    category_ids: &[Uuid],
    period: Period,
    except: Option<Uuid>,
) -> ResultEngine<Vec<Money>> {
    let ids: Vec<Uuid> = category_ids
        .iter()
        .copied()
        .filter(|id| Some(*id) != except)
        .collect();
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    category_budgets::Entity::find()
        .filter(category_budgets::Column::CategoryId.is_in(ids))
        .filter(category_budgets::Column::Year.eq(period.year))
        .filter(category_budgets::Column::Month.eq(period.month as i32))
        .all(db)
        .await?
        .into_iter()
        .map(|m| CategoryBudget::try_from(m).map(|b| b.amount.effective()))
        .collect()
}

/// Sum of the category budgets inside a sector for one month.
pub(super) async fn rollup_total<C: ConnectionTrait>(
    db: &C,
    sector_id: Uuid,
    period: Period,
) -> ResultEngine<Money> {
    let members = sector_member_ids(db, sector_id).await?;
    let amounts = category_budget_amounts(db, &members, period, None).await?;
    amounts
        .into_iter()
        .try_fold(Money::ZERO, Money::checked_add)
        .ok_or_else(|| EngineError::Validation("budget total too large".to_string()))
}

/// Sectors containing `category_id` that have a budget in `period`.
async fn sector_ceilings<C: ConnectionTrait>(
    db: &C,
    category_id: Uuid,
    period: Period,
) -> ResultEngine<Vec<SectorCeiling>> {
    let mut ceilings = Vec::new();
    for sector in sectors_containing(db, category_id).await? {
        let Some(budget) = find_sector_budget(db, sector.id, period).await? else {
            continue;
        };
        let members = sector_member_ids(db, sector.id).await?;
        let sibling_budgets =
            category_budget_amounts(db, &members, period, Some(category_id)).await?;
        ceilings.push(SectorCeiling {
            sector_id: sector.id,
            sector_name: sector.name,
            limit: budget.amount()?.effective(),
            auto_rollup: budget.auto_rollup,
            sibling_budgets,
        });
    }
    Ok(ceilings)
}
