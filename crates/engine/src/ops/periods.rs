use std::collections::BTreeSet;

use sea_orm::{
    ConnectionTrait, QueryFilter, QuerySelect, TransactionTrait, prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CategoryBudget, Period, ResultEngine, category_budgets, sector_budgets};

use super::{Engine, with_tx};

/// Outcome of [`Engine::ensure_period_has_data`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CarryForward {
    /// Budgets of `from` were copied into the target month.
    Copied {
        from: Period,
        categories: usize,
        sectors: usize,
    },
    /// The target month already had budgets.
    AlreadyPopulated,
    /// No earlier month has budgets.
    NothingToCopy,
}

impl Engine {
    /// Months with at least one category or sector budget, oldest first.
    pub async fn periods_with_data(&self) -> ResultEngine<Vec<Period>> {
        Ok(budget_periods(&self.database).await?.into_iter().collect())
    }

    pub async fn has_budget_data(&self, period: Period) -> ResultEngine<bool> {
        has_rows(&self.database, period).await
    }

    /// Copies the most recent earlier month's budgets into `period` when it
    /// has none.
    ///
    /// Check and copy share one DB transaction, so running this twice never
    /// duplicates rows.
    pub async fn ensure_period_has_data(&self, period: Period) -> ResultEngine<CarryForward> {
        with_tx!(self, |db_tx| {
            if has_rows(&db_tx, period).await? {
                return Ok(CarryForward::AlreadyPopulated);
            }
            let Some(source) = budget_periods(&db_tx)
                .await?
                .range(..period)
                .next_back()
                .copied()
            else {
                return Ok(CarryForward::NothingToCopy);
            };

            let categories = category_budgets::Entity::find()
                .filter(category_budgets::Column::Year.eq(source.year))
                .filter(category_budgets::Column::Month.eq(source.month as i32))
                .all(&db_tx)
                .await?;
            let category_count = categories.len();
            for model in categories {
                let copy = CategoryBudget {
                    id: Uuid::new_v4(),
                    period,
                    ..CategoryBudget::try_from(model)?
                };
                category_budgets::ActiveModel::from(&copy)
                    .insert(&db_tx)
                    .await?;
            }

            let sectors = sector_budgets::Entity::find()
                .filter(sector_budgets::Column::Year.eq(source.year))
                .filter(sector_budgets::Column::Month.eq(source.month as i32))
                .all(&db_tx)
                .await?;
            let sector_count = sectors.len();
            for model in sectors {
                sector_budgets::active_model(
                    Uuid::new_v4(),
                    model.sector_id,
                    period,
                    &model.amount()?,
                    model.auto_rollup,
                )
                .insert(&db_tx)
                .await?;
            }

            tracing::info!(
                "carried {category_count} category and {sector_count} sector budgets from {source} to {period}"
            );
            Ok(CarryForward::Copied {
                from: source,
                categories: category_count,
                sectors: sector_count,
            })
        })
    }
}

async fn has_rows<C: ConnectionTrait>(db: &C, period: Period) -> ResultEngine<bool> {
    let categories = category_budgets::Entity::find()
        .filter(category_budgets::Column::Year.eq(period.year))
        .filter(category_budgets::Column::Month.eq(period.month as i32))
        .count(db)
        .await?;
    if categories > 0 {
        return Ok(true);
    }
    let sectors = sector_budgets::Entity::find()
        .filter(sector_budgets::Column::Year.eq(period.year))
        .filter(sector_budgets::Column::Month.eq(period.month as i32))
        .count(db)
        .await?;
    Ok(sectors > 0)
}

async fn budget_periods<C: ConnectionTrait>(db: &C) -> ResultEngine<BTreeSet<Period>> {
    let category_months: Vec<(i32, i32)> = category_budgets::Entity::find()
        .select_only()
        .column(category_budgets::Column::Year)
        .column(category_budgets::Column::Month)
        .distinct()
        .into_tuple()
        .all(db)
        .await?;
    let sector_months: Vec<(i32, i32)> = sector_budgets::Entity::find()
        .select_only()
        .column(sector_budgets::Column::Year)
        .column(sector_budgets::Column::Month)
        .distinct()
        .into_tuple()
        .all(db)
        .await?;

    category_months
        .into_iter()
        .chain(sector_months)
        .map(|(year, month)| Period::new(year, u32::try_from(month).unwrap_or(0)))
        .collect()
}
