//! Per-month sector budgets.
//!
//! A sector budget with `auto_rollup` has no amount of its own: its effective
//! amount is the sum of the sector's category budgets for the same month.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{BudgetAmount, Money, Period, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorBudget {
    pub id: Uuid,
    pub sector_id: Uuid,
    pub period: Period,
    pub amount: BudgetAmount,
    pub auto_rollup: bool,
    /// Amount compared against spend, derived for auto-rollup budgets.
    pub effective_amount: Money,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "sector_budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub sector_id: Uuid,
    pub year: i32,
    pub month: i32,
    pub budget_type: String,
    pub absolute_amount: Option<i64>,
    pub user1_amount: Option<i64>,
    pub user2_amount: Option<i64>,
    pub auto_rollup: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sectors::Entity",
        from = "Column::SectorId",
        to = "super::sectors::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Sector,
}

impl Related<super::sectors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sector.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub(crate) fn period(&self) -> ResultEngine<Period> {
        Period::new(self.year, u32::try_from(self.month).unwrap_or(0))
    }

    pub(crate) fn amount(&self) -> ResultEngine<BudgetAmount> {
        BudgetAmount::from_columns(
            &self.budget_type,
            self.absolute_amount,
            self.user1_amount,
            self.user2_amount,
        )
    }

    /// Into the domain type; `rollup_total` is the category sum used when
    /// the budget is auto-rollup.
    pub(crate) fn into_budget(self, rollup_total: Money) -> ResultEngine<SectorBudget> {
        let amount = self.amount()?;
        let effective_amount = if self.auto_rollup {
            rollup_total
        } else {
            amount.effective()
        };
        Ok(SectorBudget {
            id: self.id,
            sector_id: self.sector_id,
            period: self.period()?,
            amount,
            auto_rollup: self.auto_rollup,
            effective_amount,
        })
    }
}

pub(crate) fn active_model(
    id: Uuid,
    sector_id: Uuid,
    period: Period,
    amount: &BudgetAmount,
    auto_rollup: bool,
) -> ActiveModel {
    let (absolute_amount, user1_amount, user2_amount) = amount.columns();
    ActiveModel {
        id: ActiveValue::Set(id),
        sector_id: ActiveValue::Set(sector_id),
        year: ActiveValue::Set(period.year),
        month: ActiveValue::Set(period.month as i32),
        budget_type: ActiveValue::Set(amount.budget_type().to_string()),
        absolute_amount: ActiveValue::Set(absolute_amount),
        user1_amount: ActiveValue::Set(user1_amount),
        user2_amount: ActiveValue::Set(user2_amount),
        auto_rollup: ActiveValue::Set(auto_rollup),
    }
}
