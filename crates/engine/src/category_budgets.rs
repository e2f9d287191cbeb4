//! Per-month category budgets.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{BudgetAmount, EngineError, Period, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBudget {
    pub id: Uuid,
    pub category_id: Uuid,
    pub period: Period,
    pub amount: BudgetAmount,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "category_budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub category_id: Uuid,
    pub year: i32,
    pub month: i32,
    pub budget_type: String,
    pub absolute_amount: Option<i64>,
    pub user1_amount: Option<i64>,
    pub user2_amount: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Category,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&CategoryBudget> for ActiveModel {
    fn from(budget: &CategoryBudget) -> Self {
        let (absolute_amount, user1_amount, user2_amount) = budget.amount.columns();
        Self {
            id: ActiveValue::Set(budget.id),
            category_id: ActiveValue::Set(budget.category_id),
            year: ActiveValue::Set(budget.period.year),
            month: ActiveValue::Set(budget.period.month as i32),
            budget_type: ActiveValue::Set(budget.amount.budget_type().to_string()),
            absolute_amount: ActiveValue::Set(absolute_amount),
            user1_amount: ActiveValue::Set(user1_amount),
            user2_amount: ActiveValue::Set(user2_amount),
        }
    }
}

impl TryFrom<Model> for CategoryBudget {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: model.id,
            category_id: model.category_id,
            period: Period::new(model.year, u32::try_from(model.month).unwrap_or(0))?,
            amount: BudgetAmount::from_columns(
                &model.budget_type,
                model.absolute_amount,
                model.user1_amount,
                model.user2_amount,
            )?,
        })
    }
}
