//! Budgets, spend and budget status endpoints.

use api_types::{
    budget::{
        BudgetsQuery, CategoryBudgetNew, CategoryBudgetUpdate, CategoryBudgetView,
        PeriodBudgetsResponse, SectorBudgetNew, SectorBudgetUpdate, SectorBudgetView,
    },
    spend::{BudgetStatusView, SpendRequest, SpendView, WindowMode},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{SectorBudgetSpec, SpendScope, SpendTotals};
use uuid::Uuid;

use crate::{
    ServerError,
    convert::{budget_amount, category_budget_view, period, period_view, sector_budget_view},
    server::ServerState,
};

fn window_mode(mode: WindowMode) -> engine::WindowMode {
    match mode {
        WindowMode::Monthly => engine::WindowMode::Monthly,
        WindowMode::Yearly => engine::WindowMode::Yearly,
        WindowMode::YearlyPreviousMonths => engine::WindowMode::YearlyPreviousMonths,
    }
}

fn spend_scope(payload: &SpendRequest) -> Result<SpendScope, ServerError> {
    match (payload.category_id, payload.sector_id) {
        (Some(category_id), None) => Ok(SpendScope::Category(category_id)),
        (None, Some(sector_id)) => Ok(SpendScope::Sector(sector_id)),
        _ => Err(ServerError::Generic(
            "exactly one of category_id and sector_id is required".to_string(),
        )),
    }
}

fn spend_view(totals: SpendTotals) -> SpendView {
    SpendView {
        total: totals.total,
        user1: totals.user1,
        user2: totals.user2,
    }
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<BudgetsQuery>,
) -> Result<Json<PeriodBudgetsResponse>, ServerError> {
    let budgets = state
        .engine
        .budgets_for_period(period(query.year, query.month)?)
        .await?;
    Ok(Json(PeriodBudgetsResponse {
        period: period_view(budgets.period),
        categories: budgets
            .categories
            .into_iter()
            .map(category_budget_view)
            .collect(),
        sectors: budgets.sectors.into_iter().map(sector_budget_view).collect(),
    }))
}

pub async fn create_category_budget(
    State(state): State<ServerState>,
    Json(payload): Json<CategoryBudgetNew>,
) -> Result<(StatusCode, Json<CategoryBudgetView>), ServerError> {
    let budget = state
        .engine
        .create_category_budget(
            payload.category_id,
            period(payload.year, payload.month)?,
            budget_amount(&payload.amount)?,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(category_budget_view(budget))))
}

pub async fn update_category_budget(
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
    Json(payload): Json<CategoryBudgetUpdate>,
) -> Result<Json<CategoryBudgetView>, ServerError> {
    let budget = state
        .engine
        .update_category_budget(budget_id, budget_amount(&payload.amount)?)
        .await?;
    Ok(Json(category_budget_view(budget)))
}

pub async fn delete_category_budget(
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_category_budget(budget_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_sector_budget(
    State(state): State<ServerState>,
    Json(payload): Json<SectorBudgetNew>,
) -> Result<(StatusCode, Json<SectorBudgetView>), ServerError> {
    let spec = SectorBudgetSpec {
        amount: budget_amount(&payload.amount)?,
        auto_rollup: payload.auto_rollup,
    };
    let budget = state
        .engine
        .create_sector_budget(payload.sector_id, period(payload.year, payload.month)?, spec)
        .await?;
    Ok((StatusCode::CREATED, Json(sector_budget_view(budget))))
}

pub async fn update_sector_budget(
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
    Json(payload): Json<SectorBudgetUpdate>,
) -> Result<Json<SectorBudgetView>, ServerError> {
    let spec = SectorBudgetSpec {
        amount: budget_amount(&payload.amount)?,
        auto_rollup: payload.auto_rollup,
    };
    let budget = state.engine.update_sector_budget(budget_id, spec).await?;
    Ok(Json(sector_budget_view(budget)))
}

pub async fn delete_sector_budget(
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_sector_budget(budget_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn spend(
    State(state): State<ServerState>,
    Json(payload): Json<SpendRequest>,
) -> Result<Json<SpendView>, ServerError> {
    let scope = spend_scope(&payload)?;
    let totals = state
        .engine
        .spend(
            scope,
            period(payload.year, payload.month)?,
            window_mode(payload.mode),
        )
        .await?;
    Ok(Json(spend_view(totals)))
}

pub async fn status(
    State(state): State<ServerState>,
    Json(payload): Json<SpendRequest>,
) -> Result<Json<BudgetStatusView>, ServerError> {
    let scope = spend_scope(&payload)?;
    let status = state
        .engine
        .budget_status(
            scope,
            period(payload.year, payload.month)?,
            window_mode(payload.mode),
        )
        .await?;
    Ok(Json(BudgetStatusView {
        spend: spend_view(status.spend),
        budget: status.comparison.budget,
        remaining: status.comparison.remaining,
        remaining_pct: status.comparison.remaining_pct,
    }))
}
