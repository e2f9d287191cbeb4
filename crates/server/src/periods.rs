//! Selected month endpoints.

use api_types::period::{PeriodSelect, PeriodSelected, PeriodsResponse};
use axum::{Json, extract::State};
use engine::CarryForward;

use crate::{
    ServerError,
    convert::{period, period_view},
    server::ServerState,
};

pub async fn get(State(state): State<ServerState>) -> Result<Json<PeriodsResponse>, ServerError> {
    let controller = state.periods.lock().await;
    Ok(Json(PeriodsResponse {
        selected: period_view(controller.selected()),
        periods_with_data: controller
            .periods_with_data()
            .iter()
            .copied()
            .map(period_view)
            .collect(),
    }))
}

/// Changes the selected month. Selecting the current month carries the
/// latest budgets forward when it has none yet.
pub async fn select(
    State(state): State<ServerState>,
    Json(payload): Json<PeriodSelect>,
) -> Result<Json<PeriodSelected>, ServerError> {
    let target = period(payload.year, payload.month)?;
    let mut controller = state.periods.lock().await;
    let outcome = controller
        .select(&state.engine, target, (state.today)())
        .await?;

    let carried_from = match outcome {
        Some(CarryForward::Copied { from, .. }) => Some(period_view(from)),
        _ => None,
    };
    Ok(Json(PeriodSelected {
        selected: period_view(controller.selected()),
        periods_with_data: controller
            .periods_with_data()
            .iter()
            .copied()
            .map(period_view)
            .collect(),
        carried_from,
    }))
}
