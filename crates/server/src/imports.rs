//! Review queue for bank imports.

use api_types::{
    import::{BulkDeleted, PendingListResponse, PendingView},
    transaction::TransactionFields,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    ServerError,
    convert::{pending_view, transaction_input},
    server::ServerState,
};

pub async fn list_pending(
    State(state): State<ServerState>,
) -> Result<Json<PendingListResponse>, ServerError> {
    let imports = state
        .engine
        .list_pending()
        .await?
        .into_iter()
        .map(pending_view)
        .collect();
    Ok(Json(PendingListResponse { imports }))
}

pub async fn list_processed(
    State(state): State<ServerState>,
) -> Result<Json<PendingListResponse>, ServerError> {
    let imports = state
        .engine
        .list_processed()
        .await?
        .into_iter()
        .map(pending_view)
        .collect();
    Ok(Json(PendingListResponse { imports }))
}

pub async fn delete_processed(
    State(state): State<ServerState>,
) -> Result<Json<BulkDeleted>, ServerError> {
    let deleted = state.engine.delete_all_processed().await?;
    Ok(Json(BulkDeleted { deleted }))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(pending_id): Path<Uuid>,
) -> Result<Json<PendingView>, ServerError> {
    Ok(Json(pending_view(state.engine.pending(pending_id).await?)))
}

pub async fn edit(
    State(state): State<ServerState>,
    Path(pending_id): Path<Uuid>,
    Json(payload): Json<TransactionFields>,
) -> Result<Json<PendingView>, ServerError> {
    let pending = state
        .engine
        .edit_pending(pending_id, transaction_input(payload))
        .await?;
    Ok(Json(pending_view(pending)))
}

pub async fn remove(
    State(state): State<ServerState>,
    Path(pending_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_pending(pending_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Fields in the body override the import's own values.
pub async fn approve(
    State(state): State<ServerState>,
    Path(pending_id): Path<Uuid>,
    payload: Option<Json<TransactionFields>>,
) -> Result<Json<PendingView>, ServerError> {
    let overrides = payload.map(|Json(fields)| fields).unwrap_or_default();
    let pending = state
        .engine
        .approve(pending_id, transaction_input(overrides))
        .await?;
    Ok(Json(pending_view(pending)))
}

pub async fn reject(
    State(state): State<ServerState>,
    Path(pending_id): Path<Uuid>,
) -> Result<Json<PendingView>, ServerError> {
    Ok(Json(pending_view(state.engine.reject(pending_id).await?)))
}

pub async fn restore(
    State(state): State<ServerState>,
    Path(pending_id): Path<Uuid>,
) -> Result<Json<PendingView>, ServerError> {
    Ok(Json(pending_view(state.engine.restore(pending_id).await?)))
}
