//! Confirmed transactions API endpoints.

use api_types::transaction::{
    TransactionFields, TransactionListQuery, TransactionListResponse, TransactionView,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    ServerError,
    convert::{transaction_input, transaction_view},
    server::ServerState,
};

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<TransactionFields>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let tx = state
        .engine
        .create_transaction(transaction_input(payload))
        .await?;
    Ok((StatusCode::CREATED, Json(transaction_view(tx))))
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let transactions = state
        .engine
        .list_transactions(query.from, query.to)
        .await?
        .into_iter()
        .map(transaction_view)
        .collect();
    Ok(Json(TransactionListResponse { transactions }))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(transaction_id): Path<Uuid>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state.engine.transaction(transaction_id).await?;
    Ok(Json(transaction_view(tx)))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(transaction_id): Path<Uuid>,
    Json(payload): Json<TransactionFields>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state
        .engine
        .update_transaction(transaction_id, transaction_input(payload))
        .await?;
    Ok(Json(transaction_view(tx)))
}

pub async fn remove(
    State(state): State<ServerState>,
    Path(transaction_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_transaction(transaction_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
