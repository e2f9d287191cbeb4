//! Connected bank accounts and sync.

use api_types::account::{AccountListResponse, AccountNew, AccountView, SyncRequest, SyncResult};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{ConnectedAccount, NewConnectedAccount, SyncReport};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

const DEFAULT_DAYS_BACK: i64 = 30;

fn account_view(account: ConnectedAccount) -> AccountView {
    AccountView {
        id: account.id,
        name: account.name,
        institution_name: account.institution_name,
        external_account_id: account.external_account_id,
        last_synced_at: account.last_synced_at,
        active: account.active,
        created_at: account.created_at,
    }
}

fn sync_result(report: SyncReport) -> SyncResult {
    SyncResult {
        days_back: report.days_back,
        pages: report.pages,
        fetched: report.fetched,
        imported: report.imported,
        skipped_duplicates: report.skipped_duplicates,
        skipped_pending: report.skipped_pending,
        capped: report.capped,
    }
}

pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<AccountListResponse>, ServerError> {
    let accounts = state
        .engine
        .list_accounts()
        .await?
        .into_iter()
        .map(account_view)
        .collect();
    Ok(Json(AccountListResponse { accounts }))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<AccountNew>,
) -> Result<(StatusCode, Json<AccountView>), ServerError> {
    let account = state
        .engine
        .connect_account(NewConnectedAccount {
            name: payload.name,
            institution_name: payload.institution_name,
            external_account_id: payload.external_account_id,
            access_token: payload.access_token,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(account_view(account))))
}

pub async fn deactivate(
    State(state): State<ServerState>,
    Path(account_id): Path<Uuid>,
) -> Result<Json<AccountView>, ServerError> {
    let account = state.engine.deactivate_account(account_id).await?;
    Ok(Json(account_view(account)))
}

/// Pulls recent transactions into the review queue. `days_back` defaults to
/// 30 and is clamped to `[1, 90]`.
pub async fn sync(
    State(state): State<ServerState>,
    Path(account_id): Path<Uuid>,
    payload: Option<Json<SyncRequest>>,
) -> Result<Json<SyncResult>, ServerError> {
    let days_back = payload
        .and_then(|Json(request)| request.days_back)
        .unwrap_or(DEFAULT_DAYS_BACK);
    let report = state
        .engine
        .sync_account(state.feed.as_ref(), account_id, days_back, (state.today)())
        .await?;
    Ok(Json(sync_result(report)))
}
