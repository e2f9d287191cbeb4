use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{ServerState, Today, router, run, run_with_listener, spawn_with_listener};

mod accounts;
mod budgets;
mod categories;
mod convert;
mod imports;
mod periods;
mod server;
mod transactions;

pub mod types {
    pub mod category {
        pub use api_types::category::{
            CategoryListResponse, CategoryNew, CategoryView, SectorCategories,
            SectorListResponse, SectorNew, SectorView,
        };
    }

    pub mod transaction {
        pub use api_types::transaction::{
            TransactionFields, TransactionListQuery, TransactionListResponse, TransactionType,
            TransactionView,
        };
    }

    pub mod budget {
        pub use api_types::budget::{
            BudgetAmountFields, BudgetType, BudgetsQuery, CategoryBudgetNew,
            CategoryBudgetUpdate, CategoryBudgetView, PeriodBudgetsResponse, SectorBudgetNew,
            SectorBudgetUpdate, SectorBudgetView,
        };
        pub use api_types::spend::{BudgetStatusView, SpendRequest, SpendView, WindowMode};
    }

    pub mod period {
        pub use api_types::PeriodView;
        pub use api_types::period::{PeriodSelect, PeriodSelected, PeriodsResponse};
    }

    pub mod import {
        pub use api_types::import::{BulkDeleted, ImportStatus, PendingListResponse, PendingView};
    }

    pub mod account {
        pub use api_types::account::{
            AccountListResponse, AccountNew, AccountView, SyncRequest, SyncResult,
        };
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) | EngineError::InvalidTransition(_) => StatusCode::CONFLICT,
        EngineError::UpstreamFeed(_) => StatusCode::BAD_GATEWAY,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::Validation(_) | EngineError::Containment { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::UpstreamFeed(feed_err) => {
            tracing::warn!("bank feed error: {feed_err}");
            EngineError::UpstreamFeed(feed_err).to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::Money;

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflicts_map_to_409() {
        let res = ServerError::from(EngineError::ExistingKey("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
        let res =
            ServerError::from(EngineError::InvalidTransition("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_validation_and_containment_map_to_422() {
        let res = ServerError::from(EngineError::Validation("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let res = ServerError::from(EngineError::Containment {
            sector: "Living".to_string(),
            limit: Money::new(50_000),
        })
        .into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn upstream_feed_maps_to_502() {
        let res = ServerError::from(EngineError::UpstreamFeed("timeout".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
