use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};
use chrono::NaiveDate;
use tokio::sync::Mutex;

use std::sync::Arc;

use crate::{accounts, budgets, categories, imports, periods, transactions};
use engine::{BankFeed, Engine, PeriodController, ResultEngine};

/// Source of "today"; the binary passes the local clock, tests a fixed date.
pub type Today = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub feed: Arc<dyn BankFeed>,
    pub periods: Arc<Mutex<PeriodController>>,
    pub today: Today,
}

impl ServerState {
    /// Selects the current month, carrying budgets forward if needed.
    pub async fn new(engine: Engine, feed: Arc<dyn BankFeed>, today: Today) -> ResultEngine<Self> {
        let controller = PeriodController::load(&engine, today()).await?;
        Ok(Self {
            engine: Arc::new(engine),
            feed,
            periods: Arc::new(Mutex::new(controller)),
            today,
        })
    }
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/categories", get(categories::list).post(categories::create))
        .route("/sectors", get(categories::list_sectors).post(categories::create_sector))
        .route("/sectors/{id}", get(categories::get_sector))
        .route("/sectors/{id}/categories", put(categories::set_sector_categories))
        .route(
            "/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route(
            "/transactions/{id}",
            get(transactions::get)
                .patch(transactions::update)
                .delete(transactions::remove),
        )
        .route("/budgets", get(budgets::list))
        .route("/budgets/category", post(budgets::create_category_budget))
        .route(
            "/budgets/category/{id}",
            patch(budgets::update_category_budget).delete(budgets::delete_category_budget),
        )
        .route("/budgets/sector", post(budgets::create_sector_budget))
        .route(
            "/budgets/sector/{id}",
            patch(budgets::update_sector_budget).delete(budgets::delete_sector_budget),
        )
        .route("/budgets/status", post(budgets::status))
        .route("/spend", post(budgets::spend))
        .route("/periods", get(periods::get))
        .route("/periods/select", post(periods::select))
        .route("/imports/pending", get(imports::list_pending))
        .route(
            "/imports/processed",
            get(imports::list_processed).delete(imports::delete_processed),
        )
        .route(
            "/imports/{id}",
            get(imports::get).patch(imports::edit).delete(imports::remove),
        )
        .route("/imports/{id}/approve", post(imports::approve))
        .route("/imports/{id}/reject", post(imports::reject))
        .route("/imports/{id}/restore", post(imports::restore))
        .route("/accounts", get(accounts::list).post(accounts::create))
        .route("/accounts/{id}", delete(accounts::deactivate))
        .route("/accounts/{id}/sync", post(accounts::sync))
        .with_state(state)
}

pub async fn run(state: ServerState, addr: &str) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(state, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(state, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
