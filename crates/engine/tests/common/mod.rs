#![allow(dead_code)]

use std::{collections::VecDeque, path::Path, sync::Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::{Database, DatabaseConnection};

use engine::{
    BankFeed, ConnectedAccount, Engine, EngineError, FeedPage, FeedRequest, FeedTransaction,
    Household, Money, NewConnectedAccount, ResultEngine, SyncLimits,
};
use migration::MigratorTrait;

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    engine_with_limits(SyncLimits::default()).await
}

pub async fn engine_with_limits(limits: SyncLimits) -> (Engine, DatabaseConnection) {
    engine_at("sqlite::memory:", limits).await
}

/// Engine over a SQLite file, so the pool holds several connections.
pub async fn engine_on_file(path: &Path) -> (Engine, DatabaseConnection) {
    engine_at(&format!("sqlite:{}?mode=rwc", path.display()), SyncLimits::default()).await
}

async fn engine_at(url: &str, limits: SyncLimits) -> (Engine, DatabaseConnection) {
    let db = Database::connect(url).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .household(Household::new("Ana", "Ben").unwrap())
        .sync_limits(limits)
        .build()
        .await
        .unwrap();
    (engine, db)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub async fn linked_account(engine: &Engine) -> ConnectedAccount {
    engine
        .connect_account(NewConnectedAccount {
            name: "Checking".to_string(),
            institution_name: Some("First Bank".to_string()),
            external_account_id: "acc-1".to_string(),
            access_token: "access-sandbox-123".to_string(),
        })
        .await
        .unwrap()
}

pub fn feed_item(external_id: &str, on: NaiveDate, cents: i64, description: &str) -> FeedTransaction {
    FeedTransaction {
        external_id: external_id.to_string(),
        date: on,
        amount: Money::new(cents),
        description: description.to_string(),
        pending: false,
        raw: serde_json::json!({ "transaction_id": external_id, "amount": cents }),
    }
}

pub fn page(items: Vec<FeedTransaction>, next_cursor: Option<&str>) -> FeedPage {
    FeedPage {
        transactions: items,
        next_cursor: next_cursor.map(ToString::to_string),
    }
}

/// Feed replaying canned pages and recording what was asked for.
#[derive(Default)]
pub struct ScriptedFeed {
    pages: Mutex<VecDeque<ResultEngine<FeedPage>>>,
    pub requests: Mutex<Vec<FeedRequest>>,
}

impl ScriptedFeed {
    pub fn new(pages: Vec<ResultEngine<FeedPage>>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<FeedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl BankFeed for ScriptedFeed {
    async fn fetch_page(
        &self,
        _account: &ConnectedAccount,
        request: &FeedRequest,
    ) -> ResultEngine<FeedPage> {
        self.requests.lock().unwrap().push(request.clone());
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(EngineError::UpstreamFeed("script exhausted".to_string())))
    }
}
