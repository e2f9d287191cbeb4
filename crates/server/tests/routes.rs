use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use chrono::NaiveDate;
use http_body_util::BodyExt;
use migration::MigratorTrait;
use rust_decimal::Decimal;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use api_types::spend::SpendView;
use engine::{
    BankFeed, ConnectedAccount, Engine, FeedPage, FeedRequest, FeedTransaction, Household, Money,
    ResultEngine,
};
use server::{ServerState, router};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

/// One posted grocery purchase and one card payment still pending.
struct StubFeed;

#[async_trait]
impl BankFeed for StubFeed {
    async fn fetch_page(
        &self,
        _account: &ConnectedAccount,
        _request: &FeedRequest,
    ) -> ResultEngine<FeedPage> {
        let item = |id: &str, cents: i64, pending: bool| FeedTransaction {
            external_id: id.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            amount: Money::new(cents),
            description: "GROCER #42".to_string(),
            pending,
            raw: json!({ "transaction_id": id }),
        };
        Ok(FeedPage {
            transactions: vec![item("tx-1", -4_250, false), item("tx-2", -999, true)],
            next_cursor: None,
        })
    }
}

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db)
        .household(Household::new("Ana", "Ben").unwrap())
        .build()
        .await
        .unwrap();
    let state = ServerState::new(engine, Arc::new(StubFeed), Arc::new(today))
        .await
        .unwrap();
    router(state)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let res = app.clone().oneshot(request).await.unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_category(app: &Router, name: &str) -> String {
    let (status, body) = send(app, Method::POST, "/categories", Some(json!({ "name": name }))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn duplicate_category_is_a_conflict() {
    let app = app().await;
    create_category(&app, "Groceries").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/categories",
        Some(json!({ "name": "  groceries " })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn transaction_crud_round() {
    let app = app().await;
    let groceries = create_category(&app, "Groceries").await;

    let (status, created) = send(
        &app,
        Method::POST,
        "/transactions",
        Some(json!({
            "date": "2024-06-03",
            "description": "Weekly shop",
            "amount_minor": 6_000,
            "transaction_type": "expense",
            "category_id": groceries,
            "split_type": "splitEqually",
            "paid_by": "Ana"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, updated) = send(
        &app,
        Method::PATCH,
        &format!("/transactions/{id}"),
        Some(json!({ "amount_minor": 6_500 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["amount_minor"], 6_500);
    assert_eq!(updated["paid_by"], "Ana");

    let (status, list) = send(
        &app,
        Method::GET,
        "/transactions?from=2024-06-01&to=2024-06-30",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["transactions"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app, Method::DELETE, &format!("/transactions/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::GET, &format!("/transactions/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_transaction_is_unprocessable() {
    let app = app().await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/transactions",
        Some(json!({
            "date": "2024-06-03",
            "description": "Refund",
            "amount_minor": 0,
            "transaction_type": "income",
            "paid_to": "Ben"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn sector_budget_containment_is_enforced() {
    let app = app().await;
    let rent = create_category(&app, "Rent").await;
    let (status, sector) = send(
        &app,
        Method::POST,
        "/sectors",
        Some(json!({ "name": "Living", "category_ids": [rent] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &app,
        Method::POST,
        "/budgets/sector",
        Some(json!({
            "sector_id": sector["id"],
            "year": 2024,
            "month": 6,
            "budget_type": "absolute",
            "absolute_amount_minor": 50_000
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &app,
        Method::POST,
        "/budgets/category",
        Some(json!({
            "category_id": rent,
            "year": 2024,
            "month": 6,
            "budget_type": "absolute",
            "absolute_amount_minor": 60_000
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn spend_needs_exactly_one_scope() {
    let app = app().await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/spend",
        Some(json!({ "year": 2024, "month": 6 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn sync_then_approve_lands_in_spend() {
    let app = app().await;
    let groceries = create_category(&app, "Groceries").await;

    let (status, account) = send(
        &app,
        Method::POST,
        "/accounts",
        Some(json!({
            "name": "Checking",
            "institution_name": "First Bank",
            "external_account_id": "acc-1",
            "access_token": "access-sandbox-123"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(account.get("access_token").is_none());
    let account_id = account["id"].as_str().unwrap().to_string();

    let (status, report) = send(
        &app,
        Method::POST,
        &format!("/accounts/{account_id}/sync"),
        Some(json!({ "days_back": 365 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["days_back"], 90);
    assert_eq!(report["imported"], 1);
    assert_eq!(report["skipped_pending"], 1);

    let (_, pending) = send(&app, Method::GET, "/imports/pending", None).await;
    let imports = pending["imports"].as_array().unwrap();
    assert_eq!(imports.len(), 1);
    assert_eq!(imports[0]["amount_minor"], 4_250);
    assert_eq!(imports[0]["transaction_type"], "expense");
    let import_id = imports[0]["id"].as_str().unwrap().to_string();

    let (status, approved) = send(
        &app,
        Method::POST,
        &format!("/imports/{import_id}/approve"),
        Some(json!({
            "category_id": groceries,
            "split_type": "splitEqually",
            "paid_by": "Shared"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["status"], "approved");
    assert!(approved["transaction_id"].is_string());

    let (status, _) = send(&app, Method::POST, &format!("/imports/{import_id}/reject"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app,
        Method::POST,
        "/spend",
        Some(json!({ "category_id": groceries, "year": 2024, "month": 6 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let spend: SpendView = serde_json::from_value(body).unwrap();
    assert_eq!(spend.total, Decimal::new(4_250, 2));
    assert_eq!(spend.user1, Decimal::new(2_125, 2));
    assert_eq!(spend.user2, Decimal::new(2_125, 2));

    let (_, processed) = send(&app, Method::GET, "/imports/processed", None).await;
    assert_eq!(processed["imports"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn selecting_current_month_carries_budgets_forward() {
    let app = app().await;
    let groceries = create_category(&app, "Groceries").await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/budgets/category",
        Some(json!({
            "category_id": groceries,
            "year": 2024,
            "month": 5,
            "budget_type": "split",
            "user1_amount_minor": 20_000,
            "user2_amount_minor": 10_000
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, selected) = send(
        &app,
        Method::POST,
        "/periods/select",
        Some(json!({ "year": 2024, "month": 6 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(selected["carried_from"], json!({ "year": 2024, "month": 5 }));
    assert_eq!(selected["periods_with_data"].as_array().unwrap().len(), 2);

    let (_, budgets) = send(&app, Method::GET, "/budgets?year=2024&month=6", None).await;
    let categories = budgets["categories"].as_array().unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0]["effective_amount_minor"], 30_000);

    let (_, again) = send(
        &app,
        Method::POST,
        "/periods/select",
        Some(json!({ "year": 2024, "month": 6 })),
    )
    .await;
    assert_eq!(again["carried_from"], Value::Null);
}
