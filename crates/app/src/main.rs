use std::sync::Arc;

use migration::{Migrator, MigratorTrait};
use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "household_ledger={level},server={level},engine={level},bank_feed={level}",
            level = settings.app.level
        ))
        .init();

    tracing::info!("connecting to {:?}", settings.server.database);
    let db = parse_database(&settings.server.database).await?;

    let household =
        engine::Household::new(&settings.household.user1, &settings.household.user2)?;
    let engine = engine::Engine::builder()
        .database(db)
        .household(household)
        .sync_limits(settings.feed.sync_limits())
        .build()
        .await?;

    let feed = bank_feed::FeedClient::new(reqwest::Client::new(), settings.feed.client_config());
    let state = server::ServerState::new(
        engine,
        Arc::new(feed),
        Arc::new(|| chrono::Local::now().date_naive()),
    )
    .await?;

    let bind = settings
        .server
        .bind
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, settings.server.port);
    server::run(state, &addr).await;

    Ok(())
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
