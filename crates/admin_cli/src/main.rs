use std::{error::Error, io::Write};

use chrono::{Datelike, Local};
use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{CarryForward, Engine, NewConnectedAccount, Period};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "ledger_admin")]
#[command(about = "Admin utilities for the household ledger (bank links, categories, sync)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./household.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Account(Account),
    Category(Category),
    Sector(Sector),
    /// Pull recent bank transactions into the review queue.
    Sync(SyncArgs),
    /// Carry the latest budgets into a month that has none.
    EnsurePeriod(EnsurePeriodArgs),
}

#[derive(Args, Debug)]
struct Account {
    #[command(subcommand)]
    command: AccountCommand,
}

#[derive(Subcommand, Debug)]
enum AccountCommand {
    /// Store a bank link; the access token is read from the terminal.
    Link(AccountLinkArgs),
    List,
    Deactivate {
        #[arg(long)]
        id: Uuid,
    },
}

#[derive(Args, Debug)]
struct AccountLinkArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    institution: Option<String>,
    #[arg(long)]
    external_id: String,
}

#[derive(Args, Debug)]
struct Category {
    #[command(subcommand)]
    command: CategoryCommand,
}

#[derive(Subcommand, Debug)]
enum CategoryCommand {
    Create {
        #[arg(long)]
        name: String,
    },
}

#[derive(Args, Debug)]
struct Sector {
    #[command(subcommand)]
    command: SectorCommand,
}

#[derive(Subcommand, Debug)]
enum SectorCommand {
    Create {
        #[arg(long)]
        name: String,
        /// Member category, by name. Repeatable.
        #[arg(long = "category")]
        categories: Vec<String>,
    },
}

#[derive(Args, Debug)]
struct SyncArgs {
    #[arg(long)]
    account: Uuid,
    #[arg(long, default_value_t = 30)]
    days_back: i64,
    #[arg(long, env = "HOUSEHOLD_FEED__BASE_URL")]
    feed_url: String,
    #[arg(long, env = "HOUSEHOLD_FEED__CLIENT_ID")]
    client_id: String,
    #[arg(long, env = "HOUSEHOLD_FEED__SECRET", hide_env_values = true)]
    secret: String,
}

#[derive(Args, Debug)]
struct EnsurePeriodArgs {
    /// Defaults to the current year.
    #[arg(long)]
    year: Option<i32>,
    /// Defaults to the current month.
    #[arg(long)]
    month: Option<u32>,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_secret(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

fn prompt_access_token() -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let token = prompt_secret("Access token: ")?;
        let token = token.trim();
        if !token.is_empty() {
            return Ok(token.to_string());
        }
        execute!(
            out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print("Access token must not be empty.\r\n")
        )?;
    }

    Err("too many attempts".into())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

async fn resolve_categories(
    engine: &Engine,
    names: &[String],
) -> Result<Vec<Uuid>, Box<dyn Error + Send + Sync>> {
    let categories = engine.list_categories().await?;
    let mut ids = Vec::with_capacity(names.len());
    for name in names {
        let wanted = name.trim().to_lowercase();
        match categories.iter().find(|c| c.name.to_lowercase() == wanted) {
            Some(category) => ids.push(category.id),
            None => return Err(format!("category not found: {name}").into()),
        }
    }
    Ok(ids)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::Account(Account {
            command: AccountCommand::Link(args),
        }) => {
            let access_token = prompt_access_token()?;
            let account = engine
                .connect_account(NewConnectedAccount {
                    name: args.name,
                    institution_name: args.institution,
                    external_account_id: args.external_id,
                    access_token,
                })
                .await?;
            println!("linked account: {} ({})", account.name, account.id);
        }
        Command::Account(Account {
            command: AccountCommand::List,
        }) => {
            for account in engine.list_accounts().await? {
                let synced = account
                    .last_synced_at
                    .map(|at| at.to_rfc3339())
                    .unwrap_or_else(|| "never".to_string());
                let state = if account.active { "active" } else { "inactive" };
                println!(
                    "{}  {}  {state}  last sync: {synced}",
                    account.id, account.name
                );
            }
        }
        Command::Account(Account {
            command: AccountCommand::Deactivate { id },
        }) => {
            let account = engine.deactivate_account(id).await?;
            println!("deactivated account: {}", account.name);
        }
        Command::Category(Category {
            command: CategoryCommand::Create { name },
        }) => {
            let category = engine.create_category(&name).await?;
            println!("created category: {} ({})", category.name, category.id);
        }
        Command::Sector(Sector {
            command: SectorCommand::Create { name, categories },
        }) => {
            let ids = resolve_categories(&engine, &categories).await?;
            let sector = engine.create_sector(&name, &ids).await?;
            println!(
                "created sector: {} ({}) with {} categories",
                sector.name,
                sector.id,
                sector.category_ids.len()
            );
        }
        Command::Sync(args) => {
            let feed = bank_feed::FeedClient::new(
                reqwest::Client::new(),
                bank_feed::FeedConfig {
                    base_url: args.feed_url,
                    client_id: args.client_id,
                    secret: args.secret,
                },
            );
            let today = Local::now().date_naive();
            let report = engine
                .sync_account(&feed, args.account, args.days_back, today)
                .await?;
            println!(
                "synced {} days: {} fetched, {} imported, {} duplicates, {} pending at the bank{}",
                report.days_back,
                report.fetched,
                report.imported,
                report.skipped_duplicates,
                report.skipped_pending,
                if report.capped { " (record cap reached)" } else { "" }
            );
        }
        Command::EnsurePeriod(args) => {
            let today = Local::now().date_naive();
            let period = Period::new(
                args.year.unwrap_or(today.year()),
                args.month.unwrap_or(today.month()),
            )?;
            match engine.ensure_period_has_data(period).await? {
                CarryForward::Copied {
                    from,
                    categories,
                    sectors,
                } => println!(
                    "copied {categories} category and {sectors} sector budgets from {from} into {period}"
                ),
                CarryForward::AlreadyPopulated => println!("{period} already has budgets"),
                CarryForward::NothingToCopy => println!("no earlier month has budgets"),
            }
        }
    }

    Ok(())
}
