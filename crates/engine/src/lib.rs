//! Household budget engine: confirmed transactions, monthly budgets, spend
//! aggregation and the bank import queue, on top of a sea-orm database.

pub use aggregator::{
    SpendTotals, aggregate, category_monthly_spend, category_yearly_spend, sector_monthly_spend,
    sector_yearly_spend, spend_for_categories, split_weights,
};
pub use budgets::{BudgetAmount, BudgetComparison};
pub use categories::Category;
pub use category_budgets::CategoryBudget;
pub use commands::{SectorBudgetSpec, TransactionInput};
pub use connected_accounts::ConnectedAccount;
pub use containment::{SectorCeiling, check_category_budget, check_sector_budget};
pub use error::EngineError;
pub use feed::{BankFeed, FeedPage, FeedRequest, FeedTransaction};
pub use household::{Household, SHARED_PAYER};
pub use money::Money;
pub use ops::{
    BudgetStatus, CarryForward, Engine, EngineBuilder, NewConnectedAccount, PeriodBudgets,
    RecordOutcome, SpendScope, SyncLimits, SyncReport,
};
pub use pending_transactions::{ImportStatus, PendingTransaction};
pub use period::{BudgetKind, DateWindow, Period, WindowMode};
pub use period_controller::PeriodController;
pub use sector_budgets::SectorBudget;
pub use sectors::Sector;
pub use transactions::{SplitType, Transaction, TransactionDetail, TransactionType};
pub use util::clamp_days_back;

mod aggregator;
mod budgets;
mod categories;
mod category_budgets;
mod commands;
mod connected_accounts;
mod containment;
mod error;
mod feed;
mod household;
mod money;
mod ops;
mod pending_transactions;
mod period;
mod period_controller;
mod sector_budgets;
mod sector_categories;
mod sectors;
mod transactions;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;
