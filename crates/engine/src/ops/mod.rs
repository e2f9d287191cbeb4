use sea_orm::DatabaseConnection;

use crate::{Household, ResultEngine};

mod accounts;
mod budgets;
mod categories;
mod imports;
mod periods;
mod spend;
mod sync;
mod transactions;

pub use accounts::NewConnectedAccount;
pub use budgets::PeriodBudgets;
pub use imports::RecordOutcome;
pub use periods::CarryForward;
pub use spend::{BudgetStatus, SpendScope};
pub use sync::SyncReport;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Upper bounds applied to every sync run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SyncLimits {
    /// Items requested per feed page.
    pub page_size: usize,
    /// Hard cap on items fetched in one run, whatever the feed returns.
    pub max_records: usize,
}

impl Default for SyncLimits {
    fn default() -> Self {
        Self {
            page_size: 500,
            max_records: 5_000,
        }
    }
}

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    household: Household,
    sync_limits: SyncLimits,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn household(&self) -> &Household {
        &self.household
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    household: Household,
    sync_limits: SyncLimits,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Names of the two users sharing the ledger.
    pub fn household(mut self, household: Household) -> EngineBuilder {
        self.household = household;
        self
    }

    pub fn sync_limits(mut self, limits: SyncLimits) -> EngineBuilder {
        self.sync_limits = limits;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        if self.sync_limits.page_size == 0 || self.sync_limits.max_records == 0 {
            return Err(crate::EngineError::Validation(
                "sync page size and record cap must be > 0".to_string(),
            ));
        }
        Ok(Engine {
            database: self.database,
            household: self.household,
            sync_limits: self.sync_limits,
        })
    }
}
