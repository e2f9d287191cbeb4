//! The bank aggregator seam.
//!
//! The engine only needs a paginated, date-bounded list of posted
//! transactions per connected account. HTTP details live behind
//! [`BankFeed`] implementations.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{ConnectedAccount, Money, ResultEngine, TransactionType};

/// One page request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedRequest {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Opaque cursor from the previous page, `None` for the first one.
    pub cursor: Option<String>,
    /// Maximum number of items wanted in this page.
    pub count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeedTransaction {
    pub external_id: String,
    pub date: NaiveDate,
    /// Signed amount, negative for money leaving the account.
    pub amount: Money,
    pub description: String,
    /// Not yet posted by the bank. Such items are skipped until posted.
    pub pending: bool,
    pub raw: serde_json::Value,
}

impl FeedTransaction {
    /// Outflows become expenses, everything else income.
    pub fn inferred_type(&self) -> TransactionType {
        if self.amount < Money::ZERO {
            TransactionType::Expense
        } else {
            TransactionType::Income
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeedPage {
    pub transactions: Vec<FeedTransaction>,
    /// `None` when there are no more pages.
    pub next_cursor: Option<String>,
}

/// Source of bank transactions.
///
/// Implementations map their own failures to
/// [`EngineError::UpstreamFeed`](crate::EngineError::UpstreamFeed).
#[async_trait]
pub trait BankFeed: Send + Sync {
    async fn fetch_page(
        &self,
        account: &ConnectedAccount,
        request: &FeedRequest,
    ) -> ResultEngine<FeedPage>;
}
