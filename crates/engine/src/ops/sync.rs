use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{BankFeed, EngineError, FeedRequest, ResultEngine, util::clamp_days_back};

use super::{Engine, RecordOutcome};

/// Counters of one sync run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub account_id: Uuid,
    /// Look-back actually used, after clamping.
    pub days_back: u32,
    pub pages: usize,
    /// Items received from the feed.
    pub fetched: usize,
    pub imported: usize,
    pub skipped_duplicates: usize,
    /// Items the feed still reports as pending.
    pub skipped_pending: usize,
    /// The record cap left feed items unfetched.
    pub capped: bool,
}

impl Engine {
    /// Pulls `days_back` days of posted transactions for one account into
    /// the pending queue.
    ///
    /// Pagination stops at the configured record cap. A feed error aborts the
    /// remaining pages; items from pages already processed stay imported.
    pub async fn sync_account(
        &self,
        feed: &dyn BankFeed,
        account_id: Uuid,
        days_back: i64,
        today: NaiveDate,
    ) -> ResultEngine<SyncReport> {
        let account = self.account(account_id).await?;
        if !account.active {
            return Err(EngineError::InvalidTransition(format!(
                "account {} is not active",
                account.name
            )));
        }

        let days = clamp_days_back(days_back);
        let start = today
            .checked_sub_days(Days::new(u64::from(days)))
            .ok_or_else(|| EngineError::Validation("sync start date out of range".to_string()))?;
        let mut report = SyncReport {
            account_id,
            days_back: days,
            ..Default::default()
        };
        let mut cursor: Option<String> = None;

        loop {
            let remaining = self.sync_limits.max_records - report.fetched;
            let request = FeedRequest {
                start,
                end: today,
                cursor: cursor.clone(),
                count: remaining.min(self.sync_limits.page_size),
            };
            let page = match feed.fetch_page(&account, &request).await {
                Ok(page) => page,
                Err(err) => {
                    tracing::warn!(
                        "sync of {} stopped after {} pages: {err}",
                        account.name,
                        report.pages
                    );
                    return Err(err);
                }
            };
            report.pages += 1;

            let mut items = page.transactions;
            let dropped = items.len() > remaining;
            items.truncate(remaining);
            report.fetched += items.len();
            for item in &items {
                if item.pending {
                    report.skipped_pending += 1;
                    continue;
                }
                match self.record_pending(account.id, item).await? {
                    RecordOutcome::Inserted => report.imported += 1,
                    RecordOutcome::Skipped => report.skipped_duplicates += 1,
                }
            }

            if dropped
                || (page.next_cursor.is_some() && report.fetched >= self.sync_limits.max_records)
            {
                report.capped = true;
                tracing::warn!(
                    "sync of {} hit the cap of {} records",
                    account.name,
                    self.sync_limits.max_records
                );
                break;
            }
            let Some(next) = page.next_cursor else {
                break;
            };
            if items.is_empty() || cursor.as_deref() == Some(next.as_str()) {
                return Err(EngineError::UpstreamFeed(
                    "feed returned a page without progress".to_string(),
                ));
            }
            cursor = Some(next);
        }

        self.mark_synced(account.id).await?;
        tracing::info!(
            "synced {}: {} fetched, {} imported, {} duplicates, {} still pending at the bank",
            account.name,
            report.fetched,
            report.imported,
            report.skipped_duplicates,
            report.skipped_pending
        );
        Ok(report)
    }
}
