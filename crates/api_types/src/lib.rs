use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Year and month of a budget period.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodView {
    pub year: i32,
    pub month: u32,
}

pub mod category {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: Uuid,
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryListResponse {
        pub categories: Vec<CategoryView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SectorNew {
        pub name: String,
        #[serde(default)]
        pub category_ids: Vec<Uuid>,
    }

    /// Replaces the member categories of a sector.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SectorCategories {
        pub category_ids: Vec<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SectorView {
        pub id: Uuid,
        pub name: String,
        pub category_ids: Vec<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SectorListResponse {
        pub sectors: Vec<SectorView>,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionType {
        Expense,
        Income,
        Settlement,
        Reimbursement,
    }

    /// Flat entry form.
    ///
    /// Used to create a transaction, to patch one, to edit an import and to
    /// override fields on approval. Fields left out keep their current value
    /// where one exists.
    ///
    /// `split_type` is one of `splitEqually`, `user1_only`, `user2_only`.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct TransactionFields {
        pub date: Option<NaiveDate>,
        pub description: Option<String>,
        pub amount_minor: Option<i64>,
        pub transaction_type: Option<TransactionType>,
        pub category_id: Option<Uuid>,
        pub split_type: Option<String>,
        pub paid_by: Option<String>,
        pub paid_to: Option<String>,
        pub reimburses_transaction_id: Option<Uuid>,
        pub exclude_from_monthly: Option<bool>,
        pub exclude_from_yearly: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub date: NaiveDate,
        pub description: String,
        pub amount_minor: i64,
        pub transaction_type: TransactionType,
        pub category_id: Option<Uuid>,
        pub split_type: Option<String>,
        pub paid_by: Option<String>,
        pub paid_to: Option<String>,
        pub reimburses_transaction_id: Option<Uuid>,
        pub exclude_from_monthly: bool,
        pub exclude_from_yearly: bool,
        pub created_at: DateTime<Utc>,
    }

    /// Inclusive date range, both ends optional.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionListQuery {
        pub from: Option<NaiveDate>,
        pub to: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub transactions: Vec<TransactionView>,
    }
}

pub mod budget {
    use super::*;

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum BudgetType {
        #[default]
        Absolute,
        Split,
    }

    /// `absolute_amount_minor` for absolute budgets, the two user amounts
    /// for split budgets.
    #[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct BudgetAmountFields {
        #[serde(default)]
        pub budget_type: BudgetType,
        pub absolute_amount_minor: Option<i64>,
        pub user1_amount_minor: Option<i64>,
        pub user2_amount_minor: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryBudgetNew {
        pub category_id: Uuid,
        pub year: i32,
        pub month: u32,
        #[serde(flatten)]
        pub amount: BudgetAmountFields,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryBudgetUpdate {
        #[serde(flatten)]
        pub amount: BudgetAmountFields,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryBudgetView {
        pub id: Uuid,
        pub category_id: Uuid,
        pub year: i32,
        pub month: u32,
        #[serde(flatten)]
        pub amount: BudgetAmountFields,
        pub effective_amount_minor: i64,
    }

    /// With `auto_rollup` the amount fields may be left out; they default to
    /// an absolute budget of zero.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SectorBudgetNew {
        pub sector_id: Uuid,
        pub year: i32,
        pub month: u32,
        #[serde(default)]
        pub auto_rollup: bool,
        #[serde(flatten)]
        pub amount: BudgetAmountFields,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SectorBudgetUpdate {
        #[serde(default)]
        pub auto_rollup: bool,
        #[serde(flatten)]
        pub amount: BudgetAmountFields,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SectorBudgetView {
        pub id: Uuid,
        pub sector_id: Uuid,
        pub year: i32,
        pub month: u32,
        #[serde(flatten)]
        pub amount: BudgetAmountFields,
        pub auto_rollup: bool,
        pub effective_amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetsQuery {
        pub year: i32,
        pub month: u32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PeriodBudgetsResponse {
        pub period: PeriodView,
        pub categories: Vec<CategoryBudgetView>,
        pub sectors: Vec<SectorBudgetView>,
    }
}

pub mod spend {
    use rust_decimal::Decimal;

    use super::*;

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum WindowMode {
        #[default]
        Monthly,
        Yearly,
        YearlyPreviousMonths,
    }

    /// Exactly one of `category_id` and `sector_id` must be set.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SpendRequest {
        pub category_id: Option<Uuid>,
        pub sector_id: Option<Uuid>,
        pub year: i32,
        pub month: u32,
        #[serde(default)]
        pub mode: WindowMode,
    }

    /// Decimal amounts, serialized as strings.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SpendView {
        pub total: Decimal,
        pub user1: Decimal,
        pub user2: Decimal,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetStatusView {
        pub spend: SpendView,
        pub budget: Decimal,
        pub remaining: Option<Decimal>,
        pub remaining_pct: Option<Decimal>,
    }
}

pub mod period {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PeriodsResponse {
        pub selected: PeriodView,
        pub periods_with_data: Vec<PeriodView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PeriodSelect {
        pub year: i32,
        pub month: u32,
    }

    /// `carried_from` is set when selecting copied budgets from an earlier
    /// month.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PeriodSelected {
        pub selected: PeriodView,
        pub periods_with_data: Vec<PeriodView>,
        pub carried_from: Option<PeriodView>,
    }
}

pub mod import {
    use super::*;
    use crate::transaction::TransactionType;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ImportStatus {
        Pending,
        Edited,
        Approved,
        Rejected,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PendingView {
        pub id: Uuid,
        pub external_transaction_id: String,
        pub connected_account_id: Uuid,
        pub date: NaiveDate,
        pub description: String,
        pub amount_minor: i64,
        pub transaction_type: TransactionType,
        pub status: ImportStatus,
        pub approved_at: Option<DateTime<Utc>>,
        pub rejected_at: Option<DateTime<Utc>>,
        pub transaction_id: Option<Uuid>,
        pub category_id: Option<Uuid>,
        pub split_type: Option<String>,
        pub paid_by: Option<String>,
        pub paid_to: Option<String>,
        pub reimburses_transaction_id: Option<Uuid>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PendingListResponse {
        pub imports: Vec<PendingView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BulkDeleted {
        pub deleted: u64,
    }
}

pub mod account {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountNew {
        pub name: String,
        pub institution_name: Option<String>,
        pub external_account_id: String,
        pub access_token: String,
    }

    /// The access token is never sent back.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountView {
        pub id: Uuid,
        pub name: String,
        pub institution_name: Option<String>,
        pub external_account_id: String,
        pub last_synced_at: Option<DateTime<Utc>>,
        pub active: bool,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountListResponse {
        pub accounts: Vec<AccountView>,
    }

    /// Look-back in days, clamped server side to `[1, 90]`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct SyncRequest {
        pub days_back: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SyncResult {
        pub days_back: u32,
        pub pages: usize,
        pub fetched: usize,
        pub imported: usize,
        pub skipped_duplicates: usize,
        pub skipped_pending: usize,
        pub capped: bool,
    }
}

#[cfg(test)]
mod tests {
    use super::budget::*;

    #[test]
    fn sector_budget_amount_fields_are_optional_with_rollup() {
        let body: SectorBudgetNew = serde_json::from_value(serde_json::json!({
            "sector_id": "67e55044-10b1-426f-9247-bb680e5fe0c8",
            "year": 2024,
            "month": 3,
            "auto_rollup": true
        }))
        .unwrap();
        assert!(body.auto_rollup);
        assert_eq!(body.amount, BudgetAmountFields::default());
    }

    #[test]
    fn split_budget_fields_flatten() {
        let body: CategoryBudgetUpdate = serde_json::from_value(serde_json::json!({
            "budget_type": "split",
            "user1_amount_minor": 1200,
            "user2_amount_minor": 800
        }))
        .unwrap();
        assert_eq!(body.amount.budget_type, BudgetType::Split);
        assert_eq!(body.amount.user1_amount_minor, Some(1200));
        assert_eq!(body.amount.absolute_amount_minor, None);
    }
}
