//! Imported bank transactions waiting for a human decision.
//!
//! Status lifecycle:
//!
//! ```text
//! pending/edited --approve--> approved --restore--> pending
//! pending/edited --reject---> rejected --restore--> pending
//! any ----------------delete-----------------------> (gone)
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, SplitType, TransactionInput, TransactionType};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStatus {
    Pending,
    /// Still pending, but a human changed some fields.
    Edited,
    Approved,
    Rejected,
}

impl ImportStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Edited => "edited",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl TryFrom<&str> for ImportStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "edited" => Ok(Self::Edited),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(EngineError::Validation(format!(
                "invalid import status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTransaction {
    pub id: Uuid,
    pub external_transaction_id: String,
    pub connected_account_id: Uuid,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Money,
    pub transaction_type: TransactionType,
    pub status: ImportStatus,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub transaction_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub split_type: Option<SplitType>,
    pub paid_by: Option<String>,
    pub paid_to: Option<String>,
    pub reimburses_transaction_id: Option<Uuid>,
    /// Feed payload as received, kept for audit.
    pub raw_payload: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl PendingTransaction {
    /// The record's current values in entry-form shape.
    pub fn as_input(&self) -> TransactionInput {
        TransactionInput {
            date: Some(self.date),
            description: Some(self.description.clone()),
            amount: Some(self.amount),
            transaction_type: Some(self.transaction_type),
            category_id: self.category_id,
            split_type: self.split_type.clone(),
            paid_by: self.paid_by.clone(),
            paid_to: self.paid_to.clone(),
            reimburses_transaction_id: self.reimburses_transaction_id,
            exclude_from_monthly: None,
            exclude_from_yearly: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "pending_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub external_transaction_id: String,
    pub connected_account_id: Uuid,
    pub date: Date,
    pub description: String,
    pub amount_minor: i64,
    pub transaction_type: String,
    pub status: String,
    pub approved_at: Option<DateTimeUtc>,
    pub rejected_at: Option<DateTimeUtc>,
    pub transaction_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub split_type: Option<String>,
    pub paid_by: Option<String>,
    pub paid_to: Option<String>,
    pub reimburses_transaction_id: Option<Uuid>,
    pub raw_payload: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::connected_accounts::Entity",
        from = "Column::ConnectedAccountId",
        to = "super::connected_accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    ConnectedAccount,
}

impl Related<super::connected_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ConnectedAccount.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for PendingTransaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            external_transaction_id: model.external_transaction_id,
            connected_account_id: model.connected_account_id,
            date: model.date,
            description: model.description,
            amount: Money::new(model.amount_minor),
            transaction_type: TransactionType::try_from(model.transaction_type.as_str())?,
            status: ImportStatus::try_from(model.status.as_str())?,
            approved_at: model.approved_at,
            rejected_at: model.rejected_at,
            transaction_id: model.transaction_id,
            category_id: model.category_id,
            split_type: model.split_type.as_deref().map(SplitType::from),
            paid_by: model.paid_by,
            paid_to: model.paid_to,
            reimburses_transaction_id: model.reimburses_transaction_id,
            raw_payload: model.raw_payload,
            created_at: model.created_at,
        })
    }
}
