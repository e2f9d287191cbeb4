//! Links to external bank accounts. Every pending import points at the
//! account it was fetched from.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectedAccount {
    pub id: Uuid,
    pub name: String,
    pub institution_name: Option<String>,
    /// Account id on the aggregator side.
    pub external_account_id: String,
    #[serde(skip_serializing, default)]
    pub access_token: String,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "connected_accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub institution_name: Option<String>,
    pub external_account_id: String,
    pub access_token: String,
    pub last_synced_at: Option<DateTimeUtc>,
    pub active: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::pending_transactions::Entity")]
    PendingTransactions,
}

impl Related<super::pending_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PendingTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ConnectedAccount {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            institution_name: model.institution_name,
            external_account_id: model.external_account_id,
            access_token: model.access_token,
            last_synced_at: model.last_synced_at,
            active: model.active,
            created_at: model.created_at,
        }
    }
}
