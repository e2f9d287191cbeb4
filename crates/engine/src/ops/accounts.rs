use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    ConnectedAccount, EngineError, ResultEngine, connected_accounts,
    util::{normalize_display_name, normalize_optional_text},
};

use super::{Engine, with_tx};

/// A bank account link returned by the aggregator's link flow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewConnectedAccount {
    pub name: String,
    pub institution_name: Option<String>,
    pub external_account_id: String,
    pub access_token: String,
}

impl Engine {
    pub async fn connect_account(
        &self,
        account: NewConnectedAccount,
    ) -> ResultEngine<ConnectedAccount> {
        let name = normalize_display_name(&account.name, "account")?;
        let external_account_id = normalize_optional_text(Some(&account.external_account_id))
            .ok_or_else(|| {
                EngineError::Validation("external account id must not be empty".to_string())
            })?;
        if account.access_token.trim().is_empty() {
            return Err(EngineError::Validation(
                "access token must not be empty".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let existing = connected_accounts::Entity::find()
                .filter(connected_accounts::Column::ExternalAccountId.eq(external_account_id.clone()))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::ExistingKey(external_account_id));
            }

            let model = connected_accounts::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                name: ActiveValue::Set(name),
                institution_name: ActiveValue::Set(normalize_optional_text(
                    account.institution_name.as_deref(),
                )),
                external_account_id: ActiveValue::Set(external_account_id),
                access_token: ActiveValue::Set(account.access_token.trim().to_string()),
                last_synced_at: ActiveValue::Set(None),
                active: ActiveValue::Set(true),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;
            Ok(ConnectedAccount::from(model))
        })
    }

    pub async fn list_accounts(&self) -> ResultEngine<Vec<ConnectedAccount>> {
        Ok(connected_accounts::Entity::find()
            .order_by_asc(connected_accounts::Column::Name)
            .all(&self.database)
            .await?
            .into_iter()
            .map(ConnectedAccount::from)
            .collect())
    }

    pub async fn account(&self, account_id: Uuid) -> ResultEngine<ConnectedAccount> {
        connected_accounts::Entity::find_by_id(account_id)
            .one(&self.database)
            .await?
            .map(ConnectedAccount::from)
            .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))
    }

    /// Stops syncing an account. Its imports are kept.
    pub async fn deactivate_account(&self, account_id: Uuid) -> ResultEngine<ConnectedAccount> {
        let current = self.account(account_id).await?;
        let model = connected_accounts::ActiveModel {
            id: ActiveValue::Unchanged(current.id),
            active: ActiveValue::Set(false),
            ..Default::default()
        }
        .update(&self.database)
        .await?;
        Ok(ConnectedAccount::from(model))
    }

    pub(super) async fn mark_synced(&self, account_id: Uuid) -> ResultEngine<()> {
        connected_accounts::ActiveModel {
            id: ActiveValue::Unchanged(account_id),
            last_synced_at: ActiveValue::Set(Some(Utc::now())),
            ..Default::default()
        }
        .update(&self.database)
        .await?;
        Ok(())
    }
}
