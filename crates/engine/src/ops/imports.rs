use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
    sea_query::OnConflict,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, FeedTransaction, ImportStatus, PendingTransaction, ResultEngine,
    TransactionInput, pending_transactions, util::normalize_optional_text,
};

use super::{Engine, transactions::insert_transaction, with_tx};

/// Result of offering one feed item to the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordOutcome {
    Inserted,
    /// The external id was already known.
    Skipped,
}

/// Waiting for approval or rejection.
const OPEN_STATUSES: [ImportStatus; 2] = [ImportStatus::Pending, ImportStatus::Edited];
const PROCESSED_STATUSES: [ImportStatus; 2] = [ImportStatus::Approved, ImportStatus::Rejected];

fn status_values(statuses: &[ImportStatus]) -> Vec<&'static str> {
    statuses.iter().map(|s| s.as_str()).collect()
}

impl Engine {
    pub async fn is_duplicate(&self, external_id: &str) -> ResultEngine<bool> {
        Ok(pending_transactions::Entity::find()
            .filter(pending_transactions::Column::ExternalTransactionId.eq(external_id))
            .one(&self.database)
            .await?
            .is_some())
    }

    /// Inserts a pending candidate unless its external id is already known.
    ///
    /// Insert-if-absent is a single statement against the unique index, so
    /// overlapping or concurrent imports cannot create a second row.
    pub async fn record_pending(
        &self,
        connected_account_id: Uuid,
        item: &FeedTransaction,
    ) -> ResultEngine<RecordOutcome> {
        let model = pending_transactions::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            external_transaction_id: ActiveValue::Set(item.external_id.clone()),
            connected_account_id: ActiveValue::Set(connected_account_id),
            date: ActiveValue::Set(item.date),
            description: ActiveValue::Set(item.description.trim().to_string()),
            amount_minor: ActiveValue::Set(item.amount.abs().cents()),
            transaction_type: ActiveValue::Set(item.inferred_type().as_str().to_string()),
            status: ActiveValue::Set(ImportStatus::Pending.as_str().to_string()),
            approved_at: ActiveValue::Set(None),
            rejected_at: ActiveValue::Set(None),
            transaction_id: ActiveValue::Set(None),
            category_id: ActiveValue::Set(None),
            split_type: ActiveValue::Set(None),
            paid_by: ActiveValue::Set(None),
            paid_to: ActiveValue::Set(None),
            reimburses_transaction_id: ActiveValue::Set(None),
            raw_payload: ActiveValue::Set(Some(item.raw.to_string())),
            created_at: ActiveValue::Set(Utc::now()),
        };

        let rows = pending_transactions::Entity::insert(model)
            .on_conflict(
                OnConflict::column(pending_transactions::Column::ExternalTransactionId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.database)
            .await?;
        Ok(if rows == 0 {
            RecordOutcome::Skipped
        } else {
            RecordOutcome::Inserted
        })
    }

    /// Imports waiting for a decision, newest first.
    pub async fn list_pending(&self) -> ResultEngine<Vec<PendingTransaction>> {
        list_by_status(&self.database, &OPEN_STATUSES).await
    }

    /// Approved and rejected imports, newest first.
    pub async fn list_processed(&self) -> ResultEngine<Vec<PendingTransaction>> {
        list_by_status(&self.database, &PROCESSED_STATUSES).await
    }

    pub async fn pending(&self, pending_id: Uuid) -> ResultEngine<PendingTransaction> {
        require_pending(&self.database, pending_id).await
    }

    /// Stores human corrections on an open import and marks it edited.
    pub async fn edit_pending(
        &self,
        pending_id: Uuid,
        patch: TransactionInput,
    ) -> ResultEngine<PendingTransaction> {
        with_tx!(self, |db_tx| {
            let current = require_pending(&db_tx, pending_id).await?;
            require_status(&current, &OPEN_STATUSES, "edit")?;

            if patch.exclude_from_monthly.is_some() || patch.exclude_from_yearly.is_some() {
                return Err(EngineError::Validation(
                    "exclusion flags are set on the transaction, not the import".to_string(),
                ));
            }
            if patch.amount.is_some_and(|a| !a.is_positive()) {
                return Err(EngineError::Validation("amount must be > 0".to_string()));
            }
            let description = match patch.description.as_deref() {
                Some(raw) => Some(normalize_optional_text(Some(raw)).ok_or_else(|| {
                    EngineError::Validation("description must not be empty".to_string())
                })?),
                None => None,
            };
            if let Some(split_type) = &patch.split_type
                && !split_type.is_known()
            {
                return Err(EngineError::Validation(format!(
                    "invalid split_type: {}",
                    split_type.as_str()
                )));
            }

            let mut model = pending_transactions::ActiveModel {
                id: ActiveValue::Unchanged(current.id),
                status: ActiveValue::Set(ImportStatus::Edited.as_str().to_string()),
                ..Default::default()
            };
            if let Some(date) = patch.date {
                model.date = ActiveValue::Set(date);
            }
            if let Some(description) = description {
                model.description = ActiveValue::Set(description);
            }
            if let Some(amount) = patch.amount {
                model.amount_minor = ActiveValue::Set(amount.cents());
            }
            if let Some(kind) = patch.transaction_type {
                model.transaction_type = ActiveValue::Set(kind.as_str().to_string());
            }
            if let Some(category_id) = patch.category_id {
                model.category_id = ActiveValue::Set(Some(category_id));
            }
            if let Some(split_type) = &patch.split_type {
                model.split_type = ActiveValue::Set(Some(split_type.as_str().to_string()));
            }
            if let Some(paid_by) = normalize_optional_text(patch.paid_by.as_deref()) {
                model.paid_by = ActiveValue::Set(Some(paid_by));
            }
            if let Some(paid_to) = normalize_optional_text(patch.paid_to.as_deref()) {
                model.paid_to = ActiveValue::Set(Some(paid_to));
            }
            if let Some(target) = patch.reimburses_transaction_id {
                model.reimburses_transaction_id = ActiveValue::Set(Some(target));
            }

            model.update(&db_tx).await?.try_into()
        })
    }

    /// Turns an open import into a confirmed transaction.
    ///
    /// Each field resolves as override, then the import's own value. The new
    /// transaction and the status change commit together; a validation error
    /// leaves both untouched.
    pub async fn approve(
        &self,
        pending_id: Uuid,
        overrides: TransactionInput,
    ) -> ResultEngine<PendingTransaction> {
        with_tx!(self, |db_tx| {
            let current = require_pending(&db_tx, pending_id).await?;
            require_status(&current, &OPEN_STATUSES, "approve")?;

            let input = overrides.or(current.as_input());
            let tx = self
                .build_transaction(&db_tx, Uuid::new_v4(), &input, Utc::now())
                .await?;
            insert_transaction(&db_tx, &tx).await?;

            let model = pending_transactions::ActiveModel {
                id: ActiveValue::Unchanged(current.id),
                status: ActiveValue::Set(ImportStatus::Approved.as_str().to_string()),
                approved_at: ActiveValue::Set(Some(Utc::now())),
                rejected_at: ActiveValue::Set(None),
                transaction_id: ActiveValue::Set(Some(tx.id)),
                ..Default::default()
            };
            model.update(&db_tx).await?.try_into()
        })
    }

    pub async fn reject(&self, pending_id: Uuid) -> ResultEngine<PendingTransaction> {
        with_tx!(self, |db_tx| {
            let current = require_pending(&db_tx, pending_id).await?;
            require_status(&current, &OPEN_STATUSES, "reject")?;

            let model = pending_transactions::ActiveModel {
                id: ActiveValue::Unchanged(current.id),
                status: ActiveValue::Set(ImportStatus::Rejected.as_str().to_string()),
                rejected_at: ActiveValue::Set(Some(Utc::now())),
                ..Default::default()
            };
            model.update(&db_tx).await?.try_into()
        })
    }

    /// Sends a processed import back to pending.
    ///
    /// The transaction created by an earlier approval is left alone; the
    /// import only forgets the link.
    pub async fn restore(&self, pending_id: Uuid) -> ResultEngine<PendingTransaction> {
        with_tx!(self, |db_tx| {
            let current = require_pending(&db_tx, pending_id).await?;
            require_status(&current, &PROCESSED_STATUSES, "restore")?;

            let model = pending_transactions::ActiveModel {
                id: ActiveValue::Unchanged(current.id),
                status: ActiveValue::Set(ImportStatus::Pending.as_str().to_string()),
                approved_at: ActiveValue::Set(None),
                rejected_at: ActiveValue::Set(None),
                transaction_id: ActiveValue::Set(None),
                ..Default::default()
            };
            model.update(&db_tx).await?.try_into()
        })
    }

    /// Hard delete; a linked transaction is kept.
    pub async fn delete_pending(&self, pending_id: Uuid) -> ResultEngine<()> {
        let res = pending_transactions::Entity::delete_by_id(pending_id)
            .exec(&self.database)
            .await?;
        if res.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("pending transaction not exists".to_string()));
        }
        Ok(())
    }

    /// Deletes every approved or rejected import and returns how many.
    pub async fn delete_all_processed(&self) -> ResultEngine<u64> {
        let res = pending_transactions::Entity::delete_many()
            .filter(pending_transactions::Column::Status.is_in(status_values(&PROCESSED_STATUSES)))
            .exec(&self.database)
            .await?;
        tracing::info!("deleted {} processed imports", res.rows_affected);
        Ok(res.rows_affected)
    }
}

fn require_status(
    pending: &PendingTransaction,
    allowed: &[ImportStatus],
    action: &str,
) -> ResultEngine<()> {
    if allowed.contains(&pending.status) {
        return Ok(());
    }
    Err(EngineError::InvalidTransition(format!(
        "cannot {action} an import that is {}",
        pending.status.as_str()
    )))
}

async fn require_pending<C: ConnectionTrait>(
    db: &C,
    pending_id: Uuid,
) -> ResultEngine<PendingTransaction> {
    pending_transactions::Entity::find_by_id(pending_id)
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("pending transaction not exists".to_string()))?
        .try_into()
}

async fn list_by_status<C: ConnectionTrait>(
    db: &C,
    statuses: &[ImportStatus],
) -> ResultEngine<Vec<PendingTransaction>> {
    pending_transactions::Entity::find()
        .filter(pending_transactions::Column::Status.is_in(status_values(statuses)))
        .order_by_desc(pending_transactions::Column::Date)
        .order_by_desc(pending_transactions::Column::CreatedAt)
        .all(db)
        .await?
        .into_iter()
        .map(PendingTransaction::try_from)
        .collect()
}
