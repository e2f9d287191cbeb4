use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, Money, ResultEngine, Transaction, TransactionDetail, TransactionInput,
    TransactionType, categories, transactions, util::normalize_optional_text,
};

use super::{Engine, with_tx};

impl Engine {
    /// Direct entry of a confirmed transaction.
    pub async fn create_transaction(&self, input: TransactionInput) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            let tx = self
                .build_transaction(&db_tx, Uuid::new_v4(), &input, Utc::now())
                .await?;
            insert_transaction(&db_tx, &tx).await?;
            Ok(tx)
        })
    }

    /// Explicit edit path. Unset fields of `patch` keep their current value.
    pub async fn update_transaction(
        &self,
        transaction_id: Uuid,
        patch: TransactionInput,
    ) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            let current = require_transaction(&db_tx, transaction_id).await?;
            let merged = patch.or(current.as_input());
            let tx = self
                .build_transaction(&db_tx, current.id, &merged, current.created_at)
                .await?;
            transactions::ActiveModel::from(&tx).update(&db_tx).await?;
            Ok(tx)
        })
    }

    /// Deletes a transaction. Reimbursements pointing at it lose their link,
    /// an import that produced it keeps its row.
    pub async fn delete_transaction(&self, transaction_id: Uuid) -> ResultEngine<()> {
        let res = transactions::Entity::delete_by_id(transaction_id)
            .exec(&self.database)
            .await?;
        if res.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("transaction not exists".to_string()));
        }
        Ok(())
    }

    pub async fn transaction(&self, transaction_id: Uuid) -> ResultEngine<Transaction> {
        require_transaction(&self.database, transaction_id).await
    }

    /// Transactions dated in `[from, to]`, both bounds optional.
    pub async fn list_transactions(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> ResultEngine<Vec<Transaction>> {
        if let (Some(from), Some(to)) = (from, to)
            && from > to
        {
            return Err(EngineError::Validation(
                "invalid range: from must be <= to".to_string(),
            ));
        }

        let mut query = transactions::Entity::find();
        if let Some(from) = from {
            query = query.filter(transactions::Column::Date.gte(from));
        }
        if let Some(to) = to {
            query = query.filter(transactions::Column::Date.lte(to));
        }
        query
            .order_by_asc(transactions::Column::Date)
            .order_by_asc(transactions::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Transaction::try_from)
            .collect()
    }

    /// Validates an entry-form input and resolves it into a transaction.
    ///
    /// Shared by direct entry, edits and import approval, so the three paths
    /// accept exactly the same inputs.
    pub(super) async fn build_transaction<C: ConnectionTrait>(
        &self,
        db: &C,
        id: Uuid,
        input: &TransactionInput,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Transaction> {
        let date = input
            .date
            .ok_or_else(|| EngineError::Validation("date is required".to_string()))?;
        let description = normalize_optional_text(input.description.as_deref())
            .ok_or_else(|| EngineError::Validation("description is required".to_string()))?;
        let amount = input
            .amount
            .ok_or_else(|| EngineError::Validation("amount is required".to_string()))?;
        if amount <= Money::ZERO {
            return Err(EngineError::Validation(
                "amount must be > 0".to_string(),
            ));
        }
        let transaction_type = input.transaction_type.ok_or_else(|| {
            EngineError::Validation("transaction_type is required".to_string())
        })?;

        let detail = TransactionDetail::from_input(transaction_type, input, &self.household)?;
        match &detail {
            TransactionDetail::Expense { category_id, .. } => {
                let exists = categories::Entity::find_by_id(*category_id)
                    .one(db)
                    .await?
                    .is_some();
                if !exists {
                    return Err(EngineError::Validation(format!(
                        "category {category_id} does not exist"
                    )));
                }
            }
            TransactionDetail::Reimbursement {
                reimburses_transaction_id: Some(target),
                ..
            } => {
                if *target == id {
                    return Err(EngineError::Validation(
                        "a reimbursement cannot reimburse itself".to_string(),
                    ));
                }
                let is_expense = transactions::Entity::find_by_id(*target)
                    .one(db)
                    .await?
                    .is_some_and(|m| m.kind == TransactionType::Expense.as_str());
                if !is_expense {
                    return Err(EngineError::Validation(format!(
                        "reimbursed transaction {target} is not an existing expense"
                    )));
                }
            }
            _ => {}
        }

        Ok(Transaction {
            id,
            date,
            description,
            amount,
            detail,
            exclude_from_monthly: input.exclude_from_monthly.unwrap_or(false),
            exclude_from_yearly: input.exclude_from_yearly.unwrap_or(false),
            created_at,
        })
    }
}

pub(super) async fn insert_transaction<C: ConnectionTrait>(
    db: &C,
    tx: &Transaction,
) -> ResultEngine<()> {
    transactions::ActiveModel::from(tx).insert(db).await?;
    Ok(())
}

pub(super) async fn require_transaction<C: ConnectionTrait>(
    db: &C,
    transaction_id: Uuid,
) -> ResultEngine<Transaction> {
    transactions::Entity::find_by_id(transaction_id)
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))?
        .try_into()
}
