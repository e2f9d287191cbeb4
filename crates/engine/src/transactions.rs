//! Confirmed ledger entries.
//!
//! A [`Transaction`] stores its type-specific fields in a [`TransactionDetail`]
//! variant, so an income can never carry a category and an expense can never
//! point at another transaction. The table row is flat; the mapping happens in
//! the `From`/`TryFrom` conversions at the bottom of this module.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Household, Money, ResultEngine, TransactionInput};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Expense,
    Income,
    Settlement,
    Reimbursement,
}

impl TransactionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Income => "income",
            Self::Settlement => "settlement",
            Self::Reimbursement => "reimbursement",
        }
    }
}

impl TryFrom<&str> for TransactionType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "expense" => Ok(Self::Expense),
            "income" => Ok(Self::Income),
            "settlement" => Ok(Self::Settlement),
            "reimbursement" => Ok(Self::Reimbursement),
            other => Err(EngineError::Validation(format!(
                "invalid transaction type: {other}"
            ))),
        }
    }
}

/// How an expense is allocated between the two users.
///
/// Values read back from storage that are not one of the known rules become
/// [`SplitType::Other`]; the aggregator gives them zero weight instead of
/// failing.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SplitType {
    #[serde(rename = "splitEqually")]
    SplitEqually,
    #[serde(rename = "user1_only")]
    User1Only,
    #[serde(rename = "user2_only")]
    User2Only,
    #[serde(untagged)]
    Other(String),
}

impl SplitType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::SplitEqually => "splitEqually",
            Self::User1Only => "user1_only",
            Self::User2Only => "user2_only",
            Self::Other(raw) => raw.as_str(),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<&str> for SplitType {
    fn from(value: &str) -> Self {
        match value {
            "splitEqually" => Self::SplitEqually,
            "user1_only" => Self::User1Only,
            "user2_only" => Self::User2Only,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Type-specific part of a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "transaction_type", rename_all = "snake_case")]
pub enum TransactionDetail {
    Expense {
        category_id: Uuid,
        split_type: SplitType,
        /// A household user or [`crate::SHARED_PAYER`].
        paid_by: String,
    },
    Income {
        paid_to: String,
    },
    Settlement {
        paid_by: String,
        paid_to: String,
    },
    Reimbursement {
        paid_to: String,
        reimburses_transaction_id: Option<Uuid>,
    },
}

impl TransactionDetail {
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            Self::Expense { .. } => TransactionType::Expense,
            Self::Income { .. } => TransactionType::Income,
            Self::Settlement { .. } => TransactionType::Settlement,
            Self::Reimbursement { .. } => TransactionType::Reimbursement,
        }
    }

    /// Validates the flat form fields for `transaction_type` and keeps only
    /// the ones that type uses.
    ///
    /// Existence of the referenced category / expense is checked against the
    /// store by the caller.
    pub(crate) fn from_input(
        transaction_type: TransactionType,
        input: &TransactionInput,
        household: &Household,
    ) -> ResultEngine<Self> {
        let required = |value: &Option<String>, field: &str| -> ResultEngine<String> {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(ToString::to_string)
                .ok_or_else(|| {
                    EngineError::Validation(format!(
                        "{field} is required for {} transactions",
                        transaction_type.as_str()
                    ))
                })
        };

        match transaction_type {
            TransactionType::Expense => {
                let category_id = input.category_id.ok_or_else(|| {
                    EngineError::Validation(
                        "category_id is required for expense transactions".to_string(),
                    )
                })?;
                let split_type = input.split_type.clone().ok_or_else(|| {
                    EngineError::Validation(
                        "split_type is required for expense transactions".to_string(),
                    )
                })?;
                if !split_type.is_known() {
                    return Err(EngineError::Validation(format!(
                        "invalid split_type: {}",
                        split_type.as_str()
                    )));
                }
                let paid_by = required(&input.paid_by, "paid_by")?;
                household.require_payer(&paid_by)?;
                Ok(Self::Expense {
                    category_id,
                    split_type,
                    paid_by,
                })
            }
            TransactionType::Income => {
                let paid_to = required(&input.paid_to, "paid_to")?;
                household.require_member(&paid_to, "paid_to")?;
                Ok(Self::Income { paid_to })
            }
            TransactionType::Settlement => {
                let paid_by = required(&input.paid_by, "paid_by")?;
                let paid_to = required(&input.paid_to, "paid_to")?;
                household.require_member(&paid_by, "paid_by")?;
                household.require_member(&paid_to, "paid_to")?;
                if paid_by == paid_to {
                    return Err(EngineError::Validation(
                        "settlement payer and receiver must differ".to_string(),
                    ));
                }
                Ok(Self::Settlement { paid_by, paid_to })
            }
            TransactionType::Reimbursement => {
                let paid_to = required(&input.paid_to, "paid_to")?;
                household.require_member(&paid_to, "paid_to")?;
                Ok(Self::Reimbursement {
                    paid_to,
                    reimburses_transaction_id: input.reimburses_transaction_id,
                })
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Money,
    #[serde(flatten)]
    pub detail: TransactionDetail,
    pub exclude_from_monthly: bool,
    pub exclude_from_yearly: bool,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn transaction_type(&self) -> TransactionType {
        self.detail.transaction_type()
    }

    pub fn category_id(&self) -> Option<Uuid> {
        match &self.detail {
            TransactionDetail::Expense { category_id, .. } => Some(*category_id),
            _ => None,
        }
    }

    pub fn reimburses(&self) -> Option<Uuid> {
        match &self.detail {
            TransactionDetail::Reimbursement {
                reimburses_transaction_id,
                ..
            } => *reimburses_transaction_id,
            _ => None,
        }
    }

    /// Current values in entry-form shape, used as the base of a patch.
    pub fn as_input(&self) -> TransactionInput {
        let mut input = TransactionInput::new(
            self.date,
            self.description.clone(),
            self.amount,
            self.transaction_type(),
        )
        .excluded(self.exclude_from_monthly, self.exclude_from_yearly);
        match &self.detail {
            TransactionDetail::Expense {
                category_id,
                split_type,
                paid_by,
            } => {
                input.category_id = Some(*category_id);
                input.split_type = Some(split_type.clone());
                input.paid_by = Some(paid_by.clone());
            }
            TransactionDetail::Income { paid_to } => input.paid_to = Some(paid_to.clone()),
            TransactionDetail::Settlement { paid_by, paid_to } => {
                input.paid_by = Some(paid_by.clone());
                input.paid_to = Some(paid_to.clone());
            }
            TransactionDetail::Reimbursement {
                paid_to,
                reimburses_transaction_id,
            } => {
                input.paid_to = Some(paid_to.clone());
                input.reimburses_transaction_id = *reimburses_transaction_id;
            }
        }
        input
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub date: Date,
    pub description: String,
    pub amount_minor: i64,
    pub kind: String,
    pub category_id: Option<Uuid>,
    pub split_type: Option<String>,
    pub paid_by: Option<String>,
    pub paid_to: Option<String>,
    pub reimburses_transaction_id: Option<Uuid>,
    pub exclude_from_monthly: bool,
    pub exclude_from_yearly: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Category,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        let (category_id, split_type, paid_by, paid_to, reimburses) = match &tx.detail {
            TransactionDetail::Expense {
                category_id,
                split_type,
                paid_by,
            } => (
                Some(*category_id),
                Some(split_type.as_str().to_string()),
                Some(paid_by.clone()),
                None,
                None,
            ),
            TransactionDetail::Income { paid_to } => (None, None, None, Some(paid_to.clone()), None),
            TransactionDetail::Settlement { paid_by, paid_to } => (
                None,
                None,
                Some(paid_by.clone()),
                Some(paid_to.clone()),
                None,
            ),
            TransactionDetail::Reimbursement {
                paid_to,
                reimburses_transaction_id,
            } => (
                None,
                None,
                None,
                Some(paid_to.clone()),
                *reimburses_transaction_id,
            ),
        };

        Self {
            id: ActiveValue::Set(tx.id),
            date: ActiveValue::Set(tx.date),
            description: ActiveValue::Set(tx.description.clone()),
            amount_minor: ActiveValue::Set(tx.amount.cents()),
            kind: ActiveValue::Set(tx.transaction_type().as_str().to_string()),
            category_id: ActiveValue::Set(category_id),
            split_type: ActiveValue::Set(split_type),
            paid_by: ActiveValue::Set(paid_by),
            paid_to: ActiveValue::Set(paid_to),
            reimburses_transaction_id: ActiveValue::Set(reimburses),
            exclude_from_monthly: ActiveValue::Set(tx.exclude_from_monthly),
            exclude_from_yearly: ActiveValue::Set(tx.exclude_from_yearly),
            created_at: ActiveValue::Set(tx.created_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let id = model.id;
        let missing = |field: &str| {
            EngineError::Validation(format!("stored transaction {id} is missing {field}"))
        };

        let detail = match TransactionType::try_from(model.kind.as_str())? {
            TransactionType::Expense => TransactionDetail::Expense {
                category_id: model.category_id.ok_or_else(|| missing("category_id"))?,
                split_type: model
                    .split_type
                    .as_deref()
                    .map(SplitType::from)
                    .ok_or_else(|| missing("split_type"))?,
                paid_by: model.paid_by.ok_or_else(|| missing("paid_by"))?,
            },
            TransactionType::Income => TransactionDetail::Income {
                paid_to: model.paid_to.ok_or_else(|| missing("paid_to"))?,
            },
            TransactionType::Settlement => TransactionDetail::Settlement {
                paid_by: model.paid_by.ok_or_else(|| missing("paid_by"))?,
                paid_to: model.paid_to.ok_or_else(|| missing("paid_to"))?,
            },
            TransactionType::Reimbursement => TransactionDetail::Reimbursement {
                paid_to: model.paid_to.ok_or_else(|| missing("paid_to"))?,
                reimburses_transaction_id: model.reimburses_transaction_id,
            },
        };

        Ok(Self {
            id,
            date: model.date,
            description: model.description,
            amount: Money::new(model.amount_minor),
            detail,
            exclude_from_monthly: model.exclude_from_monthly,
            exclude_from_yearly: model.exclude_from_yearly,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn household() -> Household {
        Household::new("Ana", "Ben").unwrap()
    }

    #[test]
    fn expense_requires_category_split_and_payer() {
        let input = TransactionInput::default();
        let err = TransactionDetail::from_input(TransactionType::Expense, &input, &household())
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::Validation("category_id is required for expense transactions".to_string())
        );

        let input = TransactionInput {
            category_id: Some(Uuid::new_v4()),
            split_type: Some(SplitType::SplitEqually),
            paid_by: Some("Shared".to_string()),
            paid_to: Some("Ana".to_string()),
            ..Default::default()
        };
        let detail =
            TransactionDetail::from_input(TransactionType::Expense, &input, &household()).unwrap();
        assert!(matches!(detail, TransactionDetail::Expense { ref paid_by, .. } if paid_by == "Shared"));
    }

    #[test]
    fn settlement_parties_must_differ() {
        let input = TransactionInput {
            paid_by: Some("Ana".to_string()),
            paid_to: Some("Ana".to_string()),
            ..Default::default()
        };
        assert!(
            TransactionDetail::from_input(TransactionType::Settlement, &input, &household())
                .is_err()
        );
    }

    #[test]
    fn unknown_split_rejected_on_entry_but_readable_from_storage() {
        let input = TransactionInput {
            category_id: Some(Uuid::new_v4()),
            split_type: Some(SplitType::from("thirds")),
            paid_by: Some("Ana".to_string()),
            ..Default::default()
        };
        assert!(
            TransactionDetail::from_input(TransactionType::Expense, &input, &household()).is_err()
        );

        let model = Model {
            id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            description: "Dinner".to_string(),
            amount_minor: 1000,
            kind: "expense".to_string(),
            category_id: Some(Uuid::new_v4()),
            split_type: Some("thirds".to_string()),
            paid_by: Some("Ana".to_string()),
            paid_to: None,
            reimburses_transaction_id: None,
            exclude_from_monthly: false,
            exclude_from_yearly: false,
            created_at: Utc::now(),
        };
        let tx = Transaction::try_from(model).unwrap();
        assert!(matches!(
            tx.detail,
            TransactionDetail::Expense { split_type: SplitType::Other(ref raw), .. } if raw == "thirds"
        ));
    }

    #[test]
    fn income_keeps_only_receiver() {
        let input = TransactionInput {
            category_id: Some(Uuid::new_v4()),
            paid_by: Some("Ben".to_string()),
            paid_to: Some("Ana".to_string()),
            ..Default::default()
        };
        let detail =
            TransactionDetail::from_input(TransactionType::Income, &input, &household()).unwrap();
        assert_eq!(
            detail,
            TransactionDetail::Income {
                paid_to: "Ana".to_string()
            }
        );
    }
}
