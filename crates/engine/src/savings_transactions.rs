//! Savings-balance ledger, the account-level mirror of goal contributions.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, MoneyCents,
    util::{impl_str_enum, parse_optional_uuid, parse_uuid},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SavingsTransactionKind {
    Deposit,
    Withdrawal,
}

impl_str_enum!(SavingsTransactionKind, "savings transaction kind", {
    Deposit => "deposit",
    Withdrawal => "withdrawal",
});

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SavingsTransaction {
    pub id: Uuid,
    pub child_id: Uuid,
    pub kind: SavingsTransactionKind,
    /// Signed: deposits positive, withdrawals negative.
    pub amount: MoneyCents,
    pub balance_after: MoneyCents,
    pub is_automatic: bool,
    /// Spending-ledger row that caused an automatic sweep.
    pub source_transaction_id: Option<Uuid>,
    pub description: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl SavingsTransaction {
    pub(crate) fn new(
        child_id: Uuid,
        amount: MoneyCents,
        balance_after: MoneyCents,
        is_automatic: bool,
        source_transaction_id: Option<Uuid>,
        description: Option<String>,
        created_by: &str,
        created_at: DateTime<Utc>,
    ) -> Self {
        let kind = if amount.is_negative() {
            SavingsTransactionKind::Withdrawal
        } else {
            SavingsTransactionKind::Deposit
        };
        Self {
            id: Uuid::new_v4(),
            child_id,
            kind,
            amount,
            balance_after,
            is_automatic,
            source_transaction_id,
            description,
            created_by: created_by.to_string(),
            created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "savings_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub child_id: String,
    pub kind: String,
    pub amount_minor: i64,
    pub balance_after_minor: i64,
    pub is_automatic: bool,
    pub source_transaction_id: Option<String>,
    pub description: Option<String>,
    pub created_by: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::children::Entity",
        from = "Column::ChildId",
        to = "super::children::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Child,
}

impl Related<super::children::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Child.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&SavingsTransaction> for ActiveModel {
    fn from(tx: &SavingsTransaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            child_id: ActiveValue::Set(tx.child_id.to_string()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            amount_minor: ActiveValue::Set(tx.amount.cents()),
            balance_after_minor: ActiveValue::Set(tx.balance_after.cents()),
            is_automatic: ActiveValue::Set(tx.is_automatic),
            source_transaction_id: ActiveValue::Set(
                tx.source_transaction_id.map(|id| id.to_string()),
            ),
            description: ActiveValue::Set(tx.description.clone()),
            created_by: ActiveValue::Set(tx.created_by.clone()),
            created_at: ActiveValue::Set(tx.created_at),
        }
    }
}

impl TryFrom<Model> for SavingsTransaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "savings transaction")?,
            child_id: parse_uuid(&model.child_id, "child")?,
            kind: SavingsTransactionKind::try_from(model.kind.as_str())?,
            amount: MoneyCents::new(model.amount_minor),
            balance_after: MoneyCents::new(model.balance_after_minor),
            is_automatic: model.is_automatic,
            source_transaction_id: parse_optional_uuid(
                model.source_transaction_id.as_deref(),
                "transaction",
            )?,
            description: model.description,
            created_by: model.created_by,
            created_at: model.created_at,
        })
    }
}
