//! Spending-balance ledger.
//!
//! Every change of `Child::current_balance` appends one row here; rows are
//! never updated or deleted.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, MoneyCents, ResultEngine,
    util::{impl_str_enum, parse_uuid},
};

/// Category used for the automatic savings sweep.
pub const SAVINGS_CATEGORY: &str = "Savings";
/// Category used for transfers into savings goals.
pub const GOAL_CATEGORY: &str = "Savings Goal";
/// Category used for allowance payments.
pub const ALLOWANCE_CATEGORY: &str = "Allowance";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Credit,
    Debit,
}

impl_str_enum!(TransactionKind, "transaction kind", {
    Credit => "credit",
    Debit => "debit",
});

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub id: Uuid,
    pub child_id: Uuid,
    pub kind: TransactionKind,
    /// Always positive; the sign comes from `kind`.
    pub amount: MoneyCents,
    pub category: String,
    pub category_norm: String,
    pub description: Option<String>,
    pub balance_after: MoneyCents,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub(crate) fn new(
        child_id: Uuid,
        kind: TransactionKind,
        amount: MoneyCents,
        category: &str,
        description: Option<String>,
        balance_after: MoneyCents,
        created_by: &str,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "transaction amount must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            child_id,
            kind,
            amount,
            category: category.trim().to_string(),
            category_norm: crate::util::normalize_category(category)?,
            description,
            balance_after,
            created_by: created_by.to_string(),
            created_at,
        })
    }

    /// Amount with the sign applied to the spending balance.
    pub fn signed_amount(&self) -> MoneyCents {
        match self.kind {
            TransactionKind::Credit => self.amount,
            TransactionKind::Debit => -self.amount,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub child_id: String,
    pub kind: String,
    pub amount_minor: i64,
    pub category: String,
    pub category_norm: String,
    pub description: Option<String>,
    pub balance_after_minor: i64,
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

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            child_id: ActiveValue::Set(tx.child_id.to_string()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            amount_minor: ActiveValue::Set(tx.amount.cents()),
            category: ActiveValue::Set(tx.category.clone()),
            category_norm: ActiveValue::Set(tx.category_norm.clone()),
            description: ActiveValue::Set(tx.description.clone()),
            balance_after_minor: ActiveValue::Set(tx.balance_after.cents()),
            created_by: ActiveValue::Set(tx.created_by.clone()),
            created_at: ActiveValue::Set(tx.created_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "transaction")?,
            child_id: parse_uuid(&model.child_id, "child")?,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            amount: MoneyCents::new(model.amount_minor),
            category: model.category,
            category_norm: model.category_norm,
            description: model.description,
            balance_after: MoneyCents::new(model.balance_after_minor),
            created_by: model.created_by,
            created_at: model.created_at,
        })
    }
}
