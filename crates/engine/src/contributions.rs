//! Goal contributions: the append-only ledger behind
//! `SavingsGoal::current_amount`.

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
pub enum ContributionKind {
    ChildDeposit,
    AutoTransfer,
    ParentMatch,
    ParentGift,
    ChallengeBonus,
    Withdrawal,
    ExternalGift,
}

impl_str_enum!(ContributionKind, "contribution kind", {
    ChildDeposit => "child_deposit",
    AutoTransfer => "auto_transfer",
    ParentMatch => "parent_match",
    ParentGift => "parent_gift",
    ChallengeBonus => "challenge_bonus",
    Withdrawal => "withdrawal",
    ExternalGift => "external_gift",
});

impl ContributionKind {
    /// Kinds only the engine itself creates.
    pub fn is_system(self) -> bool {
        matches!(
            self,
            Self::AutoTransfer | Self::ParentMatch | Self::ChallengeBonus | Self::Withdrawal
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SavingsContribution {
    pub id: Uuid,
    pub goal_id: Uuid,
    pub child_id: Uuid,
    /// Signed: withdrawals are negative.
    pub amount: MoneyCents,
    pub kind: ContributionKind,
    /// `current_amount` of the goal right after this row.
    pub goal_balance_after: MoneyCents,
    pub source_transaction_id: Option<Uuid>,
    /// For `ParentMatch` rows, the contribution being matched.
    pub parent_match_id: Option<Uuid>,
    pub description: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "savings_contributions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub goal_id: String,
    pub child_id: String,
    pub amount_minor: i64,
    pub kind: String,
    pub goal_balance_after_minor: i64,
    pub source_transaction_id: Option<String>,
    pub parent_match_id: Option<String>,
    pub description: Option<String>,
    pub created_by: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::savings_goals::Entity",
        from = "Column::GoalId",
        to = "super::savings_goals::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Goal,
}

impl Related<super::savings_goals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Goal.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&SavingsContribution> for ActiveModel {
    fn from(row: &SavingsContribution) -> Self {
        Self {
            id: ActiveValue::Set(row.id.to_string()),
            goal_id: ActiveValue::Set(row.goal_id.to_string()),
            child_id: ActiveValue::Set(row.child_id.to_string()),
            amount_minor: ActiveValue::Set(row.amount.cents()),
            kind: ActiveValue::Set(row.kind.as_str().to_string()),
            goal_balance_after_minor: ActiveValue::Set(row.goal_balance_after.cents()),
            source_transaction_id: ActiveValue::Set(
                row.source_transaction_id.map(|id| id.to_string()),
            ),
            parent_match_id: ActiveValue::Set(row.parent_match_id.map(|id| id.to_string())),
            description: ActiveValue::Set(row.description.clone()),
            created_by: ActiveValue::Set(row.created_by.clone()),
            created_at: ActiveValue::Set(row.created_at),
        }
    }
}

impl TryFrom<Model> for SavingsContribution {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "contribution")?,
            goal_id: parse_uuid(&model.goal_id, "goal")?,
            child_id: parse_uuid(&model.child_id, "child")?,
            amount: MoneyCents::new(model.amount_minor),
            kind: ContributionKind::try_from(model.kind.as_str())?,
            goal_balance_after: MoneyCents::new(model.goal_balance_after_minor),
            source_transaction_id: parse_optional_uuid(
                model.source_transaction_id.as_deref(),
                "transaction",
            )?,
            parent_match_id: parse_optional_uuid(model.parent_match_id.as_deref(), "contribution")?,
            description: model.description,
            created_by: model.created_by,
            created_at: model.created_at,
        })
    }
}
