//! The module contains `SavingsGoal` and its table.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, MoneyCents, ResultEngine, SavingsTransfer,
    util::{impl_str_enum, parse_uuid},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Active,
    Completed,
    Purchased,
    Cancelled,
    Paused,
}

impl_str_enum!(GoalStatus, "goal status", {
    Active => "active",
    Completed => "completed",
    Purchased => "purchased",
    Cancelled => "cancelled",
    Paused => "paused",
});

impl GoalStatus {
    /// Whether the goal still accepts deposits.
    pub fn accepts_deposits(self) -> bool {
        !matches!(self, Self::Purchased | Self::Cancelled)
    }
}

/// A named target a child saves toward.
///
/// `current_amount` is the running sum of the goal's contributions.
#[derive(Clone, Debug, PartialEq)]
pub struct SavingsGoal {
    pub id: Uuid,
    pub child_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub target_amount: MoneyCents,
    pub current_amount: MoneyCents,
    pub status: GoalStatus,
    /// Lower value is served first by auto-transfers.
    pub priority: i32,
    pub auto_transfer: SavingsTransfer,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub purchased_at: Option<DateTime<Utc>>,
}

impl SavingsGoal {
    pub fn new(
        child_id: Uuid,
        name: String,
        description: Option<String>,
        target_amount: MoneyCents,
        priority: i32,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if !target_amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "goal target must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            child_id,
            name,
            description,
            target_amount,
            current_amount: MoneyCents::ZERO,
            status: GoalStatus::Active,
            priority,
            auto_transfer: SavingsTransfer::None,
            created_at,
            completed_at: None,
            purchased_at: None,
        })
    }

    /// Amount still missing to reach the target.
    pub fn remaining(&self) -> MoneyCents {
        (self.target_amount - self.current_amount).max(MoneyCents::ZERO)
    }

    /// Progress in whole percent, capped at 100.
    pub fn progress_percent(&self) -> i64 {
        if !self.target_amount.is_positive() {
            return 0;
        }
        let current = i128::from(self.current_amount.cents().max(0));
        let target = i128::from(self.target_amount.cents());
        i64::try_from((current * 100 / target).min(100)).unwrap_or(100)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "savings_goals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub child_id: String,
    pub name: String,
    pub description: Option<String>,
    pub target_amount_minor: i64,
    pub current_amount_minor: i64,
    pub status: String,
    pub priority: i32,
    pub auto_transfer_type: String,
    pub auto_transfer_amount_minor: i64,
    pub auto_transfer_percentage: String,
    pub created_at: DateTimeUtc,
    pub completed_at: Option<DateTimeUtc>,
    pub purchased_at: Option<DateTimeUtc>,
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
    #[sea_orm(has_many = "super::contributions::Entity")]
    Contributions,
    #[sea_orm(has_many = "super::milestones::Entity")]
    Milestones,
}

impl Related<super::children::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Child.def()
    }
}

impl Related<super::contributions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contributions.def()
    }
}

impl Related<super::milestones::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Milestones.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&SavingsGoal> for ActiveModel {
    fn from(goal: &SavingsGoal) -> Self {
        let (kind, amount_minor, percentage) = goal.auto_transfer.to_parts();
        Self {
            id: ActiveValue::Set(goal.id.to_string()),
            child_id: ActiveValue::Set(goal.child_id.to_string()),
            name: ActiveValue::Set(goal.name.clone()),
            description: ActiveValue::Set(goal.description.clone()),
            target_amount_minor: ActiveValue::Set(goal.target_amount.cents()),
            current_amount_minor: ActiveValue::Set(goal.current_amount.cents()),
            status: ActiveValue::Set(goal.status.as_str().to_string()),
            priority: ActiveValue::Set(goal.priority),
            auto_transfer_type: ActiveValue::Set(kind.as_str().to_string()),
            auto_transfer_amount_minor: ActiveValue::Set(amount_minor),
            auto_transfer_percentage: ActiveValue::Set(percentage),
            created_at: ActiveValue::Set(goal.created_at),
            completed_at: ActiveValue::Set(goal.completed_at),
            purchased_at: ActiveValue::Set(goal.purchased_at),
        }
    }
}

impl TryFrom<Model> for SavingsGoal {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "goal")?,
            child_id: parse_uuid(&model.child_id, "child")?,
            name: model.name,
            description: model.description,
            target_amount: MoneyCents::new(model.target_amount_minor),
            current_amount: MoneyCents::new(model.current_amount_minor),
            status: GoalStatus::try_from(model.status.as_str())?,
            priority: model.priority,
            auto_transfer: SavingsTransfer::from_parts(
                &model.auto_transfer_type,
                model.auto_transfer_amount_minor,
                &model.auto_transfer_percentage,
            )?,
            created_at: model.created_at,
            completed_at: model.completed_at,
            purchased_at: model.purchased_at,
        })
    }
}
