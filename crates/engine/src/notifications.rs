//! User-facing notifications appended by engine operations.
//!
//! Delivery is someone else's job: the engine only records what happened.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError,
    util::{impl_str_enum, parse_uuid},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    AllowancePaid,
    SavingsTransfer,
    MilestoneAchieved,
    GoalCompleted,
    ParentMatch,
    ChallengeCompleted,
    ChallengeExpired,
    BudgetWarning,
}

impl_str_enum!(NotificationKind, "notification kind", {
    AllowancePaid => "allowance_paid",
    SavingsTransfer => "savings_transfer",
    MilestoneAchieved => "milestone_achieved",
    GoalCompleted => "goal_completed",
    ParentMatch => "parent_match",
    ChallengeCompleted => "challenge_completed",
    ChallengeExpired => "challenge_expired",
    BudgetWarning => "budget_warning",
});

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub id: Uuid,
    pub family_id: Uuid,
    pub child_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        family_id: Uuid,
        child_id: Uuid,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            family_id,
            child_id,
            kind,
            title: title.into(),
            message: message.into(),
            is_read: false,
            created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub family_id: String,
    pub child_id: String,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub is_read: bool,
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

impl From<&Notification> for ActiveModel {
    fn from(notification: &Notification) -> Self {
        Self {
            id: ActiveValue::Set(notification.id.to_string()),
            family_id: ActiveValue::Set(notification.family_id.to_string()),
            child_id: ActiveValue::Set(notification.child_id.to_string()),
            kind: ActiveValue::Set(notification.kind.as_str().to_string()),
            title: ActiveValue::Set(notification.title.clone()),
            message: ActiveValue::Set(notification.message.clone()),
            is_read: ActiveValue::Set(notification.is_read),
            created_at: ActiveValue::Set(notification.created_at),
        }
    }
}

impl TryFrom<Model> for Notification {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "notification")?,
            family_id: parse_uuid(&model.family_id, "family")?,
            child_id: parse_uuid(&model.child_id, "child")?,
            kind: NotificationKind::try_from(model.kind.as_str())?,
            title: model.title,
            message: model.message,
            is_read: model.is_read,
            created_at: model.created_at,
        })
    }
}
