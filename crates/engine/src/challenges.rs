//! Time-boxed savings challenges.
//!
//! A challenge asks the child to add `target_amount` to the goal between
//! `start_date` and `end_date`; meeting it pays `bonus_amount`.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, MoneyCents, ResultEngine, SavingsGoal,
    util::{impl_str_enum, parse_uuid},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeStatus {
    Active,
    Completed,
    Expired,
    Cancelled,
}

impl_str_enum!(ChallengeStatus, "challenge status", {
    Active => "active",
    Completed => "completed",
    Expired => "expired",
    Cancelled => "cancelled",
});

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GoalChallenge {
    pub id: Uuid,
    pub goal_id: Uuid,
    pub target_amount: MoneyCents,
    pub bonus_amount: MoneyCents,
    /// Goal `current_amount` when the challenge started.
    pub start_amount: MoneyCents,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: ChallengeStatus,
    pub completed_at: Option<DateTime<Utc>>,
}

impl GoalChallenge {
    pub fn new(
        goal: &SavingsGoal,
        target_amount: MoneyCents,
        bonus_amount: MoneyCents,
        end_date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if !target_amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "challenge target must be > 0".to_string(),
            ));
        }
        if bonus_amount.is_negative() {
            return Err(EngineError::InvalidAmount(
                "challenge bonus must be >= 0".to_string(),
            ));
        }
        if end_date <= now {
            return Err(EngineError::InvalidState(
                "challenge end date must be in the future".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            goal_id: goal.id,
            target_amount,
            bonus_amount,
            start_amount: goal.current_amount,
            start_date: now,
            end_date,
            status: ChallengeStatus::Active,
            completed_at: None,
        })
    }

    /// Active but past its end date. Computed, the stored status only changes
    /// when the engine expires it.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == ChallengeStatus::Active && now > self.end_date
    }

    /// Amount saved since the challenge started.
    pub fn progress(&self, goal_current: MoneyCents) -> MoneyCents {
        goal_current
            .checked_sub(self.start_amount)
            .unwrap_or(MoneyCents::ZERO)
            .max(MoneyCents::ZERO)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "goal_challenges")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub goal_id: String,
    pub target_amount_minor: i64,
    pub bonus_amount_minor: i64,
    pub start_amount_minor: i64,
    pub start_date: DateTimeUtc,
    pub end_date: DateTimeUtc,
    pub status: String,
    pub completed_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::savings_goals::Entity",
        from = "Column::GoalId",
        to = "super::savings_goals::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Goal,
}

impl Related<super::savings_goals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Goal.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&GoalChallenge> for ActiveModel {
    fn from(challenge: &GoalChallenge) -> Self {
        Self {
            id: ActiveValue::Set(challenge.id.to_string()),
            goal_id: ActiveValue::Set(challenge.goal_id.to_string()),
            target_amount_minor: ActiveValue::Set(challenge.target_amount.cents()),
            bonus_amount_minor: ActiveValue::Set(challenge.bonus_amount.cents()),
            start_amount_minor: ActiveValue::Set(challenge.start_amount.cents()),
            start_date: ActiveValue::Set(challenge.start_date),
            end_date: ActiveValue::Set(challenge.end_date),
            status: ActiveValue::Set(challenge.status.as_str().to_string()),
            completed_at: ActiveValue::Set(challenge.completed_at),
        }
    }
}

impl TryFrom<Model> for GoalChallenge {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "challenge")?,
            goal_id: parse_uuid(&model.goal_id, "goal")?,
            target_amount: MoneyCents::new(model.target_amount_minor),
            bonus_amount: MoneyCents::new(model.bonus_amount_minor),
            start_amount: MoneyCents::new(model.start_amount_minor),
            start_date: model.start_date,
            end_date: model.end_date,
            status: ChallengeStatus::try_from(model.status.as_str())?,
            completed_at: model.completed_at,
        })
    }
}
