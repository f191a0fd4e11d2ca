//! Percentage checkpoints on a savings goal.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, SavingsGoal, util::parse_uuid};

/// Milestones seeded on every new goal.
pub const DEFAULT_MILESTONE_PERCENTAGES: [i32; 4] = [25, 50, 75, 100];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GoalMilestone {
    pub id: Uuid,
    pub goal_id: Uuid,
    pub percentage: i32,
    /// `percentage`% of the goal target.
    pub target_amount: MoneyCents,
    /// Set once, never cleared.
    pub is_achieved: bool,
    pub achieved_at: Option<DateTime<Utc>>,
    /// Paid as a `ChallengeBonus` contribution when reached.
    pub bonus_amount: Option<MoneyCents>,
}

impl GoalMilestone {
    pub fn new(goal: &SavingsGoal, percentage: i32, bonus_amount: Option<MoneyCents>) -> Self {
        Self {
            id: Uuid::new_v4(),
            goal_id: goal.id,
            percentage,
            target_amount: target_for(goal.target_amount, percentage),
            is_achieved: false,
            achieved_at: None,
            bonus_amount,
        }
    }

    /// Re-derives the threshold after the goal target changed. Achieved
    /// milestones keep their original threshold.
    pub fn retarget(&mut self, goal_target: MoneyCents) {
        if !self.is_achieved {
            self.target_amount = target_for(goal_target, self.percentage);
        }
    }
}

fn target_for(goal_target: MoneyCents, percentage: i32) -> MoneyCents {
    goal_target.percent(Decimal::from(percentage))
}

pub fn default_milestones(goal: &SavingsGoal) -> Vec<GoalMilestone> {
    DEFAULT_MILESTONE_PERCENTAGES
        .iter()
        .map(|percentage| GoalMilestone::new(goal, *percentage, None))
        .collect()
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "goal_milestones")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub goal_id: String,
    pub percentage: i32,
    pub target_amount_minor: i64,
    pub is_achieved: bool,
    pub achieved_at: Option<DateTimeUtc>,
    pub bonus_amount_minor: Option<i64>,
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

impl From<&GoalMilestone> for ActiveModel {
    fn from(milestone: &GoalMilestone) -> Self {
        Self {
            id: ActiveValue::Set(milestone.id.to_string()),
            goal_id: ActiveValue::Set(milestone.goal_id.to_string()),
            percentage: ActiveValue::Set(milestone.percentage),
            target_amount_minor: ActiveValue::Set(milestone.target_amount.cents()),
            is_achieved: ActiveValue::Set(milestone.is_achieved),
            achieved_at: ActiveValue::Set(milestone.achieved_at),
            bonus_amount_minor: ActiveValue::Set(milestone.bonus_amount.map(MoneyCents::cents)),
        }
    }
}

impl TryFrom<Model> for GoalMilestone {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "milestone")?,
            goal_id: parse_uuid(&model.goal_id, "goal")?,
            percentage: model.percentage,
            target_amount: MoneyCents::new(model.target_amount_minor),
            is_achieved: model.is_achieved,
            achieved_at: model.achieved_at,
            bonus_amount: model.bonus_amount_minor.map(MoneyCents::new),
        })
    }
}
