use sea_orm::{DatabaseTransaction, QueryFilter, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{
    Child, EngineError, GoalAggregate, GoalChallenge, GoalMilestone, ParentMatchingRule,
    ResultEngine, SavingsGoal, User, UserRole, challenges, children, matching_rules, milestones,
    savings_goals, users,
};

use super::Engine;

/// What a caller wants to do with a child's data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum AccessLevel {
    /// View balances, goals and history.
    Read,
    /// Operations a child may run on their own account: deposits into and
    /// withdrawals from their goals, recording their own spending.
    Contribute,
    /// Parent-only configuration and money movements.
    Manage,
}

impl Engine {
    pub(super) async fn require_user(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<User> {
        let model = users::Entity::find_by_id(user_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("user {user_id}")))?;
        User::try_from(model)
    }

    pub(super) async fn require_parent(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<(User, Uuid)> {
        let user = self.require_user(db, user_id).await?;
        if !user.is_parent() {
            return Err(EngineError::Forbidden(format!(
                "{user_id} is not a parent"
            )));
        }
        let family_id = user.family_id.ok_or_else(|| {
            EngineError::InvalidState(format!("{user_id} does not belong to a family"))
        })?;
        Ok((user, family_id))
    }

    /// Loads a child without access checks, for scheduled jobs.
    pub(super) async fn load_child(
        &self,
        db: &DatabaseTransaction,
        child_id: Uuid,
    ) -> ResultEngine<Child> {
        let model = children::Entity::find_by_id(child_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("child {child_id}")))?;
        Child::try_from(model)
    }

    /// Loads a child and checks that `user_id` may access it at `level`.
    ///
    /// Parents may do anything within their family. A child user may read
    /// and contribute on the child record linked to their login.
    pub(super) async fn require_child(
        &self,
        db: &DatabaseTransaction,
        child_id: Uuid,
        user_id: &str,
        level: AccessLevel,
    ) -> ResultEngine<(Child, User)> {
        let user = self.require_user(db, user_id).await?;
        let child = self.load_child(db, child_id).await?;

        let allowed = match user.role {
            UserRole::Parent => user.family_id == Some(child.family_id),
            UserRole::Child => {
                child.user_id.as_deref() == Some(user.username.as_str())
                    && level != AccessLevel::Manage
            }
        };
        if !allowed {
            return Err(EngineError::Forbidden(format!(
                "{user_id} cannot access child {child_id}"
            )));
        }
        Ok((child, user))
    }

    /// Like [`Engine::require_child`], and also requires an active child.
    pub(super) async fn require_active_child(
        &self,
        db: &DatabaseTransaction,
        child_id: Uuid,
        user_id: &str,
        level: AccessLevel,
    ) -> ResultEngine<(Child, User)> {
        let (child, user) = self.require_child(db, child_id, user_id, level).await?;
        if !child.is_active {
            return Err(EngineError::InvalidState(format!(
                "{} is deactivated",
                child.name
            )));
        }
        Ok((child, user))
    }

    /// Loads a goal, its owner and checks access on the owner.
    pub(super) async fn require_goal(
        &self,
        db: &DatabaseTransaction,
        goal_id: Uuid,
        user_id: &str,
        level: AccessLevel,
    ) -> ResultEngine<(SavingsGoal, Child, User)> {
        let model = savings_goals::Entity::find_by_id(goal_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("goal {goal_id}")))?;
        let goal = SavingsGoal::try_from(model)?;
        let (child, user) = self
            .require_child(db, goal.child_id, user_id, level)
            .await?;
        Ok((goal, child, user))
    }

    /// Loads the matching rule, milestones and latest challenge of `goal`.
    pub(super) async fn load_goal_aggregate(
        &self,
        db: &DatabaseTransaction,
        goal: SavingsGoal,
    ) -> ResultEngine<GoalAggregate> {
        let goal_id = goal.id.to_string();

        let matching_rule = matching_rules::Entity::find()
            .filter(matching_rules::Column::GoalId.eq(goal_id.clone()))
            .one(db)
            .await?
            .map(ParentMatchingRule::try_from)
            .transpose()?;

        let milestones = milestones::Entity::find()
            .filter(milestones::Column::GoalId.eq(goal_id.clone()))
            .order_by_asc(milestones::Column::Percentage)
            .all(db)
            .await?
            .into_iter()
            .map(GoalMilestone::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;

        let challenge = challenges::Entity::find()
            .filter(challenges::Column::GoalId.eq(goal_id))
            .order_by_desc(challenges::Column::StartDate)
            .one(db)
            .await?
            .map(GoalChallenge::try_from)
            .transpose()?;

        Ok(GoalAggregate::new(goal, matching_rule, milestones, challenge))
    }
}
