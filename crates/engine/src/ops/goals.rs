use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    ChallengeCmd, ChallengeEvent, ChallengeStatus, Child, ContributeCmd, ContributionKind,
    ContributionOutcome, EngineError, GOAL_CATEGORY, GoalAggregate, GoalChallenge, GoalMilestone,
    GoalStatus, MatchingRuleCmd, MoneyCents, NewContribution, NewGoalCmd, NotificationKind,
    ParentMatchingRule, ResultEngine, SavingsContribution, SavingsGoal, TransactionKind,
    UpdateGoalCmd, challenges, contributions, default_milestones, matching_rules, milestones,
    savings_goals,
    util::{normalize_optional_text, normalize_required_name},
};

use super::{AccessLevel, Engine, with_tx};

fn ensure_active_child(child: &Child) -> ResultEngine<()> {
    if !child.is_active {
        return Err(EngineError::InvalidState(format!(
            "{} is deactivated",
            child.name
        )));
    }
    Ok(())
}

impl Engine {
    /// Applies a deposit to a loaded goal and persists everything it
    /// produced.
    ///
    /// `ChildDeposit` and `AutoTransfer` are funded from the spending balance
    /// and append a debit row; the other kinds are new money. The caller
    /// persists the child balances.
    pub(super) async fn apply_contribution(
        &self,
        db: &DatabaseTransaction,
        agg: &mut GoalAggregate,
        child: &mut Child,
        mut new: NewContribution,
        now: DateTime<Utc>,
    ) -> ResultEngine<ContributionOutcome> {
        if matches!(
            new.kind,
            ContributionKind::ChildDeposit | ContributionKind::AutoTransfer
        ) {
            child.ensure_can_debit(new.amount)?;
            let debit = self
                .append_transaction(
                    db,
                    child,
                    TransactionKind::Debit,
                    new.amount,
                    GOAL_CATEGORY,
                    Some(format!("Deposit to {}", agg.goal.name)),
                    &new.created_by,
                    now,
                )
                .await?;
            new.source_transaction_id = Some(debit.id);
        }

        let outcome = agg.contribute(new, now)?;
        self.persist_outcome(db, agg, &outcome).await?;
        self.notify_outcome(db, child, agg, &outcome, now).await?;
        Ok(outcome)
    }

    async fn persist_outcome(
        &self,
        db: &DatabaseTransaction,
        agg: &GoalAggregate,
        outcome: &ContributionOutcome,
    ) -> ResultEngine<()> {
        for contribution in &outcome.contributions {
            let active: contributions::ActiveModel = contribution.into();
            active.insert(db).await?;
        }
        self.update_goal_row(db, &agg.goal).await?;

        if outcome.matched.is_positive()
            && let Some(rule) = &agg.matching_rule
        {
            let active = matching_rules::ActiveModel {
                id: ActiveValue::Set(rule.id.to_string()),
                total_matched_amount_minor: ActiveValue::Set(rule.total_matched_amount.cents()),
                ..Default::default()
            };
            active.update(db).await?;
        }

        for milestone in &outcome.achieved_milestones {
            self.update_milestone_row(db, milestone).await?;
        }

        if outcome.challenge_event.is_some()
            && let Some(challenge) = &agg.challenge
        {
            self.update_challenge_row(db, challenge).await?;
        }
        Ok(())
    }

    async fn notify_outcome(
        &self,
        db: &DatabaseTransaction,
        child: &Child,
        agg: &GoalAggregate,
        outcome: &ContributionOutcome,
        now: DateTime<Utc>,
    ) -> ResultEngine<()> {
        let goal = &agg.goal;
        if outcome.matched.is_positive() {
            self.notify(
                db,
                child,
                NotificationKind::ParentMatch,
                "Parent match",
                format!("{} matched on {}", outcome.matched, goal.name),
                now,
            )
            .await?;
        }
        for milestone in &outcome.achieved_milestones {
            tracing::info!(
                goal = %goal.id,
                percentage = milestone.percentage,
                "milestone achieved"
            );
            let message = match milestone.bonus_amount {
                Some(bonus) => format!(
                    "{} reached {}%, bonus {bonus}",
                    goal.name, milestone.percentage
                ),
                None => format!("{} reached {}%", goal.name, milestone.percentage),
            };
            self.notify(
                db,
                child,
                NotificationKind::MilestoneAchieved,
                "Milestone reached",
                message,
                now,
            )
            .await?;
        }
        if let Some(event) = &outcome.challenge_event {
            self.notify_challenge(db, child, goal, event, now).await?;
        }
        if outcome.goal_completed {
            self.notify_goal_completed(db, child, goal, now).await?;
        }
        Ok(())
    }

    async fn notify_challenge(
        &self,
        db: &DatabaseTransaction,
        child: &Child,
        goal: &SavingsGoal,
        event: &ChallengeEvent,
        now: DateTime<Utc>,
    ) -> ResultEngine<()> {
        match event {
            ChallengeEvent::Completed {
                challenge_id,
                bonus,
            } => {
                tracing::info!(goal = %goal.id, challenge = %challenge_id, "challenge completed");
                self.notify(
                    db,
                    child,
                    NotificationKind::ChallengeCompleted,
                    "Challenge completed",
                    format!("Challenge on {} completed, bonus {bonus}", goal.name),
                    now,
                )
                .await
            }
            ChallengeEvent::Expired { challenge_id } => {
                tracing::info!(goal = %goal.id, challenge = %challenge_id, "challenge expired");
                self.notify(
                    db,
                    child,
                    NotificationKind::ChallengeExpired,
                    "Challenge expired",
                    format!("Challenge on {} expired", goal.name),
                    now,
                )
                .await
            }
        }
    }

    async fn notify_goal_completed(
        &self,
        db: &DatabaseTransaction,
        child: &Child,
        goal: &SavingsGoal,
        now: DateTime<Utc>,
    ) -> ResultEngine<()> {
        tracing::info!(goal = %goal.id, "goal completed");
        self.notify(
            db,
            child,
            NotificationKind::GoalCompleted,
            "Goal reached",
            format!("{} reached {}", goal.name, goal.target_amount),
            now,
        )
        .await
    }

    async fn update_goal_row(&self, db: &DatabaseTransaction, goal: &SavingsGoal) -> ResultEngine<()> {
        let active: savings_goals::ActiveModel = goal.into();
        active.update(db).await?;
        Ok(())
    }

    async fn update_milestone_row(
        &self,
        db: &DatabaseTransaction,
        milestone: &GoalMilestone,
    ) -> ResultEngine<()> {
        let active: milestones::ActiveModel = milestone.into();
        active.update(db).await?;
        Ok(())
    }

    async fn update_challenge_row(
        &self,
        db: &DatabaseTransaction,
        challenge: &GoalChallenge,
    ) -> ResultEngine<()> {
        let active = challenges::ActiveModel {
            id: ActiveValue::Set(challenge.id.to_string()),
            status: ActiveValue::Set(challenge.status.as_str().to_string()),
            completed_at: ActiveValue::Set(challenge.completed_at),
            ..Default::default()
        };
        active.update(db).await?;
        Ok(())
    }

    /// Creates a goal with the default 25/50/75/100% milestones.
    pub async fn create_goal(&self, cmd: NewGoalCmd) -> ResultEngine<GoalAggregate> {
        let now = Utc::now();
        let name = normalize_required_name(&cmd.name, "goal")?;
        let description = normalize_optional_text(cmd.description.as_deref());
        cmd.auto_transfer.validate()?;
        with_tx!(self, |db_tx| {
            let (child, _) = self
                .require_active_child(&db_tx, cmd.child_id, &cmd.user_id, AccessLevel::Contribute)
                .await?;

            let mut goal = SavingsGoal::new(
                child.id,
                name,
                description,
                cmd.target_amount,
                cmd.priority,
                now,
            )?;
            goal.auto_transfer = cmd.auto_transfer;
            let active: savings_goals::ActiveModel = (&goal).into();
            active.insert(&db_tx).await?;

            let milestones = default_milestones(&goal);
            for milestone in &milestones {
                let active: milestones::ActiveModel = milestone.into();
                active.insert(&db_tx).await?;
            }

            tracing::info!(goal = %goal.id, child = %child.id, "goal created");
            Ok(GoalAggregate::new(goal, None, milestones, None))
        })
    }

    /// Return a goal with its matching rule, milestones and challenge.
    pub async fn goal(&self, goal_id: Uuid, user_id: &str) -> ResultEngine<GoalAggregate> {
        with_tx!(self, |db_tx| {
            let (goal, _, _) = self
                .require_goal(&db_tx, goal_id, user_id, AccessLevel::Read)
                .await?;
            let agg = self.load_goal_aggregate(&db_tx, goal).await?;
            Ok(agg)
        })
    }

    /// Lists the goals of a child by priority. Purchased and cancelled goals
    /// are skipped unless `include_closed`.
    pub async fn list_goals(
        &self,
        child_id: Uuid,
        include_closed: bool,
        user_id: &str,
    ) -> ResultEngine<Vec<SavingsGoal>> {
        with_tx!(self, |db_tx| {
            self.require_child(&db_tx, child_id, user_id, AccessLevel::Read)
                .await?;
            let mut query = savings_goals::Entity::find()
                .filter(savings_goals::Column::ChildId.eq(child_id.to_string()));
            if !include_closed {
                query = query.filter(savings_goals::Column::Status.is_not_in([
                    GoalStatus::Purchased.as_str(),
                    GoalStatus::Cancelled.as_str(),
                ]));
            }
            let goals = query
                .order_by_asc(savings_goals::Column::Priority)
                .order_by_asc(savings_goals::Column::CreatedAt)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(SavingsGoal::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;
            Ok(goals)
        })
    }

    /// Updates name, description, target, priority or auto-transfer.
    ///
    /// A new target re-derives the thresholds of unachieved milestones and
    /// re-evaluates completion.
    pub async fn update_goal(&self, cmd: UpdateGoalCmd) -> ResultEngine<GoalAggregate> {
        let now = Utc::now();
        let name = cmd
            .name
            .as_deref()
            .map(|name| normalize_required_name(name, "goal"))
            .transpose()?;
        if let Some(transfer) = cmd.auto_transfer {
            transfer.validate()?;
        }
        with_tx!(self, |db_tx| {
            let (goal, child, _) = self
                .require_goal(&db_tx, cmd.goal_id, &cmd.user_id, AccessLevel::Manage)
                .await?;
            let mut agg = self.load_goal_aggregate(&db_tx, goal).await?;

            if let Some(name) = name {
                agg.goal.name = name;
            }
            if let Some(description) = &cmd.description {
                agg.goal.description = normalize_optional_text(description.as_deref());
            }
            if let Some(priority) = cmd.priority {
                agg.goal.priority = priority;
            }
            if let Some(transfer) = cmd.auto_transfer {
                agg.goal.auto_transfer = transfer;
            }
            if let Some(target) = cmd.target_amount
                && target != agg.goal.target_amount
            {
                let completed = agg.retarget(target, now)?;
                for milestone in agg.milestones.iter().filter(|m| !m.is_achieved) {
                    self.update_milestone_row(&db_tx, milestone).await?;
                }
                if completed {
                    self.notify_goal_completed(&db_tx, &child, &agg.goal, now)
                        .await?;
                }
            }

            self.update_goal_row(&db_tx, &agg.goal).await?;
            Ok(agg)
        })
    }

    /// Deposits into a goal.
    ///
    /// Only `ChildDeposit`, `ParentGift` and `ExternalGift` can be requested;
    /// gifts are parent-only.
    pub async fn contribute_to_goal(&self, cmd: ContributeCmd) -> ResultEngine<ContributionOutcome> {
        let now = Utc::now();
        if cmd.kind.is_system() {
            return Err(EngineError::Forbidden(format!(
                "{} contributions are created by the engine",
                cmd.kind.as_str()
            )));
        }
        let level = match cmd.kind {
            ContributionKind::ChildDeposit => AccessLevel::Contribute,
            _ => AccessLevel::Manage,
        };
        let description = normalize_optional_text(cmd.description.as_deref());
        with_tx!(self, |db_tx| {
            let (goal, mut child, _) = self
                .require_goal(&db_tx, cmd.goal_id, &cmd.user_id, level)
                .await?;
            ensure_active_child(&child)?;
            let mut agg = self.load_goal_aggregate(&db_tx, goal).await?;

            let new = NewContribution {
                amount: cmd.amount,
                kind: cmd.kind,
                source_transaction_id: None,
                description,
                created_by: cmd.user_id.clone(),
            };
            let outcome = self
                .apply_contribution(&db_tx, &mut agg, &mut child, new, now)
                .await?;
            self.save_balances(&db_tx, &child).await?;
            Ok(outcome)
        })
    }

    /// Withdraws from a goal back into the spending balance.
    pub async fn withdraw_from_goal(
        &self,
        goal_id: Uuid,
        amount: MoneyCents,
        description: Option<&str>,
        user_id: &str,
    ) -> ResultEngine<SavingsContribution> {
        let now = Utc::now();
        let description = normalize_optional_text(description);
        with_tx!(self, |db_tx| {
            let (goal, mut child, _) = self
                .require_goal(&db_tx, goal_id, user_id, AccessLevel::Contribute)
                .await?;
            ensure_active_child(&child)?;
            let mut agg = self.load_goal_aggregate(&db_tx, goal).await?;

            let mut row = agg.withdraw(amount, description, user_id, now)?;
            self.refund_to_spending(&db_tx, &mut child, &agg.goal, &mut row, user_id, now)
                .await?;
            self.update_goal_row(&db_tx, &agg.goal).await?;
            self.save_balances(&db_tx, &child).await?;
            Ok(row)
        })
    }

    /// Credits a withdrawal contribution to the spending balance and stores
    /// it linked to the credit row.
    async fn refund_to_spending(
        &self,
        db: &DatabaseTransaction,
        child: &mut Child,
        goal: &SavingsGoal,
        row: &mut SavingsContribution,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<()> {
        let credit = self
            .append_transaction(
                db,
                child,
                TransactionKind::Credit,
                row.amount.abs(),
                GOAL_CATEGORY,
                Some(format!("Withdrawal from {}", goal.name)),
                user_id,
                now,
            )
            .await?;
        row.source_transaction_id = Some(credit.id);
        let active: contributions::ActiveModel = (&*row).into();
        active.insert(db).await?;
        Ok(())
    }

    /// Sets or clears the bonus of the milestone at `percentage`, creating
    /// the milestone when the goal does not have one yet.
    pub async fn set_milestone_bonus(
        &self,
        goal_id: Uuid,
        percentage: i32,
        bonus: Option<MoneyCents>,
        user_id: &str,
    ) -> ResultEngine<GoalMilestone> {
        if !(1..=100).contains(&percentage) {
            return Err(EngineError::InvalidAmount(
                "milestone percentage must be between 1 and 100".to_string(),
            ));
        }
        if bonus.is_some_and(|b| !b.is_positive()) {
            return Err(EngineError::InvalidAmount(
                "milestone bonus must be > 0".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            let (goal, _, _) = self
                .require_goal(&db_tx, goal_id, user_id, AccessLevel::Manage)
                .await?;
            let agg = self.load_goal_aggregate(&db_tx, goal).await?;

            match agg.milestones.iter().find(|m| m.percentage == percentage) {
                Some(existing) if existing.is_achieved => Err(EngineError::InvalidState(format!(
                    "{percentage}% milestone already reached"
                ))),
                Some(existing) => {
                    let mut milestone = existing.clone();
                    milestone.bonus_amount = bonus;
                    self.update_milestone_row(&db_tx, &milestone).await?;
                    Ok(milestone)
                }
                None => {
                    let milestone = GoalMilestone::new(&agg.goal, percentage, bonus);
                    if agg.goal.current_amount >= milestone.target_amount {
                        return Err(EngineError::InvalidState(format!(
                            "{percentage}% milestone already reached"
                        )));
                    }
                    let active: milestones::ActiveModel = (&milestone).into();
                    active.insert(&db_tx).await?;
                    Ok(milestone)
                }
            }
        })
    }

    /// Creates or replaces the matching rule of a goal. The amount already
    /// matched is kept.
    pub async fn upsert_matching_rule(&self, cmd: MatchingRuleCmd) -> ResultEngine<ParentMatchingRule> {
        let now = Utc::now();
        crate::matching_rules::validate(cmd.match_ratio, cmd.max_match_amount)?;
        with_tx!(self, |db_tx| {
            let (goal, _, _) = self
                .require_goal(&db_tx, cmd.goal_id, &cmd.user_id, AccessLevel::Manage)
                .await?;
            let agg = self.load_goal_aggregate(&db_tx, goal).await?;

            let rule = match agg.matching_rule {
                Some(mut rule) => {
                    rule.kind = cmd.kind;
                    rule.match_ratio = cmd.match_ratio;
                    rule.max_match_amount = cmd.max_match_amount;
                    rule.is_active = true;
                    rule.created_by = cmd.user_id.clone();
                    let active: matching_rules::ActiveModel = (&rule).into();
                    active.update(&db_tx).await?;
                    rule
                }
                None => {
                    let rule = ParentMatchingRule::new(
                        agg.goal.id,
                        cmd.kind,
                        cmd.match_ratio,
                        cmd.max_match_amount,
                        &cmd.user_id,
                        now,
                    )?;
                    let active: matching_rules::ActiveModel = (&rule).into();
                    active.insert(&db_tx).await?;
                    rule
                }
            };
            Ok(rule)
        })
    }

    /// Deactivates the matching rule of a goal.
    pub async fn remove_matching_rule(&self, goal_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let (goal, _, _) = self
                .require_goal(&db_tx, goal_id, user_id, AccessLevel::Manage)
                .await?;
            let agg = self.load_goal_aggregate(&db_tx, goal).await?;
            let rule = agg
                .matching_rule
                .filter(|rule| rule.is_active)
                .ok_or_else(|| EngineError::NotFound(format!("matching rule of goal {goal_id}")))?;

            let active = matching_rules::ActiveModel {
                id: ActiveValue::Set(rule.id.to_string()),
                is_active: ActiveValue::Set(false),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Starts a challenge on an active goal. A previous challenge past its
    /// end date is expired first; a running one is an error.
    pub async fn start_challenge(&self, cmd: ChallengeCmd) -> ResultEngine<GoalChallenge> {
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            let (goal, child, _) = self
                .require_goal(&db_tx, cmd.goal_id, &cmd.user_id, AccessLevel::Manage)
                .await?;
            let mut agg = self.load_goal_aggregate(&db_tx, goal).await?;
            if agg.goal.status != GoalStatus::Active {
                return Err(EngineError::InvalidState(format!(
                    "goal {} is {}",
                    agg.goal.name,
                    agg.goal.status.as_str()
                )));
            }

            if let Some(event) = agg.expire_challenge(now)
                && let Some(expired) = &agg.challenge
            {
                self.update_challenge_row(&db_tx, expired).await?;
                self.notify_challenge(&db_tx, &child, &agg.goal, &event, now)
                    .await?;
            }
            if agg
                .challenge
                .as_ref()
                .is_some_and(|c| c.status == ChallengeStatus::Active)
            {
                return Err(EngineError::InvalidState(format!(
                    "goal {} already has an active challenge",
                    agg.goal.name
                )));
            }

            let challenge = GoalChallenge::new(
                &agg.goal,
                cmd.target_amount,
                cmd.bonus_amount,
                cmd.end_date,
                now,
            )?;
            let active: challenges::ActiveModel = (&challenge).into();
            active.insert(&db_tx).await?;
            tracing::info!(goal = %agg.goal.id, challenge = %challenge.id, "challenge started");
            Ok(challenge)
        })
    }

    pub async fn cancel_challenge(&self, goal_id: Uuid, user_id: &str) -> ResultEngine<GoalChallenge> {
        with_tx!(self, |db_tx| {
            let (goal, _, _) = self
                .require_goal(&db_tx, goal_id, user_id, AccessLevel::Manage)
                .await?;
            let agg = self.load_goal_aggregate(&db_tx, goal).await?;
            let mut challenge = agg
                .challenge
                .filter(|c| c.status == ChallengeStatus::Active)
                .ok_or_else(|| EngineError::NotFound(format!("active challenge of goal {goal_id}")))?;

            challenge.status = ChallengeStatus::Cancelled;
            self.update_challenge_row(&db_tx, &challenge).await?;
            Ok(challenge)
        })
    }

    /// Moves every active challenge past its end date to `Expired`.
    pub async fn expire_challenges(&self, now: DateTime<Utc>) -> ResultEngine<Vec<GoalChallenge>> {
        with_tx!(self, |db_tx| {
            let due = challenges::Entity::find()
                .filter(challenges::Column::Status.eq(ChallengeStatus::Active.as_str()))
                .filter(challenges::Column::EndDate.lt(now))
                .all(&db_tx)
                .await?;

            let mut expired = Vec::with_capacity(due.len());
            for model in due {
                let mut challenge = GoalChallenge::try_from(model)?;
                challenge.status = ChallengeStatus::Expired;
                self.update_challenge_row(&db_tx, &challenge).await?;

                let goal = savings_goals::Entity::find_by_id(challenge.goal_id.to_string())
                    .one(&db_tx)
                    .await?
                    .map(SavingsGoal::try_from)
                    .transpose()?;
                if let Some(goal) = goal {
                    let child = self.load_child(&db_tx, goal.child_id).await?;
                    let event = ChallengeEvent::Expired {
                        challenge_id: challenge.id,
                    };
                    self.notify_challenge(&db_tx, &child, &goal, &event, now)
                        .await?;
                }
                expired.push(challenge);
            }
            Ok(expired)
        })
    }

    /// Marks a completed goal as bought.
    pub async fn mark_goal_purchased(&self, goal_id: Uuid, user_id: &str) -> ResultEngine<SavingsGoal> {
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            let (goal, _, _) = self
                .require_goal(&db_tx, goal_id, user_id, AccessLevel::Manage)
                .await?;
            let mut agg = self.load_goal_aggregate(&db_tx, goal).await?;
            agg.mark_purchased(now)?;
            self.update_goal_row(&db_tx, &agg.goal).await?;
            Ok(agg.goal)
        })
    }

    /// Cancels a goal and refunds its amount to the spending balance.
    pub async fn cancel_goal(
        &self,
        goal_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Option<SavingsContribution>> {
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            let (goal, mut child, _) = self
                .require_goal(&db_tx, goal_id, user_id, AccessLevel::Manage)
                .await?;
            let mut agg = self.load_goal_aggregate(&db_tx, goal).await?;
            let had_active_challenge = agg
                .challenge
                .as_ref()
                .is_some_and(|c| c.status == ChallengeStatus::Active);

            let mut refund = agg.cancel(user_id, now)?;
            if let Some(row) = refund.as_mut() {
                self.refund_to_spending(&db_tx, &mut child, &agg.goal, row, user_id, now)
                    .await?;
                self.save_balances(&db_tx, &child).await?;
            }
            if had_active_challenge && let Some(challenge) = &agg.challenge {
                self.update_challenge_row(&db_tx, challenge).await?;
            }
            self.update_goal_row(&db_tx, &agg.goal).await?;
            tracing::info!(goal = %agg.goal.id, "goal cancelled");
            Ok(refund)
        })
    }

    /// Pauses or resumes a goal. Paused goals skip auto-transfers.
    pub async fn set_goal_paused(
        &self,
        goal_id: Uuid,
        paused: bool,
        user_id: &str,
    ) -> ResultEngine<SavingsGoal> {
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            let (goal, child, _) = self
                .require_goal(&db_tx, goal_id, user_id, AccessLevel::Manage)
                .await?;
            let mut agg = self.load_goal_aggregate(&db_tx, goal).await?;
            if agg.set_paused(paused, now)? {
                self.notify_goal_completed(&db_tx, &child, &agg.goal, now)
                    .await?;
            }
            self.update_goal_row(&db_tx, &agg.goal).await?;
            Ok(agg.goal)
        })
    }

    /// Lists the contributions of a goal, oldest first.
    pub async fn list_contributions(
        &self,
        goal_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Vec<SavingsContribution>> {
        with_tx!(self, |db_tx| {
            self.require_goal(&db_tx, goal_id, user_id, AccessLevel::Read)
                .await?;
            let rows = contributions::Entity::find()
                .filter(contributions::Column::GoalId.eq(goal_id.to_string()))
                .order_by_asc(contributions::Column::CreatedAt)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(SavingsContribution::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;
            Ok(rows)
        })
    }
}
