//! Savings goal progress.
//!
//! [`GoalAggregate`] owns a goal together with its matching rule, milestones
//! and challenge, and applies contributions to all of them in memory. The
//! engine loads the aggregate, calls into it and persists whatever changed
//! inside a single database transaction.
//!
//! A deposit runs, in order:
//! 1. the primary contribution,
//! 2. the parent match (child deposits only),
//! 3. the milestone check, bonuses paid as `ChallengeBonus`,
//! 4. the challenge check (expiry first, then completion),
//! 5. the goal completion check.
//!
//! Bonus contributions never trigger another milestone check.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    ChallengeStatus, ContributionKind, EngineError, GoalChallenge, GoalMilestone, GoalStatus,
    MoneyCents, ParentMatchingRule, ResultEngine, SavingsContribution, SavingsGoal,
};

/// A deposit requested by a caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewContribution {
    pub amount: MoneyCents,
    pub kind: ContributionKind,
    pub source_transaction_id: Option<Uuid>,
    pub description: Option<String>,
    pub created_by: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChallengeEvent {
    Completed { challenge_id: Uuid, bonus: MoneyCents },
    Expired { challenge_id: Uuid },
}

/// Everything a single deposit produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContributionOutcome {
    /// Appended rows, the primary contribution first.
    pub contributions: Vec<SavingsContribution>,
    pub matched: MoneyCents,
    pub achieved_milestones: Vec<GoalMilestone>,
    pub challenge_event: Option<ChallengeEvent>,
    pub goal_completed: bool,
}

impl ContributionOutcome {
    pub fn primary(&self) -> Option<&SavingsContribution> {
        self.contributions.first()
    }

    /// Sum of every appended row.
    pub fn total(&self) -> MoneyCents {
        self.contributions.iter().map(|c| c.amount).sum()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GoalAggregate {
    pub goal: SavingsGoal,
    pub matching_rule: Option<ParentMatchingRule>,
    /// Sorted by percentage.
    pub milestones: Vec<GoalMilestone>,
    /// The goal's current (latest) challenge, if any.
    pub challenge: Option<GoalChallenge>,
}

impl GoalAggregate {
    pub fn new(
        goal: SavingsGoal,
        matching_rule: Option<ParentMatchingRule>,
        mut milestones: Vec<GoalMilestone>,
        challenge: Option<GoalChallenge>,
    ) -> Self {
        milestones.sort_by_key(|m| m.percentage);
        Self {
            goal,
            matching_rule,
            milestones,
            challenge,
        }
    }

    /// Adds `new.amount` to the goal and runs matching, milestones,
    /// challenge and completion.
    pub fn contribute(
        &mut self,
        new: NewContribution,
        now: DateTime<Utc>,
    ) -> ResultEngine<ContributionOutcome> {
        if !new.amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "contribution amount must be > 0".to_string(),
            ));
        }
        if new.kind == ContributionKind::Withdrawal {
            return Err(EngineError::InvalidAmount(
                "withdrawals are not contributions".to_string(),
            ));
        }
        if !self.goal.status.accepts_deposits() {
            return Err(EngineError::InvalidState(format!(
                "goal {} is {}",
                self.goal.name,
                self.goal.status.as_str()
            )));
        }

        let mut contributions = Vec::new();
        let primary = self.append(
            new.amount,
            new.kind,
            new.source_transaction_id,
            None,
            new.description,
            &new.created_by,
            now,
        )?;
        let primary_id = primary.id;
        contributions.push(primary);

        let matched = self.apply_match(new.kind, new.amount)?;
        if matched.is_positive() {
            let created_by = self
                .matching_rule
                .as_ref()
                .map(|rule| rule.created_by.clone())
                .unwrap_or_else(|| new.created_by.clone());
            contributions.push(self.append(
                matched,
                ContributionKind::ParentMatch,
                new.source_transaction_id,
                Some(primary_id),
                Some("Parent match".to_string()),
                &created_by,
                now,
            )?);
        }

        let achieved_milestones = self.check_milestones(now);
        for milestone in &achieved_milestones {
            if let Some(bonus) = milestone.bonus_amount
                && bonus.is_positive()
            {
                contributions.push(self.append(
                    bonus,
                    ContributionKind::ChallengeBonus,
                    None,
                    None,
                    Some(format!("{}% milestone bonus", milestone.percentage)),
                    &new.created_by,
                    now,
                )?);
            }
        }

        let challenge_event = self.check_challenge(now);
        if let Some(ChallengeEvent::Completed { bonus, .. }) = challenge_event
            && bonus.is_positive()
        {
            contributions.push(self.append(
                bonus,
                ContributionKind::ChallengeBonus,
                None,
                None,
                Some("Challenge bonus".to_string()),
                &new.created_by,
                now,
            )?);
        }

        let goal_completed = self.check_completion(now);

        Ok(ContributionOutcome {
            contributions,
            matched,
            achieved_milestones,
            challenge_event,
            goal_completed,
        })
    }

    /// Takes `amount` out of the goal.
    ///
    /// A completed goal that drops below its target is active again; a
    /// purchased one keeps its status. Milestones are never reverted.
    pub fn withdraw(
        &mut self,
        amount: MoneyCents,
        description: Option<String>,
        created_by: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<SavingsContribution> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "withdrawal amount must be > 0".to_string(),
            ));
        }
        if amount > self.goal.current_amount {
            return Err(EngineError::InsufficientGoalBalance(format!(
                "{} has {}, {} requested",
                self.goal.name, self.goal.current_amount, amount
            )));
        }

        let contribution = self.append(
            -amount,
            ContributionKind::Withdrawal,
            None,
            None,
            description,
            created_by,
            now,
        )?;

        if self.goal.status == GoalStatus::Completed
            && self.goal.current_amount < self.goal.target_amount
        {
            self.goal.status = GoalStatus::Active;
            self.goal.completed_at = None;
        }
        Ok(contribution)
    }

    /// Moves an active challenge past its end date to `Expired`.
    pub fn expire_challenge(&mut self, now: DateTime<Utc>) -> Option<ChallengeEvent> {
        let challenge = self.challenge.as_mut()?;
        if !challenge.is_expired(now) {
            return None;
        }
        challenge.status = ChallengeStatus::Expired;
        Some(ChallengeEvent::Expired {
            challenge_id: challenge.id,
        })
    }

    /// Changes the target and re-derives unachieved milestone thresholds.
    ///
    /// Completion is re-evaluated: raising the target of a completed goal
    /// reopens it, lowering it below the current amount completes it.
    pub fn retarget(&mut self, target: MoneyCents, now: DateTime<Utc>) -> ResultEngine<bool> {
        if !target.is_positive() {
            return Err(EngineError::InvalidAmount(
                "goal target must be > 0".to_string(),
            ));
        }
        self.goal.target_amount = target;
        for milestone in &mut self.milestones {
            milestone.retarget(target);
        }
        if self.goal.status == GoalStatus::Completed && self.goal.current_amount < target {
            self.goal.status = GoalStatus::Active;
            self.goal.completed_at = None;
        }
        Ok(self.check_completion(now))
    }

    /// Pauses an active goal or resumes a paused one. Resuming a goal that
    /// already reached its target completes it; the return value tells.
    pub fn set_paused(&mut self, paused: bool, now: DateTime<Utc>) -> ResultEngine<bool> {
        match (self.goal.status, paused) {
            (GoalStatus::Active, true) => {
                self.goal.status = GoalStatus::Paused;
                Ok(false)
            }
            (GoalStatus::Paused, false) => {
                self.goal.status = GoalStatus::Active;
                Ok(self.check_completion(now))
            }
            (status, _) => Err(EngineError::InvalidState(format!(
                "goal {} is {}",
                self.goal.name,
                status.as_str()
            ))),
        }
    }

    /// Records that a completed goal was bought.
    pub fn mark_purchased(&mut self, now: DateTime<Utc>) -> ResultEngine<()> {
        if self.goal.status != GoalStatus::Completed {
            return Err(EngineError::InvalidState(format!(
                "goal {} is {}, only completed goals can be purchased",
                self.goal.name,
                self.goal.status.as_str()
            )));
        }
        self.goal.status = GoalStatus::Purchased;
        self.goal.purchased_at = Some(now);
        Ok(())
    }

    /// Cancels the goal, refunding its whole amount through a withdrawal and
    /// cancelling an active challenge.
    pub fn cancel(
        &mut self,
        created_by: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<Option<SavingsContribution>> {
        if !self.goal.status.accepts_deposits() {
            return Err(EngineError::InvalidState(format!(
                "goal {} is {}",
                self.goal.name,
                self.goal.status.as_str()
            )));
        }
        let refund = if self.goal.current_amount.is_positive() {
            Some(self.withdraw(
                self.goal.current_amount,
                Some("Goal cancelled".to_string()),
                created_by,
                now,
            )?)
        } else {
            None
        };
        self.goal.status = GoalStatus::Cancelled;
        if let Some(challenge) = self.challenge.as_mut()
            && challenge.status == ChallengeStatus::Active
        {
            challenge.status = ChallengeStatus::Cancelled;
        }
        Ok(refund)
    }

    /// Adds `amount` to the goal and builds its contribution row. Fails when
    /// the goal balance would overflow.
    #[allow(clippy::too_many_arguments)]
    fn append(
        &mut self,
        amount: MoneyCents,
        kind: ContributionKind,
        source_transaction_id: Option<Uuid>,
        parent_match_id: Option<Uuid>,
        description: Option<String>,
        created_by: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<SavingsContribution> {
        self.goal.current_amount = self
            .goal
            .current_amount
            .checked_add(amount)
            .ok_or_else(|| EngineError::InvalidAmount("amount too large".to_string()))?;
        Ok(SavingsContribution {
            id: Uuid::new_v4(),
            goal_id: self.goal.id,
            child_id: self.goal.child_id,
            amount,
            kind,
            goal_balance_after: self.goal.current_amount,
            source_transaction_id,
            parent_match_id,
            description,
            created_by: created_by.to_string(),
            created_at: now,
        })
    }

    fn apply_match(
        &mut self,
        kind: ContributionKind,
        amount: MoneyCents,
    ) -> ResultEngine<MoneyCents> {
        if kind != ContributionKind::ChildDeposit {
            return Ok(MoneyCents::ZERO);
        }
        let Some(rule) = self.matching_rule.as_mut() else {
            return Ok(MoneyCents::ZERO);
        };
        let matched = rule.match_for(amount);
        rule.total_matched_amount = rule
            .total_matched_amount
            .checked_add(matched)
            .ok_or_else(|| EngineError::InvalidAmount("matched total too large".to_string()))?;
        Ok(matched)
    }

    fn check_milestones(&mut self, now: DateTime<Utc>) -> Vec<GoalMilestone> {
        let reached = self.goal.current_amount;
        let mut achieved = Vec::new();
        for milestone in &mut self.milestones {
            if !milestone.is_achieved && reached >= milestone.target_amount {
                milestone.is_achieved = true;
                milestone.achieved_at = Some(now);
                achieved.push(milestone.clone());
            }
        }
        achieved
    }

    fn check_challenge(&mut self, now: DateTime<Utc>) -> Option<ChallengeEvent> {
        if let Some(expired) = self.expire_challenge(now) {
            return Some(expired);
        }
        let current = self.goal.current_amount;
        let challenge = self.challenge.as_mut()?;
        if challenge.status != ChallengeStatus::Active
            || challenge.progress(current) < challenge.target_amount
        {
            return None;
        }
        challenge.status = ChallengeStatus::Completed;
        challenge.completed_at = Some(now);
        Some(ChallengeEvent::Completed {
            challenge_id: challenge.id,
            bonus: challenge.bonus_amount,
        })
    }

    fn check_completion(&mut self, now: DateTime<Utc>) -> bool {
        if self.goal.status == GoalStatus::Active
            && self.goal.current_amount >= self.goal.target_amount
        {
            self.goal.status = GoalStatus::Completed;
            self.goal.completed_at = Some(now);
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    use super::*;
    use crate::{MatchingKind, default_milestones};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 5, 12, 0, 0).unwrap()
    }

    fn goal(target: i64) -> SavingsGoal {
        SavingsGoal::new(
            Uuid::new_v4(),
            "Bike".to_string(),
            None,
            MoneyCents::new(target),
            0,
            now(),
        )
        .unwrap()
    }

    fn aggregate(target: i64) -> GoalAggregate {
        let goal = goal(target);
        let milestones = default_milestones(&goal);
        GoalAggregate::new(goal, None, milestones, None)
    }

    fn deposit(amount: i64, kind: ContributionKind) -> NewContribution {
        NewContribution {
            amount: MoneyCents::new(amount),
            kind,
            source_transaction_id: None,
            description: None,
            created_by: "kid".to_string(),
        }
    }

    fn assert_ledger_matches(agg: &GoalAggregate, rows: &[SavingsContribution]) {
        let sum: MoneyCents = rows.iter().map(|c| c.amount).sum();
        assert_eq!(sum, agg.goal.current_amount);
    }

    #[test]
    fn milestone_bonus_is_paid_once() {
        let mut agg = aggregate(100_00);
        let half = agg.milestones.iter_mut().find(|m| m.percentage == 50).unwrap();
        half.bonus_amount = Some(MoneyCents::new(5_00));

        let outcome = agg
            .contribute(deposit(60_00, ContributionKind::ChildDeposit), now())
            .unwrap();

        assert_eq!(agg.goal.current_amount, MoneyCents::new(65_00));
        assert_eq!(outcome.contributions.len(), 2);
        assert_eq!(outcome.contributions[1].kind, ContributionKind::ChallengeBonus);
        assert_eq!(outcome.contributions[1].amount, MoneyCents::new(5_00));
        assert_eq!(outcome.contributions[1].goal_balance_after, MoneyCents::new(65_00));
        let achieved: Vec<i32> = outcome.achieved_milestones.iter().map(|m| m.percentage).collect();
        assert_eq!(achieved, vec![25, 50]);
        assert!(!outcome.goal_completed);
        assert_ledger_matches(&agg, &outcome.contributions);
    }

    #[test]
    fn bonus_does_not_trigger_the_next_milestone() {
        let mut agg = aggregate(100_00);
        let half = agg.milestones.iter_mut().find(|m| m.percentage == 50).unwrap();
        half.bonus_amount = Some(MoneyCents::new(30_00));

        let outcome = agg
            .contribute(deposit(50_00, ContributionKind::ChildDeposit), now())
            .unwrap();

        assert_eq!(agg.goal.current_amount, MoneyCents::new(80_00));
        let achieved: Vec<i32> = outcome.achieved_milestones.iter().map(|m| m.percentage).collect();
        assert_eq!(achieved, vec![25, 50]);
        assert!(!agg.milestones.iter().find(|m| m.percentage == 75).unwrap().is_achieved);
    }

    #[test]
    fn percentage_match_respects_cap() {
        let mut agg = aggregate(1_000_00);
        agg.matching_rule = Some(
            ParentMatchingRule::new(
                agg.goal.id,
                MatchingKind::PercentageMatch,
                dec!(50),
                Some(MoneyCents::new(20_00)),
                "mom",
                now(),
            )
            .unwrap(),
        );

        let first = agg
            .contribute(deposit(30_00, ContributionKind::ChildDeposit), now())
            .unwrap();
        assert_eq!(first.matched, MoneyCents::new(15_00));
        assert_eq!(first.contributions[1].kind, ContributionKind::ParentMatch);
        assert_eq!(first.contributions[1].parent_match_id, Some(first.contributions[0].id));
        assert_eq!(first.contributions[1].created_by, "mom");

        let second = agg
            .contribute(deposit(30_00, ContributionKind::ChildDeposit), now())
            .unwrap();
        assert_eq!(second.matched, MoneyCents::new(5_00));

        let third = agg
            .contribute(deposit(30_00, ContributionKind::ChildDeposit), now())
            .unwrap();
        assert_eq!(third.matched, MoneyCents::ZERO);
        assert_eq!(third.contributions.len(), 1);

        let rule = agg.matching_rule.as_ref().unwrap();
        assert_eq!(rule.total_matched_amount, MoneyCents::new(20_00));
        assert_eq!(agg.goal.current_amount, MoneyCents::new(110_00));
    }

    #[test]
    fn gifts_are_not_matched() {
        let mut agg = aggregate(100_00);
        agg.matching_rule = Some(
            ParentMatchingRule::new(
                agg.goal.id,
                MatchingKind::RatioMatch,
                dec!(1),
                None,
                "mom",
                now(),
            )
            .unwrap(),
        );

        let outcome = agg
            .contribute(deposit(10_00, ContributionKind::ParentGift), now())
            .unwrap();
        assert_eq!(outcome.matched, MoneyCents::ZERO);
        assert_eq!(agg.goal.current_amount, MoneyCents::new(10_00));
    }

    #[test]
    fn huge_gift_is_rejected_without_overflow() {
        let mut agg = aggregate(100_00);
        agg.contribute(deposit(1_00, ContributionKind::ParentGift), now())
            .unwrap();

        let err = agg
            .contribute(deposit(i64::MAX, ContributionKind::ParentGift), now())
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
        assert_eq!(agg.goal.current_amount, MoneyCents::new(1_00));
    }

    #[test]
    fn matched_total_overflow_is_rejected() {
        let mut agg = aggregate(100_00);
        let mut rule = ParentMatchingRule::new(
            agg.goal.id,
            MatchingKind::RatioMatch,
            dec!(1),
            None,
            "mom",
            now(),
        )
        .unwrap();
        rule.total_matched_amount = MoneyCents::new(i64::MAX - 1);
        agg.matching_rule = Some(rule);

        let err = agg
            .contribute(deposit(10_00, ContributionKind::ChildDeposit), now())
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
    }

    #[test]
    fn withdraw_beyond_goal_amount_fails() {
        let mut agg = aggregate(100_00);
        agg.contribute(deposit(10_00, ContributionKind::ChildDeposit), now())
            .unwrap();

        let err = agg
            .withdraw(MoneyCents::new(10_01), None, "kid", now())
            .unwrap_err();
        assert!(matches!(err, EngineError::InsufficientGoalBalance(_)));
        assert_eq!(agg.goal.current_amount, MoneyCents::new(10_00));
    }

    #[test]
    fn milestones_never_revert_on_withdrawal() {
        let mut agg = aggregate(100_00);
        agg.contribute(deposit(100_00, ContributionKind::ChildDeposit), now())
            .unwrap();
        assert_eq!(agg.goal.status, GoalStatus::Completed);

        let row = agg
            .withdraw(MoneyCents::new(80_00), None, "kid", now())
            .unwrap();
        assert_eq!(row.amount, MoneyCents::new(-80_00));
        assert_eq!(row.goal_balance_after, MoneyCents::new(20_00));
        assert!(agg.milestones.iter().all(|m| m.is_achieved));
        assert_eq!(agg.goal.status, GoalStatus::Active);

        let again = agg
            .contribute(deposit(60_00, ContributionKind::ChildDeposit), now())
            .unwrap();
        assert!(again.achieved_milestones.is_empty());
    }

    #[test]
    fn reaching_target_completes_goal() {
        let mut agg = aggregate(20_00);
        let outcome = agg
            .contribute(deposit(25_00, ContributionKind::ExternalGift), now())
            .unwrap();
        assert!(outcome.goal_completed);
        assert_eq!(agg.goal.status, GoalStatus::Completed);
        assert_eq!(agg.goal.completed_at, Some(now()));
    }

    #[test]
    fn rejects_withdrawal_kind_and_closed_goals() {
        let mut agg = aggregate(20_00);
        assert!(matches!(
            agg.contribute(deposit(1_00, ContributionKind::Withdrawal), now()),
            Err(EngineError::InvalidAmount(_))
        ));
        assert!(matches!(
            agg.contribute(deposit(0, ContributionKind::ChildDeposit), now()),
            Err(EngineError::InvalidAmount(_))
        ));

        agg.goal.status = GoalStatus::Cancelled;
        assert!(matches!(
            agg.contribute(deposit(1_00, ContributionKind::ChildDeposit), now()),
            Err(EngineError::InvalidState(_))
        ));
    }

    #[test]
    fn challenge_completes_before_end_date() {
        let mut agg = aggregate(1_000_00);
        agg.contribute(deposit(100_00, ContributionKind::ChildDeposit), now())
            .unwrap();
        let challenge = GoalChallenge::new(
            &agg.goal,
            MoneyCents::new(20_00),
            MoneyCents::new(3_00),
            now() + Duration::days(7),
            now(),
        )
        .unwrap();
        let challenge_id = challenge.id;
        agg.challenge = Some(challenge);

        let partial = agg
            .contribute(
                deposit(15_00, ContributionKind::ChildDeposit),
                now() + Duration::days(1),
            )
            .unwrap();
        assert_eq!(partial.challenge_event, None);

        let done = agg
            .contribute(
                deposit(5_00, ContributionKind::ChildDeposit),
                now() + Duration::days(2),
            )
            .unwrap();
        assert_eq!(
            done.challenge_event,
            Some(ChallengeEvent::Completed {
                challenge_id,
                bonus: MoneyCents::new(3_00)
            })
        );
        let bonus = done.contributions.last().unwrap();
        assert_eq!(bonus.kind, ContributionKind::ChallengeBonus);
        assert_eq!(agg.goal.current_amount, MoneyCents::new(123_00));
        assert_eq!(
            agg.challenge.as_ref().unwrap().status,
            ChallengeStatus::Completed
        );
    }

    #[test]
    fn milestone_bonus_counts_towards_challenge() {
        let mut agg = aggregate(100_00);
        let quarter = agg.milestones.iter_mut().find(|m| m.percentage == 25).unwrap();
        quarter.bonus_amount = Some(MoneyCents::new(10_00));
        agg.challenge = Some(
            GoalChallenge::new(
                &agg.goal,
                MoneyCents::new(30_00),
                MoneyCents::new(1_00),
                now() + Duration::days(7),
                now(),
            )
            .unwrap(),
        );

        // 25.00 deposited, the 10.00 milestone bonus carries it past 30.00
        let outcome = agg
            .contribute(deposit(25_00, ContributionKind::ChildDeposit), now())
            .unwrap();
        assert!(matches!(
            outcome.challenge_event,
            Some(ChallengeEvent::Completed { .. })
        ));
        let kinds: Vec<ContributionKind> = outcome.contributions.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ContributionKind::ChildDeposit,
                ContributionKind::ChallengeBonus,
                ContributionKind::ChallengeBonus,
            ]
        );
        assert_eq!(agg.goal.current_amount, MoneyCents::new(36_00));
        assert_ledger_matches(&agg, &outcome.contributions);
    }

    #[test]
    fn late_contribution_expires_challenge() {
        let mut agg = aggregate(1_000_00);
        agg.challenge = Some(
            GoalChallenge::new(
                &agg.goal,
                MoneyCents::new(10_00),
                MoneyCents::new(2_00),
                now() + Duration::days(1),
                now(),
            )
            .unwrap(),
        );

        let outcome = agg
            .contribute(
                deposit(50_00, ContributionKind::ChildDeposit),
                now() + Duration::days(2),
            )
            .unwrap();
        assert!(matches!(
            outcome.challenge_event,
            Some(ChallengeEvent::Expired { .. })
        ));
        assert_eq!(outcome.contributions.len(), 1);
        assert_eq!(
            agg.challenge.as_ref().unwrap().status,
            ChallengeStatus::Expired
        );
    }

    #[test]
    fn retarget_reopens_completed_goal() {
        let mut agg = aggregate(20_00);
        agg.contribute(deposit(20_00, ContributionKind::ChildDeposit), now())
            .unwrap();
        assert_eq!(agg.goal.status, GoalStatus::Completed);

        let completed = agg.retarget(MoneyCents::new(40_00), now()).unwrap();
        assert!(!completed);
        assert_eq!(agg.goal.status, GoalStatus::Active);
        let top = agg.milestones.last().unwrap();
        // already achieved at the old target, threshold kept
        assert_eq!(top.target_amount, MoneyCents::new(20_00));
    }

    #[test]
    fn paused_goal_completes_on_resume() {
        let mut agg = aggregate(20_00);
        assert!(!agg.set_paused(true, now()).unwrap());
        agg.contribute(deposit(25_00, ContributionKind::ParentGift), now())
            .unwrap();
        assert_eq!(agg.goal.status, GoalStatus::Paused);

        assert!(agg.set_paused(false, now()).unwrap());
        assert_eq!(agg.goal.status, GoalStatus::Completed);
        assert!(agg.set_paused(true, now()).is_err());
    }

    #[test]
    fn only_completed_goals_can_be_purchased() {
        let mut agg = aggregate(20_00);
        assert!(matches!(
            agg.mark_purchased(now()),
            Err(EngineError::InvalidState(_))
        ));
        agg.contribute(deposit(20_00, ContributionKind::ChildDeposit), now())
            .unwrap();
        agg.mark_purchased(now()).unwrap();
        assert_eq!(agg.goal.status, GoalStatus::Purchased);
        assert_eq!(agg.goal.purchased_at, Some(now()));
        assert!(agg.cancel("mom", now()).is_err());
    }

    #[test]
    fn cancel_refunds_everything() {
        let mut agg = aggregate(100_00);
        agg.contribute(deposit(30_00, ContributionKind::ChildDeposit), now())
            .unwrap();
        agg.challenge = Some(
            GoalChallenge::new(
                &agg.goal,
                MoneyCents::new(10_00),
                MoneyCents::ZERO,
                now() + Duration::days(3),
                now(),
            )
            .unwrap(),
        );

        let refund = agg.cancel("mom", now()).unwrap().unwrap();
        assert_eq!(refund.kind, ContributionKind::Withdrawal);
        assert_eq!(refund.amount, MoneyCents::new(-30_00));
        assert_eq!(agg.goal.current_amount, MoneyCents::ZERO);
        assert_eq!(agg.goal.status, GoalStatus::Cancelled);
        assert_eq!(
            agg.challenge.as_ref().unwrap().status,
            ChallengeStatus::Cancelled
        );
    }
}
