use chrono::{Duration, Utc};
use rust_decimal_macros::dec;

use engine::{
    ChallengeCmd, ChallengeEvent, ChallengeStatus, ContributeCmd, ContributionKind, EngineError,
    GoalStatus, MatchingKind, MatchingRuleCmd, MoneyCents, NewGoalCmd, NotificationKind,
};

mod common;

use common::{Family, KID, OTHER_PARENT, PARENT, family, fund};

async fn goal(family: &Family, target: i64) -> uuid::Uuid {
    family
        .engine
        .create_goal(NewGoalCmd::new(
            family.child.id,
            KID,
            "Bike",
            MoneyCents::new(target),
        ))
        .await
        .unwrap()
        .goal
        .id
}

async fn deposit(family: &Family, goal_id: uuid::Uuid, cents: i64) -> engine::ContributionOutcome {
    family
        .engine
        .contribute_to_goal(ContributeCmd::new(
            goal_id,
            KID,
            MoneyCents::new(cents),
            ContributionKind::ChildDeposit,
        ))
        .await
        .unwrap()
}

async fn gift(family: &Family, goal_id: uuid::Uuid, cents: i64) -> engine::ContributionOutcome {
    family
        .engine
        .contribute_to_goal(ContributeCmd::new(
            goal_id,
            PARENT,
            MoneyCents::new(cents),
            ContributionKind::ParentGift,
        ))
        .await
        .unwrap()
}

#[tokio::test]
async fn new_goal_has_default_milestones() {
    let family = family().await;
    let goal_id = goal(&family, 80_00).await;

    let agg = family.engine.goal(goal_id, PARENT).await.unwrap();
    let thresholds: Vec<_> = agg
        .milestones
        .iter()
        .map(|m| (m.percentage, m.target_amount.cents()))
        .collect();
    assert_eq!(
        thresholds,
        vec![(25, 20_00), (50, 40_00), (75, 60_00), (100, 80_00)]
    );
    assert_eq!(agg.goal.status, GoalStatus::Active);
}

#[tokio::test]
async fn crossing_a_milestone_pays_its_bonus() {
    let family = family().await;
    let goal_id = goal(&family, 100_00).await;
    family
        .engine
        .set_milestone_bonus(goal_id, 65, Some(MoneyCents::new(2_00)), PARENT)
        .await
        .unwrap();

    gift(&family, goal_id, 60_00).await;
    fund(&family, 10_00).await;
    let outcome = deposit(&family, goal_id, 5_00).await;

    let reached: Vec<_> = outcome
        .achieved_milestones
        .iter()
        .map(|m| m.percentage)
        .collect();
    assert_eq!(reached, vec![65]);
    assert_eq!(outcome.total(), MoneyCents::new(7_00));
    assert!(
        outcome
            .contributions
            .iter()
            .any(|c| c.kind == ContributionKind::ChallengeBonus && c.amount == MoneyCents::new(2_00))
    );

    let agg = family.engine.goal(goal_id, PARENT).await.unwrap();
    assert_eq!(agg.goal.current_amount, MoneyCents::new(67_00));
    assert!(!agg.milestones.iter().any(|m| m.percentage == 75 && m.is_achieved));

    // The child deposit left the spending balance, the bonus did not.
    let child = family.engine.child(family.child.id, PARENT).await.unwrap();
    assert_eq!(child.current_balance, MoneyCents::new(5_00));

    let notifications = family
        .engine
        .list_notifications(true, 50, PARENT)
        .await
        .unwrap();
    assert!(
        notifications
            .iter()
            .any(|n| n.kind == NotificationKind::MilestoneAchieved)
    );
}

#[tokio::test]
async fn parent_match_stops_at_the_cap() {
    let family = family().await;
    let goal_id = goal(&family, 500_00).await;
    family
        .engine
        .upsert_matching_rule(MatchingRuleCmd {
            goal_id,
            kind: MatchingKind::PercentageMatch,
            match_ratio: dec!(50),
            max_match_amount: Some(MoneyCents::new(20_00)),
            user_id: PARENT.to_string(),
        })
        .await
        .unwrap();
    fund(&family, 70_00).await;

    let mut results = Vec::new();
    for cents in [30_00, 30_00, 10_00] {
        results.push(deposit(&family, goal_id, cents).await.matched.cents());
    }
    assert_eq!(results, vec![15_00, 5_00, 0]);

    let agg = family.engine.goal(goal_id, PARENT).await.unwrap();
    let rule = agg.matching_rule.unwrap();
    assert_eq!(rule.total_matched_amount, MoneyCents::new(20_00));
    assert_eq!(agg.goal.current_amount, MoneyCents::new(90_00));

    let rows = family
        .engine
        .list_contributions(goal_id, PARENT)
        .await
        .unwrap();
    let matches = rows
        .iter()
        .filter(|c| c.kind == ContributionKind::ParentMatch)
        .count();
    assert_eq!(matches, 2);
    assert!(
        rows.iter()
            .filter(|c| c.kind == ContributionKind::ParentMatch)
            .all(|c| c.parent_match_id.is_some())
    );
}

#[tokio::test]
async fn goal_withdrawal_cannot_exceed_goal_amount() {
    let family = family().await;
    let goal_id = goal(&family, 100_00).await;
    gift(&family, goal_id, 10_00).await;

    let err = family
        .engine
        .withdraw_from_goal(goal_id, MoneyCents::new(10_01), None, KID)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientGoalBalance(_)));

    family
        .engine
        .withdraw_from_goal(goal_id, MoneyCents::new(4_00), None, KID)
        .await
        .unwrap();
    let agg = family.engine.goal(goal_id, PARENT).await.unwrap();
    assert_eq!(agg.goal.current_amount, MoneyCents::new(6_00));
    let child = family.engine.child(family.child.id, PARENT).await.unwrap();
    assert_eq!(child.current_balance, MoneyCents::new(4_00));
}

#[tokio::test]
async fn child_deposit_needs_spending_balance() {
    let family = family().await;
    let goal_id = goal(&family, 100_00).await;

    let err = family
        .engine
        .contribute_to_goal(ContributeCmd::new(
            goal_id,
            KID,
            MoneyCents::new(1_00),
            ContributionKind::ChildDeposit,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientBalance(_)));

    let agg = family.engine.goal(goal_id, PARENT).await.unwrap();
    assert_eq!(agg.goal.current_amount, MoneyCents::ZERO);
}

#[tokio::test]
async fn contribution_access_rules() {
    let family = family().await;
    let goal_id = goal(&family, 100_00).await;

    let gift_by_child = family
        .engine
        .contribute_to_goal(ContributeCmd::new(
            goal_id,
            KID,
            MoneyCents::new(5_00),
            ContributionKind::ParentGift,
        ))
        .await
        .unwrap_err();
    assert!(matches!(gift_by_child, EngineError::Forbidden(_)));

    let system_kind = family
        .engine
        .contribute_to_goal(ContributeCmd::new(
            goal_id,
            PARENT,
            MoneyCents::new(5_00),
            ContributionKind::ParentMatch,
        ))
        .await
        .unwrap_err();
    assert!(matches!(system_kind, EngineError::Forbidden(_)));

    let stranger = family.engine.goal(goal_id, OTHER_PARENT).await.unwrap_err();
    assert!(matches!(stranger, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn challenge_completes_and_pays_bonus() {
    let family = family().await;
    let goal_id = goal(&family, 100_00).await;
    let challenge = family
        .engine
        .start_challenge(ChallengeCmd {
            goal_id,
            target_amount: MoneyCents::new(20_00),
            bonus_amount: MoneyCents::new(5_00),
            end_date: Utc::now() + Duration::days(7),
            user_id: PARENT.to_string(),
        })
        .await
        .unwrap();
    assert_eq!(challenge.status, ChallengeStatus::Active);

    let first = gift(&family, goal_id, 10_00).await;
    assert_eq!(first.challenge_event, None);

    let second = gift(&family, goal_id, 10_00).await;
    assert_eq!(
        second.challenge_event,
        Some(ChallengeEvent::Completed {
            challenge_id: challenge.id,
            bonus: MoneyCents::new(5_00),
        })
    );

    let agg = family.engine.goal(goal_id, PARENT).await.unwrap();
    assert_eq!(agg.goal.current_amount, MoneyCents::new(25_00));
    assert_eq!(
        agg.challenge.map(|c| c.status),
        Some(ChallengeStatus::Completed)
    );
}

#[tokio::test]
async fn expired_challenges_are_swept() {
    let family = family().await;
    let goal_id = goal(&family, 100_00).await;
    let challenge = family
        .engine
        .start_challenge(ChallengeCmd {
            goal_id,
            target_amount: MoneyCents::new(20_00),
            bonus_amount: MoneyCents::new(5_00),
            end_date: Utc::now() + Duration::days(1),
            user_id: PARENT.to_string(),
        })
        .await
        .unwrap();

    let expired = family
        .engine
        .expire_challenges(Utc::now() + Duration::days(2))
        .await
        .unwrap();
    assert_eq!(expired.len(), 1);
    assert_eq!(expired[0].id, challenge.id);
    assert_eq!(expired[0].status, ChallengeStatus::Expired);

    // A new challenge can start once the old one is closed.
    family
        .engine
        .start_challenge(ChallengeCmd {
            goal_id,
            target_amount: MoneyCents::new(10_00),
            bonus_amount: MoneyCents::ZERO,
            end_date: Utc::now() + Duration::days(3),
            user_id: PARENT.to_string(),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn reaching_the_target_completes_then_purchase() {
    let family = family().await;
    let goal_id = goal(&family, 40_00).await;

    let err = family
        .engine
        .mark_goal_purchased(goal_id, PARENT)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));

    let outcome = gift(&family, goal_id, 40_00).await;
    assert!(outcome.goal_completed);

    let goal = family
        .engine
        .mark_goal_purchased(goal_id, PARENT)
        .await
        .unwrap();
    assert_eq!(goal.status, GoalStatus::Purchased);
    assert!(goal.purchased_at.is_some());

    let err = family
        .engine
        .contribute_to_goal(ContributeCmd::new(
            goal_id,
            PARENT,
            MoneyCents::new(1_00),
            ContributionKind::ParentGift,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));

    let open = family
        .engine
        .list_goals(family.child.id, false, PARENT)
        .await
        .unwrap();
    assert!(open.is_empty());
}

#[tokio::test]
async fn cancelling_a_goal_refunds_spending_balance() {
    let family = family().await;
    let goal_id = goal(&family, 100_00).await;
    gift(&family, goal_id, 30_00).await;

    let refund = family
        .engine
        .cancel_goal(goal_id, PARENT)
        .await
        .unwrap()
        .expect("goal had money");
    assert_eq!(refund.kind, ContributionKind::Withdrawal);
    assert_eq!(refund.amount, MoneyCents::new(-30_00));

    let child = family.engine.child(family.child.id, PARENT).await.unwrap();
    assert_eq!(child.current_balance, MoneyCents::new(30_00));
    let agg = family.engine.goal(goal_id, PARENT).await.unwrap();
    assert_eq!(agg.goal.status, GoalStatus::Cancelled);
    assert_eq!(agg.goal.current_amount, MoneyCents::ZERO);
}

#[tokio::test]
async fn oversized_gift_leaves_goal_untouched() {
    let family = family().await;
    let goal_id = goal(&family, 100_00).await;
    gift(&family, goal_id, 1_00).await;

    let err = family
        .engine
        .contribute_to_goal(ContributeCmd::new(
            goal_id,
            PARENT,
            MoneyCents::new(i64::MAX),
            ContributionKind::ParentGift,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let agg = family.engine.goal(goal_id, PARENT).await.unwrap();
    assert_eq!(agg.goal.current_amount, MoneyCents::new(1_00));
}
