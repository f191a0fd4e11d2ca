//! Savings goals: contributions, milestones, parent matching and challenges.

use api_types::goal::{
    ChallengeEvent as ApiChallengeEvent, ChallengeNew, ChallengeStatus as ApiChallengeStatus,
    ChallengeView, ContributionKind as ApiContributionKind, ContributionNew, ContributionResult,
    ContributionView, GoalDetail, GoalListQuery, GoalNew, GoalPause, GoalStatus as ApiGoalStatus,
    GoalUpdate, GoalView, GoalWithdraw, MatchingKind as ApiMatchingKind, MatchingRuleUpsert,
    MatchingRuleView, MilestoneBonus, MilestoneView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::{
    ChallengeCmd, ChallengeEvent, ChallengeStatus, ContributeCmd, ContributionKind,
    ContributionOutcome, GoalAggregate, GoalChallenge, GoalMilestone, GoalStatus, MatchingKind,
    MatchingRuleCmd, MoneyCents, NewGoalCmd, ParentMatchingRule, SavingsContribution, SavingsGoal,
    UpdateGoalCmd, User,
};
use uuid::Uuid;

use crate::{
    ServerError,
    children::{transfer_from_api, transfer_view},
    server::ServerState,
};

fn contribution_kind_view(kind: ContributionKind) -> ApiContributionKind {
    match kind {
        ContributionKind::ChildDeposit => ApiContributionKind::ChildDeposit,
        ContributionKind::AutoTransfer => ApiContributionKind::AutoTransfer,
        ContributionKind::ParentMatch => ApiContributionKind::ParentMatch,
        ContributionKind::ParentGift => ApiContributionKind::ParentGift,
        ContributionKind::ChallengeBonus => ApiContributionKind::ChallengeBonus,
        ContributionKind::Withdrawal => ApiContributionKind::Withdrawal,
        ContributionKind::ExternalGift => ApiContributionKind::ExternalGift,
    }
}

fn contribution_kind_from_api(kind: ApiContributionKind) -> ContributionKind {
    match kind {
        ApiContributionKind::ChildDeposit => ContributionKind::ChildDeposit,
        ApiContributionKind::AutoTransfer => ContributionKind::AutoTransfer,
        ApiContributionKind::ParentMatch => ContributionKind::ParentMatch,
        ApiContributionKind::ParentGift => ContributionKind::ParentGift,
        ApiContributionKind::ChallengeBonus => ContributionKind::ChallengeBonus,
        ApiContributionKind::Withdrawal => ContributionKind::Withdrawal,
        ApiContributionKind::ExternalGift => ContributionKind::ExternalGift,
    }
}

fn goal_view(goal: SavingsGoal) -> GoalView {
    let progress_percent = goal.progress_percent();
    GoalView {
        id: goal.id,
        child_id: goal.child_id,
        name: goal.name,
        description: goal.description,
        target_amount_minor: goal.target_amount.cents(),
        current_amount_minor: goal.current_amount.cents(),
        progress_percent,
        status: match goal.status {
            GoalStatus::Active => ApiGoalStatus::Active,
            GoalStatus::Completed => ApiGoalStatus::Completed,
            GoalStatus::Purchased => ApiGoalStatus::Purchased,
            GoalStatus::Cancelled => ApiGoalStatus::Cancelled,
            GoalStatus::Paused => ApiGoalStatus::Paused,
        },
        priority: goal.priority,
        auto_transfer: transfer_view(goal.auto_transfer),
        created_at: goal.created_at,
        completed_at: goal.completed_at,
        purchased_at: goal.purchased_at,
    }
}

fn milestone_view(milestone: GoalMilestone) -> MilestoneView {
    MilestoneView {
        percentage: milestone.percentage,
        target_amount_minor: milestone.target_amount.cents(),
        is_achieved: milestone.is_achieved,
        achieved_at: milestone.achieved_at,
        bonus_minor: milestone.bonus_amount.map(MoneyCents::cents),
    }
}

fn matching_rule_view(rule: ParentMatchingRule) -> MatchingRuleView {
    MatchingRuleView {
        id: rule.id,
        kind: match rule.kind {
            MatchingKind::RatioMatch => ApiMatchingKind::RatioMatch,
            MatchingKind::PercentageMatch => ApiMatchingKind::PercentageMatch,
        },
        match_ratio: rule.match_ratio,
        max_match_minor: rule.max_match_amount.map(MoneyCents::cents),
        total_matched_minor: rule.total_matched_amount.cents(),
        is_active: rule.is_active,
    }
}

fn challenge_view(challenge: GoalChallenge) -> ChallengeView {
    ChallengeView {
        id: challenge.id,
        target_amount_minor: challenge.target_amount.cents(),
        bonus_minor: challenge.bonus_amount.cents(),
        start_amount_minor: challenge.start_amount.cents(),
        start_date: challenge.start_date,
        end_date: challenge.end_date,
        status: match challenge.status {
            ChallengeStatus::Active => ApiChallengeStatus::Active,
            ChallengeStatus::Completed => ApiChallengeStatus::Completed,
            ChallengeStatus::Expired => ApiChallengeStatus::Expired,
            ChallengeStatus::Cancelled => ApiChallengeStatus::Cancelled,
        },
        completed_at: challenge.completed_at,
    }
}

fn goal_detail(aggregate: GoalAggregate) -> GoalDetail {
    GoalDetail {
        goal: goal_view(aggregate.goal),
        matching_rule: aggregate.matching_rule.map(matching_rule_view),
        milestones: aggregate.milestones.into_iter().map(milestone_view).collect(),
        challenge: aggregate.challenge.map(challenge_view),
    }
}

pub(crate) fn contribution_view(contribution: SavingsContribution) -> ContributionView {
    ContributionView {
        id: contribution.id,
        goal_id: contribution.goal_id,
        kind: contribution_kind_view(contribution.kind),
        amount_minor: contribution.amount.cents(),
        goal_balance_after_minor: contribution.goal_balance_after.cents(),
        source_transaction_id: contribution.source_transaction_id,
        parent_match_id: contribution.parent_match_id,
        description: contribution.description,
        created_by: contribution.created_by,
        created_at: contribution.created_at,
    }
}

fn contribution_result(outcome: ContributionOutcome) -> ContributionResult {
    ContributionResult {
        matched_minor: outcome.matched.cents(),
        achieved_milestones: outcome
            .achieved_milestones
            .iter()
            .map(|milestone| milestone.percentage)
            .collect(),
        challenge_event: outcome.challenge_event.map(|event| match event {
            ChallengeEvent::Completed {
                challenge_id,
                bonus,
            } => ApiChallengeEvent::Completed {
                challenge_id,
                bonus_minor: bonus.cents(),
            },
            ChallengeEvent::Expired { challenge_id } => {
                ApiChallengeEvent::Expired { challenge_id }
            }
        }),
        goal_completed: outcome.goal_completed,
        contributions: outcome
            .contributions
            .into_iter()
            .map(contribution_view)
            .collect(),
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(child_id): Path<Uuid>,
    Query(query): Query<GoalListQuery>,
) -> Result<Json<Vec<GoalView>>, ServerError> {
    let goals = state
        .engine
        .list_goals(
            child_id,
            query.include_closed.unwrap_or(false),
            &user.username,
        )
        .await?;
    Ok(Json(goals.into_iter().map(goal_view).collect()))
}

pub async fn goal_new(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(child_id): Path<Uuid>,
    Json(payload): Json<GoalNew>,
) -> Result<(StatusCode, Json<GoalDetail>), ServerError> {
    let mut cmd = NewGoalCmd::new(
        child_id,
        user.username,
        payload.name,
        MoneyCents::new(payload.target_amount_minor),
    );
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }
    if let Some(priority) = payload.priority {
        cmd = cmd.priority(priority);
    }
    if let Some(transfer) = payload.auto_transfer.as_ref() {
        cmd = cmd.auto_transfer(transfer_from_api(transfer)?);
    }

    let aggregate = state.engine.create_goal(cmd).await?;
    Ok((StatusCode::CREATED, Json(goal_detail(aggregate))))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(goal_id): Path<Uuid>,
) -> Result<Json<GoalDetail>, ServerError> {
    let aggregate = state.engine.goal(goal_id, &user.username).await?;
    Ok(Json(goal_detail(aggregate)))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(goal_id): Path<Uuid>,
    Json(payload): Json<GoalUpdate>,
) -> Result<Json<GoalDetail>, ServerError> {
    let mut cmd = UpdateGoalCmd::new(goal_id, user.username);
    cmd.name = payload.name;
    cmd.description = payload
        .description
        .map(|description| (!description.trim().is_empty()).then_some(description));
    cmd.target_amount = payload.target_amount_minor.map(MoneyCents::new);
    cmd.priority = payload.priority;
    cmd.auto_transfer = payload
        .auto_transfer
        .as_ref()
        .map(transfer_from_api)
        .transpose()?;

    let aggregate = state.engine.update_goal(cmd).await?;
    Ok(Json(goal_detail(aggregate)))
}

pub async fn contribute(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(goal_id): Path<Uuid>,
    Json(payload): Json<ContributionNew>,
) -> Result<(StatusCode, Json<ContributionResult>), ServerError> {
    let mut cmd = ContributeCmd::new(
        goal_id,
        user.username,
        MoneyCents::new(payload.amount_minor),
        contribution_kind_from_api(payload.kind),
    );
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }

    let outcome = state.engine.contribute_to_goal(cmd).await?;
    Ok((StatusCode::CREATED, Json(contribution_result(outcome))))
}

pub async fn withdraw(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(goal_id): Path<Uuid>,
    Json(payload): Json<GoalWithdraw>,
) -> Result<Json<ContributionView>, ServerError> {
    let contribution = state
        .engine
        .withdraw_from_goal(
            goal_id,
            MoneyCents::new(payload.amount_minor),
            payload.description.as_deref(),
            &user.username,
        )
        .await?;
    Ok(Json(contribution_view(contribution)))
}

pub async fn list_contributions(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(goal_id): Path<Uuid>,
) -> Result<Json<Vec<ContributionView>>, ServerError> {
    let contributions = state
        .engine
        .list_contributions(goal_id, &user.username)
        .await?;
    Ok(Json(
        contributions.into_iter().map(contribution_view).collect(),
    ))
}

pub async fn set_milestone_bonus(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path((goal_id, percentage)): Path<(Uuid, i32)>,
    Json(payload): Json<MilestoneBonus>,
) -> Result<Json<MilestoneView>, ServerError> {
    let milestone = state
        .engine
        .set_milestone_bonus(
            goal_id,
            percentage,
            payload.bonus_minor.map(MoneyCents::new),
            &user.username,
        )
        .await?;
    Ok(Json(milestone_view(milestone)))
}

pub async fn upsert_matching_rule(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(goal_id): Path<Uuid>,
    Json(payload): Json<MatchingRuleUpsert>,
) -> Result<Json<MatchingRuleView>, ServerError> {
    let cmd = MatchingRuleCmd {
        goal_id,
        kind: match payload.kind {
            ApiMatchingKind::RatioMatch => MatchingKind::RatioMatch,
            ApiMatchingKind::PercentageMatch => MatchingKind::PercentageMatch,
        },
        match_ratio: payload.match_ratio,
        max_match_amount: payload.max_match_minor.map(MoneyCents::new),
        user_id: user.username,
    };

    let rule = state.engine.upsert_matching_rule(cmd).await?;
    Ok(Json(matching_rule_view(rule)))
}

pub async fn remove_matching_rule(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(goal_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .remove_matching_rule(goal_id, &user.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn start_challenge(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(goal_id): Path<Uuid>,
    Json(payload): Json<ChallengeNew>,
) -> Result<(StatusCode, Json<ChallengeView>), ServerError> {
    let cmd = ChallengeCmd {
        goal_id,
        target_amount: MoneyCents::new(payload.target_amount_minor),
        bonus_amount: MoneyCents::new(payload.bonus_minor),
        end_date: payload.end_date.with_timezone(&Utc),
        user_id: user.username,
    };

    let challenge = state.engine.start_challenge(cmd).await?;
    Ok((StatusCode::CREATED, Json(challenge_view(challenge))))
}

pub async fn cancel_challenge(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(goal_id): Path<Uuid>,
) -> Result<Json<ChallengeView>, ServerError> {
    let challenge = state
        .engine
        .cancel_challenge(goal_id, &user.username)
        .await?;
    Ok(Json(challenge_view(challenge)))
}

pub async fn purchase(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(goal_id): Path<Uuid>,
) -> Result<Json<GoalView>, ServerError> {
    let goal = state
        .engine
        .mark_goal_purchased(goal_id, &user.username)
        .await?;
    Ok(Json(goal_view(goal)))
}

pub async fn set_paused(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(goal_id): Path<Uuid>,
    Json(payload): Json<GoalPause>,
) -> Result<Json<GoalView>, ServerError> {
    let goal = state
        .engine
        .set_goal_paused(goal_id, payload.paused, &user.username)
        .await?;
    Ok(Json(goal_view(goal)))
}

/// Cancels the goal. The refund row, if any money was left on it, is returned.
pub async fn cancel(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(goal_id): Path<Uuid>,
) -> Result<Json<Option<ContributionView>>, ServerError> {
    let refund = state.engine.cancel_goal(goal_id, &user.username).await?;
    Ok(Json(refund.map(contribution_view)))
}
