//! Category budgets of a child.

use api_types::budget::{
    BudgetCheckQuery, BudgetCheckView, BudgetPeriod as ApiPeriod, BudgetUpsert, BudgetView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{BudgetCheckResult, BudgetCmd, BudgetPeriod, CategoryBudget, MoneyCents, User};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

pub(crate) fn budget_check_view(check: BudgetCheckResult) -> BudgetCheckView {
    BudgetCheckView {
        allowed: check.allowed,
        message: check.message,
        current_spending_minor: check.current_spending.cents(),
        limit_minor: check.limit.map(MoneyCents::cents),
        remaining_after_minor: check.remaining_after.map(MoneyCents::cents),
    }
}

fn budget_view(budget: CategoryBudget) -> BudgetView {
    BudgetView {
        id: budget.id,
        category: budget.category,
        limit_minor: budget.limit.cents(),
        period: match budget.period {
            BudgetPeriod::Weekly => ApiPeriod::Weekly,
            BudgetPeriod::Monthly => ApiPeriod::Monthly,
        },
        alert_threshold_percent: budget.alert_threshold_percent,
        enforce_limit: budget.enforce_limit,
        is_active: budget.is_active,
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(child_id): Path<Uuid>,
) -> Result<Json<Vec<BudgetView>>, ServerError> {
    let budgets = state.engine.list_budgets(child_id, &user.username).await?;
    Ok(Json(budgets.into_iter().map(budget_view).collect()))
}

pub async fn upsert(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(child_id): Path<Uuid>,
    Json(payload): Json<BudgetUpsert>,
) -> Result<Json<BudgetView>, ServerError> {
    let period = match payload.period {
        ApiPeriod::Weekly => BudgetPeriod::Weekly,
        ApiPeriod::Monthly => BudgetPeriod::Monthly,
    };
    let mut cmd = BudgetCmd::new(
        child_id,
        user.username,
        payload.category,
        MoneyCents::new(payload.limit_minor),
        period,
    )
    .enforce_limit(payload.enforce_limit.unwrap_or(false));
    if let Some(percent) = payload.alert_threshold_percent {
        cmd = cmd.alert_threshold_percent(percent);
    }

    let budget = state.engine.upsert_budget(cmd).await?;
    Ok(Json(budget_view(budget)))
}

pub async fn remove(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path((child_id, category)): Path<(Uuid, String)>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .remove_budget(child_id, &category, &user.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn check(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(child_id): Path<Uuid>,
    Query(query): Query<BudgetCheckQuery>,
) -> Result<Json<BudgetCheckView>, ServerError> {
    let check = state
        .engine
        .check_budget(
            child_id,
            &query.category,
            MoneyCents::new(query.amount_minor),
            &user.username,
        )
        .await?;
    Ok(Json(budget_check_view(check)))
}
