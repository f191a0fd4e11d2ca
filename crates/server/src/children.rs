//! Child account endpoints.

use api_types::{
    child::{AllowancePause, AllowanceUpdate, ChildNew, ChildView, DebtUpdate, LinkUser},
    savings::{SavingsTransfer as ApiTransfer, TransferKind},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{Child, MoneyCents, NewChildCmd, SavingsTransfer, User};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

pub(crate) fn transfer_view(transfer: SavingsTransfer) -> ApiTransfer {
    match transfer {
        SavingsTransfer::None => ApiTransfer {
            kind: TransferKind::None,
            amount_minor: None,
            percentage: None,
        },
        SavingsTransfer::FixedAmount(amount) => ApiTransfer {
            kind: TransferKind::FixedAmount,
            amount_minor: Some(amount.cents()),
            percentage: None,
        },
        SavingsTransfer::Percentage(percentage) => ApiTransfer {
            kind: TransferKind::Percentage,
            amount_minor: None,
            percentage: Some(percentage),
        },
    }
}

pub(crate) fn transfer_from_api(transfer: &ApiTransfer) -> Result<SavingsTransfer, ServerError> {
    let transfer = match transfer.kind {
        TransferKind::None => SavingsTransfer::None,
        TransferKind::FixedAmount => {
            let amount = transfer.amount_minor.ok_or_else(|| {
                ServerError::Generic("amount_minor is required for fixed_amount".to_string())
            })?;
            SavingsTransfer::FixedAmount(MoneyCents::new(amount))
        }
        TransferKind::Percentage => {
            let percentage = transfer.percentage.ok_or_else(|| {
                ServerError::Generic("percentage is required for percentage".to_string())
            })?;
            SavingsTransfer::Percentage(percentage)
        }
    };
    transfer.validate()?;
    Ok(transfer)
}

pub(crate) fn child_view(child: Child) -> ChildView {
    ChildView {
        id: child.id,
        family_id: child.family_id,
        next_allowance_date: engine::next_due_date(&child),
        savings_transfer: transfer_view(child.savings_transfer),
        username: child.user_id,
        name: child.name,
        weekly_allowance_minor: child.weekly_allowance.cents(),
        current_balance_minor: child.current_balance.cents(),
        savings_balance_minor: child.savings_balance.cents(),
        last_allowance_date: child.last_allowance_date,
        allowance_day: child.allowance_day,
        allowance_paused: child.allowance_paused,
        allowance_paused_reason: child.allowance_paused_reason,
        allow_debt: child.allow_debt,
        is_active: child.is_active,
        created_at: child.created_at,
    }
}

pub async fn child_new(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<ChildNew>,
) -> Result<(StatusCode, Json<ChildView>), ServerError> {
    let mut cmd = NewChildCmd::new(
        user.username,
        payload.name,
        MoneyCents::new(payload.weekly_allowance_minor),
    )
    .allow_debt(payload.allow_debt.unwrap_or(false));
    if let Some(day) = payload.allowance_day {
        cmd = cmd.allowance_day(day);
    }
    if let Some(transfer) = payload.savings_transfer.as_ref() {
        cmd = cmd.savings_transfer(transfer_from_api(transfer)?);
    }

    let child = state.engine.create_child(cmd).await?;
    Ok((StatusCode::CREATED, Json(child_view(child))))
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<ChildView>>, ServerError> {
    let children = state.engine.list_children(&user.username).await?;
    Ok(Json(children.into_iter().map(child_view).collect()))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(child_id): Path<Uuid>,
) -> Result<Json<ChildView>, ServerError> {
    let child = state.engine.child(child_id, &user.username).await?;
    Ok(Json(child_view(child)))
}

pub async fn update_allowance(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(child_id): Path<Uuid>,
    Json(payload): Json<AllowanceUpdate>,
) -> Result<Json<ChildView>, ServerError> {
    let child = state
        .engine
        .update_allowance(
            child_id,
            MoneyCents::new(payload.weekly_allowance_minor),
            payload.allowance_day,
            &user.username,
        )
        .await?;
    Ok(Json(child_view(child)))
}

pub async fn pause_allowance(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(child_id): Path<Uuid>,
    Json(payload): Json<AllowancePause>,
) -> Result<Json<ChildView>, ServerError> {
    let child = state
        .engine
        .pause_allowance(child_id, payload.reason.as_deref(), &user.username)
        .await?;
    Ok(Json(child_view(child)))
}

pub async fn resume_allowance(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(child_id): Path<Uuid>,
) -> Result<Json<ChildView>, ServerError> {
    let child = state
        .engine
        .resume_allowance(child_id, &user.username)
        .await?;
    Ok(Json(child_view(child)))
}

pub async fn set_allow_debt(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(child_id): Path<Uuid>,
    Json(payload): Json<DebtUpdate>,
) -> Result<Json<ChildView>, ServerError> {
    let child = state
        .engine
        .set_allow_debt(child_id, payload.allow_debt, &user.username)
        .await?;
    Ok(Json(child_view(child)))
}

pub async fn update_savings_transfer(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(child_id): Path<Uuid>,
    Json(payload): Json<ApiTransfer>,
) -> Result<Json<ChildView>, ServerError> {
    let transfer = transfer_from_api(&payload)?;
    let child = state
        .engine
        .update_savings_transfer(child_id, transfer, &user.username)
        .await?;
    Ok(Json(child_view(child)))
}

pub async fn link_user(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(child_id): Path<Uuid>,
    Json(payload): Json<LinkUser>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .link_child_user(child_id, &payload.username, &user.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn deactivate(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(child_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .deactivate_child(child_id, &user.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
