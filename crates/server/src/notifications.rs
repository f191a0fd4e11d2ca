use api_types::notification::{
    NotificationKind as ApiKind, NotificationQuery, NotificationView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{Notification, NotificationKind, User};
use uuid::Uuid;

use crate::{ServerError, ledger::DEFAULT_LIST_LIMIT, server::ServerState};

fn notification_view(notification: Notification) -> NotificationView {
    let kind = match notification.kind {
        NotificationKind::AllowancePaid => ApiKind::AllowancePaid,
        NotificationKind::SavingsTransfer => ApiKind::SavingsTransfer,
        NotificationKind::MilestoneAchieved => ApiKind::MilestoneAchieved,
        NotificationKind::GoalCompleted => ApiKind::GoalCompleted,
        NotificationKind::ParentMatch => ApiKind::ParentMatch,
        NotificationKind::ChallengeCompleted => ApiKind::ChallengeCompleted,
        NotificationKind::ChallengeExpired => ApiKind::ChallengeExpired,
        NotificationKind::BudgetWarning => ApiKind::BudgetWarning,
    };
    NotificationView {
        id: notification.id,
        child_id: notification.child_id,
        kind,
        title: notification.title,
        message: notification.message,
        is_read: notification.is_read,
        created_at: notification.created_at,
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<NotificationQuery>,
) -> Result<Json<Vec<NotificationView>>, ServerError> {
    let notifications = state
        .engine
        .list_notifications(
            query.unread_only.unwrap_or(false),
            query.limit.unwrap_or(DEFAULT_LIST_LIMIT),
            &user.username,
        )
        .await?;
    Ok(Json(
        notifications.into_iter().map(notification_view).collect(),
    ))
}

pub async fn mark_read(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(notification_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .mark_notification_read(notification_id, &user.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
