use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    Child, EngineError, Notification, NotificationKind, ResultEngine, UserRole, children,
    notifications,
};

use super::{Engine, with_tx};

impl Engine {
    /// Appends a notification for `child`.
    pub(super) async fn notify(
        &self,
        db: &DatabaseTransaction,
        child: &Child,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> ResultEngine<()> {
        let notification = Notification::new(child.family_id, child.id, kind, title, message, now);
        let active: notifications::ActiveModel = (&notification).into();
        active.insert(db).await?;
        Ok(())
    }

    /// Lists the newest notifications visible to `user_id`: the whole family
    /// for a parent, their own records for a child.
    pub async fn list_notifications(
        &self,
        unread_only: bool,
        limit: u64,
        user_id: &str,
    ) -> ResultEngine<Vec<Notification>> {
        with_tx!(self, |db_tx| {
            let user = self.require_user(&db_tx, user_id).await?;
            let mut query = notifications::Entity::find();
            query = match user.role {
                UserRole::Parent => {
                    let family_id = user.family_id.ok_or_else(|| {
                        EngineError::InvalidState(format!("{user_id} does not belong to a family"))
                    })?;
                    query.filter(notifications::Column::FamilyId.eq(family_id.to_string()))
                }
                UserRole::Child => {
                    let own: Vec<String> = children::Entity::find()
                        .filter(children::Column::UserId.eq(user_id.to_string()))
                        .all(&db_tx)
                        .await?
                        .into_iter()
                        .map(|c| c.id)
                        .collect();
                    query.filter(notifications::Column::ChildId.is_in(own))
                }
            };
            if unread_only {
                query = query.filter(notifications::Column::IsRead.eq(false));
            }

            let notifications = query
                .order_by_desc(notifications::Column::CreatedAt)
                .limit(limit)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Notification::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;
            Ok(notifications)
        })
    }

    pub async fn mark_notification_read(
        &self,
        notification_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let user = self.require_user(&db_tx, user_id).await?;
            let model = notifications::Entity::find_by_id(notification_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound(format!("notification {notification_id}")))?;

            let visible = match user.role {
                UserRole::Parent => {
                    user.family_id.map(|id| id.to_string()).as_deref()
                        == Some(model.family_id.as_str())
                }
                UserRole::Child => children::Entity::find_by_id(model.child_id.clone())
                    .filter(children::Column::UserId.eq(user_id.to_string()))
                    .one(&db_tx)
                    .await?
                    .is_some(),
            };
            if !visible {
                return Err(EngineError::NotFound(format!("notification {notification_id}")));
            }

            let active = notifications::ActiveModel {
                id: ActiveValue::Set(model.id),
                is_read: ActiveValue::Set(true),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(())
        })
    }
}
