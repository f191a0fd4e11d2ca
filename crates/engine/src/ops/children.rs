use chrono::{Utc, Weekday};
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Child, EngineError, MoneyCents, NewChildCmd, ResultEngine, UserRole, children,
    util::{normalize_optional_text, normalize_required_name, weekday_to_db},
};

use super::{AccessLevel, Engine, with_tx};

fn validate_allowance(amount: MoneyCents) -> ResultEngine<()> {
    if amount.is_negative() {
        return Err(EngineError::InvalidAmount(
            "weekly allowance must be >= 0".to_string(),
        ));
    }
    Ok(())
}

impl Engine {
    /// Adds a child to the family of the calling parent.
    pub async fn create_child(&self, cmd: NewChildCmd) -> ResultEngine<Child> {
        let name = normalize_required_name(&cmd.name, "child")?;
        validate_allowance(cmd.weekly_allowance)?;
        cmd.savings_transfer.validate()?;
        with_tx!(self, |db_tx| {
            let (_, family_id) = self.require_parent(&db_tx, &cmd.user_id).await?;

            let mut child = Child::new(family_id, name, cmd.weekly_allowance, Utc::now());
            child.allowance_day = cmd.allowance_day;
            child.savings_transfer = cmd.savings_transfer;
            child.allow_debt = cmd.allow_debt;

            let active: children::ActiveModel = (&child).into();
            active.insert(&db_tx).await?;

            tracing::info!(child = %child.id, family = %family_id, "child created");
            Ok(child)
        })
    }

    /// Return a child snapshot from DB.
    pub async fn child(&self, child_id: Uuid, user_id: &str) -> ResultEngine<Child> {
        with_tx!(self, |db_tx| {
            let (child, _) = self
                .require_child(&db_tx, child_id, user_id, AccessLevel::Read)
                .await?;
            Ok(child)
        })
    }

    /// Active children visible to `user_id`: the family for a parent, the
    /// linked record for a child login.
    pub async fn list_children(&self, user_id: &str) -> ResultEngine<Vec<Child>> {
        with_tx!(self, |db_tx| {
            let user = self.require_user(&db_tx, user_id).await?;
            let query = match user.role {
                UserRole::Parent => {
                    let family_id = user.family_id.ok_or_else(|| {
                        EngineError::InvalidState(format!("{user_id} does not belong to a family"))
                    })?;
                    children::Entity::find()
                        .filter(children::Column::FamilyId.eq(family_id.to_string()))
                }
                UserRole::Child => children::Entity::find()
                    .filter(children::Column::UserId.eq(user_id.to_string())),
            };
            let children = query
                .filter(children::Column::IsActive.eq(true))
                .order_by_asc(children::Column::CreatedAt)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Child::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;
            Ok(children)
        })
    }

    /// Changes the weekly amount and the payday.
    pub async fn update_allowance(
        &self,
        child_id: Uuid,
        weekly_allowance: MoneyCents,
        allowance_day: Option<Weekday>,
        user_id: &str,
    ) -> ResultEngine<Child> {
        validate_allowance(weekly_allowance)?;
        with_tx!(self, |db_tx| {
            let (mut child, _) = self
                .require_child(&db_tx, child_id, user_id, AccessLevel::Manage)
                .await?;
            child.weekly_allowance = weekly_allowance;
            child.allowance_day = allowance_day;

            let active = children::ActiveModel {
                id: ActiveValue::Set(child.id.to_string()),
                weekly_allowance_minor: ActiveValue::Set(weekly_allowance.cents()),
                allowance_day: ActiveValue::Set(weekday_to_db(allowance_day)),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(child)
        })
    }

    /// Stops scheduled allowance payments until resumed.
    pub async fn pause_allowance(
        &self,
        child_id: Uuid,
        reason: Option<&str>,
        user_id: &str,
    ) -> ResultEngine<Child> {
        self.set_allowance_paused(child_id, true, normalize_optional_text(reason), user_id)
            .await
    }

    pub async fn resume_allowance(&self, child_id: Uuid, user_id: &str) -> ResultEngine<Child> {
        self.set_allowance_paused(child_id, false, None, user_id)
            .await
    }

    async fn set_allowance_paused(
        &self,
        child_id: Uuid,
        paused: bool,
        reason: Option<String>,
        user_id: &str,
    ) -> ResultEngine<Child> {
        with_tx!(self, |db_tx| {
            let (mut child, _) = self
                .require_child(&db_tx, child_id, user_id, AccessLevel::Manage)
                .await?;
            child.allowance_paused = paused;
            child.allowance_paused_reason = reason;

            let active = children::ActiveModel {
                id: ActiveValue::Set(child.id.to_string()),
                allowance_paused: ActiveValue::Set(child.allowance_paused),
                allowance_paused_reason: ActiveValue::Set(child.allowance_paused_reason.clone()),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            tracing::info!(child = %child.id, paused, "allowance pause changed");
            Ok(child)
        })
    }

    /// Allows or forbids a negative spending balance. Debt can only be
    /// disabled once the balance is back to zero or above.
    pub async fn set_allow_debt(
        &self,
        child_id: Uuid,
        allow_debt: bool,
        user_id: &str,
    ) -> ResultEngine<Child> {
        with_tx!(self, |db_tx| {
            let (mut child, _) = self
                .require_child(&db_tx, child_id, user_id, AccessLevel::Manage)
                .await?;
            if !allow_debt && child.current_balance.is_negative() {
                return Err(EngineError::InvalidState(format!(
                    "{} is {} in debt",
                    child.name,
                    child.current_balance.abs()
                )));
            }
            child.allow_debt = allow_debt;

            let active = children::ActiveModel {
                id: ActiveValue::Set(child.id.to_string()),
                allow_debt: ActiveValue::Set(allow_debt),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(child)
        })
    }

    /// Deactivates a child. Rows are kept; the child no longer receives
    /// allowance and accepts no new money movements.
    pub async fn deactivate_child(&self, child_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let (child, _) = self
                .require_child(&db_tx, child_id, user_id, AccessLevel::Manage)
                .await?;
            let active = children::ActiveModel {
                id: ActiveValue::Set(child.id.to_string()),
                is_active: ActiveValue::Set(false),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            tracing::info!(child = %child.id, "child deactivated");
            Ok(())
        })
    }
}
