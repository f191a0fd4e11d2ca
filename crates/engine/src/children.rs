//! The module contains `Child` account state and its table.

use chrono::{DateTime, Utc, Weekday};
use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, MoneyCents, ResultEngine, SavingsTransfer,
    util::{parse_uuid, weekday_from_db, weekday_to_db},
};

/// A child account.
///
/// `current_balance` is the spendable balance and may only go below zero when
/// `allow_debt` is set. `savings_balance` is fed by the savings sweep and by
/// manual deposits.
#[derive(Clone, Debug, PartialEq)]
pub struct Child {
    pub id: Uuid,
    pub family_id: Uuid,
    /// Login of the child, when the child has one.
    pub user_id: Option<String>,
    pub name: String,
    pub weekly_allowance: MoneyCents,
    pub current_balance: MoneyCents,
    pub savings_balance: MoneyCents,
    pub last_allowance_date: Option<DateTime<Utc>>,
    /// Fixed payday. `None` means a rolling 7-day window.
    pub allowance_day: Option<Weekday>,
    pub allowance_paused: bool,
    pub allowance_paused_reason: Option<String>,
    pub savings_transfer: SavingsTransfer,
    pub allow_debt: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Child {
    pub fn new(
        family_id: Uuid,
        name: String,
        weekly_allowance: MoneyCents,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            family_id,
            user_id: None,
            name,
            weekly_allowance,
            current_balance: MoneyCents::ZERO,
            savings_balance: MoneyCents::ZERO,
            last_allowance_date: None,
            allowance_day: None,
            allowance_paused: false,
            allowance_paused_reason: None,
            savings_transfer: SavingsTransfer::None,
            allow_debt: false,
            is_active: true,
            created_at,
        }
    }

    /// Spending balance that can be moved out without going into debt.
    pub fn available_balance(&self) -> MoneyCents {
        self.current_balance.max(MoneyCents::ZERO)
    }

    /// Checks that debiting `amount` keeps the debt invariant.
    pub fn ensure_can_debit(&self, amount: MoneyCents) -> ResultEngine<()> {
        if !self.allow_debt && self.current_balance - amount < MoneyCents::ZERO {
            return Err(EngineError::InsufficientBalance(format!(
                "{} has {} available, {} requested",
                self.name, self.current_balance, amount
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "children")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub family_id: String,
    pub user_id: Option<String>,
    pub name: String,
    pub weekly_allowance_minor: i64,
    pub current_balance_minor: i64,
    pub savings_balance_minor: i64,
    pub last_allowance_date: Option<DateTimeUtc>,
    pub allowance_day: Option<i32>,
    pub allowance_paused: bool,
    pub allowance_paused_reason: Option<String>,
    pub savings_transfer_type: String,
    pub savings_transfer_amount_minor: i64,
    pub savings_transfer_percentage: String,
    pub allow_debt: bool,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::families::Entity",
        from = "Column::FamilyId",
        to = "super::families::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Family,
    #[sea_orm(has_many = "super::savings_goals::Entity")]
    SavingsGoals,
}

impl Related<super::families::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Family.def()
    }
}

impl Related<super::savings_goals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SavingsGoals.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Child {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let (transfer_kind, transfer_amount, transfer_percentage) = (
            model.savings_transfer_type.as_str(),
            model.savings_transfer_amount_minor,
            model.savings_transfer_percentage.as_str(),
        );
        Ok(Self {
            id: parse_uuid(&model.id, "child")?,
            family_id: parse_uuid(&model.family_id, "family")?,
            user_id: model.user_id,
            name: model.name,
            weekly_allowance: MoneyCents::new(model.weekly_allowance_minor),
            current_balance: MoneyCents::new(model.current_balance_minor),
            savings_balance: MoneyCents::new(model.savings_balance_minor),
            last_allowance_date: model.last_allowance_date,
            allowance_day: weekday_from_db(model.allowance_day)?,
            allowance_paused: model.allowance_paused,
            allowance_paused_reason: model.allowance_paused_reason,
            savings_transfer: SavingsTransfer::from_parts(
                transfer_kind,
                transfer_amount,
                transfer_percentage,
            )?,
            allow_debt: model.allow_debt,
            is_active: model.is_active,
            created_at: model.created_at,
        })
    }
}

impl From<&Child> for ActiveModel {
    fn from(child: &Child) -> Self {
        let (kind, amount_minor, percentage) = child.savings_transfer.to_parts();
        Self {
            id: ActiveValue::Set(child.id.to_string()),
            family_id: ActiveValue::Set(child.family_id.to_string()),
            user_id: ActiveValue::Set(child.user_id.clone()),
            name: ActiveValue::Set(child.name.clone()),
            weekly_allowance_minor: ActiveValue::Set(child.weekly_allowance.cents()),
            current_balance_minor: ActiveValue::Set(child.current_balance.cents()),
            savings_balance_minor: ActiveValue::Set(child.savings_balance.cents()),
            last_allowance_date: ActiveValue::Set(child.last_allowance_date),
            allowance_day: ActiveValue::Set(weekday_to_db(child.allowance_day)),
            allowance_paused: ActiveValue::Set(child.allowance_paused),
            allowance_paused_reason: ActiveValue::Set(child.allowance_paused_reason.clone()),
            savings_transfer_type: ActiveValue::Set(kind.as_str().to_string()),
            savings_transfer_amount_minor: ActiveValue::Set(amount_minor),
            savings_transfer_percentage: ActiveValue::Set(percentage),
            allow_debt: ActiveValue::Set(child.allow_debt),
            is_active: ActiveValue::Set(child.is_active),
            created_at: ActiveValue::Set(child.created_at),
        }
    }
}

/// Only the balance columns, for the hot path of ledger operations.
pub(crate) fn balances_active_model(child: &Child) -> ActiveModel {
    ActiveModel {
        id: ActiveValue::Set(child.id.to_string()),
        current_balance_minor: ActiveValue::Set(child.current_balance.cents()),
        savings_balance_minor: ActiveValue::Set(child.savings_balance.cents()),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn child() -> Child {
        Child::new(
            Uuid::new_v4(),
            "Ada".to_string(),
            MoneyCents::new(10_00),
            Utc.timestamp_opt(0, 0).unwrap(),
        )
    }

    #[test]
    fn debit_beyond_balance_requires_allow_debt() {
        let mut child = child();
        child.current_balance = MoneyCents::new(5_00);

        assert!(child.ensure_can_debit(MoneyCents::new(5_00)).is_ok());
        assert!(matches!(
            child.ensure_can_debit(MoneyCents::new(5_01)),
            Err(EngineError::InsufficientBalance(_))
        ));

        child.allow_debt = true;
        assert!(child.ensure_can_debit(MoneyCents::new(50_00)).is_ok());
    }

    #[test]
    fn model_round_trip_keeps_transfer_settings() {
        let mut child = child();
        child.allowance_day = Some(Weekday::Fri);
        child.savings_transfer = SavingsTransfer::Percentage(rust_decimal::Decimal::new(125, 1));

        let active: ActiveModel = (&child).into();
        let model = Model {
            id: active.id.unwrap(),
            family_id: active.family_id.unwrap(),
            user_id: active.user_id.unwrap(),
            name: active.name.unwrap(),
            weekly_allowance_minor: active.weekly_allowance_minor.unwrap(),
            current_balance_minor: active.current_balance_minor.unwrap(),
            savings_balance_minor: active.savings_balance_minor.unwrap(),
            last_allowance_date: active.last_allowance_date.unwrap(),
            allowance_day: active.allowance_day.unwrap(),
            allowance_paused: active.allowance_paused.unwrap(),
            allowance_paused_reason: active.allowance_paused_reason.unwrap(),
            savings_transfer_type: active.savings_transfer_type.unwrap(),
            savings_transfer_amount_minor: active.savings_transfer_amount_minor.unwrap(),
            savings_transfer_percentage: active.savings_transfer_percentage.unwrap(),
            allow_debt: active.allow_debt.unwrap(),
            is_active: active.is_active.unwrap(),
            created_at: active.created_at.unwrap(),
        };

        assert_eq!(Child::try_from(model).unwrap(), child);
    }
}
