//! Per-category spending limits.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, MoneyCents, ResultEngine,
    util::{impl_str_enum, normalize_category, parse_uuid},
};

/// Default usage percentage that triggers a warning.
pub const DEFAULT_ALERT_THRESHOLD_PERCENT: i32 = 80;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetPeriod {
    Weekly,
    Monthly,
}

impl_str_enum!(BudgetPeriod, "budget period", {
    Weekly => "weekly",
    Monthly => "monthly",
});

impl BudgetPeriod {
    /// Half-open `[start, end)` window containing `as_of`.
    ///
    /// Weeks start Monday 00:00 UTC, months on the first day 00:00 UTC.
    pub fn window(self, as_of: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let date = as_of.date_naive();
        let (start, end) = match self {
            Self::Weekly => {
                let start = date
                    .checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_monday())))
                    .unwrap_or(NaiveDate::MIN);
                (start, start.checked_add_days(Days::new(7)))
            }
            Self::Monthly => {
                let start = date.with_day(1).unwrap_or(date);
                (start, start.checked_add_months(Months::new(1)))
            }
        };
        (
            midnight(start),
            midnight(end.unwrap_or(NaiveDate::MAX)),
        )
    }
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryBudget {
    pub id: Uuid,
    pub child_id: Uuid,
    pub category: String,
    /// Lookup key, see `normalize_category`.
    pub category_norm: String,
    pub limit: MoneyCents,
    pub period: BudgetPeriod,
    pub alert_threshold_percent: i32,
    /// Block spending over the limit instead of only warning.
    pub enforce_limit: bool,
    pub is_active: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl CategoryBudget {
    pub fn new(
        child_id: Uuid,
        category: &str,
        limit: MoneyCents,
        period: BudgetPeriod,
        alert_threshold_percent: Option<i32>,
        enforce_limit: bool,
        created_by: &str,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        let alert_threshold_percent =
            alert_threshold_percent.unwrap_or(DEFAULT_ALERT_THRESHOLD_PERCENT);
        validate(limit, alert_threshold_percent)?;
        Ok(Self {
            id: Uuid::new_v4(),
            child_id,
            category: category.trim().to_string(),
            category_norm: normalize_category(category)?,
            limit,
            period,
            alert_threshold_percent,
            enforce_limit,
            is_active: true,
            created_by: created_by.to_string(),
            created_at,
        })
    }
}

pub(crate) fn validate(limit: MoneyCents, alert_threshold_percent: i32) -> ResultEngine<()> {
    if !limit.is_positive() {
        return Err(EngineError::InvalidAmount(
            "budget limit must be > 0".to_string(),
        ));
    }
    if !(0..=100).contains(&alert_threshold_percent) {
        return Err(EngineError::InvalidAmount(
            "alert threshold must be between 0 and 100".to_string(),
        ));
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "category_budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub child_id: String,
    pub category: String,
    pub category_norm: String,
    pub limit_minor: i64,
    pub period: String,
    pub alert_threshold_percent: i32,
    pub enforce_limit: bool,
    pub is_active: bool,
    pub created_by: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::children::Entity",
        from = "Column::ChildId",
        to = "super::children::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Child,
}

impl Related<super::children::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Child.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&CategoryBudget> for ActiveModel {
    fn from(budget: &CategoryBudget) -> Self {
        Self {
            id: ActiveValue::Set(budget.id.to_string()),
            child_id: ActiveValue::Set(budget.child_id.to_string()),
            category: ActiveValue::Set(budget.category.clone()),
            category_norm: ActiveValue::Set(budget.category_norm.clone()),
            limit_minor: ActiveValue::Set(budget.limit.cents()),
            period: ActiveValue::Set(budget.period.as_str().to_string()),
            alert_threshold_percent: ActiveValue::Set(budget.alert_threshold_percent),
            enforce_limit: ActiveValue::Set(budget.enforce_limit),
            is_active: ActiveValue::Set(budget.is_active),
            created_by: ActiveValue::Set(budget.created_by.clone()),
            created_at: ActiveValue::Set(budget.created_at),
        }
    }
}

impl TryFrom<Model> for CategoryBudget {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "budget")?,
            child_id: parse_uuid(&model.child_id, "child")?,
            category: model.category,
            category_norm: model.category_norm,
            limit: MoneyCents::new(model.limit_minor),
            period: BudgetPeriod::try_from(model.period.as_str())?,
            alert_threshold_percent: model.alert_threshold_percent,
            enforce_limit: model.enforce_limit,
            is_active: model.is_active,
            created_by: model.created_by,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn weekly_window_starts_on_monday() {
        // Thursday
        let as_of = Utc.with_ymd_and_hms(2025, 3, 13, 18, 0, 0).unwrap();
        let (start, end) = BudgetPeriod::Weekly.window(as_of);
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 3, 17, 0, 0, 0).unwrap());
    }

    #[test]
    fn weekly_window_on_monday_midnight_is_that_week() {
        let as_of = Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap();
        let (start, _) = BudgetPeriod::Weekly.window(as_of);
        assert_eq!(start, as_of);
    }

    #[test]
    fn monthly_window_is_calendar_month() {
        let as_of = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
        let (start, end) = BudgetPeriod::Monthly.window(as_of);
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn new_budget_defaults_threshold_and_normalizes_category() {
        let budget = CategoryBudget::new(
            Uuid::new_v4(),
            " Snacks ",
            MoneyCents::new(50_00),
            BudgetPeriod::Weekly,
            None,
            true,
            "mom",
            Utc::now(),
        )
        .unwrap();
        assert_eq!(budget.category, "Snacks");
        assert_eq!(budget.category_norm, "snacks");
        assert_eq!(budget.alert_threshold_percent, 80);
    }

    #[test]
    fn rejects_bad_limit_or_threshold() {
        assert!(validate(MoneyCents::ZERO, 80).is_err());
        assert!(validate(MoneyCents::new(1), 101).is_err());
        assert!(validate(MoneyCents::new(1), -1).is_err());
    }
}
