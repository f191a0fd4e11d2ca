//! Parent matching rules.
//!
//! A rule adds a `ParentMatch` contribution proportional to each
//! `ChildDeposit` on its goal, until the optional cap is reached.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, MoneyCents, ResultEngine,
    util::{impl_str_enum, parse_decimal, parse_uuid},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchingKind {
    /// `match = amount * ratio` (1 means dollar for dollar).
    RatioMatch,
    /// `match = amount * ratio / 100`.
    PercentageMatch,
}

impl_str_enum!(MatchingKind, "matching kind", {
    RatioMatch => "ratio_match",
    PercentageMatch => "percentage_match",
});

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParentMatchingRule {
    pub id: Uuid,
    pub goal_id: Uuid,
    pub kind: MatchingKind,
    pub match_ratio: Decimal,
    pub max_match_amount: Option<MoneyCents>,
    /// Never decreases and never exceeds `max_match_amount`.
    pub total_matched_amount: MoneyCents,
    pub is_active: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl ParentMatchingRule {
    pub fn new(
        goal_id: Uuid,
        kind: MatchingKind,
        match_ratio: Decimal,
        max_match_amount: Option<MoneyCents>,
        created_by: &str,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        validate(match_ratio, max_match_amount)?;
        Ok(Self {
            id: Uuid::new_v4(),
            goal_id,
            kind,
            match_ratio,
            max_match_amount,
            total_matched_amount: MoneyCents::ZERO,
            is_active: true,
            created_by: created_by.to_string(),
            created_at,
        })
    }

    /// Match before the cap is applied.
    pub fn raw_match(&self, amount: MoneyCents) -> MoneyCents {
        let matched = match self.kind {
            MatchingKind::RatioMatch => amount.mul_ratio(self.match_ratio),
            MatchingKind::PercentageMatch => amount.percent(self.match_ratio),
        };
        matched.max(MoneyCents::ZERO)
    }

    /// Room left under the cap, `None` when uncapped.
    pub fn remaining_cap(&self) -> Option<MoneyCents> {
        self.max_match_amount
            .map(|max| (max - self.total_matched_amount).max(MoneyCents::ZERO))
    }

    /// Match owed for a child deposit of `amount`.
    pub fn match_for(&self, amount: MoneyCents) -> MoneyCents {
        if !self.is_active || !amount.is_positive() {
            return MoneyCents::ZERO;
        }
        let raw = self.raw_match(amount);
        match self.remaining_cap() {
            Some(room) => raw.min(room),
            None => raw,
        }
    }
}

pub(crate) fn validate(match_ratio: Decimal, max_match_amount: Option<MoneyCents>) -> ResultEngine<()> {
    if match_ratio <= Decimal::ZERO {
        return Err(EngineError::InvalidAmount(
            "match ratio must be > 0".to_string(),
        ));
    }
    if let Some(max) = max_match_amount
        && !max.is_positive()
    {
        return Err(EngineError::InvalidAmount(
            "max match amount must be > 0".to_string(),
        ));
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "matching_rules")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub goal_id: String,
    pub kind: String,
    pub match_ratio: String,
    pub max_match_amount_minor: Option<i64>,
    pub total_matched_amount_minor: i64,
    pub is_active: bool,
    pub created_by: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::savings_goals::Entity",
        from = "Column::GoalId",
        to = "super::savings_goals::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Goal,
}

impl Related<super::savings_goals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Goal.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&ParentMatchingRule> for ActiveModel {
    fn from(rule: &ParentMatchingRule) -> Self {
        Self {
            id: ActiveValue::Set(rule.id.to_string()),
            goal_id: ActiveValue::Set(rule.goal_id.to_string()),
            kind: ActiveValue::Set(rule.kind.as_str().to_string()),
            match_ratio: ActiveValue::Set(rule.match_ratio.to_string()),
            max_match_amount_minor: ActiveValue::Set(rule.max_match_amount.map(MoneyCents::cents)),
            total_matched_amount_minor: ActiveValue::Set(rule.total_matched_amount.cents()),
            is_active: ActiveValue::Set(rule.is_active),
            created_by: ActiveValue::Set(rule.created_by.clone()),
            created_at: ActiveValue::Set(rule.created_at),
        }
    }
}

impl TryFrom<Model> for ParentMatchingRule {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "matching rule")?,
            goal_id: parse_uuid(&model.goal_id, "goal")?,
            kind: MatchingKind::try_from(model.kind.as_str())?,
            match_ratio: parse_decimal(&model.match_ratio, "match ratio")?,
            max_match_amount: model.max_match_amount_minor.map(MoneyCents::new),
            total_matched_amount: MoneyCents::new(model.total_matched_amount_minor),
            is_active: model.is_active,
            created_by: model.created_by,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn rule(kind: MatchingKind, ratio: Decimal, max: Option<i64>) -> ParentMatchingRule {
        ParentMatchingRule::new(
            Uuid::new_v4(),
            kind,
            ratio,
            max.map(MoneyCents::new),
            "mom",
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn ratio_match_multiplies() {
        let rule = rule(MatchingKind::RatioMatch, dec!(0.5), None);
        assert_eq!(rule.match_for(MoneyCents::new(10_01)), MoneyCents::new(5_01));
    }

    #[test]
    fn percentage_match_is_capped() {
        let mut rule = rule(MatchingKind::PercentageMatch, dec!(50), Some(20_00));
        assert_eq!(rule.match_for(MoneyCents::new(30_00)), MoneyCents::new(15_00));

        rule.total_matched_amount = MoneyCents::new(15_00);
        assert_eq!(rule.match_for(MoneyCents::new(30_00)), MoneyCents::new(5_00));

        rule.total_matched_amount = MoneyCents::new(20_00);
        assert_eq!(rule.match_for(MoneyCents::new(30_00)), MoneyCents::ZERO);
    }

    #[test]
    fn inactive_rule_matches_nothing() {
        let mut rule = rule(MatchingKind::RatioMatch, dec!(1), None);
        rule.is_active = false;
        assert_eq!(rule.match_for(MoneyCents::new(10_00)), MoneyCents::ZERO);
    }

    #[test]
    fn rejects_non_positive_ratio_or_cap() {
        assert!(validate(dec!(0), None).is_err());
        assert!(validate(dec!(1), Some(MoneyCents::ZERO)).is_err());
        assert!(validate(dec!(1), Some(MoneyCents::new(1))).is_ok());
    }
}
