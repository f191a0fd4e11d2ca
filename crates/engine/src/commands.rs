//! Command structs for engine operations.
//!
//! These types group parameters for write operations (spending, goals,
//! budgets), keeping call sites readable and avoiding long argument lists.

use chrono::{DateTime, Utc, Weekday};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{BudgetPeriod, ContributionKind, MatchingKind, MoneyCents, SavingsTransfer};

/// Debit the spending balance after a budget check.
#[derive(Clone, Debug)]
pub struct SpendingCmd {
    pub child_id: Uuid,
    pub amount: MoneyCents,
    pub category: String,
    pub description: Option<String>,
    pub user_id: String,
}

impl SpendingCmd {
    #[must_use]
    pub fn new(
        child_id: Uuid,
        user_id: impl Into<String>,
        amount: MoneyCents,
        category: impl Into<String>,
    ) -> Self {
        Self {
            child_id,
            amount,
            category: category.into(),
            description: None,
            user_id: user_id.into(),
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Credit the spending balance (chores, gifts) and run the savings sweep.
#[derive(Clone, Debug)]
pub struct CreditCmd {
    pub child_id: Uuid,
    pub amount: MoneyCents,
    pub category: String,
    pub description: Option<String>,
    pub user_id: String,
}

impl CreditCmd {
    #[must_use]
    pub fn new(
        child_id: Uuid,
        user_id: impl Into<String>,
        amount: MoneyCents,
        category: impl Into<String>,
    ) -> Self {
        Self {
            child_id,
            amount,
            category: category.into(),
            description: None,
            user_id: user_id.into(),
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Create a child account.
#[derive(Clone, Debug)]
pub struct NewChildCmd {
    pub name: String,
    pub weekly_allowance: MoneyCents,
    pub allowance_day: Option<Weekday>,
    pub savings_transfer: SavingsTransfer,
    pub allow_debt: bool,
    pub user_id: String,
}

impl NewChildCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, name: impl Into<String>, weekly_allowance: MoneyCents) -> Self {
        Self {
            name: name.into(),
            weekly_allowance,
            allowance_day: None,
            savings_transfer: SavingsTransfer::None,
            allow_debt: false,
            user_id: user_id.into(),
        }
    }

    #[must_use]
    pub fn allowance_day(mut self, day: Weekday) -> Self {
        self.allowance_day = Some(day);
        self
    }

    #[must_use]
    pub fn savings_transfer(mut self, transfer: SavingsTransfer) -> Self {
        self.savings_transfer = transfer;
        self
    }

    #[must_use]
    pub fn allow_debt(mut self, allow_debt: bool) -> Self {
        self.allow_debt = allow_debt;
        self
    }
}

/// Create a savings goal.
#[derive(Clone, Debug)]
pub struct NewGoalCmd {
    pub child_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub target_amount: MoneyCents,
    pub priority: i32,
    pub auto_transfer: SavingsTransfer,
    pub user_id: String,
}

impl NewGoalCmd {
    #[must_use]
    pub fn new(
        child_id: Uuid,
        user_id: impl Into<String>,
        name: impl Into<String>,
        target_amount: MoneyCents,
    ) -> Self {
        Self {
            child_id,
            name: name.into(),
            description: None,
            target_amount,
            priority: 0,
            auto_transfer: SavingsTransfer::None,
            user_id: user_id.into(),
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn auto_transfer(mut self, transfer: SavingsTransfer) -> Self {
        self.auto_transfer = transfer;
        self
    }
}

/// Update an existing savings goal. `None` fields are left untouched.
#[derive(Clone, Debug)]
pub struct UpdateGoalCmd {
    pub goal_id: Uuid,
    pub name: Option<String>,
    /// `Some(None)` clears the description.
    pub description: Option<Option<String>>,
    pub target_amount: Option<MoneyCents>,
    pub priority: Option<i32>,
    pub auto_transfer: Option<SavingsTransfer>,
    pub user_id: String,
}

impl UpdateGoalCmd {
    #[must_use]
    pub fn new(goal_id: Uuid, user_id: impl Into<String>) -> Self {
        Self {
            goal_id,
            name: None,
            description: None,
            target_amount: None,
            priority: None,
            auto_transfer: None,
            user_id: user_id.into(),
        }
    }

    #[must_use]
    pub fn target_amount(mut self, target: MoneyCents) -> Self {
        self.target_amount = Some(target);
        self
    }
}

/// Deposit into a savings goal.
#[derive(Clone, Debug)]
pub struct ContributeCmd {
    pub goal_id: Uuid,
    pub amount: MoneyCents,
    pub kind: ContributionKind,
    pub description: Option<String>,
    pub user_id: String,
}

impl ContributeCmd {
    #[must_use]
    pub fn new(
        goal_id: Uuid,
        user_id: impl Into<String>,
        amount: MoneyCents,
        kind: ContributionKind,
    ) -> Self {
        Self {
            goal_id,
            amount,
            kind,
            description: None,
            user_id: user_id.into(),
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Create or replace the matching rule of a goal.
#[derive(Clone, Debug)]
pub struct MatchingRuleCmd {
    pub goal_id: Uuid,
    pub kind: MatchingKind,
    pub match_ratio: Decimal,
    pub max_match_amount: Option<MoneyCents>,
    pub user_id: String,
}

/// Start a challenge on a goal.
#[derive(Clone, Debug)]
pub struct ChallengeCmd {
    pub goal_id: Uuid,
    pub target_amount: MoneyCents,
    pub bonus_amount: MoneyCents,
    pub end_date: DateTime<Utc>,
    pub user_id: String,
}

/// Create or update the budget of a category.
#[derive(Clone, Debug)]
pub struct BudgetCmd {
    pub child_id: Uuid,
    pub category: String,
    pub limit: MoneyCents,
    pub period: BudgetPeriod,
    /// Defaults to 80 when absent.
    pub alert_threshold_percent: Option<i32>,
    pub enforce_limit: bool,
    pub user_id: String,
}

impl BudgetCmd {
    #[must_use]
    pub fn new(
        child_id: Uuid,
        user_id: impl Into<String>,
        category: impl Into<String>,
        limit: MoneyCents,
        period: BudgetPeriod,
    ) -> Self {
        Self {
            child_id,
            category: category.into(),
            limit,
            period,
            alert_threshold_percent: None,
            enforce_limit: false,
            user_id: user_id.into(),
        }
    }

    #[must_use]
    pub fn alert_threshold_percent(mut self, percent: i32) -> Self {
        self.alert_threshold_percent = Some(percent);
        self
    }

    #[must_use]
    pub fn enforce_limit(mut self, enforce: bool) -> Self {
        self.enforce_limit = enforce;
        self
    }
}
