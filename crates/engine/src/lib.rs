//! Allowance, savings and budget engine.
//!
//! Pure rules live in [`allowance`], [`savings`], [`goal_progress`] and
//! [`budget_check`]; [`Engine`] loads state from the database, applies them
//! and persists the result inside one transaction per operation.

pub use allowance::{AllowanceResult, ROLLING_WINDOW_DAYS, compute_due_allowance, next_due_date};
pub use budget_check::{BudgetCheckResult, evaluate as evaluate_budget};
pub use category_budgets::{BudgetPeriod, CategoryBudget, DEFAULT_ALERT_THRESHOLD_PERCENT};
pub use challenges::{ChallengeStatus, GoalChallenge};
pub use children::Child;
pub use commands::{
    BudgetCmd, ChallengeCmd, ContributeCmd, CreditCmd, MatchingRuleCmd, NewChildCmd, NewGoalCmd,
    SpendingCmd, UpdateGoalCmd,
};
pub use contributions::{ContributionKind, SavingsContribution};
pub use error::EngineError;
pub use goal_progress::{ChallengeEvent, ContributionOutcome, GoalAggregate, NewContribution};
pub use matching_rules::{MatchingKind, ParentMatchingRule};
pub use milestones::{DEFAULT_MILESTONE_PERCENTAGES, GoalMilestone, default_milestones};
pub use money::MoneyCents;
pub use notifications::{Notification, NotificationKind};
pub use ops::{AllowancePayment, CreditOutcome, Engine, EngineBuilder, SpendingOutcome};
pub use savings::{
    SavingsTransfer, SavingsTransferType, TransferTrigger, clamp_to_available, compute_transfer,
};
pub use savings_goals::{GoalStatus, SavingsGoal};
pub use savings_transactions::{SavingsTransaction, SavingsTransactionKind};
pub use transactions::{
    ALLOWANCE_CATEGORY, GOAL_CATEGORY, SAVINGS_CATEGORY, Transaction, TransactionKind,
};
pub use users::{User, UserRole};

pub mod allowance;
pub mod budget_check;
mod category_budgets;
mod challenges;
mod children;
mod commands;
mod contributions;
mod error;
mod families;
pub mod goal_progress;
mod matching_rules;
mod milestones;
mod money;
mod notifications;
mod ops;
pub mod savings;
mod savings_goals;
mod savings_transactions;
mod transactions;
mod users;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;
