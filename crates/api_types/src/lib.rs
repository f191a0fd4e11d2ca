//! Request and response bodies of the HTTP API.
//!
//! Money is always an integer amount of cents in a `*_minor` field.
//! Percentages and ratios are decimal strings.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Query string of list endpoints.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ListQuery {
    pub limit: Option<u64>,
}

pub mod user {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum UserRole {
        Parent,
        Child,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub username: String,
        pub role: UserRole,
        pub family_id: Option<Uuid>,
    }
}

pub mod savings {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransferKind {
        None,
        FixedAmount,
        Percentage,
    }

    /// Savings sweep of a child, or auto-transfer of a goal.
    ///
    /// `amount_minor` is read for `fixed_amount`, `percentage` (0-100) for
    /// `percentage`.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct SavingsTransfer {
        pub kind: TransferKind,
        pub amount_minor: Option<i64>,
        pub percentage: Option<Decimal>,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum SavingsTransactionKind {
        Deposit,
        Withdrawal,
    }

    /// Manual deposit into, or withdrawal from, the savings balance.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SavingsMove {
        /// Must be > 0.
        pub amount_minor: i64,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SavingsTransactionView {
        pub id: Uuid,
        pub kind: SavingsTransactionKind,
        /// Signed: withdrawals are negative.
        pub amount_minor: i64,
        pub balance_after_minor: i64,
        pub is_automatic: bool,
        pub source_transaction_id: Option<Uuid>,
        pub description: Option<String>,
        pub created_by: String,
        pub created_at: DateTime<Utc>,
    }
}

pub mod child {
    use super::*;
    use crate::savings::SavingsTransfer;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ChildNew {
        pub name: String,
        pub weekly_allowance_minor: i64,
        /// Fixed payday. Absent means a rolling 7-day window.
        pub allowance_day: Option<Weekday>,
        pub savings_transfer: Option<SavingsTransfer>,
        pub allow_debt: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ChildView {
        pub id: Uuid,
        pub family_id: Uuid,
        pub username: Option<String>,
        pub name: String,
        pub weekly_allowance_minor: i64,
        pub current_balance_minor: i64,
        pub savings_balance_minor: i64,
        pub last_allowance_date: Option<DateTime<Utc>>,
        pub next_allowance_date: Option<NaiveDate>,
        pub allowance_day: Option<Weekday>,
        pub allowance_paused: bool,
        pub allowance_paused_reason: Option<String>,
        pub savings_transfer: SavingsTransfer,
        pub allow_debt: bool,
        pub is_active: bool,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AllowanceUpdate {
        pub weekly_allowance_minor: i64,
        pub allowance_day: Option<Weekday>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AllowancePause {
        pub reason: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DebtUpdate {
        pub allow_debt: bool,
    }

    /// Links an existing child login to a child record.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct LinkUser {
        pub username: String,
    }
}

pub mod transaction {
    use super::*;
    use crate::{budget::BudgetCheckView, savings::SavingsTransactionView};

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionKind {
        Credit,
        Debit,
    }

    /// Body of both spending and credit requests.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        /// Must be > 0. The endpoint defines the direction.
        pub amount_minor: i64,
        pub category: String,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub kind: TransactionKind,
        pub amount_minor: i64,
        pub category: String,
        pub description: Option<String>,
        pub balance_after_minor: i64,
        pub created_by: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SpendingCreated {
        pub transaction: TransactionView,
        pub budget: BudgetCheckView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CreditCreated {
        pub transaction: TransactionView,
        pub savings_transfer: Option<SavingsTransactionView>,
    }
}

pub mod allowance {
    use super::*;
    use crate::{
        goal::ContributionView, savings::SavingsTransactionView, transaction::TransactionView,
    };

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AllowancePay {
        /// Defaults to now.
        pub as_of: Option<DateTime<FixedOffset>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AllowancePaid {
        pub child_id: Uuid,
        pub allowance: TransactionView,
        pub savings_transfer: Option<SavingsTransactionView>,
        pub goal_transfers: Vec<ContributionView>,
        pub balance_after_minor: i64,
        pub savings_balance_after_minor: i64,
    }
}

pub mod goal {
    use super::*;
    use crate::savings::SavingsTransfer;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum GoalStatus {
        Active,
        Completed,
        Purchased,
        Cancelled,
        Paused,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ContributionKind {
        ChildDeposit,
        ParentMatch,
        ParentGift,
        ExternalGift,
        AutoTransfer,
        ChallengeBonus,
        Withdrawal,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum MatchingKind {
        RatioMatch,
        PercentageMatch,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ChallengeStatus {
        Active,
        Completed,
        Expired,
        Cancelled,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct GoalListQuery {
        /// Include purchased and cancelled goals.
        pub include_closed: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalNew {
        pub name: String,
        pub description: Option<String>,
        pub target_amount_minor: i64,
        pub priority: Option<i32>,
        pub auto_transfer: Option<SavingsTransfer>,
    }

    /// Absent fields are left untouched; an empty description clears it.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct GoalUpdate {
        pub name: Option<String>,
        pub description: Option<String>,
        pub target_amount_minor: Option<i64>,
        pub priority: Option<i32>,
        pub auto_transfer: Option<SavingsTransfer>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalPause {
        pub paused: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalView {
        pub id: Uuid,
        pub child_id: Uuid,
        pub name: String,
        pub description: Option<String>,
        pub target_amount_minor: i64,
        pub current_amount_minor: i64,
        pub progress_percent: i64,
        pub status: GoalStatus,
        pub priority: i32,
        pub auto_transfer: SavingsTransfer,
        pub created_at: DateTime<Utc>,
        pub completed_at: Option<DateTime<Utc>>,
        pub purchased_at: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MilestoneView {
        pub percentage: i32,
        pub target_amount_minor: i64,
        pub is_achieved: bool,
        pub achieved_at: Option<DateTime<Utc>>,
        pub bonus_minor: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MilestoneBonus {
        /// Absent clears the bonus.
        pub bonus_minor: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MatchingRuleUpsert {
        pub kind: MatchingKind,
        pub match_ratio: Decimal,
        pub max_match_minor: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MatchingRuleView {
        pub id: Uuid,
        pub kind: MatchingKind,
        pub match_ratio: Decimal,
        pub max_match_minor: Option<i64>,
        pub total_matched_minor: i64,
        pub is_active: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ChallengeNew {
        pub target_amount_minor: i64,
        pub bonus_minor: i64,
        pub end_date: DateTime<FixedOffset>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ChallengeView {
        pub id: Uuid,
        pub target_amount_minor: i64,
        pub bonus_minor: i64,
        pub start_amount_minor: i64,
        pub start_date: DateTime<Utc>,
        pub end_date: DateTime<Utc>,
        pub status: ChallengeStatus,
        pub completed_at: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalDetail {
        pub goal: GoalView,
        pub matching_rule: Option<MatchingRuleView>,
        pub milestones: Vec<MilestoneView>,
        pub challenge: Option<ChallengeView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ContributionNew {
        pub amount_minor: i64,
        pub kind: ContributionKind,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalWithdraw {
        pub amount_minor: i64,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ContributionView {
        pub id: Uuid,
        pub goal_id: Uuid,
        pub kind: ContributionKind,
        /// Signed: withdrawals are negative.
        pub amount_minor: i64,
        pub goal_balance_after_minor: i64,
        pub source_transaction_id: Option<Uuid>,
        pub parent_match_id: Option<Uuid>,
        pub description: Option<String>,
        pub created_by: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(tag = "event", rename_all = "snake_case")]
    pub enum ChallengeEvent {
        Completed { challenge_id: Uuid, bonus_minor: i64 },
        Expired { challenge_id: Uuid },
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ContributionResult {
        pub contributions: Vec<ContributionView>,
        pub matched_minor: i64,
        pub achieved_milestones: Vec<i32>,
        pub challenge_event: Option<ChallengeEvent>,
        pub goal_completed: bool,
    }
}

pub mod budget {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum BudgetPeriod {
        Weekly,
        Monthly,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetUpsert {
        pub category: String,
        pub limit_minor: i64,
        pub period: BudgetPeriod,
        /// Defaults to 80.
        pub alert_threshold_percent: Option<i32>,
        pub enforce_limit: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetView {
        pub id: Uuid,
        pub category: String,
        pub limit_minor: i64,
        pub period: BudgetPeriod,
        pub alert_threshold_percent: i32,
        pub enforce_limit: bool,
        pub is_active: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetCheckQuery {
        pub category: String,
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetCheckView {
        pub allowed: bool,
        pub message: Option<String>,
        pub current_spending_minor: i64,
        pub limit_minor: Option<i64>,
        pub remaining_after_minor: Option<i64>,
    }
}

pub mod notification {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum NotificationKind {
        AllowancePaid,
        SavingsTransfer,
        MilestoneAchieved,
        GoalCompleted,
        ParentMatch,
        ChallengeCompleted,
        ChallengeExpired,
        BudgetWarning,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct NotificationQuery {
        pub unread_only: Option<bool>,
        pub limit: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct NotificationView {
        pub id: Uuid,
        pub child_id: Uuid,
        pub kind: NotificationKind,
        pub title: String,
        pub message: String,
        pub is_read: bool,
        pub created_at: DateTime<Utc>,
    }
}
