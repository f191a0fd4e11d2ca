//! Initial schema.
//!
//! - `families`, `users`: households and logins
//! - `children`: child accounts with spending and savings balances
//! - `transactions`, `savings_transactions`: the two ledgers
//! - `savings_goals`, `savings_contributions`: goals and their history
//! - `matching_rules`, `goal_milestones`, `goal_challenges`: goal incentives
//! - `category_budgets`: per-category spending limits
//! - `notifications`: family feed

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Families {
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
    Role,
    FamilyId,
}

#[derive(Iden)]
enum Children {
    Table,
    Id,
    FamilyId,
    UserId,
    Name,
    WeeklyAllowanceMinor,
    CurrentBalanceMinor,
    SavingsBalanceMinor,
    LastAllowanceDate,
    AllowanceDay,
    AllowancePaused,
    AllowancePausedReason,
    SavingsTransferType,
    SavingsTransferAmountMinor,
    SavingsTransferPercentage,
    AllowDebt,
    IsActive,
    CreatedAt,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    ChildId,
    Kind,
    AmountMinor,
    Category,
    CategoryNorm,
    Description,
    BalanceAfterMinor,
    CreatedBy,
    CreatedAt,
}

#[derive(Iden)]
enum SavingsTransactions {
    Table,
    Id,
    ChildId,
    Kind,
    AmountMinor,
    BalanceAfterMinor,
    IsAutomatic,
    SourceTransactionId,
    Description,
    CreatedBy,
    CreatedAt,
}

#[derive(Iden)]
enum SavingsGoals {
    Table,
    Id,
    ChildId,
    Name,
    Description,
    TargetAmountMinor,
    CurrentAmountMinor,
    Status,
    Priority,
    AutoTransferType,
    AutoTransferAmountMinor,
    AutoTransferPercentage,
    CreatedAt,
    CompletedAt,
    PurchasedAt,
}

#[derive(Iden)]
enum SavingsContributions {
    Table,
    Id,
    GoalId,
    ChildId,
    AmountMinor,
    Kind,
    GoalBalanceAfterMinor,
    SourceTransactionId,
    ParentMatchId,
    Description,
    CreatedBy,
    CreatedAt,
}

#[derive(Iden)]
enum MatchingRules {
    Table,
    Id,
    GoalId,
    Kind,
    MatchRatio,
    MaxMatchAmountMinor,
    TotalMatchedAmountMinor,
    IsActive,
    CreatedBy,
    CreatedAt,
}

#[derive(Iden)]
enum GoalMilestones {
    Table,
    Id,
    GoalId,
    Percentage,
    TargetAmountMinor,
    IsAchieved,
    AchievedAt,
    BonusAmountMinor,
}

#[derive(Iden)]
enum GoalChallenges {
    Table,
    Id,
    GoalId,
    TargetAmountMinor,
    BonusAmountMinor,
    StartAmountMinor,
    StartDate,
    EndDate,
    Status,
    CompletedAt,
}

#[derive(Iden)]
enum CategoryBudgets {
    Table,
    Id,
    ChildId,
    Category,
    CategoryNorm,
    LimitMinor,
    Period,
    AlertThresholdPercent,
    EnforceLimit,
    IsActive,
    CreatedBy,
    CreatedAt,
}

#[derive(Iden)]
enum Notifications {
    Table,
    Id,
    FamilyId,
    ChildId,
    Kind,
    Title,
    Message,
    IsRead,
    CreatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Families and users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Families::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Families::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Families::Name).string().not_null())
                    .col(ColumnDef::new(Families::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .col(ColumnDef::new(Users::Role).string().not_null())
                    .col(ColumnDef::new(Users::FamilyId).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-users-family_id")
                            .from(Users::Table, Users::FamilyId)
                            .to(Families::Table, Families::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Children
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Children::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Children::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Children::FamilyId).string().not_null())
                    .col(ColumnDef::new(Children::UserId).string())
                    .col(ColumnDef::new(Children::Name).string().not_null())
                    .col(
                        ColumnDef::new(Children::WeeklyAllowanceMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Children::CurrentBalanceMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Children::SavingsBalanceMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Children::LastAllowanceDate).timestamp())
                    .col(ColumnDef::new(Children::AllowanceDay).integer())
                    .col(
                        ColumnDef::new(Children::AllowancePaused)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Children::AllowancePausedReason).string())
                    .col(
                        ColumnDef::new(Children::SavingsTransferType)
                            .string()
                            .not_null()
                            .default("none"),
                    )
                    .col(
                        ColumnDef::new(Children::SavingsTransferAmountMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Children::SavingsTransferPercentage)
                            .string()
                            .not_null()
                            .default("0"),
                    )
                    .col(
                        ColumnDef::new(Children::AllowDebt)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Children::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Children::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-children-family_id")
                            .from(Children::Table, Children::FamilyId)
                            .to(Families::Table, Families::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-children-user_id")
                            .from(Children::Table, Children::UserId)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-children-family_id")
                    .table(Children::Table)
                    .col(Children::FamilyId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Spending ledger
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::ChildId).string().not_null())
                    .col(ColumnDef::new(Transactions::Kind).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Category).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::CategoryNorm)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Description).string())
                    .col(
                        ColumnDef::new(Transactions::BalanceAfterMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::CreatedBy).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-child_id")
                            .from(Transactions::Table, Transactions::ChildId)
                            .to(Children::Table, Children::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-child_id-created_at")
                    .table(Transactions::Table)
                    .col(Transactions::ChildId)
                    .col(Transactions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-child_id-category_norm-created_at")
                    .table(Transactions::Table)
                    .col(Transactions::ChildId)
                    .col(Transactions::CategoryNorm)
                    .col(Transactions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Savings ledger
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(SavingsTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SavingsTransactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SavingsTransactions::ChildId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SavingsTransactions::Kind).string().not_null())
                    .col(
                        ColumnDef::new(SavingsTransactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SavingsTransactions::BalanceAfterMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SavingsTransactions::IsAutomatic)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(SavingsTransactions::SourceTransactionId).string())
                    .col(ColumnDef::new(SavingsTransactions::Description).string())
                    .col(
                        ColumnDef::new(SavingsTransactions::CreatedBy)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SavingsTransactions::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-savings_transactions-child_id")
                            .from(SavingsTransactions::Table, SavingsTransactions::ChildId)
                            .to(Children::Table, Children::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-savings_transactions-source_transaction_id")
                            .from(
                                SavingsTransactions::Table,
                                SavingsTransactions::SourceTransactionId,
                            )
                            .to(Transactions::Table, Transactions::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-savings_transactions-child_id-created_at")
                    .table(SavingsTransactions::Table)
                    .col(SavingsTransactions::ChildId)
                    .col(SavingsTransactions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Savings goals
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(SavingsGoals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SavingsGoals::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SavingsGoals::ChildId).string().not_null())
                    .col(ColumnDef::new(SavingsGoals::Name).string().not_null())
                    .col(ColumnDef::new(SavingsGoals::Description).string())
                    .col(
                        ColumnDef::new(SavingsGoals::TargetAmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SavingsGoals::CurrentAmountMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(SavingsGoals::Status).string().not_null())
                    .col(
                        ColumnDef::new(SavingsGoals::Priority)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SavingsGoals::AutoTransferType)
                            .string()
                            .not_null()
                            .default("none"),
                    )
                    .col(
                        ColumnDef::new(SavingsGoals::AutoTransferAmountMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SavingsGoals::AutoTransferPercentage)
                            .string()
                            .not_null()
                            .default("0"),
                    )
                    .col(
                        ColumnDef::new(SavingsGoals::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SavingsGoals::CompletedAt).timestamp())
                    .col(ColumnDef::new(SavingsGoals::PurchasedAt).timestamp())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-savings_goals-child_id")
                            .from(SavingsGoals::Table, SavingsGoals::ChildId)
                            .to(Children::Table, Children::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-savings_goals-child_id-status")
                    .table(SavingsGoals::Table)
                    .col(SavingsGoals::ChildId)
                    .col(SavingsGoals::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SavingsContributions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SavingsContributions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SavingsContributions::GoalId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SavingsContributions::ChildId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SavingsContributions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SavingsContributions::Kind).string().not_null())
                    .col(
                        ColumnDef::new(SavingsContributions::GoalBalanceAfterMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SavingsContributions::SourceTransactionId).string())
                    .col(ColumnDef::new(SavingsContributions::ParentMatchId).string())
                    .col(ColumnDef::new(SavingsContributions::Description).string())
                    .col(
                        ColumnDef::new(SavingsContributions::CreatedBy)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SavingsContributions::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-savings_contributions-goal_id")
                            .from(SavingsContributions::Table, SavingsContributions::GoalId)
                            .to(SavingsGoals::Table, SavingsGoals::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-savings_contributions-child_id")
                            .from(SavingsContributions::Table, SavingsContributions::ChildId)
                            .to(Children::Table, Children::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-savings_contributions-goal_id-created_at")
                    .table(SavingsContributions::Table)
                    .col(SavingsContributions::GoalId)
                    .col(SavingsContributions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Goal incentives
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(MatchingRules::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MatchingRules::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(MatchingRules::GoalId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(MatchingRules::Kind).string().not_null())
                    .col(ColumnDef::new(MatchingRules::MatchRatio).string().not_null())
                    .col(ColumnDef::new(MatchingRules::MaxMatchAmountMinor).big_integer())
                    .col(
                        ColumnDef::new(MatchingRules::TotalMatchedAmountMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(MatchingRules::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(MatchingRules::CreatedBy).string().not_null())
                    .col(
                        ColumnDef::new(MatchingRules::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-matching_rules-goal_id")
                            .from(MatchingRules::Table, MatchingRules::GoalId)
                            .to(SavingsGoals::Table, SavingsGoals::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GoalMilestones::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GoalMilestones::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GoalMilestones::GoalId).string().not_null())
                    .col(ColumnDef::new(GoalMilestones::Percentage).integer().not_null())
                    .col(
                        ColumnDef::new(GoalMilestones::TargetAmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GoalMilestones::IsAchieved)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(GoalMilestones::AchievedAt).timestamp())
                    .col(ColumnDef::new(GoalMilestones::BonusAmountMinor).big_integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-goal_milestones-goal_id")
                            .from(GoalMilestones::Table, GoalMilestones::GoalId)
                            .to(SavingsGoals::Table, SavingsGoals::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-goal_milestones-goal_id-percentage")
                    .table(GoalMilestones::Table)
                    .col(GoalMilestones::GoalId)
                    .col(GoalMilestones::Percentage)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GoalChallenges::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GoalChallenges::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GoalChallenges::GoalId).string().not_null())
                    .col(
                        ColumnDef::new(GoalChallenges::TargetAmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GoalChallenges::BonusAmountMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(GoalChallenges::StartAmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GoalChallenges::StartDate)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(GoalChallenges::EndDate).timestamp().not_null())
                    .col(ColumnDef::new(GoalChallenges::Status).string().not_null())
                    .col(ColumnDef::new(GoalChallenges::CompletedAt).timestamp())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-goal_challenges-goal_id")
                            .from(GoalChallenges::Table, GoalChallenges::GoalId)
                            .to(SavingsGoals::Table, SavingsGoals::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-goal_challenges-status-end_date")
                    .table(GoalChallenges::Table)
                    .col(GoalChallenges::Status)
                    .col(GoalChallenges::EndDate)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Category budgets
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(CategoryBudgets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CategoryBudgets::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CategoryBudgets::ChildId).string().not_null())
                    .col(ColumnDef::new(CategoryBudgets::Category).string().not_null())
                    .col(
                        ColumnDef::new(CategoryBudgets::CategoryNorm)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CategoryBudgets::LimitMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CategoryBudgets::Period).string().not_null())
                    .col(
                        ColumnDef::new(CategoryBudgets::AlertThresholdPercent)
                            .integer()
                            .not_null()
                            .default(80),
                    )
                    .col(
                        ColumnDef::new(CategoryBudgets::EnforceLimit)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(CategoryBudgets::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(CategoryBudgets::CreatedBy).string().not_null())
                    .col(
                        ColumnDef::new(CategoryBudgets::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-category_budgets-child_id")
                            .from(CategoryBudgets::Table, CategoryBudgets::ChildId)
                            .to(Children::Table, Children::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-category_budgets-child_id-category_norm")
                    .table(CategoryBudgets::Table)
                    .col(CategoryBudgets::ChildId)
                    .col(CategoryBudgets::CategoryNorm)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 8. Notifications
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Notifications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Notifications::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Notifications::FamilyId).string().not_null())
                    .col(ColumnDef::new(Notifications::ChildId).string().not_null())
                    .col(ColumnDef::new(Notifications::Kind).string().not_null())
                    .col(ColumnDef::new(Notifications::Title).string().not_null())
                    .col(ColumnDef::new(Notifications::Message).string().not_null())
                    .col(
                        ColumnDef::new(Notifications::IsRead)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Notifications::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-notifications-family_id")
                            .from(Notifications::Table, Notifications::FamilyId)
                            .to(Families::Table, Families::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-notifications-child_id")
                            .from(Notifications::Table, Notifications::ChildId)
                            .to(Children::Table, Children::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-notifications-family_id-created_at")
                    .table(Notifications::Table)
                    .col(Notifications::FamilyId)
                    .col(Notifications::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Reverse creation order for foreign keys.
        manager
            .drop_table(Table::drop().table(Notifications::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CategoryBudgets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GoalChallenges::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GoalMilestones::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MatchingRules::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SavingsContributions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SavingsGoals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SavingsTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Children::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Families::Table).to_owned())
            .await?;
        Ok(())
    }
}
