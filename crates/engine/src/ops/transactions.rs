use chrono::{DateTime, Utc};
use sea_orm::{
    DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    BudgetCheckResult, CategoryBudget, Child, CreditCmd, EngineError, MoneyCents,
    NotificationKind, ResultEngine, SavingsTransaction, SpendingCmd, Transaction, TransactionKind,
    TransferTrigger, category_budgets, children::balances_active_model, evaluate_budget,
    transactions, util::normalize_category, util::normalize_optional_text,
};

use super::{AccessLevel, Engine, with_tx};

/// Result of [`Engine::record_spending`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpendingOutcome {
    pub transaction: Transaction,
    pub budget: BudgetCheckResult,
}

/// Result of [`Engine::record_credit`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreditOutcome {
    pub transaction: Transaction,
    /// Automatic sweep triggered by the credit, if any.
    pub savings_transfer: Option<SavingsTransaction>,
}

impl Engine {
    /// Applies `amount` to the in-memory spending balance and appends the
    /// ledger row. The caller persists the child balances.
    #[allow(clippy::too_many_arguments)]
    pub(super) async fn append_transaction(
        &self,
        db: &DatabaseTransaction,
        child: &mut Child,
        kind: TransactionKind,
        amount: MoneyCents,
        category: &str,
        description: Option<String>,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<Transaction> {
        let balance_after = match kind {
            TransactionKind::Credit => child.current_balance.checked_add(amount),
            TransactionKind::Debit => child.current_balance.checked_sub(amount),
        }
        .ok_or_else(|| EngineError::InvalidAmount("balance overflow".to_string()))?;

        let tx = Transaction::new(
            child.id,
            kind,
            amount,
            category,
            description,
            balance_after,
            user_id,
            now,
        )?;
        let active: transactions::ActiveModel = (&tx).into();
        active.insert(db).await?;

        child.current_balance = balance_after;
        Ok(tx)
    }

    pub(super) async fn save_balances(
        &self,
        db: &DatabaseTransaction,
        child: &Child,
    ) -> ResultEngine<()> {
        balances_active_model(child).update(db).await?;
        Ok(())
    }

    /// Sum of debits in `category_norm` within `[start, end)`.
    pub(super) async fn spending_in_window(
        &self,
        db: &DatabaseTransaction,
        child_id: Uuid,
        category_norm: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ResultEngine<MoneyCents> {
        let total: Option<Option<i64>> = transactions::Entity::find()
            .select_only()
            .column_as(transactions::Column::AmountMinor.sum(), "total")
            .filter(transactions::Column::ChildId.eq(child_id.to_string()))
            .filter(transactions::Column::Kind.eq(TransactionKind::Debit.as_str()))
            .filter(transactions::Column::CategoryNorm.eq(category_norm))
            .filter(transactions::Column::CreatedAt.gte(start))
            .filter(transactions::Column::CreatedAt.lt(end))
            .into_tuple()
            .one(db)
            .await?;
        Ok(MoneyCents::new(total.flatten().unwrap_or(0)))
    }

    /// Runs the budget check for a proposed debit of `amount` in `category`.
    pub(super) async fn budget_check_in_tx(
        &self,
        db: &DatabaseTransaction,
        child_id: Uuid,
        category: &str,
        amount: MoneyCents,
        now: DateTime<Utc>,
    ) -> ResultEngine<(Option<CategoryBudget>, BudgetCheckResult)> {
        let category_norm = normalize_category(category)?;
        let budget = category_budgets::Entity::find()
            .filter(category_budgets::Column::ChildId.eq(child_id.to_string()))
            .filter(category_budgets::Column::CategoryNorm.eq(category_norm.clone()))
            .filter(category_budgets::Column::IsActive.eq(true))
            .one(db)
            .await?
            .map(CategoryBudget::try_from)
            .transpose()?;

        let current_spending = match &budget {
            Some(budget) => {
                let (start, end) = budget.period.window(now);
                self.spending_in_window(db, child_id, &category_norm, start, end)
                    .await?
            }
            None => MoneyCents::ZERO,
        };
        let result = evaluate_budget(budget.as_ref(), current_spending, amount)?;
        Ok((budget, result))
    }

    /// Records a purchase against the spending balance.
    ///
    /// The budget of the category is checked first: an enforced limit that
    /// would be exceeded fails with `BudgetExceeded`, a warning is recorded
    /// as a notification. Without `allow_debt` the balance must cover the
    /// amount.
    pub async fn record_spending(&self, cmd: SpendingCmd) -> ResultEngine<SpendingOutcome> {
        let now = Utc::now();
        if !cmd.amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "spending amount must be > 0".to_string(),
            ));
        }
        let description = normalize_optional_text(cmd.description.as_deref());
        with_tx!(self, |db_tx| {
            let (mut child, _) = self
                .require_active_child(&db_tx, cmd.child_id, &cmd.user_id, AccessLevel::Contribute)
                .await?;

            let (_, budget) = self
                .budget_check_in_tx(&db_tx, child.id, &cmd.category, cmd.amount, now)
                .await?;
            if !budget.allowed {
                return Err(EngineError::BudgetExceeded(
                    budget.message.clone().unwrap_or_else(|| cmd.category.clone()),
                ));
            }
            child.ensure_can_debit(cmd.amount)?;

            let transaction = self
                .append_transaction(
                    &db_tx,
                    &mut child,
                    TransactionKind::Debit,
                    cmd.amount,
                    &cmd.category,
                    description,
                    &cmd.user_id,
                    now,
                )
                .await?;
            self.save_balances(&db_tx, &child).await?;

            if let Some(message) = budget.message.as_deref() {
                self.notify(
                    &db_tx,
                    &child,
                    NotificationKind::BudgetWarning,
                    format!("Budget warning: {}", transaction.category),
                    message,
                    now,
                )
                .await?;
            }

            Ok(SpendingOutcome {
                transaction,
                budget,
            })
        })
    }

    /// Credits the spending balance (chores, gifts) and sweeps the configured
    /// share into savings.
    pub async fn record_credit(&self, cmd: CreditCmd) -> ResultEngine<CreditOutcome> {
        let now = Utc::now();
        if !cmd.amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "credit amount must be > 0".to_string(),
            ));
        }
        let description = normalize_optional_text(cmd.description.as_deref());
        with_tx!(self, |db_tx| {
            let (mut child, _) = self
                .require_active_child(&db_tx, cmd.child_id, &cmd.user_id, AccessLevel::Manage)
                .await?;

            let transaction = self
                .append_transaction(
                    &db_tx,
                    &mut child,
                    TransactionKind::Credit,
                    cmd.amount,
                    &cmd.category,
                    description,
                    &cmd.user_id,
                    now,
                )
                .await?;
            let savings_transfer = self
                .apply_savings_sweep(
                    &db_tx,
                    &mut child,
                    &transaction,
                    TransferTrigger::ManualDeposit,
                    &cmd.user_id,
                    now,
                )
                .await?;
            self.save_balances(&db_tx, &child).await?;

            Ok(CreditOutcome {
                transaction,
                savings_transfer,
            })
        })
    }

    /// Lists the newest spending-ledger rows of a child.
    pub async fn list_transactions(
        &self,
        child_id: Uuid,
        limit: u64,
        user_id: &str,
    ) -> ResultEngine<Vec<Transaction>> {
        with_tx!(self, |db_tx| {
            self.require_child(&db_tx, child_id, user_id, AccessLevel::Read)
                .await?;
            let rows = transactions::Entity::find()
                .filter(transactions::Column::ChildId.eq(child_id.to_string()))
                .order_by_desc(transactions::Column::CreatedAt)
                .limit(limit)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Transaction::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;
            Ok(rows)
        })
    }
}
