use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    prelude::*,
};
use uuid::Uuid;

use crate::{
    ALLOWANCE_CATEGORY, Child, ContributionKind, GoalStatus, MoneyCents, NewContribution,
    NotificationKind, ResultEngine, SavingsContribution, SavingsGoal, SavingsTransaction,
    SavingsTransferType, Transaction, TransactionKind, TransferTrigger, children, clamp_to_available,
    compute_due_allowance, savings_goals,
};

use super::{AccessLevel, Engine, SYSTEM_USER, with_tx};

/// Everything one allowance payment produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AllowancePayment {
    pub child_id: Uuid,
    pub allowance: Transaction,
    pub savings_transfer: Option<SavingsTransaction>,
    /// Contributions written by goal auto-transfers, bonuses included, in
    /// goal priority order.
    pub goal_transfers: Vec<SavingsContribution>,
    pub balance_after: MoneyCents,
    pub savings_balance_after: MoneyCents,
}

impl Engine {
    /// Pays the allowance of a child if it is due at `as_of`.
    ///
    /// Returns `None` when nothing is due (paused, zero allowance, not yet
    /// payday).
    pub async fn pay_allowance(
        &self,
        child_id: Uuid,
        as_of: DateTime<Utc>,
        user_id: &str,
    ) -> ResultEngine<Option<AllowancePayment>> {
        with_tx!(self, |db_tx| {
            let (mut child, _) = self
                .require_child(&db_tx, child_id, user_id, AccessLevel::Manage)
                .await?;
            let payment = self
                .pay_due(&db_tx, &mut child, as_of, user_id)
                .await?;
            Ok(payment)
        })
    }

    /// Pays every due allowance at `as_of`.
    ///
    /// Each child is paid in its own transaction; a failing child is logged
    /// and skipped.
    pub async fn process_due_allowances(
        &self,
        as_of: DateTime<Utc>,
    ) -> ResultEngine<Vec<AllowancePayment>> {
        let candidates: Vec<String> = children::Entity::find()
            .select_only()
            .column(children::Column::Id)
            .filter(children::Column::IsActive.eq(true))
            .filter(children::Column::AllowancePaused.eq(false))
            .filter(children::Column::WeeklyAllowanceMinor.gt(0))
            .order_by_asc(children::Column::CreatedAt)
            .into_tuple()
            .all(&self.database)
            .await?;

        let mut payments = Vec::new();
        for raw_id in candidates {
            let child_id = match Uuid::parse_str(&raw_id) {
                Ok(id) => id,
                Err(_) => {
                    tracing::warn!(child = %raw_id, "skipping child with invalid id");
                    continue;
                }
            };
            match self.pay_child_if_due(child_id, as_of).await {
                Ok(Some(payment)) => payments.push(payment),
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(child = %child_id, "allowance payment failed: {err}");
                }
            }
        }

        tracing::info!(paid = payments.len(), %as_of, "allowance run finished");
        Ok(payments)
    }

    async fn pay_child_if_due(
        &self,
        child_id: Uuid,
        as_of: DateTime<Utc>,
    ) -> ResultEngine<Option<AllowancePayment>> {
        with_tx!(self, |db_tx| {
            let mut child = self.load_child(&db_tx, child_id).await?;
            let payment = self
                .pay_due(&db_tx, &mut child, as_of, SYSTEM_USER)
                .await?;
            Ok(payment)
        })
    }

    /// Credits the allowance, runs the savings sweep and the goal
    /// auto-transfers, and persists the child.
    async fn pay_due(
        &self,
        db: &DatabaseTransaction,
        child: &mut Child,
        as_of: DateTime<Utc>,
        user_id: &str,
    ) -> ResultEngine<Option<AllowancePayment>> {
        let Some(due) = compute_due_allowance(child, as_of) else {
            return Ok(None);
        };

        let allowance = self
            .append_transaction(
                db,
                child,
                TransactionKind::Credit,
                due.amount,
                ALLOWANCE_CATEGORY,
                Some("Weekly allowance".to_string()),
                user_id,
                as_of,
            )
            .await?;
        child.last_allowance_date = Some(due.paid_at);

        let savings_transfer = self
            .apply_savings_sweep(
                db,
                child,
                &allowance,
                TransferTrigger::Allowance,
                user_id,
                as_of,
            )
            .await?;
        let goal_transfers = self
            .apply_goal_auto_transfers(db, child, &allowance, user_id, as_of)
            .await?;

        let active = children::ActiveModel {
            id: ActiveValue::Set(child.id.to_string()),
            current_balance_minor: ActiveValue::Set(child.current_balance.cents()),
            savings_balance_minor: ActiveValue::Set(child.savings_balance.cents()),
            last_allowance_date: ActiveValue::Set(child.last_allowance_date),
            ..Default::default()
        };
        active.update(db).await?;

        self.notify(
            db,
            child,
            NotificationKind::AllowancePaid,
            "Allowance paid",
            format!("{} received {}", child.name, due.amount),
            as_of,
        )
        .await?;
        tracing::info!(
            child = %child.id,
            amount = %due.amount,
            swept = savings_transfer.is_some(),
            goals = goal_transfers.len(),
            "allowance paid"
        );

        Ok(Some(AllowancePayment {
            child_id: child.id,
            allowance,
            savings_transfer,
            goal_transfers,
            balance_after: child.current_balance,
            savings_balance_after: child.savings_balance,
        }))
    }

    /// Feeds active goals with an auto-transfer, by priority then age.
    ///
    /// Each transfer is clamped to what the spending balance can cover (unless
    /// debt is allowed) and to what the goal still misses.
    async fn apply_goal_auto_transfers(
        &self,
        db: &DatabaseTransaction,
        child: &mut Child,
        allowance: &Transaction,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<Vec<SavingsContribution>> {
        let goals = savings_goals::Entity::find()
            .filter(savings_goals::Column::ChildId.eq(child.id.to_string()))
            .filter(savings_goals::Column::Status.eq(GoalStatus::Active.as_str()))
            .filter(
                savings_goals::Column::AutoTransferType.ne(SavingsTransferType::None.as_str()),
            )
            .order_by_asc(savings_goals::Column::Priority)
            .order_by_asc(savings_goals::Column::CreatedAt)
            .all(db)
            .await?
            .into_iter()
            .map(SavingsGoal::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;

        let mut rows = Vec::new();
        for goal in goals {
            let wanted = goal
                .auto_transfer
                .amount_for(allowance.amount, TransferTrigger::Allowance)
                .min(goal.remaining());
            let amount = clamp_to_available(child, wanted);
            if !amount.is_positive() {
                continue;
            }

            let mut agg = self.load_goal_aggregate(db, goal).await?;
            let new = NewContribution {
                amount,
                kind: ContributionKind::AutoTransfer,
                source_transaction_id: None,
                description: Some(format!("Automatic transfer from allowance {}", allowance.id)),
                created_by: user_id.to_string(),
            };
            let outcome = self.apply_contribution(db, &mut agg, child, new, now).await?;
            tracing::debug!(goal = %agg.goal.id, amount = %amount, "goal auto-transfer");
            rows.extend(outcome.contributions);
        }
        Ok(rows)
    }
}
