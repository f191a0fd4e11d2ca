use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    prelude::*,
};
use uuid::Uuid;

use crate::{
    Child, EngineError, MoneyCents, NotificationKind, ResultEngine, SAVINGS_CATEGORY,
    SavingsTransaction, SavingsTransfer, Transaction, TransactionKind, TransferTrigger,
    children, compute_transfer, savings_transactions, util::normalize_optional_text,
};

use super::{AccessLevel, Engine, with_tx};

impl Engine {
    /// Moves the configured share of `source` from spending into savings.
    ///
    /// `child.current_balance` must already include `source`. Returns `None`
    /// when nothing is swept.
    pub(super) async fn apply_savings_sweep(
        &self,
        db: &DatabaseTransaction,
        child: &mut Child,
        source: &Transaction,
        trigger: TransferTrigger,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<Option<SavingsTransaction>> {
        let amount = compute_transfer(child, source.amount, trigger);
        if !amount.is_positive() {
            return Ok(None);
        }

        self.append_transaction(
            db,
            child,
            TransactionKind::Debit,
            amount,
            SAVINGS_CATEGORY,
            Some("Automatic savings transfer".to_string()),
            user_id,
            now,
        )
        .await?;
        let savings = self
            .append_savings_transaction(db, child, amount, true, Some(source.id), None, user_id, now)
            .await?;

        tracing::debug!(
            child = %child.id,
            amount = %amount,
            "swept into savings"
        );
        self.notify(
            db,
            child,
            NotificationKind::SavingsTransfer,
            "Savings transfer",
            format!("{amount} moved to savings"),
            now,
        )
        .await?;
        Ok(Some(savings))
    }

    /// Applies a signed `amount` to the in-memory savings balance and appends
    /// the ledger row.
    #[allow(clippy::too_many_arguments)]
    async fn append_savings_transaction(
        &self,
        db: &DatabaseTransaction,
        child: &mut Child,
        amount: MoneyCents,
        is_automatic: bool,
        source_transaction_id: Option<Uuid>,
        description: Option<String>,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<SavingsTransaction> {
        let balance_after = child
            .savings_balance
            .checked_add(amount)
            .ok_or_else(|| EngineError::InvalidAmount("balance overflow".to_string()))?;
        let row = SavingsTransaction::new(
            child.id,
            amount,
            balance_after,
            is_automatic,
            source_transaction_id,
            description,
            user_id,
            now,
        );
        let active: savings_transactions::ActiveModel = (&row).into();
        active.insert(db).await?;
        child.savings_balance = balance_after;
        Ok(row)
    }

    /// Moves `amount` from the spending balance into savings.
    pub async fn deposit_to_savings(
        &self,
        child_id: Uuid,
        amount: MoneyCents,
        description: Option<&str>,
        user_id: &str,
    ) -> ResultEngine<SavingsTransaction> {
        let now = Utc::now();
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "deposit amount must be > 0".to_string(),
            ));
        }
        let description = normalize_optional_text(description);
        with_tx!(self, |db_tx| {
            let (mut child, _) = self
                .require_active_child(&db_tx, child_id, user_id, AccessLevel::Contribute)
                .await?;
            child.ensure_can_debit(amount)?;

            let debit = self
                .append_transaction(
                    &db_tx,
                    &mut child,
                    TransactionKind::Debit,
                    amount,
                    SAVINGS_CATEGORY,
                    description.clone(),
                    user_id,
                    now,
                )
                .await?;
            let row = self
                .append_savings_transaction(
                    &db_tx,
                    &mut child,
                    amount,
                    false,
                    Some(debit.id),
                    description,
                    user_id,
                    now,
                )
                .await?;
            self.save_balances(&db_tx, &child).await?;
            Ok(row)
        })
    }

    /// Moves `amount` from savings back to the spending balance.
    pub async fn withdraw_from_savings(
        &self,
        child_id: Uuid,
        amount: MoneyCents,
        description: Option<&str>,
        user_id: &str,
    ) -> ResultEngine<SavingsTransaction> {
        let now = Utc::now();
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "withdrawal amount must be > 0".to_string(),
            ));
        }
        let description = normalize_optional_text(description);
        with_tx!(self, |db_tx| {
            let (mut child, _) = self
                .require_active_child(&db_tx, child_id, user_id, AccessLevel::Manage)
                .await?;
            if amount > child.savings_balance {
                return Err(EngineError::InsufficientBalance(format!(
                    "{} has {} in savings, {} requested",
                    child.name, child.savings_balance, amount
                )));
            }

            let credit = self
                .append_transaction(
                    &db_tx,
                    &mut child,
                    TransactionKind::Credit,
                    amount,
                    SAVINGS_CATEGORY,
                    description.clone(),
                    user_id,
                    now,
                )
                .await?;
            let row = self
                .append_savings_transaction(
                    &db_tx,
                    &mut child,
                    -amount,
                    false,
                    Some(credit.id),
                    description,
                    user_id,
                    now,
                )
                .await?;
            self.save_balances(&db_tx, &child).await?;
            Ok(row)
        })
    }

    /// Changes the savings sweep of a child.
    pub async fn update_savings_transfer(
        &self,
        child_id: Uuid,
        transfer: SavingsTransfer,
        user_id: &str,
    ) -> ResultEngine<Child> {
        transfer.validate()?;
        with_tx!(self, |db_tx| {
            let (mut child, _) = self
                .require_child(&db_tx, child_id, user_id, AccessLevel::Manage)
                .await?;
            child.savings_transfer = transfer;

            let (kind, amount_minor, percentage) = transfer.to_parts();
            let active = children::ActiveModel {
                id: ActiveValue::Set(child.id.to_string()),
                savings_transfer_type: ActiveValue::Set(kind.as_str().to_string()),
                savings_transfer_amount_minor: ActiveValue::Set(amount_minor),
                savings_transfer_percentage: ActiveValue::Set(percentage),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(child)
        })
    }

    /// Lists the newest savings-ledger rows of a child.
    pub async fn list_savings_transactions(
        &self,
        child_id: Uuid,
        limit: u64,
        user_id: &str,
    ) -> ResultEngine<Vec<SavingsTransaction>> {
        with_tx!(self, |db_tx| {
            self.require_child(&db_tx, child_id, user_id, AccessLevel::Read)
                .await?;
            let rows = savings_transactions::Entity::find()
                .filter(savings_transactions::Column::ChildId.eq(child_id.to_string()))
                .order_by_desc(savings_transactions::Column::CreatedAt)
                .limit(limit)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(SavingsTransaction::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;
            Ok(rows)
        })
    }
}
