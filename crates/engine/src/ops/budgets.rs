use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    BudgetCheckResult, BudgetCmd, CategoryBudget, EngineError, MoneyCents, ResultEngine,
    category_budgets,
    util::{normalize_category, parse_uuid},
};

use super::{AccessLevel, Engine, with_tx};

impl Engine {
    /// Creates the budget of a category, or updates it when one exists.
    pub async fn upsert_budget(&self, cmd: BudgetCmd) -> ResultEngine<CategoryBudget> {
        let now = Utc::now();
        let mut budget = CategoryBudget::new(
            cmd.child_id,
            &cmd.category,
            cmd.limit,
            cmd.period,
            cmd.alert_threshold_percent,
            cmd.enforce_limit,
            &cmd.user_id,
            now,
        )?;
        with_tx!(self, |db_tx| {
            self.require_child(&db_tx, cmd.child_id, &cmd.user_id, AccessLevel::Manage)
                .await?;

            let existing = category_budgets::Entity::find()
                .filter(category_budgets::Column::ChildId.eq(cmd.child_id.to_string()))
                .filter(category_budgets::Column::CategoryNorm.eq(budget.category_norm.clone()))
                .one(&db_tx)
                .await?;

            match existing {
                Some(model) => {
                    budget.id = parse_uuid(&model.id, "budget")?;
                    budget.created_at = model.created_at;
                    let active: category_budgets::ActiveModel = (&budget).into();
                    active.update(&db_tx).await?;
                }
                None => {
                    let active: category_budgets::ActiveModel = (&budget).into();
                    active.insert(&db_tx).await?;
                }
            }
            Ok(budget)
        })
    }

    /// Active budgets of a child.
    pub async fn list_budgets(
        &self,
        child_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Vec<CategoryBudget>> {
        with_tx!(self, |db_tx| {
            self.require_child(&db_tx, child_id, user_id, AccessLevel::Read)
                .await?;
            let budgets = category_budgets::Entity::find()
                .filter(category_budgets::Column::ChildId.eq(child_id.to_string()))
                .filter(category_budgets::Column::IsActive.eq(true))
                .order_by_asc(category_budgets::Column::CategoryNorm)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(CategoryBudget::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;
            Ok(budgets)
        })
    }

    /// Deactivates the budget of a category.
    pub async fn remove_budget(
        &self,
        child_id: Uuid,
        category: &str,
        user_id: &str,
    ) -> ResultEngine<()> {
        let category_norm = normalize_category(category)?;
        with_tx!(self, |db_tx| {
            self.require_child(&db_tx, child_id, user_id, AccessLevel::Manage)
                .await?;
            let model = category_budgets::Entity::find()
                .filter(category_budgets::Column::ChildId.eq(child_id.to_string()))
                .filter(category_budgets::Column::CategoryNorm.eq(category_norm))
                .filter(category_budgets::Column::IsActive.eq(true))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound(format!("budget {category}")))?;

            let active = category_budgets::ActiveModel {
                id: ActiveValue::Set(model.id),
                is_active: ActiveValue::Set(false),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Checks whether `amount` may be spent in `category` right now, without
    /// recording anything.
    pub async fn check_budget(
        &self,
        child_id: Uuid,
        category: &str,
        amount: MoneyCents,
        user_id: &str,
    ) -> ResultEngine<BudgetCheckResult> {
        let now = Utc::now();
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "amount must be > 0".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            self.require_child(&db_tx, child_id, user_id, AccessLevel::Read)
                .await?;
            let (_, result) = self
                .budget_check_in_tx(&db_tx, child_id, category, amount, now)
                .await?;
            Ok(result)
        })
    }
}
