//! Budget check for a proposed spending transaction.

use crate::{CategoryBudget, EngineError, MoneyCents, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BudgetCheckResult {
    pub allowed: bool,
    /// Set for warnings and blocks.
    pub message: Option<String>,
    pub current_spending: MoneyCents,
    /// `None` when the category has no active budget.
    pub limit: Option<MoneyCents>,
    pub remaining_after: Option<MoneyCents>,
}

impl BudgetCheckResult {
    /// Allowed, but a message should be shown.
    pub fn is_warning(&self) -> bool {
        self.allowed && self.message.is_some()
    }
}

/// Decides whether `proposed` may be spent given `current_spending` in the
/// budget's current window.
///
/// An inactive or missing budget always allows. Amounts whose sum does not
/// fit in cents are rejected with `InvalidAmount`.
pub fn evaluate(
    budget: Option<&CategoryBudget>,
    current_spending: MoneyCents,
    proposed: MoneyCents,
) -> ResultEngine<BudgetCheckResult> {
    let Some(budget) = budget.filter(|b| b.is_active) else {
        return Ok(BudgetCheckResult {
            allowed: true,
            message: None,
            current_spending,
            limit: None,
            remaining_after: None,
        });
    };

    let too_large = || EngineError::InvalidAmount("amount too large".to_string());
    let spent_after = current_spending
        .checked_add(proposed)
        .ok_or_else(too_large)?;
    let remaining_after = budget.limit.checked_sub(spent_after).ok_or_else(too_large)?;

    let (allowed, message) = if remaining_after.is_negative() {
        if budget.enforce_limit {
            (
                false,
                Some(format!(
                    "{} over the {} {} budget for {}",
                    -remaining_after,
                    budget.limit,
                    budget.period.as_str(),
                    budget.category
                )),
            )
        } else {
            (
                true,
                Some(format!(
                    "This will exceed the {} budget for {} by {}",
                    budget.period.as_str(),
                    budget.category,
                    -remaining_after
                )),
            )
        }
    } else if reaches_threshold(spent_after, budget.limit, budget.alert_threshold_percent) {
        (
            true,
            Some(format!(
                "{} of the {} budget for {} will be used, {} left",
                spent_after, budget.limit, budget.category, remaining_after
            )),
        )
    } else {
        (true, None)
    };

    Ok(BudgetCheckResult {
        allowed,
        message,
        current_spending,
        limit: Some(budget.limit),
        remaining_after: Some(remaining_after),
    })
}

/// `spent / limit * 100 >= threshold`, in integer arithmetic.
fn reaches_threshold(spent: MoneyCents, limit: MoneyCents, threshold_percent: i32) -> bool {
    if !limit.is_positive() {
        return true;
    }
    i128::from(spent.cents()) * 100 >= i128::from(limit.cents()) * i128::from(threshold_percent)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::BudgetPeriod;

    fn budget(limit: i64, enforce: bool) -> CategoryBudget {
        CategoryBudget::new(
            Uuid::new_v4(),
            "Games",
            MoneyCents::new(limit),
            BudgetPeriod::Weekly,
            None,
            enforce,
            "dad",
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn no_budget_always_allows() {
        let result = evaluate(None, MoneyCents::new(1_000_00), MoneyCents::new(1_00)).unwrap();
        assert!(result.allowed);
        assert_eq!(result.message, None);
        assert_eq!(result.limit, None);
    }

    #[test]
    fn enforced_limit_blocks_overspend() {
        let budget = budget(50_00, true);
        let result = evaluate(Some(&budget), MoneyCents::new(45_00), MoneyCents::new(10_00)).unwrap();
        assert!(!result.allowed);
        assert_eq!(result.remaining_after, Some(MoneyCents::new(-5_00)));
        assert!(result.message.is_some());
    }

    #[test]
    fn soft_limit_warns_on_overspend() {
        let budget = budget(50_00, false);
        let result = evaluate(Some(&budget), MoneyCents::new(45_00), MoneyCents::new(10_00)).unwrap();
        assert!(result.allowed);
        assert!(result.is_warning());
    }

    #[test]
    fn threshold_warns_before_limit() {
        let budget = budget(50_00, true);
        // exactly 80%
        let result = evaluate(Some(&budget), MoneyCents::new(30_00), MoneyCents::new(10_00)).unwrap();
        assert!(result.is_warning());
        assert_eq!(result.remaining_after, Some(MoneyCents::new(10_00)));

        let result = evaluate(Some(&budget), MoneyCents::new(30_00), MoneyCents::new(9_99)).unwrap();
        assert!(result.allowed);
        assert_eq!(result.message, None);
    }

    #[test]
    fn spending_exactly_the_limit_is_allowed() {
        let budget = budget(50_00, true);
        let result = evaluate(Some(&budget), MoneyCents::new(45_00), MoneyCents::new(5_00)).unwrap();
        assert!(result.allowed);
        assert_eq!(result.remaining_after, Some(MoneyCents::ZERO));
    }

    #[test]
    fn oversized_amount_is_rejected() {
        let budget = budget(50_00, true);
        let result = evaluate(Some(&budget), MoneyCents::new(1_00), MoneyCents::new(i64::MAX));
        assert!(matches!(result, Err(EngineError::InvalidAmount(_))));
    }

    #[test]
    fn inactive_budget_is_ignored() {
        let mut budget = budget(50_00, true);
        budget.is_active = false;
        let result = evaluate(Some(&budget), MoneyCents::new(45_00), MoneyCents::new(10_00)).unwrap();
        assert!(result.allowed);
        assert_eq!(result.limit, None);
    }
}
