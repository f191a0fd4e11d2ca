use engine::{
    BudgetCmd, BudgetPeriod, EngineError, MoneyCents, NotificationKind, SpendingCmd,
};

mod common;

use common::{Family, KID, PARENT, family, fund};

async fn spend(family: &Family, cents: i64, category: &str) -> Result<engine::SpendingOutcome, EngineError> {
    family
        .engine
        .record_spending(SpendingCmd::new(
            family.child.id,
            KID,
            MoneyCents::new(cents),
            category,
        ))
        .await
}

async fn snack_budget(family: &Family, enforce: bool) {
    family
        .engine
        .upsert_budget(
            BudgetCmd::new(
                family.child.id,
                PARENT,
                "Snacks",
                MoneyCents::new(50_00),
                BudgetPeriod::Weekly,
            )
            .enforce_limit(enforce),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn enforced_budget_blocks_overspending() {
    let family = family().await;
    fund(&family, 100_00).await;
    snack_budget(&family, true).await;

    spend(&family, 45_00, "Snacks").await.unwrap();
    let err = spend(&family, 10_00, "snacks").await.unwrap_err();
    assert!(matches!(err, EngineError::BudgetExceeded(_)));

    let child = family.engine.child(family.child.id, PARENT).await.unwrap();
    assert_eq!(child.current_balance, MoneyCents::new(55_00));

    // Exactly up to the limit is fine.
    spend(&family, 5_00, " SNACKS ").await.unwrap();
}

#[tokio::test]
async fn soft_budget_warns_and_notifies() {
    let family = family().await;
    fund(&family, 100_00).await;
    snack_budget(&family, false).await;

    let first = spend(&family, 30_00, "Snacks").await.unwrap();
    assert!(first.budget.allowed);
    assert!(!first.budget.is_warning());

    let second = spend(&family, 30_00, "Snacks").await.unwrap();
    assert!(second.budget.allowed);
    assert!(second.budget.is_warning());
    assert_eq!(second.budget.current_spending, MoneyCents::new(30_00));

    let notifications = family
        .engine
        .list_notifications(true, 10, PARENT)
        .await
        .unwrap();
    assert!(
        notifications
            .iter()
            .any(|n| n.kind == NotificationKind::BudgetWarning)
    );
}

#[tokio::test]
async fn check_budget_previews_without_spending() {
    let family = family().await;
    fund(&family, 100_00).await;
    snack_budget(&family, true).await;
    spend(&family, 40_00, "Snacks").await.unwrap();

    let preview = family
        .engine
        .check_budget(family.child.id, "Snacks", MoneyCents::new(10_00), KID)
        .await
        .unwrap();
    assert!(preview.allowed);
    assert_eq!(preview.limit, Some(MoneyCents::new(50_00)));
    assert_eq!(preview.remaining_after, Some(MoneyCents::ZERO));

    let unbudgeted = family
        .engine
        .check_budget(family.child.id, "Books", MoneyCents::new(99_00), KID)
        .await
        .unwrap();
    assert!(unbudgeted.allowed);
    assert_eq!(unbudgeted.limit, None);
}

#[tokio::test]
async fn removed_budget_no_longer_applies() {
    let family = family().await;
    fund(&family, 100_00).await;
    snack_budget(&family, true).await;

    family
        .engine
        .remove_budget(family.child.id, "snacks", PARENT)
        .await
        .unwrap();
    spend(&family, 60_00, "Snacks").await.unwrap();

    let err = family
        .engine
        .remove_budget(family.child.id, "Toys", PARENT)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn only_parents_manage_budgets() {
    let family = family().await;
    let err = family
        .engine
        .upsert_budget(BudgetCmd::new(
            family.child.id,
            KID,
            "Snacks",
            MoneyCents::new(50_00),
            BudgetPeriod::Monthly,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn spending_without_debt_needs_balance() {
    let family = family().await;
    fund(&family, 5_00).await;

    let err = spend(&family, 5_01, "Toys").await.unwrap_err();
    assert!(matches!(err, EngineError::InsufficientBalance(_)));

    family
        .engine
        .set_allow_debt(family.child.id, true, PARENT)
        .await
        .unwrap();
    let outcome = spend(&family, 8_00, "Toys").await.unwrap();
    assert_eq!(outcome.transaction.balance_after, MoneyCents::new(-3_00));

    let err = family
        .engine
        .set_allow_debt(family.child.id, false, PARENT)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));
}

#[tokio::test]
async fn oversized_amount_is_rejected_by_budget_check() {
    let family = family().await;
    fund(&family, 100_00).await;
    snack_budget(&family, true).await;
    spend(&family, 1_00, "Snacks").await.unwrap();

    let err = family
        .engine
        .check_budget(family.child.id, "Snacks", MoneyCents::new(i64::MAX), PARENT)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = spend(&family, i64::MAX, "Snacks").await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let child = family.engine.child(family.child.id, PARENT).await.unwrap();
    assert_eq!(child.current_balance, MoneyCents::new(99_00));
}
