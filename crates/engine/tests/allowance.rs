use chrono::{Duration, TimeZone, Utc};
use rust_decimal_macros::dec;

use engine::{
    ContributionKind, EngineError, MoneyCents, NewGoalCmd, SavingsTransfer,
    SavingsTransactionKind, TransactionKind,
};

mod common;

use common::{KID, OTHER_PARENT, PARENT, family, family_with};

#[tokio::test]
async fn allowance_sweeps_ten_percent_into_savings() {
    let family = family_with(10_00, SavingsTransfer::Percentage(dec!(10))).await;
    let as_of = Utc.with_ymd_and_hms(2025, 3, 5, 8, 0, 0).unwrap();

    let payment = family
        .engine
        .pay_allowance(family.child.id, as_of, PARENT)
        .await
        .unwrap()
        .expect("first allowance is due immediately");

    assert_eq!(payment.allowance.amount, MoneyCents::new(10_00));
    assert_eq!(payment.allowance.kind, TransactionKind::Credit);
    let sweep = payment.savings_transfer.expect("sweep configured");
    assert_eq!(sweep.amount, MoneyCents::new(1_00));
    assert_eq!(sweep.kind, SavingsTransactionKind::Deposit);
    assert!(sweep.is_automatic);
    assert_eq!(payment.balance_after, MoneyCents::new(9_00));
    assert_eq!(payment.savings_balance_after, MoneyCents::new(1_00));

    let child = family.engine.child(family.child.id, PARENT).await.unwrap();
    assert_eq!(child.current_balance, MoneyCents::new(9_00));
    assert_eq!(child.savings_balance, MoneyCents::new(1_00));
    assert_eq!(child.last_allowance_date, Some(as_of));

    // Credit, then the sweep debit.
    let history = family
        .engine
        .list_transactions(family.child.id, 10, PARENT)
        .await
        .unwrap();
    assert_eq!(history.len(), 2);
}

#[tokio::test]
async fn allowance_is_not_paid_twice_in_one_window() {
    let family = family().await;
    let as_of = Utc.with_ymd_and_hms(2025, 3, 5, 8, 0, 0).unwrap();
    let engine = &family.engine;

    assert!(
        engine
            .pay_allowance(family.child.id, as_of, PARENT)
            .await
            .unwrap()
            .is_some()
    );
    assert!(
        engine
            .pay_allowance(family.child.id, as_of + Duration::days(6), PARENT)
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        engine
            .pay_allowance(family.child.id, as_of + Duration::days(7), PARENT)
            .await
            .unwrap()
            .is_some()
    );

    let child = engine.child(family.child.id, PARENT).await.unwrap();
    assert_eq!(child.current_balance, MoneyCents::new(20_00));
}

#[tokio::test]
async fn paused_allowance_is_skipped_by_the_batch() {
    let family = family().await;
    let engine = &family.engine;
    let as_of = Utc.with_ymd_and_hms(2025, 3, 5, 8, 0, 0).unwrap();

    engine
        .pause_allowance(family.child.id, Some("grounded"), PARENT)
        .await
        .unwrap();
    assert!(engine.process_due_allowances(as_of).await.unwrap().is_empty());

    engine
        .resume_allowance(family.child.id, PARENT)
        .await
        .unwrap();
    let payments = engine.process_due_allowances(as_of).await.unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].child_id, family.child.id);

    // Already paid for this window.
    assert!(engine.process_due_allowances(as_of).await.unwrap().is_empty());
}

#[tokio::test]
async fn allowance_feeds_goal_auto_transfer() {
    let family = family().await;
    let engine = &family.engine;
    let as_of = Utc.with_ymd_and_hms(2025, 3, 5, 8, 0, 0).unwrap();

    let agg = engine
        .create_goal(
            NewGoalCmd::new(family.child.id, PARENT, "Bike", MoneyCents::new(100_00))
                .auto_transfer(SavingsTransfer::FixedAmount(MoneyCents::new(3_00))),
        )
        .await
        .unwrap();

    let payment = engine
        .pay_allowance(family.child.id, as_of, PARENT)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payment.goal_transfers.len(), 1);
    assert_eq!(payment.goal_transfers[0].kind, ContributionKind::AutoTransfer);
    assert_eq!(payment.goal_transfers[0].amount, MoneyCents::new(3_00));
    let description = payment.goal_transfers[0].description.as_deref().unwrap();
    assert!(description.contains(&payment.allowance.id.to_string()));
    assert_eq!(payment.balance_after, MoneyCents::new(7_00));

    let goal = engine.goal(agg.goal.id, PARENT).await.unwrap();
    assert_eq!(goal.goal.current_amount, MoneyCents::new(3_00));
}

#[tokio::test]
async fn only_parents_of_the_family_pay_allowance() {
    let family = family().await;
    let as_of = Utc.with_ymd_and_hms(2025, 3, 5, 8, 0, 0).unwrap();

    let err = family
        .engine
        .pay_allowance(family.child.id, as_of, KID)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let err = family
        .engine
        .pay_allowance(family.child.id, as_of, OTHER_PARENT)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn savings_withdrawal_cannot_exceed_savings() {
    let family = family_with(10_00, SavingsTransfer::Percentage(dec!(50))).await;
    let engine = &family.engine;
    let as_of = Utc.with_ymd_and_hms(2025, 3, 5, 8, 0, 0).unwrap();
    engine
        .pay_allowance(family.child.id, as_of, PARENT)
        .await
        .unwrap();

    let err = engine
        .withdraw_from_savings(family.child.id, MoneyCents::new(5_01), None, PARENT)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientBalance(_)));

    let row = engine
        .withdraw_from_savings(family.child.id, MoneyCents::new(2_00), Some("book"), PARENT)
        .await
        .unwrap();
    assert_eq!(row.balance_after, MoneyCents::new(3_00));

    let child = engine.child(family.child.id, PARENT).await.unwrap();
    assert_eq!(child.savings_balance, MoneyCents::new(3_00));
    assert_eq!(child.current_balance, MoneyCents::new(7_00));
}
