//! Spending, credits and the savings balance of a child.

use api_types::{
    ListQuery,
    savings::{SavingsMove, SavingsTransactionKind as ApiSavingsKind, SavingsTransactionView},
    transaction::{
        CreditCreated, SpendingCreated, TransactionKind as ApiTransactionKind, TransactionNew,
        TransactionView,
    },
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{
    CreditCmd, MoneyCents, SavingsTransaction, SavingsTransactionKind, SpendingCmd, Transaction,
    TransactionKind, User,
};
use uuid::Uuid;

use crate::{ServerError, budgets::budget_check_view, server::ServerState};

pub(crate) const DEFAULT_LIST_LIMIT: u64 = 50;

pub(crate) fn transaction_view(tx: Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        kind: match tx.kind {
            TransactionKind::Credit => ApiTransactionKind::Credit,
            TransactionKind::Debit => ApiTransactionKind::Debit,
        },
        amount_minor: tx.amount.cents(),
        category: tx.category,
        description: tx.description,
        balance_after_minor: tx.balance_after.cents(),
        created_by: tx.created_by,
        created_at: tx.created_at,
    }
}

pub(crate) fn savings_transaction_view(tx: SavingsTransaction) -> SavingsTransactionView {
    SavingsTransactionView {
        id: tx.id,
        kind: match tx.kind {
            SavingsTransactionKind::Deposit => ApiSavingsKind::Deposit,
            SavingsTransactionKind::Withdrawal => ApiSavingsKind::Withdrawal,
        },
        amount_minor: tx.amount.cents(),
        balance_after_minor: tx.balance_after.cents(),
        is_automatic: tx.is_automatic,
        source_transaction_id: tx.source_transaction_id,
        description: tx.description,
        created_by: tx.created_by,
        created_at: tx.created_at,
    }
}

pub async fn spending_new(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(child_id): Path<Uuid>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<SpendingCreated>), ServerError> {
    let mut cmd = SpendingCmd::new(
        child_id,
        user.username,
        MoneyCents::new(payload.amount_minor),
        payload.category,
    );
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }

    let outcome = state.engine.record_spending(cmd).await?;
    Ok((
        StatusCode::CREATED,
        Json(SpendingCreated {
            transaction: transaction_view(outcome.transaction),
            budget: budget_check_view(outcome.budget),
        }),
    ))
}

pub async fn credit_new(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(child_id): Path<Uuid>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<CreditCreated>), ServerError> {
    let mut cmd = CreditCmd::new(
        child_id,
        user.username,
        MoneyCents::new(payload.amount_minor),
        payload.category,
    );
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }

    let outcome = state.engine.record_credit(cmd).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreditCreated {
            transaction: transaction_view(outcome.transaction),
            savings_transfer: outcome.savings_transfer.map(savings_transaction_view),
        }),
    ))
}

pub async fn list_transactions(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(child_id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<TransactionView>>, ServerError> {
    let transactions = state
        .engine
        .list_transactions(
            child_id,
            query.limit.unwrap_or(DEFAULT_LIST_LIMIT),
            &user.username,
        )
        .await?;
    Ok(Json(
        transactions.into_iter().map(transaction_view).collect(),
    ))
}

pub async fn savings_deposit(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(child_id): Path<Uuid>,
    Json(payload): Json<SavingsMove>,
) -> Result<(StatusCode, Json<SavingsTransactionView>), ServerError> {
    let tx = state
        .engine
        .deposit_to_savings(
            child_id,
            MoneyCents::new(payload.amount_minor),
            payload.description.as_deref(),
            &user.username,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(savings_transaction_view(tx))))
}

pub async fn savings_withdraw(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(child_id): Path<Uuid>,
    Json(payload): Json<SavingsMove>,
) -> Result<(StatusCode, Json<SavingsTransactionView>), ServerError> {
    let tx = state
        .engine
        .withdraw_from_savings(
            child_id,
            MoneyCents::new(payload.amount_minor),
            payload.description.as_deref(),
            &user.username,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(savings_transaction_view(tx))))
}

pub async fn list_savings_transactions(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(child_id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<SavingsTransactionView>>, ServerError> {
    let transactions = state
        .engine
        .list_savings_transactions(
            child_id,
            query.limit.unwrap_or(DEFAULT_LIST_LIMIT),
            &user.username,
        )
        .await?;
    Ok(Json(
        transactions
            .into_iter()
            .map(savings_transaction_view)
            .collect(),
    ))
}
