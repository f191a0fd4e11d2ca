use api_types::allowance::{AllowancePaid, AllowancePay};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use chrono::Utc;
use engine::{AllowancePayment, User};
use uuid::Uuid;

use crate::{
    ServerError,
    goals::contribution_view,
    ledger::{savings_transaction_view, transaction_view},
    server::ServerState,
};

fn allowance_paid_view(payment: AllowancePayment) -> AllowancePaid {
    AllowancePaid {
        child_id: payment.child_id,
        allowance: transaction_view(payment.allowance),
        savings_transfer: payment.savings_transfer.map(savings_transaction_view),
        goal_transfers: payment
            .goal_transfers
            .into_iter()
            .map(contribution_view)
            .collect(),
        balance_after_minor: payment.balance_after.cents(),
        savings_balance_after_minor: payment.savings_balance_after.cents(),
    }
}

/// Pays the allowance of one child if it is due. `null` means nothing was due.
pub async fn pay(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(child_id): Path<Uuid>,
    Json(payload): Json<AllowancePay>,
) -> Result<Json<Option<AllowancePaid>>, ServerError> {
    let as_of = payload
        .as_of
        .map(|as_of| as_of.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);

    let payment = state
        .engine
        .pay_allowance(child_id, as_of, &user.username)
        .await?;
    Ok(Json(payment.map(allowance_paid_view)))
}
