use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post, put},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};

use std::{net::SocketAddr, sync::Arc};

use crate::{allowance, budgets, children, goals, ledger, notifications, user};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Basic auth against the users table. The authenticated [`engine::User`] is
/// stored in the request extensions.
async fn auth(
    auth_header: TypedHeader<Authorization<Basic>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user = state
        .engine
        .authenticate(auth_header.username(), auth_header.password())
        .await
        .map_err(|err| {
            tracing::error!("authentication failed: {err}");
            StatusCode::UNAUTHORIZED
        })?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub(crate) fn router(state: ServerState) -> Router {
    Router::new()
        .route("/me", get(user::me))
        .route("/children", get(children::list).post(children::child_new))
        .route(
            "/children/{child_id}",
            get(children::get).delete(children::deactivate),
        )
        .route("/children/{child_id}/link", post(children::link_user))
        .route(
            "/children/{child_id}/allowance",
            put(children::update_allowance),
        )
        .route(
            "/children/{child_id}/allowance/pause",
            post(children::pause_allowance),
        )
        .route(
            "/children/{child_id}/allowance/resume",
            post(children::resume_allowance),
        )
        .route("/children/{child_id}/allowance/pay", post(allowance::pay))
        .route("/children/{child_id}/debt", put(children::set_allow_debt))
        .route(
            "/children/{child_id}/savings-transfer",
            put(children::update_savings_transfer),
        )
        .route("/children/{child_id}/spending", post(ledger::spending_new))
        .route("/children/{child_id}/credits", post(ledger::credit_new))
        .route(
            "/children/{child_id}/transactions",
            get(ledger::list_transactions),
        )
        .route(
            "/children/{child_id}/savings/deposit",
            post(ledger::savings_deposit),
        )
        .route(
            "/children/{child_id}/savings/withdraw",
            post(ledger::savings_withdraw),
        )
        .route(
            "/children/{child_id}/savings/transactions",
            get(ledger::list_savings_transactions),
        )
        .route(
            "/children/{child_id}/goals",
            get(goals::list).post(goals::goal_new),
        )
        .route(
            "/children/{child_id}/budgets",
            get(budgets::list).put(budgets::upsert),
        )
        .route("/children/{child_id}/budgets/check", get(budgets::check))
        .route(
            "/children/{child_id}/budgets/{category}",
            delete(budgets::remove),
        )
        .route(
            "/goals/{goal_id}",
            get(goals::get).patch(goals::update).delete(goals::cancel),
        )
        .route(
            "/goals/{goal_id}/contributions",
            get(goals::list_contributions).post(goals::contribute),
        )
        .route("/goals/{goal_id}/withdraw", post(goals::withdraw))
        .route("/goals/{goal_id}/purchase", post(goals::purchase))
        .route("/goals/{goal_id}/pause", put(goals::set_paused))
        .route(
            "/goals/{goal_id}/milestones/{percentage}",
            put(goals::set_milestone_bonus),
        )
        .route(
            "/goals/{goal_id}/matching",
            put(goals::upsert_matching_rule).delete(goals::remove_matching_rule),
        )
        .route(
            "/goals/{goal_id}/challenge",
            post(goals::start_challenge).delete(goals::cancel_challenge),
        )
        .route("/notifications", get(notifications::list))
        .route("/notifications/{notification_id}/read", post(notifications::mark_read))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run(engine: Engine, addr: SocketAddr) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(Arc::new(engine), listener).await {
        tracing::error!("server failed: {err}");
    }
}

/// Serves the API on `listener`. The engine is shared so the caller can keep
/// using it (e.g. for the allowance scheduler).
pub async fn run_with_listener(
    engine: Arc<Engine>,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState { engine };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Arc<Engine>,
    listener: tokio::net::TcpListener,
) -> Result<SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, header},
    };
    use engine::{MoneyCents, NewChildCmd, UserRole};
    use http_body_util::BodyExt;
    use migration::MigratorTrait;
    use sea_orm::Database;
    use tower::ServiceExt;

    use super::*;

    // "alice:password" and "bob:password"
    const ALICE: &str = "Basic YWxpY2U6cGFzc3dvcmQ=";
    const BOB: &str = "Basic Ym9iOnBhc3N3b3Jk";

    async fn test_state() -> (ServerState, uuid::Uuid) {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        let engine = Engine::builder().database(db).build().await.unwrap();

        let family = engine.create_family("Rossi").await.unwrap();
        engine
            .create_user("alice", "password", UserRole::Parent, Some(family))
            .await
            .unwrap();
        let other = engine.create_family("Bianchi").await.unwrap();
        engine
            .create_user("bob", "password", UserRole::Parent, Some(other))
            .await
            .unwrap();
        let child = engine
            .create_child(NewChildCmd::new("alice", "Cleo", MoneyCents::new(10_00)))
            .await
            .unwrap();

        (
            ServerState {
                engine: Arc::new(engine),
            },
            child.id,
        )
    }

    fn get_request(uri: &str, auth: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn requests_without_credentials_are_rejected() {
        let (state, _) = test_state().await;
        let res = router(state)
            .oneshot(get_request("/children", None))
            .await
            .unwrap();
        assert_ne!(res.status(), StatusCode::OK);

        let (state, _) = test_state().await;
        let res = router(state)
            .oneshot(get_request(
                "/children",
                Some("Basic YWxpY2U6d3Jvbmc="),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn parent_lists_their_children() {
        let (state, child_id) = test_state().await;
        let res = router(state)
            .oneshot(get_request("/children", Some(ALICE)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let body = res.into_body().collect().await.unwrap().to_bytes();
        let children: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(children[0]["id"], child_id.to_string());
        assert_eq!(children[0]["weekly_allowance_minor"], 1000);
    }

    #[tokio::test]
    async fn other_family_gets_forbidden() {
        let (state, child_id) = test_state().await;
        let res = router(state)
            .oneshot(get_request(&format!("/children/{child_id}"), Some(BOB)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn spending_over_enforced_budget_is_rejected() {
        let (state, child_id) = test_state().await;
        let app = router(state);

        let credit = Request::builder()
            .method("POST")
            .uri(format!("/children/{child_id}/credits"))
            .header(header::AUTHORIZATION, ALICE)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{"amount_minor": 10000, "category": "Chores", "description": null}"#,
            ))
            .unwrap();
        let res = app.clone().oneshot(credit).await.unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);

        let budget = Request::builder()
            .method("PUT")
            .uri(format!("/children/{child_id}/budgets"))
            .header(header::AUTHORIZATION, ALICE)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{"category": "Snacks", "limit_minor": 5000, "period": "weekly", "enforce_limit": true}"#,
            ))
            .unwrap();
        let res = app.clone().oneshot(budget).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let spend = |amount: i64| {
            Request::builder()
                .method("POST")
                .uri(format!("/children/{child_id}/spending"))
                .header(header::AUTHORIZATION, ALICE)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(format!(
                    r#"{{"amount_minor": {amount}, "category": "Snacks"}}"#
                )))
                .unwrap()
        };
        let res = app.clone().oneshot(spend(45_00)).await.unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let res = app.oneshot(spend(10_00)).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
