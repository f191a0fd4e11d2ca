use std::{sync::Arc, time::Duration};

use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use settings::Database;

mod settings;

const DEFAULT_INTERVAL_SECS: u64 = 3600;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;
    let mut tasks = tokio::task::JoinSet::new();

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "allowance_tracker={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let Some(server) = settings.server else {
        tracing::warn!("no server settings found, nothing to do");
        return Ok(());
    };

    tracing::info!("Found server settings...");
    let db = parse_database(&server.database).await?;
    let engine = Arc::new(engine::Engine::builder().database(db).build().await?);

    let interval_secs = settings
        .scheduler
        .map(|scheduler| scheduler.interval_secs)
        .unwrap_or(DEFAULT_INTERVAL_SECS);
    let scheduler_engine = Arc::clone(&engine);
    tasks.spawn(async move {
        run_scheduler(scheduler_engine, Duration::from_secs(interval_secs)).await;
    });

    tasks.spawn(async move {
        let bind = server.bind.unwrap_or_else(|| "127.0.0.1".to_string());
        let addr = format!("{}:{}", bind, server.port);
        let listener = match tokio::net::TcpListener::bind(addr).await {
            Ok(listener) => listener,
            Err(err) => {
                tracing::error!("failed to bind server listener: {err}");
                return;
            }
        };
        if let Err(err) = server::run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    while tasks.join_next().await.is_some() {
        tasks.shutdown().await;
    }

    Ok(())
}

/// Pays due allowances and expires overdue challenges on every tick.
async fn run_scheduler(engine: Arc<engine::Engine>, period: Duration) {
    let mut interval = tokio::time::interval(period);
    loop {
        interval.tick().await;
        let now = Utc::now();

        match engine.process_due_allowances(now).await {
            Ok(payments) if !payments.is_empty() => {
                tracing::info!("paid {} allowances", payments.len());
            }
            Ok(_) => {}
            Err(err) => tracing::error!("allowance run failed: {err}"),
        }

        match engine.expire_challenges(now).await {
            Ok(expired) if !expired.is_empty() => {
                tracing::info!("expired {} challenges", expired.len());
            }
            Ok(_) => {}
            Err(err) => tracing::error!("challenge sweep failed: {err}"),
        }
    }
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
