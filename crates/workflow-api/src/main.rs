mod auth;
mod docs;
mod error;
mod execution_stream;
mod health;
mod node_types;
mod schedules;
mod state;
mod tasks;
mod workflows;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use workflow_engine::ExecutorRegistry;
use workflow_scheduler::{RecurringStore, SchedulerService};
use workflow_storage::Database;

use crate::auth::JwtSecret;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "workflow_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("workflow-api starting...");

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL environment variable required")?;
    let db = Database::from_url(&database_url).await.context("failed to connect to database")?;
    tracing::info!("connected to database");

    if std::env::var("WORKFLOW_API_SKIP_MIGRATIONS").is_err() {
        db.migrate().await.context("failed to run database migrations")?;
        tracing::info!("migrations applied");
    }

    let redis_url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
    let recurring = RecurringStore::from_url(&redis_url).context("failed to connect to redis")?;
    tracing::info!("connected to redis");

    let mut registry = ExecutorRegistry::with_database(db.pool().clone());
    if let Ok(interpreter) = std::env::var("PYTHON_INTERPRETER") {
        registry.register(
            workflow_contracts::ExecutorKind::Python,
            Box::new(workflow_engine::PythonExecutor { interpreter }),
        );
    }
    let registry = Arc::new(registry);

    let scheduler = Arc::new(SchedulerService::new(db.clone(), recurring));

    let jwt_secret = JwtSecret(std::env::var("JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".to_string()));

    let state = AppState {
        db,
        registry,
        scheduler,
        jwt_secret,
    };

    let app = Router::new()
        .merge(workflows::router())
        .merge(node_types::router())
        .merge(tasks::router())
        .merge(schedules::router())
        .merge(execution_stream::router())
        .merge(health::router())
        .merge(docs::router())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind to {bind_addr}"))?;
    tracing::info!(addr = %bind_addr, "listening");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
