//! Liveness/readiness probe: process status, crate version, and a DB
//! connectivity check.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
struct HealthReport {
    status: &'static str,
    version: &'static str,
    database: &'static str,
}

#[utoipa::path(get, path = "/health", responses((status = 200, body = HealthReport), (status = 503, body = HealthReport)))]
pub(crate) async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let db_ok = sqlx::query("SELECT 1").execute(state.db.pool()).await.is_ok();

    let report = HealthReport {
        status: if db_ok { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database: if db_ok { "connected" } else { "unreachable" },
    };

    let code = if db_ok { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (code, Json(report))
}
