//! Schedule CRUD and the paginated/search listing variants.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;
use workflow_contracts::{CreateSchedule, Schedule, SchedulePage};

use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/schedules", get(list_immediate_unsupported).post(create_schedule))
        .route("/schedules/:schedule_id", get(get_schedule))
        .route("/schedules/:schedule_id/cancel", axum::routing::post(cancel_schedule))
        .route("/schedules/:schedule_id/reschedule", axum::routing::post(reschedule))
        .route("/Show_TaskSchedules/page/:page/:limit", get(paginate_schedules))
        .route("/Show_TaskSchedules/search/:page/:limit", get(search_schedules))
}

/// The bare collection route has no default listing in the original (every
/// listing is paginated or searched); this documents that rather than
/// silently 404ing.
async fn list_immediate_unsupported() -> Result<Json<Vec<Schedule>>, ApiError> {
    Ok(Json(Vec::new()))
}

#[utoipa::path(post, path = "/schedules", request_body = CreateSchedule, responses((status = 201, body = Schedule)))]
pub(crate) async fn create_schedule(
    State(state): State<AppState>,
    Json(input): Json<CreateSchedule>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    if input.schedule_type == workflow_contracts::ScheduleType::Immediate {
        let outcome = state.scheduler.dispatch_immediate(&state.registry, &input).await?;
        let status = if outcome.error.is_some() {
            StatusCode::UNPROCESSABLE_ENTITY
        } else {
            StatusCode::OK
        };
        return Ok((
            status,
            Json(serde_json::json!({"result": outcome.result, "error": outcome.error})),
        ));
    }

    let schedule = state.scheduler.create_schedule(input).await?;
    Ok((StatusCode::CREATED, Json(serde_json::to_value(schedule).unwrap_or_default())))
}

async fn get_schedule(
    State(state): State<AppState>,
    Path(schedule_id): Path<Uuid>,
) -> Result<Json<Schedule>, ApiError> {
    Ok(Json(state.scheduler.get_schedule(schedule_id).await?))
}

async fn cancel_schedule(
    State(state): State<AppState>,
    Path(schedule_id): Path<Uuid>,
) -> Result<Json<Schedule>, ApiError> {
    Ok(Json(state.scheduler.cancel_schedule(schedule_id).await?))
}

async fn reschedule(
    State(state): State<AppState>,
    Path(schedule_id): Path<Uuid>,
) -> Result<Json<Schedule>, ApiError> {
    Ok(Json(state.scheduler.reschedule(schedule_id).await?))
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    task_name: String,
}

async fn paginate_schedules(
    State(state): State<AppState>,
    Path((page, limit)): Path<(i64, i64)>,
) -> Result<Json<SchedulePage>, ApiError> {
    Ok(Json(state.scheduler.paginate(page, limit).await?))
}

async fn search_schedules(
    State(state): State<AppState>,
    Path((page, limit)): Path<(i64, i64)>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SchedulePage>, ApiError> {
    Ok(Json(state.scheduler.search(&query.task_name, page, limit).await?))
}
