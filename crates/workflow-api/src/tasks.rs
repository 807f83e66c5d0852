//! Task catalog CRUD, and the execution/execution-step history endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;
use workflow_contracts::{CreateTask, Execution, ExecutionStep, Task};
use workflow_storage::models::CreateTaskRow;

use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/:task_name", get(get_task).delete(cancel_task))
        .route("/executions", get(list_executions))
        .route("/executions/:execution_id", get(get_execution))
        .route("/executions/:execution_id/steps", get(list_execution_steps))
}

fn task_to_contract(row: workflow_storage::models::TaskRow) -> Result<Task, ApiError> {
    Ok(Task {
        task_name: row.task_name,
        description: row.description,
        executor: row.executor.parse().map_err(ApiError::Validation)?,
        target: row.target,
        cancelled: row.cancelled,
    })
}

async fn list_tasks(State(state): State<AppState>) -> Result<Json<Vec<Task>>, ApiError> {
    let rows = state.db.list_tasks().await?;
    Ok(Json(rows.into_iter().map(task_to_contract).collect::<Result<_, _>>()?))
}

#[utoipa::path(post, path = "/tasks", request_body = CreateTask, responses((status = 201, body = Task)))]
pub(crate) async fn create_task(
    State(state): State<AppState>,
    Json(input): Json<CreateTask>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let row = state
        .db
        .create_task(CreateTaskRow {
            task_name: input.task_name,
            description: input.description,
            executor: input.executor.to_string(),
            target: input.target,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(task_to_contract(row)?)))
}

async fn get_task(
    State(state): State<AppState>,
    Path(task_name): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let row = state
        .db
        .get_task(&task_name)
        .await?
        .ok_or(ApiError::NotFound {
            entity: "task",
            key: task_name,
        })?;
    Ok(Json(task_to_contract(row)?))
}

async fn cancel_task(
    State(state): State<AppState>,
    Path(task_name): Path<String>,
) -> Result<StatusCode, ApiError> {
    let cancelled = state.db.cancel_task(&task_name).await?;
    if cancelled {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound {
            entity: "task",
            key: task_name,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ListExecutionsQuery {
    process_id: Option<i64>,
}

fn execution_to_contract(row: workflow_storage::models::ExecutionRow) -> Result<Execution, ApiError> {
    Ok(Execution {
        execution_id: row.execution_id,
        process_id: row.process_id,
        status: row.status.parse().map_err(ApiError::Validation)?,
        context: row.context,
        started_at: row.started_at,
        finished_at: row.finished_at,
        error: row.error,
    })
}

async fn list_executions(
    State(state): State<AppState>,
    Query(query): Query<ListExecutionsQuery>,
) -> Result<Json<Vec<Execution>>, ApiError> {
    let rows = state.db.list_executions(query.process_id).await?;
    Ok(Json(rows.into_iter().map(execution_to_contract).collect::<Result<_, _>>()?))
}

async fn get_execution(
    State(state): State<AppState>,
    Path(execution_id): Path<Uuid>,
) -> Result<Json<Execution>, ApiError> {
    let row = state
        .db
        .get_execution(execution_id)
        .await?
        .ok_or(ApiError::NotFound {
            entity: "execution",
            key: execution_id.to_string(),
        })?;
    Ok(Json(execution_to_contract(row)?))
}

fn step_to_contract(row: workflow_storage::models::ExecutionStepRow) -> Result<ExecutionStep, ApiError> {
    Ok(ExecutionStep {
        step_id: row.step_id,
        execution_id: row.execution_id,
        node_id: row.node_id,
        task_name: row.task_name,
        status: row.status.parse().map_err(ApiError::Validation)?,
        sequence: row.sequence,
        input: row.input,
        output: row.output,
        error: row.error,
        started_at: row.started_at,
        finished_at: row.finished_at,
    })
}

async fn list_execution_steps(
    State(state): State<AppState>,
    Path(execution_id): Path<Uuid>,
) -> Result<Json<Vec<ExecutionStep>>, ApiError> {
    let rows = state.db.list_execution_steps(execution_id).await?;
    Ok(Json(rows.into_iter().map(step_to_contract).collect::<Result<_, _>>()?))
}
