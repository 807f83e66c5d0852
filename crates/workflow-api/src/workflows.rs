//! C9 HTTP surface for workflow (process) CRUD, validation, required-params
//! analysis, and run triggering.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::Value;
use uuid::Uuid;
use workflow_contracts::{
    CreateWorkflow, NodeBehavior, ProcessStructure, RequiredParamsReport, RunDynamicRequest, StartExecution,
    UpdateWorkflow, ValidateStructureRequest, ValidationReport, Workflow,
};
use workflow_engine::{analyzer, introspect, EngineConfig, GraphIndex, RunOutcome, StepOutcome, TaskSignature, WorkflowEngine};
use workflow_storage::models::{
    CreateExecutionRow, CreateExecutionStepRow, CreateWorkflowRow, UpdateExecutionRow, UpdateExecutionStepRow,
    UpdateWorkflowRow, WorkflowRow,
};

use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/workflows", get(list_workflows).post(create_workflow))
        .route(
            "/workflows/:process_id",
            get(get_workflow).put(update_workflow).delete(delete_workflow),
        )
        .route("/workflows/:process_id/validate", post(validate_workflow))
        .route("/workflows/:process_id/required_params", get(required_params))
        .route("/workflows/:process_id/run", post(run_workflow))
        .route("/workflow/validate", post(validate_structure))
        .route("/workflow/required_params", post(required_params_for_structure))
        .route("/workflow/run_dynamic", post(run_dynamic))
}

fn to_contract(row: WorkflowRow) -> Workflow {
    Workflow {
        process_id: row.process_id,
        process_name: row.process_name,
        description: row.description,
        structure: row.structure,
        cancelled: row.cancelled,
    }
}

#[utoipa::path(get, path = "/workflows", responses((status = 200, body = [Workflow])))]
pub(crate) async fn list_workflows(State(state): State<AppState>) -> Result<Json<Vec<Workflow>>, ApiError> {
    let rows = state.db.list_workflows(None, None).await?;
    Ok(Json(rows.into_iter().map(to_contract).collect()))
}

#[utoipa::path(post, path = "/workflows", request_body = CreateWorkflow, responses((status = 201, body = Workflow)))]
pub(crate) async fn create_workflow(
    State(state): State<AppState>,
    Json(input): Json<CreateWorkflow>,
) -> Result<(StatusCode, Json<Workflow>), ApiError> {
    let row = state
        .db
        .create_workflow(CreateWorkflowRow {
            process_name: input.process_name,
            description: input.description,
            structure: input.structure,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(to_contract(row))))
}

#[utoipa::path(get, path = "/workflows/{process_id}", responses((status = 200, body = Workflow)))]
pub(crate) async fn get_workflow(
    State(state): State<AppState>,
    Path(process_id): Path<i64>,
) -> Result<Json<Workflow>, ApiError> {
    let row = state
        .db
        .get_workflow(process_id)
        .await?
        .ok_or(ApiError::NotFound {
            entity: "workflow",
            key: process_id.to_string(),
        })?;
    Ok(Json(to_contract(row)))
}

#[utoipa::path(put, path = "/workflows/{process_id}", request_body = UpdateWorkflow, responses((status = 200, body = Workflow)))]
pub(crate) async fn update_workflow(
    State(state): State<AppState>,
    Path(process_id): Path<i64>,
    Json(input): Json<UpdateWorkflow>,
) -> Result<Json<Workflow>, ApiError> {
    let row = state
        .db
        .update_workflow(
            process_id,
            UpdateWorkflowRow {
                process_name: input.process_name,
                description: input.description,
                structure: input.structure,
            },
        )
        .await?
        .ok_or(ApiError::NotFound {
            entity: "workflow",
            key: process_id.to_string(),
        })?;
    Ok(Json(to_contract(row)))
}

async fn delete_workflow(
    State(state): State<AppState>,
    Path(process_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let deleted = state.db.delete_workflow(process_id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound {
            entity: "workflow",
            key: process_id.to_string(),
        })
    }
}

/// Loads the node type catalog into a `shape_name -> behavior` map, the
/// shape every engine-facing handler needs.
async fn load_behaviors(state: &AppState) -> Result<HashMap<String, NodeBehavior>, ApiError> {
    let node_types = state.db.list_node_types().await?;
    node_types
        .into_iter()
        .map(|nt| {
            nt.behavior
                .parse::<NodeBehavior>()
                .map(|b| (nt.shape_name, b))
                .map_err(ApiError::Validation)
        })
        .collect()
}

/// Structural validation shared by the by-id and raw-structure endpoints:
/// a reachable Start event, every edge's endpoints known, every node's type
/// in the catalog.
fn validate_structure_report(structure: &ProcessStructure, behaviors: &HashMap<String, NodeBehavior>) -> ValidationReport {
    let mut errors = Vec::new();

    if GraphIndex::build(structure).find_start(behaviors).is_none() {
        errors.push("workflow has no Start node".to_string());
    }

    let known_ids: std::collections::HashSet<_> = structure.nodes.iter().map(|n| n.id.as_str()).collect();
    for edge in &structure.edges {
        if !known_ids.contains(edge.source.as_str()) {
            errors.push(format!("edge references unknown source node '{}'", edge.source));
        }
        if !known_ids.contains(edge.target.as_str()) {
            errors.push(format!("edge references unknown target node '{}'", edge.target));
        }
    }

    for node in &structure.nodes {
        if !behaviors.contains_key(&node.data.node_type) {
            errors.push(format!(
                "node '{}' references unknown node type '{}'",
                node.id, node.data.node_type
            ));
        }
    }

    ValidationReport {
        valid: errors.is_empty(),
        errors,
    }
}

#[utoipa::path(post, path = "/workflows/{process_id}/validate", responses((status = 200, body = ValidationReport)))]
pub(crate) async fn validate_workflow(
    State(state): State<AppState>,
    Path(process_id): Path<i64>,
) -> Result<Json<ValidationReport>, ApiError> {
    let row = state
        .db
        .get_workflow(process_id)
        .await?
        .ok_or(ApiError::NotFound {
            entity: "workflow",
            key: process_id.to_string(),
        })?;
    let behaviors = load_behaviors(&state).await?;
    Ok(Json(validate_structure_report(&row.structure, &behaviors)))
}

#[utoipa::path(post, path = "/workflow/validate", request_body = ValidateStructureRequest, responses((status = 200, body = ValidationReport)))]
pub(crate) async fn validate_structure(
    State(state): State<AppState>,
    Json(input): Json<ValidateStructureRequest>,
) -> Result<Json<ValidationReport>, ApiError> {
    let behaviors = load_behaviors(&state).await?;
    Ok(Json(validate_structure_report(&input.process_structure, &behaviors)))
}

/// Required-parameter analysis shared by the by-id and raw-structure
/// endpoints: builds each referenced task's signature (catalog-declared
/// parameters, falling back to introspection) and runs the analyzer.
async fn required_params_report(
    state: &AppState,
    structure: &ProcessStructure,
    behaviors: &HashMap<String, NodeBehavior>,
) -> Result<RequiredParamsReport, ApiError> {
    let task_names: Vec<String> = structure
        .nodes
        .iter()
        .filter(|n| behaviors.get(&n.data.node_type) == Some(&NodeBehavior::Task))
        .filter_map(|n| n.data.step_function.clone())
        .collect();

    let declared_params = state.db.list_task_parameters_for(&task_names).await?;
    let mut declared_by_task: HashMap<String, Vec<String>> = HashMap::new();
    for param in declared_params {
        if param.required {
            declared_by_task
                .entry(param.task_name)
                .or_default()
                .push(param.parameter_name);
        }
    }

    let tasks = state.db.get_tasks_by_names(&task_names).await?;
    let mut signatures = HashMap::new();
    for task in &tasks {
        let required_inputs = declared_by_task
            .get(&task.task_name)
            .cloned()
            .unwrap_or_else(|| introspect::introspect_inputs(&task.target));
        let outputs = introspect::introspect_outputs(&task.target);
        signatures.insert(
            task.task_name.clone(),
            TaskSignature {
                required_inputs,
                outputs,
            },
        );
    }

    Ok(analyzer::analyze_required_params(structure, behaviors, &signatures))
}

#[utoipa::path(get, path = "/workflows/{process_id}/required_params", responses((status = 200, body = RequiredParamsReport)))]
pub(crate) async fn required_params(
    State(state): State<AppState>,
    Path(process_id): Path<i64>,
) -> Result<Json<RequiredParamsReport>, ApiError> {
    let row = state
        .db
        .get_workflow(process_id)
        .await?
        .ok_or(ApiError::NotFound {
            entity: "workflow",
            key: process_id.to_string(),
        })?;
    let behaviors = load_behaviors(&state).await?;
    let report = required_params_report(&state, &row.structure, &behaviors).await?;
    Ok(Json(report))
}

#[utoipa::path(post, path = "/workflow/required_params", request_body = ProcessStructure, responses((status = 200, body = RequiredParamsReport)))]
pub(crate) async fn required_params_for_structure(
    State(state): State<AppState>,
    Json(structure): Json<ProcessStructure>,
) -> Result<Json<RequiredParamsReport>, ApiError> {
    let behaviors = load_behaviors(&state).await?;
    let report = required_params_report(&state, &structure, &behaviors).await?;
    Ok(Json(report))
}

#[utoipa::path(post, path = "/workflows/{process_id}/run", request_body = StartExecution, responses((status = 202, body = Uuid)))]
pub(crate) async fn run_workflow(
    State(state): State<AppState>,
    Path(process_id): Path<i64>,
    Json(input): Json<StartExecution>,
) -> Result<(StatusCode, Json<Uuid>), ApiError> {
    let workflow = state
        .db
        .get_workflow(process_id)
        .await?
        .ok_or(ApiError::NotFound {
            entity: "workflow",
            key: process_id.to_string(),
        })?;
    if workflow.cancelled {
        return Err(ApiError::Validation(format!(
            "workflow '{process_id}' is cancelled"
        )));
    }

    let behaviors = load_behaviors(&state).await?;
    let tasks = load_tasks_for_structure(&state, &workflow.structure, &behaviors).await?;

    let execution = state
        .db
        .create_execution(CreateExecutionRow {
            process_id: Some(process_id),
            context: input.inputs.clone(),
        })
        .await?;
    let execution_id = execution.execution_id;

    let db = state.db.clone();
    let registry = state.registry.clone();
    tokio::spawn(async move {
        run_in_background(db, registry, execution_id, workflow.structure, behaviors, tasks, input.inputs).await;
    });

    Ok((StatusCode::ACCEPTED, Json(execution_id)))
}

#[utoipa::path(post, path = "/workflow/run_dynamic", request_body = RunDynamicRequest, responses((status = 202, body = Uuid)))]
pub(crate) async fn run_dynamic(
    State(state): State<AppState>,
    Json(input): Json<RunDynamicRequest>,
) -> Result<(StatusCode, Json<Uuid>), ApiError> {
    let behaviors = load_behaviors(&state).await?;
    let tasks = load_tasks_for_structure(&state, &input.process_structure, &behaviors).await?;

    let execution = state
        .db
        .create_execution(CreateExecutionRow {
            process_id: None,
            context: input.context.clone(),
        })
        .await?;
    let execution_id = execution.execution_id;

    let db = state.db.clone();
    let registry = state.registry.clone();
    tokio::spawn(async move {
        run_in_background(db, registry, execution_id, input.process_structure, behaviors, tasks, input.context).await;
    });

    Ok((StatusCode::ACCEPTED, Json(execution_id)))
}

/// Loads the Task catalog rows referenced by a structure's TASK nodes,
/// keyed by `task_name`, for handing to the engine.
async fn load_tasks_for_structure(
    state: &AppState,
    structure: &ProcessStructure,
    behaviors: &HashMap<String, NodeBehavior>,
) -> Result<HashMap<String, workflow_contracts::Task>, ApiError> {
    let task_names: Vec<String> = structure
        .nodes
        .iter()
        .filter(|n| behaviors.get(&n.data.node_type) == Some(&NodeBehavior::Task))
        .filter_map(|n| n.data.step_function.clone())
        .collect();

    let tasks = state
        .db
        .get_tasks_by_names(&task_names)
        .await?
        .into_iter()
        .map(|row| {
            (
                row.task_name.clone(),
                workflow_contracts::Task {
                    task_name: row.task_name,
                    description: row.description,
                    executor: row.executor.parse().unwrap_or(workflow_contracts::ExecutorKind::Bash),
                    target: row.target,
                    cancelled: row.cancelled,
                },
            )
        })
        .collect();

    Ok(tasks)
}

#[tracing::instrument(skip_all, fields(execution_id = %execution_id))]
async fn run_in_background(
    db: workflow_storage::Database,
    registry: Arc<workflow_engine::ExecutorRegistry>,
    execution_id: Uuid,
    structure: workflow_contracts::ProcessStructure,
    behaviors: HashMap<String, NodeBehavior>,
    tasks: HashMap<String, workflow_contracts::Task>,
    initial_context: Value,
) {
    let engine = WorkflowEngine::new(EngineConfig::default());
    let sequence = std::sync::atomic::AtomicI32::new(0);
    let running_steps: std::sync::Mutex<HashMap<String, Uuid>> = std::sync::Mutex::new(HashMap::new());

    let outcome = engine
        .run(&structure, &behaviors, &tasks, &registry, initial_context, |step| {
            let db = db.clone();
            let sequence = &sequence;
            let running_steps = &running_steps;
            async move {
                if let Err(e) = persist_step(&db, execution_id, sequence, running_steps, step).await {
                    tracing::error!(error = %e, "failed to persist execution step");
                }
            }
        })
        .await;

    let update = match outcome {
        Ok(RunOutcome::Completed { context }) => UpdateExecutionRow {
            status: Some("COMPLETED".to_string()),
            context: Some(context),
            finished_at: Some(chrono::Utc::now()),
            error: None,
        },
        Ok(RunOutcome::Failed { context, error }) => UpdateExecutionRow {
            status: Some("FAILED".to_string()),
            context: Some(context),
            finished_at: Some(chrono::Utc::now()),
            error: Some(error),
        },
        Err(e) => UpdateExecutionRow {
            status: Some("FAILED".to_string()),
            context: None,
            finished_at: Some(chrono::Utc::now()),
            error: Some(e.to_string()),
        },
    };

    if let Err(e) = db.update_execution(execution_id, update).await {
        tracing::error!(error = %e, "failed to finalize execution");
    }
}

/// Persists one `on_step` callback. A `RUNNING` call inserts the Step row
/// (before the node is dispatched) and remembers its id; the paired
/// terminal call looks that id back up and finalizes it — so the
/// Execution can never be marked done ahead of its last step write.
async fn persist_step(
    db: &workflow_storage::Database,
    execution_id: Uuid,
    sequence: &std::sync::atomic::AtomicI32,
    running_steps: &std::sync::Mutex<HashMap<String, Uuid>>,
    step: StepOutcome,
) -> Result<(), workflow_storage::StoreError> {
    use std::sync::atomic::Ordering;
    use workflow_contracts::StepStatus;

    if step.status == StepStatus::Running {
        let seq = sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let row = db
            .create_execution_step(CreateExecutionStepRow {
                execution_id,
                node_id: step.node_id.clone(),
                task_name: step.task_name,
                sequence: seq,
                input: step.input,
            })
            .await?;
        running_steps.lock().unwrap().insert(step.node_id, row.step_id);
        return Ok(());
    }

    let step_id = running_steps.lock().unwrap().remove(&step.node_id);
    let Some(step_id) = step_id else {
        return Ok(());
    };

    db.update_execution_step(
        step_id,
        UpdateExecutionStepRow {
            status: Some(step.status.to_string()),
            output: Some(step.output),
            error: step.error,
            finished_at: Some(chrono::Utc::now()),
        },
    )
    .await?;

    Ok(())
}
