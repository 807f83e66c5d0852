//! OpenAPI schema aggregation, served interactively via Swagger UI.

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::workflows::list_workflows,
        crate::workflows::create_workflow,
        crate::workflows::get_workflow,
        crate::workflows::update_workflow,
        crate::workflows::validate_workflow,
        crate::workflows::required_params,
        crate::workflows::run_workflow,
        crate::workflows::validate_structure,
        crate::workflows::required_params_for_structure,
        crate::workflows::run_dynamic,
        crate::node_types::list_node_types,
        crate::node_types::create_node_type,
        crate::tasks::create_task,
        crate::schedules::create_schedule,
        crate::execution_stream::stream_execution,
        crate::health::health,
    ),
    components(schemas(
        workflow_contracts::Workflow,
        workflow_contracts::CreateWorkflow,
        workflow_contracts::UpdateWorkflow,
        workflow_contracts::ValidationReport,
        workflow_contracts::RequiredParamsReport,
        workflow_contracts::RequiredParam,
        workflow_contracts::StartExecution,
        workflow_contracts::ValidateStructureRequest,
        workflow_contracts::RunDynamicRequest,
        workflow_contracts::ProcessStructure,
        workflow_contracts::Node,
        workflow_contracts::NodeData,
        workflow_contracts::NodeAttribute,
        workflow_contracts::Edge,
        workflow_contracts::EdgeData,
        workflow_contracts::EdgeCondition,
        workflow_contracts::NodeType,
        workflow_contracts::CreateNodeType,
        workflow_contracts::UpdateNodeType,
        workflow_contracts::Task,
        workflow_contracts::CreateTask,
        workflow_contracts::ExecutorKind,
        workflow_contracts::TaskParameter,
        workflow_contracts::Execution,
        workflow_contracts::ExecutionStep,
        workflow_contracts::ExecutionStatus,
        workflow_contracts::StepStatus,
        workflow_contracts::Schedule,
        workflow_contracts::CreateSchedule,
        workflow_contracts::UpdateSchedule,
        workflow_contracts::ScheduleType,
        workflow_contracts::SchedulePage,
    )),
    tags(
        (name = "workflows", description = "Process definition CRUD, validation and execution triggers"),
        (name = "node-types", description = "Node type catalog"),
        (name = "tasks", description = "Task catalog"),
        (name = "schedules", description = "Task scheduling"),
        (name = "executions", description = "Execution history and streaming"),
    )
)]
pub struct ApiDoc;

pub fn router() -> utoipa_swagger_ui::SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}

pub fn merge_into(router: axum::Router<AppState>) -> axum::Router<AppState> {
    router.merge(self::router())
}
