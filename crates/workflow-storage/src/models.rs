// Database row types (internal, distinct from the public `workflow-contracts` DTOs)

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;
use workflow_contracts::ProcessStructure;

// ============================================
// Workflows
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct WorkflowRow {
    pub process_id: i64,
    pub process_name: String,
    pub description: Option<String>,
    #[sqlx(json)]
    pub structure: ProcessStructure,
    pub cancelled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateWorkflowRow {
    pub process_name: String,
    pub description: Option<String>,
    pub structure: ProcessStructure,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateWorkflowRow {
    pub process_name: Option<String>,
    pub description: Option<String>,
    pub structure: Option<ProcessStructure>,
}

// ============================================
// Node types
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct NodeTypeRow {
    pub shape_name: String,
    pub behavior: String,
    pub display_name: Option<String>,
    pub requires_step_function: bool,
    pub description: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateNodeTypeRow {
    pub shape_name: String,
    pub behavior: String,
    pub display_name: Option<String>,
    pub requires_step_function: bool,
    pub description: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateNodeTypeRow {
    pub shape_name: Option<String>,
    pub behavior: Option<String>,
    pub display_name: Option<String>,
    pub requires_step_function: Option<bool>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

// ============================================
// Tasks + parameters + execution methods
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct TaskRow {
    pub task_name: String,
    pub description: Option<String>,
    pub executor: String,
    pub target: String,
    pub cancelled: bool,
}

#[derive(Debug, Clone)]
pub struct CreateTaskRow {
    pub task_name: String,
    pub description: Option<String>,
    pub executor: String,
    pub target: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct TaskParameterRow {
    pub task_name: String,
    pub parameter_name: String,
    pub required: bool,
    pub default_value: Option<serde_json::Value>,
    pub position: i32,
}

#[derive(Debug, Clone)]
pub struct CreateTaskParameterRow {
    pub task_name: String,
    pub parameter_name: String,
    pub required: bool,
    pub default_value: Option<serde_json::Value>,
    pub position: i32,
}

#[derive(Debug, Clone, FromRow)]
pub struct ExecutionMethodRow {
    pub name: String,
    pub internal_execution_method: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateExecutionMethodRow {
    pub name: String,
    pub internal_execution_method: String,
    pub description: Option<String>,
}

// ============================================
// Executions + steps
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct ExecutionRow {
    pub execution_id: Uuid,
    pub process_id: Option<i64>,
    pub status: String,
    pub context: serde_json::Value,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateExecutionRow {
    pub process_id: Option<i64>,
    pub context: serde_json::Value,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateExecutionRow {
    pub status: Option<String>,
    pub context: Option<serde_json::Value>,
    pub finished_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ExecutionStepRow {
    pub step_id: Uuid,
    pub execution_id: Uuid,
    pub node_id: String,
    pub task_name: Option<String>,
    pub status: String,
    pub sequence: i32,
    pub input: serde_json::Value,
    pub output: serde_json::Value,
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct CreateExecutionStepRow {
    pub execution_id: Uuid,
    pub node_id: String,
    pub task_name: Option<String>,
    pub sequence: i32,
    pub input: serde_json::Value,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateExecutionStepRow {
    pub status: Option<String>,
    pub output: Option<serde_json::Value>,
    pub error: Option<String>,
    pub finished_at: Option<DateTime<Utc>>,
}

// ============================================
// Schedules
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct ScheduleRow {
    pub schedule_id: Uuid,
    pub task_name: String,
    pub user_schedule_name: String,
    pub schedule_type: String,
    pub detail: serde_json::Value,
    pub parameters: serde_json::Value,
    pub store_schedule_name: Option<String>,
    pub cancelled: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateScheduleRow {
    pub task_name: String,
    pub user_schedule_name: String,
    pub schedule_type: String,
    pub detail: serde_json::Value,
    pub parameters: serde_json::Value,
    pub store_schedule_name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateScheduleRow {
    pub schedule_type: Option<String>,
    pub detail: Option<serde_json::Value>,
    pub parameters: Option<serde_json::Value>,
    pub store_schedule_name: Option<Option<String>>,
    pub cancelled: Option<bool>,
}
