//! Shared type contracts for the workflow orchestrator: the process graph,
//! the task catalog, schedules, and executions. Every crate in the
//! workspace depends on this one; it depends on nothing in the workspace.

pub mod error;
pub mod execution;
pub mod graph;
pub mod node_type;
pub mod schedule;
pub mod task;
pub mod workflow;

pub use error::ContractError;
pub use execution::{
    Execution, ExecutionStatus, ExecutionStep, RunDynamicRequest, StartExecution, StepStatus,
};
pub use graph::{Edge, EdgeCondition, EdgeData, Node, NodeAttribute, NodeData, ProcessStructure};
pub use node_type::{CreateNodeType, NodeBehavior, NodeType, UpdateNodeType};
pub use schedule::{
    CreateSchedule, FrequencyUnit, Schedule, ScheduleDetail, SchedulePage, ScheduleType,
    UpdateSchedule,
};
pub use task::{CreateExecutionMethod, CreateTask, ExecutionMethod, ExecutorKind, Task, TaskParameter};
pub use workflow::{
    CreateWorkflow, RequiredParam, RequiredParamsReport, UpdateWorkflow, ValidateStructureRequest,
    ValidationReport, Workflow,
};
