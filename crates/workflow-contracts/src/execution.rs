//! A single run of a workflow, and the steps it passed through.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExecutionStatus {
    Running,
    Completed,
    Failed,
    TimedOut,
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExecutionStatus::Running => "RUNNING",
            ExecutionStatus::Completed => "COMPLETED",
            ExecutionStatus::Failed => "FAILED",
            ExecutionStatus::TimedOut => "TIMED_OUT",
        };
        f.write_str(s)
    }
}

impl FromStr for ExecutionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "RUNNING" => Ok(ExecutionStatus::Running),
            "COMPLETED" => Ok(ExecutionStatus::Completed),
            "FAILED" => Ok(ExecutionStatus::Failed),
            "TIMED_OUT" => Ok(ExecutionStatus::TimedOut),
            other => Err(format!("unknown execution status: {other}")),
        }
    }
}

impl ExecutionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ExecutionStatus::Running)
    }
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StepStatus {
    Running,
    Completed,
    Failed,
    /// Terminal status for an EVENT or GATEWAY node: it doesn't invoke an
    /// executor, so it never "completes" a task, it just passes through.
    Passed,
    /// Terminal status for a TASK node with no `step_function` declared.
    Skipped,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepStatus::Running => "RUNNING",
            StepStatus::Completed => "COMPLETED",
            StepStatus::Failed => "FAILED",
            StepStatus::Passed => "PASSED",
            StepStatus::Skipped => "SKIPPED",
        };
        f.write_str(s)
    }
}

impl FromStr for StepStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "RUNNING" => Ok(StepStatus::Running),
            "COMPLETED" => Ok(StepStatus::Completed),
            "FAILED" => Ok(StepStatus::Failed),
            "PASSED" => Ok(StepStatus::Passed),
            "SKIPPED" => Ok(StepStatus::Skipped),
            other => Err(format!("unknown step status: {other}")),
        }
    }
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Execution {
    pub execution_id: Uuid,
    /// Absent for an ad-hoc run of a graph that was never persisted as a
    /// workflow (`run_dynamic`), or one whose workflow was later deleted.
    pub process_id: Option<i64>,
    pub status: ExecutionStatus,
    pub context: serde_json::Value,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct StartExecution {
    /// Initial inputs merged into the running context before traversal starts.
    #[serde(default)]
    pub inputs: serde_json::Value,
}

/// Body for running an unsaved graph directly, without first creating a
/// [`crate::workflow::Workflow`] row.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunDynamicRequest {
    pub process_structure: crate::graph::ProcessStructure,
    #[serde(default)]
    pub context: serde_json::Value,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutionStep {
    pub step_id: Uuid,
    pub execution_id: Uuid,
    pub node_id: String,
    pub task_name: Option<String>,
    pub status: StepStatus,
    pub sequence: i32,
    pub input: serde_json::Value,
    pub output: serde_json::Value,
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}
