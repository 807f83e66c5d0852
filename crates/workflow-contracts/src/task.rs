//! Task catalog: executable tasks, their declared parameters, and the
//! execution methods available to invoke them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ExecutorKind {
    Python,
    Bash,
    StoredProcedure,
    StoredFunction,
    Http,
}

impl fmt::Display for ExecutorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExecutorKind::Python => "python",
            ExecutorKind::Bash => "bash",
            ExecutorKind::StoredProcedure => "stored_procedure",
            ExecutorKind::StoredFunction => "stored_function",
            ExecutorKind::Http => "http",
        };
        f.write_str(s)
    }
}

impl FromStr for ExecutorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "python" => Ok(ExecutorKind::Python),
            "bash" => Ok(ExecutorKind::Bash),
            "stored_procedure" => Ok(ExecutorKind::StoredProcedure),
            "stored_function" => Ok(ExecutorKind::StoredFunction),
            "http" => Ok(ExecutorKind::Http),
            other => Err(format!("unknown executor kind: {other}")),
        }
    }
}

/// An executable unit referenced by one or more workflow nodes.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub task_name: String,
    pub description: Option<String>,
    pub executor: ExecutorKind,
    /// Script path, stored procedure name, or URL, depending on `executor`.
    pub target: String,
    pub cancelled: bool,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateTask {
    pub task_name: String,
    pub description: Option<String>,
    pub executor: ExecutorKind,
    pub target: String,
}

/// A single declared parameter of a [`Task`], in display order.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskParameter {
    pub task_name: String,
    pub parameter_name: String,
    pub required: bool,
    pub default_value: Option<serde_json::Value>,
    pub position: i32,
}

/// A named way to invoke a task's executor, e.g. "Local Python 3.11" or
/// "Primary Postgres". Uniqueness is on `internal_execution_method`.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutionMethod {
    pub name: String,
    pub internal_execution_method: String,
    pub description: Option<String>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateExecutionMethod {
    pub name: String,
    pub internal_execution_method: String,
    pub description: Option<String>,
}
