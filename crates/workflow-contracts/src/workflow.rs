//! The workflow (process) definition itself: a named, versioned graph.

use serde::{Deserialize, Serialize};

use crate::graph::ProcessStructure;

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Workflow {
    pub process_id: i64,
    pub process_name: String,
    pub description: Option<String>,
    pub structure: ProcessStructure,
    pub cancelled: bool,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateWorkflow {
    pub process_name: String,
    pub description: Option<String>,
    pub structure: ProcessStructure,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct UpdateWorkflow {
    pub process_name: Option<String>,
    pub description: Option<String>,
    pub structure: Option<ProcessStructure>,
}

/// Result of [`crate::workflow::Workflow`] structural validation.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// One unsatisfied input a workflow needs supplied at run time: the
/// parameter name and the first task in the graph that requires it,
/// returned by the required-parameter analyzer.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RequiredParam {
    pub name: String,
    pub source_task: String,
    pub label: Option<String>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RequiredParamsReport {
    pub workflow_inputs: Vec<RequiredParam>,
    pub has_required_inputs: bool,
    pub total_inputs: usize,
}

/// Body for validating a graph that hasn't been (or won't be) persisted.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidateStructureRequest {
    pub process_structure: ProcessStructure,
}
