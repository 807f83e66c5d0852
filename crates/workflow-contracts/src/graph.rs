//! The process structure: nodes and edges that make up a workflow graph.

use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ProcessStructure {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub id: String,
    #[serde(default)]
    pub data: NodeData,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct NodeData {
    /// A `shape_name` referencing the Node Type catalog.
    #[serde(rename = "type", default)]
    pub node_type: String,
    /// The `task_name` this node invokes, when `node_type`'s behavior is TASK.
    #[serde(default)]
    pub step_function: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    /// Attributes pre-bound at design time, merged into the running context
    /// before the step executes.
    #[serde(default)]
    pub attributes: Vec<NodeAttribute>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeAttribute {
    pub attribute_name: String,
    #[serde(default)]
    pub attribute_value: serde_json::Value,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Edge {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub data: EdgeData,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct EdgeData {
    #[serde(default)]
    pub condition: Option<EdgeCondition>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EdgeCondition {
    pub field: String,
    pub operator: String,
    #[serde(default)]
    pub value: serde_json::Value,
    #[serde(default)]
    pub is_default: bool,
}

impl Node {
    pub fn label(&self) -> &str {
        self.data.label.as_deref().unwrap_or(&self.id)
    }
}
