//! The node type catalog ("shapes") used by the graph editor and the engine
//! to decide how a node behaves during traversal.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A node's runtime role. `EVENT` covers both the Start and Stop of a
/// workflow — which one a given node is gets decided by its id/label, not
/// by a separate enum variant.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NodeBehavior {
    Event,
    Gateway,
    Task,
}

impl fmt::Display for NodeBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeBehavior::Event => "EVENT",
            NodeBehavior::Gateway => "GATEWAY",
            NodeBehavior::Task => "TASK",
        };
        f.write_str(s)
    }
}

impl FromStr for NodeBehavior {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "EVENT" => Ok(NodeBehavior::Event),
            "GATEWAY" => Ok(NodeBehavior::Gateway),
            "TASK" => Ok(NodeBehavior::Task),
            other => Err(format!("unknown node behavior: {other}")),
        }
    }
}

/// A named shape in the node palette, e.g. "Start", "Decision", "Python Task".
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeType {
    pub shape_name: String,
    pub behavior: NodeBehavior,
    /// Label shown in the graph editor's palette, e.g. "Start Event".
    pub display_name: Option<String>,
    /// Whether a node of this type must carry a `step_function`. Only
    /// meaningful for `TASK`; an EVENT/GATEWAY node never needs one.
    pub requires_step_function: bool,
    pub description: Option<String>,
    pub icon: Option<String>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateNodeType {
    pub shape_name: String,
    pub behavior: NodeBehavior,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub requires_step_function: bool,
    pub description: Option<String>,
    pub icon: Option<String>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct UpdateNodeType {
    pub shape_name: Option<String>,
    pub behavior: Option<NodeBehavior>,
    pub display_name: Option<String>,
    pub requires_step_function: Option<bool>,
    pub description: Option<String>,
    pub icon: Option<String>,
}
