//! C5 Workflow Engine: walks a [`ProcessStructure`] node by node, executing
//! TASK nodes through the executor registry and branching at GATEWAY nodes
//! via a small, safe comparison language. This is a direct traversal, not a
//! replay engine — a run either completes in one pass or fails outright.

use std::collections::HashMap;

use serde_json::Value;
use workflow_contracts::{Edge, EdgeCondition, Node, NodeBehavior, ProcessStructure, StepStatus, Task};

use crate::error::{EngineError, EngineResult};
use crate::executor::{ExecutorOutcome, ExecutorRegistry};

/// Indexes a [`ProcessStructure`] for O(1) node lookup and O(1) outgoing-edge
/// lookup, mirroring the adjacency map the original builds once per run.
pub struct GraphIndex<'a> {
    nodes_by_id: HashMap<&'a str, &'a Node>,
    edges_by_source: HashMap<&'a str, Vec<&'a Edge>>,
}

impl<'a> GraphIndex<'a> {
    pub fn build(structure: &'a ProcessStructure) -> Self {
        let nodes_by_id = structure.nodes.iter().map(|n| (n.id.as_str(), n)).collect();

        let mut edges_by_source: HashMap<&str, Vec<&Edge>> = HashMap::new();
        for edge in &structure.edges {
            edges_by_source
                .entry(edge.source.as_str())
                .or_default()
                .push(edge);
        }

        Self {
            nodes_by_id,
            edges_by_source,
        }
    }

    pub fn node(&self, id: &str) -> Option<&'a Node> {
        self.nodes_by_id.get(id).copied()
    }

    pub fn outgoing(&self, id: &str) -> &[&'a Edge] {
        self.edges_by_source.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The unique EVENT node whose id/label reads "Start" (case-insensitive).
    pub fn find_start(&self, behaviors: &HashMap<String, NodeBehavior>) -> Option<&'a Node> {
        self.nodes_by_id
            .values()
            .copied()
            .find(|n| behaviors.get(&n.data.node_type) == Some(&NodeBehavior::Event) && is_start_event(n))
    }
}

/// An EVENT node is the Start event when its id or label reads "Start",
/// case-insensitively — EVENT has no separate Start/Stop variant, so the
/// two are told apart by name alone.
fn is_start_event(node: &Node) -> bool {
    node.id.eq_ignore_ascii_case("start") || node.label().eq_ignore_ascii_case("start")
}

/// An EVENT node is the Stop event when its id or label reads "Stop".
fn is_stop_event(node: &Node) -> bool {
    node.id.eq_ignore_ascii_case("stop") || node.label().eq_ignore_ascii_case("stop")
}

/// Evaluates a single edge condition's operator against the running context.
/// Unknown fields and type mismatches resolve to `false` rather than erroring
/// — an unsatisfiable branch is a modeling mistake, not a crash.
pub fn evaluate_condition(context: &Value, condition: &EdgeCondition) -> bool {
    let field_value = context.get(&condition.field);

    match condition.operator.as_str() {
        "is_empty" => field_value.map(is_empty_value).unwrap_or(true),
        "is_not_empty" => field_value.map(|v| !is_empty_value(v)).unwrap_or(false),
        "==" => field_value.map(|v| v == &condition.value).unwrap_or(false),
        "!=" => field_value.map(|v| v != &condition.value).unwrap_or(true),
        "contains" => match (field_value, &condition.value) {
            (Some(Value::String(s)), Value::String(needle)) => s.contains(needle.as_str()),
            (Some(Value::Array(items)), needle) => items.contains(needle),
            _ => false,
        },
        "not_contains" => match (field_value, &condition.value) {
            (Some(Value::String(s)), Value::String(needle)) => !s.contains(needle.as_str()),
            (Some(Value::Array(items)), needle) => !items.contains(needle),
            _ => true,
        },
        ">" | ">=" | "<" | "<=" => compare_numeric(field_value, &condition.value, &condition.operator),
        _ => false,
    }
}

fn is_empty_value(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

fn compare_numeric(field_value: Option<&Value>, target: &Value, operator: &str) -> bool {
    let (Some(a), Some(b)) = (field_value.and_then(Value::as_f64), target.as_f64()) else {
        return false;
    };
    match operator {
        ">" => a > b,
        ">=" => a >= b,
        "<" => a < b,
        "<=" => a <= b,
        _ => false,
    }
}

/// Picks the outgoing edge to follow from a GATEWAY node: the first whose
/// condition matches, falling back to the edge marked `is_default`, falling
/// back to the first outgoing edge if none is marked.
pub fn evaluate_decision<'a>(edges: &[&'a Edge], context: &Value) -> Option<&'a Edge> {
    for edge in edges {
        if let Some(condition) = &edge.data.condition {
            if !condition.is_default && evaluate_condition(context, condition) {
                return Some(edge);
            }
        }
    }

    edges
        .iter()
        .find(|e| e.data.condition.as_ref().is_some_and(|c| c.is_default))
        .or_else(|| edges.first())
        .copied()
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub max_steps: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { max_steps: 10_000 }
    }
}

/// One step the engine took, reported to the caller so it can be persisted
/// as an `ExecutionStep` and surfaced over the execution stream.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub node_id: String,
    pub task_name: Option<String>,
    pub status: StepStatus,
    pub input: Value,
    pub output: Value,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub enum RunOutcome {
    Completed { context: Value },
    Failed { context: Value, error: String },
}

pub struct WorkflowEngine {
    config: EngineConfig,
}

impl WorkflowEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Runs a workflow to completion (or failure). `on_step` is called twice
    /// per node visited — once with `RUNNING` before the node is dispatched,
    /// once with its terminal status after — and is awaited in place both
    /// times, so a caller persisting history observes a RUNNING row before
    /// dispatch and never finalizes the Execution ahead of the last step.
    #[tracing::instrument(skip_all)]
    pub async fn run<F, Fut>(
        &self,
        structure: &ProcessStructure,
        behaviors: &HashMap<String, NodeBehavior>,
        tasks: &HashMap<String, Task>,
        registry: &ExecutorRegistry,
        initial_context: Value,
        mut on_step: F,
    ) -> EngineResult<RunOutcome>
    where
        F: FnMut(StepOutcome) -> Fut,
        Fut: std::future::Future<Output = ()>,
    {
        let index = GraphIndex::build(structure);
        let start = index.find_start(behaviors).ok_or(EngineError::NoStartNode)?;

        let mut context = initial_context;
        let mut current = vec![start.id.clone()];
        let mut steps_taken = 0usize;

        while let Some(node_id) = current.pop() {
            steps_taken += 1;
            if steps_taken > self.config.max_steps {
                return Err(EngineError::StepLimitExceeded(self.config.max_steps));
            }

            let node = index
                .node(&node_id)
                .ok_or_else(|| EngineError::UnknownNode(node_id.clone()))?;
            let behavior = behaviors
                .get(&node.data.node_type)
                .copied()
                .ok_or_else(|| EngineError::UnknownNodeType(node.data.node_type.clone()))?;

            let task_name = if behavior == NodeBehavior::Task {
                node.data.step_function.clone()
            } else {
                None
            };
            let step_input = if behavior == NodeBehavior::Task {
                merge_attributes(&context, node)
            } else {
                context.clone()
            };

            on_step(StepOutcome {
                node_id: node_id.clone(),
                task_name: task_name.clone(),
                status: StepStatus::Running,
                input: step_input.clone(),
                output: Value::Null,
                error: None,
            })
            .await;

            match behavior {
                NodeBehavior::Event => {
                    let stop = is_stop_event(node);
                    on_step(StepOutcome {
                        node_id: node_id.clone(),
                        task_name: None,
                        status: StepStatus::Passed,
                        input: step_input,
                        output: Value::Null,
                        error: None,
                    })
                    .await;

                    if stop {
                        return Ok(RunOutcome::Completed { context });
                    }
                    for edge in index.outgoing(&node_id) {
                        current.push(edge.target.clone());
                    }
                }
                NodeBehavior::Gateway => {
                    let edges = index.outgoing(&node_id);
                    if edges.is_empty() {
                        let error = format!("gateway node '{node_id}' has no outgoing edges");
                        on_step(StepOutcome {
                            node_id: node_id.clone(),
                            task_name: None,
                            status: StepStatus::Failed,
                            input: step_input,
                            output: Value::Null,
                            error: Some(error.clone()),
                        })
                        .await;
                        return Ok(RunOutcome::Failed { context, error });
                    }

                    on_step(StepOutcome {
                        node_id: node_id.clone(),
                        task_name: None,
                        status: StepStatus::Passed,
                        input: step_input,
                        output: Value::Null,
                        error: None,
                    })
                    .await;

                    match evaluate_decision(edges, &context) {
                        Some(edge) => current.push(edge.target.clone()),
                        None => return Ok(RunOutcome::Completed { context }),
                    }
                }
                NodeBehavior::Task => match &task_name {
                    None => {
                        on_step(StepOutcome {
                            node_id: node_id.clone(),
                            task_name: None,
                            status: StepStatus::Skipped,
                            input: step_input,
                            output: Value::Null,
                            error: None,
                        })
                        .await;
                        for edge in index.outgoing(&node_id) {
                            current.push(edge.target.clone());
                        }
                    }
                    Some(task_name) => {
                        let outcome = self.execute_task(tasks, registry, task_name, &step_input).await;

                        if let Some(result) = &outcome.result {
                            merge_object(&mut context, result);
                        }

                        let status = if outcome.error.is_some() {
                            StepStatus::Failed
                        } else {
                            StepStatus::Completed
                        };
                        on_step(StepOutcome {
                            node_id: node_id.clone(),
                            task_name: Some(task_name.clone()),
                            status,
                            input: step_input,
                            output: outcome.result.clone().unwrap_or(Value::Null),
                            error: outcome.error.clone(),
                        })
                        .await;

                        if let Some(error) = outcome.error {
                            return Ok(RunOutcome::Failed { context, error });
                        }
                        for edge in index.outgoing(&node_id) {
                            current.push(edge.target.clone());
                        }
                    }
                },
            }
        }

        Ok(RunOutcome::Completed { context })
    }

    async fn execute_task(
        &self,
        tasks: &HashMap<String, Task>,
        registry: &ExecutorRegistry,
        task_name: &str,
        context: &Value,
    ) -> ExecutorOutcome {
        let Some(task) = tasks.get(task_name) else {
            return ExecutorOutcome::failed(format!("task '{task_name}' not found in catalog"));
        };
        if task.cancelled {
            return ExecutorOutcome::failed(format!("task '{task_name}' is cancelled"));
        }

        match registry.get(&task.executor.to_string()) {
            Some(executor) => executor.invoke(&task.target, context).await,
            None => ExecutorOutcome::failed(format!("no executor registered for '{}'", task.executor)),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use workflow_contracts::{EdgeData, ExecutorKind, NodeData};

    use super::*;

    fn node(id: &str, node_type: &str) -> Node {
        Node {
            id: id.to_string(),
            data: NodeData {
                node_type: node_type.to_string(),
                ..Default::default()
            },
        }
    }

    fn event_node(id: &str, label: &str) -> Node {
        let mut n = node(id, "Event");
        n.data.label = Some(label.to_string());
        n
    }

    fn edge(source: &str, target: &str, condition: Option<EdgeCondition>) -> Edge {
        Edge {
            source: source.to_string(),
            target: target.to_string(),
            data: EdgeData { condition },
        }
    }

    fn behaviors() -> HashMap<String, NodeBehavior> {
        HashMap::from([
            ("Event".to_string(), NodeBehavior::Event),
            ("Task".to_string(), NodeBehavior::Task),
            ("Gateway".to_string(), NodeBehavior::Gateway),
        ])
    }

    #[test]
    fn decision_picks_first_matching_non_default_edge() {
        let high = edge(
            "gw",
            "high_branch",
            Some(EdgeCondition {
                field: "score".to_string(),
                operator: ">=".to_string(),
                value: json!(50),
                is_default: false,
            }),
        );
        let fallback = edge(
            "gw",
            "low_branch",
            Some(EdgeCondition {
                field: "score".to_string(),
                operator: "==".to_string(),
                value: json!(0),
                is_default: true,
            }),
        );
        let edges = [&high, &fallback];

        let chosen = evaluate_decision(&edges, &json!({"score": 75})).unwrap();
        assert_eq!(chosen.target, "high_branch");
    }

    #[test]
    fn decision_falls_back_to_default_edge_when_nothing_matches() {
        let high = edge(
            "gw",
            "high_branch",
            Some(EdgeCondition {
                field: "score".to_string(),
                operator: ">=".to_string(),
                value: json!(50),
                is_default: false,
            }),
        );
        let fallback = edge(
            "gw",
            "low_branch",
            Some(EdgeCondition {
                field: "score".to_string(),
                operator: "==".to_string(),
                value: json!(0),
                is_default: true,
            }),
        );
        let edges = [&high, &fallback];

        let chosen = evaluate_decision(&edges, &json!({"score": 10})).unwrap();
        assert_eq!(chosen.target, "low_branch");
    }

    #[tokio::test]
    async fn traversal_runs_start_task_gateway_stop() {
        let structure = ProcessStructure {
            nodes: vec![
                event_node("start", "Start"),
                {
                    let mut n = node("greet", "Task");
                    n.data.step_function = Some("greet_task".to_string());
                    n
                },
                node("gw", "Gateway"),
                event_node("stop_yes", "Stop"),
                event_node("stop_no", "Stop"),
            ],
            edges: vec![
                edge("start", "greet", None),
                edge("greet", "gw", None),
                edge(
                    "gw",
                    "stop_yes",
                    Some(EdgeCondition {
                        field: "greeted".to_string(),
                        operator: "==".to_string(),
                        value: json!(true),
                        is_default: false,
                    }),
                ),
                edge(
                    "gw",
                    "stop_no",
                    Some(EdgeCondition {
                        field: "greeted".to_string(),
                        operator: "==".to_string(),
                        value: json!(false),
                        is_default: true,
                    }),
                ),
            ],
        };

        let mut tasks = HashMap::new();
        tasks.insert(
            "greet_task".to_string(),
            Task {
                task_name: "greet_task".to_string(),
                description: None,
                executor: ExecutorKind::Bash,
                target: "echo '{\"greeted\": true}'".to_string(),
                cancelled: false,
            },
        );

        let registry = ExecutorRegistry::with_defaults();
        let engine = WorkflowEngine::new(EngineConfig::default());
        let steps = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));

        let outcome = engine
            .run(&structure, &behaviors(), &tasks, &registry, json!({}), |step| {
                let steps = steps.clone();
                async move {
                    steps.lock().unwrap().push(step);
                }
            })
            .await
            .unwrap();

        // Start, Task (greet), Gateway, Stop — one RUNNING + one terminal
        // record apiece, so 4 nodes visited means 8 callback invocations.
        let recorded = steps.lock().unwrap();
        assert_eq!(recorded.len(), 8);
        assert_eq!(
            recorded.iter().filter(|s| s.node_id == "start").count(),
            2
        );
        assert_eq!(
            recorded.iter().filter(|s| s.node_id == "stop_yes").count(),
            2
        );
        assert!(matches!(outcome, RunOutcome::Completed { context } if context["greeted"] == json!(true)));
    }

    #[tokio::test]
    async fn traversal_fails_when_a_task_errors() {
        let structure = ProcessStructure {
            nodes: vec![
                event_node("start", "Start"),
                {
                    let mut n = node("bad", "Task");
                    n.data.step_function = Some("bad_task".to_string());
                    n
                },
            ],
            edges: vec![edge("start", "bad", None)],
        };

        let mut tasks = HashMap::new();
        tasks.insert(
            "bad_task".to_string(),
            Task {
                task_name: "bad_task".to_string(),
                description: None,
                executor: ExecutorKind::Bash,
                target: "exit 1".to_string(),
                cancelled: false,
            },
        );

        let registry = ExecutorRegistry::with_defaults();
        let engine = WorkflowEngine::new(EngineConfig::default());

        let outcome = engine
            .run(&structure, &behaviors(), &tasks, &registry, json!({}), |_| async {})
            .await
            .unwrap();

        assert!(matches!(outcome, RunOutcome::Failed { .. }));
    }

    #[tokio::test]
    async fn traversal_rejects_a_graph_with_no_start_node() {
        let structure = ProcessStructure {
            nodes: vec![node("only", "Task")],
            edges: vec![],
        };
        let registry = ExecutorRegistry::with_defaults();
        let engine = WorkflowEngine::new(EngineConfig::default());

        let result = engine
            .run(&structure, &behaviors(), &HashMap::new(), &registry, json!({}), |_| async {})
            .await;

        assert!(matches!(result, Err(EngineError::NoStartNode)));
    }
}

fn merge_attributes(context: &Value, node: &Node) -> Value {
    let mut merged = context.clone();
    for attribute in &node.data.attributes {
        merge_key(&mut merged, &attribute.attribute_name, attribute.attribute_value.clone());
    }
    merged
}

fn merge_object(context: &mut Value, updates: &Value) {
    if let Value::Object(map) = updates {
        for (key, value) in map {
            merge_key(context, key, value.clone());
        }
    }
}

fn merge_key(context: &mut Value, key: &str, value: Value) {
    if !context.is_object() {
        *context = Value::Object(Default::default());
    }
    if let Value::Object(map) = context {
        map.insert(key.to_string(), value);
    }
}
