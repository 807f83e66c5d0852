//! End-to-end traversal scenarios over an in-memory workflow, with no
//! database involved — the engine only needs a `ProcessStructure`, a
//! behavior map, and a task catalog slice.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::json;
use workflow_contracts::{
    Edge, EdgeCondition, EdgeData, ExecutorKind, Node, NodeBehavior, NodeData, ProcessStructure, StepStatus, Task,
};
use workflow_engine::{EngineConfig, EngineError, ExecutorRegistry, RunOutcome, WorkflowEngine};

fn behaviors() -> HashMap<String, NodeBehavior> {
    HashMap::from([
        ("Event".to_string(), NodeBehavior::Event),
        ("Task".to_string(), NodeBehavior::Task),
        ("Gateway".to_string(), NodeBehavior::Gateway),
    ])
}

fn node(id: &str, node_type: &str) -> Node {
    Node {
        id: id.to_string(),
        data: NodeData {
            node_type: node_type.to_string(),
            ..Default::default()
        },
    }
}

/// An EVENT node with an explicit label, used to mark a node as the Start
/// or Stop of a run when its id alone doesn't read that way.
fn event_node(id: &str, label: &str) -> Node {
    let mut n = node(id, "Event");
    n.data.label = Some(label.to_string());
    n
}

fn edge(source: &str, target: &str) -> Edge {
    Edge {
        source: source.to_string(),
        target: target.to_string(),
        data: EdgeData { condition: None },
    }
}

fn task(name: &str, command: &str) -> Task {
    Task {
        task_name: name.to_string(),
        description: None,
        executor: ExecutorKind::Bash,
        target: command.to_string(),
        cancelled: false,
    }
}

#[tokio::test]
async fn linear_happy_path_runs_every_task_in_order() {
    let structure = ProcessStructure {
        nodes: vec![
            node("start", "Event"),
            {
                let mut n = node("fetch", "Task");
                n.data.step_function = Some("fetch_task".to_string());
                n
            },
            {
                let mut n = node("notify", "Task");
                n.data.step_function = Some("notify_task".to_string());
                n
            },
            event_node("stop", "Stop"),
        ],
        edges: vec![
            edge("start", "fetch"),
            edge("fetch", "notify"),
            edge("notify", "stop"),
        ],
    };

    let tasks = HashMap::from([
        (
            "fetch_task".to_string(),
            task("fetch_task", "echo '{\"user_id\": 7}'"),
        ),
        (
            "notify_task".to_string(),
            task("notify_task", "echo '{\"notified\": true}'"),
        ),
    ]);

    let registry = ExecutorRegistry::with_defaults();
    let engine = WorkflowEngine::new(EngineConfig::default());
    let visited = Arc::new(Mutex::new(Vec::new()));

    let outcome = engine
        .run(&structure, &behaviors(), &tasks, &registry, json!({}), |step| {
            let visited = visited.clone();
            async move {
                if step.status != StepStatus::Running && step.task_name.is_some() {
                    visited.lock().unwrap().push(step.node_id);
                }
            }
        })
        .await
        .unwrap();

    assert_eq!(*visited.lock().unwrap(), vec!["fetch".to_string(), "notify".to_string()]);
    match outcome {
        RunOutcome::Completed { context } => {
            assert_eq!(context["user_id"], json!(7));
            assert_eq!(context["notified"], json!(true));
        }
        RunOutcome::Failed { .. } => panic!("expected completion"),
    }
}

#[tokio::test]
async fn gateway_without_any_outgoing_edge_fails_the_run() {
    let structure = ProcessStructure {
        nodes: vec![node("start", "Event"), node("gw", "Gateway")],
        edges: vec![edge("start", "gw")],
    };

    let registry = ExecutorRegistry::with_defaults();
    let engine = WorkflowEngine::new(EngineConfig::default());

    let outcome = engine
        .run(&structure, &behaviors(), &HashMap::new(), &registry, json!({}), |_| async {})
        .await
        .unwrap();

    assert!(matches!(outcome, RunOutcome::Failed { .. }));
}

#[tokio::test]
async fn a_cyclic_graph_trips_the_step_limit_instead_of_hanging() {
    let structure = ProcessStructure {
        nodes: vec![node("start", "Event"), node("loop", "Event")],
        edges: vec![edge("start", "loop"), edge("loop", "loop")],
    };

    let registry = ExecutorRegistry::with_defaults();
    let engine = WorkflowEngine::new(EngineConfig { max_steps: 50 });

    let result = engine
        .run(&structure, &behaviors(), &HashMap::new(), &registry, json!({}), |_| async {})
        .await;

    assert!(matches!(result, Err(EngineError::StepLimitExceeded(50))));
}

#[tokio::test]
async fn gateway_branches_on_context_produced_by_an_earlier_task() {
    let structure = ProcessStructure {
        nodes: vec![
            node("start", "Event"),
            {
                let mut n = node("check", "Task");
                n.data.step_function = Some("check_task".to_string());
                n
            },
            node("gw", "Gateway"),
            event_node("approved", "Stop"),
            event_node("rejected", "Stop"),
        ],
        edges: vec![
            edge("start", "check"),
            edge("check", "gw"),
            Edge {
                source: "gw".to_string(),
                target: "approved".to_string(),
                data: EdgeData {
                    condition: Some(EdgeCondition {
                        field: "score".to_string(),
                        operator: ">=".to_string(),
                        value: json!(70),
                        is_default: false,
                    }),
                },
            },
            Edge {
                source: "gw".to_string(),
                target: "rejected".to_string(),
                data: EdgeData {
                    condition: Some(EdgeCondition {
                        field: "score".to_string(),
                        operator: "<".to_string(),
                        value: json!(70),
                        is_default: true,
                    }),
                },
            },
        ],
    };

    let tasks = HashMap::from([(
        "check_task".to_string(),
        task("check_task", "echo '{\"score\": 42}'"),
    )]);

    let registry = ExecutorRegistry::with_defaults();
    let engine = WorkflowEngine::new(EngineConfig::default());

    let outcome = engine
        .run(&structure, &behaviors(), &tasks, &registry, json!({}), |_| async {})
        .await
        .unwrap();

    match outcome {
        RunOutcome::Completed { context } => assert_eq!(context["score"], json!(42)),
        RunOutcome::Failed { .. } => panic!("expected completion"),
    }
}
