//! C6 Required-Parameter Analyzer: for each TASK node in a workflow, works
//! out which of its declared (or introspected) inputs are *not* already
//! satisfied by a node attribute or by an ancestor task's output, and
//! reports those as inputs the caller must supply at run time.

use std::collections::{HashMap, HashSet, VecDeque};

use workflow_contracts::{NodeBehavior, ProcessStructure, RequiredParam, RequiredParamsReport};

/// Everything the analyzer needs about one task: its required input names
/// (preferring catalog-declared parameters over introspected ones) and its
/// introspected output names (used to satisfy descendants).
#[derive(Debug, Clone, Default)]
pub struct TaskSignature {
    pub required_inputs: Vec<String>,
    pub outputs: Vec<String>,
}

/// Reverse adjacency: for each node, the ids of nodes with an edge into it.
pub fn build_predecessors<'a>(structure: &'a ProcessStructure) -> HashMap<&'a str, Vec<&'a str>> {
    let mut preds: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in &structure.edges {
        preds.entry(edge.target.as_str()).or_default().push(edge.source.as_str());
    }
    preds
}

/// All ancestor node ids of `node_id`, reachable by walking predecessors.
fn ancestors<'a>(node_id: &'a str, preds: &HashMap<&'a str, Vec<&'a str>>) -> HashSet<&'a str> {
    let mut seen = HashSet::new();
    let mut queue: VecDeque<&str> = preds.get(node_id).cloned().unwrap_or_default().into();

    while let Some(id) = queue.pop_front() {
        if seen.insert(id) {
            if let Some(next) = preds.get(id) {
                queue.extend(next.iter().copied());
            }
        }
    }

    seen
}

pub fn analyze_required_params(
    structure: &ProcessStructure,
    behaviors: &HashMap<String, NodeBehavior>,
    signatures: &HashMap<String, TaskSignature>,
) -> RequiredParamsReport {
    let preds = build_predecessors(structure);
    let mut workflow_inputs: Vec<RequiredParam> = Vec::new();
    let mut seen_params: HashSet<String> = HashSet::new();

    for node in &structure.nodes {
        if behaviors.get(&node.data.node_type) != Some(&NodeBehavior::Task) {
            continue;
        }
        let Some(task_name) = &node.data.step_function else {
            continue;
        };
        let Some(signature) = signatures.get(task_name) else {
            continue;
        };

        let provided: HashSet<String> = node
            .data
            .attributes
            .iter()
            .map(|a| a.attribute_name.to_uppercase())
            .collect();

        let ancestor_outputs: HashSet<String> = ancestors(&node.id, &preds)
            .into_iter()
            .filter_map(|ancestor_id| structure.nodes.iter().find(|n| n.id == ancestor_id))
            .filter(|n| behaviors.get(&n.data.node_type) == Some(&NodeBehavior::Task))
            .filter_map(|n| n.data.step_function.as_ref())
            .filter_map(|t| signatures.get(t))
            .flat_map(|sig| sig.outputs.iter().map(|o| o.to_uppercase()))
            .collect();

        for param in &signature.required_inputs {
            let key = param.to_uppercase();
            if provided.contains(&key) || ancestor_outputs.contains(&key) {
                continue;
            }

            // Dedup by parameter name across the whole graph; only the
            // first occurrence's task (and label) is recorded.
            if seen_params.insert(key) {
                workflow_inputs.push(RequiredParam {
                    name: param.clone(),
                    source_task: task_name.clone(),
                    label: node.data.label.clone(),
                });
            }
        }
    }

    RequiredParamsReport {
        has_required_inputs: !workflow_inputs.is_empty(),
        total_inputs: workflow_inputs.len(),
        workflow_inputs,
    }
}

#[cfg(test)]
mod tests {
    use workflow_contracts::{Edge, EdgeData, Node, NodeAttribute, NodeData};

    use super::*;

    fn behaviors() -> HashMap<String, NodeBehavior> {
        HashMap::from([
            ("Event".to_string(), NodeBehavior::Event),
            ("Task".to_string(), NodeBehavior::Task),
        ])
    }

    fn task_node(id: &str, task_name: &str, attrs: Vec<(&str, &str)>) -> Node {
        Node {
            id: id.to_string(),
            data: NodeData {
                node_type: "Task".to_string(),
                step_function: Some(task_name.to_string()),
                label: None,
                attributes: attrs
                    .into_iter()
                    .map(|(name, value)| NodeAttribute {
                        attribute_name: name.to_string(),
                        attribute_value: serde_json::json!(value),
                    })
                    .collect(),
            },
        }
    }

    #[test]
    fn ancestor_output_satisfies_downstream_required_input() {
        let structure = ProcessStructure {
            nodes: vec![
                task_node("fetch", "fetch_user", vec![]),
                task_node("notify", "send_email", vec![]),
            ],
            edges: vec![Edge {
                source: "fetch".to_string(),
                target: "notify".to_string(),
                data: EdgeData { condition: None },
            }],
        };

        let signatures = HashMap::from([
            (
                "fetch_user".to_string(),
                TaskSignature {
                    required_inputs: vec!["account_id".to_string()],
                    outputs: vec!["email".to_string()],
                },
            ),
            (
                "send_email".to_string(),
                TaskSignature {
                    required_inputs: vec!["email".to_string()],
                    outputs: vec![],
                },
            ),
        ]);

        let report = analyze_required_params(&structure, &behaviors(), &signatures);
        let names: Vec<_> = report.workflow_inputs.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["account_id"]);
    }

    #[test]
    fn node_attribute_satisfies_its_own_required_input() {
        let structure = ProcessStructure {
            nodes: vec![task_node("notify", "send_email", vec![("EMAIL", "a@b.com")])],
            edges: vec![],
        };
        let signatures = HashMap::from([(
            "send_email".to_string(),
            TaskSignature {
                required_inputs: vec!["email".to_string()],
                outputs: vec![],
            },
        )]);

        let report = analyze_required_params(&structure, &behaviors(), &signatures);
        assert!(!report.has_required_inputs);
        assert_eq!(report.total_inputs, 0);
    }

    #[test]
    fn same_unsatisfied_param_across_tasks_is_deduplicated() {
        let structure = ProcessStructure {
            nodes: vec![
                task_node("a", "task_a", vec![]),
                task_node("b", "task_b", vec![]),
            ],
            edges: vec![],
        };
        let signatures = HashMap::from([
            (
                "task_a".to_string(),
                TaskSignature {
                    required_inputs: vec!["region".to_string()],
                    outputs: vec![],
                },
            ),
            (
                "task_b".to_string(),
                TaskSignature {
                    required_inputs: vec!["region".to_string()],
                    outputs: vec![],
                },
            ),
        ]);

        let report = analyze_required_params(&structure, &behaviors(), &signatures);
        assert_eq!(report.total_inputs, 1);
        assert_eq!(report.workflow_inputs[0].source_task, "task_a");
    }
}
