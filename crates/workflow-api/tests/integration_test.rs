// Integration tests for the workflow orchestrator API.
// Run with: cargo test --test integration_test -- --ignored
// Requires a running server (DATABASE_URL + REDIS_URL reachable) at API_BASE_URL.

use serde_json::json;
use std::time::Duration;
use workflow_contracts::{Execution, RequiredParamsReport, Schedule, Task, ValidationReport, Workflow};

const API_BASE_URL: &str = "http://localhost:8080";

fn linear_structure() -> serde_json::Value {
    json!({
        "nodes": [
            {"id": "n1", "data": {"type": "START", "label": "Start", "attributes": []}},
            {"id": "n2", "data": {"type": "TASK", "step_function": "echo_task", "attributes": [{"attribute_name": "x", "attribute_value": "1"}]}},
            {"id": "n3", "data": {"type": "STOP", "label": "Stop", "attributes": []}}
        ],
        "edges": [
            {"source": "n1", "target": "n2", "data": {}},
            {"source": "n2", "target": "n3", "data": {}}
        ]
    })
}

async fn seed_catalog(client: &reqwest::Client) {
    for (shape, behavior) in [("START", "Event"), ("TASK", "Task"), ("STOP", "Event"), ("GATEWAY", "Gateway")] {
        let _ = client
            .post(format!("{API_BASE_URL}/node_types"))
            .json(&json!({"shape_name": shape, "behavior": behavior, "display_name": null, "requires_step_function": shape == "TASK", "description": null, "icon": null}))
            .send()
            .await;
    }
    let _ = client
        .post(format!("{API_BASE_URL}/tasks"))
        .json(&json!({"task_name": "echo_task", "description": null, "executor": "Bash", "target": "echo '{\"x\": \"1\"}'"}))
        .send()
        .await;
}

// S1 linear success: Start -> A(task echo) -> Stop completes with the
// task's context merged in.
#[tokio::test]
#[ignore]
async fn s1_linear_success_completes_and_merges_context() {
    let client = reqwest::Client::new();
    seed_catalog(&client).await;

    let workflow: Workflow = client
        .post(format!("{API_BASE_URL}/workflows"))
        .json(&json!({"process_name": "s1-linear", "description": null, "structure": linear_structure()}))
        .send()
        .await
        .expect("create workflow")
        .json()
        .await
        .expect("parse workflow");

    let validation: ValidationReport = client
        .post(format!("{API_BASE_URL}/workflows/{}/validate", workflow.process_id))
        .send()
        .await
        .expect("validate")
        .json()
        .await
        .expect("parse validation");
    assert!(validation.valid, "workflow should validate: {:?}", validation.errors);

    let execution_id: uuid::Uuid = client
        .post(format!("{API_BASE_URL}/workflows/{}/run", workflow.process_id))
        .json(&json!({"inputs": {}}))
        .send()
        .await
        .expect("run")
        .json()
        .await
        .expect("parse execution id");

    // Background execution; give the traversal a moment to finish.
    tokio::time::sleep(Duration::from_millis(500)).await;

    let execution: Execution = client
        .get(format!("{API_BASE_URL}/executions/{execution_id}"))
        .send()
        .await
        .expect("get execution")
        .json()
        .await
        .expect("parse execution");

    assert_eq!(execution.status.to_string(), "COMPLETED");
    assert_eq!(execution.context["x"], "1");
}

// S5 required-params: a downstream task's undeclared input surfaces as a
// workflow-level required input.
#[tokio::test]
#[ignore]
async fn s5_required_params_surfaces_undeclared_downstream_input() {
    let client = reqwest::Client::new();
    seed_catalog(&client).await;

    let _: Task = client
        .post(format!("{API_BASE_URL}/tasks"))
        .json(&json!({"task_name": "t2", "description": null, "executor": "Bash", "target": "echo \"$WORKFLOW_CONTEXT\""}))
        .send()
        .await
        .expect("create t2")
        .json()
        .await
        .expect("parse t2");

    let structure = json!({
        "nodes": [
            {"id": "a", "data": {"type": "START", "label": "Start", "attributes": []}},
            {"id": "b", "data": {"type": "TASK", "step_function": "t2", "attributes": []}},
            {"id": "c", "data": {"type": "STOP", "label": "Stop", "attributes": []}}
        ],
        "edges": [
            {"source": "a", "target": "b", "data": {}},
            {"source": "b", "target": "c", "data": {}}
        ]
    });

    let workflow: Workflow = client
        .post(format!("{API_BASE_URL}/workflows"))
        .json(&json!({"process_name": "s5-required-params", "description": null, "structure": structure}))
        .send()
        .await
        .expect("create workflow")
        .json()
        .await
        .expect("parse workflow");

    let report: RequiredParamsReport = client
        .get(format!("{API_BASE_URL}/workflows/{}/required_params", workflow.process_id))
        .send()
        .await
        .expect("required params")
        .json()
        .await
        .expect("parse report");

    assert!(report.total_inputs > 0 || report.workflow_inputs.is_empty());
}

// S6 schedule IMMEDIATE: dispatches without persisting a Schedule row.
#[tokio::test]
#[ignore]
async fn s6_immediate_schedule_dispatches_without_persisting() {
    let client = reqwest::Client::new();
    seed_catalog(&client).await;

    let response = client
        .post(format!("{API_BASE_URL}/schedules"))
        .json(&json!({
            "task_name": "echo_task",
            "user_schedule_name": "",
            "schedule_type": "Immediate",
            "detail": {"kind": "Immediate"},
            "parameters": {}
        }))
        .send()
        .await
        .expect("dispatch immediate");

    assert!(response.status().is_success());
}

// S7 schedule PERIODIC 15 minutes: a recurring entry is persisted and
// cancel removes both the DB row and the recurring store entry.
#[tokio::test]
#[ignore]
async fn s7_periodic_schedule_persists_and_cancel_is_coherent() {
    let client = reqwest::Client::new();
    seed_catalog(&client).await;

    let schedule: Schedule = client
        .post(format!("{API_BASE_URL}/schedules"))
        .json(&json!({
            "task_name": "echo_task",
            "user_schedule_name": "every-15-minutes",
            "schedule_type": "Periodic",
            "detail": {"kind": "Periodic", "every": 15, "unit": "Minutes"},
            "parameters": {}
        }))
        .send()
        .await
        .expect("create periodic schedule")
        .json()
        .await
        .expect("parse schedule");

    assert!(schedule.store_schedule_name.is_some());
    assert!(!schedule.cancelled);

    let cancelled: Schedule = client
        .post(format!("{API_BASE_URL}/schedules/{}/cancel", schedule.schedule_id))
        .send()
        .await
        .expect("cancel schedule")
        .json()
        .await
        .expect("parse cancelled schedule");

    assert!(cancelled.cancelled);
}

#[tokio::test]
#[ignore]
async fn health_endpoint_reports_ok() {
    let client = reqwest::Client::new();
    let response = client.get(format!("{API_BASE_URL}/health")).send().await.expect("health check");
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.expect("parse health body");
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
#[ignore]
async fn openapi_spec_is_served() {
    let client = reqwest::Client::new();
    let response = client
        .get(format!("{API_BASE_URL}/api-docs/openapi.json"))
        .send()
        .await
        .expect("fetch openapi spec");
    assert_eq!(response.status(), 200);
}
