//! Workflow (process) management commands.

use anyhow::{Context, Result};
use clap::Subcommand;
use serde_json::Value;
use workflow_contracts::{CreateWorkflow, RequiredParamsReport, StartExecution, ValidationReport, Workflow};

use crate::client::{Client, ClientError};
use crate::output::{print_field, print_table_header, print_table_row, OutputFormat};

#[derive(Subcommand)]
pub enum WorkflowsCommand {
    /// Create a workflow from a JSON/YAML process-structure file
    Create {
        /// Process name
        #[arg(long)]
        name: String,
        /// Description
        #[arg(long)]
        description: Option<String>,
        /// Path to a JSON or YAML file with the process structure
        #[arg(long)]
        file: String,
    },
    /// List all workflows
    List,
    /// Get a workflow by process ID
    Get { process_id: i64 },
    /// Delete a workflow
    Delete { process_id: i64 },
    /// Validate a workflow's graph
    Validate { process_id: i64 },
    /// Report required input parameters
    RequiredParams { process_id: i64 },
    /// Trigger a run, optionally with a JSON inputs file
    Run {
        process_id: i64,
        #[arg(long)]
        inputs: Option<String>,
    },
}

pub async fn run(command: WorkflowsCommand, client: &Client, output: OutputFormat) -> Result<()> {
    match command {
        WorkflowsCommand::Create { name, description, file } => create(client, output, name, description, file).await,
        WorkflowsCommand::List => list(client, output).await,
        WorkflowsCommand::Get { process_id } => get(client, output, process_id).await,
        WorkflowsCommand::Delete { process_id } => delete(client, process_id).await,
        WorkflowsCommand::Validate { process_id } => validate(client, output, process_id).await,
        WorkflowsCommand::RequiredParams { process_id } => required_params(client, output, process_id).await,
        WorkflowsCommand::Run { process_id, inputs } => trigger_run(client, process_id, inputs).await,
    }
}

fn load_structure(path: &str) -> Result<Value> {
    let content = std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
    if path.ends_with(".json") {
        Ok(serde_json::from_str(&content)?)
    } else {
        Ok(serde_yaml::from_str(&content)?)
    }
}

async fn create(client: &Client, output: OutputFormat, name: String, description: Option<String>, file: String) -> Result<()> {
    let structure = load_structure(&file)?;
    let structure = serde_json::from_value(structure).context("file is not a valid process structure")?;

    let request = CreateWorkflow {
        process_name: name,
        description,
        structure,
    };
    let workflow: Workflow = client.post("/workflows", &request).await?;

    if output.is_text() {
        println!("Created workflow: {}", workflow.process_id);
        print_field("Name", &workflow.process_name);
    } else {
        output.print_value(&workflow);
    }
    Ok(())
}

async fn list(client: &Client, output: OutputFormat) -> Result<()> {
    let workflows: Vec<Workflow> = client.get("/workflows").await?;

    if output.is_text() {
        if workflows.is_empty() {
            println!("No workflows found");
            return Ok(());
        }
        print_table_header(&[("ID", 8), ("NAME", 30), ("CANCELLED", 10)]);
        for w in &workflows {
            print_table_row(&[
                (&w.process_id.to_string(), 8),
                (&w.process_name, 30),
                (&w.cancelled.to_string(), 10),
            ]);
        }
    } else {
        output.print_value(&workflows);
    }
    Ok(())
}

async fn get(client: &Client, output: OutputFormat, process_id: i64) -> Result<()> {
    let workflow: Workflow = client
        .get(&format!("/workflows/{process_id}"))
        .await
        .map_err(|e| match e {
            ClientError::NotFound => anyhow::anyhow!("workflow not found: {process_id}"),
            e => e.into(),
        })?;

    if output.is_text() {
        print_field("Process ID", &workflow.process_id.to_string());
        print_field("Name", &workflow.process_name);
        if let Some(desc) = &workflow.description {
            print_field("Description", desc);
        }
        print_field("Nodes", &workflow.structure.nodes.len().to_string());
        print_field("Edges", &workflow.structure.edges.len().to_string());
        print_field("Cancelled", &workflow.cancelled.to_string());
    } else {
        output.print_value(&workflow);
    }
    Ok(())
}

async fn delete(client: &Client, process_id: i64) -> Result<()> {
    client
        .delete(&format!("/workflows/{process_id}"))
        .await
        .map_err(|e| match e {
            ClientError::NotFound => anyhow::anyhow!("workflow not found: {process_id}"),
            e => e.into(),
        })?;
    println!("Deleted workflow: {process_id}");
    Ok(())
}

async fn validate(client: &Client, output: OutputFormat, process_id: i64) -> Result<()> {
    let report: ValidationReport = client.post(&format!("/workflows/{process_id}/validate"), &Value::Null).await?;

    if output.is_text() {
        print_field("Valid", &report.valid.to_string());
        for error in &report.errors {
            println!("  - {error}");
        }
    } else {
        output.print_value(&report);
    }
    Ok(())
}

async fn required_params(client: &Client, output: OutputFormat, process_id: i64) -> Result<()> {
    let report: RequiredParamsReport = client.get(&format!("/workflows/{process_id}/required_params")).await?;

    if output.is_text() {
        print_field("Total inputs", &report.total_inputs.to_string());
        for param in &report.workflow_inputs {
            let label = param.label.as_deref().unwrap_or(&param.source_task);
            println!("  {} (from task: {}, {})", param.name, param.source_task, label);
        }
    } else {
        output.print_value(&report);
    }
    Ok(())
}

async fn trigger_run(client: &Client, process_id: i64, inputs: Option<String>) -> Result<()> {
    let inputs = match inputs {
        Some(path) => load_structure(&path)?,
        None => Value::Object(Default::default()),
    };
    let request = StartExecution { inputs };
    let execution_id: uuid::Uuid = client.post(&format!("/workflows/{process_id}/run"), &request).await?;
    println!("Started execution: {execution_id}");
    Ok(())
}
