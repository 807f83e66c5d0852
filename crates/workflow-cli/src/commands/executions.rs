//! Execution history and live streaming commands.

use anyhow::{Context, Result};
use clap::Subcommand;
use futures::StreamExt;
use uuid::Uuid;
use workflow_contracts::{Execution, ExecutionStep};

use crate::client::{Client, ClientError};
use crate::output::{print_field, print_table_header, print_table_row, OutputFormat};

#[derive(Subcommand)]
pub enum ExecutionsCommand {
    /// List executions, optionally filtered by workflow
    List {
        #[arg(long)]
        process_id: Option<i64>,
    },
    /// Get an execution by ID
    Get { execution_id: Uuid },
    /// List the steps of an execution
    Steps { execution_id: Uuid },
    /// Follow an execution's progress via server-sent events
    Watch { execution_id: Uuid },
}

pub async fn run(command: ExecutionsCommand, client: &Client, output: OutputFormat, api_url: &str) -> Result<()> {
    match command {
        ExecutionsCommand::List { process_id } => list(client, output, process_id).await,
        ExecutionsCommand::Get { execution_id } => get(client, output, execution_id).await,
        ExecutionsCommand::Steps { execution_id } => steps(client, output, execution_id).await,
        ExecutionsCommand::Watch { execution_id } => watch(api_url, execution_id).await,
    }
}

async fn list(client: &Client, output: OutputFormat, process_id: Option<i64>) -> Result<()> {
    let path = match process_id {
        Some(id) => format!("/executions?process_id={id}"),
        None => "/executions".to_string(),
    };
    let executions: Vec<Execution> = client.get(&path).await?;

    if output.is_text() {
        if executions.is_empty() {
            println!("No executions found");
            return Ok(());
        }
        print_table_header(&[("ID", 36), ("PROCESS", 8), ("STATUS", 10)]);
        for e in &executions {
            print_table_row(&[
                (&e.execution_id.to_string(), 36),
                (&e.process_id.to_string(), 8),
                (&e.status.to_string(), 10),
            ]);
        }
    } else {
        output.print_value(&executions);
    }
    Ok(())
}

async fn get(client: &Client, output: OutputFormat, execution_id: Uuid) -> Result<()> {
    let execution: Execution = client
        .get(&format!("/executions/{execution_id}"))
        .await
        .map_err(|e| match e {
            ClientError::NotFound => anyhow::anyhow!("execution not found: {execution_id}"),
            e => e.into(),
        })?;

    if output.is_text() {
        print_field("ID", &execution.execution_id.to_string());
        print_field("Process", &execution.process_id.to_string());
        print_field("Status", &execution.status.to_string());
        if let Some(error) = &execution.error {
            print_field("Error", error);
        }
    } else {
        output.print_value(&execution);
    }
    Ok(())
}

async fn steps(client: &Client, output: OutputFormat, execution_id: Uuid) -> Result<()> {
    let steps: Vec<ExecutionStep> = client.get(&format!("/executions/{execution_id}/steps")).await?;

    if output.is_text() {
        print_table_header(&[("SEQ", 5), ("NODE", 16), ("TASK", 20), ("STATUS", 10)]);
        for s in &steps {
            print_table_row(&[
                (&s.sequence.to_string(), 5),
                (&s.node_id, 16),
                (s.task_name.as_deref().unwrap_or("-"), 20),
                (&s.status.to_string(), 10),
            ]);
        }
    } else {
        output.print_value(&steps);
    }
    Ok(())
}

async fn watch(api_url: &str, execution_id: Uuid) -> Result<()> {
    let url = format!("{}/executions/{}/stream", api_url.trim_end_matches('/'), execution_id);
    let response = reqwest::get(&url).await.context("failed to open execution stream")?;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.context("error reading execution stream")?;
        print!("{}", String::from_utf8_lossy(&chunk));
    }
    Ok(())
}
