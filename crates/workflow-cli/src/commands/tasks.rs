//! Task catalog commands.

use anyhow::Result;
use clap::Subcommand;
use workflow_contracts::{CreateTask, ExecutorKind, Task};

use crate::client::{Client, ClientError};
use crate::output::{print_field, print_table_header, print_table_row, OutputFormat};

#[derive(Subcommand)]
pub enum TasksCommand {
    /// Register a task
    Create {
        task_name: String,
        #[arg(long, value_parser = ["python", "bash", "stored_procedure", "stored_function", "http"])]
        executor: String,
        /// Script path, procedure name, or URL
        #[arg(long)]
        target: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// List all tasks
    List,
    /// Get a task by name
    Get { task_name: String },
    /// Cancel a task, preventing it from being run
    Cancel { task_name: String },
}

pub async fn run(command: TasksCommand, client: &Client, output: OutputFormat) -> Result<()> {
    match command {
        TasksCommand::Create {
            task_name,
            executor,
            target,
            description,
        } => create(client, output, task_name, executor, target, description).await,
        TasksCommand::List => list(client, output).await,
        TasksCommand::Get { task_name } => get(client, output, task_name).await,
        TasksCommand::Cancel { task_name } => cancel(client, task_name).await,
    }
}

async fn create(
    client: &Client,
    output: OutputFormat,
    task_name: String,
    executor: String,
    target: String,
    description: Option<String>,
) -> Result<()> {
    let executor: ExecutorKind = executor.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let request = CreateTask {
        task_name,
        description,
        executor,
        target,
    };
    let task: Task = client.post("/tasks", &request).await?;

    if output.is_text() {
        println!("Created task: {}", task.task_name);
    } else {
        output.print_value(&task);
    }
    Ok(())
}

async fn list(client: &Client, output: OutputFormat) -> Result<()> {
    let tasks: Vec<Task> = client.get("/tasks").await?;

    if output.is_text() {
        if tasks.is_empty() {
            println!("No tasks found");
            return Ok(());
        }
        print_table_header(&[("NAME", 24), ("EXECUTOR", 18), ("TARGET", 30), ("CANCELLED", 10)]);
        for t in &tasks {
            print_table_row(&[
                (&t.task_name, 24),
                (&t.executor.to_string(), 18),
                (&t.target, 30),
                (&t.cancelled.to_string(), 10),
            ]);
        }
    } else {
        output.print_value(&tasks);
    }
    Ok(())
}

async fn get(client: &Client, output: OutputFormat, task_name: String) -> Result<()> {
    let task: Task = client
        .get(&format!("/tasks/{task_name}"))
        .await
        .map_err(|e| match e {
            ClientError::NotFound => anyhow::anyhow!("task not found: {task_name}"),
            e => e.into(),
        })?;

    if output.is_text() {
        print_field("Name", &task.task_name);
        print_field("Executor", &task.executor.to_string());
        print_field("Target", &task.target);
        print_field("Cancelled", &task.cancelled.to_string());
    } else {
        output.print_value(&task);
    }
    Ok(())
}

async fn cancel(client: &Client, task_name: String) -> Result<()> {
    client
        .delete(&format!("/tasks/{task_name}"))
        .await
        .map_err(|e| match e {
            ClientError::NotFound => anyhow::anyhow!("task not found: {task_name}"),
            e => e.into(),
        })?;
    println!("Cancelled task: {task_name}");
    Ok(())
}
