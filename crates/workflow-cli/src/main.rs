//! Command-line interface for the workflow orchestrator.

mod client;
mod commands;
mod output;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "workflow")]
#[command(about = "Manage workflows, tasks, schedules, and executions")]
#[command(version)]
pub struct Cli {
    /// API base URL
    #[arg(long, env = "WORKFLOW_API_URL", default_value = "http://localhost:8080")]
    pub api_url: String,

    /// Output format
    #[arg(long, short, default_value = "text", value_parser = ["text", "json", "yaml"])]
    pub output: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage workflow (process) definitions
    Workflows {
        #[command(subcommand)]
        command: commands::workflows::WorkflowsCommand,
    },
    /// Manage the task catalog
    Tasks {
        #[command(subcommand)]
        command: commands::tasks::TasksCommand,
    },
    /// Manage the node type catalog
    NodeTypes {
        #[command(subcommand)]
        command: commands::node_types::NodeTypesCommand,
    },
    /// Manage schedules
    Schedules {
        #[command(subcommand)]
        command: commands::schedules::SchedulesCommand,
    },
    /// Inspect and follow executions
    Executions {
        #[command(subcommand)]
        command: commands::executions::ExecutionsCommand,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = client::Client::new(&cli.api_url);
    let output = output::OutputFormat::from_str(&cli.output);

    match cli.command {
        Commands::Workflows { command } => commands::workflows::run(command, &client, output).await,
        Commands::Tasks { command } => commands::tasks::run(command, &client, output).await,
        Commands::NodeTypes { command } => commands::node_types::run(command, &client, output).await,
        Commands::Schedules { command } => commands::schedules::run(command, &client, output).await,
        Commands::Executions { command } => commands::executions::run(command, &client, output, &cli.api_url).await,
    }
}
