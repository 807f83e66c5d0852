//! Node type catalog commands.

use anyhow::Result;
use clap::Subcommand;
use workflow_contracts::{CreateNodeType, NodeType};

use crate::client::{Client, ClientError};
use crate::output::{print_field, print_table_header, print_table_row, OutputFormat};

#[derive(Subcommand)]
pub enum NodeTypesCommand {
    /// Register a node type (graph shape)
    Create {
        shape_name: String,
        #[arg(long, value_parser = ["event", "gateway", "task"])]
        behavior: String,
        #[arg(long)]
        display_name: Option<String>,
        #[arg(long)]
        requires_step_function: bool,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        icon: Option<String>,
    },
    /// List all node types
    List,
    /// Get a node type by shape name
    Get { shape_name: String },
    /// Delete a node type
    Delete { shape_name: String },
}

pub async fn run(command: NodeTypesCommand, client: &Client, output: OutputFormat) -> Result<()> {
    match command {
        NodeTypesCommand::Create {
            shape_name,
            behavior,
            display_name,
            requires_step_function,
            description,
            icon,
        } => {
            create(
                client,
                output,
                shape_name,
                behavior,
                display_name,
                requires_step_function,
                description,
                icon,
            )
            .await
        }
        NodeTypesCommand::List => list(client, output).await,
        NodeTypesCommand::Get { shape_name } => get(client, output, shape_name).await,
        NodeTypesCommand::Delete { shape_name } => delete(client, shape_name).await,
    }
}

async fn create(
    client: &Client,
    output: OutputFormat,
    shape_name: String,
    behavior: String,
    display_name: Option<String>,
    requires_step_function: bool,
    description: Option<String>,
    icon: Option<String>,
) -> Result<()> {
    let behavior = behavior.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let request = CreateNodeType {
        shape_name,
        behavior,
        display_name,
        requires_step_function,
        description,
        icon,
    };
    let node_type: NodeType = client.post("/node_types", &request).await?;

    if output.is_text() {
        println!("Created node type: {}", node_type.shape_name);
    } else {
        output.print_value(&node_type);
    }
    Ok(())
}

async fn list(client: &Client, output: OutputFormat) -> Result<()> {
    let node_types: Vec<NodeType> = client.get("/node_types").await?;

    if output.is_text() {
        if node_types.is_empty() {
            println!("No node types found");
            return Ok(());
        }
        print_table_header(&[("SHAPE", 24), ("BEHAVIOR", 12)]);
        for nt in &node_types {
            print_table_row(&[(&nt.shape_name, 24), (&nt.behavior.to_string(), 12)]);
        }
    } else {
        output.print_value(&node_types);
    }
    Ok(())
}

async fn get(client: &Client, output: OutputFormat, shape_name: String) -> Result<()> {
    let node_type: NodeType = client
        .get(&format!("/node_types/{shape_name}"))
        .await
        .map_err(|e| match e {
            ClientError::NotFound => anyhow::anyhow!("node type not found: {shape_name}"),
            e => e.into(),
        })?;

    if output.is_text() {
        print_field("Shape", &node_type.shape_name);
        print_field("Behavior", &node_type.behavior.to_string());
        if let Some(display_name) = &node_type.display_name {
            print_field("Display name", display_name);
        }
        print_field("Requires step function", &node_type.requires_step_function.to_string());
        if let Some(icon) = &node_type.icon {
            print_field("Icon", icon);
        }
    } else {
        output.print_value(&node_type);
    }
    Ok(())
}

async fn delete(client: &Client, shape_name: String) -> Result<()> {
    client
        .delete(&format!("/node_types/{shape_name}"))
        .await
        .map_err(|e| match e {
            ClientError::NotFound => anyhow::anyhow!("node type not found: {shape_name}"),
            e => e.into(),
        })?;
    println!("Deleted node type: {shape_name}");
    Ok(())
}
