//! Schedule management commands.

use anyhow::Result;
use clap::Subcommand;
use serde_json::Value;
use uuid::Uuid;
use workflow_contracts::{CreateSchedule, Schedule, ScheduleDetail, ScheduleType, SchedulePage};

use crate::client::{Client, ClientError};
use crate::output::{print_field, print_table_header, print_table_row, OutputFormat};

#[derive(Subcommand)]
pub enum SchedulesCommand {
    /// Create a ONCE schedule
    Once {
        task_name: String,
        #[arg(long)]
        name: String,
        /// Naive local timestamp, "%Y-%m-%d %H:%M"
        #[arg(long)]
        run_at: String,
    },
    /// Create a PERIODIC schedule
    Periodic {
        task_name: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        every: u32,
        #[arg(long, value_parser = ["minutes", "hours", "days", "weeks", "months"])]
        unit: String,
    },
    /// Dispatch a task immediately, without persisting a schedule
    Immediate { task_name: String },
    /// Get a schedule by ID
    Get { schedule_id: Uuid },
    /// Cancel a schedule
    Cancel { schedule_id: Uuid },
    /// Reinstate a previously cancelled schedule
    Reschedule { schedule_id: Uuid },
    /// Page through all schedules
    List {
        #[arg(long, default_value = "1")]
        page: i64,
        #[arg(long, default_value = "20")]
        limit: i64,
    },
    /// Search schedules by task name
    Search {
        task_name: String,
        #[arg(long, default_value = "1")]
        page: i64,
        #[arg(long, default_value = "20")]
        limit: i64,
    },
}

pub async fn run(command: SchedulesCommand, client: &Client, output: OutputFormat) -> Result<()> {
    match command {
        SchedulesCommand::Once { task_name, name, run_at } => {
            create(
                client,
                output,
                task_name,
                name,
                ScheduleType::Once,
                ScheduleDetail::Once { run_at },
            )
            .await
        }
        SchedulesCommand::Periodic { task_name, name, every, unit } => {
            let unit = unit.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            create(
                client,
                output,
                task_name,
                name,
                ScheduleType::Periodic,
                ScheduleDetail::Periodic { every, unit },
            )
            .await
        }
        SchedulesCommand::Immediate { task_name } => immediate(client, output, task_name).await,
        SchedulesCommand::Get { schedule_id } => get(client, output, schedule_id).await,
        SchedulesCommand::Cancel { schedule_id } => cancel(client, schedule_id).await,
        SchedulesCommand::Reschedule { schedule_id } => reschedule(client, schedule_id).await,
        SchedulesCommand::List { page, limit } => list(client, output, page, limit).await,
        SchedulesCommand::Search { task_name, page, limit } => search(client, output, task_name, page, limit).await,
    }
}

async fn create(
    client: &Client,
    output: OutputFormat,
    task_name: String,
    user_schedule_name: String,
    schedule_type: ScheduleType,
    detail: ScheduleDetail,
) -> Result<()> {
    let request = CreateSchedule {
        task_name,
        user_schedule_name,
        schedule_type,
        detail,
        parameters: Value::Object(Default::default()),
    };
    let schedule: Schedule = client.post("/schedules", &request).await?;

    if output.is_text() {
        println!("Created schedule: {}", schedule.schedule_id);
    } else {
        output.print_value(&schedule);
    }
    Ok(())
}

async fn immediate(client: &Client, output: OutputFormat, task_name: String) -> Result<()> {
    let request = CreateSchedule {
        task_name,
        user_schedule_name: String::new(),
        schedule_type: ScheduleType::Immediate,
        detail: ScheduleDetail::Immediate,
        parameters: Value::Object(Default::default()),
    };
    let response: Value = client.post("/schedules", &request).await?;
    output.print_value(&response);
    Ok(())
}

async fn get(client: &Client, output: OutputFormat, schedule_id: Uuid) -> Result<()> {
    let schedule: Schedule = client
        .get(&format!("/schedules/{schedule_id}"))
        .await
        .map_err(|e| match e {
            ClientError::NotFound => anyhow::anyhow!("schedule not found: {schedule_id}"),
            e => e.into(),
        })?;

    if output.is_text() {
        print_field("ID", &schedule.schedule_id.to_string());
        print_field("Task", &schedule.task_name);
        print_field("Name", &schedule.user_schedule_name);
        print_field("Type", &schedule.schedule_type.to_string());
        print_field("Cancelled", &schedule.cancelled.to_string());
    } else {
        output.print_value(&schedule);
    }
    Ok(())
}

async fn cancel(client: &Client, schedule_id: Uuid) -> Result<()> {
    let _: Schedule = client.post(&format!("/schedules/{schedule_id}/cancel"), &Value::Null).await?;
    println!("Cancelled schedule: {schedule_id}");
    Ok(())
}

async fn reschedule(client: &Client, schedule_id: Uuid) -> Result<()> {
    let _: Schedule = client.post(&format!("/schedules/{schedule_id}/reschedule"), &Value::Null).await?;
    println!("Rescheduled: {schedule_id}");
    Ok(())
}

fn print_page(page: &SchedulePage) {
    print_table_header(&[("ID", 36), ("TASK", 20), ("TYPE", 22), ("CANCELLED", 10)]);
    for s in &page.items {
        print_table_row(&[
            (&s.schedule_id.to_string(), 36),
            (&s.task_name, 20),
            (&s.schedule_type.to_string(), 22),
            (&s.cancelled.to_string(), 10),
        ]);
    }
    println!("page {}/{} ({} total)", page.page, page.pages, page.total);
}

async fn list(client: &Client, output: OutputFormat, page: i64, limit: i64) -> Result<()> {
    let result: SchedulePage = client.get(&format!("/Show_TaskSchedules/page/{page}/{limit}")).await?;
    if output.is_text() {
        print_page(&result);
    } else {
        output.print_value(&result);
    }
    Ok(())
}

async fn search(client: &Client, output: OutputFormat, task_name: String, page: i64, limit: i64) -> Result<()> {
    let result: SchedulePage = client
        .get(&format!("/Show_TaskSchedules/search/{page}/{limit}?task_name={task_name}"))
        .await?;
    if output.is_text() {
        print_page(&result);
    } else {
        output.print_value(&result);
    }
    Ok(())
}
