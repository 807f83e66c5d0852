//! C7 Task Scheduler: schedule CRUD backed by Postgres, synchronized with the
//! Redis recurring store. Ordering matters and is deliberately asymmetric:
//! creating/updating writes the recurring store *before* the database row
//! (so a row never claims a store entry that doesn't exist), while
//! cancelling flips the database row *before* deleting the store entry (so a
//! cancelled schedule is never left runnable if the delete fails) — both
//! directions roll back on the second write's failure.

use uuid::Uuid;
use workflow_contracts::{CreateSchedule, Schedule, ScheduleDetail, ScheduleType, SchedulePage};
use workflow_engine::{ExecutorOutcome, ExecutorRegistry};
use workflow_storage::models::{CreateScheduleRow, UpdateScheduleRow};
use workflow_storage::Database;

use crate::error::{SchedulerError, SchedulerResult};
use crate::store::{RecurringEntry, RecurringStore};
use crate::translate::{self, MaterializedSchedule};

pub struct SchedulerService {
    db: Database,
    recurring: RecurringStore,
}

impl SchedulerService {
    pub fn new(db: Database, recurring: RecurringStore) -> Self {
        Self { db, recurring }
    }

    /// Fails the request if any parameter the Task declares as required is
    /// absent from the supplied parameter map.
    async fn check_declared_parameters(
        &self,
        task_name: &str,
        parameters: &serde_json::Value,
    ) -> SchedulerResult<()> {
        let declared = self.db.list_task_parameters(task_name).await?;
        let supplied = parameters.as_object();
        let missing: Vec<&str> = declared
            .iter()
            .filter(|p| p.required)
            .filter(|p| !supplied.is_some_and(|map| map.contains_key(&p.parameter_name)))
            .map(|p| p.parameter_name.as_str())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(SchedulerError::Validation(format!(
                "missing required parameter(s) for task '{task_name}': {}",
                missing.join(", ")
            )))
        }
    }

    /// `IMMEDIATE` schedules dispatch straight to the executor and never get
    /// a persisted row, matching the original's ad-hoc execution path.
    #[tracing::instrument(skip(self, registry, input))]
    pub async fn dispatch_immediate(
        &self,
        registry: &ExecutorRegistry,
        input: &CreateSchedule,
    ) -> SchedulerResult<ExecutorOutcome> {
        let task = self
            .db
            .get_task(&input.task_name)
            .await?
            .ok_or_else(|| SchedulerError::TaskUnavailable(input.task_name.clone()))?;
        if task.cancelled {
            return Err(SchedulerError::TaskUnavailable(input.task_name.clone()));
        }
        self.check_declared_parameters(&input.task_name, &input.parameters).await?;

        let executor = registry
            .get(&task.executor.to_string())
            .ok_or_else(|| SchedulerError::Validation(format!("no executor for '{}'", task.executor)))?;
        Ok(executor.invoke(&task.target, &input.parameters).await)
    }

    #[tracing::instrument(skip(self, input))]
    pub async fn create_schedule(&self, input: CreateSchedule) -> SchedulerResult<Schedule> {
        if input.schedule_type == ScheduleType::Immediate {
            return Err(SchedulerError::Validation(
                "IMMEDIATE schedules are dispatched via dispatch_immediate, not persisted".to_string(),
            ));
        }

        let task = self
            .db
            .get_task(&input.task_name)
            .await?
            .ok_or_else(|| SchedulerError::TaskUnavailable(input.task_name.clone()))?;
        if task.cancelled {
            return Err(SchedulerError::TaskUnavailable(input.task_name));
        }
        self.check_declared_parameters(&input.task_name, &input.parameters).await?;

        let materialized = translate::materialize(&input.detail)?;
        let store_schedule_name = match &materialized {
            MaterializedSchedule::None => None,
            _ => Some(format!("{}_{}", input.user_schedule_name, Uuid::new_v4())),
        };

        if let (Some(name), Some(entry)) = (
            &store_schedule_name,
            RecurringEntry::from_materialized(input.task_name.clone(), &materialized, input.parameters.clone()),
        ) {
            self.recurring.put(name, &entry).await?;
        }

        let detail_json = serde_json::to_value(&input.detail).map_err(|e| SchedulerError::Validation(e.to_string()))?;

        let row = match self
            .db
            .create_schedule(CreateScheduleRow {
                task_name: input.task_name,
                user_schedule_name: input.user_schedule_name,
                schedule_type: input.schedule_type.to_string(),
                detail: detail_json,
                parameters: input.parameters,
                store_schedule_name: store_schedule_name.clone(),
            })
            .await
        {
            Ok(row) => row,
            Err(e) => {
                if let Some(name) = &store_schedule_name {
                    let _ = self.recurring.delete(name).await;
                }
                return Err(e.into());
            }
        };

        row_to_schedule(row)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_schedule(&self, schedule_id: Uuid) -> SchedulerResult<Schedule> {
        let row = self
            .db
            .get_schedule(schedule_id)
            .await?
            .ok_or(SchedulerError::NotFound(schedule_id))?;
        row_to_schedule(row)
    }

    pub async fn paginate(&self, page: i64, limit: i64) -> SchedulerResult<SchedulePage> {
        let (rows, total) = self.db.paginate_schedules(page, limit).await?;
        page_from_rows(rows, total, page, limit)
    }

    pub async fn search(&self, task_name_query: &str, page: i64, limit: i64) -> SchedulerResult<SchedulePage> {
        let (rows, total) = self.db.search_schedules(task_name_query, page, limit).await?;
        page_from_rows(rows, total, page, limit)
    }

    /// Flips `cancelled` first, then removes the recurring-store entry;
    /// rolls the database row back if the store delete fails.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_schedule(&self, schedule_id: Uuid) -> SchedulerResult<Schedule> {
        let existing = self
            .db
            .get_schedule(schedule_id)
            .await?
            .ok_or(SchedulerError::NotFound(schedule_id))?;

        let row = self
            .db
            .update_schedule(
                schedule_id,
                UpdateScheduleRow {
                    cancelled: Some(true),
                    ..Default::default()
                },
            )
            .await?
            .ok_or(SchedulerError::NotFound(schedule_id))?;

        if let Some(store_name) = &existing.store_schedule_name {
            if let Err(e) = self.recurring.delete(store_name).await {
                self.db
                    .update_schedule(
                        schedule_id,
                        UpdateScheduleRow {
                            cancelled: Some(false),
                            ..Default::default()
                        },
                    )
                    .await?;
                return Err(e);
            }
        }

        row_to_schedule(row)
    }

    /// Recreates the recurring-store entry for a cancelled schedule and
    /// clears its cancelled flag. Only valid on schedules that are
    /// currently cancelled.
    #[tracing::instrument(skip(self))]
    pub async fn reschedule(&self, schedule_id: Uuid) -> SchedulerResult<Schedule> {
        let existing = self
            .db
            .get_schedule(schedule_id)
            .await?
            .ok_or(SchedulerError::NotFound(schedule_id))?;
        if !existing.cancelled {
            return Err(SchedulerError::NotCancelled(schedule_id));
        }
        self.check_declared_parameters(&existing.task_name, &existing.parameters).await?;

        let detail: ScheduleDetail = serde_json::from_value(existing.detail.clone())
            .map_err(|e| SchedulerError::Validation(e.to_string()))?;
        let materialized = translate::materialize(&detail)?;

        let store_schedule_name = match (&existing.store_schedule_name, &materialized) {
            (Some(name), _) => Some(name.clone()),
            (None, MaterializedSchedule::None) => None,
            (None, _) => Some(format!("{}_{}", existing.user_schedule_name, Uuid::new_v4())),
        };

        if let (Some(name), Some(entry)) = (
            &store_schedule_name,
            RecurringEntry::from_materialized(existing.task_name.clone(), &materialized, existing.parameters.clone()),
        ) {
            self.recurring.put(name, &entry).await?;
        }

        let row = self
            .db
            .update_schedule(
                schedule_id,
                UpdateScheduleRow {
                    cancelled: Some(false),
                    store_schedule_name: Some(store_schedule_name),
                    ..Default::default()
                },
            )
            .await?
            .ok_or(SchedulerError::NotFound(schedule_id))?;

        row_to_schedule(row)
    }
}

fn row_to_schedule(row: workflow_storage::models::ScheduleRow) -> SchedulerResult<Schedule> {
    let schedule_type: ScheduleType = row
        .schedule_type
        .parse()
        .map_err(SchedulerError::Validation)?;
    let detail: ScheduleDetail =
        serde_json::from_value(row.detail).map_err(|e| SchedulerError::Validation(e.to_string()))?;

    Ok(Schedule {
        schedule_id: row.schedule_id,
        task_name: row.task_name,
        user_schedule_name: row.user_schedule_name,
        schedule_type,
        detail,
        parameters: row.parameters,
        store_schedule_name: row.store_schedule_name,
        cancelled: row.cancelled,
        created_at: row.created_at,
    })
}

fn page_from_rows(
    rows: Vec<workflow_storage::models::ScheduleRow>,
    total: i64,
    page: i64,
    limit: i64,
) -> SchedulerResult<SchedulePage> {
    let items = rows.into_iter().map(row_to_schedule).collect::<SchedulerResult<Vec<_>>>()?;
    let pages = if limit > 0 { (total + limit - 1) / limit } else { 0 };
    Ok(SchedulePage {
        items,
        total,
        pages,
        page,
    })
}
