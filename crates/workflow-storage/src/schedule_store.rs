// Schedule repository: the Postgres side of C7 Task Scheduler.
// The recurring-scheduler (Redis) side lives in workflow-scheduler.

use crate::db::Database;
use crate::error::StoreResult;
use crate::models::{CreateScheduleRow, ScheduleRow, UpdateScheduleRow};

impl Database {
    pub async fn create_schedule(&self, input: CreateScheduleRow) -> StoreResult<ScheduleRow> {
        let row = sqlx::query_as::<_, ScheduleRow>(
            r#"
            INSERT INTO schedules
                (task_name, user_schedule_name, schedule_type, detail, parameters, store_schedule_name)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING schedule_id, task_name, user_schedule_name, schedule_type, detail, parameters, store_schedule_name, cancelled, created_at
            "#,
        )
        .bind(&input.task_name)
        .bind(&input.user_schedule_name)
        .bind(&input.schedule_type)
        .bind(&input.detail)
        .bind(&input.parameters)
        .bind(&input.store_schedule_name)
        .fetch_one(self.pool())
        .await?;

        Ok(row)
    }

    pub async fn get_schedule(&self, schedule_id: uuid::Uuid) -> StoreResult<Option<ScheduleRow>> {
        let row = sqlx::query_as::<_, ScheduleRow>(
            r#"
            SELECT schedule_id, task_name, user_schedule_name, schedule_type, detail, parameters, store_schedule_name, cancelled, created_at
            FROM schedules
            WHERE schedule_id = $1
            "#,
        )
        .bind(schedule_id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row)
    }

    pub async fn get_schedule_by_task(&self, task_name: &str) -> StoreResult<Vec<ScheduleRow>> {
        let rows = sqlx::query_as::<_, ScheduleRow>(
            r#"
            SELECT schedule_id, task_name, user_schedule_name, schedule_type, detail, parameters, store_schedule_name, cancelled, created_at
            FROM schedules
            WHERE task_name = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(task_name)
        .fetch_all(self.pool())
        .await?;

        Ok(rows)
    }

    /// Page of schedules ordered by creation time, newest first. `page` is
    /// 1-indexed, matching the original pagination envelope.
    pub async fn paginate_schedules(&self, page: i64, limit: i64) -> StoreResult<(Vec<ScheduleRow>, i64)> {
        let offset = (page.max(1) - 1) * limit;

        let rows = sqlx::query_as::<_, ScheduleRow>(
            r#"
            SELECT schedule_id, task_name, user_schedule_name, schedule_type, detail, parameters, store_schedule_name, cancelled, created_at
            FROM schedules
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool())
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schedules")
            .fetch_one(self.pool())
            .await?;

        Ok((rows, total))
    }

    /// Case-insensitive substring search over `task_name`, also matching the
    /// underscore/space variant of the query (so "daily report" finds a task
    /// named "daily_report").
    pub async fn search_schedules(
        &self,
        task_name_query: &str,
        page: i64,
        limit: i64,
    ) -> StoreResult<(Vec<ScheduleRow>, i64)> {
        let offset = (page.max(1) - 1) * limit;
        let underscored = format!("%{}%", task_name_query.replace(' ', "_").to_lowercase());
        let spaced = format!("%{}%", task_name_query.replace('_', " ").to_lowercase());

        let rows = sqlx::query_as::<_, ScheduleRow>(
            r#"
            SELECT schedule_id, task_name, user_schedule_name, schedule_type, detail, parameters, store_schedule_name, cancelled, created_at
            FROM schedules
            WHERE LOWER(task_name) LIKE $1 OR LOWER(task_name) LIKE $2
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(&underscored)
        .bind(&spaced)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool())
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM schedules WHERE LOWER(task_name) LIKE $1 OR LOWER(task_name) LIKE $2",
        )
        .bind(&underscored)
        .bind(&spaced)
        .fetch_one(self.pool())
        .await?;

        Ok((rows, total))
    }

    pub async fn update_schedule(
        &self,
        schedule_id: uuid::Uuid,
        input: UpdateScheduleRow,
    ) -> StoreResult<Option<ScheduleRow>> {
        let store_schedule_name_set = input.store_schedule_name.is_some();
        let store_schedule_name_value = input.store_schedule_name.flatten();

        let row = sqlx::query_as::<_, ScheduleRow>(
            r#"
            UPDATE schedules
            SET
                schedule_type = COALESCE($2, schedule_type),
                detail = COALESCE($3, detail),
                parameters = COALESCE($4, parameters),
                store_schedule_name = CASE WHEN $5 THEN $6 ELSE store_schedule_name END,
                cancelled = COALESCE($7, cancelled)
            WHERE schedule_id = $1
            RETURNING schedule_id, task_name, user_schedule_name, schedule_type, detail, parameters, store_schedule_name, cancelled, created_at
            "#,
        )
        .bind(schedule_id)
        .bind(&input.schedule_type)
        .bind(&input.detail)
        .bind(&input.parameters)
        .bind(store_schedule_name_set)
        .bind(&store_schedule_name_value)
        .bind(input.cancelled)
        .fetch_optional(self.pool())
        .await?;

        Ok(row)
    }
}
