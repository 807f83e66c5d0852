// Task catalog repository: C2 Task Catalog Store

use crate::db::Database;
use crate::error::{StoreError, StoreResult};
use crate::models::{
    CreateExecutionMethodRow, CreateTaskParameterRow, CreateTaskRow, ExecutionMethodRow, TaskParameterRow,
    TaskRow,
};

impl Database {
    pub async fn create_task(&self, input: CreateTaskRow) -> StoreResult<TaskRow> {
        if self.get_task(&input.task_name).await?.is_some() {
            return Err(StoreError::Conflict {
                entity: "task",
                key: input.task_name,
            });
        }

        let row = sqlx::query_as::<_, TaskRow>(
            r#"
            INSERT INTO tasks (task_name, description, executor, target)
            VALUES ($1, $2, $3, $4)
            RETURNING task_name, description, executor, target, cancelled
            "#,
        )
        .bind(&input.task_name)
        .bind(&input.description)
        .bind(&input.executor)
        .bind(&input.target)
        .fetch_one(self.pool())
        .await?;

        Ok(row)
    }

    pub async fn get_task(&self, task_name: &str) -> StoreResult<Option<TaskRow>> {
        let row = sqlx::query_as::<_, TaskRow>(
            "SELECT task_name, description, executor, target, cancelled FROM tasks WHERE task_name = $1",
        )
        .bind(task_name)
        .fetch_optional(self.pool())
        .await?;

        Ok(row)
    }

    /// Fetches many tasks by name in one round trip, used by the
    /// required-parameter analyzer to batch-resolve a workflow's nodes.
    pub async fn get_tasks_by_names(&self, task_names: &[String]) -> StoreResult<Vec<TaskRow>> {
        let rows = sqlx::query_as::<_, TaskRow>(
            "SELECT task_name, description, executor, target, cancelled FROM tasks WHERE task_name = ANY($1)",
        )
        .bind(task_names)
        .fetch_all(self.pool())
        .await?;

        Ok(rows)
    }

    pub async fn list_tasks(&self) -> StoreResult<Vec<TaskRow>> {
        let rows = sqlx::query_as::<_, TaskRow>(
            "SELECT task_name, description, executor, target, cancelled FROM tasks ORDER BY task_name",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(rows)
    }

    pub async fn cancel_task(&self, task_name: &str) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE tasks SET cancelled = TRUE WHERE task_name = $1")
            .bind(task_name)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // ============================================
    // Task parameters
    // ============================================

    pub async fn set_task_parameters(
        &self,
        task_name: &str,
        params: Vec<CreateTaskParameterRow>,
    ) -> StoreResult<Vec<TaskParameterRow>> {
        let mut tx = self.pool().begin().await?;

        sqlx::query("DELETE FROM task_parameters WHERE task_name = $1")
            .bind(task_name)
            .execute(&mut *tx)
            .await?;

        let mut rows = Vec::with_capacity(params.len());
        for param in params {
            let row = sqlx::query_as::<_, TaskParameterRow>(
                r#"
                INSERT INTO task_parameters (task_name, parameter_name, required, default_value, position)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING task_name, parameter_name, required, default_value, position
                "#,
            )
            .bind(task_name)
            .bind(&param.parameter_name)
            .bind(param.required)
            .bind(&param.default_value)
            .bind(param.position)
            .fetch_one(&mut *tx)
            .await?;
            rows.push(row);
        }

        tx.commit().await?;
        Ok(rows)
    }

    /// Task parameters in display order, as declared in the catalog.
    pub async fn list_task_parameters(&self, task_name: &str) -> StoreResult<Vec<TaskParameterRow>> {
        let rows = sqlx::query_as::<_, TaskParameterRow>(
            r#"
            SELECT task_name, parameter_name, required, default_value, position
            FROM task_parameters
            WHERE task_name = $1
            ORDER BY position
            "#,
        )
        .bind(task_name)
        .fetch_all(self.pool())
        .await?;

        Ok(rows)
    }

    /// Batched variant of [`Database::list_task_parameters`] for many tasks
    /// at once, keyed by `task_name` on the caller's side.
    pub async fn list_task_parameters_for(
        &self,
        task_names: &[String],
    ) -> StoreResult<Vec<TaskParameterRow>> {
        let rows = sqlx::query_as::<_, TaskParameterRow>(
            r#"
            SELECT task_name, parameter_name, required, default_value, position
            FROM task_parameters
            WHERE task_name = ANY($1)
            ORDER BY task_name, position
            "#,
        )
        .bind(task_names)
        .fetch_all(self.pool())
        .await?;

        Ok(rows)
    }

    // ============================================
    // Execution methods
    // ============================================

    pub async fn create_execution_method(
        &self,
        input: CreateExecutionMethodRow,
    ) -> StoreResult<ExecutionMethodRow> {
        if self
            .get_execution_method(&input.internal_execution_method)
            .await?
            .is_some()
        {
            return Err(StoreError::Conflict {
                entity: "execution_method",
                key: input.internal_execution_method,
            });
        }

        let row = sqlx::query_as::<_, ExecutionMethodRow>(
            r#"
            INSERT INTO execution_methods (name, internal_execution_method, description)
            VALUES ($1, $2, $3)
            RETURNING name, internal_execution_method, description
            "#,
        )
        .bind(&input.name)
        .bind(&input.internal_execution_method)
        .bind(&input.description)
        .fetch_one(self.pool())
        .await?;

        Ok(row)
    }

    pub async fn get_execution_method(
        &self,
        internal_execution_method: &str,
    ) -> StoreResult<Option<ExecutionMethodRow>> {
        let row = sqlx::query_as::<_, ExecutionMethodRow>(
            "SELECT name, internal_execution_method, description FROM execution_methods WHERE internal_execution_method = $1",
        )
        .bind(internal_execution_method)
        .fetch_optional(self.pool())
        .await?;

        Ok(row)
    }

    pub async fn list_execution_methods(&self) -> StoreResult<Vec<ExecutionMethodRow>> {
        let rows = sqlx::query_as::<_, ExecutionMethodRow>(
            "SELECT name, internal_execution_method, description FROM execution_methods ORDER BY name",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(rows)
    }
}
