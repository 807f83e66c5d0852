// Execution and execution-step repository, backing C5 traversal and C8 streaming

use crate::db::Database;
use crate::error::StoreResult;
use crate::models::{
    CreateExecutionRow, CreateExecutionStepRow, ExecutionRow, ExecutionStepRow, UpdateExecutionRow,
    UpdateExecutionStepRow,
};

impl Database {
    pub async fn create_execution(&self, input: CreateExecutionRow) -> StoreResult<ExecutionRow> {
        let row = sqlx::query_as::<_, ExecutionRow>(
            r#"
            INSERT INTO executions (process_id, status, context)
            VALUES ($1, 'RUNNING', $2)
            RETURNING execution_id, process_id, status, context, started_at, finished_at, error
            "#,
        )
        .bind(input.process_id)
        .bind(&input.context)
        .fetch_one(self.pool())
        .await?;

        Ok(row)
    }

    pub async fn get_execution(&self, execution_id: uuid::Uuid) -> StoreResult<Option<ExecutionRow>> {
        let row = sqlx::query_as::<_, ExecutionRow>(
            r#"
            SELECT execution_id, process_id, status, context, started_at, finished_at, error
            FROM executions
            WHERE execution_id = $1
            "#,
        )
        .bind(execution_id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row)
    }

    pub async fn list_executions(&self, process_id: Option<i64>) -> StoreResult<Vec<ExecutionRow>> {
        let rows = sqlx::query_as::<_, ExecutionRow>(
            r#"
            SELECT execution_id, process_id, status, context, started_at, finished_at, error
            FROM executions
            WHERE ($1::BIGINT IS NULL OR process_id = $1)
            ORDER BY started_at DESC
            "#,
        )
        .bind(process_id)
        .fetch_all(self.pool())
        .await?;

        Ok(rows)
    }

    pub async fn update_execution(
        &self,
        execution_id: uuid::Uuid,
        input: UpdateExecutionRow,
    ) -> StoreResult<Option<ExecutionRow>> {
        let row = sqlx::query_as::<_, ExecutionRow>(
            r#"
            UPDATE executions
            SET
                status = COALESCE($2, status),
                context = COALESCE($3, context),
                finished_at = COALESCE($4, finished_at),
                error = COALESCE($5, error)
            WHERE execution_id = $1
            RETURNING execution_id, process_id, status, context, started_at, finished_at, error
            "#,
        )
        .bind(execution_id)
        .bind(&input.status)
        .bind(&input.context)
        .bind(input.finished_at)
        .bind(&input.error)
        .fetch_optional(self.pool())
        .await?;

        Ok(row)
    }

    // ============================================
    // Execution steps
    // ============================================

    pub async fn create_execution_step(
        &self,
        input: CreateExecutionStepRow,
    ) -> StoreResult<ExecutionStepRow> {
        let row = sqlx::query_as::<_, ExecutionStepRow>(
            r#"
            INSERT INTO execution_steps (execution_id, node_id, task_name, status, sequence, input, output)
            VALUES ($1, $2, $3, 'RUNNING', $4, $5, '{}'::JSONB)
            RETURNING step_id, execution_id, node_id, task_name, status, sequence, input, output, error, started_at, finished_at
            "#,
        )
        .bind(input.execution_id)
        .bind(&input.node_id)
        .bind(&input.task_name)
        .bind(input.sequence)
        .bind(&input.input)
        .fetch_one(self.pool())
        .await?;

        Ok(row)
    }

    pub async fn update_execution_step(
        &self,
        step_id: uuid::Uuid,
        input: UpdateExecutionStepRow,
    ) -> StoreResult<Option<ExecutionStepRow>> {
        let row = sqlx::query_as::<_, ExecutionStepRow>(
            r#"
            UPDATE execution_steps
            SET
                status = COALESCE($2, status),
                output = COALESCE($3, output),
                error = COALESCE($4, error),
                finished_at = COALESCE($5, finished_at)
            WHERE step_id = $1
            RETURNING step_id, execution_id, node_id, task_name, status, sequence, input, output, error, started_at, finished_at
            "#,
        )
        .bind(step_id)
        .bind(&input.status)
        .bind(&input.output)
        .bind(&input.error)
        .bind(input.finished_at)
        .fetch_optional(self.pool())
        .await?;

        Ok(row)
    }

    /// Steps for an execution, in traversal order. Used both by the
    /// history endpoint and the C8 SSE poller (which diffs against the
    /// previously seen statuses).
    pub async fn list_execution_steps(
        &self,
        execution_id: uuid::Uuid,
    ) -> StoreResult<Vec<ExecutionStepRow>> {
        let rows = sqlx::query_as::<_, ExecutionStepRow>(
            r#"
            SELECT step_id, execution_id, node_id, task_name, status, sequence, input, output, error, started_at, finished_at
            FROM execution_steps
            WHERE execution_id = $1
            ORDER BY sequence
            "#,
        )
        .bind(execution_id)
        .fetch_all(self.pool())
        .await?;

        Ok(rows)
    }
}
