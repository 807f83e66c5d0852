// Workflow (process) repository: C4 Workflow Repository

use crate::db::Database;
use crate::error::{StoreError, StoreResult};
use crate::models::{CreateWorkflowRow, UpdateWorkflowRow, WorkflowRow};

impl Database {
    pub async fn create_workflow(&self, input: CreateWorkflowRow) -> StoreResult<WorkflowRow> {
        let existing = self.get_workflow_by_name(&input.process_name).await?;
        if existing.is_some() {
            return Err(StoreError::Conflict {
                entity: "workflow",
                key: input.process_name,
            });
        }

        let structure_json = serde_json::to_value(&input.structure)?;

        let row = sqlx::query_as::<_, WorkflowRow>(
            r#"
            INSERT INTO workflows (process_name, description, structure)
            VALUES ($1, $2, $3)
            RETURNING process_id, process_name, description, structure, cancelled, created_at, updated_at
            "#,
        )
        .bind(&input.process_name)
        .bind(&input.description)
        .bind(&structure_json)
        .fetch_one(self.pool())
        .await?;

        Ok(row)
    }

    pub async fn get_workflow(&self, process_id: i64) -> StoreResult<Option<WorkflowRow>> {
        let row = sqlx::query_as::<_, WorkflowRow>(
            r#"
            SELECT process_id, process_name, description, structure, cancelled, created_at, updated_at
            FROM workflows
            WHERE process_id = $1
            "#,
        )
        .bind(process_id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row)
    }

    pub async fn get_workflow_by_name(&self, process_name: &str) -> StoreResult<Option<WorkflowRow>> {
        let row = sqlx::query_as::<_, WorkflowRow>(
            r#"
            SELECT process_id, process_name, description, structure, cancelled, created_at, updated_at
            FROM workflows
            WHERE process_name = $1
            "#,
        )
        .bind(process_name)
        .fetch_optional(self.pool())
        .await?;

        Ok(row)
    }

    /// Lists workflows, optionally filtered by `process_id` or a
    /// case-insensitive exact match on `process_name`.
    pub async fn list_workflows(
        &self,
        process_id: Option<i64>,
        process_name: Option<&str>,
    ) -> StoreResult<Vec<WorkflowRow>> {
        let rows = sqlx::query_as::<_, WorkflowRow>(
            r#"
            SELECT process_id, process_name, description, structure, cancelled, created_at, updated_at
            FROM workflows
            WHERE ($1::BIGINT IS NULL OR process_id = $1)
              AND ($2::TEXT IS NULL OR LOWER(process_name) = LOWER($2))
            ORDER BY process_id
            "#,
        )
        .bind(process_id)
        .bind(process_name)
        .fetch_all(self.pool())
        .await?;

        Ok(rows)
    }

    pub async fn update_workflow(
        &self,
        process_id: i64,
        input: UpdateWorkflowRow,
    ) -> StoreResult<Option<WorkflowRow>> {
        if let Some(ref name) = input.process_name {
            if let Some(other) = self.get_workflow_by_name(name).await? {
                if other.process_id != process_id {
                    return Err(StoreError::Conflict {
                        entity: "workflow",
                        key: name.clone(),
                    });
                }
            }
        }

        let structure_json = input
            .structure
            .as_ref()
            .map(serde_json::to_value)
            .transpose()?;

        let row = sqlx::query_as::<_, WorkflowRow>(
            r#"
            UPDATE workflows
            SET
                process_name = COALESCE($2, process_name),
                description = COALESCE($3, description),
                structure = COALESCE($4, structure),
                updated_at = NOW()
            WHERE process_id = $1
            RETURNING process_id, process_name, description, structure, cancelled, created_at, updated_at
            "#,
        )
        .bind(process_id)
        .bind(&input.process_name)
        .bind(&input.description)
        .bind(&structure_json)
        .fetch_optional(self.pool())
        .await?;

        Ok(row)
    }

    pub async fn delete_workflow(&self, process_id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM workflows WHERE process_id = $1")
            .bind(process_id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
