// Node type catalog repository (used by the graph editor and C5 traversal)

use crate::db::Database;
use crate::error::{StoreError, StoreResult};
use crate::models::{CreateNodeTypeRow, NodeTypeRow, UpdateNodeTypeRow};

impl Database {
    pub async fn create_node_type(&self, input: CreateNodeTypeRow) -> StoreResult<NodeTypeRow> {
        if self.get_node_type(&input.shape_name).await?.is_some() {
            return Err(StoreError::Conflict {
                entity: "node_type",
                key: input.shape_name,
            });
        }

        let row = sqlx::query_as::<_, NodeTypeRow>(
            r#"
            INSERT INTO node_types (shape_name, behavior, display_name, requires_step_function, description, icon)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING shape_name, behavior, display_name, requires_step_function, description, icon
            "#,
        )
        .bind(&input.shape_name)
        .bind(&input.behavior)
        .bind(&input.display_name)
        .bind(input.requires_step_function)
        .bind(&input.description)
        .bind(&input.icon)
        .fetch_one(self.pool())
        .await?;

        Ok(row)
    }

    pub async fn get_node_type(&self, shape_name: &str) -> StoreResult<Option<NodeTypeRow>> {
        let row = sqlx::query_as::<_, NodeTypeRow>(
            "SELECT shape_name, behavior, display_name, requires_step_function, description, icon FROM node_types WHERE shape_name = $1",
        )
        .bind(shape_name)
        .fetch_optional(self.pool())
        .await?;

        Ok(row)
    }

    pub async fn list_node_types(&self) -> StoreResult<Vec<NodeTypeRow>> {
        let rows = sqlx::query_as::<_, NodeTypeRow>(
            "SELECT shape_name, behavior, display_name, requires_step_function, description, icon FROM node_types ORDER BY shape_name",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(rows)
    }

    /// Renames and/or updates a node type. A rename that collides with an
    /// existing shape is rejected, matching the catalog's uniqueness rule.
    pub async fn update_node_type(
        &self,
        shape_name: &str,
        input: UpdateNodeTypeRow,
    ) -> StoreResult<Option<NodeTypeRow>> {
        if let Some(ref new_name) = input.shape_name {
            if new_name != shape_name && self.get_node_type(new_name).await?.is_some() {
                return Err(StoreError::Conflict {
                    entity: "node_type",
                    key: new_name.clone(),
                });
            }
        }

        let row = sqlx::query_as::<_, NodeTypeRow>(
            r#"
            UPDATE node_types
            SET
                shape_name = COALESCE($2, shape_name),
                behavior = COALESCE($3, behavior),
                display_name = COALESCE($4, display_name),
                requires_step_function = COALESCE($5, requires_step_function),
                description = COALESCE($6, description),
                icon = COALESCE($7, icon)
            WHERE shape_name = $1
            RETURNING shape_name, behavior, display_name, requires_step_function, description, icon
            "#,
        )
        .bind(shape_name)
        .bind(&input.shape_name)
        .bind(&input.behavior)
        .bind(&input.display_name)
        .bind(input.requires_step_function)
        .bind(&input.description)
        .bind(&input.icon)
        .fetch_optional(self.pool())
        .await?;

        Ok(row)
    }

    pub async fn delete_node_type(&self, shape_name: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM node_types WHERE shape_name = $1")
            .bind(shape_name)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
