//! Node type catalog CRUD.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use workflow_contracts::{CreateNodeType, NodeType, UpdateNodeType};
use workflow_storage::models::{CreateNodeTypeRow, UpdateNodeTypeRow};

use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/node_types", get(list_node_types).post(create_node_type))
        .route(
            "/node_types/:shape_name",
            get(get_node_type).put(update_node_type).delete(delete_node_type),
        )
}

fn to_contract(row: workflow_storage::models::NodeTypeRow) -> Result<NodeType, ApiError> {
    Ok(NodeType {
        shape_name: row.shape_name,
        behavior: row.behavior.parse().map_err(ApiError::Validation)?,
        display_name: row.display_name,
        requires_step_function: row.requires_step_function,
        description: row.description,
        icon: row.icon,
    })
}

#[utoipa::path(get, path = "/node_types", responses((status = 200, body = [NodeType])))]
pub(crate) async fn list_node_types(State(state): State<AppState>) -> Result<Json<Vec<NodeType>>, ApiError> {
    let rows = state.db.list_node_types().await?;
    Ok(Json(rows.into_iter().map(to_contract).collect::<Result<_, _>>()?))
}

#[utoipa::path(post, path = "/node_types", request_body = CreateNodeType, responses((status = 201, body = NodeType)))]
pub(crate) async fn create_node_type(
    State(state): State<AppState>,
    Json(input): Json<CreateNodeType>,
) -> Result<(StatusCode, Json<NodeType>), ApiError> {
    let row = state
        .db
        .create_node_type(CreateNodeTypeRow {
            shape_name: input.shape_name,
            behavior: input.behavior.to_string(),
            display_name: input.display_name,
            requires_step_function: input.requires_step_function,
            description: input.description,
            icon: input.icon,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(to_contract(row)?)))
}

async fn get_node_type(
    State(state): State<AppState>,
    Path(shape_name): Path<String>,
) -> Result<Json<NodeType>, ApiError> {
    let row = state
        .db
        .get_node_type(&shape_name)
        .await?
        .ok_or(ApiError::NotFound {
            entity: "node_type",
            key: shape_name,
        })?;
    Ok(Json(to_contract(row)?))
}

async fn update_node_type(
    State(state): State<AppState>,
    Path(shape_name): Path<String>,
    Json(input): Json<UpdateNodeType>,
) -> Result<Json<NodeType>, ApiError> {
    let row = state
        .db
        .update_node_type(
            &shape_name,
            UpdateNodeTypeRow {
                shape_name: input.shape_name,
                behavior: input.behavior.map(|b| b.to_string()),
                display_name: input.display_name,
                requires_step_function: input.requires_step_function,
                description: input.description,
                icon: input.icon,
            },
        )
        .await?
        .ok_or(ApiError::NotFound {
            entity: "node_type",
            key: shape_name,
        })?;
    Ok(Json(to_contract(row)?))
}

async fn delete_node_type(
    State(state): State<AppState>,
    Path(shape_name): Path<String>,
) -> Result<StatusCode, ApiError> {
    let deleted = state.db.delete_node_type(&shape_name).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound {
            entity: "node_type",
            key: shape_name,
        })
    }
}
