//! Workflow action API handlers

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::pagination::{Paginated, PaginationQuery};
use crate::services::workflow::WorkflowActionPayload;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use docora_core::models::WorkflowAction;
use docora_core::AppError;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct WorkflowActionResponse {
    pub id: Uuid,
    pub assign_title: Option<String>,
    pub assign_correspondent: Option<Uuid>,
    pub assign_document_type: Option<Uuid>,
    pub assign_storage_path: Option<Uuid>,
    pub assign_owner: Option<Uuid>,
    pub assign_tags: Vec<Uuid>,
    pub assign_view_users: Vec<Uuid>,
    pub assign_view_groups: Vec<Uuid>,
    pub assign_change_users: Vec<Uuid>,
    pub assign_change_groups: Vec<Uuid>,
    pub assign_custom_fields: Vec<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<WorkflowAction> for WorkflowActionResponse {
    fn from(a: WorkflowAction) -> Self {
        WorkflowActionResponse {
            id: a.id,
            assign_title: a.assign_title,
            assign_correspondent: a.assign_correspondent,
            assign_document_type: a.assign_document_type,
            assign_storage_path: a.assign_storage_path,
            assign_owner: a.assign_owner,
            assign_tags: a.assign_tags,
            assign_view_users: a.assign_view_users,
            assign_view_groups: a.assign_view_groups,
            assign_change_users: a.assign_change_users,
            assign_change_groups: a.assign_change_groups,
            assign_custom_fields: a.assign_custom_fields,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/workflow_actions/",
    tag = "workflow_actions",
    request_body = WorkflowActionPayload,
    responses(
        (status = 201, description = "Action created", body = WorkflowActionResponse),
        (status = 400, description = "Invalid action", body = ErrorResponse),
    )
)]
pub async fn create_workflow_action(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<WorkflowActionPayload>,
) -> Result<impl IntoResponse, HttpAppError> {
    let action = state
        .workflows
        .workflow_service
        .create_action(&payload)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(WorkflowActionResponse::from(action)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/workflow_actions/",
    tag = "workflow_actions",
    params(PaginationQuery),
    responses(
        (status = 200, description = "List of actions", body = Paginated<WorkflowActionResponse>),
    )
)]
pub async fn list_workflow_actions(
    State(state): State<Arc<AppState>>,
    Query(q): Query<PaginationQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let (count, rows) = state
        .workflows
        .workflow_service
        .list_actions(q.limit(), q.offset())
        .await?;
    Ok(Json(Paginated::new(
        count,
        rows.into_iter().map(WorkflowActionResponse::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/workflow_actions/{id}/",
    tag = "workflow_actions",
    params(("id" = Uuid, Path, description = "Action ID")),
    responses(
        (status = 200, description = "Action", body = WorkflowActionResponse),
        (status = 404, description = "Not found", body = ErrorResponse),
    )
)]
pub async fn get_workflow_action(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let action = state
        .workflows
        .workflow_service
        .get_action(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Workflow action not found".into()))?;
    Ok(Json(WorkflowActionResponse::from(action)))
}

#[utoipa::path(
    put,
    path = "/api/workflow_actions/{id}/",
    tag = "workflow_actions",
    params(("id" = Uuid, Path, description = "Action ID")),
    request_body = WorkflowActionPayload,
    responses(
        (status = 200, description = "Action updated", body = WorkflowActionResponse),
        (status = 400, description = "Invalid action", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse),
    )
)]
pub async fn update_workflow_action(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<WorkflowActionPayload>,
) -> Result<impl IntoResponse, HttpAppError> {
    let action = state
        .workflows
        .workflow_service
        .update_action(id, &payload)
        .await?
        .ok_or_else(|| AppError::NotFound("Workflow action not found".into()))?;
    Ok(Json(WorkflowActionResponse::from(action)))
}

#[utoipa::path(
    delete,
    path = "/api/workflow_actions/{id}/",
    tag = "workflow_actions",
    params(("id" = Uuid, Path, description = "Action ID")),
    responses(
        (status = 204, description = "Action deleted"),
        (status = 404, description = "Not found", body = ErrorResponse),
    )
)]
pub async fn delete_workflow_action(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let deleted = state.workflows.workflow_service.delete_action(id).await?;
    if !deleted {
        return Err(AppError::NotFound("Workflow action not found".into()).into());
    }
    Ok(StatusCode::NO_CONTENT)
}
