//! Workflow API handlers
//!
//! Workflow bodies carry nested trigger/action objects; resolution (create
//! new rows or update referenced ones) happens in the workflow service.

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::handlers::workflow_actions::WorkflowActionResponse;
use crate::handlers::workflow_triggers::WorkflowTriggerResponse;
use crate::pagination::{Paginated, PaginationQuery};
use crate::services::workflow::{WorkflowDetail, WorkflowPayload};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use docora_core::AppError;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct WorkflowResponse {
    pub id: Uuid,
    pub name: String,
    pub order: i32,
    pub enabled: bool,
    pub triggers: Vec<WorkflowTriggerResponse>,
    pub actions: Vec<WorkflowActionResponse>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<WorkflowDetail> for WorkflowResponse {
    fn from(d: WorkflowDetail) -> Self {
        WorkflowResponse {
            id: d.workflow.id,
            name: d.workflow.name,
            order: d.workflow.sort_order,
            enabled: d.workflow.enabled,
            triggers: d
                .triggers
                .into_iter()
                .map(WorkflowTriggerResponse::from)
                .collect(),
            actions: d
                .actions
                .into_iter()
                .map(WorkflowActionResponse::from)
                .collect(),
            created_at: d.workflow.created_at,
            updated_at: d.workflow.updated_at,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/workflows/",
    tag = "workflows",
    request_body = WorkflowPayload,
    responses(
        (status = 201, description = "Workflow created", body = WorkflowResponse),
        (status = 400, description = "Invalid workflow", body = ErrorResponse),
    )
)]
pub async fn create_workflow(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<WorkflowPayload>,
) -> Result<impl IntoResponse, HttpAppError> {
    let detail = state
        .workflows
        .workflow_service
        .create_workflow(&payload)
        .await?;
    Ok((StatusCode::CREATED, Json(WorkflowResponse::from(detail))))
}

#[utoipa::path(
    get,
    path = "/api/workflows/",
    tag = "workflows",
    params(PaginationQuery),
    responses(
        (status = 200, description = "List of workflows", body = Paginated<WorkflowResponse>),
    )
)]
pub async fn list_workflows(
    State(state): State<Arc<AppState>>,
    Query(q): Query<PaginationQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let (count, details) = state
        .workflows
        .workflow_service
        .list_workflows(q.limit(), q.offset())
        .await?;
    Ok(Json(Paginated::new(
        count,
        details.into_iter().map(WorkflowResponse::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/workflows/{id}/",
    tag = "workflows",
    params(("id" = Uuid, Path, description = "Workflow ID")),
    responses(
        (status = 200, description = "Workflow", body = WorkflowResponse),
        (status = 404, description = "Not found", body = ErrorResponse),
    )
)]
pub async fn get_workflow(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let detail = state
        .workflows
        .workflow_service
        .get_workflow(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Workflow not found".into()))?;
    Ok(Json(WorkflowResponse::from(detail)))
}

#[utoipa::path(
    put,
    path = "/api/workflows/{id}/",
    tag = "workflows",
    params(("id" = Uuid, Path, description = "Workflow ID")),
    request_body = WorkflowPayload,
    responses(
        (status = 200, description = "Workflow updated", body = WorkflowResponse),
        (status = 400, description = "Invalid workflow", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse),
    )
)]
pub async fn update_workflow(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<WorkflowPayload>,
) -> Result<impl IntoResponse, HttpAppError> {
    let detail = state
        .workflows
        .workflow_service
        .update_workflow(id, &payload)
        .await?
        .ok_or_else(|| AppError::NotFound("Workflow not found".into()))?;
    Ok(Json(WorkflowResponse::from(detail)))
}

#[utoipa::path(
    delete,
    path = "/api/workflows/{id}/",
    tag = "workflows",
    params(("id" = Uuid, Path, description = "Workflow ID")),
    responses(
        (status = 204, description = "Workflow deleted"),
        (status = 404, description = "Not found", body = ErrorResponse),
    )
)]
pub async fn delete_workflow(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let deleted = state.workflows.workflow_service.delete_workflow(id).await?;
    if !deleted {
        return Err(AppError::NotFound("Workflow not found".into()).into());
    }
    Ok(StatusCode::NO_CONTENT)
}
