//! Workflow trigger API handlers

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::pagination::{Paginated, PaginationQuery};
use crate::services::workflow::WorkflowTriggerPayload;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use docora_core::models::{DocumentSource, WorkflowTrigger, WorkflowTriggerType};
use docora_core::AppError;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct WorkflowTriggerResponse {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub trigger_type: WorkflowTriggerType,
    pub sources: Vec<DocumentSource>,
    pub filter_filename: Option<String>,
    pub filter_path: Option<String>,
    pub filter_mailrule: Option<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<WorkflowTrigger> for WorkflowTriggerResponse {
    fn from(t: WorkflowTrigger) -> Self {
        WorkflowTriggerResponse {
            id: t.id,
            trigger_type: t.trigger_type,
            sources: t.sources,
            filter_filename: t.filter_filename,
            filter_path: t.filter_path,
            filter_mailrule: t.filter_mailrule,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/workflow_triggers/",
    tag = "workflow_triggers",
    request_body = WorkflowTriggerPayload,
    responses(
        (status = 201, description = "Trigger created", body = WorkflowTriggerResponse),
        (status = 400, description = "Invalid trigger", body = ErrorResponse),
    )
)]
pub async fn create_workflow_trigger(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<WorkflowTriggerPayload>,
) -> Result<impl IntoResponse, HttpAppError> {
    let trigger = state
        .workflows
        .workflow_service
        .create_trigger(&payload)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(WorkflowTriggerResponse::from(trigger)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/workflow_triggers/",
    tag = "workflow_triggers",
    params(PaginationQuery),
    responses(
        (status = 200, description = "List of triggers", body = Paginated<WorkflowTriggerResponse>),
    )
)]
pub async fn list_workflow_triggers(
    State(state): State<Arc<AppState>>,
    Query(q): Query<PaginationQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let (count, rows) = state
        .workflows
        .workflow_service
        .list_triggers(q.limit(), q.offset())
        .await?;
    Ok(Json(Paginated::new(
        count,
        rows.into_iter()
            .map(WorkflowTriggerResponse::from)
            .collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/workflow_triggers/{id}/",
    tag = "workflow_triggers",
    params(("id" = Uuid, Path, description = "Trigger ID")),
    responses(
        (status = 200, description = "Trigger", body = WorkflowTriggerResponse),
        (status = 404, description = "Not found", body = ErrorResponse),
    )
)]
pub async fn get_workflow_trigger(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let trigger = state
        .workflows
        .workflow_service
        .get_trigger(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Workflow trigger not found".into()))?;
    Ok(Json(WorkflowTriggerResponse::from(trigger)))
}

#[utoipa::path(
    put,
    path = "/api/workflow_triggers/{id}/",
    tag = "workflow_triggers",
    params(("id" = Uuid, Path, description = "Trigger ID")),
    request_body = WorkflowTriggerPayload,
    responses(
        (status = 200, description = "Trigger updated", body = WorkflowTriggerResponse),
        (status = 400, description = "Invalid trigger", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse),
    )
)]
pub async fn update_workflow_trigger(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<WorkflowTriggerPayload>,
) -> Result<impl IntoResponse, HttpAppError> {
    let trigger = state
        .workflows
        .workflow_service
        .update_trigger(id, &payload)
        .await?
        .ok_or_else(|| AppError::NotFound("Workflow trigger not found".into()))?;
    Ok(Json(WorkflowTriggerResponse::from(trigger)))
}

#[utoipa::path(
    delete,
    path = "/api/workflow_triggers/{id}/",
    tag = "workflow_triggers",
    params(("id" = Uuid, Path, description = "Trigger ID")),
    responses(
        (status = 204, description = "Trigger deleted"),
        (status = 404, description = "Not found", body = ErrorResponse),
    )
)]
pub async fn delete_workflow_trigger(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let deleted = state.workflows.workflow_service.delete_trigger(id).await?;
    if !deleted {
        return Err(AppError::NotFound("Workflow trigger not found".into()).into());
    }
    Ok(StatusCode::NO_CONTENT)
}
