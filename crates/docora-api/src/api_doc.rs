//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use crate::pagination;
use crate::services;
use docora_core::models;

/// Returns the OpenAPI spec served at /api/openapi.json.
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Docora API",
        version = "0.1.0",
        description = "Document workflow API: CRUD over workflows, workflow triggers, and workflow actions. Consumption triggers are validated and normalized on create and update."
    ),
    paths(
        // Workflows
        handlers::workflows::create_workflow,
        handlers::workflows::list_workflows,
        handlers::workflows::get_workflow,
        handlers::workflows::update_workflow,
        handlers::workflows::delete_workflow,
        // Triggers
        handlers::workflow_triggers::create_workflow_trigger,
        handlers::workflow_triggers::list_workflow_triggers,
        handlers::workflow_triggers::get_workflow_trigger,
        handlers::workflow_triggers::update_workflow_trigger,
        handlers::workflow_triggers::delete_workflow_trigger,
        // Actions
        handlers::workflow_actions::create_workflow_action,
        handlers::workflow_actions::list_workflow_actions,
        handlers::workflow_actions::get_workflow_action,
        handlers::workflow_actions::update_workflow_action,
        handlers::workflow_actions::delete_workflow_action,
    ),
    components(schemas(
        models::DocumentSource,
        models::WorkflowTriggerType,
        services::workflow::WorkflowPayload,
        services::workflow::WorkflowTriggerPayload,
        services::workflow::WorkflowActionPayload,
        handlers::workflows::WorkflowResponse,
        handlers::workflow_triggers::WorkflowTriggerResponse,
        handlers::workflow_actions::WorkflowActionResponse,
        pagination::Paginated<handlers::workflows::WorkflowResponse>,
        pagination::Paginated<handlers::workflow_triggers::WorkflowTriggerResponse>,
        pagination::Paginated<handlers::workflow_actions::WorkflowActionResponse>,
        error::ErrorResponse,
    )),
    tags(
        (name = "workflows", description = "Workflow management"),
        (name = "workflow_triggers", description = "Workflow trigger management"),
        (name = "workflow_actions", description = "Workflow action management"),
    )
)]
struct ApiDoc;
