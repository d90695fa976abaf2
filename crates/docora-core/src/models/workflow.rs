//! Workflow models: triggers, actions, and the workflows that bind them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Origin of a consumed document (matches database enum)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, Serialize, Deserialize, ToSchema,
)]
#[sqlx(type_name = "document_source", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DocumentSource {
    ConsumeFolder,
    ApiUpload,
    MailFetch,
}

impl DocumentSource {
    /// Every origin a trigger can match. Used when a request omits `sources`.
    pub fn all() -> Vec<DocumentSource> {
        vec![
            DocumentSource::ConsumeFolder,
            DocumentSource::ApiUpload,
            DocumentSource::MailFetch,
        ]
    }
}

/// Event a workflow trigger fires on (matches database enum)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize, ToSchema,
)]
#[sqlx(type_name = "workflow_trigger_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WorkflowTriggerType {
    /// Fires while a document is being consumed. Requires at least one
    /// filename/path/mailrule filter.
    Consumption,
    DocumentAdded,
    DocumentUpdated,
}

/// Workflow trigger (database row)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkflowTrigger {
    pub id: Uuid,
    pub trigger_type: WorkflowTriggerType,
    pub sources: Vec<DocumentSource>,
    pub filter_filename: Option<String>,
    pub filter_path: Option<String>,
    pub filter_mailrule: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Workflow action (database row): field assignments applied to a matched document
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkflowAction {
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Workflow definition (database row). `trigger_ids` and `action_ids` hold the
/// owned triggers/actions in evaluation order.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Workflow {
    pub id: Uuid,
    pub name: String,
    pub sort_order: i32,
    pub enabled: bool,
    pub trigger_ids: Vec<Uuid>,
    pub action_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated, normalized trigger fields ready to persist. Produced by the
/// validator; consumed by the repository for both create and full update.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWorkflowTrigger {
    pub trigger_type: WorkflowTriggerType,
    pub sources: Vec<DocumentSource>,
    pub filter_filename: Option<String>,
    pub filter_path: Option<String>,
    pub filter_mailrule: Option<Uuid>,
}

/// Validated, normalized action fields ready to persist.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewWorkflowAction {
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
}

/// Workflow fields ready to persist, with owned trigger/action ids resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWorkflow {
    pub name: String,
    pub sort_order: i32,
    pub enabled: bool,
    pub trigger_ids: Vec<Uuid>,
    pub action_ids: Vec<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_source_serializes_snake_case() {
        let json = serde_json::to_value(DocumentSource::MailFetch).unwrap();
        assert_eq!(json, serde_json::json!("mail_fetch"));
        let parsed: DocumentSource = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, DocumentSource::MailFetch);
    }

    #[test]
    fn test_all_sources_covers_every_variant() {
        let all = DocumentSource::all();
        assert_eq!(all.len(), 3);
        assert!(all.contains(&DocumentSource::ConsumeFolder));
        assert!(all.contains(&DocumentSource::ApiUpload));
        assert!(all.contains(&DocumentSource::MailFetch));
    }

    #[test]
    fn test_trigger_type_round_trip() {
        let json = serde_json::to_value(WorkflowTriggerType::Consumption).unwrap();
        assert_eq!(json, serde_json::json!("consumption"));
        let parsed: WorkflowTriggerType = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, WorkflowTriggerType::Consumption);
    }
}
