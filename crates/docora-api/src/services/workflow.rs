//! Workflow service: validation, normalization, and CRUD for workflows,
//! triggers, and actions.
//!
//! Trigger and action payloads pass through `normalize_*` before anything is
//! persisted: empty-string filters collapse to NULL, omitted sources default
//! to every source, and a mail rule filter forces the mail-fetch source.
//! Consumption triggers must end up with at least one filter or the request
//! is rejected with a 400 and nothing is written.

use std::collections::HashSet;

use docora_core::models::{
    DocumentSource, NewWorkflow, NewWorkflowAction, NewWorkflowTrigger, Workflow, WorkflowAction,
    WorkflowTrigger, WorkflowTriggerType,
};
use docora_core::AppError;
use docora_db::{
    ReferenceRepository, WorkflowActionRepository, WorkflowRepository, WorkflowTriggerRepository,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

const MAX_WORKFLOW_NAME_LEN: usize = 255;

/// Incoming trigger fields, standalone or nested in a workflow body.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct WorkflowTriggerPayload {
    /// Only meaningful nested in a workflow body: references an existing
    /// trigger, which is updated with the remaining fields. Ignored on
    /// standalone create.
    pub id: Option<Uuid>,
    #[serde(rename = "type")]
    pub trigger_type: WorkflowTriggerType,
    /// Omitted means "match every source". An explicit empty list is kept.
    pub sources: Option<Vec<DocumentSource>>,
    pub filter_filename: Option<String>,
    pub filter_path: Option<String>,
    pub filter_mailrule: Option<Uuid>,
}

/// Incoming action fields, standalone or nested in a workflow body.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct WorkflowActionPayload {
    /// See [`WorkflowTriggerPayload::id`].
    pub id: Option<Uuid>,
    pub assign_title: Option<String>,
    pub assign_correspondent: Option<Uuid>,
    pub assign_document_type: Option<Uuid>,
    pub assign_storage_path: Option<Uuid>,
    pub assign_owner: Option<Uuid>,
    #[serde(default)]
    pub assign_tags: Vec<Uuid>,
    #[serde(default)]
    pub assign_view_users: Vec<Uuid>,
    #[serde(default)]
    pub assign_view_groups: Vec<Uuid>,
    #[serde(default)]
    pub assign_change_users: Vec<Uuid>,
    #[serde(default)]
    pub assign_change_groups: Vec<Uuid>,
    #[serde(default)]
    pub assign_custom_fields: Vec<Uuid>,
}

/// Incoming workflow fields with nested triggers and actions.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct WorkflowPayload {
    pub name: String,
    #[serde(default)]
    pub order: i32,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub triggers: Vec<WorkflowTriggerPayload>,
    #[serde(default)]
    pub actions: Vec<WorkflowActionPayload>,
}

fn default_true() -> bool {
    true
}

/// A workflow with its owned triggers and actions resolved, in stored order.
#[derive(Debug, Clone)]
pub struct WorkflowDetail {
    pub workflow: Workflow,
    pub triggers: Vec<WorkflowTrigger>,
    pub actions: Vec<WorkflowAction>,
}

#[derive(Clone)]
pub struct WorkflowService {
    workflow_repo: WorkflowRepository,
    trigger_repo: WorkflowTriggerRepository,
    action_repo: WorkflowActionRepository,
    reference_repo: ReferenceRepository,
}

impl WorkflowService {
    pub fn new(
        workflow_repo: WorkflowRepository,
        trigger_repo: WorkflowTriggerRepository,
        action_repo: WorkflowActionRepository,
        reference_repo: ReferenceRepository,
    ) -> Self {
        Self {
            workflow_repo,
            trigger_repo,
            action_repo,
            reference_repo,
        }
    }

    // ----- Normalization (pure) -----

    /// Empty strings become absent; present values are kept verbatim.
    fn none_if_empty(value: Option<&str>) -> Option<String> {
        match value {
            Some(s) if !s.is_empty() => Some(s.to_string()),
            _ => None,
        }
    }

    /// Drop duplicates while keeping first-occurrence order.
    fn dedup_preserving_order<T: Copy + Eq + std::hash::Hash>(values: &[T]) -> Vec<T> {
        let mut seen = HashSet::new();
        values.iter().copied().filter(|v| seen.insert(*v)).collect()
    }

    /// Normalize and validate trigger fields. Fails if a consumption trigger
    /// ends up with no filename, path, or mail rule filter.
    fn normalize_trigger(payload: &WorkflowTriggerPayload) -> Result<NewWorkflowTrigger, AppError> {
        let filter_filename = Self::none_if_empty(payload.filter_filename.as_deref());
        let filter_path = Self::none_if_empty(payload.filter_path.as_deref());
        let filter_mailrule = payload.filter_mailrule;

        let mut sources = match &payload.sources {
            Some(list) => Self::dedup_preserving_order(list),
            None => DocumentSource::all(),
        };
        // A mail rule filter can only ever match mail-fetched documents.
        if filter_mailrule.is_some() && !sources.contains(&DocumentSource::MailFetch) {
            sources = vec![DocumentSource::MailFetch];
        }

        if payload.trigger_type == WorkflowTriggerType::Consumption
            && filter_filename.is_none()
            && filter_path.is_none()
            && filter_mailrule.is_none()
        {
            return Err(AppError::InvalidInput(
                "Consumption triggers must specify a filename filter, a path filter, or a mail rule filter"
                    .to_string(),
            ));
        }

        Ok(NewWorkflowTrigger {
            trigger_type: payload.trigger_type,
            sources,
            filter_filename,
            filter_path,
            filter_mailrule,
        })
    }

    /// Normalize action fields. Actions have no cross-field invariants.
    fn normalize_action(payload: &WorkflowActionPayload) -> NewWorkflowAction {
        NewWorkflowAction {
            assign_title: Self::none_if_empty(payload.assign_title.as_deref()),
            assign_correspondent: payload.assign_correspondent,
            assign_document_type: payload.assign_document_type,
            assign_storage_path: payload.assign_storage_path,
            assign_owner: payload.assign_owner,
            assign_tags: Self::dedup_preserving_order(&payload.assign_tags),
            assign_view_users: Self::dedup_preserving_order(&payload.assign_view_users),
            assign_view_groups: Self::dedup_preserving_order(&payload.assign_view_groups),
            assign_change_users: Self::dedup_preserving_order(&payload.assign_change_users),
            assign_change_groups: Self::dedup_preserving_order(&payload.assign_change_groups),
            assign_custom_fields: Self::dedup_preserving_order(&payload.assign_custom_fields),
        }
    }

    fn validate_workflow_name(name: &str) -> Result<(), AppError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(AppError::InvalidInput(
                "Workflow name cannot be empty".to_string(),
            ));
        }
        if trimmed.len() > MAX_WORKFLOW_NAME_LEN {
            return Err(AppError::InvalidInput(format!(
                "Workflow name must be at most {} characters",
                MAX_WORKFLOW_NAME_LEN
            )));
        }
        Ok(())
    }

    // ----- Reference checks -----

    async fn check_trigger_references(&self, new: &NewWorkflowTrigger) -> Result<(), AppError> {
        if let Some(id) = new.filter_mailrule {
            if !self.reference_repo.mail_rule_exists(id).await? {
                return Err(AppError::InvalidInput(format!(
                    "filter_mailrule references unknown mail rule {}",
                    id
                )));
            }
        }
        Ok(())
    }

    async fn check_action_references(&self, new: &NewWorkflowAction) -> Result<(), AppError> {
        if let Some(id) = new.assign_correspondent {
            if !self.reference_repo.correspondent_exists(id).await? {
                return Err(AppError::InvalidInput(format!(
                    "assign_correspondent references unknown correspondent {}",
                    id
                )));
            }
        }
        if let Some(id) = new.assign_document_type {
            if !self.reference_repo.document_type_exists(id).await? {
                return Err(AppError::InvalidInput(format!(
                    "assign_document_type references unknown document type {}",
                    id
                )));
            }
        }
        if let Some(id) = new.assign_storage_path {
            if !self.reference_repo.storage_path_exists(id).await? {
                return Err(AppError::InvalidInput(format!(
                    "assign_storage_path references unknown storage path {}",
                    id
                )));
            }
        }
        if let Some(id) = new.assign_owner {
            if !self.reference_repo.user_exists(id).await? {
                return Err(AppError::InvalidInput(format!(
                    "assign_owner references unknown user {}",
                    id
                )));
            }
        }
        if let Some(id) = self.reference_repo.first_missing_tag(&new.assign_tags).await? {
            return Err(AppError::InvalidInput(format!(
                "assign_tags references unknown tag {}",
                id
            )));
        }
        let users: Vec<Uuid> = new
            .assign_view_users
            .iter()
            .chain(new.assign_change_users.iter())
            .copied()
            .collect();
        if let Some(id) = self.reference_repo.first_missing_user(&users).await? {
            return Err(AppError::InvalidInput(format!(
                "permission assignment references unknown user {}",
                id
            )));
        }
        let groups: Vec<Uuid> = new
            .assign_view_groups
            .iter()
            .chain(new.assign_change_groups.iter())
            .copied()
            .collect();
        if let Some(id) = self.reference_repo.first_missing_group(&groups).await? {
            return Err(AppError::InvalidInput(format!(
                "permission assignment references unknown group {}",
                id
            )));
        }
        if let Some(id) = self
            .reference_repo
            .first_missing_custom_field(&new.assign_custom_fields)
            .await?
        {
            return Err(AppError::InvalidInput(format!(
                "assign_custom_fields references unknown custom field {}",
                id
            )));
        }
        Ok(())
    }

    // ----- Trigger CRUD -----

    pub async fn create_trigger(
        &self,
        payload: &WorkflowTriggerPayload,
    ) -> Result<WorkflowTrigger, AppError> {
        let new = Self::normalize_trigger(payload)?;
        self.check_trigger_references(&new).await?;
        Ok(self.trigger_repo.create(&new).await?)
    }

    pub async fn get_trigger(&self, trigger_id: Uuid) -> Result<Option<WorkflowTrigger>, AppError> {
        Ok(self.trigger_repo.get(trigger_id).await?)
    }

    pub async fn list_triggers(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<(i64, Vec<WorkflowTrigger>), AppError> {
        let count = self.trigger_repo.count().await?;
        let rows = self.trigger_repo.list(limit, offset).await?;
        Ok((count, rows))
    }

    /// Full replace; re-runs the same validation/normalization as create.
    pub async fn update_trigger(
        &self,
        trigger_id: Uuid,
        payload: &WorkflowTriggerPayload,
    ) -> Result<Option<WorkflowTrigger>, AppError> {
        let new = Self::normalize_trigger(payload)?;
        self.check_trigger_references(&new).await?;
        Ok(self.trigger_repo.update(trigger_id, &new).await?)
    }

    pub async fn delete_trigger(&self, trigger_id: Uuid) -> Result<bool, AppError> {
        Ok(self.trigger_repo.delete(trigger_id).await?)
    }

    // ----- Action CRUD -----

    pub async fn create_action(
        &self,
        payload: &WorkflowActionPayload,
    ) -> Result<WorkflowAction, AppError> {
        let new = Self::normalize_action(payload);
        self.check_action_references(&new).await?;
        Ok(self.action_repo.create(&new).await?)
    }

    pub async fn get_action(&self, action_id: Uuid) -> Result<Option<WorkflowAction>, AppError> {
        Ok(self.action_repo.get(action_id).await?)
    }

    pub async fn list_actions(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<(i64, Vec<WorkflowAction>), AppError> {
        let count = self.action_repo.count().await?;
        let rows = self.action_repo.list(limit, offset).await?;
        Ok((count, rows))
    }

    pub async fn update_action(
        &self,
        action_id: Uuid,
        payload: &WorkflowActionPayload,
    ) -> Result<Option<WorkflowAction>, AppError> {
        let new = Self::normalize_action(payload);
        self.check_action_references(&new).await?;
        Ok(self.action_repo.update(action_id, &new).await?)
    }

    pub async fn delete_action(&self, action_id: Uuid) -> Result<bool, AppError> {
        Ok(self.action_repo.delete(action_id).await?)
    }

    // ----- Workflow CRUD -----

    async fn load_detail(&self, workflow: Workflow) -> Result<WorkflowDetail, AppError> {
        let triggers = self.trigger_repo.get_many(&workflow.trigger_ids).await?;
        let actions = self.action_repo.get_many(&workflow.action_ids).await?;
        Ok(WorkflowDetail {
            workflow,
            triggers,
            actions,
        })
    }

    /// Persist the nested trigger payloads and return their ids in body
    /// order. Payloads carrying an id update that existing row; the rest are
    /// created. All payloads are validated before anything is written.
    async fn resolve_triggers(
        &self,
        payloads: &[WorkflowTriggerPayload],
    ) -> Result<Vec<Uuid>, AppError> {
        let normalized: Vec<(Option<Uuid>, NewWorkflowTrigger)> = payloads
            .iter()
            .map(|p| Ok((p.id, Self::normalize_trigger(p)?)))
            .collect::<Result<_, AppError>>()?;
        for (existing_id, new) in &normalized {
            if let Some(id) = existing_id {
                if self.trigger_repo.get(*id).await?.is_none() {
                    return Err(AppError::InvalidInput(format!(
                        "triggers references unknown workflow trigger {}",
                        id
                    )));
                }
            }
            self.check_trigger_references(new).await?;
        }

        let mut ids = Vec::with_capacity(normalized.len());
        for (existing_id, new) in &normalized {
            let row = match existing_id {
                Some(id) => self.trigger_repo.update(*id, new).await?.ok_or_else(|| {
                    AppError::InvalidInput(format!(
                        "triggers references unknown workflow trigger {}",
                        id
                    ))
                })?,
                None => self.trigger_repo.create(new).await?,
            };
            ids.push(row.id);
        }
        Ok(ids)
    }

    /// Same as [`Self::resolve_triggers`], for actions.
    async fn resolve_actions(
        &self,
        payloads: &[WorkflowActionPayload],
    ) -> Result<Vec<Uuid>, AppError> {
        let normalized: Vec<(Option<Uuid>, NewWorkflowAction)> = payloads
            .iter()
            .map(|p| (p.id, Self::normalize_action(p)))
            .collect();
        for (existing_id, new) in &normalized {
            if let Some(id) = existing_id {
                if self.action_repo.get(*id).await?.is_none() {
                    return Err(AppError::InvalidInput(format!(
                        "actions references unknown workflow action {}",
                        id
                    )));
                }
            }
            self.check_action_references(new).await?;
        }

        let mut ids = Vec::with_capacity(normalized.len());
        for (existing_id, new) in &normalized {
            let row = match existing_id {
                Some(id) => self.action_repo.update(*id, new).await?.ok_or_else(|| {
                    AppError::InvalidInput(format!(
                        "actions references unknown workflow action {}",
                        id
                    ))
                })?,
                None => self.action_repo.create(new).await?,
            };
            ids.push(row.id);
        }
        Ok(ids)
    }

    pub async fn create_workflow(
        &self,
        payload: &WorkflowPayload,
    ) -> Result<WorkflowDetail, AppError> {
        Self::validate_workflow_name(&payload.name)?;
        let trigger_ids = self.resolve_triggers(&payload.triggers).await?;
        let action_ids = self.resolve_actions(&payload.actions).await?;
        let workflow = self
            .workflow_repo
            .create(&NewWorkflow {
                name: payload.name.clone(),
                sort_order: payload.order,
                enabled: payload.enabled,
                trigger_ids,
                action_ids,
            })
            .await?;
        tracing::info!(workflow_id = %workflow.id, name = %workflow.name, "Created workflow");
        self.load_detail(workflow).await
    }

    pub async fn get_workflow(
        &self,
        workflow_id: Uuid,
    ) -> Result<Option<WorkflowDetail>, AppError> {
        match self.workflow_repo.get(workflow_id).await? {
            Some(w) => Ok(Some(self.load_detail(w).await?)),
            None => Ok(None),
        }
    }

    pub async fn list_workflows(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<(i64, Vec<WorkflowDetail>), AppError> {
        let count = self.workflow_repo.count().await?;
        let rows = self.workflow_repo.list(limit, offset).await?;
        let mut details = Vec::with_capacity(rows.len());
        for w in rows {
            details.push(self.load_detail(w).await?);
        }
        Ok((count, details))
    }

    /// Full replace; nested trigger/action payloads are resolved the same way
    /// as on create.
    pub async fn update_workflow(
        &self,
        workflow_id: Uuid,
        payload: &WorkflowPayload,
    ) -> Result<Option<WorkflowDetail>, AppError> {
        if self.workflow_repo.get(workflow_id).await?.is_none() {
            return Ok(None);
        }
        Self::validate_workflow_name(&payload.name)?;
        let trigger_ids = self.resolve_triggers(&payload.triggers).await?;
        let action_ids = self.resolve_actions(&payload.actions).await?;
        let updated = self
            .workflow_repo
            .update(
                workflow_id,
                &NewWorkflow {
                    name: payload.name.clone(),
                    sort_order: payload.order,
                    enabled: payload.enabled,
                    trigger_ids,
                    action_ids,
                },
            )
            .await?;
        match updated {
            Some(w) => Ok(Some(self.load_detail(w).await?)),
            None => Ok(None),
        }
    }

    pub async fn delete_workflow(&self, workflow_id: Uuid) -> Result<bool, AppError> {
        Ok(self.workflow_repo.delete(workflow_id).await?)
    }
}
