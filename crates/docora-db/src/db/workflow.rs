//! Workflow, trigger, and action repositories

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use docora_core::models::{
    NewWorkflow, NewWorkflowAction, NewWorkflowTrigger, Workflow, WorkflowAction, WorkflowTrigger,
};

const TRIGGER_COLUMNS: &str = "id, trigger_type, sources, filter_filename, filter_path, \
     filter_mailrule, created_at, updated_at";

const ACTION_COLUMNS: &str = "id, assign_title, assign_correspondent, assign_document_type, \
     assign_storage_path, assign_owner, assign_tags, assign_view_users, assign_view_groups, \
     assign_change_users, assign_change_groups, assign_custom_fields, created_at, updated_at";

const WORKFLOW_COLUMNS: &str =
    "id, name, sort_order, enabled, trigger_ids, action_ids, created_at, updated_at";

#[derive(Clone)]
pub struct WorkflowTriggerRepository {
    pool: PgPool,
}

impl WorkflowTriggerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new: &NewWorkflowTrigger) -> Result<WorkflowTrigger> {
        let now = Utc::now();
        let t = sqlx::query_as::<Postgres, WorkflowTrigger>(&format!(
            r#"
            INSERT INTO workflow_triggers (
                trigger_type, sources, filter_filename, filter_path, filter_mailrule,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {TRIGGER_COLUMNS}
            "#,
        ))
        .bind(new.trigger_type)
        .bind(&new.sources)
        .bind(new.filter_filename.as_deref())
        .bind(new.filter_path.as_deref())
        .bind(new.filter_mailrule)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create workflow trigger")?;
        Ok(t)
    }

    pub async fn get(&self, trigger_id: Uuid) -> Result<Option<WorkflowTrigger>> {
        let t = sqlx::query_as::<Postgres, WorkflowTrigger>(&format!(
            r#"SELECT {TRIGGER_COLUMNS} FROM workflow_triggers WHERE id = $1"#,
        ))
        .bind(trigger_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get workflow trigger")?;
        Ok(t)
    }

    /// Fetch triggers by id, preserving the order of `ids`.
    pub async fn get_many(&self, ids: &[Uuid]) -> Result<Vec<WorkflowTrigger>> {
        let rows = sqlx::query_as::<Postgres, WorkflowTrigger>(&format!(
            r#"
            SELECT {TRIGGER_COLUMNS}
            FROM workflow_triggers
            WHERE id = ANY($1)
            ORDER BY array_position($1, id)
            "#,
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .context("Failed to get workflow triggers")?;
        Ok(rows)
    }

    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<WorkflowTrigger>> {
        let rows = sqlx::query_as::<Postgres, WorkflowTrigger>(&format!(
            r#"
            SELECT {TRIGGER_COLUMNS}
            FROM workflow_triggers
            ORDER BY created_at ASC
            LIMIT $1 OFFSET $2
            "#,
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list workflow triggers")?;
        Ok(rows)
    }

    pub async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM workflow_triggers"#)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count workflow triggers")?;
        Ok(count)
    }

    /// Full replace of all trigger fields.
    pub async fn update(
        &self,
        trigger_id: Uuid,
        new: &NewWorkflowTrigger,
    ) -> Result<Option<WorkflowTrigger>> {
        let now = Utc::now();
        let t = sqlx::query_as::<Postgres, WorkflowTrigger>(&format!(
            r#"
            UPDATE workflow_triggers
            SET trigger_type = $2, sources = $3, filter_filename = $4, filter_path = $5,
                filter_mailrule = $6, updated_at = $7
            WHERE id = $1
            RETURNING {TRIGGER_COLUMNS}
            "#,
        ))
        .bind(trigger_id)
        .bind(new.trigger_type)
        .bind(&new.sources)
        .bind(new.filter_filename.as_deref())
        .bind(new.filter_path.as_deref())
        .bind(new.filter_mailrule)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to update workflow trigger")?;
        Ok(t)
    }

    pub async fn delete(&self, trigger_id: Uuid) -> Result<bool> {
        let r = sqlx::query(r#"DELETE FROM workflow_triggers WHERE id = $1"#)
            .bind(trigger_id)
            .execute(&self.pool)
            .await
            .context("Failed to delete workflow trigger")?;
        Ok(r.rows_affected() > 0)
    }
}

#[derive(Clone)]
pub struct WorkflowActionRepository {
    pool: PgPool,
}

impl WorkflowActionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new: &NewWorkflowAction) -> Result<WorkflowAction> {
        let now = Utc::now();
        let a = sqlx::query_as::<Postgres, WorkflowAction>(&format!(
            r#"
            INSERT INTO workflow_actions (
                assign_title, assign_correspondent, assign_document_type, assign_storage_path,
                assign_owner, assign_tags, assign_view_users, assign_view_groups,
                assign_change_users, assign_change_groups, assign_custom_fields,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {ACTION_COLUMNS}
            "#,
        ))
        .bind(new.assign_title.as_deref())
        .bind(new.assign_correspondent)
        .bind(new.assign_document_type)
        .bind(new.assign_storage_path)
        .bind(new.assign_owner)
        .bind(&new.assign_tags)
        .bind(&new.assign_view_users)
        .bind(&new.assign_view_groups)
        .bind(&new.assign_change_users)
        .bind(&new.assign_change_groups)
        .bind(&new.assign_custom_fields)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create workflow action")?;
        Ok(a)
    }

    pub async fn get(&self, action_id: Uuid) -> Result<Option<WorkflowAction>> {
        let a = sqlx::query_as::<Postgres, WorkflowAction>(&format!(
            r#"SELECT {ACTION_COLUMNS} FROM workflow_actions WHERE id = $1"#,
        ))
        .bind(action_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get workflow action")?;
        Ok(a)
    }

    /// Fetch actions by id, preserving the order of `ids`.
    pub async fn get_many(&self, ids: &[Uuid]) -> Result<Vec<WorkflowAction>> {
        let rows = sqlx::query_as::<Postgres, WorkflowAction>(&format!(
            r#"
            SELECT {ACTION_COLUMNS}
            FROM workflow_actions
            WHERE id = ANY($1)
            ORDER BY array_position($1, id)
            "#,
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .context("Failed to get workflow actions")?;
        Ok(rows)
    }

    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<WorkflowAction>> {
        let rows = sqlx::query_as::<Postgres, WorkflowAction>(&format!(
            r#"
            SELECT {ACTION_COLUMNS}
            FROM workflow_actions
            ORDER BY created_at ASC
            LIMIT $1 OFFSET $2
            "#,
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list workflow actions")?;
        Ok(rows)
    }

    pub async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM workflow_actions"#)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count workflow actions")?;
        Ok(count)
    }

    /// Full replace of all action fields.
    pub async fn update(
        &self,
        action_id: Uuid,
        new: &NewWorkflowAction,
    ) -> Result<Option<WorkflowAction>> {
        let now = Utc::now();
        let a = sqlx::query_as::<Postgres, WorkflowAction>(&format!(
            r#"
            UPDATE workflow_actions
            SET assign_title = $2, assign_correspondent = $3, assign_document_type = $4,
                assign_storage_path = $5, assign_owner = $6, assign_tags = $7,
                assign_view_users = $8, assign_view_groups = $9, assign_change_users = $10,
                assign_change_groups = $11, assign_custom_fields = $12, updated_at = $13
            WHERE id = $1
            RETURNING {ACTION_COLUMNS}
            "#,
        ))
        .bind(action_id)
        .bind(new.assign_title.as_deref())
        .bind(new.assign_correspondent)
        .bind(new.assign_document_type)
        .bind(new.assign_storage_path)
        .bind(new.assign_owner)
        .bind(&new.assign_tags)
        .bind(&new.assign_view_users)
        .bind(&new.assign_view_groups)
        .bind(&new.assign_change_users)
        .bind(&new.assign_change_groups)
        .bind(&new.assign_custom_fields)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to update workflow action")?;
        Ok(a)
    }

    pub async fn delete(&self, action_id: Uuid) -> Result<bool> {
        let r = sqlx::query(r#"DELETE FROM workflow_actions WHERE id = $1"#)
            .bind(action_id)
            .execute(&self.pool)
            .await
            .context("Failed to delete workflow action")?;
        Ok(r.rows_affected() > 0)
    }
}

#[derive(Clone)]
pub struct WorkflowRepository {
    pool: PgPool,
}

impl WorkflowRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new: &NewWorkflow) -> Result<Workflow> {
        let now = Utc::now();
        let w = sqlx::query_as::<Postgres, Workflow>(&format!(
            r#"
            INSERT INTO workflows (name, sort_order, enabled, trigger_ids, action_ids,
                created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {WORKFLOW_COLUMNS}
            "#,
        ))
        .bind(&new.name)
        .bind(new.sort_order)
        .bind(new.enabled)
        .bind(&new.trigger_ids)
        .bind(&new.action_ids)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create workflow")?;
        Ok(w)
    }

    pub async fn get(&self, workflow_id: Uuid) -> Result<Option<Workflow>> {
        let w = sqlx::query_as::<Postgres, Workflow>(&format!(
            r#"SELECT {WORKFLOW_COLUMNS} FROM workflows WHERE id = $1"#,
        ))
        .bind(workflow_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get workflow")?;
        Ok(w)
    }

    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Workflow>> {
        let rows = sqlx::query_as::<Postgres, Workflow>(&format!(
            r#"
            SELECT {WORKFLOW_COLUMNS}
            FROM workflows
            ORDER BY sort_order ASC, created_at ASC
            LIMIT $1 OFFSET $2
            "#,
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list workflows")?;
        Ok(rows)
    }

    pub async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM workflows"#)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count workflows")?;
        Ok(count)
    }

    /// Full replace of all workflow fields.
    pub async fn update(&self, workflow_id: Uuid, new: &NewWorkflow) -> Result<Option<Workflow>> {
        let now = Utc::now();
        let w = sqlx::query_as::<Postgres, Workflow>(&format!(
            r#"
            UPDATE workflows
            SET name = $2, sort_order = $3, enabled = $4, trigger_ids = $5, action_ids = $6,
                updated_at = $7
            WHERE id = $1
            RETURNING {WORKFLOW_COLUMNS}
            "#,
        ))
        .bind(workflow_id)
        .bind(&new.name)
        .bind(new.sort_order)
        .bind(new.enabled)
        .bind(&new.trigger_ids)
        .bind(&new.action_ids)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to update workflow")?;
        Ok(w)
    }

    /// Delete a workflow and the trigger/action rows it owns, in one
    /// transaction. Returns false if the workflow did not exist.
    pub async fn delete(&self, workflow_id: Uuid) -> Result<bool> {
        let Some(workflow) = self.get(workflow_id).await? else {
            return Ok(false);
        };

        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin workflow delete transaction")?;
        sqlx::query(r#"DELETE FROM workflows WHERE id = $1"#)
            .bind(workflow_id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete workflow")?;
        sqlx::query(r#"DELETE FROM workflow_triggers WHERE id = ANY($1)"#)
            .bind(&workflow.trigger_ids)
            .execute(&mut *tx)
            .await
            .context("Failed to delete workflow triggers")?;
        sqlx::query(r#"DELETE FROM workflow_actions WHERE id = ANY($1)"#)
            .bind(&workflow.action_ids)
            .execute(&mut *tx)
            .await
            .context("Failed to delete workflow actions")?;
        tx.commit()
            .await
            .context("Failed to commit workflow delete transaction")?;

        tracing::debug!(
            workflow_id = %workflow_id,
            triggers = workflow.trigger_ids.len(),
            actions = workflow.action_ids.len(),
            "Deleted workflow and owned triggers/actions"
        );
        Ok(true)
    }
}
