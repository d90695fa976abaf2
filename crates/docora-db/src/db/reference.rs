//! Lookups and fixtures for the entities workflow fields reference.
//!
//! The validator consults this repository before persisting a trigger or
//! action so dangling references are rejected up front instead of surfacing
//! as constraint violations.

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use docora_core::models::{
    Correspondent, CustomField, DocumentType, MailRule, StoragePath, Tag, UserAccount, UserGroup,
};

#[derive(Clone)]
pub struct ReferenceRepository {
    pool: PgPool,
}

impl ReferenceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn exists(&self, table: &str, id: Uuid) -> Result<bool> {
        let (found,): (bool,) =
            sqlx::query_as(&format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = $1)"))
                .bind(id)
                .fetch_one(&self.pool)
                .await
                .with_context(|| format!("Failed to check {table} reference"))?;
        Ok(found)
    }

    /// Return the first id in `ids` with no row in `table`, if any.
    async fn first_missing(&self, table: &str, ids: &[Uuid]) -> Result<Option<Uuid>> {
        if ids.is_empty() {
            return Ok(None);
        }
        let missing: Option<(Uuid,)> = sqlx::query_as(&format!(
            r#"
            SELECT candidate FROM unnest($1::uuid[]) AS candidate
            WHERE candidate NOT IN (SELECT id FROM {table})
            LIMIT 1
            "#,
        ))
        .bind(ids)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Failed to check {table} references"))?;
        Ok(missing.map(|(id,)| id))
    }

    pub async fn mail_rule_exists(&self, id: Uuid) -> Result<bool> {
        self.exists("mail_rules", id).await
    }

    pub async fn correspondent_exists(&self, id: Uuid) -> Result<bool> {
        self.exists("correspondents", id).await
    }

    pub async fn document_type_exists(&self, id: Uuid) -> Result<bool> {
        self.exists("document_types", id).await
    }

    pub async fn storage_path_exists(&self, id: Uuid) -> Result<bool> {
        self.exists("storage_paths", id).await
    }

    pub async fn user_exists(&self, id: Uuid) -> Result<bool> {
        self.exists("user_accounts", id).await
    }

    pub async fn first_missing_tag(&self, ids: &[Uuid]) -> Result<Option<Uuid>> {
        self.first_missing("tags", ids).await
    }

    pub async fn first_missing_user(&self, ids: &[Uuid]) -> Result<Option<Uuid>> {
        self.first_missing("user_accounts", ids).await
    }

    pub async fn first_missing_group(&self, ids: &[Uuid]) -> Result<Option<Uuid>> {
        self.first_missing("user_groups", ids).await
    }

    pub async fn first_missing_custom_field(&self, ids: &[Uuid]) -> Result<Option<Uuid>> {
        self.first_missing("custom_fields", ids).await
    }

    // Insert helpers. The subsystems owning these entities live outside this
    // service; tests and seeding use these to materialize referenceable rows.

    pub async fn create_tag(&self, name: &str) -> Result<Tag> {
        let t = sqlx::query_as::<sqlx::Postgres, Tag>(
            r#"
            INSERT INTO tags (name, created_at) VALUES ($1, $2)
            RETURNING id, name, created_at
            "#,
        )
        .bind(name)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .context("Failed to create tag")?;
        Ok(t)
    }

    pub async fn create_correspondent(&self, name: &str) -> Result<Correspondent> {
        let c = sqlx::query_as::<sqlx::Postgres, Correspondent>(
            r#"
            INSERT INTO correspondents (name, created_at) VALUES ($1, $2)
            RETURNING id, name, created_at
            "#,
        )
        .bind(name)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .context("Failed to create correspondent")?;
        Ok(c)
    }

    pub async fn create_document_type(&self, name: &str) -> Result<DocumentType> {
        let d = sqlx::query_as::<sqlx::Postgres, DocumentType>(
            r#"
            INSERT INTO document_types (name, created_at) VALUES ($1, $2)
            RETURNING id, name, created_at
            "#,
        )
        .bind(name)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .context("Failed to create document type")?;
        Ok(d)
    }

    pub async fn create_storage_path(&self, name: &str, path: &str) -> Result<StoragePath> {
        let s = sqlx::query_as::<sqlx::Postgres, StoragePath>(
            r#"
            INSERT INTO storage_paths (name, path, created_at) VALUES ($1, $2, $3)
            RETURNING id, name, path, created_at
            "#,
        )
        .bind(name)
        .bind(path)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .context("Failed to create storage path")?;
        Ok(s)
    }

    pub async fn create_custom_field(&self, name: &str, data_type: &str) -> Result<CustomField> {
        let f = sqlx::query_as::<sqlx::Postgres, CustomField>(
            r#"
            INSERT INTO custom_fields (name, data_type, created_at) VALUES ($1, $2, $3)
            RETURNING id, name, data_type, created_at
            "#,
        )
        .bind(name)
        .bind(data_type)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .context("Failed to create custom field")?;
        Ok(f)
    }

    pub async fn create_user(&self, username: &str) -> Result<UserAccount> {
        let u = sqlx::query_as::<sqlx::Postgres, UserAccount>(
            r#"
            INSERT INTO user_accounts (username, created_at) VALUES ($1, $2)
            RETURNING id, username, created_at
            "#,
        )
        .bind(username)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .context("Failed to create user account")?;
        Ok(u)
    }

    pub async fn create_group(&self, name: &str) -> Result<UserGroup> {
        let g = sqlx::query_as::<sqlx::Postgres, UserGroup>(
            r#"
            INSERT INTO user_groups (name, created_at) VALUES ($1, $2)
            RETURNING id, name, created_at
            "#,
        )
        .bind(name)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .context("Failed to create user group")?;
        Ok(g)
    }

    pub async fn create_mail_rule(&self, name: &str) -> Result<MailRule> {
        let m = sqlx::query_as::<sqlx::Postgres, MailRule>(
            r#"
            INSERT INTO mail_rules (name, created_at) VALUES ($1, $2)
            RETURNING id, name, created_at
            "#,
        )
        .bind(name)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .context("Failed to create mail rule")?;
        Ok(m)
    }
}
