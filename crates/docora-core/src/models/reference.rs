//! Entities workflow actions and trigger filters point at.
//!
//! These rows exist so assignment/filter references can be validated and so
//! tests have something to reference. They carry no behavior of their own;
//! the subsystems that manage them live outside this service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Correspondent {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DocumentType {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StoragePath {
    pub id: Uuid,
    pub name: String,
    pub path: String,
    pub created_at: DateTime<Utc>,
}

/// User-defined document field (string, integer, date, ...). The data type is
/// interpreted by the document subsystem, not here.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CustomField {
    pub id: Uuid,
    pub name: String,
    pub data_type: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserAccount {
    pub id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserGroup {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Mail rule a trigger can filter on. The mail-fetch subsystem owning these
/// lives outside this service; only the id is meaningful here.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MailRule {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
