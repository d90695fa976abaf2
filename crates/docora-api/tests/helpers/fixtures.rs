//! Reference-entity fixtures for workflow tests.

#![allow(dead_code)]

use docora_db::ReferenceRepository;
use sqlx::PgPool;
use uuid::Uuid;

/// Ids of one seeded row per reference table.
pub struct ReferenceFixtures {
    pub correspondent: Uuid,
    pub document_type: Uuid,
    pub storage_path: Uuid,
    pub tags: Vec<Uuid>,
    pub owner: Uuid,
    pub viewer: Uuid,
    pub group: Uuid,
    pub custom_fields: Vec<Uuid>,
    pub mail_rule: Uuid,
}

pub async fn seed_references(pool: &PgPool) -> ReferenceFixtures {
    let repo = ReferenceRepository::new(pool.clone());

    let correspondent = repo
        .create_correspondent("Correspondent Name")
        .await
        .expect("create correspondent")
        .id;
    let document_type = repo
        .create_document_type("DocType Name")
        .await
        .expect("create document type")
        .id;
    let storage_path = repo
        .create_storage_path("Samples", "/test/")
        .await
        .expect("create storage path")
        .id;

    let mut tags = Vec::new();
    for name in ["t1", "t2", "t3"] {
        tags.push(repo.create_tag(name).await.expect("create tag").id);
    }

    let owner = repo.create_user("user2").await.expect("create owner").id;
    let viewer = repo.create_user("user3").await.expect("create viewer").id;
    let group = repo.create_group("group1").await.expect("create group").id;

    let mut custom_fields = Vec::new();
    custom_fields.push(
        repo.create_custom_field("Custom Field 1", "string")
            .await
            .expect("create custom field")
            .id,
    );
    custom_fields.push(
        repo.create_custom_field("Custom Field 2", "integer")
            .await
            .expect("create custom field")
            .id,
    );

    let mail_rule = repo
        .create_mail_rule("Rule1")
        .await
        .expect("create mail rule")
        .id;

    ReferenceFixtures {
        correspondent,
        document_type,
        storage_path,
        tags,
        owner,
        viewer,
        group,
        custom_fields,
        mail_rule,
    }
}

/// Total rows in a workflow table, for no-partial-write assertions.
pub async fn table_count(pool: &PgPool, table: &str) -> i64 {
    let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .expect("count query");
    count
}
