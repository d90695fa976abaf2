//! Workflow API integration tests.
//!
//! Run with: `cargo test -p docora-api --test workflow_test`
//! Requires Docker for testcontainers (Postgres).

mod helpers;

use helpers::fixtures::{seed_references, table_count};
use serde_json::json;

#[tokio::test]
async fn test_create_workflow_with_existing_trigger_and_action() {
    let app = helpers::setup_test_app().await;
    let client = app.client();

    let trigger_res = client
        .post("/api/workflow_triggers/")
        .json(&json!({
            "type": "consumption",
            "sources": ["api_upload"],
            "filter_filename": "*"
        }))
        .await;
    assert_eq!(trigger_res.status_code(), 201, "create trigger");
    let trigger: serde_json::Value = trigger_res.json();

    let action_res = client
        .post("/api/workflow_actions/")
        .json(&json!({
            "assign_title": "Action Title"
        }))
        .await;
    assert_eq!(action_res.status_code(), 201, "create action");
    let action: serde_json::Value = action_res.json();

    let before = table_count(app.pool(), "workflows").await;
    let workflow_res = client
        .post("/api/workflows/")
        .json(&json!({
            "name": "Workflow 2",
            "order": 1,
            "triggers": [
                {
                    "id": trigger.get("id"),
                    "type": trigger.get("type"),
                    "sources": ["api_upload"],
                    "filter_filename": trigger.get("filter_filename")
                }
            ],
            "actions": [
                {
                    "id": action.get("id"),
                    "assign_title": action.get("assign_title")
                }
            ]
        }))
        .await;
    assert_eq!(workflow_res.status_code(), 201, "create workflow");
    assert_eq!(table_count(app.pool(), "workflows").await, before + 1);

    let created: serde_json::Value = workflow_res.json();
    assert_eq!(
        created.get("name").and_then(|v| v.as_str()),
        Some("Workflow 2")
    );
    // Nested objects reference the previously created rows, not copies
    assert_eq!(created["triggers"][0]["id"], trigger["id"]);
    assert_eq!(created["actions"][0]["id"], action["id"]);
    assert_eq!(
        created["actions"][0]["assign_title"],
        json!("Action Title")
    );
}

#[tokio::test]
async fn test_list_workflows_returns_nested_representations() {
    let app = helpers::setup_test_app().await;
    let client = app.client();
    let refs = seed_references(app.pool()).await;

    let workflow_res = client
        .post("/api/workflows/")
        .json(&json!({
            "name": "Workflow 1",
            "order": 0,
            "triggers": [
                {
                    "type": "consumption",
                    "sources": ["consume_folder", "api_upload", "mail_fetch"],
                    "filter_filename": "*simple*",
                    "filter_path": "*/samples/*"
                }
            ],
            "actions": [
                {
                    "assign_title": "Doc from {correspondent}",
                    "assign_correspondent": refs.correspondent,
                    "assign_document_type": refs.document_type,
                    "assign_storage_path": refs.storage_path,
                    "assign_owner": refs.owner,
                    "assign_tags": refs.tags,
                    "assign_view_users": [refs.viewer],
                    "assign_view_groups": [refs.group],
                    "assign_change_users": [refs.viewer],
                    "assign_change_groups": [refs.group],
                    "assign_custom_fields": refs.custom_fields
                }
            ]
        }))
        .await;
    assert_eq!(workflow_res.status_code(), 201);
    let created: serde_json::Value = workflow_res.json();

    let list_res = client.get("/api/workflows/").await;
    assert_eq!(list_res.status_code(), 200);
    let list: serde_json::Value = list_res.json();
    assert_eq!(list.get("count").and_then(|v| v.as_i64()), Some(1));

    let listed = &list["results"][0];
    assert_eq!(listed["id"], created["id"]);
    assert_eq!(
        listed["triggers"][0]["filter_filename"],
        json!("*simple*")
    );
    assert_eq!(
        listed["actions"][0]["assign_correspondent"],
        json!(refs.correspondent)
    );
    assert_eq!(
        listed["actions"][0]["assign_tags"]
            .as_array()
            .map(|a| a.len()),
        Some(3)
    );
    assert_eq!(
        listed["actions"][0]["assign_custom_fields"]
            .as_array()
            .map(|a| a.len()),
        Some(2)
    );
}

#[tokio::test]
async fn test_create_invalid_workflow_trigger() {
    let app = helpers::setup_test_app().await;
    let client = app.client();

    // Missing type
    let res = client
        .post("/api/workflow_triggers/")
        .json(&json!({
            "sources": ["api_upload"]
        }))
        .await;
    assert_eq!(res.status_code(), 400);

    // Consumption trigger with no filename, path, or mail rule filter
    let res = client
        .post("/api/workflow_triggers/")
        .json(&json!({
            "type": "consumption",
            "sources": ["api_upload"]
        }))
        .await;
    assert_eq!(res.status_code(), 400);
    let body: serde_json::Value = res.json();
    assert_eq!(
        body.get("code").and_then(|v| v.as_str()),
        Some("INVALID_INPUT")
    );

    // Nothing was written
    assert_eq!(table_count(app.pool(), "workflow_triggers").await, 0);
}

#[tokio::test]
async fn test_create_workflow_trigger_action_empty_fields() {
    let app = helpers::setup_test_app().await;
    let client = app.client();

    let res = client
        .post("/api/workflow_triggers/")
        .json(&json!({
            "type": "consumption",
            "sources": ["api_upload"],
            "filter_filename": "*test*",
            "filter_path": ""
        }))
        .await;
    assert_eq!(res.status_code(), 201);
    let trigger: serde_json::Value = res.json();
    assert_eq!(trigger["filter_filename"], json!("*test*"));
    assert_eq!(trigger["filter_path"], json!(null));

    let res = client
        .post("/api/workflow_actions/")
        .json(&json!({
            "assign_title": ""
        }))
        .await;
    assert_eq!(res.status_code(), 201);
    let action: serde_json::Value = res.json();
    assert_eq!(action["assign_title"], json!(null));

    let res = client
        .post("/api/workflow_triggers/")
        .json(&json!({
            "type": "consumption",
            "sources": ["api_upload"],
            "filter_filename": "",
            "filter_path": "*/test/*"
        }))
        .await;
    assert_eq!(res.status_code(), 201);
    let trigger2: serde_json::Value = res.json();
    assert_eq!(trigger2["filter_path"], json!("*/test/*"));
    assert_eq!(trigger2["filter_filename"], json!(null));

    // Stored values are NULL, not empty strings
    let trigger_id: uuid::Uuid =
        serde_json::from_value(trigger["id"].clone()).expect("trigger id");
    let (filename, path): (Option<String>, Option<String>) = sqlx::query_as(
        "SELECT filter_filename, filter_path FROM workflow_triggers WHERE id = $1",
    )
    .bind(trigger_id)
    .fetch_one(app.pool())
    .await
    .expect("fetch trigger row");
    assert_eq!(filename.as_deref(), Some("*test*"));
    assert_eq!(path, None);
}

#[tokio::test]
async fn test_create_workflow_trigger_with_mailrule() {
    let app = helpers::setup_test_app().await;
    let client = app.client();
    let refs = seed_references(app.pool()).await;

    let res = client
        .post("/api/workflow_triggers/")
        .json(&json!({
            "type": "consumption",
            "sources": ["api_upload"],
            "filter_mailrule": refs.mail_rule
        }))
        .await;
    assert_eq!(res.status_code(), 201);
    let trigger: serde_json::Value = res.json();
    // A mail rule filter forces the sources down to mail_fetch only
    assert_eq!(trigger["sources"], json!(["mail_fetch"]));
    assert_eq!(trigger["filter_mailrule"], json!(refs.mail_rule));
}

#[tokio::test]
async fn test_trigger_sources_default_to_all_when_omitted() {
    let app = helpers::setup_test_app().await;
    let client = app.client();

    let res = client
        .post("/api/workflow_triggers/")
        .json(&json!({
            "type": "consumption",
            "filter_filename": "*invoice*"
        }))
        .await;
    assert_eq!(res.status_code(), 201);
    let trigger: serde_json::Value = res.json();
    assert_eq!(
        trigger["sources"],
        json!(["consume_folder", "api_upload", "mail_fetch"])
    );
}

#[tokio::test]
async fn test_trigger_with_unknown_mailrule_rejected() {
    let app = helpers::setup_test_app().await;
    let client = app.client();

    let res = client
        .post("/api/workflow_triggers/")
        .json(&json!({
            "type": "consumption",
            "sources": ["api_upload"],
            "filter_mailrule": uuid::Uuid::new_v4()
        }))
        .await;
    assert_eq!(res.status_code(), 400);
    assert_eq!(table_count(app.pool(), "workflow_triggers").await, 0);
}

#[tokio::test]
async fn test_action_with_unknown_references_rejected() {
    let app = helpers::setup_test_app().await;
    let client = app.client();

    let res = client
        .post("/api/workflow_actions/")
        .json(&json!({
            "assign_title": "Title",
            "assign_correspondent": uuid::Uuid::new_v4()
        }))
        .await;
    assert_eq!(res.status_code(), 400);

    let res = client
        .post("/api/workflow_actions/")
        .json(&json!({
            "assign_tags": [uuid::Uuid::new_v4()]
        }))
        .await;
    assert_eq!(res.status_code(), 400);

    assert_eq!(table_count(app.pool(), "workflow_actions").await, 0);
}

#[tokio::test]
async fn test_update_trigger_revalidates_and_renormalizes() {
    let app = helpers::setup_test_app().await;
    let client = app.client();

    let res = client
        .post("/api/workflow_triggers/")
        .json(&json!({
            "type": "consumption",
            "sources": ["api_upload"],
            "filter_filename": "*test*"
        }))
        .await;
    assert_eq!(res.status_code(), 201);
    let trigger: serde_json::Value = res.json();
    let trigger_id = trigger["id"].as_str().expect("trigger id").to_string();

    // Stripping every filter off a consumption trigger is rejected
    let res = client
        .put(&format!("/api/workflow_triggers/{}/", trigger_id))
        .json(&json!({
            "type": "consumption",
            "sources": ["api_upload"],
            "filter_filename": ""
        }))
        .await;
    assert_eq!(res.status_code(), 400);

    // Valid full replace renormalizes the empty path filter to null
    let res = client
        .put(&format!("/api/workflow_triggers/{}/", trigger_id))
        .json(&json!({
            "type": "consumption",
            "sources": ["consume_folder"],
            "filter_filename": "*updated*",
            "filter_path": ""
        }))
        .await;
    assert_eq!(res.status_code(), 200);
    let updated: serde_json::Value = res.json();
    assert_eq!(updated["filter_filename"], json!("*updated*"));
    assert_eq!(updated["filter_path"], json!(null));
    assert_eq!(updated["sources"], json!(["consume_folder"]));
}

#[tokio::test]
async fn test_create_list_get_update_delete_workflow() {
    let app = helpers::setup_test_app().await;
    let client = app.client();

    let create_res = client
        .post("/api/workflows/")
        .json(&json!({
            "name": "Test workflow",
            "order": 0,
            "triggers": [
                {
                    "type": "consumption",
                    "sources": ["api_upload"],
                    "filter_filename": "*simple*"
                }
            ],
            "actions": [
                { "assign_title": "Doc title" }
            ]
        }))
        .await;
    assert_eq!(create_res.status_code(), 201, "create workflow");
    let created: serde_json::Value = create_res.json();
    let workflow_id = created
        .get("id")
        .and_then(|v| v.as_str())
        .expect("id in response")
        .to_string();
    assert_eq!(
        created.get("name").and_then(|v| v.as_str()),
        Some("Test workflow")
    );
    assert_eq!(created.get("enabled"), Some(&json!(true)));

    let list_res = client.get("/api/workflows/").await;
    assert_eq!(list_res.status_code(), 200, "list workflows");
    let list: serde_json::Value = list_res.json();
    assert_eq!(list.get("count").and_then(|v| v.as_i64()), Some(1));
    assert!(list["results"]
        .as_array()
        .expect("results array")
        .iter()
        .any(|w| w.get("id").and_then(|v| v.as_str()) == Some(&workflow_id)));

    let get_res = client.get(&format!("/api/workflows/{}/", workflow_id)).await;
    assert_eq!(get_res.status_code(), 200, "get workflow");
    let got: serde_json::Value = get_res.json();
    assert_eq!(
        got.get("name").and_then(|v| v.as_str()),
        Some("Test workflow")
    );
    assert_eq!(got["triggers"][0]["filter_filename"], json!("*simple*"));

    let trigger_id = got["triggers"][0]["id"].clone();
    let update_res = client
        .put(&format!("/api/workflows/{}/", workflow_id))
        .json(&json!({
            "name": "Updated workflow name",
            "order": 2,
            "enabled": false,
            "triggers": [
                {
                    "id": trigger_id,
                    "type": "consumption",
                    "sources": ["api_upload"],
                    "filter_filename": "*renamed*"
                }
            ],
            "actions": []
        }))
        .await;
    assert_eq!(update_res.status_code(), 200, "update workflow");
    let updated: serde_json::Value = update_res.json();
    assert_eq!(
        updated.get("name").and_then(|v| v.as_str()),
        Some("Updated workflow name")
    );
    assert_eq!(updated.get("enabled"), Some(&json!(false)));
    assert_eq!(updated["triggers"][0]["id"], trigger_id);
    assert_eq!(updated["triggers"][0]["filter_filename"], json!("*renamed*"));

    let delete_res = client
        .delete(&format!("/api/workflows/{}/", workflow_id))
        .await;
    assert_eq!(delete_res.status_code(), 204, "delete workflow");

    let get_after = client.get(&format!("/api/workflows/{}/", workflow_id)).await;
    assert_eq!(get_after.status_code(), 404, "workflow should be gone");
}

#[tokio::test]
async fn test_delete_workflow_removes_owned_triggers_and_actions() {
    let app = helpers::setup_test_app().await;
    let client = app.client();

    let create_res = client
        .post("/api/workflows/")
        .json(&json!({
            "name": "Cascade workflow",
            "order": 0,
            "triggers": [
                {
                    "type": "consumption",
                    "sources": ["api_upload"],
                    "filter_filename": "*"
                }
            ],
            "actions": [
                { "assign_title": "Title" }
            ]
        }))
        .await;
    assert_eq!(create_res.status_code(), 201);
    let created: serde_json::Value = create_res.json();
    let workflow_id = created["id"].as_str().expect("workflow id").to_string();

    assert_eq!(table_count(app.pool(), "workflow_triggers").await, 1);
    assert_eq!(table_count(app.pool(), "workflow_actions").await, 1);

    let delete_res = client
        .delete(&format!("/api/workflows/{}/", workflow_id))
        .await;
    assert_eq!(delete_res.status_code(), 204);

    assert_eq!(table_count(app.pool(), "workflows").await, 0);
    assert_eq!(table_count(app.pool(), "workflow_triggers").await, 0);
    assert_eq!(table_count(app.pool(), "workflow_actions").await, 0);
}

#[tokio::test]
async fn test_workflow_with_unknown_nested_trigger_rejected() {
    let app = helpers::setup_test_app().await;
    let client = app.client();

    let res = client
        .post("/api/workflows/")
        .json(&json!({
            "name": "Bad nested reference",
            "order": 0,
            "triggers": [
                {
                    "id": uuid::Uuid::new_v4(),
                    "type": "consumption",
                    "sources": ["api_upload"],
                    "filter_filename": "*"
                }
            ]
        }))
        .await;
    assert_eq!(res.status_code(), 400);
    assert_eq!(table_count(app.pool(), "workflows").await, 0);
    assert_eq!(table_count(app.pool(), "workflow_triggers").await, 0);
}

#[tokio::test]
async fn test_workflow_validation_empty_name() {
    let app = helpers::setup_test_app().await;
    let client = app.client();

    let res = client
        .post("/api/workflows/")
        .json(&json!({
            "name": "   ",
            "order": 0
        }))
        .await;
    assert_eq!(res.status_code(), 400);
    assert_eq!(table_count(app.pool(), "workflows").await, 0);
}

#[tokio::test]
async fn test_trigger_list_pagination_envelope() {
    let app = helpers::setup_test_app().await;
    let client = app.client();

    for i in 0..3 {
        let res = client
            .post("/api/workflow_triggers/")
            .json(&json!({
                "type": "consumption",
                "sources": ["api_upload"],
                "filter_filename": format!("*doc-{}*", i)
            }))
            .await;
        assert_eq!(res.status_code(), 201);
    }

    let res = client.get("/api/workflow_triggers/?limit=2").await;
    assert_eq!(res.status_code(), 200);
    let page: serde_json::Value = res.json();
    // count is the total, results is the page
    assert_eq!(page.get("count").and_then(|v| v.as_i64()), Some(3));
    assert_eq!(page["results"].as_array().map(|a| a.len()), Some(2));

    let res = client.get("/api/workflow_triggers/?limit=2&offset=2").await;
    let page: serde_json::Value = res.json();
    assert_eq!(page["results"].as_array().map(|a| a.len()), Some(1));
}

#[tokio::test]
async fn test_malformed_body_returns_error_shape() {
    let app = helpers::setup_test_app().await;
    let client = app.client();

    let res = client
        .post("/api/workflow_triggers/")
        .json(&json!({
            "type": "not-a-trigger-type",
            "sources": ["api_upload"],
            "filter_filename": "*"
        }))
        .await;
    assert_eq!(res.status_code(), 400);
    let body: serde_json::Value = res.json();
    assert!(body.get("error").and_then(|v| v.as_str()).is_some());
    assert_eq!(
        body.get("code").and_then(|v| v.as_str()),
        Some("INVALID_INPUT")
    );
}
