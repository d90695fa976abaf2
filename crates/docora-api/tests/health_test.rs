//! Health probe and OpenAPI endpoint tests.

mod helpers;

#[tokio::test]
async fn test_health_and_probes() {
    let app = helpers::setup_test_app().await;
    let client = app.client();

    let res = client.get("/live").await;
    assert_eq!(res.status_code(), 200);
    let body: serde_json::Value = res.json();
    assert_eq!(body.get("status").and_then(|v| v.as_str()), Some("alive"));

    let res = client.get("/ready").await;
    assert_eq!(res.status_code(), 200);
    let body: serde_json::Value = res.json();
    assert_eq!(body.get("database").and_then(|v| v.as_str()), Some("ready"));

    let res = client.get("/health").await;
    assert_eq!(res.status_code(), 200);
    let body: serde_json::Value = res.json();
    assert_eq!(
        body.get("database").and_then(|v| v.as_str()),
        Some("healthy")
    );
}

#[tokio::test]
async fn test_openapi_spec_lists_workflow_paths() {
    let app = helpers::setup_test_app().await;
    let client = app.client();

    let res = client.get("/api/openapi.json").await;
    assert_eq!(res.status_code(), 200);
    let spec: serde_json::Value = res.json();
    let paths = spec.get("paths").and_then(|p| p.as_object()).expect("paths");
    assert!(paths.contains_key("/api/workflows/"));
    assert!(paths.contains_key("/api/workflow_triggers/"));
    assert!(paths.contains_key("/api/workflow_actions/"));
}
