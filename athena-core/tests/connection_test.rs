mod common;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::client_for;

#[tokio::test]
async fn test_connection_reports_users() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/test/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Database connection successful",
            "timestamp": "2024-05-01T08:00:00Z",
            "count": 2,
            "data": [
                {"id": 1, "username": "rana", "created_at": "2024-01-01T00:00:00Z"},
                {"id": 2, "username": "omar", "created_at": "2024-01-02T00:00:00Z"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let report = client_for(&server).test_connection().await.unwrap();

    assert!(report.success);
    assert_eq!(report.message.as_deref(), Some("Database connection successful"));
    assert_eq!(report.user_count(), 2);
    assert_eq!(report.data[1]["username"], "omar");
}

#[tokio::test]
async fn test_connection_failure_reports_status_only() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/test/users"))
        .respond_with(
            ResponseTemplate::new(503).set_body_json(json!({"message": "db down"})),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).test_connection().await.unwrap_err();
    assert_eq!(err.status(), Some(503));
    assert!(err.to_string().contains("HTTP error! status: 503"));
}
