use super::common;

use common::test_server::TestServer;

#[tokio::test]
async fn test_health_endpoint() {
    let server = TestServer::new().await;
    let client = reqwest::Client::new();

    let response = client
        .get(server.url("/health"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["steps"], "ok");
    assert!(body["uptime_seconds"].is_number());
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_health_ready_endpoint() {
    let server = TestServer::new().await;
    let client = reqwest::Client::new();

    let response = client
        .get(server.url("/health/ready"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_health_live_endpoint() {
    let server = TestServer::new().await;
    let client = reqwest::Client::new();

    let response = client
        .get(server.url("/health/live"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "alive");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let server = TestServer::new().await;
    let client = reqwest::Client::new();

    // Generate some traffic first
    client.get(server.url("/multistep")).send().await.unwrap();

    let response = client
        .get(server.url("/metrics"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);

    let body = response.text().await.unwrap();
    assert!(body.contains("multistep_requests_total"));
    assert!(body.contains("multistep_active_sessions 1"));
}
