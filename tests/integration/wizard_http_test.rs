use super::common;

use common::test_server::{session_cookie, TestServer};
use multistep::config::{RateLimitConfig, Settings};

#[tokio::test]
async fn test_wizard_over_http() {
    let server = TestServer::new().await;
    let client = server.client();

    let response = client.get(server.url("/multistep")).send().await.unwrap();
    assert_eq!(response.status(), 200);
    let cookie = session_cookie(&response).expect("session cookie");

    let steps: [&[(&str, &str)]; 2] = [
        &[("form_id", "multistep_singleurl"), ("op", "next"), ("room_rating", "4")],
        &[("form_id", "multistep_singleurl"), ("op", "next"), ("service_rating", "2")],
    ];
    for form in steps {
        let response = client
            .post(server.url("/multistep"))
            .header(reqwest::header::COOKIE, &cookie)
            .form(form)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }

    let response = client
        .post(server.url("/multistep"))
        .header(reqwest::header::COOKIE, &cookie)
        .form(&[
            ("form_id", "multistep_singleurl"),
            ("op", "next"),
            ("email", "a@b.com"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 303);
    assert_eq!(response.headers()[reqwest::header::LOCATION], "/");

    let body = client
        .get(server.url("/"))
        .header(reqwest::header::COOKIE, &cookie)
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Thank you for your submission"));
}

#[tokio::test]
async fn test_expired_cookie_starts_a_new_session() {
    let server = TestServer::new().await;
    let client = server.client();

    let stale = format!("multistep_session={}", uuid_like());
    let response = client
        .get(server.url("/multistep"))
        .header(reqwest::header::COOKIE, &stale)
        .send()
        .await
        .unwrap();

    let issued = session_cookie(&response).expect("session cookie");
    assert_ne!(issued, stale);
    assert_eq!(server.state.sessions.len().await, 1);
}

#[tokio::test]
async fn test_rate_limit_applies_to_site_routes() {
    let mut settings = Settings::default();
    settings.rate_limit = Some(RateLimitConfig {
        enabled: true,
        requests_per_second: 1,
        burst_size: 1,
    });
    let server = TestServer::with_settings(settings).await;
    let client = server.client();

    let first = client.get(server.url("/multistep")).send().await.unwrap();
    assert_eq!(first.status(), 200);

    let second = client.get(server.url("/multistep")).send().await.unwrap();
    assert_eq!(second.status(), 429);

    // Health checks are never limited
    let health = client.get(server.url("/health/live")).send().await.unwrap();
    assert_eq!(health.status(), 200);
}

fn uuid_like() -> &'static str {
    "7f1c2a9e-2b7d-4c53-9d0e-3f7b8c1a2e44"
}
