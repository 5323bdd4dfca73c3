use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::adapters::session_store::SessionStore;
use crate::domain::wizard::WizardForm;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthChecks {
    pub steps: String,
    pub sessions: usize,
}

pub struct HealthHandler {
    wizard: Arc<WizardForm>,
    sessions: SessionStore,
    start_time: std::time::Instant,
}

impl HealthHandler {
    pub fn new(wizard: Arc<WizardForm>, sessions: SessionStore) -> Self {
        Self {
            wizard,
            sessions,
            start_time: std::time::Instant::now(),
        }
    }

    /// Basic health check - returns 200 if server is running
    pub async fn health(&self) -> impl IntoResponse {
        let uptime = self.start_time.elapsed().as_secs();
        let steps = if self.wizard.missing_steps().is_empty() {
            "ok"
        } else {
            "incomplete"
        };
        let status = HealthStatus {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: uptime,
            checks: HealthChecks {
                steps: steps.to_string(),
                sessions: self.sessions.len().await,
            },
        };

        (StatusCode::OK, Json(status))
    }

    /// Readiness check - returns 200 only when every step has a handler
    pub async fn ready(&self) -> impl IntoResponse {
        let missing = self.wizard.missing_steps();

        if missing.is_empty() {
            (StatusCode::OK, Json(serde_json::json!({
                "status": "ready",
                "message": "Server is ready to accept requests"
            })))
        } else {
            let names: Vec<String> = missing.iter().map(|s| s.to_string()).collect();
            (StatusCode::SERVICE_UNAVAILABLE, Json(serde_json::json!({
                "status": "not_ready",
                "message": format!("No handler registered for: {}", names.join(", "))
            })))
        }
    }

    /// Liveness check - returns 200 if server is alive
    pub async fn live(&self) -> impl IntoResponse {
        (StatusCode::OK, Json(serde_json::json!({
            "status": "alive",
            "message": "Server is alive"
        })))
    }
}
