use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use prometheus::{
    Counter, CounterVec, Encoder, Gauge, HistogramOpts, HistogramVec, Opts, Registry,
    TextEncoder,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::adapters::session_store::SessionStore;

pub struct MetricsCollector {
    registry: Registry,

    // Request metrics
    pub requests_total: CounterVec,
    pub request_duration: HistogramVec,

    // Wizard metrics
    pub transitions: CounterVec,
    pub validation_failures: CounterVec,
    pub completions: Counter,
    pub active_sessions: Gauge,
}

impl MetricsCollector {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let requests_total = CounterVec::new(
            Opts::new("multistep_requests_total", "Total number of requests"),
            &["method", "status"],
        )?;
        registry.register(Box::new(requests_total.clone()))?;

        let request_duration = HistogramVec::new(
            HistogramOpts::new("multistep_request_duration_seconds", "Request duration in seconds"),
            &["method"],
        )?;
        registry.register(Box::new(request_duration.clone()))?;

        let transitions = CounterVec::new(
            Opts::new("multistep_transitions_total", "Step transitions"),
            &["from", "to"],
        )?;
        registry.register(Box::new(transitions.clone()))?;

        let validation_failures = CounterVec::new(
            Opts::new(
                "multistep_validation_failures_total",
                "Submissions rejected by field validation",
            ),
            &["step"],
        )?;
        registry.register(Box::new(validation_failures.clone()))?;

        let completions = Counter::new("multistep_completions_total", "Completed wizards")?;
        registry.register(Box::new(completions.clone()))?;

        let active_sessions = Gauge::new("multistep_active_sessions", "Sessions held in memory")?;
        registry.register(Box::new(active_sessions.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            request_duration,
            transitions,
            validation_failures,
            completions,
            active_sessions,
        })
    }

    pub fn encode(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

pub struct MetricsHandler {
    collector: Arc<MetricsCollector>,
    sessions: SessionStore,
}

impl MetricsHandler {
    pub fn new(collector: Arc<MetricsCollector>, sessions: SessionStore) -> Self {
        Self {
            collector,
            sessions,
        }
    }

    pub async fn metrics(&self) -> String {
        self.refresh_sessions(Utc::now()).await;
        self.collector.encode().unwrap_or_else(|e| {
            tracing::error!("Failed to encode metrics: {}", e);
            String::from("# Error encoding metrics\n")
        })
    }

    /// Expire idle sessions so the gauge reflects live sessions at scrape time.
    pub(crate) async fn refresh_sessions(&self, now: DateTime<Utc>) {
        let purged = self.sessions.purge_expired_at(now).await;
        if purged > 0 {
            tracing::debug!(purged, "Dropped expired sessions");
        }
        self.collector
            .active_sessions
            .set(self.sessions.len().await as f64);
    }
}

/// Count requests and time them by method.
pub async fn track_requests(
    State(collector): State<Arc<MetricsCollector>>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().to_string();
    let timer = collector
        .request_duration
        .with_label_values(&[method.as_str()])
        .start_timer();

    let response = next.run(request).await;

    timer.observe_duration();
    collector
        .requests_total
        .with_label_values(&[method.as_str(), response.status().as_str()])
        .inc();
    response
}
