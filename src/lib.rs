//! # Multistep - room and service rating wizard
//!
//! Multistep serves a three-step HTML form (room rating, service rating,
//! review with an optional email address) from a single URL. Answers are kept
//! per browser session while the visitor moves back and forth, and the
//! finished submission is handed to a [`domain::SubmissionPort`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use multistep::adapters::wizard_controller::AppState;
//! use multistep::config::Settings;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::new()?;
//!     let state = AppState::from_settings(settings)?;
//!     let app = multistep::create_app(state);
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Domain**: steps, session state and the wizard state machine
//! - **Adapters**: HTTP handlers, session storage, rendering, metrics
//! - **Config**: configuration loading and validation

pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;

use crate::adapters::asset_handler::AssetHandler;
use crate::adapters::health_handler::HealthHandler;
use crate::adapters::metrics_handler::{track_requests, MetricsHandler};
use crate::adapters::wizard_controller::{self, AppState};
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Creates the Axum application router with all endpoints configured.
///
/// # Arguments
///
/// * `state` - Shared wizard state (settings, step table, sessions, renderer, metrics)
///
/// # Returns
///
/// Configured Axum Router
pub fn create_app(state: AppState) -> Router {
    let health_handler = Arc::new(HealthHandler::new(
        state.wizard.clone(),
        state.sessions.clone(),
    ));
    let metrics_handler = Arc::new(MetricsHandler::new(
        state.metrics.clone(),
        state.sessions.clone(),
    ));
    let metrics = state.metrics.clone();

    // Operational routes
    let ops_router = Router::new()
        .route("/health", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.health().await }
            }
        }))
        .route("/health/ready", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.ready().await }
            }
        }))
        .route("/health/live", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.live().await }
            }
        }))
        .route("/metrics", get({
            let handler = metrics_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.metrics().await }
            }
        }));

    let rate_limit = state
        .settings
        .rate_limit
        .clone()
        .filter(|rate_limit| rate_limit.enabled);

    let front_page = state.settings.wizard.front_page.clone();
    let wizard_path = state.settings.wizard.path.clone();

    // Site routes
    let mut site_router = Router::new()
        .route(&front_page, get(wizard_controller::front_page))
        .route(
            &wizard_path,
            get(wizard_controller::render_wizard).post(wizard_controller::submit_wizard),
        )
        .route("/static/*path", get(AssetHandler::serve))
        .with_state(state)
        .layer(axum::middleware::from_fn_with_state(metrics, track_requests));

    // Apply Rate Limiting to site routes if enabled
    if let Some(rate_limit) = rate_limit {
        let limiter = crate::adapters::rate_limit::create_limiter(
            rate_limit.requests_per_second,
            rate_limit.burst_size,
        );

        site_router = site_router.layer(axum::middleware::from_fn_with_state(
            limiter,
            crate::adapters::rate_limit::rate_limit_middleware,
        ));
    }

    ops_router.merge(site_router).layer(TraceLayer::new_for_http())
}
