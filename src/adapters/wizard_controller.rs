//! HTTP entry points for the wizard
//!
//! The controller owns no wizard logic. It resolves the caller's session,
//! hands the stored state to [`WizardForm`], writes the returned state back,
//! and turns the outcome into a page, a redirect, or an error response.

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    Form,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::adapters::metrics_handler::MetricsCollector;
use crate::adapters::page_renderer::{PageRenderer, WizardPage};
use crate::adapters::session_store::{session_cookie, session_id_from_headers, SessionHandle, SessionStore};
use crate::adapters::submission_handler::LoggingSubmissionHandler;
use crate::config::Settings;
use crate::domain::wizard::{SubmitOutcome, WizardForm};
use crate::domain::{Action, FieldError, RawInput, SubmissionPort, WizardError, WizardSession};

/// Shared state for the wizard routes
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub wizard: Arc<WizardForm>,
    pub sessions: SessionStore,
    pub renderer: Arc<PageRenderer>,
    pub metrics: Arc<MetricsCollector>,
    pub submissions: Arc<dyn SubmissionPort>,
}

impl AppState {
    /// Standard wiring: the full step table and a log-only submission port.
    pub fn from_settings(settings: Settings) -> anyhow::Result<Self> {
        let renderer = PageRenderer::new(settings.wizard.site_name.clone())?;
        Ok(Self {
            sessions: SessionStore::new(settings.session.ttl_seconds),
            settings: Arc::new(settings),
            wizard: Arc::new(WizardForm::default()),
            renderer: Arc::new(renderer),
            metrics: Arc::new(MetricsCollector::new()?),
            submissions: Arc::new(LoggingSubmissionHandler::new()),
        })
    }

    async fn session(&self, headers: &HeaderMap) -> SessionHandle {
        let candidate = session_id_from_headers(headers, &self.settings.session.cookie_name);
        let handle = self.sessions.resolve(candidate).await;
        if handle.created {
            let purged = self.sessions.purge_expired().await;
            if purged > 0 {
                debug!(purged, "Dropped expired sessions");
            }
            self.metrics
                .active_sessions
                .set(self.sessions.len().await as f64);
        }
        handle
    }

    fn with_cookie(&self, handle: &SessionHandle, mut response: Response) -> Response {
        let session = &self.settings.session;
        let cookie = session_cookie(
            &session.cookie_name,
            &handle.id,
            session.ttl_seconds,
            session.secure_cookie,
        );
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().insert(header::SET_COOKIE, value);
            }
            Err(e) => error!("Invalid session cookie header: {}", e),
        }
        response
    }

    fn error_response(&self, status: StatusCode, message: &str) -> Response {
        let body = self.renderer.error_page(status.as_u16(), message);
        (status, Html(body)).into_response()
    }

    /// Render the current step, or fail hard if the step table is broken.
    fn page(
        &self,
        status: StatusCode,
        wizard: &WizardSession,
        errors: &[FieldError],
        input: Option<&RawInput>,
    ) -> Response {
        let form = match self.wizard.render(wizard) {
            Ok(form) => form,
            Err(e) => return self.wizard_failure(e),
        };
        let form = match input {
            Some(input) => form.with_submitted(input),
            None => form,
        };

        let page = WizardPage {
            form: &form,
            errors,
            messages: &[],
            action_path: &self.settings.wizard.path,
        };
        match self.renderer.wizard_page(&page) {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => {
                error!(step = %wizard.current_step, "Failed to render wizard page: {}", e);
                self.error_response(StatusCode::INTERNAL_SERVER_ERROR, "The page could not be rendered.")
            }
        }
    }

    fn wizard_failure(&self, e: WizardError) -> Response {
        if e.is_fatal() {
            error!("Wizard misconfigured: {}", e);
            self.error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "The wizard is misconfigured.",
            )
        } else {
            warn!("Rejected wizard request: {}", e);
            self.error_response(StatusCode::BAD_REQUEST, &e.to_string())
        }
    }
}

/// GET handler: show the current step of the caller's wizard.
pub async fn render_wizard(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let handle = state.session(&headers).await;
    let wizard = state.sessions.load(&handle.id).await.unwrap_or_default();

    let response = state.page(StatusCode::OK, &wizard, &[], None);
    state.with_cookie(&handle, response)
}

/// POST handler: apply the submitted step and show whatever comes next.
pub async fn submit_wizard(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(input): Form<RawInput>,
) -> Response {
    let handle = state.session(&headers).await;
    let wizard = state.sessions.load(&handle.id).await.unwrap_or_default();

    if input.get("form_id").map(String::as_str) != Some(state.wizard.form_id()) {
        warn!(session_id = %handle.id, "Submission for an unknown form");
        let response = state.error_response(StatusCode::BAD_REQUEST, "Invalid form submission.");
        return state.with_cookie(&handle, response);
    }

    // Enter submits the first button, which the form renders as "Next".
    let action = match input.get("op").map(|op| op.parse::<Action>()) {
        None => Action::Next,
        Some(Ok(action)) => action,
        Some(Err(e)) => {
            warn!(session_id = %handle.id, "{}", e);
            let response = state.error_response(StatusCode::BAD_REQUEST, &e.to_string());
            return state.with_cookie(&handle, response);
        }
    };

    let response = match state.wizard.submit(&wizard, action, &input) {
        Ok(SubmitOutcome::Transitioned { session, from, to }) => {
            info!(session_id = %handle.id, from = %from, to = %to, "Step transition");
            state
                .metrics
                .transitions
                .with_label_values(&[from.name(), to.name()])
                .inc();
            state.sessions.save(&handle.id, session.clone()).await;
            state.page(StatusCode::OK, &session, &[], None)
        }
        Ok(SubmitOutcome::Completed {
            session,
            confirmation,
        }) => {
            info!(session_id = %handle.id, "Wizard completed");
            if let Err(e) = state.submissions.submit(&session.values).await {
                error!(session_id = %handle.id, "Failed to hand off submission: {}", e);
            }
            state.metrics.completions.inc();
            state.sessions.clear_wizard(&handle.id).await;
            state
                .sessions
                .push_message(&handle.id, confirmation.message)
                .await;
            (
                StatusCode::SEE_OTHER,
                [(header::LOCATION, state.settings.wizard.front_page.clone())],
            )
                .into_response()
        }
        Err(WizardError::Validation { step, errors }) => {
            info!(session_id = %handle.id, step = %step, errors = errors.len(), "Validation failed");
            state
                .metrics
                .validation_failures
                .with_label_values(&[step.name()])
                .inc();
            state.page(StatusCode::UNPROCESSABLE_ENTITY, &wizard, &errors, Some(&input))
        }
        Err(e) => state.wizard_failure(e),
    };

    state.with_cookie(&handle, response)
}

/// Front page: shows and clears pending one-time messages.
pub async fn front_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let messages = match session_id_from_headers(&headers, &state.settings.session.cookie_name) {
        Some(id) => state.sessions.take_messages(&id).await,
        None => Vec::new(),
    };

    match state
        .renderer
        .front_page(&messages, &state.settings.wizard.path)
    {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Failed to render front page: {}", e);
            state.error_response(StatusCode::INTERNAL_SERVER_ERROR, "The page could not be rendered.")
        }
    }
}
