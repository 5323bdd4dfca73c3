use thiserror::Error;

use crate::config::{RateLimitConfig, ServerSettings, SessionSettings, Settings, WizardSettings};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Route conflict: {0}")]
    RouteConflict(String),
}

/// Paths owned by the server itself; the wizard may not be mounted on them.
const RESERVED_PREFIXES: [&str; 3] = ["/health", "/metrics", "/static"];

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(settings: &Settings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = Self::validate_server(&settings.server) {
            errors.extend(e);
        }

        if let Err(e) = Self::validate_session(&settings.session) {
            errors.extend(e);
        }

        if let Err(e) = Self::validate_wizard(&settings.wizard) {
            errors.extend(e);
        }

        if let Some(rate_limit) = &settings.rate_limit {
            if let Err(e) = Self::validate_rate_limit(rate_limit) {
                errors.extend(e);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_server(server: &ServerSettings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if server.host.is_empty() {
            errors.push(ValidationError::MissingField("server.host".to_string()));
        }

        if server.port == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_session(session: &SessionSettings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if session.cookie_name.is_empty() {
            errors.push(ValidationError::MissingField("session.cookie_name".to_string()));
        } else if !session
            .cookie_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            errors.push(ValidationError::InvalidValue {
                field: "session.cookie_name".to_string(),
                reason: "Only ASCII letters, digits, '_' and '-' are allowed".to_string(),
            });
        }

        if session.ttl_seconds == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "session.ttl_seconds".to_string(),
                reason: "Session lifetime must be greater than 0".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_wizard(wizard: &WizardSettings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        for (field, path) in [("wizard.path", &wizard.path), ("wizard.front_page", &wizard.front_page)] {
            if path.is_empty() {
                errors.push(ValidationError::MissingField(field.to_string()));
            } else if !path.starts_with('/') {
                errors.push(ValidationError::InvalidValue {
                    field: field.to_string(),
                    reason: format!("'{}' must start with '/'", path),
                });
            }
        }

        if wizard.path == "/" {
            errors.push(ValidationError::RouteConflict(
                "wizard.path cannot be the site root".to_string(),
            ));
        }

        if wizard.path == wizard.front_page {
            errors.push(ValidationError::RouteConflict(format!(
                "wizard.path and wizard.front_page are both '{}'",
                wizard.path
            )));
        }

        for (field, path) in [("wizard.path", &wizard.path), ("wizard.front_page", &wizard.front_page)] {
            if let Some(prefix) = RESERVED_PREFIXES
                .iter()
                .find(|prefix| path.starts_with(*prefix))
            {
                errors.push(ValidationError::RouteConflict(format!(
                    "{} '{}' overlaps the reserved '{}' routes",
                    field, path, prefix
                )));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_rate_limit(rate_limit: &RateLimitConfig) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if rate_limit.enabled && rate_limit.requests_per_second == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "rate_limit.requests_per_second".to_string(),
                reason: "Must be greater than 0 when rate limiting is enabled".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
