//! Error types for the wizard state machine

use serde::Serialize;
use thiserror::Error;

use super::step::{Action, Step};

/// A validation failure attached to one form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors produced while rendering or submitting a wizard step
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    /// Submitted input failed field validation; the step does not change
    #[error("Validation failed on step {step}: {} field error(s)", .errors.len())]
    Validation { step: Step, errors: Vec<FieldError> },

    /// The step does not expose the triggered action
    #[error("Action '{action}' is not available on step {step}")]
    ActionUnavailable { step: Step, action: Action },

    /// The session already finished the wizard
    #[error("Wizard already completed")]
    AlreadyComplete,

    /// No render/submit pair is registered for the step
    #[error("No handler registered for step '{0}'")]
    MissingHandler(Step),

    /// A transition computed a position outside the step sequence
    #[error("Step position {0} is outside the wizard")]
    StepOutOfRange(usize),
}

impl WizardError {
    /// Fatal errors indicate a broken deployment, not bad user input.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::MissingHandler(_) | Self::StepOutOfRange(_))
    }

    /// Field errors for re-rendering, empty for every other kind.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::Validation { errors, .. } => errors,
            _ => &[],
        }
    }
}

/// Result type alias for wizard operations
pub type WizardResult<T> = Result<T, WizardError>;
