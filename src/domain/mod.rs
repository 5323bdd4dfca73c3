use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

pub mod error;
pub mod step;
pub mod wizard;

pub use error::{FieldError, WizardError, WizardResult};
pub use step::{Action, Step};

/// A stored answer for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Rating(u8),
    Text(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Rating(r) => write!(f, "{}", r),
            FieldValue::Text(t) => f.write_str(t),
        }
    }
}

/// Accumulated answers, keyed by field name.
pub type FieldMap = BTreeMap<String, FieldValue>;

/// Raw form input as posted by the browser.
pub type RawInput = HashMap<String, String>;

/// Per-session wizard state.
///
/// The state lives in the session store between requests. Handlers receive a
/// reference and hand back a new value, never mutating shared instances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardSession {
    pub current_step: Step,
    pub values: FieldMap,
    pub complete: bool,
}

impl WizardSession {
    pub fn new() -> Self {
        Self {
            current_step: Step::initial(),
            values: FieldMap::new(),
            complete: false,
        }
    }

    pub fn value(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    /// Merge newly submitted values; incoming entries win over stored ones.
    pub fn merged(mut self, incoming: FieldMap) -> Self {
        self.values.extend(incoming);
        self
    }

    pub fn at(mut self, step: Step) -> Self {
        self.current_step = step;
        self
    }
}

impl Default for WizardSession {
    fn default() -> Self {
        Self::new()
    }
}

/// How a field is presented and validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    Radios { options: Vec<u8> },
    Email,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDefinition {
    pub name: String,
    pub label: String,
    pub description: Option<String>,
    pub kind: FieldKind,
    pub required: bool,
    /// Previously submitted value, if any
    pub default_value: Option<String>,
}

/// A label/value row of the review summary table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionButton {
    pub id: String,
    pub label: String,
}

impl From<Action> for ActionButton {
    fn from(action: Action) -> Self {
        Self {
            id: action.id().to_string(),
            label: action.label().to_string(),
        }
    }
}

/// Everything needed to draw one step of the wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepForm {
    pub form_id: String,
    pub step: Step,
    pub position: usize,
    pub total: usize,
    pub fields: Vec<FieldDefinition>,
    pub actions: Vec<ActionButton>,
    pub summary: Vec<SummaryRow>,
}

impl StepForm {
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn has_action(&self, action: Action) -> bool {
        self.actions.iter().any(|a| a.id == action.id())
    }

    /// Show the raw input again after a failed submission.
    pub fn with_submitted(mut self, input: &RawInput) -> Self {
        for field in &mut self.fields {
            if let Some(raw) = input.get(&field.name) {
                let raw = raw.trim();
                field.default_value = (!raw.is_empty()).then(|| raw.to_string());
            }
        }
        self
    }
}

/// One-time message shown after the final step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Confirmation {
    pub message: String,
}

/// Receives the answers of a finished wizard.
#[async_trait]
pub trait SubmissionPort: Send + Sync {
    async fn submit(&self, values: &FieldMap) -> anyhow::Result<()>;
}
