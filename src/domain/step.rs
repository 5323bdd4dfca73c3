//! The ordered step sequence of the wizard.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One page of the wizard, identified by its 1-based position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Room,
    Service,
    Review,
}

impl Step {
    /// All steps in the order they are visited.
    pub const ALL: [Step; 3] = [Step::Room, Step::Service, Step::Review];

    /// Number of steps in the wizard.
    pub const COUNT: usize = Self::ALL.len();

    /// The step a fresh session starts on.
    pub fn initial() -> Self {
        Step::Room
    }

    pub fn name(&self) -> &'static str {
        match self {
            Step::Room => "room",
            Step::Service => "service",
            Step::Review => "review",
        }
    }

    /// 1-based ordinal position.
    pub fn position(&self) -> usize {
        match self {
            Step::Room => 1,
            Step::Service => 2,
            Step::Review => 3,
        }
    }

    /// Look up a step by its 1-based position.
    pub fn from_position(position: usize) -> Option<Self> {
        position
            .checked_sub(1)
            .and_then(|idx| Self::ALL.get(idx))
            .copied()
    }

    pub fn previous(&self) -> Option<Self> {
        Self::from_position(self.position() - 1)
    }

    pub fn next(&self) -> Option<Self> {
        Self::from_position(self.position() + 1)
    }

    pub fn is_initial(&self) -> bool {
        self.previous().is_none()
    }

    pub fn is_last(&self) -> bool {
        self.next().is_none()
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown step: {0}")]
pub struct UnknownStep(pub String);

impl FromStr for Step {
    type Err = UnknownStep;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|step| step.name().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| UnknownStep(s.to_string()))
    }
}

/// Which submit button triggered the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Back,
    Next,
}

impl Action {
    pub fn id(&self) -> &'static str {
        match self {
            Action::Back => "back",
            Action::Next => "next",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Action::Back => "Back",
            Action::Next => "Next",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown action: {0}")]
pub struct UnknownAction(pub String);

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "back" => Ok(Action::Back),
            "next" => Ok(Action::Next),
            _ => Err(UnknownAction(s.to_string())),
        }
    }
}
