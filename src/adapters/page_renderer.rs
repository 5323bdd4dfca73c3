//! HTML rendering for the wizard and front pages
//!
//! Templates are embedded into the binary from `assets/templates` and compiled
//! once at startup. Autoescaping is on for every template.

use rust_embed::RustEmbed;
use serde::Serialize;
use tera::{Context, Tera};
use thiserror::Error;

use crate::domain::{FieldError, StepForm};

#[derive(RustEmbed)]
#[folder = "assets/"]
pub struct Assets;

const TEMPLATE_DIR: &str = "templates/";

/// Templates the renderer cannot work without.
const REQUIRED_TEMPLATES: [&str; 4] = ["base.html", "wizard.html", "front.html", "error.html"];

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Missing template: {0}")]
    MissingTemplate(String),

    #[error("Template {0} is not valid UTF-8")]
    Encoding(String),
}

/// Data for one wizard page.
#[derive(Debug, Serialize)]
pub struct WizardPage<'a> {
    pub form: &'a StepForm,
    pub errors: &'a [FieldError],
    pub messages: &'a [String],
    pub action_path: &'a str,
}

pub struct PageRenderer {
    tera: Tera,
    site_name: String,
}

impl PageRenderer {
    pub fn new(site_name: impl Into<String>) -> Result<Self, RenderError> {
        let mut templates = Vec::new();
        for path in Assets::iter().filter(|p| p.starts_with(TEMPLATE_DIR)) {
            let file = Assets::get(&path).ok_or_else(|| RenderError::MissingTemplate(path.to_string()))?;
            let source = String::from_utf8(file.data.into_owned())
                .map_err(|_| RenderError::Encoding(path.to_string()))?;
            templates.push((path.trim_start_matches(TEMPLATE_DIR).to_string(), source));
        }

        Self::from_templates(site_name, templates)
    }

    /// Build a renderer from in-memory templates.
    pub fn from_templates(
        site_name: impl Into<String>,
        templates: Vec<(String, String)>,
    ) -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(templates)?;

        let loaded: Vec<&str> = tera.get_template_names().collect();
        if let Some(missing) = REQUIRED_TEMPLATES.iter().find(|t| !loaded.contains(t)) {
            return Err(RenderError::MissingTemplate(missing.to_string()));
        }

        Ok(Self {
            tera,
            site_name: site_name.into(),
        })
    }

    fn context(&self, messages: &[String]) -> Context {
        let mut context = Context::new();
        context.insert("site_name", &self.site_name);
        context.insert("messages", messages);
        context
    }

    pub fn wizard_page(&self, page: &WizardPage<'_>) -> Result<String, RenderError> {
        let mut context = self.context(page.messages);
        context.insert("form", page.form);
        context.insert("errors", page.errors);
        context.insert("action_path", page.action_path);
        Ok(self.tera.render("wizard.html", &context)?)
    }

    pub fn front_page(&self, messages: &[String], wizard_path: &str) -> Result<String, RenderError> {
        let mut context = self.context(messages);
        context.insert("wizard_path", wizard_path);
        Ok(self.tera.render("front.html", &context)?)
    }

    /// Error page; falls back to plain text if the template itself fails.
    pub fn error_page(&self, status: u16, message: &str) -> String {
        let mut context = self.context(&[]);
        context.insert("status", &status);
        context.insert("message", message);
        self.tera
            .render("error.html", &context)
            .unwrap_or_else(|e| {
                tracing::error!("Failed to render error page: {}", e);
                format!("{} {}", status, message)
            })
    }
}
