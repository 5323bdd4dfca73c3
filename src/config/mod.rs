use config::{Config, File};
use serde::{Deserialize, Serialize};

pub mod validator;

use crate::cli::Cli;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub wizard: WizardSettings,
    #[serde(default)]
    pub rate_limit: Option<RateLimitConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// Session cookie and expiry settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Name of the cookie carrying the session id
    pub cookie_name: String,
    /// Idle lifetime of a session in seconds
    pub ttl_seconds: u64,
    /// Add the `Secure` attribute to the session cookie
    pub secure_cookie: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            cookie_name: "multistep_session".to_string(),
            ttl_seconds: 1800,
            secure_cookie: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WizardSettings {
    /// Route serving the wizard form
    pub path: String,
    /// Where to redirect once the wizard is complete
    pub front_page: String,
    /// Site name shown in page titles
    pub site_name: String,
}

impl Default for WizardSettings {
    fn default() -> Self {
        Self {
            path: "/multistep".to_string(),
            front_page: "/".to_string(),
            site_name: "Multistep".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub requests_per_second: u32,
    pub burst_size: u32,
}

impl Settings {
    pub fn new() -> Result<Self, anyhow::Error> {
        Self::from_root(".")
    }

    /// Create settings from CLI arguments (includes config file and CLI overrides)
    pub fn new_with_cli(cli: &Cli) -> Result<Self, anyhow::Error> {
        let s = Config::builder()
            .add_source(File::from(cli.config.clone()).required(false))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .build()?;

        let mut settings: Settings = s.try_deserialize()?;

        // CLI > env vars > config file
        settings.apply_cli_overrides(cli);
        settings.validate()?;

        Ok(settings)
    }

    /// Load `multistep.{toml,yaml,json}` from `root`, falling back to defaults.
    pub fn from_root(root: &str) -> Result<Self, anyhow::Error> {
        let config_path = std::path::Path::new(root).join("multistep");
        let s = Config::builder()
            .add_source(File::from(config_path).required(false))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .build()?;

        let settings: Settings = s.try_deserialize()?;
        settings.validate()?;

        Ok(settings)
    }

    fn apply_cli_overrides(&mut self, cli: &Cli) {
        if let Some(host) = &cli.host {
            self.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        if let Some(ttl) = cli.session_ttl {
            self.session.ttl_seconds = ttl;
        }
        if let Some(path) = &cli.wizard_path {
            self.wizard.path = path.clone();
        }
    }

    fn validate(&self) -> Result<(), anyhow::Error> {
        validator::ConfigValidator::validate(self).map_err(|errors| {
            let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::anyhow!(
                "Configuration validation failed:\n{}",
                error_messages.join("\n")
            )
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            session: SessionSettings::default(),
            wizard: WizardSettings::default(),
            rate_limit: None,
        }
    }
}
