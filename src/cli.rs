use clap::Parser;
use std::path::PathBuf;

/// Multistep - a three-step room and service rating wizard
#[derive(Parser, Debug, Clone)]
#[command(name = "multistep", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "MULTISTEP_CONFIG", default_value = "multistep.toml")]
    pub config: PathBuf,

    /// Server host address
    #[arg(long, env = "MULTISTEP_HOST")]
    pub host: Option<String>,

    /// Server port
    #[arg(long, env = "MULTISTEP_PORT")]
    pub port: Option<u16>,

    /// Idle session lifetime in seconds
    #[arg(long, env = "MULTISTEP_SESSION_TTL")]
    pub session_ttl: Option<u64>,

    /// Route serving the wizard form
    #[arg(long, env = "MULTISTEP_WIZARD_PATH")]
    pub wizard_path: Option<String>,
}
