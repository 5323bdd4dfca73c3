use clap::Parser;
use multistep::adapters::wizard_controller::AppState;
use multistep::cli::Cli;
use multistep::config::Settings;
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Load configuration
    let settings = Settings::new_with_cli(&cli)?;
    let host = settings.server.host.clone();
    let port = settings.server.port;

    info!(
        wizard_path = %settings.wizard.path,
        session_ttl = settings.session.ttl_seconds,
        "Starting Multistep on {}:{}",
        host,
        port
    );

    let state = AppState::from_settings(settings)?;
    let app = multistep::create_app(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
