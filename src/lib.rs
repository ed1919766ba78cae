pub mod api;
pub mod config;
pub mod core_state;
pub mod db;
pub mod models;
pub mod scheduling;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

/// Failures that stop the service before it starts serving.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Database initialization failed: {0}")]
    Core(#[from] core_state::CoreError),
    #[error("Cannot bind API server: {0}")]
    Bind(#[from] std::io::Error),
}

/// Install the global tracing subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}

/// Load configuration, prepare the database and serve until Ctrl-C.
pub async fn run() -> Result<(), StartupError> {
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = config::ServerConfig::from_env()?;
    tracing::info!(
        bind = %config.bind,
        database = %config.database_path.display(),
        max_daily_per_doctor = config.rules.max_daily_per_doctor,
        opens_at = %config.rules.opens_at,
        closes_at = %config.rules.closes_at,
        "Configuration loaded"
    );

    let core = Arc::new(core_state::CoreState::from_config(&config));
    core.initialize()?;

    let mut server = api::start_api_server(core, config.bind).await?;

    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Ctrl-C received"),
        Err(e) => tracing::error!("Cannot listen for Ctrl-C: {e}"),
    }

    server.shutdown();
    server.wait().await;
    Ok(())
}
