use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::domain::app_config::AppConfig;
use crate::domain::error::{AppError, Result};
use crate::infrastructure::config::ConfigService;
use crate::interfaces::http::{start_server, HttpState};

pub fn run() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let config = ConfigService::default().load().map_err(|err| {
        error!(error = %err, "Failed to load configuration");
        err
    })?;

    actix_web::rt::System::new().block_on(serve(config))
}

async fn serve(config: AppConfig) -> Result<()> {
    let state = HttpState::from_config(&config)?;

    let server = start_server(state, &config).map_err(|err| {
        error!(
            error = %err,
            host = %config.host,
            port = config.port,
            "Failed to bind HTTP server"
        );
        AppError::from(err)
    })?;

    server.await?;
    info!("HTTP server stopped");
    Ok(())
}
