use std::net::SocketAddr;

use axum::Router;
use common::utils::logging::init_logging_default;
use dotenvy::dotenv;
use migration::MigratorTrait;
use tracing::info;

use crate::auth::ServerAuthConfig;
use crate::errors::StartupError;
use crate::routes;
use crate::state::ServerState;

/// Initialize logging via shared common utils
fn init_logging() {
    init_logging_default();
}

fn bind_addr(cfg: &configs::ServerConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.host, cfg.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address {}:{}: {e}", cfg.host, cfg.port)))
}

/// Resolves when the process receives Ctrl+C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    let cfg = configs::AppConfig::load_or_env()?;

    // DB connection
    let db = models::db::connect_with_config(&cfg.database).await?;
    if cfg.database.auto_migrate {
        migration::Migrator::up(&db, None).await?;
        info!("database migrations applied");
    }

    let state = ServerState::new(db, ServerAuthConfig { jwt_secret: cfg.auth.jwt_secret.clone() });
    let app: Router = routes::build_router(state);

    // Bind and serve
    let addr = bind_addr(&cfg.server)?;
    info!(%addr, "starting server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    info!("server stopped");
    Ok(())
}
