//! Web-novel platform HTTP server.

use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::Notify;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use webnovel_core::environment::SystemClock;
use webnovel_platform::config::Config;
use webnovel_platform::identity::OidcIdentityProvider;
use webnovel_platform::server::{AppState, build_router};
use webnovel_platform::Platform;
use webnovel_postgres::PostgresDatabase;
use webnovel_runtime::metrics::MetricsServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,webnovel_platform=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting web-novel platform server");

    let config = Config::from_env();
    let listen_addr = config.listen_addr()?;
    let calendar = config.calendar()?;
    info!(
        listen_addr = %listen_addr,
        timezone_offset_seconds = config.business.timezone_offset_seconds,
        "Configuration loaded"
    );

    info!("Connecting to database...");
    let database = PostgresDatabase::connect(&config.database.url, &config.pool_settings())
        .await
        .context("database connection failed")?;
    if config.database.run_migrations {
        database.migrate().await.context("migrations failed")?;
        info!("Migrations applied");
    }

    let mut metrics = MetricsServer::new(config.metrics_addr()?);
    metrics.start()?;

    let identity = OidcIdentityProvider::new(config.identity.clone(), config.identity_retry())?;
    let platform = Platform::new(Arc::new(database), Arc::new(SystemClock), calendar);
    let state = AppState::new(platform, Arc::new(identity)).with_metrics(Arc::new(metrics));
    let app = build_router(state, Duration::from_secs(config.server.request_timeout));

    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    info!(addr = %listen_addr, "Server listening");

    let shutdown = Arc::new(Notify::new());
    let graceful = {
        let shutdown = Arc::clone(&shutdown);
        async move { shutdown.notified().await }
    };
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(graceful)
            .await
    });

    shutdown_signal().await;
    shutdown.notify_one();

    let grace = Duration::from_secs(config.server.shutdown_timeout);
    match tokio::time::timeout(grace, server).await {
        Ok(joined) => joined??,
        Err(_) => warn!(grace_seconds = grace.as_secs(), "Shutdown timed out, dropping connections"),
    }

    info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down gracefully..."),
        () = terminate => info!("Received SIGTERM, shutting down gracefully..."),
    }
}
