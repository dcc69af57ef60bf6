//! Serve command - Starts the HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::api::{create_router, AppState};
use crate::cli::args::ServeArgs;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::{Cache, CompletionScheduler, Database, SimulatedGateway, TokioCompletionScheduler};

pub async fn execute(args: ServeArgs, config: Config) -> AppResult<()> {
    tracing::info!("Starting server...");

    let db = Database::connect(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;
    tracing::info!("Database connected");

    let cache = Cache::connect(&config)
        .await
        .map_err(|e| AppError::internal(format!("Redis connection failed: {}", e)))?;
    tracing::info!("Redis cache connected");

    let gateway = Arc::new(SimulatedGateway::new(config.mpesa.failure_rate));
    let scheduler = Arc::new(TokioCompletionScheduler::new());
    tracing::info!(
        failure_rate = config.mpesa.failure_rate,
        completion_delay_secs = config.mpesa.completion_delay.as_secs(),
        "Simulated M-Pesa gateway ready"
    );

    let host = args.host.unwrap_or_else(|| config.server_host.clone());
    let port = args.port.unwrap_or(config.server_port);

    let app_state = AppState::from_config(
        Arc::new(db),
        Arc::new(cache),
        gateway,
        scheduler.clone(),
        config,
    );
    let app = create_router(app_state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server running on http://{}", addr);
    tracing::info!("Swagger UI at http://{}/swagger-ui", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    let cancelled = scheduler.shutdown();
    if cancelled > 0 {
        tracing::warn!(cancelled, "Dropped pending payment completions on shutdown");
    }

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Received shutdown signal");
}
