//! Flomodoro - A flow/pomodoro work timer
//! 
//! This is the main entry point for the flomodoro server.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use flomodoro::{
    config::Config,
    state::AppState,
    api::create_router,
    services::JsonFileStore,
    tasks::{alert_cue_task, ticker_task},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("flomodoro={},tower_http=info", config.log_level()))
        .init();

    info!("Starting flomodoro server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, state_dir={}, tick={}ms",
          config.host, config.port, config.state_dir.display(), config.tick_ms);

    // Restore the engine from the saved record, if any
    let store = JsonFileStore::new(&config.state_dir);
    info!("Timer state file: {}", store.path().display());
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        config.tick_interval(),
        Box::new(store),
    ));

    // Start the background tasks
    let ticker_state = Arc::clone(&state);
    tokio::spawn(async move {
        ticker_task(ticker_state).await;
    });
    let alert_state = Arc::clone(&state);
    let bell = config.bell;
    tokio::spawn(async move {
        alert_cue_task(alert_state, bell).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /toggle       - Start or pause the timer");
    info!("  POST /start        - Start the timer");
    info!("  POST /pause        - Pause the timer");
    info!("  POST /phase        - Switch between work and break");
    info!("  POST /mode         - Switch between flow and pomodoro mode");
    info!("  POST /break/reset  - Discard banked break time");
    info!("  POST /total/edit   - Begin editing total work (PUT to stage values)");
    info!("  POST /total/commit - Set total work from hours/minutes/seconds");
    info!("  POST /total/cancel - Cancel the total work edit");
    info!("  GET  /status       - Current timer snapshot");
    info!("  GET  /health       - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = wait_for_shutdown() => {
            info!("Shutdown signal received");
        }
    }

    // Bank the time elapsed since the last tick before exiting
    if let Err(e) = state.pause() {
        tracing::warn!("Failed to pause timer on shutdown: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Resolve on SIGTERM/SIGINT; if signals cannot be watched, keep serving
async fn wait_for_shutdown() {
    if let Err(e) = shutdown_signal().await {
        tracing::error!("Signal handling unavailable: {:#}", e);
        std::future::pending::<()>().await;
    }
}
