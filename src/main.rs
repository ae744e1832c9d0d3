//! Count Timer - a countdown timer controlled over HTTP
//!
//! This is the main entry point for the count-timer application.

use std::sync::Arc;

use tokio::{net::TcpListener, task::LocalSet};
use tracing::{error, info};

use count_timer::{
    api::create_router,
    config::Config,
    state::{AppState, ControlIntent},
    tasks::spawn_timer_driver,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("count_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting count-timer server v{}", env!("CARGO_PKG_VERSION"));
    let settings = config.timer_settings()?;
    info!(
        "Configuration: host={}, port={}, total={}, interval={}ms, reverse={}, boundary={:?}",
        config.host, config.port, settings.total_count, settings.interval_ms, settings.reverse, settings.boundary
    );

    // The timer is single-threaded and lives on this LocalSet
    let local = LocalSet::new();
    local
        .run_until(async move {
            let (command_tx, status_rx, driver) = spawn_timer_driver(settings);
            let state = Arc::new(AppState::new(config.port, config.host.clone(), command_tx, status_rx));

            if config.autostart {
                state.control(ControlIntent::Start).await?;
            }

            // Create HTTP router with all endpoints
            let app = create_router(state);

            // Bind to the specified address
            let addr = config.address();
            let listener = TcpListener::bind(&addr).await?;

            info!("Server running on http://{}", addr);
            info!("Endpoints:");
            info!("  POST /start    - Start a new run");
            info!("  POST /pause    - Pause the current run");
            info!("  POST /resume   - Resume a paused run");
            info!("  POST /stop     - Stop and reset");
            info!("  PUT  /settings - Reconfigure a stopped timer");
            info!("  GET  /status   - Current count and state");
            info!("  GET  /health   - Health check");

            // Setup graceful shutdown: serve returns once every connection is closed
            let shutdown = async {
                match shutdown_signal().await {
                    Ok(signal) => info!("Shutdown signal {} received", signal),
                    Err(e) => error!("Signal handling failed, shutting down: {}", e),
                }
            };
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(shutdown)
                .await
            {
                error!("Server error: {}", e);
            }

            // The router owned the last command sender, so the driver now
            // stops the timer and exits
            driver.await??;
            info!("Server shutdown complete");
            Ok::<(), anyhow::Error>(())
        })
        .await
}
