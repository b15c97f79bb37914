//! Schedule Timer - A state-managed HTTP server that counts down a schedule of timed events
//!
//! This is the main entry point for the schedule-timer application.

use std::sync::Arc;
use tokio::{net::TcpListener, sync::mpsc};
use tracing::info;

use schedule_timer::{
    config::Config,
    state::AppState,
    api::create_router,
    services::JsonFileStore,
    tasks::{notice_logger_task, tick_listener_task, IntervalClock},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("schedule_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting schedule-timer server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, schedule={}, tick={}ms",
          config.host, config.port, config.schedule_file.display(), config.tick_millis);

    // Clock source ticks flow through one channel into the tick listener
    let (tick_tx, tick_rx) = mpsc::unbounded_channel();
    let clock = Arc::new(IntervalClock::new(tick_tx, config.tick_interval()));
    let store = JsonFileStore::new(config.schedule_file.clone());

    // Create application state
    let state = Arc::new(AppState::new(config.port, config.host.clone(), store, clock));

    let tick_state = Arc::clone(&state);
    tokio::spawn(async move {
        tick_listener_task(tick_state, tick_rx).await;
    });

    let notice_state = Arc::clone(&state);
    tokio::spawn(async move {
        notice_logger_task(notice_state).await;
    });

    // Load failures degrade to an empty schedule inside the controller
    let snapshot = state.load().await?;
    info!("Loaded {} events", snapshot.event_count);

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST   /play                        - Start or advance the countdown");
    info!("  POST   /reset                       - Return to the first event");
    info!("  GET    /status                      - Current timer state");
    info!("  GET    /timer/stream                - Timer updates as server-sent events");
    info!("  GET    /schedule                    - List events");
    info!("  POST   /schedule/events             - Add an event");
    info!("  DELETE /schedule/events/:index      - Remove an event");
    info!("  POST   /schedule/events/:index/move - Reorder an event");
    info!("  GET    /health                      - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
