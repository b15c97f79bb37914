//! Tick listener background task

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::{state::AppState, tasks::Tick};

/// Background task that applies clock source ticks to the shared state, one at a time
pub async fn tick_listener_task(state: Arc<AppState>, mut tick_rx: mpsc::UnboundedReceiver<Tick>) {
    info!("Starting tick listener task");

    while let Some(tick) = tick_rx.recv().await {
        if let Err(e) = state.apply_tick(tick) {
            error!("Failed to apply tick {:?}: {}", tick, e);
        }
    }

    info!("Tick channel closed, tick listener stopped");
}
