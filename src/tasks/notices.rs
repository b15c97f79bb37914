//! Notice logging background task

use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::state::{AppState, TimerNotice};

/// Background task that reports expiry and completion notices in the log
pub async fn notice_logger_task(state: Arc<AppState>) {
    info!("Starting notice logger task");

    let mut notice_rx = state.subscribe_notices();

    loop {
        match notice_rx.recv().await {
            Ok(TimerNotice::EventExpired { index, title }) => {
                info!("TIME UP: event {} ({}) finished, play to start the next one", index, title);
            }
            Ok(TimerNotice::ScheduleCompleted { events }) => {
                info!("All events completed! ({} events)", events);
            }
            Ok(TimerNotice::PlayRejected { reason }) => {
                info!("Play rejected: {}", reason);
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Notice logger lagged, skipped {} notices", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }

    info!("Notice channel closed, notice logger stopped");
}
