//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event as SseEvent, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream};
use tracing::{debug, error, info, warn};

use crate::{
    error::{AppError, EditError},
    state::{AppState, PlayOutcome, TimerSnapshot},
};
use super::responses::{
    AddEventRequest, ApiResponse, ErrorResponse, HealthResponse, MoveEventRequest,
    ScheduleResponse, StatusResponse,
};

type HandlerError = (StatusCode, Json<ErrorResponse>);

/// Map an application error to a status code and error body
fn error_response(e: AppError) -> HandlerError {
    let status = match &e {
        AppError::Edit(EditError::RunActive) => StatusCode::CONFLICT,
        AppError::Edit(EditError::IndexOutOfRange { .. }) => StatusCode::NOT_FOUND,
        AppError::Edit(EditError::InvalidEvent(_)) => StatusCode::UNPROCESSABLE_ENTITY,
        AppError::Store(_) | AppError::LockPoisoned(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        error!("Request failed: {}", e);
    } else {
        warn!("Request rejected: {}", e);
    }
    (status, Json(ErrorResponse::new(e.to_string())))
}

/// Handle POST /play - Start the active event or advance to the next one
pub async fn play_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    match state.play() {
        Ok((outcome, timer)) => {
            let (status, message) = match outcome {
                PlayOutcome::Started { index, seconds, .. } => {
                    ("running", format!("Started event {} for {}s", index, seconds))
                }
                PlayOutcome::ExpiredImmediately { index, completed: true } => {
                    ("exhausted", format!("Event {} has no duration; all events completed", index))
                }
                PlayOutcome::ExpiredImmediately { index, completed: false } => {
                    ("expired", format!("Event {} has no duration", index))
                }
                PlayOutcome::Ignored(reason) => ("ignored", reason.describe().to_string()),
            };
            info!("Play endpoint called - {}", message);
            Ok(Json(ApiResponse::new(status, message, timer)))
        }
        Err(e) => {
            error!("Failed to play: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /reset - Return to the first event
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    match state.reset() {
        Ok(timer) => {
            info!("Reset endpoint called - timer back at first event");
            Ok(Json(ApiResponse::new("idle", "Timer reset to first event".to_string(), timer)))
        }
        Err(e) => {
            error!("Failed to reset: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Stream timer snapshots as server-sent events, starting with the current one
pub async fn timer_stream_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    debug!("Timer stream subscriber connected");
    let updates = stream::unfold((state.subscribe_timer(), true), |(mut rx, first)| async move {
        if !first && rx.changed().await.is_err() {
            return None;
        }
        let snapshot = rx.borrow_and_update().clone();
        Some((Ok(timer_event(&snapshot)), (rx, false)))
    });

    Sse::new(updates).keep_alive(KeepAlive::default())
}

fn timer_event(snapshot: &TimerSnapshot) -> SseEvent {
    SseEvent::default()
        .event("timer")
        .json_data(snapshot)
        .unwrap_or_else(|e| {
            warn!("Failed to encode timer snapshot: {}", e);
            SseEvent::default().comment("snapshot unavailable")
        })
}

/// Handle GET /status - Return current timer status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let timer = match state.snapshot() {
        Ok(t) => t,
        Err(e) => {
            error!("Failed to get timer state: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /schedule - Return the ordered event list
pub async fn schedule_handler(State(state): State<Arc<AppState>>) -> Result<Json<ScheduleResponse>, HandlerError> {
    let schedule = state.schedule().map_err(error_response)?;
    let message = if schedule.is_empty() {
        "No schedules found. Add some events.".to_string()
    } else {
        format!("{} events", schedule.len())
    };
    Ok(Json(ScheduleResponse::new(message, schedule)))
}

/// Handle POST /schedule/events - Append an event
pub async fn add_event_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AddEventRequest>,
) -> Result<(StatusCode, Json<ScheduleResponse>), HandlerError> {
    let (event, schedule) = state
        .add_event(&request.title, request.duration)
        .await
        .map_err(error_response)?;

    info!("Added event {} ({}s)", event.title, event.duration);
    Ok((
        StatusCode::CREATED,
        Json(ScheduleResponse::new(format!("Added event {}", event.title), schedule)),
    ))
}

/// Handle DELETE /schedule/events/:index - Remove an event
pub async fn remove_event_handler(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> Result<Json<ScheduleResponse>, HandlerError> {
    let (event, schedule) = state.remove_event(index).await.map_err(error_response)?;

    info!("Removed event {} at {}", event.title, index);
    Ok(Json(ScheduleResponse::new(format!("Removed event {}", event.title), schedule)))
}

/// Handle POST /schedule/events/:index/move - Reorder an event
pub async fn move_event_handler(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
    Json(request): Json<MoveEventRequest>,
) -> Result<Json<ScheduleResponse>, HandlerError> {
    let schedule = state
        .move_event(index, request.to)
        .await
        .map_err(error_response)?;

    info!("Moved event from {} to {}", index, request.to);
    Ok(Json(ScheduleResponse::new(
        format!("Moved event {} to {}", index, request.to),
        schedule,
    )))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
