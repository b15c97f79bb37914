//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::{Schedule, TimerSnapshot};

/// API response structure for timer command endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerSnapshot,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: &str, message: String, timer: TimerSnapshot) -> Self {
        Self {
            status: status.to_string(),
            message,
            timestamp: Utc::now(),
            timer,
        }
    }
}

/// Status response with timer and server information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timer: TimerSnapshot,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Response for schedule reads and edits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleResponse {
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub events: Schedule,
}

impl ScheduleResponse {
    pub fn new(message: String, events: Schedule) -> Self {
        Self {
            message,
            timestamp: Utc::now(),
            events,
        }
    }
}

/// Error body returned alongside a non-success status code
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(error: String) -> Self {
        Self {
            error,
            timestamp: Utc::now(),
        }
    }
}

/// Body of `POST /schedule/events`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddEventRequest {
    pub title: String,
    pub duration: i64,
}

/// Body of `POST /schedule/events/:index/move`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveEventRequest {
    pub to: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
