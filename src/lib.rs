//! Schedule Timer - A state-managed HTTP server that counts down a schedule of timed events
//!
//! This library provides the schedule timer controller, the clock source that
//! drives it, the JSON schedule store and the HTTP surface used to operate it.

pub mod config;
pub mod error;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, EditError, StoreError};
pub use state::{AppState, ScheduleController};
pub use api::create_router;
pub use utils::signals::shutdown_signal;
