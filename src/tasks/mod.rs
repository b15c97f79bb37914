//! Background tasks module
//!
//! This module contains the clock source and the tasks that run alongside the HTTP server.

pub mod clock_source;
pub mod notices;
pub mod tick_listener;

// Re-export main types and functions
pub use clock_source::{ClockSource, IntervalClock, Tick};
pub use notices::notice_logger_task;
pub use tick_listener::tick_listener_task;
