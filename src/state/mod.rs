//! State management module
//!
//! This module contains the schedule model, the timer state machine and the
//! shared application state that serializes access to it.

pub mod app_state;
pub mod controller;
pub mod notice;
pub mod schedule;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use controller::{PlayIgnored, PlayOutcome, ScheduleController, TickOutcome};
pub use notice::TimerNotice;
pub use schedule::{Event, Schedule};
pub use timer_state::{TimerPhase, TimerSnapshot, TimerState};
