//! Timer state structure and its published snapshot

use serde::{Deserialize, Serialize};

use super::Schedule;
use crate::utils::format::{format_clock, is_low_time};

/// Observable phase of the schedule countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPhase {
    Unloaded,
    Idle,
    Running,
    Expired,
    /// The last event expired. Only a reset leaves this phase.
    Exhausted,
}

/// Timer state owned by the controller
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimerState {
    pub active_index: usize,
    pub remaining_seconds: u64,
    pub running: bool,
    pub expired: bool,
    pub loaded: bool,
}

impl TimerState {
    /// Create the state for a session that has not loaded its schedule yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the idle state positioned on the first event of `schedule`
    pub fn idle(schedule: &Schedule) -> Self {
        Self {
            active_index: 0,
            remaining_seconds: schedule.first_duration(),
            running: false,
            expired: false,
            loaded: true,
        }
    }

    /// Derive the phase from the flags
    pub fn phase(&self, schedule: &Schedule) -> TimerPhase {
        if !self.loaded {
            TimerPhase::Unloaded
        } else if self.running {
            TimerPhase::Running
        } else if self.expired && schedule.is_last(self.active_index) {
            TimerPhase::Exhausted
        } else if self.expired {
            TimerPhase::Expired
        } else {
            TimerPhase::Idle
        }
    }
}

/// Immutable view of the timer published to observers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub phase: TimerPhase,
    pub active_index: usize,
    pub remaining_seconds: u64,
    pub running: bool,
    pub expired: bool,
    pub loaded: bool,
    pub generation: u64,
    pub event_count: usize,
    pub current_title: Option<String>,
    pub next_title: Option<String>,
    pub is_last_event: bool,
    /// Remaining time rendered as `MM:SS`
    pub display: String,
    pub low_time: bool,
}

impl TimerSnapshot {
    pub fn capture(state: &TimerState, schedule: &Schedule, generation: u64) -> Self {
        Self {
            phase: state.phase(schedule),
            active_index: state.active_index,
            remaining_seconds: state.remaining_seconds,
            running: state.running,
            expired: state.expired,
            loaded: state.loaded,
            generation,
            event_count: schedule.len(),
            current_title: schedule.get(state.active_index).map(|e| e.title.clone()),
            next_title: schedule.get(state.active_index + 1).map(|e| e.title.clone()),
            is_last_event: !schedule.is_empty() && schedule.is_last(state.active_index),
            display: format_clock(state.remaining_seconds),
            low_time: is_low_time(state.remaining_seconds),
        }
    }
}

impl Default for TimerSnapshot {
    fn default() -> Self {
        Self::capture(&TimerState::new(), &Schedule::new(), 0)
    }
}
