//! Notices broadcast to observers when the countdown crosses a boundary

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimerNotice {
    /// An event ran out and another one follows
    EventExpired { index: usize, title: String },
    /// The last event ran out
    ScheduleCompleted { events: usize },
    /// A play command was refused
    PlayRejected { reason: String },
}
