//! Schedule and event structures

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::EditError;

/// One titled, timed item in a schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub title: String,
    /// Duration in seconds. Stored values that are not non-negative integers
    /// (negative, fractional, null or missing) are read as zero.
    #[serde(default, deserialize_with = "clamped_duration")]
    pub duration: u64,
}

impl Event {
    /// Create a new event
    pub fn new(title: impl Into<String>, duration: u64) -> Self {
        Self {
            title: title.into(),
            duration,
        }
    }
}

fn clamped_duration<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    match raw.as_u64() {
        Some(duration) => Ok(duration),
        None => {
            warn!("Clamping invalid event duration {} to 0", raw);
            Ok(0)
        }
    }
}

/// Ordered list of events processed sequentially
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schedule {
    events: Vec<Event>,
}

impl Schedule {
    /// Create an empty schedule
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Event> {
        self.events.get(index)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Duration of the first event, or zero for an empty schedule
    pub fn first_duration(&self) -> u64 {
        self.events.first().map(|e| e.duration).unwrap_or(0)
    }

    /// Check whether `index` points at the final event
    pub fn is_last(&self, index: usize) -> bool {
        index + 1 >= self.events.len()
    }

    /// Append a new event after validating it
    pub fn add(&mut self, title: &str, duration: i64) -> Result<&Event, EditError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(EditError::InvalidEvent("title must not be empty".to_string()));
        }
        let duration = u64::try_from(duration)
            .ok()
            .filter(|d| *d > 0)
            .ok_or_else(|| {
                EditError::InvalidEvent(format!("duration must be positive, got {}", duration))
            })?;

        self.events.push(Event::new(title, duration));
        Ok(&self.events[self.events.len() - 1])
    }

    /// Remove the event at `index`
    pub fn remove(&mut self, index: usize) -> Result<Event, EditError> {
        self.check_index(index)?;
        Ok(self.events.remove(index))
    }

    /// Move the event at `from` so that it ends up at position `to`
    pub fn move_event(&mut self, from: usize, to: usize) -> Result<(), EditError> {
        self.check_index(from)?;
        self.check_index(to)?;
        if from != to {
            let event = self.events.remove(from);
            self.events.insert(to, event);
        }
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<(), EditError> {
        if index < self.events.len() {
            Ok(())
        } else {
            Err(EditError::IndexOutOfRange {
                index,
                len: self.events.len(),
            })
        }
    }
}

impl From<Vec<Event>> for Schedule {
    fn from(events: Vec<Event>) -> Self {
        Self { events }
    }
}
