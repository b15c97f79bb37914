//! Interval-driven clock source
//!
//! Each invocation counts down from the requested duration to zero inclusive,
//! sending one tick per cadence period, then stops. Ticks carry the generation
//! they were started with so the receiving side can drop superseded countdowns;
//! nothing here is ever cancelled.

use std::{fmt, time::Duration};
use tokio::sync::mpsc;
use tracing::debug;

/// Remaining-seconds notification from one clock invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub generation: u64,
    pub remaining: i64,
}

impl Tick {
    pub fn new(generation: u64, remaining: i64) -> Self {
        Self {
            generation,
            remaining,
        }
    }
}

/// Something that can count down a duration and report ticks
pub trait ClockSource: Send + Sync + fmt::Debug {
    /// Begin a countdown of `duration_seconds` tagged with `generation`
    fn start(&self, generation: u64, duration_seconds: u64);
}

/// Clock source that spawns a tokio interval per countdown
#[derive(Debug, Clone)]
pub struct IntervalClock {
    tick_tx: mpsc::UnboundedSender<Tick>,
    cadence: Duration,
}

impl IntervalClock {
    pub fn new(tick_tx: mpsc::UnboundedSender<Tick>, cadence: Duration) -> Self {
        Self { tick_tx, cadence }
    }
}

impl ClockSource for IntervalClock {
    fn start(&self, generation: u64, duration_seconds: u64) {
        debug!(
            "Starting countdown of {}s for generation {}",
            duration_seconds, generation
        );
        tokio::spawn(countdown(
            self.tick_tx.clone(),
            generation,
            duration_seconds,
            self.cadence,
        ));
    }
}

/// Send `duration_seconds, ..., 1, 0` one cadence period apart
pub async fn countdown(
    tick_tx: mpsc::UnboundedSender<Tick>,
    generation: u64,
    duration_seconds: u64,
    cadence: Duration,
) {
    let mut interval = tokio::time::interval(cadence);

    for remaining in (0..=duration_seconds).rev() {
        interval.tick().await;
        let remaining = i64::try_from(remaining).unwrap_or(i64::MAX);
        if tick_tx.send(Tick::new(generation, remaining)).is_err() {
            debug!("Tick receiver closed, stopping countdown for generation {}", generation);
            return;
        }
    }

    debug!("Countdown for generation {} finished", generation);
}
