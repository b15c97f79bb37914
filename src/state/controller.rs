//! Schedule timer controller
//!
//! The controller owns the schedule and the timer state and is the only code
//! that mutates them. It is synchronous and does no I/O: commands return an
//! outcome describing what the caller has to do next (start the clock source,
//! announce an expiry), and ticks from the clock source are reconciled against
//! the current generation before they touch any state.
//!
//! ```text
//! Unloaded --load--> Idle --play--> Running --tick(0)--> Expired --play--> Running
//!                                                  \--> Exhausted (last event)
//! any --reset--> Idle
//! ```

use tracing::{debug, info, warn};

use super::{Schedule, TimerPhase, TimerSnapshot, TimerState};
use crate::{error::StoreError, tasks::Tick};

/// Reason a play command changed nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayIgnored {
    NotLoaded,
    AlreadyRunning,
    EmptySchedule,
    /// The last event already expired; a reset is required
    Exhausted,
    /// A schedule edit is being saved and will reload the timer
    EditInProgress,
}

impl PlayIgnored {
    pub fn describe(&self) -> &'static str {
        match self {
            PlayIgnored::NotLoaded => "Schedule has not been loaded yet",
            PlayIgnored::AlreadyRunning => "Timer is already running",
            PlayIgnored::EmptySchedule => "No events in schedule",
            PlayIgnored::Exhausted => "All events completed",
            PlayIgnored::EditInProgress => "Schedule is being edited",
        }
    }
}

/// Result of a play command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    /// The clock source must be started for `seconds` tagged with `generation`
    Started {
        generation: u64,
        index: usize,
        seconds: u64,
    },
    /// The event has no duration and expired without starting the clock
    ExpiredImmediately { index: usize, completed: bool },
    Ignored(PlayIgnored),
}

/// Result of reconciling one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Tick from a superseded clock invocation, discarded
    Stale,
    /// Remaining time updated while running
    Updated,
    /// Positive tick while stopped; the countdown was marked running again
    Resumed,
    /// Active event expired and more events remain
    Expired { index: usize },
    /// Last event expired
    Completed { index: usize },
    /// Zero tick while stopped, no expiry
    Echo,
}

/// Single owner of the schedule and timer state
#[derive(Debug, Default)]
pub struct ScheduleController {
    schedule: Schedule,
    timer: TimerState,
    generation: u64,
    /// Set while an edit is between its run-active check and its reload
    edit_pending: bool,
}

impl ScheduleController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn timer(&self) -> &TimerState {
        &self.timer
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_editing(&self) -> bool {
        self.edit_pending
    }

    /// Hold off play until `end_edit`
    pub fn begin_edit(&mut self) {
        self.edit_pending = true;
    }

    pub fn end_edit(&mut self) {
        self.edit_pending = false;
    }

    pub fn phase(&self) -> TimerPhase {
        self.timer.phase(&self.schedule)
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot::capture(&self.timer, &self.schedule, self.generation)
    }

    /// Install the result of a store load. Failures degrade to an empty schedule.
    pub fn load(&mut self, result: Result<Schedule, StoreError>) -> &Schedule {
        self.schedule = match result {
            Ok(schedule) => schedule,
            Err(e) => {
                warn!("Failed to load schedule, continuing with no events: {}", e);
                Schedule::new()
            }
        };
        self.generation += 1;
        self.timer = TimerState::idle(&self.schedule);
        info!("Schedule loaded with {} events", self.schedule.len());
        &self.schedule
    }

    /// Start the active event, or advance to the next one after an expiry
    pub fn play(&mut self) -> PlayOutcome {
        if let Some(reason) = self.play_guard() {
            debug!("Play ignored: {}", reason.describe());
            return PlayOutcome::Ignored(reason);
        }

        if self.timer.expired {
            self.timer.active_index += 1;
            self.timer.remaining_seconds = self.active_duration();
            self.timer.expired = false;
            info!("Advancing to event {}", self.timer.active_index);
        }

        let index = self.timer.active_index;
        if self.timer.remaining_seconds == 0 {
            self.timer.expired = true;
            let completed = self.schedule.is_last(index);
            info!("Event {} has no duration, expired immediately", index);
            return PlayOutcome::ExpiredImmediately { index, completed };
        }

        self.generation += 1;
        self.timer.running = true;
        info!(
            "Starting event {} for {}s (generation {})",
            index, self.timer.remaining_seconds, self.generation
        );
        PlayOutcome::Started {
            generation: self.generation,
            index,
            seconds: self.timer.remaining_seconds,
        }
    }

    fn play_guard(&self) -> Option<PlayIgnored> {
        if !self.timer.loaded {
            Some(PlayIgnored::NotLoaded)
        } else if self.timer.running {
            Some(PlayIgnored::AlreadyRunning)
        } else if self.edit_pending {
            Some(PlayIgnored::EditInProgress)
        } else if self.schedule.is_empty() {
            Some(PlayIgnored::EmptySchedule)
        } else if self.timer.expired && self.schedule.is_last(self.timer.active_index) {
            Some(PlayIgnored::Exhausted)
        } else {
            None
        }
    }

    /// Return to the first event and disregard any in-flight countdown
    pub fn reset(&mut self) {
        self.generation += 1;
        let loaded = self.timer.loaded;
        self.timer = TimerState::idle(&self.schedule);
        self.timer.loaded = loaded;
        info!("Timer reset to first event (generation {})", self.generation);
    }

    /// Reconcile a tick from the clock source.
    ///
    /// The remaining value is authoritative for the displayed time, but
    /// `running` and `expired` are derived from the value together with the
    /// previous `running` flag: a zero while stopped never counts as an expiry,
    /// and a positive value while stopped marks the countdown as running.
    pub fn on_tick(&mut self, tick: Tick) -> TickOutcome {
        if tick.generation != self.generation || !self.timer.loaded {
            debug!(
                "Discarding stale tick {} (generation {}, current {})",
                tick.remaining, tick.generation, self.generation
            );
            return TickOutcome::Stale;
        }

        if tick.remaining > 0 {
            self.timer.remaining_seconds = u64::try_from(tick.remaining).unwrap_or(0);
            self.timer.expired = false;
            if self.timer.running {
                debug!("Tick: {}s remaining", tick.remaining);
                TickOutcome::Updated
            } else {
                warn!(
                    "Received tick {} while timer was not running, marking it running",
                    tick.remaining
                );
                self.timer.running = true;
                TickOutcome::Resumed
            }
        } else if self.timer.running {
            let index = self.timer.active_index;
            self.timer.remaining_seconds = 0;
            self.timer.running = false;
            self.timer.expired = true;
            if self.schedule.is_last(index) {
                info!("Last event {} expired, schedule complete", index);
                TickOutcome::Completed { index }
            } else {
                info!("Event {} expired", index);
                TickOutcome::Expired { index }
            }
        } else {
            debug!("Zero tick while stopped, treating as reset echo");
            self.timer.expired = false;
            if self.active_duration() == 0 {
                self.timer.remaining_seconds = 0;
            }
            TickOutcome::Echo
        }
    }

    fn active_duration(&self) -> u64 {
        self.schedule
            .get(self.timer.active_index)
            .map(|e| e.duration)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Event;

    fn work_break() -> Schedule {
        Schedule::from(vec![Event::new("Work", 10), Event::new("Break", 5)])
    }

    fn loaded(schedule: Schedule) -> ScheduleController {
        let mut controller = ScheduleController::new();
        controller.load(Ok(schedule));
        controller
    }

    fn tick(controller: &mut ScheduleController, remaining: i64) -> TickOutcome {
        let generation = controller.generation();
        controller.on_tick(Tick::new(generation, remaining))
    }

    fn started_generation(outcome: PlayOutcome) -> u64 {
        match outcome {
            PlayOutcome::Started { generation, .. } => generation,
            other => panic!("expected Started, got {:?}", other),
        }
    }

    fn assert_invariants(controller: &ScheduleController) {
        let timer = controller.timer();
        assert!(!(timer.running && timer.expired), "running and expired: {:?}", timer);
        if !controller.schedule().is_empty() {
            assert!(timer.active_index < controller.schedule().len());
        }
    }

    #[test]
    fn starts_unloaded() {
        let mut controller = ScheduleController::new();
        assert_eq!(controller.phase(), TimerPhase::Unloaded);
        assert_eq!(controller.play(), PlayOutcome::Ignored(PlayIgnored::NotLoaded));
        assert_eq!(controller.phase(), TimerPhase::Unloaded);
    }

    #[test]
    fn scenario_work_then_break() {
        let mut controller = loaded(work_break());
        assert_eq!(controller.phase(), TimerPhase::Idle);
        assert_eq!(controller.timer().active_index, 0);
        assert_eq!(controller.timer().remaining_seconds, 10);

        let outcome = controller.play();
        assert!(matches!(outcome, PlayOutcome::Started { index: 0, seconds: 10, .. }));
        assert_eq!(controller.phase(), TimerPhase::Running);

        assert_eq!(tick(&mut controller, 5), TickOutcome::Updated);
        assert_eq!(controller.phase(), TimerPhase::Running);
        assert_eq!(controller.timer().remaining_seconds, 5);

        assert_eq!(tick(&mut controller, 0), TickOutcome::Expired { index: 0 });
        assert_eq!(controller.phase(), TimerPhase::Expired);
        assert_eq!(controller.timer().remaining_seconds, 0);

        let outcome = controller.play();
        assert!(matches!(outcome, PlayOutcome::Started { index: 1, seconds: 5, .. }));
        assert_eq!(controller.phase(), TimerPhase::Running);
        assert_eq!(controller.timer().active_index, 1);
        assert_eq!(controller.timer().remaining_seconds, 5);
        assert!(!controller.timer().expired);
    }

    #[test]
    fn scenario_exhausted_then_reset() {
        let mut controller = loaded(work_break());
        controller.play();
        tick(&mut controller, 0);
        controller.play();
        assert_eq!(controller.timer().active_index, 1);

        assert_eq!(tick(&mut controller, 0), TickOutcome::Completed { index: 1 });
        assert_eq!(controller.phase(), TimerPhase::Exhausted);

        assert_eq!(controller.play(), PlayOutcome::Ignored(PlayIgnored::Exhausted));
        assert_eq!(controller.phase(), TimerPhase::Exhausted);
        assert_eq!(controller.timer().active_index, 1);

        controller.reset();
        assert_eq!(controller.phase(), TimerPhase::Idle);
        assert_eq!(controller.timer().active_index, 0);
        assert_eq!(controller.timer().remaining_seconds, 10);
    }

    #[test]
    fn scenario_empty_schedule() {
        let mut controller = loaded(Schedule::new());
        assert_eq!(controller.phase(), TimerPhase::Idle);
        assert_eq!(controller.timer().active_index, 0);
        assert_eq!(controller.timer().remaining_seconds, 0);

        let before = controller.timer().clone();
        assert_eq!(controller.play(), PlayOutcome::Ignored(PlayIgnored::EmptySchedule));
        assert_eq!(controller.timer(), &before);
        assert_eq!(controller.phase(), TimerPhase::Idle);
    }

    #[test]
    fn load_failure_degrades_to_empty() {
        let mut controller = ScheduleController::new();
        let source = serde_json::from_str::<Schedule>("not json").unwrap_err();
        controller.load(Err(StoreError::Malformed {
            path: "schedules.json".to_string(),
            source,
        }));
        assert!(controller.timer().loaded);
        assert!(controller.schedule().is_empty());
        assert_eq!(controller.phase(), TimerPhase::Idle);
    }

    #[test]
    fn stale_zero_tick_after_reset_is_ignored() {
        let mut controller = loaded(work_break());
        let old_generation = started_generation(controller.play());
        controller.on_tick(Tick::new(old_generation, 5));
        assert_eq!(controller.timer().remaining_seconds, 5);

        controller.reset();
        assert_eq!(controller.on_tick(Tick::new(old_generation, 0)), TickOutcome::Stale);
        assert_eq!(controller.phase(), TimerPhase::Idle);
        assert_eq!(controller.timer().remaining_seconds, 10);
        assert!(!controller.timer().running);
        assert!(!controller.timer().expired);
    }

    #[test]
    fn stale_positive_tick_after_reset_is_ignored() {
        let mut controller = loaded(work_break());
        let old_generation = started_generation(controller.play());
        controller.reset();

        assert_eq!(controller.on_tick(Tick::new(old_generation, 7)), TickOutcome::Stale);
        assert!(!controller.timer().running);
        assert_eq!(controller.timer().remaining_seconds, 10);
    }

    #[test]
    fn late_tick_from_previous_event_does_not_expire_next_one() {
        let mut controller = loaded(work_break());
        let first = started_generation(controller.play());
        controller.on_tick(Tick::new(first, 0));
        let second = started_generation(controller.play());
        assert_ne!(first, second);

        assert_eq!(controller.on_tick(Tick::new(first, 0)), TickOutcome::Stale);
        assert_eq!(controller.phase(), TimerPhase::Running);
        assert_eq!(controller.timer().remaining_seconds, 5);
    }

    #[test]
    fn play_twice_is_idempotent() {
        let mut controller = loaded(work_break());
        controller.play();
        let once = (controller.timer().clone(), controller.generation());

        assert_eq!(controller.play(), PlayOutcome::Ignored(PlayIgnored::AlreadyRunning));
        assert_eq!((controller.timer().clone(), controller.generation()), once);
    }

    #[test]
    fn progression_law() {
        let k = 4;
        let d = 3;
        let events: Vec<Event> = (0..k).map(|i| Event::new(format!("Event {}", i), d)).collect();
        let mut controller = loaded(Schedule::from(events));

        for round in 0..k {
            assert!(matches!(controller.play(), PlayOutcome::Started { .. }));
            for remaining in (0..d as i64).rev() {
                tick(&mut controller, remaining);
                assert_invariants(&controller);
            }
            if round + 1 < k {
                assert_eq!(controller.phase(), TimerPhase::Expired);
            }
        }

        assert_eq!(controller.phase(), TimerPhase::Exhausted);
        assert_eq!(controller.timer().active_index, k - 1);
    }

    #[test]
    fn positive_tick_while_stopped_resumes() {
        let mut controller = loaded(work_break());
        let generation = started_generation(controller.play());
        controller.on_tick(Tick::new(generation, 0));
        assert_eq!(controller.phase(), TimerPhase::Expired);

        assert_eq!(controller.on_tick(Tick::new(generation, 4)), TickOutcome::Resumed);
        assert!(controller.timer().running);
        assert!(!controller.timer().expired);
        assert_eq!(controller.timer().remaining_seconds, 4);
        assert_invariants(&controller);
    }

    #[test]
    fn zero_tick_while_stopped_is_an_echo() {
        let mut controller = loaded(work_break());
        assert_eq!(tick(&mut controller, 0), TickOutcome::Echo);
        assert_eq!(controller.phase(), TimerPhase::Idle);
        assert_eq!(controller.timer().remaining_seconds, 10);
        assert!(!controller.timer().expired);
    }

    #[test]
    fn negative_tick_counts_as_zero() {
        let mut controller = loaded(work_break());
        controller.play();
        assert_eq!(tick(&mut controller, -1), TickOutcome::Expired { index: 0 });
        assert_eq!(controller.timer().remaining_seconds, 0);
    }

    #[test]
    fn zero_duration_event_expires_on_play() {
        let schedule = Schedule::from(vec![
            Event::new("Intro", 0),
            Event::new("Talk", 30),
            Event::new("Outro", 0),
        ]);
        let mut controller = loaded(schedule);
        let generation = controller.generation();

        assert_eq!(
            controller.play(),
            PlayOutcome::ExpiredImmediately { index: 0, completed: false }
        );
        assert_eq!(controller.phase(), TimerPhase::Expired);
        assert_eq!(controller.generation(), generation);

        assert!(matches!(controller.play(), PlayOutcome::Started { index: 1, seconds: 30, .. }));
        tick(&mut controller, 0);

        assert_eq!(
            controller.play(),
            PlayOutcome::ExpiredImmediately { index: 2, completed: true }
        );
        assert_eq!(controller.phase(), TimerPhase::Exhausted);
    }

    #[test]
    fn reset_is_idempotent_and_bumps_generation() {
        let mut controller = loaded(work_break());
        controller.play();
        controller.reset();
        let after_first = controller.timer().clone();
        let generation = controller.generation();

        controller.reset();
        assert_eq!(controller.timer(), &after_first);
        assert_eq!(controller.generation(), generation + 1);
    }

    #[test]
    fn play_waits_for_pending_edit() {
        let mut controller = loaded(work_break());
        controller.begin_edit();
        assert!(controller.is_editing());

        assert_eq!(controller.play(), PlayOutcome::Ignored(PlayIgnored::EditInProgress));
        assert_eq!(controller.phase(), TimerPhase::Idle);

        controller.end_edit();
        assert!(matches!(controller.play(), PlayOutcome::Started { index: 0, .. }));
    }

    #[test]
    fn reset_before_load_stays_unloaded() {
        let mut controller = ScheduleController::new();
        controller.reset();
        assert_eq!(controller.phase(), TimerPhase::Unloaded);
        assert_eq!(tick(&mut controller, 3), TickOutcome::Stale);
    }

    #[test]
    fn snapshot_reports_titles() {
        let mut controller = loaded(work_break());
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.current_title.as_deref(), Some("Work"));
        assert_eq!(snapshot.next_title.as_deref(), Some("Break"));
        assert_eq!(snapshot.display, "00:10");
        assert!(!snapshot.is_last_event);

        controller.play();
        tick(&mut controller, 0);
        controller.play();
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.next_title, None);
        assert!(snapshot.is_last_event);
    }
}
