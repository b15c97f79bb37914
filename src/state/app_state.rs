//! Main application state management
//!
//! `AppState` serializes every command and every tick through one mutex around
//! the controller. The lock is never held across an await point. Each call
//! computes one transition and, still holding the lock, starts the clock source
//! and sends the snapshot and notices, so observers see transitions in the
//! order they were applied. None of those sends block.

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use super::{
    Event, PlayIgnored, PlayOutcome, Schedule, ScheduleController, TickOutcome, TimerNotice,
    TimerPhase, TimerSnapshot,
};
use crate::{
    error::{AppError, EditError},
    services::JsonFileStore,
    tasks::{ClockSource, Tick},
};

/// Shared application state: the controller and its collaborators
#[derive(Debug)]
pub struct AppState {
    /// Single writer for the schedule and timer state
    controller: Mutex<ScheduleController>,
    store: JsonFileStore,
    clock: Arc<dyn ClockSource>,
    /// Serializes schedule edits, which await on the store
    edit_lock: tokio::sync::Mutex<()>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
    /// Channel for expiry and completion notices
    pub notice_tx: broadcast::Sender<TimerNotice>,
    /// Channel for timer snapshots
    pub timer_update_tx: watch::Sender<TimerSnapshot>,
    /// Keep the receiver alive to prevent channel closure
    pub _timer_update_rx: watch::Receiver<TimerSnapshot>,
}

impl AppState {
    /// Create a new AppState with an unloaded controller
    pub fn new(port: u16, host: String, store: JsonFileStore, clock: Arc<dyn ClockSource>) -> Self {
        let (notice_tx, _) = broadcast::channel(100);
        let (timer_update_tx, timer_update_rx) = watch::channel(TimerSnapshot::default());

        Self {
            controller: Mutex::new(ScheduleController::new()),
            store,
            clock,
            edit_lock: tokio::sync::Mutex::new(()),
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
            notice_tx,
            timer_update_tx,
            _timer_update_rx: timer_update_rx,
        }
    }

    fn lock_controller(&self) -> Result<MutexGuard<'_, ScheduleController>, AppError> {
        self.controller
            .lock()
            .map_err(|e| AppError::LockPoisoned(format!("timer controller: {}", e)))
    }

    /// Load the schedule from the store. Store failures leave an empty schedule.
    pub async fn load(&self) -> Result<TimerSnapshot, AppError> {
        let result = self.store.load().await;

        let snapshot = {
            let mut controller = self.lock_controller()?;
            controller.load(result);
            let snapshot = controller.snapshot();
            self.publish(snapshot.clone());
            snapshot
        };

        self.record_action("load");
        Ok(snapshot)
    }

    /// Start the active event or advance past an expired one
    pub fn play(&self) -> Result<(PlayOutcome, TimerSnapshot), AppError> {
        let (outcome, snapshot) = {
            let mut controller = self.lock_controller()?;
            let outcome = controller.play();
            let snapshot = controller.snapshot();

            match outcome {
                PlayOutcome::Started {
                    generation,
                    seconds,
                    ..
                } => self.clock.start(generation, seconds),
                PlayOutcome::ExpiredImmediately { index, completed } => {
                    self.announce_expiry(index, completed, &snapshot)
                }
                PlayOutcome::Ignored(PlayIgnored::Exhausted) => {
                    info!("All events completed!");
                    self.notify(TimerNotice::PlayRejected {
                        reason: PlayIgnored::Exhausted.describe().to_string(),
                    });
                }
                PlayOutcome::Ignored(reason) => debug!("Play ignored: {}", reason.describe()),
            }

            self.publish(snapshot.clone());
            (outcome, snapshot)
        };

        self.record_action("play");
        Ok((outcome, snapshot))
    }

    /// Return to the first event, disregarding any in-flight countdown
    pub fn reset(&self) -> Result<TimerSnapshot, AppError> {
        let snapshot = {
            let mut controller = self.lock_controller()?;
            controller.reset();
            let snapshot = controller.snapshot();
            self.publish(snapshot.clone());
            snapshot
        };

        self.record_action("reset");
        Ok(snapshot)
    }

    /// Apply one tick from the clock source
    pub fn apply_tick(&self, tick: Tick) -> Result<TickOutcome, AppError> {
        let mut controller = self.lock_controller()?;
        let outcome = controller.on_tick(tick);
        if outcome == TickOutcome::Stale {
            return Ok(outcome);
        }

        let snapshot = controller.snapshot();
        match outcome {
            TickOutcome::Expired { index } => self.announce_expiry(index, false, &snapshot),
            TickOutcome::Completed { index } => self.announce_expiry(index, true, &snapshot),
            _ => {}
        }
        self.publish(snapshot);
        Ok(outcome)
    }

    /// Get the current timer snapshot
    pub fn snapshot(&self) -> Result<TimerSnapshot, AppError> {
        Ok(self.lock_controller()?.snapshot())
    }

    /// Get a copy of the loaded schedule
    pub fn schedule(&self) -> Result<Schedule, AppError> {
        Ok(self.lock_controller()?.schedule().clone())
    }

    /// Append an event and persist the schedule
    pub async fn add_event(&self, title: &str, duration: i64) -> Result<(Event, Schedule), AppError> {
        self.edit_schedule("add-event", |schedule| schedule.add(title, duration).cloned())
            .await
    }

    /// Remove the event at `index` and persist the schedule
    pub async fn remove_event(&self, index: usize) -> Result<(Event, Schedule), AppError> {
        self.edit_schedule("remove-event", |schedule| schedule.remove(index))
            .await
    }

    /// Move the event at `from` to position `to` and persist the schedule
    pub async fn move_event(&self, from: usize, to: usize) -> Result<Schedule, AppError> {
        self.edit_schedule("move-event", |schedule| schedule.move_event(from, to))
            .await
            .map(|((), schedule)| schedule)
    }

    /// Apply an edit to a copy of the schedule, save it, then reload the
    /// controller with the result. Refused while a run is underway; play is
    /// held off from the run-active check until the reload.
    async fn edit_schedule<T, F>(&self, action: &str, editor: F) -> Result<(T, Schedule), AppError>
    where
        F: FnOnce(&mut Schedule) -> Result<T, EditError>,
    {
        let _guard = self.edit_lock.lock().await;

        let (mut schedule, _pending) = {
            let mut controller = self.lock_controller()?;
            if matches!(controller.phase(), TimerPhase::Running | TimerPhase::Expired) {
                warn!("Rejecting {} while a run is active", action);
                return Err(EditError::RunActive.into());
            }
            controller.begin_edit();
            (controller.schedule().clone(), EditPending { state: self })
        };

        let value = editor(&mut schedule)?;
        self.store.save(&schedule).await?;

        {
            let mut controller = self.lock_controller()?;
            controller.load(Ok(schedule.clone()));
            controller.end_edit();
            self.publish(controller.snapshot());
        }

        info!("Schedule edited ({}), now {} events", action, schedule.len());
        self.record_action(action);
        Ok((value, schedule))
    }

    fn announce_expiry(&self, index: usize, completed: bool, snapshot: &TimerSnapshot) {
        if completed {
            self.notify(TimerNotice::ScheduleCompleted {
                events: snapshot.event_count,
            });
        } else {
            self.notify(TimerNotice::EventExpired {
                index,
                title: snapshot.current_title.clone().unwrap_or_default(),
            });
        }
    }

    fn notify(&self, notice: TimerNotice) {
        if let Err(e) = self.notice_tx.send(notice) {
            debug!("No notice subscribers: {}", e);
        }
    }

    /// Call with the controller lock held
    fn publish(&self, snapshot: TimerSnapshot) {
        if let Err(e) = self.timer_update_tx.send(snapshot) {
            warn!("Failed to send timer update: {}", e);
        }
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Subscribe to expiry and completion notices
    pub fn subscribe_notices(&self) -> broadcast::Receiver<TimerNotice> {
        self.notice_tx.subscribe()
    }

    /// Subscribe to timer snapshots. Snapshots are sent while the controller
    /// lock is held, so receivers see them in transition order.
    pub fn subscribe_timer(&self) -> watch::Receiver<TimerSnapshot> {
        self.timer_update_tx.subscribe()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}

/// Clears the controller's edit flag however an edit ends, including when the
/// edit future is dropped mid-save
struct EditPending<'a> {
    state: &'a AppState,
}

impl Drop for EditPending<'_> {
    fn drop(&mut self) {
        if let Ok(mut controller) = self.state.controller.lock() {
            controller.end_edit();
        }
    }
}
