//! Session state machine.
//!
//! The controller owns the [`Config`], a single [`Countdown`] keyed by the
//! phase that armed it, and handles to its persistence and notifier
//! collaborators. Commands and completions are plain `async` methods; the
//! caller is responsible for serializing them (see
//! [`SessionRuntime`](super::SessionRuntime)).
//!
//! ## State Transitions
//!
//! ```text
//! Working    --fire--> Stopped                (session_ended = true)
//! ShortBreak --fire--> Working
//! LongBreak  --fire--> Working | Resetting    (on reset_requested)
//! Resetting  --fire--> Working                (flags cleared)
//! any        --stop--> Stopped                (only if a countdown is pending)
//! ```

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::broadcast;

use super::notifier::{Notice, Notifier};
use crate::error::{ConfigError, CoreError, Result};
use crate::events::Event;
use crate::storage::{self, Config, ConfigStore};
use crate::timer::{Countdown, Phase, RESET_DELAY};

const EVENT_CAPACITY: usize = 64;

pub struct SessionController {
    config: Config,
    phase: Phase,
    countdown: Countdown<Phase>,
    store: Arc<dyn ConfigStore>,
    notifier: Arc<dyn Notifier>,
    events: broadcast::Sender<Event>,
}

impl SessionController {
    /// Build a controller from an already loaded config.
    ///
    /// Nothing is armed: a countdown lost across a restart is never resumed
    /// because its remaining time is unknown. An ended session comes up
    /// `Stopped`, everything else comes up `Idle`.
    pub fn new(config: Config, store: Arc<dyn ConfigStore>, notifier: Arc<dyn Notifier>) -> Self {
        let mut config = config.sanitized();
        let persisted = config.phase;

        if persisted.is_timed() {
            tracing::warn!(
                phase = %persisted,
                "countdown interrupted by restart, remaining time unknown"
            );
        }
        if persisted == Phase::Resetting {
            config.reset_requested = false;
        }

        let phase = if config.session_ended {
            Phase::Stopped
        } else {
            Phase::Idle
        };
        config.phase = phase;

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            config,
            phase,
            countdown: Countdown::new(),
            store,
            notifier,
            events,
        }
    }

    /// Load the config through `store` and build a controller from it.
    pub async fn load(store: Arc<dyn ConfigStore>, notifier: Arc<dyn Notifier>) -> Self {
        let config = storage::load_or_default(store.as_ref()).await;
        Self::new(config, store, notifier)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_pending(&self) -> bool {
        self.countdown.is_pending()
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.countdown.remaining()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    pub(crate) fn event_sender(&self) -> broadcast::Sender<Event> {
        self.events.clone()
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            phase: self.phase,
            pending: self.countdown.is_pending(),
            remaining_ms: self
                .countdown
                .remaining()
                .map_or(0, |d| d.as_millis() as u64),
            total_ms: self.countdown.target().map_or(0, |d| d.as_millis() as u64),
            session_ended: self.config.session_ended,
            reset_requested: self.config.reset_requested,
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub async fn start_work(&mut self) {
        self.countdown.cancel();
        if self.config.session_ended {
            self.phase = Phase::Stopped;
            self.persist().await;
            self.notify(Notice::AlreadyEnded);
            return;
        }
        let duration = self.config.work_duration();
        self.arm(Phase::Working, duration).await;
        self.notify(Notice::WorkStarted);
    }

    /// Cancel the pending countdown and end the session.
    ///
    /// Does nothing when no countdown is pending.
    pub async fn stop_work(&mut self) {
        if !self.countdown.cancel() {
            tracing::debug!(phase = %self.phase, "stop requested with nothing pending");
            return;
        }
        self.enter_stopped().await;
        self.notify(Notice::Stopped);
    }

    pub async fn start_short_break(&mut self) {
        let duration = self.config.short_break_duration();
        self.arm(Phase::ShortBreak, duration).await;
        self.notify(Notice::BreakStarted);
    }

    pub async fn start_long_break(&mut self) {
        let duration = self.config.long_break_duration();
        self.arm(Phase::LongBreak, duration).await;
        self.notify(Notice::LongBreakStarted);
    }

    pub async fn reset_cycle(&mut self) {
        self.config.reset_requested = true;
        self.notify(Notice::Reset);
        self.arm(Phase::Resetting, RESET_DELAY).await;
    }

    /// Validate and store a settings write, then persist.
    ///
    /// # Errors
    ///
    /// Returns an error and leaves the config untouched when the key is not
    /// settable or the value is not a positive whole number.
    pub async fn update_setting(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.config.set(key, value)?;
        tracing::info!(key, value, "setting updated");
        self.persist().await;
        Ok(())
    }

    pub async fn set_work_minutes(&mut self, value: &str) -> Result<(), ConfigError> {
        self.update_setting("work_minutes", value).await
    }

    /// Drop any pending countdown without touching the session flags.
    pub fn cancel(&mut self) -> bool {
        self.countdown.cancel()
    }

    // ── Completion ───────────────────────────────────────────────────

    /// Wait for the pending countdown and return the phase that armed it.
    ///
    /// Never resolves while nothing is pending. Cancel-safe.
    pub async fn expired(&mut self) -> Phase {
        self.countdown.expired().await
    }

    /// Handle a fired countdown. Errors are contained here: they are logged
    /// and the machine falls back to `Stopped`.
    pub async fn complete(&mut self, fired: Phase) {
        if let Err(e) = self.on_fire(fired).await {
            tracing::error!(phase = %fired, error = %e, "completion failed, stopping session");
            self.countdown.cancel();
            self.enter_stopped().await;
        }
    }

    async fn on_fire(&mut self, fired: Phase) -> Result<()> {
        tracing::info!(phase = %fired, "phase completed");
        let _ = self.events.send(Event::PhaseCompleted {
            phase: fired,
            at: Utc::now(),
        });

        match fired {
            Phase::Working => {
                self.enter_stopped().await;
                self.notify(Notice::WorkEnded);
            }
            Phase::ShortBreak => {
                self.notify(Notice::BreakEnded);
                self.start_work().await;
            }
            Phase::LongBreak => {
                self.notify(Notice::LongBreakEnded);
                if self.config.reset_requested {
                    self.reset_cycle().await;
                } else {
                    self.start_work().await;
                }
            }
            Phase::Resetting => {
                self.config.reset_requested = false;
                self.config.session_ended = false;
                self.start_work().await;
            }
            Phase::Idle | Phase::Stopped => return Err(CoreError::UnexpectedCompletion(fired)),
        }
        Ok(())
    }

    // ── Internal ─────────────────────────────────────────────────────

    async fn arm(&mut self, phase: Phase, duration: Duration) {
        self.countdown.start(duration, phase);
        self.phase = phase;
        tracing::info!(%phase, duration_secs = duration.as_secs(), "phase started");
        let _ = self.events.send(Event::PhaseStarted {
            phase,
            duration_secs: duration.as_secs(),
            at: Utc::now(),
        });
        self.persist().await;
    }

    async fn enter_stopped(&mut self) {
        self.config.session_ended = true;
        self.phase = Phase::Stopped;
        let _ = self.events.send(Event::SessionStopped { at: Utc::now() });
        self.persist().await;
    }

    /// Save the config. Failures are logged; in-memory state stays authoritative.
    async fn persist(&mut self) {
        self.config.phase = self.phase;
        if let Err(e) = self.store.save(&self.config).await {
            tracing::warn!(error = %e, "failed to persist session state");
        }
    }

    fn notify(&self, notice: Notice) {
        tracing::debug!(?notice, "notify");
        self.notifier.show(notice.message());
    }
}
