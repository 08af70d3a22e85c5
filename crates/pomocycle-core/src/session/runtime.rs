use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;

use super::SessionController;
use crate::error::{ConfigError, CoreError, Result};
use crate::events::Event;

enum Command {
    StartWork,
    StopWork,
    StartShortBreak,
    StartLongBreak,
    ResetCycle,
    UpdateSetting {
        key: String,
        value: String,
        reply: oneshot::Sender<Result<(), ConfigError>>,
    },
    Snapshot(oneshot::Sender<Event>),
    Shutdown(oneshot::Sender<()>),
}

/// Drives a [`SessionController`] on a single task.
///
/// Commands and countdown completions are handled one at a time, so a
/// completion never overlaps a command. Queued commands win over a countdown
/// that expires in the same poll.
pub struct SessionRuntime;

impl SessionRuntime {
    /// Move `controller` onto a new task and return a handle to it.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(controller: SessionController) -> SessionHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let events = controller.event_sender();
        let task = tokio::spawn(Self::run(controller, rx));
        tracing::debug!("session runtime started");
        SessionHandle {
            tx,
            events,
            task: Arc::new(Mutex::new(Some(task))),
        }
    }

    async fn run(mut controller: SessionController, mut rx: mpsc::UnboundedReceiver<Command>) {
        loop {
            tokio::select! {
                biased;
                cmd = rx.recv() => {
                    let Some(cmd) = cmd else { break };
                    match cmd {
                        Command::StartWork => controller.start_work().await,
                        Command::StopWork => controller.stop_work().await,
                        Command::StartShortBreak => controller.start_short_break().await,
                        Command::StartLongBreak => controller.start_long_break().await,
                        Command::ResetCycle => controller.reset_cycle().await,
                        Command::UpdateSetting { key, value, reply } => {
                            let result = controller.update_setting(&key, &value).await;
                            let _ = reply.send(result);
                        }
                        Command::Snapshot(reply) => {
                            let _ = reply.send(controller.snapshot());
                        }
                        Command::Shutdown(ack) => {
                            controller.cancel();
                            let _ = ack.send(());
                            break;
                        }
                    }
                }
                fired = controller.expired() => controller.complete(fired).await,
            }
        }
        controller.cancel();
        tracing::debug!("session runtime stopped");
    }
}

/// Cloneable host-side handle to a running session.
///
/// The command methods return immediately; their effects happen on the
/// runtime task.
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<Command>,
    events: broadcast::Sender<Event>,
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl SessionHandle {
    pub fn start_work(&self) {
        self.send(Command::StartWork);
    }

    pub fn stop_work(&self) {
        self.send(Command::StopWork);
    }

    pub fn start_short_break(&self) {
        self.send(Command::StartShortBreak);
    }

    pub fn start_long_break(&self) {
        self.send(Command::StartLongBreak);
    }

    pub fn reset_cycle(&self) {
        self.send(Command::ResetCycle);
    }

    /// Validate and persist a duration setting.
    ///
    /// # Errors
    ///
    /// Returns a config error for an invalid key or value, or
    /// [`CoreError::RuntimeClosed`] if the runtime has stopped.
    pub async fn update_setting(&self, key: &str, value: &str) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::UpdateSetting {
                key: key.to_string(),
                value: value.to_string(),
                reply,
            })
            .map_err(|_| CoreError::RuntimeClosed)?;
        rx.await.map_err(|_| CoreError::RuntimeClosed)??;
        Ok(())
    }

    pub async fn set_work_minutes(&self, value: &str) -> Result<()> {
        self.update_setting("work_minutes", value).await
    }

    /// # Errors
    ///
    /// Returns [`CoreError::RuntimeClosed`] if the runtime has stopped.
    pub async fn snapshot(&self) -> Result<Event> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Snapshot(reply))
            .map_err(|_| CoreError::RuntimeClosed)?;
        rx.await.map_err(|_| CoreError::RuntimeClosed)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    pub fn is_running(&self) -> bool {
        !self.tx.is_closed()
    }

    /// Cancel any pending countdown and stop the runtime task.
    pub async fn shutdown(&self) {
        let (ack, rx) = oneshot::channel();
        if self.tx.send(Command::Shutdown(ack)).is_ok() {
            let _ = rx.await;
        }
        let task = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "session runtime task failed");
            }
        }
    }

    fn send(&self, cmd: Command) {
        if self.tx.send(cmd).is_err() {
            tracing::debug!("session runtime closed, command dropped");
        }
    }
}
