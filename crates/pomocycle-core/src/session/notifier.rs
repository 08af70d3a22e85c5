use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// User-visible transient message emitted on a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    WorkStarted,
    WorkEnded,
    AlreadyEnded,
    Stopped,
    BreakStarted,
    BreakEnded,
    LongBreakStarted,
    LongBreakEnded,
    Reset,
}

impl Notice {
    pub fn message(self) -> &'static str {
        match self {
            Notice::WorkStarted => "Pomodoro started!",
            Notice::WorkEnded => "Pomodoro ended!",
            Notice::AlreadyEnded => "Pomodoro session already ended. Reset to start a new cycle.",
            Notice::Stopped => "Pomodoro stopped.",
            Notice::BreakStarted => "Break started!",
            Notice::BreakEnded => "Break ended!",
            Notice::LongBreakStarted => "Long break started!",
            Notice::LongBreakEnded => "Long break ended!",
            Notice::Reset => "Pomodoro reset!",
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Delivers notices to the user. Fire-and-forget.
pub trait Notifier: Send + Sync {
    fn show(&self, message: &str);
}

/// Writes notices to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn show(&self, message: &str) {
        tracing::info!(target: "pomocycle::notice", "{message}");
    }
}

/// Keeps every message shown. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.lock().clone()
    }

    /// How many times `notice` was shown.
    pub fn count(&self, notice: Notice) -> usize {
        self.lock().iter().filter(|m| *m == notice.message()).count()
    }

    pub fn last(&self) -> Option<String> {
        self.lock().last().cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        self.messages.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Notifier for RecordingNotifier {
    fn show(&self, message: &str) {
        self.lock().push(message.to_string());
    }
}
