use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Fixed delay between a reset request and the restart of the work phase.
pub const RESET_DELAY: Duration = Duration::from_millis(5_000);

/// One named stage of the work/break cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Nothing has run yet, or a countdown was lost across a restart.
    #[default]
    Idle,
    Working,
    ShortBreak,
    LongBreak,
    /// Waiting out [`RESET_DELAY`] before the cycle restarts from Working.
    Resetting,
    /// No countdown pending and the work session is over.
    Stopped,
}

impl Phase {
    /// Whether this phase is backed by a running countdown.
    pub fn is_timed(self) -> bool {
        matches!(
            self,
            Phase::Working | Phase::ShortBreak | Phase::LongBreak | Phase::Resetting
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Working => "working",
            Phase::ShortBreak => "short_break",
            Phase::LongBreak => "long_break",
            Phase::Resetting => "resetting",
            Phase::Stopped => "stopped",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
