use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::Phase;

/// Every phase transition produces an Event.
/// Hosts subscribe to them through the session runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    PhaseStarted {
        phase: Phase,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    PhaseCompleted {
        phase: Phase,
        at: DateTime<Utc>,
    },
    SessionStopped {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: Phase,
        pending: bool,
        remaining_ms: u64,
        total_ms: u64,
        session_ended: bool,
        reset_requested: bool,
        at: DateTime<Utc>,
    },
}
