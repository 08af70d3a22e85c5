//! # Pomocycle Core Library
//!
//! This library provides the session-sequencing engine for the Pomocycle
//! work/break timer. Hosts (the CLI, or any other front end) drive it through
//! a small command surface and receive notices through a [`Notifier`].
//!
//! ## Architecture
//!
//! - **Countdown**: A single-slot cancellable timer built on `tokio::time`
//! - **Session**: The state machine deciding which phase follows which, and
//!   a runtime task that serializes commands and countdown completions
//! - **Storage**: TOML-based configuration holding durations and the flags
//!   that survive a restart
//!
//! ## Key Components
//!
//! - [`SessionController`]: Core state machine
//! - [`SessionHandle`]: Host-side handle to a running session
//! - [`Countdown`]: Owned optional timer handle
//! - [`Config`]: Durations and durable flags

pub mod error;
pub mod events;
pub mod session;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, ValidationError};
pub use events::Event;
pub use session::{
    LogNotifier, Notice, Notifier, RecordingNotifier, SessionController, SessionHandle,
    SessionRuntime,
};
pub use storage::{Config, ConfigStore, MemoryStore, TomlStore};
pub use timer::{Countdown, Phase, RESET_DELAY};
