mod controller;
mod notifier;
mod runtime;

pub use controller::SessionController;
pub use notifier::{LogNotifier, Notice, Notifier, RecordingNotifier};
pub use runtime::{SessionHandle, SessionRuntime};
