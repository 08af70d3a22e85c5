mod countdown;
mod phase;

pub use countdown::Countdown;
pub use phase::{Phase, RESET_DELAY};
