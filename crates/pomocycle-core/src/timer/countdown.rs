//! Single-slot cancellable countdown.
//!
//! A [`Countdown`] holds at most one armed timer. The timer is a
//! `tokio::time::Sleep` owned by the slot, so cancelling is dropping it and
//! a superseded timer can never fire. Instead of a callback, each arm stores
//! a payload that is handed back exactly once by [`Countdown::expired`]; the
//! owner decides what the payload means.
//!
//! ## Usage
//!
//! ```ignore
//! let mut countdown = Countdown::new();
//! countdown.start(Duration::from_secs(60), Phase::Working);
//! let phase = countdown.expired().await; // resolves after 60s
//! ```

use std::future;
use std::pin::Pin;
use std::time::Duration;

use tokio::time::{Instant, Sleep};

#[derive(Debug)]
struct Armed<T> {
    sleep: Pin<Box<Sleep>>,
    duration: Duration,
    payload: T,
}

/// Owned optional timer handle. Only start, cancel and query are possible.
#[derive(Debug)]
pub struct Countdown<T> {
    armed: Option<Armed<T>>,
}

impl<T> Default for Countdown<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Countdown<T> {
    pub fn new() -> Self {
        Self { armed: None }
    }

    /// Arm the countdown, dropping any timer that was still pending.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&mut self, duration: Duration, payload: T) {
        if self.cancel() {
            tracing::debug!("superseded pending countdown");
        }
        tracing::debug!(duration_ms = duration.as_millis() as u64, "countdown armed");
        self.armed = Some(Armed {
            sleep: Box::pin(tokio::time::sleep(duration)),
            duration,
            payload,
        });
    }

    /// Drop the pending timer, if any. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.armed.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.armed.is_some()
    }

    /// Duration the pending timer was armed with.
    pub fn target(&self) -> Option<Duration> {
        self.armed.as_ref().map(|a| a.duration)
    }

    /// Time left on the pending timer.
    pub fn remaining(&self) -> Option<Duration> {
        self.armed
            .as_ref()
            .map(|a| a.sleep.deadline().saturating_duration_since(Instant::now()))
    }

    /// Wait for the pending timer and take its payload.
    ///
    /// Never resolves while idle. Cancel-safe: dropping the future before it
    /// resolves leaves the countdown untouched.
    pub async fn expired(&mut self) -> T {
        let Some(armed) = self.armed.as_mut() else {
            return future::pending().await;
        };
        armed.sleep.as_mut().await;
        match self.armed.take() {
            Some(armed) => armed.payload,
            None => future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Tag {
        First,
        Second,
    }

    fn assert_close(actual: Duration, expected: Duration) {
        assert!(
            actual >= expected && actual <= expected + Duration::from_millis(1),
            "expected ~{expected:?}, got {actual:?}"
        );
    }

    async fn fires_within<T>(countdown: &mut Countdown<T>, within: Duration) -> Option<T> {
        tokio::time::timeout(within, countdown.expired()).await.ok()
    }

    #[tokio::test(start_paused = true)]
    async fn fires_once_after_duration() {
        let mut countdown = Countdown::new();
        countdown.start(Duration::from_secs(30), Tag::First);
        assert!(countdown.is_pending());

        assert_eq!(fires_within(&mut countdown, Duration::from_secs(29)).await, None);
        assert_eq!(
            fires_within(&mut countdown, Duration::from_secs(2)).await,
            Some(Tag::First)
        );
        assert!(!countdown.is_pending());
        assert_eq!(fires_within(&mut countdown, Duration::from_secs(3600)).await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_supersedes_pending_timer() {
        let mut countdown = Countdown::new();
        let t0 = Instant::now();
        countdown.start(Duration::from_secs(10), Tag::First);
        tokio::time::advance(Duration::from_secs(4)).await;
        countdown.start(Duration::from_secs(10), Tag::Second);

        let fired = countdown.expired().await;
        assert_eq!(fired, Tag::Second);
        assert_close(t0.elapsed(), Duration::from_secs(14));
        assert_eq!(fires_within(&mut countdown, Duration::from_secs(60)).await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_on_idle_is_noop() {
        let mut countdown: Countdown<Tag> = Countdown::new();
        assert!(!countdown.cancel());
        assert!(!countdown.cancel());
        assert!(!countdown.is_pending());
        assert_eq!(countdown.remaining(), None);
        assert_eq!(fires_within(&mut countdown, Duration::from_secs(60)).await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_prevents_fire() {
        let mut countdown = Countdown::new();
        countdown.start(Duration::from_secs(5), Tag::First);
        assert!(countdown.cancel());
        assert_eq!(fires_within(&mut countdown, Duration::from_secs(60)).await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn remaining_tracks_clock() {
        let mut countdown = Countdown::new();
        countdown.start(Duration::from_secs(60), Tag::First);
        assert_eq!(countdown.remaining(), Some(Duration::from_secs(60)));
        tokio::time::advance(Duration::from_secs(15)).await;
        assert_eq!(countdown.remaining(), Some(Duration::from_secs(45)));
        assert_eq!(countdown.target(), Some(Duration::from_secs(60)));
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_wait_keeps_timer_armed() {
        let mut countdown = Countdown::new();
        countdown.start(Duration::from_secs(10), Tag::First);
        assert_eq!(fires_within(&mut countdown, Duration::from_secs(3)).await, None);
        assert!(countdown.is_pending());
        assert_eq!(countdown.expired().await, Tag::First);
    }

    proptest! {
        #[test]
        fn any_positive_duration_fires_exactly_once(ms in 1u64..10_000_000) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .start_paused(true)
                .build()
                .unwrap();
            rt.block_on(async {
                let duration = Duration::from_millis(ms);
                let mut countdown = Countdown::new();
                let t0 = Instant::now();
                countdown.start(duration, ms);

                let fired = countdown.expired().await;
                prop_assert_eq!(fired, ms);
                let elapsed = t0.elapsed();
                prop_assert!(elapsed >= duration && elapsed <= duration + Duration::from_millis(1));
                prop_assert!(!countdown.is_pending());
                prop_assert_eq!(fires_within(&mut countdown, duration).await, None);
                Ok::<(), proptest::test_runner::TestCaseError>(())
            })?;
        }
    }
}
