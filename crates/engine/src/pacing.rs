//! Inter-step pacing.
//!
//! The emitter calls [`Pacer::pause`] after every delivered step. The delay is
//! a minimum spacing between steps, not a real-time guarantee.

use std::time::Duration;

use crate::cancel::CancelToken;

/// Suspends the producing thread between two delivered steps.
pub trait Pacer: Send + Sync {
    /// Wait for `delay`, or less if `cancel` fires first.
    fn pause(&self, delay: Duration, cancel: &CancelToken);
}

/// Blocks the run thread for the configured delay.
#[derive(Clone, Copy, Debug, Default)]
pub struct SleepPacer;

impl Pacer for SleepPacer {
    fn pause(&self, delay: Duration, cancel: &CancelToken) {
        cancel.wait_timeout(delay);
    }
}

/// Never waits. For headless runs and test harnesses.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopPacer;

impl Pacer for NoopPacer {
    fn pause(&self, _delay: Duration, _cancel: &CancelToken) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn sleep_pacer_waits_at_least_the_delay() {
        let start = Instant::now();
        SleepPacer.pause(Duration::from_millis(10), &CancelToken::new());
        assert!(start.elapsed() >= Duration::from_millis(10));
    }

    #[test]
    fn sleep_pacer_returns_early_on_cancel() {
        let token = CancelToken::new();
        token.cancel();
        let start = Instant::now();
        SleepPacer.pause(Duration::from_secs(30), &token);
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn noop_pacer_does_not_wait() {
        let start = Instant::now();
        NoopPacer.pause(Duration::from_secs(30), &CancelToken::new());
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
