//! Fixed-frequency pacing for blocking control loops.
//!
//! A [`RateLimiter`] keeps a loop at a target wall-clock frequency by
//! sleeping until the next tick boundary. Overruns are handled best-effort:
//! a missed tick resets the schedule to "now" instead of issuing catch-up
//! bursts.

use std::time::{Duration, Instant};

/// Paces a loop at a fixed wall-clock frequency.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    period: Duration,
    next_tick: Instant,
}

impl RateLimiter {
    /// Create a rate limiter ticking at `frequency` Hz.
    ///
    /// # Panics
    ///
    /// Panics if `frequency` is not finite and positive.
    pub fn new(frequency: f64) -> Self {
        assert!(
            frequency.is_finite() && frequency > 0.0,
            "rate limiter frequency must be > 0, got {frequency}"
        );
        Self::from_period(Duration::from_secs_f64(1.0 / frequency))
    }

    /// Create a rate limiter with an explicit tick period.
    pub fn from_period(period: Duration) -> Self {
        Self {
            period,
            next_tick: Instant::now() + period,
        }
    }

    /// Tick period in seconds.
    #[must_use]
    pub fn period(&self) -> f64 {
        self.period.as_secs_f64()
    }

    /// Tick frequency in Hz.
    #[must_use]
    pub fn frequency(&self) -> f64 {
        1.0 / self.period.as_secs_f64()
    }

    /// Block until the next tick boundary.
    ///
    /// If the boundary has already passed (the loop body overran its
    /// budget), returns immediately and re-anchors the schedule so the
    /// next tick is one full period from now.
    pub fn sleep(&mut self) {
        let now = Instant::now();
        if now < self.next_tick {
            std::thread::sleep(self.next_tick - now);
            self.next_tick += self.period;
        } else {
            self.next_tick = now + self.period;
        }
    }

    /// Reset the schedule so the next tick is one period from now.
    pub fn reset(&mut self) {
        self.next_tick = Instant::now() + self.period;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
