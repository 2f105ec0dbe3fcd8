//! Aging clock for mode on-transitions
//!
//! Normalizes the time elapsed since a mode turned on into `[0, 1]` so
//! consumers can interpolate a "just turned on" highlight, and caches a
//! settled flag once the window has passed.
//!
//! ```text
//! Off ──turn_on──► JustOn ──(elapsed ≥ window)──► Settled
//!  ▲                 │                               │
//!  └────turn_off─────┴───────────turn_off────────────┘
//! ```

use std::time::{Duration, Instant};

/// Default length of the aging window
pub const DEFAULT_AGING_WINDOW: Duration = Duration::from_secs(5);

/// Observable phase of an [`AgingClock`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgingPhase {
    Off,
    JustOn,
    Settled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgingClock {
    window: Duration,
    turned_on_at: Option<Instant>,
    settled: bool,
}

impl AgingClock {
    /// A clock in the `Off` phase
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            turned_on_at: None,
            settled: true,
        }
    }

    /// A clock that turned on at `at`
    pub fn started_at(window: Duration, at: Instant) -> Self {
        let mut clock = Self::new(window);
        clock.turn_on(at);
        clock
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record an on-transition at `now` and clear the settled flag
    pub fn turn_on(&mut self, now: Instant) {
        self.turned_on_at = Some(now);
        self.settled = false;
    }

    /// Record an off-transition; inactive entities never animate
    pub fn turn_off(&mut self) {
        self.turned_on_at = None;
        self.settled = true;
    }

    pub fn age(&self) -> f32 {
        self.age_at(Instant::now())
    }

    /// 0 at the transition, 1 at or beyond the window, linear in between.
    pub fn age_at(&self, now: Instant) -> f32 {
        if self.settled {
            return 1.0;
        }
        let Some(start) = self.turned_on_at else {
            return 1.0;
        };
        if self.window.is_zero() {
            return 1.0;
        }

        let elapsed = now.saturating_duration_since(start);
        if elapsed >= self.window {
            return 1.0;
        }
        (elapsed.as_secs_f64() / self.window.as_secs_f64()).clamp(0.0, 1.0) as f32
    }

    pub fn is_settled(&self) -> bool {
        self.is_settled_at(Instant::now())
    }

    pub fn is_settled_at(&self, now: Instant) -> bool {
        self.settled || self.elapsed_past_window(now)
    }

    /// Cache the settled flag if the window has elapsed; returns the flag
    pub fn settle(&mut self, now: Instant) -> bool {
        if !self.settled && self.elapsed_past_window(now) {
            self.settled = true;
        }
        self.settled
    }

    pub fn phase_at(&self, now: Instant) -> AgingPhase {
        match self.turned_on_at {
            None => AgingPhase::Off,
            Some(_) if self.is_settled_at(now) => AgingPhase::Settled,
            Some(_) => AgingPhase::JustOn,
        }
    }

    fn elapsed_past_window(&self, now: Instant) -> bool {
        match self.turned_on_at {
            Some(start) => now.saturating_duration_since(start) >= self.window,
            None => true,
        }
    }
}

impl Default for AgingClock {
    fn default() -> Self {
        Self::new(DEFAULT_AGING_WINDOW)
    }
}
