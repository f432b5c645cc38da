//! Timing-windowed input gestures
//!
//! Both detectors run on the simulation clock. Deferred actions are stored as
//! due times and resolved by polling each tick, never by real timers.

use serde::{Deserialize, Serialize};

/// Tolerance when comparing the clock against a due time. Windows are tuned
/// in f32 seconds and the clock sums f32 deltas into f64.
const DEADLINE_SLACK: f64 = 1e-6;

#[inline]
fn reached(now: f64, due: f64) -> bool {
    now + DEADLINE_SLACK >= due
}

/// Two presses of the same key inside a window
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DoubleTap {
    last_press: Option<f64>,
    count: u32,
    reset_at: Option<f64>,
}

impl DoubleTap {
    /// Register a press. Returns true when it completes a double tap while
    /// `ready` is set; the counter then starts over.
    pub fn press(&mut self, now: f64, window: f32, ready: bool) -> bool {
        let within = self
            .last_press
            .is_some_and(|t| now - t < f64::from(window));

        if within {
            self.count += 1;
            if self.count >= 2 && ready {
                self.count = 0;
                self.reset_at = None;
                return true;
            }
        } else {
            // New window starting from this press
            self.count = 1;
        }

        self.reset_at = Some(now + f64::from(window));
        self.last_press = Some(now);
        false
    }

    /// Drop the press count once the window has lapsed
    pub fn expire(&mut self, now: f64) {
        if self.reset_at.is_some_and(|t| reached(now, t)) {
            self.count = 0;
            self.reset_at = None;
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

/// What a shoot gesture resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Volley {
    Single,
    Burst,
}

/// Single press fires after a delay, a quick second press fires a burst
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClickBurst {
    last_press: Option<f64>,
    clicks: u32,
    pending_due: Option<f64>,
}

impl ClickBurst {
    /// Register an accepted press (the caller filters presses during cooldown).
    /// A burst resolves immediately; a lone press arms a pending single shot.
    pub fn press(&mut self, now: f64, window: f32) -> Option<Volley> {
        let within = self
            .last_press
            .is_some_and(|t| now - t < f64::from(window));

        if within {
            self.clicks += 1;
            if self.clicks >= 2 {
                self.pending_due = None;
                self.clicks = 0;
                return Some(Volley::Burst);
            }
        } else {
            self.clicks = 1;
        }

        self.pending_due = Some(now + f64::from(window));
        self.last_press = Some(now);
        None
    }

    /// Fire the pending single shot once it is due and `ready` allows it
    pub fn poll(&mut self, now: f64, ready: bool) -> Option<Volley> {
        match self.pending_due {
            Some(due) if ready && reached(now, due) => {
                self.pending_due = None;
                self.clicks = 0;
                Some(Volley::Single)
            }
            _ => None,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.pending_due.is_some()
    }
}
