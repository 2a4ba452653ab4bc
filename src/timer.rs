//! Countdown timer controller.
//!
//! A single-threaded countdown that the host drives from its own event loop.
//! The controller owns its [`TimerState`] exclusively and reports progress
//! through two callbacks supplied at construction: one per tick and one when
//! the countdown reaches zero.

use std::fmt;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info};

/// Cadence of a countdown: one tick per second.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

pub type TickCallback = Box<dyn FnMut(u64)>;
pub type FinishedCallback = Box<dyn FnMut()>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimerError {
    /// `start` was called while a countdown is still active. Callers are
    /// expected to check [`TimerController::is_running`] first.
    #[error("countdown already running ({remaining}s left)")]
    AlreadyRunning { remaining: u64 },
}

/// Snapshot of a controller. `running == false` always implies
/// `remaining_seconds == 0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerState {
    pub remaining_seconds: u64,
    pub running: bool,
}

pub struct TimerController {
    state: TimerState,
    interval: Duration,
    next_tick: Option<Instant>,
    on_tick: TickCallback,
    on_finished: FinishedCallback,
}

impl TimerController {
    pub fn new(on_tick: TickCallback, on_finished: FinishedCallback) -> Self {
        Self::with_interval(DEFAULT_INTERVAL, on_tick, on_finished)
    }

    pub fn with_interval(
        interval: Duration,
        on_tick: TickCallback,
        on_finished: FinishedCallback,
    ) -> Self {
        Self {
            state: TimerState::default(),
            interval,
            next_tick: None,
            on_tick,
            on_finished,
        }
    }

    pub fn start(&mut self, seconds: u64) -> Result<(), TimerError> {
        self.start_at(seconds, Instant::now())
    }

    /// Starts a countdown of `seconds` with `now` as the reference point of
    /// the cadence.
    ///
    /// `on_tick(seconds)` fires before this returns so a display can show the
    /// starting value right away. A zero-length countdown completes inside
    /// this call: one `on_tick(0)` followed by one `on_finished()`.
    pub fn start_at(&mut self, seconds: u64, now: Instant) -> Result<(), TimerError> {
        if self.state.running {
            return Err(TimerError::AlreadyRunning {
                remaining: self.state.remaining_seconds,
            });
        }

        self.state = TimerState {
            remaining_seconds: seconds,
            running: true,
        };
        info!(seconds, "countdown started");
        (self.on_tick)(seconds);

        if seconds == 0 {
            self.finish();
        } else {
            self.next_tick = Some(now + self.interval);
        }
        Ok(())
    }

    /// Cancels the active countdown and resets the state.
    ///
    /// `on_finished` is not invoked here; the caller runs its own finishing
    /// logic after a cancel. Returns `false` when nothing was running.
    pub fn stop(&mut self) -> bool {
        if !self.state.running {
            return false;
        }
        info!(
            remaining = self.state.remaining_seconds,
            "countdown stopped"
        );
        self.next_tick = None;
        self.state = TimerState::default();
        true
    }

    pub fn poll(&mut self) -> u64 {
        self.poll_at(Instant::now())
    }

    /// Fires every tick that has come due by `now` and returns how many fired.
    ///
    /// A late poll catches up one tick per elapsed interval, stopping at zero.
    pub fn poll_at(&mut self, now: Instant) -> u64 {
        let mut fired = 0;
        while let Some(due) = self.next_tick {
            if now < due {
                break;
            }

            let remaining = self.state.remaining_seconds.saturating_sub(1);
            self.state.remaining_seconds = remaining;
            fired += 1;
            debug!(remaining, "countdown tick");
            (self.on_tick)(remaining);

            if remaining == 0 {
                self.finish();
            } else {
                self.next_tick = Some(due + self.interval);
            }
        }
        fired
    }

    /// Time left before the next tick is due, `None` while idle.
    pub fn time_until_next_tick(&self, now: Instant) -> Option<Duration> {
        self.next_tick
            .map(|due| due.saturating_duration_since(now))
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn remaining(&self) -> u64 {
        self.state.remaining_seconds
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    fn finish(&mut self) {
        self.next_tick = None;
        self.state = TimerState::default();
        info!("countdown finished");
        (self.on_finished)();
    }
}

impl fmt::Debug for TimerController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerController")
            .field("state", &self.state)
            .field("interval", &self.interval)
            .field("next_tick", &self.next_tick)
            .finish_non_exhaustive()
    }
}
