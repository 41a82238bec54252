//! Shared elapsed-time state machine.
//!
//! The clock lives inside the replicated document so every participant sees
//! the same elapsed time. While running, `last_updated` holds the wall-clock
//! instant the clock last started; while paused or stopped it is `None` and
//! `total_time` is frozen.

use serde::{Deserialize, Serialize};
use web_time::SystemTime;

/// Milliseconds since the Unix epoch.
pub type Millis = u64;

/// Source of wall-clock time, injectable so every time-dependent behavior
/// is testable without sleeping.
pub trait TimeSource {
    fn now_ms(&self) -> Millis;
}

/// Wall clock backed by `web_time` (plain `std::time` off wasm32).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now_ms(&self) -> Millis {
        SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_millis() as Millis)
            .unwrap_or(0)
    }
}

/// Clock action requested by an editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockAction {
    Start,
    Pause,
    Reset,
}

impl ClockAction {
    /// Boundary helper for callers holding a raw token. Unknown tokens map
    /// to `None`; the caller treats that as a no-op.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "start" => Some(Self::Start),
            "pause" => Some(Self::Pause),
            "reset" => Some(Self::Reset),
            _ => None,
        }
    }
}

/// Persisted clock state.
///
/// Stopped: `last_updated = None`, `total_time = 0`. Paused:
/// `last_updated = None`, `total_time` frozen. Running:
/// `last_updated = Some(start)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockState {
    pub last_updated: Option<Millis>,
    pub total_time: Millis,
    pub paused: bool,
}

impl Default for ClockState {
    fn default() -> Self {
        Self {
            last_updated: None,
            total_time: 0,
            paused: true,
        }
    }
}

impl ClockState {
    pub fn is_running(&self) -> bool {
        self.last_updated.is_some()
    }

    /// Apply a clock action. Self-transitions (`start` while running,
    /// `pause` while paused or stopped) are idempotent no-ops.
    pub fn apply(&mut self, action: ClockAction, now: Millis) {
        match action {
            ClockAction::Start => {
                if self.last_updated.is_none() {
                    self.last_updated = Some(now);
                    self.paused = false;
                }
            }
            ClockAction::Pause => {
                if let Some(started) = self.last_updated.take() {
                    self.total_time += now.saturating_sub(started);
                    self.paused = true;
                }
            }
            ClockAction::Reset => {
                self.last_updated = None;
                self.total_time = 0;
                self.paused = true;
            }
        }
    }

    /// Elapsed time to display: frozen `total_time` when not running,
    /// `total_time + (now - last_updated)` when running.
    pub fn elapsed(&self, now: Millis) -> Millis {
        match self.last_updated {
            Some(started) => self.total_time + now.saturating_sub(started),
            None => self.total_time,
        }
    }
}

/// Manually-advanced clock for tests.
#[cfg(test)]
pub(crate) mod testing {
    use super::{Millis, TimeSource};
    use std::cell::Cell;

    #[derive(Debug, Default)]
    pub(crate) struct ManualClock {
        now: Cell<Millis>,
    }

    impl ManualClock {
        pub(crate) fn at(now: Millis) -> Self {
            Self { now: Cell::new(now) }
        }

        pub(crate) fn advance(&self, delta: Millis) {
            self.now.set(self.now.get() + delta);
        }
    }

    impl TimeSource for ManualClock {
        fn now_ms(&self) -> Millis {
            self.now.get()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_then_pause_accumulates_elapsed() {
        let mut clock = ClockState::default();
        clock.apply(ClockAction::Start, 1_000);
        assert!(clock.is_running());

        clock.apply(ClockAction::Pause, 4_500);
        assert!(!clock.is_running());
        assert_eq!(clock.total_time, 3_500);
        assert_eq!(clock.elapsed(10_000), 3_500);
    }

    #[test]
    fn test_running_elapsed_tracks_now() {
        let mut clock = ClockState::default();
        clock.apply(ClockAction::Start, 1_000);
        assert_eq!(clock.elapsed(1_250), 250);
    }

    #[test]
    fn test_start_does_not_reset_total() {
        let mut clock = ClockState::default();
        clock.apply(ClockAction::Start, 0);
        clock.apply(ClockAction::Pause, 100);
        clock.apply(ClockAction::Start, 500);
        clock.apply(ClockAction::Pause, 600);
        assert_eq!(clock.total_time, 200);
    }

    #[test]
    fn test_reset_from_any_state() {
        let mut clock = ClockState::default();
        clock.apply(ClockAction::Start, 0);
        clock.apply(ClockAction::Reset, 700);
        assert_eq!(clock, ClockState::default());

        clock.apply(ClockAction::Start, 1_000);
        clock.apply(ClockAction::Pause, 1_200);
        clock.apply(ClockAction::Reset, 1_300);
        assert_eq!(clock.total_time, 0);
        assert!(!clock.is_running());
    }

    #[test]
    fn test_pause_while_not_running_is_noop() {
        let mut clock = ClockState::default();
        clock.apply(ClockAction::Pause, 9_999);
        assert_eq!(clock, ClockState::default());

        clock.apply(ClockAction::Start, 0);
        clock.apply(ClockAction::Pause, 50);
        let frozen = clock;
        clock.apply(ClockAction::Pause, 100);
        assert_eq!(clock, frozen);
    }

    #[test]
    fn test_start_while_running_is_noop() {
        let mut clock = ClockState::default();
        clock.apply(ClockAction::Start, 100);
        clock.apply(ClockAction::Start, 900);
        assert_eq!(clock.last_updated, Some(100));
    }

    #[test]
    fn test_action_parse() {
        assert_eq!(ClockAction::parse("start"), Some(ClockAction::Start));
        assert_eq!(ClockAction::parse("pause"), Some(ClockAction::Pause));
        assert_eq!(ClockAction::parse("reset"), Some(ClockAction::Reset));
        assert_eq!(ClockAction::parse("rewind"), None);
    }
}
