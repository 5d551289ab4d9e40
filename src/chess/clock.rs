//! Time control and the pair of countdown clocks backing a timed match.
//!
//! The clocks only hold remaining time; measuring elapsed wall time and
//! deciding when to charge a side is the game state machine's job.

use std::time::Duration;

use crate::chess::core::Color;

/// How much time each side gets and what a completed move earns back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeControl {
    /// Base time each side starts the game with. Zero disables the clocks
    /// entirely: no countdown runs and nobody can flag.
    pub time_per_side: Duration,
    /// Increment added to a side's clock after each of its completed moves.
    pub time_per_move: Duration,
}

impl TimeControl {
    /// A blitz-style control: `minutes` base plus `seconds` increment.
    #[must_use]
    pub const fn new(minutes: u64, seconds: u64) -> Self {
        Self {
            time_per_side: Duration::from_secs(minutes * 60),
            time_per_move: Duration::from_secs(seconds),
        }
    }

    /// True iff the clocks are disabled.
    #[must_use]
    pub fn untimed(&self) -> bool {
        self.time_per_side.is_zero()
    }
}

impl Default for TimeControl {
    /// Five minutes per side, no increment.
    fn default() -> Self {
        Self::new(5, 0)
    }
}

/// Remaining time of both sides.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ClockPair {
    white: Duration,
    black: Duration,
}

impl ClockPair {
    pub(crate) const fn new(control: TimeControl) -> Self {
        Self {
            white: control.time_per_side,
            black: control.time_per_side,
        }
    }

    pub(crate) const fn remaining(&self, color: Color) -> Duration {
        match color {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    pub(crate) fn set_remaining(&mut self, color: Color, remaining: Duration) {
        match color {
            Color::White => self.white = remaining,
            Color::Black => self.black = remaining,
        }
    }

    /// Deducts the elapsed thinking time from a side's clock and credits the
    /// increment, returning the new remaining time. Saturates at zero before
    /// the increment is added, matching a flag caught just in time.
    pub(crate) fn charge(
        &mut self,
        color: Color,
        elapsed: Duration,
        increment: Duration,
    ) -> Duration {
        let remaining = self.remaining(color).saturating_sub(elapsed) + increment;
        self.set_remaining(color, remaining);
        remaining
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn charge_deducts_and_credits() {
        let mut clocks = ClockPair::new(TimeControl::new(1, 2));
        let left = clocks.charge(
            Color::White,
            Duration::from_secs(10),
            Duration::from_secs(2),
        );
        assert_eq!(left, Duration::from_secs(52));
        // The other side is untouched.
        assert_eq!(clocks.remaining(Color::Black), Duration::from_secs(60));
    }

    #[test]
    fn charge_saturates_before_the_increment() {
        let mut clocks = ClockPair::new(TimeControl::new(0, 0));
        clocks.set_remaining(Color::Black, Duration::from_secs(1));
        let left = clocks.charge(
            Color::Black,
            Duration::from_secs(30),
            Duration::from_secs(2),
        );
        assert_eq!(left, Duration::from_secs(2));
    }

    #[test]
    fn zero_base_time_means_untimed() {
        assert!(TimeControl {
            time_per_side: Duration::ZERO,
            time_per_move: Duration::ZERO,
        }
        .untimed());
        assert!(!TimeControl::default().untimed());
    }
}
