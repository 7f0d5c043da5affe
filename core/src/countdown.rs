//! Explicitly advanced countdown used for cooldowns and timed effects.

use std::time::Duration;

/// Remaining time until some timed state expires.
///
/// A fresh countdown has already ended. Callers advance it once per tick with
/// [`Countdown::update`]; nothing happens implicitly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Countdown {
    remaining: Duration,
}

impl Countdown {
    /// Creates a countdown that has already ended.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            remaining: Duration::ZERO,
        }
    }

    /// Restarts the countdown with the provided duration.
    pub fn start(&mut self, duration: Duration) {
        self.remaining = duration;
    }

    /// Consumes `elapsed` simulated time, saturating at zero.
    pub fn update(&mut self, elapsed: Duration) {
        self.remaining = self.remaining.saturating_sub(elapsed);
    }

    /// Reports whether the countdown has run out.
    #[must_use]
    pub fn ended(&self) -> bool {
        self.remaining.is_zero()
    }

    /// Time left before the countdown ends.
    #[must_use]
    pub const fn remaining(&self) -> Duration {
        self.remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_countdown_has_ended() {
        assert!(Countdown::new().ended());
    }

    #[test]
    fn update_saturates_at_zero() {
        let mut countdown = Countdown::new();
        countdown.start(Duration::from_millis(300));
        countdown.update(Duration::from_millis(200));
        assert!(!countdown.ended());
        assert_eq!(countdown.remaining(), Duration::from_millis(100));

        countdown.update(Duration::from_secs(5));
        assert!(countdown.ended());
        assert_eq!(countdown.remaining(), Duration::ZERO);
    }
}
