//! Tick-counted countdown timers.
//!
//! Nothing in the protocol blocks. A component that needs to wait arms a
//! timer and checks it at the top of a later tick.

/// A countdown that expires after a whole number of ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timer {
    remaining: Option<u32>,
}

impl Timer {
    /// Start counting down. Re-arming replaces the previous deadline.
    pub fn arm(&mut self, ticks: u32) {
        self.remaining = Some(ticks);
    }

    /// Stop the timer; it will not expire until armed again.
    pub fn disarm(&mut self) {
        self.remaining = None;
    }

    /// Advance by one tick.
    pub fn tick(&mut self) {
        if let Some(remaining) = &mut self.remaining {
            *remaining = remaining.saturating_sub(1);
        }
    }

    pub fn is_armed(&self) -> bool {
        self.remaining.is_some()
    }

    /// Armed and run down to zero.
    pub fn is_expired(&self) -> bool {
        self.remaining == Some(0)
    }

    /// Consume an expiry: returns true once, then the timer is disarmed.
    pub fn take_expired(&mut self) -> bool {
        if self.is_expired() {
            self.remaining = None;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_after_exactly_the_armed_ticks() {
        let mut timer = Timer::default();
        timer.arm(3);
        for _ in 0..2 {
            timer.tick();
            assert!(!timer.is_expired());
        }
        timer.tick();
        assert!(timer.is_expired());
        assert!(timer.take_expired());
        assert!(!timer.is_armed());
        assert!(!timer.take_expired());
    }

    #[test]
    fn disarmed_timer_never_expires() {
        let mut timer = Timer::default();
        for _ in 0..10 {
            timer.tick();
        }
        assert!(!timer.is_expired());

        timer.arm(1);
        timer.disarm();
        timer.tick();
        assert!(!timer.is_expired());
    }
}
