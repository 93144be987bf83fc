//! The die itself. Only its outcome feeds back into the protocol; the
//! tumbling face is for the display.

use crate::timer::Timer;
use crate::wire::MAX_OUTCOME;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceEngine {
    outcome: u8,
    shown: u8,
    reveal_timer: Timer,
}

impl Default for DiceEngine {
    fn default() -> Self {
        Self {
            outcome: 1,
            shown: 1,
            reveal_timer: Timer::default(),
        }
    }
}

impl DiceEngine {
    /// Fix the outcome from a uniform draw in `0..6` and start tumbling.
    pub fn roll(&mut self, draw: u32, pace: u32) -> u8 {
        self.outcome = (draw % u32::from(MAX_OUTCOME)) as u8 + 1;
        self.shown = self.outcome % MAX_OUTCOME + 1;
        self.reveal_timer.arm(pace);
        self.outcome
    }

    /// One tick of tumbling.
    pub fn advance(&mut self, pace: u32) {
        self.reveal_timer.tick();
        if self.reveal_timer.take_expired() {
            self.shown = self.shown % MAX_OUTCOME + 1;
            self.reveal_timer.arm(pace);
        }
    }

    pub fn outcome(&self) -> u8 {
        self.outcome
    }

    /// Face currently shown while tumbling.
    pub fn shown(&self) -> u8 {
        self.shown
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
