//! One-byte neighbor codec.
//!
//! | Byte | Meaning |
//! |---|---|
//! | 0 | no device present (never sent) |
//! | 1..=6 | final outcome (compare phase) |
//! | 8 | answer: active |
//! | 9 | answer: not active |
//! | 11..=N+10 | color claim for palette index 1..=N |
//! | 60 | nothing new |
//! | 61 | query: is everyone active? |
//! | 62 | reset |

use crate::channel::Reading;

/// Reserved for an empty face.
pub const NO_DEVICE: u8 = 0;
/// Highest die face.
pub const MAX_OUTCOME: u8 = 6;
/// Answer: this part of the mesh is active.
pub const ANSWER_ACTIVE: u8 = 8;
/// Answer: somebody here is still in setup.
pub const ANSWER_NOT_ACTIVE: u8 = 9;
/// Color index `i` travels as `i + COLOR_OFFSET`.
pub const COLOR_OFFSET: u8 = 10;
/// Nothing new to say.
pub const NOOP: u8 = 60;
/// Is everyone active?
pub const QUERY: u8 = 61;
/// Return to setup.
pub const RESET: u8 = 62;
/// Largest palette whose claims stay below the control codes.
pub const MAX_PALETTE: u8 = NOOP - COLOR_OFFSET - 1;

/// A consensus answer. `NotActive` outranks `Active`.
///
/// Within a round the neutral "nothing heard yet" state is `None`, so
/// `Option<Answer>` orders as `None < Some(Active) < Some(NotActive)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Answer {
    Active,
    NotActive,
}

impl Answer {
    pub const fn code(self) -> u8 {
        match self {
            Answer::Active => ANSWER_ACTIVE,
            Answer::NotActive => ANSWER_NOT_ACTIVE,
        }
    }
}

/// A decoded protocol value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    NoOp,
    Query,
    Reset,
    Answer(Answer),
    /// Palette index, 1-based.
    ColorClaim(u8),
    /// Die value 1..=6.
    Outcome(u8),
}

impl Signal {
    /// Byte carried on the wire. A claim past [`MAX_PALETTE`] has no code
    /// and goes out as [`NOOP`].
    pub const fn encode(self) -> u8 {
        match self {
            Signal::NoOp => NOOP,
            Signal::Query => QUERY,
            Signal::Reset => RESET,
            Signal::Answer(answer) => answer.code(),
            Signal::ColorClaim(index) if index > MAX_PALETTE => NOOP,
            Signal::ColorClaim(index) => index + COLOR_OFFSET,
            Signal::Outcome(value) => value,
        }
    }

    /// Decode a received byte. `None` for the empty face and for bytes
    /// outside the code table.
    pub fn decode(byte: u8, palette_size: u8) -> Option<Self> {
        match byte {
            NO_DEVICE => None,
            NOOP => Some(Signal::NoOp),
            QUERY => Some(Signal::Query),
            RESET => Some(Signal::Reset),
            ANSWER_ACTIVE => Some(Signal::Answer(Answer::Active)),
            ANSWER_NOT_ACTIVE => Some(Signal::Answer(Answer::NotActive)),
            1..=MAX_OUTCOME => Some(Signal::Outcome(byte)),
            b if b > COLOR_OFFSET && b <= COLOR_OFFSET.saturating_add(palette_size) => {
                Some(Signal::ColorClaim(b - COLOR_OFFSET))
            }
            _ => None,
        }
    }
}

/// What one face said this tick, as seen by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotEvent {
    /// Nothing fresh on this face; treated as an empty slot.
    Stale,
    NoOp,
    Query,
    Reset,
    Answer(Answer),
    ColorClaim(u8),
    Outcome(u8),
}

/// Classify a raw reading. Unknown bytes are inert.
pub fn classify(reading: Reading, palette_size: u8) -> SlotEvent {
    if !reading.fresh {
        return SlotEvent::Stale;
    }
    match Signal::decode(reading.value, palette_size) {
        None if reading.value == NO_DEVICE => SlotEvent::Stale,
        None | Some(Signal::NoOp) => SlotEvent::NoOp,
        Some(Signal::Query) => SlotEvent::Query,
        Some(Signal::Reset) => SlotEvent::Reset,
        Some(Signal::Answer(answer)) => SlotEvent::Answer(answer),
        Some(Signal::ColorClaim(index)) => SlotEvent::ColorClaim(index),
        Some(Signal::Outcome(value)) => SlotEvent::Outcome(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_is_never_a_protocol_value() {
        assert_eq!(Signal::decode(NO_DEVICE, MAX_PALETTE), None);
        let fresh_zero = Reading { value: NO_DEVICE, fresh: true };
        assert_eq!(classify(fresh_zero, 6), SlotEvent::Stale);
    }

    #[test]
    fn control_codes_match_table() {
        assert_eq!(Signal::NoOp.encode(), 60);
        assert_eq!(Signal::Query.encode(), 61);
        assert_eq!(Signal::Reset.encode(), 62);
        assert_eq!(Signal::Answer(Answer::NotActive).encode(), 9);
        assert_eq!(Signal::Answer(Answer::Active).encode(), 8);
        assert_eq!(Signal::ColorClaim(1).encode(), 11);
        assert_eq!(Signal::Outcome(6).encode(), 6);
    }

    #[test]
    fn not_active_outranks_active_outranks_nothing() {
        assert!(Some(Answer::NotActive) > Some(Answer::Active));
        assert!(Some(Answer::Active) > None);
        assert_eq!(
            [None, Some(Answer::NotActive), Some(Answer::Active)].into_iter().max(),
            Some(Some(Answer::NotActive))
        );
    }

    #[test]
    fn oversized_claim_encodes_as_noop() {
        assert_eq!(Signal::ColorClaim(MAX_PALETTE).encode(), NOOP - 1);
        assert_eq!(Signal::ColorClaim(MAX_PALETTE + 1).encode(), NOOP);
        assert_eq!(Signal::ColorClaim(u8::MAX).encode(), NOOP);
    }

    #[test]
    fn claims_beyond_the_palette_are_inert() {
        assert_eq!(Signal::decode(COLOR_OFFSET + 7, 6), None);
        assert_eq!(Signal::decode(COLOR_OFFSET, 6), None);
        assert_eq!(Signal::decode(7, 6), None);
        let reading = Reading { value: COLOR_OFFSET + 7, fresh: true };
        assert_eq!(classify(reading, 6), SlotEvent::NoOp);
    }

    #[test]
    fn stale_readings_are_ignored() {
        let reading = Reading { value: QUERY, fresh: false };
        assert_eq!(classify(reading, 6), SlotEvent::Stale);
    }

    proptest! {
        #[test]
        fn color_claims_round_trip(palette in 1u8..=MAX_PALETTE, seed in any::<u8>()) {
            let index = seed % palette + 1;
            let byte = Signal::ColorClaim(index).encode();
            prop_assert!(byte > COLOR_OFFSET && byte < NOOP);
            prop_assert_eq!(Signal::decode(byte, palette), Some(Signal::ColorClaim(index)));
        }

        #[test]
        fn outcomes_round_trip(value in 1u8..=MAX_OUTCOME) {
            let byte = Signal::Outcome(value).encode();
            prop_assert_eq!(Signal::decode(byte, 6), Some(Signal::Outcome(value)));
        }
    }
}
