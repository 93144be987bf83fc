//! Protocol timing and palette configuration.
//!
//! All durations are counted in ticks. A tick is one read-decide-write pass
//! over every face.

use crate::error::{ConfigError, Result};
use crate::wire::MAX_PALETTE;

/// Tunables shared by every node of a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ProtocolConfig {
    /// Number of colors a tile can claim during setup.
    pub palette_size: u8,

    /// How long a node keeps collecting answers after joining a round.
    /// Must cover a query travelling out and a dissent travelling back
    /// across the whole mesh: roughly `2 * diameter + send_repeats`.
    pub answer_window: u32,

    /// Pause between the end of one round and the next query.
    pub recheck_interval: u32,

    /// Consecutive confirmations required before acting on silence or
    /// on an "everyone is active" verdict.
    pub min_confirm: u32,

    /// How many consecutive ticks every protocol value is held on a face.
    pub send_repeats: u32,

    /// Ticks between face changes of the tumbling die.
    pub outcome_reveal_pace: u32,

    /// Chance, in percent, that a colliding node moves to the next color.
    pub retreat_percent: u8,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            palette_size: 6,
            answer_window: 24,
            recheck_interval: 8,
            min_confirm: 3,
            send_repeats: 3,
            outcome_reveal_pace: 4,
            retreat_percent: 10,
        }
    }
}

impl ProtocolConfig {
    /// Set the palette size.
    #[must_use]
    pub fn with_palette_size(mut self, size: u8) -> Self {
        self.palette_size = size;
        self
    }

    /// Set the answer window.
    #[must_use]
    pub fn with_answer_window(mut self, ticks: u32) -> Self {
        self.answer_window = ticks;
        self
    }

    /// Set the recheck interval.
    #[must_use]
    pub fn with_recheck_interval(mut self, ticks: u32) -> Self {
        self.recheck_interval = ticks;
        self
    }

    /// Set the confirmation debounce.
    #[must_use]
    pub fn with_min_confirm(mut self, count: u32) -> Self {
        self.min_confirm = count;
        self
    }

    /// Set the send redundancy.
    #[must_use]
    pub fn with_send_repeats(mut self, repeats: u32) -> Self {
        self.send_repeats = repeats;
        self
    }

    /// Set the die tumbling pace.
    #[must_use]
    pub fn with_outcome_reveal_pace(mut self, ticks: u32) -> Self {
        self.outcome_reveal_pace = ticks;
        self
    }

    /// Set the color retreat chance.
    #[must_use]
    pub fn with_retreat_percent(mut self, percent: u8) -> Self {
        self.retreat_percent = percent;
        self
    }

    /// Check that the configuration is usable on the wire.
    pub fn validate(&self) -> Result<()> {
        if self.palette_size == 0 || self.palette_size > MAX_PALETTE {
            return Err(ConfigError::PaletteSize {
                size: self.palette_size,
                max: MAX_PALETTE,
            });
        }
        for (name, value) in [
            ("answer_window", self.answer_window),
            ("recheck_interval", self.recheck_interval),
            ("min_confirm", self.min_confirm),
            ("send_repeats", self.send_repeats),
            ("outcome_reveal_pace", self.outcome_reveal_pace),
        ] {
            if value == 0 {
                return Err(ConfigError::Zero(name));
            }
        }
        for (longer, longer_value) in [
            ("answer_window", self.answer_window),
            ("recheck_interval", self.recheck_interval),
        ] {
            if longer_value <= self.send_repeats {
                return Err(ConfigError::Overlap {
                    longer,
                    longer_value,
                    shorter: "send_repeats",
                    shorter_value: self.send_repeats,
                });
            }
        }
        if self.retreat_percent == 0 || self.retreat_percent > 100 {
            return Err(ConfigError::RetreatPercent(self.retreat_percent));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(ProtocolConfig::default().validate(), Ok(()));
    }

    #[test]
    fn palette_must_fit_below_control_codes() {
        let err = ProtocolConfig::default()
            .with_palette_size(MAX_PALETTE + 1)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::PaletteSize { .. }));
        assert!(ProtocolConfig::default().with_palette_size(MAX_PALETTE).validate().is_ok());
        assert!(ProtocolConfig::default().with_palette_size(0).validate().is_err());
    }

    #[test]
    fn zero_durations_rejected() {
        let err = ProtocolConfig::default().with_min_confirm(0).validate().unwrap_err();
        assert_eq!(err, ConfigError::Zero("min_confirm"));
    }

    #[test]
    fn recheck_must_outlast_repeats() {
        let err = ProtocolConfig::default()
            .with_send_repeats(8)
            .with_recheck_interval(8)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Overlap { longer: "recheck_interval", .. }));
    }

    #[test]
    fn retreat_chance_is_a_percentage() {
        assert_eq!(
            ProtocolConfig::default().with_retreat_percent(0).validate(),
            Err(ConfigError::RetreatPercent(0))
        );
        assert!(ProtocolConfig::default().with_retreat_percent(100).validate().is_ok());
    }
}
