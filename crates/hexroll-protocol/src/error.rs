//! Error types for hexroll-protocol.
//!
//! The tick itself never fails; only building a node from a bad
//! configuration does.

use thiserror::Error;

/// Result type for hexroll-protocol operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// A protocol configuration that cannot work on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Palette does not fit between the answer codes and the control codes.
    #[error("palette size {size} outside 1..={max}")]
    PaletteSize { size: u8, max: u8 },

    /// A duration or count that must be at least one tick was zero.
    #[error("{0} must be at least 1")]
    Zero(&'static str),

    /// Two durations would let one round's answers leak into the next.
    #[error("{longer} ({longer_value}) must exceed {shorter} ({shorter_value})")]
    Overlap {
        longer: &'static str,
        longer_value: u32,
        shorter: &'static str,
        shorter_value: u32,
    },

    /// Retreat chance is a percentage.
    #[error("retreat chance {0}% outside 1..=100")]
    RetreatPercent(u8),
}
