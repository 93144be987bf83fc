//! Error types for the simulator.

use hexroll_protocol::ConfigError;
use hexroll_topology::{HexCoord, LayoutError};
use thiserror::Error;

use crate::events::TileId;

/// Result type for simulator operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or driving a simulation.
#[derive(Debug, Error)]
pub enum Error {
    /// Protocol configuration rejected
    #[error("Protocol config error: {0}")]
    Config(#[from] ConfigError),

    /// Layout rejected
    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    /// No live tile with this id
    #[error("Unknown tile: {0}")]
    UnknownTile(TileId),

    /// A tile already sits at this coordinate
    #[error("Coordinate {0} is occupied")]
    Occupied(HexCoord),

    /// A round cannot cross the layout and come back within the window
    #[error("Answer window {window} too short for diameter {diameter}, needs {needed}")]
    AnswerWindow {
        window: u32,
        diameter: usize,
        needed: u32,
    },

    /// Loss rate must be a probability
    #[error("Loss rate {0} outside 0.0..=1.0")]
    LossRate(f64),

    /// Environment variable present but unparseable
    #[error("Invalid {var}: {value:?}")]
    Env { var: &'static str, value: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
