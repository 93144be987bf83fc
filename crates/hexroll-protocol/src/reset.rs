//! Reset flooding.
//!
//! A node outside setup that sees a new reset on any face returns to setup
//! and re-broadcasts the reset once. Nodes already in setup ignore it, which
//! is what stops the flood from echoing forever: every hop re-broadcasts at
//! most once, so the whole component is reached in at most diameter ticks.

use hexroll_topology::FACE_COUNT;

use crate::channel::{NeighborChannel, Observation};
use crate::config::ProtocolConfig;
use crate::node::Phase;
use crate::wire::RESET;

/// Why a node went back to setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResetCause {
    /// Local button press during compare.
    Button,
    /// A neighbor's reset reached us.
    Flood,
    /// Every face went quiet.
    Isolation,
}

/// Whether a flooded reset applies to a node in `phase`.
pub fn received(phase: Phase, observations: &[Observation; FACE_COUNT]) -> bool {
    phase != Phase::Setup && observations.iter().any(Observation::is_new_reset)
}

/// Broadcast the reset on every face.
pub fn flood(channel: &mut NeighborChannel, config: &ProtocolConfig) {
    channel.stage_all(RESET, config.send_repeats);
}
