//! The hardware a node runs on.
//!
//! Everything outside the protocol (face transceivers, the button, the
//! random source, the display) sits behind one trait so the same node code
//! runs on a device, in the simulator, or against a scripted test double.

use hexroll_topology::Face;

use crate::channel::Reading;
use crate::node::Phase;
use crate::palette::PaletteColor;

/// Collaborators consumed by [`Node::tick`](crate::Node::tick).
pub trait Board {
    /// Last value received on `face` and whether it is still fresh.
    fn read_neighbor(&mut self, face: Face) -> Reading;

    /// Value to send on `face` until the next write.
    fn write_neighbor(&mut self, face: Face, value: u8);

    /// Edge-triggered; a press is reported once.
    fn button_triggered(&mut self) -> bool;

    /// Uniform draw in `0..bound`.
    fn random_int(&mut self, bound: u32) -> u32;

    /// Show a die face. Display only.
    fn render_outcome(&mut self, value: u8, color: PaletteColor);

    fn set_indicator_color(&mut self, color: PaletteColor);
}

/// Read-only view of a node for displays and observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeView {
    pub phase: Phase,
    pub color_index: u8,
    pub outcome: u8,
    pub has_lost: bool,
}
