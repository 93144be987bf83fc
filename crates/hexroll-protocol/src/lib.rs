//! Hexroll Tile Protocol
//!
//! Leaderless coordination for a mesh of touching hexagonal dice tiles.
//! Each tile runs the same [`Node`] and talks to its up-to-six neighbors
//! through one byte per face per tick. There are no addresses, no routing
//! and no global clock.
//!
//! # Phases
//!
//! - **Setup**: tiles claim palette colors and retreat from collisions with
//!   touching tiles until every pair of neighbors differs.
//! - **Rolling**: a button press rolls the die and starts asking the mesh
//!   "is everyone active?". Answers flood back as an OR of "not active".
//! - **Compare**: every tile floods the highest outcome it has seen; tiles
//!   that were outrolled dim.
//!
//! A press during compare floods a reset back to setup. A tile that loses
//! all its neighbors resets on its own.
//!
//! # Wire
//!
//! See [`wire`] for the byte table. Everything else in this crate is local
//! state driven by those bytes.

pub mod arbiter;
mod board;
pub mod channel;
mod config;
pub mod consensus;
mod dice;
mod error;
pub mod isolation;
mod node;
pub mod palette;
pub mod reset;
mod timer;
pub mod wire;

pub use board::{Board, NodeView};
pub use channel::{NeighborChannel, NeighborSlot, Observation, Reading};
pub use config::ProtocolConfig;
pub use consensus::RollingConsensus;
pub use dice::DiceEngine;
pub use error::{ConfigError, Result};
pub use isolation::IsolationDetector;
pub use node::{Node, Phase, TickReport};
pub use palette::PaletteColor;
pub use reset::ResetCause;
pub use timer::Timer;
pub use wire::{Answer, Signal, SlotEvent};
