//! Hexroll Mesh Simulator
//!
//! Runs many tiles against each other on a virtual table and records what
//! happens, so a run can be scrubbed through afterwards.
//!
//! # Architecture
//!
//! - **Medium**: carries one byte per face per tick between touching tiles,
//!   optionally dropping some
//! - **Simulation**: places, removes and presses tiles and ticks them in
//!   lockstep, recording a timeline of events
//! - **Playback**: seek and step through the timeline by tick
//! - **InspectServer**: REST and WebSocket access to playback
//!
//! # Usage
//!
//! ```ignore
//! let mut sim = Simulation::with_layout(SimulationConfig::default(), &Layout::spiral(7))?;
//! sim.press_all();
//! sim.run_until(Simulation::is_settled, 1_000);
//!
//! InspectServer::new(sim).serve(3000).await?;
//! ```

mod config;
mod error;
mod events;
mod medium;
mod playback;
mod server;
mod simulation;

pub use config::SimulationConfig;
pub use error::{Error, Result};
pub use events::{LinkState, MeshSnapshot, SimEvent, TileId, TileState};
pub use medium::{Medium, SimBoard};
pub use playback::{Playback, PlaybackSpeed, PlaybackState, PlaybackStatus};
pub use server::InspectServer;
pub use simulation::Simulation;
