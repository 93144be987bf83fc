//! Simulation timeline events.

use std::collections::BTreeMap;

use hexroll_protocol::{Phase, ResetCause};
use hexroll_topology::{facing, Face, HexCoord};
use serde::{Deserialize, Serialize};

/// Stable identifier of a placed tile. Never reused within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileId(pub u64);

impl std::fmt::Display for TileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tile#{}", self.0)
    }
}

/// State of a tile as seen by an observer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileState {
    pub id: TileId,
    pub coord: HexCoord,
    pub phase: Phase,
    pub color_index: u8,
    pub outcome: u8,
    pub has_lost: bool,
}

/// Two touching tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkState {
    pub from: TileId,
    pub to: TileId,
    /// Face of `from` that touches `to`.
    pub face: Face,
}

/// Things that happen during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimEvent {
    /// A tile was placed on the table
    TileAttached {
        tile: TileId,
        coord: HexCoord,
        color_index: u8,
        tick: u64,
    },

    /// A tile was picked up
    TileDetached { tile: TileId, coord: HexCoord, tick: u64 },

    /// A tile consumed a button press
    ButtonPressed { tile: TileId, tick: u64 },

    /// A tile changed phase
    PhaseChanged {
        tile: TileId,
        from: Phase,
        to: Phase,
        outcome: u8,
        tick: u64,
    },

    /// A tile moved to another palette color
    ColorChanged { tile: TileId, from: u8, to: u8, tick: u64 },

    /// A tile learned it was outrolled
    Outrolled { tile: TileId, highest: u8, tick: u64 },

    /// A tile went back to setup
    ResetFlooded { tile: TileId, cause: ResetCause, tick: u64 },

    /// Every tile is comparing and agrees on the highest outcome
    Settled { highest: u8, tiles: usize, tick: u64 },
}

impl SimEvent {
    /// Tick at which the event happened.
    pub fn tick(&self) -> u64 {
        match self {
            SimEvent::TileAttached { tick, .. }
            | SimEvent::TileDetached { tick, .. }
            | SimEvent::ButtonPressed { tick, .. }
            | SimEvent::PhaseChanged { tick, .. }
            | SimEvent::ColorChanged { tick, .. }
            | SimEvent::Outrolled { tick, .. }
            | SimEvent::ResetFlooded { tick, .. }
            | SimEvent::Settled { tick, .. } => *tick,
        }
    }

    /// Tile the event is about, if any.
    pub fn tile(&self) -> Option<TileId> {
        match self {
            SimEvent::TileAttached { tile, .. }
            | SimEvent::TileDetached { tile, .. }
            | SimEvent::ButtonPressed { tile, .. }
            | SimEvent::PhaseChanged { tile, .. }
            | SimEvent::ColorChanged { tile, .. }
            | SimEvent::Outrolled { tile, .. }
            | SimEvent::ResetFlooded { tile, .. } => Some(*tile),
            SimEvent::Settled { .. } => None,
        }
    }
}

/// The mesh at a point in the timeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshSnapshot {
    pub tick: u64,
    pub tiles: Vec<TileState>,
    pub links: Vec<LinkState>,
    pub tile_count: usize,
    pub compare_count: usize,
    pub settled: bool,
}

impl MeshSnapshot {
    /// Build a snapshot from tile states, deriving links from coordinates.
    pub fn from_tiles(tick: u64, mut tiles: Vec<TileState>, settled: bool) -> Self {
        tiles.sort_by_key(|t| t.id);
        let links = tiles
            .iter()
            .flat_map(|a| {
                tiles.iter().filter_map(move |b| {
                    let face = facing(a.coord, b.coord)?;
                    (a.id < b.id).then_some(LinkState {
                        from: a.id,
                        to: b.id,
                        face,
                    })
                })
            })
            .collect();
        let compare_count = tiles.iter().filter(|t| t.phase == Phase::Compare).count();

        MeshSnapshot {
            tick,
            tile_count: tiles.len(),
            compare_count,
            settled,
            tiles,
            links,
        }
    }

    /// Replay a timeline prefix.
    pub fn from_events(events: &[SimEvent]) -> Self {
        let mut tiles: BTreeMap<TileId, TileState> = BTreeMap::new();
        let mut tick = 0;
        let mut settled = false;

        for event in events {
            tick = event.tick();
            match event {
                SimEvent::TileAttached {
                    tile,
                    coord,
                    color_index,
                    ..
                } => {
                    tiles.insert(
                        *tile,
                        TileState {
                            id: *tile,
                            coord: *coord,
                            phase: Phase::Setup,
                            color_index: *color_index,
                            outcome: 0,
                            has_lost: false,
                        },
                    );
                    settled = false;
                }
                SimEvent::TileDetached { tile, .. } => {
                    tiles.remove(tile);
                    settled = false;
                }
                SimEvent::PhaseChanged { tile, to, outcome, .. } => {
                    if let Some(state) = tiles.get_mut(tile) {
                        state.phase = *to;
                        state.outcome = *outcome;
                        state.has_lost = false;
                    }
                    if *to != Phase::Compare {
                        settled = false;
                    }
                }
                SimEvent::ColorChanged { tile, to, .. } => {
                    if let Some(state) = tiles.get_mut(tile) {
                        state.color_index = *to;
                    }
                }
                SimEvent::Outrolled { tile, .. } => {
                    if let Some(state) = tiles.get_mut(tile) {
                        state.has_lost = true;
                    }
                }
                SimEvent::Settled { .. } => settled = true,
                SimEvent::ButtonPressed { .. } | SimEvent::ResetFlooded { .. } => {}
            }
        }

        Self::from_tiles(tick, tiles.into_values().collect(), settled)
    }
}
