//! Tick-driven mesh simulation with event recording.

use std::collections::{BTreeMap, HashMap};

use hexroll_protocol::{Node, NodeView, Phase, TickReport};
use hexroll_topology::{Face, HexCoord, Layout};
use tracing::{debug, info};

use crate::config::SimulationConfig;
use crate::error::{Error, Result};
use crate::events::{MeshSnapshot, SimEvent, TileId, TileState};
use crate::medium::{Medium, SimBoard};

/// One tile on the table.
#[derive(Debug, Clone)]
struct Tile {
    coord: HexCoord,
    node: Node,
    board: SimBoard,
}

impl Tile {
    fn state(&self, id: TileId) -> TileState {
        let view = self.node.view();
        TileState {
            id,
            coord: self.coord,
            phase: view.phase,
            color_index: view.color_index,
            outcome: visible_outcome(&view),
            has_lost: view.has_lost,
        }
    }
}

/// Setup tiles have no die showing.
fn visible_outcome(view: &NodeView) -> u8 {
    match view.phase {
        Phase::Setup => 0,
        Phase::Rolling | Phase::Compare => view.outcome,
    }
}

/// Runs every tile's tick in lockstep and records what changed.
pub struct Simulation {
    config: SimulationConfig,
    tiles: BTreeMap<TileId, Tile>,
    by_coord: HashMap<HexCoord, TileId>,
    medium: Medium,
    events: Vec<SimEvent>,
    next_tile_id: u64,
    tick: u64,
    settled: bool,
}

impl Simulation {
    /// Create an empty table.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            medium: Medium::new(config.seed, config.loss_rate),
            config,
            tiles: BTreeMap::new(),
            by_coord: HashMap::new(),
            events: Vec::new(),
            next_tile_id: 0,
            tick: 0,
            settled: false,
        })
    }

    /// Create a table with a tile at every coordinate of `layout`.
    pub fn with_layout(config: SimulationConfig, layout: &Layout) -> Result<Self> {
        let mut sim = Self::new(config)?;
        for &coord in layout.coords() {
            sim.place(coord)?;
        }
        Ok(sim)
    }

    /// Create a table from explicit coordinates, rejecting duplicates.
    pub fn from_coords(
        config: SimulationConfig,
        coords: impl IntoIterator<Item = HexCoord>,
    ) -> Result<Self> {
        let layout = Layout::from_coords(coords)?;
        Self::with_layout(config, &layout)
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Put a fresh tile down at `coord`.
    pub fn place(&mut self, coord: HexCoord) -> Result<TileId> {
        if self.by_coord.contains_key(&coord) {
            return Err(Error::Occupied(coord));
        }
        let id = TileId(self.next_tile_id);
        let node = Node::new(self.config.protocol)?;
        let seed = self
            .config
            .seed
            .wrapping_add(id.0.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
        let board = SimBoard::new(seed, self.config.stale_after);
        self.next_tile_id += 1;

        self.events.push(SimEvent::TileAttached {
            tile: id,
            coord,
            color_index: node.color_index(),
            tick: self.tick,
        });
        debug!(%id, %coord, "tile placed");
        self.tiles.insert(id, Tile { coord, node, board });
        self.by_coord.insert(coord, id);
        self.settled = false;
        Ok(id)
    }

    /// Pick a tile up. Its neighbors stop hearing from it.
    pub fn remove(&mut self, id: TileId) -> Result<()> {
        let tile = self.tiles.remove(&id).ok_or(Error::UnknownTile(id))?;
        self.by_coord.remove(&tile.coord);
        self.events.push(SimEvent::TileDetached {
            tile: id,
            coord: tile.coord,
            tick: self.tick,
        });
        debug!(%id, coord = %tile.coord, "tile removed");
        self.settled = false;
        Ok(())
    }

    /// Press the button on a tile; it is seen on the next step.
    pub fn press(&mut self, id: TileId) -> Result<()> {
        self.tile_mut(id)?.board.press();
        Ok(())
    }

    /// Press every tile's button.
    pub fn press_all(&mut self) {
        for tile in self.tiles.values_mut() {
            tile.board.press();
        }
    }

    /// Rig a tile's random source with fixed draws.
    pub fn queue_draws(&mut self, id: TileId, draws: impl IntoIterator<Item = u32>) -> Result<()> {
        self.tile_mut(id)?.board.queue_draws(draws);
        Ok(())
    }

    fn tile_mut(&mut self, id: TileId) -> Result<&mut Tile> {
        self.tiles.get_mut(&id).ok_or(Error::UnknownTile(id))
    }

    /// Advance every tile by one tick, then carry every written byte across
    /// its link.
    pub fn step(&mut self) {
        let tick = self.tick;
        for (&id, tile) in &mut self.tiles {
            tile.board.set_now(tick);
            let before = tile.node.view();
            let report = tile.node.tick(&mut tile.board);
            record(&mut self.events, id, &tile.node, before, report, tick);
        }

        let outbound: Vec<(HexCoord, [u8; 6])> = self
            .tiles
            .values()
            .map(|tile| (tile.coord, Face::ALL.map(|face| tile.board.outbound(face))))
            .collect();
        for (coord, bytes) in outbound {
            for face in Face::ALL {
                let Some(id) = self.by_coord.get(&(coord + face.direction())) else {
                    continue;
                };
                if let Some(neighbor) = self.tiles.get_mut(id) {
                    self.medium.carry(bytes[face.index()], face, &mut neighbor.board, tick);
                }
            }
        }

        self.check_settled(tick);
        self.tick += 1;
    }

    fn check_settled(&mut self, tick: u64) {
        let mut tiles = self
            .tiles
            .values()
            .map(|t| (t.node.phase(), t.node.highest_seen_outcome()));
        let settled = match tiles.next() {
            Some((Phase::Compare, first)) => {
                tiles.all(|(phase, h)| phase == Phase::Compare && h == first)
            }
            _ => false,
        };
        if settled && !self.settled {
            let top = self.highest_outcome().unwrap_or(0);
            info!(tick, highest = top, tiles = self.tiles.len(), "mesh settled");
            self.events.push(SimEvent::Settled {
                highest: top,
                tiles: self.tiles.len(),
                tick,
            });
        }
        self.settled = settled;
    }

    /// Step `ticks` times.
    pub fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.step();
        }
    }

    /// Step until `done` holds, at most `max_ticks` times. Returns how many
    /// steps it took, or `None` if it never held.
    pub fn run_until(
        &mut self,
        mut done: impl FnMut(&Simulation) -> bool,
        max_ticks: u64,
    ) -> Option<u64> {
        for taken in 0..=max_ticks {
            if done(self) {
                return Some(taken);
            }
            if taken < max_ticks {
                self.step();
            }
        }
        None
    }

    /// Ticks simulated so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Live tiles in placement order.
    pub fn tile_ids(&self) -> Vec<TileId> {
        self.tiles.keys().copied().collect()
    }

    pub fn tile_at(&self, coord: HexCoord) -> Option<TileId> {
        self.by_coord.get(&coord).copied()
    }

    pub fn node(&self, id: TileId) -> Option<&Node> {
        self.tiles.get(&id).map(|t| &t.node)
    }

    pub fn board(&self, id: TileId) -> Option<&SimBoard> {
        self.tiles.get(&id).map(|t| &t.board)
    }

    pub fn medium(&self) -> &Medium {
        &self.medium
    }

    /// Whether every tile is in `phase`. False for an empty table.
    pub fn all_in(&self, phase: Phase) -> bool {
        !self.tiles.is_empty() && self.tiles.values().all(|t| t.node.phase() == phase)
    }

    /// Every tile is comparing and agrees on the highest outcome.
    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// Highest outcome any tile has seen.
    pub fn highest_outcome(&self) -> Option<u8> {
        self.tiles.values().map(|t| t.node.highest_seen_outcome()).max()
    }

    /// Touching pairs currently claiming the same color.
    pub fn color_conflicts(&self) -> usize {
        self.tiles
            .values()
            .map(|tile| {
                Face::ALL
                    .into_iter()
                    .filter_map(|face| self.by_coord.get(&(tile.coord + face.direction())))
                    .filter_map(|id| self.tiles.get(id))
                    .filter(|other| other.node.color_index() == tile.node.color_index())
                    .count()
            })
            .sum::<usize>()
            / 2
    }

    /// All recorded events.
    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// The mesh as it stands now.
    pub fn snapshot(&self) -> MeshSnapshot {
        let tiles = self.tiles.iter().map(|(&id, tile)| tile.state(id)).collect();
        MeshSnapshot::from_tiles(self.tick, tiles, self.settled)
    }
}

/// Turn the difference a tick made into timeline events.
fn record(
    events: &mut Vec<SimEvent>,
    tile: TileId,
    node: &Node,
    before: NodeView,
    report: TickReport,
    tick: u64,
) {
    let after = node.view();
    if report.pressed {
        events.push(SimEvent::ButtonPressed { tile, tick });
    }
    if let Some(cause) = report.reset {
        events.push(SimEvent::ResetFlooded { tile, cause, tick });
    }
    if before.phase != after.phase {
        events.push(SimEvent::PhaseChanged {
            tile,
            from: before.phase,
            to: after.phase,
            outcome: visible_outcome(&after),
            tick,
        });
    }
    if before.color_index != after.color_index {
        events.push(SimEvent::ColorChanged {
            tile,
            from: before.color_index,
            to: after.color_index,
            tick,
        });
    }
    if !before.has_lost && after.has_lost {
        events.push(SimEvent::Outrolled {
            tile,
            highest: node.highest_seen_outcome(),
            tick,
        });
    }
}
