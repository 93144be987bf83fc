//! The per-node phase machine and its tick.
//!
//! ```text
//!   Setup ──button──▶ Rolling ──all active──▶ Compare
//!     ▲                  │                       │
//!     └──────── reset (flooded, button, isolation)┘
//! ```
//!
//! One call to [`Node::tick`] reads every face, decides, and writes every
//! face. Nothing else mutates a node.

use hexroll_topology::FACE_COUNT;
use tracing::{debug, info, trace};

use crate::arbiter::{arbitrate, neighbor_claims};
use crate::board::{Board, NodeView};
use crate::channel::{NeighborChannel, Observation};
use crate::config::ProtocolConfig;
use crate::consensus::RollingConsensus;
use crate::dice::DiceEngine;
use crate::error::Result;
use crate::isolation::IsolationDetector;
use crate::palette::{wrap_index, PaletteColor};
use crate::reset::{self, ResetCause};
use crate::wire::{Answer, Signal, SlotEvent, MAX_OUTCOME, NOOP};

/// Lifecycle phase. Transitions only move forward, except a reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    /// Picking colors; waiting for a start press.
    #[default]
    Setup,
    /// Die rolled; waiting until every connected tile is rolling too.
    Rolling,
    /// Comparing outcomes; terminal until reset.
    Compare,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Setup => write!(f, "Setup"),
            Phase::Rolling => write!(f, "Rolling"),
            Phase::Compare => write!(f, "Compare"),
        }
    }
}

/// What happened during one tick, for observers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// The node went back to setup this tick.
    pub reset: Option<ResetCause>,
    /// A round closed at this node with this verdict.
    pub verdict: Option<Answer>,
    /// The color moved away from a collision.
    pub retreated: bool,
    /// The button press consumed this tick.
    pub pressed: bool,
}

/// One tile's entire protocol state.
#[derive(Debug, Clone)]
pub struct Node {
    config: ProtocolConfig,
    phase: Phase,
    color_index: u8,
    has_lost: bool,
    highest_seen_outcome: u8,
    dice: DiceEngine,
    isolation: IsolationDetector,
    consensus: RollingConsensus,
    channel: NeighborChannel,
}

impl Node {
    /// A node in setup claiming the first palette color.
    pub fn new(config: ProtocolConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            phase: Phase::Setup,
            color_index: 1,
            has_lost: false,
            highest_seen_outcome: 0,
            dice: DiceEngine::default(),
            isolation: IsolationDetector::default(),
            consensus: RollingConsensus::default(),
            channel: NeighborChannel::default(),
        })
    }

    /// Start from a specific palette index, wrapped into range.
    #[must_use]
    pub fn with_color(mut self, index: u8) -> Self {
        self.color_index = wrap_index(index, self.config.palette_size);
        self
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn color_index(&self) -> u8 {
        self.color_index
    }

    /// The rolled die value, 1..=6.
    pub fn outcome(&self) -> u8 {
        self.dice.outcome()
    }

    pub fn has_lost(&self) -> bool {
        self.has_lost
    }

    /// Highest outcome seen anywhere in the mesh; 0 outside compare.
    pub fn highest_seen_outcome(&self) -> u8 {
        self.highest_seen_outcome
    }

    pub fn is_solo(&self) -> bool {
        self.isolation.is_solo()
    }

    pub fn consensus(&self) -> &RollingConsensus {
        &self.consensus
    }

    pub fn channel(&self) -> &NeighborChannel {
        &self.channel
    }

    pub fn view(&self) -> NodeView {
        NodeView {
            phase: self.phase,
            color_index: self.color_index,
            outcome: self.outcome(),
            has_lost: self.has_lost,
        }
    }

    /// Run one read-decide-write pass.
    pub fn tick<B: Board>(&mut self, board: &mut B) -> TickReport {
        let mut report = TickReport::default();
        self.consensus.advance_timers();

        let observations = self.channel.read(board, self.config.palette_size);
        let fresh = observations.iter().filter(|obs| obs.is_fresh()).count();
        // Consumed every tick; a press that loses to a reset is gone.
        report.pressed = board.button_triggered();

        if self.isolation.observe(fresh, self.config.min_confirm) {
            info!(
                phase = %self.phase,
                silent_ticks = self.isolation.silent_ticks(),
                "all faces silent, resetting"
            );
            self.reset(ResetCause::Isolation);
            report.reset = Some(ResetCause::Isolation);
        } else if reset::received(self.phase, &observations) {
            info!(phase = %self.phase, "reset received, flooding");
            self.reset(ResetCause::Flood);
            reset::flood(&mut self.channel, &self.config);
            report.reset = Some(ResetCause::Flood);
        } else {
            if report.pressed {
                self.on_button(board, &mut report);
            }
            if report.reset.is_none() {
                self.step_phase(board, &observations, &mut report);
            }
        }
        if report.pressed && report.reset.is_some_and(|cause| cause != ResetCause::Button) {
            debug!(cause = ?report.reset, "press dropped by reset");
        }

        let idle = self.idle_value();
        self.channel.write(board, idle);
        self.render(board);
        report
    }

    fn on_button<B: Board>(&mut self, board: &mut B, report: &mut TickReport) {
        match self.phase {
            Phase::Setup => self.start_rolling(board),
            Phase::Rolling => trace!("button ignored while rolling"),
            Phase::Compare => {
                info!("reset pressed");
                self.reset(ResetCause::Button);
                reset::flood(&mut self.channel, &self.config);
                report.reset = Some(ResetCause::Button);
            }
        }
    }

    fn start_rolling<B: Board>(&mut self, board: &mut B) {
        let draw = board.random_int(u32::from(MAX_OUTCOME));
        let outcome = self.dice.roll(draw, self.config.outcome_reveal_pace);
        self.phase = Phase::Rolling;
        info!(outcome, "rolling");
        if !self.consensus.answer_requested() {
            self.consensus.ask(&mut self.channel, &self.config);
        }
    }

    fn step_phase<B: Board>(
        &mut self,
        board: &mut B,
        observations: &[Observation; FACE_COUNT],
        report: &mut TickReport,
    ) {
        match self.phase {
            Phase::Setup => {
                self.run_round(observations, Answer::NotActive, report);
                self.arbitrate_color(board, observations, report);
            }
            Phase::Rolling => {
                self.dice.advance(self.config.outcome_reveal_pace);
                self.run_round(observations, Answer::Active, report);
                if let Some(verdict) = report.verdict {
                    self.consensus.record(verdict, &self.config);
                }
                if self.isolation.solo_confirmed(self.config.min_confirm) {
                    self.consensus.confirm_solo();
                }
                if self.consensus.all_active() {
                    self.enter_compare();
                } else if self.consensus.poll_recheck() {
                    self.consensus.ask(&mut self.channel, &self.config);
                }
            }
            Phase::Compare => self.compare_outcomes(observations),
        }
    }

    fn run_round(
        &mut self,
        observations: &[Observation; FACE_COUNT],
        own: Answer,
        report: &mut TickReport,
    ) {
        self.consensus.on_query(observations, &mut self.channel, &self.config);
        self.consensus.absorb(observations);
        report.verdict = self.consensus.poll_window(own, &mut self.channel, &self.config);
    }

    fn arbitrate_color<B: Board>(
        &mut self,
        board: &mut B,
        observations: &[Observation; FACE_COUNT],
        report: &mut TickReport,
    ) {
        let before = self.color_index;
        self.color_index = arbitrate(
            before,
            neighbor_claims(observations),
            self.config.palette_size,
            self.config.retreat_percent,
            || board.random_int(100),
        );
        if self.color_index != before {
            debug!(from = before, to = self.color_index, "color collision, retreating");
            report.retreated = true;
        }
    }

    fn enter_compare(&mut self) {
        self.phase = Phase::Compare;
        self.highest_seen_outcome = self.dice.outcome();
        self.has_lost = false;
        self.consensus.clear();
        self.channel.clear_staged();
        info!(outcome = self.dice.outcome(), "everyone active, comparing");
    }

    fn compare_outcomes(&mut self, observations: &[Observation; FACE_COUNT]) {
        for obs in observations {
            if let SlotEvent::Outcome(value) = obs.event {
                if value > self.highest_seen_outcome {
                    self.highest_seen_outcome = value;
                }
                if value > self.dice.outcome() && !self.has_lost {
                    debug!(mine = self.dice.outcome(), theirs = value, "outrolled");
                    self.has_lost = true;
                }
            }
        }
    }

    fn reset(&mut self, cause: ResetCause) {
        debug!(?cause, from = %self.phase, "back to setup");
        self.phase = Phase::Setup;
        self.has_lost = false;
        self.highest_seen_outcome = 0;
        self.dice.clear();
        self.consensus.clear();
        self.channel.clear_staged();
    }

    /// What every face carries when nothing is staged on it.
    fn idle_value(&self) -> u8 {
        match self.phase {
            Phase::Setup => self
                .consensus
                .idle_value(Answer::NotActive)
                .unwrap_or_else(|| Signal::ColorClaim(self.color_index).encode()),
            Phase::Rolling => self.consensus.idle_value(Answer::Active).unwrap_or(NOOP),
            Phase::Compare => Signal::Outcome(self.highest_seen_outcome).encode(),
        }
    }

    fn render<B: Board>(&self, board: &mut B) {
        let color = PaletteColor::for_index(self.color_index, self.config.palette_size);
        board.set_indicator_color(color);
        match self.phase {
            Phase::Setup => {}
            Phase::Rolling => board.render_outcome(self.dice.shown(), color),
            Phase::Compare if self.has_lost => {
                board.render_outcome(self.dice.outcome(), color.dimmed())
            }
            Phase::Compare => board.render_outcome(self.dice.outcome(), color),
        }
    }
}
