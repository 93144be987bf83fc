//! Simulated tile hardware and the links between touching tiles.
//!
//! Each [`SimBoard`] holds what its face receivers last latched and when.
//! The [`Medium`] moves every outbound byte across to the touching tile's
//! opposite face once per tick, dropping some of them when the link is lossy.

use std::collections::VecDeque;

use hexroll_protocol::{Board, PaletteColor, Reading};
use hexroll_topology::{Face, FACE_COUNT};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Last byte latched on one face.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Port {
    value: u8,
    delivered_at: Option<u64>,
}

/// Hardware of one simulated tile.
#[derive(Debug, Clone)]
pub struct SimBoard {
    ports: [Port; FACE_COUNT],
    outbox: [u8; FACE_COUNT],
    now: u64,
    stale_after: u64,
    pressed: bool,
    rng: StdRng,
    queued_draws: VecDeque<u32>,
    indicator: PaletteColor,
    display: Option<(u8, PaletteColor)>,
}

impl SimBoard {
    pub fn new(seed: u64, stale_after: u64) -> Self {
        Self {
            ports: [Port::default(); FACE_COUNT],
            outbox: [0; FACE_COUNT],
            now: 0,
            stale_after,
            pressed: false,
            rng: StdRng::seed_from_u64(seed),
            queued_draws: VecDeque::new(),
            indicator: PaletteColor::OFF,
            display: None,
        }
    }

    /// Advance the local clock to `tick`.
    pub fn set_now(&mut self, tick: u64) {
        self.now = tick;
    }

    /// Latch a press for the next tick.
    pub fn press(&mut self) {
        self.pressed = true;
    }

    /// Serve these values before falling back to the seeded generator.
    pub fn queue_draws(&mut self, draws: impl IntoIterator<Item = u32>) {
        self.queued_draws.extend(draws);
    }

    /// Byte most recently written on `face`.
    pub fn outbound(&self, face: Face) -> u8 {
        self.outbox[face.index()]
    }

    pub fn indicator(&self) -> PaletteColor {
        self.indicator
    }

    /// Die face and color currently on the display, if any.
    pub fn display(&self) -> Option<(u8, PaletteColor)> {
        self.display
    }

    fn latch(&mut self, face: Face, value: u8, tick: u64) {
        self.ports[face.index()] = Port {
            value,
            delivered_at: Some(tick),
        };
    }
}

impl Board for SimBoard {
    fn read_neighbor(&mut self, face: Face) -> Reading {
        let port = self.ports[face.index()];
        match port.delivered_at {
            Some(at) => Reading {
                value: port.value,
                fresh: self.now.saturating_sub(at) <= self.stale_after,
            },
            None => Reading::ABSENT,
        }
    }

    fn write_neighbor(&mut self, face: Face, value: u8) {
        self.outbox[face.index()] = value;
    }

    fn button_triggered(&mut self) -> bool {
        std::mem::take(&mut self.pressed)
    }

    fn random_int(&mut self, bound: u32) -> u32 {
        let bound = bound.max(1);
        match self.queued_draws.pop_front() {
            Some(draw) => draw % bound,
            None => self.rng.gen_range(0..bound),
        }
    }

    fn render_outcome(&mut self, value: u8, color: PaletteColor) {
        self.display = Some((value, color));
    }

    fn set_indicator_color(&mut self, color: PaletteColor) {
        self.indicator = color;
    }
}

/// Point-to-point links between touching faces.
#[derive(Debug, Clone)]
pub struct Medium {
    rng: StdRng,
    loss_rate: f64,
    delivered: u64,
    dropped: u64,
}

impl Medium {
    pub fn new(seed: u64, loss_rate: f64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            loss_rate,
            delivered: 0,
            dropped: 0,
        }
    }

    /// Carry `value` from face `face` of one tile into the opposite face of
    /// `to`. Returns false when the byte was lost.
    pub fn carry(&mut self, value: u8, face: Face, to: &mut SimBoard, tick: u64) -> bool {
        if self.loss_rate > 0.0 && self.rng.gen_bool(self.loss_rate) {
            self.dropped += 1;
            return false;
        }
        to.latch(face.opposite(), value, tick);
        self.delivered += 1;
        true
    }

    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_face_reads_absent() {
        let mut board = SimBoard::new(1, 2);
        assert_eq!(board.read_neighbor(Face::East), Reading::ABSENT);
    }

    #[test]
    fn delivery_lands_on_opposite_face_and_ages_out() {
        let mut medium = Medium::new(1, 0.0);
        let mut board = SimBoard::new(1, 2);
        assert!(medium.carry(61, Face::East, &mut board, 10));

        board.set_now(11);
        assert_eq!(board.read_neighbor(Face::West), Reading::fresh(61));
        board.set_now(12);
        assert!(board.read_neighbor(Face::West).fresh);
        board.set_now(13);
        let reading = board.read_neighbor(Face::West);
        assert_eq!(reading.value, 61);
        assert!(!reading.fresh);
    }

    #[test]
    fn total_loss_drops_everything() {
        let mut medium = Medium::new(1, 1.0);
        let mut board = SimBoard::new(1, 2);
        for tick in 0..20 {
            assert!(!medium.carry(8, Face::Northeast, &mut board, tick));
        }
        assert_eq!(medium.dropped(), 20);
        assert_eq!(board.read_neighbor(Face::Southwest), Reading::ABSENT);
    }

    #[test]
    fn queued_draws_come_first() {
        let mut board = SimBoard::new(1, 2);
        board.queue_draws([5, 13]);
        assert_eq!(board.random_int(6), 5);
        assert_eq!(board.random_int(6), 1);
        assert!(board.random_int(6) < 6);
    }

    #[test]
    fn press_is_reported_once() {
        let mut board = SimBoard::new(1, 2);
        board.press();
        assert!(board.button_triggered());
        assert!(!board.button_triggered());
    }
}
