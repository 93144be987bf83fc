//! Per-face inbox and outbox.
//!
//! The only coupling between nodes is one byte per face per tick. Inbound
//! values are polled and may be stale; outbound values that matter are held
//! for several ticks so a single lost tick does not lose the message.

use hexroll_topology::{Face, FACE_COUNT};

use crate::board::Board;
use crate::wire::{classify, SlotEvent, NO_DEVICE};

/// What the hardware reports for one face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reading {
    pub value: u8,
    /// Refreshed within the hardware's staleness window.
    pub fresh: bool,
}

impl Reading {
    /// An empty face.
    pub const ABSENT: Self = Self {
        value: NO_DEVICE,
        fresh: false,
    };

    pub const fn fresh(value: u8) -> Self {
        Self { value, fresh: true }
    }
}

/// One face's classified input for this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    pub event: SlotEvent,
    /// The value differs from the last fresh value, or the face just came
    /// back from stale.
    pub changed: bool,
}

impl Observation {
    pub const STALE: Self = Self {
        event: SlotEvent::Stale,
        changed: false,
    };

    pub fn is_fresh(&self) -> bool {
        self.event != SlotEvent::Stale
    }

    /// A query that arrived this tick rather than one still being held.
    pub fn is_new_query(&self) -> bool {
        self.changed && self.event == SlotEvent::Query
    }

    pub fn is_new_reset(&self) -> bool {
        self.changed && self.event == SlotEvent::Reset
    }
}

/// State of one neighbor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeighborSlot {
    last_received: u8,
    is_stale: bool,
    outbound_value: u8,
    outbound_repeats_remaining: u32,
}

impl Default for NeighborSlot {
    fn default() -> Self {
        Self {
            last_received: NO_DEVICE,
            is_stale: true,
            outbound_value: NO_DEVICE,
            outbound_repeats_remaining: 0,
        }
    }
}

impl NeighborSlot {
    /// Record a reading; returns whether it counts as a change.
    ///
    /// Stale readings leave `last_received` alone so a value held across a
    /// dropped tick is not seen twice.
    pub fn observe(&mut self, reading: Reading) -> bool {
        if !reading.fresh || reading.value == NO_DEVICE {
            self.is_stale = true;
            return false;
        }
        let changed = self.is_stale || reading.value != self.last_received;
        self.last_received = reading.value;
        self.is_stale = false;
        changed
    }

    pub fn is_stale(&self) -> bool {
        self.is_stale
    }

    /// Hold `value` on this face for the next `repeats` writes, replacing
    /// anything already staged.
    pub fn stage(&mut self, value: u8, repeats: u32) {
        self.outbound_value = value;
        self.outbound_repeats_remaining = repeats;
    }

    pub fn is_staged(&self) -> bool {
        self.outbound_repeats_remaining > 0
    }

    pub fn staged_value(&self) -> Option<u8> {
        self.is_staged().then_some(self.outbound_value)
    }

    pub fn clear_staged(&mut self) {
        self.outbound_repeats_remaining = 0;
    }

    /// Value to write this tick: the staged value while it lasts, otherwise
    /// `idle`.
    pub fn next_outbound(&mut self, idle: u8) -> u8 {
        if self.outbound_repeats_remaining > 0 {
            self.outbound_repeats_remaining -= 1;
        } else {
            self.outbound_value = idle;
        }
        self.outbound_value
    }
}

/// All six faces of a node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NeighborChannel {
    slots: [NeighborSlot; FACE_COUNT],
}

impl NeighborChannel {
    /// Poll every face once.
    pub fn read<B: Board>(&mut self, board: &mut B, palette_size: u8) -> [Observation; FACE_COUNT] {
        let mut out = [Observation::STALE; FACE_COUNT];
        for face in Face::ALL {
            let reading = board.read_neighbor(face);
            let changed = self.slots[face.index()].observe(reading);
            out[face.index()] = Observation {
                event: classify(reading, palette_size),
                changed,
            };
        }
        out
    }

    /// Write every face once.
    pub fn write<B: Board>(&mut self, board: &mut B, idle: u8) {
        for face in Face::ALL {
            let value = self.slots[face.index()].next_outbound(idle);
            board.write_neighbor(face, value);
        }
    }

    pub fn slot(&self, face: Face) -> &NeighborSlot {
        &self.slots[face.index()]
    }

    pub fn stage(&mut self, face: Face, value: u8, repeats: u32) {
        self.slots[face.index()].stage(value, repeats);
    }

    /// Stage `value` on every face.
    pub fn stage_all(&mut self, value: u8, repeats: u32) {
        for slot in &mut self.slots {
            slot.stage(value, repeats);
        }
    }

    pub fn clear_staged(&mut self) {
        for slot in &mut self.slots {
            slot.clear_staged();
        }
    }
}
