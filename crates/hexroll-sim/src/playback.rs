//! Playback controls over a recorded timeline.
//!
//! The cursor is a tick, not an event index: seeking to tick `t` shows the
//! mesh as it stood before tick `t` ran.

use serde::{Deserialize, Serialize};

use crate::events::{MeshSnapshot, SimEvent};

/// Playback speed in simulated ticks per real second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackSpeed {
    /// One tick per second
    Slow,
    /// Ten ticks per second
    Normal,
    /// Fifty ticks per second
    Fast,
    /// Two hundred ticks per second
    Maximum,
}

impl PlaybackSpeed {
    /// Ticks advanced per second.
    pub fn ticks_per_second(&self) -> u64 {
        match self {
            PlaybackSpeed::Slow => 1,
            PlaybackSpeed::Normal => 10,
            PlaybackSpeed::Fast => 50,
            PlaybackSpeed::Maximum => 200,
        }
    }

    /// Milliseconds between ticks at this speed.
    pub fn ms_per_tick(&self) -> u64 {
        1000 / self.ticks_per_second()
    }
}

/// Current state of playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    /// At the beginning, not running
    Stopped,
    /// Advancing on its own
    Playing,
    /// Held at the cursor
    Paused,
    /// Reached the last tick
    Finished,
}

/// Playback controller for a timeline.
#[derive(Debug, Clone)]
pub struct Playback {
    events: Vec<SimEvent>,
    total_ticks: u64,
    cursor: u64,
    state: PlaybackState,
    speed: PlaybackSpeed,
    loop_enabled: bool,
}

impl Playback {
    /// Wrap a timeline recorded over `total_ticks` ticks. Events must be in
    /// tick order, as [`Simulation`](crate::Simulation) records them.
    pub fn new(events: Vec<SimEvent>, total_ticks: u64) -> Self {
        let last = events.last().map_or(0, |e| e.tick() + 1);
        Self {
            events,
            total_ticks: total_ticks.max(last),
            cursor: 0,
            state: PlaybackState::Stopped,
            speed: PlaybackSpeed::Normal,
            loop_enabled: false,
        }
    }

    pub fn current_tick(&self) -> u64 {
        self.cursor
    }

    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn speed(&self) -> PlaybackSpeed {
        self.speed
    }

    /// Move the cursor, clamped to the timeline.
    pub fn seek(&mut self, tick: u64) {
        self.cursor = tick.min(self.total_ticks);
        if self.cursor == self.total_ticks && !self.loop_enabled {
            self.state = PlaybackState::Finished;
        } else if self.state == PlaybackState::Finished {
            self.state = PlaybackState::Paused;
        }
    }

    /// Start advancing, rewinding first if at the end.
    pub fn play(&mut self) {
        if self.cursor >= self.total_ticks {
            self.cursor = 0;
        }
        self.state = PlaybackState::Playing;
    }

    pub fn pause(&mut self) {
        self.state = PlaybackState::Paused;
    }

    /// Stop and rewind.
    pub fn stop(&mut self) {
        self.cursor = 0;
        self.state = PlaybackState::Stopped;
    }

    pub fn set_speed(&mut self, speed: PlaybackSpeed) {
        self.speed = speed;
    }

    pub fn set_loop(&mut self, enabled: bool) {
        self.loop_enabled = enabled;
    }

    pub fn is_looping(&self) -> bool {
        self.loop_enabled
    }

    /// Advance one tick and return the events that happened during it.
    pub fn step_forward(&mut self) -> &[SimEvent] {
        if self.cursor >= self.total_ticks {
            return &[];
        }
        let tick = self.cursor;
        self.cursor += 1;
        if self.cursor >= self.total_ticks {
            if self.loop_enabled {
                self.cursor = 0;
            } else {
                self.state = PlaybackState::Finished;
            }
        }
        self.events_at(tick)
    }

    /// Go back one tick and hold there.
    pub fn step_backward(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.state = PlaybackState::Paused;
        }
    }

    /// Events recorded during `tick`.
    pub fn events_at(&self, tick: u64) -> &[SimEvent] {
        let start = self.events.partition_point(|e| e.tick() < tick);
        let end = self.events.partition_point(|e| e.tick() <= tick);
        &self.events[start..end]
    }

    /// Every event before the cursor.
    pub fn events_to_current(&self) -> &[SimEvent] {
        let end = self.events.partition_point(|e| e.tick() < self.cursor);
        &self.events[..end]
    }

    /// The mesh as it stood at the cursor.
    pub fn snapshot(&self) -> MeshSnapshot {
        let mut snapshot = MeshSnapshot::from_events(self.events_to_current());
        snapshot.tick = self.cursor;
        snapshot
    }

    /// Progress through the timeline, 0.0 to 1.0.
    pub fn progress(&self) -> f64 {
        if self.total_ticks == 0 {
            0.0
        } else {
            self.cursor as f64 / self.total_ticks as f64
        }
    }
}

/// Playback status for clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackStatus {
    pub current_tick: u64,
    pub total_ticks: u64,
    pub state: PlaybackState,
    pub speed: PlaybackSpeed,
    pub progress: f64,
    pub loop_enabled: bool,
}

impl From<&Playback> for PlaybackStatus {
    fn from(playback: &Playback) -> Self {
        Self {
            current_tick: playback.cursor,
            total_ticks: playback.total_ticks,
            state: playback.state,
            speed: playback.speed,
            progress: playback.progress(),
            loop_enabled: playback.loop_enabled,
        }
    }
}
