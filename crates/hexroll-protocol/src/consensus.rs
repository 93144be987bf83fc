//! "Is everyone active?" rounds.
//!
//! A round is a flood of [`QUERY`] followed by an order-independent OR over
//! "somebody here is not active":
//!
//! 1. The asker holds `QUERY` on every face for `send_repeats` ticks.
//! 2. A node seeing a new query for the first time this round relays it on
//!    every face that did not deliver it and opens its answer window.
//! 3. While the window is open the node's idle broadcast is its verdict,
//!    `max(own status, best answer heard)`. `NotActive` outranks `Active`,
//!    so one dissenter anywhere poisons every open window it can reach.
//! 4. When the window closes the verdict is held for `send_repeats` more
//!    ticks and the answer cache goes back to neutral.
//! 5. Nodes in `Rolling` count consecutive clean rounds and believe
//!    "everyone is active" only after `min_confirm` of them, then re-arm a
//!    recheck so late finishers are eventually seen.
//!
//! Windows of rounds started by different askers overlap and simply merge:
//! an answer is folded in regardless of which query produced it.

use hexroll_topology::{Face, FACE_COUNT};
use tracing::{debug, trace};

use crate::channel::{NeighborChannel, Observation};
use crate::config::ProtocolConfig;
use crate::timer::Timer;
use crate::wire::{Answer, SlotEvent, QUERY};

/// Consensus state owned by one node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RollingConsensus {
    answer_requested: bool,
    highest_answer: Option<Answer>,
    all_active: bool,
    all_active_confirm_count: u32,
    answer_timer: Timer,
    recheck_timer: Timer,
}

impl RollingConsensus {
    /// Count down both timers. Called once at the top of every tick.
    pub fn advance_timers(&mut self) {
        self.answer_timer.tick();
        self.recheck_timer.tick();
    }

    /// A round is open at this node.
    pub fn answer_requested(&self) -> bool {
        self.answer_requested
    }

    /// Best answer heard in the current round; `None` is neutral.
    pub fn highest_answer(&self) -> Option<Answer> {
        self.highest_answer
    }

    pub fn all_active(&self) -> bool {
        self.all_active
    }

    pub fn confirm_count(&self) -> u32 {
        self.all_active_confirm_count
    }

    pub fn recheck_armed(&self) -> bool {
        self.recheck_timer.is_armed()
    }

    /// Start a round as the asker: query on every face.
    pub fn ask(&mut self, channel: &mut NeighborChannel, config: &ProtocolConfig) {
        debug!("asking whether everyone is active");
        self.open(channel, config, [false; FACE_COUNT]);
    }

    /// Join a round on the first new query. Returns true if one was joined.
    pub fn on_query(
        &mut self,
        observations: &[Observation; FACE_COUNT],
        channel: &mut NeighborChannel,
        config: &ProtocolConfig,
    ) -> bool {
        let delivered = observations.map(|obs| obs.is_new_query());
        if self.answer_requested || !delivered.contains(&true) {
            return false;
        }
        trace!(?delivered, "joining round");
        self.open(channel, config, delivered);
        true
    }

    fn open(
        &mut self,
        channel: &mut NeighborChannel,
        config: &ProtocolConfig,
        skip: [bool; FACE_COUNT],
    ) {
        self.answer_requested = true;
        self.highest_answer = None;
        self.answer_timer.arm(config.answer_window);
        self.recheck_timer.disarm();
        for face in Face::ALL {
            if !skip[face.index()] {
                channel.stage(face, QUERY, config.send_repeats);
            }
        }
    }

    /// Fold any answers heard this tick into the round.
    pub fn absorb(&mut self, observations: &[Observation; FACE_COUNT]) {
        if !self.answer_requested {
            return;
        }
        for obs in observations {
            if let SlotEvent::Answer(answer) = obs.event {
                if Some(answer) > self.highest_answer {
                    trace!(?answer, "answer escalated");
                    self.highest_answer = Some(answer);
                }
            }
        }
    }

    /// This node's verdict given its own status.
    pub fn verdict(&self, own: Answer) -> Answer {
        self.highest_answer.map_or(own, |heard| heard.max(own))
    }

    /// Idle broadcast while a round is open.
    pub fn idle_value(&self, own: Answer) -> Option<u8> {
        self.answer_requested.then(|| self.verdict(own).code())
    }

    /// Close the round if the window has run out. The final verdict is held
    /// on every face and returned.
    pub fn poll_window(
        &mut self,
        own: Answer,
        channel: &mut NeighborChannel,
        config: &ProtocolConfig,
    ) -> Option<Answer> {
        if !self.answer_requested || !self.answer_timer.take_expired() {
            return None;
        }
        let verdict = self.verdict(own);
        channel.stage_all(verdict.code(), config.send_repeats);
        self.answer_requested = false;
        self.highest_answer = None;
        Some(verdict)
    }

    /// Fold a closed round into the debounced "everyone is active" belief
    /// and schedule the next round.
    pub fn record(&mut self, verdict: Answer, config: &ProtocolConfig) {
        match verdict {
            Answer::Active => self.all_active_confirm_count += 1,
            Answer::NotActive => self.all_active_confirm_count = 0,
        }
        self.all_active = self.all_active_confirm_count >= config.min_confirm;
        debug!(
            ?verdict,
            confirmations = self.all_active_confirm_count,
            all_active = self.all_active,
            "round closed"
        );
        self.recheck_timer.arm(config.recheck_interval);
    }

    /// Whether it is time to ask again.
    pub fn poll_recheck(&mut self) -> bool {
        self.recheck_timer.take_expired()
    }

    /// A lone node has nobody to disagree with.
    pub fn confirm_solo(&mut self) {
        self.all_active = true;
    }

    /// Back to neutral: no round, no confirmations, no timers.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::Observation;
    use crate::wire::SlotEvent;

    fn quiet() -> [Observation; FACE_COUNT] {
        [Observation::STALE; FACE_COUNT]
    }

    fn with(face: Face, event: SlotEvent, changed: bool) -> [Observation; FACE_COUNT] {
        let mut obs = quiet();
        obs[face.index()] = Observation { event, changed };
        obs
    }

    fn run_window(
        consensus: &mut RollingConsensus,
        channel: &mut NeighborChannel,
        config: &ProtocolConfig,
        own: Answer,
    ) -> Answer {
        for _ in 0..config.answer_window {
            consensus.advance_timers();
            if let Some(verdict) = consensus.poll_window(own, channel, config) {
                return verdict;
            }
        }
        panic!("window never closed");
    }

    #[test]
    fn asking_stages_query_everywhere() {
        let config = ProtocolConfig::default();
        let mut channel = NeighborChannel::default();
        let mut consensus = RollingConsensus::default();
        consensus.ask(&mut channel, &config);

        assert!(consensus.answer_requested());
        for face in Face::ALL {
            assert_eq!(channel.slot(face).staged_value(), Some(QUERY));
        }
    }

    #[test]
    fn relay_skips_the_delivering_face() {
        let config = ProtocolConfig::default();
        let mut channel = NeighborChannel::default();
        let mut consensus = RollingConsensus::default();
        let obs = with(Face::West, SlotEvent::Query, true);

        assert!(consensus.on_query(&obs, &mut channel, &config));
        assert_eq!(channel.slot(Face::West).staged_value(), None);
        assert_eq!(channel.slot(Face::East).staged_value(), Some(QUERY));
        // Own verdict goes back toward the asker right away.
        assert_eq!(consensus.idle_value(Answer::NotActive), Some(Answer::NotActive.code()));
    }

    #[test]
    fn held_query_does_not_rejoin() {
        let config = ProtocolConfig::default();
        let mut channel = NeighborChannel::default();
        let mut consensus = RollingConsensus::default();
        let held = with(Face::West, SlotEvent::Query, false);
        assert!(!consensus.on_query(&held, &mut channel, &config));
        assert!(!consensus.answer_requested());
    }

    #[test]
    fn a_single_dissent_poisons_the_round() {
        let config = ProtocolConfig::default();
        let mut channel = NeighborChannel::default();
        let mut consensus = RollingConsensus::default();
        consensus.ask(&mut channel, &config);

        consensus.absorb(&with(Face::East, SlotEvent::Answer(Answer::Active), false));
        consensus.absorb(&with(Face::West, SlotEvent::Answer(Answer::NotActive), false));
        consensus.absorb(&with(Face::East, SlotEvent::Answer(Answer::Active), false));
        assert_eq!(consensus.highest_answer(), Some(Answer::NotActive));

        let verdict = run_window(&mut consensus, &mut channel, &config, Answer::Active);
        assert_eq!(verdict, Answer::NotActive);
        assert_eq!(consensus.highest_answer(), None);
    }

    #[test]
    fn answers_outside_a_round_are_ignored() {
        let mut consensus = RollingConsensus::default();
        consensus.absorb(&with(Face::East, SlotEvent::Answer(Answer::NotActive), false));
        assert_eq!(consensus.highest_answer(), None);
    }

    #[test]
    fn all_active_needs_consecutive_clean_rounds() {
        let config = ProtocolConfig::default().with_min_confirm(3);
        let mut consensus = RollingConsensus::default();

        consensus.record(Answer::Active, &config);
        consensus.record(Answer::Active, &config);
        assert!(!consensus.all_active());
        consensus.record(Answer::NotActive, &config);
        assert_eq!(consensus.confirm_count(), 0);
        for _ in 0..3 {
            consensus.record(Answer::Active, &config);
        }
        assert!(consensus.all_active());
    }

    #[test]
    fn recheck_fires_after_interval() {
        let config = ProtocolConfig::default();
        let mut consensus = RollingConsensus::default();
        consensus.record(Answer::NotActive, &config);
        for _ in 1..config.recheck_interval {
            consensus.advance_timers();
            assert!(!consensus.poll_recheck());
        }
        consensus.advance_timers();
        assert!(consensus.poll_recheck());
        assert!(!consensus.recheck_armed());
    }

    #[test]
    fn closing_a_window_holds_the_final_verdict() {
        let config = ProtocolConfig::default();
        let mut channel = NeighborChannel::default();
        let mut consensus = RollingConsensus::default();
        consensus.on_query(&with(Face::West, SlotEvent::Query, true), &mut channel, &config);

        let verdict = run_window(&mut consensus, &mut channel, &config, Answer::Active);
        assert_eq!(verdict, Answer::Active);
        for face in Face::ALL {
            assert_eq!(channel.slot(face).staged_value(), Some(Answer::Active.code()));
        }
        assert!(!consensus.answer_requested());
    }
}
