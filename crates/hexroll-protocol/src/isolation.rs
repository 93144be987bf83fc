//! Noticing that a tile has been pulled out of the mesh.
//!
//! Silence on every face for `min_confirm` consecutive ticks after having
//! had neighbors means the tile was removed. A single quiet tick is just a
//! dropout and is tolerated.

/// Solo-mode tracking for one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IsolationDetector {
    is_solo: bool,
    solo_confirm_count: u32,
}

impl Default for IsolationDetector {
    fn default() -> Self {
        Self {
            is_solo: true,
            solo_confirm_count: 0,
        }
    }
}

impl IsolationDetector {
    /// Feed this tick's number of fresh faces. Returns true exactly when a
    /// connected node has now been silent long enough to reset.
    pub fn observe(&mut self, fresh_faces: usize, min_confirm: u32) -> bool {
        if fresh_faces > 0 {
            self.is_solo = false;
            self.solo_confirm_count = 0;
            return false;
        }
        self.solo_confirm_count = self.solo_confirm_count.saturating_add(1);
        if !self.is_solo && self.solo_confirm_count >= min_confirm {
            self.is_solo = true;
            return true;
        }
        false
    }

    pub fn is_solo(&self) -> bool {
        self.is_solo
    }

    pub fn silent_ticks(&self) -> u32 {
        self.solo_confirm_count
    }

    /// Solo and silent for the full debounce.
    pub fn solo_confirmed(&self, min_confirm: u32) -> bool {
        self.is_solo && self.solo_confirm_count >= min_confirm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_node_is_solo_but_never_resets() {
        let mut detector = IsolationDetector::default();
        for _ in 0..10 {
            assert!(!detector.observe(0, 3));
        }
        assert!(detector.solo_confirmed(3));
    }

    #[test]
    fn short_dropout_is_tolerated() {
        let mut detector = IsolationDetector::default();
        detector.observe(2, 3);
        assert!(!detector.observe(0, 3));
        assert!(!detector.observe(0, 3));
        detector.observe(1, 3);
        assert!(!detector.is_solo());
        assert_eq!(detector.silent_ticks(), 0);
    }

    #[test]
    fn sustained_silence_resets_once() {
        let mut detector = IsolationDetector::default();
        detector.observe(1, 3);
        assert!(!detector.observe(0, 3));
        assert!(!detector.observe(0, 3));
        assert!(detector.observe(0, 3));
        assert!(!detector.observe(0, 3));
        assert!(detector.is_solo());
    }
}
