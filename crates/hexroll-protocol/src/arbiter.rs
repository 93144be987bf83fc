//! Setup-phase color arbitration.
//!
//! There is no handshake. Both tiles of a colliding pair see the collision
//! and each independently flips a biased coin to move on to the next color.
//! Once the claims differ the collision stops firing and nothing more
//! happens. Expected convergence is geometric in the number of tries.
//!
//! Liveness caveat: if both sides keep retreating on the same tick they can
//! keep landing on the same color. The probability of that shrinks
//! geometrically but is never exactly zero; there is no deterministic
//! tie-breaker behind it.

use hexroll_topology::FACE_COUNT;

use crate::channel::Observation;
use crate::palette::next_index;
use crate::wire::SlotEvent;

/// Color claims currently visible on each face.
pub fn neighbor_claims(observations: &[Observation; FACE_COUNT]) -> impl Iterator<Item = u8> + '_ {
    observations.iter().filter_map(|obs| match obs.event {
        SlotEvent::ColorClaim(index) => Some(index),
        _ => None,
    })
}

/// Resolve collisions against the neighbors' claims.
///
/// Faces are checked in order against the *current* color, so a retreat on
/// one face is what the next face is compared with. `draw` yields uniform
/// values in `0..100`; a draw below `retreat_percent` moves to the next
/// palette entry. Given the draws, the result is deterministic.
pub fn arbitrate(
    color: u8,
    claims: impl IntoIterator<Item = u8>,
    palette_size: u8,
    retreat_percent: u8,
    mut draw: impl FnMut() -> u32,
) -> u8 {
    let mut color = color;
    for claim in claims {
        if claim == color && draw() < u32::from(retreat_percent) {
            color = next_index(color, palette_size);
        }
    }
    color
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn always(value: u32) -> impl FnMut() -> u32 {
        move || value
    }

    #[test]
    fn no_collision_draws_nothing() {
        let mut draws = 0;
        let color = arbitrate(1, [2, 3], 6, 10, || {
            draws += 1;
            0
        });
        assert_eq!(color, 1);
        assert_eq!(draws, 0);
    }

    #[test]
    fn low_draw_retreats() {
        assert_eq!(arbitrate(1, [1], 6, 10, always(9)), 2);
        assert_eq!(arbitrate(1, [1], 6, 10, always(10)), 1);
    }

    #[test]
    fn retreat_wraps_at_palette_end() {
        assert_eq!(arbitrate(6, [6], 6, 10, always(0)), 1);
    }

    #[test]
    fn later_faces_see_the_new_color() {
        // First face collides and moves us to 2; second face already shows 2.
        assert_eq!(arbitrate(1, [1, 2], 6, 10, always(0)), 3);
        // Second face still shows the old color: no longer a collision.
        assert_eq!(arbitrate(1, [1, 1], 6, 10, always(0)), 2);
    }

    proptest! {
        #[test]
        fn result_always_in_palette(
            size in 1u8..=49,
            seed in any::<u8>(),
            claims in proptest::collection::vec(1u8..=49, 0..6),
            draw in 0u32..100,
        ) {
            let start = seed % size + 1;
            let color = arbitrate(start, claims, size, 10, always(draw));
            prop_assert!((1..=size).contains(&color));
        }
    }
}
