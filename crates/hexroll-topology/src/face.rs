//! The six communication faces of a tile.

use crate::{HexCoord, FACE_COUNT};

/// One edge of a hexagonal tile, and the neighbor slot behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Face {
    East = 0,
    Northeast = 1,
    Northwest = 2,
    West = 3,
    Southwest = 4,
    Southeast = 5,
}

impl Face {
    /// All faces in index order.
    pub const ALL: [Face; FACE_COUNT] = [
        Face::East,
        Face::Northeast,
        Face::Northwest,
        Face::West,
        Face::Southwest,
        Face::Southeast,
    ];

    /// Face for a slot index, if in range.
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < FACE_COUNT {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    /// Slot index of this face (0..6).
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The face of the touching tile that meets this one.
    pub const fn opposite(self) -> Self {
        Self::ALL[(self.index() + FACE_COUNT / 2) % FACE_COUNT]
    }

    /// Planar step from this tile to the tile behind this face.
    pub const fn direction(self) -> HexCoord {
        HexCoord::PLANAR_DIRECTIONS[self.index()]
    }
}

impl std::fmt::Display for Face {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Face::East => "E",
            Face::Northeast => "NE",
            Face::Northwest => "NW",
            Face::West => "W",
            Face::Southwest => "SW",
            Face::Southeast => "SE",
        };
        f.write_str(name)
    }
}

/// The face of `from` that touches `to`, if the two tiles are adjacent.
pub fn facing(from: HexCoord, to: HexCoord) -> Option<Face> {
    let diff = to - from;
    Face::ALL.into_iter().find(|face| face.direction() == diff)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_is_an_involution() {
        for face in Face::ALL {
            assert_eq!(face.opposite().opposite(), face);
            assert_ne!(face.opposite(), face);
        }
    }

    #[test]
    fn opposite_directions_cancel() {
        for face in Face::ALL {
            assert_eq!(face.direction() + face.opposite().direction(), HexCoord::ORIGIN);
        }
    }

    #[test]
    fn facing_is_symmetric() {
        let a = HexCoord::new(2, -1);
        for face in Face::ALL {
            let b = a + face.direction();
            assert_eq!(facing(a, b), Some(face));
            assert_eq!(facing(b, a), Some(face.opposite()));
        }
    }

    #[test]
    fn distant_tiles_do_not_face() {
        assert_eq!(facing(HexCoord::ORIGIN, HexCoord::new(2, 0)), None);
        assert_eq!(facing(HexCoord::ORIGIN, HexCoord::ORIGIN), None);
    }

    #[test]
    fn index_round_trip() {
        for (i, face) in Face::ALL.iter().enumerate() {
            assert_eq!(face.index(), i);
            assert_eq!(Face::from_index(i), Some(*face));
        }
        assert_eq!(Face::from_index(FACE_COUNT), None);
    }
}
