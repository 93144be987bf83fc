//! Tile layouts: where each tile of a mesh sits on the plane.
//!
//! Layouts are only used to decide which tiles touch. Tiles are identified by
//! their position in the layout, never by anything they could observe.

use std::collections::HashSet;

use thiserror::Error;

use crate::{Face, HexCoord};

/// Errors building a layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// Two tiles were placed on the same coordinate.
    #[error("coordinate {0} is occupied twice")]
    Duplicate(HexCoord),
}

/// Total slots through ring n (inclusive): 1 + 3n(n+1).
#[inline]
pub const fn total_slots_through(ring: u64) -> u64 {
    1 + 3 * ring * (ring + 1)
}

/// Coordinate of the `index`-th slot of a spiral around the origin.
///
/// Ring n starts at the east corner (n, 0) and walks its six edges
/// counter-clockwise, n steps each.
pub fn spiral_to_coord(index: u64) -> HexCoord {
    if index == 0 {
        return HexCoord::ORIGIN;
    }

    let mut ring = 1;
    while total_slots_through(ring) <= index {
        ring += 1;
    }
    let offset = index - total_slots_through(ring - 1);
    let edge = (offset / ring) as usize;
    let step = (offset % ring) as i64;
    let n = ring as i64;

    let corners = [
        HexCoord::new(n, 0),
        HexCoord::new(0, n),
        HexCoord::new(-n, n),
        HexCoord::new(-n, 0),
        HexCoord::new(0, -n),
        HexCoord::new(n, -n),
    ];
    let walk = [
        HexCoord::new(-1, 1),
        HexCoord::new(-1, 0),
        HexCoord::new(0, -1),
        HexCoord::new(1, -1),
        HexCoord::new(1, 0),
        HexCoord::new(0, 1),
    ];

    let corner = corners[edge];
    let dir = walk[edge];
    HexCoord::new(corner.q + dir.q * step, corner.r + dir.r * step)
}

/// An ordered set of occupied coordinates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Layout {
    coords: Vec<HexCoord>,
}

impl Layout {
    /// Build a layout from explicit coordinates, rejecting duplicates.
    pub fn from_coords(coords: impl IntoIterator<Item = HexCoord>) -> Result<Self, LayoutError> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for coord in coords {
            if !seen.insert(coord) {
                return Err(LayoutError::Duplicate(coord));
            }
            out.push(coord);
        }
        Ok(Self { coords: out })
    }

    /// `count` tiles in a straight east-west line starting at the origin.
    pub fn line(count: usize) -> Self {
        let coords = (0..count as i64).map(|q| HexCoord::new(q, 0)).collect();
        Self { coords }
    }

    /// `count` tiles packed in a spiral around the origin.
    pub fn spiral(count: usize) -> Self {
        let coords = (0..count as u64).map(spiral_to_coord).collect();
        Self { coords }
    }

    /// Number of tiles.
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Coordinates in tile order.
    pub fn coords(&self) -> &[HexCoord] {
        &self.coords
    }

    /// Tile index at a coordinate.
    pub fn index_of(&self, coord: HexCoord) -> Option<usize> {
        self.coords.iter().position(|c| *c == coord)
    }

    /// For each face of tile `index`, the index of the touching tile.
    pub fn neighbors_of(&self, index: usize) -> [Option<usize>; 6] {
        let Some(&coord) = self.coords.get(index) else {
            return [None; 6];
        };
        Face::ALL.map(|face| self.index_of(coord + face.direction()))
    }

    /// Whether every tile can reach every other through touching tiles.
    pub fn is_connected(&self) -> bool {
        if self.coords.is_empty() {
            return true;
        }
        let mut visited = vec![false; self.coords.len()];
        let mut stack = vec![0];
        visited[0] = true;
        while let Some(i) = stack.pop() {
            for j in self.neighbors_of(i).into_iter().flatten() {
                if !visited[j] {
                    visited[j] = true;
                    stack.push(j);
                }
            }
        }
        visited.into_iter().all(|v| v)
    }

    /// Longest shortest path between two tiles, in hops.
    pub fn diameter(&self) -> usize {
        let n = self.coords.len();
        let mut best = 0;
        for start in 0..n {
            let mut dist = vec![usize::MAX; n];
            let mut queue = std::collections::VecDeque::from([start]);
            dist[start] = 0;
            while let Some(i) = queue.pop_front() {
                for j in self.neighbors_of(i).into_iter().flatten() {
                    if dist[j] == usize::MAX {
                        dist[j] = dist[i] + 1;
                        queue.push_back(j);
                    }
                }
            }
            best = dist
                .into_iter()
                .filter(|d| *d != usize::MAX)
                .fold(best, usize::max);
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn total_slots_formula() {
        assert_eq!(total_slots_through(0), 1);
        assert_eq!(total_slots_through(1), 7);
        assert_eq!(total_slots_through(2), 19);
        assert_eq!(total_slots_through(3), 37);
    }

    #[test]
    fn spiral_starts_at_origin_then_ring_one() {
        assert_eq!(spiral_to_coord(0), HexCoord::ORIGIN);
        for i in 1..=6 {
            assert_eq!(spiral_to_coord(i).ring(), 1, "index {i}");
        }
        for i in 7..=18 {
            assert_eq!(spiral_to_coord(i).ring(), 2, "index {i}");
        }
    }

    #[test]
    fn line_is_connected_with_full_diameter() {
        let layout = Layout::line(5);
        assert!(layout.is_connected());
        assert_eq!(layout.diameter(), 4);
        assert_eq!(layout.neighbors_of(0)[Face::East.index()], Some(1));
        assert_eq!(layout.neighbors_of(1)[Face::West.index()], Some(0));
        assert_eq!(layout.neighbors_of(0)[Face::West.index()], None);
    }

    #[test]
    fn duplicate_coordinates_rejected() {
        let err = Layout::from_coords([HexCoord::ORIGIN, HexCoord::new(1, 0), HexCoord::ORIGIN])
            .unwrap_err();
        assert_eq!(err, LayoutError::Duplicate(HexCoord::ORIGIN));
    }

    #[test]
    fn split_layout_is_not_connected() {
        let layout = Layout::from_coords([HexCoord::ORIGIN, HexCoord::new(3, 0)]).unwrap();
        assert!(!layout.is_connected());
        assert_eq!(layout.diameter(), 0);
    }

    #[test]
    fn seven_tile_flower_has_diameter_two() {
        let layout = Layout::spiral(7);
        assert!(layout.is_connected());
        assert_eq!(layout.diameter(), 2);
        assert_eq!(layout.neighbors_of(0).iter().flatten().count(), 6);
    }

    proptest! {
        #[test]
        fn spiral_layouts_are_unique_and_connected(count in 1usize..80) {
            let layout = Layout::spiral(count);
            prop_assert!(Layout::from_coords(layout.coords().iter().copied()).is_ok());
            prop_assert!(layout.is_connected());
        }
    }
}
