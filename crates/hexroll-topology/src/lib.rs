//! Hexroll Tile Topology
//!
//! Geometry for a mesh of hexagonal tiles that talk only to the tiles they
//! physically touch.
//!
//! # Faces
//!
//! Every tile has exactly six faces. Face `i` points in planar direction `i`
//! and meets face `(i + 3) % 6` of the tile on the other side. A face is the
//! unit of communication: one byte in, one byte out, per tick.
//!
//! # Layouts
//!
//! A [`Layout`] is a set of occupied coordinates. Two tiles touch when their
//! coordinates are one hex step apart; nothing else about the layout is known
//! to the tiles themselves.

mod face;
mod hex;
mod layout;

pub use face::{Face, facing};
pub use hex::HexCoord;
pub use layout::{Layout, LayoutError, spiral_to_coord, total_slots_through};

/// Number of faces on a tile (invariant: always 6).
pub const FACE_COUNT: usize = 6;

const _: () = assert!(HexCoord::PLANAR_DIRECTIONS.len() == FACE_COUNT);
