//! Board geometry: positions, tile sides, farm half-edges and rotations.
//!
//! The board is an unbounded grid. `y` grows towards the south, so the
//! northern neighbour of `(x, y)` is `(x, y - 1)`.
//!
//! Roads and cities connect through whole tile [`Side`]s. Farms connect
//! through [`FarmEdge`]s: each side is split in two halves because a road
//! running through the middle of a side separates the fields on its left and
//! right.

use serde::{Deserialize, Serialize};

/// A square on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Create a new position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighbouring position across `side`.
    #[must_use]
    pub const fn step(self, side: Side) -> Self {
        let (dx, dy) = side.offset();
        Self::new(self.x + dx, self.y + dy)
    }

    /// The four positions sharing a side with this one, in clockwise order
    /// starting north.
    pub fn adjacent(self) -> impl Iterator<Item = Position> {
        Side::ALL.into_iter().map(move |side| self.step(side))
    }

    /// The eight positions surrounding this one (sides and corners).
    pub fn surrounding(self) -> impl Iterator<Item = Position> {
        const OFFSETS: [(i32, i32); 8] = [
            (-1, -1), (0, -1), (1, -1),
            (-1, 0), (1, 0),
            (-1, 1), (0, 1), (1, 1),
        ];
        OFFSETS
            .into_iter()
            .map(move |(dx, dy)| Position::new(self.x + dx, self.y + dy))
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{},{}]", self.x, self.y)
    }
}

/// One side of a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    North,
    East,
    South,
    West,
}

impl Side {
    /// All sides in clockwise order.
    pub const ALL: [Side; 4] = [Side::North, Side::East, Side::South, Side::West];

    const fn offset(self) -> (i32, i32) {
        match self {
            Side::North => (0, -1),
            Side::East => (1, 0),
            Side::South => (0, 1),
            Side::West => (-1, 0),
        }
    }

    /// The side of the neighbouring tile that touches this one.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Side::North => Side::South,
            Side::East => Side::West,
            Side::South => Side::North,
            Side::West => Side::East,
        }
    }

    /// Rotate clockwise.
    #[must_use]
    pub fn rotate(self, rotation: Rotation) -> Self {
        Self::ALL[(self as usize + rotation.quarter_turns()) % 4]
    }
}

/// Half of a tile side, named side first, then the half.
///
/// `NorthWest` is the western half of the northern side; `EastSouth` the
/// southern half of the eastern side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FarmEdge {
    NorthWest,
    NorthEast,
    EastNorth,
    EastSouth,
    SouthEast,
    SouthWest,
    WestSouth,
    WestNorth,
}

impl FarmEdge {
    /// All half-edges in clockwise order starting at the north-west corner.
    pub const ALL: [FarmEdge; 8] = [
        FarmEdge::NorthWest,
        FarmEdge::NorthEast,
        FarmEdge::EastNorth,
        FarmEdge::EastSouth,
        FarmEdge::SouthEast,
        FarmEdge::SouthWest,
        FarmEdge::WestSouth,
        FarmEdge::WestNorth,
    ];

    /// The tile side this half belongs to.
    #[must_use]
    pub const fn side(self) -> Side {
        match self {
            FarmEdge::NorthWest | FarmEdge::NorthEast => Side::North,
            FarmEdge::EastNorth | FarmEdge::EastSouth => Side::East,
            FarmEdge::SouthEast | FarmEdge::SouthWest => Side::South,
            FarmEdge::WestSouth | FarmEdge::WestNorth => Side::West,
        }
    }

    /// The half-edge of the neighbouring tile that touches this one.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            FarmEdge::NorthWest => FarmEdge::SouthWest,
            FarmEdge::NorthEast => FarmEdge::SouthEast,
            FarmEdge::EastNorth => FarmEdge::WestNorth,
            FarmEdge::EastSouth => FarmEdge::WestSouth,
            FarmEdge::SouthEast => FarmEdge::NorthEast,
            FarmEdge::SouthWest => FarmEdge::NorthWest,
            FarmEdge::WestSouth => FarmEdge::EastSouth,
            FarmEdge::WestNorth => FarmEdge::EastNorth,
        }
    }

    /// Rotate clockwise. A quarter turn moves two half-edges along.
    #[must_use]
    pub fn rotate(self, rotation: Rotation) -> Self {
        Self::ALL[(self as usize + 2 * rotation.quarter_turns()) % 8]
    }
}

/// Clockwise rotation applied to a tile definition when it is placed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    /// Number of clockwise quarter turns.
    #[must_use]
    pub const fn quarter_turns(self) -> usize {
        match self {
            Rotation::R0 => 0,
            Rotation::R90 => 1,
            Rotation::R180 => 2,
            Rotation::R270 => 3,
        }
    }
}
