//! Horizontal side types with named fields.
//!
//! Directional quantities (active-cell subsets, boundary slabs, halo
//! neighbours) are keyed by the four horizontal sides of a region. The
//! fixed iteration order is west, east, south, north; it is also the
//! tie-break order when a cell sits next to two communicating edges.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Axis;

/// One of the four horizontal sides of a region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    /// `i = 1` edge.
    West,
    /// `i = Nx` edge.
    East,
    /// `j = 1` edge.
    South,
    /// `j = Ny` edge.
    North,
}

impl Side {
    /// All sides in tie-break order.
    pub const ALL: [Self; 4] = [Self::West, Self::East, Self::South, Self::North];

    /// Axis normal to this side.
    #[inline]
    pub const fn axis(self) -> Axis {
        match self {
            Self::West | Self::East => Axis::X,
            Self::South | Self::North => Axis::Y,
        }
    }

    /// The side facing this one across an interface.
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Self::West => Self::East,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::North => Self::South,
        }
    }

    /// Whether the side is on the high-index end of its axis.
    #[inline]
    pub const fn is_high(self) -> bool {
        matches!(self, Self::East | Self::North)
    }

    /// Position in [`Side::ALL`].
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Self::West => 0,
            Self::East => 1,
            Self::South => 2,
            Self::North => 3,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::West => "west",
            Self::East => "east",
            Self::South => "south",
            Self::North => "north",
        };
        f.write_str(name)
    }
}

/// Per-side values with named fields.
///
/// # Example
///
/// ```
/// use fv_ocean::types::{HorizontalSides, Side};
///
/// let sides = HorizontalSides::new(1, 2, 3, 4);
/// assert_eq!(sides[Side::South], 3);
/// assert_eq!(sides.map(|x| x * 10).north, 40);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HorizontalSides<T> {
    pub west: T,
    pub east: T,
    pub south: T,
    pub north: T,
}

impl<T> HorizontalSides<T> {
    /// Create new sides in west, east, south, north order.
    pub const fn new(west: T, east: T, south: T, north: T) -> Self {
        Self {
            west,
            east,
            south,
            north,
        }
    }

    /// Same value on all sides.
    pub fn uniform(value: T) -> Self
    where
        T: Clone,
    {
        Self {
            west: value.clone(),
            east: value.clone(),
            south: value.clone(),
            north: value,
        }
    }

    /// Build from a function of the side.
    pub fn from_fn(mut f: impl FnMut(Side) -> T) -> Self {
        Self {
            west: f(Side::West),
            east: f(Side::East),
            south: f(Side::South),
            north: f(Side::North),
        }
    }

    /// Map a function over all sides.
    pub fn map<U, F>(self, mut f: F) -> HorizontalSides<U>
    where
        F: FnMut(T) -> U,
    {
        HorizontalSides {
            west: f(self.west),
            east: f(self.east),
            south: f(self.south),
            north: f(self.north),
        }
    }

    /// Iterate `(side, value)` in tie-break order.
    pub fn iter(&self) -> impl Iterator<Item = (Side, &T)> {
        [
            (Side::West, &self.west),
            (Side::East, &self.east),
            (Side::South, &self.south),
            (Side::North, &self.north),
        ]
        .into_iter()
    }

    /// Convert to array `[west, east, south, north]`.
    pub fn to_array(self) -> [T; 4] {
        [self.west, self.east, self.south, self.north]
    }
}

impl<T> std::ops::Index<Side> for HorizontalSides<T> {
    type Output = T;

    fn index(&self, side: Side) -> &T {
        match side {
            Side::West => &self.west,
            Side::East => &self.east,
            Side::South => &self.south,
            Side::North => &self.north,
        }
    }
}

impl<T> std::ops::IndexMut<Side> for HorizontalSides<T> {
    fn index_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::West => &mut self.west,
            Side::East => &mut self.east,
            Side::South => &mut self.south,
            Side::North => &mut self.north,
        }
    }
}

impl<T: fmt::Display> fmt::Display for HorizontalSides<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "W:{} E:{} S:{} N:{}",
            self.west, self.east, self.south, self.north
        )
    }
}
