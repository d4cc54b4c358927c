//! Staggered grid locations.
//!
//! Every quantity on the grid lives at a combination of cell `Center` or
//! cell `Face` along each of the three axes. Tracers live at
//! `(Center, Center, Center)`, zonal velocity at `(Face, Center, Center)`,
//! vertical velocity at `(Center, Center, Face)`, relative vorticity at
//! `(Face, Face, Center)`.
//!
//! Index convention along an axis with `N` cells: interior centers are
//! `1..=N`; face `i` is the west/south/bottom face of center `i`, so a
//! bounded axis has faces `1..=N+1`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Position along one axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    /// Cell center.
    Center,
    /// Cell face (the face on the negative side of the center with the same index).
    Face,
}

impl Location {
    /// The other staggering.
    #[inline]
    pub const fn flip(self) -> Self {
        match self {
            Self::Center => Self::Face,
            Self::Face => Self::Center,
        }
    }

    #[inline]
    pub const fn is_face(self) -> bool {
        matches!(self, Self::Face)
    }
}

/// A three-dimensional staggering `(x, y, z)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Loc3 {
    pub x: Location,
    pub y: Location,
    pub z: Location,
}

impl Loc3 {
    pub const CCC: Self = Self::new(Location::Center, Location::Center, Location::Center);
    pub const FCC: Self = Self::new(Location::Face, Location::Center, Location::Center);
    pub const CFC: Self = Self::new(Location::Center, Location::Face, Location::Center);
    pub const CCF: Self = Self::new(Location::Center, Location::Center, Location::Face);
    pub const FFC: Self = Self::new(Location::Face, Location::Face, Location::Center);
    pub const FCF: Self = Self::new(Location::Face, Location::Center, Location::Face);
    pub const CFF: Self = Self::new(Location::Center, Location::Face, Location::Face);
    pub const FFF: Self = Self::new(Location::Face, Location::Face, Location::Face);

    /// All eight staggerings.
    pub const ALL: [Self; 8] = [
        Self::CCC,
        Self::FCC,
        Self::CFC,
        Self::CCF,
        Self::FFC,
        Self::FCF,
        Self::CFF,
        Self::FFF,
    ];

    #[inline]
    pub const fn new(x: Location, y: Location, z: Location) -> Self {
        Self { x, y, z }
    }

    /// Location along a given axis.
    #[inline]
    pub const fn along(self, axis: Axis) -> Location {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Replace the location along one axis.
    #[inline]
    pub const fn with(self, axis: Axis, loc: Location) -> Self {
        match axis {
            Axis::X => Self::new(loc, self.y, self.z),
            Axis::Y => Self::new(self.x, loc, self.z),
            Axis::Z => Self::new(self.x, self.y, loc),
        }
    }

    /// Axes at which this location is a face, in x, y, z order.
    pub fn face_axes(self) -> impl Iterator<Item = Axis> {
        Axis::ALL.into_iter().filter(move |&a| self.along(a).is_face())
    }
}

impl fmt::Display for Loc3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = |l: Location| if l.is_face() { 'F' } else { 'C' };
        write!(f, "{}{}{}", c(self.x), c(self.y), c(self.z))
    }
}

/// Grid axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    /// Position in `(x, y, z)` tuples.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    /// Unit offset `(di, dj, dk)` along this axis.
    #[inline]
    pub const fn unit(self) -> (isize, isize, isize) {
        match self {
            Self::X => (1, 0, 0),
            Self::Y => (0, 1, 0),
            Self::Z => (0, 0, 1),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => write!(f, "x"),
            Self::Y => write!(f, "y"),
            Self::Z => write!(f, "z"),
        }
    }
}
