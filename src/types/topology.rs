//! Per-axis topology tags.

use serde::{Deserialize, Serialize};

/// How an axis behaves at its ends.
///
/// # Example
///
/// ```
/// use fv_ocean::types::Topology;
///
/// assert!(Topology::Periodic.has_halo());
/// assert!(!Topology::Flat.has_halo());
/// assert_eq!(Topology::Bounded.n_faces(10), 11);
/// assert_eq!(Topology::Periodic.n_faces(10), 10);
/// assert!(Topology::RightConnected.has_wall(false));
/// assert!(Topology::RightConnected.is_connected(true));
/// assert_eq!(Topology::LeftConnected.n_faces(10), 11);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topology {
    /// Wraps around: face `N+1` is face `1`.
    Periodic,
    /// Closed by walls at both ends.
    Bounded,
    /// Ends connect to another region or rank; halos are filled by
    /// communication.
    Connected,
    /// Wall at the low end, connected at the high end. The first block of
    /// a bounded axis split over ranks.
    RightConnected,
    /// Connected at the low end, wall at the high end. The last block of a
    /// bounded axis split over ranks.
    LeftConnected,
    /// Degenerate axis with a single cell and no variation.
    Flat,
}

impl Topology {
    /// Whether the axis carries halo cells.
    #[inline]
    pub const fn has_halo(self) -> bool {
        !matches!(self, Self::Flat)
    }

    #[inline]
    pub const fn is_flat(self) -> bool {
        matches!(self, Self::Flat)
    }

    /// Whether the low (`high = false`) or high end is a wall.
    #[inline]
    pub const fn has_wall(self, high: bool) -> bool {
        match self {
            Self::Bounded => true,
            Self::RightConnected => !high,
            Self::LeftConnected => high,
            _ => false,
        }
    }

    /// Whether the low (`high = false`) or high end takes its halo from a
    /// neighbouring region or rank.
    #[inline]
    pub const fn is_connected(self, high: bool) -> bool {
        match self {
            Self::Connected => true,
            Self::RightConnected => high,
            Self::LeftConnected => !high,
            _ => false,
        }
    }

    /// Number of distinct face locations along an axis with `n` cells.
    ///
    /// A wall at the high end adds face `N + 1`; the face at a connected
    /// high end belongs to the neighbour.
    #[inline]
    pub const fn n_faces(self, n: usize) -> usize {
        if self.has_wall(true) { n + 1 } else { n }
    }
}
