//! Read-only grid metric provider.
//!
//! The update engine never builds coordinates itself; it asks a
//! [`GridMetrics`] implementation for widths, areas and volumes at a given
//! index and staggering. [`RectilinearGrid`](super::RectilinearGrid) is the
//! concrete provider, and
//! [`ImmersedBoundaryGrid`](crate::immersed::ImmersedBoundaryGrid) forwards
//! every call to the grid it wraps.

use serde::{Deserialize, Serialize};

use crate::types::{Axis, Loc3, Location, Topology};

/// Horizontal coordinate system.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
pub enum Geometry {
    /// Flat `x`/`y` coordinates in metres.
    #[default]
    Cartesian,
    /// `x` is longitude and `y` latitude, both in degrees, on a sphere of
    /// the given radius (metres).
    LatitudeLongitude { radius: f64 },
}

impl Geometry {
    /// Whether horizontal metrics vary with position in a way that needs
    /// curvature terms in momentum advection.
    #[inline]
    pub const fn is_curvilinear(self) -> bool {
        matches!(self, Self::LatitudeLongitude { .. })
    }
}

/// Geometric oracle over `(i, j, k, staggering)`.
///
/// Indices follow the 1-based interior convention: `1..=N` are interior
/// cells, `<= 0` and `> N` are halo.
pub trait GridMetrics: Send + Sync {
    /// Interior extents `[Nx, Ny, Nz]`.
    fn size(&self) -> [usize; 3];

    /// Halo widths `[Hx, Hy, Hz]`.
    fn halo(&self) -> [usize; 3];

    /// Per-axis topology.
    fn topology(&self) -> [Topology; 3];

    /// Horizontal coordinate system.
    fn geometry(&self) -> Geometry;

    /// Coordinate of a node along one axis.
    fn node(&self, axis: Axis, loc: Location, idx: isize) -> f64;

    /// Physical width in x of the control volume at a node.
    fn dx(&self, i: isize, j: isize, k: isize, loc: Loc3) -> f64;

    /// Physical width in y.
    fn dy(&self, i: isize, j: isize, k: isize, loc: Loc3) -> f64;

    /// Physical width in z.
    fn dz(&self, i: isize, j: isize, k: isize, loc: Loc3) -> f64;

    /// Width along an arbitrary axis.
    #[inline]
    fn width(&self, axis: Axis, i: isize, j: isize, k: isize, loc: Loc3) -> f64 {
        match axis {
            Axis::X => self.dx(i, j, k, loc),
            Axis::Y => self.dy(i, j, k, loc),
            Axis::Z => self.dz(i, j, k, loc),
        }
    }

    /// Area of the face normal to `axis`.
    #[inline]
    fn area(&self, axis: Axis, i: isize, j: isize, k: isize, loc: Loc3) -> f64 {
        match axis {
            Axis::X => self.dy(i, j, k, loc) * self.dz(i, j, k, loc),
            Axis::Y => self.dx(i, j, k, loc) * self.dz(i, j, k, loc),
            Axis::Z => self.dx(i, j, k, loc) * self.dy(i, j, k, loc),
        }
    }

    /// Control volume at a node.
    #[inline]
    fn volume(&self, i: isize, j: isize, k: isize, loc: Loc3) -> f64 {
        self.dx(i, j, k, loc) * self.dy(i, j, k, loc) * self.dz(i, j, k, loc)
    }

    /// Whether an axis is flat.
    #[inline]
    fn is_flat(&self, axis: Axis) -> bool {
        self.topology()[axis.index()].is_flat()
    }
}
