//! Solid classification at arbitrary staggering.
//!
//! The base classification is per cell center. Every other staggering is
//! reduced from it one face axis at a time: a face-located node along an
//! axis looks at the two cell centers it separates.
//!
//! - [`SolidRule::Node`] (`solid_node`) needs *both* sides solid.
//! - [`SolidRule::Interface`] (`solid_interface`) needs *either* side solid.
//!
//! Both rules are plain AND / OR folds over the `2^m` centers around a node
//! with `m` face axes, so the result does not depend on the order in which
//! face axes are reduced.

use super::boundary::ImmersedBoundary;
use crate::grid::{Geometry, GridMetrics, RectilinearGrid};
use crate::types::{Axis, Loc3, Location, Topology};

/// How a face-located node combines its two neighbouring centers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolidRule {
    /// Solid only if both sides are solid.
    Node,
    /// Solid if either side is solid.
    Interface,
}

/// Reduce the center classification of `grid` to `loc`, processing face
/// axes in `order`.
///
/// Axes in `order` where `loc` is centered are skipped. Axes missing from
/// `order` are treated as centered.
pub fn reduce_solid<G: ImmersedMetrics + ?Sized>(
    grid: &G,
    rule: SolidRule,
    loc: Loc3,
    i: isize,
    j: isize,
    k: isize,
    order: &[Axis],
) -> bool {
    let Some((&axis, rest)) = order.split_first() else {
        return grid.is_solid(i, j, k);
    };
    if loc.along(axis) == Location::Center {
        return reduce_solid(grid, rule, loc, i, j, k, rest);
    }
    let centered = loc.with(axis, Location::Center);
    let (di, dj, dk) = axis.unit();
    let hi = reduce_solid(grid, rule, centered, i, j, k, rest);
    match rule {
        SolidRule::Node => hi && reduce_solid(grid, rule, centered, i - di, j - dj, k - dk, rest),
        SolidRule::Interface => hi || reduce_solid(grid, rule, centered, i - di, j - dj, k - dk, rest),
    }
}

/// Grid metrics plus a solid classification.
pub trait ImmersedMetrics: GridMetrics {
    /// Whether the cell center `(i, j, k)` is solid.
    fn is_solid(&self, i: isize, j: isize, k: isize) -> bool;

    /// Whether the node at `loc` is entirely inside the solid.
    #[inline]
    fn solid_node(&self, loc: Loc3, i: isize, j: isize, k: isize) -> bool {
        reduce_solid(self, SolidRule::Node, loc, i, j, k, &Axis::ALL)
    }

    /// Whether the node at `loc` touches the solid.
    #[inline]
    fn solid_interface(&self, loc: Loc3, i: isize, j: isize, k: isize) -> bool {
        reduce_solid(self, SolidRule::Interface, loc, i, j, k, &Axis::ALL)
    }

    /// Whether `(i, j, k)` at `loc` lies inside the domain.
    ///
    /// Only walled ends have an outside: below index 1 at a low wall, past
    /// `N` (centers) or `N + 1` (faces) at a high wall.
    #[inline]
    fn inside_domain(&self, loc: Loc3, i: isize, j: isize, k: isize) -> bool {
        let size = self.size();
        let topo = self.topology();
        [i, j, k].into_iter().zip(Axis::ALL).all(|(idx, axis)| {
            let a = axis.index();
            let last = match loc.along(axis) {
                Location::Center => size[a] as isize,
                Location::Face => size[a] as isize + 1,
            };
            (idx >= 1 || !topo[a].has_wall(false)) && (idx <= last || !topo[a].has_wall(true))
        })
    }

    /// Outside the domain or solid.
    #[inline]
    fn inactive_node(&self, loc: Loc3, i: isize, j: isize, k: isize) -> bool {
        !self.inside_domain(loc, i, j, k) || self.solid_node(loc, i, j, k)
    }

    /// Face area, zero where the face touches the solid.
    #[inline]
    fn masked_area(&self, axis: Axis, i: isize, j: isize, k: isize, loc: Loc3) -> f64 {
        if self.solid_interface(loc, i, j, k) {
            0.0
        } else {
            self.area(axis, i, j, k, loc)
        }
    }

    /// Whether the vertical face above `(i, j, k)` touches the solid.
    ///
    /// Implicit vertical diffusion uses this to cut the coupling between a
    /// fluid cell and a solid neighbour. The face uses the interface rule,
    /// not [`solid_node`](Self::solid_node) at `k + 1`: one solid cell on
    /// either side is enough, so a fluid cell resting on a solid one is cut
    /// off from it.
    #[inline]
    fn z_solid_node(&self, lx: Location, ly: Location, i: isize, j: isize, k: isize) -> bool {
        self.solid_interface(Loc3::new(lx, ly, Location::Face), i, j, k + 1)
    }
}

impl ImmersedMetrics for RectilinearGrid {
    #[inline]
    fn is_solid(&self, _i: isize, _j: isize, _k: isize) -> bool {
        false
    }
}

/// A grid with an immersed boundary.
///
/// All metric queries pass through to the wrapped grid unchanged; only the
/// solid classification is added.
#[derive(Clone, Debug)]
pub struct ImmersedBoundaryGrid<G = RectilinearGrid> {
    grid: G,
    boundary: ImmersedBoundary,
}

impl<G: GridMetrics> ImmersedBoundaryGrid<G> {
    pub fn new(grid: G, boundary: impl Into<ImmersedBoundary>) -> Self {
        Self {
            grid,
            boundary: boundary.into(),
        }
    }

    /// The wrapped grid.
    #[inline]
    pub fn underlying(&self) -> &G {
        &self.grid
    }

    #[inline]
    pub fn boundary(&self) -> &ImmersedBoundary {
        &self.boundary
    }

    /// Number of solid interior cells.
    pub fn n_solid(&self) -> usize {
        let [nx, ny, nz] = self.grid.size();
        let mut n = 0;
        for k in 1..=nz as isize {
            for j in 1..=ny as isize {
                for i in 1..=nx as isize {
                    n += self.is_solid(i, j, k) as usize;
                }
            }
        }
        n
    }
}

impl<G: GridMetrics> GridMetrics for ImmersedBoundaryGrid<G> {
    #[inline]
    fn size(&self) -> [usize; 3] {
        self.grid.size()
    }

    #[inline]
    fn halo(&self) -> [usize; 3] {
        self.grid.halo()
    }

    #[inline]
    fn topology(&self) -> [Topology; 3] {
        self.grid.topology()
    }

    #[inline]
    fn geometry(&self) -> Geometry {
        self.grid.geometry()
    }

    #[inline]
    fn node(&self, axis: Axis, loc: Location, idx: isize) -> f64 {
        self.grid.node(axis, loc, idx)
    }

    #[inline]
    fn dx(&self, i: isize, j: isize, k: isize, loc: Loc3) -> f64 {
        self.grid.dx(i, j, k, loc)
    }

    #[inline]
    fn dy(&self, i: isize, j: isize, k: isize, loc: Loc3) -> f64 {
        self.grid.dy(i, j, k, loc)
    }

    #[inline]
    fn dz(&self, i: isize, j: isize, k: isize, loc: Loc3) -> f64 {
        self.grid.dz(i, j, k, loc)
    }
}

impl<G: GridMetrics> ImmersedMetrics for ImmersedBoundaryGrid<G> {
    #[inline]
    fn is_solid(&self, i: isize, j: isize, k: isize) -> bool {
        let z = self.grid.node(Axis::Z, Location::Center, k);
        self.boundary.is_solid_at(i, j, k, z)
    }
}
