//! Immersed boundary geometry.
//!
//! Two flavours of geometry are supported, both fitted to the grid (a cell
//! is either entirely solid or entirely fluid):
//!
//! - [`GridFittedBottom`]: a bottom height per water column. A cell is
//!   solid when its center lies below the bottom.
//! - [`GridFittedBoundary`]: an arbitrary three-dimensional solid mask.
//!
//! Both are stored halo-padded and halo-filled according to the grid's
//! horizontal topology at construction, so classification queries inside
//! the halo (needed by wide stencils next to region edges) are well defined.

use std::sync::Arc;

use crate::error::ConfigurationError;
use crate::field::Field;
use crate::grid::GridMetrics;
use crate::types::{Axis, Loc3, Location, Topology};

/// Bottom height per `(i, j)` column.
#[derive(Clone, Debug)]
pub struct GridFittedBottom {
    /// Heights on a horizontal `(Nx, Ny, 1)` field with a flat vertical axis.
    bottom: Field,
}

impl GridFittedBottom {
    fn bottom_field(grid: &impl GridMetrics) -> Field {
        let [nx, ny, _] = grid.size();
        let [hx, hy, _] = grid.halo();
        let [tx, ty, _] = grid.topology();
        Field::with_shape([nx, ny, 1], [hx, hy, 0], [tx, ty, Topology::Flat], Loc3::CCC)
    }

    /// Evaluate a bathymetry function `h(x, y)` at every column center.
    ///
    /// Halo columns on connected axes are evaluated at their true positions;
    /// periodic and bounded halos are filled from the interior.
    pub fn from_function(grid: &impl GridMetrics, height: impl Fn(f64, f64) -> f64) -> Self {
        let mut bottom = Self::bottom_field(grid);
        let region = bottom.storage();
        for (i, j, _) in region.iter().filter(|&(_, _, k)| k == 1) {
            let x = grid.node(Axis::X, Location::Center, i);
            let y = grid.node(Axis::Y, Location::Center, j);
            bottom.set(i, j, 1, height(x, y));
        }
        bottom.fill_halo_regions();
        Self { bottom }
    }

    /// Use precomputed interior heights, `Nx * Ny` values with `i` fastest.
    pub fn from_array(grid: &impl GridMetrics, heights: &[f64]) -> Result<Self, ConfigurationError> {
        let [nx, ny, _] = grid.size();
        if heights.len() != nx * ny {
            return Err(ConfigurationError::BottomShapeMismatch {
                expected: nx * ny,
                actual: heights.len(),
            });
        }
        let mut bottom = Self::bottom_field(grid);
        for j in 1..=ny as isize {
            for i in 1..=nx as isize {
                let idx = (i - 1) as usize + nx * (j - 1) as usize;
                bottom.set(i, j, 1, heights[idx]);
            }
        }
        bottom.fill_halo_regions();
        Ok(Self { bottom })
    }

    /// Bottom height of column `(i, j)`.
    #[inline]
    pub fn height(&self, i: isize, j: isize) -> f64 {
        self.bottom.get(i, j, 1)
    }

    fn restrict(&self, local: &impl GridMetrics, offset: [isize; 2]) -> Self {
        let mut bottom = Self::bottom_field(local);
        let clamp = clamp_into(&self.bottom);
        for (i, j, _) in bottom.storage().iter().filter(|&(_, _, k)| k == 1) {
            let (gi, gj, _) = clamp(i + offset[0], j + offset[1], 1);
            bottom.set(i, j, 1, self.bottom.get(gi, gj, 1));
        }
        Self { bottom }
    }
}

/// Solid predicate over physical coordinates.
pub type SolidFunction = Arc<dyn Fn(f64, f64, f64) -> bool + Send + Sync>;

/// Arbitrary solid mask, stored as `1.0` (solid) / `0.0` (fluid).
#[derive(Clone, Debug)]
pub struct GridFittedBoundary {
    mask: Field,
}

impl GridFittedBoundary {
    /// Evaluate a solid predicate at every cell center.
    pub fn from_function(grid: &impl GridMetrics, solid: SolidFunction) -> Self {
        let mut mask = Field::new(grid, Loc3::CCC);
        for (i, j, k) in mask.storage().iter() {
            let x = grid.node(Axis::X, Location::Center, i);
            let y = grid.node(Axis::Y, Location::Center, j);
            let z = grid.node(Axis::Z, Location::Center, k);
            mask.set(i, j, k, if solid(x, y, z) { 1.0 } else { 0.0 });
        }
        mask.fill_halo_regions();
        Self { mask }
    }

    /// Use a precomputed interior mask, `Nx * Ny * Nz` values with `i` fastest.
    pub fn from_array(grid: &impl GridMetrics, solid: &[bool]) -> Result<Self, ConfigurationError> {
        let [nx, ny, nz] = grid.size();
        if solid.len() != nx * ny * nz {
            return Err(ConfigurationError::MaskShapeMismatch {
                expected: nx * ny * nz,
                actual: solid.len(),
            });
        }
        let mut mask = Field::new(grid, Loc3::CCC);
        for (n, (i, j, k)) in mask.interior().iter().enumerate() {
            mask.set(i, j, k, if solid[n] { 1.0 } else { 0.0 });
        }
        mask.fill_halo_regions();
        Ok(Self { mask })
    }

    #[inline]
    pub fn is_solid(&self, i: isize, j: isize, k: isize) -> bool {
        self.mask.get(i, j, k) > 0.5
    }

    fn restrict(&self, local: &impl GridMetrics, offset: [isize; 2]) -> Self {
        let mut mask = Field::new(local, Loc3::CCC);
        let clamp = clamp_into(&self.mask);
        for (i, j, k) in mask.storage().iter() {
            let (gi, gj, gk) = clamp(i + offset[0], j + offset[1], k);
            mask.set(i, j, k, self.mask.get(gi, gj, gk));
        }
        Self { mask }
    }
}

/// Clamp global indices into the stored range of a field.
fn clamp_into(field: &Field) -> impl Fn(isize, isize, isize) -> (isize, isize, isize) + '_ {
    let r = field.storage();
    move |i, j, k| {
        (
            i.clamp(*r.i.start(), *r.i.end()),
            j.clamp(*r.j.start(), *r.j.end()),
            k.clamp(*r.k.start(), *r.k.end()),
        )
    }
}

/// Grid-fitted immersed geometry.
#[derive(Clone, Debug)]
pub enum ImmersedBoundary {
    GridFittedBottom(GridFittedBottom),
    GridFittedBoundary(GridFittedBoundary),
}

impl ImmersedBoundary {
    /// Whether the cell center `(i, j, k)` is solid, given its vertical
    /// coordinate.
    #[inline]
    pub fn is_solid_at(&self, i: isize, j: isize, k: isize, z_center: f64) -> bool {
        match self {
            Self::GridFittedBottom(b) => z_center < b.height(i, j),
            Self::GridFittedBoundary(m) => m.is_solid(i, j, k),
        }
    }

    /// The piece of this boundary seen by a local grid whose interior cell
    /// `(1, 1)` is global cell `(offset[0] + 1, offset[1] + 1)`.
    ///
    /// Halo entries are sampled from the global boundary, so partitioned
    /// grids classify their neighbours' cells exactly as the serial grid
    /// would.
    pub fn restrict(&self, local: &impl GridMetrics, offset: [usize; 2]) -> Self {
        let offset = [offset[0] as isize, offset[1] as isize];
        match self {
            Self::GridFittedBottom(b) => Self::GridFittedBottom(b.restrict(local, offset)),
            Self::GridFittedBoundary(m) => Self::GridFittedBoundary(m.restrict(local, offset)),
        }
    }
}

impl From<GridFittedBottom> for ImmersedBoundary {
    fn from(b: GridFittedBottom) -> Self {
        Self::GridFittedBottom(b)
    }
}

impl From<GridFittedBoundary> for ImmersedBoundary {
    fn from(b: GridFittedBoundary) -> Self {
        Self::GridFittedBoundary(b)
    }
}
