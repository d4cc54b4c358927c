//! Immersed boundaries: grid-fitted solid geometry on a structured grid.
//!
//! Cells whose center lies inside the solid are masked out. Operators stay
//! well defined next to the solid because every staggered location is
//! classified deterministically from the centers around it.
//!
//! # Components
//!
//! - [`ImmersedBoundary`]: bottom height ([`GridFittedBottom`]) or 3-D mask
//!   ([`GridFittedBoundary`])
//! - [`ImmersedBoundaryGrid`] and the [`ImmersedMetrics`] trait:
//!   `solid_node` (AND rule), `solid_interface` (OR rule), `z_solid_node`
//! - [`ActiveCellIndex`]: compacted list of fluid cells, optionally split by
//!   partition edge
//! - Implicit vertical diffusion with solid-aware tridiagonal coefficients
//!
//! # Example
//!
//! ```
//! use fv_ocean::grid::RectilinearGrid;
//! use fv_ocean::immersed::{ActiveCellIndex, GridFittedBottom, ImmersedBoundaryGrid, ImmersedMetrics};
//! use fv_ocean::types::{Loc3, Topology};
//!
//! let grid = RectilinearGrid::uniform(
//!     [10, 10, 5],
//!     [3, 3, 3],
//!     [10.0, 10.0, 5.0],
//!     [Topology::Periodic, Topology::Periodic, Topology::Bounded],
//! )?;
//! // A seamount filling the column at the domain center.
//! let bottom = GridFittedBottom::from_function(&grid, |x, y| {
//!     if (x - 5.5).abs() < 0.5 && (y - 5.5).abs() < 0.5 { 0.0 } else { -5.0 }
//! });
//! let ibg = ImmersedBoundaryGrid::new(grid, bottom);
//! assert!(ibg.solid_node(Loc3::CCC, 6, 6, 1));
//!
//! let index = ActiveCellIndex::build(&ibg)?;
//! assert_eq!(index.len(), 10 * 10 * 5 - 5);
//! # Ok::<(), fv_ocean::ConfigurationError>(())
//! ```

mod active_cells;
mod boundary;
mod grid;
mod vertical_diffusion;

pub use active_cells::{ActiveCellIndex, IndexWidth, PackedIndices, build_active_cell_index};
pub use boundary::{GridFittedBoundary, GridFittedBottom, ImmersedBoundary, SolidFunction};
pub use grid::{ImmersedBoundaryGrid, ImmersedMetrics, SolidRule, reduce_solid};
pub use vertical_diffusion::{
    implicit_vertical_step, ivd_diagonal, ivd_lower_diagonal, ivd_upper_diagonal, solve_tridiagonal,
};
