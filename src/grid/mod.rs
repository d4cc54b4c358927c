//! Structured grids and the read-only metric provider.
//!
//! # Index convention
//!
//! Interior cells along an axis with `N` cells are `1..=N`. Halo cells
//! `1-H..=0` and `N+1..=N+H` exist for every non-flat axis but hold valid
//! data only after a halo fill or exchange.
//!
//! # Components
//!
//! - [`AxisCoordinates`]: face and center positions along one axis
//! - [`RectilinearGrid`]: three axes plus a horizontal [`Geometry`]
//! - [`GridMetrics`]: the metric oracle consumed by the immersed boundary,
//!   the advection operators and the boundary recompute
//!
//! # Example
//!
//! ```
//! use fv_ocean::grid::{GridMetrics, RectilinearGrid};
//! use fv_ocean::types::{Axis, Loc3, Topology};
//!
//! let grid = RectilinearGrid::uniform(
//!     [16, 8, 4],
//!     [3, 3, 3],
//!     [16.0, 8.0, 4.0],
//!     [Topology::Periodic, Topology::Bounded, Topology::Bounded],
//! )?;
//! let a = grid.area(Axis::X, 1, 1, 1, Loc3::FCC);
//! assert!((a - 1.0).abs() < 1e-12);
//! # Ok::<(), fv_ocean::ConfigurationError>(())
//! ```

mod coordinates;
mod metrics;
mod rectilinear;

pub use coordinates::{AxisCoordinates, Spacing};
pub use metrics::{Geometry, GridMetrics};
pub use rectilinear::{MAX_SUPPORTED_EXTENT, RectilinearGrid};
