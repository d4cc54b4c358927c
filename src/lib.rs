//! # fv-ocean
//!
//! Finite-volume building blocks for a hydrostatic ocean model on
//! structured grids.
//!
//! - Staggered rectilinear grids with periodic, bounded, connected and flat
//!   axes, in Cartesian or latitude-longitude coordinates
//! - Grid-fitted immersed boundaries and compacted active-cell indices
//! - Upwind-biased WENO reconstruction with order reduction next to solids
//!   and on stretched grids
//! - Tracer and momentum advection, diffusion closures, tendency kernels
//! - Rank decomposition with overlapped halo exchange and boundary-slab
//!   recompute
//! - Cubed-sphere multi-region connectivity and halo fill
//!
//! # Example
//!
//! ```
//! use fv_ocean::advection::{AdvectionScheme, WenoScheme, WenoVariant};
//! use fv_ocean::grid::RectilinearGrid;
//! use fv_ocean::immersed::{GridFittedBottom, ImmersedBoundaryGrid};
//! use fv_ocean::model::{Dynamics, Model};
//! use fv_ocean::types::Topology;
//!
//! let grid = RectilinearGrid::uniform(
//!     [16, 16, 4],
//!     [3, 3, 3],
//!     [16.0, 16.0, 4.0],
//!     [Topology::Periodic, Topology::Periodic, Topology::Bounded],
//! )?;
//! let bottom = GridFittedBottom::from_function(&grid, |x, _| if x < 4.0 { -1.0 } else { -4.0 });
//! let grid = ImmersedBoundaryGrid::new(grid, bottom);
//! let scheme = AdvectionScheme::from(WenoScheme::new(3, WenoVariant::Z)?);
//! let mut model = Model::new(grid, Dynamics::new(scheme), &["T"])?.with_active_cells([false, false])?;
//! model.state_mut().tracers[0].fill(1.0);
//! model.update_tendencies();
//! assert!(model.tendencies().tracers[0].data().iter().all(|g| g.abs() < 1e-12));
//! # Ok::<(), fv_ocean::ConfigurationError>(())
//! ```

pub mod advection;
pub mod closure;
pub mod config;
pub mod distributed;
pub mod error;
pub mod field;
pub mod grid;
pub mod immersed;
pub mod model;
pub mod multi_region;
pub mod types;

pub use error::{CommunicationError, ConfigurationError, Error, Result};
