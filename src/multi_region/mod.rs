//! Multi-region grids: an arena of regions joined along their edges.
//!
//! Regions live in one `Vec` and refer to each other by [`RegionId`]
//! only. The cubed sphere is the supported layout: six panels, each split
//! into `R × R` square regions, with adjacency and orientation derived from
//! the cube's geometry.
//!
//! - [`CubedSphereConnectivity`]: the arena and its [`RegionConnection`]s
//! - [`MultiRegionField`]: one [`Field`](crate::field::Field) per region at
//!   any staggered location
//! - [`launch_region_halo_exchange`] / [`complete_region_halo_exchange`]:
//!   edge halo exchange driven by a
//!   [`HaloExchangeRequest`](crate::distributed::HaloExchangeRequest)
//! - [`fill_halo_regions`] / [`fill_vector_halo_regions`]: launch and
//!   complete in one call, rotating vector components into the receiving
//!   frame
//!
//! [`RegionId`]: crate::types::RegionId

mod connectivity;
mod exchange;
mod fill;

pub use connectivity::{CubedSphereConnectivity, PANELS, PanelFrame, Region, RegionConnection, Vec3};
pub use exchange::{complete_region_halo_exchange, launch_region_halo_exchange};
pub use fill::{MultiRegionField, fill_halo_regions, fill_vector_halo_regions, rotate_across};
