//! Strongly-typed domain types for safer APIs.
//!
//! - [`Location`] / [`Loc3`]: staggered positions on the grid
//! - [`Axis`]: x, y or z
//! - [`Topology`]: periodic, bounded, connected or flat axes
//! - [`Side`] / [`HorizontalSides`]: west, east, south, north with a fixed order
//! - [`RegionId`] / [`RankId`]: arena and partition indices
//!
//! # Example
//!
//! ```
//! use fv_ocean::types::{Loc3, Location, Side};
//!
//! let u_location = Loc3::new(Location::Face, Location::Center, Location::Center);
//! assert_eq!(u_location, Loc3::FCC);
//! assert_eq!(Side::West.opposite(), Side::East);
//! ```

mod indices;
mod location;
mod sides;
mod topology;

pub use indices::{RankId, RegionId};
pub use location::{Axis, Loc3, Location};
pub use sides::{HorizontalSides, Side};
pub use topology::Topology;
