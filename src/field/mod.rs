//! Fields: dense halo-padded arrays at a fixed staggering.
//!
//! The model owns its fields; the distributed layer only borrows halo
//! slabs for the duration of an exchange.
//!
//! # Example
//!
//! ```
//! use fv_ocean::field::Field;
//! use fv_ocean::grid::RectilinearGrid;
//! use fv_ocean::types::{Loc3, Topology};
//!
//! let grid = RectilinearGrid::uniform(
//!     [8, 1, 1],
//!     [3, 0, 0],
//!     [8.0, 1.0, 1.0],
//!     [Topology::Periodic, Topology::Flat, Topology::Flat],
//! )?;
//! let mut c = Field::new(&grid, Loc3::CCC);
//! c.set_fn(&grid, |x, _, _| x);
//! c.fill_halo_regions();
//! assert_eq!(c.get(0, 1, 1), c.get(8, 1, 1));
//! # Ok::<(), fv_ocean::ConfigurationError>(())
//! ```

mod data;
mod halo;
mod index_box;

pub use data::Field;
pub use index_box::IndexBox;
