//! Distributed execution: rank partitions, halo exchange and boundary
//! recompute.
//!
//! Ranks run as threads of one process and talk through a
//! [`Communicator`]. Each step on a rank is:
//!
//! 1. [`launch_halo_exchange`] for every prognostic field
//! 2. interior tendencies on cells that cannot read halo data
//! 3. [`complete_halo_communication`], the only blocking point
//! 4. [`recompute_boundary_tendencies`] on slabs along communicating edges
//!
//! [`update_tendencies`] strings these together.
//!
//! # Example
//!
//! ```
//! use std::thread;
//! use fv_ocean::advection::AdvectionScheme;
//! use fv_ocean::distributed::{Architecture, BoundarySlabs, StateExchange, update_tendencies};
//! use fv_ocean::grid::RectilinearGrid;
//! use fv_ocean::model::{Dynamics, Model};
//! use fv_ocean::types::Topology;
//!
//! let global = RectilinearGrid::uniform(
//!     [8, 4, 1],
//!     [1, 1, 1],
//!     [8.0, 4.0, 1.0],
//!     [Topology::Periodic, Topology::Bounded, Topology::Bounded],
//! )?;
//! let handles: Vec<_> = Architecture::world([2, 1])?
//!     .into_iter()
//!     .map(|arch| {
//!         let global = global.clone();
//!         thread::spawn(move || -> fv_ocean::Result<f64> {
//!             let local = arch.partition().local_grid(&global)?;
//!             let slabs = BoundarySlabs::plan(&local, arch.communicating());
//!             let mut model = Model::new(local, Dynamics::new(AdvectionScheme::UpwindFirstOrder), &["c"])?;
//!             model.state_mut().u.fill(1.0);
//!             let mut exchange = StateExchange::new(model.state());
//!             update_tendencies(&arch, &mut model, &mut exchange, &slabs)?;
//!             Ok(model.tendencies().tracers[0].get(1, 1, 1))
//!         })
//!     })
//!     .collect();
//! for handle in handles {
//!     let value = handle.join().expect("rank panicked")?;
//!     assert_eq!(value, 0.0);
//! }
//! # Ok::<(), fv_ocean::Error>(())
//! ```

mod architecture;
mod communicator;
mod exchange;
mod partition;
mod recompute;

pub use architecture::{Architecture, DEFAULT_HALO_TIMEOUT};
pub use communicator::{Communicator, Message};
pub use exchange::{
    ExchangeState, HaloExchangeRequest, StateExchange, complete_halo_communication, halo_region,
    launch_halo_exchange, send_region,
};
pub use partition::Partition;
pub use recompute::{BoundarySlabs, recompute_boundary_tendencies, update_tendencies};
