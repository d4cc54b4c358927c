//! Advection: WENO reconstruction and the operators built on it.
//!
//! # Components
//!
//! - [`WenoTables`]: per-order candidate coefficients, smoothness forms and
//!   optimal weights, derived at construction
//! - [`WenoScheme`] / [`AdvectionScheme`]: scheme selection, stretched-grid
//!   coefficients and topologically conditional order reduction
//! - [`flux_divergence`]: tracer advection
//! - [`u_advection`] / [`v_advection`]: momentum advection in flux or
//!   vector-invariant form, plus curvature terms
//!
//! # Example
//!
//! ```
//! use fv_ocean::advection::{Smoothness, WenoTables, WenoVariant};
//!
//! let weno5 = WenoTables::new(3)?;
//! // Smooth data: weights collapse to the optimal ones.
//! let stencil = [1.0, 1.0, 1.0, 1.0, 1.0];
//! let value = weno5.reconstruct(WenoVariant::Plain, Smoothness::Scalar, &stencil, None);
//! assert!((value - 1.0).abs() < 1e-12);
//! # Ok::<(), fv_ocean::ConfigurationError>(())
//! ```

mod momentum;
mod scheme;
mod stretched;
mod tracer;
mod weno;

pub use momentum::{
    MomentumForm, curvature_tendency_u, curvature_tendency_v, kinetic_energy, u_advection, v_advection,
    vertical_vorticity,
};
pub use scheme::{AdvectionScheme, SmoothnessSource, WenoScheme, conditional_order};
pub use stretched::StretchedWenoCoefficients;
pub use tracer::{Velocities, advective_tracer_flux, flux_divergence};
pub use weno::{
    CandidateCoefficients, MAX_STENCIL, MAX_WENO_ORDER, Smoothness, WENO_EPSILON, WenoTables, WenoVariant,
};
