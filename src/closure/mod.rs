//! Turbulence closures, seen only through their diffusivity.
//!
//! A closure fills a horizontal eddy diffusivity field at cell centers and
//! reports a constant vertical diffusivity. The diffusion operator in
//! [`diffusive_flux_divergence`] then works the same way for tracers and
//! for velocity components at any staggering.
//!
//! # Halo requirement
//!
//! A tendency at cell `i` reads the diffusivity at `i ± 1`, so the
//! diffusivity has to be valid one cell beyond the tendency range, plus
//! whatever the closure's own stencil reads. [`DiffusivityClosure::required_halo`]
//! reports that closure-specific extra width; boundary recompute extends
//! its diffusivity range by it.
//!
//! # Example
//!
//! ```
//! use fv_ocean::closure::{ConstantDiffusivity, DiffusivityClosure, SmagorinskyLilly};
//!
//! let constant = ConstantDiffusivity::new(1e-2, 1e-5);
//! assert_eq!(constant.required_halo(), 0);
//! assert_eq!(SmagorinskyLilly::default().required_halo(), 1);
//! ```

mod constant;
mod diffusion;
mod smagorinsky;

pub use constant::ConstantDiffusivity;
pub use diffusion::{compute_diffusivities, diffusive_flux_divergence, diffusivity_at};
pub use smagorinsky::SmagorinskyLilly;

use crate::advection::Velocities;
use crate::error::ConfigurationError;
use crate::grid::GridMetrics;
use crate::immersed::ImmersedMetrics;
use crate::types::Axis;

/// Interface every turbulence closure exposes to the update engine.
///
/// Implementations must be thread-safe (`Send + Sync`): diffusivities are
/// evaluated from parallel kernels.
pub trait DiffusivityClosure: Send + Sync {
    /// Name of the closure for logging.
    fn name(&self) -> &'static str;

    /// Extra cells, beyond the one every diffusive flux reads, over which
    /// the diffusivity must be computed before a tendency is valid.
    fn required_halo(&self) -> usize {
        0
    }

    /// Horizontal eddy diffusivity at cell center `(i, j, k)`.
    fn horizontal_diffusivity(
        &self,
        grid: &dyn ImmersedMetrics,
        velocities: Velocities<'_>,
        i: isize,
        j: isize,
        k: isize,
    ) -> f64;

    /// Vertical diffusivity.
    fn vertical_diffusivity(&self) -> f64 {
        0.0
    }

    /// Check that a grid carries enough halo for the diffusive stencil.
    fn check_halo(&self, grid: &dyn GridMetrics) -> Result<(), ConfigurationError> {
        let need = self.required_halo() + 1;
        for axis in [Axis::X, Axis::Y] {
            if grid.is_flat(axis) {
                continue;
            }
            let h = grid.halo()[axis.index()];
            if h < need {
                tracing::warn!(%axis, halo = h, required = need, closure = self.name(), "halo narrower than the closure stencil");
                return Err(ConfigurationError::insufficient_halo(axis, h, need, self.name()));
            }
        }
        Ok(())
    }
}
