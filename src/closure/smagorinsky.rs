//! Smagorinsky-Lilly horizontal eddy diffusivity.
//!
//! ```text
//! κ = (C Δ)² |S| / Pr,   Δ = (Δx Δy)^½
//! |S|² = 2 (∂x u)² + 2 (∂y v)² + (∂y u + ∂x v)²
//! ```
//!
//! Normal strains live at cell centers. The shear lives at cell corners
//! and its square is averaged over the four corners of the cell, so the
//! diffusivity at `i` reads velocities at `i - 1 ..= i + 1`.

use serde::{Deserialize, Serialize};

use super::DiffusivityClosure;
use crate::advection::Velocities;
use crate::immersed::ImmersedMetrics;
use crate::types::{Axis, Loc3};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SmagorinskyLilly {
    /// Smagorinsky coefficient `C`.
    pub coefficient: f64,
    /// Turbulent Prandtl number dividing the viscosity.
    pub prandtl: f64,
    /// Constant vertical diffusivity.
    pub vertical: f64,
}

impl Default for SmagorinskyLilly {
    fn default() -> Self {
        Self {
            coefficient: 0.16,
            prandtl: 1.0,
            vertical: 0.0,
        }
    }
}

impl SmagorinskyLilly {
    /// Squared corner shear `(∂y u + ∂x v)²` at `FFC` `(i, j, k)`.
    fn shear_squared(grid: &dyn ImmersedMetrics, vel: Velocities<'_>, i: isize, j: isize, k: isize) -> f64 {
        let mut shear = 0.0;
        if !grid.is_flat(Axis::Y) {
            shear += (vel.u.get(i, j, k) - vel.u.get(i, j - 1, k)) / grid.dy(i, j, k, Loc3::FFC);
        }
        if !grid.is_flat(Axis::X) {
            shear += (vel.v.get(i, j, k) - vel.v.get(i - 1, j, k)) / grid.dx(i, j, k, Loc3::FFC);
        }
        shear * shear
    }
}

impl DiffusivityClosure for SmagorinskyLilly {
    fn name(&self) -> &'static str {
        "SmagorinskyLilly"
    }

    fn required_halo(&self) -> usize {
        1
    }

    fn horizontal_diffusivity(
        &self,
        grid: &dyn ImmersedMetrics,
        vel: Velocities<'_>,
        i: isize,
        j: isize,
        k: isize,
    ) -> f64 {
        let dx = grid.dx(i, j, k, Loc3::CCC);
        let dy = grid.dy(i, j, k, Loc3::CCC);
        let mut s2 = 0.0;
        let mut corners = 0.0;
        if !grid.is_flat(Axis::X) {
            let dudx = (vel.u.get(i + 1, j, k) - vel.u.get(i, j, k)) / dx;
            s2 += 2.0 * dudx * dudx;
        }
        if !grid.is_flat(Axis::Y) {
            let dvdy = (vel.v.get(i, j + 1, k) - vel.v.get(i, j, k)) / dy;
            s2 += 2.0 * dvdy * dvdy;
        }
        let (di, dj) = (!grid.is_flat(Axis::X) as isize, !grid.is_flat(Axis::Y) as isize);
        for (a, b) in [(0, 0), (di, 0), (0, dj), (di, dj)] {
            corners += Self::shear_squared(grid, vel, i + a, j + b, k);
        }
        s2 += 0.25 * corners;

        let delta = match (grid.is_flat(Axis::X), grid.is_flat(Axis::Y)) {
            (false, false) => (dx * dy).sqrt(),
            (false, true) => dx,
            (true, false) => dy,
            (true, true) => return 0.0,
        };
        let cd = self.coefficient * delta;
        cd * cd * s2.sqrt() / self.prandtl
    }

    fn vertical_diffusivity(&self) -> f64 {
        self.vertical
    }
}
