//! Backward-Euler vertical diffusion with immersed-boundary masking.
//!
//! One implicit step solves, in every water column,
//!
//! ```text
//! φⁿ⁺¹ - Δt ∂z(κ ∂z φⁿ⁺¹) = φⁿ
//! ```
//!
//! which discretizes to a tridiagonal system. Row `k` couples cell `k` to
//! `k + 1` through the face above it; that coupling is removed whenever
//! the face touches the solid, so a column split by an immersed obstacle
//! diffuses as independent pieces. The top and bottom of the domain carry
//! no flux.

use super::grid::ImmersedMetrics;
use crate::field::Field;
use crate::types::{Loc3, Location};

/// Coefficient of `φ(k+1)` in row `k`.
///
/// `kappa` is located at the vertical faces of `loc`'s columns.
#[inline]
pub fn ivd_upper_diagonal(
    grid: &impl ImmersedMetrics,
    loc: Loc3,
    i: isize,
    j: isize,
    k: isize,
    kappa: &Field,
    dt: f64,
) -> f64 {
    let nz = grid.size()[2] as isize;
    if k >= nz || grid.z_solid_node(loc.x, loc.y, i, j, k) {
        return 0.0;
    }
    let face = Loc3::new(loc.x, loc.y, Location::Face);
    let dz_c = grid.dz(i, j, k, loc);
    let dz_f = grid.dz(i, j, k + 1, face);
    -dt * kappa.get(i, j, k + 1) / (dz_c * dz_f)
}

/// Coefficient of `φ(k)` in row `k + 1`.
#[inline]
pub fn ivd_lower_diagonal(
    grid: &impl ImmersedMetrics,
    loc: Loc3,
    i: isize,
    j: isize,
    k: isize,
    kappa: &Field,
    dt: f64,
) -> f64 {
    let nz = grid.size()[2] as isize;
    if k >= nz || grid.z_solid_node(loc.x, loc.y, i, j, k) {
        return 0.0;
    }
    let face = Loc3::new(loc.x, loc.y, Location::Face);
    let dz_c = grid.dz(i, j, k + 1, loc);
    let dz_f = grid.dz(i, j, k + 1, face);
    -dt * kappa.get(i, j, k + 1) / (dz_c * dz_f)
}

/// Diagonal of row `k`: one minus the off-diagonals that touch it.
#[inline]
pub fn ivd_diagonal(
    grid: &impl ImmersedMetrics,
    loc: Loc3,
    i: isize,
    j: isize,
    k: isize,
    kappa: &Field,
    dt: f64,
) -> f64 {
    let above = ivd_upper_diagonal(grid, loc, i, j, k, kappa, dt);
    let below = if k > 1 {
        // Row k's coupling to k-1 mirrors row k-1's coupling to k.
        let face = Loc3::new(loc.x, loc.y, Location::Face);
        let dz_f = grid.dz(i, j, k, face);
        let dz_c = grid.dz(i, j, k, loc);
        if grid.z_solid_node(loc.x, loc.y, i, j, k - 1) {
            0.0
        } else {
            -dt * kappa.get(i, j, k) / (dz_c * dz_f)
        }
    } else {
        0.0
    };
    1.0 - above - below
}

/// Solve `A x = rhs` for a tridiagonal `A` in place.
///
/// `lower[k]` sits at row `k + 1`, column `k`; `upper[k]` at row `k`,
/// column `k + 1`. `scratch` must have the length of `diag`.
pub fn solve_tridiagonal(lower: &[f64], diag: &[f64], upper: &[f64], rhs: &mut [f64], scratch: &mut [f64]) {
    let n = diag.len();
    if n == 0 {
        return;
    }
    let mut beta = diag[0];
    rhs[0] /= beta;
    for k in 1..n {
        scratch[k] = upper[k - 1] / beta;
        beta = diag[k] - lower[k - 1] * scratch[k];
        rhs[k] = (rhs[k] - lower[k - 1] * rhs[k - 1]) / beta;
    }
    for k in (0..n - 1).rev() {
        rhs[k] -= scratch[k + 1] * rhs[k + 1];
    }
}

/// Advance `field` by one backward-Euler vertical diffusion step.
///
/// Solid cells keep their values; every matrix row coupling them to fluid
/// is cut by the masking above.
pub fn implicit_vertical_step(grid: &impl ImmersedMetrics, field: &mut Field, kappa: &Field, dt: f64) {
    let loc = field.loc();
    let nz = grid.size()[2];
    let interior = field.interior();
    let mut lower = vec![0.0; nz];
    let mut diag = vec![0.0; nz];
    let mut upper = vec![0.0; nz];
    let mut rhs = vec![0.0; nz];
    let mut scratch = vec![0.0; nz];

    for j in interior.j.clone() {
        for i in interior.i.clone() {
            for k in 1..=nz as isize {
                let s = (k - 1) as usize;
                diag[s] = ivd_diagonal(grid, loc, i, j, k, kappa, dt);
                upper[s] = ivd_upper_diagonal(grid, loc, i, j, k, kappa, dt);
                lower[s] = ivd_lower_diagonal(grid, loc, i, j, k, kappa, dt);
                rhs[s] = field.get(i, j, k);
            }
            solve_tridiagonal(&lower, &diag, &upper, &mut rhs, &mut scratch);
            for k in 1..=nz as isize {
                field.set(i, j, k, rhs[(k - 1) as usize]);
            }
        }
    }
}
