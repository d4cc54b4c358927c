//! Momentum advection.
//!
//! Two forms are available:
//!
//! - **Flux form**: `div(U u)` on the staggered control volume of each
//!   velocity component, built from the same biased interpolation as
//!   tracers.
//! - **Vector invariant**: `-ζ v + ∂x K` (and `ζ u + ∂y K` for `v`), with
//!   the vorticity flux reconstructed by WENO using smoothness sensed on
//!   both horizontal velocity components, plus an advective-form vertical
//!   term.
//!
//! Functions here return the advection term `U·∇u`; the tendency is its
//! negative. The curvature correction of latitude-longitude grids is a
//! separate tendency contribution, exactly zero on Cartesian grids.

use serde::{Deserialize, Serialize};

use super::scheme::{AdvectionScheme, SmoothnessSource};
use super::tracer::Velocities;
use crate::field::Field;
use crate::immersed::ImmersedMetrics;
use crate::types::{Axis, Loc3, Location};

/// Formulation of momentum advection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MomentumForm {
    #[default]
    FluxForm,
    VectorInvariant,
}

type Index3 = (isize, isize, isize);

#[inline]
fn shift((i, j, k): Index3, axis: Axis, by: isize) -> Index3 {
    let (di, dj, dk) = axis.unit();
    (i + by * di, j + by * dj, k + by * dk)
}

/// Value getter along `axis` through `at`.
fn along(f: &Field, axis: Axis, (i, j, k): Index3) -> impl Fn(isize) -> f64 + '_ {
    move |m| match axis {
        Axis::X => f.get(m, j, k),
        Axis::Y => f.get(i, m, k),
        Axis::Z => f.get(i, j, m),
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

/// Vertical vorticity `ζ = (δx(Δy v) - δy(Δx u)) / Az` at `FFC`.
pub fn vertical_vorticity<G: ImmersedMetrics + ?Sized>(
    grid: &G,
    u: &Field,
    v: &Field,
    i: isize,
    j: isize,
    k: isize,
) -> f64 {
    let mut circulation = 0.0;
    if !grid.is_flat(Axis::X) {
        circulation += grid.dy(i, j, k, Loc3::CFC) * v.get(i, j, k) - grid.dy(i - 1, j, k, Loc3::CFC) * v.get(i - 1, j, k);
    }
    if !grid.is_flat(Axis::Y) {
        circulation -= grid.dx(i, j, k, Loc3::FCC) * u.get(i, j, k) - grid.dx(i, j - 1, k, Loc3::FCC) * u.get(i, j - 1, k);
    }
    circulation / grid.area(Axis::Z, i, j, k, Loc3::FFC)
}

/// Horizontal kinetic energy per unit mass at `CCC`.
#[inline]
pub fn kinetic_energy(u: &Field, v: &Field, i: isize, j: isize, k: isize) -> f64 {
    let uu = 0.5 * (u.get(i, j, k).powi(2) + u.get(i + 1, j, k).powi(2));
    let vv = 0.5 * (v.get(i, j, k).powi(2) + v.get(i, j + 1, k).powi(2));
    0.5 * (uu + vv)
}

/// `v` averaged to `FCC`.
#[inline]
fn v_at_u(v: &Field, i: isize, j: isize, k: isize) -> f64 {
    0.25 * (v.get(i - 1, j, k) + v.get(i, j, k) + v.get(i - 1, j + 1, k) + v.get(i, j + 1, k))
}

/// `u` averaged to `CFC`.
#[inline]
fn u_at_v(u: &Field, i: isize, j: isize, k: isize) -> f64 {
    0.25 * (u.get(i, j - 1, k) + u.get(i + 1, j - 1, k) + u.get(i, j, k) + u.get(i + 1, j, k))
}

// ============================================================================
// Flux form
// ============================================================================

/// `div(U φ)` on the control volume of a velocity component `phi`.
fn flux_form<G: ImmersedMetrics + ?Sized>(
    grid: &G,
    scheme: &AdvectionScheme,
    vel: Velocities<'_>,
    phi: &Field,
    at: Index3,
) -> f64 {
    let loc = phi.loc();
    let own_axis = loc.face_axes().next();
    let mut div = 0.0;
    for axis in Axis::ALL {
        if grid.is_flat(axis) {
            continue;
        }
        let same = loc.along(axis).is_face();
        let flux_loc = loc.with(axis, loc.along(axis).flip());
        let c = vel.component(axis);
        let flux = |pt: Index3| {
            let area = grid.masked_area(axis, pt.0, pt.1, pt.2, flux_loc);
            if area == 0.0 {
                return 0.0;
            }
            let transport = if same {
                let next = shift(pt, axis, 1);
                0.5 * (c.get(pt.0, pt.1, pt.2) + c.get(next.0, next.1, next.2))
            } else if let Some(f) = own_axis {
                let prev = shift(pt, f, -1);
                0.5 * (c.get(pt.0, pt.1, pt.2) + c.get(prev.0, prev.1, prev.2))
            } else {
                c.get(pt.0, pt.1, pt.2)
            };
            let value = along(phi, axis, pt);
            area * transport * scheme.biased_interpolate(grid, axis, loc, pt, transport, &value, SmoothnessSource::Scalar)
        };
        // Flux points bracketing `at`: centers at -1/0 for the component's
        // own axis, faces at 0/+1 otherwise.
        div += if same {
            flux(at) - flux(shift(at, axis, -1))
        } else {
            flux(shift(at, axis, 1)) - flux(at)
        };
    }
    div / grid.volume(at.0, at.1, at.2, loc)
}

// ============================================================================
// Vector invariant
// ============================================================================

/// Advective-form vertical term `w ∂z φ`, written as
/// `div(w φ) - φ div(w)` over the column faces of `phi`'s control volume.
fn vertical_advection<G: ImmersedMetrics + ?Sized>(
    grid: &G,
    scheme: &AdvectionScheme,
    w: &Field,
    phi: &Field,
    at: Index3,
) -> f64 {
    if grid.is_flat(Axis::Z) {
        return 0.0;
    }
    let loc = phi.loc();
    let flux_loc = loc.with(Axis::Z, Location::Face);
    let Some(f) = loc.face_axes().next() else {
        return 0.0;
    };
    let mass_and_flux = |pt: Index3| {
        let area = grid.masked_area(Axis::Z, pt.0, pt.1, pt.2, flux_loc);
        if area == 0.0 {
            return (0.0, 0.0);
        }
        let prev = shift(pt, f, -1);
        let w_bar = 0.5 * (w.get(pt.0, pt.1, pt.2) + w.get(prev.0, prev.1, prev.2));
        let value = along(phi, Axis::Z, pt);
        let phi_face = scheme.biased_interpolate(grid, Axis::Z, loc, pt, w_bar, &value, SmoothnessSource::Scalar);
        (area * w_bar, area * w_bar * phi_face)
    };
    let (m_lo, f_lo) = mass_and_flux(at);
    let (m_hi, f_hi) = mass_and_flux(shift(at, Axis::Z, 1));
    let volume = grid.volume(at.0, at.1, at.2, loc);
    let phi_here = phi.get(at.0, at.1, at.2);
    ((f_hi - f_lo) - phi_here * (m_hi - m_lo)) / volume
}

/// Vorticity reconstructed at a velocity point along `axis`, upwinded by
/// `transport`, with smoothness from both velocity components.
fn upwinded_vorticity<G: ImmersedMetrics + ?Sized>(
    grid: &G,
    scheme: &AdvectionScheme,
    u: &Field,
    v: &Field,
    axis: Axis,
    at: Index3,
    transport: f64,
) -> f64 {
    let (i, j, k) = at;
    let zeta = |m: isize| match axis {
        Axis::X => vertical_vorticity(grid, u, v, m, j, k),
        _ => vertical_vorticity(grid, u, v, i, m, k),
    };
    // Both components averaged to the vorticity points of the stencil.
    let u_s = |m: isize| match axis {
        Axis::X => 0.5 * (u.get(m, j - 1, k) + u.get(m, j, k)),
        _ => 0.5 * (u.get(i, m - 1, k) + u.get(i, m, k)),
    };
    let v_s = |m: isize| match axis {
        Axis::X => 0.5 * (v.get(m - 1, j, k) + v.get(m, j, k)),
        _ => 0.5 * (v.get(i - 1, m, k) + v.get(i, m, k)),
    };
    scheme.biased_interpolate(
        grid,
        axis,
        Loc3::FFC,
        at,
        transport,
        &zeta,
        SmoothnessSource::VelocityBlended { u: &u_s, v: &v_s },
    )
}

fn vector_invariant_u<G: ImmersedMetrics + ?Sized>(
    grid: &G,
    scheme: &AdvectionScheme,
    vel: Velocities<'_>,
    at: Index3,
) -> f64 {
    let (i, j, k) = at;
    let (u, v) = (vel.u, vel.v);
    let mut a = 0.0;
    if !grid.is_flat(Axis::Y) {
        let v_bar = v_at_u(v, i, j, k);
        a -= v_bar * upwinded_vorticity(grid, scheme, u, v, Axis::Y, at, v_bar);
    }
    if !grid.is_flat(Axis::X) {
        let dk = kinetic_energy(u, v, i, j, k) - kinetic_energy(u, v, i - 1, j, k);
        a += dk / grid.dx(i, j, k, Loc3::FCC);
    }
    a + vertical_advection(grid, scheme, vel.w, u, at)
}

fn vector_invariant_v<G: ImmersedMetrics + ?Sized>(
    grid: &G,
    scheme: &AdvectionScheme,
    vel: Velocities<'_>,
    at: Index3,
) -> f64 {
    let (i, j, k) = at;
    let (u, v) = (vel.u, vel.v);
    let mut a = 0.0;
    if !grid.is_flat(Axis::X) {
        let u_bar = u_at_v(u, i, j, k);
        a += u_bar * upwinded_vorticity(grid, scheme, u, v, Axis::X, at, u_bar);
    }
    if !grid.is_flat(Axis::Y) {
        let dk = kinetic_energy(u, v, i, j, k) - kinetic_energy(u, v, i, j - 1, k);
        a += dk / grid.dy(i, j, k, Loc3::CFC);
    }
    a + vertical_advection(grid, scheme, vel.w, v, at)
}

// ============================================================================
// Public operators
// ============================================================================

/// Advection term of `u` at `FCC` `(i, j, k)`.
pub fn u_advection<G: ImmersedMetrics + ?Sized>(
    grid: &G,
    scheme: &AdvectionScheme,
    form: MomentumForm,
    vel: Velocities<'_>,
    i: isize,
    j: isize,
    k: isize,
) -> f64 {
    match form {
        MomentumForm::FluxForm => flux_form(grid, scheme, vel, vel.u, (i, j, k)),
        MomentumForm::VectorInvariant => vector_invariant_u(grid, scheme, vel, (i, j, k)),
    }
}

/// Advection term of `v` at `CFC` `(i, j, k)`.
pub fn v_advection<G: ImmersedMetrics + ?Sized>(
    grid: &G,
    scheme: &AdvectionScheme,
    form: MomentumForm,
    vel: Velocities<'_>,
    i: isize,
    j: isize,
    k: isize,
) -> f64 {
    match form {
        MomentumForm::FluxForm => flux_form(grid, scheme, vel, vel.v, (i, j, k)),
        MomentumForm::VectorInvariant => vector_invariant_v(grid, scheme, vel, (i, j, k)),
    }
}

/// Curvature contribution to the `u` tendency,
/// `v̄ (v̄ δx(Δy) - u δy(Δx)) / (Δx Δy)`.
pub fn curvature_tendency_u<G: ImmersedMetrics + ?Sized>(grid: &G, u: &Field, v: &Field, i: isize, j: isize, k: isize) -> f64 {
    if !grid.geometry().is_curvilinear() || grid.is_flat(Axis::X) || grid.is_flat(Axis::Y) {
        return 0.0;
    }
    let v_bar = v_at_u(v, i, j, k);
    let u_here = u.get(i, j, k);
    let dx_dy = grid.dy(i, j, k, Loc3::CCC) - grid.dy(i - 1, j, k, Loc3::CCC);
    let dy_dx = grid.dx(i, j + 1, k, Loc3::FFC) - grid.dx(i, j, k, Loc3::FFC);
    let area = grid.dx(i, j, k, Loc3::FCC) * grid.dy(i, j, k, Loc3::FCC);
    v_bar * (v_bar * dx_dy - u_here * dy_dx) / area
}

/// Curvature contribution to the `v` tendency,
/// `ū (ū δy(Δx) - v δx(Δy)) / (Δx Δy)`.
pub fn curvature_tendency_v<G: ImmersedMetrics + ?Sized>(grid: &G, u: &Field, v: &Field, i: isize, j: isize, k: isize) -> f64 {
    if !grid.geometry().is_curvilinear() || grid.is_flat(Axis::X) || grid.is_flat(Axis::Y) {
        return 0.0;
    }
    let u_bar = u_at_v(u, i, j, k);
    let v_here = v.get(i, j, k);
    let dy_dx = grid.dx(i, j, k, Loc3::CCC) - grid.dx(i, j - 1, k, Loc3::CCC);
    let dx_dy = grid.dy(i + 1, j, k, Loc3::FFC) - grid.dy(i, j, k, Loc3::FFC);
    let area = grid.dx(i, j, k, Loc3::CFC) * grid.dy(i, j, k, Loc3::CFC);
    u_bar * (u_bar * dy_dx - v_here * dx_dy) / area
}
