//! Diffusion operator and diffusivity fill.

use super::DiffusivityClosure;
use crate::advection::Velocities;
use crate::field::{Field, IndexBox};
use crate::immersed::ImmersedMetrics;
use crate::types::{Axis, Loc3, Location};

/// Fill `kappa` (cell centers) over `region`. Inactive cells get zero.
pub fn compute_diffusivities<G: ImmersedMetrics>(
    closure: &dyn DiffusivityClosure,
    grid: &G,
    velocities: Velocities<'_>,
    kappa: &mut Field,
    region: &IndexBox,
) {
    for (i, j, k) in region.iter() {
        let value = if grid.inactive_node(Loc3::CCC, i, j, k) {
            0.0
        } else {
            closure.horizontal_diffusivity(grid, velocities, i, j, k)
        };
        kappa.set(i, j, k, value);
    }
}

/// Center diffusivity averaged to an arbitrary horizontal staggering.
///
/// Face-located axes average the two neighbouring centers.
#[inline]
pub fn diffusivity_at(kappa: &Field, loc: Loc3, i: isize, j: isize, k: isize) -> f64 {
    let di: &[isize] = if loc.x.is_face() { &[-1, 0] } else { &[0] };
    let dj: &[isize] = if loc.y.is_face() { &[-1, 0] } else { &[0] };
    let mut sum = 0.0;
    for a in di {
        for b in dj {
            sum += kappa.get(i + a, j + b, k);
        }
    }
    sum / (di.len() * dj.len()) as f64
}

/// `∇·(κ ∇φ)` at the node `(i, j, k)` of `phi`'s staggering.
///
/// Horizontal fluxes use the center diffusivity field, averaged to the flux
/// point; the vertical flux uses `kappa_z`. Fluxes through faces touching
/// the solid vanish, and flat axes contribute nothing.
pub fn diffusive_flux_divergence<G: ImmersedMetrics + ?Sized>(
    grid: &G,
    kappa: &Field,
    kappa_z: f64,
    phi: &Field,
    i: isize,
    j: isize,
    k: isize,
) -> f64 {
    let loc = phi.loc();
    let mut div = 0.0;
    for axis in Axis::ALL {
        if grid.is_flat(axis) {
            continue;
        }
        if axis == Axis::Z && kappa_z == 0.0 {
            continue;
        }
        let flux_loc = loc.with(axis, loc.along(axis).flip());
        let (di, dj, dk) = axis.unit();
        let flux = |p: isize| {
            let (fi, fj, fk) = (i + di * p, j + dj * p, k + dk * p);
            let area = grid.masked_area(axis, fi, fj, fk, flux_loc);
            if area == 0.0 {
                return 0.0;
            }
            // Elements on either side of the flux point.
            let lo = match loc.along(axis) {
                Location::Center => -1,
                Location::Face => 0,
            };
            let low = phi.get(fi + di * lo, fj + dj * lo, fk + dk * lo);
            let high = phi.get(fi + di * (lo + 1), fj + dj * (lo + 1), fk + dk * (lo + 1));
            let gradient = (high - low) / grid.width(axis, fi, fj, fk, flux_loc);
            let k_face = match axis {
                Axis::Z => kappa_z,
                _ => diffusivity_at(kappa, flux_loc, fi, fj, fk),
            };
            area * k_face * gradient
        };
        // Flux points on either side of the node.
        let (west, east) = match loc.along(axis) {
            Location::Center => (0, 1),
            Location::Face => (-1, 0),
        };
        div += flux(east) - flux(west);
    }
    div / grid.volume(i, j, k, loc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::closure::ConstantDiffusivity;
    use crate::grid::{GridMetrics, RectilinearGrid};
    use crate::immersed::{GridFittedBottom, ImmersedBoundaryGrid};
    use crate::types::Topology;

    fn grid() -> RectilinearGrid {
        RectilinearGrid::uniform(
            [8, 8, 4],
            [2, 2, 2],
            [8.0, 8.0, 4.0],
            [Topology::Periodic, Topology::Periodic, Topology::Bounded],
        )
        .unwrap()
    }

    #[test]
    fn test_quadratic_has_constant_laplacian() {
        let g = RectilinearGrid::uniform(
            [8, 8, 1],
            [2, 2, 1],
            [8.0, 8.0, 1.0],
            [Topology::Bounded, Topology::Bounded, Topology::Bounded],
        )
        .unwrap();
        let mut kappa = Field::new(&g, Loc3::CCC);
        kappa.fill(0.5);
        let mut c = Field::new(&g, Loc3::CCC);
        c.set_fn(&g, |x, y, _| x * x + y * y);
        c.fill_halo_regions();
        let d = diffusive_flux_divergence(&g, &kappa, 0.0, &c, 4, 5, 1);
        assert!((d - 0.5 * 4.0).abs() < 1e-12, "∇·κ∇c = {d}");
    }

    #[test]
    fn test_diffusion_conserves_and_respects_solid() {
        let g = grid();
        let ibg = ImmersedBoundaryGrid::new(
            g.clone(),
            GridFittedBottom::from_function(&g, |x, _| if x < 2.0 { -1.0 } else { -4.0 }),
        );
        let mut kappa = Field::new(&g, Loc3::CCC);
        let region = kappa.with_halo();
        let u = Field::new(&g, Loc3::FCC);
        let v = Field::new(&g, Loc3::CFC);
        let w = Field::new(&g, Loc3::CCF);
        compute_diffusivities(
            &ConstantDiffusivity::new(1.0, 1.0),
            &ibg,
            Velocities::new(&u, &v, &w),
            &mut kappa,
            &region,
        );
        assert_eq!(kappa.get(1, 1, 1), 0.0);
        assert_eq!(kappa.get(4, 1, 1), 1.0);

        let mut c = Field::new(&g, Loc3::CCC);
        c.set_fn(&g, |x, y, z| (x * 0.7).sin() + (y * 0.3).cos() + z);
        for (i, j, k) in c.interior().iter() {
            if ibg.solid_node(Loc3::CCC, i, j, k) {
                c.set(i, j, k, 1e6);
            }
        }
        c.fill_halo_regions();

        let mut total = 0.0;
        for (i, j, k) in c.interior().iter() {
            if ibg.solid_node(Loc3::CCC, i, j, k) {
                continue;
            }
            let d = diffusive_flux_divergence(&ibg, &kappa, 1.0, &c, i, j, k);
            assert!(d.is_finite());
            total += d * ibg.volume(i, j, k, Loc3::CCC);
        }
        assert!(total.abs() < 1e-9, "net diffusive tendency {total}");
    }

    #[test]
    fn test_diffusivity_averaging() {
        let g = grid();
        let mut kappa = Field::new(&g, Loc3::CCC);
        kappa.set(2, 2, 1, 4.0);
        assert_eq!(diffusivity_at(&kappa, Loc3::CCC, 2, 2, 1), 4.0);
        assert_eq!(diffusivity_at(&kappa, Loc3::FCC, 3, 2, 1), 2.0);
        assert_eq!(diffusivity_at(&kappa, Loc3::FFC, 3, 3, 1), 1.0);
    }
}
