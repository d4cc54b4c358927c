//! Diagnosed fields: vertical velocity and hydrostatic pressure.
//!
//! Both are column integrals, so they take a horizontal column range and
//! sweep every level. Boundary recompute calls them over a range one
//! column wider than the tendencies it is about to recompute.

use crate::field::{Field, IndexBox};
use crate::immersed::ImmersedMetrics;
use crate::types::{Axis, Loc3};

/// Vertical velocity from continuity,
/// `w(k+1) = w(k) - (δx(Ax u) + δy(Ay v)) / Az`, integrated up from
/// `w = 0` at the bottom face.
///
/// Horizontal face areas are masked, so `w` stays zero through solid cells
/// and starts at zero below the first fluid cell.
pub fn compute_w_from_continuity<G: ImmersedMetrics + ?Sized>(
    grid: &G,
    u: &Field,
    v: &Field,
    w: &mut Field,
    columns: &IndexBox,
) {
    let nz = grid.size()[2] as isize;
    for j in columns.j.clone() {
        for i in columns.i.clone() {
            w.set(i, j, 1, 0.0);
            for k in 1..=nz {
                let mut div = 0.0;
                if !grid.is_flat(Axis::X) {
                    div += grid.masked_area(Axis::X, i + 1, j, k, Loc3::FCC) * u.get(i + 1, j, k)
                        - grid.masked_area(Axis::X, i, j, k, Loc3::FCC) * u.get(i, j, k);
                }
                if !grid.is_flat(Axis::Y) {
                    div += grid.masked_area(Axis::Y, i, j + 1, k, Loc3::CFC) * v.get(i, j + 1, k)
                        - grid.masked_area(Axis::Y, i, j, k, Loc3::CFC) * v.get(i, j, k);
                }
                let below = w.get(i, j, k);
                let az = grid.area(Axis::Z, i, j, k + 1, Loc3::CCF);
                w.set(i, j, k + 1, below - div / az);
            }
        }
    }
}

/// Hydrostatic pressure anomaly from buoyancy, `∂z p = b`, with `p = 0`
/// at the surface: `p(Nz) = -½ b Δz`, then integrated downward with
/// face-averaged buoyancy.
pub fn compute_hydrostatic_pressure<G: ImmersedMetrics + ?Sized>(
    grid: &G,
    b: &Field,
    p: &mut Field,
    columns: &IndexBox,
) {
    let nz = grid.size()[2] as isize;
    for j in columns.j.clone() {
        for i in columns.i.clone() {
            let top = -0.5 * b.get(i, j, nz) * grid.dz(i, j, nz, Loc3::CCC);
            p.set(i, j, nz, top);
            for k in (1..nz).rev() {
                let b_face = 0.5 * (b.get(i, j, k) + b.get(i, j, k + 1));
                let above = p.get(i, j, k + 1);
                p.set(i, j, k, above - b_face * grid.dz(i, j, k + 1, Loc3::CCF));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GridMetrics, RectilinearGrid};
    use crate::immersed::{GridFittedBottom, ImmersedBoundaryGrid};
    use crate::types::{Location, Topology};

    fn grid() -> RectilinearGrid {
        RectilinearGrid::uniform(
            [6, 6, 4],
            [2, 2, 1],
            [6.0, 6.0, 4.0],
            [Topology::Periodic, Topology::Periodic, Topology::Bounded],
        )
        .unwrap()
    }

    #[test]
    fn test_convergent_flow_rises() {
        let g = grid();
        let mut u = Field::new(&g, Loc3::FCC);
        let v = Field::new(&g, Loc3::CFC);
        let mut w = Field::new(&g, Loc3::CCF);
        // u = 1 on face 3, 0 on face 4: one unit of convergence per level in cell 3.
        for j in 1..=6 {
            for k in 1..=4 {
                u.set(3, j, k, 1.0);
            }
        }
        u.fill_halo_regions();
        let columns = IndexBox::new(1..=6, 1..=6, 1..=1);
        compute_w_from_continuity(&g, &u, &v, &mut w, &columns);
        assert_eq!(w.get(3, 2, 1), 0.0);
        assert!((w.get(3, 2, 5) - 4.0).abs() < 1e-12);
        assert!((w.get(2, 2, 5) + 4.0).abs() < 1e-12);
        assert_eq!(w.get(4, 2, 5), 0.0);
    }

    #[test]
    fn test_w_is_zero_below_bottom() {
        let g = grid();
        let ibg = ImmersedBoundaryGrid::new(g.clone(), GridFittedBottom::from_function(&g, |_, _| -2.0));
        let mut u = Field::new(&g, Loc3::FCC);
        u.set_fn(&g, |x, _, _| x);
        u.fill_halo_regions();
        let v = Field::new(&g, Loc3::CFC);
        let mut w = Field::new(&g, Loc3::CCF);
        compute_w_from_continuity(&ibg, &u, &v, &mut w, &IndexBox::new(1..=5, 1..=6, 1..=1));
        for i in 1..=5 {
            assert_eq!(w.get(i, 3, 2), 0.0);
            assert_eq!(w.get(i, 3, 3), 0.0);
            assert!(w.get(i, 3, 5) < 0.0);
        }
    }

    #[test]
    fn test_hydrostatic_pressure_of_uniform_buoyancy() {
        let g = grid();
        let mut b = Field::new(&g, Loc3::CCC);
        b.fill(-2.0);
        let mut p = Field::new(&g, Loc3::CCC);
        compute_hydrostatic_pressure(&g, &b, &mut p, &IndexBox::new(1..=6, 1..=6, 1..=1));
        // p(z) = b z at every center.
        for k in 1..=4 {
            let z = g.node(Axis::Z, Location::Center, k);
            assert!((p.get(2, 2, k) - (-2.0) * z).abs() < 1e-12);
        }
    }
}
