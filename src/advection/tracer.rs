//! Tracer flux divergence.
//!
//! ```text
//! div(U c) = (1/V) Σ_axes [A u ĉ]_{face+1} - [A u ĉ]_{face}
//! ```
//!
//! `ĉ` is the upwind-biased face value from the advection scheme and `A`
//! the immersed-aware face area, zero wherever the face touches the solid.

use super::scheme::{AdvectionScheme, SmoothnessSource};
use crate::field::Field;
use crate::immersed::ImmersedMetrics;
use crate::types::{Axis, Loc3, Location};

/// Borrowed velocity components at `FCC`, `CFC` and `CCF`.
#[derive(Clone, Copy, Debug)]
pub struct Velocities<'a> {
    pub u: &'a Field,
    pub v: &'a Field,
    pub w: &'a Field,
}

impl<'a> Velocities<'a> {
    pub fn new(u: &'a Field, v: &'a Field, w: &'a Field) -> Self {
        Self { u, v, w }
    }

    /// Velocity component normal to faces of `axis`.
    #[inline]
    pub fn component(&self, axis: Axis) -> &'a Field {
        match axis {
            Axis::X => self.u,
            Axis::Y => self.v,
            Axis::Z => self.w,
        }
    }
}

/// Advective flux of a center-located tracer through face `(i, j, k)`
/// normal to `axis`.
#[inline]
pub fn advective_tracer_flux<G: ImmersedMetrics + ?Sized>(
    grid: &G,
    scheme: &AdvectionScheme,
    velocities: Velocities<'_>,
    c: &Field,
    axis: Axis,
    (i, j, k): (isize, isize, isize),
) -> f64 {
    let face = Loc3::CCC.with(axis, Location::Face);
    let area = grid.masked_area(axis, i, j, k, face);
    if area == 0.0 {
        return 0.0;
    }
    let u = velocities.component(axis).get(i, j, k);
    let value = |m: isize| match axis {
        Axis::X => c.get(m, j, k),
        Axis::Y => c.get(i, m, k),
        Axis::Z => c.get(i, j, m),
    };
    let c_face = scheme.biased_interpolate(grid, axis, Loc3::CCC, (i, j, k), u, &value, SmoothnessSource::Scalar);
    area * u * c_face
}

/// Divergence of the advective flux of `c` at cell `(i, j, k)`.
///
/// Flat axes contribute exactly zero.
///
/// # Example
///
/// ```
/// use fv_ocean::advection::{AdvectionScheme, Velocities, flux_divergence};
/// use fv_ocean::field::Field;
/// use fv_ocean::grid::RectilinearGrid;
/// use fv_ocean::types::{Loc3, Topology};
///
/// let grid = RectilinearGrid::uniform(
///     [8, 1, 1],
///     [1, 0, 0],
///     [8.0, 1.0, 1.0],
///     [Topology::Periodic, Topology::Flat, Topology::Flat],
/// )?;
/// let mut u = Field::new(&grid, Loc3::FCC);
/// u.fill(1.0);
/// let (v, w) = (Field::new(&grid, Loc3::CFC), Field::new(&grid, Loc3::CCF));
/// let mut c = Field::new(&grid, Loc3::CCC);
/// c.set(3, 1, 1, 1.0);
/// c.fill_halo_regions();
///
/// let div = flux_divergence(4, 1, 1, &grid, &AdvectionScheme::UpwindFirstOrder, Velocities::new(&u, &v, &w), &c);
/// assert_eq!(div, -1.0);
/// # Ok::<(), fv_ocean::ConfigurationError>(())
/// ```
pub fn flux_divergence<G: ImmersedMetrics + ?Sized>(
    i: isize,
    j: isize,
    k: isize,
    grid: &G,
    scheme: &AdvectionScheme,
    velocities: Velocities<'_>,
    c: &Field,
) -> f64 {
    let mut div = 0.0;
    for axis in Axis::ALL {
        if grid.is_flat(axis) {
            continue;
        }
        let (di, dj, dk) = axis.unit();
        let out = advective_tracer_flux(grid, scheme, velocities, c, axis, (i + di, j + dj, k + dk));
        let inn = advective_tracer_flux(grid, scheme, velocities, c, axis, (i, j, k));
        div += out - inn;
    }
    div / grid.volume(i, j, k, Loc3::CCC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advection::{WenoScheme, WenoVariant};
    use crate::grid::RectilinearGrid;
    use crate::immersed::{GridFittedBottom, ImmersedBoundaryGrid};
    use crate::types::Topology;

    fn fields(grid: &RectilinearGrid) -> (Field, Field, Field) {
        (
            Field::new(grid, Loc3::FCC),
            Field::new(grid, Loc3::CFC),
            Field::new(grid, Loc3::CCF),
        )
    }

    #[test]
    fn test_constant_tracer_in_uniform_flow_has_no_divergence() {
        let g = RectilinearGrid::uniform(
            [8, 8, 4],
            [3, 3, 3],
            [8.0, 8.0, 4.0],
            [Topology::Periodic, Topology::Periodic, Topology::Bounded],
        )
        .unwrap();
        let (mut u, mut v, w) = fields(&g);
        u.fill(0.7);
        v.fill(-0.3);
        let mut c = Field::new(&g, Loc3::CCC);
        c.fill(4.0);
        let scheme = AdvectionScheme::from(WenoScheme::new(3, WenoVariant::Plain).unwrap());
        for (i, j, k) in c.interior().iter() {
            let d = flux_divergence(i, j, k, &g, &scheme, Velocities::new(&u, &v, &w), &c);
            assert!(d.abs() < 1e-12, "divergence {d} at ({i},{j},{k})");
        }
    }

    #[test]
    fn test_flat_axes_contribute_nothing() {
        let g = RectilinearGrid::uniform(
            [6, 1, 1],
            [2, 0, 0],
            [6.0, 1.0, 1.0],
            [Topology::Periodic, Topology::Flat, Topology::Flat],
        )
        .unwrap();
        let (u, mut v, mut w) = fields(&g);
        v.fill(5.0);
        w.fill(5.0);
        let mut c = Field::new(&g, Loc3::CCC);
        c.set_fn(&g, |x, _, _| x * x);
        c.fill_halo_regions();
        let d = flux_divergence(3, 1, 1, &g, &AdvectionScheme::Centered2, Velocities::new(&u, &v, &w), &c);
        assert_eq!(d, 0.0);
    }

    #[test]
    fn test_solid_faces_carry_no_flux() {
        let g = RectilinearGrid::uniform(
            [4, 4, 2],
            [2, 2, 2],
            [4.0, 4.0, 2.0],
            [Topology::Periodic, Topology::Periodic, Topology::Bounded],
        )
        .unwrap();
        let ibg = ImmersedBoundaryGrid::new(
            g.clone(),
            GridFittedBottom::from_function(&g, |x, y| if x > 2.0 && x < 3.0 && y > 2.0 && y < 3.0 { 1.0 } else { -2.0 }),
        );
        let (mut u, v, w) = fields(&g);
        u.fill(1.0);
        let mut c = Field::new(&g, Loc3::CCC);
        c.fill(1.0);
        let scheme = AdvectionScheme::UpwindFirstOrder;
        let vel = Velocities::new(&u, &v, &w);
        // Face x = 3 between fluid (2, 3) and solid (3, 3) is blocked.
        assert_eq!(advective_tracer_flux(&ibg, &scheme, vel, &c, Axis::X, (3, 3, 1)), 0.0);
        let d = flux_divergence(2, 3, 1, &ibg, &scheme, vel, &c);
        assert_eq!(d, -1.0);
        assert!(d.is_finite());
    }
}
