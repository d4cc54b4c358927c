//! Per-cell tendency kernels and their launch over index sets.
//!
//! Every kernel is a pure function of `(i, j, k)` and the current state.
//! [`launch`] evaluates a kernel over an [`IndexSet`] into a buffer and
//! scatters it into the output field, so an index appearing in a later
//! launch simply overwrites the earlier value.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::Dynamics;
use super::state::{ModelState, Tendencies};
use crate::advection::{curvature_tendency_u, curvature_tendency_v, flux_divergence, u_advection, v_advection};
use crate::closure::diffusive_flux_divergence;
use crate::field::{Field, IndexBox};
use crate::immersed::{ImmersedMetrics, PackedIndices};
use crate::types::{Axis, Loc3};

/// A fixed, ordered set of `(i, j, k)` indices.
pub trait IndexSet: Sync {
    fn len(&self) -> usize;

    /// The `n`-th index.
    fn index(&self, n: usize) -> (isize, isize, isize);

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IndexSet for IndexBox {
    fn len(&self) -> usize {
        IndexBox::len(self)
    }

    #[inline]
    fn index(&self, n: usize) -> (isize, isize, isize) {
        self.get(n)
    }
}

impl IndexSet for PackedIndices {
    fn len(&self) -> usize {
        PackedIndices::len(self)
    }

    #[inline]
    fn index(&self, n: usize) -> (isize, isize, isize) {
        self.get(n)
    }
}

/// Evaluate `kernel` at every index of `set` and write the results into
/// `out`.
pub fn launch<S, F>(set: &S, out: &mut Field, kernel: F)
where
    S: IndexSet + ?Sized,
    F: Fn(isize, isize, isize) -> f64 + Sync,
{
    let eval = |n: usize| {
        let (i, j, k) = set.index(n);
        kernel(i, j, k)
    };
    #[cfg(feature = "parallel")]
    let values: Vec<f64> = (0..set.len()).into_par_iter().map(eval).collect();
    #[cfg(not(feature = "parallel"))]
    let values: Vec<f64> = (0..set.len()).map(eval).collect();

    for (n, value) in values.into_iter().enumerate() {
        let (i, j, k) = set.index(n);
        out.set(i, j, k, value);
    }
}

/// Whether a velocity node sits on a wall or touches the solid. Its
/// tendency is held at zero.
fn peripheral<G: ImmersedMetrics + ?Sized>(grid: &G, loc: Loc3, i: isize, j: isize, k: isize) -> bool {
    if grid.solid_interface(loc, i, j, k) {
        return true;
    }
    loc.face_axes().any(|axis| {
        let a = axis.index();
        let idx = [i, j, k][a];
        let topology = grid.topology()[a];
        (idx == 1 && topology.has_wall(false)) || (idx == grid.size()[a] as isize + 1 && topology.has_wall(true))
    })
}

/// Tendency of `u` at `FCC` `(i, j, k)`: advection, curvature, pressure
/// gradient and diffusion.
pub fn u_tendency<G: ImmersedMetrics + ?Sized>(
    grid: &G,
    dynamics: &Dynamics,
    state: &ModelState,
    i: isize,
    j: isize,
    k: isize,
) -> f64 {
    if grid.is_flat(Axis::X) || peripheral(grid, Loc3::FCC, i, j, k) {
        return 0.0;
    }
    let vel = state.velocities();
    let pressure_gradient = (state.pressure.get(i, j, k) - state.pressure.get(i - 1, j, k)) / grid.dx(i, j, k, Loc3::FCC);
    -u_advection(grid, &dynamics.advection, dynamics.momentum, vel, i, j, k)
        + curvature_tendency_u(grid, &state.u, &state.v, i, j, k)
        - pressure_gradient
        + diffusive_flux_divergence(
            grid,
            &state.diffusivity,
            dynamics.closure.vertical_diffusivity(),
            &state.u,
            i,
            j,
            k,
        )
}

/// Tendency of `v` at `CFC` `(i, j, k)`.
pub fn v_tendency<G: ImmersedMetrics + ?Sized>(
    grid: &G,
    dynamics: &Dynamics,
    state: &ModelState,
    i: isize,
    j: isize,
    k: isize,
) -> f64 {
    if grid.is_flat(Axis::Y) || peripheral(grid, Loc3::CFC, i, j, k) {
        return 0.0;
    }
    let vel = state.velocities();
    let pressure_gradient = (state.pressure.get(i, j, k) - state.pressure.get(i, j - 1, k)) / grid.dy(i, j, k, Loc3::CFC);
    -v_advection(grid, &dynamics.advection, dynamics.momentum, vel, i, j, k)
        + curvature_tendency_v(grid, &state.u, &state.v, i, j, k)
        - pressure_gradient
        + diffusive_flux_divergence(
            grid,
            &state.diffusivity,
            dynamics.closure.vertical_diffusivity(),
            &state.v,
            i,
            j,
            k,
        )
}

/// Tendency of tracer `n` at `CCC` `(i, j, k)`.
pub fn tracer_tendency<G: ImmersedMetrics + ?Sized>(
    grid: &G,
    dynamics: &Dynamics,
    state: &ModelState,
    n: usize,
    i: isize,
    j: isize,
    k: isize,
) -> f64 {
    if grid.solid_node(Loc3::CCC, i, j, k) {
        return 0.0;
    }
    let c = &state.tracers[n];
    -flux_divergence(i, j, k, grid, &dynamics.advection, state.velocities(), c)
        + diffusive_flux_divergence(grid, &state.diffusivity, dynamics.closure.vertical_diffusivity(), c, i, j, k)
}

/// Compute every tendency at the indices of `set`.
pub fn compute_tendencies<G, S>(grid: &G, dynamics: &Dynamics, state: &ModelState, tendencies: &mut Tendencies, set: &S)
where
    G: ImmersedMetrics,
    S: IndexSet + ?Sized,
{
    launch(set, &mut tendencies.u, |i, j, k| u_tendency(grid, dynamics, state, i, j, k));
    launch(set, &mut tendencies.v, |i, j, k| v_tendency(grid, dynamics, state, i, j, k));
    for (n, g) in tendencies.tracers.iter_mut().enumerate() {
        launch(set, g, |i, j, k| tracer_tendency(grid, dynamics, state, n, i, j, k));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advection::AdvectionScheme;
    use crate::grid::RectilinearGrid;
    use crate::immersed::{ActiveCellIndex, GridFittedBottom, ImmersedBoundaryGrid};
    use crate::types::Topology;

    fn grid() -> RectilinearGrid {
        RectilinearGrid::uniform(
            [6, 6, 2],
            [1, 1, 1],
            [6.0, 6.0, 2.0],
            [Topology::Periodic, Topology::Bounded, Topology::Bounded],
        )
        .unwrap()
    }

    #[test]
    fn test_launch_writes_only_the_set() {
        let g = grid();
        let mut out = Field::new(&g, Loc3::CCC);
        let set = IndexBox::new(2..=3, 1..=1, 1..=2);
        launch(&set, &mut out, |i, _, k| (10 * i + k) as f64);
        assert_eq!(out.get(2, 1, 1), 21.0);
        assert_eq!(out.get(3, 1, 2), 32.0);
        assert_eq!(out.get(4, 1, 1), 0.0);
        assert_eq!(out.get(2, 2, 1), 0.0);
    }

    #[test]
    fn test_later_launch_overwrites() {
        let g = grid();
        let mut out = Field::new(&g, Loc3::CCC);
        let all = out.interior();
        launch(&all, &mut out, |_, _, _| 1.0);
        launch(&IndexBox::new(1..=1, 1..=1, 1..=1), &mut out, |_, _, _| 5.0);
        assert_eq!(out.get(1, 1, 1), 5.0);
        assert_eq!(out.get(2, 1, 1), 1.0);
    }

    #[test]
    fn test_walls_and_solid_hold_velocity_tendency() {
        let g = grid();
        let ibg = ImmersedBoundaryGrid::new(
            g.clone(),
            GridFittedBottom::from_function(&g, |x, _| if x < 1.0 { 0.0 } else { -2.0 }),
        );
        assert!(peripheral(&ibg, Loc3::CFC, 3, 1, 1));
        assert!(peripheral(&ibg, Loc3::CFC, 3, 7, 1));
        assert!(!peripheral(&ibg, Loc3::CFC, 3, 4, 1));
        // Face between the solid column 1 and fluid column 2.
        assert!(peripheral(&ibg, Loc3::FCC, 2, 3, 1));
        assert!(!peripheral(&ibg, Loc3::FCC, 4, 3, 1));
    }

    #[test]
    fn test_only_walled_ends_are_peripheral() {
        let g = RectilinearGrid::uniform(
            [6, 6, 2],
            [1, 1, 1],
            [6.0, 6.0, 2.0],
            [Topology::LeftConnected, Topology::RightConnected, Topology::Bounded],
        )
        .unwrap();
        assert!(!peripheral(&g, Loc3::FCC, 1, 3, 1));
        assert!(peripheral(&g, Loc3::FCC, 7, 3, 1));
        assert!(peripheral(&g, Loc3::CFC, 3, 1, 1));
        assert!(!peripheral(&g, Loc3::CFC, 3, 7, 1));
    }

    #[test]
    fn test_packed_and_box_sets_agree() {
        let g = grid();
        let index = ActiveCellIndex::build(&g).unwrap();
        let all = IndexBox::new(1..=6, 1..=6, 1..=2);
        assert_eq!(IndexSet::len(index.interior()), IndexSet::len(&all));

        let dynamics = Dynamics::new(AdvectionScheme::UpwindFirstOrder);
        let mut state = ModelState::new(&g, &["c"]);
        state.u.fill(1.0);
        state.tracers[0].set_fn(&g, |x, y, _| (x * 0.9).sin() + y);
        state.fill_halo_regions();
        let mut from_index = Tendencies::new(&g, 1);
        let mut from_box = Tendencies::new(&g, 1);
        compute_tendencies(&g, &dynamics, &state, &mut from_index, index.interior());
        compute_tendencies(&g, &dynamics, &state, &mut from_box, &all);
        assert_eq!(from_index, from_box);
    }
}
