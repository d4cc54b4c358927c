//! Tendencies computed on partitioned ranks match the single-rank run.

use std::f64::consts::PI;
use std::sync::Arc;
use std::thread;

use fv_ocean::advection::{AdvectionScheme, MomentumForm, WenoScheme, WenoVariant};
use fv_ocean::closure::{ConstantDiffusivity, SmagorinskyLilly};
use fv_ocean::distributed::{Architecture, BoundarySlabs, StateExchange, update_tendencies};
use fv_ocean::field::Field;
use fv_ocean::grid::{GridMetrics, RectilinearGrid};
use fv_ocean::immersed::{GridFittedBottom, ImmersedBoundaryGrid, ImmersedMetrics};
use fv_ocean::model::{Dynamics, Model, Tendencies};
use fv_ocean::types::Topology;

const SIZE: [usize; 3] = [24, 12, 4];
const TRACERS: [&str; 2] = ["T", "b"];

fn global(tx: Topology) -> ImmersedBoundaryGrid {
    let grid = RectilinearGrid::uniform(
        SIZE,
        [3, 3, 3],
        [24.0, 12.0, 4.0],
        [tx, Topology::Periodic, Topology::Bounded],
    )
    .unwrap();
    // A ridge straddling the rank interfaces and a shelf along both x ends.
    let bottom = GridFittedBottom::from_function(&grid, |x, y| {
        if (10.0..14.0).contains(&x) && y > 3.0 {
            -2.0
        } else if !(1.5..=22.5).contains(&x) {
            -3.0
        } else if (5.0..7.0).contains(&x) && (5.0..7.0).contains(&y) {
            0.0
        } else {
            -4.0
        }
    });
    ImmersedBoundaryGrid::new(grid, bottom)
}

fn initialise<G: ImmersedMetrics + Clone>(model: &mut Model<G>) {
    let grid = model.grid().clone();
    let (lx, ly) = (2.0 * PI / 24.0, 2.0 * PI / 12.0);
    let state = model.state_mut();
    state.u.set_fn(&grid, |x, y, z| 0.3 + 0.2 * (lx * x).sin() * (ly * y).cos() + 0.05 * z);
    state.v.set_fn(&grid, |x, y, z| -0.1 + 0.2 * (lx * x).cos() * (ly * y).sin() - 0.02 * z);
    state.tracers[0].set_fn(&grid, |x, y, z| {
        let front = if (3.0..9.0).contains(&x) { 1.0 } else { 0.0 };
        (lx * x).sin() + 0.5 * (ly * y).cos() + 0.1 * z + front
    });
    state.tracers[1].set_fn(&grid, |x, _, z| 0.01 * z + 0.002 * (lx * x).sin());
}

fn dynamics(momentum: MomentumForm, smagorinsky: bool) -> Dynamics {
    let weno = AdvectionScheme::from(WenoScheme::new(3, WenoVariant::Z).unwrap());
    let dynamics = Dynamics::new(weno).with_momentum(momentum).with_buoyancy("b");
    if smagorinsky {
        dynamics.with_closure(SmagorinskyLilly {
            coefficient: 0.2,
            prandtl: 1.0,
            vertical: 1e-3,
        })
    } else {
        dynamics.with_closure(ConstantDiffusivity::new(1e-2, 1e-3))
    }
}

fn serial(tx: Topology, dynamics: &Dynamics, active_cells: bool) -> Tendencies {
    let mut model = Model::new(global(tx), dynamics.clone(), &TRACERS).unwrap();
    if active_cells {
        model = model.with_active_cells([false, false]).unwrap();
    }
    initialise(&mut model);
    model.update_tendencies();
    model.tendencies().clone()
}

fn distributed(
    tx: Topology,
    ranks: [usize; 2],
    dynamics: &Dynamics,
    active_cells: bool,
) -> Vec<([usize; 2], Tendencies)> {
    let global = Arc::new(global(tx));
    let handles: Vec<_> = Architecture::world_for(global.as_ref(), ranks)
        .unwrap()
        .into_iter()
        .map(|arch| {
            let global = Arc::clone(&global);
            let dynamics = dynamics.clone();
            thread::spawn(move || -> fv_ocean::Result<([usize; 2], Tendencies)> {
                let offset = arch.partition().local_offset(global.as_ref());
                let local = arch.partition().local_immersed_grid(&global)?;
                let slabs = BoundarySlabs::plan(&local, arch.communicating());
                let mut model = Model::new(local, dynamics, &TRACERS)?;
                if active_cells {
                    model = model.with_active_cells(arch.communicating())?;
                }
                initialise(&mut model);
                let mut exchange = StateExchange::new(model.state());
                update_tendencies(&arch, &mut model, &mut exchange, &slabs)?;
                arch.communicator().check_drained()?;
                Ok((offset, model.tendencies().clone()))
            })
        })
        .collect();
    handles
        .into_iter()
        .map(|h| h.join().expect("rank panicked").expect("rank failed"))
        .collect()
}

fn worst_difference(local: &Field, reference: &Field, offset: [usize; 2]) -> f64 {
    let [nx, ny, nz] = local.size().map(|n| n as isize);
    let (ox, oy) = (offset[0] as isize, offset[1] as isize);
    let mut worst = 0.0_f64;
    for k in 1..=nz {
        for j in 1..=ny {
            for i in 1..=nx {
                let d = (local.get(i, j, k) - reference.get(i + ox, j + oy, k)).abs();
                worst = worst.max(d);
            }
        }
    }
    worst
}

fn assert_equivalent(tx: Topology, ranks: [usize; 2], momentum: MomentumForm, smagorinsky: bool, active_cells: bool) {
    let dynamics = dynamics(momentum, smagorinsky);
    let reference = serial(tx, &dynamics, active_cells);
    let scale = reference.iter().flat_map(|f| f.data().iter()).fold(0.0_f64, |m, g| m.max(g.abs()));
    assert!(scale > 0.0);
    for (offset, tendencies) in distributed(tx, ranks, &dynamics, active_cells) {
        for (n, (local, serial)) in tendencies.iter().zip(reference.iter()).enumerate() {
            let worst = worst_difference(local, serial, offset);
            assert!(
                worst <= 1e-12 * scale,
                "{tx:?} x, ranks {ranks:?} offset {offset:?} field {n}: differs from serial by {worst}"
            );
        }
    }
}

#[test]
fn test_two_ranks_match_serial() {
    assert_equivalent(Topology::Periodic, [2, 1], MomentumForm::FluxForm, false, false);
}

#[test]
fn test_two_ranks_with_active_cells_match_serial() {
    assert_equivalent(Topology::Periodic, [2, 1], MomentumForm::VectorInvariant, false, true);
}

#[test]
fn test_smagorinsky_diffusivity_is_recomputed_at_the_edges() {
    assert_equivalent(Topology::Periodic, [2, 1], MomentumForm::FluxForm, true, true);
}

#[test]
fn test_four_ranks_match_serial() {
    assert_equivalent(Topology::Periodic, [2, 2], MomentumForm::VectorInvariant, true, true);
}

#[test]
fn test_bounded_axis_split_matches_serial() {
    assert_equivalent(Topology::Bounded, [2, 1], MomentumForm::FluxForm, false, false);
    assert_equivalent(Topology::Bounded, [2, 1], MomentumForm::VectorInvariant, true, true);
}

#[test]
fn test_three_blocks_of_a_bounded_axis_match_serial() {
    assert_equivalent(Topology::Bounded, [3, 2], MomentumForm::VectorInvariant, true, true);
}
