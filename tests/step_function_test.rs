//! Advecting a step with WENO against a centered baseline.

use fv_ocean::advection::{AdvectionScheme, Velocities, WenoScheme, WenoVariant, flux_divergence};
use fv_ocean::field::Field;
use fv_ocean::grid::RectilinearGrid;
use fv_ocean::types::{Loc3, Topology};

const N: usize = 32;

fn line() -> RectilinearGrid {
    RectilinearGrid::uniform(
        [N, 1, 1],
        [3, 0, 0],
        [N as f64, 1.0, 1.0],
        [Topology::Periodic, Topology::Flat, Topology::Flat],
    )
    .unwrap()
}

/// One forward-Euler step of `c_t + (u c)_x = 0` with `u = 1`.
fn step(scheme: &AdvectionScheme, dt: f64) -> Vec<f64> {
    let grid = line();
    let mut u = Field::new(&grid, Loc3::FCC);
    u.fill(1.0);
    let (v, w) = (Field::new(&grid, Loc3::CFC), Field::new(&grid, Loc3::CCF));
    let mut c = Field::new(&grid, Loc3::CCC);
    c.set_fn(&grid, |x, _, _| if (8.0..16.0).contains(&x) { 1.0 } else { 0.0 });
    c.fill_halo_regions();
    (1..=N as isize)
        .map(|i| c.get(i, 1, 1) - dt * flux_divergence(i, 1, 1, &grid, scheme, Velocities::new(&u, &v, &w), &c))
        .collect()
}

fn total_variation(c: &[f64]) -> f64 {
    (0..c.len()).map(|i| (c[(i + 1) % c.len()] - c[i]).abs()).sum()
}

#[test]
fn test_weno_introduces_no_new_extrema() {
    for variant in [WenoVariant::Plain, WenoVariant::Z] {
        let weno = AdvectionScheme::from(WenoScheme::new(3, variant).unwrap());
        let c = step(&weno, 0.1);
        let (lo, hi) = c.iter().fold((f64::MAX, f64::MIN), |(lo, hi), &x| (lo.min(x), hi.max(x)));
        assert!(lo > -1e-8, "{variant:?}: undershoot {lo}");
        assert!(hi < 1.0 + 1e-8, "{variant:?}: overshoot {hi}");
        assert!(total_variation(&c) <= 2.0 + 1e-8);
    }
}

#[test]
fn test_centered_baseline_oscillates() {
    let c = step(&AdvectionScheme::Centered2, 0.1);
    let lo = c.iter().cloned().fold(f64::MAX, f64::min);
    let hi = c.iter().cloned().fold(f64::MIN, f64::max);
    assert!(lo < -1e-3 || hi > 1.0 + 1e-3, "centered step stayed bounded: [{lo}, {hi}]");
    assert!(total_variation(&c) > 2.0 + 1e-3);
}

#[test]
fn test_step_conserves_mass() {
    let weno = AdvectionScheme::from(WenoScheme::new(3, WenoVariant::Z).unwrap());
    let c = step(&weno, 0.1);
    assert!((c.iter().sum::<f64>() - 8.0).abs() < 1e-12);
}
