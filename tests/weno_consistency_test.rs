//! WENO reconstruction on smooth data: equal smoothness indicators, optimal
//! weights and the designed order of accuracy.

use approx::assert_relative_eq;
use fv_ocean::advection::{MAX_WENO_ORDER, Smoothness, WenoTables, WenoVariant};

/// Cell averages of `f` with antiderivative `big_f` on the `2N - 1` cells
/// ending at `x0 + (N - 1) h`, upwind to downwind. The target cell is
/// `[x0 - h, x0]`.
fn averages(n: usize, x0: f64, h: f64, big_f: impl Fn(f64) -> f64) -> Vec<f64> {
    (0..2 * n - 1)
        .map(|s| {
            let a = x0 + (s as f64 - n as f64) * h;
            (big_f(a + h) - big_f(a)) / h
        })
        .collect()
}

#[test]
fn test_linear_data_has_equal_smoothness_and_optimal_weights() {
    for n in 2..=MAX_WENO_ORDER {
        let tables = WenoTables::new(n).unwrap();
        let stencil: Vec<f64> = (0..2 * n - 1).map(|s| 3.0 + 0.5 * s as f64).collect();
        let beta = tables.smoothness(&stencil);
        for r in 1..n {
            assert_relative_eq!(beta[r], beta[0], max_relative = 1e-9);
        }
        assert!(beta[0] > 0.0);
        for variant in [WenoVariant::Plain, WenoVariant::Z] {
            let w = tables.weights(variant, &beta);
            for (r, d) in tables.optimal_weights().iter().enumerate() {
                assert_relative_eq!(w[r], *d, max_relative = 1e-9);
            }
        }
    }
}

#[test]
fn test_optimal_weights_are_a_partition_of_unity() {
    for n in 1..=MAX_WENO_ORDER {
        let tables = WenoTables::new(n).unwrap();
        let d = tables.optimal_weights();
        assert_eq!(d.len(), n);
        assert!(d.iter().all(|&x| x > 0.0));
        assert_relative_eq!(d.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    }
}

#[test]
fn test_polynomials_are_reconstructed_exactly() {
    for n in 2..=MAX_WENO_ORDER {
        let tables = WenoTables::new(n).unwrap();
        // Each candidate is exact for degree n - 1.
        let degree = n - 1;
        let big_f = |x: f64| x.powi(degree as i32 + 1) / (degree + 1) as f64;
        let exact = |x: f64| x.powi(degree as i32);
        let x0 = 0.7;
        let stencil = averages(n, x0, 0.1, big_f);
        for variant in [WenoVariant::Plain, WenoVariant::Z] {
            let value = tables.reconstruct(variant, Smoothness::Scalar, &stencil, None);
            assert_relative_eq!(value, exact(x0), epsilon = 1e-10);
        }
    }
}

#[test]
fn test_refinement_reaches_design_order() {
    let big_f = |x: f64| -x.cos();
    let exact = |x: f64| x.sin();
    let x0 = 0.4;
    for (n, h) in [(2, 0.02), (3, 0.05)] {
        let tables = WenoTables::new(n).unwrap();
        for variant in [WenoVariant::Plain, WenoVariant::Z] {
            let error = |h: f64| {
                let stencil = averages(n, x0, h, big_f);
                (tables.reconstruct(variant, Smoothness::Scalar, &stencil, None) - exact(x0)).abs()
            };
            let (coarse, fine) = (error(h), error(h / 2.0));
            let rate = (coarse / fine).log2();
            let design = (2 * n - 1) as f64;
            assert!(
                rate > design - 0.6,
                "order {n} {variant:?}: observed rate {rate:.2}, design {design}"
            );
        }
    }
}

#[test]
fn test_optimal_weights_reach_design_order() {
    let big_f = |x: f64| -x.cos();
    let exact = |x: f64| x.sin();
    let x0 = 0.4;
    for (n, h) in [(2, 0.05), (3, 0.1), (4, 0.1), (5, 0.2)] {
        let tables = WenoTables::new(n).unwrap();
        // Flat smoothness stencils pin the weights to `d_r`.
        let psi = vec![0.0; 2 * n - 1];
        let error = |h: f64| {
            let stencil = averages(n, x0, h, big_f);
            let value = tables.reconstruct(WenoVariant::Plain, Smoothness::Function { psi: &psi }, &stencil, None);
            (value - exact(x0)).abs()
        };
        let rate = (error(h) / error(h / 2.0)).log2();
        let design = (2 * n - 1) as f64;
        assert!(rate > design - 0.7, "order {n}: observed rate {rate:.2}, design {design}");
    }
}

#[test]
fn test_discontinuity_selects_the_smooth_candidate() {
    let tables = WenoTables::new(3).unwrap();
    // Jump between the target and its downwind neighbour.
    let stencil = [0.0, 0.0, 0.0, 1.0, 1.0];
    let beta = tables.smoothness(&stencil);
    assert!(beta[2] < 1e-14);
    let w = tables.weights(WenoVariant::Plain, &beta);
    assert!(w[2] > 1.0 - 1e-10);
    let value = tables.reconstruct(WenoVariant::Plain, Smoothness::Scalar, &stencil, None);
    assert!(value.abs() < 1e-10);
}

#[test]
fn test_function_smoothness_overrides_the_stencil() {
    let tables = WenoTables::new(3).unwrap();
    let stencil = [1.0, 2.0, 3.0, 4.0, 5.0];
    // A smooth auxiliary stencil keeps the weights optimal, so the value is
    // the linear fifth-order reconstruction of the linear data.
    let psi = [0.0; 5];
    let value = tables.reconstruct(WenoVariant::Plain, Smoothness::Function { psi: &psi }, &stencil, None);
    assert_relative_eq!(value, 3.5, epsilon = 1e-12);
}
