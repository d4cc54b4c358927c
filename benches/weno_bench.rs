//! Benchmarks for WENO reconstruction.
//!
//! Run with: `cargo bench --bench weno_bench`
//!
//! Covers table construction, single-point reconstruction per order and a
//! full tracer divergence sweep over an immersed grid.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use fv_ocean::advection::{
    AdvectionScheme, MAX_WENO_ORDER, Smoothness, Velocities, WenoScheme, WenoTables, WenoVariant, flux_divergence,
};
use fv_ocean::field::Field;
use fv_ocean::grid::RectilinearGrid;
use fv_ocean::immersed::{GridFittedBottom, ImmersedBoundaryGrid};
use fv_ocean::types::{Loc3, Topology};

/// Benchmark deriving the coefficient tables.
fn bench_tables(c: &mut Criterion) {
    let mut group = c.benchmark_group("weno_tables");

    for order in 2..=MAX_WENO_ORDER {
        group.bench_with_input(BenchmarkId::new("new", order), &order, |b, &order| {
            b.iter(|| WenoTables::new(black_box(order)));
        });
    }

    group.finish();
}

/// Benchmark one reconstruction with each smoothness source.
fn bench_reconstruct(c: &mut Criterion) {
    let mut group = c.benchmark_group("weno_reconstruct");

    for order in 2..=MAX_WENO_ORDER {
        let tables = WenoTables::new(order).unwrap();
        let stencil: Vec<f64> = (0..2 * order - 1).map(|s| (0.3 * s as f64).sin()).collect();
        let other: Vec<f64> = stencil.iter().map(|x| 0.5 * x + 0.1).collect();

        for variant in [WenoVariant::Plain, WenoVariant::Z] {
            group.bench_with_input(
                BenchmarkId::new(format!("{variant:?}_scalar"), order),
                &order,
                |b, _| {
                    b.iter(|| tables.reconstruct(variant, Smoothness::Scalar, black_box(&stencil), None));
                },
            );
        }
        group.bench_with_input(BenchmarkId::new("velocity_blended", order), &order, |b, _| {
            b.iter(|| {
                tables.reconstruct(
                    WenoVariant::Z,
                    Smoothness::VelocityBlended {
                        u: black_box(&stencil),
                        v: black_box(&other),
                    },
                    black_box(&stencil),
                    None,
                )
            });
        });
    }

    group.finish();
}

/// Benchmark tracer flux divergence over every cell of an immersed grid.
fn bench_flux_divergence(c: &mut Criterion) {
    let mut group = c.benchmark_group("flux_divergence");
    group.sample_size(20);

    for n in [16, 32, 64] {
        let grid = RectilinearGrid::uniform(
            [n, n, 8],
            [5, 5, 5],
            [n as f64, n as f64, 8.0],
            [Topology::Periodic, Topology::Periodic, Topology::Bounded],
        )
        .unwrap();
        let half = n as f64 / 2.0;
        let bottom = GridFittedBottom::from_function(&grid, move |x, y| {
            let r2 = ((x - half).powi(2) + (y - half).powi(2)) / (half * half);
            -8.0 + 6.0 * (-4.0 * r2).exp()
        });
        let grid = ImmersedBoundaryGrid::new(grid, bottom);

        let mut u = Field::new(&grid, Loc3::FCC);
        let mut v = Field::new(&grid, Loc3::CFC);
        let w = Field::new(&grid, Loc3::CCF);
        let mut tracer = Field::new(&grid, Loc3::CCC);
        u.set_fn(&grid, |_, y, _| (y / half).sin());
        v.set_fn(&grid, |x, _, _| (x / half).cos());
        tracer.set_fn(&grid, |x, y, z| (x * 0.3).sin() + (y * 0.2).cos() + 0.1 * z);
        for f in [&mut u, &mut v, &mut tracer] {
            f.fill_halo_regions();
        }
        let interior = tracer.interior();

        for order in [3, 5] {
            let scheme = AdvectionScheme::from(WenoScheme::new(order, WenoVariant::Z).unwrap());
            group.bench_with_input(
                BenchmarkId::new(format!("weno{}", 2 * order - 1), format!("{n}x{n}x8")),
                &n,
                |b, _| {
                    b.iter(|| {
                        let mut sum = 0.0;
                        for (i, j, k) in interior.iter() {
                            sum += flux_divergence(i, j, k, &grid, &scheme, Velocities::new(&u, &v, &w), &tracer);
                        }
                        black_box(sum)
                    });
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_tables, bench_reconstruct, bench_flux_divergence);
criterion_main!(benches);
